//! Presentation boundary.
//!
//! The core hands over raw page bytes and counters; the adapter owns
//! font metrics, pixel layout, and the full-vs-partial refresh decision.
//! Line wrapping at render time must use the same character budget the
//! indexer used (`config::PageGrid`), or pages drift out of alignment.

/// One book's current page, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView<'a> {
    /// Raw page bytes, sliced between adjacent page-start offsets.
    /// May contain control bytes; the adapter filters at draw time.
    pub text: &'a [u8],
    /// 0-based page the view shows.
    pub current_page: u32,
    /// Total pages in the book.
    pub total_pages: u32,
}

/// One row of the file-list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRow<'a> {
    /// File name on the volume.
    pub name: &'a str,
    /// True when a saved reading position exists for this file.
    pub has_resume: bool,
}

/// Render boundary implemented by each hardware variant.
///
/// Every method draws a complete screen; there is no incremental
/// drawing protocol. Calls are serialized by the cooperative main loop.
pub trait Presenter {
    /// Error type for render operations.
    type Error: core::fmt::Debug;

    /// Draw the file-list screen with `selected` highlighted.
    fn file_list(
        &mut self,
        rows: &[ListRow<'_>],
        selected: usize,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Draw the current page of the open book.
    fn page(
        &mut self,
        view: &PageView<'_>,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Draw the blocking "indexing, please wait" screen for `name`.
    ///
    /// Shown before a pagination pass whose duration scales with file
    /// size; the next screen replaces it when indexing finishes.
    fn indexing(&mut self, name: &str)
        -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Draw a transient operator notice (open failure, storage error).
    fn notice(&mut self, msg: &str)
        -> impl core::future::Future<Output = Result<(), Self::Error>>;
}
