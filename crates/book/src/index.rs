//! In-memory page index.
//!
//! A page index is the list of byte offsets at which each page of a
//! book starts. Offset 0 is always present (every book has a first
//! page, even an empty file) and offsets are strictly increasing.
//! Bounded by a const capacity so the firmware's RAM footprint is
//! fixed at build time.

/// Capacity of a full book index.
pub const MAX_PAGES: usize = 2048;

/// Errors from index mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndexError {
    /// The index is at capacity.
    Full,
    /// The pushed offset does not come after the last one.
    NotMonotonic,
}

impl core::fmt::Display for IndexError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "page index full"),
            Self::NotMonotonic => write!(f, "page offset not increasing"),
        }
    }
}

/// Page-start offsets for one book, plus its indexing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageIndex<const N: usize> {
    offsets: heapless::Vec<u32, N>,
    complete: bool,
    resume_cursor: u32,
}

/// Index sized for a whole book.
pub type BookIndex = PageIndex<MAX_PAGES>;

impl<const N: usize> Default for PageIndex<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PageIndex<N> {
    /// Fresh index holding only page 0 at offset 0.
    #[must_use]
    pub fn new() -> Self {
        let mut offsets = heapless::Vec::new();
        // capacity N >= 1 for any usable index
        let _ = offsets.push(0);
        Self {
            offsets,
            complete: false,
            resume_cursor: 0,
        }
    }

    /// Append the start offset of the next page.
    pub fn push(&mut self, offset: u32) -> Result<(), IndexError> {
        if self.last_offset() >= offset {
            return Err(IndexError::NotMonotonic);
        }
        self.offsets.push(offset).map_err(|_| IndexError::Full)
    }

    /// Number of pages indexed so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }

    /// Start offset of page `page`, if indexed.
    #[must_use]
    pub fn offset(&self, page: usize) -> Option<u32> {
        self.offsets.get(page).copied()
    }

    /// Start offset of the last indexed page.
    #[must_use]
    pub fn last_offset(&self) -> u32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// All page-start offsets, in page order.
    #[must_use]
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Whether the index covers the file to EOF.
    #[must_use]
    pub fn complete(&self) -> bool {
        self.complete
    }

    /// Mark whether the index covers the file to EOF.
    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// Saved reading position (0-based page).
    #[must_use]
    pub fn resume_cursor(&self) -> u32 {
        self.resume_cursor
    }

    /// Record the reading position to resume at.
    pub fn set_resume_cursor(&mut self, page: u32) {
        self.resume_cursor = page;
    }
}
