//! One open book.
//!
//! A session pins the text file open, finishes or rebuilds its page
//! index as needed, and tracks the page being read. Page turns are
//! pure cursor moves over the index; bytes are only read when a page
//! is rendered. Closing the session persists the cursor so the next
//! open resumes where the reader left off.

use platform::config::PageGrid;
use platform::storage::{File, Storage};

use crate::catalog::BookEntry;
use crate::index::{IndexError, PageIndex};
use crate::paginate::{self, PaginateError};
use crate::store;

/// Page turn direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageTurn {
    /// Toward the end of the book.
    Forward,
    /// Toward the start of the book.
    Backward,
}

/// Session failures.
#[derive(Debug)]
pub enum SessionError<E> {
    /// The text file itself could not be opened. The catalog entry is
    /// left untouched; the caller stays on the file list.
    OpenFailed(E),
    /// Storage failed after the book was already open.
    Storage(E),
    /// The page index overflowed while finishing the book.
    Index(IndexError),
}

impl<E: core::fmt::Debug> core::fmt::Display for SessionError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OpenFailed(e) => write!(f, "could not open book: {e:?}"),
            Self::Storage(e) => write!(f, "storage error while reading: {e:?}"),
            Self::Index(e) => write!(f, "index overflow: {e}"),
        }
    }
}

impl<E> From<PaginateError<E>> for SessionError<E> {
    fn from(e: PaginateError<E>) -> Self {
        match e {
            PaginateError::Storage(e) => Self::Storage(e),
            PaginateError::Index(e) => Self::Index(e),
        }
    }
}

/// An open book with a complete page index.
pub struct ReaderSession<F, const N: usize> {
    file: F,
    index: PageIndex<N>,
    current_page: u32,
}

impl<F: File, const N: usize> ReaderSession<F, N> {
    /// Open the book behind `entry`.
    ///
    /// If the live file no longer matches the entry the index is
    /// rebuilt from scratch and the saved position is dropped. A
    /// merely partial index is finished from where it stopped. Either
    /// way the completed index is written back to the cache and into
    /// the entry, and the session starts at the saved position when
    /// one is still in range.
    pub async fn open<S>(
        storage: &mut S,
        entry: &mut BookEntry<N>,
        grid: &PageGrid,
    ) -> Result<Self, SessionError<S::Error>>
    where
        S: Storage<File = F, Error = F::Error>,
    {
        let path = store::book_path(entry.name.as_str());
        let mut file = storage
            .open_file(path.as_str())
            .await
            .map_err(SessionError::OpenFailed)?;

        if file.size() != entry.size {
            // the file changed since the catalog was built
            entry.size = file.size();
            let mut index = PageIndex::new();
            paginate::resume_scan(&mut file, grid, &mut index).await?;
            entry.index = index;
            store::save(
                storage,
                entry.name.as_str(),
                &entry.index,
                store::stored_size(entry.size),
            )
            .await
            .map_err(SessionError::Storage)?;
        } else if !entry.index.complete() {
            paginate::resume_scan(&mut file, grid, &mut entry.index).await?;
            store::save(
                storage,
                entry.name.as_str(),
                &entry.index,
                store::stored_size(entry.size),
            )
            .await
            .map_err(SessionError::Storage)?;
        }

        let total = total_pages(&entry.index);
        let resume = entry.index.resume_cursor();
        let current_page = if resume < total { resume } else { 0 };
        Ok(Self {
            file,
            index: entry.index.clone(),
            current_page,
        })
    }

    /// 0-based page the session is on.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Total pages in the book.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        total_pages(&self.index)
    }

    /// Move the cursor one page. Returns false at either end of the
    /// book, where the cursor stays put.
    pub fn turn_page(&mut self, dir: PageTurn) -> bool {
        match dir {
            PageTurn::Forward => {
                let next = self.current_page.saturating_add(1);
                if next < self.total_pages() {
                    self.current_page = next;
                    true
                } else {
                    false
                }
            }
            PageTurn::Backward => {
                if self.current_page > 0 {
                    self.current_page = self.current_page.saturating_sub(1);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Read the current page's bytes into `buf`. Returns how many
    /// bytes were read; a page larger than `buf` is cut at its end.
    pub async fn read_page(&mut self, buf: &mut [u8]) -> Result<usize, SessionError<F::Error>> {
        let page = self.current_page as usize;
        let start = u64::from(self.index.offset(page).unwrap_or(0));
        let end = match self.index.offset(page.saturating_add(1)) {
            Some(next) => u64::from(next),
            None => self.file.size(),
        };
        // SAFETY: page spans are bounded by the byte budget at index time
        #[allow(clippy::cast_possible_truncation)]
        let span = end.saturating_sub(start).min(buf.len() as u64) as usize;

        self.file
            .seek(start)
            .await
            .map_err(SessionError::Storage)?;
        store::read_exact_n(&mut self.file, buf, span)
            .await
            .map_err(SessionError::Storage)
    }

    /// Close the book, saving `current_page` as the resume position.
    pub async fn close<S>(
        self,
        storage: &mut S,
        entry: &mut BookEntry<N>,
    ) -> Result<(), SessionError<S::Error>>
    where
        S: Storage<File = F, Error = F::Error>,
    {
        entry.index.set_resume_cursor(self.current_page);
        store::update_resume_cursor(
            storage,
            entry.name.as_str(),
            &entry.index,
            store::stored_size(entry.size),
        )
        .await
        .map_err(SessionError::Storage)
    }
}

fn total_pages<const N: usize>(index: &PageIndex<N>) -> u32 {
    // SAFETY: page_count is bounded by the index capacity
    #[allow(clippy::cast_possible_truncation)]
    let total = index.page_count() as u32;
    total
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use platform::storage_local::LocalFileStorage;
    use std::fs;
    use tempfile::TempDir;

    fn grid() -> PageGrid {
        PageGrid {
            chars_per_line: 4,
            lines_per_page: 2,
        }
    }

    async fn catalog(tmp: &TempDir, preindex: u32) -> (LocalFileStorage, Catalog<16, 8>) {
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let cat = Catalog::scan(&mut storage, &grid(), preindex).await.unwrap();
        (storage, cat)
    }

    #[tokio::test]
    async fn open_finishes_a_partial_index() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("big.txt"), [b'x'; 48]).unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 2).await;
        let entry = cat.entry_mut(0).unwrap();
        assert!(!entry.index.complete());

        let session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();
        assert!(entry.index.complete());
        assert_eq!(session.total_pages(), 7);

        // the finished index was written back to the cache
        let cached: PageIndex<16> = store::load(&mut storage, "big.txt", 48).await.unwrap().unwrap();
        assert!(cached.complete());
        assert_eq!(cached.page_count(), 7);
    }

    #[tokio::test]
    async fn open_rebuilds_when_the_file_changed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("book.txt"), [b'x'; 16]).unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 100).await;

        // the file grows behind the catalog's back
        fs::write(tmp.path().join("book.txt"), [b'x'; 32]).unwrap();
        let entry = cat.entry_mut(0).unwrap();
        let session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();
        assert_eq!(entry.size, 32);
        assert_eq!(session.total_pages(), 5);
        assert_eq!(session.current_page(), 0);
    }

    #[tokio::test]
    async fn page_turns_clamp_at_both_ends() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), [b'x'; 20]).unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 100).await;
        let entry = cat.entry_mut(0).unwrap();
        let mut session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();
        assert_eq!(session.total_pages(), 3);

        assert!(!session.turn_page(PageTurn::Backward));
        assert_eq!(session.current_page(), 0);
        assert!(session.turn_page(PageTurn::Forward));
        assert!(session.turn_page(PageTurn::Forward));
        assert_eq!(session.current_page(), 2);
        assert!(!session.turn_page(PageTurn::Forward));
        assert_eq!(session.current_page(), 2);
        assert!(session.turn_page(PageTurn::Backward));
        assert_eq!(session.current_page(), 1);
    }

    #[tokio::test]
    async fn read_page_returns_the_page_span() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"AAAAAAAABBBBBBBBCC").unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 100).await;
        let entry = cat.entry_mut(0).unwrap();
        let mut session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();

        let mut buf = [0u8; 32];
        let n = session.read_page(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"AAAAAAAA");

        session.turn_page(PageTurn::Forward);
        let n = session.read_page(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"BBBBBBBB");

        session.turn_page(PageTurn::Forward);
        let n = session.read_page(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"CC");
    }

    #[tokio::test]
    async fn read_page_cuts_at_the_buffer() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), b"AAAAAAAABB").unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 100).await;
        let entry = cat.entry_mut(0).unwrap();
        let mut session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();

        let mut buf = [0u8; 5];
        let n = session.read_page(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"AAAAA");
    }

    #[tokio::test]
    async fn close_persists_the_resume_position() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), [b'x'; 40]).unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 100).await;

        let entry = cat.entry_mut(0).unwrap();
        let mut session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();
        session.turn_page(PageTurn::Forward);
        session.turn_page(PageTurn::Forward);
        session.close(&mut storage, entry).await.unwrap();
        assert_eq!(entry.index.resume_cursor(), 2);

        // reopening lands on the saved page
        let session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();
        assert_eq!(session.current_page(), 2);

        // and so does a fresh boot
        let (mut storage, mut cat) = catalog(&tmp, 100).await;
        let entry = cat.entry_mut(0).unwrap();
        let session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();
        assert_eq!(session.current_page(), 2);
    }

    #[tokio::test]
    async fn out_of_range_resume_falls_back_to_page_zero() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), [b'x'; 40]).unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 100).await;
        let entry = cat.entry_mut(0).unwrap();
        entry.index.set_resume_cursor(99);
        store::update_resume_cursor(&mut storage, "a.txt", &entry.index, 40)
            .await
            .unwrap();

        let session = ReaderSession::open(&mut storage, entry, &grid()).await.unwrap();
        assert_eq!(session.current_page(), 0);
    }

    #[tokio::test]
    async fn open_missing_file_reports_open_failed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), [b'x'; 8]).unwrap();
        let (mut storage, mut cat) = catalog(&tmp, 100).await;
        fs::remove_file(tmp.path().join("a.txt")).unwrap();

        let entry = cat.entry_mut(0).unwrap();
        let err = ReaderSession::open(&mut storage, entry, &grid())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::OpenFailed(_)));
    }
}
