//! Catalog of readable files on the volume.
//!
//! Built once at startup: the volume root is enumerated, text files are
//! admitted, and each one gets a page index either loaded from its
//! cached record or built fresh. The boot-time build stops at a page
//! limit so a shelf of large books does not stall startup; the open
//! path finishes partial indexes on demand.

use platform::config::PageGrid;
use platform::storage::{DirEntry, File, Storage, MAX_NAME_LEN};

use crate::index::{IndexError, PageIndex, MAX_PAGES};
use crate::paginate::{self, PaginateError};
use crate::store;

/// Most files the catalog tracks. Extra files on the volume are
/// ignored rather than treated as an error.
pub const MAX_BOOKS: usize = 32;

/// Catalog build failures.
#[derive(Debug)]
pub enum CatalogError<E> {
    /// The underlying storage failed.
    Storage(E),
    /// A book overflowed the page index while being built.
    Index(IndexError),
}

impl<E: core::fmt::Debug> core::fmt::Display for CatalogError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error during catalog scan: {e:?}"),
            Self::Index(e) => write!(f, "catalog scan stopped: {e}"),
        }
    }
}

impl<E> From<PaginateError<E>> for CatalogError<E> {
    fn from(e: PaginateError<E>) -> Self {
        match e {
            PaginateError::Storage(e) => Self::Storage(e),
            PaginateError::Index(e) => Self::Index(e),
        }
    }
}

/// One readable file and its page index.
#[derive(Debug, Clone)]
pub struct BookEntry<const N: usize> {
    /// File name at the volume root.
    pub name: heapless::String<MAX_NAME_LEN>,
    /// File size observed when the entry was built.
    pub size: u64,
    /// Page index, possibly partial until the book is first opened.
    pub index: PageIndex<N>,
}

/// All readable files found on the volume, in enumeration order.
#[derive(Debug, Clone, Default)]
pub struct Catalog<const N: usize, const B: usize> {
    entries: heapless::Vec<BookEntry<N>, B>,
}

/// Catalog sized for the firmware.
pub type BookCatalog = Catalog<MAX_PAGES, MAX_BOOKS>;

/// Whether a directory entry name is admitted to the catalog.
///
/// Dotfiles are rejected before the extension check, which also keeps
/// out the `._` companion files some desktop systems leave behind.
#[must_use]
pub fn is_text_name(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    let Some(dot) = name.rfind('.') else {
        return false;
    };
    name.get(dot..)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(".txt"))
}

impl<const N: usize, const B: usize> Catalog<N, B> {
    /// Enumerate the volume root and build an entry per text file.
    ///
    /// Fresh indexes stop at `preindex_pages`; cached records are used
    /// as-is. A file that disappears between enumeration and open is
    /// skipped silently.
    pub async fn scan<S>(
        storage: &mut S,
        grid: &PageGrid,
        preindex_pages: u32,
    ) -> Result<Self, CatalogError<S::Error>>
    where
        S: Storage,
        S::File: File<Error = S::Error>,
    {
        let mut names: heapless::Vec<(heapless::String<MAX_NAME_LEN>, u64), B> =
            heapless::Vec::new();
        storage
            .list_dir("/", &mut |e: &DirEntry| {
                if !e.is_dir && is_text_name(e.name.as_str()) {
                    // past capacity B the rest of the shelf is ignored
                    let _ = names.push((e.name.clone(), e.size));
                }
            })
            .await
            .map_err(CatalogError::Storage)?;

        let mut entries = heapless::Vec::new();
        for (name, listed_size) in names {
            if let Some((index, size)) =
                build_or_load(storage, name.as_str(), listed_size, grid, preindex_pages).await?
            {
                let _ = entries.push(BookEntry { name, size, index });
            }
        }
        Ok(Self { entries })
    }

    /// Number of cataloged books.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no readable files were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at catalog position `i`.
    #[must_use]
    pub fn entry(&self, i: usize) -> Option<&BookEntry<N>> {
        self.entries.get(i)
    }

    /// Mutable entry at catalog position `i`.
    pub fn entry_mut(&mut self, i: usize) -> Option<&mut BookEntry<N>> {
        self.entries.get_mut(i)
    }

    /// Iterate the entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &BookEntry<N>> {
        self.entries.iter()
    }
}

/// Load the cached index for one file, or build and cache a fresh one.
/// Returns `None` when the file cannot be opened.
async fn build_or_load<S, const N: usize>(
    storage: &mut S,
    name: &str,
    listed_size: u64,
    grid: &PageGrid,
    preindex_pages: u32,
) -> Result<Option<(PageIndex<N>, u64)>, CatalogError<S::Error>>
where
    S: Storage,
    S::File: File<Error = S::Error>,
{
    if let Some(index) = store::load(storage, name, listed_size)
        .await
        .map_err(CatalogError::Storage)?
    {
        return Ok(Some((index, listed_size)));
    }

    let path = store::book_path(name);
    let Ok(mut file) = storage.open_file(path.as_str()).await else {
        return Ok(None);
    };
    let size = file.size();
    let index = paginate::cold_scan::<_, N>(&mut file, grid, preindex_pages).await?;
    drop(file);
    store::save(storage, name, &index, store::stored_size(size))
        .await
        .map_err(CatalogError::Storage)?;
    Ok(Some((index, size)))
}
