//! Streaming pagination.
//!
//! Walks a text file once, front to back, counting rendered cells per
//! the page grid and recording the byte offset where each page starts.
//! The counting rules here must agree with [`crate::wrap`] and with the
//! render path, or resumed positions drift.
//!
//! Two entry points: [`cold_scan`] starts from offset 0 and may stop at
//! a page limit (the boot-time pre-index), [`resume_scan`] picks up a
//! partial index at its last recorded offset and runs to EOF.

use platform::config::PageGrid;
use platform::storage::File;

use crate::index::{IndexError, PageIndex};

/// Read granularity for the scan. One FAT sector.
const SCAN_CHUNK: usize = 512;

/// Errors from a pagination pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginateError<E> {
    /// The underlying storage failed.
    Storage(E),
    /// The page index could not take another page.
    Index(IndexError),
}

impl<E: core::fmt::Debug> core::fmt::Display for PaginateError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error during pagination: {e:?}"),
            Self::Index(e) => write!(f, "pagination stopped: {e}"),
        }
    }
}

/// Paginate from the start of `file`, recording at most `page_limit`
/// pages. The returned index is marked complete only if the scan
/// consumed the whole file.
pub async fn cold_scan<F: File, const N: usize>(
    file: &mut F,
    grid: &PageGrid,
    page_limit: u32,
) -> Result<PageIndex<N>, PaginateError<F::Error>> {
    let mut index = PageIndex::new();
    file.seek(0).await.map_err(PaginateError::Storage)?;
    let reached = scan_pages(file, grid, 0, Some(page_limit), &mut index).await?;
    index.set_complete(reached >= file.size());
    Ok(index)
}

/// Continue a partial `index` from its last recorded page start all
/// the way to EOF, then mark it complete.
///
/// The bytes before the last page start were already counted by the
/// pass that produced the partial index, so the line and column
/// counters legitimately restart at zero here.
pub async fn resume_scan<F: File, const N: usize>(
    file: &mut F,
    grid: &PageGrid,
    index: &mut PageIndex<N>,
) -> Result<(), PaginateError<F::Error>> {
    let start = index.last_offset();
    file.seek(u64::from(start))
        .await
        .map_err(PaginateError::Storage)?;
    scan_pages(file, grid, start, None, index).await?;
    index.set_complete(true);
    Ok(())
}

/// Core scan loop. Returns the stream position reached.
async fn scan_pages<F: File, const N: usize>(
    file: &mut F,
    grid: &PageGrid,
    start: u32,
    page_limit: Option<u32>,
    index: &mut PageIndex<N>,
) -> Result<u64, PaginateError<F::Error>> {
    let limit = page_limit.map(|l| l as usize);
    let mut pos = u64::from(start);
    let mut line: u16 = 0;
    let mut col: u16 = 0;
    let mut buf = [0u8; SCAN_CHUNK];

    'stream: loop {
        let n = file.read(&mut buf).await.map_err(PaginateError::Storage)?;
        if n == 0 {
            break;
        }
        let Some(chunk) = buf.get(..n) else {
            break; // read never returns more than buf.len()
        };
        for &b in chunk {
            pos = pos.saturating_add(1);
            if b == b'\n' {
                line = line.saturating_add(1);
                col = 0;
            } else if b >= 0x20 || b == b'\t' {
                col = col.saturating_add(1);
                if col >= grid.chars_per_line {
                    col = 0;
                    line = line.saturating_add(1);
                }
            } else {
                // CR and other control bytes take no cell
                continue;
            }
            if line >= grid.lines_per_page {
                line = 0;
                // SAFETY: files on the volume are below 4 GiB (FAT32)
                #[allow(clippy::cast_possible_truncation)]
                index.push(pos as u32).map_err(PaginateError::Index)?;
                if limit.is_some_and(|l| index.page_count() >= l) {
                    break 'stream;
                }
            }
        }
    }

    Ok(pos)
}
