//! On-disk index record cache.
//!
//! Records live under a hidden directory at the volume root, one per
//! text file, named after it. A record is never trusted blindly: the
//! load path validates the header against the live file size, the
//! record length against the page count, and the offset table's
//! ordering. Anything that fails validation is deleted so the next
//! open rebuilds it; a valid record that merely exceeds the in-memory
//! page capacity stays on disk for a future firmware to use.
//!
//! Writes go whole-record (remove, recreate, write through). The one
//! exception is the resume cursor, which is patched in place through
//! [`update_resume_cursor`] so closing a book does not rewrite a
//! multi-kilobyte offset table.

use platform::storage::{File, Storage};

use crate::binary::{IndexHeader, INDEX_VERSION};
use crate::index::PageIndex;

/// Directory holding index records, hidden from the catalog scan.
pub const INDEX_DIR: &str = "/.index";

/// Capacity of the path strings built here.
pub const MAX_PATH: usize = 96;

/// Write granularity for the offset table.
const TABLE_CHUNK: usize = 256;

/// Path of the index record for the text file `name`.
#[must_use]
pub fn index_path(name: &str) -> heapless::String<MAX_PATH> {
    let mut path = heapless::String::new();
    // dir + '/' + bounded name + ".idx" always fits MAX_PATH
    let _ = path.push_str(INDEX_DIR);
    let _ = path.push('/');
    let _ = path.push_str(name);
    let _ = path.push_str(".idx");
    path
}

/// Volume-absolute path of the text file `name`.
#[must_use]
pub fn book_path(name: &str) -> heapless::String<MAX_PATH> {
    let mut path = heapless::String::new();
    let _ = path.push('/');
    let _ = path.push_str(name);
    path
}

/// Clamp a live file size for the on-disk header field.
#[must_use]
pub fn stored_size(size: u64) -> u32 {
    // SAFETY: files on the volume are below 4 GiB (FAT32)
    #[allow(clippy::cast_possible_truncation)]
    let clamped = size.min(u64::from(u32::MAX)) as u32;
    clamped
}

enum Parsed<const N: usize> {
    /// Record checks out.
    Valid(PageIndex<N>),
    /// Corrupt, truncated, or stale: delete and rebuild.
    Reject,
    /// Well-formed but larger than the in-memory capacity: leave it.
    TooLarge,
}

/// Load the index record for `name`, validating it against the text
/// file's current size. Returns `Ok(None)` when no usable record
/// exists; a record that failed validation has been deleted by then.
pub async fn load<S, const N: usize>(
    storage: &mut S,
    name: &str,
    live_size: u64,
) -> Result<Option<PageIndex<N>>, S::Error>
where
    S: Storage,
    S::File: File<Error = S::Error>,
{
    let path = index_path(name);
    if !storage.exists(path.as_str()).await? {
        return Ok(None);
    }
    let parsed = {
        let mut file = storage.open_file(path.as_str()).await?;
        parse_record::<_, N>(&mut file, live_size).await?
    };
    match parsed {
        Parsed::Valid(index) => Ok(Some(index)),
        Parsed::TooLarge => Ok(None),
        Parsed::Reject => {
            storage.remove_file(path.as_str()).await?;
            Ok(None)
        }
    }
}

async fn parse_record<F: File, const N: usize>(
    file: &mut F,
    live_size: u64,
) -> Result<Parsed<N>, F::Error> {
    let mut head = [0u8; IndexHeader::SIZE];
    let got = read_exact_n(file, &mut head, IndexHeader::SIZE).await?;
    let header_bytes = head.get(..got).unwrap_or(&[]);
    let Ok((header, consumed)) = IndexHeader::decode(header_bytes) else {
        return Ok(Parsed::Reject);
    };
    if u64::from(header.file_size) != live_size {
        return Ok(Parsed::Reject); // stale: the text file changed
    }
    if header.page_count == 0 {
        return Ok(Parsed::Reject); // even an empty book has one page
    }
    let table = u64::from(header.page_count).saturating_mul(4);
    let expected = (consumed as u64).saturating_add(table);
    if file.size() != expected {
        return Ok(Parsed::Reject); // truncated write or trailing garbage
    }
    if header.page_count as usize > N {
        return Ok(Parsed::TooLarge);
    }

    file.seek(consumed as u64).await?;
    let mut index = PageIndex::new();
    let mut chunk = [0u8; TABLE_CHUNK];
    let mut remaining = header.page_count as usize;
    let mut first = true;
    while remaining > 0 {
        let want = remaining.saturating_mul(4).min(TABLE_CHUNK);
        let got = read_exact_n(file, &mut chunk, want).await?;
        if got < want {
            return Ok(Parsed::Reject);
        }
        let filled = chunk.get(..got).unwrap_or(&[]);
        for quad in filled.chunks_exact(4) {
            let Ok(bytes) = <[u8; 4]>::try_from(quad) else {
                return Ok(Parsed::Reject);
            };
            let off = u32::from_le_bytes(bytes);
            if first {
                if off != 0 {
                    return Ok(Parsed::Reject); // page 0 must start at 0
                }
                first = false;
            } else if index.push(off).is_err() {
                return Ok(Parsed::Reject); // offsets must strictly increase
            }
        }
        remaining = remaining.saturating_sub(want / 4);
    }
    index.set_complete(header.complete);
    index.set_resume_cursor(header.resume_cursor);
    Ok(Parsed::Valid(index))
}

/// Write a whole record for `name`, replacing any existing one.
pub async fn save<S, const N: usize>(
    storage: &mut S,
    name: &str,
    index: &PageIndex<N>,
    file_size: u32,
) -> Result<(), S::Error>
where
    S: Storage,
    S::File: File<Error = S::Error>,
{
    storage.make_dir(INDEX_DIR).await?;
    let path = index_path(name);
    if storage.exists(path.as_str()).await? {
        storage.remove_file(path.as_str()).await?;
    }
    let mut file = storage.create_file(path.as_str()).await?;

    // SAFETY: page_count is bounded by the index capacity
    #[allow(clippy::cast_possible_truncation)]
    let header = IndexHeader {
        file_size,
        page_count: index.page_count() as u32,
        complete: index.complete(),
        resume_cursor: index.resume_cursor(),
    };
    write_all(&mut file, &header.encode()).await?;

    let mut chunk = [0u8; TABLE_CHUNK];
    let mut used = 0usize;
    for &off in index.offsets() {
        if let Some(dst) = chunk.get_mut(used..used.saturating_add(4)) {
            dst.copy_from_slice(&off.to_le_bytes());
        }
        used = used.saturating_add(4);
        if used == TABLE_CHUNK {
            write_all(&mut file, &chunk).await?;
            used = 0;
        }
    }
    if used > 0 {
        let tail = chunk.get(..used).unwrap_or(&[]);
        write_all(&mut file, tail).await?;
    }
    Ok(())
}

/// Persist only the resume cursor of `index`, patching the existing
/// record in place. A legacy record (or a missing one) is rewritten
/// whole in the current format instead.
pub async fn update_resume_cursor<S, const N: usize>(
    storage: &mut S,
    name: &str,
    index: &PageIndex<N>,
    file_size: u32,
) -> Result<(), S::Error>
where
    S: Storage,
    S::File: File<Error = S::Error>,
{
    let path = index_path(name);
    if storage.exists(path.as_str()).await? {
        let mut file = storage.edit_file(path.as_str()).await?;
        let mut version = [0u8; 1];
        let got = file.read(&mut version).await?;
        if got == 1 && version.first() == Some(&INDEX_VERSION) {
            file.seek(IndexHeader::CURSOR_OFFSET).await?;
            write_all(&mut file, &index.resume_cursor().to_le_bytes()).await?;
            return Ok(());
        }
    }
    save(storage, name, index, file_size).await
}

/// Read up to `want` bytes into the front of `buf`, retrying short
/// reads. Stops early only at EOF.
pub(crate) async fn read_exact_n<F: File>(
    file: &mut F,
    buf: &mut [u8],
    want: usize,
) -> Result<usize, F::Error> {
    let want = want.min(buf.len());
    let mut got = 0usize;
    while got < want {
        let Some(dst) = buf.get_mut(got..want) else {
            break;
        };
        let n = file.read(dst).await?;
        if n == 0 {
            break;
        }
        got = got.saturating_add(n);
    }
    Ok(got)
}

/// Write all of `buf`, retrying short writes.
pub(crate) async fn write_all<F: File>(file: &mut F, buf: &[u8]) -> Result<(), F::Error> {
    let mut done = 0usize;
    while done < buf.len() {
        let Some(rest) = buf.get(done..) else {
            break;
        };
        let n = file.write(rest).await?;
        if n == 0 {
            break;
        }
        done = done.saturating_add(n);
    }
    Ok(())
}
