//! Binary layout of on-disk index records.
//!
//! A record is a fixed header followed by the page-start offset table,
//! all little-endian:
//!
//! ```text
//! [0]      version        (u8, currently 2)
//! [1..5]   file_size      (u32 LE) size of the text file when indexed
//! [5..9]   page_count     (u32 LE) number of offsets that follow
//! [9]      complete       (u8, 1 = indexed to EOF)
//! [10..14] resume_cursor  (u32 LE) saved 0-based page
//! [14..]   offsets        (page_count x u32 LE)
//! ```
//!
//! Records written before the header carried a version byte start
//! directly with `file_size` and have no `resume_cursor` field. The
//! decoder recognizes them by the first byte: a real version byte is
//! exactly 2, while a legacy record's first byte is the low byte of a
//! file size. The ambiguity (a legacy file whose size ends in 0x02)
//! costs at worst one rebuild.

/// Current record version.
pub const INDEX_VERSION: u8 = 2;

/// Record decode failures. Any of these discards the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Fewer bytes than the smallest decodable header.
    Truncated,
}

impl core::fmt::Display for FormatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated => write!(f, "index record truncated"),
        }
    }
}

/// Decoded header of an index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    /// Size of the text file when the record was written.
    pub file_size: u32,
    /// Number of offsets in the table.
    pub page_count: u32,
    /// Whether the record covers the file to EOF.
    pub complete: bool,
    /// Saved 0-based reading position.
    pub resume_cursor: u32,
}

impl IndexHeader {
    /// Encoded size of a current-version header.
    pub const SIZE: usize = 14;
    /// Encoded size of a legacy headerless record's fixed part.
    pub const LEGACY_SIZE: usize = 9;
    /// Byte offset of `resume_cursor` within a current-version record,
    /// for in-place cursor patching.
    pub const CURSOR_OFFSET: u64 = 10;

    /// Encode as a current-version header.
    #[must_use]
    #[allow(clippy::indexing_slicing)] // fixed offsets into a fixed array
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = INDEX_VERSION;
        out[1..5].copy_from_slice(&self.file_size.to_le_bytes());
        out[5..9].copy_from_slice(&self.page_count.to_le_bytes());
        out[9] = u8::from(self.complete);
        out[10..14].copy_from_slice(&self.resume_cursor.to_le_bytes());
        out
    }

    /// Decode a header from the start of `buf`, accepting both the
    /// current and the legacy layout. Returns the header and how many
    /// bytes it occupied (the offset table starts there).
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), FormatError> {
        let first = *buf.first().ok_or(FormatError::Truncated)?;
        if first == INDEX_VERSION {
            if buf.len() < Self::SIZE {
                return Err(FormatError::Truncated);
            }
            Ok((
                Self {
                    file_size: read_u32(buf, 1).ok_or(FormatError::Truncated)?,
                    page_count: read_u32(buf, 5).ok_or(FormatError::Truncated)?,
                    complete: buf.get(9).copied() == Some(1),
                    resume_cursor: read_u32(buf, 10).ok_or(FormatError::Truncated)?,
                },
                Self::SIZE,
            ))
        } else {
            if buf.len() < Self::LEGACY_SIZE {
                return Err(FormatError::Truncated);
            }
            Ok((
                Self {
                    file_size: read_u32(buf, 0).ok_or(FormatError::Truncated)?,
                    page_count: read_u32(buf, 4).ok_or(FormatError::Truncated)?,
                    complete: buf.get(8).copied() == Some(1),
                    resume_cursor: 0,
                },
                Self::LEGACY_SIZE,
            ))
        }
    }
}

fn read_u32(buf: &[u8], at: usize) -> Option<u32> {
    let bytes = buf.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}
