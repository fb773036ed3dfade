//! Storage abstraction for the SD volume.
//!
//! Read paths serve the text files themselves; the write and directory
//! operations exist for the index-record cache the reader keeps under a
//! hidden subdirectory. Implementations are not required to be
//! crash-atomic; callers validate what they read back.

/// Maximum file-name length the reader handles (FAT LFN territory).
pub const MAX_NAME_LEN: usize = 64;

/// One entry yielded by [`Storage::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name without any directory prefix. Names longer than
    /// [`MAX_NAME_LEN`] bytes are truncated by the implementation.
    pub name: heapless::String<MAX_NAME_LEN>,
    /// File size in bytes (0 for directories).
    pub size: u64,
    /// True for subdirectories.
    pub is_dir: bool,
}

/// Storage trait for file system access.
pub trait Storage {
    /// Error type.
    type Error: core::fmt::Debug;
    /// File type.
    type File: File;

    /// Open an existing file for reading.
    fn open_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// Create a file (truncating any existing one) and open it writable.
    fn create_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// Open an existing file for in-place read/write without truncation.
    fn edit_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// Remove a file.
    fn remove_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Create a directory; succeeds if it already exists.
    fn make_dir(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Check if a path exists.
    fn exists(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<bool, Self::Error>>;

    /// Enumerate a directory, invoking `visit` once per entry in the
    /// volume's native enumeration order.
    fn list_dir(
        &mut self,
        path: &str,
        visit: &mut dyn FnMut(&DirEntry),
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// File trait for reading and writing open files.
pub trait File {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Read from the current position; returns bytes read (0 at EOF).
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Write at the current position; returns bytes written.
    ///
    /// Fails on files opened read-only.
    fn write(
        &mut self,
        buf: &[u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Seek to an absolute position; returns the new position.
    fn seek(&mut self, pos: u64) -> impl core::future::Future<Output = Result<u64, Self::Error>>;

    /// File size in bytes, as observed when the file was opened.
    fn size(&self) -> u64;
}
