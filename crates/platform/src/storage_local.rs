//! Local filesystem Storage implementation for host builds.
//!
//! `LocalFileStorage` implements [`Storage`] using `std::fs`. Used by
//! the xtask tooling and by every host-side test. All paths are
//! resolved relative to the volume root provided at construction, so
//! `"/book.txt"` on the device maps to `{root}/book.txt` on the host.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::storage::{DirEntry, File, Storage, MAX_NAME_LEN};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub struct LocalStorageError(pub std::io::Error);

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "local storage error: {}", self.0)
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut self.inner, buf).map_err(LocalStorageError)
    }

    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Write::write(&mut self.inner, buf).map_err(LocalStorageError)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        Seek::seek(&mut self.inner, SeekFrom::Start(pos)).map_err(LocalStorageError)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A [`Storage`] implementation backed by `std::fs`.
///
/// Paths are resolved relative to the volume root given at
/// construction; a leading `/` is stripped first so device-absolute
/// paths work unchanged.
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a new storage rooted at `volume_root`.
    #[must_use]
    pub fn new(volume_root: &str) -> Self {
        Self {
            root: PathBuf::from(volume_root),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;
    type File = LocalFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = fs::File::open(&full).map_err(LocalStorageError)?;
        let meta = file.metadata().map_err(LocalStorageError)?;
        Ok(LocalFile {
            inner: file,
            size: meta.len(),
        })
    }

    async fn create_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = fs::File::create(&full).map_err(LocalStorageError)?;
        Ok(LocalFile {
            inner: file,
            size: 0,
        })
    }

    async fn edit_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&full)
            .map_err(LocalStorageError)?;
        let meta = file.metadata().map_err(LocalStorageError)?;
        Ok(LocalFile {
            inner: file,
            size: meta.len(),
        })
    }

    async fn remove_file(&mut self, path: &str) -> Result<(), Self::Error> {
        fs::remove_file(self.resolve(path)).map_err(LocalStorageError)
    }

    async fn make_dir(&mut self, path: &str) -> Result<(), Self::Error> {
        let full = self.resolve(path);
        match fs::create_dir(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(LocalStorageError(e)),
        }
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.resolve(path).exists())
    }

    async fn list_dir(
        &mut self,
        path: &str,
        visit: &mut dyn FnMut(&DirEntry),
    ) -> Result<(), Self::Error> {
        let full = self.resolve(path);
        for entry in fs::read_dir(&full).map_err(LocalStorageError)? {
            let entry = entry.map_err(LocalStorageError)?;
            let meta = entry.metadata().map_err(LocalStorageError)?;
            let raw = entry.file_name();
            let Some(name) = raw.to_str() else {
                continue; // non-UTF-8 names are invisible to the reader
            };
            let dir_entry = DirEntry {
                name: truncate_name(name),
                size: meta.len(),
                is_dir: meta.is_dir(),
            };
            visit(&dir_entry);
        }
        Ok(())
    }
}

/// Copy `name` into a bounded string, truncating at a char boundary.
fn truncate_name(name: &str) -> heapless::String<MAX_NAME_LEN> {
    let mut out = heapless::String::new();
    for ch in name.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
