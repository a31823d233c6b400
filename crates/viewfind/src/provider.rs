//! Storage provider trait and entry types.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Kind of entry reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// A link to a directory. Enumeration descends into it when the
    /// provider can resolve its target with
    /// [`StorageProvider::canonical_path`].
    Symlink,
}

/// A single entry as seen by a storage provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Name of the entry (not full path).
    pub name: String,
    /// Kind of entry.
    pub kind: EntryKind,
    /// Location on the real filesystem, if the entry has one.
    pub physical_path: Option<PathBuf>,
}

impl Entry {
    /// Create a file entry with no physical backing.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            physical_path: None,
        }
    }

    /// Create a directory entry with no physical backing.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            physical_path: None,
        }
    }

    /// Create a symlink entry.
    pub fn symlink(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Symlink,
            physical_path: None,
        }
    }

    /// Attach a physical location.
    pub fn with_physical_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.physical_path = Some(path.into());
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn physical_path(&self) -> Option<&Path> {
        self.physical_path.as_deref()
    }
}

/// Read-only storage backend consumed by the enumerator.
///
/// Paths handed to a provider are normalized virtual paths: they start with
/// `/` and never end with one (except the root). `Ok(None)` means the path
/// does not exist; for [`list`](Self::list) it also covers "exists but is not
/// a directory". Any `Err` is the provider's own and is passed to callers
/// unchanged.
pub trait StorageProvider {
    /// Look up a single entry.
    fn entry(&self, path: &str) -> io::Result<Option<Entry>>;

    /// List the direct children of a directory, in provider order.
    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>>;

    /// Read the raw contents of a file.
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let _ = path;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "reading not supported by this provider",
        ))
    }

    /// Canonical location of `path` on the real filesystem, with every
    /// symlink resolved.
    ///
    /// Enumeration uses this to tell whether a directory symlink leads back
    /// into a directory it has already walked. Providers without real
    /// backing return `Ok(None)`, and their symlinks are not descended.
    fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        let _ = path;
        Ok(None)
    }
}

impl<P: StorageProvider + ?Sized> StorageProvider for &P {
    fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
        (**self).entry(path)
    }

    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
        (**self).list(path)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        (**self).canonical_path(path)
    }
}

impl<P: StorageProvider + ?Sized> StorageProvider for Box<P> {
    fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
        (**self).entry(path)
    }

    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
        (**self).list(path)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        (**self).canonical_path(path)
    }
}

impl<P: StorageProvider + ?Sized> StorageProvider for Arc<P> {
    fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
        (**self).entry(path)
    }

    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
        (**self).list(path)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        (**self).read(path)
    }

    fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        (**self).canonical_path(path)
    }
}
