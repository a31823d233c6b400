//! Local filesystem backend.
//!
//! Maps virtual paths onto a directory on disk and reports each entry's real
//! location, so items found here get a physical path relative to the
//! content root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use viewfind::{Entry, EntryKind, StorageProvider};

/// Local filesystem backend.
///
/// All operations are relative to `root`. For example, if `root` is
/// `/srv/app/Views`, then the virtual path `/Home/Index.cshtml` maps to
/// `/srv/app/Views/Home/Index.cshtml`.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Create a new local filesystem rooted at the given path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a virtual path to a location under the root without
    /// following symlinks.
    ///
    /// `.` and `..` are resolved lexically; a path that climbs above the
    /// root is rejected with `PermissionDenied`.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let path = Path::new(path.trim_start_matches('/'));

        let mut resolved = self.root.clone();
        let mut depth = 0usize;
        for component in path.components() {
            match component {
                Component::ParentDir => {
                    if depth == 0 {
                        return Err(io::Error::new(
                            io::ErrorKind::PermissionDenied,
                            format!("path escapes root: {}", path.display()),
                        ));
                    }
                    resolved.pop();
                    depth -= 1;
                }
                Component::Normal(c) => {
                    resolved.push(c);
                    depth += 1;
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        Ok(resolved)
    }

    /// Map `std::fs` metadata to an entry kind. Symlinks to directories are
    /// reported as [`EntryKind::Symlink`] so the enumerator can check them for
    /// cycles before descending; symlinks to files behave as files.
    fn kind_of(full_path: &Path) -> io::Result<EntryKind> {
        let meta = fs::symlink_metadata(full_path)?;
        let file_type = meta.file_type();
        if file_type.is_symlink() {
            match fs::metadata(full_path) {
                Ok(target) if target.is_dir() => Ok(EntryKind::Symlink),
                // Dangling links and links to files
                _ => Ok(EntryKind::File),
            }
        } else if file_type.is_dir() {
            Ok(EntryKind::Directory)
        } else {
            // Special files (sockets, pipes, devices) → File.
            Ok(EntryKind::File)
        }
    }

    fn entry_at(full_path: PathBuf, name: String) -> io::Result<Entry> {
        let kind = Self::kind_of(&full_path)?;
        Ok(Entry {
            name,
            kind,
            physical_path: Some(full_path),
        })
    }
}

/// `NotFound` and `NotADirectory` are absence, everything else is a real error.
fn absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

impl StorageProvider for LocalFs {
    fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
        let full_path = self.resolve(path)?;
        let name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "/".to_string());

        match Self::entry_at(full_path, name) {
            Ok(entry) => Ok(Some(entry)),
            Err(err) if absent(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
        let full_path = self.resolve(path)?;
        let dir = match fs::read_dir(&full_path) {
            Ok(dir) => dir,
            Err(err) if absent(&err) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            match Self::entry_at(entry.path(), name) {
                Ok(entry) => entries.push(entry),
                // Removed between read_dir and stat
                Err(err) if absent(&err) => {
                    tracing::trace!(path = %entry.path().display(), "entry vanished during listing");
                }
                Err(err) => return Err(err),
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(entries))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path)
    }

    fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        let full_path = self.resolve(path)?;
        match fs::canonicalize(&full_path) {
            Ok(canonical) => Ok(Some(canonical)),
            Err(err) if absent(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
