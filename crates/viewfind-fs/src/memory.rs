//! In-memory storage provider.
//!
//! Stands in for packaged resources and tests. Entries have no physical
//! location, so every item found here reports its virtual path as its
//! physical path.

use std::collections::HashMap;
use std::io;
use std::sync::{PoisonError, RwLock};

use viewfind::{Entry, StorageProvider};

/// Node in the memory filesystem.
#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8> },
    Directory,
}

/// In-memory filesystem.
///
/// Thread-safe via internal `RwLock`. All data is lost when dropped.
#[derive(Debug)]
pub struct MemoryFs {
    /// Keyed by normalized path without leading `/`; the root is `""`.
    nodes: RwLock<HashMap<String, Node>>,
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFs {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        // Root directory always exists
        nodes.insert(String::new(), Node::Directory);
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Build a filesystem from `(path, contents)` pairs, e.g. a bundle of
    /// resources compiled into the binary.
    pub fn from_files<I, P, D>(files: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = (P, D)>,
        P: AsRef<str>,
        D: AsRef<[u8]>,
    {
        let fs = Self::new();
        for (path, data) in files {
            fs.write(path.as_ref(), data.as_ref())?;
        }
        Ok(fs)
    }

    /// Normalize a path: drop empty segments and `.`, resolve `..` lexically.
    fn normalize(path: &str) -> String {
        let mut segments: Vec<&str> = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        segments.join("/")
    }

    fn parent_of(path: &str) -> Option<&str> {
        if path.is_empty() {
            return None;
        }
        Some(path.rsplit_once('/').map_or("", |(parent, _)| parent))
    }

    fn name_of(path: &str) -> &str {
        path.rsplit_once('/').map_or(path, |(_, name)| name)
    }

    /// Ensure all parent directories exist.
    fn ensure_parents(nodes: &mut HashMap<String, Node>, path: &str) -> io::Result<()> {
        let mut current = Self::parent_of(path);
        let mut missing = Vec::new();
        while let Some(dir) = current {
            match nodes.get(dir) {
                Some(Node::Directory) => break,
                Some(Node::File { .. }) => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("not a directory: /{}", dir),
                    ));
                }
                None => missing.push(dir.to_string()),
            }
            current = Self::parent_of(dir);
        }
        for dir in missing {
            nodes.insert(dir, Node::Directory);
        }
        Ok(())
    }

    /// Write a file, creating parent directories as needed.
    pub fn write(&self, path: &str, data: &[u8]) -> io::Result<()> {
        let normalized = Self::normalize(path);
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);

        // Check we're not overwriting a directory
        if let Some(Node::Directory) = nodes.get(&normalized) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path),
            ));
        }

        Self::ensure_parents(&mut nodes, &normalized)?;
        nodes.insert(
            normalized,
            Node::File {
                data: data.to_vec(),
            },
        );
        Ok(())
    }

    /// Create a directory and any missing parents.
    pub fn mkdir(&self, path: &str) -> io::Result<()> {
        let normalized = Self::normalize(path);
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);

        match nodes.get(&normalized) {
            Some(Node::Directory) => return Ok(()),
            Some(Node::File { .. }) => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("file exists: {}", path),
                ));
            }
            None => {}
        }

        Self::ensure_parents(&mut nodes, &normalized)?;
        nodes.insert(normalized, Node::Directory);
        Ok(())
    }

    /// Remove a file or empty directory.
    pub fn remove(&self, path: &str) -> io::Result<()> {
        let normalized = Self::normalize(path);

        if normalized.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "cannot remove root directory",
            ));
        }

        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(Node::Directory) = nodes.get(&normalized) {
            let has_children = nodes
                .keys()
                .any(|k| Self::parent_of(k) == Some(normalized.as_str()));
            if has_children {
                return Err(io::Error::new(
                    io::ErrorKind::DirectoryNotEmpty,
                    format!("directory not empty: {}", path),
                ));
            }
        }

        nodes.remove(&normalized).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("not found: {}", path))
        })?;
        Ok(())
    }

    fn to_entry(path: &str, node: &Node) -> Entry {
        let name = Self::name_of(path);
        match node {
            Node::File { .. } => Entry::file(name),
            Node::Directory => Entry::directory(name),
        }
    }
}

impl StorageProvider for MemoryFs {
    fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
        let normalized = Self::normalize(path);
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(nodes
            .get(&normalized)
            .map(|node| Self::to_entry(&normalized, node)))
    }

    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
        let normalized = Self::normalize(path);
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);

        match nodes.get(&normalized) {
            Some(Node::Directory) => {}
            Some(Node::File { .. }) | None => return Ok(None),
        }

        let mut entries: Vec<Entry> = nodes
            .iter()
            .filter(|(k, _)| Self::parent_of(k) == Some(normalized.as_str()))
            .map(|(k, node)| Self::to_entry(k, node))
            .collect();

        // Sort for consistent ordering
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(entries))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let normalized = Self::normalize(path);
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);

        match nodes.get(&normalized) {
            Some(Node::File { data }) => Ok(data.clone()),
            Some(Node::Directory) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {}", path),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", path),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfind::EntryKind;

    #[test]
    fn write_and_read() {
        let fs = MemoryFs::new();
        fs.write("/test.cshtml", b"hello world").unwrap();
        assert_eq!(fs.read("/test.cshtml").unwrap(), b"hello world");
    }

    #[test]
    fn read_not_found() {
        let fs = MemoryFs::new();
        let err = fs.read("/nonexistent.cshtml").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn nested_directories() {
        let fs = MemoryFs::new();
        fs.write("/a/b/c/file.cshtml", b"nested").unwrap();

        for dir in ["/a", "/a/b", "/a/b/c"] {
            let entry = fs.entry(dir).unwrap().unwrap();
            assert_eq!(entry.kind, EntryKind::Directory, "{dir}");
        }
        assert_eq!(fs.entry("/a/b/c/file.cshtml").unwrap().unwrap().name, "file.cshtml");
    }

    #[test]
    fn list_directory_sorted() {
        let fs = MemoryFs::new();
        fs.write("/b.cshtml", b"b").unwrap();
        fs.write("/a.cshtml", b"a").unwrap();
        fs.mkdir("/subdir").unwrap();

        let entries = fs.list("/").unwrap().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a.cshtml", "b.cshtml", "subdir"]);
        assert!(entries.iter().all(|e| e.physical_path.is_none()));
    }

    #[test]
    fn list_missing_or_file() {
        let fs = MemoryFs::new();
        fs.write("/a.cshtml", b"a").unwrap();
        assert!(fs.list("/nope").unwrap().is_none());
        assert!(fs.list("/a.cshtml").unwrap().is_none());
    }

    #[test]
    fn entry_missing() {
        let fs = MemoryFs::new();
        assert!(fs.entry("/missing.cshtml").unwrap().is_none());
    }

    #[test]
    fn write_under_file_fails() {
        let fs = MemoryFs::new();
        fs.write("/a", b"file").unwrap();
        let err = fs.write("/a/b.cshtml", b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotADirectory);
    }

    #[test]
    fn remove() {
        let fs = MemoryFs::new();
        fs.write("/dir/file.cshtml", b"data").unwrap();

        let err = fs.remove("/dir").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::DirectoryNotEmpty);

        fs.remove("/dir/file.cshtml").unwrap();
        fs.remove("/dir").unwrap();
        assert!(fs.entry("/dir").unwrap().is_none());
    }

    #[test]
    fn path_normalization() {
        let fs = MemoryFs::new();
        fs.write("/a/b/c.cshtml", b"data").unwrap();

        for path in ["a/b/c.cshtml", "/a/b/c.cshtml", "a/./b/c.cshtml", "a/b/../b/c.cshtml"] {
            assert_eq!(fs.read(path).unwrap(), b"data", "{path}");
        }
    }

    #[test]
    fn from_files() {
        let fs = MemoryFs::from_files([
            ("/Views/Home/Index.cshtml", "index"),
            ("/Views/_ViewImports.cshtml", "imports"),
        ])
        .unwrap();
        assert_eq!(fs.read("/Views/Home/Index.cshtml").unwrap(), b"index");
        assert_eq!(fs.list("/Views").unwrap().unwrap().len(), 2);
    }
}
