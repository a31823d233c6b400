//! Discovered item records.

use std::path::{Path, PathBuf};

use crate::path::{SEPARATOR, extension};
use crate::root::ContentRoot;

/// Where a discovered item lives on disk, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhysicalLocation {
    /// A real file below the content root.
    ContentRelative {
        /// Location relative to the content root, without a leading separator.
        relative: String,
        absolute: PathBuf,
    },
    /// A real file that could not be expressed relative to the content root.
    Unrooted(PathBuf),
    /// No on-disk backing: an in-memory or packaged resource, or a missing item.
    Virtual,
}

impl PhysicalLocation {
    /// Classify a provider's physical hint against the content root.
    pub fn resolve(physical: Option<&Path>, root: &ContentRoot) -> Self {
        match physical {
            None => PhysicalLocation::Virtual,
            Some(absolute) => match root.relativize(absolute) {
                Some(relative) => PhysicalLocation::ContentRelative {
                    relative,
                    absolute: absolute.to_path_buf(),
                },
                None => PhysicalLocation::Unrooted(absolute.to_path_buf()),
            },
        }
    }
}

/// A single lookup or enumeration result.
///
/// Holds no reference back to the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredItem {
    base_path: String,
    file_path: String,
    location: PhysicalLocation,
    exists: bool,
}

impl DiscoveredItem {
    pub fn new(
        base_path: impl Into<String>,
        file_path: impl Into<String>,
        location: PhysicalLocation,
        exists: bool,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            file_path: file_path.into(),
            location,
            exists,
        }
    }

    /// Enumeration root this item was found under; empty for single lookups.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Full virtual path of the item.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// The item's path below [`base_path`](Self::base_path), with a leading `/`.
    pub fn relative_path(&self) -> &str {
        if self.base_path.len() <= 1 {
            return &self.file_path;
        }
        match self.file_path.strip_prefix(self.base_path.as_str()) {
            Some(rest) if rest.starts_with(SEPARATOR) => rest,
            _ => self.file_path.as_str(),
        }
    }

    /// Physical path relative to the content root, or the virtual path when
    /// the item has no resolvable on-disk location.
    pub fn physical_path(&self) -> &str {
        match &self.location {
            PhysicalLocation::ContentRelative { relative, .. } => relative.as_str(),
            PhysicalLocation::Unrooted(_) | PhysicalLocation::Virtual => self.file_path.as_str(),
        }
    }

    /// Absolute on-disk location, if the backing entry has one.
    pub fn absolute_physical_path(&self) -> Option<&Path> {
        match &self.location {
            PhysicalLocation::ContentRelative { absolute, .. } => Some(absolute.as_path()),
            PhysicalLocation::Unrooted(absolute) => Some(absolute.as_path()),
            PhysicalLocation::Virtual => None,
        }
    }

    pub fn location(&self) -> &PhysicalLocation {
        &self.location
    }

    /// Whether the backing entry was found. Check before using the item as content.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or(&self.file_path)
    }

    /// Extension of the file name, including the dot.
    pub fn extension(&self) -> Option<&str> {
        extension(self.file_name())
    }

    /// `file_path` with the extension removed.
    pub fn file_path_without_extension(&self) -> &str {
        match self.extension() {
            Some(ext) => &self.file_path[..self.file_path.len() - ext.len()],
            None => self.file_path.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(base: &str, file: &str) -> DiscoveredItem {
        DiscoveredItem::new(base, file, PhysicalLocation::Virtual, true)
    }

    #[test]
    fn virtual_item_falls_back_to_file_path() {
        let item = item("", "/Views/Index.cshtml");
        assert_eq!(item.physical_path(), "/Views/Index.cshtml");
        assert_eq!(item.absolute_physical_path(), None);
    }

    #[test]
    fn content_relative_location() {
        let root = ContentRoot::new("/app");
        let location = PhysicalLocation::resolve(Some(Path::new("/app/views/a.ext")), &root);
        let item = DiscoveredItem::new("", "/a.ext", location, true);
        assert_eq!(item.physical_path(), "views/a.ext");
        assert_eq!(item.absolute_physical_path(), Some(Path::new("/app/views/a.ext")));
    }

    #[test]
    fn unrooted_location_falls_back() {
        let root = ContentRoot::new("/app");
        let location = PhysicalLocation::resolve(Some(Path::new("/elsewhere/a.ext")), &root);
        assert_eq!(location, PhysicalLocation::Unrooted(PathBuf::from("/elsewhere/a.ext")));
        let item = DiscoveredItem::new("", "/a.ext", location, true);
        assert_eq!(item.physical_path(), "/a.ext");
    }

    #[test]
    fn relative_path_strips_base() {
        assert_eq!(item("/views", "/views/home/a.ext").relative_path(), "/home/a.ext");
        assert_eq!(item("/", "/a.ext").relative_path(), "/a.ext");
        assert_eq!(item("", "/a.ext").relative_path(), "/a.ext");
    }

    #[test]
    fn name_accessors() {
        let item = item("", "/Views/Home/Index.cshtml");
        assert_eq!(item.file_name(), "Index.cshtml");
        assert_eq!(item.extension(), Some(".cshtml"));
        assert_eq!(item.file_path_without_extension(), "/Views/Home/Index");
    }
}
