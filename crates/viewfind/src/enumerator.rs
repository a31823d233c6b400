//! Item lookup and lazy recursive enumeration over a [`StorageProvider`].

use std::collections::HashSet;
use std::io;
use std::iter::FusedIterator;
use std::path::PathBuf;

use crate::error::{InvalidPathError, ViewfindError};
use crate::item::{DiscoveredItem, PhysicalLocation};
use crate::path::{SEPARATOR, VirtualPath, has_extension, join, normalize};
use crate::provider::{Entry, EntryKind, StorageProvider};
use crate::root::ContentRoot;

/// Extension enumerated when none is configured.
pub const DEFAULT_EXTENSION: &str = ".cshtml";

/// Upper bound on directories visited by [`ProjectEnumerator::hierarchical_items`].
const MAX_HIERARCHY_DEPTH: usize = 255;

/// Finds items by virtual path and enumerates items with a fixed extension.
#[derive(Debug, Clone)]
pub struct ProjectEnumerator<P> {
    provider: P,
    root: ContentRoot,
    extension: String,
    follow_symlinks: bool,
}

impl<P: StorageProvider> ProjectEnumerator<P> {
    pub fn new(provider: P, root: ContentRoot) -> Self {
        Self {
            provider,
            root,
            extension: DEFAULT_EXTENSION.to_string(),
            follow_symlinks: true,
        }
    }

    /// Enumerate a different extension. A missing leading dot is added.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = if extension.starts_with('.') {
            extension
        } else {
            format!(".{}", extension)
        };
        self
    }

    /// Whether enumeration descends into directory symlinks (default: true).
    ///
    /// Followed links are guarded against cycles: a link whose canonical
    /// target was already walked is skipped.
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn follows_symlinks(&self) -> bool {
        self.follow_symlinks
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn content_root(&self) -> &ContentRoot {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Look up a single item.
    ///
    /// A missing item is not an error: it comes back with `exists() == false`
    /// and its virtual path as the physical path.
    pub fn get_item(&self, path: &str) -> Result<DiscoveredItem, ViewfindError> {
        let path = normalize(path)?;
        self.lookup(path)
    }

    fn lookup(&self, path: VirtualPath) -> Result<DiscoveredItem, ViewfindError> {
        let item = match self.provider.entry(&path)? {
            Some(entry) => {
                let location = PhysicalLocation::resolve(entry.physical_path(), &self.root);
                DiscoveredItem::new("", path.into_string(), location, true)
            }
            None => DiscoveredItem::new("", path.into_string(), PhysicalLocation::Virtual, false),
        };
        Ok(item)
    }

    /// Lazily enumerate matching items at any depth below `path`.
    ///
    /// The path is validated before this returns; the provider is not
    /// touched until the iterator is first advanced. A missing directory
    /// yields nothing. Directory symlinks are followed unless disabled with
    /// [`with_follow_symlinks`](Self::with_follow_symlinks).
    pub fn enumerate_items(&self, path: &str) -> Result<EnumerateItems<'_, P>, ViewfindError> {
        let base = normalize(path)?;
        tracing::debug!(base = %base, extension = %self.extension, "enumerating items");
        Ok(EnumerateItems {
            enumerator: self,
            base_path: base.into_string(),
            stack: Vec::new(),
            visited: HashSet::new(),
            started: false,
        })
    }

    /// Eagerly collect [`enumerate_items`](Self::enumerate_items), stopping at
    /// the first provider error.
    pub fn collect_items(&self, path: &str) -> Result<Vec<DiscoveredItem>, ViewfindError> {
        let items = self.enumerate_items(path)?.collect::<io::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Look up `file_name` in the directory containing `path` and in every
    /// ancestor directory down to `base_path`, deepest first.
    ///
    /// Used for per-directory companion files such as `_ViewImports.cshtml`.
    /// Every candidate is returned, existing or not.
    pub fn hierarchical_items(
        &self,
        base_path: &str,
        path: &str,
        file_name: &str,
    ) -> Result<Vec<DiscoveredItem>, ViewfindError> {
        let base = normalize(base_path)?;
        let path = normalize(path)?;
        if file_name.is_empty() {
            return Err(InvalidPathError::Empty.into());
        }

        if path.is_root() || !is_under(&path, &base) {
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        let mut index = path.len();
        while items.len() < MAX_HIERARCHY_DEPTH && index > base.len() {
            let Some(slash) = path[..index].rfind(SEPARATOR) else {
                break;
            };
            index = slash;
            let candidate = normalize(&format!("{}{}", &path[..=slash], file_name))?;
            items.push(self.lookup(candidate)?);
        }
        Ok(items)
    }

    /// Read the raw bytes of an existing item.
    pub fn read_item(&self, item: &DiscoveredItem) -> io::Result<Vec<u8>> {
        if !item.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("not found: {}", item.file_path()),
            ));
        }
        self.provider.read(item.file_path())
    }

    fn matched(&self, base_path: &str, relative: &str, entry: &Entry) -> DiscoveredItem {
        let location = PhysicalLocation::resolve(entry.physical_path(), &self.root);
        DiscoveredItem::new(base_path, join(base_path, relative), location, true)
    }
}

fn is_under(path: &VirtualPath, base: &VirtualPath) -> bool {
    if base.is_root() {
        return true;
    }
    match path.strip_prefix(base.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
        None => false,
    }
}

/// One directory being walked: its remaining entries and its path below the base.
struct Frame {
    entries: std::vec::IntoIter<Entry>,
    prefix: String,
}

/// Lazy depth-first iterator returned by [`ProjectEnumerator::enumerate_items`].
///
/// Directories are descended as soon as they are reached, so their matches
/// come before later siblings. Provider listing order is kept as is. After a
/// provider error the error is yielded once and the iterator ends.
///
/// Laziness is per directory: a directory is listed only when the walk
/// reaches it, but each listing is fetched whole and held until its entries
/// are consumed, so memory grows with the width of the open directories
/// along the current branch.
pub struct EnumerateItems<'a, P> {
    enumerator: &'a ProjectEnumerator<P>,
    base_path: String,
    stack: Vec<Frame>,
    /// Canonical targets already walked, for symlink cycle detection.
    visited: HashSet<PathBuf>,
    started: bool,
}

impl<P> EnumerateItems<'_, P> {
    /// The normalized directory enumeration started from.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl<P: StorageProvider> EnumerateItems<'_, P> {
    fn start(&mut self) -> io::Result<()> {
        let provider = &self.enumerator.provider;
        let Some(entries) = provider.list(&self.base_path)? else {
            tracing::debug!(base = %self.base_path, "enumeration root does not exist");
            return Ok(());
        };
        if self.enumerator.follow_symlinks {
            if let Some(root) = provider.canonical_path(&self.base_path)? {
                self.visited.insert(root);
            }
        }
        self.stack.push(Frame {
            entries: entries.into_iter(),
            prefix: String::new(),
        });
        Ok(())
    }

    /// Push the listing of the directory at `relative` below the base.
    fn descend(&mut self, relative: String) -> io::Result<()> {
        let dir = join(&self.base_path, &relative);
        match self.enumerator.provider.list(&dir)? {
            Some(children) => self.stack.push(Frame {
                entries: children.into_iter(),
                prefix: relative,
            }),
            None => tracing::debug!(path = %dir, "skipping missing directory"),
        }
        Ok(())
    }

    fn descend_link(&mut self, relative: String) -> io::Result<()> {
        let link = join(&self.base_path, &relative);
        if !self.enumerator.follow_symlinks {
            tracing::debug!(path = %link, "skipping symlink");
            return Ok(());
        }
        let Some(target) = self.enumerator.provider.canonical_path(&link)? else {
            tracing::debug!(path = %link, "skipping symlink with unresolvable target");
            return Ok(());
        };
        if !self.visited.insert(target) {
            tracing::warn!(path = %link, "symlink cycle detected, not descending");
            return Ok(());
        }
        self.descend(relative)
    }
}

impl<P: StorageProvider> Iterator for EnumerateItems<'_, P> {
    type Item = io::Result<DiscoveredItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            if let Err(err) = self.start() {
                return Some(Err(err));
            }
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some(entry) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };
            let relative = join(&frame.prefix, &entry.name);

            let descended = match entry.kind {
                EntryKind::Directory => self.descend(relative),
                EntryKind::Symlink => self.descend_link(relative),
                EntryKind::File => {
                    if !has_extension(&entry.name, &self.enumerator.extension) {
                        continue;
                    }
                    let item = self.enumerator.matched(&self.base_path, &relative, &entry);
                    tracing::trace!(path = %item.file_path(), "matched item");
                    return Some(Ok(item));
                }
            };
            if let Err(err) = descended {
                self.stack.clear();
                return Some(Err(err));
            }
        }
    }
}

impl<P: StorageProvider> FusedIterator for EnumerateItems<'_, P> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Provider that answers from a fixed table of listings, in table order.
    #[derive(Default)]
    struct TableProvider {
        listings: HashMap<String, Vec<Entry>>,
        canonical: HashMap<String, PathBuf>,
    }

    impl TableProvider {
        fn dir(mut self, path: &str, entries: Vec<Entry>) -> Self {
            self.listings.insert(path.to_string(), entries);
            self
        }

        fn real(mut self, path: &str, target: &str) -> Self {
            self.canonical.insert(path.to_string(), PathBuf::from(target));
            self
        }
    }

    impl StorageProvider for TableProvider {
        fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
            let (parent, name) = path.rsplit_once('/').unwrap_or(("", path));
            let parent = if parent.is_empty() { "/" } else { parent };
            Ok(self
                .listings
                .get(parent)
                .and_then(|entries| entries.iter().find(|e| e.name == name).cloned()))
        }

        fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
            Ok(self.listings.get(path).cloned())
        }

        fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
            Ok(self.canonical.get(path).cloned())
        }
    }

    fn enumerator(provider: TableProvider) -> ProjectEnumerator<TableProvider> {
        ProjectEnumerator::new(provider, ContentRoot::new("/app")).with_extension(".ext")
    }

    fn paths(enumerator: &ProjectEnumerator<TableProvider>, base: &str) -> Vec<String> {
        enumerator
            .enumerate_items(base)
            .unwrap()
            .map(|item| item.unwrap().file_path().to_string())
            .collect()
    }

    #[test]
    fn extension_gets_leading_dot() {
        let e = ProjectEnumerator::new(TableProvider::default(), ContentRoot::new("/")).with_extension("ext");
        assert_eq!(e.extension(), ".ext");
        let e = ProjectEnumerator::new(TableProvider::default(), ContentRoot::new("/"));
        assert_eq!(e.extension(), DEFAULT_EXTENSION);
    }

    #[test]
    fn get_item_physical_path_relative_to_root() {
        let provider = TableProvider::default().dir(
            "/",
            vec![Entry::file("a.ext").with_physical_path(PathBuf::from("/app/views/a.ext"))],
        );
        let item = enumerator(provider).get_item("a.ext").unwrap();
        assert!(item.exists());
        assert_eq!(item.base_path(), "");
        assert_eq!(item.file_path(), "/a.ext");
        assert_eq!(item.physical_path(), "views/a.ext");
    }

    #[test]
    fn listing_order_is_preserved() {
        let provider = TableProvider::default()
            .dir("/", vec![Entry::file("z.ext"), Entry::directory("m"), Entry::file("a.ext")])
            .dir("/m", vec![Entry::file("c.ext")]);
        assert_eq!(paths(&enumerator(provider), "/"), ["/z.ext", "/m/c.ext", "/a.ext"]);
    }

    fn linked() -> TableProvider {
        TableProvider::default()
            .dir("/", vec![Entry::symlink("shared"), Entry::directory("home"), Entry::file("a.ext")])
            .dir("/shared", vec![Entry::file("b.ext"), Entry::symlink("up")])
            .dir("/shared/up", vec![Entry::file("never.ext")])
            .dir("/home", vec![Entry::symlink("again")])
            .dir("/home/again", vec![Entry::file("twice.ext")])
            .real("/", "/app/views")
            .real("/shared", "/app/shared")
            .real("/shared/up", "/app/views")
            .real("/home/again", "/app/shared")
    }

    #[test]
    fn symlinks_are_followed_once_per_target() {
        assert_eq!(paths(&enumerator(linked()), "/"), ["/shared/b.ext", "/a.ext"]);
    }

    #[test]
    fn symlinks_are_skipped_when_following_is_off() {
        let e = enumerator(linked()).with_follow_symlinks(false);
        assert!(!e.follows_symlinks());
        assert_eq!(paths(&e, "/"), ["/a.ext"]);
    }

    #[test]
    fn symlink_without_canonical_target_is_skipped() {
        let provider = TableProvider::default()
            .dir("/", vec![Entry::symlink("loop"), Entry::file("a.ext")])
            .dir("/loop", vec![Entry::file("b.ext")]);
        assert_eq!(paths(&enumerator(provider), "/"), ["/a.ext"]);
    }

    #[test]
    fn missing_subdirectory_listing_is_skipped() {
        let provider = TableProvider::default().dir("/", vec![Entry::directory("gone"), Entry::file("a.ext")]);
        assert_eq!(paths(&enumerator(provider), "/"), ["/a.ext"]);
    }

    #[test]
    fn is_under_respects_segment_boundaries() {
        let base = normalize("/Views").unwrap();
        assert!(is_under(&normalize("/Views/a").unwrap(), &base));
        assert!(is_under(&normalize("/Views").unwrap(), &base));
        assert!(!is_under(&normalize("/ViewsOther/a").unwrap(), &base));
        assert!(is_under(&normalize("/x").unwrap(), &VirtualPath::root()));
    }
}
