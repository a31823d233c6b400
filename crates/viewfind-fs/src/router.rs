//! Mount router: serves several providers under one virtual namespace.
//!
//! Mount points are matched by longest prefix. With `/Views` and
//! `/Views/Shared` both mounted, `/Views/Shared/_Layout.cshtml` is routed to
//! the `/Views/Shared` mount as `/_Layout.cshtml`.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use viewfind::{Entry, InvalidPathError, StorageProvider, VirtualPath, normalize};

use crate::SharedProvider;

/// Routes lookups to mounted providers.
///
/// Directories leading to a mount point exist even when no provider backs
/// them, so `/Areas` is listable when only `/Areas/Admin/Views` is mounted.
#[derive(Default)]
pub struct MountRouter {
    /// Mount points, keyed by normalized path. Uses BTreeMap for ordered iteration.
    mounts: BTreeMap<VirtualPath, SharedProvider>,
}

impl fmt::Debug for MountRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountRouter")
            .field("mounts", &self.mounts.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MountRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a provider at the given path, replacing any existing mount there.
    pub fn mount(
        &mut self,
        path: &str,
        provider: impl StorageProvider + Send + Sync + 'static,
    ) -> Result<(), InvalidPathError> {
        self.mount_arc(path, Arc::new(provider))
    }

    /// Mount a provider (already wrapped in Arc) at the given path.
    pub fn mount_arc(&mut self, path: &str, provider: SharedProvider) -> Result<(), InvalidPathError> {
        let path = normalize(path)?;
        self.mounts.insert(path, provider);
        Ok(())
    }

    /// Unmount the provider at the given path.
    ///
    /// Returns `true` if a mount was removed.
    pub fn unmount(&mut self, path: &str) -> bool {
        match normalize(path) {
            Ok(path) => self.mounts.remove(&path).is_some(),
            Err(_) => false,
        }
    }

    /// All current mount points, in order.
    pub fn mount_points(&self) -> Vec<&str> {
        self.mounts.keys().map(|p| p.as_str()).collect()
    }

    /// Find the mount for `path` and the path relative to that mount.
    fn find_mount(&self, path: &VirtualPath) -> Option<(&SharedProvider, String)> {
        let (mount, provider) = self
            .mounts
            .iter()
            .filter(|(mount, _)| contains(mount, path))
            .max_by_key(|(mount, _)| mount.len())?;

        let relative = if mount.is_root() {
            path.to_string()
        } else {
            match &path[mount.len()..] {
                "" => "/".to_string(),
                rest => rest.to_string(),
            }
        };
        Some((provider, relative))
    }

    /// Names of the directories below `path` that lead to a mount point.
    fn mount_children(&self, path: &VirtualPath) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for mount in self.mounts.keys() {
            if mount == path || !contains(path, mount) {
                continue;
            }
            let rest = if path.is_root() {
                &mount[1..]
            } else {
                &mount[path.len() + 1..]
            };
            let name = rest.split('/').next().unwrap_or(rest);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// True if `path` is `mount` or lies below it.
fn contains(mount: &VirtualPath, path: &VirtualPath) -> bool {
    if mount.is_root() {
        return true;
    }
    match path.strip_prefix(mount.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

fn normalized(path: &str) -> io::Result<VirtualPath> {
    normalize(path).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
}

impl StorageProvider for MountRouter {
    fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
        let path = normalized(path)?;
        let name = path.file_name().unwrap_or("").to_string();

        if let Some((provider, relative)) = self.find_mount(&path) {
            if let Some(mut entry) = provider.entry(&relative)? {
                // A mount root is named after its mount point
                entry.name = name;
                return Ok(Some(entry));
            }
        }

        if path.is_root() || !self.mount_children(&path).is_empty() {
            return Ok(Some(Entry::directory(name)));
        }
        Ok(None)
    }

    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
        let path = normalized(path)?;
        let listing = match self.find_mount(&path) {
            Some((provider, relative)) => provider.list(&relative)?,
            None => None,
        };

        let children = self.mount_children(&path);
        if children.is_empty() {
            return Ok(listing);
        }

        let mut entries = listing.unwrap_or_default();
        for name in children {
            if !entries.iter().any(|e| e.name == name) {
                entries.push(Entry::directory(name));
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(entries))
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let path = normalized(path)?;
        match self.find_mount(&path) {
            Some((provider, relative)) => provider.read(&relative),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no mount point for path: {}", path),
            )),
        }
    }

    fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        let path = normalized(path)?;
        match self.find_mount(&path) {
            Some((provider, relative)) => provider.canonical_path(&relative),
            None => Ok(None),
        }
    }
}
