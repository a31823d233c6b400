//! Configuration for assembling a view enumerator.
//!
//! Configuration is loaded from `~/.config/viewfind/viewfind.toml`:
//!
//! ```toml
//! content_root = "/srv/app"
//! extension = ".cshtml"
//!
//! [[mounts]]
//! path = "/"
//! root = "Views"
//!
//! [[mounts]]
//! path = "/Areas/Admin"
//! root = "/opt/admin/Views"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use viewfind::{ContentRoot, DEFAULT_EXTENSION, ProjectEnumerator};

use crate::{LocalFs, MountRouter};

/// Configuration for a view enumerator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewfindConfig {
    /// Content root. Relative values are taken from the current directory.
    /// Unset falls back to `VIEWFIND_CONTENT_ROOT`, then the current directory.
    #[serde(default)]
    pub content_root: Option<PathBuf>,

    /// Extension of the items to enumerate.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Directories to serve. Empty means the content root itself, at `/`.
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

/// A directory on disk served at a virtual path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Virtual mount point (e.g., "/Areas/Admin").
    pub path: String,

    /// Directory on disk, relative to the content root unless absolute.
    pub root: PathBuf,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for ViewfindConfig {
    fn default() -> Self {
        Self {
            content_root: None,
            extension: default_extension(),
            mounts: Vec::new(),
        }
    }
}

impl ViewfindConfig {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "viewfind")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("viewfind.toml"))
    }

    /// Resolve the content root.
    pub fn content_root(&self) -> Result<ContentRoot> {
        match &self.content_root {
            Some(root) if root.is_absolute() => Ok(ContentRoot::new(root)),
            Some(root) => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                Ok(ContentRoot::new(cwd.join(root)))
            }
            None => ContentRoot::from_env().context("Failed to determine content root"),
        }
    }

    /// Build the mount router described by `mounts`.
    pub fn build_provider(&self) -> Result<MountRouter> {
        let root = self.content_root()?;
        self.build_provider_at(&root)
    }

    fn build_provider_at(&self, content_root: &ContentRoot) -> Result<MountRouter> {
        let mut router = MountRouter::new();

        if self.mounts.is_empty() {
            router
                .mount("/", LocalFs::new(content_root.path()))
                .context("Failed to mount content root")?;
            return Ok(router);
        }

        for mount in &self.mounts {
            let dir = content_root.path().join(&mount.root);
            if !dir.is_dir() {
                tracing::warn!(path = %mount.path, root = %dir.display(), "Mount root is not a directory");
            }
            router
                .mount(&mount.path, LocalFs::new(dir))
                .with_context(|| format!("Invalid mount path {:?}", mount.path))?;
        }
        Ok(router)
    }

    /// Build an enumerator over the configured mounts.
    pub fn build_enumerator(&self) -> Result<ProjectEnumerator<MountRouter>> {
        let root = self.content_root()?;
        let provider = self.build_provider_at(&root)?;
        tracing::debug!(
            content_root = %root.path().display(),
            mounts = ?provider.mount_points(),
            "Built view enumerator"
        );
        Ok(ProjectEnumerator::new(provider, root).with_extension(self.extension.clone()))
    }
}
