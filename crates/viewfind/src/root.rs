//! Content root: the physical directory physical paths are reported against.

use std::ffi::OsString;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Environment variable consulted by [`ContentRoot::from_env`].
pub const CONTENT_ROOT_ENV: &str = "VIEWFIND_CONTENT_ROOT";

/// Absolute base directory of the hosting application.
///
/// Fixed once built. Only used to turn an entry's physical location into a
/// path relative to the root, by stripping the root and one separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRoot {
    path: PathBuf,
    /// `path` as text with trailing separators trimmed (`/` becomes `""`).
    prefix: String,
}

impl ContentRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let prefix = path
            .to_string_lossy()
            .trim_end_matches(is_separator)
            .to_string();
        Self { path, prefix }
    }

    /// Read the root from `VIEWFIND_CONTENT_ROOT`, falling back to the current
    /// directory. A relative value is taken relative to the current directory.
    pub fn from_env() -> io::Result<Self> {
        Self::resolve(std::env::var_os(CONTENT_ROOT_ENV), std::env::current_dir)
    }

    fn resolve(
        configured: Option<OsString>,
        cwd: impl FnOnce() -> io::Result<PathBuf>,
    ) -> io::Result<Self> {
        match configured.filter(|v| !v.is_empty()).map(PathBuf::from) {
            Some(path) if path.is_absolute() => Ok(Self::new(path)),
            Some(path) => Ok(Self::new(cwd()?.join(path))),
            None => Ok(Self::new(cwd()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Express `physical` relative to this root.
    ///
    /// Returns `None` when `physical` is not below the root, when nothing
    /// is left after stripping, or when the location is not valid UTF-8.
    pub fn relativize(&self, physical: &Path) -> Option<String> {
        let physical = physical.to_str()?;
        let rest = physical.strip_prefix(self.prefix.as_str())?;

        let mut chars = rest.chars();
        if !chars.next().is_some_and(is_separator) {
            return None;
        }
        let rest = chars.as_str();
        if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        }
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}
