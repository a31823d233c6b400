//! viewfind: view discovery over a pluggable storage provider.
//!
//! Provides:
//! - **normalize / join**: Virtual path canonicalization and joining
//! - **StorageProvider**: Minimal read-only backend trait (`entry`, `list`, `read`)
//! - **ContentRoot**: The physical base directory physical paths are reported against
//! - **ProjectEnumerator**: Single-item lookup and lazy recursive enumeration of
//!   every item with a given extension (default `.cshtml`)
//!
//! The enumerator is generic over `StorageProvider`. Backends for memory,
//! local disk, mounts and layering live in `viewfind-fs`.
//!
//! ```ignore
//! use viewfind::{ContentRoot, ProjectEnumerator};
//!
//! let views = ProjectEnumerator::new(provider, ContentRoot::new("/srv/app"));
//! for item in views.enumerate_items("/Views")? {
//!     let item = item?;
//!     println!("{} -> {}", item.file_path(), item.physical_path());
//! }
//! ```

mod enumerator;
mod error;
mod item;
pub mod path;
mod provider;
mod root;

pub use enumerator::{DEFAULT_EXTENSION, EnumerateItems, ProjectEnumerator};
pub use error::{InvalidPathError, ViewfindError};
pub use item::{DiscoveredItem, PhysicalLocation};
pub use path::{VirtualPath, join, normalize, normalize_opt};
pub use provider::{Entry, EntryKind, StorageProvider};
pub use root::{CONTENT_ROOT_ENV, ContentRoot};
