//! viewfind-fs: storage backends and configuration for viewfind.
//!
//! Backends implementing [`viewfind::StorageProvider`]:
//!
//! - **MemoryFs**: In-memory tree (packaged resources, tests)
//! - **LocalFs**: Real filesystem access, reports physical locations
//! - **MountRouter**: Serves providers at virtual mount points
//! - **CompositeFs**: Layers providers, earlier layers shadow later ones
//!
//! # Design
//!
//! A typical application serves its own views from disk and falls back to
//! views packaged with a library:
//!
//! ```text
//! /                        # MountRouter
//! ├── /                    # CompositeFs [LocalFs(app/Views), MemoryFs(packaged)]
//! └── /Areas/Admin/        # LocalFs(admin/Views)
//! ```
//!
//! [`ViewfindConfig`] builds the disk-backed part of such a tree from TOML.

mod composite;
mod config;
mod local;
mod memory;
mod router;

use std::sync::Arc;

use viewfind::StorageProvider;

pub use composite::CompositeFs;
pub use config::{MountConfig, ViewfindConfig};
pub use local::LocalFs;
pub use memory::MemoryFs;
pub use router::MountRouter;

/// A provider shared between routers, layers and enumerators.
pub type SharedProvider = Arc<dyn StorageProvider + Send + Sync>;
