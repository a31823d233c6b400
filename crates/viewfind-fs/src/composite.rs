//! Layered provider: several providers stacked over the same namespace.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use viewfind::{Entry, StorageProvider};

use crate::SharedProvider;

/// Stacks providers so earlier layers shadow later ones.
///
/// Lookups return the first layer that has the path. Listings merge every
/// layer that has the directory; when two layers list the same name the
/// earlier layer's entry is kept, in layer order then listing order.
#[derive(Default, Clone)]
pub struct CompositeFs {
    layers: Vec<SharedProvider>,
}

impl fmt::Debug for CompositeFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeFs")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl CompositeFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer below the existing ones.
    pub fn with_layer(mut self, provider: impl StorageProvider + Send + Sync + 'static) -> Self {
        self.layers.push(Arc::new(provider));
        self
    }

    pub fn push(&mut self, provider: SharedProvider) {
        self.layers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl StorageProvider for CompositeFs {
    fn entry(&self, path: &str) -> io::Result<Option<Entry>> {
        for layer in &self.layers {
            if let Some(entry) = layer.entry(path)? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }

    fn list(&self, path: &str) -> io::Result<Option<Vec<Entry>>> {
        let mut merged: Option<Vec<Entry>> = None;
        for layer in &self.layers {
            let Some(entries) = layer.list(path)? else {
                continue;
            };
            let seen = merged.get_or_insert_with(Vec::new);
            for entry in entries {
                if !seen.iter().any(|e| e.name == entry.name) {
                    seen.push(entry);
                }
            }
        }
        Ok(merged)
    }

    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        for layer in &self.layers {
            if layer.entry(path)?.is_some() {
                return layer.read(path);
            }
        }
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not found in any layer: {}", path),
        ))
    }

    fn canonical_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        for layer in &self.layers {
            if layer.entry(path)?.is_some() {
                return layer.canonical_path(path);
            }
        }
        Ok(None)
    }
}
