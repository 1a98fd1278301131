use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use stencil_common::{BuildOutput, GraphBuilder, LoadError, Stencil};
use thiserror::Error;
use tracing::{debug, info};

use crate::DriverKey;

/// Failures surfaced by the driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// An instruction or stencil document could not be loaded.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
    /// A file could not be read or written.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A document could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The CSV report could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Another thread panicked while holding the registry lock.
    #[error("Host registry lock poisoned")]
    Poisoned,
}

impl DriverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Loads host graphs and stencil files, building each host once.
#[derive(Debug, Clone)]
pub struct Driver {
    registry: Arc<RwLock<HashMap<DriverKey, Arc<BuildOutput>>>>,
    root_path: PathBuf,
}

impl Driver {
    /// A driver resolving relative paths against `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, DriverError> {
        let root = root.as_ref();
        Ok(Self {
            registry: Arc::new(RwLock::new(HashMap::new())),
            root_path: std::fs::canonicalize(root).map_err(|e| DriverError::io(root, e))?,
        })
    }

    /// A driver resolving relative paths against the current directory.
    pub fn new_cwd() -> Result<Self, DriverError> {
        Self::new(".")
    }

    /// The directory relative paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root_path
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root_path.join(path)
        }
    }

    /// Build the host at `path` into the registry unless it is already there.
    pub fn load_host<P: AsRef<Path>>(&self, path: P) -> Result<DriverKey, DriverError> {
        self.get_or_load_host(path).map(|(key, _)| key)
    }

    /// Get a host from the registry, building it if necessary.
    pub fn get_or_load_host<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(DriverKey, Arc<BuildOutput>), DriverError> {
        let key = DriverKey::new(self.absolute(path.as_ref()));

        {
            let registry = self.registry.read().map_err(|_| DriverError::Poisoned)?;
            if let Some(output) = registry.get(&key) {
                debug!("host {} already loaded", key.path().display());
                return Ok((key, output.clone()));
            }
        }

        let records = stencil_common::records::load_records(key.path())?;
        let output = Arc::new(GraphBuilder::build(&records));
        info!(
            "loaded {}: {} vertices, {} edges, {} dangling",
            key.path().display(),
            output.graph.num_vertices(),
            output.graph.num_edges(),
            output.dangling.len()
        );

        {
            let mut registry = self.registry.write().map_err(|_| DriverError::Poisoned)?;
            registry.insert(key.clone(), output.clone());
        }

        Ok((key, output))
    }

    /// Get a host from the registry (`None` if not loaded).
    pub fn get_host(&self, key: &DriverKey) -> Result<Option<Arc<BuildOutput>>, DriverError> {
        let registry = self.registry.read().map_err(|_| DriverError::Poisoned)?;
        Ok(registry.get(key).cloned())
    }

    /// Every currently loaded host.
    pub fn loaded_hosts(&self) -> Result<HashMap<DriverKey, Arc<BuildOutput>>, DriverError> {
        let registry = self.registry.read().map_err(|_| DriverError::Poisoned)?;
        Ok(registry.clone())
    }

    /// Read a stencil document (one stencil or a list).
    pub fn load_stencils<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Stencil>, DriverError> {
        let path = self.absolute(path.as_ref());
        let stencils = stencil_common::stencil::load_stencils(&path)?;
        info!("loaded {} stencils from {}", stencils.len(), path.display());
        Ok(stencils)
    }
}
