//! Cache keys for loaded host graphs.
//!
//! A `DriverKey` identifies a host by the absolute path of its instruction
//! file. Keys index the driver's registry so that a file is built once.

use std::path::{Path, PathBuf};

use contracts::requires;

/// Unique identifier for a loaded host graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DriverKey {
    /// Absolute path to the instruction-record file.
    pub path: PathBuf,
}

impl DriverKey {
    /// Creates a new key.
    #[requires(!path.as_ref().as_os_str().is_empty())]
    pub fn new<P>(path: P) -> Self
    where
        P: AsRef<Path> + Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    /// Returns the instruction file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
