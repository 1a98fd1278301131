//! Errors raised while loading instruction records and stencil documents.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn an input document into a graph or a stencil.
///
/// Loading is all-or-nothing: when any record is rejected no partial graph
/// is handed back.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The instruction document is not a list of records.
    #[error("Expected a list of instruction records, found {0}")]
    NotAList(&'static str),

    /// An instruction record is missing a required field or has the wrong shape.
    #[error("Malformed instruction record #{index} (pointer {pointer}): {reason}")]
    MalformedRecord {
        /// Position of the record in the input list.
        index: usize,
        /// The record's pointer, or `<unknown>` when the pointer itself is missing.
        pointer: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A stencil document is structurally invalid.
    #[error("Malformed stencil '{name}': {reason}")]
    MalformedStencil {
        /// Name of the offending stencil.
        name: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl LoadError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed-stencil error.
    pub fn stencil(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedStencil {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
