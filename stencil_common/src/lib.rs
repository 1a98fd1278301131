//! Common types shared across the stencil workspace.
//!
//! This crate owns the data-flow graph model, its structural index, the
//! instruction-record loader and graph builder, stencil documents, search
//! configuration, and the fixtures used by tests across the workspace.

pub mod builder;
mod config;
mod error;
pub mod graph;
pub mod index;
pub mod records;
pub mod stencil;
mod test_cases;

pub use crate::builder::{BuildOutput, GraphBuilder};
pub use crate::config::*;
pub use crate::error::LoadError;
pub use crate::graph::{Edge, Graph, Vertex, is_synthetic_opcode};
pub use crate::index::graph_index::{GraphIndex, NodeIndex};
pub use crate::records::{InstructionRecord, Operand};
pub use crate::stencil::{Stencil, StencilRecord};
pub use crate::test_cases::*;
