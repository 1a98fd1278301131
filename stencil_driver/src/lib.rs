//! File-level driver for stencil discovery and application.
//!
//! This crate loads host graphs from instruction-record files (caching each
//! build), reads and writes stencil documents, runs the discover and apply
//! pipelines, and writes their match, annotation and report documents.

pub mod driver;
pub mod key;
pub mod output;
pub mod pipeline;
pub mod render;

pub use driver::{Driver, DriverError};
pub use key::DriverKey;
pub use output::{Annotation, ReportRow};
pub use pipeline::{ApplyOutcome, DiscoverOutcome};
pub use render::{DotRenderer, Renderer};

pub use stencil_common::{BuildOutput, Graph, Stencil};
