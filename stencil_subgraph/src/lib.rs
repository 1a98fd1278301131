//! Stencil search over data-flow graphs.
//!
//! The crate is organized around one matching engine and the analyses built
//! on it:
//!
//! - [`matcher`]: every occurrence of a stencil in a host (monomorphism or
//!   induced), plus isomorphism and containment tests.
//! - [`canonical`]: isomorphism-invariant stencil names.
//! - [`enumerate`]: discovery of every connected stencil in an edge-count range.
//! - [`select`], [`optimize`], [`coverage`]: exclusive matches, the best
//!   combination of stencils, and how much of a host a stencil list consumes.
//!
//! Exponential searches run under the [`stencil_common::Budget`] in the
//! configuration and report a [`BudgetExceeded`] reason next to partial
//! results.

pub mod assignment;
pub mod budget;
pub mod canonical;
pub mod coverage;
pub mod enumerate;
mod heuristics;
pub mod match_;
pub mod matcher;
pub mod optimize;
mod profiling;
pub mod select;
pub mod test_harness;
pub mod utils;

#[cfg(test)]
mod test_graphs;

pub use assignment::{AssignmentSet, SingleAssignment};
pub use budget::{Bounded, BudgetExceeded};
pub use canonical::{CanonicalName, canonical_name, canonicalize};
pub use coverage::{Coverage, StaticCoverage, estimate_coverage, static_instruction_coverage};
pub use enumerate::{DiscoveredStencil, Discovery, Occurrence, enumerate_stencils};
pub use match_::Match;
pub use matcher::{
    SubgraphMatcher, find_matches, find_matches_indexed, first_match, is_isomorphic, is_subgraph,
};
pub use optimize::{Combination, optimize_combination};
pub use profiling::{Timer, record, report};
pub use select::{select_exclusive, select_exclusive_owned};
