//! Configuration for stencil matching and discovery.
//!
//! This module exposes a small, stable surface for consumers (the
//! `stencil_subgraph` engine, the driver and the CLI) to parameterize how
//! matching and enumeration behave.
//!
//! The main concepts are:
//! - match_mode: whether node equality compares opcodes only, or opcodes and
//!   arity (in-degree in the host graph).
//! - shape: plain monomorphism (every stencil edge must exist in the host) or
//!   induced matching (additionally, no extra host edges between matched
//!   vertices).
//! - dedupe: how to deduplicate matches after search.
//! - budget: ceilings after which enumeration and optimization stop and
//!   report partial results.
//!
//! Quick examples
//!
//! Default behavior (opcode equality, all mappings kept, edges 1..=2):
//! ```ignore
//! use stencil_common::Config;
//! let cfg = Config::default();
//! ```
//!
//! Strict arity with automorphism collapsing:
//! ```ignore
//! use stencil_common::{Config, Dedupe, MatchMode};
//! let cfg = Config::builder()
//!     .match_mode(MatchMode::OpcodeAndArity)
//!     .dedupe(Dedupe::AutoMorph)
//!     .build();
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

/// Opcodes never admitted into enumerated stencils unless overridden.
pub const DEFAULT_EXCLUDED_OPCODES: &[&str] = &[
    "br",
    "switch",
    "indirectbr",
    "ret",
    "call",
    "invoke",
    "store",
    "load",
    "pointer",
];

/// Node equality used when pairing a stencil vertex with a host vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Opcodes must be equal.
    #[default]
    Opcode,
    /// Opcodes and arities must both be equal.
    OpcodeAndArity,
}

/// Which host edges a match is allowed to see between its matched vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchShape {
    /// Every stencil edge must be present in the host; extra host edges are fine.
    #[default]
    Monomorphism,
    /// As above, and every host edge between matched vertices must be a stencil edge.
    Induced,
}

/// Control how matches are deduplicated.
///
/// - None:
///     Keep every injective mapping, including those that differ only by an
///     automorphism of the stencil.
/// - AutoMorph:
///     Collapse matches that cover the same SET of host vertices, regardless
///     of which stencil vertex each host vertex is paired with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dedupe {
    /// Keep every mapping.
    #[default]
    None,
    /// Collapse mappings that cover the same host vertex set.
    AutoMorph,
}

/// Ceilings for the exponential parts of the engine.
///
/// `None` means unlimited. A tripped ceiling never truncates silently: the
/// operation reports a budget-exceeded signal alongside its partial result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Budget {
    /// Maximum number of distinct candidate edge-sets the enumerator may hold.
    pub max_candidates: Option<usize>,
    /// Maximum number of stencil subsets the optimizer may evaluate.
    pub max_combinations: Option<usize>,
    /// Wall-clock limit for a single enumeration or optimization call.
    pub time_limit: Option<Duration>,
}

impl Budget {
    /// A budget with no ceilings.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_candidates: None,
            max_combinations: None,
            time_limit: None,
        }
    }
}

/// Global search configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Node equality predicate.
    pub match_mode: MatchMode,
    /// Monomorphism or induced matching.
    pub shape: MatchShape,
    /// How to deduplicate matches after search.
    pub dedupe: Dedupe,
    /// Smallest edge count reported by the enumerator.
    pub bottom_k: usize,
    /// Largest edge count explored by the enumerator.
    pub top_k: usize,
    /// Opcodes never admitted into enumerated stencils.
    pub excluded_opcodes: BTreeSet<String>,
    /// Ceilings for enumeration and optimization.
    pub budget: Budget,
    /// Distribute independent evaluations across worker threads.
    pub parallel: bool,
}

impl Config {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether `opcode` is in the configured side-effect exclusion set.
    #[must_use]
    pub fn is_excluded(&self, opcode: &str) -> bool {
        self.excluded_opcodes.contains(opcode)
    }

    /// Inclusive edge-count range explored by the enumerator.
    ///
    /// The lower end is clamped to at least one edge and at most `top_k`.
    #[must_use]
    pub fn edge_range(&self) -> std::ops::RangeInclusive<usize> {
        let top = self.top_k.max(1);
        let bottom = self.bottom_k.clamp(1, top);
        bottom..=top
    }
}

impl Default for Config {
    /// Opcode equality, monomorphism, no dedupe, stencils of one to two edges.
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            shape: MatchShape::default(),
            dedupe: Dedupe::default(),
            bottom_k: 1,
            top_k: 2,
            excluded_opcodes: DEFAULT_EXCLUDED_OPCODES
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            budget: Budget::unlimited(),
            parallel: false,
        }
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the node equality predicate.
    #[must_use]
    pub fn match_mode(mut self, mode: MatchMode) -> Self {
        self.config.match_mode = mode;
        self
    }

    /// Shorthand for [`MatchMode::OpcodeAndArity`].
    #[must_use]
    pub fn strict_arity(self) -> Self {
        self.match_mode(MatchMode::OpcodeAndArity)
    }

    /// Set the matching shape.
    #[must_use]
    pub fn shape(mut self, shape: MatchShape) -> Self {
        self.config.shape = shape;
        self
    }

    /// Shorthand for [`MatchShape::Induced`].
    #[must_use]
    pub fn induced(self) -> Self {
        self.shape(MatchShape::Induced)
    }

    /// Set the dedupe mode.
    #[must_use]
    pub fn dedupe(mut self, dedupe: Dedupe) -> Self {
        self.config.dedupe = dedupe;
        self
    }

    /// Shorthand for [`Dedupe::None`].
    #[must_use]
    pub fn none(self) -> Self {
        self.dedupe(Dedupe::None)
    }

    /// Shorthand for [`Dedupe::AutoMorph`].
    #[must_use]
    pub fn auto_morph(self) -> Self {
        self.dedupe(Dedupe::AutoMorph)
    }

    /// Set the enumerated edge-count range.
    #[must_use]
    pub fn edge_range(mut self, bottom_k: usize, top_k: usize) -> Self {
        self.config.bottom_k = bottom_k;
        self.config.top_k = top_k;
        self
    }

    /// Replace the side-effect exclusion set.
    #[must_use]
    pub fn excluded_opcodes<I, S>(mut self, opcodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.excluded_opcodes = opcodes.into_iter().map(Into::into).collect();
        self
    }

    /// Add one opcode to the side-effect exclusion set.
    #[must_use]
    pub fn exclude_opcode(mut self, opcode: impl Into<String>) -> Self {
        self.config.excluded_opcodes.insert(opcode.into());
        self
    }

    /// Set the search budget.
    #[must_use]
    pub fn budget(mut self, budget: Budget) -> Self {
        self.config.budget = budget;
        self
    }

    /// Limit the number of candidate edge-sets held by the enumerator.
    #[must_use]
    pub fn max_candidates(mut self, limit: usize) -> Self {
        self.config.budget.max_candidates = Some(limit);
        self
    }

    /// Limit the number of stencil subsets evaluated by the optimizer.
    #[must_use]
    pub fn max_combinations(mut self, limit: usize) -> Self {
        self.config.budget.max_combinations = Some(limit);
        self
    }

    /// Limit the wall-clock time of a single enumeration or optimization.
    #[must_use]
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.config.budget.time_limit = Some(limit);
        self
    }

    /// Enable or disable parallel evaluation.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Finish the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_excludes_side_effects() {
        let cfg = Config::default();
        for op in ["store", "load", "call", "br", "ret"] {
            assert!(cfg.is_excluded(op), "{op} should be excluded");
        }
        assert!(!cfg.is_excluded("add"));
    }

    #[test]
    fn builder_overrides_defaults() {
        let cfg = Config::builder()
            .strict_arity()
            .induced()
            .auto_morph()
            .edge_range(2, 3)
            .max_candidates(10)
            .build();
        assert_eq!(cfg.match_mode, MatchMode::OpcodeAndArity);
        assert_eq!(cfg.shape, MatchShape::Induced);
        assert_eq!(cfg.dedupe, Dedupe::AutoMorph);
        assert_eq!(cfg.edge_range(), 2..=3);
        assert_eq!(cfg.budget.max_candidates, Some(10));
        assert_eq!(cfg.budget.max_combinations, None);
    }

    #[test]
    fn edge_range_is_clamped() {
        let cfg = Config::builder().edge_range(0, 2).build();
        assert_eq!(cfg.edge_range(), 1..=2);

        let cfg = Config::builder().edge_range(5, 2).build();
        assert_eq!(cfg.edge_range(), 2..=2);
    }

    #[test]
    fn excluded_opcodes_can_be_replaced() {
        let cfg = Config::builder()
            .excluded_opcodes(["store"])
            .exclude_opcode("load")
            .build();
        assert!(cfg.is_excluded("store"));
        assert!(cfg.is_excluded("load"));
        assert!(!cfg.is_excluded("call"));
    }
}
