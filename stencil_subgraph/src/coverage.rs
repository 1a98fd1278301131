//! Coverage estimation.
//!
//! Sequential greedy consumption: each stencil in turn is matched against a
//! working copy of the host and every vertex it touches is removed before
//! the next stencil is tried. This is not joint-optimal coverage.

use std::collections::BTreeSet;
use std::fmt;

use stencil_common::{Config, Graph, Stencil};
use tracing::debug;

use crate::match_::Match;
use crate::matcher::find_matches;

/// Result of [`estimate_coverage`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coverage {
    /// Vertices removed from the working copy.
    pub removed: usize,
    /// Vertices in the original host.
    pub total: usize,
}

impl Coverage {
    /// Fraction of the original vertices removed; `0.0` for an empty host.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.removed as f64 / self.total as f64
        }
    }
}

/// Remove every vertex matched by each stencil in order, from a working copy.
#[must_use]
pub fn estimate_coverage(stencils: &[Stencil], host: &Graph, config: &Config) -> Coverage {
    let mut working = host.clone();
    let mut removed = 0;

    for stencil in stencils {
        let matches = find_matches(stencil, &working, config);
        let consumed: BTreeSet<String> = matches
            .iter()
            .flat_map(|m| m.host_vertices().map(str::to_owned))
            .collect();
        let n = working.remove_vertices(consumed.iter().map(String::as_str));
        debug!(
            "stencil {} consumed {} vertices ({} matches)",
            stencil.name,
            n,
            matches.len()
        );
        removed += n;
    }

    Coverage {
        removed,
        total: host.num_vertices(),
    }
}

/// Real instructions covered by a set of matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaticCoverage {
    /// Instruction vertices covered by at least one match.
    pub matched: usize,
    /// Instruction vertices in the host.
    pub total: usize,
}

impl StaticCoverage {
    /// Percentage of instructions matched; `0.0` for a host without any.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.matched as f64 / self.total as f64
        }
    }
}

impl fmt::Display for StaticCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.2}%) static instructions matched",
            self.matched,
            self.total,
            self.percent()
        )
    }
}

/// Count the real instruction vertices of `host` touched by `matches`.
#[must_use]
pub fn static_instruction_coverage<'m>(
    host: &Graph,
    matches: impl IntoIterator<Item = &'m Match>,
) -> StaticCoverage {
    let touched: BTreeSet<&str> = matches.into_iter().flat_map(Match::host_vertices).collect();
    let matched = touched
        .iter()
        .filter(|id| host.vertex(id).is_some_and(|v| v.is_instruction()))
        .count();
    StaticCoverage {
        matched,
        total: host.num_instructions(),
    }
}

#[cfg(test)]
mod tests {
    use stencil_common::{CHAIN_HOST, MIXED_HOST, MUL_ADD, MUL_SREM, SHL_ADD};

    use super::*;

    #[test]
    fn chain_coverage() {
        let config = Config::default();
        let one = estimate_coverage(&[MUL_ADD.stencil.clone()], &CHAIN_HOST.graph, &config);
        assert_eq!(one.removed, 2);
        assert_eq!(one.total, 5);
        assert!((one.fraction() - 0.4).abs() < 1e-9);

        let two = estimate_coverage(
            &[MUL_ADD.stencil.clone(), SHL_ADD.stencil.clone()],
            &CHAIN_HOST.graph,
            &config,
        );
        assert_eq!(two.removed, 4);
    }

    #[test]
    fn consumed_vertices_are_gone_for_later_stencils() {
        let config = Config::default();
        let out = estimate_coverage(
            &[MUL_ADD.stencil.clone(), MUL_ADD.stencil.clone(), MUL_SREM.stencil.clone()],
            &CHAIN_HOST.graph,
            &config,
        );
        assert_eq!(out.removed, 2);
    }

    #[test]
    fn empty_host() {
        let out = estimate_coverage(&[MUL_ADD.stencil.clone()], &Graph::new(), &Config::default());
        assert_eq!(out.fraction(), 0.0);
    }

    #[test]
    fn static_coverage_ignores_synthetic_vertices() {
        let m = Match {
            template_id: "t".into(),
            match_idx: 0,
            node_matches: [
                ("p1".to_owned(), "0".to_owned()),
                ("x".to_owned(), "1".to_owned()),
            ]
            .into(),
        };
        let cov = static_instruction_coverage(&MIXED_HOST.graph, [&m]);
        assert_eq!(cov, StaticCoverage { matched: 1, total: 5 });
        assert_eq!(cov.to_string(), "1/5 (20.00%) static instructions matched");
    }
}
