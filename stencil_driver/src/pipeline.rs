//! The two end-to-end runs: discover stencils in a host, or apply known
//! stencils to one.

use stencil_common::{Config, Graph, Stencil};
use stencil_subgraph::{
    BudgetExceeded, Combination, Coverage, Discovery, Match, StaticCoverage, enumerate_stencils,
    estimate_coverage, find_matches, optimize_combination, select_exclusive_owned,
    static_instruction_coverage,
};
use tracing::info;

use crate::output::{ReportRow, report_rows};

/// Result of [`discover`].
#[derive(Clone, Debug)]
pub struct DiscoverOutcome {
    /// Every discovered stencil with its statistics.
    pub discovery: Discovery,
    /// The best combination, when a size was requested and one exists.
    pub combination: Option<Combination>,
    /// Budgets that tripped along the way.
    pub exceeded: Vec<BudgetExceeded>,
}

impl DiscoverOutcome {
    /// The chosen stencils, or all of them without a combination.
    #[must_use]
    pub fn stencils(&self) -> Vec<Stencil> {
        match &self.combination {
            Some(c) => c
                .names
                .iter()
                .filter_map(|n| self.discovery.get(n))
                .map(|d| d.stencil.clone())
                .collect(),
            None => self
                .discovery
                .stencils
                .iter()
                .map(|d| d.stencil.clone())
                .collect(),
        }
    }

    /// Full match lists of the reported stencils, concatenated.
    #[must_use]
    pub fn all_matches(&self) -> Vec<Match> {
        let keep = |name: &str| {
            self.combination
                .as_ref()
                .is_none_or(|c| c.names.iter().any(|n| n == name))
        };
        self.discovery
            .stencils
            .iter()
            .filter(|d| keep(d.name()))
            .flat_map(|d| d.matches.iter().cloned())
            .collect()
    }

    /// Vertex-disjoint matches of the reported stencils.
    #[must_use]
    pub fn exclusive_matches(&self) -> Vec<Match> {
        match &self.combination {
            Some(c) => c.matches.clone(),
            None => select_exclusive_owned(&self.all_matches()),
        }
    }

    /// `stencil,exclusive,total` rows for the reported stencils.
    #[must_use]
    pub fn report_rows(&self) -> Vec<ReportRow> {
        match &self.combination {
            Some(c) => report_rows(c),
            None => self
                .discovery
                .stencils
                .iter()
                .map(|d| ReportRow {
                    stencil: d.stencil.name.clone(),
                    exclusive: d.exclusive_count,
                    total: d.total_count(),
                })
                .collect(),
        }
    }
}

/// Enumerate the host's stencils and, given `r`, pick the best `r` of them.
#[must_use]
pub fn discover(host: &Graph, config: &Config, r: Option<usize>) -> DiscoverOutcome {
    let mut exceeded = Vec::new();

    let found = enumerate_stencils(host, config);
    exceeded.extend(found.exceeded);
    let discovery = found.value;

    let combination = r.and_then(|r| {
        let best = optimize_combination(&discovery.match_table(), r, config);
        exceeded.extend(best.exceeded);
        best.value
    });
    if let Some(c) = &combination {
        info!(
            "best combination of {}: {} exclusive matches",
            c.names.len(),
            c.exclusive_count()
        );
    }

    DiscoverOutcome {
        discovery,
        combination,
        exceeded,
    }
}

/// Result of [`apply`].
#[derive(Clone, Debug)]
pub struct ApplyOutcome {
    /// Every match of every stencil, in stencil order.
    pub all_matches: Vec<Match>,
    /// Vertex-disjoint selection from `all_matches`.
    pub exclusive_matches: Vec<Match>,
    /// Instructions covered by the exclusive matches.
    pub static_coverage: StaticCoverage,
    /// Sequential greedy consumption estimate.
    pub coverage: Coverage,
}

/// Match `stencils` against the host and select exclusive matches.
#[must_use]
pub fn apply(host: &Graph, stencils: &[Stencil], config: &Config) -> ApplyOutcome {
    let all_matches: Vec<Match> = stencils
        .iter()
        .flat_map(|s| find_matches(s, host, config))
        .collect();
    let exclusive_matches = select_exclusive_owned(&all_matches);
    let static_coverage = static_instruction_coverage(host, &exclusive_matches);
    let coverage = estimate_coverage(stencils, host, config);
    info!(
        "{} matches, {} exclusive; {}",
        all_matches.len(),
        exclusive_matches.len(),
        static_coverage
    );

    ApplyOutcome {
        all_matches,
        exclusive_matches,
        static_coverage,
        coverage,
    }
}
