//! Stencil-combination optimizer.
//!
//! Brute force over every `r`-sized subset of stencil names: pool the
//! subset's matches, select exclusive matches, keep the subset with the most.
//! The number of subsets is `C(n, r)`, so this is meant for tens of
//! candidates, not thousands.

use std::collections::BTreeMap;

use itertools::Itertools;
use stencil_common::Config;
use tracing::{debug, info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::Timer;
use crate::budget::{Bounded, BudgetExceeded, Deadline};
use crate::match_::Match;
use crate::select::select_exclusive;

/// The winning subset of stencils.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Combination {
    /// Stencil names in the subset, sorted.
    pub names: Vec<String>,
    /// Exclusive matches per stencil in the subset.
    pub exclusive_counts: BTreeMap<String, usize>,
    /// Full (overlapping) match count per stencil in the subset.
    pub total_counts: BTreeMap<String, usize>,
    /// The selected vertex-disjoint matches.
    pub matches: Vec<Match>,
}

impl Combination {
    /// Number of exclusive matches achieved.
    #[must_use]
    pub fn exclusive_count(&self) -> usize {
        self.matches.len()
    }
}

/// Find the `r`-subset of `stencil_matches` keys with the most exclusive matches.
///
/// Subsets are visited in lexicographic order of sorted names and a later
/// subset only wins with a strictly larger count, so ties go to the first.
/// `r` larger than the number of stencils is clamped. Returns `None` in the
/// value when there is nothing to choose from or `r` is zero.
pub fn optimize_combination(
    stencil_matches: &BTreeMap<String, Vec<Match>>,
    r: usize,
    config: &Config,
) -> Bounded<Option<Combination>> {
    let _t = Timer::new("optimize_combination");
    let deadline = Deadline::start(config.budget.time_limit);
    let names: Vec<&String> = stencil_matches.keys().collect();

    let r = if r > names.len() {
        warn!(
            "combination size {} exceeds the {} available stencils; using {}",
            r,
            names.len(),
            names.len()
        );
        names.len()
    } else {
        r
    };
    if r == 0 {
        return Bounded::complete(None);
    }

    let total = binomial(names.len(), r);
    let limit = config.budget.max_combinations.unwrap_or(usize::MAX);
    let mut exceeded = (total > limit).then_some(BudgetExceeded::Combinations {
        evaluated: limit,
        total,
    });
    info!(
        "evaluating {} of {} stencil combinations of size {}",
        total.min(limit),
        total,
        r
    );

    // Strictly greater: the earliest subset keeps a tie.
    let mut best: Option<(usize, Vec<&String>)> = None;
    let mut evaluated = 0usize;
    let mut subsets = names.iter().copied().combinations(r).take(limit);
    loop {
        let chunk: Vec<Vec<&String>> = subsets.by_ref().take(CHUNK).collect();
        if chunk.is_empty() {
            break;
        }
        let scores = score_subsets(stencil_matches, &chunk, &deadline, config.parallel);
        let mut skipped = false;
        for (subset, score) in chunk.into_iter().zip(scores) {
            let Some(score) = score else {
                skipped = true;
                continue;
            };
            evaluated += 1;
            if best.as_ref().is_none_or(|(b, _)| score > *b) {
                best = Some((score, subset));
            }
        }
        if skipped {
            exceeded = Some(deadline.exceeded(evaluated));
            break;
        }
    }

    let value = best.map(|(score, subset)| {
        debug!("best combination {:?} with {} exclusive matches", subset, score);
        build_combination(stencil_matches, &subset)
    });

    match exceeded {
        None => Bounded::complete(value),
        Some(reason) => {
            warn!("{}", reason);
            Bounded::partial(value, reason)
        }
    }
}

/// Subsets scored per batch.
const CHUNK: usize = 1024;

/// `C(n, r)`, saturating at `usize::MAX`.
fn binomial(n: usize, r: usize) -> usize {
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        // exact: a product of i + 1 consecutive integers is divisible by (i + 1)!
        let Some(product) = acc.checked_mul((n - i) as u128) else {
            return usize::MAX;
        };
        acc = product / (i as u128 + 1);
        if acc > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    usize::try_from(acc).unwrap_or(usize::MAX)
}

fn pooled<'m>(
    stencil_matches: &'m BTreeMap<String, Vec<Match>>,
    subset: &[&String],
) -> Vec<&'m Match> {
    subset
        .iter()
        .filter_map(|name| stencil_matches.get(*name))
        .flatten()
        .collect()
}

fn score(stencil_matches: &BTreeMap<String, Vec<Match>>, subset: &[&String]) -> usize {
    select_exclusive(pooled(stencil_matches, subset)).len()
}

/// Exclusive count per subset; `None` for subsets skipped after the deadline.
fn score_subsets(
    stencil_matches: &BTreeMap<String, Vec<Match>>,
    subsets: &[Vec<&String>],
    deadline: &Deadline,
    parallel: bool,
) -> Vec<Option<usize>> {
    let eval = |subset: &Vec<&String>| {
        (!deadline.expired()).then(|| score(stencil_matches, subset))
    };

    #[cfg(feature = "rayon")]
    if parallel {
        return subsets.par_iter().map(eval).collect();
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    subsets.iter().map(eval).collect()
}

fn build_combination(
    stencil_matches: &BTreeMap<String, Vec<Match>>,
    subset: &[&String],
) -> Combination {
    let matches: Vec<Match> = select_exclusive(pooled(stencil_matches, subset))
        .into_iter()
        .cloned()
        .collect();

    let mut exclusive_counts: BTreeMap<String, usize> =
        subset.iter().map(|n| ((*n).clone(), 0)).collect();
    for m in &matches {
        *exclusive_counts.entry(m.template_id.clone()).or_default() += 1;
    }
    let total_counts = subset
        .iter()
        .map(|n| ((*n).clone(), stencil_matches.get(*n).map_or(0, Vec::len)))
        .collect();

    Combination {
        names: subset.iter().map(|n| (*n).clone()).collect(),
        exclusive_counts,
        total_counts,
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(template: &str, idx: usize, hosts: &[&str]) -> Match {
        Match {
            template_id: template.into(),
            match_idx: idx,
            node_matches: hosts
                .iter()
                .enumerate()
                .map(|(i, h)| ((*h).to_owned(), i.to_string()))
                .collect(),
        }
    }

    fn overlapping() -> BTreeMap<String, Vec<Match>> {
        // "a" and "b" fight over x/y; "c" is elsewhere
        BTreeMap::from([
            ("a".to_owned(), vec![m("a", 0, &["x", "y"])]),
            ("b".to_owned(), vec![m("b", 0, &["y", "z"])]),
            ("c".to_owned(), vec![m("c", 0, &["p", "q"])]),
        ])
    }

    #[test]
    fn avoids_overlapping_pair() {
        let out = optimize_combination(&overlapping(), 2, &Config::default());
        assert!(out.is_complete());
        let best = out.value.unwrap();
        assert_eq!(best.names, ["a", "c"]);
        assert_eq!(best.exclusive_count(), 2);
        assert_eq!(best.exclusive_counts["a"], 1);
        assert_eq!(best.total_counts["c"], 1);
    }

    #[test]
    fn oversized_r_is_clamped() {
        let out = optimize_combination(&overlapping(), 7, &Config::default());
        let best = out.value.unwrap();
        assert_eq!(best.names.len(), 3);
        assert_eq!(best.exclusive_count(), 2);
    }

    #[test]
    fn zero_r_and_empty_input() {
        assert_eq!(optimize_combination(&overlapping(), 0, &Config::default()).value, None);
        assert_eq!(
            optimize_combination(&BTreeMap::new(), 2, &Config::default()).value,
            None
        );
    }

    #[test]
    fn combination_budget_is_reported() {
        let config = Config::builder().max_combinations(1).build();
        let out = optimize_combination(&overlapping(), 2, &config);
        assert_eq!(
            out.exceeded,
            Some(BudgetExceeded::Combinations {
                evaluated: 1,
                total: 3
            })
        );
        // only ("a", "b") was tried
        assert_eq!(out.value.unwrap().names, ["a", "b"]);
    }

    #[test]
    fn binomial_saturates() {
        assert_eq!(binomial(5, 0), 1);
        assert_eq!(binomial(5, 5), 1);
        assert_eq!(binomial(44, 6), 7_059_052);
        assert_eq!(binomial(200, 100), usize::MAX);
    }

    #[test]
    fn combination_budget_stops_before_listing_every_subset() {
        let many: BTreeMap<String, Vec<Match>> = (0..44)
            .map(|i| {
                let name = format!("s{i:02}");
                let host = format!("h{i}");
                let matches = vec![m(&name, 0, &[host.as_str()])];
                (name, matches)
            })
            .collect();
        let config = Config::builder()
            .max_combinations(1)
            .time_limit(std::time::Duration::from_secs(30))
            .build();

        let start = std::time::Instant::now();
        let out = optimize_combination(&many, 6, &config);
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(
            out.exceeded,
            Some(BudgetExceeded::Combinations {
                evaluated: 1,
                total: 7_059_052
            })
        );
        let best = out.value.unwrap();
        assert_eq!(best.names, ["s00", "s01", "s02", "s03", "s04", "s05"]);
        assert_eq!(best.exclusive_count(), 6);
    }

    #[test]
    fn expired_deadline_scores_nothing() {
        let config = Config::builder()
            .time_limit(std::time::Duration::ZERO)
            .build();
        let out = optimize_combination(&overlapping(), 2, &config);
        assert_eq!(out.value, None);
        assert!(matches!(
            out.exceeded,
            Some(BudgetExceeded::Deadline { completed: 0, .. })
        ));
    }
}
