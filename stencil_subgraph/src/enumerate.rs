//! Subgraph enumeration: discover the connected stencils a host contains.
//!
//! Candidates are sorted lists of host edge indices. Level `k` holds every
//! distinct connected candidate of exactly `k` edges whose endpoints are
//! acceptable (real, side-effect free instructions). Level `k + 1` grows each
//! level-`k` candidate by one acceptable edge incident to one of its
//! vertices, in either direction.
//!
//! Candidates in the reported range are grouped by shape through a table
//! keyed by canonical name; each group's first member becomes the
//! representative stencil. Representatives are then matched against the
//! whole host, since enumeration only saw the occurrences it grew.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use stencil_common::{Config, Graph, GraphIndex, Stencil, is_synthetic_opcode};
use tracing::{debug, info, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::Timer;
use crate::budget::{Bounded, BudgetExceeded, Deadline};
use crate::canonical::canonicalize;
use crate::match_::Match;
use crate::matcher::{find_matches_indexed, first_match};
use crate::select::select_exclusive;

/// One place a representative's shape was seen during enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    /// Host edge indices, sorted.
    pub edges: Vec<usize>,
    /// Witness mapping, host vertex id -> stencil vertex id.
    pub mapping: BTreeMap<String, String>,
}

/// A discovered stencil with its authoritative statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredStencil {
    /// The representative, named by its canonical name.
    pub stencil: Stencil,
    /// Number of edges in the stencil.
    pub edge_count: usize,
    /// Occurrences seen while enumerating.
    pub occurrences: Vec<Occurrence>,
    /// Every match in the full host.
    pub matches: Vec<Match>,
    /// Size of the greedy mutually-exclusive subset of `matches`.
    pub exclusive_count: usize,
}

impl DiscoveredStencil {
    /// Stencil name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.stencil.name
    }

    /// Number of (possibly overlapping) matches in the host.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.matches.len()
    }
}

/// Result of [`enumerate_stencils`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Representatives in discovery order (by edge count, then by host edges).
    pub stencils: Vec<DiscoveredStencil>,
}

impl Discovery {
    /// Stencil name -> full match list, as the optimizer consumes it.
    #[must_use]
    pub fn match_table(&self) -> BTreeMap<String, Vec<Match>> {
        self.stencils
            .iter()
            .map(|d| (d.stencil.name.clone(), d.matches.clone()))
            .collect()
    }

    /// Look up a stencil by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DiscoveredStencil> {
        self.stencils.iter().find(|d| d.stencil.name == name)
    }

    /// Number of representatives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stencils.len()
    }

    /// Returns true if nothing was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stencils.is_empty()
    }
}

/// A representative before its full-host recount.
struct Representative {
    stencil: Stencil,
    edge_count: usize,
    occurrences: Vec<Occurrence>,
}

/// Enumerate every distinct connected stencil with an edge count in the
/// configured range.
///
/// A tripped candidate ceiling or time limit stops the search; what was
/// grouped and recounted so far is returned along with the reason.
pub fn enumerate_stencils(host: &Graph, config: &Config) -> Bounded<Discovery> {
    let _t = Timer::new("enumerate_stencils");
    let deadline = Deadline::start(config.budget.time_limit);
    let range = config.edge_range();
    let (bottom_k, top_k) = (*range.start(), *range.end());

    let acceptable = |id: &str| {
        host.opcode(id)
            .is_some_and(|op| !is_synthetic_opcode(op) && !config.is_excluded(op))
    };
    let usable: Vec<usize> = host
        .edges()
        .iter()
        .enumerate()
        .filter(|(_, e)| acceptable(&e.source) && acceptable(&e.dest))
        .map(|(i, _)| i)
        .collect();

    let mut incident: HashMap<&str, Vec<usize>> = HashMap::new();
    for &i in &usable {
        let e = &host.edges()[i];
        incident.entry(e.source.as_str()).or_default().push(i);
        if e.dest != e.source {
            incident.entry(e.dest.as_str()).or_default().push(i);
        }
    }

    info!(
        "enumerating stencils of {}..={} edges over {} usable edges",
        bottom_k,
        top_k,
        usable.len()
    );

    let mut exceeded: Option<BudgetExceeded> = None;
    let mut reps: Vec<Representative> = Vec::new();
    let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
    let mut completed = 0usize;
    let mut level: Vec<Vec<usize>> = Vec::new();

    for k in 1..=top_k {
        if deadline.expired() {
            exceeded = Some(deadline.exceeded(completed));
            break;
        }

        let grown = if k == 1 {
            cap(
                usable.iter().map(|&e| vec![e]).collect(),
                config.budget.max_candidates,
                1,
            )
        } else {
            grow(
                host,
                &level,
                &incident,
                &deadline,
                config.budget.max_candidates,
                completed,
            )
        };
        level = grown.value;
        if let Some(reason) = grown.exceeded {
            let timed_out = matches!(reason, BudgetExceeded::Deadline { .. });
            exceeded = Some(reason);
            if timed_out {
                break;
            }
        }

        if level.is_empty() {
            debug!("no candidates with {} edges", k);
            break;
        }

        let first_rep = reps.len();
        if k >= bottom_k {
            for candidate in &level {
                if deadline.expired() {
                    exceeded = Some(deadline.exceeded(completed));
                    break;
                }
                group(host, candidate, &mut reps, &mut by_name);
                completed += 1;
            }
        }
        info!(
            "{} edges: {} candidates, {} new shapes",
            k,
            level.len(),
            reps.len() - first_rep
        );

        if exceeded.is_some() {
            break;
        }
    }

    let host_index = GraphIndex::build(host);
    let recounted = recount(reps, &host_index, config, &deadline);
    let finished = recounted.iter().filter(|d| d.is_some()).count();
    if finished < recounted.len() && exceeded.is_none() {
        exceeded = Some(deadline.exceeded(completed + finished));
    }

    let discovery = Discovery {
        stencils: recounted.into_iter().flatten().collect(),
    };
    info!("discovered {} stencils", discovery.len());

    match exceeded {
        None => Bounded::complete(discovery),
        Some(reason) => {
            warn!("{}", reason);
            Bounded::partial(discovery, reason)
        }
    }
}

/// Truncate a level to the candidate ceiling, reporting when it trips.
fn cap(
    mut level: Vec<Vec<usize>>,
    max_candidates: Option<usize>,
    edge_count: usize,
) -> Bounded<Vec<Vec<usize>>> {
    match max_candidates {
        Some(limit) if level.len() > limit => {
            level.truncate(limit);
            Bounded::partial(level, BudgetExceeded::Candidates { limit, edge_count })
        }
        _ => Bounded::complete(level),
    }
}

/// Every distinct connected candidate one edge larger than some member of `level`.
///
/// Growth stops as soon as the level holds more than `max_candidates` members
/// or the deadline passes; the deadline case reports `completed` as the work
/// done so far.
fn grow(
    host: &Graph,
    level: &[Vec<usize>],
    incident: &HashMap<&str, Vec<usize>>,
    deadline: &Deadline,
    max_candidates: Option<usize>,
    completed: usize,
) -> Bounded<Vec<Vec<usize>>> {
    let k = level.first().map_or(0, Vec::len) + 1;
    let full = |n: usize| max_candidates.is_some_and(|limit| n > limit);
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut next: Vec<Vec<usize>> = Vec::new();

    'level: for candidate in level {
        let vertices: BTreeSet<&str> = candidate
            .iter()
            .flat_map(|&i| {
                let e = &host.edges()[i];
                [e.source.as_str(), e.dest.as_str()]
            })
            .collect();

        for v in vertices {
            if deadline.expired() {
                next.sort_unstable();
                return Bounded::partial(next, deadline.exceeded(completed));
            }
            for &e in incident.get(v).map(Vec::as_slice).unwrap_or_default() {
                if candidate.contains(&e) {
                    continue;
                }
                let mut grown = candidate.clone();
                grown.push(e);
                grown.sort_unstable();
                if seen.insert(grown.clone()) {
                    next.push(grown);
                    if full(next.len()) {
                        break 'level;
                    }
                }
            }
        }
    }

    // Growth only adds incident edges, so every candidate stays connected.
    debug_assert!(
        next.iter()
            .all(|c| c.len() == k && host.edge_subgraph(c).is_weakly_connected())
    );
    next.sort_unstable();
    cap(next, max_candidates, k)
}

/// File `candidate` under an existing representative or make it a new one.
fn group(
    host: &Graph,
    candidate: &[usize],
    reps: &mut Vec<Representative>,
    by_name: &mut HashMap<String, Vec<usize>>,
) {
    let sub = host.edge_subgraph(candidate);
    let canonical = canonicalize(&sub);
    let same_name = by_name.entry(canonical.name.clone()).or_default();

    // Opcode equality only; a name hit is confirmed by an actual mapping,
    // which also serves as the occurrence's witness.
    let plain = Config::default();
    for &r in same_name.iter() {
        if let Some(mapping) = first_match(&reps[r].stencil.graph, &sub, &plain) {
            reps[r].occurrences.push(Occurrence {
                edges: candidate.to_vec(),
                mapping,
            });
            return;
        }
    }

    let name = if same_name.is_empty() {
        canonical.name
    } else {
        warn!(
            "canonical name collision on {} (inexact: {})",
            canonical.name, !canonical.exact
        );
        format!("{}#{}", canonical.name, same_name.len() + 1)
    };
    debug!("new stencil {}", name);

    let stencil_graph = sub.relabeled();
    let mapping = sub
        .vertices()
        .zip(stencil_graph.vertices())
        .map(|(h, s)| (h.id.clone(), s.id.clone()))
        .collect();

    same_name.push(reps.len());
    reps.push(Representative {
        stencil: Stencil::new(name, stencil_graph),
        edge_count: candidate.len(),
        occurrences: vec![Occurrence {
            edges: candidate.to_vec(),
            mapping,
        }],
    });
}

/// Full-host matches and exclusive count for each representative.
///
/// Entries are `None` for representatives skipped after the deadline.
fn recount(
    reps: Vec<Representative>,
    host_index: &GraphIndex<'_>,
    config: &Config,
    deadline: &Deadline,
) -> Vec<Option<DiscoveredStencil>> {
    let eval = |rep: Representative| {
        if deadline.expired() {
            return None;
        }
        let matches = find_matches_indexed(&rep.stencil, host_index, config);
        let exclusive_count = select_exclusive(&matches).len();
        debug!(
            "{}: {} matches, {} exclusive",
            rep.stencil.name,
            matches.len(),
            exclusive_count
        );
        Some(DiscoveredStencil {
            stencil: rep.stencil,
            edge_count: rep.edge_count,
            occurrences: rep.occurrences,
            matches,
            exclusive_count,
        })
    };

    #[cfg(feature = "rayon")]
    if config.parallel {
        return reps.into_par_iter().map(eval).collect();
    }

    reps.into_iter().map(eval).collect()
}
