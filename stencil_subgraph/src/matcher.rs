//! Subgraph isomorphism matching implementation.
//!
//! This module provides the core matching engine that finds every occurrence
//! of a stencil (the needle) inside a host graph (the haystack). It is a
//! backtracking search over needle nodes in breadth-first order from the
//! rarest opcode, with candidates bounded by the host adjacency of already
//! assigned neighbours and pruned by opcode, arity and edge multiplicity.

use std::collections::{BTreeMap, HashSet};
use std::ops::ControlFlow;

use stencil_common::{Config, Dedupe, Graph, GraphIndex, MatchMode, MatchShape, NodeIndex, Stencil};
use tracing::{debug, trace};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::Timer;
use crate::assignment::{AssignmentSet, SingleAssignment};
use crate::heuristics::search_order;
use crate::match_::Match;
use crate::utils::intersect_sets;

/// Entry point for subgraph isomorphism searches.
pub struct SubgraphMatcher;

/// Core implementation of the subgraph matching algorithm.
pub struct SubgraphMatcherCore<'a, 'needle, 'haystack> {
    /// Structural index for the stencil.
    needle_index: &'a GraphIndex<'needle>,
    /// Structural index for the host.
    haystack_index: &'a GraphIndex<'haystack>,
    /// Configuration settings for the matcher.
    config: &'a Config,
    /// Needle nodes in assignment order.
    order: Vec<NodeIndex>,
}

impl SubgraphMatcher {
    /// Performs a complete search of `needle` inside `haystack`.
    ///
    /// This method builds the necessary indices and executes the matching algorithm.
    #[must_use]
    pub fn enumerate_all(needle: &Graph, haystack: &Graph, config: &Config) -> AssignmentSet {
        let needle_index = GraphIndex::build(needle);
        let haystack_index = GraphIndex::build(haystack);
        Self::enumerate_with_indices(&needle_index, &haystack_index, config)
    }

    /// Performs a search using pre-built indices.
    ///
    /// This is more efficient when searching many stencils in the same host.
    #[must_use]
    pub fn enumerate_with_indices(
        needle_index: &GraphIndex<'_>,
        haystack_index: &GraphIndex<'_>,
        config: &Config,
    ) -> AssignmentSet {
        SubgraphMatcherCore::new(needle_index, haystack_index, config).enumerate_assignments()
    }

    /// The first mapping found, without enumerating the rest.
    #[must_use]
    pub fn first_with_indices(
        needle_index: &GraphIndex<'_>,
        haystack_index: &GraphIndex<'_>,
        config: &Config,
    ) -> Option<SingleAssignment> {
        SubgraphMatcherCore::new(needle_index, haystack_index, config).first_assignment()
    }
}

impl<'a, 'needle, 'haystack> SubgraphMatcherCore<'a, 'needle, 'haystack> {
    /// Prepare a search; computes the needle assignment order.
    #[must_use]
    pub fn new(
        needle_index: &'a GraphIndex<'needle>,
        haystack_index: &'a GraphIndex<'haystack>,
        config: &'a Config,
    ) -> Self {
        let order = search_order(needle_index, haystack_index);
        Self {
            needle_index,
            haystack_index,
            config,
            order,
        }
    }

    /// Executes the search and returns every (deduplicated) mapping.
    #[must_use]
    pub fn enumerate_assignments(&self) -> AssignmentSet {
        let _t = Timer::new("SubgraphMatcherCore::enumerate_assignments");
        debug!(
            "starting subgraph search: needle nodes: {}, haystack nodes: {}",
            self.needle_index.num_nodes(),
            self.haystack_index.num_nodes()
        );

        let Some(&root) = self.order.first() else {
            return AssignmentSet::default();
        };
        let roots = self.find_candidates(root, &SingleAssignment::new());

        let mut results = self.expand_roots(root, roots);
        let total_found = results.len();

        self.apply_deduplication(&mut results);

        debug!(
            "search complete: found {} raw matches, {} after deduplication",
            total_found,
            results.len()
        );
        AssignmentSet::new(results)
    }

    /// Executes the search and stops at the first complete mapping.
    #[must_use]
    pub fn first_assignment(&self) -> Option<SingleAssignment> {
        let _t = Timer::new("SubgraphMatcherCore::first_assignment");
        if self.order.is_empty() {
            return None;
        }

        let mut found = None;
        let mut assignment = SingleAssignment::new();
        let _ = self.extend(&mut assignment, 0, &mut |complete| {
            found = Some(complete.clone());
            ControlFlow::Break(())
        });
        found
    }

    #[cfg(feature = "rayon")]
    fn expand_roots(&self, root: NodeIndex, roots: Vec<NodeIndex>) -> Vec<SingleAssignment> {
        if self.config.parallel {
            roots
                .into_par_iter()
                .flat_map_iter(|candidate| self.expand_root(root, candidate))
                .collect()
        } else {
            roots
                .into_iter()
                .flat_map(|candidate| self.expand_root(root, candidate))
                .collect()
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn expand_roots(&self, root: NodeIndex, roots: Vec<NodeIndex>) -> Vec<SingleAssignment> {
        roots
            .into_iter()
            .flat_map(|candidate| self.expand_root(root, candidate))
            .collect()
    }

    /// Every complete mapping that pairs `root` with `candidate`.
    fn expand_root(&self, root: NodeIndex, candidate: NodeIndex) -> Vec<SingleAssignment> {
        let mut out = Vec::new();
        let mut assignment = SingleAssignment::new();
        assignment.assign(root, candidate);
        let _ = self.extend(&mut assignment, 1, &mut |complete| {
            out.push(complete.clone());
            ControlFlow::Continue(())
        });
        out
    }

    /// Assign `order[depth..]`, reporting each complete mapping to `on_match`.
    fn extend(
        &self,
        assignment: &mut SingleAssignment,
        depth: usize,
        on_match: &mut dyn FnMut(&SingleAssignment) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let Some(&needle) = self.order.get(depth) else {
            return on_match(assignment);
        };

        let candidates = self.find_candidates(needle, assignment);
        if candidates.is_empty() {
            trace!(
                "backtracking: no candidates for needle node {} ({})",
                needle.index(),
                self.needle_index.opcode(needle)
            );
            return ControlFlow::Continue(());
        }

        for candidate in candidates {
            assignment.assign(needle, candidate);
            let flow = self.extend(assignment, depth + 1, on_match);
            assignment.remove_by_needle(needle);
            if flow.is_break() {
                return flow;
            }
        }
        ControlFlow::Continue(())
    }

    /// Identifies haystack nodes that could be paired with `needle` next.
    fn find_candidates(&self, needle: NodeIndex, assignment: &SingleAssignment) -> Vec<NodeIndex> {
        let mut bounding_sets: Vec<&HashSet<NodeIndex>> = Vec::new();
        for &pred in self.needle_index.fanin_set(needle) {
            if let Some(h) = assignment.get_haystack_node(pred) {
                bounding_sets.push(self.haystack_index.fanout_set(h));
            }
        }
        for &succ in self.needle_index.fanout_set(needle) {
            if let Some(h) = assignment.get_haystack_node(succ) {
                bounding_sets.push(self.haystack_index.fanin_set(h));
            }
        }

        let unfiltered: Vec<NodeIndex> = if bounding_sets.is_empty() {
            // Nothing adjacent is mapped yet: every host node with the right opcode.
            self.haystack_index
                .nodes_of_opcode(self.needle_index.opcode(needle))
                .to_vec()
        } else {
            let mut pool: Vec<NodeIndex> = intersect_sets(bounding_sets).into_iter().collect();
            pool.sort_unstable();
            pool
        };

        unfiltered
            .into_iter()
            .filter(|&candidate| assignment.haystack_is_free(candidate))
            .filter(|&candidate| self.nodes_compatible(needle, candidate))
            .filter(|&candidate| self.edges_consistent(needle, candidate, assignment))
            .collect()
    }

    /// Node equality under the configured match mode.
    fn nodes_compatible(&self, needle: NodeIndex, haystack: NodeIndex) -> bool {
        if self.needle_index.opcode(needle) != self.haystack_index.opcode(haystack) {
            return false;
        }
        match self.config.match_mode {
            MatchMode::Opcode => true,
            MatchMode::OpcodeAndArity => {
                self.needle_index.arity(needle) == self.haystack_index.arity(haystack)
            }
        }
    }

    /// Edge multiplicities between `needle`/`haystack` and every already
    /// assigned pair must agree under the configured shape.
    fn edges_consistent(
        &self,
        needle: NodeIndex,
        haystack: NodeIndex,
        assignment: &SingleAssignment,
    ) -> bool {
        let induced = self.config.shape == MatchShape::Induced;
        let fits = |need: usize, have: usize| if induced { need == have } else { have >= need };
        let n = self.needle_index;
        let h = self.haystack_index;

        if !fits(n.edge_multiplicity(needle, needle), h.edge_multiplicity(haystack, haystack)) {
            return false;
        }

        let needle_side = n.neighbours(needle).into_iter().filter(|&x| x != needle).all(|other| {
            assignment.get_haystack_node(other).is_none_or(|mapped| {
                fits(n.edge_multiplicity(needle, other), h.edge_multiplicity(haystack, mapped))
                    && fits(n.edge_multiplicity(other, needle), h.edge_multiplicity(mapped, haystack))
            })
        });
        if !needle_side || !induced {
            return needle_side;
        }

        // Induced: host edges towards assigned nodes must all be stencil edges.
        h.neighbours(haystack).into_iter().filter(|&x| x != haystack).all(|other| {
            assignment.get_needle_node(other).is_none_or(|mapped| {
                n.edge_multiplicity(needle, mapped) == h.edge_multiplicity(haystack, other)
                    && n.edge_multiplicity(mapped, needle) == h.edge_multiplicity(other, haystack)
            })
        })
    }

    /// Removes duplicate assignments based on the configured deduplication strategy.
    fn apply_deduplication(&self, results: &mut Vec<SingleAssignment>) {
        if self.config.dedupe == Dedupe::AutoMorph {
            let mut seen = HashSet::new();
            results.retain(|m| seen.insert(m.signature()));
        }
    }
}

/// Every match of `stencil` in `host`.
///
/// Matches are numbered in discovery order, which is deterministic for a
/// given pair of graphs and configuration.
#[must_use]
pub fn find_matches(stencil: &Stencil, host: &Graph, config: &Config) -> Vec<Match> {
    let host_index = GraphIndex::build(host);
    find_matches_indexed(stencil, &host_index, config)
}

/// [`find_matches`] against a pre-built host index.
#[must_use]
pub fn find_matches_indexed(
    stencil: &Stencil,
    host_index: &GraphIndex<'_>,
    config: &Config,
) -> Vec<Match> {
    let needle_index = GraphIndex::build(&stencil.graph);
    SubgraphMatcher::enumerate_with_indices(&needle_index, host_index, config)
        .items
        .iter()
        .enumerate()
        .map(|(i, a)| Match::from_assignment(&stencil.name, i, a, &needle_index, host_index))
        .collect()
}

/// Whether some subgraph of `host` realizes `stencil`.
///
/// Stops at the first mapping found.
#[must_use]
pub fn is_subgraph(stencil: &Graph, host: &Graph, config: &Config) -> bool {
    first_match(stencil, host, config).is_some()
}

/// One mapping of `stencil` into `host` (host id -> stencil id), if any.
#[must_use]
pub fn first_match(
    stencil: &Graph,
    host: &Graph,
    config: &Config,
) -> Option<BTreeMap<String, String>> {
    let needle_index = GraphIndex::build(stencil);
    let host_index = GraphIndex::build(host);
    let assignment = SubgraphMatcher::first_with_indices(&needle_index, &host_index, config)?;
    Some(
        assignment
            .haystack_mapping()
            .iter()
            .map(|(&h, &n)| {
                (
                    host_index.vertex(h).id.clone(),
                    needle_index.vertex(n).id.clone(),
                )
            })
            .collect(),
    )
}

/// Whether `a` and `b` are isomorphic under opcode equality.
///
/// Equal vertex and edge counts plus a monomorphism that respects edge
/// multiplicity leave no room for extra edges, so one mapping suffices.
#[must_use]
pub fn is_isomorphic(a: &Graph, b: &Graph) -> bool {
    a.num_vertices() == b.num_vertices()
        && a.num_edges() == b.num_edges()
        && is_subgraph(a, b, &Config::default())
}
