//! Canonical, isomorphism-invariant names for stencils.
//!
//! A name looks like `[add_0, mul_0] | [(mul_0, add_0)]`: sorted node labels,
//! then sorted edge labels. Node labels are `<opcode>_<k>`; parallel edges
//! keep one label per edge.
//!
//! Labels are chosen by trying every numbering of the vertices within each
//! opcode class and keeping the smallest sorted edge-label list. That minimum
//! depends only on the shape, so isomorphic stencils get the same name and
//! non-isomorphic ones never do. Shapes whose classes are too large to
//! permute fall back to a first-seen numbering over edges sorted by
//! `(source opcode, dest opcode)`; such names are flagged inexact and callers
//! confirm equality with an isomorphism check.

use std::collections::HashMap;

use itertools::Itertools;
use stencil_common::Graph;

/// Upper bound on numberings tried before falling back.
pub const MAX_LABELINGS: usize = 40_320;

/// A canonical name and whether it is exact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    /// The name.
    pub name: String,
    /// `false` when the fallback numbering was used; equal inexact names do
    /// not prove isomorphism.
    pub exact: bool,
}

/// Canonical name of `graph`.
#[must_use]
pub fn canonical_name(graph: &Graph) -> String {
    canonicalize(graph).name
}

/// Canonical name of `graph` with its exactness flag.
#[must_use]
pub fn canonicalize(graph: &Graph) -> CanonicalName {
    // Vertex positions grouped by opcode, opcodes sorted.
    let ids: Vec<&str> = graph.vertices().map(|v| v.id.as_str()).collect();
    let position: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let opcodes: Vec<&str> = graph.vertices().map(|v| v.opcode.as_str()).collect();
    let edges: Vec<(usize, usize)> = graph
        .edges()
        .iter()
        .filter_map(|e| Some((*position.get(e.source.as_str())?, *position.get(e.dest.as_str())?)))
        .collect();

    let classes: Vec<(&str, Vec<usize>)> = opcodes
        .iter()
        .enumerate()
        .map(|(i, op)| (*op, i))
        .into_group_map()
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(b.0))
        .collect();

    let labelings = classes
        .iter()
        .try_fold(1usize, |acc, (_, members)| acc.checked_mul(factorial(members.len())?));

    match labelings {
        Some(n) if n <= MAX_LABELINGS && !classes.is_empty() => CanonicalName {
            name: exact_name(&opcodes, &edges, &classes),
            exact: true,
        },
        _ if classes.is_empty() => CanonicalName {
            name: render(Vec::new(), Vec::new()),
            exact: true,
        },
        _ => CanonicalName {
            name: first_seen_name(&opcodes, &edges),
            exact: false,
        },
    }
}

fn factorial(n: usize) -> Option<usize> {
    (2..=n).try_fold(1usize, usize::checked_mul)
}

/// Minimum over every within-class numbering.
fn exact_name(opcodes: &[&str], edges: &[(usize, usize)], classes: &[(&str, Vec<usize>)]) -> String {
    let mut best: Option<Vec<(String, String)>> = None;
    let mut labels: Vec<String> = vec![String::new(); opcodes.len()];

    let numberings = classes
        .iter()
        .map(|(_, members)| members.iter().copied().permutations(members.len()))
        .multi_cartesian_product();

    for numbering in numberings {
        for ((opcode, _), order) in classes.iter().zip(&numbering) {
            for (k, &v) in order.iter().enumerate() {
                labels[v] = format!("{opcode}_{k}");
            }
        }
        let candidate = edge_labels(edges, &labels);
        if best.as_ref().is_none_or(|b| candidate < *b) {
            best = Some(candidate);
        }
    }

    // Node labels only depend on class sizes.
    let node_labels = classes
        .iter()
        .flat_map(|(opcode, members)| (0..members.len()).map(move |k| format!("{opcode}_{k}")))
        .collect();
    render(node_labels, best.unwrap_or_default())
}

/// First-seen numbering over edges sorted by opcode pair.
fn first_seen_name(opcodes: &[&str], edges: &[(usize, usize)]) -> String {
    let mut next: HashMap<&str, usize> = HashMap::new();
    let mut labels: Vec<Option<String>> = vec![None; opcodes.len()];
    let mut label = |v: usize, labels: &mut Vec<Option<String>>| {
        if labels[v].is_none() {
            let k = next.entry(opcodes[v]).or_default();
            labels[v] = Some(format!("{}_{k}", opcodes[v]));
            *k += 1;
        }
    };

    let sorted = edges
        .iter()
        .sorted_by_key(|(s, d)| format!("({}, {})", opcodes[*s], opcodes[*d]));
    for &(s, d) in sorted {
        label(s, &mut labels);
        label(d, &mut labels);
    }
    for v in 0..opcodes.len() {
        label(v, &mut labels);
    }

    let labels: Vec<String> = labels.into_iter().map(Option::unwrap_or_default).collect();
    let edge_labels = edge_labels(edges, &labels);
    render(labels, edge_labels)
}

fn edge_labels(edges: &[(usize, usize)], labels: &[String]) -> Vec<(String, String)> {
    edges
        .iter()
        .map(|&(s, d)| (labels[s].clone(), labels[d].clone()))
        .sorted()
        .collect()
}

fn render(mut node_labels: Vec<String>, edge_labels: Vec<(String, String)>) -> String {
    node_labels.sort();
    let edges = edge_labels
        .iter()
        .map(|(s, d)| format!("({s}, {d})"))
        .join(", ");
    format!("[{}] | [{}]", node_labels.join(", "), edges)
}

#[cfg(test)]
mod tests {
    use stencil_common::{Edge, Vertex};

    use super::*;

    #[test]
    fn two_node_chain() {
        let g = Graph::from_parts(
            [Vertex::new("x", "mul"), Vertex::new("y", "add")],
            [Edge::new("x", "y", 0)],
        );
        assert_eq!(canonical_name(&g), "[add_0, mul_0] | [(mul_0, add_0)]");
        assert!(canonicalize(&g).exact);
    }

    #[test]
    fn parallel_edges_are_counted() {
        let single = Graph::from_parts(
            [Vertex::new("x", "mul"), Vertex::new("y", "add")],
            [Edge::new("x", "y", 0)],
        );
        let double = Graph::from_parts(
            [Vertex::new("x", "mul"), Vertex::new("y", "add")],
            [Edge::new("x", "y", 0), Edge::new("x", "y", 1)],
        );
        assert_ne!(canonical_name(&single), canonical_name(&double));
        assert_eq!(
            canonical_name(&double),
            "[add_0, mul_0] | [(mul_0, add_0), (mul_0, add_0)]"
        );
    }

    #[test]
    fn same_opcode_chains_of_different_direction_agree() {
        // a -> b -> c and c <- b <- a written in another order
        let g1 = Graph::from_parts(
            [
                Vertex::new("a", "add"),
                Vertex::new("b", "add"),
                Vertex::new("c", "add"),
            ],
            [Edge::new("a", "b", 0), Edge::new("b", "c", 0)],
        );
        let g2 = Graph::from_parts(
            [
                Vertex::new("q", "add"),
                Vertex::new("p", "add"),
                Vertex::new("r", "add"),
            ],
            [Edge::new("p", "q", 0), Edge::new("r", "p", 0)],
        );
        assert_eq!(canonical_name(&g1), canonical_name(&g2));
    }

    #[test]
    fn fork_and_join_differ() {
        let fork = Graph::from_parts(
            [
                Vertex::new("a", "add"),
                Vertex::new("b", "add"),
                Vertex::new("c", "add"),
            ],
            [Edge::new("a", "b", 0), Edge::new("a", "c", 0)],
        );
        let join = Graph::from_parts(
            [
                Vertex::new("a", "add"),
                Vertex::new("b", "add"),
                Vertex::new("c", "add"),
            ],
            [Edge::new("b", "a", 0), Edge::new("c", "a", 0)],
        );
        assert_ne!(canonical_name(&fork), canonical_name(&join));
    }

    #[test]
    fn large_classes_fall_back() {
        let vertices: Vec<Vertex> = (0..9).map(|i| Vertex::new(i.to_string(), "add")).collect();
        let edges: Vec<Edge> = (0..8)
            .map(|i| Edge::new(i.to_string(), (i + 1).to_string(), 0))
            .collect();
        let g = Graph::from_parts(vertices, edges);
        let name = canonicalize(&g);
        assert!(!name.exact);
        assert!(name.name.starts_with("[add_0, add_1,"));
    }

    #[test]
    fn empty_graph() {
        assert_eq!(canonical_name(&Graph::new()), "[] | []");
    }
}

#[cfg(test)]
mod property_tests {
    use quickcheck::{TestResult, quickcheck};

    use super::*;
    use crate::matcher::is_isomorphic;
    use crate::test_graphs::{Relabeling, SmallGraph};

    quickcheck! {
        fn prop_name_is_invariant_under_relabeling(g: SmallGraph, r: Relabeling) -> bool {
            canonical_name(&g.0) == canonical_name(&r.apply(&g.0))
        }

        fn prop_distinct_names_are_not_isomorphic(a: SmallGraph, b: SmallGraph) -> TestResult {
            if canonical_name(&a.0) == canonical_name(&b.0) {
                return TestResult::from_bool(is_isomorphic(&a.0, &b.0));
            }
            TestResult::from_bool(!is_isomorphic(&a.0, &b.0))
        }
    }
}
