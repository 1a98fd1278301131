//! Ordering heuristics for the backtracking search.

use std::collections::{BTreeSet, VecDeque};

use stencil_common::{GraphIndex, NodeIndex};

/// Choose the needle node to start a component from.
///
/// Heuristic:
/// 1) Pick the needle opcode that is rarest in the haystack.
/// 2) Break ties by how many needle nodes share it (fewer first).
/// 3) Final deterministic tie-breaker: lowest needle index.
fn rarest_of(
    needle: &GraphIndex<'_>,
    haystack: &GraphIndex<'_>,
    nodes: impl Iterator<Item = NodeIndex>,
) -> Option<NodeIndex> {
    nodes.min_by_key(|&n| {
        let opcode = needle.opcode(n);
        (haystack.opcode_count(opcode), needle.opcode_count(opcode), n)
    })
}

/// Order in which needle nodes are assigned.
///
/// Breadth-first over undirected needle adjacency from the anchor, so every
/// node after the first of its component has an already-assigned neighbour
/// whose host adjacency bounds its candidates. Disconnected components are
/// appended, each starting from its own rarest node.
pub(crate) fn search_order(needle: &GraphIndex<'_>, haystack: &GraphIndex<'_>) -> Vec<NodeIndex> {
    let mut order: Vec<NodeIndex> = Vec::with_capacity(needle.num_nodes());
    let mut remaining: BTreeSet<NodeIndex> = needle.nodes().collect();

    while !remaining.is_empty() {
        let Some(anchor) = rarest_of(needle, haystack, remaining.iter().copied()) else {
            break;
        };

        remaining.remove(&anchor);
        let mut queue = VecDeque::from([anchor]);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            let mut next: Vec<NodeIndex> = needle
                .neighbours(node)
                .into_iter()
                .filter(|n| remaining.contains(n))
                .collect();
            next.sort_unstable();
            for n in next {
                remaining.remove(&n);
                queue.push_back(n);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use stencil_common::{CHAIN_HOST, Edge, Graph, GraphIndex, Vertex};

    use super::*;

    #[test]
    fn anchor_prefers_rare_opcode() {
        let needle = Graph::from_parts(
            [Vertex::new("x", "add"), Vertex::new("y", "srem")],
            [Edge::new("x", "y", 0)],
        );
        let n_index = GraphIndex::build(&needle);
        let h_index = GraphIndex::build(&CHAIN_HOST.graph);

        // two adds in the host, one srem
        let order = search_order(&n_index, &h_index);
        assert_eq!(order.len(), 2);
        assert_eq!(n_index.opcode(order[0]), "srem");
    }

    #[test]
    fn order_covers_disconnected_needles() {
        let needle = Graph::from_parts(
            [
                Vertex::new("a", "mul"),
                Vertex::new("b", "add"),
                Vertex::new("c", "shl"),
            ],
            [Edge::new("a", "b", 0)],
        );
        let n_index = GraphIndex::build(&needle);
        let h_index = GraphIndex::build(&CHAIN_HOST.graph);

        let mut order = search_order(&n_index, &h_index);
        order.sort_unstable();
        assert_eq!(order, n_index.nodes().collect::<Vec<_>>());
    }
}
