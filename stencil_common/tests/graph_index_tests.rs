#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use stencil_common::{CHAIN_HOST, GraphIndex, MIXED_HOST, NodeIndex, SQUARE_HOST};

#[test]
fn test_graph_index_build() {
    let index = GraphIndex::build(&MIXED_HOST.graph);

    assert_eq!(index.num_nodes(), MIXED_HOST.graph.num_vertices());
    assert_eq!(index.opcode_count("add"), 2);
    assert_eq!(index.opcode_count("pointer"), 1);
    assert_eq!(index.opcode_count("fdiv"), 0);
}

#[test]
fn test_graph_index_fanin_fanout_symmetry() {
    let index = GraphIndex::build(&MIXED_HOST.graph);

    for node in index.nodes() {
        // If A is in B's fanout, then B is in A's fanin
        for fanout in index.fanout_set(node) {
            assert!(index.fanin_set(*fanout).contains(&node));
        }

        for fanin in index.fanin_set(node) {
            assert!(index.fanout_set(*fanin).contains(&node));
        }
    }
}

#[test]
fn test_graph_index_resolution() {
    let index = GraphIndex::build(&CHAIN_HOST.graph);

    // Vertex id resolution is bijective
    for i in 0..index.num_nodes() {
        let node = NodeIndex::new(i);
        let resolved = index.resolve(&index.vertex(node).id);

        assert_eq!(resolved, Some(node));
    }
    assert_eq!(index.resolve("nope"), None);
}

#[test]
fn test_graph_index_slots_and_arity() {
    let index = GraphIndex::build(&MIXED_HOST.graph);

    for node in index.nodes() {
        assert_eq!(index.fanin(node).len(), index.arity(node));
    }

    let store = index.resolve("p4").unwrap();
    let slots: Vec<usize> = index.fanin(store).iter().map(|(_, slot)| *slot).collect();
    assert_eq!(slots, vec![0, 1]);
}

#[test]
fn test_graph_index_parallel_edges() {
    let index = GraphIndex::build(&SQUARE_HOST.graph);
    let mul = index.resolve("m0").unwrap();
    let add = index.resolve("a0").unwrap();

    assert_eq!(index.edge_multiplicity(mul, add), 2);
    assert_eq!(index.edge_multiplicity(add, mul), 0);
    assert_eq!(index.fanout_set(mul).len(), 1);
    assert!(index.fanout_set(mul).contains(&add));
}
