//! Random small graphs for property tests.

use quickcheck::{Arbitrary, Gen};
use stencil_common::{Edge, Graph, Vertex};

const OPCODES: &[&str] = &["add", "mul", "sub"];

/// A graph of one to six vertices over three opcodes.
#[derive(Clone, Debug)]
pub(crate) struct SmallGraph(pub Graph);

impl Arbitrary for SmallGraph {
    fn arbitrary(g: &mut Gen) -> Self {
        let n = usize::arbitrary(g) % 6 + 1;
        let vertices: Vec<Vertex> = (0..n)
            .map(|i| Vertex::new(format!("v{i}"), *g.choose(OPCODES).unwrap_or(&"add")))
            .collect();

        let m = usize::arbitrary(g) % (n + 3);
        let edges: Vec<Edge> = (0..m)
            .map(|slot| {
                let s = usize::arbitrary(g) % n;
                let d = usize::arbitrary(g) % n;
                Edge::new(format!("v{s}"), format!("v{d}"), slot)
            })
            .collect();

        Self(Graph::from_parts(vertices, edges))
    }
}

/// A permutation of vertex ids plus an edge-order shuffle.
#[derive(Clone, Debug)]
pub(crate) struct Relabeling {
    keys: Vec<u32>,
    reverse_edges: bool,
}

impl Arbitrary for Relabeling {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            keys: (0..8).map(|_| u32::arbitrary(g)).collect(),
            reverse_edges: bool::arbitrary(g),
        }
    }
}

impl Relabeling {
    /// The same graph with vertex ids renamed and vertices and edges
    /// presented in another order.
    pub(crate) fn apply(&self, graph: &Graph) -> Graph {
        let mut order: Vec<(u32, &Vertex)> = graph
            .vertices()
            .enumerate()
            .map(|(i, v)| (self.keys.get(i).copied().unwrap_or(0), v))
            .collect();
        order.sort_by_key(|(k, v)| (*k, v.id.clone()));

        let rename = |id: &str| format!("r_{id}");
        let vertices = order
            .iter()
            .map(|(_, v)| Vertex::new(rename(&v.id), v.opcode.clone()));

        let mut edges: Vec<Edge> = graph
            .edges()
            .iter()
            .map(|e| Edge::new(rename(&e.source), rename(&e.dest), e.arg_position))
            .collect();
        if self.reverse_edges {
            edges.reverse();
        }

        Graph::from_parts(vertices, edges)
    }
}
