//! Data-flow graph model: vertices, edges and the graph that owns them.
//!
//! A [`Graph`] keeps vertices in insertion order so that every traversal
//! built on top of it is deterministic. Arity (in-degree) is a derived
//! attribute computed once by [`Graph::finalize`] and carried unchanged into
//! edge-subgraphs and working copies.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const SYNTHETIC_PREFIXES: &[&str] = &["constant_", "external_", "argument_", "out_"];

/// Whether `opcode` is a synthetic tag rather than an instruction mnemonic.
#[must_use]
pub fn is_synthetic_opcode(opcode: &str) -> bool {
    opcode == "pointer" || SYNTHETIC_PREFIXES.iter().any(|p| opcode.starts_with(p))
}

/// A graph vertex: an instruction or a synthesized operand/sink.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique handle (instruction pointer or synthesized name).
    pub id: String,
    /// Instruction mnemonic or synthetic tag.
    pub opcode: String,
}

impl Vertex {
    /// Create a vertex.
    pub fn new(id: impl Into<String>, opcode: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            opcode: opcode.into(),
        }
    }

    /// Whether this vertex is a real instruction (not a synthetic tag).
    #[must_use]
    pub fn is_instruction(&self) -> bool {
        !is_synthetic_opcode(&self.opcode)
    }
}

/// A directed data-flow edge `source -> dest`.
///
/// `arg_position` is the operand slot at `dest` filled by `source`. Matching
/// ignores it, but it is preserved so exported stencils can re-emit it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    /// Producing vertex.
    pub source: String,
    /// Consuming vertex.
    pub dest: String,
    /// Operand slot at `dest`.
    #[serde(rename = "arg_num_at_dest")]
    pub arg_position: usize,
}

impl Edge {
    /// Create an edge.
    pub fn new(source: impl Into<String>, dest: impl Into<String>, arg_position: usize) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            arg_position,
        }
    }
}

/// A vertex set with unique ids plus an edge list.
///
/// Invariant (once built): every edge's endpoints are in the vertex set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    vertices: IndexMap<String, Vertex>,
    edges: Vec<Edge>,
    arity: HashMap<String, usize>,
}

impl Graph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a graph from parts and compute arity.
    ///
    /// Edges whose endpoints are missing are kept out of the result.
    pub fn from_parts(
        vertices: impl IntoIterator<Item = Vertex>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let mut graph = Self::new();
        for v in vertices {
            graph.insert_vertex(v);
        }
        for e in edges {
            graph.push_edge(e);
        }
        graph.remove_dangling_edges();
        graph.finalize();
        graph
    }

    /// Insert or replace a vertex, returning the previous one with that id.
    pub fn insert_vertex(&mut self, vertex: Vertex) -> Option<Vertex> {
        self.vertices.insert(vertex.id.clone(), vertex)
    }

    /// Append an edge. Endpoints are not checked until [`Graph::dangling_edges`].
    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Compute arity for every vertex from the current edge list.
    pub fn finalize(&mut self) {
        let mut arity: HashMap<String, usize> =
            self.vertices.keys().map(|id| (id.clone(), 0)).collect();
        for edge in &self.edges {
            if let Some(n) = arity.get_mut(&edge.dest) {
                *n += 1;
            }
        }
        self.arity = arity;
    }

    /// Edges with at least one endpoint missing from the vertex set.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| !self.is_attached(e))
    }

    /// Remove and return every dangling edge.
    pub fn remove_dangling_edges(&mut self) -> Vec<Edge> {
        let (kept, dangling): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| self.vertices.contains_key(&e.source) && self.vertices.contains_key(&e.dest));
        self.edges = kept;
        dangling
    }

    fn is_attached(&self, edge: &Edge) -> bool {
        self.vertices.contains_key(&edge.source) && self.vertices.contains_key(&edge.dest)
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl ExactSizeIterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All edges.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Look up a vertex by id.
    #[must_use]
    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Opcode of the vertex `id`.
    #[must_use]
    pub fn opcode(&self, id: &str) -> Option<&str> {
        self.vertices.get(id).map(|v| v.opcode.as_str())
    }

    /// Whether a vertex with `id` exists.
    #[must_use]
    pub fn contains_vertex(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    /// Arity (in-degree) recorded for `id` at the last [`Graph::finalize`].
    #[must_use]
    pub fn arity(&self, id: &str) -> usize {
        self.arity.get(id).copied().unwrap_or(0)
    }

    /// Number of vertices.
    #[must_use]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Build the subgraph spanned by the given edges.
    ///
    /// Vertices appear in first-seen order along `edge_indices`; arity is
    /// copied from this graph rather than recomputed.
    #[must_use]
    pub fn edge_subgraph(&self, edge_indices: &[usize]) -> Self {
        let mut sub = Self::new();
        for &i in edge_indices {
            let Some(edge) = self.edges.get(i) else {
                continue;
            };
            for id in [&edge.source, &edge.dest] {
                if !sub.vertices.contains_key(id) {
                    if let Some(v) = self.vertices.get(id) {
                        sub.insert_vertex(v.clone());
                        sub.arity.insert(id.clone(), self.arity(id));
                    }
                }
            }
            sub.push_edge(edge.clone());
        }
        sub
    }

    /// Copy with vertex ids replaced by their insertion position (`"0"`, `"1"`, ...).
    ///
    /// Opcodes, edge order, slots and recorded arity are preserved.
    #[must_use]
    pub fn relabeled(&self) -> Self {
        let ids: HashMap<&str, String> = self
            .vertices
            .keys()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i.to_string()))
            .collect();

        let mut out = Self::new();
        for v in self.vertices.values() {
            let id = ids[v.id.as_str()].clone();
            out.arity.insert(id.clone(), self.arity(&v.id));
            out.insert_vertex(Vertex::new(id, v.opcode.clone()));
        }
        for e in &self.edges {
            if let (Some(s), Some(d)) = (ids.get(e.source.as_str()), ids.get(e.dest.as_str())) {
                out.push_edge(Edge::new(s.clone(), d.clone(), e.arg_position));
            }
        }
        out
    }

    /// Remove vertices and every edge touching them.
    ///
    /// Arity of the remaining vertices is left as it was.
    pub fn remove_vertices<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> usize {
        let mut removed = 0;
        let mut gone: HashSet<&str> = HashSet::new();
        for id in ids {
            if self.vertices.shift_remove(id).is_some() {
                self.arity.remove(id);
                removed += 1;
            }
            gone.insert(id);
        }
        self.edges
            .retain(|e| !gone.contains(e.source.as_str()) && !gone.contains(e.dest.as_str()));
        removed
    }

    /// Whether the graph is weakly connected. The empty graph is not.
    #[must_use]
    pub fn is_weakly_connected(&self) -> bool {
        let Some(first) = self.vertices.keys().next() else {
            return false;
        };

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for e in &self.edges {
            adjacency.entry(&e.source).or_default().push(&e.dest);
            adjacency.entry(&e.dest).or_default().push(&e.source);
        }

        let mut seen: HashSet<&str> = HashSet::from([first.as_str()]);
        let mut queue: VecDeque<&str> = VecDeque::from([first.as_str()]);
        while let Some(v) = queue.pop_front() {
            for &n in adjacency.get(v).map(Vec::as_slice).unwrap_or_default() {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        seen.len() == self.vertices.len()
    }

    /// Number of vertices carrying a real instruction opcode.
    #[must_use]
    pub fn num_instructions(&self) -> usize {
        self.vertices().filter(|v| v.is_instruction()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Graph {
        Graph::from_parts(
            [
                Vertex::new("a", "mul"),
                Vertex::new("b", "add"),
                Vertex::new("c", "srem"),
                Vertex::new("k", "constant_0"),
            ],
            [
                Edge::new("a", "b", 0),
                Edge::new("k", "b", 1),
                Edge::new("b", "c", 0),
            ],
        )
    }

    #[test]
    fn arity_counts_incoming_edges() {
        let g = chain();
        assert_eq!(g.arity("a"), 0);
        assert_eq!(g.arity("b"), 2);
        assert_eq!(g.arity("c"), 1);
        assert_eq!(g.arity("missing"), 0);
    }

    #[test]
    fn from_parts_drops_dangling_edges() {
        let g = Graph::from_parts(
            [Vertex::new("a", "add")],
            [Edge::new("ghost", "a", 0)],
        );
        assert_eq!(g.num_edges(), 0);
        assert_eq!(g.arity("a"), 0);
    }

    #[test]
    fn edge_subgraph_keeps_host_arity() {
        let g = chain();
        let sub = g.edge_subgraph(&[0]);
        assert_eq!(sub.num_vertices(), 2);
        assert_eq!(sub.num_edges(), 1);
        assert_eq!(sub.arity("b"), 2);
        assert!(sub.is_weakly_connected());
    }

    #[test]
    fn relabeled_keeps_shape_and_arity() {
        let g = chain();
        let sub = g.edge_subgraph(&[2, 0]).relabeled();
        let ids: Vec<&str> = sub.vertices().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["0", "1", "2"]);
        assert_eq!(sub.opcode("0"), Some("add"));
        assert_eq!(sub.opcode("2"), Some("mul"));
        assert_eq!(sub.arity("0"), 2);
        assert_eq!(sub.edges(), &[Edge::new("0", "1", 0), Edge::new("2", "0", 0)]);
    }

    #[test]
    fn remove_vertices_drops_incident_edges() {
        let mut g = chain();
        let removed = g.remove_vertices(["b"]);
        assert_eq!(removed, 1);
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 0);
        assert_eq!(g.arity("c"), 1);
    }

    #[test]
    fn connectivity() {
        let g = chain();
        assert!(g.is_weakly_connected());

        let split = Graph::from_parts(
            [Vertex::new("a", "add"), Vertex::new("b", "add")],
            [],
        );
        assert!(!split.is_weakly_connected());
        assert!(!Graph::new().is_weakly_connected());
    }

    #[test]
    fn synthetic_tags() {
        assert!(is_synthetic_opcode("constant_3"));
        assert!(is_synthetic_opcode("argument_0"));
        assert!(is_synthetic_opcode("external_12"));
        assert!(is_synthetic_opcode("out_1"));
        assert!(is_synthetic_opcode("pointer"));
        assert!(!is_synthetic_opcode("add"));
        assert_eq!(chain().num_instructions(), 3);
    }
}
