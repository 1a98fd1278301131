use std::collections::HashMap;

use super::NodeIndex;
use crate::graph::{Graph, Vertex};

/// Dense numbering of a graph's vertices plus per-opcode lookup.
#[derive(Clone, Debug)]
pub struct NodeRegistry<'a> {
    /// Vertices in graph insertion order
    nodes: Vec<&'a Vertex>,
    /// Arity recorded on the graph, by node index
    arity: Vec<usize>,
    /// Maps vertex id to internal NodeIndex
    id_map: HashMap<&'a str, NodeIndex>,
    /// Maps opcodes to lists of node indices
    opcode_indices: HashMap<&'a str, Vec<NodeIndex>>,
}

impl<'a> NodeRegistry<'a> {
    pub fn build(graph: &'a Graph) -> Self {
        let nodes: Vec<&'a Vertex> = graph.vertices().collect();
        let arity = nodes.iter().map(|v| graph.arity(&v.id)).collect();
        let id_map = Self::build_id_map(&nodes);
        let opcode_indices = Self::build_opcode_indices(&nodes);

        NodeRegistry {
            nodes,
            arity,
            id_map,
            opcode_indices,
        }
    }

    fn build_id_map(nodes: &[&'a Vertex]) -> HashMap<&'a str, NodeIndex> {
        nodes
            .iter()
            .enumerate()
            .map(|(idx, v)| (v.id.as_str(), NodeIndex::new(idx)))
            .collect()
    }

    fn build_opcode_indices(nodes: &[&'a Vertex]) -> HashMap<&'a str, Vec<NodeIndex>> {
        let mut opcode_indices: HashMap<&'a str, Vec<NodeIndex>> = HashMap::new();
        for (idx, v) in nodes.iter().enumerate() {
            opcode_indices
                .entry(v.opcode.as_str())
                .or_default()
                .push(NodeIndex::new(idx));
        }
        opcode_indices
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn vertex(&self, index: NodeIndex) -> &'a Vertex {
        self.nodes[index.index()]
    }

    pub fn arity(&self, index: NodeIndex) -> usize {
        self.arity[index.index()]
    }

    pub fn resolve(&self, id: &str) -> Option<NodeIndex> {
        self.id_map.get(id).copied()
    }

    pub fn nodes_of_opcode(&self, opcode: &str) -> &[NodeIndex] {
        self.opcode_indices
            .get(opcode)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn opcode_count(&self, opcode: &str) -> usize {
        self.nodes_of_opcode(opcode).len()
    }
}
