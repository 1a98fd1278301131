mod connectivity_graph;
mod node_registry;

pub use connectivity_graph::ConnectivityGraph;
pub use node_registry::NodeRegistry;

use std::collections::HashSet;

use crate::graph::{Graph, Vertex};

/// Dense index of a vertex inside a [`GraphIndex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Wrap a raw position.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// The raw position.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read-only adjacency and opcode index over a borrowed [`Graph`].
#[derive(Clone, Debug)]
pub struct GraphIndex<'a> {
    registry: NodeRegistry<'a>,
    connectivity: ConnectivityGraph,
}

impl<'a> GraphIndex<'a> {
    /// Index `graph`.
    #[must_use]
    pub fn build(graph: &'a Graph) -> Self {
        // 1. Number the vertices
        let registry = NodeRegistry::build(graph);

        // 2. Build adjacency using the registry
        let connectivity = ConnectivityGraph::build(graph, &registry);

        GraphIndex {
            registry,
            connectivity,
        }
    }

    /// Number of indexed vertices.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.registry.len()
    }

    /// All node indices in graph order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + use<> {
        (0..self.registry.len()).map(NodeIndex::new)
    }

    // Delegate to node registry
    /// Vertex behind `node`.
    #[must_use]
    pub fn vertex(&self, node: NodeIndex) -> &'a Vertex {
        self.registry.vertex(node)
    }

    /// Opcode of `node`.
    #[must_use]
    pub fn opcode(&self, node: NodeIndex) -> &'a str {
        self.registry.vertex(node).opcode.as_str()
    }

    /// Arity of `node` as recorded on the graph.
    #[must_use]
    pub fn arity(&self, node: NodeIndex) -> usize {
        self.registry.arity(node)
    }

    /// Resolve a vertex id.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<NodeIndex> {
        self.registry.resolve(id)
    }

    /// Every node carrying `opcode`, in graph order.
    #[must_use]
    pub fn nodes_of_opcode(&self, opcode: &str) -> &[NodeIndex] {
        self.registry.nodes_of_opcode(opcode)
    }

    /// How many nodes carry `opcode`.
    #[must_use]
    pub fn opcode_count(&self, opcode: &str) -> usize {
        self.registry.opcode_count(opcode)
    }

    // Delegate to connectivity graph
    /// Producers of `node` with the slot each one fills.
    #[must_use]
    pub fn fanin(&self, node: NodeIndex) -> &[(NodeIndex, usize)] {
        self.connectivity.fanin(node)
    }

    /// Distinct producers of `node`.
    #[must_use]
    pub fn fanin_set(&self, node: NodeIndex) -> &HashSet<NodeIndex> {
        self.connectivity.fanin_set(node)
    }

    /// Distinct consumers of `node`.
    #[must_use]
    pub fn fanout_set(&self, node: NodeIndex) -> &HashSet<NodeIndex> {
        self.connectivity.fanout_set(node)
    }

    /// Number of parallel edges `src -> dst`.
    #[must_use]
    pub fn edge_multiplicity(&self, src: NodeIndex, dst: NodeIndex) -> usize {
        self.connectivity.multiplicity(src, dst)
    }

    /// Distinct neighbours of `node` in either direction.
    #[must_use]
    pub fn neighbours(&self, node: NodeIndex) -> HashSet<NodeIndex> {
        self.fanin_set(node)
            .union(self.fanout_set(node))
            .copied()
            .collect()
    }
}
