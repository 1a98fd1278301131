use std::collections::{HashMap, HashSet};

use super::NodeIndex;
use super::node_registry::NodeRegistry;
use crate::graph::Graph;

type SlotList = Vec<Vec<(NodeIndex, usize)>>;

#[derive(Clone, Debug)]
pub struct ConnectivityGraph {
    /// Maps each node to its fan-in nodes with operand slot
    fanin: SlotList,
    fanin_sets: Vec<HashSet<NodeIndex>>,
    fanout_sets: Vec<HashSet<NodeIndex>>,
    /// Number of parallel edges per ordered pair
    multiplicity: HashMap<(NodeIndex, NodeIndex), usize>,
}

impl ConnectivityGraph {
    #[must_use]
    pub fn build(graph: &Graph, registry: &NodeRegistry<'_>) -> Self {
        let n = registry.len();
        let mut fanin: SlotList = vec![Vec::new(); n];
        let mut fanin_sets: Vec<HashSet<NodeIndex>> = vec![HashSet::new(); n];
        let mut fanout_sets: Vec<HashSet<NodeIndex>> = vec![HashSet::new(); n];
        let mut multiplicity: HashMap<(NodeIndex, NodeIndex), usize> = HashMap::new();

        for edge in graph.edges() {
            let (Some(src), Some(dst)) = (registry.resolve(&edge.source), registry.resolve(&edge.dest))
            else {
                continue;
            };
            fanin[dst.index()].push((src, edge.arg_position));
            fanout_sets[src.index()].insert(dst);
            fanin_sets[dst.index()].insert(src);
            *multiplicity.entry((src, dst)).or_default() += 1;
        }

        Self {
            fanin,
            fanin_sets,
            fanout_sets,
            multiplicity,
        }
    }

    #[must_use]
    pub fn fanin(&self, node: NodeIndex) -> &[(NodeIndex, usize)] {
        &self.fanin[node.index()]
    }

    #[must_use]
    pub fn fanin_set(&self, node: NodeIndex) -> &HashSet<NodeIndex> {
        &self.fanin_sets[node.index()]
    }

    #[must_use]
    pub fn fanout_set(&self, node: NodeIndex) -> &HashSet<NodeIndex> {
        &self.fanout_sets[node.index()]
    }

    #[must_use]
    pub fn multiplicity(&self, src: NodeIndex, dst: NodeIndex) -> usize {
        self.multiplicity.get(&(src, dst)).copied().unwrap_or(0)
    }
}
