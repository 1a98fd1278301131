//! The serializable record of one stencil occurrence in a host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stencil_common::GraphIndex;

use crate::assignment::SingleAssignment;

/// One occurrence of a stencil in a host graph.
///
/// `node_matches` maps host vertex ids to stencil vertex ids; it is injective
/// and preserves opcodes and every stencil edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Name of the stencil this is an occurrence of.
    pub template_id: String,
    /// Position of this match in its stencil's match list.
    pub match_idx: usize,
    /// Host vertex id -> stencil vertex id.
    pub node_matches: BTreeMap<String, String>,
}

impl Match {
    /// Resolve an assignment against the two indices it was found on.
    #[must_use]
    pub fn from_assignment(
        template_id: &str,
        match_idx: usize,
        assignment: &SingleAssignment,
        needle: &GraphIndex<'_>,
        haystack: &GraphIndex<'_>,
    ) -> Self {
        let node_matches = assignment
            .haystack_mapping()
            .iter()
            .map(|(&h, &n)| (haystack.vertex(h).id.clone(), needle.vertex(n).id.clone()))
            .collect();
        Self {
            template_id: template_id.to_owned(),
            match_idx,
            node_matches,
        }
    }

    /// Number of host vertices covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node_matches.len()
    }

    /// Returns true if the match covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_matches.is_empty()
    }

    /// Host vertex ids covered by this match, in sorted order.
    pub fn host_vertices(&self) -> impl Iterator<Item = &str> {
        self.node_matches.keys().map(String::as_str)
    }

    /// Whether this match shares a host vertex with `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.host_vertices()
            .any(|v| other.node_matches.contains_key(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pairs: &[(&str, &str)]) -> Match {
        Match {
            template_id: "t".into(),
            match_idx: 0,
            node_matches: pairs
                .iter()
                .map(|(h, s)| ((*h).to_owned(), (*s).to_owned()))
                .collect(),
        }
    }

    #[test]
    fn overlap() {
        let a = m(&[("x", "0"), ("y", "1")]);
        let b = m(&[("y", "0"), ("z", "1")]);
        let c = m(&[("w", "0")]);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert_eq!(a.host_vertices().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn serialized_field_names() {
        let json = serde_json::to_value(m(&[("h", "s")])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"template_id": "t", "match_idx": 0, "node_matches": {"h": "s"}})
        );
    }
}
