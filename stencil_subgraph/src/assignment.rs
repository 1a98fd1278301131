//! Mapping between needle (stencil) and haystack (host) nodes.

use std::collections::HashMap;

use contracts::*;
use stencil_common::NodeIndex;

/// A collection of mappings found during a search.
#[derive(Clone, Debug, Default)]
pub struct AssignmentSet {
    /// The complete mappings found in the haystack.
    pub items: Vec<SingleAssignment>,
}

impl AssignmentSet {
    /// Creates a set from a list of assignments.
    #[must_use]
    pub const fn new(items: Vec<SingleAssignment>) -> Self {
        Self { items }
    }

    /// Returns true if no matches were found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the count of found matches.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }
}

/// An injective partial mapping built up during the search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SingleAssignment {
    /// Stencil to host node mapping
    needle_to_haystack: HashMap<NodeIndex, NodeIndex>,
    /// Host to stencil node mapping
    haystack_to_needle: HashMap<NodeIndex, NodeIndex>,
}

impl SingleAssignment {
    /// Checks that both directions describe the same bijection.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.needle_to_haystack.len() == self.haystack_to_needle.len()
            && self
                .needle_to_haystack
                .iter()
                .all(|(n, h)| self.haystack_to_needle.get(h) == Some(n))
    }

    /// Creates an empty mapping.
    #[debug_ensures(ret.is_consistent())]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a needle node with a free haystack node.
    #[debug_requires(self.haystack_is_free(haystack))]
    #[debug_requires(self.get_haystack_node(needle).is_none())]
    #[debug_ensures(self.is_consistent())]
    pub(crate) fn assign(&mut self, needle: NodeIndex, haystack: NodeIndex) {
        self.needle_to_haystack.insert(needle, haystack);
        self.haystack_to_needle.insert(haystack, needle);
    }

    /// Undo the assignment of `needle`, returning its haystack partner.
    #[debug_ensures(self.is_consistent())]
    pub(crate) fn remove_by_needle(&mut self, needle: NodeIndex) -> Option<NodeIndex> {
        let haystack = self.needle_to_haystack.remove(&needle)?;
        self.haystack_to_needle.remove(&haystack);
        Some(haystack)
    }

    /// Haystack partner of a needle node.
    #[must_use]
    pub fn get_haystack_node(&self, needle: NodeIndex) -> Option<NodeIndex> {
        self.needle_to_haystack.get(&needle).copied()
    }

    /// Needle partner of a haystack node.
    #[must_use]
    pub fn get_needle_node(&self, haystack: NodeIndex) -> Option<NodeIndex> {
        self.haystack_to_needle.get(&haystack).copied()
    }

    /// Returns true if the haystack node is not yet assigned.
    #[must_use]
    pub fn haystack_is_free(&self, haystack: NodeIndex) -> bool {
        !self.haystack_to_needle.contains_key(&haystack)
    }

    /// Number of assigned pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.needle_to_haystack.len(), self.haystack_to_needle.len());
        self.needle_to_haystack.len()
    }

    /// Returns true if nothing is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Host-to-stencil view of the mapping.
    #[must_use]
    pub const fn haystack_mapping(&self) -> &HashMap<NodeIndex, NodeIndex> {
        &self.haystack_to_needle
    }

    /// Sorted haystack nodes covered by this mapping.
    ///
    /// Two mappings that differ only by a stencil automorphism share a
    /// signature.
    #[must_use]
    pub fn signature(&self) -> Vec<NodeIndex> {
        let mut sig: Vec<NodeIndex> = self.haystack_to_needle.keys().copied().collect();
        sig.sort_unstable();
        sig
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn assign_and_remove_keep_both_directions() {
        let mut a = SingleAssignment::new();
        a.assign(n(0), n(5));
        a.assign(n(1), n(3));
        assert_eq!(a.len(), 2);
        assert_eq!(a.get_haystack_node(n(0)), Some(n(5)));
        assert_eq!(a.get_needle_node(n(3)), Some(n(1)));
        assert!(!a.haystack_is_free(n(5)));

        assert_eq!(a.remove_by_needle(n(0)), Some(n(5)));
        assert!(a.haystack_is_free(n(5)));
        assert_eq!(a.remove_by_needle(n(0)), None);
        assert!(a.is_consistent());
    }

    #[test]
    fn signature_ignores_pairing() {
        let mut a = SingleAssignment::new();
        a.assign(n(0), n(7));
        a.assign(n(1), n(2));
        let mut b = SingleAssignment::new();
        b.assign(n(0), n(2));
        b.assign(n(1), n(7));
        assert_ne!(a, b);
        assert_eq!(a.signature(), b.signature());
        assert_eq!(a.signature(), vec![n(2), n(7)]);
    }
}
