//! Utility functions for the subgraph matcher.

use std::collections::HashSet;
use std::hash::Hash;

/// Computes the intersection of a list of borrowed sets.
///
/// An empty list yields an empty set.
pub fn intersect_sets<T: Eq + Hash + Clone>(mut items: Vec<&HashSet<T>>) -> HashSet<T> {
    let Some(first) = items.pop() else {
        return HashSet::new();
    };

    items.iter().fold(first.clone(), |acc, hs| &acc & *hs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_three() {
        let a: HashSet<u32> = [1, 2, 3].into();
        let b: HashSet<u32> = [2, 3, 4].into();
        let c: HashSet<u32> = [3, 2, 9].into();
        let out = intersect_sets(vec![&a, &b, &c]);
        assert_eq!(out, [2, 3].into());
    }

    #[test]
    fn empty_list() {
        assert!(intersect_sets::<u32>(vec![]).is_empty());
    }
}
