//! Mutually-exclusive match selection.
//!
//! A greedy packing: matches are visited largest first and accepted when
//! none of their host vertices is already covered. This is a heuristic. It
//! returns a vertex-disjoint set but not necessarily the largest one.

use std::collections::HashSet;

use tracing::debug;

use crate::match_::Match;

/// Select a vertex-disjoint subset of `matches`, largest matches first.
///
/// Ties keep input order, so the result is deterministic.
#[must_use]
pub fn select_exclusive<'m>(matches: impl IntoIterator<Item = &'m Match>) -> Vec<&'m Match> {
    let mut ordered: Vec<&Match> = matches.into_iter().collect();
    ordered.sort_by_key(|m| std::cmp::Reverse(m.len()));

    let mut covered: HashSet<&str> = HashSet::new();
    let considered = ordered.len();
    let selected: Vec<&Match> = ordered
        .into_iter()
        .filter(|m| {
            if m.host_vertices().any(|v| covered.contains(v)) {
                return false;
            }
            covered.extend(m.host_vertices());
            true
        })
        .collect();

    debug!(
        "selected {} exclusive matches out of {}",
        selected.len(),
        considered
    );
    selected
}

/// Owned variant of [`select_exclusive`].
#[must_use]
pub fn select_exclusive_owned(matches: &[Match]) -> Vec<Match> {
    select_exclusive(matches).into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(template: &str, hosts: &[&str]) -> Match {
        Match {
            template_id: template.into(),
            match_idx: 0,
            node_matches: hosts
                .iter()
                .enumerate()
                .map(|(i, h)| ((*h).to_owned(), i.to_string()))
                .collect(),
        }
    }

    #[test]
    fn larger_matches_win() {
        let small = m("s", &["a", "b"]);
        let large = m("l", &["b", "c", "d"]);
        let other = m("o", &["e", "f"]);
        let picked = select_exclusive([&small, &large, &other]);
        let names: Vec<&str> = picked.iter().map(|m| m.template_id.as_str()).collect();
        assert_eq!(names, ["l", "o"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let first = m("first", &["a", "b"]);
        let second = m("second", &["b", "c"]);
        let picked = select_exclusive([&first, &second]);
        assert_eq!(picked, [&first]);
    }

    #[test]
    fn empty_input() {
        assert!(select_exclusive_owned(&[]).is_empty());
    }
}

#[cfg(test)]
mod property_tests {
    use quickcheck::{Arbitrary, Gen, quickcheck};

    use super::*;

    #[derive(Clone, Debug)]
    struct MatchList(Vec<Match>);

    impl Arbitrary for MatchList {
        fn arbitrary(g: &mut Gen) -> Self {
            let count = usize::arbitrary(g) % 12;
            let list = (0..count)
                .map(|i| {
                    let size = usize::arbitrary(g) % 4 + 1;
                    let node_matches = (0..size)
                        .map(|k| (format!("h{}", usize::arbitrary(g) % 10), k.to_string()))
                        .collect();
                    Match {
                        template_id: format!("t{}", i % 3),
                        match_idx: i,
                        node_matches,
                    }
                })
                .collect();
            Self(list)
        }
    }

    quickcheck! {
        fn prop_selection_is_vertex_disjoint(list: MatchList) -> bool {
            let picked = select_exclusive(&list.0);
            picked.iter().enumerate().all(|(i, a)| {
                picked[i + 1..].iter().all(|b| !a.overlaps(b))
            })
        }

        fn prop_selection_is_maximal(list: MatchList) -> bool {
            // every rejected match collides with something selected
            let picked = select_exclusive(&list.0);
            list.0.iter().all(|m| picked.iter().any(|p| p.overlaps(m)))
        }
    }
}
