#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use rstest::rstest;
use stencil_common::{ALL_TEST_CASES, BASIC_TEST_CASES, DEDUPE_TEST_CASES, MODE_TEST_CASES, TestCase};
use stencil_subgraph::find_matches;
use stencil_subgraph::test_harness::setup_test_logging;

fn run_case(tc: &TestCase) -> Result<(), String> {
    let matches = find_matches(&tc.pattern.stencil, &tc.host.graph, &tc.config);
    if matches.len() != tc.expected_matches {
        return Err(format!(
            "test case '{}' ({} in {}) failed: expected {} matches, got {}",
            tc.name,
            tc.pattern.stencil.name,
            tc.host.name,
            tc.expected_matches,
            matches.len()
        ));
    }
    Ok(())
}

#[rstest]
#[case::basic(&BASIC_TEST_CASES)]
#[case::dedupe(&DEDUPE_TEST_CASES)]
#[case::modes(&MODE_TEST_CASES)]
fn stencil_cases(#[case] cases: &[TestCase]) {
    setup_test_logging();

    let failures: Vec<String> = cases.iter().map(run_case).filter_map(Result::err).collect();
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn every_case_is_collected() {
    assert_eq!(
        ALL_TEST_CASES.len(),
        BASIC_TEST_CASES.len() + DEDUPE_TEST_CASES.len() + MODE_TEST_CASES.len()
    );
}

#[test]
fn matches_map_every_stencil_vertex() {
    setup_test_logging();

    for tc in ALL_TEST_CASES.iter() {
        for m in find_matches(&tc.pattern.stencil, &tc.host.graph, &tc.config) {
            assert_eq!(m.len(), tc.pattern.stencil.graph.num_vertices(), "{}", tc.name);
            assert_eq!(m.template_id, tc.pattern.stencil.name);
        }
    }
}
