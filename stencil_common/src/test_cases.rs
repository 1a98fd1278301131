//! Common test cases and fixtures for the stencil workspace.
//!
//! This module defines host graphs (built from instruction-record JSON),
//! patterns (stencil documents) and a collection of matcher test cases with
//! their expected match counts.

use crate::builder::GraphBuilder;
use crate::config::Config;
use crate::graph::Graph;
use crate::records::parse_records;
use crate::stencil::{Stencil, parse_stencils};

/// A graph to search in.
#[derive(Debug, Clone)]
pub struct Host {
    /// Short description.
    pub name: &'static str,
    /// The instruction records the graph was built from.
    pub records: &'static str,
    /// The built graph.
    pub graph: Graph,
}

impl Host {
    fn from_records(name: &'static str, records: &'static str) -> Self {
        let parsed = parse_records(records).expect("fixture records must parse");
        let output = GraphBuilder::build(&parsed);
        assert!(output.dangling.is_empty(), "fixture {name} has dangling edges");
        Self {
            name,
            records,
            graph: output.graph,
        }
    }
}

/// A stencil to search for.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// The stencil document it was parsed from.
    pub document: &'static str,
    /// The parsed stencil.
    pub stencil: Stencil,
}

impl Pattern {
    fn from_document(document: &'static str) -> Self {
        let stencil = parse_stencils(document)
            .expect("fixture stencil must parse")
            .into_iter()
            .next()
            .expect("fixture stencil document is empty");
        Self { document, stencil }
    }
}

/// A complete matcher test case.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// The name of the test case.
    pub name: &'static str,
    /// The configuration for the search.
    pub config: Config,
    /// The stencil to search for.
    pub pattern: &'static Pattern,
    /// The graph to search in.
    pub host: &'static Host,
    /// The expected number of matches.
    pub expected_matches: usize,
}

// #####################
// HOSTS
// #####################
lazy_static::lazy_static! {
    /// `mul -> add -> srem` plus an unrelated `shl -> add`.
    pub static ref CHAIN_HOST: Host = Host::from_records("chain", r#"[
        {"pointer": "m0", "opcode": "mul", "operands": []},
        {"pointer": "a0", "opcode": "add", "operands": [{"description": "instruction", "value": "m0"}]},
        {"pointer": "s0", "opcode": "srem", "operands": [{"description": "instruction", "value": "a0"}]},
        {"pointer": "h1", "opcode": "shl", "operands": []},
        {"pointer": "a1", "opcode": "add", "operands": [{"description": "instruction", "value": "h1"}]}
    ]"#);

    /// Two `mul`s feeding one `add`.
    pub static ref FAN_IN_HOST: Host = Host::from_records("fan_in", r#"[
        {"pointer": "m0", "opcode": "mul", "operands": []},
        {"pointer": "m1", "opcode": "mul", "operands": []},
        {"pointer": "a0", "opcode": "add", "operands": [
            {"description": "instruction", "value": "m0"},
            {"description": "instruction", "value": "m1"}]}
    ]"#);

    /// `mul` feeding `add` and `sub`, with `add` also feeding `sub`.
    pub static ref TRIANGLE_HOST: Host = Host::from_records("triangle", r#"[
        {"pointer": "m0", "opcode": "mul", "operands": []},
        {"pointer": "a0", "opcode": "add", "operands": [{"description": "instruction", "value": "m0"}]},
        {"pointer": "s0", "opcode": "sub", "operands": [
            {"description": "instruction", "value": "m0"},
            {"description": "instruction", "value": "a0"}]}
    ]"#);

    /// One `mul` used twice by the same `add`.
    pub static ref SQUARE_HOST: Host = Host::from_records("square", r#"[
        {"pointer": "m0", "opcode": "mul", "operands": []},
        {"pointer": "a0", "opcode": "add", "operands": [
            {"description": "instruction", "value": "m0"},
            {"description": "instruction", "value": "m0"}]}
    ]"#);

    /// Three disjoint two-vertex regions: `mul -> add`, `shl -> xor`, `and -> or`.
    pub static ref REGIONS_HOST: Host = Host::from_records("regions", r#"[
        {"pointer": "r0a", "opcode": "mul", "operands": []},
        {"pointer": "r0b", "opcode": "add", "operands": [{"description": "instruction", "value": "r0a"}]},
        {"pointer": "r1a", "opcode": "shl", "operands": []},
        {"pointer": "r1b", "opcode": "xor", "operands": [{"description": "instruction", "value": "r1a"}]},
        {"pointer": "r2a", "opcode": "and", "operands": []},
        {"pointer": "r2b", "opcode": "or", "operands": [{"description": "instruction", "value": "r2a"}]}
    ]"#);

    /// A block with operands of every kind and an escaping value.
    pub static ref MIXED_HOST: Host = Host::from_records("mixed", r#"[
        {"pointer": "p0", "opcode": "load", "operands": [{"description": "pointer", "value": "g0"}]},
        {"pointer": "p1", "opcode": "mul", "operands": [
            {"description": "instruction", "value": "p0"},
            {"description": "argument", "value": "x", "argument_number_in_function": 0}]},
        {"pointer": "p2", "opcode": "add", "operands": [
            {"description": "instruction", "value": "p1"},
            {"description": "constant", "value": 7}]},
        {"pointer": "p3", "opcode": "add", "operands": [
            {"description": "instruction", "value": "p2"},
            {"description": "instruction-external", "value": "q"}]},
        {"pointer": "p4", "opcode": "store", "operands": [
            {"description": "instruction", "value": "p3"},
            {"description": "pointer", "value": "g0"}]},
        {"pointer": "u0", "description": "out", "value": "p3"}
    ]"#);
}

// #####################
// PATTERNS
// #####################
lazy_static::lazy_static! {
    /// `mul -> add`.
    pub static ref MUL_ADD: Pattern = Pattern::from_document(r#"{
        "name": "mul_add",
        "nodes": [{"id": "0", "opcode": "mul"}, {"id": "1", "opcode": "add"}],
        "edges": [{"source": "0", "dest": "1", "arg_num_at_dest": 0}]
    }"#);

    /// `shl -> add`.
    pub static ref SHL_ADD: Pattern = Pattern::from_document(r#"{
        "name": "shl_add",
        "nodes": [{"id": "0", "opcode": "shl"}, {"id": "1", "opcode": "add"}],
        "edges": [{"source": "0", "dest": "1", "arg_num_at_dest": 0}]
    }"#);

    /// `mul -> srem`.
    pub static ref MUL_SREM: Pattern = Pattern::from_document(r#"{
        "name": "mul_srem",
        "nodes": [{"id": "0", "opcode": "mul"}, {"id": "1", "opcode": "srem"}],
        "edges": [{"source": "0", "dest": "1", "arg_num_at_dest": 0}]
    }"#);

    /// Two `mul`s feeding one `add`.
    pub static ref MUL_MUL_ADD: Pattern = Pattern::from_document(r#"{
        "name": "mul_mul_add",
        "nodes": [{"id": "0", "opcode": "mul"}, {"id": "1", "opcode": "mul"}, {"id": "2", "opcode": "add"}],
        "edges": [
            {"source": "0", "dest": "2", "arg_num_at_dest": 0},
            {"source": "1", "dest": "2", "arg_num_at_dest": 1}]
    }"#);

    /// `mul` feeding both `add` and `sub`.
    pub static ref MUL_FORK: Pattern = Pattern::from_document(r#"{
        "name": "mul_fork",
        "nodes": [{"id": "0", "opcode": "mul"}, {"id": "1", "opcode": "add"}, {"id": "2", "opcode": "sub"}],
        "edges": [
            {"source": "0", "dest": "1", "arg_num_at_dest": 0},
            {"source": "0", "dest": "2", "arg_num_at_dest": 0}]
    }"#);

    /// `mul` used twice by one `add`.
    pub static ref MUL_SQUARE: Pattern = Pattern::from_document(r#"{
        "name": "mul_square",
        "nodes": [{"id": "0", "opcode": "mul"}, {"id": "1", "opcode": "add"}],
        "edges": [
            {"source": "0", "dest": "1", "arg_num_at_dest": 0},
            {"source": "0", "dest": "1", "arg_num_at_dest": 1}]
    }"#);
}

// #####################
// TEST CASES
// #####################
lazy_static::lazy_static! {
    pub static ref BASIC_TEST_CASES: Vec<TestCase> = vec![
        TestCase {
            name: "mul_add_in_chain",
            config: Config::default(),
            pattern: &MUL_ADD,
            host: &CHAIN_HOST,
            expected_matches: 1,
        },
        TestCase {
            name: "shl_add_in_chain",
            config: Config::default(),
            pattern: &SHL_ADD,
            host: &CHAIN_HOST,
            expected_matches: 1,
        },
        TestCase {
            name: "mul_srem_skips_a_vertex",
            config: Config::default(),
            pattern: &MUL_SREM,
            host: &CHAIN_HOST,
            expected_matches: 0,
        },
        TestCase {
            name: "mul_add_in_fan_in",
            config: Config::default(),
            pattern: &MUL_ADD,
            host: &FAN_IN_HOST,
            expected_matches: 2,
        },
        TestCase {
            name: "mul_add_in_regions",
            config: Config::default(),
            pattern: &MUL_ADD,
            host: &REGIONS_HOST,
            expected_matches: 1,
        },
    ];

    pub static ref DEDUPE_TEST_CASES: Vec<TestCase> = vec![
        TestCase {
            name: "fan_in_all_mappings",
            config: Config::builder().none().build(),
            pattern: &MUL_MUL_ADD,
            host: &FAN_IN_HOST,
            expected_matches: 2,
        },
        TestCase {
            name: "fan_in_auto_morph",
            config: Config::builder().auto_morph().build(),
            pattern: &MUL_MUL_ADD,
            host: &FAN_IN_HOST,
            expected_matches: 1,
        },
    ];

    pub static ref MODE_TEST_CASES: Vec<TestCase> = vec![
        TestCase {
            name: "fan_in_strict_arity_rejects_partial_add",
            config: Config::builder().strict_arity().build(),
            pattern: &MUL_ADD,
            host: &FAN_IN_HOST,
            expected_matches: 0,
        },
        TestCase {
            name: "fan_in_strict_arity_accepts_full_add",
            config: Config::builder().strict_arity().build(),
            pattern: &MUL_MUL_ADD,
            host: &FAN_IN_HOST,
            expected_matches: 2,
        },
        TestCase {
            name: "triangle_monomorphism",
            config: Config::default(),
            pattern: &MUL_FORK,
            host: &TRIANGLE_HOST,
            expected_matches: 1,
        },
        TestCase {
            name: "triangle_induced",
            config: Config::builder().induced().build(),
            pattern: &MUL_FORK,
            host: &TRIANGLE_HOST,
            expected_matches: 0,
        },
        TestCase {
            name: "square_needs_both_edges",
            config: Config::default(),
            pattern: &MUL_SQUARE,
            host: &FAN_IN_HOST,
            expected_matches: 0,
        },
        TestCase {
            name: "square_in_square",
            config: Config::default(),
            pattern: &MUL_SQUARE,
            host: &SQUARE_HOST,
            expected_matches: 1,
        },
        TestCase {
            name: "single_edge_in_square",
            config: Config::default(),
            pattern: &MUL_ADD,
            host: &SQUARE_HOST,
            expected_matches: 1,
        },
    ];

    pub static ref ALL_TEST_CASES: Vec<TestCase> = {
        let mut all = BASIC_TEST_CASES.clone();
        all.extend(DEDUPE_TEST_CASES.clone());
        all.extend(MODE_TEST_CASES.clone());
        all
    };
}
