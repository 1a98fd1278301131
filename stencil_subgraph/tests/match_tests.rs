#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use stencil_common::{
    CHAIN_HOST, FAN_IN_HOST, MIXED_HOST, MUL_ADD, MUL_FORK, MUL_MUL_ADD, MUL_SQUARE, SHL_ADD,
    SQUARE_HOST, TRIANGLE_HOST,
};
use stencil_subgraph::match_test;

match_test! {
    name: chain_mul_add,
    pattern: &MUL_ADD.stencil,
    host: &CHAIN_HOST.graph,
    expect: 1
}

match_test! {
    name: chain_shl_add,
    pattern: &SHL_ADD.stencil,
    host: &CHAIN_HOST.graph,
    expect: 1
}

match_test! {
    name: fan_in_pair_deduplicated,
    pattern: &MUL_MUL_ADD.stencil,
    host: &FAN_IN_HOST.graph,
    expect: 1,
    config: |b| b.auto_morph()
}

match_test! {
    name: fan_in_strict_arity,
    pattern: &MUL_ADD.stencil,
    host: &FAN_IN_HOST.graph,
    expect: 0,
    config: |b| b.strict_arity()
}

match_test! {
    name: triangle_fork,
    pattern: &MUL_FORK.stencil,
    host: &TRIANGLE_HOST.graph,
    expect: 1
}

match_test! {
    name: triangle_fork_induced,
    pattern: &MUL_FORK.stencil,
    host: &TRIANGLE_HOST.graph,
    expect: 0,
    config: |b| b.induced()
}

match_test! {
    name: square_induced,
    pattern: &MUL_SQUARE.stencil,
    host: &SQUARE_HOST.graph,
    expect: 1,
    config: |b| b.induced()
}

match_test! {
    name: single_edge_not_induced_in_square,
    pattern: &MUL_ADD.stencil,
    host: &SQUARE_HOST.graph,
    expect: 0,
    config: |b| b.induced()
}

match_test! {
    name: mixed_block_mul_add,
    pattern: &MUL_ADD.stencil,
    host: &MIXED_HOST.graph,
    expect: 1
}
