//! Turns instruction records into a [`Graph`].
//!
//! Synthetic names (`constant_N`, `external_N`, `out_N`) are numbered by
//! counters owned by the builder, so independent builds never interfere.

use tracing::{debug, info, warn};

use crate::graph::{Edge, Graph, Vertex};
use crate::records::{InstructionRecord, Operand};

/// A finished build: the graph plus the edges that could not be attached.
#[derive(Clone, Debug, Default)]
pub struct BuildOutput {
    /// The assembled graph, arity computed. Contains no dangling edges.
    pub graph: Graph,
    /// Edges that referenced an id never defined by any record.
    pub dangling: Vec<Edge>,
}

/// Incremental graph builder scoped to one input.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    const_num: usize,
    ext_num: usize,
    out_num: usize,
}

impl GraphBuilder {
    /// A builder with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a full record list.
    #[must_use]
    pub fn build(records: &[InstructionRecord]) -> BuildOutput {
        let mut builder = Self::new();
        for record in records {
            builder.add_record(record);
        }
        builder.finish()
    }

    /// Add one record. Forward references are allowed.
    pub fn add_record(&mut self, record: &InstructionRecord) {
        match record {
            InstructionRecord::Instruction {
                pointer,
                opcode,
                operands,
            } => self.add_instruction(pointer, opcode, operands),
            InstructionRecord::Out { value, .. } => self.add_out(value),
        }
    }

    fn add_instruction(&mut self, pointer: &str, opcode: &str, operands: &[Operand]) {
        if let Some(previous) = self.graph.insert_vertex(Vertex::new(pointer, opcode)) {
            if previous.opcode != opcode {
                debug!(
                    "vertex {} redefined: {} -> {}",
                    pointer, previous.opcode, opcode
                );
            }
        }

        for (slot, operand) in operands.iter().enumerate() {
            let source = match operand {
                Operand::Instruction { value } => value.clone(),
                Operand::InstructionExternal { .. } => {
                    let name = format!("external_{}", self.ext_num);
                    self.ext_num += 1;
                    self.graph.insert_vertex(Vertex::new(&name, &name));
                    name
                }
                Operand::Constant { .. } => {
                    let name = format!("constant_{}", self.const_num);
                    self.const_num += 1;
                    self.graph.insert_vertex(Vertex::new(&name, &name));
                    name
                }
                Operand::Argument {
                    value,
                    argument_number,
                } => {
                    if !self.graph.contains_vertex(value) {
                        let position = argument_number.unwrap_or(slot);
                        self.graph
                            .insert_vertex(Vertex::new(value, format!("argument_{position}")));
                    }
                    value.clone()
                }
                Operand::Pointer { value } => {
                    if !self.graph.contains_vertex(value) {
                        self.graph.insert_vertex(Vertex::new(value, "pointer"));
                    }
                    value.clone()
                }
            };
            self.graph.push_edge(Edge::new(source, pointer, slot));
        }
    }

    fn add_out(&mut self, value: &str) {
        let name = format!("out_{}", self.out_num);
        self.out_num += 1;
        self.graph.insert_vertex(Vertex::new(&name, &name));
        self.graph.push_edge(Edge::new(value, name, 0));
    }

    /// Detach dangling edges, compute arity and hand the graph over.
    #[must_use]
    pub fn finish(mut self) -> BuildOutput {
        let dangling = self.graph.remove_dangling_edges();
        if !dangling.is_empty() {
            warn!(
                "{} dangling edge(s) reference undefined vertices; dropped",
                dangling.len()
            );
            for e in &dangling {
                debug!("dangling edge {} -> {} (slot {})", e.source, e.dest, e.arg_position);
            }
        }
        self.graph.finalize();

        info!(
            "built graph: {} vertices, {} edges ({} instructions)",
            self.graph.num_vertices(),
            self.graph.num_edges(),
            self.graph.num_instructions()
        );

        BuildOutput {
            graph: self.graph,
            dangling,
        }
    }
}
