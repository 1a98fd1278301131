//! Stencils and their node/edge document form.
//!
//! A stencil document is either a single object
//!
//! ```json
//! { "name": "...", "nodes": [{"id": "n0", "opcode": "mul"}],
//!   "edges": [{"source": "n0", "dest": "n1", "arg_num_at_dest": 0}] }
//! ```
//!
//! or a list of such objects. Exports always write a list.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::graph::{Edge, Graph, Vertex};

/// A small pattern graph with a display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stencil {
    /// Template identifier (normally the canonical name).
    pub name: String,
    /// The pattern.
    pub graph: Graph,
}

impl Stencil {
    /// Create a stencil.
    pub fn new(name: impl Into<String>, graph: Graph) -> Self {
        Self {
            name: name.into(),
            graph,
        }
    }

    /// Serializable form.
    #[must_use]
    pub fn to_record(&self) -> StencilRecord {
        StencilRecord {
            name: self.name.clone(),
            nodes: self.graph.vertices().cloned().collect(),
            edges: self.graph.edges().to_vec(),
        }
    }
}

/// Serialized stencil.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StencilRecord {
    /// Template identifier.
    #[serde(default)]
    pub name: String,
    /// Vertices with `id` and `opcode`.
    pub nodes: Vec<Vertex>,
    /// Edges with `source`, `dest`, `arg_num_at_dest`.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl StencilRecord {
    /// Validate and convert into a [`Stencil`]. Arity is computed from the
    /// record's own edges.
    ///
    /// # Errors
    ///
    /// Rejects empty stencils, duplicate node ids, and edges naming
    /// unknown nodes.
    pub fn into_stencil(self) -> Result<Stencil, LoadError> {
        if self.nodes.is_empty() {
            return Err(LoadError::stencil(&self.name, "stencil has no nodes"));
        }

        let mut ids: HashSet<&str> = HashSet::new();
        for v in &self.nodes {
            if !ids.insert(v.id.as_str()) {
                return Err(LoadError::stencil(
                    &self.name,
                    format!("duplicate node id '{}'", v.id),
                ));
            }
        }
        for e in &self.edges {
            for end in [&e.source, &e.dest] {
                if !ids.contains(end.as_str()) {
                    return Err(LoadError::stencil(
                        &self.name,
                        format!("edge {} -> {} names unknown node '{end}'", e.source, e.dest),
                    ));
                }
            }
        }

        Ok(Stencil::new(self.name, Graph::from_parts(self.nodes, self.edges)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StencilDocument {
    Many(Vec<StencilRecord>),
    One(StencilRecord),
}

/// Parse a stencil document (single object or list).
///
/// Unnamed stencils are called `stencil_<position>`.
///
/// # Errors
///
/// Fails on invalid JSON or any invalid stencil.
pub fn parse_stencils(text: &str) -> Result<Vec<Stencil>, LoadError> {
    let records = match serde_json::from_str::<StencilDocument>(text)? {
        StencilDocument::Many(records) => records,
        StencilDocument::One(record) => vec![record],
    };

    records
        .into_iter()
        .enumerate()
        .map(|(i, mut record)| {
            if record.name.is_empty() {
                record.name = format!("stencil_{i}");
            }
            record.into_stencil()
        })
        .collect()
}

/// Read and parse a stencil document.
///
/// # Errors
///
/// See [`parse_stencils`]; additionally fails when the file cannot be read.
pub fn load_stencils(path: impl AsRef<Path>) -> Result<Vec<Stencil>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    parse_stencils(&text)
}

/// Serialize stencils as a list document.
///
/// # Errors
///
/// Only fails if serialization itself fails.
pub fn stencils_to_json(stencils: &[Stencil]) -> Result<String, LoadError> {
    let records: Vec<StencilRecord> = stencils.iter().map(Stencil::to_record).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object_document() {
        let stencils = parse_stencils(
            r#"{"name": "ma", "nodes": [{"id": "0", "opcode": "mul"}, {"id": "1", "opcode": "add"}],
                "edges": [{"source": "0", "dest": "1", "arg_num_at_dest": 0}]}"#,
        )
        .unwrap();
        assert_eq!(stencils.len(), 1);
        assert_eq!(stencils[0].name, "ma");
        assert_eq!(stencils[0].graph.arity("1"), 1);
    }

    #[test]
    fn list_document_names_unnamed_entries() {
        let stencils = parse_stencils(
            r#"[{"nodes": [{"id": "0", "opcode": "mul"}]},
                {"name": "x", "nodes": [{"id": "0", "opcode": "add"}]}]"#,
        )
        .unwrap();
        assert_eq!(stencils[0].name, "stencil_0");
        assert_eq!(stencils[1].name, "x");
    }

    #[test]
    fn edges_must_name_known_nodes() {
        let err = parse_stencils(
            r#"{"name": "bad", "nodes": [{"id": "0", "opcode": "mul"}],
                "edges": [{"source": "0", "dest": "9", "arg_num_at_dest": 0}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::MalformedStencil { .. }));
    }

    #[test]
    fn export_preserves_slots() {
        let stencil = Stencil::new(
            "s",
            Graph::from_parts(
                [Vertex::new("a", "shl"), Vertex::new("b", "or")],
                [Edge::new("a", "b", 1)],
            ),
        );
        let text = stencils_to_json(std::slice::from_ref(&stencil)).unwrap();
        assert!(text.contains("\"arg_num_at_dest\": 1"));
        let back = parse_stencils(&text).unwrap();
        assert_eq!(back, vec![stencil]);
    }
}
