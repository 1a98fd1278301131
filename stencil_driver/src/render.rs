//! Diagram output for host graphs.
//!
//! Rendering runs after the authoritative results exist, so a failure here
//! is logged and reported as `false`, never propagated.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use stencil_common::Graph;
use stencil_subgraph::Match;
use tracing::{info, warn};

const PALETTE: &[&str] = &[
    "lightblue",
    "palegreen",
    "lightsalmon",
    "khaki",
    "plum",
    "lightpink",
    "lightcyan",
    "wheat",
];

/// Turns a graph, optionally with highlighted matches, into a diagram.
pub trait Renderer {
    /// Write the diagram for `graph` to `out`.
    fn render(&self, graph: &Graph, highlight: &[Match], out: &mut dyn Write) -> io::Result<()>;
}

/// Graphviz DOT text.
#[derive(Clone, Debug)]
pub struct DotRenderer {
    /// Name of the emitted digraph.
    pub name: String,
}

impl Default for DotRenderer {
    fn default() -> Self {
        Self {
            name: "host".to_owned(),
        }
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Renderer for DotRenderer {
    fn render(&self, graph: &Graph, highlight: &[Match], out: &mut dyn Write) -> io::Result<()> {
        // one colour per stencil, assigned in name order
        let mut colours: BTreeMap<&str, &str> = BTreeMap::new();
        for m in highlight {
            colours.insert(m.template_id.as_str(), "");
        }
        for (i, colour) in colours.values_mut().enumerate() {
            *colour = PALETTE[i % PALETTE.len()];
        }
        let mut owner: BTreeMap<&str, &Match> = BTreeMap::new();
        for m in highlight {
            for h in m.host_vertices() {
                owner.insert(h, m);
            }
        }

        writeln!(out, "digraph {} {{", quote(&self.name))?;
        for v in graph.vertices() {
            let label = quote(&format!("{}\n{}", v.id, v.opcode));
            match owner.get(v.id.as_str()) {
                Some(m) => writeln!(
                    out,
                    "  {} [label={}, style=filled, fillcolor={}, tooltip={}];",
                    quote(&v.id),
                    label,
                    colours.get(m.template_id.as_str()).copied().unwrap_or("white"),
                    quote(&format!("{} #{}", m.template_id, m.match_idx))
                )?,
                None => writeln!(out, "  {} [label={}];", quote(&v.id), label)?,
            }
        }
        for e in graph.edges() {
            writeln!(
                out,
                "  {} -> {} [label={}];",
                quote(&e.source),
                quote(&e.dest),
                e.arg_position
            )?;
        }
        writeln!(out, "}}")
    }
}

/// Render to `path`, logging instead of failing.
pub fn render_to_file(
    renderer: &dyn Renderer,
    graph: &Graph,
    highlight: &[Match],
    path: impl AsRef<Path>,
) -> bool {
    let path = path.as_ref();
    let result = File::create(path).and_then(|file| {
        let mut writer = BufWriter::new(file);
        renderer.render(graph, highlight, &mut writer)?;
        writer.flush()
    });
    match result {
        Ok(()) => {
            info!("rendered {} vertices to {}", graph.num_vertices(), path.display());
            true
        }
        Err(e) => {
            warn!("rendering to {} failed: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use stencil_common::{Edge, Vertex};

    use super::*;

    fn render(graph: &Graph, highlight: &[Match]) -> String {
        let mut buf = Vec::new();
        DotRenderer::default()
            .render(graph, highlight, &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_graph() {
        let g = Graph::from_parts(
            [Vertex::new("a", "mul"), Vertex::new("b", "add")],
            [Edge::new("a", "b", 1)],
        );
        let text = render(&g, &[]);
        assert!(text.starts_with("digraph \"host\" {"));
        assert!(text.contains("\"a\" -> \"b\" [label=1];"));
        assert!(!text.contains("filled"));
    }

    #[test]
    fn highlighted_vertices_are_filled() {
        let g = Graph::from_parts(
            [Vertex::new("a", "mul"), Vertex::new("b", "add"), Vertex::new("c", "sub")],
            [Edge::new("a", "b", 0), Edge::new("b", "c", 0)],
        );
        let m = Match {
            template_id: "mul_add".into(),
            match_idx: 0,
            node_matches: [("a".to_owned(), "0".to_owned()), ("b".to_owned(), "1".to_owned())]
                .into(),
        };
        let text = render(&g, &[m]);
        assert_eq!(text.matches("fillcolor=lightblue").count(), 2);
        assert!(text.contains("tooltip=\"mul_add #0\""));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }

    #[test]
    fn failures_are_not_fatal() {
        let g = Graph::new();
        let missing = std::env::temp_dir().join("no_such_dir_for_dot").join("out.dot");
        assert!(!render_to_file(&DotRenderer::default(), &g, &[], missing));
    }
}
