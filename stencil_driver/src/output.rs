//! Documents written by the driver: match lists, per-instruction
//! annotations, the combination report and stencil exports.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use stencil_common::Stencil;
use stencil_common::stencil::stencils_to_json;
use stencil_subgraph::{Combination, Match};
use tracing::info;

use crate::DriverError;

/// Metadata attached to one matched host instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Stencil the instruction was matched by.
    pub template_id: String,
    /// Index of the match within that stencil's list.
    pub match_idx: usize,
    /// Stencil vertex the instruction plays.
    pub template_node: String,
}

/// One line of the combination report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Stencil name.
    pub stencil: String,
    /// Matches kept after exclusive selection.
    pub exclusive: usize,
    /// All (possibly overlapping) matches.
    pub total: usize,
}

/// Host vertex id -> annotation, for every vertex covered by `matches`.
///
/// With overlapping input the later match wins a vertex.
#[must_use]
pub fn annotations<'m>(matches: impl IntoIterator<Item = &'m Match>) -> BTreeMap<String, Annotation> {
    let mut out = BTreeMap::new();
    for m in matches {
        for (host, node) in &m.node_matches {
            out.insert(
                host.clone(),
                Annotation {
                    template_id: m.template_id.clone(),
                    match_idx: m.match_idx,
                    template_node: node.clone(),
                },
            );
        }
    }
    out
}

/// Report rows for a chosen combination, in name order.
#[must_use]
pub fn report_rows(combination: &Combination) -> Vec<ReportRow> {
    combination
        .names
        .iter()
        .map(|name| ReportRow {
            stencil: name.clone(),
            exclusive: combination.exclusive_counts.get(name).copied().unwrap_or(0),
            total: combination.total_counts.get(name).copied().unwrap_or(0),
        })
        .collect()
}

fn create(path: &Path) -> Result<BufWriter<File>, DriverError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| DriverError::io(path, e))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DriverError> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| DriverError::io(path, e))
}

/// Write a match list as a JSON array of `{template_id, match_idx, node_matches}`.
pub fn write_matches(path: impl AsRef<Path>, matches: &[Match]) -> Result<(), DriverError> {
    let path = path.as_ref();
    write_json(path, matches)?;
    info!("wrote {} matches to {}", matches.len(), path.display());
    Ok(())
}

/// Write the annotation map for `matches`.
pub fn write_annotations(path: impl AsRef<Path>, matches: &[Match]) -> Result<(), DriverError> {
    let path = path.as_ref();
    let table = annotations(matches);
    write_json(path, &table)?;
    info!("wrote {} annotations to {}", table.len(), path.display());
    Ok(())
}

/// Write the `stencil,exclusive,total` report.
pub fn write_report(path: impl AsRef<Path>, rows: &[ReportRow]) -> Result<(), DriverError> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| DriverError::io(path, e))?;
    info!("wrote report with {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Export stencils as a JSON list of node/edge documents.
pub fn write_stencils(path: impl AsRef<Path>, stencils: &[Stencil]) -> Result<(), DriverError> {
    let path = path.as_ref();
    let text = stencils_to_json(stencils)?;
    std::fs::write(path, text).map_err(|e| DriverError::io(path, e))?;
    info!("wrote {} stencils to {}", stencils.len(), path.display());
    Ok(())
}
