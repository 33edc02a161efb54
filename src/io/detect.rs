//! Recognising which zip layout an archive was written with.
//!
//! Entry names alone are ambiguous: the single-array, single-mesh and
//! named-arrays layouts all keep their metadata in `metadata.json`, and a
//! named array called `data` produces a `data.bin` entry. The root metadata
//! document decides between them.

use std::path::Path;

use serde_json::Value;

use crate::util::Result;

use super::archive::{ArrayEntries, ArraySetEntries, MeshEntries};
use super::bundle::BundleLayout;
use super::container::ArchiveReader;

/// A zip layout written by this crate, using the default entry names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    /// `mesh/` and `arrays/` directories with an optional top-level document
    Combined,
    /// `vertices.bin`, optional `indices.bin`, `metadata.json`
    SingleMesh,
    /// `data.bin` and `metadata.json`
    SingleArray,
    /// `<name>.bin` payloads described by one `metadata.json` map
    NamedArrays,
}

impl Layout {
    pub fn name(self) -> &'static str {
        match self {
            Layout::Combined => "combined bundle",
            Layout::SingleMesh => "single mesh",
            Layout::SingleArray => "single array",
            Layout::NamedArrays => "named arrays",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn is_array_record(value: &Value) -> bool {
    value.get("shape").map_or(false, Value::is_array)
}

fn is_mesh_record(value: &Value) -> bool {
    value.get("vertex_count").map_or(false, Value::is_u64)
}

/// Layouts found in the archive at `path`.
///
/// A combined bundle may share the archive with one root-level layout, so
/// more than one entry can be returned. An empty result means nothing was
/// recognised.
pub fn detect_layouts(path: impl AsRef<Path>) -> Result<Vec<Layout>> {
    let mut zip = ArchiveReader::open(path)?;
    let mut found = Vec::new();

    let bundle = BundleLayout::default();
    if zip.contains(&bundle.mesh_entries().metadata) && zip.contains(&bundle.arrays_metadata()) {
        found.push(Layout::Combined);
    }

    let root = match zip.read_optional_json::<Value>(&ArraySetEntries::default().metadata)? {
        Some(root @ Value::Object(_)) => root,
        _ => return Ok(found),
    };

    if is_mesh_record(&root) && zip.contains(&MeshEntries::default().vertices) {
        found.push(Layout::SingleMesh);
    } else if is_array_record(&root) && zip.contains(&ArrayEntries::default().data) {
        found.push(Layout::SingleArray);
    } else if root.as_object().map_or(false, |map| map.values().all(is_array_record)) {
        found.push(Layout::NamedArrays);
    }
    tracing::debug!("Detected layouts {:?} in {}", found, zip.path().display());
    Ok(found)
}
