//! Combined bundle: one mesh, named arrays, and optional free-form metadata
//! in a single zip archive.
//!
//! ```text
//! mesh/vertices.bin
//! mesh/indices.bin
//! mesh/metadata.json
//! arrays/<name>.bin ...
//! arrays/metadata.json
//! metadata.json          (optional)
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::core::{ArraySetMetadata, EncodedArray, EncodedMesh, MeshMetadata};
use crate::util::{Error, Result};

use super::archive::{read_array_set, write_array_set, write_mesh, MeshEntries};
use super::container::{entry_path, ArchiveReader, ArchiveWriter};

/// Directory and file names of the combined bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleLayout {
    /// Directory holding the mesh streams (default `mesh`)
    pub mesh_dir: String,
    /// Directory holding the array payloads (default `arrays`)
    pub arrays_dir: String,
    /// Metadata file name, used in both directories and at the top level
    /// (default `metadata.json`)
    pub metadata: String,
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            mesh_dir: "mesh".to_string(),
            arrays_dir: "arrays".to_string(),
            metadata: "metadata.json".to_string(),
        }
    }
}

impl BundleLayout {
    pub(crate) fn mesh_entries(&self) -> MeshEntries {
        MeshEntries { metadata: self.metadata.clone(), ..MeshEntries::default() }.in_dir(&self.mesh_dir)
    }

    pub(crate) fn arrays_metadata(&self) -> String {
        entry_path(&self.arrays_dir, &self.metadata)
    }
}

/// Everything a combined bundle holds.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedData {
    pub mesh: EncodedMesh,
    pub arrays: BTreeMap<String, EncodedArray>,
    /// Caller-supplied top-level metadata, `None` when the bundle has none
    pub metadata: Option<Value>,
}

fn check_combined(mesh: &EncodedMesh, arrays: &BTreeMap<String, EncodedArray>) -> Result<()> {
    if arrays.is_empty() {
        return Err(Error::validation("combined bundle needs at least one array"));
    }
    if mesh.vertices.is_empty() {
        return Err(Error::validation("combined bundle mesh has an empty vertex stream"));
    }
    if mesh.indices.is_none() || mesh.index_count.is_none() {
        return Err(Error::validation("combined bundle mesh must be indexed"));
    }
    Ok(())
}

/// Save a mesh, named arrays and optional metadata as one bundle.
///
/// Precondition failures are reported as [`Error::Validation`] before the
/// file is touched. Any failure after that is wrapped in
/// [`Error::WriteFailed`] with the original error as its source; the
/// partially written file is left in place.
pub fn save_combined_data_to_zip(
    mesh: &EncodedMesh,
    arrays: &BTreeMap<String, EncodedArray>,
    metadata: Option<&Value>,
    path: impl AsRef<Path>,
    layout: &BundleLayout,
) -> Result<()> {
    let path = path.as_ref();
    check_combined(mesh, arrays)?;

    let write = || -> Result<()> {
        let mut zip = ArchiveWriter::create(path)?;
        write_mesh(&mut zip, mesh, &layout.mesh_entries())?;
        let array_meta = write_array_set(&mut zip, &layout.arrays_dir, arrays)?;
        zip.write_json(&layout.arrays_metadata(), &array_meta)?;
        if let Some(metadata) = metadata {
            zip.write_json(&layout.metadata, metadata)?;
        }
        zip.finish()
    };

    write().map_err(|e| Error::WriteFailed { path: path.to_path_buf(), source: Box::new(e) })?;
    tracing::debug!("Saved bundle {} (mesh + {} arrays)", path.display(), arrays.len());
    Ok(())
}

/// Load a bundle written by [`save_combined_data_to_zip`].
///
/// A missing archive or required entry is [`Error::NotFound`] and a file
/// that is not a zip container is [`Error::Validation`]. Other failures
/// are wrapped in [`Error::ReadFailed`].
pub fn load_combined_data_from_zip(path: impl AsRef<Path>, layout: &BundleLayout) -> Result<CombinedData> {
    let path = path.as_ref();

    let read = || -> Result<CombinedData> {
        let mut zip = ArchiveReader::open(path)?;

        let entries = layout.mesh_entries();
        let vertices = zip.read_entry(&entries.vertices)?;
        let indices = zip.read_entry(&entries.indices)?;
        let mesh_meta: MeshMetadata = zip.read_json(&entries.metadata)?;
        let mesh = mesh_meta.into_encoded(vertices, Some(indices))?;

        let array_meta: ArraySetMetadata = zip.read_json(&layout.arrays_metadata())?;
        let arrays = read_array_set(&mut zip, &layout.arrays_dir, array_meta)?;

        let metadata = zip.read_optional_json::<Value>(&layout.metadata)?;
        if metadata.is_none() {
            tracing::trace!("{} has no top-level metadata", path.display());
        }

        Ok(CombinedData { mesh, arrays, metadata })
    };

    let data = read().map_err(|e| match e {
        Error::NotFound(_) | Error::Validation(_) => e,
        other => Error::ReadFailed { path: path.to_path_buf(), source: Box::new(other) },
    })?;
    tracing::debug!("Loaded bundle {} (mesh + {} arrays)", path.display(), data.arrays.len());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::DType;
    use serde_json::json;

    fn mesh() -> EncodedMesh {
        EncodedMesh::new(vec![1, 2, 3, 4], 8, 12).with_indices(vec![5, 6, 7], 36)
    }

    fn arrays() -> BTreeMap<String, EncodedArray> {
        let mut arrays = BTreeMap::new();
        arrays.insert(
            "uv".to_string(),
            EncodedArray { data: vec![8, 9], shape: vec![8, 2], dtype: DType::Float32, itemsize: 4 },
        );
        arrays
    }

    #[test]
    fn test_roundtrip_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        let meta = json!({"name": "cube", "tags": ["a", "b"]});

        save_combined_data_to_zip(&mesh(), &arrays(), Some(&meta), &path, &BundleLayout::default()).unwrap();
        let data = load_combined_data_from_zip(&path, &BundleLayout::default()).unwrap();
        assert_eq!(data.mesh, mesh());
        assert_eq!(data.arrays, arrays());
        assert_eq!(data.metadata, Some(meta));
    }

    #[test]
    fn test_layout_entry_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        save_combined_data_to_zip(&mesh(), &arrays(), None, &path, &BundleLayout::default()).unwrap();

        let mut names = ArchiveReader::open(&path).unwrap().entry_names();
        names.sort();
        assert_eq!(
            names,
            vec!["arrays/metadata.json", "arrays/uv.bin", "mesh/indices.bin", "mesh/metadata.json", "mesh/vertices.bin"]
        );
    }

    #[test]
    fn test_validation_happens_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        let layout = BundleLayout::default();

        let err = save_combined_data_to_zip(&mesh(), &BTreeMap::new(), None, &path, &layout).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let unindexed = EncodedMesh::new(vec![1], 1, 12);
        let err = save_combined_data_to_zip(&unindexed, &arrays(), None, &path, &layout).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let empty = EncodedMesh::new(Vec::new(), 0, 12).with_indices(vec![1], 3);
        let err = save_combined_data_to_zip(&empty, &arrays(), None, &path, &layout).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(!path.exists());
    }

    #[test]
    fn test_write_failure_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("bundle.zip");
        let err = save_combined_data_to_zip(&mesh(), &arrays(), None, &path, &BundleLayout::default()).unwrap_err();
        assert!(matches!(err, Error::WriteFailed { .. }));
        assert!(matches!(err.root_cause(), Error::Io(_)));
    }

    #[test]
    fn test_bad_array_name_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        let mut named = arrays();
        let uv = named["uv"].clone();
        named.insert(String::new(), uv);

        let err = save_combined_data_to_zip(&mesh(), &named, None, &path, &BundleLayout::default()).unwrap_err();
        assert!(matches!(err, Error::WriteFailed { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_missing_array_payload_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        let mut zip = ArchiveWriter::create(&path).unwrap();
        zip.write_entry("mesh/vertices.bin", &[1]).unwrap();
        zip.write_entry("mesh/indices.bin", &[2]).unwrap();
        zip.write_json("mesh/metadata.json", &json!({"vertex_count": 1, "vertex_size": 12, "index_count": 3}))
            .unwrap();
        zip.write_json(
            "arrays/metadata.json",
            &json!({"uv": {"shape": [2], "dtype": "float32", "itemsize": 4, "filename": "uv.bin"}}),
        )
        .unwrap();
        zip.finish().unwrap();

        let err = load_combined_data_from_zip(&path, &BundleLayout::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_filename_falls_back_to_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        let mut zip = ArchiveWriter::create(&path).unwrap();
        zip.write_entry("mesh/vertices.bin", &[1]).unwrap();
        zip.write_entry("mesh/indices.bin", &[2]).unwrap();
        zip.write_json("mesh/metadata.json", &json!({"vertex_count": 1, "vertex_size": 12, "index_count": 3}))
            .unwrap();
        zip.write_entry("arrays/uv.bin", &[7, 7]).unwrap();
        zip.write_json("arrays/metadata.json", &json!({"uv": {"shape": [2], "dtype": "float32", "itemsize": 4}}))
            .unwrap();
        zip.finish().unwrap();

        let data = load_combined_data_from_zip(&path, &BundleLayout::default()).unwrap();
        assert_eq!(data.arrays["uv"].data, vec![7, 7]);
        assert_eq!(data.mesh.index_size, 4);
        assert!(data.metadata.is_none());
    }

    #[test]
    fn test_unsupported_version_is_wrapped_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        let mut zip = ArchiveWriter::create(&path).unwrap();
        zip.write_entry("mesh/vertices.bin", &[1]).unwrap();
        zip.write_entry("mesh/indices.bin", &[2]).unwrap();
        zip.write_json(
            "mesh/metadata.json",
            &json!({"vertex_count": 1, "vertex_size": 12, "index_count": 3, "format_version": 99}),
        )
        .unwrap();
        zip.write_json("arrays/metadata.json", &json!({})).unwrap();
        zip.finish().unwrap();

        let err = load_combined_data_from_zip(&path, &BundleLayout::default()).unwrap_err();
        assert!(matches!(err, Error::ReadFailed { .. }));
        assert!(matches!(err.root_cause(), Error::Format(_)));
    }

    #[test]
    fn test_custom_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        let layout = BundleLayout { mesh_dir: "geo".into(), arrays_dir: "attrs".into(), metadata: "meta.json".into() };

        save_combined_data_to_zip(&mesh(), &arrays(), Some(&json!(1)), &path, &layout).unwrap();
        let zip = ArchiveReader::open(&path).unwrap();
        assert!(zip.contains("geo/meta.json"));
        assert!(zip.contains("attrs/uv.bin"));
        assert!(zip.contains("meta.json"));
        drop(zip);

        assert!(load_combined_data_from_zip(&path, &BundleLayout::default()).unwrap_err().is_not_found());
        assert_eq!(load_combined_data_from_zip(&path, &layout).unwrap().arrays, arrays());
    }
}
