//! Zip layouts for a single array, a single mesh, and a set of named arrays.
//!
//! Entry names are configuration: each layout takes a small struct whose
//! `Default` gives the conventional names.

use std::collections::BTreeMap;
use std::path::Path;

use crate::codec::{decode_array, encode_array, Codec};
use crate::core::{Array, ArrayMetadata, ArraySetMetadata, EncodedArray, EncodedMesh, MeshMetadata};
use crate::mesh::Mesh;
use crate::util::{Error, Result};

use super::container::{entry_path, ArchiveReader, ArchiveWriter};

/// Entry names for the single-array layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayEntries {
    /// Compressed payload (default `data.bin`)
    pub data: String,
    /// JSON metadata (default `metadata.json`)
    pub metadata: String,
}

impl Default for ArrayEntries {
    fn default() -> Self {
        Self {
            data: "data.bin".to_string(),
            metadata: "metadata.json".to_string(),
        }
    }
}

/// Entry names for the single-mesh layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeshEntries {
    /// Compressed vertex stream (default `vertices.bin`)
    pub vertices: String,
    /// Compressed index stream, written only for indexed meshes (default `indices.bin`)
    pub indices: String,
    /// JSON metadata (default `metadata.json`)
    pub metadata: String,
}

impl Default for MeshEntries {
    fn default() -> Self {
        Self {
            vertices: "vertices.bin".to_string(),
            indices: "indices.bin".to_string(),
            metadata: "metadata.json".to_string(),
        }
    }
}

impl MeshEntries {
    /// The same names under `dir`.
    pub fn in_dir(&self, dir: &str) -> Self {
        Self {
            vertices: entry_path(dir, &self.vertices),
            indices: entry_path(dir, &self.indices),
            metadata: entry_path(dir, &self.metadata),
        }
    }
}

/// Entry names for the multiple-arrays layout. Payloads are stored as
/// `<name>.bin` next to the metadata document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArraySetEntries {
    /// JSON metadata mapping array names to their records (default `metadata.json`)
    pub metadata: String,
}

impl Default for ArraySetEntries {
    fn default() -> Self {
        Self {
            metadata: "metadata.json".to_string(),
        }
    }
}

/// Payload entry name for a named array.
pub fn array_filename(name: &str) -> String {
    format!("{}.bin", name)
}

pub(crate) fn check_array_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("array names must not be empty"));
    }
    Ok(())
}

// ============================================================================
// Single array
// ============================================================================

/// Save an encoded array as `data` + `metadata` entries.
pub fn save_encoded_array_to_zip(
    encoded: &EncodedArray,
    path: impl AsRef<Path>,
    entries: &ArrayEntries,
) -> Result<()> {
    let mut zip = ArchiveWriter::create(path)?;
    zip.write_entry(&entries.data, &encoded.data)?;
    zip.write_json(&entries.metadata, &ArrayMetadata::from_encoded(encoded))?;
    zip.finish()
}

/// Load an encoded array saved by [`save_encoded_array_to_zip`].
pub fn load_encoded_array_from_zip(path: impl AsRef<Path>, entries: &ArrayEntries) -> Result<EncodedArray> {
    let mut zip = ArchiveReader::open(path)?;
    let metadata: ArrayMetadata = zip.read_json(&entries.metadata)?;
    let data = zip.read_entry(&entries.data)?;
    metadata.into_encoded(data)
}

/// Encode and save an array.
pub fn save_array_to_zip<C: Codec + ?Sized>(
    codec: &C,
    array: &Array,
    path: impl AsRef<Path>,
    entries: &ArrayEntries,
) -> Result<()> {
    let encoded = encode_array(codec, array)?;
    save_encoded_array_to_zip(&encoded, path, entries)
}

/// Load and decode an array.
pub fn load_array_from_zip<C: Codec + ?Sized>(
    codec: &C,
    path: impl AsRef<Path>,
    entries: &ArrayEntries,
) -> Result<Array> {
    let encoded = load_encoded_array_from_zip(path, entries)?;
    decode_array(codec, &encoded)
}

// ============================================================================
// Single mesh
// ============================================================================

pub(crate) fn write_mesh(zip: &mut ArchiveWriter, encoded: &EncodedMesh, entries: &MeshEntries) -> Result<()> {
    zip.write_entry(&entries.vertices, &encoded.vertices)?;
    if let Some(indices) = &encoded.indices {
        zip.write_entry(&entries.indices, indices)?;
    }
    zip.write_json(&entries.metadata, &MeshMetadata::from_encoded(encoded))
}

/// Save an encoded mesh. The index entry is written only for indexed meshes.
pub fn save_encoded_mesh_to_zip(
    encoded: &EncodedMesh,
    path: impl AsRef<Path>,
    entries: &MeshEntries,
) -> Result<()> {
    let mut zip = ArchiveWriter::create(path)?;
    write_mesh(&mut zip, encoded, entries)?;
    zip.finish()
}

/// Load an encoded mesh. A missing index entry means a non-indexed mesh.
pub fn load_encoded_mesh_from_zip(path: impl AsRef<Path>, entries: &MeshEntries) -> Result<EncodedMesh> {
    let mut zip = ArchiveReader::open(path)?;
    let metadata: MeshMetadata = zip.read_json(&entries.metadata)?;
    let vertices = zip.read_entry(&entries.vertices)?;
    let indices = zip.read_optional(&entries.indices)?;
    metadata.into_encoded(vertices, indices)
}

/// Encode and save a mesh.
pub fn save_mesh_to_zip<C: Codec + ?Sized>(
    codec: &C,
    mesh: &Mesh,
    path: impl AsRef<Path>,
    entries: &MeshEntries,
) -> Result<()> {
    let encoded = mesh.encode(codec)?;
    save_encoded_mesh_to_zip(&encoded, path, entries)
}

/// Load and decode a mesh.
pub fn load_mesh_from_zip<C: Codec + ?Sized>(
    codec: &C,
    path: impl AsRef<Path>,
    entries: &MeshEntries,
) -> Result<Mesh> {
    let encoded = load_encoded_mesh_from_zip(path, entries)?;
    Mesh::decode(codec, &encoded)
}

// ============================================================================
// Multiple named arrays
// ============================================================================

/// Write `<dir>/<name>.bin` payloads and return the metadata map.
pub(crate) fn write_array_set(
    zip: &mut ArchiveWriter,
    dir: &str,
    arrays: &BTreeMap<String, EncodedArray>,
) -> Result<ArraySetMetadata> {
    let mut metadata = ArraySetMetadata::new();
    for (name, encoded) in arrays {
        check_array_name(name)?;
        let filename = array_filename(name);
        zip.write_entry(&entry_path(dir, &filename), &encoded.data)?;
        metadata.insert(name.clone(), ArrayMetadata::from_encoded(encoded).with_filename(filename));
    }
    Ok(metadata)
}

/// Read every array listed in `metadata` from `dir`.
pub(crate) fn read_array_set(
    zip: &mut ArchiveReader,
    dir: &str,
    metadata: ArraySetMetadata,
) -> Result<BTreeMap<String, EncodedArray>> {
    let mut arrays = BTreeMap::new();
    for (name, meta) in metadata {
        let filename = meta.filename.clone().unwrap_or_else(|| array_filename(&name));
        let data = zip.read_entry(&entry_path(dir, &filename))?;
        arrays.insert(name, meta.into_encoded(data)?);
    }
    Ok(arrays)
}

/// Save named encoded arrays, one payload entry each plus one metadata map.
pub fn save_encoded_arrays_to_zip(
    arrays: &BTreeMap<String, EncodedArray>,
    path: impl AsRef<Path>,
    entries: &ArraySetEntries,
) -> Result<()> {
    let mut zip = ArchiveWriter::create(path)?;
    let metadata = write_array_set(&mut zip, "", arrays)?;
    zip.write_json(&entries.metadata, &metadata)?;
    tracing::debug!("Saved {} arrays to {}", arrays.len(), zip.path().display());
    zip.finish()
}

/// Load named encoded arrays. The key set matches what was saved.
pub fn load_encoded_arrays_from_zip(
    path: impl AsRef<Path>,
    entries: &ArraySetEntries,
) -> Result<BTreeMap<String, EncodedArray>> {
    let mut zip = ArchiveReader::open(path)?;
    let metadata: ArraySetMetadata = zip.read_json(&entries.metadata)?;
    read_array_set(&mut zip, "", metadata)
}

/// Encode and save named arrays.
pub fn save_arrays_to_zip<C: Codec + ?Sized>(
    codec: &C,
    arrays: &BTreeMap<String, Array>,
    path: impl AsRef<Path>,
    entries: &ArraySetEntries,
) -> Result<()> {
    let encoded = arrays
        .iter()
        .map(|(name, array)| Ok((name.clone(), encode_array(codec, array)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    save_encoded_arrays_to_zip(&encoded, path, entries)
}

/// Load and decode named arrays.
pub fn load_arrays_from_zip<C: Codec + ?Sized>(
    codec: &C,
    path: impl AsRef<Path>,
    entries: &ArraySetEntries,
) -> Result<BTreeMap<String, Array>> {
    load_encoded_arrays_from_zip(path, entries)?
        .into_iter()
        .map(|(name, encoded)| Ok((name, decode_array(codec, &encoded)?)))
        .collect()
}
