//! JSON metadata documents stored next to compressed payloads.
//!
//! Every document carries `format_version`. Documents without it were
//! written by older tooling and are read as version 1; unknown extra keys
//! are ignored and missing required keys are rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::util::{DType, Error, Result};

use super::array::shape_len;
use super::encoded::{EncodedArray, EncodedMesh, DEFAULT_INDEX_SIZE};

/// Highest metadata revision this crate reads and the one it writes.
pub const METADATA_FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    METADATA_FORMAT_VERSION
}

fn default_index_size() -> usize {
    DEFAULT_INDEX_SIZE
}

fn check_version(version: u32, what: &str) -> Result<()> {
    if version > METADATA_FORMAT_VERSION {
        return Err(Error::format(format!(
            "{} metadata version {} is newer than supported version {}",
            what, version, METADATA_FORMAT_VERSION
        )));
    }
    Ok(())
}

/// Metadata describing one encoded array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayMetadata {
    pub shape: Vec<usize>,
    pub dtype: DType,
    pub itemsize: usize,
    /// Payload entry name, used by multi-array layouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

impl ArrayMetadata {
    pub fn from_encoded(encoded: &EncodedArray) -> Self {
        Self {
            shape: encoded.shape.clone(),
            dtype: encoded.dtype,
            itemsize: encoded.itemsize,
            filename: None,
            format_version: METADATA_FORMAT_VERSION,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Pair the metadata with its payload.
    pub fn into_encoded(self, data: Vec<u8>) -> Result<EncodedArray> {
        check_version(self.format_version, "array")?;
        shape_len(&self.shape)?;
        Ok(EncodedArray {
            data,
            shape: self.shape,
            dtype: self.dtype,
            itemsize: self.itemsize,
        })
    }
}

/// Metadata for a set of named arrays, keyed by array name.
pub type ArraySetMetadata = BTreeMap<String, ArrayMetadata>;

/// Metadata describing one encoded mesh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshMetadata {
    pub vertex_count: usize,
    pub vertex_size: usize,
    #[serde(default = "default_index_size")]
    pub index_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_count: Option<usize>,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
}

impl MeshMetadata {
    pub fn from_encoded(encoded: &EncodedMesh) -> Self {
        Self {
            vertex_count: encoded.vertex_count,
            vertex_size: encoded.vertex_size,
            index_size: encoded.index_size,
            index_count: encoded.index_count,
            format_version: METADATA_FORMAT_VERSION,
        }
    }

    /// Pair the metadata with its payloads.
    pub fn into_encoded(self, vertices: Vec<u8>, indices: Option<Vec<u8>>) -> Result<EncodedMesh> {
        check_version(self.format_version, "mesh")?;
        if indices.is_some() && self.index_count.is_none() {
            return Err(Error::validation("index stream present but metadata has no index_count"));
        }
        if indices.is_none() && self.index_count.is_some() {
            tracing::warn!("mesh metadata lists index_count but no index stream was stored");
        }
        Ok(EncodedMesh {
            vertices,
            indices,
            vertex_count: self.vertex_count,
            vertex_size: self.vertex_size,
            index_count: self.index_count,
            index_size: self.index_size,
        })
    }
}
