//! Core data model.
//!
//! This module provides:
//! - [`Array`] - In-memory n-dimensional numeric array
//! - [`EncodedArray`] / [`EncodedMesh`] - Compressed records
//! - [`ArrayMetadata`] / [`MeshMetadata`] - JSON documents stored beside payloads

mod array;
mod encoded;
mod metadata;

pub use array::{shape_len, Array, ArrayData, Element};
pub use encoded::{EncodedArray, EncodedMesh, DEFAULT_INDEX_SIZE};
pub use metadata::{ArrayMetadata, ArraySetMetadata, MeshMetadata, METADATA_FORMAT_VERSION};
