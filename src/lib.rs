//! # meshbundle
//!
//! Compressed storage for meshes and numeric arrays.
//!
//! Vertex buffers, index buffers and n-dimensional arrays are compressed
//! with meshoptimizer's vertex/index codecs, described by small JSON
//! metadata records, and persisted either as single-asset files or bundled
//! into zip archives.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (DType, errors)
//! - [`core`] - Arrays, encoded records and their metadata
//! - [`codec`] - Codec/optimizer primitives and the array/mesh codecs
//! - [`io`] - Single-asset files and zip layouts
//! - [`mesh`] - In-memory mesh with optimization operations
//!
//! ## Example
//!
//! ```ignore
//! use meshbundle::prelude::*;
//!
//! let mesh = Mesh::from_positions(&positions, Some(indices))?
//!     .optimize_vertex_cache(&Meshopt)?;
//! let mut arrays = BTreeMap::new();
//! arrays.insert("uv".to_string(), encode_array(&Meshopt, &uvs)?);
//!
//! save_combined_data_to_zip(&mesh.encode(&Meshopt)?, &arrays, None, "asset.zip", &BundleLayout::default())?;
//! ```

pub mod util;
pub mod core;
pub mod codec;
pub mod io;
pub mod mesh;

// Re-export commonly used types
pub use crate::util::{DType, Error, Result};
pub use crate::core::{Array, EncodedArray, EncodedMesh};
pub use crate::codec::{Codec, Meshopt, Optimizer};
pub use crate::mesh::Mesh;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{DType, Error, Result};
    pub use crate::core::{Array, ArrayData, Element, EncodedArray, EncodedMesh};
    pub use crate::codec::{decode_array, decode_mesh, encode_array, encode_mesh, Codec, Meshopt, Optimizer, SimplifyOptions};
    pub use crate::io::*;
    pub use crate::mesh::{DecodeParams, Mesh};
}
