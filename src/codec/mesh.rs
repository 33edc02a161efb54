//! Mesh codec - vertex buffer plus optional triangle list to an
//! [`EncodedMesh`] and back.

use crate::core::{EncodedMesh, DEFAULT_INDEX_SIZE};
use crate::util::{Error, Result};

use super::{decode_index_buffer, decode_vertex_buffer, encode_index_buffer, encode_vertex_buffer, Codec};

/// Compress a mesh.
///
/// `vertices` is the raw vertex buffer (`vertex_count * vertex_size`
/// bytes). `index_count` defaults to the full index buffer; when given it
/// must not exceed it and only that prefix is encoded. Index counts that are
/// not a multiple of 3 fail with an encoding error.
pub fn encode_mesh<C: Codec + ?Sized>(
    codec: &C,
    vertices: &[u8],
    indices: Option<&[u32]>,
    vertex_count: usize,
    vertex_size: usize,
    index_count: Option<usize>,
) -> Result<EncodedMesh> {
    let encoded_vertices = encode_vertex_buffer(codec, vertices, vertex_count, vertex_size)?;
    let mut mesh = EncodedMesh::new(encoded_vertices, vertex_count, vertex_size);

    if let Some(indices) = indices {
        let count = index_count.unwrap_or(indices.len());
        if count > indices.len() {
            return Err(Error::validation(format!(
                "index_count {} exceeds the {} indices supplied",
                count,
                indices.len()
            )));
        }
        let encoded_indices = encode_index_buffer(codec, &indices[..count], vertex_count)?;
        mesh = mesh.with_indices(encoded_indices, count);
    }

    tracing::trace!(
        "Encoded mesh: {} vertices x {} bytes, {} indices -> {} bytes",
        vertex_count,
        vertex_size,
        mesh.index_count.unwrap_or(0),
        mesh.encoded_len()
    );
    Ok(mesh)
}

/// Decompress a mesh into `f32` vertex components and widened indices.
///
/// Counts and sizes come from the record and are trusted: values that do
/// not match the encode-time parameters yield a decoding error or garbage.
pub fn decode_mesh<C: Codec + ?Sized>(codec: &C, encoded: &EncodedMesh) -> Result<(Vec<f32>, Option<Vec<u32>>)> {
    if encoded.vertex_size == 0 || encoded.vertex_size % 4 != 0 {
        return Err(Error::validation(format!(
            "vertex_size {} must be a positive multiple of 4",
            encoded.vertex_size
        )));
    }
    let raw = decode_vertex_buffer(codec, &encoded.vertices, encoded.vertex_count, encoded.vertex_size)?;
    let vertices: Vec<f32> = bytemuck::pod_collect_to_vec(&raw);

    let indices = match &encoded.indices {
        Some(stream) => {
            let index_count = encoded
                .index_count
                .ok_or_else(|| Error::validation("index stream present but index_count is missing"))?;
            let index_size = if encoded.index_size == 0 { DEFAULT_INDEX_SIZE } else { encoded.index_size };
            Some(decode_index_buffer(codec, stream, index_count, index_size)?)
        }
        None => None,
    };

    Ok((vertices, indices))
}
