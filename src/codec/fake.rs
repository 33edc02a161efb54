//! Deterministic pure-Rust codec doubles for unit tests of container logic.

use super::{Codec, Optimizer, SimplifyOptions};
use crate::util::{Error, Result};

const VERTEX_MAGIC: u8 = 0xFA;
const INDEX_MAGIC: u8 = 0xFB;

/// Stores payloads uncompressed behind a one-byte tag.
#[derive(Clone, Copy, Debug, Default)]
pub struct FakeCodec;

/// Every primitive reports failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingCodec;

fn encode_words(dst: &mut [u8], indices: &[u32]) -> usize {
    let len = 1 + indices.len() * 4;
    if dst.len() < len {
        return 0;
    }
    dst[0] = INDEX_MAGIC;
    for (chunk, &i) in dst[1..len].chunks_exact_mut(4).zip(indices) {
        chunk.copy_from_slice(&i.to_le_bytes());
    }
    len
}

fn decode_words(dst: &mut [u32], index_size: usize, src: &[u8]) -> i32 {
    if index_size != 2 && index_size != 4 {
        return -1;
    }
    if src.len() != 1 + dst.len() * 4 || src[0] != INDEX_MAGIC {
        return -2;
    }
    for (out, chunk) in dst.iter_mut().zip(src[1..].chunks_exact(4)) {
        let v = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        *out = if index_size == 2 { v & 0xFFFF } else { v };
    }
    0
}

impl Codec for FakeCodec {
    fn encode_vertex_buffer_bound(&self, vertex_count: usize, vertex_size: usize) -> usize {
        1 + vertex_count * vertex_size
    }

    fn encode_vertex_buffer(&self, dst: &mut [u8], vertices: &[u8], vertex_count: usize, vertex_size: usize) -> usize {
        let len = vertex_count * vertex_size;
        if vertices.len() != len || dst.len() < len + 1 {
            return 0;
        }
        dst[0] = VERTEX_MAGIC;
        dst[1..=len].copy_from_slice(vertices);
        len + 1
    }

    fn decode_vertex_buffer(&self, dst: &mut [u8], vertex_count: usize, vertex_size: usize, src: &[u8]) -> i32 {
        if dst.len() != vertex_count * vertex_size {
            return -1;
        }
        if src.len() != dst.len() + 1 || src[0] != VERTEX_MAGIC {
            return -2;
        }
        dst.copy_from_slice(&src[1..]);
        0
    }

    fn encode_index_buffer_bound(&self, index_count: usize, _vertex_count: usize) -> usize {
        1 + index_count * 4
    }

    fn encode_index_buffer(&self, dst: &mut [u8], indices: &[u32]) -> usize {
        if indices.len() % 3 != 0 {
            return 0;
        }
        encode_words(dst, indices)
    }

    fn decode_index_buffer(&self, dst: &mut [u32], index_size: usize, src: &[u8]) -> i32 {
        if dst.len() % 3 != 0 {
            return -1;
        }
        decode_words(dst, index_size, src)
    }

    fn encode_index_sequence_bound(&self, index_count: usize, _vertex_count: usize) -> usize {
        1 + index_count * 4
    }

    fn encode_index_sequence(&self, dst: &mut [u8], indices: &[u32]) -> usize {
        encode_words(dst, indices)
    }

    fn decode_index_sequence(&self, dst: &mut [u32], index_size: usize, src: &[u8]) -> i32 {
        decode_words(dst, index_size, src)
    }

    fn decode_filter_oct(&self, _buffer: &mut [u8], _count: usize, _stride: usize) -> Result<()> {
        Ok(())
    }

    fn decode_filter_quat(&self, _buffer: &mut [u8], _count: usize, _stride: usize) -> Result<()> {
        Ok(())
    }

    fn decode_filter_exp(&self, _buffer: &mut [u8], _count: usize, _stride: usize) -> Result<()> {
        Ok(())
    }
}

impl Optimizer for FakeCodec {
    fn optimize_vertex_cache(&self, dst: &mut [u32], indices: &[u32], _vertex_count: usize) -> Result<()> {
        dst.copy_from_slice(indices);
        Ok(())
    }

    fn optimize_overdraw(
        &self,
        dst: &mut [u32],
        indices: &[u32],
        _positions: &[f32],
        _vertex_count: usize,
        _stride: usize,
        _threshold: f32,
    ) -> Result<()> {
        // Reverse triangle order so callers can observe the rewrite.
        for (out, tri) in dst.chunks_exact_mut(3).zip(indices.chunks_exact(3).rev()) {
            out.copy_from_slice(tri);
        }
        Ok(())
    }

    fn optimize_vertex_fetch(
        &self,
        dst: &mut [u8],
        _indices: &mut [u32],
        vertices: &[u8],
        vertex_count: usize,
        _vertex_size: usize,
    ) -> Result<usize> {
        dst[..vertices.len()].copy_from_slice(vertices);
        Ok(vertex_count)
    }

    fn simplify(
        &self,
        dst: &mut [u32],
        indices: &[u32],
        _positions: &[f32],
        _vertex_count: usize,
        _stride: usize,
        target_index_count: usize,
        _target_error: f32,
        _options: SimplifyOptions,
        result_error: &mut f32,
    ) -> Result<usize> {
        let keep = target_index_count - target_index_count % 3;
        dst[..keep].copy_from_slice(&indices[..keep]);
        *result_error = 0.0;
        Ok(keep)
    }
}

impl Codec for FailingCodec {
    fn encode_vertex_buffer_bound(&self, vertex_count: usize, vertex_size: usize) -> usize {
        vertex_count * vertex_size
    }

    fn encode_vertex_buffer(&self, _dst: &mut [u8], _vertices: &[u8], _count: usize, _size: usize) -> usize {
        0
    }

    fn decode_vertex_buffer(&self, _dst: &mut [u8], _count: usize, _size: usize, _src: &[u8]) -> i32 {
        -2
    }

    fn encode_index_buffer_bound(&self, index_count: usize, _vertex_count: usize) -> usize {
        index_count * 4
    }

    fn encode_index_buffer(&self, _dst: &mut [u8], _indices: &[u32]) -> usize {
        0
    }

    fn decode_index_buffer(&self, _dst: &mut [u32], _index_size: usize, _src: &[u8]) -> i32 {
        -2
    }

    fn encode_index_sequence_bound(&self, index_count: usize, _vertex_count: usize) -> usize {
        index_count * 4
    }

    fn encode_index_sequence(&self, _dst: &mut [u8], _indices: &[u32]) -> usize {
        0
    }

    fn decode_index_sequence(&self, _dst: &mut [u32], _index_size: usize, _src: &[u8]) -> i32 {
        -2
    }

    fn decode_filter_oct(&self, _buffer: &mut [u8], _count: usize, _stride: usize) -> Result<()> {
        Err(Error::validation("filter unavailable"))
    }

    fn decode_filter_quat(&self, _buffer: &mut [u8], _count: usize, _stride: usize) -> Result<()> {
        Err(Error::validation("filter unavailable"))
    }

    fn decode_filter_exp(&self, _buffer: &mut [u8], _count: usize, _stride: usize) -> Result<()> {
        Err(Error::validation("filter unavailable"))
    }
}
