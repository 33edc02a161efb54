//! Compression primitives and the codecs built on them.
//!
//! [`Codec`] and [`Optimizer`] describe the narrow surface of the native
//! meshoptimizer library the rest of the crate depends on. [`Meshopt`] binds
//! them to the real library; everything else is written against the traits.
//!
//! Primitive methods keep the library's conventions: encoders return the
//! number of bytes written (0 = failure) and decoders return a status code
//! (0 = success). [`encode_array`] / [`encode_mesh`] and friends turn those
//! into [`Error`](crate::Error) values.

mod array;
mod mesh;
mod native;

#[cfg(test)]
pub(crate) mod fake;

pub use array::{decode_array, encode_array, NATIVE_ITEM_SIZE};
pub use mesh::{decode_mesh, encode_mesh};
pub use native::Meshopt;

use crate::util::{Error, Result};

/// Vertex stream format advertised by [`Codec::vertex_version`].
///
/// This is the newest revision the decoder accepts, not necessarily the one
/// the encoder writes: the native library tags each stream with its own
/// revision in the low nibble of the first byte. Use
/// [`vertex_stream_revision`] to read the tag of an actual stream.
pub const VERTEX_FORMAT_VERSION: u32 = 1;

/// Wire format revision of the index stream.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Encoder and decoder primitives for vertex and index streams.
///
/// Implementations are deterministic and stateless: the same input always
/// produces the same bytes.
pub trait Codec {
    /// Upper bound on the encoded size of `vertex_count` records of
    /// `vertex_size` bytes.
    fn encode_vertex_buffer_bound(&self, vertex_count: usize, vertex_size: usize) -> usize;

    /// Encode `vertices` into `dst`. Returns bytes written, 0 on failure.
    fn encode_vertex_buffer(
        &self,
        dst: &mut [u8],
        vertices: &[u8],
        vertex_count: usize,
        vertex_size: usize,
    ) -> usize;

    /// Decode into `dst` (`vertex_count * vertex_size` bytes). Returns 0 on
    /// success or a nonzero error code.
    fn decode_vertex_buffer(&self, dst: &mut [u8], vertex_count: usize, vertex_size: usize, src: &[u8]) -> i32;

    /// Upper bound on the encoded size of a triangle list.
    fn encode_index_buffer_bound(&self, index_count: usize, vertex_count: usize) -> usize;

    /// Encode a triangle list (`indices.len()` must be a multiple of 3).
    /// Returns bytes written, 0 on failure.
    fn encode_index_buffer(&self, dst: &mut [u8], indices: &[u32]) -> usize;

    /// Decode a triangle list stored with `index_size` (2 or 4) byte
    /// indices. Indices are widened into `dst`. Returns 0 on success.
    fn decode_index_buffer(&self, dst: &mut [u32], index_size: usize, src: &[u8]) -> i32;

    /// Upper bound on the encoded size of an arbitrary index sequence.
    fn encode_index_sequence_bound(&self, index_count: usize, vertex_count: usize) -> usize;

    /// Encode an index sequence with no triangle structure.
    fn encode_index_sequence(&self, dst: &mut [u8], indices: &[u32]) -> usize;

    /// Decode an index sequence. Returns 0 on success.
    fn decode_index_sequence(&self, dst: &mut [u32], index_size: usize, src: &[u8]) -> i32;

    /// Octahedral normal filter over `count` elements of `stride` (4 or 8)
    /// bytes, in place.
    fn decode_filter_oct(&self, buffer: &mut [u8], count: usize, stride: usize) -> Result<()>;

    /// Quaternion filter over `count` elements of 8 bytes, in place.
    fn decode_filter_quat(&self, buffer: &mut [u8], count: usize, stride: usize) -> Result<()>;

    /// Exponential filter over `count` elements of `stride` (multiple of 4)
    /// bytes, in place.
    fn decode_filter_exp(&self, buffer: &mut [u8], count: usize, stride: usize) -> Result<()>;

    fn vertex_version(&self) -> u32 {
        VERTEX_FORMAT_VERSION
    }

    fn index_version(&self) -> u32 {
        INDEX_FORMAT_VERSION
    }
}

/// High nibble of the first byte of every vertex stream.
const VERTEX_HEADER: u8 = 0xa0;

/// Revision tag written at the start of an encoded vertex stream, or `None`
/// when `stream` does not start with a vertex header.
pub fn vertex_stream_revision(stream: &[u8]) -> Option<u8> {
    match stream.first() {
        Some(&b) if b & 0xf0 == VERTEX_HEADER => Some(b & 0x0f),
        _ => None,
    }
}

/// Flags accepted by [`Optimizer::simplify`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SimplifyOptions(u32);

impl SimplifyOptions {
    pub const NONE: Self = Self(0);
    /// Keep vertices on the mesh border in place.
    pub const LOCK_BORDER: Self = Self(1 << 0);
    /// Improve speed on small subsets of large meshes.
    pub const SPARSE: Self = Self(1 << 1);
    /// Treat the target error as absolute instead of relative to mesh extents.
    pub const ERROR_ABSOLUTE: Self = Self(1 << 2);
    /// Remove disconnected parts that fall under the target error.
    pub const PRUNE: Self = Self(1 << 3);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for SimplifyOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Mesh optimization primitives.
///
/// Inputs must describe a valid triangle list: index count a multiple of 3
/// and every index below `vertex_count`, otherwise a validation error is
/// returned. Position strides are in bytes.
pub trait Optimizer {
    /// Reorder triangles for post-transform vertex cache locality.
    fn optimize_vertex_cache(&self, dst: &mut [u32], indices: &[u32], vertex_count: usize) -> Result<()>;

    /// Reorder triangles to reduce overdraw, trading at most `threshold`
    /// cache efficiency.
    fn optimize_overdraw(
        &self,
        dst: &mut [u32],
        indices: &[u32],
        positions: &[f32],
        vertex_count: usize,
        stride: usize,
        threshold: f32,
    ) -> Result<()>;

    /// Reorder vertices in first-use order, rewriting `indices` in place.
    /// Returns the number of unique vertices written to `dst`.
    fn optimize_vertex_fetch(
        &self,
        dst: &mut [u8],
        indices: &mut [u32],
        vertices: &[u8],
        vertex_count: usize,
        vertex_size: usize,
    ) -> Result<usize>;

    /// Reduce the triangle count towards `target_index_count`. Returns the
    /// number of indices written to `dst`; the achieved error is stored in
    /// `result_error`.
    #[allow(clippy::too_many_arguments)]
    fn simplify(
        &self,
        dst: &mut [u32],
        indices: &[u32],
        positions: &[f32],
        vertex_count: usize,
        stride: usize,
        target_index_count: usize,
        target_error: f32,
        options: SimplifyOptions,
        result_error: &mut f32,
    ) -> Result<usize>;
}

/// Encode a raw vertex buffer.
pub fn encode_vertex_buffer<C: Codec + ?Sized>(
    codec: &C,
    vertices: &[u8],
    vertex_count: usize,
    vertex_size: usize,
) -> Result<Vec<u8>> {
    if vertex_count.checked_mul(vertex_size) != Some(vertices.len()) {
        return Err(Error::validation(format!(
            "vertex buffer holds {} bytes, expected {} x {}",
            vertices.len(),
            vertex_count,
            vertex_size
        )));
    }
    let mut buffer = vec![0u8; codec.encode_vertex_buffer_bound(vertex_count, vertex_size)];
    let written = codec.encode_vertex_buffer(&mut buffer, vertices, vertex_count, vertex_size);
    if written == 0 {
        return Err(Error::Encoding(format!(
            "vertex buffer ({} x {} bytes) produced no output",
            vertex_count, vertex_size
        )));
    }
    buffer.truncate(written);
    Ok(buffer)
}

/// Decode a raw vertex buffer of `vertex_count * vertex_size` bytes.
pub fn decode_vertex_buffer<C: Codec + ?Sized>(
    codec: &C,
    encoded: &[u8],
    vertex_count: usize,
    vertex_size: usize,
) -> Result<Vec<u8>> {
    let len = vertex_count
        .checked_mul(vertex_size)
        .ok_or_else(|| Error::validation("vertex buffer size overflows"))?;
    let mut dst = vec![0u8; len];
    match codec.decode_vertex_buffer(&mut dst, vertex_count, vertex_size, encoded) {
        0 => Ok(dst),
        code => Err(Error::Decoding { what: "vertex buffer", code }),
    }
}

/// Encode a triangle list.
pub fn encode_index_buffer<C: Codec + ?Sized>(codec: &C, indices: &[u32], vertex_count: usize) -> Result<Vec<u8>> {
    if indices.len() % 3 != 0 {
        return Err(Error::Encoding(format!(
            "index count {} is not a multiple of 3",
            indices.len()
        )));
    }
    let mut buffer = vec![0u8; codec.encode_index_buffer_bound(indices.len(), vertex_count)];
    let written = codec.encode_index_buffer(&mut buffer, indices);
    if written == 0 {
        return Err(Error::Encoding(format!("index buffer ({} indices) produced no output", indices.len())));
    }
    buffer.truncate(written);
    Ok(buffer)
}

/// Decode a triangle list of `index_count` indices.
pub fn decode_index_buffer<C: Codec + ?Sized>(
    codec: &C,
    encoded: &[u8],
    index_count: usize,
    index_size: usize,
) -> Result<Vec<u32>> {
    let mut dst = vec![0u32; index_count];
    match codec.decode_index_buffer(&mut dst, index_size, encoded) {
        0 => Ok(dst),
        code => Err(Error::Decoding { what: "index buffer", code }),
    }
}

/// Encode an index sequence (no triangle structure required).
pub fn encode_index_sequence<C: Codec + ?Sized>(codec: &C, indices: &[u32], vertex_count: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; codec.encode_index_sequence_bound(indices.len(), vertex_count)];
    let written = codec.encode_index_sequence(&mut buffer, indices);
    if written == 0 {
        return Err(Error::Encoding(format!("index sequence ({} indices) produced no output", indices.len())));
    }
    buffer.truncate(written);
    Ok(buffer)
}

/// Decode an index sequence of `index_count` indices.
pub fn decode_index_sequence<C: Codec + ?Sized>(
    codec: &C,
    encoded: &[u8],
    index_count: usize,
    index_size: usize,
) -> Result<Vec<u32>> {
    let mut dst = vec![0u32; index_count];
    match codec.decode_index_sequence(&mut dst, index_size, encoded) {
        0 => Ok(dst),
        code => Err(Error::Decoding { what: "index sequence", code }),
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{FailingCodec, FakeCodec};
    use super::*;

    #[test]
    fn test_vertex_buffer_roundtrip() {
        let raw: Vec<u8> = (0..48).collect();
        let encoded = encode_vertex_buffer(&FakeCodec, &raw, 4, 12).unwrap();
        assert_eq!(decode_vertex_buffer(&FakeCodec, &encoded, 4, 12).unwrap(), raw);
    }

    #[test]
    fn test_vertex_buffer_size_mismatch() {
        let err = encode_vertex_buffer(&FakeCodec, &[0u8; 10], 4, 12).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_index_buffer_requires_triangles() {
        let err = encode_index_buffer(&FakeCodec, &[0, 1, 2, 3], 4).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_index_sequence_any_length() {
        let seq = [0u32, 1, 2, 3];
        let encoded = encode_index_sequence(&FakeCodec, &seq, 4).unwrap();
        assert_eq!(decode_index_sequence(&FakeCodec, &encoded, 4, 4).unwrap(), seq);
    }

    #[test]
    fn test_primitive_failures_become_errors() {
        let err = encode_vertex_buffer(&FailingCodec, &[0u8; 12], 1, 12).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));

        let err = decode_index_buffer(&FailingCodec, &[1, 2, 3], 3, 4).unwrap_err();
        assert!(matches!(err, Error::Decoding { code: -2, .. }));
    }

    #[test]
    fn test_simplify_options() {
        let opts = SimplifyOptions::LOCK_BORDER | SimplifyOptions::ERROR_ABSOLUTE;
        assert_eq!(opts.bits(), 0b101);
        assert!(opts.contains(SimplifyOptions::LOCK_BORDER));
        assert!(!opts.contains(SimplifyOptions::SPARSE));
    }

    #[test]
    fn test_vertex_stream_revision() {
        assert_eq!(vertex_stream_revision(&[0xa0, 1, 2]), Some(0));
        assert_eq!(vertex_stream_revision(&[0xa1]), Some(1));
        assert_eq!(vertex_stream_revision(&[0xe1]), None);
        assert_eq!(vertex_stream_revision(&[]), None);
    }

    #[test]
    fn test_format_versions() {
        assert_eq!(FakeCodec.vertex_version(), 1);
        assert_eq!(FakeCodec.index_version(), 1);
    }
}
