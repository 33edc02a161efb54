//! Encoded records - compressed payloads plus the parameters needed to
//! decode them.

use crate::util::{DType, Result};

use super::array::shape_len;

/// Default width of one decoded index in bytes.
pub const DEFAULT_INDEX_SIZE: usize = 4;

/// One compressed numeric array.
///
/// `itemsize` is the width used when `data` was produced, which is the
/// native codec width, not necessarily `dtype`'s width. Decoding with a
/// different `itemsize` gives meaningless output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedArray {
    /// Compressed element stream
    pub data: Vec<u8>,
    /// Original shape before flattening
    pub shape: Vec<usize>,
    /// Original element type, restored on decode
    pub dtype: DType,
    /// Byte width of the encoded element unit
    pub itemsize: usize,
}

impl EncodedArray {
    /// Number of elements the shape describes.
    pub fn item_count(&self) -> Result<usize> {
        shape_len(&self.shape)
    }

    /// Length of the compressed payload in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One compressed mesh.
///
/// The compressed streams are not self-describing: the counts and sizes
/// must travel with them and match the values used at encode time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedMesh {
    /// Compressed vertex buffer
    pub vertices: Vec<u8>,
    /// Compressed index buffer, `None` for a non-indexed mesh
    pub indices: Option<Vec<u8>>,
    pub vertex_count: usize,
    /// Bytes per vertex record
    pub vertex_size: usize,
    pub index_count: Option<usize>,
    /// Bytes per decoded index (2 or 4)
    pub index_size: usize,
}

impl EncodedMesh {
    /// Create a non-indexed encoded mesh.
    pub fn new(vertices: Vec<u8>, vertex_count: usize, vertex_size: usize) -> Self {
        Self {
            vertices,
            indices: None,
            vertex_count,
            vertex_size,
            index_count: None,
            index_size: DEFAULT_INDEX_SIZE,
        }
    }

    /// Attach a compressed index buffer.
    pub fn with_indices(mut self, indices: Vec<u8>, index_count: usize) -> Self {
        self.indices = Some(indices);
        self.index_count = Some(index_count);
        self
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Total compressed size of both streams.
    pub fn encoded_len(&self) -> usize {
        self.vertices.len() + self.indices.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_count_from_shape() {
        let e = EncodedArray { data: vec![1, 2, 3], shape: vec![4, 5], dtype: DType::Int32, itemsize: 4 };
        assert_eq!(e.item_count().unwrap(), 20);
        assert_eq!(e.len(), 3);

        let huge = EncodedArray { shape: vec![1 << 40, 1 << 40], ..e };
        assert!(huge.item_count().unwrap_err().is_validation());
    }

    #[test]
    fn test_encoded_mesh_builders() {
        let m = EncodedMesh::new(vec![0; 10], 8, 12);
        assert!(!m.is_indexed());
        assert_eq!(m.index_size, DEFAULT_INDEX_SIZE);
        assert_eq!(m.index_count, None);

        let m = m.with_indices(vec![0; 5], 36);
        assert!(m.is_indexed());
        assert_eq!(m.index_count, Some(36));
        assert_eq!(m.encoded_len(), 15);
    }
}
