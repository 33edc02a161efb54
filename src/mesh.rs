//! In-memory triangle mesh.
//!
//! A [`Mesh`] owns a flat `f32` vertex buffer (`components` floats per
//! vertex, positions first) and an optional triangle list. Optimization
//! operations consume the mesh and return the rewritten one:
//!
//! ```ignore
//! let mesh = Mesh::from_positions(&positions, Some(indices))?
//!     .optimize_vertex_cache(&Meshopt)?
//!     .optimize_overdraw(&Meshopt, DEFAULT_OVERDRAW_THRESHOLD)?
//!     .optimize_vertex_fetch(&Meshopt)?;
//! let encoded = mesh.encode(&Meshopt)?;
//! ```

use crate::codec::{decode_mesh, encode_mesh, Codec, Optimizer, SimplifyOptions};
use crate::core::{EncodedMesh, DEFAULT_INDEX_SIZE};
use crate::util::{Error, Result};

/// Largest number of `f32` components per vertex (256-byte records).
pub const MAX_COMPONENTS: usize = 64;

/// Default cache-efficiency trade-off for [`Mesh::optimize_overdraw`].
pub const DEFAULT_OVERDRAW_THRESHOLD: f32 = 1.05;

/// Default fraction of indices kept by [`Mesh::simplify`].
pub const DEFAULT_SIMPLIFY_RATIO: f32 = 0.25;

/// Default relative error bound for [`Mesh::simplify`].
pub const DEFAULT_SIMPLIFY_ERROR: f32 = 0.01;

/// Caller-supplied parameters for [`Mesh::decode_buffers`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeParams {
    pub vertex_count: Option<usize>,
    pub vertex_size: Option<usize>,
    pub index_count: Option<usize>,
    pub index_size: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            vertex_count: None,
            vertex_size: None,
            index_count: None,
            index_size: DEFAULT_INDEX_SIZE,
        }
    }
}

/// Triangle mesh with `f32` vertex records.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    vertices: Vec<f32>,
    components: usize,
    indices: Option<Vec<u32>>,
}

impl Mesh {
    /// Create a mesh from a flat vertex buffer.
    ///
    /// `vertices.len()` must be a multiple of `components` and every index
    /// must refer to an existing vertex.
    pub fn new(vertices: Vec<f32>, components: usize, indices: Option<Vec<u32>>) -> Result<Self> {
        if components == 0 || components > MAX_COMPONENTS {
            return Err(Error::validation(format!(
                "components per vertex must be 1..={}, got {}",
                MAX_COMPONENTS, components
            )));
        }
        if vertices.len() % components != 0 {
            return Err(Error::validation(format!(
                "vertex buffer of {} floats is not a multiple of {} components",
                vertices.len(),
                components
            )));
        }
        let vertex_count = vertices.len() / components;
        if let Some(bad) = indices.iter().flatten().find(|&&i| i as usize >= vertex_count) {
            return Err(Error::validation(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }
        Ok(Self { vertices, components, indices })
    }

    /// Create a position-only mesh.
    pub fn from_positions(positions: &[[f32; 3]], indices: Option<Vec<u32>>) -> Result<Self> {
        Self::new(positions.iter().flatten().copied().collect(), 3, indices)
    }

    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    #[inline]
    pub fn components(&self) -> usize {
        self.components
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.components
    }

    /// Bytes per vertex record.
    #[inline]
    pub fn vertex_size(&self) -> usize {
        self.components * std::mem::size_of::<f32>()
    }

    /// Number of indices, 0 for a non-indexed mesh.
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Components of vertex `i`.
    pub fn vertex(&self, i: usize) -> Option<&[f32]> {
        self.vertices.chunks_exact(self.components).nth(i)
    }

    /// Iterate triangles as vertex index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .iter()
            .flat_map(|indices| indices.chunks_exact(3))
            .map(|t| [t[0], t[1], t[2]])
    }

    fn require_indices(&self, operation: &str) -> Result<&[u32]> {
        self.indices
            .as_deref()
            .ok_or_else(|| Error::validation(format!("{} requires an indexed mesh", operation)))
    }

    fn require_positions(&self, operation: &str) -> Result<()> {
        if self.components < 3 {
            return Err(Error::validation(format!(
                "{} requires at least 3 position components, mesh has {}",
                operation, self.components
            )));
        }
        Ok(())
    }

    /// Reorder triangles for vertex cache locality.
    pub fn optimize_vertex_cache<O: Optimizer + ?Sized>(self, optimizer: &O) -> Result<Self> {
        let indices = self.require_indices("vertex cache optimization")?;
        let mut reordered = vec![0u32; indices.len()];
        optimizer.optimize_vertex_cache(&mut reordered, indices, self.vertex_count())?;
        Ok(Self { indices: Some(reordered), ..self })
    }

    /// Reorder triangles to reduce overdraw, allowing vertex cache
    /// efficiency to degrade by at most `threshold`.
    pub fn optimize_overdraw<O: Optimizer + ?Sized>(self, optimizer: &O, threshold: f32) -> Result<Self> {
        let indices = self.require_indices("overdraw optimization")?;
        self.require_positions("overdraw optimization")?;
        let mut reordered = vec![0u32; indices.len()];
        optimizer.optimize_overdraw(
            &mut reordered,
            indices,
            &self.vertices,
            self.vertex_count(),
            self.vertex_size(),
            threshold,
        )?;
        Ok(Self { indices: Some(reordered), ..self })
    }

    /// Reorder vertices in first-use order and drop unreferenced ones.
    pub fn optimize_vertex_fetch<O: Optimizer + ?Sized>(self, optimizer: &O) -> Result<Self> {
        let mut indices = self.require_indices("vertex fetch optimization")?.to_vec();
        let mut vertices = vec![0f32; self.vertices.len()];
        let unique = optimizer.optimize_vertex_fetch(
            bytemuck::cast_slice_mut(&mut vertices),
            &mut indices,
            bytemuck::cast_slice(&self.vertices),
            self.vertex_count(),
            self.vertex_size(),
        )?;
        vertices.truncate(unique * self.components);
        tracing::trace!("Vertex fetch: {} -> {} vertices", self.vertex_count(), unique);
        Ok(Self { vertices, components: self.components, indices: Some(indices) })
    }

    /// Reduce the triangle count to roughly `target_ratio` of the indices
    /// while keeping the error under `target_error`.
    pub fn simplify<O: Optimizer + ?Sized>(
        self,
        optimizer: &O,
        target_ratio: f32,
        target_error: f32,
        options: SimplifyOptions,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&target_ratio) {
            return Err(Error::validation(format!("target ratio {} must be within 0..=1", target_ratio)));
        }
        let indices = self.require_indices("simplification")?;
        self.require_positions("simplification")?;

        let target_index_count = (indices.len() as f32 * target_ratio) as usize;
        let mut simplified = vec![0u32; indices.len()];
        let mut result_error = 0f32;
        let written = optimizer.simplify(
            &mut simplified,
            indices,
            &self.vertices,
            self.vertex_count(),
            self.vertex_size(),
            target_index_count,
            target_error,
            options,
            &mut result_error,
        )?;
        simplified.truncate(written);
        tracing::debug!(
            "Simplified {} -> {} indices (target {}, error {})",
            indices.len(),
            written,
            target_index_count,
            result_error
        );
        Ok(Self { indices: Some(simplified), ..self })
    }

    /// Compress the mesh.
    pub fn encode<C: Codec + ?Sized>(&self, codec: &C) -> Result<EncodedMesh> {
        encode_mesh(
            codec,
            bytemuck::cast_slice(&self.vertices),
            self.indices.as_deref(),
            self.vertex_count(),
            self.vertex_size(),
            None,
        )
    }

    /// Rebuild a mesh from its compressed form.
    pub fn decode<C: Codec + ?Sized>(codec: &C, encoded: &EncodedMesh) -> Result<Self> {
        let (vertices, indices) = decode_mesh(codec, encoded)?;
        Self::new(vertices, encoded.vertex_size / std::mem::size_of::<f32>(), indices)
    }

    /// Rebuild a mesh from loose compressed buffers and caller-supplied
    /// counts. Indices are decoded only when both the buffer and
    /// `index_count` are given.
    pub fn decode_buffers<C: Codec + ?Sized>(
        codec: &C,
        vertices: &[u8],
        indices: Option<&[u8]>,
        params: DecodeParams,
    ) -> Result<Self> {
        let vertex_count = params
            .vertex_count
            .ok_or_else(|| Error::validation("vertex_count is required to decode a mesh"))?;
        let vertex_size = params
            .vertex_size
            .ok_or_else(|| Error::validation("vertex_size is required to decode a mesh"))?;

        let mut encoded = EncodedMesh::new(vertices.to_vec(), vertex_count, vertex_size);
        encoded.index_size = params.index_size;
        if let (Some(indices), Some(index_count)) = (indices, params.index_count) {
            encoded = encoded.with_indices(indices.to_vec(), index_count);
        }
        Self::decode(codec, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::fake::FakeCodec;

    fn quad() -> Mesh {
        Mesh::from_positions(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            Some(vec![0, 1, 2, 2, 3, 0]),
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let mesh = quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.vertex_size(), 12);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.vertex(2), Some(&[1.0, 1.0, 0.0][..]));
        assert_eq!(mesh.vertex(4), None);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [2, 3, 0]]);
    }

    #[test]
    fn test_new_validates() {
        assert!(Mesh::new(vec![0.0; 7], 3, None).unwrap_err().is_validation());
        assert!(Mesh::new(vec![0.0; 6], 0, None).unwrap_err().is_validation());
        assert!(Mesh::new(vec![0.0; 65], 65, None).unwrap_err().is_validation());
        assert!(Mesh::new(vec![0.0; 6], 3, Some(vec![0, 1, 2])).unwrap_err().is_validation());
        let points = Mesh::new(vec![0.0; 6], 3, None).unwrap();
        assert_eq!(points.index_count(), 0);
    }

    #[test]
    fn test_operations_chain() {
        let mesh = quad()
            .optimize_vertex_cache(&FakeCodec)
            .unwrap()
            .optimize_overdraw(&FakeCodec, DEFAULT_OVERDRAW_THRESHOLD)
            .unwrap()
            .optimize_vertex_fetch(&FakeCodec)
            .unwrap();
        // The fake overdraw pass reverses triangle order.
        assert_eq!(mesh.indices(), Some(&[2, 3, 0, 0, 1, 2][..]));
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn test_non_indexed_operations_rejected() {
        let points = Mesh::new(vec![0.0; 9], 3, None).unwrap();
        assert!(points.clone().optimize_vertex_cache(&FakeCodec).unwrap_err().is_validation());
        assert!(points.clone().optimize_vertex_fetch(&FakeCodec).unwrap_err().is_validation());
        let err = points.simplify(&FakeCodec, 0.5, 0.01, SimplifyOptions::NONE).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_position_components_required() {
        let flat = Mesh::new(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0], 2, Some(vec![0, 1, 2])).unwrap();
        assert!(flat.clone().optimize_overdraw(&FakeCodec, 1.05).unwrap_err().is_validation());
        assert!(flat.clone().simplify(&FakeCodec, 0.5, 0.01, SimplifyOptions::NONE).unwrap_err().is_validation());
        assert!(flat.optimize_vertex_cache(&FakeCodec).is_ok());
    }

    #[test]
    fn test_simplify_target() {
        let mesh = quad().simplify(&FakeCodec, 0.5, DEFAULT_SIMPLIFY_ERROR, SimplifyOptions::NONE).unwrap();
        assert_eq!(mesh.indices(), Some(&[0, 1, 2][..]));

        let err = quad().simplify(&FakeCodec, 1.5, DEFAULT_SIMPLIFY_ERROR, SimplifyOptions::NONE).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_encode_decode() {
        let mesh = quad();
        let encoded = mesh.encode(&FakeCodec).unwrap();
        assert_eq!(encoded.vertex_size, 12);
        assert_eq!(encoded.index_count, Some(6));
        assert_eq!(Mesh::decode(&FakeCodec, &encoded).unwrap(), mesh);
    }

    #[test]
    fn test_decode_buffers() {
        let mesh = quad();
        let encoded = mesh.encode(&FakeCodec).unwrap();
        let indices = encoded.indices.as_deref();

        let params = DecodeParams { vertex_count: Some(4), vertex_size: Some(12), index_count: Some(6), ..Default::default() };
        assert_eq!(Mesh::decode_buffers(&FakeCodec, &encoded.vertices, indices, params).unwrap(), mesh);

        let no_count = DecodeParams { index_count: None, ..params };
        let decoded = Mesh::decode_buffers(&FakeCodec, &encoded.vertices, indices, no_count).unwrap();
        assert!(!decoded.is_indexed());

        let missing = DecodeParams { vertex_size: None, ..params };
        assert!(Mesh::decode_buffers(&FakeCodec, &encoded.vertices, indices, missing).unwrap_err().is_validation());
    }
}
