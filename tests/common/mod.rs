//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

/// Vertex coordinates as bit patterns, so they can be ordered and compared exactly.
pub type VertexKey = [u32; 3];

/// Unit cube centred at the origin: 8 vertices, 12 triangles.
pub fn cube() -> (Vec<[f32; 3]>, Vec<u32>) {
    let vertices = vec![
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
    ];
    let indices = vec![
        0, 1, 2, 2, 3, 0, // front
        1, 5, 6, 6, 2, 1, // right
        5, 4, 7, 7, 6, 5, // back
        4, 0, 3, 3, 7, 4, // left
        3, 2, 6, 6, 7, 3, // top
        4, 5, 1, 1, 0, 4, // bottom
    ];
    (vertices, indices)
}

fn key(vertices: &[f32], components: usize, index: u32) -> VertexKey {
    let base = index as usize * components;
    [vertices[base].to_bits(), vertices[base + 1].to_bits(), vertices[base + 2].to_bits()]
}

/// Triangles as sorted position triples, independent of vertex and index order.
pub fn triangle_set(vertices: &[f32], components: usize, indices: &[u32]) -> BTreeSet<[VertexKey; 3]> {
    indices
        .chunks_exact(3)
        .map(|t| {
            let mut tri = [key(vertices, components, t[0]), key(vertices, components, t[1]), key(vertices, components, t[2])];
            tri.sort();
            tri
        })
        .collect()
}

/// Flatten `[x, y, z]` records.
pub fn flatten(vertices: &[[f32; 3]]) -> Vec<f32> {
    vertices.iter().flatten().copied().collect()
}
