//! Polygon mesh contract
//!
//! The geometry a renderer bridge consumes: a flat vertex array with the
//! named attributes `position`, `normal`, and `texcoord`, a flat index list,
//! and a primitive arity (3 for triangles). Mesh file import lives behind
//! the importer's `MeshProvider` trait; the procedural constructors here give
//! headless runs and tests real geometry without touching the filesystem.

use std::f32::consts::PI;

/// Single vertex with position, normal, and texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex from raw attribute arrays.
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// Indexed mesh with a fixed vertex layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonMesh {
    /// Vertex array.
    pub vertices: Vec<Vertex>,
    /// Flat index list; `primitive_size` consecutive entries form one
    /// primitive.
    pub indices: Vec<u32>,
    /// Number of indices per primitive (3 = triangles).
    pub primitive_size: u32,
}

impl PolygonMesh {
    /// Create a mesh from raw parts.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, primitive_size: u32) -> Self {
        Self {
            vertices,
            indices,
            primitive_size,
        }
    }

    /// Create an empty triangle mesh.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), 3)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of complete primitives described by the index list.
    pub fn primitive_count(&self) -> usize {
        if self.primitive_size == 0 {
            0
        } else {
            self.indices.len() / self.primitive_size as usize
        }
    }

    /// Whether every vertex carries the named attribute. The layout is fixed,
    /// so this is a vocabulary check against `position`/`normal`/`texcoord`.
    pub fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "position" | "normal" | "texcoord")
    }

    /// Axis-aligned unit cube centered at the origin, one quad per face with
    /// face normals.
    pub fn unit_cube() -> Self {
        // (normal, tangent, bitangent) per face; corners are 0.5*(n ± t ± b)
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
            ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
            ([0.0, -1.0, 0.0], [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, tangent, bitangent) in FACES {
            let base = vertices.len() as u32;
            for (s, t) in [(-1.0f32, -1.0f32), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
                let position = [
                    0.5 * (normal[0] + s * tangent[0] + t * bitangent[0]),
                    0.5 * (normal[1] + s * tangent[1] + t * bitangent[1]),
                    0.5 * (normal[2] + s * tangent[2] + t * bitangent[2]),
                ];
                let tex_coord = [0.5 * (s + 1.0), 0.5 * (t + 1.0)];
                vertices.push(Vertex::new(position, normal, tex_coord));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
        }
        Self::new(vertices, indices, 3)
    }

    /// Latitude/longitude unit sphere (diameter 1) centered at the origin.
    pub fn unit_sphere(longitude_segments: u32, latitude_segments: u32) -> Self {
        let longs = longitude_segments.max(3);
        let lats = latitude_segments.max(2);

        let mut vertices = Vec::new();
        for lat in 0..=lats {
            let theta = PI * lat as f32 / lats as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            for lon in 0..=longs {
                let phi = 2.0 * PI * lon as f32 / longs as f32;
                let (sin_phi, cos_phi) = phi.sin_cos();
                let normal = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
                let position = [0.5 * normal[0], 0.5 * normal[1], 0.5 * normal[2]];
                let tex_coord = [lon as f32 / longs as f32, lat as f32 / lats as f32];
                vertices.push(Vertex::new(position, normal, tex_coord));
            }
        }

        let stride = longs + 1;
        let mut indices = Vec::new();
        for lat in 0..lats {
            for lon in 0..longs {
                let a = lat * stride + lon;
                let b = a + stride;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        Self::new(vertices, indices, 3)
    }
}
