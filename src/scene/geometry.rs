//! Triangle mesh data and built-in geometry generators.

use std::collections::HashMap;

use glam::Vec3;

use crate::util::{Error, Result};

/// Indexed triangle mesh with per-vertex normals
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check that indices address existing vertices and every vertex has a normal.
    pub fn validate(&self) -> Result<()> {
        if self.normals.len() != self.positions.len() {
            return Err(Error::other(format!(
                "normal count {} does not match vertex count {}",
                self.normals.len(),
                self.positions.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::other(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        let count = self.positions.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(Error::IndexOutOfBounds { index, count });
        }
        Ok(())
    }
}

const T: f32 = 1.618_034; // golden ratio

const ICO_VERTICES: [[f32; 3]; 12] = [
    [-1.0, T, 0.0],
    [1.0, T, 0.0],
    [-1.0, -T, 0.0],
    [1.0, -T, 0.0],
    [0.0, -1.0, T],
    [0.0, 1.0, T],
    [0.0, -1.0, -T],
    [0.0, 1.0, -T],
    [T, 0.0, -1.0],
    [T, 0.0, 1.0],
    [-T, 0.0, -1.0],
    [-T, 0.0, 1.0],
];

// Counter-clockwise seen from outside
const ICO_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Geodesic sphere: each icosahedron face is split into `(detail + 1)^2`
/// triangles and every vertex is pushed out to `radius`.
///
/// Normals point radially outward, so the result shades as a smooth sphere
/// at any detail level.
pub fn icosahedron(radius: f32, detail: u32) -> MeshData {
    let n = detail as usize + 1;
    let verts_per_face = (n + 1) * (n + 2) / 2;

    let mut mesh = MeshData {
        positions: Vec::with_capacity(20 * verts_per_face),
        normals: Vec::with_capacity(20 * verts_per_face),
        indices: Vec::with_capacity(20 * n * n * 3),
    };

    for face in ICO_FACES {
        let a = Vec3::from(ICO_VERTICES[face[0]]);
        let b = Vec3::from(ICO_VERTICES[face[1]]);
        let c = Vec3::from(ICO_VERTICES[face[2]]);
        let base = mesh.positions.len() as u32;

        // Barycentric grid, row j runs from the a-b edge towards c
        let row_start = |j: usize| j * (n + 1) - j * j.saturating_sub(1) / 2;
        let at = |i: usize, j: usize| base + (row_start(j) + i) as u32;
        for j in 0..=n {
            for i in 0..=(n - j) {
                let p = a + (b - a) * (i as f32 / n as f32) + (c - a) * (j as f32 / n as f32);
                let dir = p.normalize();
                mesh.positions.push((dir * radius).to_array());
                mesh.normals.push(dir.to_array());
            }
        }

        for j in 0..n {
            for i in 0..(n - j) {
                mesh.indices.extend([at(i, j), at(i + 1, j), at(i, j + 1)]);
                if i + j + 1 < n {
                    mesh.indices.extend([at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
                }
            }
        }
    }

    mesh
}

/// Quantized position key; vertices closer than 1e-4 share a normal.
fn pos_key(p: Vec3) -> (i32, i32, i32) {
    let scale = 10000.0;
    (
        (p.x * scale).round() as i32,
        (p.y * scale).round() as i32,
        (p.z * scale).round() as i32,
    )
}

/// Area-weighted smooth normals for meshes that ship without them.
///
/// Face normals are accumulated per welded position, so vertices split for
/// UV seams still get one continuous normal.
pub fn compute_vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Result<Vec<[f32; 3]>> {
    let count = positions.len();
    let mut sums: HashMap<(i32, i32, i32), Vec3> = HashMap::new();

    for tri in indices.chunks_exact(3) {
        let mut corners = [Vec3::ZERO; 3];
        for (corner, &index) in corners.iter_mut().zip(tri) {
            let p = positions
                .get(index as usize)
                .ok_or(Error::IndexOutOfBounds { index, count })?;
            *corner = Vec3::from(*p);
        }
        // Cross product length is twice the triangle area
        let face_n = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
        for corner in corners {
            *sums.entry(pos_key(corner)).or_insert(Vec3::ZERO) += face_n;
        }
    }

    Ok(positions
        .iter()
        .map(|p| {
            sums.get(&pos_key(Vec3::from(*p)))
                .map(|n| n.normalize_or_zero())
                .unwrap_or(Vec3::ZERO)
                .to_array()
        })
        .collect())
}
