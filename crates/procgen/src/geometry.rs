//! Append-only vertex/index accumulation for building meshes.
//!
//! Every append computes its triangle indices relative to the vertex count *after* the
//! new vertices are pushed, so appends must happen in the order corners are emitted.
//! Corner rings are always four vertices in +x+z, -x+z, -x-z, +x-z order.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::error::GenError;

/// Side walls between the ring at `n-8..n-4` and the ring at `n-4..n`, as offsets from `n`.
#[rustfmt::skip]
const SIDE_WALL_OFFSETS: [u32; 24] = [
    8, 3, 7,  8, 4, 3,
    7, 2, 6,  7, 3, 2,
    6, 1, 5,  6, 2, 1,
    5, 1, 8,  8, 1, 4,
];

/// Two triangles spanning the ring at `n-4..n`.
const ROOF_OFFSETS: [u32; 6] = [4, 2, 3, 4, 1, 2];

/// Flat vertex for upload (position + recalculated normal).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BuildingVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Growing vertex and triangle buffers for one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GeometryBuffer {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// The most recently appended ring of four corners, if any.
    pub fn last_ring(&self) -> Option<[Vec3; 4]> {
        let n = self.positions.len();
        if n < 4 {
            return None;
        }
        let mut ring = [Vec3::ZERO; 4];
        ring.copy_from_slice(&self.positions[n - 4..]);
        Some(ring)
    }

    /// Drop all geometry. Used when a tower is rebuilt from scratch.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.indices.clear();
    }

    /// Append a bottom ring and a top ring, then the four side walls joining them.
    pub fn append_quad_prism(&mut self, bottom: [Vec3; 4], top: [Vec3; 4]) {
        self.positions.extend_from_slice(&bottom);
        self.positions.extend_from_slice(&top);
        self.push_relative(&SIDE_WALL_OFFSETS);
    }

    /// Append a top ring and wall it to the previous four vertices.
    pub fn append_ring(&mut self, top: [Vec3; 4]) -> Result<(), GenError> {
        if self.positions.len() < 4 {
            return Err(GenError::InvalidState(format!(
                "ring continuation needs a previous ring, buffer holds {} vertices",
                self.positions.len()
            )));
        }
        self.positions.extend_from_slice(&top);
        self.push_relative(&SIDE_WALL_OFFSETS);
        Ok(())
    }

    /// Cap the most recent ring with two triangles. Adds no vertices.
    pub fn append_roof(&mut self) -> Result<(), GenError> {
        if self.positions.len() < 4 {
            return Err(GenError::InvalidState(format!(
                "roof needs a ring to cap, buffer holds {} vertices",
                self.positions.len()
            )));
        }
        self.push_relative(&ROOF_OFFSETS);
        Ok(())
    }

    fn push_relative(&mut self, offsets: &[u32]) {
        let n = self.positions.len() as u32;
        debug_assert!(offsets.iter().all(|&k| (1..=n).contains(&k)));
        self.indices.extend(offsets.iter().map(|&k| n - k));
    }

    /// Snapshot the buffers. Calling this twice without appends returns equal meshes.
    pub fn finalize(&self, submesh_count: u32) -> MeshData {
        MeshData {
            positions: self.positions.clone(),
            indices: self.indices.clone(),
            submesh_count,
        }
    }
}

/// Finished mesh handed to a [`crate::MeshConsumer`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub submesh_count: u32,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as (min, max). `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Area-weighted per-vertex normals. Degenerate triangles contribute nothing, and a
    /// vertex touched only by degenerate triangles gets a zero normal.
    pub fn recalculate_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        normals.into_iter().map(|n| n.normalize_or_zero()).collect()
    }

    /// Interleaved vertices ready for `bytemuck::cast_slice`.
    pub fn vertices(&self) -> Vec<BuildingVertex> {
        self.positions
            .iter()
            .zip(self.recalculate_normals())
            .map(|(p, n)| BuildingVertex {
                position: p.to_array(),
                normal: n.to_array(),
            })
            .collect()
    }
}
