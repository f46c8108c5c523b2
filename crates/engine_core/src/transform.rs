//! Transform component for placing generated meshes in the world.

use glam::{Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Transform for an instance at integer ground offset `(x, y)` from `origin`.
    /// Ground offsets map onto the XZ plane.
    pub fn from_grid_offset(origin: Vec3, x: i32, y: i32) -> Self {
        Self::from_position(origin + Vec3::new(x as f32, 0.0, y as f32))
    }

    /// Map a local-space point into world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }
}
