//! Trapezoid extrusion: side walls between two stacked rectangular cross-sections.

use glam::{Vec2, Vec3};

use crate::error::GenError;
use crate::geometry::GeometryBuffer;

/// Corners of a footprint centered on the local origin at height `h`.
/// `footprint.x` is the width along X, `footprint.y` the depth along Z.
pub fn rect_corners(h: f32, footprint: Vec2) -> [Vec3; 4] {
    let hx = footprint.x * 0.5;
    let hz = footprint.y * 0.5;
    [
        Vec3::new(hx, h, hz),
        Vec3::new(-hx, h, hz),
        Vec3::new(-hx, h, -hz),
        Vec3::new(hx, h, -hz),
    ]
}

/// Extrude from `footprint1` at `h1` up to `footprint2` at `h2`.
///
/// Either footprint may be zero, which collapses that face to a point and makes the
/// trapezoid a cap.
pub fn extrude_side(
    buffer: &mut GeometryBuffer,
    h1: f32,
    h2: f32,
    footprint1: Vec2,
    footprint2: Vec2,
) {
    buffer.append_quad_prism(rect_corners(h1, footprint1), rect_corners(h2, footprint2));
}

/// Extrude from the buffer's last ring up to `footprint` at `h2`.
pub fn extrude_continuation(
    buffer: &mut GeometryBuffer,
    h2: f32,
    footprint: Vec2,
) -> Result<(), GenError> {
    buffer.append_ring(rect_corners(h2, footprint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_counter_clockwise_from_above() {
        let c = rect_corners(2.0, Vec2::new(4.0, 2.0));
        assert_eq!(c[0], Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(c[1], Vec3::new(-2.0, 2.0, 1.0));
        assert_eq!(c[2], Vec3::new(-2.0, 2.0, -1.0));
        assert_eq!(c[3], Vec3::new(2.0, 2.0, -1.0));
    }

    #[test]
    fn zero_footprint_collapses_to_point() {
        let mut buf = GeometryBuffer::new();
        extrude_side(&mut buf, 0.0, 1.0, Vec2::ZERO, Vec2::splat(2.0));
        assert!(buf.positions()[..4].iter().all(|&p| p == Vec3::ZERO));
        assert_eq!(buf.index_count(), 24);
    }

    #[test]
    fn continuation_chains_off_previous_top() {
        let mut buf = GeometryBuffer::new();
        extrude_side(&mut buf, 0.0, 1.0, Vec2::splat(2.0), Vec2::splat(2.0));
        extrude_continuation(&mut buf, 3.0, Vec2::splat(1.0)).unwrap();
        assert_eq!(buf.vertex_count(), 12);
        assert_eq!(buf.index_count(), 48);
        // Second segment walls reference the first segment's top ring (4..8).
        assert_eq!(&buf.indices()[24..27], &[4, 9, 5]);
        assert_eq!(buf.last_ring(), Some(rect_corners(3.0, Vec2::splat(1.0))));
    }

    #[test]
    fn continuation_without_ring_fails() {
        let mut buf = GeometryBuffer::new();
        let err = extrude_continuation(&mut buf, 1.0, Vec2::ONE).unwrap_err();
        assert!(matches!(err, GenError::InvalidState(_)));
    }
}
