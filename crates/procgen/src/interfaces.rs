//! Seams to the host: where finished meshes go, how materials are looked up, and how
//! generator instances get laid out in the world.

use crate::geometry::MeshData;

/// Receives finished meshes. Display or persistence is the consumer's business; the
/// submesh layout travels with the mesh in `MeshData::submesh_count`.
pub trait MeshConsumer {
    fn consume(&mut self, mesh: &MeshData) -> anyhow::Result<()>;
}

/// Maps a selector in `[0, material_count())` to a host material handle.
pub trait MaterialResolver {
    type Handle;

    fn material_count(&self) -> u32;

    fn resolve(&self, selector: u32) -> Self::Handle;
}

/// Instantiates one generator at an integer world offset.
pub trait PlacementGrid {
    fn place(&mut self, x: i32, y: i32) -> anyhow::Result<()>;
}

/// Place `rows * cols` instances, `spacing` world units apart, starting at the origin.
/// Stops at the first instance that fails.
pub fn populate_grid<P: PlacementGrid + ?Sized>(
    rows: u32,
    cols: u32,
    spacing: i32,
    placer: &mut P,
) -> anyhow::Result<()> {
    for col in 0..cols as i32 {
        for row in 0..rows as i32 {
            placer.place(col * spacing, row * spacing)?;
        }
    }
    log::debug!("Placed {}x{} building grid at spacing {}", cols, rows, spacing);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Recorder(Vec<(i32, i32)>);

    impl PlacementGrid for Recorder {
        fn place(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
            if x < 0 {
                anyhow::bail!("negative offset");
            }
            self.0.push((x, y));
            Ok(())
        }
    }

    #[test]
    fn populate_grid_visits_every_offset_once() {
        let mut r = Recorder::default();
        populate_grid(5, 5, 10, &mut r).unwrap();
        assert_eq!(r.0.len(), 25);
        let unique: HashSet<_> = r.0.iter().copied().collect();
        assert_eq!(unique.len(), 25);
        assert!(unique.contains(&(0, 0)));
        assert!(unique.contains(&(40, 40)));
        assert!(!unique.contains(&(50, 0)));
    }

    #[test]
    fn populate_grid_empty_dimensions_places_nothing() {
        let mut r = Recorder::default();
        populate_grid(0, 3, 10, &mut r).unwrap();
        assert!(r.0.is_empty());
    }

    #[test]
    fn populate_grid_stops_on_first_failure() {
        let mut r = Recorder::default();
        assert!(populate_grid(2, 3, -10, &mut r).is_err());
        // Column 0 lands both rows, column 1 fails at x = -10.
        assert_eq!(r.0, vec![(0, 0), (0, -10)]);
    }
}
