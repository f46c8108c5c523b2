//! Tower field: one randomized tower entity per placement-grid offset.

use engine_core::{BuildingInstance, GridCell, Transform, Vec3, World};
use procgen::{instance_seed, MeshData, PlacementGrid, TowerConfig, TowerGenerator};

use crate::materials::MaterialPalette;

/// Spawns a tower entity into a hecs world for every offset it is asked to place.
/// Meshes are kept alongside; `BuildingInstance::mesh_id` indexes into them.
pub struct EcsPlacer<'a> {
    world: &'a mut World,
    materials: &'a MaterialPalette,
    origin: Vec3,
    base_seed: u64,
    meshes: Vec<MeshData>,
}

impl<'a> EcsPlacer<'a> {
    pub fn new(
        world: &'a mut World,
        materials: &'a MaterialPalette,
        origin: Vec3,
        base_seed: u64,
    ) -> Self {
        Self {
            world,
            materials,
            origin,
            base_seed,
            meshes: Vec::new(),
        }
    }

    pub fn into_meshes(self) -> Vec<MeshData> {
        self.meshes
    }
}

impl PlacementGrid for EcsPlacer<'_> {
    fn place(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        let mesh_id = self.meshes.len() as u32;
        let seed = instance_seed(self.base_seed, self.meshes.len());
        let tower = TowerGenerator::new(TowerConfig::with_seed(seed)).generate(self.materials)?;

        self.world.spawn((
            Transform::from_grid_offset(self.origin, x, y),
            GridCell::new(x, y),
            BuildingInstance::tower(mesh_id, tower.material, seed),
        ));
        log::debug!(
            "Tower {} at ({}, {}): {} vertices, material {}",
            mesh_id,
            x,
            y,
            tower.mesh.vertex_count(),
            tower.material
        );
        self.meshes.push(tower.mesh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::populate_grid;

    #[test]
    fn places_one_entity_per_offset() {
        let mut world = World::new();
        let materials = MaterialPalette::default();
        let mut placer = EcsPlacer::new(&mut world, &materials, Vec3::ZERO, 5);
        populate_grid(5, 5, 10, &mut placer).unwrap();
        let meshes = placer.into_meshes();
        assert_eq!(meshes.len(), 25);

        let mut count = 0;
        for (_, (t, cell, inst)) in world
            .query::<(&Transform, &GridCell, &BuildingInstance)>()
            .iter()
        {
            count += 1;
            assert_eq!(t.position, Vec3::new(cell.x as f32, 0.0, cell.y as f32));
            assert!((inst.mesh_id as usize) < meshes.len());
            assert!(inst.material.is_some_and(|m| m < 6));
        }
        assert_eq!(count, 25);
    }

    #[test]
    fn same_base_seed_same_towers() {
        let materials = MaterialPalette::default();
        let run = || {
            let mut world = World::new();
            let mut placer = EcsPlacer::new(&mut world, &materials, Vec3::ZERO, 42);
            populate_grid(2, 2, 10, &mut placer).unwrap();
            placer.into_meshes()
        };
        let a = run();
        let b = run();
        assert_eq!(a, b);
        assert_ne!(a[0], a[1]);
    }
}
