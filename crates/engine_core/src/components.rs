//! ECS components for generated building instances.

/// Which generator produced an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildingKind {
    /// Randomized single tower.
    #[default]
    Tower,
    /// Tower built from an authored spec list.
    Segmented,
    /// Packed multi-building cluster.
    Cluster,
}

/// Integer offset an instance was placed at by the placement grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Mesh reference component - links an entity to its generated mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildingInstance {
    pub kind: BuildingKind,
    pub mesh_id: u32,
    /// Resolved material selector. `None` leaves the consumer's default material.
    pub material: Option<u32>,
    /// Seed the mesh was generated from.
    pub seed: u64,
}

impl BuildingInstance {
    pub fn tower(mesh_id: u32, material: u32, seed: u64) -> Self {
        Self {
            kind: BuildingKind::Tower,
            mesh_id,
            material: Some(material),
            seed,
        }
    }
}
