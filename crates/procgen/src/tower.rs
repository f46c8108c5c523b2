//! Single-tower generation: a stack of rectangular segments capped top and bottom.
//!
//! Two flavors share the same extrusion path:
//! - randomized towers ([`TowerGenerator`]) that alternate between holding and shrinking
//!   their footprint as they rise,
//! - authored towers ([`SegmentedTower`]) built verbatim from a list of [`BuildRectSpec`].

use std::ops::{Range, RangeInclusive};

use glam::Vec2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GenError;
use crate::extrude::{extrude_continuation, extrude_side};
use crate::geometry::{GeometryBuffer, MeshData};
use crate::interfaces::MaterialResolver;

/// Towers are handed to consumers with three submesh slots.
pub const TOWER_SUBMESH_COUNT: u32 = 3;

/// One authored segment: rise by `h`, ending in a `width` x `depth` rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildRectSpec {
    pub h: f32,
    pub width: f32,
    pub depth: f32,
}

impl BuildRectSpec {
    pub fn new(h: f32, width: f32, depth: f32) -> Self {
        Self { h, width, depth }
    }

    pub fn footprint(&self) -> Vec2 {
        Vec2::new(self.width, self.depth)
    }
}

/// Tunables for randomized towers.
#[derive(Debug, Clone)]
pub struct TowerConfig {
    /// Random seed for variation
    pub seed: u64,
    /// Initial footprint width and depth, drawn independently
    pub footprint: Range<f32>,
    /// Height of the first segment's top ring
    pub first_height: Range<f32>,
    /// Number of stacked segments
    pub segments: RangeInclusive<u32>,
    /// Height gained per segment
    pub height_step: Range<f32>,
    /// Per-axis scale applied to the initial footprint on shrinking segments
    pub shrink: Range<f32>,
    /// Scale of the roof cap's rise (further biased small by two unit draws)
    pub cap_scale: Range<f32>,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            footprint: 1.0..3.0,
            first_height: 0.75..1.5,
            segments: 5..=9,
            height_step: 0.5..1.5,
            shrink: 0.5..1.0,
            cap_scale: 0.5..1.5,
        }
    }
}

impl TowerConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }
}

/// Append a randomized tower to `buffer`.
pub fn build_random_tower<R: Rng + ?Sized>(
    buffer: &mut GeometryBuffer,
    config: &TowerConfig,
    rng: &mut R,
) -> Result<(), GenError> {
    let base = Vec2::new(
        rng.gen_range(config.footprint.clone()),
        rng.gen_range(config.footprint.clone()),
    );
    let mut footprint = base;
    let mut h_low = 0.0;
    let mut h_high = rng.gen_range(config.first_height.clone());
    let mut hold = true;

    extrude_side(buffer, 0.0, 0.0, Vec2::ZERO, footprint);

    let segments = rng.gen_range(config.segments.clone());
    for _ in 0..segments {
        let next = if hold {
            footprint
        } else {
            Vec2::new(
                base.x * rng.gen_range(config.shrink.clone()),
                base.y * rng.gen_range(config.shrink.clone()),
            )
        };
        extrude_continuation(buffer, h_high, next)?;

        h_low = h_high;
        h_high += rng.gen_range(config.height_step.clone());
        footprint = next;
        hold = !hold;
    }

    let cap = rng.gen::<f32>() * rng.gen::<f32>() * rng.gen_range(config.cap_scale.clone());
    extrude_side(buffer, h_low, h_low + cap, footprint, Vec2::ZERO);

    log::trace!("Random tower: {} segments, top at {:.2}", segments, h_low + cap);
    Ok(())
}

/// Append an authored tower to `buffer`. No randomness: identical specs give identical
/// geometry.
pub fn build_segmented_tower(
    buffer: &mut GeometryBuffer,
    specs: &[BuildRectSpec],
) -> Result<(), GenError> {
    let mut h = 0.0;
    let mut last = Vec2::ZERO;

    extrude_side(buffer, 0.0, 0.0, Vec2::ZERO, Vec2::ZERO);

    for spec in specs {
        extrude_continuation(buffer, h + spec.h, spec.footprint())?;
        h += spec.h;
        last = spec.footprint();
    }

    if last != Vec2::ZERO {
        extrude_side(buffer, h, h, last, Vec2::ZERO);
    }
    Ok(())
}

/// A generated tower plus the material the resolver picked for it.
#[derive(Debug, Clone)]
pub struct GeneratedTower<H> {
    pub mesh: MeshData,
    pub material_selector: u32,
    pub material: H,
}

/// Randomized tower generator with its own seeded RNG.
pub struct TowerGenerator {
    rng: StdRng,
    config: TowerConfig,
    buffer: GeometryBuffer,
}

impl TowerGenerator {
    pub fn new(config: TowerConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            buffer: GeometryBuffer::new(),
        }
    }

    /// Build the tower and resolve exactly one material for it.
    pub fn generate<M: MaterialResolver>(
        mut self,
        materials: &M,
    ) -> Result<GeneratedTower<M::Handle>, GenError> {
        build_random_tower(&mut self.buffer, &self.config, &mut self.rng)?;

        let material_selector = self.rng.gen_range(0..materials.material_count().max(1));
        let material = materials.resolve(material_selector);

        Ok(GeneratedTower {
            mesh: self.buffer.finalize(TOWER_SUBMESH_COUNT),
            material_selector,
            material,
        })
    }
}

/// Authored tower that regenerates from scratch whenever its spec list changes.
#[derive(Debug, Clone, Default)]
pub struct SegmentedTower {
    specs: Vec<BuildRectSpec>,
    buffer: GeometryBuffer,
    rebuilds: u32,
}

impl SegmentedTower {
    pub fn new(specs: Vec<BuildRectSpec>) -> Result<Self, GenError> {
        let mut tower = Self {
            specs,
            ..Default::default()
        };
        tower.rebuild()?;
        Ok(tower)
    }

    pub fn specs(&self) -> &[BuildRectSpec] {
        &self.specs
    }

    /// Replace the spec list. Always triggers a full rebuild.
    pub fn set_specs(&mut self, specs: Vec<BuildRectSpec>) -> Result<(), GenError> {
        self.specs = specs;
        self.rebuild()
    }

    /// Discard all geometry and regenerate it from the current specs.
    pub fn rebuild(&mut self) -> Result<(), GenError> {
        self.buffer.clear();
        build_segmented_tower(&mut self.buffer, &self.specs)?;
        self.rebuilds += 1;
        log::debug!(
            "Rebuilt segmented tower #{}: {} specs, {} vertices",
            self.rebuilds,
            self.specs.len(),
            self.buffer.vertex_count()
        );
        Ok(())
    }

    pub fn rebuild_count(&self) -> u32 {
        self.rebuilds
    }

    pub fn mesh(&self) -> MeshData {
        self.buffer.finalize(TOWER_SUBMESH_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::cell::Cell;

    struct CountingPalette {
        count: u32,
        calls: Cell<u32>,
    }

    impl MaterialResolver for CountingPalette {
        type Handle = u32;

        fn material_count(&self) -> u32 {
            self.count
        }

        fn resolve(&self, selector: u32) -> u32 {
            self.calls.set(self.calls.get() + 1);
            selector
        }
    }

    fn palette() -> CountingPalette {
        CountingPalette { count: 6, calls: Cell::new(0) }
    }

    fn two_step_specs() -> Vec<BuildRectSpec> {
        vec![BuildRectSpec::new(2.0, 4.0, 4.0), BuildRectSpec::new(1.0, 2.0, 2.0)]
    }

    #[test]
    fn two_step_spec_collapses_to_point_at_top() {
        let tower = SegmentedTower::new(two_step_specs()).unwrap();
        let mesh = tower.mesh();
        assert_eq!(mesh.vertex_count(), 24);
        for p in &mesh.positions[20..] {
            assert_eq!(*p, Vec3::new(0.0, 3.0, 0.0));
        }
        // Second spec's ring sits at the accumulated height.
        assert_eq!(mesh.positions[12], Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(mesh.positions[8], Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn segmented_tower_is_byte_identical_for_same_specs() {
        let a = SegmentedTower::new(two_step_specs()).unwrap().mesh();
        let b = SegmentedTower::new(two_step_specs()).unwrap().mesh();
        let bytes_a: &[u8] = bytemuck::cast_slice(&a.positions);
        let bytes_b: &[u8] = bytemuck::cast_slice(&b.positions);
        assert_eq!(bytes_a, bytes_b);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn empty_spec_list_emits_only_base_cap() {
        let tower = SegmentedTower::new(Vec::new()).unwrap();
        assert_eq!(tower.mesh().vertex_count(), 8);
    }

    #[test]
    fn set_specs_rebuilds_from_scratch() {
        let mut tower = SegmentedTower::new(two_step_specs()).unwrap();
        assert_eq!(tower.rebuild_count(), 1);
        tower.set_specs(vec![BuildRectSpec::new(5.0, 1.0, 1.0)]).unwrap();
        assert_eq!(tower.rebuild_count(), 2);
        let mesh = tower.mesh();
        // Old geometry is gone: base cap + one ring + top cap.
        assert_eq!(mesh.vertex_count(), 20);
        assert!(mesh.positions.iter().all(|p| p.y == 0.0 || p.y == 5.0));
        assert_eq!(tower.specs().len(), 1);
    }

    #[test]
    fn random_tower_has_expected_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut buf = GeometryBuffer::new();
            build_random_tower(&mut buf, &TowerConfig::default(), &mut rng).unwrap();
            let rings = (buf.vertex_count() - 16) / 4;
            assert!((5..=9).contains(&rings), "{} segments", rings);
            assert_eq!(buf.index_count(), (rings + 2) * 24);
            let n = buf.vertex_count() as u32;
            assert!(buf.indices().iter().all(|&i| i < n));
            // Top cap collapses to the axis.
            let top = buf.last_ring().unwrap();
            assert!(top.iter().all(|p| p.x == 0.0 && p.z == 0.0));
        }
    }

    #[test]
    fn random_tower_rises_monotonically() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut buf = GeometryBuffer::new();
        build_random_tower(&mut buf, &TowerConfig::default(), &mut rng).unwrap();
        let ring_heights: Vec<f32> = buf.positions()[8..buf.vertex_count() - 8]
            .chunks_exact(4)
            .map(|r| r[0].y)
            .collect();
        assert!(ring_heights.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn generator_same_seed_same_tower_and_one_material_lookup() {
        let materials = palette();
        let a = TowerGenerator::new(TowerConfig::with_seed(1234)).generate(&materials).unwrap();
        assert_eq!(materials.calls.get(), 1);
        let b = TowerGenerator::new(TowerConfig::with_seed(1234)).generate(&materials).unwrap();
        assert_eq!(materials.calls.get(), 2);
        assert_eq!(a.mesh, b.mesh);
        assert_eq!(a.material_selector, b.material_selector);
        assert!(a.material_selector < 6);
        assert_eq!(a.material, a.material_selector);
        assert_eq!(a.mesh.submesh_count, TOWER_SUBMESH_COUNT);
    }

    #[test]
    fn spec_list_parses_from_ron() {
        let text = "[(h: 2.0, width: 4.0, depth: 4.0), (h: 1.0, width: 2.0, depth: 2.0)]";
        let specs: Vec<BuildRectSpec> = ron::from_str(text).unwrap();
        assert_eq!(specs, two_step_specs());
    }
}
