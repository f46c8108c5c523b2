//! Cluster meshes: one capped box per packed record, plus a rooftop greeble on every
//! ground-level building.

use glam::Vec3;
use rand::prelude::*;

use crate::error::GenError;
use crate::geometry::{GeometryBuffer, MeshData};
use crate::occupation::{OccupationGrid, OccupationRecord, PackConfig, PackStats, Packer};

/// Cluster meshes carry a single submesh and no resolved material.
pub const CLUSTER_SUBMESH_COUNT: u32 = 1;

/// Counters for one fill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    pub buildings: u32,
    pub greebles: u32,
    /// Degenerate spans skipped.
    pub skipped: u32,
}

/// Walk the grid x-major and emit every distinct record exactly once.
pub fn fill_from_grid<R: Rng + ?Sized>(
    grid: &OccupationGrid,
    buffer: &mut GeometryBuffer,
    rng: &mut R,
) -> Result<FillStats, GenError> {
    let mut stats = FillStats::default();
    let mut visited = vec![false; grid.record_count()];

    for x in 0..grid.width() as i32 {
        for z in 0..grid.depth() as i32 {
            let Some(id) = grid.get(x, z) else { continue };
            if visited[id.0] {
                continue;
            }
            visited[id.0] = true;
            fill_record(grid.record(id), buffer, rng, &mut stats)?;
        }
    }
    Ok(stats)
}

/// Emit one record as a capped box. Ground-level records also get a greeble on top.
///
/// Degenerate records are counted and skipped. Only buffer sequencing errors propagate.
pub fn fill_record<R: Rng + ?Sized>(
    record: &OccupationRecord,
    buffer: &mut GeometryBuffer,
    rng: &mut R,
    stats: &mut FillStats,
) -> Result<(), GenError> {
    if let Err(e) = emit_box(record, buffer) {
        return skip_degenerate(e, stats);
    }
    stats.buildings += 1;

    if record.h1 == 0.0 {
        let greeble = greeble_for(record, rng);
        match emit_box(&greeble, buffer) {
            Ok(()) => stats.greebles += 1,
            Err(e) => return skip_degenerate(e, stats),
        }
    }
    Ok(())
}

fn skip_degenerate(err: GenError, stats: &mut FillStats) -> Result<(), GenError> {
    match err {
        GenError::DegenerateSpan { .. } => {
            log::trace!("Skipping fill: {}", err);
            stats.skipped += 1;
            Ok(())
        }
        other => Err(other),
    }
}

/// Random box strictly inside `parent`'s footprint, rising 1..2 units off its roof.
fn greeble_for<R: Rng + ?Sized>(parent: &OccupationRecord, rng: &mut R) -> OccupationRecord {
    let p = parent.normalized();
    let (x, xend) = inner_span(p.x, p.xend, rng);
    let (z, zend) = inner_span(p.z, p.zend, rng);
    OccupationRecord::new(x, xend, z, zend, p.h2, p.h2 + rng.gen_range(1.0..2.0))
}

/// Sub-span of `[lo, hi]` that never reaches `hi`. Spans narrower than 2 collapse to
/// `(lo, lo)`, which the fill counts as degenerate.
fn inner_span<R: Rng + ?Sized>(lo: i32, hi: i32, rng: &mut R) -> (i32, i32) {
    if hi - lo < 2 {
        return (lo, lo);
    }
    let start = rng.gen_range(lo..hi - 1);
    let end = rng.gen_range(start + 1..hi);
    (start, end)
}

fn emit_box(record: &OccupationRecord, buffer: &mut GeometryBuffer) -> Result<(), GenError> {
    if record.is_degenerate() {
        return Err(GenError::DegenerateSpan {
            x: record.x,
            xend: record.xend,
            z: record.z,
            zend: record.zend,
        });
    }
    let r = record.normalized();
    let (x, xend) = (r.x as f32, r.xend as f32);
    let (z, zend) = (r.z as f32, r.zend as f32);
    let ring = |h: f32| {
        [
            Vec3::new(xend, h, zend),
            Vec3::new(x, h, zend),
            Vec3::new(x, h, z),
            Vec3::new(xend, h, z),
        ]
    };
    buffer.append_quad_prism(ring(r.h1), ring(r.h2));
    buffer.append_roof()
}

/// A finished building cluster.
#[derive(Debug, Clone)]
pub struct MultiBuildingMesh {
    pub mesh: MeshData,
    pub grid: OccupationGrid,
    pub pack: PackStats,
    pub fill: FillStats,
}

/// Packs a grid and fills it, using its own seeded RNG.
pub struct MultiBuilding {
    rng: StdRng,
    config: PackConfig,
    buffer: GeometryBuffer,
}

impl MultiBuilding {
    pub fn new(seed: u64, config: PackConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            buffer: GeometryBuffer::new(),
        }
    }

    pub fn generate(mut self) -> Result<MultiBuildingMesh, GenError> {
        let (grid, pack) = Packer::pack(self.config.clone(), &mut self.rng);
        let fill = fill_from_grid(&grid, &mut self.buffer, &mut self.rng)?;
        log::info!(
            "Cluster mesh: {} buildings, {} greebles, {} vertices",
            fill.buildings,
            fill.greebles,
            self.buffer.vertex_count()
        );
        Ok(MultiBuildingMesh {
            mesh: self.buffer.finalize(CLUSTER_SUBMESH_COUNT),
            grid,
            pack,
            fill,
        })
    }
}
