//! Skyline - procedural tower and building-cluster generator.
//!
//! Generates three outputs into the configured directory:
//! - `cluster.obj`: one packed multi-building cluster
//! - `towers.obj`: a field of randomized towers, one per placement-grid cell
//! - `segmented.obj`: a tower built from an authored spec list

mod config;
mod materials;
mod obj_export;
mod placer;

use anyhow::Result;
use config::SkylineConfig;
use engine_core::{BuildingInstance, BuildingKind, GridCell, Transform, Vec3, World};
use materials::MaterialPalette;
use obj_export::ObjExporter;
use placer::EcsPlacer;
use procgen::{populate_grid, MeshConsumer, MultiBuilding, SegmentedTower};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SkylineConfig::load();
    log::info!("Starting Skyline (seed {})", config.seed);

    let mut world = World::new();
    let materials = MaterialPalette::default();

    // Packed cluster
    let cluster = MultiBuilding::new(config.seed, config.pack_config()).generate()?;
    let mut cluster_out = ObjExporter::new(config.output_dir.join("cluster.obj"));
    cluster_out.consume(&cluster.mesh)?;
    cluster_out.finish()?;
    world.spawn((
        Transform::default(),
        BuildingInstance {
            kind: BuildingKind::Cluster,
            ..Default::default()
        },
    ));

    // Tower field
    let tower_meshes = {
        let mut placer = EcsPlacer::new(&mut world, &materials, Vec3::ZERO, config.seed);
        populate_grid(config.placer_rows, config.placer_cols, config.placer_spacing, &mut placer)?;
        placer.into_meshes()
    };
    let mut towers = ObjExporter::new(config.output_dir.join("towers.obj"));
    for (_, (transform, cell, instance)) in world
        .query::<(&Transform, &GridCell, &BuildingInstance)>()
        .iter()
    {
        let Some(mesh) = tower_meshes.get(instance.mesh_id as usize) else {
            continue;
        };
        let material = instance.material.and_then(|m| materials.name(m));
        towers.set_object(format!("tower_{}_{}", cell.x, cell.y), *transform, material);
        towers.consume(mesh)?;
    }
    log::info!("Exporting {} towers", towers.object_count());
    towers.finish()?;

    // Authored tower
    let mut segmented = SegmentedTower::default();
    segmented.set_specs(config.tower_specs()?)?;
    let mesh = segmented.mesh();
    let segmented_at = Transform::from_grid_offset(Vec3::ZERO, -config.placer_spacing, 0);
    let mut segmented_out =
        ObjExporter::new(config.output_dir.join("segmented.obj")).with_transform(segmented_at);
    segmented_out.consume(&mesh)?;
    segmented_out.finish()?;
    world.spawn((
        segmented_at,
        BuildingInstance {
            kind: BuildingKind::Segmented,
            ..Default::default()
        },
    ));

    log::info!(
        "Done: cluster of {} buildings ({} candidates rejected), {} towers, \
         {} authored segments, {} entities",
        cluster.fill.buildings,
        cluster.pack.rejected(),
        tower_meshes.len(),
        segmented.specs().len(),
        world.len()
    );
    Ok(())
}
