//! Wavefront OBJ output. This is the host's mesh consumer: the generators never touch disk.

use anyhow::Context;
use engine_core::Transform;
use procgen::{MeshConsumer, MeshData};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Accumulates one or more meshes into OBJ text. Face indices are 1-based and offset by
/// the vertices already written.
#[derive(Debug, Default)]
pub struct ObjWriter {
    text: String,
    vertices_written: u32,
    objects: u32,
}

impl ObjWriter {
    pub fn new() -> Self {
        let mut w = Self::default();
        w.text.push_str("# skyline procedural buildings\n");
        w
    }

    pub fn object_count(&self) -> u32 {
        self.objects
    }

    /// Append `mesh` as a named object, baked through `transform`.
    pub fn write_mesh(
        &mut self,
        name: &str,
        mesh: &MeshData,
        transform: &Transform,
        material: Option<&str>,
    ) {
        self.objects += 1;
        let _ = writeln!(self.text, "o {}", name);
        let _ = writeln!(self.text, "# submeshes {}", mesh.submesh_count);
        if let Some(material) = material {
            let _ = writeln!(self.text, "usemtl {}", material);
        }
        for p in &mesh.positions {
            let w = transform.transform_point(*p);
            let _ = writeln!(self.text, "v {} {} {}", w.x, w.y, w.z);
        }
        let base = self.vertices_written + 1;
        for tri in mesh.indices.chunks_exact(3) {
            let _ = writeln!(self.text, "f {} {} {}", tri[0] + base, tri[1] + base, tri[2] + base);
        }
        self.vertices_written += mesh.positions.len() as u32;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
        }
        std::fs::write(path, self.as_str()).with_context(|| format!("writing {:?}", path))
    }
}

/// Collects consumed meshes into one OBJ file. Each mesh becomes an object stamped with
/// the current name, transform and material; `finish` writes the file.
#[derive(Debug)]
pub struct ObjExporter {
    path: PathBuf,
    writer: ObjWriter,
    name: String,
    transform: Transform,
    material: Option<String>,
}

impl ObjExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("building")
            .to_string();
        Self {
            path,
            writer: ObjWriter::new(),
            name,
            transform: Transform::default(),
            material: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Stamp for the meshes consumed after this call.
    pub fn set_object(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        material: Option<&str>,
    ) {
        self.name = name.into();
        self.transform = transform;
        self.material = material.map(str::to_string);
    }

    pub fn object_count(&self) -> u32 {
        self.writer.object_count()
    }

    pub fn finish(self) -> anyhow::Result<()> {
        self.writer.save(&self.path)?;
        log::info!("Wrote {:?}: {} objects", self.path, self.writer.object_count());
        Ok(())
    }
}

impl MeshConsumer for ObjExporter {
    fn consume(&mut self, mesh: &MeshData) -> anyhow::Result<()> {
        self.writer.write_mesh(&self.name, mesh, &self.transform, self.material.as_deref());
        log::debug!(
            "Consumed {}: {} vertices, {} triangles",
            self.name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Vec3;
    use procgen::{BuildRectSpec, SegmentedTower};

    fn unit_tri() -> MeshData {
        MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            indices: vec![0, 1, 2],
            submesh_count: 1,
        }
    }

    #[test]
    fn faces_are_one_based_and_offset_per_object() {
        let mut w = ObjWriter::new();
        w.write_mesh("a", &unit_tri(), &Transform::default(), None);
        let shifted = Transform::from_grid_offset(Vec3::ZERO, 10, 0);
        w.write_mesh("b", &unit_tri(), &shifted, Some("MAT_BUILD_TRIM_2"));
        let faces: Vec<&str> = w.as_str().lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces, vec!["f 1 2 3", "f 4 5 6"]);
        assert!(w.as_str().contains("usemtl MAT_BUILD_TRIM_2"));
        assert!(w.as_str().contains("v 11 0 0"));
        assert_eq!(w.object_count(), 2);
    }

    #[test]
    fn exporter_writes_consumed_mesh() {
        let tower = SegmentedTower::new(vec![BuildRectSpec::new(2.0, 4.0, 4.0)]).unwrap();
        let path = std::env::temp_dir()
            .join(format!("skyline-obj-{}", std::process::id()))
            .join("segmented.obj");
        let mut exporter = ObjExporter::new(&path);
        let mesh = tower.mesh();
        exporter.consume(&mesh).unwrap();
        exporter.finish().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), mesh.vertex_count());
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), mesh.triangle_count());
        assert!(text.contains("o segmented"));
        assert!(text.contains("# submeshes 3"));
    }

    #[test]
    fn exporter_stamps_each_consumed_object() {
        let path = std::env::temp_dir()
            .join(format!("skyline-field-{}", std::process::id()))
            .join("towers.obj");
        let mut exporter = ObjExporter::new(&path);
        exporter.set_object("tower_0_0", Transform::default(), Some("MAT_BUILD_TRIM_1"));
        exporter.consume(&unit_tri()).unwrap();
        let shifted = Transform::from_grid_offset(Vec3::ZERO, 0, 10);
        exporter.set_object("tower_0_10", shifted, None);
        exporter.consume(&unit_tri()).unwrap();
        assert_eq!(exporter.object_count(), 2);
        exporter.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        assert!(text.contains("o tower_0_0\n# submeshes 1\nusemtl MAT_BUILD_TRIM_1"));
        assert!(text.contains("o tower_0_10"));
        assert!(text.contains("v 0 0 11"));
        assert_eq!(text.matches("usemtl").count(), 1);
        let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces, vec!["f 1 2 3", "f 4 5 6"]);
    }
}
