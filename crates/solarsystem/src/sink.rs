//! Mesh consumers for the headless driver.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use engine_core::{MeshData, MeshSink};

/// Logs each mesh's size at debug level and keeps running totals.
#[derive(Debug, Default)]
pub struct LogSink {
    pub meshes: usize,
    pub triangles: usize,
}

impl MeshSink for LogSink {
    fn submit(&mut self, label: &str, mesh: &MeshData) -> Result<()> {
        log::debug!(
            "{}: {} vertices, {} triangles",
            label,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        self.meshes += 1;
        self.triangles += mesh.triangle_count();
        Ok(())
    }
}

/// Writes each mesh to `<dir>/<label>.obj`, colours appended to the `v` records.
#[derive(Debug)]
pub struct ObjExportSink {
    dir: PathBuf,
    pub written: Vec<PathBuf>,
}

impl ObjExportSink {
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).with_context(|| format!("creating export directory {:?}", dir))?;
        Ok(Self {
            dir,
            written: Vec::new(),
        })
    }
}

impl MeshSink for ObjExportSink {
    fn submit(&mut self, label: &str, mesh: &MeshData) -> Result<()> {
        if mesh.is_empty() {
            log::debug!("Skipping empty mesh {}", label);
            return Ok(());
        }
        ensure!(mesh.indices_in_bounds(), "mesh {} has a triangle index past its vertices", label);
        let path = self.dir.join(format!("{}.obj", file_stem(label)));
        std::fs::write(&path, to_obj(label, mesh)).with_context(|| format!("writing {:?}", path))?;
        log::info!("Exported {} to {:?}", label, path);
        self.written.push(path);
        Ok(())
    }
}

/// OBJ text for `mesh`. Indices are 1-based.
pub fn to_obj(label: &str, mesh: &MeshData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "o {}", label);
    for (i, p) in mesh.positions.iter().enumerate() {
        match mesh.colors.get(i) {
            Some(c) => {
                let _ = writeln!(out, "v {} {} {} {} {} {}", p.x, p.y, p.z, c.x, c.y, c.z);
            }
            None => {
                let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
            }
        }
    }
    for [a, b, c] in &mesh.triangles {
        let _ = writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1);
    }
    out
}

fn file_stem(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use procgen::{parse_obj, IcoSphere};

    fn triangle() -> MeshData {
        MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]])
    }

    #[test]
    fn exported_obj_reads_back() {
        let mesh = IcoSphere::new(1).to_mesh();
        let back = parse_obj(&to_obj("sphere", &mesh)).unwrap();
        assert_eq!(back.triangles, mesh.triangles);
        assert_eq!(back.vertex_count(), mesh.vertex_count());
    }

    #[test]
    fn colours_follow_positions() {
        let mesh = triangle().with_colors(vec![Vec3::X; 3]);
        let text = to_obj("t", &mesh);
        assert!(text.contains("v 1 0 0 1 0 0"));
        assert!(text.contains("f 1 2 3"));
    }

    #[test]
    fn labels_become_safe_file_names() {
        assert_eq!(file_stem("Sola IV/moon"), "sola_iv_moon");
    }

    #[test]
    fn log_sink_totals() {
        let mut sink = LogSink::default();
        sink.submit("a", &triangle()).unwrap();
        sink.submit("b", &triangle()).unwrap();
        assert_eq!(sink.meshes, 2);
        assert_eq!(sink.triangles, 2);
    }

    #[test]
    fn export_sink_writes_one_file_per_mesh() {
        let dir = std::env::temp_dir().join(format!("solarsystem-export-{}", std::process::id()));
        let mut sink = ObjExportSink::create(&dir).unwrap();
        sink.submit("Sun", &triangle()).unwrap();
        assert_eq!(sink.written, vec![dir.join("sun.obj")]);
        assert!(std::fs::read_to_string(dir.join("sun.obj")).unwrap().starts_with("o Sun"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn export_sink_rejects_bad_indices_and_skips_empty() {
        let dir = std::env::temp_dir().join(format!("solarsystem-export-bad-{}", std::process::id()));
        let mut sink = ObjExportSink::create(&dir).unwrap();
        let mut broken = triangle();
        broken.triangles.push([0, 1, 7]);
        assert!(sink.submit("broken", &broken).is_err());
        sink.submit("nothing", &MeshData::default()).unwrap();
        assert!(sink.written.is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
