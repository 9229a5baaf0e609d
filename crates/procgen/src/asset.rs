//! Mesh assets loaded from disk (the planet ring).

use std::path::Path;

use engine_core::MeshData;
use glam::Vec3;
use thiserror::Error;

/// Failure loading a mesh asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("could not read mesh: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("mesh has no triangles")]
    Empty,
}

/// Anything that can turn a path into triangle geometry.
pub trait MeshSource {
    fn load(&self, path: &Path) -> Result<MeshData, AssetError>;
}

/// Reads Wavefront OBJ positions and faces. Normals and texture coordinates are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjLoader;

impl MeshSource for ObjLoader {
    fn load(&self, path: &Path) -> Result<MeshData, AssetError> {
        let text = std::fs::read_to_string(path)?;
        parse_obj(&text)
    }
}

/// Parse OBJ text. Polygons are fan-triangulated; `v/vt/vn` and negative indices are accepted.
pub fn parse_obj(text: &str) -> Result<MeshData, AssetError> {
    let mut positions = Vec::new();
    let mut triangles = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0f32; 3];
                for c in coords.iter_mut() {
                    let token = tokens.next().ok_or_else(|| AssetError::Parse {
                        line,
                        message: "vertex needs three coordinates".to_string(),
                    })?;
                    *c = token.parse().map_err(|_| AssetError::Parse {
                        line,
                        message: format!("bad coordinate `{}`", token),
                    })?;
                }
                positions.push(Vec3::from_array(coords));
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| resolve_index(t, positions.len(), line))
                    .collect::<Result<Vec<u32>, _>>()?;
                if corners.len() < 3 {
                    return Err(AssetError::Parse {
                        line,
                        message: "face needs at least three corners".to_string(),
                    });
                }
                for k in 1..corners.len() - 1 {
                    triangles.push([corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }

    if triangles.is_empty() {
        return Err(AssetError::Empty);
    }
    Ok(MeshData::new(positions, triangles))
}

fn resolve_index(token: &str, vertex_count: usize, line: usize) -> Result<u32, AssetError> {
    let head = token.split('/').next().unwrap_or("");
    let raw: i64 = head.parse().map_err(|_| AssetError::Parse {
        line,
        message: format!("bad face index `{}`", token),
    })?;
    let index = if raw < 0 { vertex_count as i64 + raw } else { raw - 1 };
    if index < 0 || index >= vertex_count as i64 {
        return Err(AssetError::Parse {
            line,
            message: format!("face index {} out of range", raw),
        });
    }
    Ok(index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
# flat square
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vn 0 1 0
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn quad_face_is_fan_triangulated() {
        let mesh = parse_obj(SQUARE).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn negative_indices_count_from_end() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn out_of_range_face_is_rejected() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 2, .. }));
    }

    #[test]
    fn mesh_without_faces_is_empty() {
        assert!(matches!(parse_obj("v 0 0 0\n"), Err(AssetError::Empty)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("procgen-missing-ring.obj");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(ObjLoader.load(&path), Err(AssetError::Io(_))));
    }
}
