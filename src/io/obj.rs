//! Wavefront OBJ format support.
//!
//! Loading goes through `tobj` without triangulation, so quads and n-gons
//! survive as polygons. Texture coordinates (`vt`) become per-corner UVs;
//! normals are ignored. Every `o`/`g` block of a file is merged into one
//! mesh named after the first object.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point2, Point3};

use crate::error::{Result, UvError};
use crate::mesh::{build_from_polygons, to_polygons, UvMesh};

/// Name tobj gives to geometry before any `o` statement.
const UNNAMED_OBJECT: &str = "unnamed_object";

/// Load a mesh from an OBJ file.
///
/// The mesh is named after the first `o` statement, or the file stem when
/// there is none. A file without texture coordinates loads with
/// [`UvMesh::has_uvs`] false.
///
/// # Example
///
/// ```no_run
/// use trimstack::io::obj;
///
/// let mesh = obj::load("crate.obj").unwrap();
/// println!("{} faces", mesh.num_faces());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<UvMesh> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    };
    let (models, _) = tobj::load_obj(path, &options).map_err(|e| UvError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();
    let mut uvs: Vec<Vec<Point2<f64>>> = Vec::new();
    let mut has_uvs = true;

    for model in &models {
        let mesh = &model.mesh;
        let offset = positions.len();
        positions.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Point3::new(p[0], p[1], p[2])),
        );

        let textured = !mesh.texcoord_indices.is_empty();
        has_uvs &= textured;

        // An empty arity list means every face is a triangle.
        let arities: Vec<usize> = if mesh.face_arities.is_empty() {
            vec![3; mesh.indices.len() / 3]
        } else {
            mesh.face_arities.iter().map(|&n| n as usize).collect()
        };

        let mut start = 0;
        for n in arities {
            let corners = start..start + n;
            faces.push(
                mesh.indices[corners.clone()]
                    .iter()
                    .map(|&i| offset + i as usize)
                    .collect(),
            );
            if textured {
                let face_uvs = mesh.texcoord_indices[corners]
                    .iter()
                    .map(|&t| {
                        let t = t as usize * 2;
                        Point2::new(mesh.texcoords[t], mesh.texcoords[t + 1])
                    })
                    .collect();
                uvs.push(face_uvs);
            }
            start += n;
        }
    }

    if faces.is_empty() {
        return Err(UvError::LoadError {
            path: path.to_path_buf(),
            message: "OBJ file contains no faces".to_string(),
        });
    }

    let name = models
        .iter()
        .map(|m| m.name.as_str())
        .find(|n| !n.is_empty() && *n != UNNAMED_OBJECT)
        .map(str::to_string)
        .or_else(|| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| "Mesh".to_string());

    let uvs = if has_uvs { Some(uvs.as_slice()) } else { None };
    let mesh = build_from_polygons(&name, &positions, &faces, uvs)?;
    log::debug!(
        "loaded '{}' from {}: {} faces, uvs: {}",
        name,
        path.display(),
        mesh.num_faces(),
        mesh.has_uvs()
    );
    Ok(mesh)
}

/// Save a mesh to an OBJ file.
///
/// Writes one `vt` per face corner; meshes without UVs are written with
/// plain `f v` faces.
///
/// # Example
///
/// ```no_run
/// use trimstack::io::obj;
///
/// let mesh = obj::load("crate.obj").unwrap();
/// obj::save(&mesh, "crate_stacked.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &UvMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (positions, faces, uvs) = to_polygons(mesh);

    writeln!(writer, "# Generated by trimstack")?;
    writeln!(writer, "o {}", mesh.name())?;
    for p in &positions {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }

    if mesh.has_uvs() {
        for uv in uvs.iter().flatten() {
            writeln!(writer, "vt {} {}", uv.x, uv.y)?;
        }
        let mut vt = 1;
        for face in &faces {
            write!(writer, "f")?;
            for &v in face {
                write!(writer, " {}/{}", v + 1, vt)?;
                vt += 1;
            }
            writeln!(writer)?;
        }
    } else {
        for face in &faces {
            write!(writer, "f")?;
            for &v in face {
                write!(writer, " {}", v + 1)?;
            }
            writeln!(writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}
