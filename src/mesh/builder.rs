//! Mesh construction utilities.
//!
//! This module provides functions for building [`UvMesh`] values from
//! face-vertex lists, as found in mesh file formats.

use std::collections::HashMap;

use nalgebra::{Point2, Point3};

use super::index::{EdgeId, FaceId, VertexId};
use super::uvmesh::{Edge, Face, Loop, UvMesh, Vertex};
use crate::error::{Result, UvError};

/// Build a mesh from vertex positions and polygon faces.
///
/// # Arguments
/// * `name` - Object name of the mesh
/// * `positions` - List of vertex positions
/// * `faces` - List of polygons, each as a list of at least three vertex indices
/// * `uvs` - Optional per-face UV coordinates, one per corner
///
/// Without `uvs` every corner starts at the UV origin and the mesh reports
/// `has_uvs() == false`.
///
/// # Example
/// ```
/// use trimstack::mesh::build_from_polygons;
/// use nalgebra::{Point2, Point3};
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let uvs = vec![vec![
///     Point2::new(0.0, 0.0),
///     Point2::new(1.0, 0.0),
///     Point2::new(1.0, 1.0),
///     Point2::new(0.0, 1.0),
/// ]];
///
/// let mesh = build_from_polygons("Plane", &positions, &[vec![0, 1, 2, 3]], Some(&uvs)).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_edges(), 4);
/// assert_eq!(mesh.num_loops(), 4);
/// ```
pub fn build_from_polygons(
    name: &str,
    positions: &[Point3<f64>],
    faces: &[Vec<usize>],
    uvs: Option<&[Vec<Point2<f64>>]>,
) -> Result<UvMesh> {
    if faces.is_empty() {
        return Err(UvError::EmptyMesh);
    }

    if let Some(uvs) = uvs {
        if uvs.len() != faces.len() {
            return Err(UvError::invalid_param(
                "uvs",
                uvs.len(),
                "need one UV list per face",
            ));
        }
    }

    // Validate vertex indices
    for (fi, face) in faces.iter().enumerate() {
        if face.len() < 3 {
            return Err(UvError::DegenerateFace { face: fi });
        }
        for (i, &vi) in face.iter().enumerate() {
            if vi >= positions.len() {
                return Err(UvError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if face[..i].contains(&vi) {
                return Err(UvError::DegenerateFace { face: fi });
            }
        }
        if let Some(uvs) = uvs {
            if uvs[fi].len() != face.len() {
                return Err(UvError::UvCountMismatch {
                    face: fi,
                    expected: face.len(),
                    found: uvs[fi].len(),
                });
            }
        }
    }

    let mut mesh = UvMesh::new(name);
    mesh.has_uvs = uvs.is_some();
    mesh.vertices = positions
        .iter()
        .map(|&position| Vertex { position })
        .collect();

    // Undirected edge (min, max) -> edge ID
    let mut edge_map: HashMap<(usize, usize), EdgeId> = HashMap::new();

    for (fi, face) in faces.iter().enumerate() {
        let face_id = FaceId::new(fi);
        let first_loop = mesh.loops.len();
        let n = face.len();

        for (i, &v0) in face.iter().enumerate() {
            let v1 = face[(i + 1) % n];
            let key = (v0.min(v1), v0.max(v1));
            let edge_id = *edge_map.entry(key).or_insert_with(|| {
                mesh.edges.push(Edge {
                    vertices: [VertexId::new(v0), VertexId::new(v1)],
                    seam: false,
                    faces: Vec::new(),
                });
                EdgeId::new(mesh.edges.len() - 1)
            });
            mesh.edges[edge_id.index()].faces.push(face_id);

            let uv = uvs.map(|uvs| uvs[fi][i]).unwrap_or_else(Point2::origin);
            mesh.loops.push(Loop {
                vertex: VertexId::new(v0),
                edge: edge_id,
                face: face_id,
                uv,
                uv_select: false,
            });
        }

        mesh.faces.push(Face {
            first_loop,
            len: n,
            select: false,
            hidden: false,
        });
    }

    Ok(mesh)
}

/// Convert a mesh back to face-vertex lists and per-face UVs.
///
/// This is the inverse of [`build_from_polygons`].
pub fn to_polygons(mesh: &UvMesh) -> (Vec<Point3<f64>>, Vec<Vec<usize>>, Vec<Vec<Point2<f64>>>) {
    let positions = mesh.vertices.iter().map(|v| v.position).collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();
    let uvs = mesh
        .face_ids()
        .map(|f| mesh.face_loops(f).map(|l| mesh.uv(l)).collect())
        .collect();
    (positions, faces, uvs)
}
