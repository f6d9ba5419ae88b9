//! Island fingerprints and the similarity index.
//!
//! The similarity index packs topology counts, 3D area and UV perimeter into
//! one `f64`:
//!
//! ```text
//! sim_index = (verts + edges + faces) + 0.<digits of (area + perimeter)> [+ diagonals]
//! ```
//!
//! The fractional part is built from the decimal digits of the rounded
//! `area + perimeter` sum, which makes it a hash of the two values rather than
//! a metric. Single-quad islands add the rounded sum of their two 3D
//! diagonals so that rectangles of equal area and perimeter but different
//! proportions still differ.
//!
//! [`SimilarityKey`] exposes the same inputs as a tuple for callers that want
//! per-field tolerances instead of the packed index.

use std::collections::HashSet;

use crate::mesh::{EdgeId, FaceId, LoopId, UvMesh, VertexId};

use super::detect::uv_connected;

/// Round to three decimals.
#[inline]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Reinterpret the decimal digits of `value` as a fraction: `15.579 -> 0.15579`.
pub fn digit_fraction(value: f64) -> f64 {
    let digits: String = value
        .to_string()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    format!("0.{}", digits).parse().unwrap_or(0.0)
}

/// Relative difference test used for grouping.
///
/// `|a - b|` is divided by the mean magnitude; when both are zero the raw
/// difference (zero) is used.
pub fn is_similar(a: f64, b: f64, threshold: f64) -> bool {
    let diff = (a - b).abs();
    let avg = (a.abs() + b.abs()) / 2.0;
    let relative = if avg > 0.0 { diff / avg } else { diff };
    relative <= threshold
}

/// Shape summary of one island.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    /// Distinct vertices used by the island.
    pub vert_count: usize,
    /// Distinct edges used by the island.
    pub edge_count: usize,
    /// Number of faces.
    pub face_count: usize,
    /// Summed 3D face area, rounded to 3 decimals.
    pub mesh_area: f64,
    /// Summed UV length of the island border, rounded to 3 decimals.
    pub perimeter: f64,
    /// Rounded sum of the 3D diagonals for single-quad islands.
    pub diagonals: Option<f64>,
    /// Packed similarity index.
    pub sim_index: f64,
}

impl Fingerprint {
    /// Fingerprint of `faces`. Faces that do not resolve in `mesh` are skipped.
    pub fn compute(mesh: &UvMesh, faces: &[FaceId]) -> Self {
        let faces: Vec<FaceId> = faces
            .iter()
            .copied()
            .filter(|&f| mesh.try_face(f).is_some())
            .collect();

        let verts: HashSet<VertexId> = faces.iter().flat_map(|&f| mesh.face_vertices(f)).collect();
        let edges: HashSet<EdgeId> = faces.iter().flat_map(|&f| mesh.face_edges(f)).collect();

        let mesh_area = round3(faces.iter().map(|&f| mesh.face_area(f)).sum());
        let perimeter = round3(border_length(mesh, &faces));

        let diagonals = match faces.as_slice() {
            [f] => mesh.quad_diagonals(*f).map(|(d0, d1)| round3(d0 + d1)),
            _ => None,
        };

        let geometry = (verts.len() + edges.len() + faces.len()) as f64;
        let mut fraction = digit_fraction(mesh_area + perimeter);
        if let Some(d) = diagonals {
            fraction += d;
        }

        Self {
            vert_count: verts.len(),
            edge_count: edges.len(),
            face_count: faces.len(),
            mesh_area,
            perimeter,
            diagonals,
            sim_index: geometry + fraction,
        }
    }

    /// The unpacked comparison key.
    pub fn key(&self) -> SimilarityKey {
        SimilarityKey {
            vert_count: self.vert_count,
            edge_count: self.edge_count,
            face_count: self.face_count,
            mesh_area: self.mesh_area,
            perimeter: self.perimeter,
            diagonals: self.diagonals.unwrap_or(0.0),
        }
    }
}

/// Tuple form of a fingerprint, compared field by field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityKey {
    /// Distinct vertices.
    pub vert_count: usize,
    /// Distinct edges.
    pub edge_count: usize,
    /// Faces.
    pub face_count: usize,
    /// Rounded 3D area.
    pub mesh_area: f64,
    /// Rounded UV perimeter.
    pub perimeter: f64,
    /// Rounded quad diagonal sum, 0 for other islands.
    pub diagonals: f64,
}

impl SimilarityKey {
    /// Counts must match exactly; each float field must pass [`is_similar`]
    /// with `tolerance`.
    pub fn is_similar(&self, other: &Self, tolerance: f64) -> bool {
        self.vert_count == other.vert_count
            && self.edge_count == other.edge_count
            && self.face_count == other.face_count
            && is_similar(self.mesh_area, other.mesh_area, tolerance)
            && is_similar(self.perimeter, other.perimeter, tolerance)
            && is_similar(self.diagonals, other.diagonals, tolerance)
    }
}

/// Summed UV length of every corner edge on the island border.
///
/// A corner edge is on the border when no other island face shares the mesh
/// edge with matching UVs.
fn border_length(mesh: &UvMesh, faces: &[FaceId]) -> f64 {
    let members: HashSet<FaceId> = faces.iter().copied().collect();
    let mut total = 0.0;
    for &f in faces {
        for l in mesh.face_loops(f) {
            if is_border(mesh, &members, f, l) {
                total += (mesh.uv(mesh.loop_next(l)) - mesh.uv(l)).norm();
            }
        }
    }
    total
}

fn is_border(mesh: &UvMesh, members: &HashSet<FaceId>, f: FaceId, l: LoopId) -> bool {
    let e = mesh.loop_at(l).edge;
    !mesh.edge_faces(e).iter().any(|&g| {
        g != f
            && members.contains(&g)
            && mesh
                .face_loop_on_edge(g, e)
                .is_some_and(|m| uv_connected(mesh, l, m))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use nalgebra::{Point2, Point3};

    fn rect(w: f64, h: f64, uv_scale: f64) -> UvMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(w, 0.0, 0.0),
            Point3::new(w, h, 0.0),
            Point3::new(0.0, h, 0.0),
        ];
        let uvs = vec![vec![
            Point2::new(0.0, 0.0),
            Point2::new(w * uv_scale, 0.0),
            Point2::new(w * uv_scale, h * uv_scale),
            Point2::new(0.0, h * uv_scale),
        ]];
        build_from_polygons("rect", &positions, &[vec![0, 1, 2, 3]], Some(&uvs)).unwrap()
    }

    #[test]
    fn test_digit_fraction() {
        assert!((digit_fraction(15.579) - 0.15579).abs() < 1e-12);
        assert!((digit_fraction(5.0) - 0.5).abs() < 1e-12);
        assert_eq!(digit_fraction(0.0), 0.0);
    }

    #[test]
    fn test_is_similar_relative() {
        assert!(is_similar(10.0, 10.5, 0.1));
        assert!(!is_similar(10.0, 12.0, 0.1));
        assert!(is_similar(0.0, 0.0, 0.0));
        assert!(is_similar(3.25, 3.25, 0.0));
        assert!(!is_similar(3.25, 3.2500001, 0.0));
    }

    #[test]
    fn test_unit_quad_fingerprint() {
        let mesh = rect(1.0, 1.0, 1.0);
        let fp = Fingerprint::compute(&mesh, &[FaceId::new(0)]);
        assert_eq!(fp.vert_count, 4);
        assert_eq!(fp.edge_count, 4);
        assert_eq!(fp.face_count, 1);
        assert_eq!(fp.mesh_area, 1.0);
        assert_eq!(fp.perimeter, 4.0);
        assert_eq!(fp.diagonals, Some(2.828));
        // 9 + 0.5 (from "5") + 2.828
        assert!((fp.sim_index - 12.328).abs() < 1e-9);
    }

    #[test]
    fn test_uv_scale_changes_index() {
        let a = Fingerprint::compute(&rect(1.0, 1.0, 1.0), &[FaceId::new(0)]);
        let b = Fingerprint::compute(&rect(1.0, 1.0, 0.5), &[FaceId::new(0)]);
        assert_eq!(a.mesh_area, b.mesh_area);
        assert_ne!(a.sim_index, b.sim_index);
    }

    #[test]
    fn test_diagonals_disambiguate_quads() {
        let a = Fingerprint::compute(&rect(2.0, 1.0, 1.0), &[FaceId::new(0)]);
        let b = Fingerprint::compute(&rect(1.0, 2.0, 1.0), &[FaceId::new(0)]);
        assert_eq!(a.sim_index, b.sim_index);

        let c = Fingerprint::compute(&rect(4.0, 0.5, 1.0), &[FaceId::new(0)]);
        assert_eq!(c.mesh_area, a.mesh_area);
        assert_ne!(c.sim_index, a.sim_index);
    }

    #[test]
    fn test_empty_and_stale_faces() {
        let mesh = rect(1.0, 1.0, 1.0);
        let empty = Fingerprint::compute(&mesh, &[]);
        assert_eq!(empty.sim_index, 0.0);

        let stale = Fingerprint::compute(&mesh, &[FaceId::new(0), FaceId::new(9)]);
        assert_eq!(stale.face_count, 1);
    }

    #[test]
    fn test_key_tolerance() {
        let a = Fingerprint::compute(&rect(1.0, 1.0, 1.0), &[FaceId::new(0)]).key();
        let b = Fingerprint::compute(&rect(1.0, 1.0, 1.02), &[FaceId::new(0)]).key();
        assert!(a.is_similar(&b, 0.05));
        assert!(!a.is_similar(&b, 0.0));
    }
}
