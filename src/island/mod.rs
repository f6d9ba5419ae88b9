//! UV islands.
//!
//! An [`Island`] is a *view* over a mesh: the owning object's name plus a
//! sorted list of face indices, with the fingerprint and UV bounds computed
//! when the view was taken. It holds no reference to the mesh. Every
//! operation that reads or writes UVs takes the mesh again and re-resolves
//! the faces, so an island taken before a topology edit degrades gracefully:
//! lookups that no longer resolve are skipped and the island reports infinite
//! distortion.
//!
//! Islands persist across edits only through their [`IslandId`], which is the
//! object name plus the sorted face indices.
//!
//! # Example
//!
//! ```
//! use trimstack::prelude::*;
//! use nalgebra::{Point2, Point3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let uvs = vec![vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(0.0, 1.0),
//! ]];
//! let mesh = build_from_polygons("Plane", &positions, &[vec![0, 1, 2, 3]], Some(&uvs)).unwrap();
//!
//! let islands = Island::collect(&mesh);
//! assert_eq!(islands.len(), 1);
//! assert_eq!(islands[0].fingerprint().face_count, 1);
//! ```

mod detect;
mod fingerprint;

pub use detect::{detect_islands, seam_islands, uv_connected, UV_EPSILON};
pub use fingerprint::{digit_fraction, is_similar, round3, Fingerprint, SimilarityKey};

use std::collections::HashSet;

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::geom::BoundingBox2d;
use crate::mesh::{FaceId, LoopId, UvMesh};

/// Which selection flags count as "selected".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionMode {
    /// Face selection is shared with the 3D view.
    #[default]
    Sync,
    /// Per-corner UV selection.
    UvOnly,
}

/// Stable identity of an island: object name plus sorted face indices.
///
/// Serializes as `{"object_name": ..., "face_indices": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IslandId {
    /// Name of the owning object.
    pub object_name: String,
    /// Face indices in ascending order.
    pub face_indices: Vec<usize>,
}

impl IslandId {
    /// Create an identifier, sorting the face indices.
    pub fn new(object_name: impl Into<String>, faces: impl IntoIterator<Item = usize>) -> Self {
        let mut face_indices: Vec<usize> = faces.into_iter().collect();
        face_indices.sort_unstable();
        Self {
            object_name: object_name.into(),
            face_indices,
        }
    }
}

/// The explicit set of selected islands passed to master selection and the
/// selection-driven operations.
pub type Selection = HashSet<IslandId>;

/// One connected UV region of a mesh.
#[derive(Debug, Clone)]
pub struct Island {
    object_name: String,
    faces: Vec<FaceId>,
    bbox: BoundingBox2d,
    fingerprint: Fingerprint,
}

impl Island {
    /// Build an island over `faces` of `mesh`.
    pub fn from_faces(mesh: &UvMesh, mut faces: Vec<FaceId>) -> Self {
        faces.sort();
        faces.dedup();
        let uvs: Vec<Point2<f64>> = faces
            .iter()
            .filter(|&&f| mesh.try_face(f).is_some())
            .flat_map(|&f| mesh.face_loops(f))
            .map(|l| mesh.uv(l))
            .collect();
        let bbox = if uvs.is_empty() {
            BoundingBox2d::new(0.0, 0.0, 0.0, 0.0)
        } else {
            BoundingBox2d::from_points(uvs)
        };
        let fingerprint = Fingerprint::compute(mesh, &faces);
        Self {
            object_name: mesh.name().to_string(),
            faces,
            bbox,
            fingerprint,
        }
    }

    /// All islands of the visible faces of `mesh`.
    pub fn collect(mesh: &UvMesh) -> Vec<Island> {
        detect_islands(mesh, |_| true)
            .into_iter()
            .map(|faces| Island::from_faces(mesh, faces))
            .collect()
    }

    /// Islands made of the selected faces of `mesh`.
    pub fn collect_selected(mesh: &UvMesh, mode: SelectionMode) -> Vec<Island> {
        detect_islands(mesh, |f| face_selected(mesh, f, mode))
            .into_iter()
            .map(|faces| Island::from_faces(mesh, faces))
            .collect()
    }

    // ==================== Accessors ====================

    /// Name of the owning object.
    #[inline]
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// Faces of the island in ascending order.
    #[inline]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    /// UV bounds at the time the island was built.
    #[inline]
    pub fn bbox(&self) -> &BoundingBox2d {
        &self.bbox
    }

    /// UV bounds center.
    #[inline]
    pub fn center(&self) -> Point2<f64> {
        self.bbox.center()
    }

    /// UV bounds size.
    #[inline]
    pub fn size(&self) -> Vector2<f64> {
        self.bbox.size()
    }

    /// Shape fingerprint.
    #[inline]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Packed similarity index.
    #[inline]
    pub fn sim_index(&self) -> f64 {
        self.fingerprint.sim_index
    }

    /// Stable identifier.
    pub fn id(&self) -> IslandId {
        IslandId::new(
            self.object_name.clone(),
            self.faces.iter().map(|f| f.index()),
        )
    }

    /// Relative similarity-index comparison.
    pub fn is_similar(&self, other: &Island, threshold: f64) -> bool {
        is_similar(self.sim_index(), other.sim_index(), threshold)
    }

    // ==================== Mesh Queries ====================

    /// The same faces re-read from the current state of `mesh`, or `None`
    /// if the island is stale.
    pub fn refreshed(&self, mesh: &UvMesh) -> Option<Island> {
        self.resolves(mesh)
            .then(|| Island::from_faces(mesh, self.faces.clone()))
    }

    /// Whether every face still resolves in `mesh`.
    pub fn resolves(&self, mesh: &UvMesh) -> bool {
        mesh.name() == self.object_name && self.faces.iter().all(|&f| mesh.try_face(f).is_some())
    }

    /// Corners of the island in face order, or `None` if the island is stale.
    pub fn loops(&self, mesh: &UvMesh) -> Option<Vec<LoopId>> {
        if !self.resolves(mesh) {
            return None;
        }
        Some(self.faces.iter().flat_map(|&f| mesh.face_loops(f)).collect())
    }

    /// Current UVs of the island's corners, or `None` if the island is stale.
    pub fn uvs(&self, mesh: &UvMesh) -> Option<Vec<Point2<f64>>> {
        self.loops(mesh)
            .map(|loops| loops.into_iter().map(|l| mesh.uv(l)).collect())
    }

    /// Angular UV distortion plus a small penalty for distance from the UV origin.
    ///
    /// Sums `|3D corner angle - UV corner angle|` over all corners and adds
    /// `0.1 * |center|`. Stale islands report `f64::INFINITY`.
    pub fn distortion(&self, mesh: &UvMesh) -> f64 {
        let Some(loops) = self.loops(mesh) else {
            log::warn!(
                "island {:?} of {} no longer resolves",
                self.faces.first(),
                self.object_name
            );
            return f64::INFINITY;
        };
        let angular: f64 = loops
            .iter()
            .map(|&l| (mesh.loop_angle(l) - mesh.loop_uv_angle(l)).abs())
            .sum();
        let center = if loops.is_empty() {
            self.center()
        } else {
            BoundingBox2d::from_points(loops.iter().map(|&l| mesh.uv(l))).center()
        };
        angular + center.coords.norm() * 0.1
    }

    /// Angle of the longest UV edge, in radians. Stale islands report 0.
    pub fn edge_orientation(&self, mesh: &UvMesh) -> f64 {
        self.loops(mesh)
            .map(|loops| longest_edge_angle(mesh, &loops))
            .unwrap_or(0.0)
    }

    /// Current UV area (shoelace), 0 for stale islands.
    pub fn uv_area(&self, mesh: &UvMesh) -> f64 {
        if !self.resolves(mesh) {
            return 0.0;
        }
        self.faces.iter().map(|&f| mesh.face_uv_area(f)).sum()
    }

    /// Summed 3D face area of the resolvable faces.
    pub fn mesh_area(&self, mesh: &UvMesh) -> f64 {
        self.faces
            .iter()
            .filter(|&&f| mesh.try_face(f).is_some())
            .map(|&f| mesh.face_area(f))
            .sum()
    }

    /// Whether any part of the island is selected in `mesh`.
    pub fn is_selected(&self, mesh: &UvMesh, mode: SelectionMode) -> bool {
        self.resolves(mesh) && self.faces.iter().any(|&f| face_selected(mesh, f, mode))
    }

    // ==================== Mutation ====================

    /// Select or deselect the whole island. Stale islands are left alone.
    pub fn set_selected(&self, mesh: &mut UvMesh, mode: SelectionMode, state: bool) {
        if !self.resolves(mesh) {
            return;
        }
        for &f in &self.faces {
            match mode {
                SelectionMode::Sync => mesh.set_face_select(f, state),
                SelectionMode::UvOnly => mesh.set_face_uv_select(f, state),
            }
        }
    }

    /// Map every UV of the island through `transform`.
    ///
    /// Returns `false` without writing anything if the island is stale.
    pub fn transform_uvs<F>(&self, mesh: &mut UvMesh, transform: F) -> bool
    where
        F: Fn(Point2<f64>) -> Point2<f64>,
    {
        let Some(loops) = self.loops(mesh) else {
            return false;
        };
        for l in loops {
            let uv = transform(mesh.uv(l));
            mesh.set_uv(l, uv);
        }
        true
    }
}

/// Angle of the longest UV edge leaving one of `loops`, in radians.
///
/// The first edge wins among equally long ones; 0 when there is no edge
/// of positive length.
pub fn longest_edge_angle(mesh: &UvMesh, loops: &[LoopId]) -> f64 {
    let mut longest = 0.0;
    let mut angle = 0.0;
    for &l in loops {
        let edge = mesh.uv(mesh.loop_next(l)) - mesh.uv(l);
        let length = edge.norm();
        if length > longest {
            longest = length;
            angle = edge.y.atan2(edge.x);
        }
    }
    angle
}

/// Whether one face counts as selected under `mode`.
pub fn face_selected(mesh: &UvMesh, f: FaceId, mode: SelectionMode) -> bool {
    match mode {
        SelectionMode::Sync => mesh.face(f).select,
        SelectionMode::UvOnly => mesh.face_loops(f).any(|l| mesh.loop_at(l).uv_select),
    }
}
