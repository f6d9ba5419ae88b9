//! Replica-to-master transforms.
//!
//! A [`StackTransform`] maps every UV of a replica island onto its master:
//!
//! ```text
//! uv' = master_center + scale * R(angle) * (uv - replica_center)
//! ```
//!
//! The rotation comes from a [`RotationMode`] policy and the scale from a
//! [`ScaleMode`] policy. The transform is computed from both islands before
//! any coordinate is written.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::island::Island;
use crate::mesh::UvMesh;

/// Lower bound on bounding-box extents used as divisors.
const MIN_EXTENT: f64 = 0.001;

/// The four quarter turns.
const QUARTER_TURNS: [f64; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];

/// How the replica's rotation is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RotationMode {
    /// Never rotate.
    None,
    /// Snap the difference of the longest-edge angles to a quarter turn.
    #[serde(rename = "SNAP_90")]
    Snap90,
    /// Quarter turn whose rotated bounds best match the master's aspect ratio.
    Optimal,
    /// No rotation or the snapped angle, whichever lines corners up better.
    #[default]
    OptimalMatch,
}

/// How the replica is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleMode {
    /// Keep the replica's size.
    None,
    /// Average of the per-axis ratios of the rotated bounds.
    #[default]
    Uniform,
    /// Per-axis ratios of the unrotated bounds.
    Bounds,
}

/// Similarity transform from a replica onto a master.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackTransform {
    /// Rotation in radians, applied about the replica center.
    pub rotation: f64,
    /// Per-axis scale applied after rotation.
    pub scale: Vector2<f64>,
    /// Replica bounds center.
    pub from: Point2<f64>,
    /// Master bounds center.
    pub to: Point2<f64>,
}

impl StackTransform {
    /// Compute the transform placing `replica` (in `replica_mesh`) onto
    /// `master` (in `master_mesh`).
    pub fn compute(
        replica: &Island,
        replica_mesh: &UvMesh,
        master: &Island,
        master_mesh: &UvMesh,
        rotation_mode: RotationMode,
        scale_mode: ScaleMode,
    ) -> Self {
        let rotation = best_rotation(replica, replica_mesh, master, master_mesh, rotation_mode);

        let target = master.size();
        let scale = match scale_mode {
            ScaleMode::None => Vector2::new(1.0, 1.0),
            ScaleMode::Uniform => {
                let size = if rotation != 0.0 {
                    replica.bbox().rotated_size(rotation)
                } else {
                    replica.size()
                };
                let sx = target.x / size.x.max(MIN_EXTENT);
                let sy = target.y / size.y.max(MIN_EXTENT);
                let s = (sx + sy) / 2.0;
                Vector2::new(s, s)
            }
            ScaleMode::Bounds => {
                let size = replica.size();
                Vector2::new(
                    target.x / size.x.max(MIN_EXTENT),
                    target.y / size.y.max(MIN_EXTENT),
                )
            }
        };

        Self {
            rotation,
            scale,
            from: replica.center(),
            to: master.center(),
        }
    }

    /// Transform one UV coordinate.
    #[inline]
    pub fn apply_point(&self, uv: Point2<f64>) -> Point2<f64> {
        let local = uv - self.from;
        let rotated = if self.rotation != 0.0 {
            Rotation2::new(self.rotation) * local
        } else {
            local
        };
        self.to + rotated.component_mul(&self.scale)
    }

    /// Rewrite the UVs of `island` in `mesh`. Returns `false` for stale islands.
    pub fn apply(&self, island: &Island, mesh: &mut UvMesh) -> bool {
        island.transform_uvs(mesh, |uv| self.apply_point(uv))
    }
}

/// Quarter turn closest to `diff`, measuring distance on the circle.
pub fn snap_90(diff: f64) -> f64 {
    let distance = |a: f64| ((diff - a + PI).rem_euclid(TAU) - PI).abs();
    let mut best = QUARTER_TURNS[0];
    for &a in &QUARTER_TURNS[1..] {
        if distance(a) < distance(best) {
            best = a;
        }
    }
    best
}

/// Rotation that best aligns `replica` with `master` under `mode`.
pub fn best_rotation(
    replica: &Island,
    replica_mesh: &UvMesh,
    master: &Island,
    master_mesh: &UvMesh,
    mode: RotationMode,
) -> f64 {
    match mode {
        RotationMode::None => 0.0,
        RotationMode::Snap90 => {
            let diff = master.edge_orientation(master_mesh) - replica.edge_orientation(replica_mesh);
            let angle = snap_90(diff);
            log::debug!(
                "snap rotation: diff {:.1} deg -> {:.1} deg",
                diff.to_degrees(),
                angle.to_degrees()
            );
            angle
        }
        RotationMode::Optimal => {
            let mut best = 0.0;
            let mut best_score = f64::INFINITY;
            for &angle in &QUARTER_TURNS {
                let score = bbox_score(replica, master, angle);
                if score < best_score {
                    best_score = score;
                    best = angle;
                }
            }
            best
        }
        RotationMode::OptimalMatch => {
            let unrotated = match_score(replica, replica_mesh, master, master_mesh, 0.0);
            let diff = master.edge_orientation(master_mesh) - replica.edge_orientation(replica_mesh);
            let snapped = snap_90(diff);
            let rotated = match_score(replica, replica_mesh, master, master_mesh, snapped);
            log::debug!(
                "match rotation: 0 deg scores {:.4}, {:.1} deg scores {:.4}",
                unrotated,
                snapped.to_degrees(),
                rotated
            );
            if unrotated <= rotated {
                0.0
            } else {
                snapped
            }
        }
    }
}

/// Difference between the master's aspect ratio and the replica's rotated one.
fn bbox_score(replica: &Island, master: &Island, angle: f64) -> f64 {
    let rotated = replica.bbox().rotated_size(angle);
    let master_size = master.size();
    let master_aspect = master_size.x / master_size.y.max(MIN_EXTENT);
    let rotated_aspect = rotated.x / rotated.y.max(MIN_EXTENT);
    (master_aspect - rotated_aspect).abs()
}

/// Mean distance between corresponding corners of the centered replica,
/// rotated by `angle`, and the centered master.
///
/// Falls back to [`bbox_score`] when corner counts differ or either island
/// is stale.
fn match_score(
    replica: &Island,
    replica_mesh: &UvMesh,
    master: &Island,
    master_mesh: &UvMesh,
    angle: f64,
) -> f64 {
    let (Some(replica_uvs), Some(master_uvs)) = (replica.uvs(replica_mesh), master.uvs(master_mesh))
    else {
        return bbox_score(replica, master, angle);
    };
    if replica_uvs.is_empty() || replica_uvs.len() != master_uvs.len() {
        return bbox_score(replica, master, angle);
    }

    let rot = Rotation2::new(angle);
    let (rc, mc) = (replica.center(), master.center());
    let total: f64 = replica_uvs
        .iter()
        .zip(&master_uvs)
        .map(|(r, m)| (rot * (r - rc) - (m - mc)).norm())
        .sum();
    total / replica_uvs.len() as f64
}
