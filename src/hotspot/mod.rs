//! Hotspot mapping: assign UV islands to the best-fitting trims.
//!
//! A run collects trims and selected islands into an [`HspStorage`], picks
//! suited trims for every island with a two-stage filter, then places the
//! island into its trim with a [`FitTransform`].
//!
//! # Matching
//!
//! | Priority     | Stage 1                     | Stage 2         |
//! |--------------|-----------------------------|-----------------|
//! | `ASPECT`     | aspect within tolerance     | closest area    |
//! | `AREA`       | closest area                | aspect          |
//! | `WORLD_SIZE` | closest real-world area     | aspect          |
//!
//! Radial islands (square-ish bounds) are matched by area alone against the
//! radial trims when radial detection is enabled.
//!
//! # Example
//!
//! ```
//! use trimstack::prelude::*;
//! use trimstack::nalgebra::{Point2, Point3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(2.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let uvs = vec![vec![
//!     Point2::new(0.0, 0.0),
//!     Point2::new(0.2, 0.0),
//!     Point2::new(0.2, 0.1),
//!     Point2::new(0.0, 0.1),
//! ]];
//! let mut mesh = build_from_polygons("Plank", &positions, &[vec![0, 1, 2, 3]], Some(&uvs)).unwrap();
//! mesh.select_all(true);
//! let mut scene = Scene::from_mesh(mesh);
//!
//! let sheet = Trimsheet::from_trims(vec![Trim::new("Wood", 0.0, 0.5, 1.0, 0.0)]);
//! let report = run_hotspot(&mut scene, &sheet, &HotspotOptions::default()).unwrap();
//! assert_eq!(report.islands_fitted, 1);
//! ```

mod fit;
mod storage;

pub use fit::{
    anchor, fit_selection_to_trim, padded_rect, selected_loops, Alignment, AxisFit, FitMode, FitOptions,
    FitTransform, InsetMode, MAX_PADDING, MIN_FIT_EXTENT,
};
pub use storage::{
    adaptive_tolerance, area_suited_trims, aspect_suited_trims, rotation_to_trim, world_size_suited_trims,
    AreaMatch, HspIsland, HspStorage, HspTrim, MatchPriority,
};

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Point2, Rotation2, Vector2};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UvError};
use crate::geom::BoundingBox2d;
use crate::island::{longest_edge_angle, SelectionMode};
use crate::mesh::UvMesh;
use crate::scene::Scene;
use crate::trim::{Trim, Trimsheet};

/// Rotation steps of radial variation.
const RADIAL_STEP_DEGREES: u32 = 5;

/// Island preprocessing before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orient {
    /// Keep islands as they are.
    #[default]
    AsIs,
    /// Rotate each island so its longest UV edge lies on the nearest axis.
    Orient,
}

/// Which trims take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrimsMode {
    /// Every trim of the sheet.
    #[default]
    All,
    /// Only selected trims.
    Selected,
}

/// Options of [`run_hotspot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotOptions {
    // ==================== Matching ====================
    /// Which filter runs first.
    pub priority: MatchPriority,

    /// Island preprocessing.
    pub orient: Orient,

    /// Area bias policy.
    pub area_match: AreaMatch,

    /// Area factor for [`AreaMatch::Manual`], in `[0.01, 100]`.
    pub manual_scale: f64,

    /// Allow quarter turns to match trim orientation.
    pub allow_rotation: bool,

    /// Base aspect tolerance, in `[0.01, 2]`.
    pub aspect_tolerance: f64,

    /// Offset added to island aspects before comparison, in `[-1, 1]`.
    pub aspect_precision: f64,

    /// Trims taking part.
    pub trims_mode: TrimsMode,

    /// Only trims of this category (empty for all).
    pub trim_category: String,

    /// Only trims whose tag contains this text (empty for all).
    pub trim_tag: String,

    /// Match square-ish islands to radial trims separately.
    pub detect_radial: bool,

    /// Leave only radial islands selected after the run.
    pub select_radials: bool,

    /// Which selection flags define the islands.
    pub selection_mode: SelectionMode,

    // ==================== Fitting ====================
    /// Placement inside the trim.
    pub fit: FitOptions,

    /// Where the padding comes from.
    pub inset_mode: InsetMode,

    // ==================== Variation ====================
    /// Master switch of every variation below.
    pub allow_variability: bool,

    /// Random half turns, or random 5 degree steps for radial islands.
    pub allow_rotation_variation: bool,

    /// Random choice among the suited trims.
    pub allow_location_variation: bool,

    /// Random shift along the trim's long axis.
    pub allow_offset_variation: bool,

    /// Random mirroring.
    pub allow_flip_variation: bool,

    /// Largest offset as a fraction of half the free space, in `[0, 1]`.
    pub loc_var_offset: f64,

    /// Seed of the variation generator.
    pub seed: u64,
}

impl Default for HotspotOptions {
    fn default() -> Self {
        Self {
            priority: MatchPriority::Aspect,
            orient: Orient::AsIs,
            area_match: AreaMatch::AsIs,
            manual_scale: 1.0,
            allow_rotation: true,
            aspect_tolerance: 0.5,
            aspect_precision: 0.0,
            trims_mode: TrimsMode::All,
            trim_category: String::new(),
            trim_tag: String::new(),
            detect_radial: false,
            select_radials: false,
            selection_mode: SelectionMode::Sync,
            fit: FitOptions::default(),
            inset_mode: InsetMode::Manual,
            allow_variability: false,
            allow_rotation_variation: false,
            allow_location_variation: false,
            allow_offset_variation: false,
            allow_flip_variation: false,
            loc_var_offset: 0.0,
            seed: 132,
        }
    }
}

impl HotspotOptions {
    /// Set the match priority.
    pub fn with_priority(mut self, priority: MatchPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the island preprocessing.
    pub fn with_orient(mut self, orient: Orient) -> Self {
        self.orient = orient;
        self
    }

    /// Set the area policy; `manual` is clamped to `[0.01, 100]`.
    pub fn with_area_match(mut self, area_match: AreaMatch, manual: f64) -> Self {
        self.area_match = area_match;
        self.manual_scale = manual.clamp(0.01, 100.0);
        self
    }

    /// Allow or forbid quarter turns.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// Set the aspect tolerance (clamped to `[0.01, 2]`) and precision
    /// (clamped to `[-1, 1]`).
    pub fn with_aspect(mut self, tolerance: f64, precision: f64) -> Self {
        self.aspect_tolerance = tolerance.clamp(0.01, 2.0);
        self.aspect_precision = precision.clamp(-1.0, 1.0);
        self
    }

    /// Restrict the trims taking part.
    pub fn with_trims(mut self, mode: TrimsMode, category: impl Into<String>, tag: impl Into<String>) -> Self {
        self.trims_mode = mode;
        self.trim_category = category.into();
        self.trim_tag = tag.into();
        self
    }

    /// Enable radial detection, optionally selecting radial islands afterwards.
    pub fn with_radial(mut self, detect: bool, select: bool) -> Self {
        self.detect_radial = detect;
        self.select_radials = select;
        self
    }

    /// Set the selection flags that define islands.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Set the fit options.
    pub fn with_fit(mut self, fit: FitOptions) -> Self {
        self.fit = fit;
        self
    }

    /// Set the inset mode.
    pub fn with_inset_mode(mut self, mode: InsetMode) -> Self {
        self.inset_mode = mode;
        self
    }

    /// Enable every variation with `seed`.
    pub fn with_variability(mut self, seed: u64, loc_var_offset: f64) -> Self {
        self.allow_variability = true;
        self.allow_rotation_variation = true;
        self.allow_location_variation = true;
        self.allow_offset_variation = true;
        self.allow_flip_variation = true;
        self.loc_var_offset = loc_var_offset.clamp(0.0, 1.0);
        self.seed = seed;
        self
    }
}

/// Outcome of [`run_hotspot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HotspotReport {
    /// Objects with at least one selected island.
    pub objects_processed: usize,
    /// Islands considered.
    pub islands_processed: usize,
    /// Islands placed into a trim.
    pub islands_fitted: usize,
    /// Islands matched as radial.
    pub radial_islands: usize,
}

impl HotspotReport {
    /// Fraction of processed islands that were fitted (1 when none were).
    pub fn success_rate(&self) -> f64 {
        if self.islands_processed == 0 {
            1.0
        } else {
            self.islands_fitted as f64 / self.islands_processed as f64
        }
    }
}

/// Generator for one kind of variation, if it is enabled.
fn variation(rng: &mut Option<StdRng>, enabled: bool) -> Option<&mut StdRng> {
    if enabled {
        rng.as_mut()
    } else {
        None
    }
}

/// Map every selected island of every object in `scene` into a trim of
/// `sheet`.
///
/// Fails with `NoTrims` when no trim passes the filters and with
/// `NoSelection` when no object has selected islands. Islands without a
/// suited trim are left in place.
pub fn run_hotspot(scene: &mut Scene, sheet: &Trimsheet, options: &HotspotOptions) -> Result<HotspotReport> {
    let trims: Vec<&Trim> = match options.trims_mode {
        TrimsMode::All => sheet.trims().iter().collect(),
        TrimsMode::Selected => sheet.selected_trims(),
    };

    let mut storage = HspStorage::new();
    storage.collect_trims(
        trims,
        options.detect_radial,
        &options.trim_category,
        &options.trim_tag,
    );
    if storage.trims_count() == 0 {
        return Err(UvError::NoTrims);
    }

    let scalar = options.area_match.scalar(options.manual_scale);
    let mut rng = options
        .allow_variability
        .then(|| StdRng::seed_from_u64(options.seed));
    let mut report = HotspotReport::default();

    for object in scene.iter_mut() {
        let mesh = &mut object.mesh;
        storage.collect_islands(mesh, options.selection_mode, options.detect_radial);
        if options.select_radials {
            mesh.select_all(false);
        }
        if storage.islands_count() == 0 {
            continue;
        }
        report.objects_processed += 1;
        report.islands_processed += storage.islands_count();
        report.radial_islands += storage.radial_islands.len();

        if options.orient == Orient::Orient {
            for island in storage.islands.iter_mut().chain(storage.radial_islands.iter_mut()) {
                orient_island(mesh, island);
            }
        }

        for island in &storage.islands {
            let suited = storage.suited_trims(
                island,
                options.priority,
                scalar,
                options.allow_rotation,
                options.aspect_tolerance,
                options.aspect_precision,
            );
            if place_island(mesh, island, &suited, false, options, &mut rng) {
                report.islands_fitted += 1;
            }
        }

        for island in &storage.radial_islands {
            let suited = area_suited_trims(storage.radial_container(), island.area(), scalar);
            if place_island(mesh, island, &suited, true, options, &mut rng) {
                report.islands_fitted += 1;
            }
            if options.select_radials {
                for &f in island.faces() {
                    mesh.set_face_select(f, true);
                    mesh.set_face_uv_select(f, true);
                }
            }
        }

        log::debug!(
            "{}: {} islands, {} radial",
            mesh.name(),
            storage.islands_count(),
            storage.radial_islands.len()
        );
    }

    if report.objects_processed == 0 {
        return Err(UvError::NoSelection);
    }

    log::info!(
        "hotspot: fitted {}/{} islands in {} objects",
        report.islands_fitted,
        report.islands_processed,
        report.objects_processed
    );
    Ok(report)
}

/// Rotate `island` about its centroid so its longest UV edge lies on the
/// nearest axis.
fn orient_island(mesh: &mut UvMesh, island: &mut HspIsland) {
    let angle = longest_edge_angle(mesh, island.loops());
    let delta = (angle / FRAC_PI_2).round() * FRAC_PI_2 - angle;
    if delta.abs() < 1e-9 {
        return;
    }
    let center = island.centroid(mesh);
    let rotation = Rotation2::new(delta);
    island.transform_uvs(mesh, |uv| center + rotation * (uv - center));
    island.refresh(mesh);
}

/// Place one island into a trim chosen from `suited`. Returns false when
/// there was nothing to place it into.
fn place_island(
    mesh: &mut UvMesh,
    island: &HspIsland,
    suited: &[HspTrim],
    radial: bool,
    options: &HotspotOptions,
    rng: &mut Option<StdRng>,
) -> bool {
    let chosen = match variation(rng, options.allow_location_variation) {
        Some(rng) => suited.choose(rng),
        None => suited.first(),
    };
    let Some(target) = chosen else {
        log::debug!(
            "no suited trim for island of {} faces (aspect {:.3}, area {:.4})",
            island.faces().len(),
            island.aspect(),
            island.area()
        );
        return false;
    };
    let trim = target.trim();

    let mut rotation = rotation_to_trim(island, target, options.allow_rotation);
    if let Some(rng) = variation(rng, options.allow_rotation_variation) {
        if radial {
            let steps = rng.random_range(0..360 / RADIAL_STEP_DEGREES);
            rotation += f64::from(steps * RADIAL_STEP_DEGREES).to_radians();
        } else if rng.random::<bool>() {
            rotation += PI;
        }
    }

    let fit = options.fit.resolved(trim);
    let padding = options.inset_mode.padding(options.fit.padding, trim);

    let Some(transform) = FitTransform::compute(island.bbox(), target.bbox(), rotation, fit.fit_mode, padding, &fit)
    else {
        return false;
    };
    transform.apply(mesh, island.loops());

    if let Some(rng) = variation(rng, options.allow_offset_variation) {
        let placed = BoundingBox2d::from_points(island.loops().iter().map(|&l| mesh.uv(l)));
        let axis = target.bbox().longest_axis();
        let free = (target.bbox().size().dot(&axis) - placed.size().dot(&axis)).max(0.0);
        let shift = rng.random_range(-1.0..=1.0) * options.loc_var_offset * free / 2.0;
        let offset = axis * shift;
        island.transform_uvs(mesh, |uv| uv + offset);
    }

    if let Some(rng) = variation(rng, options.allow_flip_variation) {
        let flips = [
            Vector2::new(1.0, 1.0),
            Vector2::new(-1.0, 1.0),
            Vector2::new(1.0, -1.0),
            Vector2::new(-1.0, -1.0),
        ];
        let flip = flips[rng.random_range(0..flips.len())];
        let center: Point2<f64> = island.centroid(mesh);
        island.transform_uvs(mesh, |uv| center + (uv - center).component_mul(&flip));
    }

    log::debug!(
        "island of {} faces -> trim '{}' (rotation {:.1} deg)",
        island.faces().len(),
        trim.name,
        rotation.to_degrees()
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use nalgebra::Point3;

    /// Separate unit quads with the given UV rects `(left, bottom, right, top)`.
    fn quads(rects: &[(f64, f64, f64, f64)]) -> UvMesh {
        let mut positions = Vec::new();
        let mut faces = Vec::new();
        let mut uvs = Vec::new();
        for (i, &(l, b, r, t)) in rects.iter().enumerate() {
            let x = i as f64 * 2.0;
            let base = positions.len();
            positions.extend([
                Point3::new(x, 0.0, 0.0),
                Point3::new(x + 1.0, 0.0, 0.0),
                Point3::new(x + 1.0, 1.0, 0.0),
                Point3::new(x, 1.0, 0.0),
            ]);
            faces.push(vec![base, base + 1, base + 2, base + 3]);
            uvs.push(vec![
                Point2::new(l, b),
                Point2::new(r, b),
                Point2::new(r, t),
                Point2::new(l, t),
            ]);
        }
        let mut mesh = build_from_polygons("Quads", &positions, &faces, Some(&uvs)).unwrap();
        mesh.select_all(true);
        mesh
    }

    fn face_bbox(scene: &Scene, face: usize) -> BoundingBox2d {
        let mesh = scene.mesh("Quads").unwrap();
        let f = crate::mesh::FaceId::new(face);
        BoundingBox2d::from_points(mesh.face_loops(f).map(|l| mesh.uv(l)))
    }

    fn assert_bbox(bbox: &BoundingBox2d, left: f64, bottom: f64, right: f64, top: f64) {
        assert!((bbox.left() - left).abs() < 1e-9, "left {}", bbox.left());
        assert!((bbox.bottom() - bottom).abs() < 1e-9, "bottom {}", bbox.bottom());
        assert!((bbox.right() - right).abs() < 1e-9, "right {}", bbox.right());
        assert!((bbox.top() - top).abs() < 1e-9, "top {}", bbox.top());
    }

    fn sheet() -> Trimsheet {
        Trimsheet::from_trims(vec![
            Trim::new("wide", 0.0, 0.25, 0.5, 0.0),
            Trim::new("square", 0.5, 1.0, 1.0, 0.5),
        ])
    }

    #[test]
    fn test_defaults() {
        let options = HotspotOptions::default();
        assert_eq!(options.priority, MatchPriority::Aspect);
        assert_eq!(options.fit.fit_mode, FitMode::Contain);
        assert_eq!(options.seed, 132);
        assert_eq!(options.aspect_tolerance, 0.5);
        assert!(options.allow_rotation);
        assert!(!options.allow_variability);

        let parsed: HotspotOptions =
            serde_json::from_str(r#"{"priority": "WORLD_SIZE", "fit": {"fit_mode": "FIT_WIDTH"}}"#).unwrap();
        assert_eq!(parsed.priority, MatchPriority::WorldSize);
        assert_eq!(parsed.fit.fit_mode, FitMode::FitWidth);
        assert_eq!(parsed.seed, 132);
    }

    #[test]
    fn test_fits_island_into_matching_trim() {
        let mut scene = Scene::from_mesh(quads(&[(0.6, 0.6, 0.8, 0.7)]));
        let report = run_hotspot(&mut scene, &sheet(), &HotspotOptions::default()).unwrap();
        assert_eq!(
            report,
            HotspotReport {
                objects_processed: 1,
                islands_processed: 1,
                islands_fitted: 1,
                radial_islands: 0,
            }
        );
        assert_eq!(report.success_rate(), 1.0);
        assert_bbox(&face_bbox(&scene, 0), 0.0, 0.0, 0.5, 0.25);
    }

    #[test]
    fn test_rotates_vertical_island() {
        let mut scene = Scene::from_mesh(quads(&[(0.0, 0.0, 0.1, 0.2)]));
        run_hotspot(&mut scene, &sheet(), &HotspotOptions::default()).unwrap();
        assert_bbox(&face_bbox(&scene, 0), 0.0, 0.0, 0.5, 0.25);

        // Without rotation the tall island fits nothing.
        let mut scene = Scene::from_mesh(quads(&[(0.0, 0.0, 0.1, 0.3)]));
        let options = HotspotOptions::default().with_rotation(false);
        let report = run_hotspot(&mut scene, &sheet(), &options).unwrap();
        assert_eq!(report.islands_fitted, 0);
        assert_eq!(report.success_rate(), 0.0);
        assert_bbox(&face_bbox(&scene, 0), 0.0, 0.0, 0.1, 0.3);
    }

    #[test]
    fn test_area_scalar_max_prefers_large_trim() {
        let sheet = Trimsheet::from_trims(vec![
            Trim::new("small", 0.0, 1.0, 1.0, 0.0),
            Trim::new("large", 0.0, 5.0, 10.0, 0.0),
        ]);
        let options = HotspotOptions::default()
            .with_priority(MatchPriority::Area)
            .with_aspect(1.5, 0.0);

        let mut scene = Scene::from_mesh(quads(&[(0.0, 0.0, 1.0, 1.0)]));
        run_hotspot(&mut scene, &sheet, &options).unwrap();
        assert_bbox(&face_bbox(&scene, 0), 0.0, 0.0, 1.0, 1.0);

        let mut scene = Scene::from_mesh(quads(&[(0.0, 0.0, 1.0, 1.0)]));
        let options = options.with_area_match(AreaMatch::Max, 1.0);
        run_hotspot(&mut scene, &sheet, &options).unwrap();
        assert_bbox(&face_bbox(&scene, 0), 2.5, 0.0, 7.5, 5.0);
    }

    #[test]
    fn test_errors() {
        let mut scene = Scene::from_mesh(quads(&[(0.0, 0.0, 0.2, 0.1)]));
        assert!(matches!(
            run_hotspot(&mut scene, &Trimsheet::new(), &HotspotOptions::default()),
            Err(UvError::NoTrims)
        ));

        let options = HotspotOptions::default().with_trims(TrimsMode::Selected, "", "");
        assert!(matches!(run_hotspot(&mut scene, &sheet(), &options), Err(UvError::NoTrims)));

        let options = HotspotOptions::default().with_trims(TrimsMode::All, "", "nothing");
        assert!(matches!(run_hotspot(&mut scene, &sheet(), &options), Err(UvError::NoTrims)));

        scene.mesh_mut("Quads").unwrap().select_all(false);
        assert!(matches!(
            run_hotspot(&mut scene, &sheet(), &HotspotOptions::default()),
            Err(UvError::NoSelection)
        ));
    }

    #[test]
    fn test_radial_islands_and_selection() {
        let mut square = Trim::new("bolt", 0.5, 1.0, 1.0, 0.5);
        square.tag = "Radial".into();
        let sheet = Trimsheet::from_trims(vec![Trim::new("wide", 0.0, 0.25, 0.5, 0.0), square]);
        let mut scene = Scene::from_mesh(quads(&[(0.0, 0.0, 0.2, 0.1), (0.0, 0.0, 0.1, 0.1)]));

        let options = HotspotOptions::default().with_radial(true, true);
        let report = run_hotspot(&mut scene, &sheet, &options).unwrap();
        assert_eq!(report.radial_islands, 1);
        assert_eq!(report.islands_fitted, 2);
        assert_bbox(&face_bbox(&scene, 0), 0.0, 0.0, 0.5, 0.25);
        assert_bbox(&face_bbox(&scene, 1), 0.5, 0.5, 1.0, 1.0);

        let mesh = scene.mesh("Quads").unwrap();
        assert!(!mesh.face(crate::mesh::FaceId::new(0)).select);
        assert!(mesh.face(crate::mesh::FaceId::new(1)).select);
    }

    #[test]
    fn test_padding_and_alignment() {
        let mut scene = Scene::from_mesh(quads(&[(0.0, 0.0, 0.1, 0.1)]));
        let sheet = Trimsheet::from_trims(vec![Trim::new("panel", 0.0, 0.5, 1.0, 0.0)]);
        let fit = FitOptions::default()
            .with_alignment(Alignment::TopLeft)
            .with_padding(0.1);
        let options = HotspotOptions::default().with_aspect(2.0, 0.0).with_fit(fit);

        run_hotspot(&mut scene, &sheet, &options).unwrap();
        // Padded rect is 0.1..0.9 x 0.05..0.45; the square scales to 0.4.
        assert_bbox(&face_bbox(&scene, 0), 0.1, 0.05, 0.5, 0.45);
    }

    #[test]
    fn test_orient_aligns_longest_edge() {
        let mut mesh = quads(&[(0.0, 0.0, 0.4, 0.2)]);
        let rotation = Rotation2::new(0.3);
        let loops: Vec<_> = mesh.loop_ids().collect();
        for &l in &loops {
            let uv = mesh.uv(l);
            mesh.set_uv(l, Point2::from(rotation * uv.coords));
        }
        let mut island = HspIsland::new(&mesh, vec![crate::mesh::FaceId::new(0)]);
        orient_island(&mut mesh, &mut island);
        assert!((island.bbox().width() - 0.4).abs() < 1e-9);
        assert!((island.bbox().height() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_variability_is_reproducible() {
        let rects = [
            (0.0, 0.0, 0.2, 0.1),
            (0.3, 0.3, 0.5, 0.4),
            (0.1, 0.6, 0.3, 0.7),
            (0.0, 0.0, 0.1, 0.1),
        ];
        let sheet = Trimsheet::from_trims(vec![
            Trim::new("a", 0.0, 0.25, 0.5, 0.0),
            Trim::new("b", 0.0, 0.5, 0.5, 0.25),
            Trim::new("c", 0.5, 1.0, 1.0, 0.5),
        ]);
        let options = HotspotOptions::default()
            .with_radial(true, false)
            .with_variability(7, 0.5);

        let run = |options: &HotspotOptions| {
            let mut scene = Scene::from_mesh(quads(&rects));
            run_hotspot(&mut scene, &sheet, options).unwrap();
            let mesh = scene.mesh("Quads").unwrap();
            mesh.loop_ids().map(|l| mesh.uv(l)).collect::<Vec<_>>()
        };

        let first = run(&options);
        assert_eq!(first, run(&options));

        // Every island still ends up inside the trims' union.
        for uv in &first {
            assert!(uv.x > -1e-9 && uv.x < 1.0 + 1e-9);
            assert!(uv.y > -1e-9 && uv.y < 1.0 + 1e-9);
        }
    }
}
