//! Working set of one hotspot run and the trim filters.

use std::f64::consts::FRAC_PI_2;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geom::{BoundingBox2d, CIRCLE_TOLERANCE};
use crate::island::{detect_islands, face_selected, SelectionMode};
use crate::mesh::{FaceId, LoopId, UvMesh};
use crate::trim::Trim;

/// Aspect matches keep trims within 1.5 times the best area difference.
const AREA_SPREAD: f64 = 1.5;

/// World-size matches keep trims within twice the best difference.
const WORLD_SIZE_SPREAD: f64 = 2.0;

/// Which criterion filters trims first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchPriority {
    /// Aspect ratio, then area.
    #[default]
    Aspect,
    /// Area, then aspect ratio.
    Area,
    /// Real-world size, then aspect ratio.
    WorldSize,
}

/// How island area maps to the trim area it should get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaMatch {
    /// One to one.
    #[default]
    AsIs,
    /// Push islands to large trims.
    Max,
    /// Push islands to small trims.
    Min,
    /// An explicit factor.
    Manual,
}

impl AreaMatch {
    /// Factor applied to the island area before comparing with trim areas.
    pub fn scalar(self, manual: f64) -> f64 {
        match self {
            AreaMatch::AsIs => 1.0,
            AreaMatch::Max => 50.0,
            AreaMatch::Min => 0.1,
            AreaMatch::Manual => manual,
        }
    }
}

/// A trim with its bounds precomputed.
#[derive(Debug, Clone, Copy)]
pub struct HspTrim<'a> {
    trim: &'a Trim,
    bbox: BoundingBox2d,
}

impl<'a> HspTrim<'a> {
    /// Wrap a trim.
    pub fn new(trim: &'a Trim) -> Self {
        Self {
            trim,
            bbox: trim.bbox(),
        }
    }

    /// The wrapped trim.
    #[inline]
    pub fn trim(&self) -> &'a Trim {
        self.trim
    }

    /// Bounds.
    #[inline]
    pub fn bbox(&self) -> &BoundingBox2d {
        &self.bbox
    }

    /// Width over height.
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.bbox.aspect()
    }

    /// Height over width.
    #[inline]
    pub fn aspect_inverted(&self) -> f64 {
        self.bbox.aspect_inverted()
    }

    /// UV area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.bbox.area()
    }

    /// Whether the trim is an explicit circle.
    pub fn is_circle(&self) -> bool {
        self.trim.is_circle()
    }

    /// Circle trims and trims tagged `radial` (any case).
    pub fn radial(&self) -> bool {
        self.is_circle() || self.trim.tag.to_lowercase().contains("radial")
    }
}

/// An island of the hotspot working set.
#[derive(Debug, Clone)]
pub struct HspIsland {
    faces: Vec<FaceId>,
    loops: Vec<LoopId>,
    bbox: BoundingBox2d,
    world_area: f64,
}

impl HspIsland {
    /// Wrap `faces` of `mesh`, measuring their UV bounds and 3D area.
    pub fn new(mesh: &UvMesh, faces: Vec<FaceId>) -> Self {
        let loops: Vec<LoopId> = faces.iter().flat_map(|&f| mesh.face_loops(f)).collect();
        let world_area = faces.iter().map(|&f| mesh.face_area(f)).sum();
        let mut island = Self {
            faces,
            loops,
            bbox: BoundingBox2d::default(),
            world_area,
        };
        island.refresh(mesh);
        island
    }

    /// Re-measure the UV bounds after the UVs changed.
    pub fn refresh(&mut self, mesh: &UvMesh) {
        self.bbox = BoundingBox2d::from_points(self.loops.iter().map(|&l| mesh.uv(l)));
    }

    /// Faces.
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    /// Corners of all faces.
    pub fn loops(&self) -> &[LoopId] {
        &self.loops
    }

    /// UV bounds as of the last refresh.
    pub fn bbox(&self) -> &BoundingBox2d {
        &self.bbox
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        self.bbox.aspect()
    }

    /// UV bounds area.
    pub fn area(&self) -> f64 {
        self.bbox.area()
    }

    /// Summed 3D face area.
    pub fn world_area(&self) -> f64 {
        self.world_area
    }

    /// Square-ish islands.
    pub fn radial(&self) -> bool {
        self.bbox.is_circle(CIRCLE_TOLERANCE)
    }

    /// Mean of the corner UVs.
    pub fn centroid(&self, mesh: &UvMesh) -> Point2<f64> {
        if self.loops.is_empty() {
            return self.bbox.center();
        }
        let sum = self
            .loops
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, &l| acc + mesh.uv(l).coords);
        Point2::from(sum / self.loops.len() as f64)
    }

    /// Map every corner UV through `transform`.
    pub fn transform_uvs<F>(&self, mesh: &mut UvMesh, transform: F)
    where
        F: Fn(Point2<f64>) -> Point2<f64>,
    {
        for &l in &self.loops {
            let uv = transform(mesh.uv(l));
            mesh.set_uv(l, uv);
        }
    }
}

/// Base aspect tolerance widened for skewed aspects: 20% of the aspect
/// beyond 5:1 (or below 1:5), 30% beyond 1.5 (or below 0.7).
pub fn adaptive_tolerance(aspect: f64, tolerance: f64) -> f64 {
    if aspect > 5.0 || aspect < 0.2 {
        tolerance.max(aspect * 0.2)
    } else if aspect > 1.5 || aspect < 0.7 {
        tolerance.max(aspect * 0.3)
    } else {
        tolerance
    }
}

/// Trims whose aspect, or inverse aspect when rotation is allowed, lies
/// within the adaptive tolerance of `aspect + precision`. Input order is kept.
pub fn aspect_suited_trims<'a>(
    container: &[HspTrim<'a>],
    aspect: f64,
    allow_rotation: bool,
    tolerance: f64,
    precision: f64,
) -> Vec<HspTrim<'a>> {
    let corrected = aspect + precision;
    let tolerance = adaptive_tolerance(corrected, tolerance);
    container
        .iter()
        .filter(|trim| {
            (trim.aspect() - corrected).abs() <= tolerance
                || (allow_rotation && (trim.aspect_inverted() - corrected).abs() <= tolerance)
        })
        .copied()
        .collect()
}

/// Trims ordered by distance of their area to `island_area * scalar`,
/// keeping those within 1.5 times the best distance.
pub fn area_suited_trims<'a>(container: &[HspTrim<'a>], island_area: f64, scalar: f64) -> Vec<HspTrim<'a>> {
    let target = island_area * scalar;
    closest(
        container.iter().map(|t| ((t.area() - target).abs(), *t)),
        AREA_SPREAD,
    )
}

/// Trims with a known world size ordered by distance of their world area
/// to `world_area * scalar`, keeping those within twice the best distance.
pub fn world_size_suited_trims<'a>(
    container: &[HspTrim<'a>],
    world_area: f64,
    scalar: f64,
) -> Vec<HspTrim<'a>> {
    let target = world_area * scalar;
    closest(
        container
            .iter()
            .filter_map(|t| t.trim().world_area().map(|a| ((a - target).abs(), *t))),
        WORLD_SIZE_SPREAD,
    )
}

fn closest<'a, I>(diffs: I, spread: f64) -> Vec<HspTrim<'a>>
where
    I: Iterator<Item = (f64, HspTrim<'a>)>,
{
    let mut diffs: Vec<(f64, HspTrim<'a>)> = diffs.collect();
    diffs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let Some(&(best, _)) = diffs.first() else {
        return Vec::new();
    };
    diffs
        .into_iter()
        .take_while(|(d, _)| *d <= best * spread)
        .map(|(_, t)| t)
        .collect()
}

/// Rotation that aligns the island's orientation with the trim's: a quarter
/// turn when one is vertical and the other is not.
pub fn rotation_to_trim(island: &HspIsland, trim: &HspTrim, allow_rotation: bool) -> f64 {
    if allow_rotation && island.bbox().is_vertical() != trim.bbox().is_vertical() {
        FRAC_PI_2
    } else {
        0.0
    }
}

/// Trims and islands of one hotspot run, split into regular and radial.
#[derive(Debug, Default)]
pub struct HspStorage<'a> {
    /// Regular trims.
    pub trims: Vec<HspTrim<'a>>,
    /// Radial trims, when radial detection is on.
    pub radial_trims: Vec<HspTrim<'a>>,
    /// Regular islands.
    pub islands: Vec<HspIsland>,
    /// Radial islands, when radial detection is on.
    pub radial_islands: Vec<HspIsland>,
}

impl<'a> HspStorage<'a> {
    /// Create an empty working set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trims of both kinds.
    pub fn trims_count(&self) -> usize {
        self.trims.len() + self.radial_trims.len()
    }

    /// Number of islands of both kinds.
    pub fn islands_count(&self) -> usize {
        self.islands.len() + self.radial_islands.len()
    }

    /// Replace the trims by those passing the category and tag filters.
    ///
    /// An empty filter passes everything. The tag filter matches any trim
    /// whose tag contains it, ignoring case.
    pub fn collect_trims<I>(&mut self, trims: I, detect_radial: bool, category: &str, tag: &str)
    where
        I: IntoIterator<Item = &'a Trim>,
    {
        self.trims.clear();
        self.radial_trims.clear();
        let tag = tag.to_lowercase();

        for trim in trims {
            if !category.is_empty() && trim.category != category {
                continue;
            }
            if !tag.is_empty() && !trim.tag.to_lowercase().contains(&tag) {
                continue;
            }
            let hsp = HspTrim::new(trim);
            log::debug!(
                "trim '{}': aspect={:.3}, area={:.3}",
                trim.name,
                hsp.aspect(),
                hsp.area()
            );
            if detect_radial && hsp.radial() {
                self.radial_trims.push(hsp);
            } else {
                self.trims.push(hsp);
            }
        }
    }

    /// Replace the islands by the selected islands of `mesh`.
    ///
    /// Islands whose UV bounds have no area are skipped.
    pub fn collect_islands(&mut self, mesh: &UvMesh, mode: SelectionMode, detect_radial: bool) {
        self.islands.clear();
        self.radial_islands.clear();

        for faces in detect_islands(mesh, |f| face_selected(mesh, f, mode)) {
            let island = HspIsland::new(mesh, faces);
            if island.area() <= 0.0 {
                log::warn!(
                    "skipping island of {} faces with empty UV bounds in {}",
                    island.faces().len(),
                    mesh.name()
                );
                continue;
            }
            if detect_radial && island.radial() {
                self.radial_islands.push(island);
            } else {
                self.islands.push(island);
            }
        }
    }

    /// Two-stage trim filter for a regular island.
    pub fn suited_trims(
        &self,
        island: &HspIsland,
        priority: MatchPriority,
        scalar: f64,
        allow_rotation: bool,
        tolerance: f64,
        precision: f64,
    ) -> Vec<HspTrim<'a>> {
        match priority {
            MatchPriority::Aspect => {
                let by_aspect = aspect_suited_trims(&self.trims, island.aspect(), allow_rotation, tolerance, precision);
                area_suited_trims(&by_aspect, island.area(), scalar)
            }
            MatchPriority::Area => {
                let by_area = area_suited_trims(&self.trims, island.area(), scalar);
                aspect_suited_trims(&by_area, island.aspect(), allow_rotation, tolerance, precision)
            }
            MatchPriority::WorldSize => {
                let by_size = world_size_suited_trims(&self.trims, island.world_area(), scalar);
                aspect_suited_trims(&by_size, island.aspect(), allow_rotation, tolerance, precision)
            }
        }
    }

    /// Trims offered to radial islands: the radial trims, or the regular
    /// ones when there are none.
    pub fn radial_container(&self) -> &[HspTrim<'a>] {
        if self.radial_trims.is_empty() {
            &self.trims
        } else {
            &self.radial_trims
        }
    }
}
