//! Fitting UVs into a trim rectangle.
//!
//! A fit is computed in three steps, after the policy of CSS `object-fit`:
//!
//! 1. The trim is shrunk by a padding fraction on every side.
//! 2. Per-axis scale factors are chosen by a [`FitMode`].
//! 3. The scaled bounds are anchored at one of nine [`Alignment`] positions.
//!
//! The resulting [`FitTransform`] maps each UV by translating the source
//! bounds center to the origin, rotating, scaling, and translating to the
//! anchor.

use nalgebra::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, UvError};
use crate::geom::BoundingBox2d;
use crate::island::SelectionMode;
use crate::mesh::{LoopId, UvMesh};
use crate::trim::Trim;

/// Selections thinner than this on either axis cannot be fitted.
pub const MIN_FIT_EXTENT: f64 = 1e-4;

/// Largest padding fraction; half the trim on each side leaves nothing.
pub const MAX_PADDING: f64 = 0.5;

/// How UVs are scaled into a trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FitMode {
    /// Independent horizontal and vertical policies (see [`AxisFit`]).
    Fill,
    /// Uniform scale, fits inside the trim.
    #[default]
    Contain,
    /// Uniform scale, covers the trim and may overflow.
    Cover,
    /// Uniform scale keyed to the trim width.
    FitWidth,
    /// Uniform scale keyed to the trim height.
    FitHeight,
    /// Position only.
    None,
    /// Use the fit mode stored on the trim.
    FromTrim,
}

impl FitMode {
    /// Replace [`FitMode::FromTrim`] by the trim's own mode.
    ///
    /// A trim that itself says `FromTrim` falls back to `Contain`.
    pub fn resolve(self, trim: &Trim) -> FitMode {
        match self {
            FitMode::FromTrim => match trim.fit_mode {
                FitMode::FromTrim => FitMode::Contain,
                mode => mode,
            },
            mode => mode,
        }
    }
}

/// Per-axis policy of [`FitMode::Fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AxisFit {
    /// Stretch to the trim extent on this axis.
    #[default]
    Fill,
    /// Use the uniform contain factor.
    Contain,
    /// A percentage of the trim extent.
    Custom,
}

/// Anchor of the fitted bounds inside the padded trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum Alignment {
    #[default]
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Alignment {
    /// -1 for left, 0 for centered, 1 for right.
    pub fn horizontal(self) -> i8 {
        match self {
            Alignment::TopLeft | Alignment::CenterLeft | Alignment::BottomLeft => -1,
            Alignment::TopRight | Alignment::CenterRight | Alignment::BottomRight => 1,
            _ => 0,
        }
    }

    /// -1 for bottom, 0 for centered, 1 for top.
    pub fn vertical(self) -> i8 {
        match self {
            Alignment::BottomLeft | Alignment::BottomCenter | Alignment::BottomRight => -1,
            Alignment::TopLeft | Alignment::TopCenter | Alignment::TopRight => 1,
            _ => 0,
        }
    }
}

/// Where the padding of a hotspot fit comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsetMode {
    /// The padding of the fit options.
    #[default]
    Manual,
    /// The padding stored on the trim.
    FromTrim,
    /// The trim's padding when it is positive, the manual one otherwise.
    Combined,
}

impl InsetMode {
    /// Padding fraction for `trim`.
    pub fn padding(self, manual: f64, trim: &Trim) -> f64 {
        match self {
            InsetMode::Manual => manual,
            InsetMode::FromTrim => trim.fit_padding,
            InsetMode::Combined if trim.fit_padding > 0.0 => trim.fit_padding,
            InsetMode::Combined => manual,
        }
    }
}

/// Options shared by fit-to-trim and hotspot placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Scale policy.
    pub fit_mode: FitMode,

    /// Horizontal policy under [`FitMode::Fill`].
    pub horizontal: AxisFit,

    /// Vertical policy under [`FitMode::Fill`].
    pub vertical: AxisFit,

    /// Horizontal percentage for [`AxisFit::Custom`] (100 = trim width).
    pub horizontal_custom: f64,

    /// Vertical percentage for [`AxisFit::Custom`] (100 = trim height).
    pub vertical_custom: f64,

    /// Anchor inside the padded trim.
    pub alignment: Alignment,

    /// Padding as a fraction of the trim size, in `[0, 0.5]`.
    pub padding: f64,

    /// Rotate by 90 degrees when that matches the trim aspect better.
    pub auto_rotate: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            fit_mode: FitMode::Contain,
            horizontal: AxisFit::Fill,
            vertical: AxisFit::Fill,
            horizontal_custom: 100.0,
            vertical_custom: 100.0,
            alignment: Alignment::Center,
            padding: 0.0,
            auto_rotate: false,
        }
    }
}

impl FitOptions {
    /// Options taken from a trim's own fit settings.
    pub fn from_trim(trim: &Trim) -> Self {
        Self {
            fit_mode: trim.fit_mode,
            alignment: trim.fit_alignment,
            padding: trim.fit_padding.clamp(0.0, MAX_PADDING),
            auto_rotate: trim.fit_auto_rotate,
            ..Self::default()
        }
    }

    /// The options that apply to `trim`.
    ///
    /// With [`FitMode::FromTrim`] every fit setting comes from the trim, as
    /// in [`FitOptions::from_trim`]; other modes return these options as is.
    pub fn resolved(&self, trim: &Trim) -> FitOptions {
        match self.fit_mode {
            FitMode::FromTrim => FitOptions::from_trim(trim).with_fit_mode(self.fit_mode.resolve(trim)),
            _ => self.clone(),
        }
    }

    /// Set the fit mode.
    pub fn with_fit_mode(mut self, mode: FitMode) -> Self {
        self.fit_mode = mode;
        self
    }

    /// Set the per-axis policies used by [`FitMode::Fill`].
    pub fn with_axes(mut self, horizontal: AxisFit, vertical: AxisFit) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }

    /// Set the custom percentages used by [`AxisFit::Custom`].
    pub fn with_custom(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_custom = horizontal.max(0.0);
        self.vertical_custom = vertical.max(0.0);
        self
    }

    /// Set the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the padding fraction (clamped to `[0, 0.5]`).
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.clamp(0.0, MAX_PADDING);
        self
    }

    /// Enable or disable automatic 90 degree rotation.
    pub fn with_auto_rotate(mut self, enabled: bool) -> Self {
        self.auto_rotate = enabled;
        self
    }

    /// Scale factors mapping `size` into `target` under `mode`.
    ///
    /// `mode` should already be resolved; a remaining `FromTrim` behaves
    /// like `Contain`.
    pub fn scales(&self, size: Vector2<f64>, target: Vector2<f64>, mode: FitMode) -> Vector2<f64> {
        let ratio = target.component_div(&size);
        let contain = ratio.x.min(ratio.y);
        match mode {
            FitMode::Fill => Vector2::new(
                axis_scale(ratio.x, contain, self.horizontal, self.horizontal_custom),
                axis_scale(ratio.y, contain, self.vertical, self.vertical_custom),
            ),
            FitMode::Contain | FitMode::FromTrim => Vector2::repeat(contain),
            FitMode::Cover => Vector2::repeat(ratio.x.max(ratio.y)),
            FitMode::FitWidth => Vector2::repeat(ratio.x),
            FitMode::FitHeight => Vector2::repeat(ratio.y),
            FitMode::None => Vector2::repeat(1.0),
        }
    }
}

fn axis_scale(ratio: f64, contain: f64, fit: AxisFit, custom: f64) -> f64 {
    match fit {
        AxisFit::Fill => ratio,
        AxisFit::Contain => contain,
        AxisFit::Custom => ratio * custom / 100.0,
    }
}

/// `rect` shrunk by `padding` times its size on every side.
pub fn padded_rect(rect: &BoundingBox2d, padding: f64) -> BoundingBox2d {
    let padding = padding.clamp(0.0, MAX_PADDING);
    let px = rect.width() * padding;
    let py = rect.height() * padding;
    BoundingBox2d::new(
        rect.left() + px,
        rect.bottom() + py,
        rect.right() - px,
        rect.top() - py,
    )
}

/// Center of a box of `size` anchored at `alignment` inside `rect`.
pub fn anchor(rect: &BoundingBox2d, size: Vector2<f64>, alignment: Alignment) -> Point2<f64> {
    let x = match alignment.horizontal() {
        -1 => rect.left() + size.x / 2.0,
        1 => rect.right() - size.x / 2.0,
        _ => rect.center().x,
    };
    let y = match alignment.vertical() {
        -1 => rect.bottom() + size.y / 2.0,
        1 => rect.top() - size.y / 2.0,
        _ => rect.center().y,
    };
    Point2::new(x, y)
}

/// Similarity transform placing a set of UVs inside a trim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    /// Center of the source bounds.
    pub from: Point2<f64>,
    /// Rotation about `from`, in radians.
    pub rotation: f64,
    /// Per-axis scale applied after rotation.
    pub scale: Vector2<f64>,
    /// Where `from` ends up.
    pub to: Point2<f64>,
}

impl FitTransform {
    /// Fit `source` bounds into `trim` rotated by `rotation`.
    ///
    /// The scale is computed from the bounds of the rotated source. Returns
    /// `None` when the source has no width or height.
    pub fn compute(
        source: &BoundingBox2d,
        trim: &BoundingBox2d,
        rotation: f64,
        mode: FitMode,
        padding: f64,
        options: &FitOptions,
    ) -> Option<Self> {
        if source.width() <= 0.0 || source.height() <= 0.0 {
            return None;
        }
        let size = source.rotated_size(rotation);
        if size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        let effective = padded_rect(trim, padding);
        let scale = options.scales(size, effective.size(), mode);
        let to = anchor(&effective, size.component_mul(&scale), options.alignment);
        Some(Self {
            from: source.center(),
            rotation,
            scale,
            to,
        })
    }

    /// Map one UV.
    pub fn apply_point(&self, uv: Point2<f64>) -> Point2<f64> {
        let rotated = Rotation2::new(self.rotation) * (uv - self.from);
        self.to + rotated.component_mul(&self.scale)
    }

    /// Map the UVs of `loops` in place.
    pub fn apply(&self, mesh: &mut UvMesh, loops: &[LoopId]) {
        for &l in loops {
            let uv = self.apply_point(mesh.uv(l));
            mesh.set_uv(l, uv);
        }
    }
}

/// Corners counted as selected under `mode`: UV-selected corners, or every
/// corner of a selected visible face.
pub fn selected_loops(mesh: &UvMesh, mode: SelectionMode) -> Vec<LoopId> {
    match mode {
        SelectionMode::UvOnly => mesh
            .loop_ids()
            .filter(|&l| {
                let face = mesh.face(mesh.loop_at(l).face);
                !face.hidden && mesh.loop_at(l).uv_select
            })
            .collect(),
        SelectionMode::Sync => mesh
            .face_ids()
            .filter(|&f| {
                let face = mesh.face(f);
                face.select && !face.hidden
            })
            .flat_map(|f| mesh.face_loops(f))
            .collect(),
    }
}

/// Fit the selected UVs of `mesh` into `trim`.
///
/// Fails with `NoSelection` when nothing is selected and with an invalid
/// parameter error when the selection is thinner than [`MIN_FIT_EXTENT`];
/// nothing is written in either case.
pub fn fit_selection_to_trim(
    mesh: &mut UvMesh,
    trim: &Trim,
    options: &FitOptions,
    mode: SelectionMode,
) -> Result<FitTransform> {
    let loops = selected_loops(mesh, mode);
    if loops.is_empty() {
        return Err(UvError::NoSelection);
    }

    let bounds = BoundingBox2d::from_points(loops.iter().map(|&l| mesh.uv(l)));
    if bounds.width() < MIN_FIT_EXTENT || bounds.height() < MIN_FIT_EXTENT {
        return Err(UvError::invalid_param(
            "selection",
            format!("{:.6}x{:.6}", bounds.width(), bounds.height()),
            "selected UVs have no area",
        ));
    }

    let options = options.resolved(trim);
    let rect = trim.bbox();
    let mut rotation = 0.0;
    if options.auto_rotate {
        let effective = padded_rect(&rect, options.padding);
        let target = effective.width() / effective.height();
        let aspect = bounds.width() / bounds.height();
        let rotated = bounds.height() / bounds.width();
        if (rotated - target).abs() < (aspect - target).abs() {
            rotation = std::f64::consts::FRAC_PI_2;
        }
    }

    let transform = FitTransform::compute(&bounds, &rect, rotation, options.fit_mode, options.padding, &options)
        .ok_or_else(|| UvError::invalid_param("selection", loops.len(), "selected UVs have no area"))?;
    transform.apply(mesh, &loops);

    log::info!("fitted {} UVs to trim '{}'", loops.len(), trim.name);
    Ok(transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use nalgebra::Point3;

    fn quad(width: f64, height: f64) -> UvMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![vec![
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(width, height),
            Point2::new(0.0, height),
        ]];
        build_from_polygons("Quad", &positions, &[vec![0, 1, 2, 3]], Some(&uvs)).unwrap()
    }

    fn uv_bounds(mesh: &UvMesh) -> BoundingBox2d {
        BoundingBox2d::from_points(mesh.loop_ids().map(|l| mesh.uv(l)))
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_scales_by_mode() {
        let options = FitOptions::default();
        let size = Vector2::new(2.0, 1.0);
        let target = Vector2::new(1.0, 1.0);
        assert_eq!(options.scales(size, target, FitMode::Contain), Vector2::repeat(0.5));
        assert_eq!(options.scales(size, target, FitMode::Cover), Vector2::repeat(1.0));
        assert_eq!(options.scales(size, target, FitMode::FitWidth), Vector2::repeat(0.5));
        assert_eq!(options.scales(size, target, FitMode::FitHeight), Vector2::repeat(1.0));
        assert_eq!(options.scales(size, target, FitMode::None), Vector2::repeat(1.0));
        assert_eq!(options.scales(size, target, FitMode::Fill), Vector2::new(0.5, 1.0));

        let custom = options
            .with_axes(AxisFit::Custom, AxisFit::Contain)
            .with_custom(50.0, 100.0);
        assert_eq!(custom.scales(size, target, FitMode::Fill), Vector2::new(0.25, 0.5));
    }

    #[test]
    fn test_from_trim_resolution() {
        let mut trim = Trim::default();
        trim.fit_mode = FitMode::Cover;
        assert_eq!(FitMode::FromTrim.resolve(&trim), FitMode::Cover);
        assert_eq!(FitMode::None.resolve(&trim), FitMode::None);
        trim.fit_mode = FitMode::FromTrim;
        assert_eq!(FitMode::FromTrim.resolve(&trim), FitMode::Contain);
    }

    #[test]
    fn test_inset_modes() {
        let mut trim = Trim::default();
        assert_eq!(InsetMode::Combined.padding(0.1, &trim), 0.1);
        assert_eq!(InsetMode::FromTrim.padding(0.1, &trim), 0.0);
        trim.fit_padding = 0.2;
        assert_eq!(InsetMode::Combined.padding(0.1, &trim), 0.2);
        assert_eq!(InsetMode::Manual.padding(0.1, &trim), 0.1);
    }

    #[test]
    fn test_anchor_corners() {
        let rect = BoundingBox2d::new(0.0, 0.0, 1.0, 1.0);
        let size = Vector2::new(0.2, 0.4);
        assert_eq!(anchor(&rect, size, Alignment::Center), Point2::new(0.5, 0.5));
        assert_eq!(anchor(&rect, size, Alignment::TopLeft), Point2::new(0.1, 0.8));
        assert_eq!(anchor(&rect, size, Alignment::BottomRight), Point2::new(0.9, 0.2));
    }

    #[test]
    fn test_contain_fit_with_padding() {
        let mut mesh = quad(2.0, 1.0);
        mesh.select_all(true);
        let mut trim = Trim::default();
        trim.set_rect(0.0, 1.0, 1.0, 0.0);
        let options = FitOptions::default().with_padding(0.1);

        fit_selection_to_trim(&mut mesh, &trim, &options, SelectionMode::Sync).unwrap();
        let b = uv_bounds(&mesh);
        assert!(close(b.left(), 0.1));
        assert!(close(b.right(), 0.9));
        assert!(close(b.height(), 0.4));
        assert!(close(b.center().y, 0.5));
    }

    #[test]
    fn test_auto_rotate_tall_trim() {
        let mut mesh = quad(2.0, 1.0);
        mesh.select_all(true);
        let mut trim = Trim::default();
        trim.set_rect(0.0, 1.0, 0.25, 0.5);
        let options = FitOptions::default().with_auto_rotate(true);

        let transform = fit_selection_to_trim(&mut mesh, &trim, &options, SelectionMode::Sync).unwrap();
        assert!(close(transform.rotation, std::f64::consts::FRAC_PI_2));
        let b = uv_bounds(&mesh);
        assert!(close(b.width(), 0.25));
        assert!(close(b.height(), 0.5));
    }

    #[test]
    fn test_from_trim_takes_trim_settings() {
        let mut mesh = quad(2.0, 1.0);
        mesh.select_all(true);
        let mut trim = Trim::default();
        trim.set_rect(0.0, 1.0, 1.0, 0.0);
        trim.fit_mode = FitMode::Contain;
        trim.fit_alignment = Alignment::BottomLeft;
        trim.fit_padding = 0.1;
        let options = FitOptions::default()
            .with_fit_mode(FitMode::FromTrim)
            .with_alignment(Alignment::TopRight);

        let resolved = options.resolved(&trim);
        assert_eq!(resolved.fit_mode, FitMode::Contain);
        assert_eq!(resolved.alignment, Alignment::BottomLeft);
        assert_eq!(resolved.padding, 0.1);
        assert_eq!(FitOptions::default().resolved(&trim), FitOptions::default());

        fit_selection_to_trim(&mut mesh, &trim, &options, SelectionMode::Sync).unwrap();
        let b = uv_bounds(&mesh);
        assert!(close(b.left(), 0.1));
        assert!(close(b.bottom(), 0.1));
        assert!(close(b.width(), 0.8));
        assert!(close(b.height(), 0.4));
    }

    #[test]
    fn test_fit_selection_errors() {
        let mut mesh = quad(1.0, 1.0);
        let trim = Trim::default();
        let options = FitOptions::default();
        assert!(matches!(
            fit_selection_to_trim(&mut mesh, &trim, &options, SelectionMode::Sync),
            Err(UvError::NoSelection)
        ));

        let mut flat = quad(1.0, 0.0);
        flat.select_all(true);
        let before = uv_bounds(&flat);
        assert!(fit_selection_to_trim(&mut flat, &trim, &options, SelectionMode::Sync).is_err());
        assert_eq!(uv_bounds(&flat), before);
    }

    #[test]
    fn test_uv_only_reads_loop_selection() {
        let mut mesh = quad(1.0, 1.0);
        assert!(selected_loops(&mesh, SelectionMode::UvOnly).is_empty());
        mesh.set_face_uv_select(crate::mesh::FaceId::new(0), true);
        assert_eq!(selected_loops(&mesh, SelectionMode::UvOnly).len(), 4);
        assert!(selected_loops(&mesh, SelectionMode::Sync).is_empty());
    }
}
