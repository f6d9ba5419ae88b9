//! Trim rectangles and the trimsheet that holds them.
//!
//! A [`Trim`] is one tile of a texture atlas, stored as edges in normalized
//! UV space. A [`Trimsheet`] is the ordered list of trims of one material,
//! with an active index and per-trim selection flags.

mod svg;

pub use svg::{load_svg, parse_svg, save_svg, to_svg};

use nalgebra::Point2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UvError};
use crate::geom::color::hsv_to_rgb;
use crate::geom::{BoundingBox2d, Rgb};
use crate::hotspot::{Alignment, FitMode};

/// Offset of a duplicated trim from its source, on every edge.
const DUPLICATE_OFFSET: f64 = 0.05;

/// Outline of a trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrimShape {
    /// Axis-aligned rectangle.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the bounds.
    Circle,
}

/// A named rectangle of UV space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trim {
    /// Display name, also the SVG `id`.
    pub name: String,
    /// Outline.
    pub shape: TrimShape,
    /// Left edge.
    pub left: f64,
    /// Bottom edge.
    pub bottom: f64,
    /// Right edge.
    pub right: f64,
    /// Top edge.
    pub top: f64,
    /// Fill color.
    pub color: Rgb,
    /// Selection state in the trim list.
    pub selected: bool,
    /// Disabled trims are not exported.
    pub enabled: bool,
    /// Locked trims are not edited interactively.
    pub locked: bool,
    /// Free-form tag, e.g. `wood` or `radial`.
    pub tag: String,
    /// Category used by hotspot filtering.
    pub category: String,
    /// Fit mode used by [`FitMode::FromTrim`].
    pub fit_mode: FitMode,
    /// Alignment used by [`crate::hotspot::FitOptions::from_trim`].
    pub fit_alignment: Alignment,
    /// Padding fraction used by the `FROM_TRIM` and `COMBINED` inset modes.
    pub fit_padding: f64,
    /// Auto-rotate setting used by [`crate::hotspot::FitOptions::from_trim`].
    pub fit_auto_rotate: bool,
    /// Real-world width, 0 when unknown.
    pub world_size_x: f64,
    /// Real-world height, 0 when unknown.
    pub world_size_y: f64,
}

impl Default for Trim {
    fn default() -> Self {
        Self {
            name: "Trim".to_string(),
            shape: TrimShape::Rectangle,
            left: 0.0,
            bottom: 0.0,
            right: 1.0,
            top: 1.0,
            color: [0.0, 0.5, 0.0],
            selected: false,
            enabled: true,
            locked: false,
            tag: String::new(),
            category: String::new(),
            fit_mode: FitMode::Contain,
            fit_alignment: Alignment::Center,
            fit_padding: 0.0,
            fit_auto_rotate: false,
            world_size_x: 0.0,
            world_size_y: 0.0,
        }
    }
}

impl Trim {
    /// A rectangular trim with the given name and bounds.
    pub fn new(name: impl Into<String>, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        let mut trim = Self {
            name: name.into(),
            ..Self::default()
        };
        trim.set_rect(left, top, right, bottom);
        trim
    }

    /// Set all four edges, swapping them where needed so that
    /// `left <= right` and `bottom <= top`.
    pub fn set_rect(&mut self, left: f64, top: f64, right: f64, bottom: f64) {
        self.left = left.min(right);
        self.right = left.max(right);
        self.top = top.max(bottom);
        self.bottom = top.min(bottom);
    }

    /// Make this a circle trim. The bounds are clamped to the unit square.
    pub fn set_circle(&mut self, center: Point2<f64>, radius_x: f64, radius_y: f64) {
        self.shape = TrimShape::Circle;
        self.left = (center.x - radius_x).max(0.0);
        self.right = (center.x + radius_x).min(1.0);
        self.bottom = (center.y - radius_y).max(0.0);
        self.top = (center.y + radius_y).min(1.0);
    }

    /// Bounds as a box.
    pub fn bbox(&self) -> BoundingBox2d {
        BoundingBox2d::new(self.left, self.bottom, self.right, self.top)
    }

    /// Width of the bounds.
    pub fn width(&self) -> f64 {
        (self.right - self.left).abs()
    }

    /// Height of the bounds.
    pub fn height(&self) -> f64 {
        (self.top - self.bottom).abs()
    }

    /// Whether the outline is a circle.
    pub fn is_circle(&self) -> bool {
        self.shape == TrimShape::Circle
    }

    /// Real-world area, when both world sizes are known.
    pub fn world_area(&self) -> Option<f64> {
        (self.world_size_x > 0.0 && self.world_size_y > 0.0)
            .then(|| self.world_size_x * self.world_size_y)
    }
}

/// Direction for [`Trimsheet::move_active`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Towards the start of the list.
    Up,
    /// Towards the end of the list.
    Down,
}

/// Random trim color: a random HSV color with saturation clamped to
/// `[0.3, 0.7]` and value clamped to `[0.4, 0.7]`.
pub fn random_trim_color<R: Rng>(rng: &mut R) -> Rgb {
    let h: f64 = rng.random();
    let s: f64 = rng.random();
    let v: f64 = rng.random();
    hsv_to_rgb(h, s.clamp(0.3, 0.7), v.clamp(0.4, 0.7))
}

/// The ordered trims of one material.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trimsheet {
    trims: Vec<Trim>,
    active_index: Option<usize>,
}

impl Trimsheet {
    /// Create an empty trimsheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing trims. No trim is active.
    pub fn from_trims(trims: Vec<Trim>) -> Self {
        Self {
            trims,
            active_index: None,
        }
    }

    // ==================== Accessors ====================

    /// Number of trims.
    pub fn len(&self) -> usize {
        self.trims.len()
    }

    /// Whether the sheet has no trims.
    pub fn is_empty(&self) -> bool {
        self.trims.is_empty()
    }

    /// All trims in list order.
    pub fn trims(&self) -> &[Trim] {
        &self.trims
    }

    /// Trim at `index`.
    pub fn get(&self, index: usize) -> Option<&Trim> {
        self.trims.get(index)
    }

    /// Trim at `index`, for editing.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Trim> {
        self.trims.get_mut(index)
    }

    /// Index of the active trim.
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// The active trim.
    pub fn active(&self) -> Option<&Trim> {
        self.active_index.and_then(|i| self.trims.get(i))
    }

    /// Selected trims in list order.
    pub fn selected_trims(&self) -> Vec<&Trim> {
        self.trims.iter().filter(|t| t.selected).collect()
    }

    /// Enabled trims in list order.
    pub fn enabled_trims(&self) -> Vec<&Trim> {
        self.trims.iter().filter(|t| t.enabled).collect()
    }

    // ==================== Editing ====================

    /// Append a trim, making it the only selected one and active.
    pub fn push(&mut self, mut trim: Trim) -> usize {
        self.deselect_all();
        trim.selected = true;
        self.trims.push(trim);
        let index = self.trims.len() - 1;
        self.active_index = Some(index);
        index
    }

    /// Add a centered trim named `Trim.NNN` with a random color.
    ///
    /// `NNN` counts the trims whose name starts with `Trim`, including the
    /// new one.
    pub fn add_trim<R: Rng>(&mut self, rng: &mut R) -> usize {
        let count = self.trims.iter().filter(|t| t.name.starts_with("Trim")).count() + 1;
        let mut trim = Trim::new(format!("Trim.{:03}", count), 0.25, 0.75, 0.75, 0.25);
        trim.color = random_trim_color(rng);
        self.push(trim)
    }

    /// Remove the active trim. The next trim (or the new last one) becomes
    /// active.
    pub fn remove_active(&mut self) -> Option<Trim> {
        let index = self.active_index.filter(|&i| i < self.trims.len())?;
        let removed = self.trims.remove(index);
        self.active_index = if self.trims.is_empty() {
            None
        } else {
            Some(index.min(self.trims.len() - 1))
        };
        Some(removed)
    }

    /// Copy the active trim with `.001` appended to its name and every edge
    /// shifted by 0.05. Returns the index of the copy.
    pub fn duplicate_active(&mut self) -> Option<usize> {
        let source = self.active()?;
        let mut copy = source.clone();
        copy.name = format!("{}.001", source.name);
        copy.set_rect(
            source.left + DUPLICATE_OFFSET,
            source.top + DUPLICATE_OFFSET,
            source.right + DUPLICATE_OFFSET,
            source.bottom + DUPLICATE_OFFSET,
        );
        Some(self.push(copy))
    }

    /// Select only the trim at `index` and make it active.
    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.trims.len() {
            return Err(UvError::invalid_param("index", index, "no trim at this index"));
        }
        self.deselect_all();
        self.trims[index].selected = true;
        self.active_index = Some(index);
        Ok(())
    }

    /// Deselect every trim.
    pub fn deselect_all(&mut self) {
        for trim in &mut self.trims {
            trim.selected = false;
        }
    }

    /// Move the active trim one place. Returns the new active index.
    pub fn move_active(&mut self, direction: MoveDirection) -> Option<usize> {
        let index = self.active_index.filter(|&i| i < self.trims.len())?;
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.trims.len() => index + 1,
            _ => index,
        };
        self.trims.swap(index, target);
        self.active_index = Some(target);
        Some(target)
    }

    /// Remove every trim. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.trims.len();
        self.trims.clear();
        self.active_index = None;
        count
    }

    /// Set the tag of the trim at `index`.
    pub fn set_tag(&mut self, index: usize, tag: impl Into<String>) -> Result<()> {
        self.require_mut(index)?.tag = tag.into();
        Ok(())
    }

    /// Set the fit alignment of the trim at `index`.
    pub fn set_alignment(&mut self, index: usize, alignment: Alignment) -> Result<()> {
        self.require_mut(index)?.fit_alignment = alignment;
        Ok(())
    }

    /// Append imported trims without touching selection.
    pub fn extend(&mut self, trims: impl IntoIterator<Item = Trim>) {
        self.trims.extend(trims);
    }

    fn require_mut(&mut self, index: usize) -> Result<&mut Trim> {
        self.trims
            .get_mut(index)
            .ok_or_else(|| UvError::invalid_param("index", index, "no trim at this index"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_set_rect_normalizes() {
        let mut trim = Trim::default();
        trim.set_rect(0.8, 0.1, 0.2, 0.6);
        assert_eq!((trim.left, trim.bottom, trim.right, trim.top), (0.2, 0.1, 0.8, 0.6));
    }

    #[test]
    fn test_set_circle_clamps() {
        let mut trim = Trim::default();
        trim.set_circle(Point2::new(0.1, 0.5), 0.2, 0.2);
        assert!(trim.is_circle());
        assert_eq!(trim.left, 0.0);
        assert!((trim.right - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_add_trim_names_and_colors() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sheet = Trimsheet::new();
        sheet.add_trim(&mut rng);
        let second = sheet.add_trim(&mut rng);
        assert_eq!(second, 1);
        assert_eq!(sheet.get(1).unwrap().name, "Trim.002");
        assert_eq!(sheet.active_index(), Some(1));
        assert_eq!(sheet.selected_trims().len(), 1);

        let trim = sheet.get(0).unwrap();
        assert_eq!((trim.left, trim.right), (0.25, 0.75));
        let max = trim.color.iter().cloned().fold(0.0, f64::max);
        assert!((0.4..=0.7 + 1e-12).contains(&max));
    }

    #[test]
    fn test_duplicate_and_remove() {
        let mut sheet = Trimsheet::new();
        sheet.push(Trim::new("Wood", 0.0, 0.5, 0.5, 0.0));
        let copy = sheet.duplicate_active().unwrap();
        let trim = sheet.get(copy).unwrap();
        assert_eq!(trim.name, "Wood.001");
        assert!((trim.left - 0.05).abs() < 1e-12);
        assert!((trim.top - 0.55).abs() < 1e-12);

        assert_eq!(sheet.remove_active().unwrap().name, "Wood.001");
        assert_eq!(sheet.active_index(), Some(0));
        sheet.remove_active();
        assert_eq!(sheet.active_index(), None);
        assert!(sheet.remove_active().is_none());
    }

    #[test]
    fn test_move_active() {
        let mut sheet = Trimsheet::from_trims(vec![
            Trim::new("A", 0.0, 1.0, 1.0, 0.0),
            Trim::new("B", 0.0, 1.0, 1.0, 0.0),
        ]);
        assert!(sheet.move_active(MoveDirection::Up).is_none());
        sheet.select(0).unwrap();
        assert_eq!(sheet.move_active(MoveDirection::Up), Some(0));
        assert_eq!(sheet.move_active(MoveDirection::Down), Some(1));
        assert_eq!(sheet.get(1).unwrap().name, "A");
        assert_eq!(sheet.move_active(MoveDirection::Down), Some(1));
    }

    #[test]
    fn test_tag_alignment_and_clear() {
        let mut sheet = Trimsheet::from_trims(vec![Trim::default()]);
        sheet.set_tag(0, "radial").unwrap();
        sheet.set_alignment(0, Alignment::TopLeft).unwrap();
        assert_eq!(sheet.get(0).unwrap().tag, "radial");
        assert!(sheet.set_tag(3, "x").is_err());
        assert!(sheet.select(3).is_err());
        assert_eq!(sheet.clear(), 1);
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_world_area() {
        let mut trim = Trim::default();
        assert_eq!(trim.world_area(), None);
        trim.world_size_x = 2.0;
        trim.world_size_y = 0.5;
        assert_eq!(trim.world_area(), Some(1.0));
    }
}
