//! Axis-aligned 2D bounding boxes.

use nalgebra::{Point2, Vector2};

/// Relative slack before a box counts as horizontal or vertical.
const ORIENTATION_TOLERANCE: f64 = 1.1;

/// Default tolerance of [`BoundingBox2d::is_circle`].
pub const CIRCLE_TOLERANCE: f64 = 0.1;

/// An axis-aligned rectangle in UV space.
///
/// All derived quantities are computed on construction; the box is
/// immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox2d {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
    aspect: f64,
    aspect_inverted: f64,
}

impl Default for BoundingBox2d {
    /// The unit square.
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

impl BoundingBox2d {
    /// Create a box from its edges.
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Self {
        let width = right - left;
        let height = top - bottom;
        let (aspect, aspect_inverted) = if height > 0.0 {
            let inverted = if width > 0.0 { height / width } else { 1.0 };
            (width / height, inverted)
        } else {
            (1.0, 1.0)
        };
        Self {
            left,
            bottom,
            right,
            top,
            aspect,
            aspect_inverted,
        }
    }

    /// Bounds of a point set, or the unit square when the set is empty.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let (mut min, mut max) = (first, first);
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self::new(min.x, min.y, max.x, max.y)
    }

    // ==================== Accessors ====================

    /// Left edge.
    #[inline]
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    /// Right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.right
    }

    /// Top edge.
    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Lower-left corner.
    #[inline]
    pub fn min(&self) -> Point2<f64> {
        Point2::new(self.left, self.bottom)
    }

    /// Upper-right corner.
    #[inline]
    pub fn max(&self) -> Point2<f64> {
        Point2::new(self.right, self.top)
    }

    /// Width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Width and height as a vector.
    #[inline]
    pub fn size(&self) -> Vector2<f64> {
        Vector2::new(self.width(), self.height())
    }

    /// Width times height.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new(
            self.left + self.width() / 2.0,
            self.bottom + self.height() / 2.0,
        )
    }

    /// Width over height, or 1 for a box without height.
    #[inline]
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Height over width, or 1 for a box without height.
    #[inline]
    pub fn aspect_inverted(&self) -> f64 {
        self.aspect_inverted
    }

    /// Orientation with a 10% tolerance: `Some(true)` when taller than wide,
    /// `Some(false)` when wider than tall, `None` when square-ish.
    pub fn is_vertical(&self) -> Option<bool> {
        let (w, h) = (self.width(), self.height());
        if w > h * ORIENTATION_TOLERANCE {
            Some(false)
        } else if h > w * ORIENTATION_TOLERANCE {
            Some(true)
        } else {
            None
        }
    }

    /// Whether the box is non-empty and its aspect lies within `tolerance` of 1.
    pub fn is_circle(&self, tolerance: f64) -> bool {
        if self.width() == 0.0 || self.height() == 0.0 {
            return false;
        }
        (self.aspect - 1.0).abs() <= tolerance
    }

    /// Unit vector along the longer axis (vertical on ties).
    pub fn longest_axis(&self) -> Vector2<f64> {
        if self.width() > self.height() {
            Vector2::x()
        } else {
            Vector2::y()
        }
    }

    /// Width and height of this box after rotating it by `angle` about its center.
    pub fn rotated_size(&self, angle: f64) -> Vector2<f64> {
        let rot = nalgebra::Rotation2::new(angle);
        let c = self.center();
        let corners = [
            Point2::new(self.left, self.bottom),
            Point2::new(self.right, self.bottom),
            Point2::new(self.right, self.top),
            Point2::new(self.left, self.top),
        ];
        let rotated = corners.map(|p| rot * (p - c));
        let (mut min, mut max) = (rotated[0], rotated[0]);
        for v in &rotated[1..] {
            min = min.inf(v);
            max = max.sup(v);
        }
        max - min
    }
}
