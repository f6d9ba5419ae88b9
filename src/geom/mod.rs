//! 2D geometry primitives shared by the stacking and hotspot engines.

mod bbox;
pub mod color;

pub use bbox::{BoundingBox2d, CIRCLE_TOLERANCE};
pub use color::Rgb;
