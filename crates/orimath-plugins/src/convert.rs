//! Conversion between paper-model and view coordinates.

use thiserror::Error;

/// A point in either model or view space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Maps points between the paper model and the rendered view.
pub trait PointConverter {
    /// Converts a model point to view coordinates.
    fn model_to_view(&self, point: Point) -> Point;

    /// Converts a view point to model coordinates.
    fn view_to_model(&self, point: Point) -> Point;
}

/// Raised when a converter is built with a scale that cannot be inverted.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("view scale must be finite and non-zero, got {scale}")]
pub struct InvalidScale {
    /// Rejected scale factor.
    pub scale: f64,
}

/// Uniform scale followed by a translation.
///
/// # Example
///
/// ```
/// use orimath_plugins::convert::{Point, PointConverter, ViewPointConverter};
///
/// let converter = ViewPointConverter::new(512.0, Point::new(16.0, 16.0))?;
/// assert_eq!(converter.model_to_view(Point::new(0.5, 1.0)), Point::new(272.0, 528.0));
/// # Ok::<(), orimath_plugins::convert::InvalidScale>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPointConverter {
    scale: f64,
    offset: Point,
}

impl ViewPointConverter {
    /// Creates a converter.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScale`] when `scale` is zero, infinite or NaN.
    pub fn new(scale: f64, offset: Point) -> Result<Self, InvalidScale> {
        if !scale.is_normal() {
            return Err(InvalidScale { scale });
        }
        Ok(Self { scale, offset })
    }

    /// Scale factor from model units to view units.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// View-space position of the model origin.
    #[must_use]
    pub const fn offset(&self) -> Point {
        self.offset
    }
}

impl Default for ViewPointConverter {
    /// Identity mapping: model and view coordinates coincide.
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::new(0.0, 0.0),
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "coordinate mapping is inherently floating point"
)]
impl PointConverter for ViewPointConverter {
    fn model_to_view(&self, point: Point) -> Point {
        Point::new(
            point.x.mul_add(self.scale, self.offset.x),
            point.y.mul_add(self.scale, self.offset.y),
        )
    }

    fn view_to_model(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.offset.x) / self.scale,
            (point.y - self.offset.y) / self.scale,
        )
    }
}
