mod circle;
mod line;
mod spiral;

pub use circle::CircleSource;
pub use line::LineSource;
pub use spiral::SpiralSource;

use crate::error::Result;
use crate::math::Point3;

/// An ordered polyline approximating a continuous curve.
///
/// Consecutive points are joined by straight edges; `segments + 1` points
/// describe `segments` edges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
}

impl Polyline {
    /// Number of straight edges.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Iterates over consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (&Point3, &Point3)> + '_ {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }
}

impl From<Vec<Point3>> for Polyline {
    fn from(points: Vec<Point3>) -> Self {
        Self { points }
    }
}

/// The closed set of current-carrying curve generators.
#[derive(Debug, Clone, PartialEq)]
pub enum CurveSource {
    Line(LineSource),
    Circle(CircleSource),
    Spiral(SpiralSource),
}

impl CurveSource {
    /// Content-derived identifier, `<Kind>.<hash>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters cannot be normalized.
    pub fn name(&self) -> Result<String> {
        match self {
            Self::Line(line) => Ok(line.name()),
            Self::Circle(circle) => circle.name(),
            Self::Spiral(spiral) => spiral.name(),
        }
    }

    /// Discretizes the curve.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment count is zero or the direction and
    /// reference vectors are degenerate.
    pub fn generate(&self) -> Result<Polyline> {
        match self {
            Self::Line(line) => line.generate(),
            Self::Circle(circle) => circle.generate(),
            Self::Spiral(spiral) => spiral.generate(),
        }
    }
}

impl From<LineSource> for CurveSource {
    fn from(source: LineSource) -> Self {
        Self::Line(source)
    }
}

impl From<CircleSource> for CurveSource {
    fn from(source: CircleSource) -> Self {
        Self::Circle(source)
    }
}

impl From<SpiralSource> for CurveSource {
    fn from(source: SpiralSource) -> Self {
        Self::Spiral(source)
    }
}
