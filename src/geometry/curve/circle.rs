use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::{
    normalize, orthogonal_reference, require_segments, rotate_about, NameHasher, Point3, Vector3,
};

use super::Polyline;

/// A full circle around `direction`, starting towards `start_towards`.
///
/// `P(t) = center + radius * R(direction, 2*pi*t) * start`, `t` in `[0, 1]`.
/// The first and last points coincide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub struct CircleSource {
    #[serde(default = "Point3::origin")]
    pub center: Point3,
    pub direction: Vector3,
    #[serde(default, rename = "starttowards")]
    pub start_towards: Option<Vector3>,
    pub radius: f64,
    pub segments: u32,
}

impl CircleSource {
    /// Creates a new circle source with a derived start direction.
    #[must_use]
    pub fn new(center: Point3, direction: Vector3, radius: f64, segments: u32) -> Self {
        Self {
            center,
            direction,
            start_towards: None,
            radius,
            segments,
        }
    }

    /// Sets the reference direction for the first point.
    #[must_use]
    pub fn with_start_towards(mut self, start_towards: Vector3) -> Self {
        self.start_towards = Some(start_towards);
        self
    }

    /// Returns a copy with a unit `direction` and a unit `start_towards`
    /// perpendicular to it.
    ///
    /// # Errors
    ///
    /// Returns an error if `direction` is zero or `start_towards` is nearly
    /// parallel to it.
    pub fn normalized(&self) -> Result<Self> {
        let direction = normalize(&self.direction, "direction")?;
        let start = orthogonal_reference(
            &direction,
            self.start_towards.as_ref(),
            ("startTowards", "direction"),
        )?;
        Ok(Self {
            direction,
            start_towards: Some(start),
            ..self.clone()
        })
    }

    /// Returns `Circum.<hash>` over the normalized parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if normalization fails.
    pub fn name(&self) -> Result<String> {
        let n = self.normalized()?;
        let start = n.start_towards.unwrap_or_else(Vector3::zeros);
        Ok(NameHasher::new()
            .add_vector(&n.center.coords)
            .add_vector(&n.direction)
            .add_vector(&start)
            .add(&n.radius)
            .add(&n.segments)
            .name("Circum"))
    }

    /// Generates `segments + 1` points over a full turn.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero or normalization fails.
    pub fn generate(&self) -> Result<Polyline> {
        require_segments("segments", self.segments)?;
        let n = self.normalized()?;
        let start = n.start_towards.unwrap_or_else(Vector3::zeros);
        let count = f64::from(n.segments);

        let points = (0..=n.segments)
            .map(|i| {
                let angle = TAU * f64::from(i) / count;
                n.center + rotate_about(&start, &n.direction, angle) * n.radius
            })
            .collect();
        Ok(Polyline { points })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{GeometryError, MagneplotError};

    #[test]
    fn closed_loop() {
        let c = CircleSource::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 0.0), 2.5, 64);
        let curve = c.generate().unwrap();
        assert_eq!(curve.points.len(), 65);
        let first = curve.points[0];
        let last = curve.points[64];
        assert!((first - last).norm() < 1e-9);
    }

    #[test]
    fn points_lie_on_circle() {
        let center = Point3::new(0.5, -1.0, 2.0);
        let dir = Vector3::new(0.0, 3.0, 4.0);
        let c = CircleSource::new(center, dir, 1.5, 16);
        let axis = dir.normalize();
        for p in c.generate().unwrap().points {
            let offset = p - center;
            assert!((offset.norm() - 1.5).abs() < 1e-12);
            assert!(offset.dot(&axis).abs() < 1e-12);
        }
    }

    #[test]
    fn starts_towards_reference() {
        let c = CircleSource::new(Point3::origin(), Vector3::z(), 2.0, 4)
            .with_start_towards(Vector3::new(0.0, 5.0, 1.0));
        let curve = c.generate().unwrap();
        assert!((curve.points[0] - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
        // Quarter turn about +Z takes +Y to -X.
        assert!((curve.points[1] - Point3::new(-2.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn parallel_reference_rejected() {
        let c = CircleSource::new(Point3::origin(), Vector3::z(), 1.0, 8)
            .with_start_towards(Vector3::new(0.1, 0.0, -2.0));
        assert!(matches!(
            c.generate(),
            Err(MagneplotError::Geometry(GeometryError::ParallelReference { .. }))
        ));
        assert!(c.name().is_err());
    }

    #[test]
    fn name_ignores_vector_magnitude() {
        let a = CircleSource::new(Point3::origin(), Vector3::z(), 1.0, 8)
            .with_start_towards(Vector3::x());
        let b = CircleSource::new(Point3::origin(), Vector3::z() * 7.0, 1.0, 8)
            .with_start_towards(Vector3::x() * 0.25);
        assert_eq!(a.name().unwrap(), b.name().unwrap());
    }

    #[test]
    fn name_changes_with_radius() {
        let a = CircleSource::new(Point3::origin(), Vector3::z(), 1.0, 8);
        let b = CircleSource::new(Point3::origin(), Vector3::z(), 1.25, 8);
        assert_ne!(a.name().unwrap(), b.name().unwrap());
    }
}
