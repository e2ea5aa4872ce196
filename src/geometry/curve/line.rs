use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::{require_segments, NameHasher, Point3};

use super::Polyline;

/// A straight segment from `from` to `to`, split into `segments` edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub struct LineSource {
    pub from: Point3,
    pub to: Point3,
    pub segments: u32,
}

impl LineSource {
    /// Creates a new line source.
    #[must_use]
    pub fn new(from: Point3, to: Point3, segments: u32) -> Self {
        Self { from, to, segments }
    }

    /// Returns `Line.<hash>`.
    #[must_use]
    pub fn name(&self) -> String {
        NameHasher::new()
            .add_vector(&self.from.coords)
            .add_vector(&self.to.coords)
            .add(&self.segments)
            .name("Line")
    }

    /// Interpolates `segments + 1` points between the endpoints inclusive.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero.
    pub fn generate(&self) -> Result<Polyline> {
        require_segments("segments", self.segments)?;
        let n = f64::from(self.segments);
        let points = (0..=self.segments)
            .map(|i| {
                let t = f64::from(i) / n;
                Point3::from(self.from.coords.lerp(&self.to.coords, t))
            })
            .collect();
        Ok(Polyline { points })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn two_segment_line() {
        let line = LineSource::new(Point3::origin(), Point3::new(0.0, 1.0, 0.0), 2);
        let curve = line.generate().unwrap();
        assert_eq!(
            curve.points,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.0, 0.5, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]
        );
    }

    #[test]
    fn endpoints_are_exact() {
        let from = Point3::new(0.3, -1.7, 2.9);
        let to = Point3::new(-4.1, 0.2, 1.0 / 3.0);
        for segments in [1, 2, 7, 100] {
            let curve = LineSource::new(from, to, segments).generate().unwrap();
            assert_eq!(curve.points.len(), segments as usize + 1);
            assert_eq!(curve.points[0], from);
            assert_eq!(*curve.points.last().unwrap(), to);
        }
    }

    #[test]
    fn intermediate_points_are_convex_combinations() {
        let from = Point3::new(1.0, 2.0, 3.0);
        let to = Point3::new(5.0, -2.0, 3.0);
        let curve = LineSource::new(from, to, 4).generate().unwrap();
        for (i, p) in curve.points.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / 4.0;
            let expected = from.coords * (1.0 - t) + to.coords * t;
            assert!((p.coords - expected).norm() < 1e-12);
        }
    }

    #[test]
    fn zero_segments_rejected() {
        let line = LineSource::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 0);
        assert!(line.generate().is_err());
    }

    #[test]
    fn name_tracks_parameters() {
        let a = LineSource::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 10);
        let b = a.clone();
        let mut c = a.clone();
        c.segments = 11;
        assert_eq!(a.name(), b.name());
        assert_ne!(a.name(), c.name());
        assert!(a.name().starts_with("Line."));
    }
}
