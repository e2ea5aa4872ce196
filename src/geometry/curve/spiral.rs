use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::math::{
    lerp, normalize, orthogonal_reference, require_segments, rotate_about, NameHasher, Point3,
    Vector3, TOLERANCE,
};

use super::Polyline;

/// A constant-radius helix wound around `direction`.
///
/// The axial coordinate `s` runs over `[-length/2, length/2]`; the winding
/// angle is `s * 2*pi / step`, so one full turn advances `step` along the
/// axis. The helix turns from `start_towards` towards
/// `start_towards x direction`: about +Y starting at +X it reaches +Z first,
/// tracing `(cos t * r, t * step / 2pi, sin t * r)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub struct SpiralSource {
    #[serde(default = "Point3::origin")]
    pub center: Point3,
    pub direction: Vector3,
    #[serde(default, rename = "starttowards")]
    pub start_towards: Option<Vector3>,
    pub radius: f64,
    pub length: f64,
    pub step: f64,
    pub segments: u32,
}

impl SpiralSource {
    /// Creates a new helix with a derived start direction.
    #[must_use]
    pub fn new(
        center: Point3,
        direction: Vector3,
        radius: f64,
        length: f64,
        step: f64,
        segments: u32,
    ) -> Self {
        Self {
            center,
            direction,
            start_towards: None,
            radius,
            length,
            step,
            segments,
        }
    }

    /// Sets the reference direction for the winding phase.
    #[must_use]
    pub fn with_start_towards(mut self, start_towards: Vector3) -> Self {
        self.start_towards = Some(start_towards);
        self
    }

    /// Returns a copy with unit, mutually perpendicular `direction` and
    /// `start_towards`.
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

    /// Returns `Spiral.<hash>` over the normalized parameters.
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
            .add(&n.length)
            .add(&n.step)
            .add(&n.segments)
            .name("Spiral"))
    }

    /// Generates `segments + 1` points along the helix.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is zero, `step` is zero, or
    /// normalization fails.
    pub fn generate(&self) -> Result<Polyline> {
        require_segments("segments", self.segments)?;
        if self.step.abs() < TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "step",
                value: self.step,
                min: TOLERANCE,
                max: f64::INFINITY,
            }
            .into());
        }

        let n = self.normalized()?;
        let start = n.start_towards.unwrap_or_else(Vector3::zeros);
        let half = n.length / 2.0;
        let count = f64::from(n.segments);

        let points = (0..=n.segments)
            .map(|i| {
                let s = lerp(-half, half, f64::from(i) / count);
                // Left-handed about `direction`.
                let angle = -s * TAU / n.step;
                n.center + n.direction * s + rotate_about(&start, &n.direction, angle) * n.radius
            })
            .collect();
        Ok(Polyline { points })
    }
}
