use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::face::Face;
use crate::math::{
    lerp, normalize, orthogonal_reference, require_segments, rotate_about, NameHasher, Point3,
    Vector3,
};

/// The lateral wall of a finite cylinder around `direction`.
///
/// `P(u, s) = center + radius * R(direction, u) * start + s * direction`
/// with `u` in `[0, 2*pi]` and `s` in `[-length/2, length/2]`. No caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub struct CylinderSource {
    #[serde(default = "Point3::origin")]
    pub center: Point3,
    pub direction: Vector3,
    #[serde(default, rename = "starttowards")]
    pub start_towards: Option<Vector3>,
    pub radius: f64,
    pub length: f64,
    #[serde(rename = "rotationalslices")]
    pub rotational_slices: u32,
    #[serde(rename = "verticalslices")]
    pub vertical_slices: u32,
}

impl CylinderSource {
    /// Creates a new cylinder source with a derived start direction.
    #[must_use]
    pub fn new(
        center: Point3,
        direction: Vector3,
        radius: f64,
        length: f64,
        rotational_slices: u32,
        vertical_slices: u32,
    ) -> Self {
        Self {
            center,
            direction,
            start_towards: None,
            radius,
            length,
            rotational_slices,
            vertical_slices,
        }
    }

    /// Sets the reference direction for `u = 0`.
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

    /// Returns `Cilinder.<hash>` over the normalized parameters.
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
            .add(&n.rotational_slices)
            .add(&n.vertical_slices)
            .name("Cilinder"))
    }

    /// Emits two triangles per (angle, axial) cell.
    ///
    /// Each normal is `(v3 - v1) x (v2 - v1)`, pointing away from the axis
    /// and scaled by twice the triangle area.
    ///
    /// # Errors
    ///
    /// Returns an error if a slice count is zero or normalization fails.
    pub fn generate(&self) -> Result<Vec<Face>> {
        require_segments("rotationalSlices", self.rotational_slices)?;
        require_segments("verticalSlices", self.vertical_slices)?;
        let n = self.normalized()?;
        let start = n.start_towards.unwrap_or_else(Vector3::zeros);
        let half = n.length / 2.0;
        let rs = f64::from(n.rotational_slices);
        let vs = f64::from(n.vertical_slices);

        let mut faces =
            Vec::with_capacity(2 * n.rotational_slices as usize * n.vertical_slices as usize);
        for ri in 0..n.rotational_slices {
            let radial1 = rotate_about(&start, &n.direction, TAU * f64::from(ri) / rs) * n.radius;
            let radial2 =
                rotate_about(&start, &n.direction, TAU * f64::from(ri + 1) / rs) * n.radius;

            for si in 0..n.vertical_slices {
                let s1 = n.direction * lerp(-half, half, f64::from(si) / vs);
                let s2 = n.direction * lerp(-half, half, f64::from(si + 1) / vs);

                faces.push(wall_face(
                    n.center + radial1 + s1,
                    n.center + radial1 + s2,
                    n.center + radial2 + s1,
                ));
                faces.push(wall_face(
                    n.center + radial2 + s1,
                    n.center + radial1 + s2,
                    n.center + radial2 + s2,
                ));
            }
        }
        Ok(faces)
    }
}

fn wall_face(v1: Point3, v2: Point3, v3: Point3) -> Face {
    Face::new(v1, v2, v3, (v3 - v1).cross(&(v2 - v1)))
}
