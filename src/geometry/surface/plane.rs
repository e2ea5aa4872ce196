use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::face::Face;
use crate::math::{lerp, normalize, require_segments, NameHasher, Point3, Vector3};

/// A rectangle spanned by two in-plane directions around `center`.
///
/// The directions are normalized but not orthogonalized against each other.
/// Every face carries the normal `horizontal x vertical`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub struct PlaneSource {
    #[serde(default = "Point3::origin")]
    pub center: Point3,
    #[serde(rename = "horizontalvector")]
    pub horizontal_vector: Vector3,
    #[serde(rename = "verticalvector")]
    pub vertical_vector: Vector3,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "horizontalslices")]
    pub horizontal_slices: u32,
    #[serde(rename = "verticalslices")]
    pub vertical_slices: u32,
}

impl PlaneSource {
    /// Creates a plane in the XY plane centered on the origin.
    #[must_use]
    pub fn xy(width: f64, height: f64, horizontal_slices: u32, vertical_slices: u32) -> Self {
        Self {
            center: Point3::origin(),
            horizontal_vector: Vector3::x(),
            vertical_vector: Vector3::y(),
            width,
            height,
            horizontal_slices,
            vertical_slices,
        }
    }

    /// Returns a copy with unit in-plane directions.
    ///
    /// # Errors
    ///
    /// Returns an error if either direction is zero-length.
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            horizontal_vector: normalize(&self.horizontal_vector, "horizontalVector")?,
            vertical_vector: normalize(&self.vertical_vector, "verticalVector")?,
            ..self.clone()
        })
    }

    /// Returns `Plane.<hash>` over the normalized parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if normalization fails.
    pub fn name(&self) -> Result<String> {
        let n = self.normalized()?;
        Ok(NameHasher::new()
            .add_vector(&n.center.coords)
            .add_vector(&n.horizontal_vector)
            .add_vector(&n.vertical_vector)
            .add(&n.width)
            .add(&n.height)
            .add(&n.horizontal_slices)
            .add(&n.vertical_slices)
            .name("Plane"))
    }

    /// Emits two triangles per grid cell.
    ///
    /// # Errors
    ///
    /// Returns an error if a slice count is zero or a direction is
    /// zero-length.
    pub fn generate(&self) -> Result<Vec<Face>> {
        require_segments("horizontalSlices", self.horizontal_slices)?;
        require_segments("verticalSlices", self.vertical_slices)?;
        let n = self.normalized()?;
        let normal = normalize(
            &n.horizontal_vector.cross(&n.vertical_vector),
            "plane normal",
        )?;

        let (half_w, half_h) = (n.width / 2.0, n.height / 2.0);
        let hs = f64::from(n.horizontal_slices);
        let vs = f64::from(n.vertical_slices);
        let at = |x: f64, y: f64| n.center + n.horizontal_vector * x + n.vertical_vector * y;

        let mut faces = Vec::with_capacity(2 * n.horizontal_slices as usize * n.vertical_slices as usize);
        for yi in 0..n.vertical_slices {
            let from_y = lerp(-half_h, half_h, f64::from(yi) / vs);
            let to_y = lerp(-half_h, half_h, f64::from(yi + 1) / vs);
            for xi in 0..n.horizontal_slices {
                let from_x = lerp(-half_w, half_w, f64::from(xi) / hs);
                let to_x = lerp(-half_w, half_w, f64::from(xi + 1) / hs);

                faces.push(Face::new(
                    at(from_x, from_y),
                    at(from_x, to_y),
                    at(to_x, from_y),
                    normal,
                ));
                faces.push(Face::new(
                    at(to_x, from_y),
                    at(from_x, to_y),
                    at(to_x, to_y),
                    normal,
                ));
            }
        }
        Ok(faces)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_cell_gives_two_faces() {
        let faces = PlaneSource::xy(2.0, 2.0, 1, 1).generate().unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].vertex1, Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(faces[1].vertex3, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn face_count_and_coverage() {
        let faces = PlaneSource::xy(3.0, 1.5, 4, 5).generate().unwrap();
        assert_eq!(faces.len(), 40);
        let total: f64 = faces.iter().map(Face::area_3d).sum();
        assert_relative_eq!(total, 4.5, epsilon = 1e-12);
    }

    #[test]
    fn normal_is_unit_cross_product() {
        let plane = PlaneSource {
            center: Point3::new(1.0, 0.0, 0.0),
            horizontal_vector: Vector3::new(0.0, 2.0, 0.0),
            vertical_vector: Vector3::new(0.0, 0.0, 3.0),
            width: 1.0,
            height: 1.0,
            horizontal_slices: 2,
            vertical_slices: 2,
        };
        for face in plane.generate().unwrap() {
            assert_relative_eq!(face.normal, Vector3::x());
            assert_relative_eq!(face.vertex1.x, 1.0);
        }
    }

    #[test]
    fn zero_slices_rejected() {
        assert!(PlaneSource::xy(1.0, 1.0, 0, 3).generate().is_err());
        assert!(PlaneSource::xy(1.0, 1.0, 3, 0).generate().is_err());
    }

    #[test]
    fn name_ignores_vector_magnitude() {
        let a = PlaneSource::xy(2.0, 1.0, 3, 3);
        let mut b = a.clone();
        b.horizontal_vector *= 4.0;
        let mut c = a.clone();
        c.width = 2.5;
        assert_eq!(a.name().unwrap(), b.name().unwrap());
        assert_ne!(a.name().unwrap(), c.name().unwrap());
    }
}
