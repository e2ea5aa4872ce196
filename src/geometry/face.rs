use crate::math::{signed_area_xy, triangle_area, Point3, Vector3};

/// An oriented triangle of the receiving surface.
///
/// `normal` need not be unit length. `flow_intensity` is zero until the flux
/// computation sets it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub vertex1: Point3,
    pub vertex2: Point3,
    pub vertex3: Point3,
    pub normal: Vector3,
    pub flow_intensity: f64,
}

impl Face {
    /// Creates a face with zero flow intensity.
    #[must_use]
    pub fn new(vertex1: Point3, vertex2: Point3, vertex3: Point3, normal: Vector3) -> Self {
        Self {
            vertex1,
            vertex2,
            vertex3,
            normal,
            flow_intensity: 0.0,
        }
    }

    /// Mean of the three vertices.
    #[must_use]
    pub fn centroid(&self) -> Point3 {
        Point3::from((self.vertex1.coords + self.vertex2.coords + self.vertex3.coords) / 3.0)
    }

    /// Signed area of the XY projection.
    ///
    /// Only meaningful for faces lying in a plane parallel to XY; see
    /// [`Face::area_3d`] for the orientation-independent area.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_xy(&self.vertex1, &self.vertex2, &self.vertex3)
    }

    /// Unsigned area in 3D.
    #[must_use]
    pub fn area_3d(&self) -> f64 {
        triangle_area(&self.vertex1, &self.vertex2, &self.vertex3)
    }

    /// `flow_intensity * area()`.
    #[must_use]
    pub fn flow(&self) -> f64 {
        self.flow_intensity * self.area()
    }
}
