mod cylinder;
mod obj_file;
mod plane;

pub use cylinder::CylinderSource;
pub use obj_file::{ObjFileSource, YawPitchRoll};
pub use plane::PlaneSource;

use crate::error::Result;

use super::face::Face;

/// The closed set of receiving-surface generators.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceSource {
    Plane(PlaneSource),
    Cylinder(CylinderSource),
    ObjFile(ObjFileSource),
}

impl SurfaceSource {
    /// Content-derived identifier, `<Kind>.<hash>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters cannot be normalized.
    pub fn name(&self) -> Result<String> {
        match self {
            Self::Plane(plane) => plane.name(),
            Self::Cylinder(cylinder) => cylinder.name(),
            Self::ObjFile(obj) => Ok(obj.name()),
        }
    }

    /// Triangulates the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if a slice count is zero, vectors are degenerate, or
    /// an external mesh cannot be loaded.
    pub fn generate(&self) -> Result<Vec<Face>> {
        match self {
            Self::Plane(plane) => plane.generate(),
            Self::Cylinder(cylinder) => cylinder.generate(),
            Self::ObjFile(obj) => obj.generate(),
        }
    }
}

impl From<PlaneSource> for SurfaceSource {
    fn from(source: PlaneSource) -> Self {
        Self::Plane(source)
    }
}

impl From<CylinderSource> for SurfaceSource {
    fn from(source: CylinderSource) -> Self {
        Self::Cylinder(source)
    }
}

impl From<ObjFileSource> for SurfaceSource {
    fn from(source: ObjFileSource) -> Self {
        Self::ObjFile(source)
    }
}
