pub mod curve;
pub mod face;
pub mod surface;

pub use curve::{CircleSource, CurveSource, LineSource, Polyline, SpiralSource};
pub use face::Face;
pub use surface::{CylinderSource, ObjFileSource, PlaneSource, SurfaceSource, YawPitchRoll};
