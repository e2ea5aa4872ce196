//! Magnetic flux of a current-carrying curve through a triangulated surface.
//!
//! A [`Config`] pairs a [`SurfaceSource`] with a [`CurveSource`] and a
//! current. The [`Pipeline`] names the run from its parameters, reuses a
//! cached [`CacheArtifact`] when one exists, and otherwise integrates the
//! Biot-Savart law over every face in parallel.

pub mod cache;
pub mod config;
pub mod error;
pub mod flux;
pub mod geometry;
pub mod math;
pub mod pipeline;

pub use cache::{CacheArtifact, MeshVertex};
pub use config::Config;
pub use error::{MagneplotError, Result};
pub use flux::{ComputeFlux, FluxObserver, LogProgress};
pub use geometry::{CurveSource, Face, Polyline, SurfaceSource};
pub use pipeline::{Pipeline, RunOutput};
