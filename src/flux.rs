//! Biot-Savart flux through each face of a triangulated surface.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::{ReductionError, Result};
use crate::geometry::{Face, Polyline};
use crate::math::{pairwise_sum, Point3, Vector3, TOLERANCE};

/// `mu0 / (4 * pi)` in T*m/A.
pub const MU0_OVER_4PI: f64 = 1e-7;

/// Faces processed between progress reports.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Receives progress reports from a running flux computation.
///
/// Called from worker threads; which worker reports a given milestone is
/// unspecified.
pub trait FluxObserver: Sync {
    /// Called each time `processed` reaches a multiple of
    /// [`PROGRESS_INTERVAL`].
    fn on_progress(&self, processed: usize, total: usize);
}

/// Reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl FluxObserver for LogProgress {
    #[allow(clippy::cast_precision_loss)]
    fn on_progress(&self, processed: usize, total: usize) {
        let percent = 100.0 * processed as f64 / total as f64;
        tracing::info!(processed, total, "processed faces ({percent:.2}%)");
    }
}

/// Computes the flux intensity of every face for a current along a curve.
///
/// Faces are processed in parallel; each face's `flow_intensity` is written
/// exactly once.
pub struct ComputeFlux<'a> {
    curve: &'a Polyline,
    current: f64,
    observer: Option<&'a dyn FluxObserver>,
}

impl<'a> ComputeFlux<'a> {
    /// Creates a computation that logs progress through [`LogProgress`].
    #[must_use]
    pub fn new(curve: &'a Polyline, current: f64) -> Self {
        Self {
            curve,
            current,
            observer: Some(&LogProgress),
        }
    }

    /// Replaces the progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn FluxObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Disables progress reporting.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.observer = None;
        self
    }

    /// Sets `flow_intensity` on every face of `mesh`.
    ///
    /// Faces with a zero-length normal have no orientation; they get zero
    /// intensity and are reported in a single warning naming the first one.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve has no segments.
    pub fn execute(&self, mesh: &mut [Face]) -> Result<()> {
        if self.curve.segment_count() == 0 {
            return Err(ReductionError::Empty.into());
        }

        let total = mesh.len();
        let processed = AtomicUsize::new(0);
        let degenerate = AtomicUsize::new(0);
        let first_degenerate = AtomicUsize::new(usize::MAX);

        mesh.par_iter_mut().enumerate().try_for_each(|(index, face)| -> Result<()> {
            let length = face.normal.norm();
            if length < TOLERANCE {
                face.flow_intensity = 0.0;
                degenerate.fetch_add(1, Ordering::Relaxed);
                first_degenerate.fetch_min(index, Ordering::Relaxed);
            } else {
                let field = unit_current_field(self.curve, &face.centroid())?;
                face.flow_intensity = self.current * field.dot(&(face.normal / length));
            }

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % PROGRESS_INTERVAL == 0 {
                if let Some(observer) = self.observer {
                    observer.on_progress(done, total);
                }
            }
            Ok(())
        })?;

        let degenerate = degenerate.into_inner();
        if degenerate > 0 {
            tracing::warn!(
                degenerate,
                first_face = first_degenerate.into_inner(),
                "faces with zero-length normals were given zero flux"
            );
        }
        Ok(())
    }
}

/// Magnetic field at `point` for a unit current along `curve`.
///
/// Each straight edge contributes `mu0/4pi * ds x r / |r|^3` with `r`
/// measured from the edge start; contributions are summed pairwise.
///
/// # Errors
///
/// Returns [`ReductionError::Empty`] if the curve has fewer than two points.
pub fn unit_current_field(curve: &Polyline, point: &Point3) -> Result<Vector3> {
    let contributions: Vec<Vector3> = curve
        .segments()
        .map(|(p, p_next)| {
            let ds = p_next - p;
            let r = point - p;
            ds.cross(&r) * (MU0_OVER_4PI / r.norm_squared().powf(1.5))
        })
        .collect();
    pairwise_sum(contributions)
}

/// Magnetic field at `point` for `current` along `curve`.
///
/// # Errors
///
/// Returns [`ReductionError::Empty`] if the curve has fewer than two points.
pub fn field_at(curve: &Polyline, point: &Point3, current: f64) -> Result<Vector3> {
    Ok(unit_current_field(curve, point)? * current)
}

/// Total flux through the mesh: pairwise sum of [`Face::flow`].
///
/// # Errors
///
/// Returns [`ReductionError::Empty`] if `mesh` is empty.
pub fn net_flux(mesh: &[Face]) -> Result<f64> {
    pairwise_sum(mesh.iter().map(Face::flow).collect())
}
