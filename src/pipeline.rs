use std::path::{Path, PathBuf};

use crate::cache::{CacheArtifact, CACHE_EXTENSION};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::flux::{net_flux, ComputeFlux, FluxObserver, LogProgress};

/// Result of [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Net flux, curve and per-face flux.
    pub artifact: CacheArtifact,
    /// Where the artifact lives.
    pub path: PathBuf,
    /// Whether the artifact was read instead of computed.
    pub from_cache: bool,
}

/// Turns a [`Config`] into a [`CacheArtifact`], reusing earlier results.
///
/// An existing file at `<cache_dir>/<config name>.mobj` is trusted as is.
/// Otherwise the surface and curve are generated, the flux is computed and
/// the artifact is written once the computation has finished.
pub struct Pipeline<'a> {
    cache_dir: PathBuf,
    observer: Option<&'a dyn FluxObserver>,
}

impl<'a> Pipeline<'a> {
    /// Creates a pipeline storing artifacts under `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            observer: Some(&LogProgress),
        }
    }

    /// Replaces the flux progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn FluxObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Disables flux progress reporting.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.observer = None;
        self
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the artifact for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be named.
    pub fn artifact_path(&self, config: &Config) -> Result<PathBuf> {
        Ok(self
            .cache_dir
            .join(format!("{}.{CACHE_EXTENSION}", config.name()?)))
    }

    /// Loads or computes the artifact for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if generation, computation or cache I/O fails.
    pub fn run(&self, config: &Config) -> Result<RunOutput> {
        let path = self.artifact_path(config)?;

        if path.exists() {
            tracing::info!(path = %path.display(), "reading cached result");
            let artifact = CacheArtifact::load(&path)?;
            return Ok(RunOutput {
                artifact,
                path,
                from_cache: true,
            });
        }

        tracing::info!(path = %path.display(), "no cached result, generating");
        let artifact = self.compute(config)?;

        std::fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::Io {
            path: self.cache_dir.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "saving result");
        artifact.save(&path)?;

        Ok(RunOutput {
            artifact,
            path,
            from_cache: false,
        })
    }

    /// Generates geometry and computes the flux without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if generation or computation fails.
    pub fn compute(&self, config: &Config) -> Result<CacheArtifact> {
        let mut mesh = config.model.generate()?;
        tracing::info!(faces = mesh.len(), "generated surface");

        let curve = config.curve.generate()?;
        tracing::info!(segments = curve.segment_count(), "generated curve");

        let mut flux = ComputeFlux::new(&curve, config.current).quiet();
        if let Some(observer) = self.observer {
            flux = flux.with_observer(observer);
        }
        flux.execute(&mut mesh)?;

        let net_flux = net_flux(&mesh)?;
        tracing::info!(net_flux, "flux computed");

        Ok(CacheArtifact {
            net_flux,
            curve,
            mesh,
        })
    }
}
