use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for magneplot.
#[derive(Debug, Error)]
pub enum MagneplotError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Reduction(#[from] ReductionError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors raised while decoding a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("{section} type `{tag}` is not implemented")]
    NotImplemented { section: &'static str, tag: String },

    #[error("invalid {section} `{tag}` configuration: {source}")]
    Invalid {
        section: &'static str,
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors related to geometry generation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("the {reference} vector must not be parallel to the {direction} vector")]
    ParallelReference {
        reference: &'static str,
        direction: &'static str,
    },

    #[error("zero-length {0} vector")]
    ZeroVector(&'static str),

    #[error("could not load mesh {path}: {source}")]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("mesh {0} has no vertex normals; enable normal overriding to derive them")]
    MissingNormals(PathBuf),
}

/// Errors raised by numeric reductions.
#[derive(Debug, Error)]
pub enum ReductionError {
    #[error("cannot sum an empty sequence")]
    Empty,
}

/// Errors related to reading and writing cache artifacts.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache stream I/O failed: {0}")]
    Stream(#[from] std::io::Error),

    #[error("malformed cache artifact at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("malformed triangle section: {0}")]
    Triangles(#[from] tobj::LoadError),
}

/// Convenience type alias for results using [`MagneplotError`].
pub type Result<T> = std::result::Result<T, MagneplotError>;
