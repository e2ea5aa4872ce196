//! Computes (or reuses) the flux for a JSON configuration.
//!
//! `cargo run --example generate -- [config.json] [cache dir]`
//!
//! Without a configuration file the plane preset is used.

use std::path::PathBuf;

use magneplot::{Config, MagneplotError, Pipeline};

fn main() -> Result<(), MagneplotError> {
    // Default: WARN for everything, INFO for magneplot.
    // Override with RUST_LOG env var (e.g. RUST_LOG=magneplot=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("generate=info".parse().unwrap_or_default())
        .add_directive("magneplot=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => Config::from_path(&PathBuf::from(path))?,
        None => Config::plane_preset(),
    };
    let cache_dir = args.next().map_or_else(|| PathBuf::from("models"), PathBuf::from);

    let out = Pipeline::new(cache_dir).run(&config)?;
    tracing::info!(
        path = %out.path.display(),
        from_cache = out.from_cache,
        faces = out.artifact.mesh.len(),
        curve_points = out.artifact.curve.points.len(),
        "net flux {}",
        out.artifact.net_flux
    );
    Ok(())
}
