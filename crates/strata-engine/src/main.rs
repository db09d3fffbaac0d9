//! # Strata Engine
//!
//! Headless driver for the Strata biome system.
//!
//! Loads `strata.toml` (or the path given as the first argument), registers
//! the sample biomes and walks an agent through the world, logging biome
//! changes and fog transitions. Set `RUST_LOG=strata=debug` to see every
//! event as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use strata_engine::config::{EngineConfig, CONFIG_FILE};
use strata_engine::simulation::Simulation;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("strata=info".parse()?))
        .init();

    info!("Strata starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // An explicit path must load; the default file is optional.
    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_strict(path)?,
        None => EngineConfig::load_from(CONFIG_FILE),
    };

    let mut sim = Simulation::new(config)?;
    info!("World seed: {}", sim.seed());
    for (biome, chunks) in sim.survey() {
        info!("Survey: {biome} covers {chunks} chunks");
    }

    let stats = sim.run();
    info!("Stats: {}", serde_json::to_string(&stats)?);

    info!("Strata shutdown complete");
    Ok(())
}
