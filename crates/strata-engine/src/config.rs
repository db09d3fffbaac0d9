//! Engine configuration.
//!
//! Simulation and biome parameters, loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use strata_biome::BiomeConfig;
use strata_common::{StrataError, StrataResult};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "strata.toml";

/// Event bus slots kept free for tracking and fog events during a spawn pass.
const EVENT_HEADROOM: usize = 8;

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === World Settings ===
    /// World seed (None = random)
    pub world_seed: Option<u64>,

    // === Simulation Settings ===
    /// Simulated milliseconds per tick
    pub tick_ms: f32,
    /// Number of ticks the headless walk runs
    pub simulation_ticks: u32,
    /// Agent walking speed in world units per second
    pub agent_speed: f32,
    /// Chunk radius populated around the agent
    pub spawn_radius: u32,
    /// Ticks between spawn passes
    pub spawn_interval_ticks: u32,
    /// Entities farther than this (world units) are cleaned up
    pub cleanup_radius: f32,
    /// Chunk radius of the biome survey printed at startup
    pub survey_radius: i32,

    // === Biome Settings ===
    /// Biome system configuration
    pub biome: BiomeConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_seed: None,

            tick_ms: 100.0,
            simulation_ticks: 1200,
            agent_speed: 12.0,
            spawn_radius: 2,
            spawn_interval_ticks: 20,
            cleanup_radius: 160.0,
            survey_radius: 16,

            biome: BiomeConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        info!("Loaded config from {}", path.display());
                        config.validate();
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Load configuration from a path, failing on a missing or malformed file.
    pub fn load_strict<P: AsRef<Path>>(path: P) -> StrataResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)
            .map_err(|e| StrataError::Config(format!("{}: {e}", path.display())))?;
        config.validate();
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        if !self.tick_ms.is_finite() {
            self.tick_ms = 100.0;
        }
        self.tick_ms = self.tick_ms.clamp(1.0, 1000.0);
        self.simulation_ticks = self.simulation_ticks.clamp(1, 1_000_000);
        if !self.agent_speed.is_finite() {
            self.agent_speed = 12.0;
        }
        self.agent_speed = self.agent_speed.clamp(0.0, 1000.0);
        self.spawn_interval_ticks = self.spawn_interval_ticks.max(1);
        if !self.cleanup_radius.is_finite() {
            self.cleanup_radius = 160.0;
        }
        self.cleanup_radius = self.cleanup_radius.max(0.0);
        self.survey_radius = self.survey_radius.clamp(0, 256);

        self.biome.validate();

        // A spawn pass publishes up to one event per chunk in the square.
        let chunk_budget = self.biome.event_capacity.saturating_sub(EVENT_HEADROOM);
        let requested = self.spawn_radius.min(16);
        self.spawn_radius = requested;
        while self.spawn_radius > 0 && spawn_square_chunks(self.spawn_radius) > chunk_budget {
            self.spawn_radius -= 1;
        }
        if self.spawn_radius < requested {
            warn!(
                "spawn_radius {requested} exceeds event capacity {}; using {}",
                self.biome.event_capacity, self.spawn_radius
            );
        }
    }
}

/// Chunks in the square dispatched around the agent.
fn spawn_square_chunks(radius: u32) -> usize {
    let side = 2 * radius as usize + 1;
    side * side
}
