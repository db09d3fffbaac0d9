//! Biome system configuration.
//!
//! All durations are milliseconds of simulation time supplied through
//! `delta_ms`; nothing here reads the wall clock except the tracker's
//! diagnostic throttle.

use serde::{Deserialize, Serialize};

/// Chunks per region side. Every chunk in a `4x4` block shares one biome.
pub const DEFAULT_REGION_SIZE: i32 = 4;

/// World units per chunk side.
pub const DEFAULT_CHUNK_SIZE: f32 = 16.0;

/// Timings that drive the fog state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogTimings {
    /// Duration of a fog fade-in.
    pub fade_in_ms: f32,
    /// Duration of a fog fade-out.
    pub fade_out_ms: f32,
    /// Duration of a switch between two fog types.
    pub type_transition_ms: f32,
    /// Re-check throttle while the fog is stable.
    pub check_interval_ms: f32,
    /// Settling window after a transition completes.
    pub settle_ms: f32,
}

impl Default for FogTimings {
    fn default() -> Self {
        Self {
            fade_in_ms: 10_000.0,
            fade_out_ms: 5_000.0,
            type_transition_ms: 500.0,
            check_interval_ms: 1_000.0,
            settle_ms: 3_000.0,
        }
    }
}

impl FogTimings {
    /// Clamp timings to usable ranges. Timed transitions must be positive.
    pub fn validate(&mut self) {
        self.fade_in_ms = self.fade_in_ms.clamp(1.0, 120_000.0);
        self.fade_out_ms = self.fade_out_ms.clamp(1.0, 120_000.0);
        self.type_transition_ms = self.type_transition_ms.clamp(1.0, 120_000.0);
        self.check_interval_ms = self.check_interval_ms.clamp(0.0, 60_000.0);
        self.settle_ms = self.settle_ms.clamp(0.0, 60_000.0);
    }
}

/// Configuration of the biome system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    /// World units per chunk side.
    pub chunk_size: f32,
    /// Chunks per region side.
    pub region_size: i32,
    /// Minimum seconds between player-biome diagnostic log lines.
    pub diagnostic_interval_secs: f32,
    /// Capacity of the biome event channel.
    pub event_capacity: usize,
    /// Fog state machine timings.
    pub fog: FogTimings,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            region_size: DEFAULT_REGION_SIZE,
            diagnostic_interval_secs: 5.0,
            event_capacity: 256,
            fog: FogTimings::default(),
        }
    }
}

impl BiomeConfig {
    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        if !self.chunk_size.is_finite() {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        self.chunk_size = self.chunk_size.clamp(1.0, 4096.0);
        self.region_size = self.region_size.clamp(1, 256);
        self.fog.validate();
        self.diagnostic_interval_secs = self.diagnostic_interval_secs.clamp(0.0, 3600.0);
        self.event_capacity = self.event_capacity.clamp(16, 65_536);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BiomeConfig::default();
        assert_eq!(config.region_size, 4);
        assert!((config.fog.fade_in_ms - 10_000.0).abs() < f32::EPSILON);
        assert!((config.fog.fade_out_ms - 5_000.0).abs() < f32::EPSILON);
        assert!((config.fog.type_transition_ms - 500.0).abs() < f32::EPSILON);
        assert!((config.fog.check_interval_ms - 1_000.0).abs() < f32::EPSILON);
        assert!((config.fog.settle_ms - 3_000.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = BiomeConfig {
            chunk_size: f32::NAN,
            region_size: 0,
            event_capacity: 1,
            ..Default::default()
        };
        config.fog.fade_in_ms = 0.0;
        config.fog.check_interval_ms = -5.0;

        config.validate();

        assert!((config.chunk_size - DEFAULT_CHUNK_SIZE).abs() < f32::EPSILON);
        assert_eq!(config.region_size, 1);
        assert_eq!(config.event_capacity, 16);
        assert!((config.fog.fade_in_ms - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.fog.check_interval_ms, 0.0);
    }
}
