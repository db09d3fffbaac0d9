//! Error types for Strata.

use thiserror::Error;

use crate::ids::BiomeId;

/// Top-level error type for Strata operations.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Biome registration or capability errors
    #[error("Biome error: {0}")]
    Biome(#[from] BiomeError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Biome registry and capability errors.
#[derive(Debug, Error)]
pub enum BiomeError {
    /// A biome with this ID is already registered
    #[error("Biome already registered: {0}")]
    DuplicateBiome(BiomeId),

    /// No biome with this ID is registered
    #[error("Unknown biome: {0}")]
    UnknownBiome(BiomeId),

    /// The registry is empty
    #[error("No biomes registered")]
    NoBiomes,

    /// A biome capability call failed
    #[error("Biome '{biome}' failed: {reason}")]
    Capability {
        /// Biome whose capability failed
        biome: BiomeId,
        /// Failure description
        reason: String,
    },
}

impl BiomeError {
    /// Builds a capability failure for `biome`.
    #[must_use]
    pub fn capability(biome: &BiomeId, reason: impl Into<String>) -> Self {
        Self::Capability {
            biome: biome.clone(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for Strata operations.
pub type StrataResult<T> = Result<T, StrataError>;
