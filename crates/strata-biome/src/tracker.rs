//! Resolves the biome under the agent.

use std::time::{Duration, Instant};

use glam::Vec3;
use strata_common::{BiomeId, ChunkCoord};
use tracing::debug;

use crate::assigner::SpatialBiomeAssigner;
use crate::registry::BiomeRegistry;

/// Change of the tracked biome between two updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiomeChange {
    /// Biome left.
    pub from: Option<BiomeId>,
    /// Biome entered.
    pub to: Option<BiomeId>,
}

/// Tracks which biome the agent stands in.
#[derive(Debug, Clone)]
pub struct PlayerBiomeTracker {
    chunk_size: f32,
    current: Option<BiomeId>,
    diagnostic_interval: Duration,
    last_report: Option<Instant>,
}

impl PlayerBiomeTracker {
    /// Create a tracker for a chunk size in world units.
    #[must_use]
    pub fn new(chunk_size: f32, diagnostic_interval_secs: f32) -> Self {
        Self {
            chunk_size,
            current: None,
            diagnostic_interval: Duration::try_from_secs_f32(diagnostic_interval_secs).unwrap_or_default(),
            last_report: None,
        }
    }

    /// Biome recorded by the last [`track`](Self::track).
    #[must_use]
    pub fn current(&self) -> Option<&BiomeId> {
        self.current.as_ref()
    }

    /// Chunk containing a world position.
    #[must_use]
    pub fn chunk_at(&self, position: Vec3) -> ChunkCoord {
        ChunkCoord::from_world(position, self.chunk_size)
    }

    /// Resolve the biome at the agent position.
    pub fn get_player_biome(
        &mut self,
        position: Vec3,
        assigner: &mut SpatialBiomeAssigner,
        registry: &BiomeRegistry,
    ) -> Option<BiomeId> {
        let chunk = self.chunk_at(position);
        let biome = assigner.biome_id_for_chunk(chunk, registry);

        let now = Instant::now();
        let due = self
            .last_report
            .map_or(true, |last| now.duration_since(last) >= self.diagnostic_interval);
        if due {
            self.last_report = Some(now);
            debug!(
                "Agent at ({:.1}, {:.1}) chunk ({}, {}) biome={:?}",
                position.x,
                position.z,
                chunk.x,
                chunk.z,
                biome.as_ref().map(BiomeId::as_str)
            );
        }
        biome
    }

    /// Resolve and record the agent biome, returning the change if it moved
    /// into a different biome.
    pub fn track(
        &mut self,
        position: Vec3,
        assigner: &mut SpatialBiomeAssigner,
        registry: &BiomeRegistry,
    ) -> Option<BiomeChange> {
        let biome = self.get_player_biome(position, assigner, registry);
        if biome == self.current {
            return None;
        }
        let from = std::mem::replace(&mut self.current, biome.clone());
        Some(BiomeChange { from, to: biome })
    }

    /// Forget the tracked biome.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
