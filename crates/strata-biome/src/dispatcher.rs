//! Chunk population dispatch.
//!
//! The dispatcher never interprets what a biome spawns: it resolves the biome
//! for a chunk and returns that biome's result unchanged.

use glam::Vec3;
use strata_common::{BiomeId, ChunkCoord, EntityId};
use tracing::{debug, trace, warn};

use crate::assigner::SpatialBiomeAssigner;
use crate::biome::WorldContext;
use crate::events::{BiomeEvent, EventBus};
use crate::registry::BiomeRegistry;

/// Routes chunk population to the biome that governs each chunk.
pub struct ChunkDispatcher<'a> {
    registry: &'a mut BiomeRegistry,
    assigner: &'a mut SpatialBiomeAssigner,
    chunk_size: f32,
    events: Option<&'a EventBus>,
}

impl<'a> ChunkDispatcher<'a> {
    /// Create a dispatcher over a registry and assigner.
    pub fn new(
        registry: &'a mut BiomeRegistry,
        assigner: &'a mut SpatialBiomeAssigner,
        chunk_size: f32,
    ) -> Self {
        Self {
            registry,
            assigner,
            chunk_size,
            events: None,
        }
    }

    /// Publish a `ChunkPopulated` event for every chunk that gains entities.
    #[must_use]
    pub fn with_events(mut self, events: &'a EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Populate one chunk through its biome.
    ///
    /// Returns an empty list when no biome resolves or the biome fails.
    pub fn process_chunk(&mut self, chunk: ChunkCoord, world: &mut dyn WorldContext, seed: u64) -> Vec<EntityId> {
        let Some(slot) = self.assigner.slot_for_chunk(chunk, self.registry) else {
            trace!("No biome for chunk ({}, {})", chunk.x, chunk.z);
            return Vec::new();
        };
        let Some(biome) = self.registry.get_mut(slot) else {
            return Vec::new();
        };

        let id = biome.id().clone();
        match biome.process_chunk(chunk, self.chunk_size, world, seed) {
            Ok(spawned) => {
                trace!(
                    "Chunk ({}, {}) populated by '{id}': {} entities",
                    chunk.x,
                    chunk.z,
                    spawned.len()
                );
                if let Some(events) = self.events.filter(|_| !spawned.is_empty()) {
                    events.publish(BiomeEvent::ChunkPopulated {
                        chunk,
                        biome: id,
                        spawned: spawned.len(),
                    });
                }
                spawned
            },
            Err(err) => {
                warn!("Chunk ({}, {}) population failed: {err}", chunk.x, chunk.z);
                Vec::new()
            },
        }
    }

    /// Populate the square of chunks within `radius_in_chunks` of the agent.
    ///
    /// Nothing is dispatched unless `tracked` (the agent's tracked biome)
    /// matches the biome of the agent's own chunk, so an agent straddling a
    /// boundary does not trigger population on both sides.
    pub fn spawn_around_position(
        &mut self,
        agent_position: Vec3,
        tracked: Option<&BiomeId>,
        world: &mut dyn WorldContext,
        seed: u64,
        radius_in_chunks: u32,
    ) -> Vec<EntityId> {
        let center = ChunkCoord::from_world(agent_position, self.chunk_size);
        let center_biome = self.assigner.biome_id_for_chunk(center, self.registry);

        if center_biome.is_none() || center_biome.as_ref() != tracked {
            debug!(
                "Skipping spawn around ({}, {}): tracked={:?} center={:?}",
                center.x,
                center.z,
                tracked.map(BiomeId::as_str),
                center_biome.as_ref().map(BiomeId::as_str)
            );
            return Vec::new();
        }

        let mut spawned = Vec::new();
        for chunk in center.square(radius_in_chunks) {
            spawned.extend(self.process_chunk(chunk, world, seed));
        }
        debug!(
            "Spawned {} entities around chunk ({}, {}) radius {radius_in_chunks}",
            spawned.len(),
            center.x,
            center.z
        );
        spawned
    }
}
