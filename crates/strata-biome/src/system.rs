//! Owner of the biome registry, region assignment and fog state.
//!
//! [`BiomeSystem`] is the single entry point a host drives. It holds every
//! piece of mutable biome state, so `&mut self` access gives one writer for the
//! assignment cache and the fog machine.

use std::collections::BTreeMap;

use glam::Vec3;
use strata_common::{BiomeError, BiomeId, ChunkCoord, EntityId};
use tracing::{debug, info, warn};

use crate::assigner::SpatialBiomeAssigner;
use crate::biome::{AgentRef, Biome, BiomeDescriptor, BiomeHandle, BiomeProperties, WorldContext};
use crate::config::BiomeConfig;
use crate::dispatcher::ChunkDispatcher;
use crate::events::{BiomeEvent, EventBus};
use crate::fog::FogStateMachine;
use crate::registry::BiomeRegistry;
use crate::tracker::PlayerBiomeTracker;

/// Biome assignment, chunk dispatch and fog for one world.
#[derive(Debug)]
pub struct BiomeSystem {
    config: BiomeConfig,
    registry: BiomeRegistry,
    assigner: SpatialBiomeAssigner,
    tracker: PlayerBiomeTracker,
    fog: FogStateMachine,
    events: EventBus,
    agent: AgentRef,
}

impl Default for BiomeSystem {
    fn default() -> Self {
        Self::new(BiomeConfig::default())
    }
}

impl BiomeSystem {
    /// Create a system with seed 0 and no biomes.
    #[must_use]
    pub fn new(mut config: BiomeConfig) -> Self {
        config.validate();
        Self {
            registry: BiomeRegistry::new(),
            assigner: SpatialBiomeAssigner::new(0, config.region_size),
            tracker: PlayerBiomeTracker::new(config.chunk_size, config.diagnostic_interval_secs),
            fog: FogStateMachine::new(config.fog.clone()),
            events: EventBus::new(config.event_capacity),
            agent: AgentRef::default(),
            config,
        }
    }

    /// Reset runtime state: clears the assignment cache, returns the fog to
    /// `Inactive`, forgets the tracked biome and drops pending events.
    /// Registered biomes are kept.
    pub fn initialize(&mut self) {
        self.assigner.clear_biome_cache();
        self.fog.reset();
        self.tracker.reset();
        self.events.clear();
        info!(
            "Biome system initialized: {} biomes, seed {}",
            self.registry.len(),
            self.assigner.seed()
        );
    }

    /// Register a biome implementation.
    pub fn register_biome<B: Biome + 'static>(&mut self, biome: B) -> BiomeHandle {
        self.register_boxed(Box::new(biome))
    }

    /// Register an already boxed biome.
    pub fn register_boxed(&mut self, biome: Box<dyn Biome>) -> BiomeHandle {
        let before = self.registry.len();
        let handle = self.registry.register_biome(biome);
        if self.registry.len() != before {
            // Weights changed, so cached regions may now resolve differently.
            self.assigner.clear_biome_cache();
        }
        handle
    }

    /// Register a biome, returning an error on a duplicate ID.
    pub fn try_register_biome(&mut self, biome: Box<dyn Biome>) -> Result<BiomeHandle, BiomeError> {
        let handle = self.registry.try_register(biome)?;
        self.assigner.clear_biome_cache();
        Ok(handle)
    }

    /// Reseed assignment. Resets runtime state like [`initialize`](Self::initialize).
    pub fn set_biome_seed(&mut self, seed: u64) {
        self.assigner.set_seed(seed);
        self.fog.reset();
        self.tracker.reset();
        info!("Biome seed set to {seed}");
    }

    /// Current world seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.assigner.seed()
    }

    /// Biome governing chunk `(chunk_x, chunk_z)`.
    pub fn get_biome_for_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Option<&dyn Biome> {
        self.assigner
            .get_biome_for_chunk(ChunkCoord::new(chunk_x, chunk_z), &self.registry)
    }

    /// ID of the biome governing a chunk.
    pub fn biome_id_for_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Option<BiomeId> {
        self.assigner
            .biome_id_for_chunk(ChunkCoord::new(chunk_x, chunk_z), &self.registry)
    }

    /// Properties of the biome governing a chunk, or the default "no fog"
    /// properties when no biome resolves or the biome cannot report them.
    pub fn get_biome_properties_for_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> BiomeProperties {
        let Some(biome) = self.get_biome_for_chunk(chunk_x, chunk_z) else {
            return BiomeProperties::default();
        };
        match biome.properties() {
            Ok(properties) => properties,
            Err(err) => {
                warn!("Using default properties for chunk ({chunk_x}, {chunk_z}): {err}");
                BiomeProperties::default()
            },
        }
    }

    fn dispatcher(&mut self) -> ChunkDispatcher<'_> {
        ChunkDispatcher::new(&mut self.registry, &mut self.assigner, self.config.chunk_size).with_events(&self.events)
    }

    /// Populate one chunk through its biome.
    pub fn process_chunk(
        &mut self,
        chunk_x: i32,
        chunk_z: i32,
        world: &mut dyn WorldContext,
        seed: u64,
    ) -> Vec<EntityId> {
        self.dispatcher()
            .process_chunk(ChunkCoord::new(chunk_x, chunk_z), world, seed)
    }

    /// Populate every chunk within `radius_in_chunks` of the agent, provided
    /// the agent's tracked biome matches the biome of its own chunk.
    pub fn spawn_around_position(
        &mut self,
        world: &mut dyn WorldContext,
        seed: u64,
        radius_in_chunks: u32,
    ) -> Vec<EntityId> {
        ChunkDispatcher::new(&mut self.registry, &mut self.assigner, self.config.chunk_size)
            .with_events(&self.events)
            .spawn_around_position(self.agent.position, self.tracker.current(), world, seed, radius_in_chunks)
    }

    /// Advance one simulation step: track the agent biome, tick the fog
    /// machine, then update every registered biome.
    pub fn update_all_biomes(&mut self, delta_ms: f32, agent_position: Vec3) {
        self.agent.position = agent_position;

        if let Some(change) = self.tracker.track(agent_position, &mut self.assigner, &self.registry) {
            info!(
                "Agent biome changed: {:?} -> {:?}",
                change.from.as_ref().map(BiomeId::as_str),
                change.to.as_ref().map(BiomeId::as_str)
            );
            self.events.publish(BiomeEvent::PlayerBiomeChanged {
                from: change.from,
                to: change.to,
            });
        }

        for transition in self
            .fog
            .tick(delta_ms, self.tracker.current(), &mut self.registry, &self.agent)
        {
            self.events.publish(BiomeEvent::from(transition));
        }

        for biome in self.registry.iter_mut() {
            biome.update(delta_ms, agent_position);
        }
    }

    /// Ask every biome to drop entities farther than `radius` from the agent.
    pub fn cleanup_all_biomes(&mut self, agent_position: Vec3, radius: f32) {
        debug!("Cleaning up entities beyond {radius} units");
        for biome in self.registry.iter_mut() {
            biome.cleanup_distant_entities(agent_position, radius);
        }
    }

    /// Check whether a biome ID is registered.
    #[must_use]
    pub fn has_biome(&self, id: &str) -> bool {
        self.registry.has_biome(id)
    }

    /// Snapshot of every registered descriptor in registration order.
    #[must_use]
    pub fn get_all_biomes(&self) -> Vec<BiomeDescriptor> {
        self.registry.get_all_biomes()
    }

    /// Drop all cached region assignments.
    pub fn clear_biome_cache(&mut self) {
        self.assigner.clear_biome_cache();
    }

    /// The default biome, if any biome is registered.
    #[must_use]
    pub fn get_default_biome(&self) -> Option<&dyn Biome> {
        self.registry.get_default_biome()
    }

    /// Look up a biome by ID.
    #[must_use]
    pub fn get_biome_by_id(&self, id: &str) -> Option<&dyn Biome> {
        self.registry.get_biome_by_id(id)
    }

    /// Properties of a registered biome.
    pub fn biome_properties(&self, id: &str) -> Result<BiomeProperties, BiomeError> {
        self.registry.require(id)?.properties()
    }

    /// Resolve the biome governing `agent_position`.
    ///
    /// Read-only with respect to tracking: the biome recorded by
    /// [`Self::update_all_biomes`] is left unchanged.
    pub fn get_player_biome(&mut self, agent_position: Vec3) -> Option<BiomeId> {
        self.tracker
            .get_player_biome(agent_position, &mut self.assigner, &self.registry)
    }

    /// Biome recorded for the agent by the last update.
    #[must_use]
    pub fn tracked_biome(&self) -> Option<&BiomeId> {
        self.tracker.current()
    }

    /// Set the entity passed to biome fog callbacks.
    pub fn set_agent_entity(&mut self, entity: EntityId) {
        self.agent.entity = entity;
    }

    /// Agent handle passed to biome callbacks.
    #[must_use]
    pub fn agent(&self) -> &AgentRef {
        &self.agent
    }

    /// Fog state machine.
    #[must_use]
    pub fn fog(&self) -> &FogStateMachine {
        &self.fog
    }

    /// Event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Take all pending events.
    pub fn drain_events(&self) -> Vec<BiomeEvent> {
        self.events.drain()
    }

    /// Registered biomes.
    #[must_use]
    pub fn registry(&self) -> &BiomeRegistry {
        &self.registry
    }

    /// Region assigner.
    #[must_use]
    pub fn assigner(&self) -> &SpatialBiomeAssigner {
        &self.assigner
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &BiomeConfig {
        &self.config
    }

    /// Count chunks per biome over the inclusive rectangle `min..=max`.
    pub fn survey(&mut self, min: ChunkCoord, max: ChunkCoord) -> BTreeMap<BiomeId, usize> {
        self.assigner.survey(min, max, &self.registry)
    }
}
