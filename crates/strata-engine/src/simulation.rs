//! Headless simulation loop.
//!
//! Walks an agent along a slow arc across region boundaries, driving the biome
//! system every tick. Chunks around the agent are populated periodically and
//! distant entities are cleaned up on the same cadence.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::Serialize;
use strata_biome::{BiomeEvent, BiomeSystem};
use strata_common::{BiomeError, BiomeId, ChunkCoord, EntityId, StrataResult};
use tracing::{debug, info, warn};

use crate::biomes::{Highlands, Marsh, Meadow};
use crate::config::EngineConfig;
use crate::world::HeadlessWorld;

/// Heading change per tick in radians.
const TURN_RATE: f32 = 0.002;

/// Counters collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    /// Ticks simulated
    pub ticks: u32,
    /// Times the agent entered a different biome
    pub biome_changes: u32,
    /// Fog fade-ins and fade-outs started
    pub fog_fades: u32,
    /// Fog type switches started
    pub fog_type_switches: u32,
    /// Chunks populated by a biome
    pub chunks_populated: u32,
    /// Entities spawned
    pub entities_spawned: u64,
    /// Entities removed from the world as too distant
    pub entities_despawned: u64,
    /// Events lost to a full event bus
    pub events_dropped: u64,
}

/// Agent walk over a world populated by the sample biomes.
#[derive(Debug)]
pub struct Simulation {
    config: EngineConfig,
    seed: u64,
    system: BiomeSystem,
    world: HeadlessWorld,
    position: Vec3,
    tick: u32,
    stats: SimulationStats,
}

impl Simulation {
    /// Create a simulation and register the sample biomes.
    pub fn new(mut config: EngineConfig) -> StrataResult<Self> {
        config.validate();
        let seed = config.world_seed.unwrap_or_else(HeadlessWorld::random_seed);

        let mut system = BiomeSystem::new(config.biome.clone());
        system.try_register_biome(Box::new(Meadow::new()))?;
        system.try_register_biome(Box::new(Marsh::new()))?;
        system.try_register_biome(Box::new(Highlands::default()))?;
        if system.get_default_biome().is_none() {
            return Err(BiomeError::NoBiomes.into());
        }
        system.set_biome_seed(seed);
        system.set_agent_entity(EntityId::new());
        system.initialize();

        info!(
            "Simulation ready: seed {seed}, {} biomes, {} ticks of {} ms",
            system.get_all_biomes().len(),
            config.simulation_ticks,
            config.tick_ms
        );

        Ok(Self {
            config,
            seed,
            system,
            world: HeadlessWorld::new(),
            position: Vec3::ZERO,
            tick: 0,
            stats: SimulationStats::default(),
        })
    }

    /// World seed in use.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Agent position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The biome system being driven.
    #[must_use]
    pub fn system(&self) -> &BiomeSystem {
        &self.system
    }

    /// The populated world.
    #[must_use]
    pub fn world(&self) -> &HeadlessWorld {
        &self.world
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Advance one tick.
    pub fn step(&mut self) {
        let dt_ms = self.config.tick_ms;
        let angle = self.tick as f32 * TURN_RATE;
        let heading = Vec3::new(angle.cos(), 0.0, angle.sin());
        self.position += heading * self.config.agent_speed * dt_ms / 1000.0;

        self.system.update_all_biomes(dt_ms, self.position);

        if self.tick % self.config.spawn_interval_ticks == 0 {
            let spawned = self
                .system
                .spawn_around_position(&mut self.world, self.seed, self.config.spawn_radius);
            self.stats.entities_spawned += spawned.len() as u64;

            let radius = self.config.cleanup_radius;
            self.system.cleanup_all_biomes(self.position, radius);
            let removed = self.world.despawn_beyond(self.position, radius);
            self.stats.entities_despawned += removed as u64;
        }

        for event in self.system.drain_events() {
            self.record(&event);
        }
        self.stats.events_dropped = self.system.events().dropped_count();

        self.tick += 1;
        self.stats.ticks = self.tick;
    }

    fn record(&mut self, event: &BiomeEvent) {
        match event {
            BiomeEvent::PlayerBiomeChanged { to, .. } => {
                self.stats.biome_changes += 1;
                match to.as_ref().map(|id| (id, self.system.biome_properties(id.as_str()))) {
                    Some((id, Ok(props))) => info!(
                        "Tick {}: agent entered {id} (fog: {})",
                        self.tick,
                        props.fog_type().unwrap_or("none")
                    ),
                    Some((id, Err(e))) => warn!("Tick {}: agent entered {id}: {e}", self.tick),
                    None => info!("Tick {}: agent left every biome", self.tick),
                }
            },
            BiomeEvent::FogTransitionRequested { .. } => self.stats.fog_fades += 1,
            BiomeEvent::FogTypeTransitionRequested { .. } => self.stats.fog_type_switches += 1,
            BiomeEvent::ChunkPopulated { .. } => self.stats.chunks_populated += 1,
            BiomeEvent::FogStateChanged { .. } => {},
        }

        match serde_json::to_string(event) {
            Ok(json) => debug!("event {json}"),
            Err(e) => warn!("Failed to serialize event: {e}"),
        }
    }

    /// Run the configured number of ticks and return the counters.
    pub fn run(&mut self) -> SimulationStats {
        for _ in 0..self.config.simulation_ticks {
            self.step();
        }
        info!(
            "Walk finished at ({:.0}, {:.0}); {} entities alive, census {:?}",
            self.position.x,
            self.position.z,
            self.world.entity_count(),
            self.world.census()
        );
        self.stats.clone()
    }

    /// Chunks per biome within `survey_radius` chunks of the origin.
    pub fn survey(&mut self) -> BTreeMap<BiomeId, usize> {
        let r = self.config.survey_radius;
        self.system
            .survey(ChunkCoord::new(-r, -r), ChunkCoord::new(r, r))
    }
}
