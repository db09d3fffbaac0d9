//! Sample biomes used by the headless simulation.
//!
//! - Meadow: the default biome, clear skies, small game
//! - Marsh: persistent mist whose density drifts over time
//! - Highlands: storm fog that periodically thins to mist
//!
//! Population is deterministic per chunk: the same world seed and chunk always
//! spawn the same entities, and a chunk is not repopulated until its entities
//! have been cleaned up.

use std::collections::HashMap;

use glam::Vec3;
use strata_biome::{AgentRef, Biome, BiomeDescriptor, BiomeHandle, BiomeProperties, WorldContext};
use strata_common::{BiomeError, ChunkCoord, EntityId};
use tracing::{debug, info};

/// Entity kinds and relative spawn weights.
pub type SpawnTable = &'static [(&'static str, u32)];

/// Entity spawned by a biome and still tracked by it.
#[derive(Debug, Clone, Copy)]
pub struct SpawnedEntity {
    /// Entity handle
    pub entity: EntityId,
    /// Spawn position
    pub position: Vec3,
}

/// Derive the RNG seed for one chunk.
#[must_use]
pub fn chunk_seed(world_seed: u64, chunk: ChunkCoord) -> u64 {
    let mut state = world_seed;
    state = state.wrapping_mul(31).wrapping_add(chunk.x as u64);
    state = state.wrapping_mul(31).wrapping_add(chunk.z as u64);
    state
}

/// Per-chunk spawn bookkeeping shared by the sample biomes.
#[derive(Debug)]
pub struct ChunkSpawner {
    table: SpawnTable,
    max_per_chunk: usize,
    spawned_by_chunk: HashMap<ChunkCoord, Vec<SpawnedEntity>>,
}

impl ChunkSpawner {
    /// Create a spawner drawing from `table`.
    #[must_use]
    pub fn new(table: SpawnTable, max_per_chunk: usize) -> Self {
        Self {
            table,
            max_per_chunk,
            spawned_by_chunk: HashMap::new(),
        }
    }

    /// Spawn entities for a chunk. A chunk already populated spawns nothing.
    pub fn spawn_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        world: &mut dyn WorldContext,
        seed: u64,
    ) -> Vec<EntityId> {
        if self.spawned_by_chunk.contains_key(&chunk) {
            return Vec::new();
        }

        let mut rng = fastrand::Rng::with_seed(chunk_seed(seed, chunk));
        let total_weight: u32 = self.table.iter().map(|(_, weight)| weight).sum();
        let count = if total_weight == 0 {
            0
        } else {
            rng.usize(0..=self.max_per_chunk)
        };

        let origin = chunk.to_world(chunk_size);
        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let mut roll = rng.u32(0..total_weight);
            let Some(&(kind, _)) = self
                .table
                .iter()
                .find(|(_, weight)| {
                    if roll < *weight {
                        true
                    } else {
                        roll -= weight;
                        false
                    }
                })
                .or_else(|| self.table.first())
            else {
                break;
            };

            let position = origin + Vec3::new(rng.f32() * chunk_size, 0.0, rng.f32() * chunk_size);
            let entity = world.spawn_entity(kind, position);
            spawned.push(SpawnedEntity { entity, position });
        }

        let ids = spawned.iter().map(|s| s.entity).collect();
        self.spawned_by_chunk.insert(chunk, spawned);
        ids
    }

    /// Forget chunks whose center lies farther than `radius` from `center`.
    /// Returns the number of entities forgotten.
    pub fn forget_beyond(&mut self, center: Vec3, chunk_size: f32, radius: f32) -> usize {
        let mut forgotten = 0;
        self.spawned_by_chunk.retain(|chunk, entities| {
            let chunk_center = chunk.to_world(chunk_size) + Vec3::new(chunk_size, 0.0, chunk_size) * 0.5;
            let keep = chunk_center.distance(center) <= radius;
            if !keep {
                forgotten += entities.len();
            }
            keep
        });
        forgotten
    }

    /// Whether a chunk has been populated.
    #[must_use]
    pub fn is_chunk_spawned(&self, chunk: ChunkCoord) -> bool {
        self.spawned_by_chunk.contains_key(&chunk)
    }

    /// Entities spawned in a chunk.
    #[must_use]
    pub fn chunk_entities(&self, chunk: ChunkCoord) -> &[SpawnedEntity] {
        self.spawned_by_chunk.get(&chunk).map_or(&[], Vec::as_slice)
    }

    /// Total tracked entity count.
    #[must_use]
    pub fn total_spawned(&self) -> usize {
        self.spawned_by_chunk.values().map(Vec::len).sum()
    }
}

/// Fog as a biome currently shows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FogLayer {
    /// Whether fog is (fading) visible
    pub visible: bool,
    /// Fog type on screen
    pub fog_type: Option<String>,
    /// Number of transitions handled
    pub transitions: u32,
}

impl FogLayer {
    fn fade(&mut self, biome: &BiomeDescriptor, entering: bool, fog_type: Option<&str>, agent: &AgentRef) {
        info!(
            "{}: fog {} ({}) for agent at ({:.0}, {:.0})",
            biome.name,
            if entering { "rolling in" } else { "lifting" },
            fog_type.unwrap_or("none"),
            agent.position.x,
            agent.position.z
        );
        self.visible = entering;
        self.fog_type = entering.then(|| fog_type.map(str::to_owned)).flatten();
        self.transitions += 1;
    }

    fn switch(&mut self, biome: &BiomeDescriptor, from: Option<&str>, to: Option<&str>) {
        info!(
            "{}: fog shifts from {} to {}",
            biome.name,
            from.unwrap_or("none"),
            to.unwrap_or("none")
        );
        self.visible = true;
        self.fog_type = to.map(str::to_owned);
        self.transitions += 1;
    }
}

/// Default biome: open grassland without fog.
#[derive(Debug)]
pub struct Meadow {
    descriptor: BiomeDescriptor,
    spawner: ChunkSpawner,
    chunk_size: f32,
}

impl Meadow {
    /// Entities a meadow spawns.
    pub const FAUNA: SpawnTable = &[("rabbit", 6), ("deer", 3), ("fox", 1)];

    /// Create a meadow.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: BiomeDescriptor::new("meadow", "Meadow").with_weight(3.0).as_default(),
            spawner: ChunkSpawner::new(Self::FAUNA, 4),
            chunk_size: strata_biome::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Spawn bookkeeping.
    #[must_use]
    pub fn spawner(&self) -> &ChunkSpawner {
        &self.spawner
    }
}

impl Default for Meadow {
    fn default() -> Self {
        Self::new()
    }
}

impl Biome for Meadow {
    fn descriptor(&self) -> &BiomeDescriptor {
        &self.descriptor
    }

    fn properties(&self) -> Result<BiomeProperties, BiomeError> {
        Ok(BiomeProperties::clear())
    }

    fn process_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        world: &mut dyn WorldContext,
        seed: u64,
    ) -> Result<Vec<EntityId>, BiomeError> {
        self.chunk_size = chunk_size;
        Ok(self.spawner.spawn_chunk(chunk, chunk_size, world, seed))
    }

    fn cleanup_distant_entities(&mut self, agent_position: Vec3, radius: f32) {
        let forgotten = self.spawner.forget_beyond(agent_position, self.chunk_size, radius);
        if forgotten > 0 {
            debug!("Meadow forgot {forgotten} distant entities");
        }
    }
}

/// Wetland with a permanent mist.
#[derive(Debug)]
pub struct Marsh {
    descriptor: BiomeDescriptor,
    spawner: ChunkSpawner,
    chunk_size: f32,
    elapsed_ms: f32,
    fog: FogLayer,
}

impl Marsh {
    /// Entities a marsh spawns.
    pub const FAUNA: SpawnTable = &[("frog", 5), ("heron", 2), ("will_o_wisp", 1)];

    /// Create a marsh.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: BiomeDescriptor::new("marsh", "Marsh").with_weight(2.0),
            spawner: ChunkSpawner::new(Self::FAUNA, 5),
            chunk_size: strata_biome::DEFAULT_CHUNK_SIZE,
            elapsed_ms: 0.0,
            fog: FogLayer::default(),
        }
    }

    /// Fog as currently shown.
    #[must_use]
    pub fn fog(&self) -> &FogLayer {
        &self.fog
    }

    /// Mist density, drifting slowly around 0.55.
    #[must_use]
    pub fn density(&self) -> f32 {
        0.55 + 0.1 * (self.elapsed_ms / 8_000.0).sin()
    }
}

impl Default for Marsh {
    fn default() -> Self {
        Self::new()
    }
}

impl Biome for Marsh {
    fn descriptor(&self) -> &BiomeDescriptor {
        &self.descriptor
    }

    fn register(&mut self) -> BiomeHandle {
        debug!("Marsh registered, mist density {:.2}", self.density());
        BiomeHandle::from(&self.descriptor)
    }

    fn properties(&self) -> Result<BiomeProperties, BiomeError> {
        Ok(BiomeProperties::foggy("mist", self.density(), [0.55, 0.62, 0.58]))
    }

    fn process_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        world: &mut dyn WorldContext,
        seed: u64,
    ) -> Result<Vec<EntityId>, BiomeError> {
        self.chunk_size = chunk_size;
        Ok(self.spawner.spawn_chunk(chunk, chunk_size, world, seed))
    }

    fn update(&mut self, delta_ms: f32, _agent_position: Vec3) {
        self.elapsed_ms += delta_ms;
    }

    fn cleanup_distant_entities(&mut self, agent_position: Vec3, radius: f32) {
        let forgotten = self.spawner.forget_beyond(agent_position, self.chunk_size, radius);
        if forgotten > 0 {
            debug!("Marsh forgot {forgotten} distant entities");
        }
    }

    fn handle_fog_transition(
        &mut self,
        entering: bool,
        agent: &AgentRef,
        fog_type: Option<&str>,
    ) -> Result<(), BiomeError> {
        self.fog.fade(&self.descriptor, entering, fog_type, agent);
        Ok(())
    }

    fn handle_fog_type_transition(
        &mut self,
        from: Option<&str>,
        to: Option<&str>,
        _agent: &AgentRef,
    ) -> Result<(), BiomeError> {
        self.fog.switch(&self.descriptor, from, to);
        Ok(())
    }
}

/// Rocky uplands where storms roll through and thin out to mist.
#[derive(Debug)]
pub struct Highlands {
    descriptor: BiomeDescriptor,
    spawner: ChunkSpawner,
    chunk_size: f32,
    storm_cycle_ms: f32,
    elapsed_ms: f32,
    stormy: bool,
    fog: FogLayer,
}

impl Highlands {
    /// Entities the highlands spawn.
    pub const FAUNA: SpawnTable = &[("goat", 4), ("eagle", 2), ("wolf", 1)];

    /// Create highlands whose weather flips every `storm_cycle_ms`.
    #[must_use]
    pub fn new(storm_cycle_ms: f32) -> Self {
        Self {
            descriptor: BiomeDescriptor::new("highlands", "Highlands"),
            spawner: ChunkSpawner::new(Self::FAUNA, 3),
            chunk_size: strata_biome::DEFAULT_CHUNK_SIZE,
            storm_cycle_ms: storm_cycle_ms.max(1.0),
            elapsed_ms: 0.0,
            stormy: true,
            fog: FogLayer::default(),
        }
    }

    /// Fog as currently shown.
    #[must_use]
    pub fn fog(&self) -> &FogLayer {
        &self.fog
    }

    /// Fog type reported right now.
    #[must_use]
    pub fn fog_type(&self) -> &'static str {
        if self.stormy {
            "storm"
        } else {
            "mist"
        }
    }
}

impl Default for Highlands {
    fn default() -> Self {
        Self::new(45_000.0)
    }
}

impl Biome for Highlands {
    fn descriptor(&self) -> &BiomeDescriptor {
        &self.descriptor
    }

    fn properties(&self) -> Result<BiomeProperties, BiomeError> {
        let (density, color) = if self.stormy {
            (0.8, [0.35, 0.37, 0.42])
        } else {
            (0.4, [0.7, 0.72, 0.75])
        };
        Ok(BiomeProperties::foggy(self.fog_type(), density, color))
    }

    fn process_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        world: &mut dyn WorldContext,
        seed: u64,
    ) -> Result<Vec<EntityId>, BiomeError> {
        self.chunk_size = chunk_size;
        Ok(self.spawner.spawn_chunk(chunk, chunk_size, world, seed))
    }

    fn update(&mut self, delta_ms: f32, _agent_position: Vec3) {
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms >= self.storm_cycle_ms {
            self.elapsed_ms -= self.storm_cycle_ms;
            self.stormy = !self.stormy;
            debug!("Highlands weather turns to {}", self.fog_type());
        }
    }

    fn cleanup_distant_entities(&mut self, agent_position: Vec3, radius: f32) {
        let forgotten = self.spawner.forget_beyond(agent_position, self.chunk_size, radius);
        if forgotten > 0 {
            debug!("Highlands forgot {forgotten} distant entities");
        }
    }

    fn handle_fog_transition(
        &mut self,
        entering: bool,
        agent: &AgentRef,
        fog_type: Option<&str>,
    ) -> Result<(), BiomeError> {
        self.fog.fade(&self.descriptor, entering, fog_type, agent);
        Ok(())
    }

    fn handle_fog_type_transition(
        &mut self,
        from: Option<&str>,
        to: Option<&str>,
        _agent: &AgentRef,
    ) -> Result<(), BiomeError> {
        self.fog.switch(&self.descriptor, from, to);
        Ok(())
    }
}
