//! Headless world that biomes populate.
//!
//! Stands in for the renderer-backed world: it only records which entities
//! exist and where.

use std::collections::HashMap;

use glam::Vec3;
use strata_biome::WorldContext;
use strata_common::EntityId;

/// An entity spawned into the headless world.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldEntity {
    /// Entity kind as named by the spawning biome
    pub kind: String,
    /// World position
    pub position: Vec3,
}

/// Minimal in-memory world.
#[derive(Debug, Default)]
pub struct HeadlessWorld {
    entities: HashMap<EntityId, WorldEntity>,
    total_spawned: u64,
}

impl HeadlessWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a random seed using system time.
    #[must_use]
    pub fn random_seed() -> u64 {
        use std::time::SystemTime;
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_or(42, |d| d.as_nanos() as u64)
    }

    /// Removes entities farther than `radius` from `center`, returning how
    /// many were removed.
    pub fn despawn_beyond(&mut self, center: Vec3, radius: f32) -> usize {
        let before = self.entities.len();
        self.entities
            .retain(|_, entity| entity.position.distance(center) <= radius);
        before - self.entities.len()
    }

    /// Looks up an entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&WorldEntity> {
        self.entities.get(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of entities ever spawned.
    #[must_use]
    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    /// Live entity counts per kind, sorted by kind.
    #[must_use]
    pub fn census(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entity in self.entities.values() {
            *counts.entry(entity.kind.as_str()).or_insert(0) += 1;
        }
        let mut census: Vec<_> = counts
            .into_iter()
            .map(|(kind, count)| (kind.to_owned(), count))
            .collect();
        census.sort();
        census
    }
}

impl WorldContext for HeadlessWorld {
    fn spawn_entity(&mut self, kind: &str, position: Vec3) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(
            id,
            WorldEntity {
                kind: kind.to_owned(),
                position,
            },
        );
        self.total_spawned += 1;
        id
    }
}
