//! Deterministic region-based biome assignment.
//!
//! Chunks are grouped into square regions of `region_size` chunks per side.
//! Each region draws one pseudo-random value from the world seed and its
//! coordinates, and that value picks a biome by weight. Results are cached
//! per region, so repeated lookups cost one hash-map calls.

use std::collections::BTreeMap;

use ahash::AHashMap;
use strata_common::{BiomeId, ChunkCoord, RegionCoord};
use tracing::{debug, trace, warn};

use crate::biome::Biome;
use crate::registry::BiomeRegistry;

const HASH_X: f64 = 12_345.678_9;
const HASH_Z: f64 = 9_876.543_21;
const HASH_SCALE: f64 = 43_758.545_312_3;

/// Sine-hash pseudo-random value in `[0, 1)` for a seed and grid position.
///
/// Computes `frac(sin(x * 12345.6789 + z * 9876.54321 + seed) * 43758.5453123)`.
/// This is a cheap hash, not a PRNG: it is neither cryptographic nor uniform,
/// and neighboring cells can show visible clustering. That is acceptable at
/// terrain scale where it only has to be reproducible.
#[must_use]
pub fn seeded_random(seed: u64, x: f64, z: f64) -> f64 {
    let v = (x * HASH_X + z * HASH_Z + seed as f64).sin() * HASH_SCALE;
    let r = v - v.floor();
    // floor of a tiny negative value can round the difference up to 1.0
    if r < 1.0 {
        r
    } else {
        0.0
    }
}

/// Pick a registration slot for `roll` by cumulative weight.
///
/// Walks biomes in registration order and returns the first whose cumulative
/// share of the total weight reaches `roll`. A zero-weight biome adds nothing
/// to the running share, so it can only win a roll of exactly 0.0 when it
/// precedes every weighted biome. Returns `None` when the total weight is 0.
#[must_use]
pub fn select_weighted(registry: &BiomeRegistry, roll: f64) -> Option<usize> {
    let total: f64 = registry.iter().map(|b| b.descriptor().effective_weight()).sum();
    if total <= 0.0 {
        return None;
    }

    let mut cumulative = 0.0;
    for (slot, biome) in registry.iter().enumerate() {
        cumulative += biome.descriptor().effective_weight();
        if roll <= cumulative / total {
            return Some(slot);
        }
    }
    None
}

/// Maps chunks to biomes through a per-region cache.
#[derive(Debug, Clone)]
pub struct SpatialBiomeAssigner {
    seed: u64,
    region_size: i32,
    cache: AHashMap<RegionCoord, usize>,
}

impl SpatialBiomeAssigner {
    /// Create an assigner for a world seed and region size (chunks per side).
    #[must_use]
    pub fn new(seed: u64, region_size: i32) -> Self {
        Self {
            seed,
            region_size: region_size.max(1),
            cache: AHashMap::new(),
        }
    }

    /// Current world seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Chunks per region side.
    #[must_use]
    pub fn region_size(&self) -> i32 {
        self.region_size
    }

    /// Replace the seed. Clears the cache so two seeds never mix.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.cache.clear();
        debug!("Biome seed set to {seed}, region cache cleared");
    }

    /// Region a chunk belongs to.
    #[must_use]
    pub fn region_for_chunk(&self, chunk: ChunkCoord) -> RegionCoord {
        chunk.to_region(self.region_size)
    }

    /// Seeded random value of a region.
    #[must_use]
    pub fn seeded_random(&self, region: RegionCoord) -> f64 {
        seeded_random(self.seed, f64::from(region.x), f64::from(region.z))
    }

    /// Registration slot of the biome governing a chunk.
    pub fn slot_for_chunk(&mut self, chunk: ChunkCoord, registry: &BiomeRegistry) -> Option<usize> {
        let region = self.region_for_chunk(chunk);
        if let Some(&slot) = self.cache.get(&region) {
            return Some(slot);
        }

        let roll = self.seeded_random(region);
        let slot = select_weighted(registry, roll).or_else(|| {
            let fallback = registry.default_slot().or(if registry.is_empty() { None } else { Some(0) });
            if fallback.is_some() {
                warn!(
                    "No biome selected for region ({}, {}) with roll {roll}; using fallback",
                    region.x, region.z
                );
            }
            fallback
        })?;

        trace!("Region ({}, {}) roll={roll:.4} -> slot {slot}", region.x, region.z);
        self.cache.insert(region, slot);
        Some(slot)
    }

    /// Biome governing a chunk, or `None` when no biome is registered.
    pub fn get_biome_for_chunk<'r>(
        &mut self,
        chunk: ChunkCoord,
        registry: &'r BiomeRegistry,
    ) -> Option<&'r dyn Biome> {
        let slot = self.slot_for_chunk(chunk, registry)?;
        registry.get(slot)
    }

    /// ID of the biome governing a chunk.
    pub fn biome_id_for_chunk(&mut self, chunk: ChunkCoord, registry: &BiomeRegistry) -> Option<BiomeId> {
        self.get_biome_for_chunk(chunk, registry).map(|b| b.id().clone())
    }

    /// Drop every cached region assignment.
    pub fn clear_biome_cache(&mut self) {
        let cleared = self.cache.len();
        self.cache.clear();
        debug!("Cleared {cleared} cached region assignments");
    }

    /// Number of regions currently cached.
    #[must_use]
    pub fn cached_region_count(&self) -> usize {
        self.cache.len()
    }

    /// Count chunks per biome over the inclusive chunk rectangle `min..=max`.
    pub fn survey(
        &mut self,
        min: ChunkCoord,
        max: ChunkCoord,
        registry: &BiomeRegistry,
    ) -> BTreeMap<BiomeId, usize> {
        let mut counts = BTreeMap::new();
        for z in min.z..=max.z {
            for x in min.x..=max.x {
                if let Some(id) = self.biome_id_for_chunk(ChunkCoord::new(x, z), registry) {
                    *counts.entry(id).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}
