//! # Strata Biome
//!
//! Procedural biome assignment and environmental fog for chunked worlds.
//!
//! This crate provides:
//! - Pluggable biome implementations behind the [`Biome`] trait
//! - Deterministic, weighted, region-cached biome assignment
//! - Chunk population dispatch to the governing biome
//! - Agent biome tracking
//! - A fog state machine with timed transitions and cooldown guards
//! - Event bus for fog and biome notifications
//!
//! [`BiomeSystem`] owns all of it and is what a host drives each tick.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod assigner;
pub mod biome;
pub mod config;
pub mod dispatcher;
pub mod events;
pub mod fog;
pub mod registry;
pub mod system;
pub mod tracker;

#[cfg(test)]
mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assigner::*;
    pub use crate::biome::*;
    pub use crate::config::*;
    pub use crate::dispatcher::*;
    pub use crate::events::*;
    pub use crate::fog::*;
    pub use crate::registry::*;
    pub use crate::system::*;
    pub use crate::tracker::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBiome;
    use glam::Vec3;
    use strata_common::BiomeId;

    #[test]
    fn test_region_grouping() {
        let mut system = BiomeSystem::default();
        for id in ["a", "b", "c", "d", "e"] {
            let (biome, _) = ScriptedBiome::named(id);
            system.register_biome(biome);
        }
        system.set_biome_seed(2024);

        let origin = system.biome_id_for_chunk(0, 0);
        for (x, z) in [(1, 0), (0, 1), (3, 3)] {
            assert_eq!(system.biome_id_for_chunk(x, z), origin);
        }
    }

    #[test]
    fn test_no_thrash_while_fading_in() {
        let mut system = BiomeSystem::default();
        let (marsh, calls) = ScriptedBiome::foggy("marsh", "mist");
        system.register_biome(marsh);

        for _ in 0..50 {
            system.update_all_biomes(16.0, Vec3::new(3.0, 0.0, 3.0));
        }

        assert_eq!(system.fog().state(), FogState::FadingIn);
        assert_eq!(calls.borrow().fog_calls.len(), 1);
        assert_eq!(system.fog().active_biome(), Some(&BiomeId::from("marsh")));
    }
}
