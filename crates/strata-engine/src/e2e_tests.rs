//! End-to-end tests for the biome system driven by the sample biomes.
//!
//! These walk an agent through real biomes and check what a player would see:
//! which biome governs a place, when fog rolls in, lifts, or changes type.

#![cfg(test)]

use glam::Vec3;
use strata_biome::{BiomeConfig, BiomeEvent, BiomeSystem, FogState};
use strata_common::{BiomeId, ChunkCoord};

use crate::biomes::{Highlands, Marsh, Meadow};
use crate::world::HeadlessWorld;

fn sample_system(seed: u64) -> BiomeSystem {
    let mut system = BiomeSystem::new(BiomeConfig::default());
    system.register_biome(Meadow::new());
    system.register_biome(Marsh::new());
    system.register_biome(Highlands::default());
    system.set_biome_seed(seed);
    system
}

/// First chunk (row by row) inside `-64..64` governed by `biome`.
fn find_chunk(system: &mut BiomeSystem, biome: &str) -> Option<ChunkCoord> {
    (-64..64)
        .flat_map(|z| (-64..64).map(move |x| ChunkCoord::new(x, z)))
        .find(|chunk| system.biome_id_for_chunk(chunk.x, chunk.z).as_ref().map(BiomeId::as_str) == Some(biome))
}

fn chunk_center(chunk: ChunkCoord) -> Vec3 {
    chunk.to_world(16.0) + Vec3::new(8.0, 0.0, 8.0)
}

fn walk(system: &mut BiomeSystem, total_ms: u32, position: Vec3) -> Vec<BiomeEvent> {
    let mut events = Vec::new();
    for _ in 0..total_ms / 100 {
        system.update_all_biomes(100.0, position);
        events.extend(system.drain_events());
    }
    events
}

mod assignment_tests {
    use super::*;

    #[test]
    fn e2e_sample_world_contains_every_biome() {
        let mut system = sample_system(2024);
        let counts = system.survey(ChunkCoord::new(-32, -32), ChunkCoord::new(31, 31));

        for id in ["meadow", "marsh", "highlands"] {
            assert!(counts.contains_key(&BiomeId::from(id)), "{id} missing from survey");
        }
        assert_eq!(counts.values().sum::<usize>(), 64 * 64);
    }

    #[test]
    fn e2e_meadow_is_default() {
        let system = sample_system(1);
        let default = system.get_default_biome().map(|b| b.id().clone());
        assert_eq!(default, Some(BiomeId::from("meadow")));
    }

    #[test]
    fn e2e_assignment_survives_cache_clear() {
        let mut system = sample_system(99);
        let before: Vec<_> = (-20..20).map(|x| system.biome_id_for_chunk(x, -x)).collect();
        system.clear_biome_cache();
        let after: Vec<_> = (-20..20).map(|x| system.biome_id_for_chunk(x, -x)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn e2e_properties_follow_biome() {
        let mut system = sample_system(7);
        let marsh = find_chunk(&mut system, "marsh").expect("no marsh chunk");
        let meadow = find_chunk(&mut system, "meadow").expect("no meadow chunk");

        let props = system.get_biome_properties_for_chunk(marsh.x, marsh.z);
        assert_eq!(props.fog_type(), Some("mist"));
        assert!(!system.get_biome_properties_for_chunk(meadow.x, meadow.z).has_fog);
    }
}

mod fog_tests {
    use super::*;

    #[test]
    fn e2e_marsh_fog_rolls_in_and_lifts() {
        let mut system = sample_system(7);
        let marsh = chunk_center(find_chunk(&mut system, "marsh").expect("no marsh chunk"));
        let meadow = chunk_center(find_chunk(&mut system, "meadow").expect("no meadow chunk"));

        let events = walk(&mut system, 100, marsh);
        assert_eq!(system.fog().state(), FogState::FadingIn);
        assert!(events.contains(&BiomeEvent::FogTransitionRequested {
            biome: BiomeId::from("marsh"),
            entering: true,
            fog_type: Some("mist".to_owned()),
        }));

        walk(&mut system, 13_000, marsh);
        assert_eq!(system.fog().state(), FogState::Active);

        let events = walk(&mut system, 1_000, meadow);
        assert_eq!(system.fog().state(), FogState::FadingOut);
        assert!(events.contains(&BiomeEvent::FogTransitionRequested {
            biome: BiomeId::from("marsh"),
            entering: false,
            fog_type: Some("mist".to_owned()),
        }));

        walk(&mut system, 5_000, meadow);
        assert_eq!(system.fog().state(), FogState::Inactive);
        assert!(system.fog().active_biome().is_none());
    }

    #[test]
    fn e2e_highlands_storm_thins_to_mist() {
        let mut system = BiomeSystem::new(BiomeConfig::default());
        system.register_biome(Highlands::new(20_000.0));
        let position = Vec3::new(30.0, 0.0, -30.0);

        let events = walk(&mut system, 19_000, position);
        assert_eq!(system.fog().active_fog_type(), Some("storm"));
        assert!(!events
            .iter()
            .any(|e| matches!(e, BiomeEvent::FogTypeTransitionRequested { .. })));

        let events = walk(&mut system, 3_000, position);
        assert!(events.contains(&BiomeEvent::FogTypeTransitionRequested {
            biome: BiomeId::from("highlands"),
            from: Some("storm".to_owned()),
            to: Some("mist".to_owned()),
        }));
        assert_eq!(system.fog().active_fog_type(), Some("mist"));
    }

    #[test]
    fn e2e_reseed_clears_fog() {
        let mut system = sample_system(7);
        let marsh = chunk_center(find_chunk(&mut system, "marsh").expect("no marsh chunk"));
        walk(&mut system, 500, marsh);
        assert_ne!(system.fog().state(), FogState::Inactive);

        system.set_biome_seed(8);
        assert_eq!(system.fog().state(), FogState::Inactive);
        assert!(system.tracked_biome().is_none());
    }
}

mod population_tests {
    use super::*;

    #[test]
    fn e2e_spawn_around_agent_populates_world() {
        let mut system = sample_system(5);
        let mut world = HeadlessWorld::new();
        let position = Vec3::new(100.0, 0.0, 100.0);

        system.update_all_biomes(16.0, position);
        let spawned = system.spawn_around_position(&mut world, 5, 2);

        assert!(!spawned.is_empty());
        assert_eq!(spawned.len(), world.entity_count());
        let populated: Vec<usize> = system
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                BiomeEvent::ChunkPopulated { spawned, .. } => Some(spawned),
                _ => None,
            })
            .collect();
        assert!(populated.len() <= 25);
        assert!(populated.iter().all(|&n| n > 0));
        assert_eq!(populated.iter().sum::<usize>(), spawned.len());

        // Chunks are not populated twice, and a second pass reports nothing.
        assert!(system.spawn_around_position(&mut world, 5, 2).is_empty());
        assert!(!system
            .drain_events()
            .iter()
            .any(|e| matches!(e, BiomeEvent::ChunkPopulated { .. })));
    }

    #[test]
    fn e2e_cleanup_allows_repopulation() {
        let mut system = sample_system(5);
        let mut world = HeadlessWorld::new();
        let home = Vec3::new(8.0, 0.0, 8.0);
        let far = Vec3::new(5_000.0, 0.0, 5_000.0);

        let chunk = ChunkCoord::new(0, 0);
        let first = system.process_chunk(chunk.x, chunk.z, &mut world, 5);
        system.cleanup_all_biomes(far, 64.0);
        world.despawn_beyond(far, 64.0);
        let second = system.process_chunk(chunk.x, chunk.z, &mut world, 5);

        assert_eq!(first.len(), second.len());
        let positions: Vec<_> = second.iter().filter_map(|id| world.get(*id)).map(|e| e.position).collect();
        assert!(positions.iter().all(|p| p.distance(home) < 16.0));
    }
}
