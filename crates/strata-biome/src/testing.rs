//! Scriptable biomes and worlds for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use strata_common::{BiomeError, ChunkCoord, EntityId};

use crate::biome::{AgentRef, Biome, BiomeDescriptor, BiomeProperties, WorldContext};

/// Shared, test-visible state of a [`ScriptedBiome`].
#[derive(Debug, Default)]
pub struct CallLog {
    pub properties: BiomeProperties,
    pub fail_properties: bool,
    pub fail_process: bool,
    pub register_calls: u32,
    pub fog_calls: Vec<(bool, Option<String>)>,
    pub fog_type_calls: Vec<(Option<String>, Option<String>)>,
    pub processed: Vec<ChunkCoord>,
    pub updates: u32,
    pub cleanups: Vec<f32>,
    pub spawn_per_chunk: usize,
}

impl CallLog {
    pub fn set_fog(&mut self, fog_type: Option<&str>) {
        self.properties = match fog_type {
            Some(kind) => BiomeProperties::foggy(kind, 0.5, [0.6, 0.6, 0.6]),
            None => BiomeProperties::clear(),
        };
    }
}

/// Biome whose behavior and call log live in a shared [`CallLog`].
pub struct ScriptedBiome {
    descriptor: BiomeDescriptor,
    pub calls: Rc<RefCell<CallLog>>,
}

impl ScriptedBiome {
    pub fn new(descriptor: BiomeDescriptor) -> (Self, Rc<RefCell<CallLog>>) {
        let calls = Rc::new(RefCell::new(CallLog {
            spawn_per_chunk: 1,
            ..CallLog::default()
        }));
        (
            Self {
                descriptor,
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }

    pub fn named(id: &str) -> (Self, Rc<RefCell<CallLog>>) {
        Self::new(BiomeDescriptor::new(id, id))
    }

    pub fn foggy(id: &str, fog_type: &str) -> (Self, Rc<RefCell<CallLog>>) {
        let (biome, calls) = Self::named(id);
        calls.borrow_mut().set_fog(Some(fog_type));
        (biome, calls)
    }
}

impl Biome for ScriptedBiome {
    fn descriptor(&self) -> &BiomeDescriptor {
        &self.descriptor
    }

    fn register(&mut self) -> crate::biome::BiomeHandle {
        self.calls.borrow_mut().register_calls += 1;
        crate::biome::BiomeHandle::from(&self.descriptor)
    }

    fn properties(&self) -> Result<BiomeProperties, BiomeError> {
        let calls = self.calls.borrow();
        if calls.fail_properties {
            return Err(BiomeError::capability(&self.descriptor.id, "properties unavailable"));
        }
        Ok(calls.properties.clone())
    }

    fn process_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        world: &mut dyn WorldContext,
        _seed: u64,
    ) -> Result<Vec<EntityId>, BiomeError> {
        let mut calls = self.calls.borrow_mut();
        if calls.fail_process {
            return Err(BiomeError::capability(&self.descriptor.id, "population failed"));
        }
        calls.processed.push(chunk);
        let origin = chunk.to_world(chunk_size);
        Ok((0..calls.spawn_per_chunk)
            .map(|_| world.spawn_entity(self.descriptor.id.as_str(), origin))
            .collect())
    }

    fn update(&mut self, _delta_ms: f32, _agent_position: Vec3) {
        self.calls.borrow_mut().updates += 1;
    }

    fn cleanup_distant_entities(&mut self, _agent_position: Vec3, radius: f32) {
        self.calls.borrow_mut().cleanups.push(radius);
    }

    fn handle_fog_transition(
        &mut self,
        entering: bool,
        _agent: &AgentRef,
        fog_type: Option<&str>,
    ) -> Result<(), BiomeError> {
        self.calls
            .borrow_mut()
            .fog_calls
            .push((entering, fog_type.map(str::to_owned)));
        Ok(())
    }

    fn handle_fog_type_transition(
        &mut self,
        from: Option<&str>,
        to: Option<&str>,
        _agent: &AgentRef,
    ) -> Result<(), BiomeError> {
        self.calls
            .borrow_mut()
            .fog_type_calls
            .push((from.map(str::to_owned), to.map(str::to_owned)));
        Ok(())
    }
}

/// World that records every spawn.
#[derive(Debug, Default)]
pub struct RecordingWorld {
    pub spawned: Vec<(String, Vec3, EntityId)>,
}

impl WorldContext for RecordingWorld {
    fn spawn_entity(&mut self, kind: &str, position: Vec3) -> EntityId {
        let id = EntityId::new();
        self.spawned.push((kind.to_owned(), position, id));
        id
    }
}
