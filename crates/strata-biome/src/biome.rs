//! Biome capability interface.
//!
//! This module provides:
//! - Biome descriptors (id, display name, selection weight, default flag)
//! - Environmental properties reported by a biome (fog flag, fog type, tint)
//! - The `Biome` trait every pluggable biome implementation satisfies
//! - Opaque host handles passed through to biomes (world, agent)

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strata_common::{BiomeError, BiomeId, ChunkCoord, EntityId};

/// Static description of a biome used for registration and selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeDescriptor {
    /// Unique key.
    pub id: BiomeId,
    /// Display name.
    pub name: String,
    /// Relative selection weight (defaults to 1.0).
    pub weight: f64,
    /// Whether this biome is the designated default.
    pub is_default: bool,
}

impl BiomeDescriptor {
    /// Create a descriptor with weight 1.0 that is not marked default.
    #[must_use]
    pub fn new(id: impl Into<BiomeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight: 1.0,
            is_default: false,
        }
    }

    /// Set the selection weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Mark this biome as the default.
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Weight used for selection. Negative or non-finite weights count as 0.
    #[must_use]
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// Result of a biome's own registration hook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BiomeHandle {
    /// Registered biome ID.
    pub id: BiomeId,
    /// Display name at registration time.
    pub name: String,
}

impl From<&BiomeDescriptor> for BiomeHandle {
    fn from(descriptor: &BiomeDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            name: descriptor.name.clone(),
        }
    }
}

/// Environmental properties a biome reports to the fog machine and renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeProperties {
    /// Whether this biome wants ambient fog.
    pub has_fog: bool,
    /// Kind of fog ("mist", "storm", ...), if any.
    pub fog_type: Option<String>,
    /// Fog density from 0.0 (none) to 1.0 (opaque).
    pub fog_density: f32,
    /// Linear RGB fog tint.
    pub fog_color: [f32; 3],
}

impl Default for BiomeProperties {
    fn default() -> Self {
        Self {
            has_fog: false,
            fog_type: None,
            fog_density: 0.0,
            fog_color: [0.7, 0.7, 0.7],
        }
    }
}

impl BiomeProperties {
    /// Properties of a biome without fog.
    #[must_use]
    pub fn clear() -> Self {
        Self::default()
    }

    /// Properties of a foggy biome.
    #[must_use]
    pub fn foggy(fog_type: impl Into<String>, density: f32, color: [f32; 3]) -> Self {
        Self {
            has_fog: true,
            fog_type: Some(fog_type.into()),
            fog_density: density.clamp(0.0, 1.0),
            fog_color: color,
        }
    }

    /// Fog type as a string slice.
    #[must_use]
    pub fn fog_type(&self) -> Option<&str> {
        self.fog_type.as_deref()
    }
}

/// Opaque handle to the agent (usually the player) the fog follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentRef {
    /// Host entity of the agent.
    pub entity: EntityId,
    /// Last known world position.
    pub position: Vec3,
}

impl AgentRef {
    /// Create an agent handle.
    #[must_use]
    pub const fn new(entity: EntityId, position: Vec3) -> Self {
        Self { entity, position }
    }
}

impl Default for AgentRef {
    fn default() -> Self {
        Self::new(EntityId::NULL, Vec3::ZERO)
    }
}

/// Host world surface a biome populates chunks through.
pub trait WorldContext {
    /// Spawn an entity of `kind` at a world position and return its handle.
    fn spawn_entity(&mut self, kind: &str, position: Vec3) -> EntityId;
}

/// A pluggable biome implementation.
///
/// Only `descriptor` and `process_chunk` are required. Every other capability
/// has a no-op default, so a biome without fog callbacks reports no fog and the
/// fog machine never fades in for it.
pub trait Biome {
    /// Static descriptor of this biome.
    fn descriptor(&self) -> &BiomeDescriptor;

    /// Unique key of this biome.
    fn id(&self) -> &BiomeId {
        &self.descriptor().id
    }

    /// Registration hook, invoked once when the registry accepts this biome.
    fn register(&mut self) -> BiomeHandle {
        BiomeHandle::from(self.descriptor())
    }

    /// Current environmental properties.
    fn properties(&self) -> Result<BiomeProperties, BiomeError> {
        Ok(BiomeProperties::default())
    }

    /// Populate one chunk and return the spawned entities.
    fn process_chunk(
        &mut self,
        chunk: ChunkCoord,
        chunk_size: f32,
        world: &mut dyn WorldContext,
        seed: u64,
    ) -> Result<Vec<EntityId>, BiomeError>;

    /// Per-tick update (`delta_ms` in milliseconds).
    fn update(&mut self, _delta_ms: f32, _agent_position: Vec3) {}

    /// Forget or despawn entities farther than `radius` from the agent.
    fn cleanup_distant_entities(&mut self, _agent_position: Vec3, _radius: f32) {}

    /// Start fading fog in (`entering`) or out for the agent.
    fn handle_fog_transition(
        &mut self,
        _entering: bool,
        _agent: &AgentRef,
        _fog_type: Option<&str>,
    ) -> Result<(), BiomeError> {
        Ok(())
    }

    /// Switch the visible fog from one type to another.
    fn handle_fog_type_transition(
        &mut self,
        _from: Option<&str>,
        _to: Option<&str>,
        _agent: &AgentRef,
    ) -> Result<(), BiomeError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Barren {
        descriptor: BiomeDescriptor,
    }

    impl Biome for Barren {
        fn descriptor(&self) -> &BiomeDescriptor {
            &self.descriptor
        }

        fn process_chunk(
            &mut self,
            _chunk: ChunkCoord,
            _chunk_size: f32,
            _world: &mut dyn WorldContext,
            _seed: u64,
        ) -> Result<Vec<EntityId>, BiomeError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor = BiomeDescriptor::new("plains", "Plains");
        assert!((descriptor.weight - 1.0).abs() < f64::EPSILON);
        assert!(!descriptor.is_default);
        assert!(BiomeDescriptor::new("x", "X").as_default().is_default);
    }

    #[test]
    fn test_effective_weight() {
        assert!((BiomeDescriptor::new("a", "A").with_weight(3.0).effective_weight() - 3.0).abs() < f64::EPSILON);
        assert_eq!(BiomeDescriptor::new("a", "A").with_weight(-2.0).effective_weight(), 0.0);
        assert_eq!(BiomeDescriptor::new("a", "A").with_weight(f64::NAN).effective_weight(), 0.0);
    }

    #[test]
    fn test_default_capabilities_report_no_fog() {
        let mut biome = Barren {
            descriptor: BiomeDescriptor::new("barren", "Barren"),
        };
        let props = biome.properties().expect("default properties");
        assert!(!props.has_fog);
        assert_eq!(props.fog_type(), None);

        let agent = AgentRef::default();
        assert!(biome.handle_fog_transition(true, &agent, Some("mist")).is_ok());
        assert!(biome.handle_fog_type_transition(None, Some("mist"), &agent).is_ok());
        assert_eq!(biome.register().id.as_str(), "barren");
    }

    #[test]
    fn test_foggy_properties_clamp_density() {
        let props = BiomeProperties::foggy("mist", 2.0, [0.5, 0.6, 0.5]);
        assert!(props.has_fog);
        assert_eq!(props.fog_type(), Some("mist"));
        assert!((props.fog_density - 1.0).abs() < f32::EPSILON);
    }
}
