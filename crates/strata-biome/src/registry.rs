//! Registry of pluggable biome implementations.
//!
//! Biomes are stored as boxed trait objects in registration order and indexed
//! by their [`BiomeId`]. Registration order matters: weighted selection walks
//! biomes in that order, and the first registered biome is the default unless
//! one is explicitly marked.

use ahash::AHashMap;
use strata_common::{BiomeError, BiomeId};
use tracing::{debug, info, warn};

use crate::biome::{Biome, BiomeDescriptor, BiomeHandle};

/// Registered biomes plus the designated default.
#[derive(Default)]
pub struct BiomeRegistry {
    biomes: Vec<Box<dyn Biome>>,
    handles: Vec<BiomeHandle>,
    index: AHashMap<BiomeId, usize>,
    default_slot: Option<usize>,
    explicit_default: bool,
}

impl std::fmt::Debug for BiomeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiomeRegistry")
            .field("biomes", &self.handles)
            .field("default_slot", &self.default_slot)
            .finish_non_exhaustive()
    }
}

impl BiomeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a biome, rejecting duplicate IDs with a typed error.
    pub fn try_register(&mut self, mut biome: Box<dyn Biome>) -> Result<BiomeHandle, BiomeError> {
        let descriptor = biome.descriptor().clone();
        if self.index.contains_key(&descriptor.id) {
            return Err(BiomeError::DuplicateBiome(descriptor.id));
        }

        let slot = self.biomes.len();
        let handle = biome.register();
        self.index.insert(descriptor.id.clone(), slot);
        self.biomes.push(biome);
        self.handles.push(handle.clone());
        self.resolve_default(slot, &descriptor);

        info!(
            "Registered biome '{}' ({}) weight={} slot={}",
            descriptor.id, descriptor.name, descriptor.weight, slot
        );
        Ok(handle)
    }

    /// Register a biome. A duplicate ID is logged and the handle of the
    /// biome already registered under that ID is returned unchanged.
    pub fn register_biome(&mut self, biome: Box<dyn Biome>) -> BiomeHandle {
        let descriptor = biome.descriptor().clone();
        match self.try_register(biome) {
            Ok(handle) => handle,
            Err(err) => {
                warn!("{err}; keeping existing registration");
                self.slot_of(descriptor.id.as_str())
                    .and_then(|slot| self.handles.get(slot))
                    .cloned()
                    .unwrap_or_else(|| BiomeHandle::from(&descriptor))
            },
        }
    }

    fn resolve_default(&mut self, slot: usize, descriptor: &BiomeDescriptor) {
        if descriptor.is_default {
            if self.explicit_default {
                warn!(
                    "Biome '{}' is marked default but a default is already set; ignoring",
                    descriptor.id
                );
                return;
            }
            self.explicit_default = true;
            self.default_slot = Some(slot);
            debug!("Default biome set to '{}'", descriptor.id);
        } else if self.default_slot.is_none() {
            self.default_slot = Some(slot);
            debug!("Default biome falls back to first registered '{}'", descriptor.id);
        }
    }

    /// Check whether a biome with this ID is registered.
    #[must_use]
    pub fn has_biome(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Registration slot of a biome ID.
    #[must_use]
    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Biome in a registration slot.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&dyn Biome> {
        let biome: &dyn Biome = self.biomes.get(slot)?.as_ref();
        Some(biome)
    }

    /// Mutable biome in a registration slot.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut dyn Biome> {
        let biome: &mut dyn Biome = self.biomes.get_mut(slot)?.as_mut();
        Some(biome)
    }

    /// Look up a biome by ID.
    #[must_use]
    pub fn get_biome_by_id(&self, id: &str) -> Option<&dyn Biome> {
        self.get(self.slot_of(id)?)
    }

    /// Look up a biome by ID, failing with [`BiomeError::UnknownBiome`].
    pub fn require(&self, id: &str) -> Result<&dyn Biome, BiomeError> {
        self.get_biome_by_id(id)
            .ok_or_else(|| BiomeError::UnknownBiome(BiomeId::from(id)))
    }

    /// Look up a biome by ID for mutation.
    pub fn get_biome_by_id_mut(&mut self, id: &str) -> Option<&mut dyn Biome> {
        let slot = self.slot_of(id)?;
        self.get_mut(slot)
    }

    /// Snapshot of all descriptors in registration order.
    ///
    /// The returned list is owned; changing it does not affect the registry.
    #[must_use]
    pub fn get_all_biomes(&self) -> Vec<BiomeDescriptor> {
        self.biomes.iter().map(|b| b.descriptor().clone()).collect()
    }

    /// The default biome, if any biome is registered.
    #[must_use]
    pub fn get_default_biome(&self) -> Option<&dyn Biome> {
        self.get(self.default_slot?)
    }

    /// Registration slot of the default biome.
    #[must_use]
    pub fn default_slot(&self) -> Option<usize> {
        self.default_slot
    }

    /// Handle returned when the biome in `slot` was registered.
    #[must_use]
    pub fn handle(&self, slot: usize) -> Option<&BiomeHandle> {
        self.handles.get(slot)
    }

    /// Number of registered biomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Whether no biome is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    /// Iterate over biomes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Biome + 'static)> + '_ {
        self.biomes.iter().map(AsRef::as_ref)
    }

    /// Iterate mutably over biomes in registration order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Box<dyn Biome>> {
        self.biomes.iter_mut()
    }
}
