//! Event bus for biome and fog notifications.
//!
//! The fog machine calls biome callbacks directly; the same transitions are
//! also published here so a render or audio layer can react without holding
//! a biome reference.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use strata_common::{BiomeId, ChunkCoord};
use tracing::warn;

use crate::fog::{FogState, FogTransition};

/// Events emitted by the biome system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BiomeEvent {
    /// Fog should start fading in (`entering`) or out.
    FogTransitionRequested {
        /// Biome owning the fog
        biome: BiomeId,
        /// Fading in when true, out when false
        entering: bool,
        /// Fog type
        fog_type: Option<String>,
    },
    /// Fog should switch from one type to another.
    FogTypeTransitionRequested {
        /// Biome owning the fog after the switch
        biome: BiomeId,
        /// Previous type
        from: Option<String>,
        /// New type
        to: Option<String>,
    },
    /// A timed fog transition finished.
    FogStateChanged {
        /// Previous state
        from: FogState,
        /// New state
        to: FogState,
    },
    /// The agent walked into a different biome.
    PlayerBiomeChanged {
        /// Biome left
        from: Option<BiomeId>,
        /// Biome entered
        to: Option<BiomeId>,
    },
    /// A chunk received entities from its biome.
    ChunkPopulated {
        /// Chunk coordinate
        chunk: ChunkCoord,
        /// Biome that populated it
        biome: BiomeId,
        /// Number of entities spawned
        spawned: usize,
    },
}

impl From<FogTransition> for BiomeEvent {
    fn from(transition: FogTransition) -> Self {
        match transition {
            FogTransition::FadeIn { biome, fog_type } => Self::FogTransitionRequested {
                biome,
                entering: true,
                fog_type,
            },
            FogTransition::FadeOut { biome, fog_type } => Self::FogTransitionRequested {
                biome,
                entering: false,
                fog_type,
            },
            FogTransition::TypeSwitch { biome, from, to } => {
                Self::FogTypeTransitionRequested { biome, from, to }
            },
            FogTransition::Completed { from, to } => Self::FogStateChanged { from, to },
        }
    }
}

/// Event bus for broadcasting biome events to the host.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<BiomeEvent>,
    /// Receiver for collecting events
    receiver: Receiver<BiomeEvent>,
    /// Channel capacity
    capacity: usize,
    /// Events dropped because the channel was full
    dropped: AtomicU64,
    /// Set by the first drop since the last drain
    overflowing: AtomicBool,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
            dropped: AtomicU64::new(0),
            overflowing: AtomicBool::new(false),
        }
    }

    /// Publishes an event to the bus.
    ///
    /// Non-blocking: if the bus is full the event is dropped and counted.
    /// The first drop after each drain is logged.
    pub fn publish(&self, event: BiomeEvent) {
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if !self.overflowing.swap(true, Ordering::Relaxed) {
                warn!(
                    "Event bus full ({} pending), dropping {event:?}; {dropped} dropped so far",
                    self.capacity
                );
            }
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<BiomeEvent> {
        self.overflowing.store(false, Ordering::Relaxed);
        self.receiver.try_iter().collect()
    }

    /// Discards all pending events.
    pub fn clear(&self) {
        self.overflowing.store(false, Ordering::Relaxed);
        while self.receiver.try_recv().is_ok() {}
    }

    /// Total events dropped because the bus was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a receiver handle for a subscriber on another system.
    ///
    /// Receivers share one queue: each event is delivered to exactly one of
    /// them.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<BiomeEvent> {
        self.receiver.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(BiomeEvent::FogStateChanged {
            from: FogState::FadingIn,
            to: FogState::Active,
        });
        assert_eq!(bus.pending_count(), 1);

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(2);
        for _ in 0..5 {
            bus.publish(BiomeEvent::PlayerBiomeChanged { from: None, to: None });
        }
        assert_eq!(bus.pending_count(), 2);
        assert_eq!(bus.capacity(), 2);
        assert_eq!(bus.dropped_count(), 3);
        bus.clear();
        assert_eq!(bus.pending_count(), 0);

        bus.publish(BiomeEvent::PlayerBiomeChanged { from: None, to: None });
        assert_eq!(bus.drain().len(), 1);
        assert_eq!(bus.dropped_count(), 3);
    }

    #[test]
    fn test_subscriber_receives_events() {
        let bus = EventBus::new(4);
        let rx = bus.subscribe();
        bus.publish(BiomeEvent::PlayerBiomeChanged {
            from: None,
            to: Some(BiomeId::from("marsh")),
        });
        assert!(matches!(rx.try_recv(), Ok(BiomeEvent::PlayerBiomeChanged { .. })));
    }

    #[test]
    fn test_fog_transition_conversion() {
        let event = BiomeEvent::from(FogTransition::FadeOut {
            biome: BiomeId::from("marsh"),
            fog_type: Some("mist".to_owned()),
        });
        assert_eq!(
            event,
            BiomeEvent::FogTransitionRequested {
                biome: BiomeId::from("marsh"),
                entering: false,
                fog_type: Some("mist".to_owned()),
            }
        );
    }
}
