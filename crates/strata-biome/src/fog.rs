//! Environmental fog state machine.
//!
//! Follows the agent's current biome and fades an ambient fog in, out, or
//! between fog types. Timed transitions block re-evaluation until they finish,
//! and two cooldowns throttle eligibility checks:
//! - a short re-check interval while the fog is stable
//! - a longer settle window after each completed transition
//!
//! Together they keep an agent straddling a region edge from retriggering a
//! fade every tick. The visual effect itself is delegated to the biome through
//! [`crate::biome::Biome::handle_fog_transition`] and
//! [`crate::biome::Biome::handle_fog_type_transition`].

use serde::{Deserialize, Serialize};
use strata_common::BiomeId;
use tracing::{debug, info, warn};

use crate::biome::{AgentRef, BiomeProperties};
use crate::config::FogTimings;
use crate::registry::BiomeRegistry;

/// States of the fog machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FogState {
    /// No fog shown.
    #[default]
    Inactive,
    /// Fog is fading in.
    FadingIn,
    /// Fog is fully shown.
    Active,
    /// Fog is fading out.
    FadingOut,
    /// Fog is switching from one type to another.
    Transitioning,
}

impl FogState {
    /// Get the display name for this state.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::FadingIn => "Fading In",
            Self::Active => "Active",
            Self::FadingOut => "Fading Out",
            Self::Transitioning => "Transitioning",
        }
    }

    /// Whether biome eligibility may be evaluated in this state.
    #[must_use]
    pub fn accepts_checks(self) -> bool {
        matches!(self, Self::Inactive | Self::Active | Self::Transitioning)
    }

    /// Whether this state runs on a timer.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Self::FadingIn | Self::FadingOut | Self::Transitioning)
    }
}

/// A change made by one [`FogStateMachine::tick`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FogTransition {
    /// Fog started fading in for a biome.
    FadeIn {
        /// Biome whose fog is shown.
        biome: BiomeId,
        /// Fog type being shown.
        fog_type: Option<String>,
    },
    /// Fog started fading out.
    FadeOut {
        /// Biome whose fog is leaving.
        biome: BiomeId,
        /// Fog type being removed.
        fog_type: Option<String>,
    },
    /// Fog started switching type.
    TypeSwitch {
        /// Biome that now owns the fog.
        biome: BiomeId,
        /// Previous fog type.
        from: Option<String>,
        /// New fog type.
        to: Option<String>,
    },
    /// A timed transition finished.
    Completed {
        /// State that finished.
        from: FogState,
        /// State entered.
        to: FogState,
    },
}

/// Fog state machine driven once per simulation tick.
#[derive(Debug, Clone)]
pub struct FogStateMachine {
    state: FogState,
    active_biome: Option<BiomeId>,
    active_fog_type: Option<String>,
    state_timer_ms: f32,
    check_cooldown_ms: f32,
    timings: FogTimings,
}

impl Default for FogStateMachine {
    fn default() -> Self {
        Self::new(FogTimings::default())
    }
}

impl FogStateMachine {
    /// Create an inactive machine.
    #[must_use]
    pub fn new(timings: FogTimings) -> Self {
        Self {
            state: FogState::Inactive,
            active_biome: None,
            active_fog_type: None,
            state_timer_ms: 0.0,
            check_cooldown_ms: 0.0,
            timings,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> FogState {
        self.state
    }

    /// Biome whose fog is shown or transitioning.
    #[must_use]
    pub fn active_biome(&self) -> Option<&BiomeId> {
        self.active_biome.as_ref()
    }

    /// Fog type established by the last fade-in or type switch.
    #[must_use]
    pub fn active_fog_type(&self) -> Option<&str> {
        self.active_fog_type.as_deref()
    }

    /// Milliseconds left in the current timed transition.
    #[must_use]
    pub fn state_timer_ms(&self) -> f32 {
        self.state_timer_ms
    }

    /// Milliseconds left before the next eligibility check.
    #[must_use]
    pub fn check_cooldown_ms(&self) -> f32 {
        self.check_cooldown_ms
    }

    /// Timings in use.
    #[must_use]
    pub fn timings(&self) -> &FogTimings {
        &self.timings
    }

    /// Progress through the current timed transition (0.0 to 1.0).
    /// Stable states report 1.0.
    #[must_use]
    pub fn transition_progress(&self) -> f32 {
        let duration = match self.state {
            FogState::FadingIn => self.timings.fade_in_ms,
            FogState::FadingOut => self.timings.fade_out_ms,
            FogState::Transitioning => self.timings.type_transition_ms,
            FogState::Inactive | FogState::Active => return 1.0,
        };
        (1.0 - self.state_timer_ms / duration).clamp(0.0, 1.0)
    }

    /// Force the machine back to `Inactive` with no active biome and both
    /// timers at zero.
    pub fn reset(&mut self) {
        self.state = FogState::Inactive;
        self.active_biome = None;
        self.active_fog_type = None;
        self.state_timer_ms = 0.0;
        self.check_cooldown_ms = 0.0;
    }

    /// Advance the machine by `delta_ms` milliseconds.
    ///
    /// `current` is the biome the agent stands in. The state timer decays
    /// first, then the check cooldown, then eligibility is checked. Returns
    /// the changes made this tick in order: at most a completion followed by
    /// a newly started transition. Safe to call every frame: while a fade
    /// runs, eligibility checks are skipped.
    pub fn tick(
        &mut self,
        delta_ms: f32,
        current: Option<&BiomeId>,
        registry: &mut BiomeRegistry,
        agent: &AgentRef,
    ) -> Vec<FogTransition> {
        let mut changes = Vec::new();

        if self.state_timer_ms > 0.0 {
            self.state_timer_ms -= delta_ms;
            if self.state_timer_ms <= 0.0 {
                self.state_timer_ms = 0.0;
                changes.push(self.on_transition_complete());
            }
        }

        if self.check_cooldown_ms > 0.0 {
            self.check_cooldown_ms = (self.check_cooldown_ms - delta_ms).max(0.0);
        }

        if !self.state.accepts_checks() || self.check_cooldown_ms > 0.0 {
            return changes;
        }

        let Some(current) = current else {
            debug!("Fog check skipped: agent has no biome");
            return changes;
        };
        changes.extend(self.check_eligibility(current, registry, agent));
        changes
    }

    fn check_eligibility(
        &mut self,
        current: &BiomeId,
        registry: &mut BiomeRegistry,
        agent: &AgentRef,
    ) -> Option<FogTransition> {
        let Some(slot) = registry.slot_of(current.as_str()) else {
            debug!("Fog check skipped: biome '{current}' is not registered");
            return None;
        };
        let properties: BiomeProperties = match registry.get(slot).map(|b| b.properties()) {
            Some(Ok(props)) => props,
            Some(Err(err)) => {
                warn!("Fog check skipped: {err}");
                return None;
            },
            None => return None,
        };

        let change = match self.state {
            FogState::Inactive if properties.has_fog => {
                Some(self.begin_fade_in(current, slot, properties.fog_type, registry, agent))
            },
            FogState::Active if !properties.has_fog => self.begin_fade_out(registry, agent),
            FogState::Active if properties.fog_type != self.active_fog_type => {
                Some(self.begin_type_switch(current, slot, properties.fog_type, registry, agent))
            },
            _ => None,
        };

        self.check_cooldown_ms = self.timings.check_interval_ms;
        change
    }

    fn begin_fade_in(
        &mut self,
        biome: &BiomeId,
        slot: usize,
        fog_type: Option<String>,
        registry: &mut BiomeRegistry,
        agent: &AgentRef,
    ) -> FogTransition {
        info!("Fog fading in: biome='{biome}' type={fog_type:?}");
        self.state = FogState::FadingIn;
        self.active_biome = Some(biome.clone());
        self.active_fog_type.clone_from(&fog_type);
        self.state_timer_ms = self.timings.fade_in_ms;

        if let Some(target) = registry.get_mut(slot) {
            if let Err(err) = target.handle_fog_transition(true, agent, fog_type.as_deref()) {
                warn!("Fog fade-in callback failed: {err}");
            }
        }

        FogTransition::FadeIn {
            biome: biome.clone(),
            fog_type,
        }
    }

    fn begin_fade_out(&mut self, registry: &mut BiomeRegistry, agent: &AgentRef) -> Option<FogTransition> {
        let Some(biome) = self.active_biome.clone() else {
            warn!("Fog active without an active biome; resetting");
            self.reset();
            return None;
        };
        info!("Fog fading out: biome='{biome}' type={:?}", self.active_fog_type);
        self.state = FogState::FadingOut;
        self.state_timer_ms = self.timings.fade_out_ms;

        match registry.get_biome_by_id_mut(biome.as_str()) {
            Some(target) => {
                if let Err(err) = target.handle_fog_transition(false, agent, self.active_fog_type.as_deref()) {
                    warn!("Fog fade-out callback failed: {err}");
                }
            },
            None => warn!("Active fog biome '{biome}' is no longer registered"),
        }

        Some(FogTransition::FadeOut {
            biome,
            fog_type: self.active_fog_type.clone(),
        })
    }

    fn begin_type_switch(
        &mut self,
        biome: &BiomeId,
        slot: usize,
        fog_type: Option<String>,
        registry: &mut BiomeRegistry,
        agent: &AgentRef,
    ) -> FogTransition {
        let from = self.active_fog_type.take();
        info!("Fog switching type: {from:?} -> {fog_type:?} (biome='{biome}')");
        self.state = FogState::Transitioning;
        self.state_timer_ms = self.timings.type_transition_ms;

        if let Some(target) = registry.get_mut(slot) {
            if let Err(err) = target.handle_fog_type_transition(from.as_deref(), fog_type.as_deref(), agent) {
                warn!("Fog type transition callback failed: {err}");
            }
        }
        self.active_biome = Some(biome.clone());
        self.active_fog_type.clone_from(&fog_type);

        FogTransition::TypeSwitch {
            biome: biome.clone(),
            from,
            to: fog_type,
        }
    }

    fn on_transition_complete(&mut self) -> FogTransition {
        let from = self.state;
        match from {
            FogState::FadingIn | FogState::Transitioning => {
                self.state = FogState::Active;
            },
            FogState::FadingOut => {
                self.state = FogState::Inactive;
                self.active_biome = None;
                self.active_fog_type = None;
            },
            FogState::Inactive | FogState::Active => {},
        }
        self.check_cooldown_ms = self.timings.settle_ms;
        debug!("Fog transition complete: {:?} -> {:?}", from, self.state);

        FogTransition::Completed { from, to: self.state }
    }
}
