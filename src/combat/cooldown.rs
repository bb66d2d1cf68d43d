//! Cooldown tracking for cooldown-gated actions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Actions gated by a cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityId {
    Attack,
    SpecialAttack,
    Block,
    GuardianPower,
}

/// ability → remaining cooldown seconds
#[derive(Debug, Clone, Default)]
pub struct Cooldowns {
    remaining: HashMap<AbilityId, f32>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if ability is off cooldown
    pub fn is_ready(&self, ability: AbilityId) -> bool {
        self.remaining.get(&ability).is_none_or(|cd| *cd <= 0.0)
    }

    /// Start (or restart) the cooldown for an ability
    pub fn start(&mut self, ability: AbilityId, seconds: f32) {
        self.remaining.insert(ability, seconds.max(0.0));
    }

    /// Tick all cooldowns by delta time
    pub fn tick(&mut self, delta: f32) {
        let delta = delta.max(0.0);
        for cd in self.remaining.values_mut() {
            *cd = (*cd - delta).max(0.0);
        }
    }

    pub fn remaining(&self, ability: AbilityId) -> f32 {
        self.remaining.get(&ability).copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self, ability: AbilityId) {
        self.remaining.remove(&ability);
    }
}
