//! Integer health pool shared by every combat actor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// May go below zero on an overkill hit
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }

    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Subtract exactly `amount`. Returns the amount removed.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        self.current = self.current.saturating_sub(amount);
        amount
    }

    /// Add `amount`, capped at max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount.max(0)).min(self.max);
        self.current - before
    }

    /// Add `amount` without the max cap (boss phase bonus).
    pub fn restore_uncapped(&mut self, amount: i32) {
        self.current = self.current.saturating_add(amount.max(0));
    }
}

/// Result of a `take_damage` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Dead, invulnerable, blocking or non-positive amount
    Ignored,
    Hurt { dealt: i32 },
    Killed { dealt: i32 },
}

impl DamageOutcome {
    pub fn dealt(&self) -> i32 {
        match self {
            DamageOutcome::Ignored => 0,
            DamageOutcome::Hurt { dealt } | DamageOutcome::Killed { dealt } => *dealt,
        }
    }

    pub fn is_kill(&self) -> bool {
        matches!(self, DamageOutcome::Killed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_can_overkill() {
        let mut hp = Health::new(100);
        assert_eq!(hp.apply_damage(150), 150);
        assert_eq!(hp.current, -50);
        assert!(hp.is_depleted());
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut hp = Health::new(100);
        hp.apply_damage(30);
        assert_eq!(hp.heal(50), 30);
        assert_eq!(hp.current, 100);
    }

    #[test]
    fn test_restore_uncapped() {
        let mut hp = Health::new(500);
        hp.apply_damage(10);
        hp.restore_uncapped(50);
        assert_eq!(hp.current, 540);
    }

    #[test]
    fn test_zero_max_clamped() {
        let hp = Health::new(0);
        assert_eq!(hp.max, 1);
        assert!(hp.is_alive());
    }

    #[test]
    fn test_outcome_dealt() {
        assert_eq!(DamageOutcome::Ignored.dealt(), 0);
        assert_eq!(DamageOutcome::Hurt { dealt: 7 }.dealt(), 7);
        assert!(DamageOutcome::Killed { dealt: 3 }.is_kill());
    }
}
