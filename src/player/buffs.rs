//! Additive buff accumulators.
//!
//! Every buff is an add paired with a later remove of the identical amount.
//! Totals are not clamped. When the last active contribution of a category
//! is removed the accumulator snaps back to exactly zero so float drift
//! cannot build up over a long session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffCategory {
    /// Fraction added to movement speed
    Speed,
    /// Flat attack damage
    Attack,
    /// Fraction of incoming damage removed
    Defense,
    /// Fraction added to jump force
    Jump,
}

impl BuffCategory {
    pub const ALL: [BuffCategory; 4] = [
        BuffCategory::Speed,
        BuffCategory::Attack,
        BuffCategory::Defense,
        BuffCategory::Jump,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuffSet {
    totals: [f32; 4],
    active: [u32; 4],
}

impl BuffSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_buff(&mut self, category: BuffCategory, amount: f32) {
        let slot = category.slot();
        self.totals[slot] += amount;
        self.active[slot] += 1;
    }

    /// Returns `false` and leaves the total untouched when no contribution
    /// of `category` is active.
    pub fn remove_buff(&mut self, category: BuffCategory, amount: f32) -> bool {
        let slot = category.slot();
        match self.active[slot] {
            0 => {
                tracing::warn!(?category, amount, "removing a buff that was never added");
                return false;
            }
            1 => {
                self.active[slot] = 0;
                self.totals[slot] = 0.0;
            }
            _ => {
                self.active[slot] -= 1;
                self.totals[slot] -= amount;
            }
        }
        true
    }

    pub fn value(&self, category: BuffCategory) -> f32 {
        self.totals[category.slot()]
    }

    pub fn active_count(&self, category: BuffCategory) -> u32 {
        self.active[category.slot()]
    }

    pub fn speed(&self) -> f32 {
        self.value(BuffCategory::Speed)
    }

    /// Attack bonus rounded to whole damage points
    pub fn attack(&self) -> i32 {
        self.value(BuffCategory::Attack).round() as i32
    }

    pub fn defense(&self) -> f32 {
        self.value(BuffCategory::Defense)
    }

    pub fn jump(&self) -> f32 {
        self.value(BuffCategory::Jump)
    }
}
