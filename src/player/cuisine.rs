//! Regional dishes the player picks up for healing and timed buffs.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::{BuffCategory, Player};
use crate::combat::Combatant;
use crate::constants::{CUISINE_PICKUP_RADIUS, CUISINE_SCORE};
use crate::presentation::{ActorId, Presentation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CuisineEffect {
    Heal,
    SpeedBuff,
    AttackBuff,
    DefenseBuff,
    JumpBuff,
    /// Heal plus a spread of speed, attack and defense
    MultiEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuisine {
    pub name: String,
    pub world_origin: String,
    pub description: String,
    pub effect: CuisineEffect,
    pub heal_amount: i32,
    pub buff_amount: f32,
    pub buff_duration: f32,
    pub score_value: u32,
    pub pickup_radius: f32,
}

impl Cuisine {
    pub fn new(name: impl Into<String>, world_origin: impl Into<String>, effect: CuisineEffect) -> Self {
        Self {
            name: name.into(),
            world_origin: world_origin.into(),
            description: String::new(),
            effect,
            heal_amount: 0,
            buff_amount: 0.0,
            buff_duration: 0.0,
            score_value: CUISINE_SCORE,
            pickup_radius: CUISINE_PICKUP_RADIUS,
        }
    }

    pub fn with_heal(mut self, amount: i32) -> Self {
        self.heal_amount = amount;
        self
    }

    pub fn with_buff(mut self, amount: f32, duration: f32) -> Self {
        self.buff_amount = amount;
        self.buff_duration = duration;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Buff contributions this dish grants. The same list is removed on expiry.
    pub fn buff_contributions(&self) -> Vec<(BuffCategory, f32)> {
        let amount = self.buff_amount;
        match self.effect {
            CuisineEffect::Heal => Vec::new(),
            CuisineEffect::SpeedBuff => vec![(BuffCategory::Speed, amount)],
            CuisineEffect::AttackBuff => vec![(BuffCategory::Attack, amount.round())],
            CuisineEffect::DefenseBuff => vec![(BuffCategory::Defense, amount)],
            CuisineEffect::JumpBuff => vec![(BuffCategory::Jump, amount)],
            CuisineEffect::MultiEffect => vec![
                (BuffCategory::Speed, amount * 0.5),
                (BuffCategory::Attack, (amount * 0.3).round()),
                (BuffCategory::Defense, amount * 0.4),
            ],
        }
    }

    fn heals(&self) -> bool {
        matches!(self.effect, CuisineEffect::Heal | CuisineEffect::MultiEffect)
    }

    /// Apply heal and buffs to the player and return the buffs to revert
    /// after `buff_duration`.
    pub fn apply_to(
        &self,
        player: &mut Player,
        presentation: &mut dyn Presentation,
    ) -> Vec<(BuffCategory, f32)> {
        if self.heals() {
            player.heal(self.heal_amount, presentation);
            presentation.play_effect(Some(player.id()), "heal");
        }
        let contributions = self.buff_contributions();
        for (category, amount) in &contributions {
            player.buffs_mut().add_buff(*category, *amount);
        }
        presentation.show_notification(&format!("{} ({})", self.name, self.world_origin));
        contributions
    }
}

/// A dish lying in the level
#[derive(Debug, Clone, PartialEq)]
pub struct CuisineCollectible {
    pub id: ActorId,
    pub cuisine: Cuisine,
    pub position: Vec2,
}

impl CuisineCollectible {
    pub fn new(id: ActorId, cuisine: Cuisine, position: Vec2) -> Self {
        Self {
            id,
            cuisine,
            position,
        }
    }

    pub fn in_reach(&self, point: Vec2) -> bool {
        self.position.distance(point) <= self.cuisine.pickup_radius
    }
}
