//! Guardian powers and what each one asks the simulation to do.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GuardianConfig;
use crate::player::BuffCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardianPower {
    /// Player back to full health
    Healing,
    /// Player invincible for a while
    DamageShield,
    AttackBoost,
    /// Every enemy and commander disabled for a while
    TimeFreeze,
    /// Heavy damage to every hostile around the guardian
    AreaAttack,
    /// Attack and speed together
    ElementalBurst,
}

impl GuardianPower {
    pub const ALL: [GuardianPower; 6] = [
        GuardianPower::Healing,
        GuardianPower::DamageShield,
        GuardianPower::AttackBoost,
        GuardianPower::TimeFreeze,
        GuardianPower::AreaAttack,
        GuardianPower::ElementalBurst,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GuardianPower::Healing => "Healing",
            GuardianPower::DamageShield => "Damage Shield",
            GuardianPower::AttackBoost => "Attack Boost",
            GuardianPower::TimeFreeze => "Time Freeze",
            GuardianPower::AreaAttack => "Area Attack",
            GuardianPower::ElementalBurst => "Elemental Burst",
        }
    }

    /// Effect name played on activation
    pub fn effect(&self) -> &'static str {
        match self {
            GuardianPower::Healing => "guardianHeal",
            GuardianPower::DamageShield => "guardianShield",
            GuardianPower::AttackBoost => "guardianAttackBoost",
            GuardianPower::TimeFreeze => "timeFreeze",
            GuardianPower::AreaAttack => "areaShockwave",
            GuardianPower::ElementalBurst => "elementalBurst",
        }
    }

    /// Resolve the power into concrete work, using `origin` as the guardian's position.
    pub fn activation(&self, config: &GuardianConfig, origin: Vec2) -> PowerActivation {
        match self {
            GuardianPower::Healing => PowerActivation::HealPlayer,
            GuardianPower::DamageShield => PowerActivation::Shield {
                duration: config.shield_duration,
            },
            GuardianPower::AttackBoost => PowerActivation::Buffs {
                buffs: vec![(BuffCategory::Attack, config.attack_boost)],
                duration: config.attack_boost_duration,
            },
            GuardianPower::TimeFreeze => PowerActivation::Freeze {
                duration: config.freeze_duration,
            },
            GuardianPower::AreaAttack => PowerActivation::AreaAttack {
                origin,
                radius: config.area_attack_radius,
                damage: config.area_attack_damage,
            },
            GuardianPower::ElementalBurst => PowerActivation::Buffs {
                buffs: vec![
                    (BuffCategory::Attack, config.elemental_attack),
                    (BuffCategory::Speed, config.elemental_speed),
                ],
                duration: config.elemental_duration,
            },
        }
    }
}

/// Work the simulation performs for an activated power. Timed variants are
/// reverted through the simulation's effect scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum PowerActivation {
    HealPlayer,
    Shield { duration: f32 },
    Buffs { buffs: Vec<(BuffCategory, f32)>, duration: f32 },
    Freeze { duration: f32 },
    AreaAttack { origin: Vec2, radius: f32, damage: i32 },
}
