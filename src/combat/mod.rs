//! Shared combat vocabulary: health, facing, cooldowns, the state-machine
//! abstraction and the actions actor ticks hand back to the simulation.

use bevy::math::Vec2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::presentation::{ActorId, Layer, Presentation};

pub mod cooldown;
pub mod health;
pub mod state_machine;

pub use cooldown::{AbilityId, Cooldowns};
pub use health::{DamageOutcome, Health};
pub use state_machine::{ActorState, StateMachine, Transition, TransitionTable};

/// Deterministic RNG used for every stochastic decision in the core
pub type SimRng = Xoshiro256PlusPlus;

pub fn seeded_rng(seed: u64) -> SimRng {
    Xoshiro256PlusPlus::seed_from_u64(seed)
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(&self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing after looking along `dx`; unchanged when `dx` is zero.
    pub fn toward(self, dx: f32) -> Self {
        if dx > 0.0 {
            Facing::Right
        } else if dx < 0.0 {
            Facing::Left
        } else {
            self
        }
    }
}

/// Collaborators handed to actor ticks
pub struct TickContext<'a> {
    pub presentation: &'a mut dyn Presentation,
    pub rng: &'a mut SimRng,
}

impl<'a> TickContext<'a> {
    pub fn new(presentation: &'a mut dyn Presentation, rng: &'a mut SimRng) -> Self {
        Self { presentation, rng }
    }
}

/// Damage delivered at a point, resolved by the simulation through an overlap query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub source: ActorId,
    pub origin: Vec2,
    pub radius: f32,
    pub damage: i32,
    /// Layer the strike can hit
    pub layer: Layer,
}

/// Requests an actor tick makes of the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombatAction {
    Strike(Strike),
    /// The post-death delay elapsed; remove the actor
    Despawn(ActorId),
}

/// Capability set shared by every combat actor.
pub trait Combatant {
    fn id(&self) -> ActorId;
    fn health(&self) -> Health;
    fn is_dead(&self) -> bool;
    fn is_invulnerable(&self) -> bool;
    fn position(&self) -> Vec2;

    /// Apply a hit. No-op when dead, invulnerable or `amount <= 0`.
    fn take_damage(&mut self, amount: i32, presentation: &mut dyn Presentation) -> DamageOutcome;
}

/// Horizontal knockback sign: away from the target, or behind when there is none.
pub(crate) fn knockback_sign(position: Vec2, target: Option<Vec2>, facing: Facing) -> f32 {
    match target {
        Some(t) if t.x != position.x => (position.x - t.x).signum(),
        _ => -facing.sign(),
    }
}
