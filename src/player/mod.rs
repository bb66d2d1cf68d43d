//! Player character controller.
//!
//! Movement state is derived each tick from input and vertical velocity;
//! attack and block are cooldown-gated one-shots layered on top. Incoming
//! damage goes through the defense buff, then hit invincibility frames.

pub mod buffs;
pub mod cuisine;
pub mod movement;

pub use buffs::{BuffCategory, BuffSet};
pub use cuisine::{Cuisine, CuisineCollectible, CuisineEffect};
pub use movement::{MovementSenses, MovementState};

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::{
    AbilityId, ActorState, CombatAction, Combatant, Cooldowns, DamageOutcome, Facing, Health,
    StateMachine, Strike, TickContext,
};
use crate::config::PlayerConfig;
use crate::presentation::{ActorId, Layer, Presentation};
use crate::scheduler::{EffectHandle, TimedEffectScheduler};

/// One tick of player input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Horizontal axis in [-1, 1]
    pub horizontal: f32,
    pub jump: bool,
    pub attack: bool,
    pub block: bool,
    pub sprint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerTimer {
    InvincibilityEnd,
    BlockEnd,
}

#[derive(Debug, Clone)]
pub struct Player {
    id: ActorId,
    config: PlayerConfig,
    health: Health,
    machine: StateMachine<MovementState>,
    facing: Facing,
    position: Vec2,
    velocity: Vec2,
    grounded: bool,
    buffs: BuffSet,
    cooldowns: Cooldowns,
    timers: TimedEffectScheduler<PlayerTimer>,
    iframes: Option<EffectHandle>,
    hit_invincible: bool,
    /// Granted from outside (guardian shield), independent of hit frames
    granted_invincible: bool,
    blocking: bool,
}

impl Player {
    pub fn new(id: ActorId, config: PlayerConfig, position: Vec2) -> Self {
        let position = Vec2::new(position.x, position.y.max(0.0));
        Self {
            id,
            health: Health::new(config.max_health),
            config,
            machine: StateMachine::new(MovementState::Idle),
            facing: Facing::Right,
            grounded: position.y <= 0.0,
            position,
            velocity: Vec2::ZERO,
            buffs: BuffSet::new(),
            cooldowns: Cooldowns::new(),
            timers: TimedEffectScheduler::new(),
            iframes: None,
            hit_invincible: false,
            granted_invincible: false,
            blocking: false,
        }
    }

    pub fn state(&self) -> MovementState {
        self.machine.current()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn buffs(&self) -> &BuffSet {
        &self.buffs
    }

    pub fn buffs_mut(&mut self) -> &mut BuffSet {
        &mut self.buffs
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = Vec2::new(position.x, position.y.max(0.0));
        self.grounded = self.position.y <= 0.0;
        if self.grounded {
            self.velocity.y = 0.0;
        }
    }

    /// Damage of one swing with the current attack buff
    pub fn attack_damage(&self) -> i32 {
        self.config.attack_damage + self.buffs.attack()
    }

    /// Base speed for the input scaled by the speed buff
    pub fn move_speed(&self, input: &PlayerInput) -> f32 {
        let base = if input.sprint {
            self.config.sprint_speed
        } else if input.horizontal.abs() < crate::constants::WALK_INPUT_THRESHOLD {
            self.config.walk_speed
        } else {
            self.config.run_speed
        };
        base * (1.0 + self.buffs.speed())
    }

    pub fn jump_velocity(&self) -> f32 {
        self.config.jump_force * (1.0 + self.buffs.jump())
    }

    /// Restore health up to max. Returns the amount restored.
    pub fn heal(&mut self, amount: i32, presentation: &mut dyn Presentation) -> i32 {
        if self.is_dead() {
            return 0;
        }
        let restored = self.health.heal(amount);
        presentation.update_health_display(self.health.current, self.health.max);
        restored
    }

    pub fn heal_to_full(&mut self, presentation: &mut dyn Presentation) -> i32 {
        self.heal(self.health.max, presentation)
    }

    /// Grant or revoke invincibility from an outside source.
    pub fn make_invincible(&mut self, invincible: bool, presentation: &mut dyn Presentation) {
        self.granted_invincible = invincible;
        if invincible {
            presentation.play_effect(Some(self.id), "shield");
        }
    }

    fn attack_point(&self) -> Vec2 {
        self.position + Vec2::new(self.facing.sign() * self.config.attack_reach, 0.0)
    }

    pub fn tick(&mut self, delta: f32, input: &PlayerInput, ctx: &mut TickContext) -> Vec<CombatAction> {
        let mut actions = Vec::new();
        if self.is_dead() {
            return actions;
        }

        for expired in self.timers.advance(delta) {
            match expired.payload {
                PlayerTimer::InvincibilityEnd => {
                    self.iframes = None;
                    self.hit_invincible = false;
                }
                PlayerTimer::BlockEnd => self.blocking = false,
            }
        }
        self.cooldowns.tick(delta);

        let horizontal = if input.horizontal.is_finite() {
            input.horizontal.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.velocity.x = horizontal * self.move_speed(input);
        self.facing = self.facing.toward(horizontal);

        if input.jump && self.grounded {
            self.velocity.y = self.jump_velocity();
            self.grounded = false;
            ctx.presentation.play_animation(self.id, "jump");
        }

        if !self.grounded {
            self.velocity.y -= self.config.gravity * delta;
            self.position.y += self.velocity.y * delta;
            if self.position.y <= 0.0 {
                self.position.y = 0.0;
                self.velocity.y = 0.0;
                self.grounded = true;
            }
        }
        self.position.x += self.velocity.x * delta;

        if input.attack && self.cooldowns.is_ready(AbilityId::Attack) {
            ctx.presentation.play_animation(self.id, "attack");
            self.cooldowns
                .start(AbilityId::Attack, 1.0 / self.config.attack_rate);
            actions.push(CombatAction::Strike(Strike {
                source: self.id,
                origin: self.attack_point(),
                radius: self.config.attack_range,
                damage: self.attack_damage(),
                layer: Layer::Enemy,
            }));
        }

        if input.block && self.cooldowns.is_ready(AbilityId::Block) {
            ctx.presentation.play_animation(self.id, "block");
            self.blocking = true;
            self.cooldowns
                .start(AbilityId::Block, self.config.block_window);
            self.timers
                .schedule(self.config.block_window, PlayerTimer::BlockEnd);
        }

        let senses = MovementSenses {
            vertical_velocity: self.velocity.y,
            horizontal_input: horizontal,
            sprint: input.sprint,
        };
        self.machine.step(&self.config, &senses, ctx.rng, delta);
        ctx.presentation
            .set_animation_state(self.id, self.machine.current().animation_index());
        actions
    }

    fn die(&mut self, presentation: &mut dyn Presentation) {
        self.machine.force(MovementState::Dead);
        presentation.play_animation(self.id, "death");
        self.velocity = Vec2::ZERO;
        self.blocking = false;
        self.timers.clear();
        tracing::info!(target: "liberation_core::combat", "player died");
    }
}

impl Combatant for Player {
    fn id(&self) -> ActorId {
        self.id
    }

    fn health(&self) -> Health {
        self.health
    }

    fn is_dead(&self) -> bool {
        self.machine.is(MovementState::Dead)
    }

    fn is_invulnerable(&self) -> bool {
        self.hit_invincible || self.granted_invincible
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn take_damage(&mut self, amount: i32, presentation: &mut dyn Presentation) -> DamageOutcome {
        if amount <= 0 || self.is_dead() || self.blocking || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }
        let reduction = (amount as f32 * self.buffs.defense()).floor() as i32;
        let applied = (amount - reduction).max(1);
        let dealt = self.health.apply_damage(applied);

        presentation.play_animation(self.id, "hurt");
        presentation.update_health_display(self.health.current, self.health.max);

        if self.health.is_depleted() {
            self.die(presentation);
            return DamageOutcome::Killed { dealt };
        }

        self.hit_invincible = true;
        if let Some(previous) = self.iframes.take() {
            self.timers.cancel(previous);
        }
        self.iframes = Some(
            self.timers
                .schedule(self.config.invincibility_duration, PlayerTimer::InvincibilityEnd),
        );
        DamageOutcome::Hurt { dealt }
    }
}
