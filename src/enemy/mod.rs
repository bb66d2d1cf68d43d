//! Basic hostile actor.
//!
//! Idle/patrol until the player comes within aggro range, chase, then attack
//! on a cooldown with a windup. Damage knocks the enemy back into a short
//! Hurt state; death disables collision and schedules removal.

pub mod ai;

pub use ai::{EnemySenses, EnemyState};

use bevy::math::Vec2;
use rand::Rng;

use crate::combat::{
    knockback_sign, AbilityId, ActorState, CombatAction, Combatant, Cooldowns, DamageOutcome,
    Facing, Health, StateMachine, Strike, TickContext,
};
use crate::config::EnemyConfig;
use crate::presentation::{ActorId, Layer, Presentation};
use crate::scheduler::{EffectHandle, TimedEffectScheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnemyTimer {
    /// Attack windup finished; strike if still attacking and in range
    Strike,
    KnockbackRecovery,
    Despawn,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    id: ActorId,
    config: EnemyConfig,
    health: Health,
    machine: StateMachine<EnemyState>,
    facing: Facing,
    position: Vec2,
    /// Horizontal velocity
    velocity: f32,
    cooldowns: Cooldowns,
    timers: TimedEffectScheduler<EnemyTimer>,
    recovery: Option<EffectHandle>,
    last_target: Option<Vec2>,
    collidable: bool,
}

impl Enemy {
    pub fn new(id: ActorId, config: EnemyConfig, position: Vec2) -> Self {
        Self {
            id,
            health: Health::new(config.max_health),
            config,
            machine: StateMachine::new(EnemyState::Idle),
            facing: Facing::Right,
            position,
            velocity: 0.0,
            cooldowns: Cooldowns::new(),
            timers: TimedEffectScheduler::new(),
            recovery: None,
            last_target: None,
            collidable: true,
        }
    }

    pub fn state(&self) -> EnemyState {
        self.machine.current()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.config
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Zero velocity (time freeze).
    pub fn halt(&mut self) {
        self.velocity = 0.0;
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn attack_point(&self) -> Vec2 {
        self.position + Vec2::new(self.facing.sign() * self.config.attack_range * 0.5, 0.0)
    }

    fn face(&mut self, target: Vec2) {
        self.facing = self.facing.toward(target.x - self.position.x);
    }

    /// Advance one tick.
    ///
    /// `target` is the live player's position. While `frozen` the enemy does
    /// nothing but let its timers run; strikes landing in that window are dropped.
    pub fn tick(
        &mut self,
        delta: f32,
        target: Option<Vec2>,
        frozen: bool,
        ctx: &mut TickContext,
    ) -> Vec<CombatAction> {
        let mut actions = Vec::new();
        self.last_target = target;
        let distance = target.map(|t| t.distance(self.position));

        for expired in self.timers.advance(delta) {
            match expired.payload {
                EnemyTimer::Strike => {
                    if frozen {
                        tracing::trace!(target: "liberation_core::combat", id = %self.id, "strike dropped while frozen");
                        continue;
                    }
                    let in_range = distance.is_some_and(|d| d <= self.config.attack_range);
                    if self.machine.is(EnemyState::Attack) && in_range {
                        actions.push(CombatAction::Strike(Strike {
                            source: self.id,
                            origin: self.attack_point(),
                            radius: self.config.strike_radius,
                            damage: self.config.damage,
                            layer: Layer::Player,
                        }));
                    }
                }
                EnemyTimer::KnockbackRecovery => {
                    self.recovery = None;
                    if !self.is_dead() {
                        self.velocity = 0.0;
                        let in_aggro = distance.is_some_and(|d| d <= self.config.aggro_range);
                        let next = if in_aggro {
                            EnemyState::Chase
                        } else {
                            EnemyState::Idle
                        };
                        self.machine.force(next);
                    }
                }
                EnemyTimer::Despawn => actions.push(CombatAction::Despawn(self.id)),
            }
        }

        if self.is_dead() || frozen {
            return actions;
        }

        self.cooldowns.tick(delta);
        let senses = EnemySenses {
            target_distance: distance,
        };
        if let Some(transition) = self.machine.step(&self.config, &senses, ctx.rng, delta) {
            if matches!(transition.to, EnemyState::Idle | EnemyState::Attack) {
                self.velocity = 0.0;
            }
        }

        match self.machine.current() {
            EnemyState::Patrol => {
                if ctx.rng.gen::<f32>() < self.config.turn_chance {
                    self.facing = self.facing.flipped();
                }
                self.velocity = self.facing.sign() * self.config.move_speed * 0.5;
            }
            EnemyState::Chase => {
                if let Some(t) = target {
                    let dx = t.x - self.position.x;
                    self.face(t);
                    self.velocity = if dx.abs() > f32::EPSILON {
                        dx.signum() * self.config.move_speed
                    } else {
                        0.0
                    };
                }
            }
            EnemyState::Attack => {
                self.velocity = 0.0;
                if let Some(t) = target {
                    self.face(t);
                }
                if self.cooldowns.is_ready(AbilityId::Attack) {
                    ctx.presentation.play_animation(self.id, "attack");
                    self.cooldowns
                        .start(AbilityId::Attack, 1.0 / self.config.attack_rate);
                    self.timers
                        .schedule(self.config.attack_windup, EnemyTimer::Strike);
                }
            }
            EnemyState::Idle | EnemyState::Hurt | EnemyState::Death => {}
        }

        self.position.x += self.velocity * delta;
        ctx.presentation
            .set_animation_state(self.id, self.machine.current().animation_index());
        actions
    }

    fn die(&mut self, presentation: &mut dyn Presentation) {
        self.machine.force(EnemyState::Death);
        presentation.play_animation(self.id, "death");
        self.velocity = 0.0;
        self.collidable = false;
        self.timers.clear();
        self.recovery = None;
        self.timers
            .schedule(self.config.despawn_delay, EnemyTimer::Despawn);
        tracing::debug!(target: "liberation_core::combat", id = %self.id, "enemy died");
    }
}

impl Combatant for Enemy {
    fn id(&self) -> ActorId {
        self.id
    }

    fn health(&self) -> Health {
        self.health
    }

    fn is_dead(&self) -> bool {
        self.machine.is(EnemyState::Death)
    }

    fn is_invulnerable(&self) -> bool {
        false
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn take_damage(&mut self, amount: i32, presentation: &mut dyn Presentation) -> DamageOutcome {
        if amount <= 0 || self.is_dead() || self.is_invulnerable() {
            return DamageOutcome::Ignored;
        }
        let dealt = self.health.apply_damage(amount);
        presentation.play_animation(self.id, "hurt");

        if self.health.is_depleted() {
            self.die(presentation);
            return DamageOutcome::Killed { dealt };
        }

        self.machine.force(EnemyState::Hurt);
        self.velocity =
            knockback_sign(self.position, self.last_target, self.facing) * self.config.knockback_speed;
        if let Some(previous) = self.recovery.take() {
            self.timers.cancel(previous);
        }
        self.recovery = Some(
            self.timers
                .schedule(self.config.knockback_recovery, EnemyTimer::KnockbackRecovery),
        );
        DamageOutcome::Hurt { dealt }
    }
}
