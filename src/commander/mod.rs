//! World boss.
//!
//! A commander chases inside its detection range and alternates between a
//! rotation of attack patterns and a cooldown-gated special attack. The first
//! non-lethal hit that takes it to half health triggers a one-time phase
//! transition: invulnerable for a window, then a heal, a speed boost and the
//! phase-two pattern list. Its death is what counts toward liberating its
//! world; the simulation reports it.

pub mod ai;
pub mod patterns;

pub use ai::{CommanderSenses, CommanderState};
pub use patterns::PatternRotation;

use bevy::math::Vec2;

use crate::combat::{
    knockback_sign, AbilityId, ActorState, CombatAction, Combatant, Cooldowns, DamageOutcome,
    Facing, Health, StateMachine, Strike, TickContext,
};
use crate::config::CommanderConfig;
use crate::presentation::{ActorId, Layer, Presentation};
use crate::scheduler::{EffectHandle, TimedEffectScheduler};

#[derive(Debug, Clone, Copy, PartialEq)]
enum CommanderTimer {
    PatternStrike { damage: i32, range: f32 },
    PatternDone,
    SpecialStrike,
    SpecialDone,
    KnockbackRecovery,
    PhaseComplete,
    Despawn,
}

impl CommanderTimer {
    fn is_attack(&self) -> bool {
        matches!(
            self,
            CommanderTimer::PatternStrike { .. }
                | CommanderTimer::PatternDone
                | CommanderTimer::SpecialStrike
                | CommanderTimer::SpecialDone
        )
    }
}

#[derive(Debug, Clone)]
pub struct Commander {
    id: ActorId,
    name: String,
    world: String,
    config: CommanderConfig,
    health: Health,
    machine: StateMachine<CommanderState>,
    facing: Facing,
    position: Vec2,
    velocity: f32,
    move_speed: f32,
    second_phase: bool,
    invulnerable: bool,
    rotation: PatternRotation,
    cooldowns: Cooldowns,
    timers: TimedEffectScheduler<CommanderTimer>,
    recovery: Option<EffectHandle>,
    last_target: Option<Vec2>,
    collidable: bool,
}

impl Commander {
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        world: impl Into<String>,
        config: CommanderConfig,
        position: Vec2,
    ) -> Self {
        let mut cooldowns = Cooldowns::new();
        // Special is not available on spawn
        cooldowns.start(AbilityId::SpecialAttack, config.special_cooldown);
        Self {
            id,
            name: name.into(),
            world: world.into(),
            health: Health::new(config.max_health),
            move_speed: config.move_speed,
            config,
            machine: StateMachine::new(CommanderState::Idle),
            facing: Facing::Right,
            position,
            velocity: 0.0,
            second_phase: false,
            invulnerable: false,
            rotation: PatternRotation::new(),
            cooldowns,
            timers: TimedEffectScheduler::new(),
            recovery: None,
            last_target: None,
            collidable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn state(&self) -> CommanderState {
        self.machine.current()
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_second_phase(&self) -> bool {
        self.second_phase
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn special_cooldown_remaining(&self) -> f32 {
        self.cooldowns.remaining(AbilityId::SpecialAttack)
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn halt(&mut self) {
        self.velocity = 0.0;
    }

    fn phase_threshold_health(&self) -> i32 {
        (self.health.max as f32 * self.config.phase_threshold) as i32
    }

    fn attack_point(&self) -> Vec2 {
        self.position + Vec2::new(self.facing.sign() * self.config.attack_range * 0.5, 0.0)
    }

    fn face(&mut self, target: Vec2) {
        self.facing = self.facing.toward(target.x - self.position.x);
    }

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
                CommanderTimer::PatternStrike { damage, range } => {
                    if frozen {
                        tracing::trace!(target: "liberation_core::combat", id = %self.id, "pattern strike dropped while frozen");
                        continue;
                    }
                    let in_range = distance.is_some_and(|d| d <= range);
                    if self.machine.is(CommanderState::Attack) && in_range {
                        actions.push(CombatAction::Strike(Strike {
                            source: self.id,
                            origin: self.attack_point(),
                            radius: range,
                            damage,
                            layer: Layer::Player,
                        }));
                    }
                }
                CommanderTimer::PatternDone => {
                    if self.machine.is(CommanderState::Attack) {
                        self.machine.force(CommanderState::Chase);
                    }
                }
                CommanderTimer::SpecialStrike => {
                    self.cooldowns
                        .start(AbilityId::SpecialAttack, self.config.special_cooldown);
                    if frozen {
                        tracing::trace!(target: "liberation_core::combat", id = %self.id, "special strike dropped while frozen");
                    } else if self.machine.is(CommanderState::SpecialAttack) {
                        ctx.presentation.play_effect(Some(self.id), "specialAttack");
                        actions.push(CombatAction::Strike(Strike {
                            source: self.id,
                            origin: self.attack_point(),
                            radius: self.config.attack_range * self.config.special_radius_factor,
                            damage: self.config.special_damage,
                            layer: Layer::Player,
                        }));
                    }
                    self.timers
                        .schedule(self.config.special_recovery, CommanderTimer::SpecialDone);
                }
                CommanderTimer::SpecialDone => {
                    if self.machine.is(CommanderState::SpecialAttack) {
                        self.machine.force(CommanderState::Chase);
                    }
                }
                CommanderTimer::KnockbackRecovery => {
                    self.recovery = None;
                    if self.machine.is(CommanderState::Hurt) {
                        self.velocity = 0.0;
                        let next = self.engage_state(distance);
                        self.machine.force(next);
                    }
                }
                CommanderTimer::PhaseComplete => self.complete_phase_transition(distance, ctx),
                CommanderTimer::Despawn => actions.push(CombatAction::Despawn(self.id)),
            }
        }

        if self.is_dead() || frozen {
            return actions;
        }

        self.cooldowns.tick(delta);
        let senses = CommanderSenses {
            target_distance: distance,
            special_ready: self.cooldowns.is_ready(AbilityId::SpecialAttack),
        };
        if let Some(transition) = self.machine.step(&self.config, &senses, ctx.rng, delta) {
            match transition.to {
                CommanderState::Attack => {
                    self.velocity = 0.0;
                    self.begin_pattern(ctx.presentation);
                }
                CommanderState::SpecialAttack => {
                    self.velocity = 0.0;
                    ctx.presentation.play_animation(self.id, "specialAttack");
                    self.timers
                        .schedule(self.config.special_windup, CommanderTimer::SpecialStrike);
                }
                _ => {}
            }
        }

        match self.machine.current() {
            CommanderState::Chase => {
                if let Some(t) = target {
                    let dx = t.x - self.position.x;
                    if distance.is_some_and(|d| d > self.config.attack_range)
                        && dx.abs() > f32::EPSILON
                    {
                        self.face(t);
                        self.velocity = dx.signum() * self.move_speed;
                    } else {
                        self.velocity = 0.0;
                    }
                }
            }
            CommanderState::Attack | CommanderState::SpecialAttack => {
                self.velocity = 0.0;
                if let Some(t) = target {
                    self.face(t);
                }
            }
            CommanderState::Idle | CommanderState::PhaseTransition => self.velocity = 0.0,
            CommanderState::Hurt | CommanderState::Death => {}
        }

        self.position.x += self.velocity * delta;
        ctx.presentation
            .set_animation_state(self.id, self.machine.current().animation_index());
        actions
    }

    fn begin_pattern(&mut self, presentation: &mut dyn Presentation) {
        let patterns = if self.second_phase {
            &self.config.phase_two_patterns
        } else {
            &self.config.phase_one_patterns
        };
        let Some(pattern) = self.rotation.next(patterns) else {
            self.machine.force(CommanderState::Chase);
            return;
        };
        let (damage, range, cooldown) = (pattern.damage, pattern.range, pattern.cooldown);
        presentation.play_animation(self.id, &pattern.animation_trigger);
        tracing::debug!(target: "liberation_core::combat", id = %self.id, pattern = %pattern.name, "commander attack");

        let windup = self.config.pattern_windup;
        self.timers
            .schedule(windup, CommanderTimer::PatternStrike { damage, range });
        self.timers
            .schedule(windup + cooldown, CommanderTimer::PatternDone);
    }

    fn begin_phase_transition(&mut self, presentation: &mut dyn Presentation) {
        self.second_phase = true;
        self.invulnerable = true;
        self.velocity = 0.0;
        self.timers
            .cancel_where(|t| t.is_attack() || *t == CommanderTimer::KnockbackRecovery);
        self.recovery = None;
        self.machine.force(CommanderState::PhaseTransition);
        presentation.play_animation(self.id, "phaseChange");
        presentation.play_effect(Some(self.id), "phaseChange");
        self.timers
            .schedule(self.config.phase_window, CommanderTimer::PhaseComplete);
        tracing::info!(
            target: "liberation_core::combat",
            commander = %self.name,
            health = self.health.current,
            "commander entering second phase"
        );
    }

    fn complete_phase_transition(&mut self, distance: Option<f32>, ctx: &mut TickContext) {
        if self.is_dead() {
            return;
        }
        let heal = self
            .health
            .max
            .checked_div(self.config.phase_heal_divisor)
            .unwrap_or(0);
        self.health.restore_uncapped(heal);
        self.move_speed *= self.config.phase_speed_multiplier;
        self.invulnerable = false;
        let next = self.engage_state(distance);
        self.machine.force(next);
        ctx.presentation
            .update_health_display(self.health.current, self.health.max);
    }

    /// Chase when the target is within detection range, Idle otherwise
    fn engage_state(&self, distance: Option<f32>) -> CommanderState {
        if distance.is_some_and(|d| d <= self.config.detection_range) {
            CommanderState::Chase
        } else {
            CommanderState::Idle
        }
    }

    fn die(&mut self, presentation: &mut dyn Presentation) {
        self.machine.force(CommanderState::Death);
        presentation.play_animation(self.id, "death");
        self.velocity = 0.0;
        self.collidable = false;
        self.invulnerable = false;
        self.timers.clear();
        self.recovery = None;
        self.timers
            .schedule(self.config.despawn_delay, CommanderTimer::Despawn);
        tracing::info!(
            target: "liberation_core::combat",
            commander = %self.name,
            world = %self.world,
            "commander defeated"
        );
    }
}

impl Combatant for Commander {
    fn id(&self) -> ActorId {
        self.id
    }

    fn health(&self) -> Health {
        self.health
    }

    fn is_dead(&self) -> bool {
        self.machine.is(CommanderState::Death)
    }

    fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn take_damage(&mut self, amount: i32, presentation: &mut dyn Presentation) -> DamageOutcome {
        if amount <= 0 || self.is_dead() || self.invulnerable {
            return DamageOutcome::Ignored;
        }
        let dealt = self.health.apply_damage(amount);
        presentation.play_animation(self.id, "hurt");

        if self.health.is_depleted() {
            self.die(presentation);
            return DamageOutcome::Killed { dealt };
        }

        if !self.second_phase && self.health.current <= self.phase_threshold_health() {
            self.begin_phase_transition(presentation);
            return DamageOutcome::Hurt { dealt };
        }

        self.timers.cancel_where(CommanderTimer::is_attack);
        self.machine.force(CommanderState::Hurt);
        self.velocity = knockback_sign(self.position, self.last_target, self.facing)
            * self.config.knockback_speed;
        if let Some(previous) = self.recovery.take() {
            self.timers.cancel(previous);
        }
        self.recovery = Some(
            self.timers
                .schedule(self.config.knockback_recovery, CommanderTimer::KnockbackRecovery),
        );
        DamageOutcome::Hurt { dealt }
    }
}
