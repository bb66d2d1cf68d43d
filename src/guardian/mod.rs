//! Guardian NPCs.
//!
//! A guardian starts imprisoned. The player frees it by interacting within
//! reach; freeing is permanent and is reported to progression by the
//! simulation. A freed guardian talks and offers its power whenever the
//! shared power cooldown is ready.

pub mod powers;

pub use powers::{GuardianPower, PowerActivation};

use bevy::math::Vec2;
use rand::Rng;

use crate::combat::{AbilityId, Cooldowns, Facing, SimRng, TickContext};
use crate::config::GuardianConfig;
use crate::presentation::{ActorId, Presentation};
use crate::scheduler::TimedEffectScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardianTimer {
    FreedVoice,
}

/// Result of the player pressing interact near a guardian
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    OutOfRange,
    /// The guardian was freed by this interaction
    Rescued { world: String },
    /// Already free; `offered` is the power when it is off cooldown
    Talked { offered: Option<GuardianPower> },
}

/// Audio clips a guardian uses
#[derive(Debug, Clone, PartialEq)]
pub struct GuardianVoice {
    pub imprisoned: String,
    pub freed: String,
    pub rescue: String,
}

impl GuardianVoice {
    fn for_guardian(name: &str) -> Self {
        let key = name.to_lowercase().replace(' ', "_");
        Self {
            imprisoned: format!("{key}_imprisoned"),
            freed: format!("{key}_freed"),
            rescue: "guardian_rescue".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Guardian {
    id: ActorId,
    name: String,
    world: String,
    position: Vec2,
    facing: Facing,
    imprisoned: bool,
    power: GuardianPower,
    config: GuardianConfig,
    voice: GuardianVoice,
    imprisoned_dialogue: Vec<String>,
    freed_dialogue: Vec<String>,
    cooldowns: Cooldowns,
    timers: TimedEffectScheduler<GuardianTimer>,
    player_in_range: bool,
}

impl Guardian {
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        world: impl Into<String>,
        power: GuardianPower,
        config: GuardianConfig,
        position: Vec2,
    ) -> Self {
        let name = name.into();
        Self {
            id,
            voice: GuardianVoice::for_guardian(&name),
            name,
            world: world.into(),
            position,
            facing: Facing::default(),
            imprisoned: true,
            power,
            config,
            imprisoned_dialogue: Vec::new(),
            freed_dialogue: Vec::new(),
            cooldowns: Cooldowns::new(),
            timers: TimedEffectScheduler::new(),
            player_in_range: false,
        }
    }

    pub fn with_dialogue(mut self, imprisoned: Vec<String>, freed: Vec<String>) -> Self {
        self.imprisoned_dialogue = imprisoned;
        self.freed_dialogue = freed;
        self
    }

    pub fn with_voice(mut self, voice: GuardianVoice) -> Self {
        self.voice = voice;
        self
    }

    /// Spawn already freed (the rescue happened earlier in the session).
    pub fn already_freed(mut self) -> Self {
        self.imprisoned = false;
        self
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn power(&self) -> GuardianPower {
        self.power
    }

    pub fn is_imprisoned(&self) -> bool {
        self.imprisoned
    }

    pub fn power_ready(&self) -> bool {
        !self.imprisoned && self.cooldowns.is_ready(AbilityId::GuardianPower)
    }

    pub fn power_cooldown_remaining(&self) -> f32 {
        self.cooldowns.remaining(AbilityId::GuardianPower)
    }

    pub fn in_reach(&self, point: Vec2) -> bool {
        self.position.distance(point) <= self.config.interaction_radius
    }

    pub fn tick(&mut self, delta: f32, player_position: Vec2, presentation: &mut dyn Presentation) {
        for expired in self.timers.advance(delta) {
            match expired.payload {
                GuardianTimer::FreedVoice => {
                    presentation.play_sound(&self.voice.freed, self.position, 1.0);
                }
            }
        }

        let in_range = self.in_reach(player_position);
        if in_range && !self.player_in_range {
            let clip = if self.imprisoned {
                &self.voice.imprisoned
            } else {
                &self.voice.freed
            };
            presentation.play_sound(clip, self.position, 1.0);
        }
        self.player_in_range = in_range;

        if self.imprisoned {
            return;
        }
        self.cooldowns.tick(delta);
        if in_range {
            self.facing = self.facing.toward(player_position.x - self.position.x);
        }
    }

    /// The player pressed interact at `player_position`.
    pub fn interact(&mut self, player_position: Vec2, ctx: &mut TickContext) -> Interaction {
        if !self.in_reach(player_position) {
            return Interaction::OutOfRange;
        }
        if self.imprisoned {
            self.rescue(ctx);
            return Interaction::Rescued {
                world: self.world.clone(),
            };
        }

        self.show_dialogue(ctx.presentation, ctx.rng);
        let offered = self.power_ready().then_some(self.power);
        if let Some(power) = offered {
            ctx.presentation
                .show_notification(&format!("{}: {}", self.name, power.name()));
        }
        Interaction::Talked { offered }
    }

    fn rescue(&mut self, ctx: &mut TickContext) {
        self.imprisoned = false;
        ctx.presentation.play_animation(self.id, "rescue");
        ctx.presentation.play_effect(Some(self.id), "freedom");
        ctx.presentation.play_sound(&self.voice.rescue, self.position, 1.0);
        self.timers
            .schedule(self.config.voice_delay, GuardianTimer::FreedVoice);
        self.show_dialogue(ctx.presentation, ctx.rng);
        tracing::info!(guardian = %self.name, world = %self.world, "guardian rescued");
    }

    fn show_dialogue(&self, presentation: &mut dyn Presentation, rng: &mut SimRng) {
        let lines = if self.imprisoned {
            &self.imprisoned_dialogue
        } else {
            &self.freed_dialogue
        };
        if lines.is_empty() {
            return;
        }
        let line = &lines[rng.gen_range(0..lines.len())];
        presentation.show_dialogue(&self.name, line);
    }

    /// Activate the power if freed and off cooldown. The caller applies the
    /// returned work to the world.
    pub fn use_power(&mut self, presentation: &mut dyn Presentation) -> Option<PowerActivation> {
        if !self.power_ready() {
            tracing::debug!(
                guardian = %self.name,
                imprisoned = self.imprisoned,
                cooldown = self.power_cooldown_remaining(),
                "guardian power unavailable"
            );
            return None;
        }
        presentation.play_animation(self.id, "usePower");
        presentation.play_effect(Some(self.id), self.power.effect());
        self.cooldowns
            .start(AbilityId::GuardianPower, self.config.power_cooldown);
        tracing::info!(guardian = %self.name, power = self.power.name(), "guardian power used");
        Some(self.power.activation(&self.config, self.position))
    }
}
