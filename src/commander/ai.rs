//! Commander transition table.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{ActorState, SimRng, TransitionTable};
use crate::config::CommanderConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommanderState {
    #[default]
    Idle,
    Chase,
    Attack,
    SpecialAttack,
    Hurt,
    Death,
    PhaseTransition,
}

impl ActorState for CommanderState {
    fn is_terminal(&self) -> bool {
        matches!(self, CommanderState::Death)
    }

    fn animation_index(&self) -> i32 {
        *self as i32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommanderSenses {
    pub target_distance: Option<f32>,
    pub special_ready: bool,
}

impl TransitionTable for CommanderConfig {
    type State = CommanderState;
    type Senses = CommanderSenses;

    fn next_state(
        &self,
        current: CommanderState,
        senses: &CommanderSenses,
        rng: &mut SimRng,
    ) -> CommanderState {
        match current {
            CommanderState::Idle => match senses.target_distance {
                Some(d) if d <= self.detection_range => CommanderState::Chase,
                _ => CommanderState::Idle,
            },
            CommanderState::Chase => match senses.target_distance {
                None => CommanderState::Idle,
                Some(d) if d <= self.attack_range => {
                    // Only roll when the special is actually available
                    if senses.special_ready && rng.gen::<f32>() < self.special_chance {
                        CommanderState::SpecialAttack
                    } else {
                        CommanderState::Attack
                    }
                }
                Some(_) => CommanderState::Chase,
            },
            // Attacks, phase change and hurt all end on timers
            _ => current,
        }
    }
}
