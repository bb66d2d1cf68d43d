//! Enemy AI transition table.
//!
//! Distance checks only: aggro range to engage, attack range to swing,
//! aggro range × disengage factor as hysteresis before giving up the chase.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{ActorState, SimRng, TransitionTable};
use crate::config::EnemyConfig;

/// Enemy AI state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
    Hurt,
    Death,
}

impl ActorState for EnemyState {
    fn is_terminal(&self) -> bool {
        matches!(self, EnemyState::Death)
    }

    fn animation_index(&self) -> i32 {
        *self as i32
    }
}

/// What an enemy senses this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemySenses {
    /// Distance to the player, `None` when there is no live target
    pub target_distance: Option<f32>,
}

impl TransitionTable for EnemyConfig {
    type State = EnemyState;
    type Senses = EnemySenses;

    fn next_state(&self, current: EnemyState, senses: &EnemySenses, rng: &mut SimRng) -> EnemyState {
        let disengage = self.aggro_range * self.disengage_factor;
        let distance = senses.target_distance;
        let in_aggro = distance.is_some_and(|d| d <= self.aggro_range);

        match current {
            EnemyState::Idle => {
                if in_aggro {
                    EnemyState::Chase
                } else if rng.gen::<f32>() < self.wander_chance {
                    EnemyState::Patrol
                } else {
                    EnemyState::Idle
                }
            }
            EnemyState::Patrol => {
                if in_aggro {
                    EnemyState::Chase
                } else if rng.gen::<f32>() < self.rest_chance {
                    EnemyState::Idle
                } else {
                    EnemyState::Patrol
                }
            }
            EnemyState::Chase => match distance {
                None => EnemyState::Idle,
                Some(d) if d <= self.attack_range => EnemyState::Attack,
                Some(d) if d > disengage => EnemyState::Idle,
                Some(_) => EnemyState::Chase,
            },
            EnemyState::Attack => match distance {
                None => EnemyState::Idle,
                Some(d) if d > disengage => EnemyState::Idle,
                Some(d) if d > self.attack_range => EnemyState::Chase,
                Some(_) => EnemyState::Attack,
            },
            // Timer driven
            EnemyState::Hurt | EnemyState::Death => current,
        }
    }
}
