//! Player movement state, derived fresh every tick from velocity and input.

use serde::{Deserialize, Serialize};

use crate::combat::{ActorState, SimRng, TransitionTable};
use crate::config::PlayerConfig;
use crate::constants::{AIRBORNE_VELOCITY_EPSILON, WALK_INPUT_THRESHOLD};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    Walking,
    Running,
    Sprinting,
    Jumping,
    Falling,
    Dead,
}

impl ActorState for MovementState {
    fn is_terminal(&self) -> bool {
        matches!(self, MovementState::Dead)
    }

    fn animation_index(&self) -> i32 {
        *self as i32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementSenses {
    pub vertical_velocity: f32,
    /// Horizontal input axis in [-1, 1]
    pub horizontal_input: f32,
    pub sprint: bool,
}

impl TransitionTable for PlayerConfig {
    type State = MovementState;
    type Senses = MovementSenses;

    fn next_state(
        &self,
        current: MovementState,
        senses: &MovementSenses,
        _rng: &mut SimRng,
    ) -> MovementState {
        if current == MovementState::Dead {
            return current;
        }
        let input = senses.horizontal_input.abs();
        if senses.vertical_velocity > AIRBORNE_VELOCITY_EPSILON {
            MovementState::Jumping
        } else if senses.vertical_velocity < -AIRBORNE_VELOCITY_EPSILON {
            MovementState::Falling
        } else if input <= f32::EPSILON {
            MovementState::Idle
        } else if senses.sprint {
            MovementState::Sprinting
        } else if input < WALK_INPUT_THRESHOLD {
            MovementState::Walking
        } else {
            MovementState::Running
        }
    }
}
