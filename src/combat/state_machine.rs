//! Shared actor state machine.
//!
//! Each actor type supplies a [`TransitionTable`] (its own state enum plus a
//! snapshot of what it can sense this tick). [`StateMachine`] holds the
//! bookkeeping common to all of them: current/previous state, time spent in
//! the current state, forced transitions and the terminal-state lock.

use std::fmt::Debug;

use super::SimRng;

/// A state enum usable by [`StateMachine`].
pub trait ActorState: Copy + Eq + Debug {
    /// Terminal states accept no further transitions, forced or not.
    fn is_terminal(&self) -> bool;

    /// Integer published to the animation collaborator every tick
    fn animation_index(&self) -> i32;
}

/// Per-actor transition function: current state + sensed world -> next state.
///
/// States driven by timers (Hurt, Death, windups) should map to themselves.
pub trait TransitionTable {
    type State: ActorState;
    type Senses;

    fn next_state(&self, current: Self::State, senses: &Self::Senses, rng: &mut SimRng)
        -> Self::State;
}

/// A state change produced by [`StateMachine::step`] or [`StateMachine::force`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: S,
    pub to: S,
}

#[derive(Debug, Clone)]
pub struct StateMachine<S> {
    current: S,
    previous: S,
    time_in_state: f32,
}

impl<S: ActorState> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: initial,
            time_in_state: 0.0,
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn previous(&self) -> S {
        self.previous
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn is(&self, state: S) -> bool {
        self.current == state
    }

    /// Advance time in state and consult the table once.
    pub fn step<T>(
        &mut self,
        table: &T,
        senses: &T::Senses,
        rng: &mut SimRng,
        delta: f32,
    ) -> Option<Transition<S>>
    where
        T: TransitionTable<State = S>,
    {
        self.time_in_state += delta.max(0.0);
        if self.current.is_terminal() {
            return None;
        }
        let next = table.next_state(self.current, senses, rng);
        if next == self.current {
            return None;
        }
        Some(self.enter(next))
    }

    /// Jump straight to `next` (hurt, death, timer completions).
    ///
    /// Re-entering the current state resets its timer. Refused from a
    /// terminal state.
    pub fn force(&mut self, next: S) -> Option<Transition<S>> {
        if self.current.is_terminal() {
            return None;
        }
        Some(self.enter(next))
    }

    fn enter(&mut self, next: S) -> Transition<S> {
        let from = self.current;
        self.previous = from;
        self.current = next;
        self.time_in_state = 0.0;
        tracing::debug!(target: "liberation_core::combat", ?from, to = ?next, "state transition");
        Transition { from, to: next }
    }
}
