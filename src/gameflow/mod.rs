//! Session Game Flow
//!
//! Top-level session states: Playing ⇄ Paused, Playing → GameOver on player
//! death, Playing → Victory once the final battle is won. GameOver and
//! Victory are terminal for the session.
//!
//! The simulation owns a [`GameFlow`]; the engine plugin mirrors its state
//! into Bevy's `State<GameFlowState>` so systems can use `OnEnter`/`OnExit`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::progression::ProgressionGraph;

/// Top-level session states
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameFlowState {
    /// Simulation ticking normally
    #[default]
    Playing,
    /// Ticks suspended
    Paused,
    /// Player died
    GameOver,
    /// Final battle won
    Victory,
}

impl GameFlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameFlowState::GameOver | GameFlowState::Victory)
    }
}

/// Events emitted on flow changes
#[derive(Event, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameFlowEvent {
    Paused,
    Resumed,
    GameOver { score: u32 },
    FinalBattleStarted { scene: String },
    Victory { score: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct GameFlow {
    state: GameFlowState,
    final_battle_started: bool,
    events: Vec<GameFlowEvent>,
}

impl GameFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GameFlowState {
        self.state
    }

    /// True while ticks should advance
    pub fn is_running(&self) -> bool {
        self.state == GameFlowState::Playing
    }

    pub fn is_final_battle_started(&self) -> bool {
        self.final_battle_started
    }

    pub fn pause(&mut self) -> bool {
        if self.state != GameFlowState::Playing {
            return false;
        }
        self.state = GameFlowState::Paused;
        self.events.push(GameFlowEvent::Paused);
        info!("GameFlow: Game Paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != GameFlowState::Paused {
            return false;
        }
        self.state = GameFlowState::Playing;
        self.events.push(GameFlowEvent::Resumed);
        info!("GameFlow: Game Resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            GameFlowState::Playing => self.pause(),
            GameFlowState::Paused => self.resume(),
            _ => false,
        }
    }

    pub fn game_over(&mut self, progression: &ProgressionGraph) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = GameFlowState::GameOver;
        let score = progression.score();
        self.events.push(GameFlowEvent::GameOver { score });
        info!(score, "GameFlow: Game Over");
        true
    }

    /// Enter the final battle. Only allowed once every world is liberated
    /// and the unlock has fired.
    pub fn start_final_battle(&mut self, progression: &ProgressionGraph) -> bool {
        if self.state != GameFlowState::Playing || self.final_battle_started {
            return false;
        }
        if !progression.is_final_battle_unlocked() {
            warn!(
                liberated = progression.liberated_world_count(),
                "final battle requested before it was unlocked"
            );
            return false;
        }
        self.final_battle_started = true;
        let scene = progression.final_battle_scene().to_string();
        info!(scene = %scene, "GameFlow: Final battle started");
        self.events.push(GameFlowEvent::FinalBattleStarted { scene });
        true
    }

    /// Final battle won: record the score and hand off to the save hook.
    pub fn declare_victory(&mut self, progression: &ProgressionGraph) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = GameFlowState::Victory;
        let score = progression.score();
        info!(score, "GameFlow: Victory");
        progression.save();
        self.events.push(GameFlowEvent::Victory { score });
        true
    }

    pub fn drain_events(&mut self) -> Vec<GameFlowEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Serializable flow summary for front ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameFlowSnapshot {
    pub state: String,
    pub score: u32,
    pub liberated_worlds: usize,
    pub final_battle_started: bool,
}

pub fn create_snapshot(flow: &GameFlow, progression: &ProgressionGraph) -> GameFlowSnapshot {
    GameFlowSnapshot {
        state: format!("{:?}", flow.state()),
        score: progression.score(),
        liberated_worlds: progression.liberated_world_count(),
        final_battle_started: flow.is_final_battle_started(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgressionConfig;
    use crate::presentation::NullPresentation;

    fn single_world() -> ProgressionGraph {
        ProgressionGraph::new(ProgressionConfig {
            worlds: vec!["Hellas".into()],
            ..Default::default()
        })
    }

    #[test]
    fn test_default_state() {
        assert_eq!(GameFlowState::default(), GameFlowState::Playing);
        assert!(GameFlow::new().is_running());
    }

    #[test]
    fn test_pause_resume() {
        let mut flow = GameFlow::new();
        assert!(!flow.resume());
        assert!(flow.pause());
        assert!(!flow.is_running());
        assert!(!flow.pause());
        assert!(flow.toggle_pause());
        assert_eq!(flow.state(), GameFlowState::Playing);
        assert_eq!(flow.drain_events(), vec![GameFlowEvent::Paused, GameFlowEvent::Resumed]);
    }

    #[test]
    fn test_game_over_is_terminal() {
        let progression = single_world();
        let mut flow = GameFlow::new();
        assert!(flow.game_over(&progression));
        assert!(!flow.pause());
        assert!(!flow.declare_victory(&progression));
        assert!(!flow.game_over(&progression));
        assert_eq!(flow.state(), GameFlowState::GameOver);
    }

    #[test]
    fn test_final_battle_requires_unlock() {
        let mut progression = single_world();
        let mut flow = GameFlow::new();
        assert!(!flow.start_final_battle(&progression));

        let mut p = NullPresentation;
        progression.report_commander_defeated("Hellas", &mut p);
        progression.report_guardian_rescued("Hellas", &mut p);
        // Unlock fires on the following progression tick
        assert!(!flow.start_final_battle(&progression));
        progression.tick(&mut p);
        assert!(flow.start_final_battle(&progression));
        assert!(!flow.start_final_battle(&progression));

        assert!(flow.declare_victory(&progression));
        let snapshot = create_snapshot(&flow, &progression);
        assert_eq!(snapshot.state, "Victory");
        assert_eq!(snapshot.score, 3500);
        assert!(snapshot.final_battle_started);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&GameFlowState::Paused).unwrap();
        let parsed: GameFlowState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, GameFlowState::Paused);
    }
}
