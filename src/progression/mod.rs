//! World liberation progression.
//!
//! Per world, two facts: commander defeated and guardian rescued. Both true
//! liberates the world, which starts its festival. When every world is
//! liberated the final battle unlocks on the following progression tick.
//! Score is owned here and every award is gated on a false→true edge, so
//! duplicate reports never pay twice.

use serde::{Deserialize, Serialize};

use crate::config::ProgressionConfig;
use crate::presentation::Presentation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub world: String,
    pub commander_defeated: bool,
    pub guardian_rescued: bool,
    pub liberated: bool,
}

impl WorldRecord {
    fn new(world: &str) -> Self {
        Self {
            world: world.to_string(),
            commander_defeated: false,
            guardian_rescued: false,
            liberated: false,
        }
    }
}

/// Milestones produced by the graph, drained by the simulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionEvent {
    CommanderDefeated(String),
    GuardianRescued(String),
    WorldLiberated(String),
    FestivalStarted(String),
    FinalBattleUnlocked,
}

/// Serializable progress for the save hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub worlds: Vec<WorldRecord>,
    pub score: u32,
    pub current_world: Option<String>,
    pub final_battle_unlocked: bool,
}

#[derive(Debug, Clone)]
pub struct ProgressionGraph {
    config: ProgressionConfig,
    worlds: Vec<WorldRecord>,
    score: u32,
    current_world: Option<String>,
    final_unlock_armed: bool,
    final_unlocked: bool,
    events: Vec<ProgressionEvent>,
}

impl ProgressionGraph {
    pub fn new(config: ProgressionConfig) -> Self {
        let worlds = config.worlds.iter().map(|w| WorldRecord::new(w)).collect();
        Self {
            config,
            worlds,
            score: 0,
            current_world: None,
            final_unlock_armed: false,
            final_unlocked: false,
            events: Vec::new(),
        }
    }

    fn index_of(&self, world: &str) -> Option<usize> {
        self.worlds.iter().position(|r| r.world == world)
    }

    fn record(&self, world: &str) -> Option<&WorldRecord> {
        self.worlds.iter().find(|r| r.world == world)
    }

    fn award(&mut self, points: u32, presentation: &mut dyn Presentation) {
        self.score = self.score.saturating_add(points);
        presentation.update_score_display(self.score);
    }

    /// Record a commander kill. Returns true only when the fact was newly set.
    pub fn report_commander_defeated(&mut self, world: &str, presentation: &mut dyn Presentation) -> bool {
        let Some(idx) = self.index_of(world) else {
            tracing::warn!(world, "commander defeat reported for unknown world");
            return false;
        };
        if self.worlds[idx].commander_defeated {
            tracing::debug!(world, "duplicate commander defeat ignored");
            return false;
        }
        self.worlds[idx].commander_defeated = true;
        self.award(self.config.commander_score, presentation);
        self.events
            .push(ProgressionEvent::CommanderDefeated(world.to_string()));
        tracing::info!(world, score = self.score, "commander defeated");

        if self.worlds[idx].guardian_rescued {
            self.liberate(idx, presentation);
        }
        true
    }

    /// Record a guardian rescue. Returns true only when the fact was newly set.
    pub fn report_guardian_rescued(&mut self, world: &str, presentation: &mut dyn Presentation) -> bool {
        let Some(idx) = self.index_of(world) else {
            tracing::warn!(world, "guardian rescue reported for unknown world");
            return false;
        };
        if self.worlds[idx].guardian_rescued {
            tracing::debug!(world, "duplicate guardian rescue ignored");
            return false;
        }
        self.worlds[idx].guardian_rescued = true;
        self.award(self.config.guardian_score, presentation);
        self.events
            .push(ProgressionEvent::GuardianRescued(world.to_string()));
        tracing::info!(world, score = self.score, "guardian rescued");

        if self.worlds[idx].commander_defeated {
            self.liberate(idx, presentation);
        }
        true
    }

    fn liberate(&mut self, idx: usize, presentation: &mut dyn Presentation) {
        if self.worlds[idx].liberated {
            return;
        }
        self.worlds[idx].liberated = true;
        let world = self.worlds[idx].world.clone();
        self.award(self.config.liberation_bonus, presentation);
        presentation.show_notification(&format!("{world} has been liberated!"));
        tracing::info!(world = %world, score = self.score, "world liberated");

        self.events
            .push(ProgressionEvent::WorldLiberated(world.clone()));
        self.events.push(ProgressionEvent::FestivalStarted(world));

        if self.all_liberated() && !self.final_unlocked {
            self.final_unlock_armed = true;
        }
    }

    /// Fire the deferred final unlock, if armed. Runs at the start of each
    /// simulation tick.
    pub fn tick(&mut self, presentation: &mut dyn Presentation) {
        if !self.final_unlock_armed {
            return;
        }
        self.final_unlock_armed = false;
        self.final_unlocked = true;
        self.events.push(ProgressionEvent::FinalBattleUnlocked);
        presentation.show_notification(&format!(
            "All worlds liberated! The final battle at {} is unlocked.",
            self.config.final_battle_scene
        ));
        tracing::info!(scene = %self.config.final_battle_scene, "final battle unlocked");
    }

    pub fn drain_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Collectible and misc score
    pub fn add_score(&mut self, points: u32, presentation: &mut dyn Presentation) {
        self.award(points, presentation);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_world_liberated(&self, world: &str) -> bool {
        self.record(world).is_some_and(|r| r.liberated)
    }

    pub fn is_commander_defeated(&self, world: &str) -> bool {
        self.record(world).is_some_and(|r| r.commander_defeated)
    }

    pub fn is_guardian_rescued(&self, world: &str) -> bool {
        self.record(world).is_some_and(|r| r.guardian_rescued)
    }

    pub fn liberated_world_count(&self) -> usize {
        self.worlds.iter().filter(|r| r.liberated).count()
    }

    pub fn all_liberated(&self) -> bool {
        self.worlds.iter().all(|r| r.liberated)
    }

    pub fn is_final_battle_unlocked(&self) -> bool {
        self.final_unlocked
    }

    pub fn final_battle_scene(&self) -> &str {
        &self.config.final_battle_scene
    }

    pub fn worlds(&self) -> &[WorldRecord] {
        &self.worlds
    }

    pub fn is_known_world(&self, world: &str) -> bool {
        self.index_of(world).is_some()
    }

    /// Switch the active world. Unknown worlds are refused.
    pub fn load_world(&mut self, world: &str) -> bool {
        if !self.is_known_world(world) {
            tracing::warn!(world, "cannot load unknown world");
            return false;
        }
        self.current_world = Some(world.to_string());
        tracing::info!(world, "world loaded");
        true
    }

    pub fn current_world(&self) -> Option<&str> {
        self.current_world.as_deref()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            worlds: self.worlds.clone(),
            score: self.score,
            current_world: self.current_world.clone(),
            final_battle_unlocked: self.final_unlocked,
        }
    }

    /// Persist progress. Storage is not wired up yet; this only logs.
    pub fn save(&self) {
        let snapshot = self.snapshot();
        match serde_json::to_string(&snapshot) {
            Ok(json) => tracing::info!(bytes = json.len(), score = snapshot.score, "progress save requested"),
            Err(err) => tracing::warn!(%err, "failed to serialize progress snapshot"),
        }
    }
}
