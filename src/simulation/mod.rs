//! Simulation driver.
//!
//! Owns every component and collaborator and advances them with an injected
//! delta. Order within a tick:
//!
//! 1. progression tick (deferred final unlock)
//! 2. player
//! 3. enemies, then commanders, each in ascending `ActorId`
//! 4. guardians
//! 5. collectibles
//! 6. world effects (buff reversion, shield and freeze expiry)
//! 7. strike resolution through the overlap query
//! 8. progression event dispatch (festival start)
//! 9. festival
//!
//! Nothing here panics on bad input: unknown ids and worlds are ignored with
//! a log line.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::{Event, Vec2};

use crate::combat::{seeded_rng, CombatAction, Combatant, DamageOutcome, SimRng, Strike, TickContext};
use crate::commander::{Commander, CommanderState};
use crate::config::{ConfigError, SimulationConfig};
use crate::enemy::{Enemy, EnemyState};
use crate::festival::FestivalController;
use crate::gameflow::{GameFlow, GameFlowEvent, GameFlowState};
use crate::guardian::{Guardian, GuardianPower, Interaction, PowerActivation};
use crate::player::{BuffCategory, Cuisine, CuisineCollectible, Player, PlayerInput};
use crate::presentation::{
    ActorId, Body, Layer, NullPresentation, OverlapQuery, Presentation, SpatialIndex,
};
use crate::progression::{ProgressionEvent, ProgressionGraph};
use crate::scheduler::TimedEffectScheduler;

/// Things that happened during a tick, for front ends and the engine plugin
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    ActorSpawned(ActorId),
    ActorRemoved(ActorId),
    ActorDamaged {
        target: ActorId,
        source: Option<ActorId>,
        amount: i32,
    },
    ActorKilled(ActorId),
    CollectiblePicked {
        id: ActorId,
        name: String,
    },
    GuardianRescued {
        guardian: ActorId,
        world: String,
    },
    PowerActivated {
        guardian: ActorId,
        power: GuardianPower,
    },
    Progression(ProgressionEvent),
    Flow(GameFlowEvent),
}

/// Timed world-level effects reverted by the simulation
#[derive(Debug, Clone, PartialEq)]
enum WorldEffect {
    RevertBuffs(Vec<(BuffCategory, f32)>),
    ShieldEnd,
    FreezeEnd(Vec<ActorId>),
}

const PLAYER_ID: ActorId = ActorId(0);

pub struct Simulation {
    config: SimulationConfig,
    rng: SimRng,
    presentation: Box<dyn Presentation>,
    next_id: u32,
    elapsed: f32,
    player: Player,
    input: PlayerInput,
    enemies: BTreeMap<ActorId, Enemy>,
    commanders: BTreeMap<ActorId, Commander>,
    guardians: BTreeMap<ActorId, Guardian>,
    collectibles: BTreeMap<ActorId, CuisineCollectible>,
    progression: ProgressionGraph,
    festival: FestivalController,
    flow: GameFlow,
    effects: TimedEffectScheduler<WorldEffect>,
    /// Overlapping freezes per actor
    frozen: BTreeMap<ActorId, u32>,
    /// Overlapping guardian shields on the player
    shields: u32,
    events: Vec<SimulationEvent>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_presentation(config, Box::new(NullPresentation))
    }

    pub fn with_presentation(config: SimulationConfig, presentation: Box<dyn Presentation>) -> Self {
        let player = Player::new(PLAYER_ID, config.player.clone(), Vec2::ZERO);
        tracing::info!(seed = config.seed, worlds = config.progression.worlds.len(), "simulation created");
        Self {
            rng: seeded_rng(config.seed),
            presentation,
            next_id: PLAYER_ID.0 + 1,
            elapsed: 0.0,
            player,
            input: PlayerInput::default(),
            enemies: BTreeMap::new(),
            commanders: BTreeMap::new(),
            guardians: BTreeMap::new(),
            collectibles: BTreeMap::new(),
            progression: ProgressionGraph::new(config.progression.clone()),
            festival: FestivalController::new(config.festival.clone()),
            flow: GameFlow::new(),
            effects: TimedEffectScheduler::new(),
            frozen: BTreeMap::new(),
            shields: 0,
            events: Vec::new(),
            config,
        }
    }

    /// Validate an in-code config before building.
    pub fn try_new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Load, validate and build from a `.json` or `.ron` file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Ok(Self::new(SimulationConfig::load(path)?))
    }

    fn allocate_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        self.events.push(SimulationEvent::ActorSpawned(id));
        id
    }

    // =====================================================
    // Spawning
    // =====================================================

    pub fn spawn_enemy(&mut self, position: Vec2) -> ActorId {
        let id = self.allocate_id();
        self.enemies
            .insert(id, Enemy::new(id, self.config.enemy.clone(), position));
        tracing::debug!(%id, x = position.x, "enemy spawned");
        id
    }

    pub fn spawn_commander(&mut self, name: &str, world: &str, position: Vec2) -> ActorId {
        let id = self.allocate_id();
        self.commanders.insert(
            id,
            Commander::new(id, name, world, self.config.commander.clone(), position),
        );
        tracing::debug!(%id, name, world, "commander spawned");
        id
    }

    /// Spawn a guardian. One already rescued this session comes back freed.
    pub fn spawn_guardian(
        &mut self,
        name: &str,
        world: &str,
        power: GuardianPower,
        position: Vec2,
    ) -> ActorId {
        let id = self.allocate_id();
        let mut guardian = Guardian::new(id, name, world, power, self.config.guardian.clone(), position)
            .with_dialogue(
                vec!["Please, free me from this prison!".to_string()],
                vec![
                    "Thank you for freeing me!".to_string(),
                    format!("The festival of {world} will live again."),
                ],
            );
        if self.progression.is_guardian_rescued(world) {
            guardian = guardian.already_freed();
        }
        self.guardians.insert(id, guardian);
        tracing::debug!(%id, name, world, "guardian spawned");
        id
    }

    pub fn spawn_collectible(&mut self, cuisine: Cuisine, position: Vec2) -> ActorId {
        let id = self.allocate_id();
        self.collectibles
            .insert(id, CuisineCollectible::new(id, cuisine, position));
        id
    }

    /// Remove any non-player actor. Pending effects that name it are skipped
    /// when they expire.
    pub fn remove_actor(&mut self, id: ActorId) -> bool {
        let removed = self.enemies.remove(&id).is_some()
            || self.commanders.remove(&id).is_some()
            || self.guardians.remove(&id).is_some()
            || self.collectibles.remove(&id).is_some();
        if removed {
            self.frozen.remove(&id);
            self.events.push(SimulationEvent::ActorRemoved(id));
            tracing::debug!(%id, "actor removed");
        } else {
            tracing::debug!(%id, "remove requested for unknown actor");
        }
        removed
    }

    // =====================================================
    // Accessors
    // =====================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemy(&self, id: ActorId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    pub fn enemy_mut(&mut self, id: ActorId) -> Option<&mut Enemy> {
        self.enemies.get_mut(&id)
    }

    pub fn enemy_ids(&self) -> Vec<ActorId> {
        self.enemies.keys().copied().collect()
    }

    pub fn commander(&self, id: ActorId) -> Option<&Commander> {
        self.commanders.get(&id)
    }

    pub fn commander_mut(&mut self, id: ActorId) -> Option<&mut Commander> {
        self.commanders.get_mut(&id)
    }

    pub fn guardian(&self, id: ActorId) -> Option<&Guardian> {
        self.guardians.get(&id)
    }

    pub fn collectible(&self, id: ActorId) -> Option<&CuisineCollectible> {
        self.collectibles.get(&id)
    }

    pub fn progression(&self) -> &ProgressionGraph {
        &self.progression
    }

    pub fn festival(&self) -> &FestivalController {
        &self.festival
    }

    pub fn flow_state(&self) -> GameFlowState {
        self.flow.state()
    }

    pub fn is_frozen(&self, id: ActorId) -> bool {
        self.frozen.get(&id).is_some_and(|count| *count > 0)
    }

    pub fn pending_world_effects(&self) -> usize {
        self.effects.len()
    }

    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    // =====================================================
    // Commands
    // =====================================================

    /// Input used by every following tick until replaced
    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    pub fn set_player_position(&mut self, position: Vec2) {
        self.player.set_position(position);
    }

    /// Enter a world: progression records it and the festival controller
    /// applies its suppressed or festival state.
    pub fn load_world(&mut self, world: &str) -> bool {
        if !self.progression.load_world(world) {
            return false;
        }
        self.festival
            .set_current_world(world, self.presentation.as_mut(), &mut self.rng);
        true
    }

    pub fn pause(&mut self) -> bool {
        let changed = self.flow.pause();
        self.collect_flow_events();
        changed
    }

    pub fn resume(&mut self) -> bool {
        let changed = self.flow.resume();
        self.collect_flow_events();
        changed
    }

    pub fn start_final_battle(&mut self) -> bool {
        let started = self.flow.start_final_battle(&self.progression);
        self.collect_flow_events();
        started
    }

    pub fn declare_victory(&mut self) -> bool {
        let won = self.flow.declare_victory(&self.progression);
        self.collect_flow_events();
        won
    }

    /// The player pressed interact: the nearest-id guardian in reach answers.
    pub fn interact(&mut self) -> Option<(ActorId, Interaction)> {
        if self.player.is_dead() {
            return None;
        }
        let player_position = self.player.position();
        let (id, guardian) = self
            .guardians
            .iter_mut()
            .find(|(_, g)| g.in_reach(player_position))?;
        let id = *id;
        let mut ctx = TickContext::new(self.presentation.as_mut(), &mut self.rng);
        let interaction = guardian.interact(player_position, &mut ctx);

        if let Interaction::Rescued { world } = &interaction {
            self.events.push(SimulationEvent::GuardianRescued {
                guardian: id,
                world: world.clone(),
            });
            self.progression
                .report_guardian_rescued(world, self.presentation.as_mut());
        }
        Some((id, interaction))
    }

    /// Activate a guardian's power and apply it to the world.
    pub fn use_guardian_power(&mut self, guardian_id: ActorId) -> bool {
        let Some(guardian) = self.guardians.get_mut(&guardian_id) else {
            tracing::debug!(id = %guardian_id, "power requested from unknown guardian");
            return false;
        };
        let power = guardian.power();
        let Some(activation) = guardian.use_power(self.presentation.as_mut()) else {
            return false;
        };
        self.events.push(SimulationEvent::PowerActivated {
            guardian: guardian_id,
            power,
        });
        self.apply_power(activation);
        true
    }

    fn apply_power(&mut self, activation: PowerActivation) {
        match activation {
            PowerActivation::HealPlayer => {
                self.player.heal_to_full(self.presentation.as_mut());
            }
            PowerActivation::Shield { duration } => {
                self.shields += 1;
                self.player.make_invincible(true, self.presentation.as_mut());
                self.effects.schedule(duration, WorldEffect::ShieldEnd);
            }
            PowerActivation::Buffs { buffs, duration } => {
                for (category, amount) in &buffs {
                    self.player.buffs_mut().add_buff(*category, *amount);
                }
                self.effects
                    .schedule(duration, WorldEffect::RevertBuffs(buffs));
            }
            PowerActivation::Freeze { duration } => {
                let ids: Vec<ActorId> = self
                    .enemies
                    .keys()
                    .chain(self.commanders.keys())
                    .copied()
                    .collect();
                for id in &ids {
                    *self.frozen.entry(*id).or_insert(0) += 1;
                    if let Some(enemy) = self.enemies.get_mut(id) {
                        enemy.halt();
                    } else if let Some(commander) = self.commanders.get_mut(id) {
                        commander.halt();
                    }
                }
                tracing::info!(actors = ids.len(), duration, "time freeze");
                self.effects
                    .schedule(duration, WorldEffect::FreezeEnd(ids));
            }
            PowerActivation::AreaAttack {
                origin,
                radius,
                damage,
            } => {
                let index = self.spatial_index();
                let hits = index.query_overlap(origin, radius, Layer::Enemy);
                tracing::info!(hits = hits.len(), radius, "area attack");
                for id in hits {
                    self.damage_actor(id, damage, None);
                }
            }
        }
    }

    /// Tear down: cancel ambient loops and pending world effects.
    pub fn shutdown(&mut self) {
        self.festival.shutdown();
        self.effects.clear();
        self.frozen.clear();
        tracing::info!(elapsed = self.elapsed, score = self.progression.score(), "simulation shut down");
    }

    // =====================================================
    // Tick
    // =====================================================

    pub fn tick(&mut self, delta: f32) {
        if !self.flow.is_running() {
            return;
        }
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.elapsed += delta;

        self.progression.tick(self.presentation.as_mut());

        let mut actions = {
            let mut ctx = TickContext::new(self.presentation.as_mut(), &mut self.rng);
            self.player.tick(delta, &self.input, &mut ctx)
        };

        let target = (!self.player.is_dead()).then(|| self.player.position());
        for (id, enemy) in self.enemies.iter_mut() {
            let frozen = self.frozen.get(id).is_some_and(|c| *c > 0);
            let mut ctx = TickContext::new(self.presentation.as_mut(), &mut self.rng);
            actions.extend(enemy.tick(delta, target, frozen, &mut ctx));
        }
        for (id, commander) in self.commanders.iter_mut() {
            let frozen = self.frozen.get(id).is_some_and(|c| *c > 0);
            let mut ctx = TickContext::new(self.presentation.as_mut(), &mut self.rng);
            actions.extend(commander.tick(delta, target, frozen, &mut ctx));
        }

        let player_position = self.player.position();
        for guardian in self.guardians.values_mut() {
            guardian.tick(delta, player_position, self.presentation.as_mut());
        }

        self.pick_up_collectibles();
        self.advance_world_effects(delta);
        self.resolve_actions(actions);

        for event in self.progression.drain_events() {
            if let ProgressionEvent::FestivalStarted(world) = &event {
                self.festival
                    .start_festival(world, self.presentation.as_mut());
            }
            self.events.push(SimulationEvent::Progression(event));
        }

        self.festival.tick(
            delta,
            player_position,
            self.presentation.as_mut(),
            &mut self.rng,
        );
        self.collect_flow_events();
    }

    fn pick_up_collectibles(&mut self) {
        if self.player.is_dead() {
            return;
        }
        let player_position = self.player.position();
        let picked: Vec<ActorId> = self
            .collectibles
            .values()
            .filter(|c| c.in_reach(player_position))
            .map(|c| c.id)
            .collect();

        for id in picked {
            let Some(item) = self.collectibles.remove(&id) else {
                continue;
            };
            let revert = item
                .cuisine
                .apply_to(&mut self.player, self.presentation.as_mut());
            self.progression
                .add_score(item.cuisine.score_value, self.presentation.as_mut());
            if !revert.is_empty() {
                self.effects
                    .schedule(item.cuisine.buff_duration, WorldEffect::RevertBuffs(revert));
            }
            tracing::debug!(%id, cuisine = %item.cuisine.name, "collectible picked up");
            self.events.push(SimulationEvent::CollectiblePicked {
                id,
                name: item.cuisine.name,
            });
        }
    }

    fn advance_world_effects(&mut self, delta: f32) {
        for expired in self.effects.advance(delta) {
            match expired.payload {
                WorldEffect::RevertBuffs(buffs) => {
                    for (category, amount) in buffs {
                        self.player.buffs_mut().remove_buff(category, amount);
                    }
                }
                WorldEffect::ShieldEnd => {
                    self.shields = self.shields.saturating_sub(1);
                    if self.shields == 0 {
                        self.player
                            .make_invincible(false, self.presentation.as_mut());
                    }
                }
                WorldEffect::FreezeEnd(ids) => {
                    for id in ids {
                        match self.frozen.get_mut(&id) {
                            Some(count) => {
                                *count -= 1;
                                if *count == 0 {
                                    self.frozen.remove(&id);
                                }
                            }
                            None => tracing::trace!(%id, "freeze expiry skipped for removed actor"),
                        }
                    }
                }
            }
        }
    }

    /// Collidable bodies of every live actor
    fn spatial_index(&self) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        if !self.player.is_dead() {
            index.insert(Body {
                id: self.player.id(),
                position: self.player.position(),
                radius: self.player.config().body_radius,
                layer: Layer::Player,
            });
        }
        for enemy in self.enemies.values().filter(|e| e.is_collidable()) {
            index.insert(Body {
                id: enemy.id(),
                position: enemy.position(),
                radius: enemy.config().body_radius,
                layer: Layer::Enemy,
            });
        }
        for commander in self.commanders.values().filter(|c| c.is_collidable()) {
            index.insert(Body {
                id: commander.id(),
                position: commander.position(),
                radius: self.config.commander.body_radius,
                layer: Layer::Enemy,
            });
        }
        index
    }

    fn resolve_actions(&mut self, actions: Vec<CombatAction>) {
        if actions.is_empty() {
            return;
        }
        let index = self.spatial_index();
        let mut despawns = Vec::new();
        for action in actions {
            match action {
                CombatAction::Strike(strike) => self.resolve_strike(&index, strike),
                CombatAction::Despawn(id) => despawns.push(id),
            }
        }
        for id in despawns {
            self.remove_actor(id);
        }
    }

    fn resolve_strike(&mut self, index: &SpatialIndex, strike: Strike) {
        for target in index.query_overlap(strike.origin, strike.radius, strike.layer) {
            if target == strike.source {
                continue;
            }
            self.damage_actor(target, strike.damage, Some(strike.source));
        }
    }

    /// Route damage to whichever actor owns `target` and handle the fallout
    /// (commander kills reach progression, player death ends the session).
    pub fn damage_actor(&mut self, target: ActorId, amount: i32, source: Option<ActorId>) -> DamageOutcome {
        let presentation = self.presentation.as_mut();
        let mut defeated_world = None;
        let outcome = if target == self.player.id() {
            self.player.take_damage(amount, presentation)
        } else if let Some(enemy) = self.enemies.get_mut(&target) {
            enemy.take_damage(amount, presentation)
        } else if let Some(commander) = self.commanders.get_mut(&target) {
            let outcome = commander.take_damage(amount, presentation);
            if outcome.is_kill() {
                defeated_world = Some(commander.world().to_string());
            }
            outcome
        } else {
            tracing::trace!(%target, "damage skipped for removed actor");
            return DamageOutcome::Ignored;
        };

        if outcome.dealt() > 0 {
            self.events.push(SimulationEvent::ActorDamaged {
                target,
                source,
                amount: outcome.dealt(),
            });
        }
        if outcome.is_kill() {
            self.events.push(SimulationEvent::ActorKilled(target));
            if target == self.player.id() {
                self.flow.game_over(&self.progression);
            }
        }
        if let Some(world) = defeated_world {
            self.progression
                .report_commander_defeated(&world, self.presentation.as_mut());
        }
        outcome
    }

    fn collect_flow_events(&mut self) {
        for event in self.flow.drain_events() {
            self.events.push(SimulationEvent::Flow(event));
        }
    }

    /// Enemy state for tests and front ends; `None` when removed.
    pub fn enemy_state(&self, id: ActorId) -> Option<EnemyState> {
        self.enemies.get(&id).map(|e| e.state())
    }

    pub fn commander_state(&self, id: ActorId) -> Option<CommanderState> {
        self.commanders.get(&id).map(|c| c.state())
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("elapsed", &self.elapsed)
            .field("flow", &self.flow.state())
            .field("enemies", &self.enemies.len())
            .field("commanders", &self.commanders.len())
            .field("guardians", &self.guardians.len())
            .field("collectibles", &self.collectibles.len())
            .field("score", &self.progression.score())
            .finish()
    }
}
