//! Simulation configuration.
//!
//! Every tunable number lives here, grouped per component. Defaults come from
//! [`crate::constants`]. Files are JSON or RON, picked by extension, and every
//! section is `#[serde(default)]` so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::logging::TracingConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unsupported config extension: {0:?}")]
    UnsupportedFormat(Option<String>),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the simulation RNG
    pub seed: u64,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub commander: CommanderConfig,
    pub guardian: GuardianConfig,
    pub festival: FestivalConfig,
    pub progression: ProgressionConfig,
    pub logging: TracingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            commander: CommanderConfig::default(),
            guardian: GuardianConfig::default(),
            festival: FestivalConfig::default(),
            progression: ProgressionConfig::default(),
            logging: TracingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load from a `.json` or `.ron` file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let config: Self = match extension.as_deref() {
            Some("json") => serde_json::from_str(&text)?,
            Some("ron") => ron::from_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(extension)),
        };
        config.validate()?;
        tracing::info!(path = %path.display(), seed = config.seed, "loaded simulation config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.validate()?;
        self.enemy.validate()?;
        self.commander.validate()?;
        self.guardian.validate()?;
        self.festival.validate()?;
        self.progression.validate()?;
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")))
    }
}

fn probability(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {value}")))
    }
}

fn positive_health(name: &str, value: i32) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
    }
}

// =====================================================
// Player
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: i32,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub sprint_speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub attack_range: f32,
    /// Distance of the attack point in front of the player
    pub attack_reach: f32,
    pub attack_damage: i32,
    /// Attacks per second
    pub attack_rate: f32,
    pub invincibility_duration: f32,
    pub block_window: f32,
    pub body_radius: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: PLAYER_MAX_HEALTH,
            walk_speed: PLAYER_WALK_SPEED,
            run_speed: PLAYER_RUN_SPEED,
            sprint_speed: PLAYER_SPRINT_SPEED,
            jump_force: PLAYER_JUMP_FORCE,
            gravity: PLAYER_GRAVITY,
            attack_range: PLAYER_ATTACK_RANGE,
            attack_reach: 0.75,
            attack_damage: PLAYER_ATTACK_DAMAGE,
            attack_rate: PLAYER_ATTACK_RATE,
            invincibility_duration: PLAYER_INVINCIBILITY,
            block_window: PLAYER_BLOCK_WINDOW,
            body_radius: 0.4,
        }
    }
}

impl PlayerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive_health("player.max_health", self.max_health)?;
        positive("player.attack_rate", self.attack_rate)?;
        positive("player.attack_range", self.attack_range)?;
        non_negative("player.walk_speed", self.walk_speed)?;
        non_negative("player.run_speed", self.run_speed)?;
        non_negative("player.sprint_speed", self.sprint_speed)?;
        non_negative("player.gravity", self.gravity)?;
        non_negative("player.invincibility_duration", self.invincibility_duration)?;
        non_negative("player.block_window", self.block_window)?;
        Ok(())
    }
}

// =====================================================
// Enemy
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: i32,
    pub damage: i32,
    pub attack_range: f32,
    pub aggro_range: f32,
    pub move_speed: f32,
    /// Attacks per second
    pub attack_rate: f32,
    pub attack_windup: f32,
    /// Radius of the overlap check at the attack point
    pub strike_radius: f32,
    pub knockback_speed: f32,
    pub knockback_recovery: f32,
    pub wander_chance: f32,
    pub rest_chance: f32,
    pub turn_chance: f32,
    pub disengage_factor: f32,
    pub despawn_delay: f32,
    pub body_radius: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: ENEMY_MAX_HEALTH,
            damage: ENEMY_DAMAGE,
            attack_range: ENEMY_ATTACK_RANGE,
            aggro_range: ENEMY_AGGRO_RANGE,
            move_speed: ENEMY_MOVE_SPEED,
            attack_rate: ENEMY_ATTACK_RATE,
            attack_windup: ENEMY_ATTACK_WINDUP,
            strike_radius: 1.0,
            knockback_speed: ENEMY_KNOCKBACK_SPEED,
            knockback_recovery: KNOCKBACK_RECOVERY,
            wander_chance: ENEMY_WANDER_CHANCE,
            rest_chance: ENEMY_REST_CHANCE,
            turn_chance: ENEMY_TURN_CHANCE,
            disengage_factor: DISENGAGE_FACTOR,
            despawn_delay: ENEMY_DESPAWN_DELAY,
            body_radius: 0.4,
        }
    }
}

impl EnemyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive_health("enemy.max_health", self.max_health)?;
        positive("enemy.attack_range", self.attack_range)?;
        positive("enemy.aggro_range", self.aggro_range)?;
        positive("enemy.attack_rate", self.attack_rate)?;
        non_negative("enemy.attack_windup", self.attack_windup)?;
        non_negative("enemy.knockback_recovery", self.knockback_recovery)?;
        probability("enemy.wander_chance", self.wander_chance)?;
        probability("enemy.rest_chance", self.rest_chance)?;
        probability("enemy.turn_chance", self.turn_chance)?;
        if self.disengage_factor < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "enemy.disengage_factor must be >= 1, got {}",
                self.disengage_factor
            )));
        }
        Ok(())
    }
}

// =====================================================
// Commander
// =====================================================

/// One entry of a commander's attack rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackPattern {
    pub name: String,
    pub damage: i32,
    pub range: f32,
    /// Pause after the strike before chasing again
    pub cooldown: f32,
    pub animation_trigger: String,
}

impl AttackPattern {
    pub fn new(name: &str, damage: i32, range: f32, cooldown: f32, trigger: &str) -> Self {
        Self {
            name: name.to_string(),
            damage,
            range,
            cooldown,
            animation_trigger: trigger.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommanderConfig {
    pub max_health: i32,
    pub move_speed: f32,
    pub attack_range: f32,
    pub detection_range: f32,
    pub special_damage: i32,
    pub special_cooldown: f32,
    pub special_chance: f32,
    pub special_windup: f32,
    pub special_recovery: f32,
    pub special_radius_factor: f32,
    pub pattern_windup: f32,
    /// Fraction of max health at which the second phase begins
    pub phase_threshold: f32,
    pub phase_window: f32,
    pub phase_heal_divisor: i32,
    pub phase_speed_multiplier: f32,
    pub knockback_speed: f32,
    pub knockback_recovery: f32,
    pub despawn_delay: f32,
    pub body_radius: f32,
    pub phase_one_patterns: Vec<AttackPattern>,
    pub phase_two_patterns: Vec<AttackPattern>,
}

impl Default for CommanderConfig {
    fn default() -> Self {
        Self {
            max_health: COMMANDER_MAX_HEALTH,
            move_speed: COMMANDER_MOVE_SPEED,
            attack_range: COMMANDER_ATTACK_RANGE,
            detection_range: COMMANDER_DETECTION_RANGE,
            special_damage: COMMANDER_SPECIAL_DAMAGE,
            special_cooldown: COMMANDER_SPECIAL_COOLDOWN,
            special_chance: COMMANDER_SPECIAL_CHANCE,
            special_windup: COMMANDER_SPECIAL_WINDUP,
            special_recovery: COMMANDER_SPECIAL_RECOVERY,
            special_radius_factor: COMMANDER_SPECIAL_RADIUS_FACTOR,
            pattern_windup: COMMANDER_PATTERN_WINDUP,
            phase_threshold: COMMANDER_PHASE_THRESHOLD,
            phase_window: COMMANDER_PHASE_WINDOW,
            phase_heal_divisor: COMMANDER_PHASE_HEAL_DIVISOR,
            phase_speed_multiplier: COMMANDER_PHASE_SPEED_MULT,
            knockback_speed: COMMANDER_KNOCKBACK_SPEED,
            knockback_recovery: KNOCKBACK_RECOVERY,
            despawn_delay: COMMANDER_DESPAWN_DELAY,
            body_radius: 0.6,
            phase_one_patterns: vec![
                AttackPattern::new("slash", COMMANDER_BASIC_DAMAGE, COMMANDER_ATTACK_RANGE, 1.0, "attack1"),
                AttackPattern::new("thrust", COMMANDER_BASIC_DAMAGE + 5, 2.5, 1.2, "attack2"),
            ],
            phase_two_patterns: vec![
                AttackPattern::new("cleave", COMMANDER_BASIC_DAMAGE + 10, 2.5, 0.8, "attack3"),
                AttackPattern::new("slash", COMMANDER_BASIC_DAMAGE, COMMANDER_ATTACK_RANGE, 0.6, "attack1"),
                AttackPattern::new("slam", COMMANDER_SPECIAL_DAMAGE, 3.0, 1.2, "attack2"),
            ],
        }
    }
}

impl CommanderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive_health("commander.max_health", self.max_health)?;
        positive("commander.attack_range", self.attack_range)?;
        positive("commander.detection_range", self.detection_range)?;
        probability("commander.special_chance", self.special_chance)?;
        probability("commander.phase_threshold", self.phase_threshold)?;
        non_negative("commander.phase_window", self.phase_window)?;
        positive("commander.phase_speed_multiplier", self.phase_speed_multiplier)?;
        if self.phase_heal_divisor <= 0 {
            return Err(ConfigError::Invalid(
                "commander.phase_heal_divisor must be positive".into(),
            ));
        }
        for pattern in self.phase_one_patterns.iter().chain(&self.phase_two_patterns) {
            positive("commander pattern range", pattern.range)?;
            non_negative("commander pattern cooldown", pattern.cooldown)?;
        }
        Ok(())
    }
}

// =====================================================
// Guardian
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    pub power_cooldown: f32,
    pub interaction_radius: f32,
    pub voice_delay: f32,
    pub shield_duration: f32,
    pub attack_boost: f32,
    pub attack_boost_duration: f32,
    pub freeze_duration: f32,
    pub area_attack_radius: f32,
    pub area_attack_damage: i32,
    pub elemental_attack: f32,
    pub elemental_speed: f32,
    pub elemental_duration: f32,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            power_cooldown: GUARDIAN_POWER_COOLDOWN,
            interaction_radius: GUARDIAN_INTERACTION_RADIUS,
            voice_delay: GUARDIAN_VOICE_DELAY,
            shield_duration: SHIELD_DURATION,
            attack_boost: ATTACK_BOOST_AMOUNT,
            attack_boost_duration: ATTACK_BOOST_DURATION,
            freeze_duration: FREEZE_DURATION,
            area_attack_radius: AREA_ATTACK_RADIUS,
            area_attack_damage: AREA_ATTACK_DAMAGE,
            elemental_attack: ELEMENTAL_ATTACK_AMOUNT,
            elemental_speed: ELEMENTAL_SPEED_AMOUNT,
            elemental_duration: ELEMENTAL_DURATION,
        }
    }
}

impl GuardianConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("guardian.power_cooldown", self.power_cooldown)?;
        positive("guardian.interaction_radius", self.interaction_radius)?;
        non_negative("guardian.shield_duration", self.shield_duration)?;
        non_negative("guardian.attack_boost_duration", self.attack_boost_duration)?;
        non_negative("guardian.freeze_duration", self.freeze_duration)?;
        non_negative("guardian.elemental_duration", self.elemental_duration)?;
        non_negative("guardian.area_attack_radius", self.area_attack_radius)?;
        Ok(())
    }
}

// =====================================================
// Festival
// =====================================================

/// Presentation data for one world's festival
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldFestivalConfig {
    pub world: String,
    pub festival_name: String,
    pub suppressed_music: String,
    pub festival_music: String,
    pub transition_sound: String,
    pub ambient_clips: Vec<String>,
}

impl WorldFestivalConfig {
    pub fn for_world(world: &str) -> Self {
        let key = world.to_lowercase();
        Self {
            world: world.to_string(),
            festival_name: format!("Festival of {world}"),
            suppressed_music: format!("{key}_suppressed"),
            festival_music: format!("{key}_festival"),
            transition_sound: "festival_transition".to_string(),
            ambient_clips: vec![
                format!("{key}_crowd"),
                format!("{key}_drums"),
                format!("{key}_fireworks"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FestivalConfig {
    pub transition_duration: f32,
    pub cue_interval_min: f32,
    pub cue_interval_max: f32,
    pub cue_volume: f32,
    /// Half extents (x, y) of the random cue offset around the listener
    pub cue_spread: [f32; 2],
    pub suppressed_ambient: [f32; 3],
    pub festival_ambient: [f32; 3],
    pub worlds: Vec<WorldFestivalConfig>,
}

impl Default for FestivalConfig {
    fn default() -> Self {
        Self {
            transition_duration: FESTIVAL_TRANSITION_SECS,
            cue_interval_min: AMBIENT_CUE_MIN_SECS,
            cue_interval_max: AMBIENT_CUE_MAX_SECS,
            cue_volume: AMBIENT_CUE_VOLUME,
            cue_spread: AMBIENT_CUE_SPREAD,
            suppressed_ambient: SUPPRESSED_AMBIENT,
            festival_ambient: FESTIVAL_AMBIENT,
            worlds: DEFAULT_WORLDS
                .iter()
                .map(|w| WorldFestivalConfig::for_world(w))
                .collect(),
        }
    }
}

impl FestivalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        non_negative("festival.transition_duration", self.transition_duration)?;
        positive("festival.cue_interval_min", self.cue_interval_min)?;
        if self.cue_interval_max < self.cue_interval_min {
            return Err(ConfigError::Invalid(format!(
                "festival cue interval [{}, {}] is not ordered",
                self.cue_interval_min, self.cue_interval_max
            )));
        }
        probability("festival.cue_volume", self.cue_volume)?;
        non_negative("festival.cue_spread.x", self.cue_spread[0])?;
        non_negative("festival.cue_spread.y", self.cue_spread[1])?;
        Ok(())
    }
}

// =====================================================
// Progression
// =====================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub worlds: Vec<String>,
    pub commander_score: u32,
    pub guardian_score: u32,
    pub liberation_bonus: u32,
    pub final_battle_scene: String,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            worlds: DEFAULT_WORLDS.iter().map(|w| w.to_string()).collect(),
            commander_score: COMMANDER_DEFEAT_SCORE,
            guardian_score: GUARDIAN_RESCUE_SCORE,
            liberation_bonus: LIBERATION_BONUS_SCORE,
            final_battle_scene: FINAL_BATTLE_SCENE.to_string(),
        }
    }
}

impl ProgressionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.worlds.is_empty() {
            return Err(ConfigError::Invalid("progression.worlds is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for world in &self.worlds {
            if !seen.insert(world.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate world {world:?}")));
            }
        }
        Ok(())
    }
}
