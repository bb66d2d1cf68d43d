//! Centralized game constants for the liberation core.
//!
//! These are the defaults behind [`crate::config::SimulationConfig`]. Per-actor
//! tuning lives in the config sections; nothing outside `config` should read
//! these directly except tests.

// =====================================================
// Progression
// =====================================================

/// Score for defeating a world's commander (awarded once per world)
pub const COMMANDER_DEFEAT_SCORE: u32 = 1000;

/// Score for rescuing a world's guardian (awarded once per world)
pub const GUARDIAN_RESCUE_SCORE: u32 = 500;

/// Bonus score when a world becomes liberated
pub const LIBERATION_BONUS_SCORE: u32 = 2000;

/// Default world roster
pub const DEFAULT_WORLDS: [&str; 7] = [
    "Hellas",
    "Hispania",
    "Pindorama",
    "Kemet",
    "Jambudweep",
    "Zhongguo",
    "Wano",
];

/// Scene of the final battle, unlocked once every world is liberated
pub const FINAL_BATTLE_SCENE: &str = "Kruvija";

// =====================================================
// Enemy
// =====================================================

pub const ENEMY_MAX_HEALTH: i32 = 100;
pub const ENEMY_DAMAGE: i32 = 10;
pub const ENEMY_ATTACK_RANGE: f32 = 1.5;
pub const ENEMY_AGGRO_RANGE: f32 = 5.0;
pub const ENEMY_MOVE_SPEED: f32 = 2.0;
/// Attacks per second
pub const ENEMY_ATTACK_RATE: f32 = 1.0;
/// Delay between attack trigger and damage frame
pub const ENEMY_ATTACK_WINDUP: f32 = 0.3;
/// Chase is abandoned beyond aggro_range * this factor
pub const DISENGAGE_FACTOR: f32 = 1.5;
/// Per-tick chance to start patrolling from Idle
pub const ENEMY_WANDER_CHANCE: f32 = 0.005;
/// Per-tick chance to stop patrolling
pub const ENEMY_REST_CHANCE: f32 = 0.005;
/// Per-tick chance to turn around while patrolling
pub const ENEMY_TURN_CHANCE: f32 = 0.01;
pub const ENEMY_KNOCKBACK_SPEED: f32 = 3.0;
pub const ENEMY_DESPAWN_DELAY: f32 = 2.0;

/// Shared knockback recovery delay for non-player actors
pub const KNOCKBACK_RECOVERY: f32 = 0.2;

// =====================================================
// Commander
// =====================================================

pub const COMMANDER_MAX_HEALTH: i32 = 500;
pub const COMMANDER_MOVE_SPEED: f32 = 3.0;
pub const COMMANDER_ATTACK_RANGE: f32 = 2.0;
pub const COMMANDER_DETECTION_RANGE: f32 = 10.0;
pub const COMMANDER_BASIC_DAMAGE: i32 = 20;
pub const COMMANDER_SPECIAL_DAMAGE: i32 = 40;
pub const COMMANDER_SPECIAL_COOLDOWN: f32 = 8.0;
pub const COMMANDER_SPECIAL_CHANCE: f32 = 0.7;
pub const COMMANDER_SPECIAL_WINDUP: f32 = 0.5;
pub const COMMANDER_SPECIAL_RECOVERY: f32 = 1.0;
/// Special attack radius = attack_range * this factor
pub const COMMANDER_SPECIAL_RADIUS_FACTOR: f32 = 1.5;
pub const COMMANDER_PATTERN_WINDUP: f32 = 0.3;
/// Second phase begins at or below this fraction of max health
pub const COMMANDER_PHASE_THRESHOLD: f32 = 0.5;
pub const COMMANDER_PHASE_WINDOW: f32 = 2.0;
/// Second phase heal = max_health / this divisor
pub const COMMANDER_PHASE_HEAL_DIVISOR: i32 = 10;
pub const COMMANDER_PHASE_SPEED_MULT: f32 = 1.2;
pub const COMMANDER_KNOCKBACK_SPEED: f32 = 2.0;
pub const COMMANDER_DESPAWN_DELAY: f32 = 5.0;

// =====================================================
// Player
// =====================================================

pub const PLAYER_MAX_HEALTH: i32 = 100;
pub const PLAYER_WALK_SPEED: f32 = 3.0;
pub const PLAYER_RUN_SPEED: f32 = 5.0;
pub const PLAYER_SPRINT_SPEED: f32 = 8.0;
pub const PLAYER_JUMP_FORCE: f32 = 10.0;
pub const PLAYER_GRAVITY: f32 = 25.0;
pub const PLAYER_ATTACK_RANGE: f32 = 0.5;
pub const PLAYER_ATTACK_DAMAGE: i32 = 20;
/// Attacks per second
pub const PLAYER_ATTACK_RATE: f32 = 2.0;
pub const PLAYER_INVINCIBILITY: f32 = 1.0;
pub const PLAYER_BLOCK_WINDOW: f32 = 0.5;
/// Vertical speed above which the player counts as airborne
pub const AIRBORNE_VELOCITY_EPSILON: f32 = 0.1;
/// Horizontal input magnitude below which the player walks
pub const WALK_INPUT_THRESHOLD: f32 = 0.5;

// =====================================================
// Guardian
// =====================================================

pub const GUARDIAN_POWER_COOLDOWN: f32 = 30.0;
pub const GUARDIAN_INTERACTION_RADIUS: f32 = 2.0;
pub const GUARDIAN_VOICE_DELAY: f32 = 1.5;
pub const SHIELD_DURATION: f32 = 10.0;
pub const ATTACK_BOOST_AMOUNT: f32 = 50.0;
pub const ATTACK_BOOST_DURATION: f32 = 20.0;
pub const FREEZE_DURATION: f32 = 8.0;
pub const AREA_ATTACK_RADIUS: f32 = 15.0;
pub const AREA_ATTACK_DAMAGE: i32 = 100;
pub const ELEMENTAL_ATTACK_AMOUNT: f32 = 25.0;
pub const ELEMENTAL_SPEED_AMOUNT: f32 = 0.5;
pub const ELEMENTAL_DURATION: f32 = 15.0;

// =====================================================
// Festival
// =====================================================

pub const FESTIVAL_TRANSITION_SECS: f32 = 2.0;
pub const AMBIENT_CUE_MIN_SECS: f32 = 5.0;
pub const AMBIENT_CUE_MAX_SECS: f32 = 15.0;
pub const AMBIENT_CUE_VOLUME: f32 = 0.5;
/// Half extents of the box around the listener where ambient cues play
pub const AMBIENT_CUE_SPREAD: [f32; 2] = [10.0, 5.0];
pub const SUPPRESSED_AMBIENT: [f32; 3] = [0.2, 0.2, 0.25];
pub const FESTIVAL_AMBIENT: [f32; 3] = [0.8, 0.8, 1.0];

// =====================================================
// Collectibles
// =====================================================

pub const CUISINE_SCORE: u32 = 50;
pub const CUISINE_PICKUP_RADIUS: f32 = 0.75;
