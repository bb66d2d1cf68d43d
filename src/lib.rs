//! Liberation Core Library
//!
//! Deterministic game logic for a side-scrolling world-liberation game:
//! - Combat actors (player, enemies, boss commanders) on one shared state-machine abstraction
//! - Timed effect scheduler for every "apply now, revert later" behaviour
//! - Additive buff aggregation and regional cuisine pickups
//! - World liberation progression (commander + guardian → festival → final battle)
//! - Festival transitions and guardian powers
//! - Session game flow and a Bevy plugin that drives it all
//!
//! Rendering, audio, animation and scene loading sit behind the
//! [`presentation::Presentation`] trait; the core only issues fire-and-forget calls.

pub mod combat;
pub mod commander;
pub mod config;
pub mod constants;
pub mod enemy;
pub mod engine;
pub mod festival;
pub mod gameflow;
pub mod guardian;
pub mod logging;
pub mod player;
pub mod presentation;
pub mod progression;
pub mod scheduler;
pub mod simulation;

pub use config::{ConfigError, SimulationConfig};
pub use engine::{LiberationPlugin, SimulationResource};
pub use simulation::{Simulation, SimulationEvent};
