//! Tracing setup for the liberation core.
//!
//! Every module logs through `tracing` under its own target
//! (`liberation_core::<module>`). [`TracingConfig`] travels inside
//! `SimulationConfig` as the `logging` section, so a config file can raise
//! one subsystem to `debug` without touching the rest. `RUST_LOG` always
//! wins over the file. Installation is once per process.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

const CRATE_TARGET: &str = "liberation_core";

/// Installs the subscriber from a [`TracingConfig`] when the app is built.
#[derive(Default)]
pub struct LoggingPlugin {
    pub config: TracingConfig,
}

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(&self.config);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscriber settings. Module keys are paths below the crate root
/// (`"combat"`, `"festival"`); fully qualified targets are kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub modules: BTreeMap<String, LogLevel>,
    pub show_targets: bool,
    pub show_file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            show_targets: true,
            show_file_line: false,
            modules: BTreeMap::new(),
        }
        .with_module("combat", LogLevel::Debug)
        .with_module("simulation", LogLevel::Info)
    }
}

impl TracingConfig {
    /// Set (or replace) the level for one module.
    pub fn with_module(mut self, module: &str, level: LogLevel) -> Self {
        self.modules.insert(module.to_string(), level);
        self
    }

    /// Everything at `level`, no per-module overrides.
    pub fn uniform(level: LogLevel) -> Self {
        Self {
            default_level: level,
            modules: BTreeMap::new(),
            ..Default::default()
        }
    }

    /// `EnvFilter` directives, e.g. `info,liberation_core::combat=debug`
    pub fn to_env_filter_string(&self) -> String {
        std::iter::once(self.default_level.to_string())
            .chain(
                self.modules
                    .iter()
                    .map(|(module, level)| format!("{}={level}", qualify(module))),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn qualify(module: &str) -> String {
    if module.starts_with(CRATE_TARGET) {
        module.to_string()
    } else {
        format!("{CRATE_TARGET}::{module}")
    }
}

static TRACING_INIT: Once = Once::new();

pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// First call wins; a subscriber installed elsewhere (Bevy's `LogPlugin`)
/// is left in place.
pub fn init_tracing(config: &TracingConfig) {
    let directives = config.to_env_filter_string();
    let (show_targets, show_file_line) = (config.show_targets, config.show_file_line);
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(show_targets)
            .with_file(show_file_line)
            .with_line_number(show_file_line)
            .compact()
            .try_init();
    });
}

/// Span covering one simulation run. Every event logged while it is alive
/// carries the seed and world.
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(seed: u64, world: &str) -> Self {
        Self {
            _span: tracing::info_span!("run", seed, world).entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_directives() {
        assert_eq!(
            TracingConfig::default().to_env_filter_string(),
            "info,liberation_core::combat=debug,liberation_core::simulation=info"
        );
    }

    #[test]
    fn test_with_module_replaces_level() {
        let config = TracingConfig::uniform(LogLevel::Warn)
            .with_module("festival", LogLevel::Trace)
            .with_module("festival", LogLevel::Debug)
            .with_module("liberation_core::guardian", LogLevel::Info);
        assert_eq!(
            config.to_env_filter_string(),
            "warn,liberation_core::festival=debug,liberation_core::guardian=info"
        );
    }

    #[test]
    fn test_levels_serialize_lowercase() {
        let config = TracingConfig::uniform(LogLevel::Error).with_module("engine", LogLevel::Trace);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""default_level":"error""#));
        assert!(json.contains(r#""engine":"trace""#));
        let back: TracingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: TracingConfig = serde_json::from_str(r#"{"default_level":"debug"}"#).unwrap();
        assert_eq!(config.default_level, LogLevel::Debug);
        assert!(config.show_targets);
        assert_eq!(config.modules, TracingConfig::default().modules);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing_default();
        init_tracing(&TracingConfig::uniform(LogLevel::Trace));
        let mut app = App::new();
        app.add_plugins(LoggingPlugin::default());
        app.update();
    }

    #[test]
    fn test_run_span_scopes_events() {
        init_tracing_default();
        let _span = RunSpan::enter(7, "Hellas");
        tracing::info!("inside run");
    }
}
