//! Defines all configuration structures for the countdown engine.
//!
//! These structs are deserialized with `serde`, typically from a TOML file
//! layered under `COUNTDOWN_*` environment variables, so the tick cadence and
//! picker behaviour can be tuned without rebuilding the host.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The top-level configuration for the `CountdownEngine`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CountdownConfig {
    /// How often remaining time is sampled while a run is active.
    #[serde(default)]
    pub resolution: ClockResolution,

    /// Capacity of the broadcast channels behind the event streams.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Clamp picked fields to the slider ranges before storing them.
    #[serde(default = "default_clamp_picker")]
    pub clamp_picker: bool,
}

/// Defines the tick cadence of the countdown's ticker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockResolution {
    /// ~60 ticks per second. Matches a display refresh loop.
    #[default]
    High,
    /// ~30 ticks per second.
    Medium,
    /// ~1 tick per second. Enough for a seconds-only readout.
    Low,
    /// A user-defined speed in ticks per second.
    Custom { ticks_per_second: u64 },
}

impl ClockResolution {
    /// The interval between two ticks.
    pub fn period(&self) -> Duration {
        match self {
            ClockResolution::High => Duration::from_millis(16),
            ClockResolution::Medium => Duration::from_millis(33),
            ClockResolution::Low => Duration::from_secs(1),
            ClockResolution::Custom { ticks_per_second } => {
                Duration::from_micros(1_000_000 / (*ticks_per_second).max(1))
            }
        }
    }
}

impl CountdownConfig {
    /// Loads defaults, then the optional TOML file, then `COUNTDOWN_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        builder
            .add_source(Environment::with_prefix("COUNTDOWN").try_parsing(true))
            .build()
            .context("failed to read countdown configuration")?
            .try_deserialize()
            .context("invalid countdown configuration")
    }

    /// Parses a configuration from TOML text alone.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .context("failed to parse countdown configuration")?
            .try_deserialize()
            .context("invalid countdown configuration")
    }
}

// --- Default value functions for serde ---

fn default_event_capacity() -> usize {
    256
}

fn default_clamp_picker() -> bool {
    true
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            resolution: ClockResolution::default(),
            event_capacity: default_event_capacity(),
            clamp_picker: default_clamp_picker(),
        }
    }
}
