//! Configuration types for a fight.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names of the classic four throwers.
pub const DEFAULT_THROWER_NAMES: [&str; 4] = ["Alice", "Bob", "Cathy", "David"];

/// Pause between creating the throwers and announcing the fight.
pub const DEFAULT_WARMUP_MS: u64 = 1_000;

/// How long the fight lasts before time is called.
pub const DEFAULT_FIGHT_DURATION_MS: u64 = 30_000;

/// How long to wait for balloons still in the air after every thrower stopped.
pub const DEFAULT_DRAIN_DURATION_MS: u64 = 10_000;

/// Errors raised while loading or validating a [`FightConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a fight needs at least two throwers, got {0}")]
    TooFewThrowers(usize),

    #[error("thrower name at index {0} is empty")]
    EmptyName(usize),

    #[error("{name} delay range is inverted: min {min_ms}ms > max {max_ms}ms")]
    InvertedDelay {
        name: &'static str,
        min_ms: u64,
        max_ms: u64,
    },

    #[error("expected {expected} starting balloon counts, got {got}")]
    BalloonCountMismatch { expected: usize, got: usize },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Inclusive bounds for a uniformly random delay, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    /// Whole-second bounds, matching how the classic fight is paced.
    pub const fn secs(min: u64, max: u64) -> Self {
        Self {
            min_ms: min * 1_000,
            max_ms: max * 1_000,
        }
    }

    /// A fixed delay (min == max).
    pub const fn fixed_ms(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvertedDelay {
                name,
                min_ms: self.min_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }
}

/// Top-level fight configuration.
///
/// Defaults reproduce the classic fight: four throwers, a 30 second fight
/// and a 10 second drain. Loaded from JSON at runtime when `--config` is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FightConfig {
    /// Display names, one thrower per entry
    pub thrower_names: Vec<String>,

    /// Pause before the fight begins (milliseconds)
    pub warmup_ms: u64,

    /// Fight duration (milliseconds)
    pub fight_duration_ms: u64,

    /// Upper bound on waiting for in-flight balloons after all throwers
    /// stopped (milliseconds)
    pub drain_duration_ms: u64,

    /// Delay at the top of each thrower cycle
    pub idle_delay: DelayRange,

    /// Delay between picking a balloon and throwing it
    pub aim_delay: DelayRange,

    /// Time a balloon spends in the air
    pub flight_delay: DelayRange,
}

impl Default for FightConfig {
    fn default() -> Self {
        Self {
            thrower_names: DEFAULT_THROWER_NAMES.iter().map(|s| s.to_string()).collect(),
            warmup_ms: DEFAULT_WARMUP_MS,
            fight_duration_ms: DEFAULT_FIGHT_DURATION_MS,
            drain_duration_ms: DEFAULT_DRAIN_DURATION_MS,
            idle_delay: DelayRange::secs(1, 10),
            aim_delay: DelayRange::secs(1, 2),
            flight_delay: DelayRange::secs(1, 10),
        }
    }
}

impl FightConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the fight relies on.
    ///
    /// Two throwers is the minimum: target selection redraws until it picks
    /// someone other than the thrower, which never terminates with one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thrower_names.len() < 2 {
            return Err(ConfigError::TooFewThrowers(self.thrower_names.len()));
        }
        if let Some(idx) = self.thrower_names.iter().position(|n| n.trim().is_empty()) {
            return Err(ConfigError::EmptyName(idx));
        }
        self.idle_delay.validate("idle")?;
        self.aim_delay.validate("aim")?;
        self.flight_delay.validate("flight")?;
        Ok(())
    }

    pub fn thrower_count(&self) -> usize {
        self.thrower_names.len()
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    pub fn fight_duration(&self) -> Duration {
        Duration::from_millis(self.fight_duration_ms)
    }

    pub fn drain_duration(&self) -> Duration {
        Duration::from_millis(self.drain_duration_ms)
    }
}
