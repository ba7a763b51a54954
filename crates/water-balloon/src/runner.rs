//! Fight runner: builds a coordinator from CLI choices and collects a report.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use fight_kernel::{ConsoleNarrator, FightConfig, FightCoordinator, Narrator, SilentNarrator};

use crate::results::FightReport;
use crate::seed::Seed;

/// Configuration for the fight runner.
#[derive(Debug, Clone, Default)]
pub struct FightRunnerConfig {
    /// Fight parameters handed to the kernel
    pub fight: FightConfig,
    /// Suppress narration, keep logs and the report
    pub quiet: bool,
}

impl FightRunnerConfig {
    /// Apply `--fight-secs` / `--drain-secs`, clamping instead of overflowing.
    pub fn override_durations(&mut self, fight_secs: Option<u64>, drain_secs: Option<u64>) {
        if let Some(secs) = fight_secs {
            self.fight.fight_duration_ms = secs.saturating_mul(1_000);
        }
        if let Some(secs) = drain_secs {
            self.fight.drain_duration_ms = secs.saturating_mul(1_000);
        }
    }
}

/// Runs one fight end to end.
pub struct FightRunner {
    config: FightRunnerConfig,
    narrator: Arc<dyn Narrator>,
}

impl FightRunner {
    pub fn new(config: FightRunnerConfig) -> Self {
        let narrator: Arc<dyn Narrator> = if config.quiet {
            Arc::new(SilentNarrator)
        } else {
            Arc::new(ConsoleNarrator)
        };
        Self { config, narrator }
    }

    /// Use a custom narration sink instead of the console.
    pub fn with_narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = narrator;
        self
    }

    pub async fn run(&self, seed: Seed) -> Result<FightReport> {
        let fight = self.config.fight.clone();
        let coordinator = FightCoordinator::new(fight.clone(), seed.value(), self.narrator.clone())
            .context("invalid fight configuration")?;

        info!(seed = seed.value(), throwers = fight.thrower_count(), "Running fight");
        let started_at = Utc::now();
        let outcome = coordinator.run().await;
        let ended_at = Utc::now();

        Ok(FightReport::new(seed, fight, started_at, ended_at, outcome))
    }
}
