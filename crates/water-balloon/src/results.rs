//! Fight report: who threw, who got wet, and where the balloons went.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use fight_kernel::{FightConfig, FightOutcome, ThrowerSnapshot};
use serde::{Deserialize, Serialize};

use crate::seed::Seed;

/// Results from a single fight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightReport {
    /// Seed and where it came from
    pub seed: Seed,
    /// Configuration the fight ran with
    pub config: FightConfig,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time (after the drain)
    pub ended_at: DateTime<Utc>,
    /// What the coordinator observed at the end
    pub outcome: FightOutcome,
}

impl FightReport {
    pub fn new(
        seed: Seed,
        config: FightConfig,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        outcome: FightOutcome,
    ) -> Self {
        Self {
            seed,
            config,
            started_at,
            ended_at,
            outcome,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        (self.ended_at - self.started_at).num_milliseconds().max(0) as u64
    }

    /// Throwers ordered by fewest hits first, ties kept in roster order.
    pub fn standings(&self) -> Vec<&ThrowerSnapshot> {
        let mut standings: Vec<&ThrowerSnapshot> = self.outcome.throwers.iter().collect();
        standings.sort_by_key(|t| t.times_hit);
        standings
    }

    /// Human-readable summary, one line per entry.
    pub fn summary_lines(&self) -> Vec<String> {
        let stats = &self.outcome.stats;
        let mut lines = vec![
            format!("Seed: {} ({:?})", self.seed.value(), self.seed),
            format!("Duration: {}", format_duration(self.duration_ms())),
            format!(
                "Balloons: {} of {} survived",
                self.outcome.remaining_balloons,
                self.config.thrower_count()
            ),
            format!(
                "Throws: {} launched, {} caught, {} splashed, {} still in the air",
                stats.launched, stats.caught, stats.splashed, stats.in_flight
            ),
        ];
        lines.push(format!("  {:<12} {:>8} {:>6}", "Thrower", "Balloons", "Hits"));
        for t in self.standings() {
            lines.push(format!("  {:<12} {:>8} {:>6}", t.name, t.balloons, t.times_hit));
        }
        lines
    }

    /// Save the report to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let report = serde_json::from_str(&json)?;
        Ok(report)
    }
}

/// Format a duration in milliseconds for display.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{:.1}m", ms as f64 / 60_000.0)
    }
}
