//! Water Balloon Fight CLI.
//!
//! Usage: `water-balloon [SEED] [--config fight.json] [--report out.json]`

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fight_kernel::FightConfig;
use water_balloon::runner::{FightRunner, FightRunnerConfig};
use water_balloon::seed::resolve_seed;

/// Generate a timestamped output path from the given path.
/// e.g., "fight.json" -> "fight-20260108-010530.json"
fn timestamped_path(path: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("fight");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("json");
    let parent = path.parent().unwrap_or(std::path::Path::new("."));
    parent.join(format!("{}-{}.{}", stem, timestamp, ext))
}

#[derive(Parser)]
#[command(name = "water-balloon")]
#[command(version)]
#[command(about = "Simulate a water balloon fight between concurrent throwers")]
struct Cli {
    /// Random seed (decimal, 0x hex or 0 octal); falls back to the process id
    #[arg(allow_hyphen_values = true)]
    seed: Option<String>,

    /// JSON file with fight configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the fight duration in seconds
    #[arg(long)]
    fight_secs: Option<u64>,

    /// Override the drain duration in seconds
    #[arg(long)]
    drain_secs: Option<u64>,

    /// Save a JSON report (timestamped) to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Suppress fight narration
    #[arg(short, long)]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so narration owns stdout
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let fight = match &cli.config {
        Some(path) => FightConfig::load(path)?,
        None => FightConfig::default(),
    };
    let mut config = FightRunnerConfig {
        fight,
        quiet: cli.quiet,
    };
    config.override_durations(cli.fight_secs, cli.drain_secs);

    let seed = resolve_seed(cli.seed.as_deref());
    let runner = FightRunner::new(config);
    let report = runner.run(seed).await?;

    println!("\n=== Fight Result ===");
    for line in report.summary_lines() {
        println!("{}", line);
    }

    if let Some(path) = &cli.report {
        let output_path = timestamped_path(path);
        report.save(&output_path)?;
        info!(path = %output_path.display(), "Report saved");
        println!("Report saved to: {}", output_path.display());
    }

    Ok(())
}
