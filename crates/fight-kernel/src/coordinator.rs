//! FightCoordinator: runs one fight from first throw to drained sky.
//!
//! Sequence:
//! 1. Warm-up pause, announce the fight
//! 2. Spawn one long-lived loop per thrower
//! 3. Sleep for the fight duration
//! 4. Call time, then for each thrower: wake it and join its loop
//! 5. Drain: wait (bounded) for balloons still in the air
//! 6. Report the outcome

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::arena::Arena;
use crate::config::{ConfigError, FightConfig};
use crate::narration::{FightEvent, Narrator};
use crate::state::FightStats;
use crate::thrower::{Thrower, ThrowerSnapshot};

/// Result of one completed fight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FightOutcome {
    /// Seed the random source was created with
    pub seed: u64,
    /// Final state of every thrower, in roster order
    pub throwers: Vec<ThrowerSnapshot>,
    /// Balloons that never burst
    pub remaining_balloons: usize,
    /// Transfer counters at the end of the drain
    pub stats: FightStats,
    /// Whether every balloon landed before the drain deadline
    pub drained: bool,
}

impl FightOutcome {
    /// Throwers who were never hit.
    pub fn dry_throwers(&self) -> impl Iterator<Item = &ThrowerSnapshot> {
        self.throwers.iter().filter(|t| t.times_hit == 0)
    }

    /// Balloons held plus in the air plus destroyed equals the balloons
    /// the fight started with. Holds for undrained outcomes too, since the
    /// outcome is read as one settled view.
    pub fn balloons_conserved(&self, initial: usize) -> bool {
        let held: usize = self.throwers.iter().map(|t| t.balloons).sum();
        let destroyed = initial.saturating_sub(self.remaining_balloons);
        held + self.stats.in_flight + destroyed == initial
    }
}

/// Owns the arena and drives the fight's lifecycle.
#[derive(Debug)]
pub struct FightCoordinator {
    arena: Arc<Arena>,
}

impl FightCoordinator {
    /// Create a coordinator with one thrower per configured name.
    pub fn new(
        config: FightConfig,
        seed: u64,
        narrator: Arc<dyn Narrator>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            arena: Arena::new(config, seed, narrator)?,
        })
    }

    /// Wrap an arena built elsewhere, e.g. with custom starting balloons.
    pub fn with_arena(arena: Arc<Arena>) -> Self {
        Self { arena }
    }

    pub fn arena(&self) -> &Arc<Arena> {
        &self.arena
    }

    /// Run the whole fight and return its outcome.
    pub async fn run(self) -> FightOutcome {
        let arena = self.arena;
        let config = arena.config().clone();

        tokio::time::sleep(config.warmup()).await;
        arena.narrate(FightEvent::FightBegins);
        info!(
            throwers = arena.throwers().len(),
            seed = arena.seed(),
            fight_ms = config.fight_duration_ms,
            "Fight started"
        );

        let loops: Vec<(Arc<Thrower>, JoinHandle<()>)> = arena
            .throwers()
            .iter()
            .map(|thrower| {
                let handle = tokio::spawn(thrower_loop(thrower.clone(), arena.clone()));
                (thrower.clone(), handle)
            })
            .collect();

        tokio::time::sleep(config.fight_duration()).await;

        arena.narrate(FightEvent::FightOver);
        arena.state().mark_time_over();
        info!(
            remaining = arena.state().remaining_balloons(),
            "Time is over, stopping throwers"
        );

        for (thrower, handle) in loops {
            thrower.inform_fight_over().await;
            if let Err(e) = handle.await {
                warn!(thrower = %thrower.name(), error = %e, "Thrower loop ended abnormally");
            }
            debug!(thrower = %thrower.name(), "Thrower loop joined");
        }

        let drained = tokio::time::timeout(config.drain_duration(), arena.state().wait_all_landed())
            .await
            .is_ok();
        let stats = arena.state().stats();
        if drained {
            info!(launched = stats.launched, "All balloons landed");
        } else {
            warn!(
                in_flight = stats.in_flight,
                "Drain deadline passed with balloons still in the air"
            );
        }

        settled_outcome(&arena, drained).await
    }
}

/// Read throwers, the balloon count and the counters as one consistent view.
///
/// Loops are joined, so nothing launches any more, but after a drain timeout
/// balloons can still land between the reads. Every landing moves the
/// counters while holding its target's lock, so unchanged counters around
/// the snapshot mean no landing slipped in.
async fn settled_outcome(arena: &Arena, drained: bool) -> FightOutcome {
    loop {
        let before = arena.state().stats();
        let throwers = arena.snapshot().await;
        let remaining_balloons = arena.state().remaining_balloons();
        let stats = arena.state().stats();
        if stats == before {
            return FightOutcome {
                seed: arena.seed(),
                throwers,
                remaining_balloons,
                stats,
                drained,
            };
        }
        trace!("Balloon landed while reading the outcome, reading again");
        tokio::task::yield_now().await;
    }
}

/// One thrower's life: idle, pick a balloon, aim, throw, until the fight stops.
async fn thrower_loop(thrower: Arc<Thrower>, arena: Arc<Arena>) {
    let config = arena.config();

    while arena.state().should_continue() {
        tokio::time::sleep(arena.rng().delay(config.idle_delay)).await;
        if !arena.state().should_continue() {
            break;
        }

        if !thrower.prepare_to_throw(&arena).await {
            break;
        }

        tokio::time::sleep(arena.rng().delay(config.aim_delay)).await;
        if !arena.state().should_continue() {
            break;
        }

        thrower.throw_balloon(&arena).await;
    }

    let name = thrower.name().to_string();
    if thrower.times_hit().await == 0 {
        arena.narrate(FightEvent::StillDry { thrower: name });
    } else {
        arena.narrate(FightEvent::WillWinNextTime { thrower: name });
    }
    debug!(thrower = %thrower.name(), "Thrower stopped");
}
