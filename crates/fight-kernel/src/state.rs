//! Fight-wide shared state: live balloon count, time-over flag and counters.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Point-in-time copy of the transfer counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightStats {
    /// Balloons thrown and not yet landed
    pub in_flight: usize,
    /// Balloons thrown so far
    pub launched: usize,
    /// Balloons caught by a thrower who was not about to throw
    pub caught: usize,
    /// Balloons that burst on a thrower who was about to throw
    pub splashed: usize,
}

/// State shared by every thrower in one fight.
///
/// The balloon count has its own lock, separate from every thrower lock,
/// so contention on a thrower never couples with the global count.
#[derive(Debug)]
pub struct SharedFightState {
    initial_balloons: usize,
    remaining_balloons: Mutex<usize>,
    time_over: AtomicBool,
    in_flight: AtomicUsize,
    launched: AtomicUsize,
    caught: AtomicUsize,
    splashed: AtomicUsize,
    all_landed: Notify,
}

impl SharedFightState {
    pub fn new(balloons: usize) -> Self {
        Self {
            initial_balloons: balloons,
            remaining_balloons: Mutex::new(balloons),
            time_over: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            launched: AtomicUsize::new(0),
            caught: AtomicUsize::new(0),
            splashed: AtomicUsize::new(0),
            all_landed: Notify::new(),
        }
    }

    /// `true` while time is not over and at least one balloon survives.
    pub fn should_continue(&self) -> bool {
        !self.is_time_over() && self.remaining_balloons() > 0
    }

    /// Destroy one balloon. Returns `false`, leaving the count at zero, if
    /// there was nothing left to destroy.
    pub fn decrement_balloons(&self) -> bool {
        let mut remaining = self
            .remaining_balloons
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match remaining.checked_sub(1) {
            Some(next) => {
                *remaining = next;
                debug!(remaining = next, "Balloon destroyed");
                true
            }
            None => {
                warn!("Balloon count would drop below zero; ignoring decrement");
                false
            }
        }
    }

    pub fn mark_time_over(&self) {
        self.time_over.store(true, Ordering::SeqCst);
    }

    pub fn is_time_over(&self) -> bool {
        self.time_over.load(Ordering::SeqCst)
    }

    pub fn remaining_balloons(&self) -> usize {
        *self
            .remaining_balloons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn initial_balloons(&self) -> usize {
        self.initial_balloons
    }

    /// Balloons that have burst on a thrower.
    pub fn destroyed_balloons(&self) -> usize {
        self.initial_balloons.saturating_sub(self.remaining_balloons())
    }

    pub fn stats(&self) -> FightStats {
        FightStats {
            in_flight: self.in_flight.load(Ordering::SeqCst),
            launched: self.launched.load(Ordering::SeqCst),
            caught: self.caught.load(Ordering::SeqCst),
            splashed: self.splashed.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn record_launch(&self) {
        self.launched.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_catch(&self) {
        self.caught.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_splash(&self) {
        self.splashed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_landing(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.all_landed.notify_waiters();
        }
    }

    /// Resolve once no balloon is in the air.
    ///
    /// Balloons launched after this resolves are not waited for.
    pub async fn wait_all_landed(&self) {
        loop {
            let notified = self.all_landed.notified();
            tokio::pin!(notified);
            // Register before checking so a landing between the check and
            // the await still wakes us.
            notified.as_mut().enable();
            if self.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
