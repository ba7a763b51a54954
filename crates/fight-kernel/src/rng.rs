//! Seeded random source shared by every thrower and balloon.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::DelayRange;

/// Seeded generator behind a lock so concurrent tasks can draw from it.
///
/// Draws from different tasks interleave nondeterministically, so a seed
/// fixes the sequence of numbers, not which thrower gets which one.
#[derive(Debug)]
pub struct RandomSource {
    seed: u64,
    rng: Mutex<ChaCha8Rng>,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `0..upper`. `upper` must be non-zero.
    pub fn below(&self, upper: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(0..upper)
    }

    /// Uniform duration within the inclusive range.
    pub fn delay(&self, range: DelayRange) -> Duration {
        if range.min_ms >= range.max_ms {
            return Duration::from_millis(range.min_ms);
        }
        let ms = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .random_range(range.min_ms..=range.max_ms);
        Duration::from_millis(ms)
    }
}
