//! The arena: everything one fight shares, injected into every thrower and
//! every balloon in the air.

use std::sync::Arc;

use crate::config::{ConfigError, FightConfig};
use crate::narration::{FightEvent, Narrator};
use crate::rng::RandomSource;
use crate::state::SharedFightState;
use crate::thrower::{Thrower, ThrowerId, ThrowerSnapshot};

/// Shared context of one fight.
///
/// Owning this instead of process globals lets several fights run side by
/// side, which the tests rely on.
pub struct Arena {
    config: FightConfig,
    state: SharedFightState,
    rng: RandomSource,
    narrator: Arc<dyn Narrator>,
    throwers: Vec<Arc<Thrower>>,
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("throwers", &self.throwers.len())
            .field("seed", &self.rng.seed())
            .field("state", &self.state)
            .finish()
    }
}

impl Arena {
    /// Build an arena with one thrower per configured name, each holding
    /// one balloon.
    pub fn new(
        config: FightConfig,
        seed: u64,
        narrator: Arc<dyn Narrator>,
    ) -> Result<Arc<Self>, ConfigError> {
        let balloons = vec![1; config.thrower_count()];
        Self::with_balloons(config, seed, narrator, &balloons)
    }

    /// Build an arena with explicit starting balloon counts.
    ///
    /// The global count starts at the total number of balloons handed out.
    pub fn with_balloons(
        config: FightConfig,
        seed: u64,
        narrator: Arc<dyn Narrator>,
        balloons: &[usize],
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        if balloons.len() != config.thrower_count() {
            return Err(ConfigError::BalloonCountMismatch {
                expected: config.thrower_count(),
                got: balloons.len(),
            });
        }

        let throwers = config
            .thrower_names
            .iter()
            .zip(balloons)
            .enumerate()
            .map(|(id, (name, &count))| Arc::new(Thrower::new(id, name.clone(), count)))
            .collect();

        Ok(Arc::new(Self {
            state: SharedFightState::new(balloons.iter().sum()),
            rng: RandomSource::new(seed),
            narrator,
            throwers,
            config,
        }))
    }

    pub fn config(&self) -> &FightConfig {
        &self.config
    }

    pub fn state(&self) -> &SharedFightState {
        &self.state
    }

    pub fn rng(&self) -> &RandomSource {
        &self.rng
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn throwers(&self) -> &[Arc<Thrower>] {
        &self.throwers
    }

    /// Panics if `id` is not a thrower of this arena.
    pub fn thrower(&self, id: ThrowerId) -> &Arc<Thrower> {
        &self.throwers[id]
    }

    pub fn narrate(&self, event: FightEvent) {
        self.narrator.narrate(&event);
    }

    /// Consistent per-thrower view; each thrower is read under its own lock.
    pub async fn snapshot(&self) -> Vec<ThrowerSnapshot> {
        let mut out = Vec::with_capacity(self.throwers.len());
        for thrower in &self.throwers {
            out.push(thrower.snapshot().await);
        }
        out
    }

    /// Balloons currently held by throwers.
    pub async fn balloons_in_hand(&self) -> usize {
        self.snapshot().await.iter().map(|s| s.balloons).sum()
    }
}
