//! A balloon in the air.

use std::sync::Arc;

use tracing::trace;

use crate::arena::Arena;
use crate::state::SharedFightState;
use crate::thrower::Thrower;

/// One balloon on its way to a target.
///
/// Counted as in flight from construction until it lands in
/// [`Thrower::attempt_to_catch`], which consumes it.
#[derive(Debug)]
pub struct Throwing {
    target: Arc<Thrower>,
}

impl Throwing {
    pub fn new(target: Arc<Thrower>, arena: &Arena) -> Self {
        arena.state().record_launch();
        Self { target }
    }

    pub fn target(&self) -> &Arc<Thrower> {
        &self.target
    }

    /// Send the balloon on its way as a detached task.
    ///
    /// The task is not tracked or joined; the arena handle it holds keeps
    /// the fight alive until the balloon lands.
    pub fn launch(self, arena: Arc<Arena>) {
        tokio::spawn(self.fly(arena));
    }

    /// Spend a random time in the air, then arrive at the target.
    pub async fn fly(self, arena: Arc<Arena>) {
        let flight = arena.rng().delay(arena.config().flight_delay);
        trace!(victim = %self.target.name(), flight_ms = flight.as_millis() as u64, "Balloon in flight");
        tokio::time::sleep(flight).await;

        let target = self.target.clone();
        target.attempt_to_catch(self, &arena).await;
    }

    pub(crate) fn land(self, fight: &SharedFightState) {
        trace!(victim = %self.target.name(), "Balloon landed");
        fight.record_landing();
    }
}
