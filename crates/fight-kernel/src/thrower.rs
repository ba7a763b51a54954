//! Thrower: one participant's balloons, hit count and throwing flag.
//!
//! Each thrower owns a lock and a notification scoped to it, acting as a
//! condition variable:
//! - `prepare_to_throw` waits on it until a balloon arrives or the fight ends
//! - `attempt_to_catch` signals it when a balloon is caught
//! - `inform_fight_over` signals it, under the lock, at shutdown
//!
//! ```text
//! Idle → WaitingForBalloon → PreparingToThrow → Throwing → Idle
//!   └──────────────┴─────────────────┴─→ Stopped
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, warn};

use crate::arena::Arena;
use crate::narration::FightEvent;
use crate::throwing::Throwing;

/// Index of a thrower in its arena's roster.
pub type ThrowerId = usize;

/// Fields guarded by the thrower's lock.
#[derive(Debug, Default, Clone, Copy)]
struct ThrowerState {
    balloons: usize,
    about_to_throw: bool,
    times_hit: usize,
}

/// Point-in-time copy of a thrower, taken under its lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrowerSnapshot {
    pub id: ThrowerId,
    pub name: String,
    pub balloons: usize,
    pub about_to_throw: bool,
    pub times_hit: usize,
}

/// A participant in the fight.
pub struct Thrower {
    id: ThrowerId,
    name: String,
    state: Mutex<ThrowerState>,
    /// Signaled when a balloon is caught or the fight is over
    balloon_ready: Notify,
}

impl std::fmt::Debug for Thrower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thrower")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

impl Thrower {
    pub fn new(id: ThrowerId, name: String, balloons: usize) -> Self {
        Self {
            id,
            name,
            state: Mutex::new(ThrowerState {
                balloons,
                ..Default::default()
            }),
            balloon_ready: Notify::new(),
        }
    }

    pub fn id(&self) -> ThrowerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait until this thrower holds a balloon, then flag it as about to throw.
    ///
    /// Returns `false` if the fight stopped while waiting; the caller must
    /// leave its loop. The fight state is re-checked on every wake, spurious
    /// or not.
    pub async fn prepare_to_throw(&self, arena: &Arena) -> bool {
        let mut state = self.state.lock().await;

        while state.balloons == 0 {
            arena.narrate(FightEvent::RequestingBalloon {
                thrower: self.name.clone(),
            });
            debug!(thrower = %self.name, "Waiting for a balloon");

            let notified = self.balloon_ready.notified();
            tokio::pin!(notified);
            // Register as a waiter before releasing the lock so a catch
            // between the unlock and the await is not lost.
            notified.as_mut().enable();
            drop(state);
            notified.await;

            state = self.state.lock().await;
            if !arena.state().should_continue() {
                debug!(thrower = %self.name, "Woken after the fight stopped");
                return false;
            }
        }

        state.about_to_throw = true;
        arena.narrate(FightEvent::SelectedBalloon {
            thrower: self.name.clone(),
        });
        true
    }

    /// Throw one balloon at a random other thrower.
    ///
    /// Launches a detached [`Throwing`] and returns the target, or `None` if
    /// this thrower had no balloon to throw.
    pub async fn throw_balloon(&self, arena: &Arc<Arena>) -> Option<ThrowerId> {
        let mut state = self.state.lock().await;

        if state.balloons == 0 {
            warn!(thrower = %self.name, "Asked to throw without a balloon");
            state.about_to_throw = false;
            return None;
        }

        let count = arena.throwers().len();
        let target_id = loop {
            let candidate = arena.rng().below(count);
            if candidate != self.id {
                break candidate;
            }
        };
        let target = arena.thrower(target_id).clone();

        arena.narrate(FightEvent::Threw {
            thrower: self.name.clone(),
            target: target.name.clone(),
        });
        debug!(thrower = %self.name, victim = %target.name, "Balloon thrown");

        Throwing::new(target, arena).launch(arena.clone());
        state.balloons -= 1;
        state.about_to_throw = false;

        Some(target_id)
    }

    /// Receive a balloon that has finished its flight.
    ///
    /// A thrower who is about to throw cannot catch: they are hit and the
    /// balloon is destroyed. Otherwise they keep it, and a waiting
    /// `prepare_to_throw` is woken.
    pub async fn attempt_to_catch(&self, throwing: Throwing, arena: &Arena) {
        let mut state = self.state.lock().await;
        let fight = arena.state();

        if state.about_to_throw {
            state.times_hit += 1;
            fight.record_splash();
            arena.narrate(FightEvent::Splashed {
                thrower: self.name.clone(),
            });
            fight.decrement_balloons();
            debug!(
                thrower = %self.name,
                times_hit = state.times_hit,
                remaining = fight.remaining_balloons(),
                "Hit while about to throw"
            );
        } else {
            state.balloons += 1;
            fight.record_catch();
            arena.narrate(FightEvent::Caught {
                thrower: self.name.clone(),
            });
            // Only a registered waiter is woken; a catch while idle leaves
            // no stale wake behind.
            self.balloon_ready.notify_waiters();
        }

        throwing.land(fight);
    }

    /// Wake this thrower if it is waiting for a balloon.
    ///
    /// Signals while holding the lock. This is the only place a wake is
    /// stored for a thrower not yet waiting, so one that reaches its wait
    /// after time is called still sees the fight is over.
    pub async fn inform_fight_over(&self) {
        let _state = self.state.lock().await;
        self.balloon_ready.notify_one();
    }

    pub async fn snapshot(&self) -> ThrowerSnapshot {
        let state = self.state.lock().await;
        ThrowerSnapshot {
            id: self.id,
            name: self.name.clone(),
            balloons: state.balloons,
            about_to_throw: state.about_to_throw,
            times_hit: state.times_hit,
        }
    }

    pub async fn times_hit(&self) -> usize {
        self.state.lock().await.times_hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DelayRange, FightConfig};
    use crate::narration::RecordingNarrator;
    use std::time::Duration;

    fn pair_config(flight: DelayRange) -> FightConfig {
        FightConfig {
            thrower_names: vec!["A".to_string(), "B".to_string()],
            flight_delay: flight,
            ..Default::default()
        }
    }

    fn arena_with(config: FightConfig, balloons: &[usize]) -> (Arc<Arena>, Arc<RecordingNarrator>) {
        let narrator = Arc::new(RecordingNarrator::new());
        let arena = Arena::with_balloons(config, 7, narrator.clone(), balloons).unwrap();
        (arena, narrator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_throw_to_idle_peer_is_caught() {
        let (arena, narrator) = arena_with(pair_config(DelayRange::fixed_ms(500)), &[1, 1]);
        let a = arena.thrower(0).clone();
        let b = arena.thrower(1).clone();

        assert!(a.prepare_to_throw(&arena).await);
        assert_eq!(a.throw_balloon(&arena).await, Some(1));
        arena.state().wait_all_landed().await;

        assert_eq!(a.snapshot().await.balloons, 0);
        let b_snap = b.snapshot().await;
        assert_eq!(b_snap.balloons, 2);
        assert_eq!(b_snap.times_hit, 0);
        assert_eq!(arena.state().remaining_balloons(), 2);
        assert_eq!(arena.state().stats().caught, 1);
        assert_eq!(
            narrator.count(|e| matches!(e, FightEvent::Caught { thrower } if thrower == "B")),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_crossing_balloons_hit_both_throwers() {
        // Both balloons already left their throwers' hands; both throwers
        // are about to throw again when the balloons arrive.
        let (arena, _narrator) = arena_with(pair_config(DelayRange::fixed_ms(100)), &[1, 1]);
        let a = arena.thrower(0).clone();
        let b = arena.thrower(1).clone();

        assert!(a.prepare_to_throw(&arena).await);
        assert!(b.prepare_to_throw(&arena).await);
        {
            a.state.lock().await.balloons = 0;
            b.state.lock().await.balloons = 0;
        }

        Throwing::new(b.clone(), &arena).launch(arena.clone());
        Throwing::new(a.clone(), &arena).launch(arena.clone());
        arena.state().wait_all_landed().await;

        for t in [&a, &b] {
            let snap = t.snapshot().await;
            assert_eq!(snap.times_hit, 1);
            assert_eq!(snap.balloons, 0);
        }
        assert_eq!(arena.state().remaining_balloons(), 0);
        assert_eq!(arena.state().stats().splashed, 2);
    }

    #[tokio::test]
    async fn test_penalty_touches_global_count_exactly_once() {
        let (arena, _narrator) = arena_with(pair_config(DelayRange::fixed_ms(0)), &[1, 1]);
        let a = arena.thrower(0).clone();

        assert!(a.prepare_to_throw(&arena).await);
        a.attempt_to_catch(Throwing::new(a.clone(), &arena), &arena).await;

        let snap = a.snapshot().await;
        assert_eq!(snap.times_hit, 1);
        assert_eq!(snap.balloons, 1);
        assert_eq!(arena.state().remaining_balloons(), 1);

        let b = arena.thrower(1).clone();
        b.attempt_to_catch(Throwing::new(b.clone(), &arena), &arena).await;
        assert_eq!(b.snapshot().await.balloons, 2);
        assert_eq!(arena.state().remaining_balloons(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_targets_self() {
        let config = FightConfig {
            flight_delay: DelayRange::fixed_ms(10),
            ..Default::default()
        };
        let (arena, _narrator) = arena_with(config, &[200, 0, 0, 0]);
        let alice = arena.thrower(0).clone();

        for _ in 0..200 {
            let target = alice.throw_balloon(&arena).await.unwrap();
            assert_ne!(target, alice.id());
        }
        assert_eq!(alice.throw_balloon(&arena).await, None);

        arena.state().wait_all_landed().await;
        let held: usize = arena.balloons_in_hand().await;
        assert_eq!(held, 200);
        assert_eq!(arena.state().stats().launched, 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deliveries_are_serialized() {
        let (arena, _narrator) = arena_with(pair_config(DelayRange::fixed_ms(0)), &[1, 1]);
        let b = arena.thrower(1).clone();

        let deliveries: Vec<_> = (0..500)
            .map(|_| {
                let arena = arena.clone();
                let b = b.clone();
                tokio::spawn(async move {
                    let throwing = Throwing::new(b.clone(), &arena);
                    b.attempt_to_catch(throwing, &arena).await;
                })
            })
            .collect();
        for d in futures::future::join_all(deliveries).await {
            d.unwrap();
        }

        let snap = b.snapshot().await;
        assert_eq!(snap.balloons, 501);
        assert_eq!(snap.times_hit, 0);
        assert_eq!(arena.state().stats().in_flight, 0);
        assert_eq!(arena.state().stats().caught, 500);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_deliveries_while_throwing_conserve_balloons() {
        let (arena, _narrator) = arena_with(pair_config(DelayRange { min_ms: 0, max_ms: 2 }), &[300, 1]);
        let a = arena.thrower(0).clone();
        let b = arena.thrower(1).clone();

        // A never prepares, so every balloon B sends back is caught.
        let barrage = {
            let arena = arena.clone();
            let a = a.clone();
            tokio::spawn(async move {
                while a.throw_balloon(&arena).await.is_some() {
                    tokio::task::yield_now().await;
                }
            })
        };
        let returns = {
            let arena = arena.clone();
            let b = b.clone();
            tokio::spawn(async move {
                let mut throws = 0;
                for _ in 0..1_000 {
                    match tokio::time::timeout(
                        Duration::from_millis(200),
                        b.prepare_to_throw(&arena),
                    )
                    .await
                    {
                        Ok(true) => {
                            assert_eq!(b.throw_balloon(&arena).await, Some(0));
                            throws += 1;
                        }
                        _ => break,
                    }
                }
                throws
            })
        };
        barrage.await.unwrap();
        let b_throws = returns.await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), arena.state().wait_all_landed())
            .await
            .expect("every balloon should land");

        let stats = arena.state().stats();
        assert_eq!(stats.in_flight, 0);
        assert!(stats.launched >= 300 + b_throws);
        assert_eq!(stats.splashed + stats.caught, stats.launched);
        assert_eq!(b.times_hit().await, stats.splashed);
        assert_eq!(a.times_hit().await, 0);

        let state = arena.state();
        assert_eq!(
            arena.balloons_in_hand().await + state.destroyed_balloons(),
            state.initial_balloons()
        );
        assert_eq!(state.remaining_balloons(), arena.balloons_in_hand().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_catch_does_not_double_request() {
        let (arena, narrator) = arena_with(pair_config(DelayRange::fixed_ms(10_000)), &[1, 1]);
        let a = arena.thrower(0).clone();
        let b = arena.thrower(1).clone();

        // B catches while it is not waiting for anything.
        assert!(a.prepare_to_throw(&arena).await);
        assert_eq!(a.throw_balloon(&arena).await, Some(1));
        arena.state().wait_all_landed().await;
        assert_eq!(b.snapshot().await.balloons, 2);

        for _ in 0..2 {
            assert!(b.prepare_to_throw(&arena).await);
            assert_eq!(b.throw_balloon(&arena).await, Some(0));
        }

        let waiter = {
            let arena = arena.clone();
            let b = b.clone();
            tokio::spawn(async move { b.prepare_to_throw(&arena).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!waiter.is_finished());

        let b_requests = || {
            narrator.count(
                |e| matches!(e, FightEvent::RequestingBalloon { thrower } if thrower == "B"),
            )
        };
        assert_eq!(b_requests(), 1);

        arena.state().mark_time_over();
        b.inform_fight_over().await;
        assert!(!waiter.await.unwrap());
        assert_eq!(b_requests(), 1);
    }

    #[tokio::test]
    async fn test_waiting_thrower_wakes_on_catch() {
        let (arena, narrator) = arena_with(pair_config(DelayRange::fixed_ms(0)), &[0, 1]);
        let a = arena.thrower(0).clone();

        let waiter = {
            let arena = arena.clone();
            let a = a.clone();
            tokio::spawn(async move { a.prepare_to_throw(&arena).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        a.attempt_to_catch(Throwing::new(a.clone(), &arena), &arena).await;
        let ready = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("thrower should wake")
            .unwrap();
        assert!(ready);
        assert!(a.snapshot().await.about_to_throw);
        assert!(narrator.count(|e| matches!(e, FightEvent::RequestingBalloon { .. })) >= 1);
    }

    #[tokio::test]
    async fn test_fight_over_releases_waiting_thrower() {
        let (arena, _narrator) = arena_with(pair_config(DelayRange::fixed_ms(0)), &[0, 1]);
        let a = arena.thrower(0).clone();

        let waiter = {
            let arena = arena.clone();
            let a = a.clone();
            tokio::spawn(async move { a.prepare_to_throw(&arena).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        arena.state().mark_time_over();
        a.inform_fight_over().await;

        let ready = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("thrower should not stay blocked")
            .unwrap();
        assert!(!ready);
        assert!(!a.snapshot().await.about_to_throw);
    }

    #[tokio::test]
    async fn test_fight_over_before_wait_is_not_lost() {
        let (arena, _narrator) = arena_with(pair_config(DelayRange::fixed_ms(0)), &[0, 1]);
        let a = arena.thrower(0).clone();

        arena.state().mark_time_over();
        a.inform_fight_over().await;

        let ready = tokio::time::timeout(Duration::from_secs(1), a.prepare_to_throw(&arena))
            .await
            .expect("stored wake should release the thrower");
        assert!(!ready);
    }
}
