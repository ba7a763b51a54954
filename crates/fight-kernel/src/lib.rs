//! Fight Kernel: throwers, balloons in flight, and a clean shutdown.
//!
//! This crate implements the concurrency core of a water balloon fight:
//! throwers guarding their own state with a lock and a condition, balloons
//! flying as detached tasks, a shared count of surviving balloons, and a
//! shutdown sequence that wakes and joins every thrower before draining the
//! sky.

pub mod arena;
pub mod config;
pub mod coordinator;
pub mod narration;
pub mod rng;
pub mod state;
pub mod thrower;
pub mod throwing;

pub use arena::Arena;
pub use config::{ConfigError, DelayRange, FightConfig};
pub use coordinator::{FightCoordinator, FightOutcome};
pub use narration::{ConsoleNarrator, FightEvent, Narrator, RecordingNarrator, SilentNarrator};
pub use rng::RandomSource;
pub use state::{FightStats, SharedFightState};
pub use thrower::{Thrower, ThrowerId, ThrowerSnapshot};
pub use throwing::Throwing;
