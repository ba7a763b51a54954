//! Narration of fight events.
//!
//! Narration is the program's output, not diagnostics: it goes through a
//! [`Narrator`] sink, while `tracing` carries the structured logs.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Something worth telling the audience about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FightEvent {
    FightBegins,
    /// Thrower has no balloon and is waiting for one
    RequestingBalloon { thrower: String },
    /// Thrower has a balloon and is about to throw
    SelectedBalloon { thrower: String },
    Threw { thrower: String, target: String },
    Caught { thrower: String },
    Splashed { thrower: String },
    FightOver,
    /// Closing remark of a thrower who was never hit
    StillDry { thrower: String },
    /// Closing remark of a thrower who got wet
    WillWinNextTime { thrower: String },
}

impl fmt::Display for FightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FightBegins => write!(f, "The fight begins!"),
            Self::RequestingBalloon { thrower } => {
                write!(f, "{thrower}: \"Gimme a balloon to throw!\"")
            }
            Self::SelectedBalloon { thrower } => write!(
                f,
                "{thrower} \"I have selected the perfect balloon for my next victim!\""
            ),
            Self::Threw { thrower, target } => {
                write!(f, "{thrower} \"Hey {target}, here it comes!\"")
            }
            Self::Caught { thrower } => write!(
                f,
                "{thrower} \"Thanks for the balloon! Now I have one more for my arsenal!\""
            ),
            Self::Splashed { thrower } => write!(f, "(Splash!)  {thrower} \"Yuck!  I'm wet!\""),
            Self::FightOver => write!(f, "The fight is over!"),
            Self::StillDry { thrower } => {
                write!(f, "{thrower} \"Hah!  The fight is over and I'm still dry!\"")
            }
            Self::WillWinNextTime { thrower } => write!(f, "{thrower} \"I will win next time!\""),
        }
    }
}

/// Sink for fight narration. Called from many tasks at once, sometimes
/// while a thrower's lock is held, so implementations must not block long.
pub trait Narrator: Send + Sync {
    fn narrate(&self, event: &FightEvent);
}

/// Prints each event on its own line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNarrator;

impl Narrator for ConsoleNarrator {
    fn narrate(&self, event: &FightEvent) {
        println!("{event}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn narrate(&self, _event: &FightEvent) {}
}

/// Keeps every event in order, for tests and post-fight inspection.
#[derive(Debug, Default)]
pub struct RecordingNarrator {
    events: Mutex<Vec<FightEvent>>,
}

impl RecordingNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FightEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, pred: impl Fn(&FightEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| pred(e))
            .count()
    }
}

impl Narrator for RecordingNarrator {
    fn narrate(&self, event: &FightEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
