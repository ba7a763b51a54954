//! Seed selection for the fight's random source.
//!
//! The seed argument accepts C-style integer literals: decimal, `0x` hex or
//! leading-`0` octal, optionally signed. Anything else falls back to the
//! process id rather than aborting.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where the seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Seed {
    Argument(u64),
    ProcessId(u64),
}

impl Seed {
    pub fn value(self) -> u64 {
        match self {
            Self::Argument(v) | Self::ProcessId(v) => v,
        }
    }
}

/// Pick the seed from the optional argument, falling back to the process id.
pub fn resolve_seed(arg: Option<&str>) -> Seed {
    match arg {
        Some(raw) => match parse_seed(raw) {
            Some(seed) => Seed::Argument(seed),
            None => {
                warn!(arg = raw, "Seed is not an integer, using process id");
                Seed::ProcessId(std::process::id() as u64)
            }
        },
        None => Seed::ProcessId(std::process::id() as u64),
    }
}

/// Parse an integer literal, base inferred from its prefix.
///
/// Negative values wrap into `u64` the way an unsigned seed would.
pub fn parse_seed(raw: &str) -> Option<u64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i64::from_str_radix(body, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    Some(value as u64)
}
