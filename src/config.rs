//! Caller-facing configuration for the parser.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Policy for handling negative band occupancies.
///
/// Negative partial occupancies are a data-quality signal from the
/// electronic-structure code, not a parse error, so the response is left to
/// the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeOccupancies {
    /// Log a warning but keep the parsed values (default).
    #[default]
    Warn,
    /// Abort the parse with [`crate::ProcarError::NegativeOccupancy`].
    Raise,
    /// Keep the parsed values silently.
    Ignore,
    /// Clamp negative occupancies to zero.
    Zero,
}

impl FromStr for NegativeOccupancies {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(Self::Warn),
            "raise" => Ok(Self::Raise),
            "ignore" => Ok(Self::Ignore),
            "zero" => Ok(Self::Zero),
            other => Err(format!(
                "invalid negative-occupancy policy {:?}; expected warn, raise, ignore or zero",
                other
            )),
        }
    }
}
