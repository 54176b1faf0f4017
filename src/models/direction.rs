use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Orientation on the time axis.
///
/// Used both as a sort direction (dates / times of day) and as the side of a
/// reference timestamp a query should look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    PastToFuture,
    FutureToPast,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::PastToFuture => "past_to_future",
            Direction::FutureToPast => "future_to_past",
        }
    }

    /// SQL ordering keyword for this direction.
    pub fn sql_order(&self) -> &'static str {
        match self {
            Direction::PastToFuture => "ASC",
            Direction::FutureToPast => "DESC",
        }
    }

    /// SQL comparison applied against a reference value: everything at or
    /// after it when looking forward, at or before it when looking back.
    pub fn sql_comparator(&self) -> &'static str {
        match self {
            Direction::PastToFuture => ">=",
            Direction::FutureToPast => "<=",
        }
    }

    /// Accepts the canonical names plus a few short aliases used on the CLI.
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "past_to_future" | "future" | "forward" | "asc" => Some(Direction::PastToFuture),
            "future_to_past" | "past" | "backward" | "desc" => Some(Direction::FutureToPast),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::from_code(s).ok_or_else(|| {
            format!(
                "invalid direction '{}': expected past_to_future or future_to_past",
                s
            )
        })
    }
}
