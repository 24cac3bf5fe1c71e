// ABOUTME: Cleanup level selected on the command line.
// ABOUTME: Level 1 is the regular sweep, level 2 the aggressive one.

use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

/// How far a sweep may go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanupLevel {
    /// Unused and terminal resources only.
    #[default]
    Regular,
    /// Stops and deletes in-use resources too.
    Aggressive,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cleanup level '{0}' (expected 1 or 2)")]
pub struct InvalidLevel(pub String);

impl CleanupLevel {
    pub const ALL: [CleanupLevel; 2] = [CleanupLevel::Regular, CleanupLevel::Aggressive];

    /// The numeric form used on the command line.
    pub fn number(&self) -> u8 {
        match self {
            CleanupLevel::Regular => 1,
            CleanupLevel::Aggressive => 2,
        }
    }
}

impl FromStr for CleanupLevel {
    type Err = InvalidLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(CleanupLevel::Regular),
            "2" => Ok(CleanupLevel::Aggressive),
            other => Err(InvalidLevel(other.to_string())),
        }
    }
}

impl std::fmt::Display for CleanupLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleanupLevel::Regular => write!(f, "1 (regular)"),
            CleanupLevel::Aggressive => write!(f, "2 (aggressive)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_levels() {
        assert_eq!("1".parse(), Ok(CleanupLevel::Regular));
        assert_eq!("2".parse(), Ok(CleanupLevel::Aggressive));
        assert_eq!(CleanupLevel::default(), CleanupLevel::Regular);
    }

    #[test]
    fn rejects_other_values() {
        for bad in ["0", "3", "regular", "", "1.0", "-1"] {
            assert!(bad.parse::<CleanupLevel>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn number_round_trips() {
        for level in CleanupLevel::ALL {
            assert_eq!(level.number().to_string().parse(), Ok(level));
        }
    }
}
