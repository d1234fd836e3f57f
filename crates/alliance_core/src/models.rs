//! Typed records shared by every stage of the optimizer.
//!
//! `MatchRecord` is what the data provider hands in; everything else is
//! derived and recomputed whenever the standings refresh.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Alliance color a robot played on in a given match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AllianceColor {
    Red,
    Blue,
    #[default]
    Unknown,
}

impl FromStr for AllianceColor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "red" | "vermelha" | "r" => AllianceColor::Red,
            "blue" | "azul" | "b" => AllianceColor::Blue,
            _ => AllianceColor::Unknown,
        })
    }
}

impl fmt::Display for AllianceColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AllianceColor::Red => write!(f, "red"),
            AllianceColor::Blue => write!(f, "blue"),
            AllianceColor::Unknown => write!(f, "unknown"),
        }
    }
}

/// One scored row: a robot's completions in one phase of one challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchRecord {
    pub robot_id: u32,
    /// Team identifier (number and/or name), the key rankings group by
    pub team: String,
    pub challenge_id: u32,
    pub challenge_name: String,
    pub phase_id: u32,
    pub phase_name: String,
    pub completed_autonomous: u32,
    pub completed_teleop: u32,
    #[serde(default)]
    pub alliance: AllianceColor,
    #[serde(default)]
    pub location: String,
}

/// A `MatchRecord` enriched with points under the active scoring rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRecord {
    pub record: MatchRecord,
    /// Canonical phase key after alias resolution
    pub phase_key: String,
    pub auto_points: f64,
    pub teleop_points: f64,
    pub total_points: f64,
    /// False when `phase_key` had no entry in the points table
    pub mapped: bool,
}

impl ScoredRecord {
    pub fn team(&self) -> &str {
        &self.record.team
    }

    pub fn challenge(&self) -> &str {
        &self.record.challenge_name
    }
}

/// Overall standing of a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamRanking {
    pub team: String,
    pub auto_points: f64,
    pub teleop_points: f64,
    pub total_points: f64,
    /// 1 + number of teams with strictly more points
    pub rank: u32,
}

/// Points a team scored within one challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamChallengeScore {
    pub team: String,
    pub challenge: String,
    pub auto_points: f64,
    pub teleop_points: f64,
    pub total_points: f64,
}

/// Points a team scored within one phase of one challenge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamPhaseScore {
    pub team: String,
    pub challenge: String,
    pub phase: String,
    pub total_points: f64,
}
