//! # Alliance Optimization
//!
//! Greedy, bounded construction of complementary alliances.
//!
//! - `synergy` - how much a candidate adds to a partial alliance's coverage
//! - `builder` - seeded greedy search with an overall-points fallback
//! - `ranker` - composite ordering of finished alliances
//!
//! The search is a heuristic: it caps work at top-N teams, K seeds and a
//! fixed alliance size rather than enumerating every partition.

pub mod builder;
pub mod ranker;
pub mod synergy;

pub use builder::{AllianceBuilder, SeedMode};
pub use ranker::{composite_score, rank_alliances};
pub use synergy::{CoverageMap, SynergyScorer};

use crate::config::{BalanceWeights, OptimizerConfig};
use crate::error::Result;
use crate::scoring::Standings;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

/// Terminal state of one construction attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllianceStatus {
    /// Reached the target size
    Complete,
    /// Candidate pool ran out first
    Incomplete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeCoverage {
    pub challenge: String,
    pub total_points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseCoverage {
    pub challenge: String,
    pub phase: String,
    pub total_points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alliance {
    /// Team that anchored this attempt
    pub seed: String,
    /// Members in pick order, seed first
    pub members: Vec<String>,
    pub status: AllianceStatus,
    /// Sum of member overall totals
    pub total_points: f64,
    pub balance_score: f64,
    /// Sum across members per challenge, ordered by challenge
    pub challenge_coverage: Vec<ChallengeCoverage>,
    /// Sum across members per (challenge, phase), ordered by challenge then phase
    pub phase_coverage: Vec<PhaseCoverage>,
    /// Members chosen by overall points rather than synergy
    pub fallback_picks: usize,
    /// Set by the ranker
    pub composite_score: f64,
}

impl Alliance {
    pub fn is_complete(&self) -> bool {
        self.status == AllianceStatus::Complete
    }

    pub fn contains(&self, team: &str) -> bool {
        self.members.iter().any(|m| m == team)
    }

    /// Lowest-scoring covered challenge, ties broken by name.
    pub fn weakest_challenge(&self) -> Option<&ChallengeCoverage> {
        self.challenge_coverage.iter().min_by(|a, b| {
            a.total_points
                .partial_cmp(&b.total_points)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.challenge.cmp(&b.challenge))
        })
    }

    pub fn phases_in<'a>(&'a self, challenge: &'a str) -> impl Iterator<Item = &'a PhaseCoverage> {
        self.phase_coverage
            .iter()
            .filter(move |p| p.challenge == challenge)
    }
}

/// `mean / (stdev + 1)` over coverage totals; 0 when there is nothing to measure.
///
/// Uses the sample standard deviation, taken as 0 below two values.
pub fn balance_ratio(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let stdev = if values.len() < 2 {
        0.0
    } else {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    };
    mean / (stdev + 1.0)
}

pub fn balance_score(
    challenges: &[ChallengeCoverage],
    phases: &[PhaseCoverage],
    weights: &BalanceWeights,
) -> f64 {
    let cb = balance_ratio(&challenges.iter().map(|c| c.total_points).collect::<Vec<_>>());
    let pb = balance_ratio(&phases.iter().map(|p| p.total_points).collect::<Vec<_>>());
    weights.challenge_weight * cb + weights.phase_weight * pb
}

/// Build, filter and rank alliances in one call.
pub fn optimize(
    standings: &Standings,
    config: &OptimizerConfig,
    mode: &SeedMode,
) -> Result<Vec<Alliance>> {
    let mut alliances = AllianceBuilder::new(standings, config).build(mode)?;
    let built = alliances.len();
    if !config.keep_incomplete {
        alliances.retain(Alliance::is_complete);
    }
    let ranked = rank_alliances(alliances, &config.ranking, config.result_count);
    info!(
        built,
        returned = ranked.len(),
        keep_incomplete = config.keep_incomplete,
        "alliance optimization finished"
    );
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_ratio_edge_cases() {
        assert_eq!(balance_ratio(&[]), 0.0);
        assert_eq!(balance_ratio(&[12.0]), 12.0);
        assert_eq!(balance_ratio(&[5.0, 5.0, 5.0]), 5.0);
    }

    #[test]
    fn test_balance_prefers_even_spread() {
        let even = balance_ratio(&[10.0, 10.0]);
        let skewed = balance_ratio(&[19.0, 1.0]);
        assert!(even > skewed);
    }

    #[test]
    fn test_balance_ratio_uses_sample_stdev() {
        // mean 2, sample stdev 1
        let b = balance_ratio(&[1.0, 2.0, 3.0]);
        assert!((b - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_balance_score_blend() {
        let challenges = vec![ChallengeCoverage {
            challenge: "REEF".to_string(),
            total_points: 10.0,
        }];
        let weights = BalanceWeights {
            challenge_weight: 0.7,
            phase_weight: 0.3,
        };
        // no phases -> phase balance 0
        assert!((balance_score(&challenges, &[], &weights) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_weakest_challenge() {
        let alliance = Alliance {
            seed: "A".to_string(),
            members: vec!["A".to_string()],
            status: AllianceStatus::Incomplete,
            total_points: 0.0,
            balance_score: 0.0,
            challenge_coverage: vec![
                ChallengeCoverage { challenge: "CAGE".to_string(), total_points: 4.0 },
                ChallengeCoverage { challenge: "NET".to_string(), total_points: 4.0 },
                ChallengeCoverage { challenge: "REEF".to_string(), total_points: 9.0 },
            ],
            phase_coverage: vec![],
            fallback_picks: 0,
            composite_score: 0.0,
        };
        assert_eq!(alliance.weakest_challenge().unwrap().challenge, "CAGE");
        assert!(alliance.contains("A"));
        assert!(!alliance.is_complete());
    }
}
