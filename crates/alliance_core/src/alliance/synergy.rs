//! Synergy scoring: how much a candidate would add to a partial alliance.
//!
//! The anchor pick rewards breadth (best phase per challenge). After that a
//! candidate earns a bonus for challenges or phases nobody covers yet, and
//! only its improvement over the current best member where a phase is
//! already covered.

use crate::config::SynergyWeights;
use crate::scoring::{PhaseProfile, Standings};
use std::collections::BTreeMap;

/// Challenge -> phase -> best points any current member scores there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageMap {
    challenges: BTreeMap<String, BTreeMap<String, f64>>,
    members: usize,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members<'a, I>(standings: &Standings, members: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::new();
        for team in members {
            map.absorb(standings.phase_profile(team));
        }
        map
    }

    /// Fold one member's phase profile in. Members without records still count.
    pub fn absorb(&mut self, profile: Option<&PhaseProfile>) {
        self.members += 1;
        let Some(profile) = profile else {
            return;
        };
        for (challenge, phases) in profile {
            let covered = self.challenges.entry(challenge.clone()).or_default();
            for (phase, &points) in phases {
                let best = covered.entry(phase.clone()).or_insert(points);
                if points > *best {
                    *best = points;
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members == 0
    }

    pub fn has_challenge(&self, challenge: &str) -> bool {
        self.challenges.contains_key(challenge)
    }

    pub fn best(&self, challenge: &str, phase: &str) -> Option<f64> {
        self.challenges.get(challenge)?.get(phase).copied()
    }
}

pub struct SynergyScorer<'a> {
    standings: &'a Standings,
    weights: SynergyWeights,
}

impl<'a> SynergyScorer<'a> {
    pub fn new(standings: &'a Standings, weights: SynergyWeights) -> Self {
        Self { standings, weights }
    }

    /// Score `candidate` against the alliance formed by `partial`.
    pub fn score(&self, partial: &[String], candidate: &str) -> f64 {
        let coverage = CoverageMap::from_members(self.standings, partial.iter().map(String::as_str));
        self.score_with(&coverage, candidate)
    }

    /// Score against a precomputed coverage map.
    pub fn score_with(&self, coverage: &CoverageMap, candidate: &str) -> f64 {
        let Some(profile) = self.standings.phase_profile(candidate) else {
            return 0.0;
        };

        if coverage.is_empty() {
            return breadth_score(profile);
        }

        let mut score = 0.0;
        for (challenge, phases) in profile {
            let challenge_covered = coverage.has_challenge(challenge);
            for (phase, &points) in phases {
                if points <= 0.0 {
                    continue;
                }
                score += if !challenge_covered {
                    points * self.weights.new_challenge_bonus
                } else {
                    match coverage.best(challenge, phase) {
                        None => points * self.weights.new_phase_bonus,
                        Some(current) => (points - current).max(0.0),
                    }
                };
            }
        }
        score
    }

    /// Highest-scoring candidate; ties go to the smallest team identifier.
    ///
    /// Non-finite scores are never selected.
    pub fn best_candidate<'c, I>(&self, coverage: &CoverageMap, pool: I) -> Option<(&'c str, f64)>
    where
        I: IntoIterator<Item = &'c str>,
    {
        let mut best: Option<(&'c str, f64)> = None;
        for team in pool {
            let score = self.score_with(coverage, team);
            if !score.is_finite() {
                continue;
            }
            best = match best {
                Some((b_team, b_score))
                    if b_score > score || (b_score == score && b_team <= team) =>
                {
                    Some((b_team, b_score))
                }
                _ => Some((team, score)),
            };
        }
        best
    }
}

/// Sum over challenges of the single best phase score.
fn breadth_score(profile: &PhaseProfile) -> f64 {
    profile
        .values()
        .map(|phases| phases.values().copied().fold(0.0_f64, f64::max))
        .sum()
}
