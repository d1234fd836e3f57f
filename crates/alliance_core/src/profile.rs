//! # Team Profile
//!
//! Strengths and weaknesses of a single team at challenge and phase level,
//! as shown next to alliance suggestions.

use crate::models::{TeamChallengeScore, TeamPhaseScore};
use crate::scoring::Standings;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const CHALLENGE_HIGHLIGHTS: usize = 2;
pub const PHASE_HIGHLIGHTS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamProfile {
    pub team: String,
    pub rank: u32,
    pub total_points: f64,
    /// Best challenges first
    pub strongest_challenges: Vec<TeamChallengeScore>,
    /// Worst challenges first
    pub weakest_challenges: Vec<TeamChallengeScore>,
    pub strongest_phases: Vec<TeamPhaseScore>,
    pub weakest_phases: Vec<TeamPhaseScore>,
}

impl TeamProfile {
    /// `None` when the team has no records.
    pub fn build(standings: &Standings, team: &str) -> Option<Self> {
        let ranking = standings.team(team)?;

        let mut challenges: Vec<TeamChallengeScore> = standings
            .challenge_scores
            .iter()
            .filter(|c| c.team == team)
            .cloned()
            .collect();
        challenges.sort_by(|a, b| {
            by_points(a.total_points, b.total_points).then_with(|| a.challenge.cmp(&b.challenge))
        });

        let mut phases: Vec<TeamPhaseScore> = standings
            .phase_scores
            .iter()
            .filter(|p| p.team == team)
            .cloned()
            .collect();
        phases.sort_by(|a, b| {
            by_points(a.total_points, b.total_points)
                .then_with(|| a.challenge.cmp(&b.challenge))
                .then_with(|| a.phase.cmp(&b.phase))
        });

        Some(Self {
            team: ranking.team.clone(),
            rank: ranking.rank,
            total_points: ranking.total_points,
            strongest_challenges: challenges
                .iter()
                .rev()
                .take(CHALLENGE_HIGHLIGHTS)
                .cloned()
                .collect(),
            weakest_challenges: challenges.iter().take(CHALLENGE_HIGHLIGHTS).cloned().collect(),
            strongest_phases: phases.iter().rev().take(PHASE_HIGHLIGHTS).cloned().collect(),
            weakest_phases: phases.iter().take(PHASE_HIGHLIGHTS).cloned().collect(),
        })
    }

    pub fn best_challenge(&self) -> Option<&TeamChallengeScore> {
        self.strongest_challenges.first()
    }

    pub fn best_phase(&self) -> Option<&TeamPhaseScore> {
        self.strongest_phases.first()
    }
}

fn by_points(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
