//! # Scoring
//!
//! Turns raw match records into the immutable `Standings` snapshot every
//! downstream stage reads.
//!
//! - `aggregate` - per-record points under the scoring rules
//! - `ranking` - team / challenge / phase totals and min-tie ranks

pub mod aggregate;
pub mod ranking;

pub use aggregate::{aggregate, score_record, AggregateReport};
pub use ranking::{challenge_totals, phase_totals, rank_challenge, rank_teams};

use crate::config::ScoringRules;
use crate::models::{MatchRecord, ScoredRecord, TeamChallengeScore, TeamPhaseScore, TeamRanking};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

/// challenge -> phase key -> points
pub type PhaseProfile = BTreeMap<String, BTreeMap<String, f64>>;

/// Aggregates and rankings computed from one record snapshot.
#[derive(Debug, Clone, Default)]
pub struct Standings {
    pub report: AggregateReport,
    /// Rank ascending, then team ascending
    pub team_rankings: Vec<TeamRanking>,
    pub challenge_scores: Vec<TeamChallengeScore>,
    pub phase_scores: Vec<TeamPhaseScore>,
    team_index: FxHashMap<String, usize>,
    phase_profiles: FxHashMap<String, PhaseProfile>,
    challenge_profiles: FxHashMap<String, BTreeMap<String, f64>>,
}

impl Standings {
    pub fn compute(records: &[MatchRecord], rules: &ScoringRules) -> Self {
        Self::from_report(aggregate(records, rules))
    }

    pub fn from_report(report: AggregateReport) -> Self {
        let team_rankings = rank_teams(&report.records);
        let challenge_scores = challenge_totals(&report.records);
        let phase_scores = phase_totals(&report.records);

        let team_index = team_rankings
            .iter()
            .enumerate()
            .map(|(i, r)| (r.team.clone(), i))
            .collect();

        let mut phase_profiles: FxHashMap<String, PhaseProfile> = FxHashMap::default();
        for p in &phase_scores {
            phase_profiles
                .entry(p.team.clone())
                .or_default()
                .entry(p.challenge.clone())
                .or_default()
                .insert(p.phase.clone(), p.total_points);
        }

        let mut challenge_profiles: FxHashMap<String, BTreeMap<String, f64>> =
            FxHashMap::default();
        for c in &challenge_scores {
            challenge_profiles
                .entry(c.team.clone())
                .or_default()
                .insert(c.challenge.clone(), c.total_points);
        }

        Self {
            report,
            team_rankings,
            challenge_scores,
            phase_scores,
            team_index,
            phase_profiles,
            challenge_profiles,
        }
    }

    pub fn records(&self) -> &[ScoredRecord] {
        &self.report.records
    }

    pub fn is_empty(&self) -> bool {
        self.team_rankings.is_empty()
    }

    pub fn team(&self, team: &str) -> Option<&TeamRanking> {
        self.team_index.get(team).map(|&i| &self.team_rankings[i])
    }

    /// Overall total, 0 for unknown teams.
    pub fn team_total(&self, team: &str) -> f64 {
        self.team(team).map(|r| r.total_points).unwrap_or(0.0)
    }

    pub fn phase_profile(&self, team: &str) -> Option<&PhaseProfile> {
        self.phase_profiles.get(team)
    }

    pub fn challenge_profile(&self, team: &str) -> Option<&BTreeMap<String, f64>> {
        self.challenge_profiles.get(team)
    }

    pub fn top_teams(&self, n: usize) -> &[TeamRanking] {
        &self.team_rankings[..n.min(self.team_rankings.len())]
    }

    pub fn rank_challenge(&self, challenge: &str) -> Vec<TeamRanking> {
        rank_challenge(self.records(), challenge)
    }

    /// Distinct challenge names, sorted.
    pub fn challenges(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .challenge_scores
            .iter()
            .map(|c| c.challenge.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// First team in ranking order whose name contains `query`, ignoring case.
    pub fn find_team(&self, query: &str) -> Option<&TeamRanking> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.team_rankings
            .iter()
            .find(|r| r.team.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AllianceColor;

    fn record(team: &str, challenge: &str, phase: &str, teleop: u32) -> MatchRecord {
        MatchRecord {
            robot_id: 0,
            team: team.to_string(),
            challenge_id: 0,
            challenge_name: challenge.to_string(),
            phase_id: 0,
            phase_name: phase.to_string(),
            completed_autonomous: 0,
            completed_teleop: teleop,
            alliance: AllianceColor::Unknown,
            location: String::new(),
        }
    }

    fn standings() -> Standings {
        Standings::compute(
            &[
                record("10019 MINERSKILLS", "REEF", "NET", 3),
                record("10019 MINERSKILLS", "CAGE", "DEEP_CAGE", 1),
                record("254 Poofs", "REEF", "CORAL L4", 2),
                record("1678 Citrus", "CAGE", "PARK", 1),
            ],
            &ScoringRules::default(),
        )
    }

    #[test]
    fn test_lookups() {
        let s = standings();
        assert_eq!(s.team_rankings[0].team, "10019 MINERSKILLS");
        assert_eq!(s.team_total("10019 MINERSKILLS"), 24.0);
        assert_eq!(s.team_total("missing"), 0.0);
        assert_eq!(s.top_teams(2).len(), 2);
        assert_eq!(s.top_teams(99).len(), 3);
        assert_eq!(s.challenges(), vec!["CAGE".to_string(), "REEF".to_string()]);

        let profile = s.phase_profile("10019 MINERSKILLS").unwrap();
        assert_eq!(profile["REEF"]["NET"], 12.0);
        assert_eq!(profile["CAGE"]["DEEP_CAGE"], 12.0);
        assert_eq!(s.challenge_profile("254 Poofs").unwrap()["REEF"], 10.0);
    }

    #[test]
    fn test_find_team_is_case_insensitive() {
        let s = standings();
        assert_eq!(s.find_team("miners").unwrap().team, "10019 MINERSKILLS");
        assert_eq!(s.find_team("254").unwrap().team, "254 Poofs");
        assert!(s.find_team("   ").is_none());
        assert!(s.find_team("9999").is_none());
    }

    #[test]
    fn test_empty_standings() {
        let s = Standings::compute(&[], &ScoringRules::default());
        assert!(s.is_empty());
        assert!(s.top_teams(5).is_empty());
        assert!(s.challenges().is_empty());
    }
}
