//! Sum aggregations over scored records and tie-aware ranking.
//!
//! Ranks follow the "min" tie method: a team's rank is one plus the number
//! of teams with strictly more points, so tied teams share a rank and the
//! next rank skips accordingly (1, 2, 2, 4).

use crate::models::{ScoredRecord, TeamChallengeScore, TeamPhaseScore, TeamRanking};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    auto: f64,
    teleop: f64,
    total: f64,
}

impl Totals {
    fn add(&mut self, record: &ScoredRecord) {
        self.auto += record.auto_points;
        self.teleop += record.teleop_points;
        self.total += record.total_points;
    }
}

fn into_ranking(totals: BTreeMap<&str, Totals>) -> Vec<TeamRanking> {
    let mut rankings: Vec<TeamRanking> = totals
        .into_iter()
        .map(|(team, t)| TeamRanking {
            team: team.to_string(),
            auto_points: t.auto,
            teleop_points: t.teleop,
            total_points: t.total,
            rank: 0,
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.total_points
            .partial_cmp(&a.total_points)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.team.cmp(&b.team))
    });
    assign_min_ranks(&mut rankings);
    rankings
}

/// Assign ranks to a slice already sorted by total points descending.
pub(crate) fn assign_min_ranks(rankings: &mut [TeamRanking]) {
    let mut prev: Option<(f64, u32)> = None;
    for (i, entry) in rankings.iter_mut().enumerate() {
        let rank = match prev {
            Some((total, rank)) if total == entry.total_points => rank,
            _ => i as u32 + 1,
        };
        entry.rank = rank;
        prev = Some((entry.total_points, rank));
    }
}

/// Overall ranking: one entry per team, rank ascending then team ascending.
pub fn rank_teams(records: &[ScoredRecord]) -> Vec<TeamRanking> {
    let mut totals: BTreeMap<&str, Totals> = BTreeMap::new();
    for record in records {
        totals.entry(record.team()).or_default().add(record);
    }
    into_ranking(totals)
}

/// Ranking restricted to one challenge's records.
pub fn rank_challenge(records: &[ScoredRecord], challenge: &str) -> Vec<TeamRanking> {
    let mut totals: BTreeMap<&str, Totals> = BTreeMap::new();
    for record in records.iter().filter(|r| r.challenge() == challenge) {
        totals.entry(record.team()).or_default().add(record);
    }
    into_ranking(totals)
}

/// (team, challenge) totals, ordered by team then challenge.
pub fn challenge_totals(records: &[ScoredRecord]) -> Vec<TeamChallengeScore> {
    let mut totals: BTreeMap<(&str, &str), Totals> = BTreeMap::new();
    for record in records {
        totals
            .entry((record.team(), record.challenge()))
            .or_default()
            .add(record);
    }
    totals
        .into_iter()
        .map(|((team, challenge), t)| TeamChallengeScore {
            team: team.to_string(),
            challenge: challenge.to_string(),
            auto_points: t.auto,
            teleop_points: t.teleop,
            total_points: t.total,
        })
        .collect()
}

/// (team, challenge, phase key) totals, ordered by team, challenge, phase.
pub fn phase_totals(records: &[ScoredRecord]) -> Vec<TeamPhaseScore> {
    let mut totals: BTreeMap<(&str, &str, &str), f64> = BTreeMap::new();
    for record in records {
        *totals
            .entry((record.team(), record.challenge(), record.phase_key.as_str()))
            .or_insert(0.0) += record.total_points;
    }
    totals
        .into_iter()
        .map(|((team, challenge, phase), total_points)| TeamPhaseScore {
            team: team.to_string(),
            challenge: challenge.to_string(),
            phase: phase.to_string(),
            total_points,
        })
        .collect()
}
