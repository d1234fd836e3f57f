//! Seeded greedy alliance construction.
//!
//! Each attempt starts from a seed and fills slots one at a time with the
//! best synergy candidate from a pool restricted to the top-N teams. When
//! synergy has nothing useful to offer the highest-ranked available team is
//! taken instead. Attempts end `Complete` at the target size or
//! `Incomplete` when every source of candidates is exhausted.

use super::synergy::{CoverageMap, SynergyScorer};
use super::{balance_score, Alliance, AllianceStatus, ChallengeCoverage, PhaseCoverage};
use crate::config::OptimizerConfig;
use crate::error::{AllianceError, Result};
use crate::scoring::Standings;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// How seeds are chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedMode {
    /// Every top-N team in ranking order seeds an attempt; members of each
    /// finished alliance are unavailable to later attempts.
    Batch,
    /// Up to `max_seeds` top-N teams each seed an attempt that shares no
    /// exclusions with the others. Runs on the rayon pool when enabled.
    Independent,
    /// A single attempt anchored on the named team.
    Targeted(String),
}

pub struct AllianceBuilder<'a> {
    standings: &'a Standings,
    config: &'a OptimizerConfig,
    scorer: SynergyScorer<'a>,
}

impl<'a> AllianceBuilder<'a> {
    pub fn new(standings: &'a Standings, config: &'a OptimizerConfig) -> Self {
        Self {
            standings,
            config,
            scorer: SynergyScorer::new(standings, config.synergy),
        }
    }

    /// Top-N teams by overall points, in ranking order.
    pub fn universe(&self) -> Vec<&'a str> {
        self.standings
            .top_teams(self.config.top_n)
            .iter()
            .map(|r| r.team.as_str())
            .collect()
    }

    pub fn build(&self, mode: &SeedMode) -> Result<Vec<Alliance>> {
        if self.standings.is_empty() {
            debug!("no ranked teams, nothing to build");
            return Ok(Vec::new());
        }

        let universe = self.universe();
        let alliances = match mode {
            SeedMode::Batch => self.build_batch(&universe),
            SeedMode::Independent => self.build_independent(&universe),
            SeedMode::Targeted(team) => {
                if self.standings.team(team).is_none() {
                    return Err(AllianceError::UnknownTeam(team.clone()));
                }
                vec![self.build_one(team, &universe, &FxHashSet::default())]
            }
        };

        info!(
            mode = ?mode,
            universe = universe.len(),
            alliances = alliances.len(),
            incomplete = alliances.iter().filter(|a| !a.is_complete()).count(),
            "built alliances"
        );
        Ok(alliances)
    }

    fn build_batch(&self, universe: &[&'a str]) -> Vec<Alliance> {
        let mut committed: FxHashSet<&str> = FxHashSet::default();
        let mut alliances = Vec::new();

        for &seed in universe {
            if alliances.len() >= self.config.max_seeds {
                break;
            }
            if committed.contains(seed) {
                continue;
            }
            let alliance = self.build_one(seed, universe, &committed);
            for member in &alliance.members {
                if let Some(team) = self.standings.team(member) {
                    committed.insert(team.team.as_str());
                }
            }
            alliances.push(alliance);
        }
        alliances
    }

    fn build_independent(&self, universe: &[&'a str]) -> Vec<Alliance> {
        let seeds = &universe[..self.config.max_seeds.min(universe.len())];
        let none = FxHashSet::default();
        if self.config.parallel {
            seeds
                .par_iter()
                .map(|seed| self.build_one(seed, universe, &none))
                .collect()
        } else {
            seeds
                .iter()
                .map(|seed| self.build_one(seed, universe, &none))
                .collect()
        }
    }

    /// Run one attempt from `seed`, never picking a team in `excluded`.
    pub fn build_one(&self, seed: &str, universe: &[&str], excluded: &FxHashSet<&str>) -> Alliance {
        let target = self.config.alliance_size;
        let mut members: Vec<String> = vec![seed.to_string()];
        let mut coverage = CoverageMap::new();
        coverage.absorb(self.standings.phase_profile(seed));

        let mut pool: BTreeSet<&str> = universe
            .iter()
            .copied()
            .filter(|t| *t != seed && !excluded.contains(t))
            .collect();
        let mut fallback_picks = 0;

        while members.len() < target {
            let pick = match self.scorer.best_candidate(&coverage, pool.iter().copied()) {
                Some((team, score)) if score > 0.0 => {
                    debug!(seed, team, score, "synergy pick");
                    Some(team.to_string())
                }
                _ => self.fallback(&pool, &members, excluded).map(|team| {
                    fallback_picks += 1;
                    debug!(seed, team = %team, "fallback pick");
                    team
                }),
            };

            let Some(team) = pick else {
                break;
            };
            pool.remove(team.as_str());
            coverage.absorb(self.standings.phase_profile(&team));
            members.push(team);
        }

        let status = if members.len() >= target {
            AllianceStatus::Complete
        } else {
            AllianceStatus::Incomplete
        };
        self.finish(seed, members, status, fallback_picks)
    }

    /// Highest overall team still in the pool. With `fallback_beyond_top_n`
    /// set, an exhausted pool falls through to the highest ranked team that
    /// is neither a member nor excluded.
    fn fallback(
        &self,
        pool: &BTreeSet<&str>,
        members: &[String],
        excluded: &FxHashSet<&str>,
    ) -> Option<String> {
        let ranked = || self.standings.team_rankings.iter().map(|r| r.team.as_str());

        let in_pool = ranked().find(|t| pool.contains(t));
        if in_pool.is_some() || !self.config.fallback_beyond_top_n {
            return in_pool.map(str::to_string);
        }
        ranked()
            .find(|t| !excluded.contains(t) && !members.iter().any(|m| m == t))
            .map(str::to_string)
    }

    fn finish(
        &self,
        seed: &str,
        members: Vec<String>,
        status: AllianceStatus,
        fallback_picks: usize,
    ) -> Alliance {
        let total_points: f64 = members.iter().map(|m| self.standings.team_total(m)).sum();

        let mut by_challenge: BTreeMap<&str, f64> = BTreeMap::new();
        let mut by_phase: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        for member in &members {
            if let Some(profile) = self.standings.challenge_profile(member) {
                for (challenge, points) in profile {
                    *by_challenge.entry(challenge.as_str()).or_insert(0.0) += points;
                }
            }
            if let Some(profile) = self.standings.phase_profile(member) {
                for (challenge, phases) in profile {
                    for (phase, points) in phases {
                        *by_phase
                            .entry((challenge.as_str(), phase.as_str()))
                            .or_insert(0.0) += points;
                    }
                }
            }
        }

        let challenge_coverage: Vec<ChallengeCoverage> = by_challenge
            .into_iter()
            .map(|(challenge, total_points)| ChallengeCoverage {
                challenge: challenge.to_string(),
                total_points,
            })
            .collect();
        let phase_coverage: Vec<PhaseCoverage> = by_phase
            .into_iter()
            .map(|((challenge, phase), total_points)| PhaseCoverage {
                challenge: challenge.to_string(),
                phase: phase.to_string(),
                total_points,
            })
            .collect();
        let balance = balance_score(&challenge_coverage, &phase_coverage, &self.config.balance);

        Alliance {
            seed: seed.to_string(),
            members,
            status,
            total_points,
            balance_score: balance,
            challenge_coverage,
            phase_coverage,
            fallback_picks,
            composite_score: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhasePoints, ScoringRules};
    use crate::models::{AllianceColor, MatchRecord};

    fn rec(team: &str, challenge: &str, points: u32) -> MatchRecord {
        MatchRecord {
            robot_id: 0,
            team: team.to_string(),
            challenge_id: 0,
            challenge_name: challenge.to_string(),
            phase_id: 0,
            phase_name: "P".to_string(),
            completed_autonomous: 0,
            completed_teleop: points,
            alliance: AllianceColor::Red,
            location: String::new(),
        }
    }

    fn standings(records: &[MatchRecord]) -> Standings {
        let mut rules = ScoringRules::default();
        rules.points.insert("P".to_string(), PhasePoints::new(0.0, 1.0));
        Standings::compute(records, &rules)
    }

    fn config(size: usize) -> OptimizerConfig {
        OptimizerConfig {
            alliance_size: size,
            ..Default::default()
        }
    }

    fn xyz() -> Standings {
        standings(&[
            rec("X", "C1", 10),
            rec("X", "C2", 1),
            rec("Y", "C1", 1),
            rec("Y", "C2", 10),
            rec("Z", "C1", 5),
            rec("Z", "C2", 5),
        ])
    }

    #[test]
    fn test_complementary_partner_wins() {
        let s = xyz();
        let cfg = config(2);
        let alliances = AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("X".to_string()))
            .unwrap();
        assert_eq!(alliances.len(), 1);
        assert_eq!(alliances[0].members, vec!["X".to_string(), "Y".to_string()]);
        assert!(alliances[0].is_complete());
        assert_eq!(alliances[0].total_points, 22.0);
    }

    #[test]
    fn test_empty_standings_yield_nothing() {
        let s = standings(&[]);
        let cfg = config(3);
        let builder = AllianceBuilder::new(&s, &cfg);
        assert!(builder.build(&SeedMode::Batch).unwrap().is_empty());
        assert!(builder.build(&SeedMode::Independent).unwrap().is_empty());
        assert!(builder
            .build(&SeedMode::Targeted("X".to_string()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_short_universe_is_incomplete() {
        let s = standings(&[rec("A", "C1", 3), rec("B", "C2", 4)]);
        let cfg = config(3);
        let alliances = AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("A".to_string()))
            .unwrap();
        assert_eq!(alliances[0].members.len(), 2);
        assert_eq!(alliances[0].status, AllianceStatus::Incomplete);
    }

    #[test]
    fn test_unknown_target_is_an_error() {
        let s = xyz();
        let cfg = config(3);
        let err = AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("nobody".to_string()))
            .unwrap_err();
        assert!(matches!(err, AllianceError::UnknownTeam(t) if t == "nobody"));
    }

    #[test]
    fn test_batch_alliances_are_disjoint() {
        let s = standings(&[
            rec("A", "C1", 9),
            rec("B", "C2", 8),
            rec("C", "C1", 7),
            rec("D", "C3", 6),
            rec("E", "C2", 5),
            rec("F", "C1", 4),
            rec("G", "C3", 3),
        ]);
        let cfg = config(3);
        let alliances = AllianceBuilder::new(&s, &cfg).build(&SeedMode::Batch).unwrap();
        let mut seen = BTreeSet::new();
        for alliance in &alliances {
            for member in &alliance.members {
                assert!(seen.insert(member.clone()), "{member} used twice");
            }
        }
        assert_eq!(alliances.len(), 3);
        assert_eq!(alliances[0].seed, "A");
        assert!(alliances[0].is_complete());
        assert!(alliances[1].is_complete());
        assert_eq!(alliances[2].members, vec!["F".to_string()]);
        assert_eq!(alliances[2].status, AllianceStatus::Incomplete);
    }

    #[test]
    fn test_batch_respects_max_seeds() {
        let s = xyz();
        let cfg = OptimizerConfig {
            alliance_size: 1,
            max_seeds: 2,
            ..Default::default()
        };
        let alliances = AllianceBuilder::new(&s, &cfg).build(&SeedMode::Batch).unwrap();
        assert_eq!(alliances.len(), 2);
    }

    #[test]
    fn test_fallback_takes_highest_ranked_when_synergy_is_zero() {
        // B and C add nothing over A, so the better-ranked one is taken
        let s = standings(&[rec("A", "C1", 10), rec("B", "C1", 2), rec("C", "C1", 6)]);
        let cfg = config(2);
        let alliances = AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("A".to_string()))
            .unwrap();
        assert_eq!(alliances[0].members, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(alliances[0].fallback_picks, 1);
    }

    #[test]
    fn test_exhausted_top_n_ends_incomplete() {
        // three ranked teams but only two in the universe
        let s = standings(&[rec("A", "C1", 10), rec("B", "C2", 8), rec("C", "C3", 1)]);
        let cfg = OptimizerConfig {
            alliance_size: 3,
            top_n: 2,
            ..Default::default()
        };
        let alliances = AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("A".to_string()))
            .unwrap();
        assert_eq!(alliances[0].members, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(alliances[0].status, AllianceStatus::Incomplete);
        assert_eq!(alliances[0].fallback_picks, 0);

        let batch = AllianceBuilder::new(&s, &cfg).build(&SeedMode::Batch).unwrap();
        assert!(batch.iter().all(|a| !a.contains("C")));
    }

    #[test]
    fn test_fallback_beyond_top_n_is_opt_in() {
        let s = standings(&[rec("A", "C1", 10), rec("B", "C2", 8), rec("C", "C3", 1)]);
        let cfg = OptimizerConfig {
            alliance_size: 3,
            top_n: 2,
            fallback_beyond_top_n: true,
            ..Default::default()
        };
        let alliances = AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("A".to_string()))
            .unwrap();
        assert_eq!(
            alliances[0].members,
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
        assert!(alliances[0].is_complete());
        assert_eq!(alliances[0].fallback_picks, 1);
    }

    #[test]
    fn test_targeted_seed_outside_top_n() {
        let s = standings(&[rec("A", "C1", 10), rec("B", "C2", 8), rec("C", "C3", 1)]);
        let cfg = OptimizerConfig {
            alliance_size: 2,
            top_n: 2,
            ..Default::default()
        };
        let alliances = AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("C".to_string()))
            .unwrap();
        assert_eq!(alliances[0].seed, "C");
        assert_eq!(alliances[0].members.len(), 2);
    }

    #[test]
    fn test_coverage_breakdown() {
        let s = xyz();
        let cfg = config(2);
        let alliance = &AllianceBuilder::new(&s, &cfg)
            .build(&SeedMode::Targeted("X".to_string()))
            .unwrap()[0];
        assert_eq!(alliance.challenge_coverage.len(), 2);
        assert_eq!(alliance.challenge_coverage[0].total_points, 11.0);
        assert_eq!(alliance.challenge_coverage[1].total_points, 11.0);
        assert_eq!(alliance.phase_coverage.len(), 2);
        // equal challenge and phase totals: both balances are mean / 1
        assert!((alliance.balance_score - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_independent_parallel_matches_sequential() {
        let s = standings(&[
            rec("A", "C1", 9),
            rec("B", "C2", 8),
            rec("C", "C1", 7),
            rec("D", "C3", 6),
            rec("E", "C2", 5),
        ]);
        let par = OptimizerConfig { parallel: true, ..Default::default() };
        let seq = OptimizerConfig { parallel: false, ..Default::default() };
        let a = AllianceBuilder::new(&s, &par).build(&SeedMode::Independent).unwrap();
        let b = AllianceBuilder::new(&s, &seq).build(&SeedMode::Independent).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        let seeds: Vec<&str> = a.iter().map(|x| x.seed.as_str()).collect();
        assert_eq!(seeds, vec!["A", "B", "C", "D", "E"]);
    }
}
