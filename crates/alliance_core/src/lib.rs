//! # alliance_core - Team Ranking and Alliance Optimization
//!
//! Ranks competition teams from scored match records and suggests small
//! alliances whose members cover each other's weak challenges and phases.
//!
//! ## Pipeline
//! - `scoring` - records -> points -> team / challenge / phase totals and ranks
//! - `alliance` - synergy scoring, greedy alliance construction, ranking
//! - `profile` - per-team strengths and weaknesses
//! - `cache` - freshness-window memoization of the standings
//!
//! The optimizer is deterministic: equal scores always resolve by team
//! identifier, so the same records and configuration give the same output.

pub mod alliance;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod profile;
pub mod scoring;

pub use alliance::{
    optimize, Alliance, AllianceBuilder, AllianceStatus, ChallengeCoverage, PhaseCoverage,
    SeedMode, SynergyScorer,
};
pub use cache::{RecordSource, StandingsCache};
pub use config::{
    BalanceWeights, OptimizerConfig, PhasePoints, RankingWeights, ScoringRules, SynergyWeights,
};
pub use error::{AllianceError, ConfigError, Result};
pub use models::{
    AllianceColor, MatchRecord, ScoredRecord, TeamChallengeScore, TeamPhaseScore, TeamRanking,
};
pub use profile::TeamProfile;
pub use scoring::Standings;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
