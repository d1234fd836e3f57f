//! # Optimizer Configuration
//!
//! Everything the optimizer reads besides the match records themselves:
//! the scoring rules (points table + phase aliases), search budgets and
//! heuristic weights. Configuration is immutable once validated and is
//! passed explicitly into each stage.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = OptimizerConfig::load("alliance.yaml")?;
//! let alliances = optimize(&standings, &config, &SeedMode::Batch)?;
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::{env, fs};

pub const CONFIG_PATH_ENV: &str = "ALLIANCE_CONFIG_PATH";

// ========== Scoring Rules ==========

/// Autonomous / teleop multipliers for one canonical phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PhasePoints {
    pub auto: f64,
    pub teleop: f64,
}

impl PhasePoints {
    pub const fn new(auto: f64, teleop: f64) -> Self {
        Self { auto, teleop }
    }
}

/// Points table plus the aliases that map observed phase names onto it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringRules {
    /// Canonical phase key -> multipliers
    #[serde(default = "default_points_table")]
    pub points: BTreeMap<String, PhasePoints>,
    /// Observed phase name -> canonical key
    #[serde(default = "default_phase_aliases")]
    pub aliases: BTreeMap<String, String>,
}

fn default_points_table() -> BTreeMap<String, PhasePoints> {
    [
        ("LEAVE", PhasePoints::new(3.0, 0.0)),
        ("L1", PhasePoints::new(3.0, 2.0)),
        ("L2", PhasePoints::new(4.0, 3.0)),
        ("L3", PhasePoints::new(6.0, 4.0)),
        ("L4", PhasePoints::new(7.0, 5.0)),
        ("PROCESSOR", PhasePoints::new(6.0, 6.0)),
        ("NET", PhasePoints::new(4.0, 4.0)),
        ("PARK", PhasePoints::new(0.0, 2.0)),
        ("SHALLOW_CAGE", PhasePoints::new(6.0, 6.0)),
        ("DEEP_CAGE", PhasePoints::new(12.0, 12.0)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_phase_aliases() -> BTreeMap<String, String> {
    [
        ("CORAL L1", "L1"),
        ("CORAL L2", "L2"),
        ("CORAL L3", "L3"),
        ("CORAL L4", "L4"),
        ("BARGE", "PARK"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            points: default_points_table(),
            aliases: default_phase_aliases(),
        }
    }
}

impl ScoringRules {
    /// Resolve an observed phase name to its canonical key (identity if unaliased).
    pub fn canonical_key<'a>(&'a self, phase_name: &'a str) -> &'a str {
        let name = phase_name.trim();
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn multipliers(&self, phase_key: &str) -> Option<PhasePoints> {
        self.points.get(phase_key).copied()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, p) in &self.points {
            if !p.auto.is_finite() || p.auto < 0.0 || !p.teleop.is_finite() || p.teleop < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "points[{key}] multipliers must be finite and >= 0, got auto={} teleop={}",
                    p.auto, p.teleop
                )));
            }
        }
        Ok(())
    }
}

// ========== Heuristic Weights ==========

/// Multipliers the synergy scorer applies to coverage a candidate adds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SynergyWeights {
    /// Applied to phase points in a challenge no member touches yet (default: 1.5)
    #[serde(default = "default_new_challenge_bonus")]
    pub new_challenge_bonus: f64,
    /// Applied to phase points in an uncovered phase of a covered challenge (default: 1.2)
    #[serde(default = "default_new_phase_bonus")]
    pub new_phase_bonus: f64,
}

fn default_new_challenge_bonus() -> f64 {
    1.5
}
fn default_new_phase_bonus() -> f64 {
    1.2
}

impl Default for SynergyWeights {
    fn default() -> Self {
        Self {
            new_challenge_bonus: 1.5,
            new_phase_bonus: 1.2,
        }
    }
}

/// Blend of challenge-level and phase-level balance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BalanceWeights {
    #[serde(default = "default_challenge_weight")]
    pub challenge_weight: f64,
    #[serde(default = "default_phase_weight")]
    pub phase_weight: f64,
}

fn default_challenge_weight() -> f64 {
    0.7
}
fn default_phase_weight() -> f64 {
    0.3
}

impl Default for BalanceWeights {
    fn default() -> Self {
        Self {
            challenge_weight: 0.7,
            phase_weight: 0.3,
        }
    }
}

/// Composite ranking key: `balance_weight * balance + points_weight * total_points`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RankingWeights {
    #[serde(default = "default_balance_weight")]
    pub balance_weight: f64,
    #[serde(default = "default_points_weight")]
    pub points_weight: f64,
}

fn default_balance_weight() -> f64 {
    0.4
}
fn default_points_weight() -> f64 {
    0.6
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            balance_weight: 0.4,
            points_weight: 0.6,
        }
    }
}

// ========== OptimizerConfig ==========

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizerConfig {
    /// Members per alliance (default: 3)
    #[serde(default = "default_alliance_size")]
    pub alliance_size: usize,
    /// Only the top-N teams by total points take part in synergy search (default: 24)
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Maximum number of seeded attempts per run (default: 24)
    #[serde(default = "default_max_seeds")]
    pub max_seeds: usize,
    /// Let the fallback pick teams ranked below the top-N once the top-N pool
    /// is exhausted (default: false, such attempts end incomplete)
    #[serde(default)]
    pub fallback_beyond_top_n: bool,
    /// Alliances returned after ranking (default: 3)
    #[serde(default = "default_result_count")]
    pub result_count: usize,
    #[serde(default)]
    pub synergy: SynergyWeights,
    #[serde(default)]
    pub balance: BalanceWeights,
    #[serde(default)]
    pub ranking: RankingWeights,
    /// Return alliances that ran out of candidates, flagged incomplete (default: true).
    /// When false they are dropped from the result.
    #[serde(default = "default_true")]
    pub keep_incomplete: bool,
    /// Run independent seeded attempts on the rayon pool (default: true)
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Standings older than this are recomputed (default: 300)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub scoring: ScoringRules,
}

fn default_alliance_size() -> usize {
    3
}
fn default_top_n() -> usize {
    24
}
fn default_max_seeds() -> usize {
    24
}
fn default_result_count() -> usize {
    3
}
fn default_true() -> bool {
    true
}
fn default_refresh_interval_secs() -> u64 {
    300
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            alliance_size: 3,
            top_n: 24,
            max_seeds: 24,
            fallback_beyond_top_n: false,
            result_count: 3,
            synergy: SynergyWeights::default(),
            balance: BalanceWeights::default(),
            ranking: RankingWeights::default(),
            keep_incomplete: true,
            parallel: true,
            refresh_interval_secs: 300,
            scoring: ScoringRules::default(),
        }
    }
}

impl OptimizerConfig {
    /// Load from a `.json`, `.yaml` or `.yml` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: OptimizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: OptimizerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `ALLIANCE_CONFIG_PATH`, if set.
    pub fn load_from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(None);
        };
        let path = path.trim();
        if path.is_empty() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alliance_size == 0 {
            return Err(ConfigError::Validation(
                "alliance_size must be at least 1".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(ConfigError::Validation("top_n must be at least 1".to_string()));
        }
        if self.max_seeds == 0 {
            return Err(ConfigError::Validation(
                "max_seeds must be at least 1".to_string(),
            ));
        }
        if self.result_count == 0 {
            return Err(ConfigError::Validation(
                "result_count must be at least 1".to_string(),
            ));
        }

        check_non_negative("synergy.new_challenge_bonus", self.synergy.new_challenge_bonus)?;
        check_non_negative("synergy.new_phase_bonus", self.synergy.new_phase_bonus)?;
        check_weight_pair(
            "balance",
            self.balance.challenge_weight,
            self.balance.phase_weight,
        )?;
        check_weight_pair(
            "ranking",
            self.ranking.balance_weight,
            self.ranking.points_weight,
        )?;

        self.scoring.validate()
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{name} must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}

fn check_weight_pair(name: &str, a: f64, b: f64) -> Result<(), ConfigError> {
    check_non_negative(&format!("{name} weight"), a)?;
    check_non_negative(&format!("{name} weight"), b)?;
    if a + b <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "{name} weights must not both be zero"
        )));
    }
    Ok(())
}
