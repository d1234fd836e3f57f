//! # Standings Cache
//!
//! Memoizes `Standings` against a freshness window so repeated optimizer
//! runs within the window share one immutable snapshot. The caller supplies
//! the current time, which keeps refresh decisions deterministic in tests.

use crate::config::{OptimizerConfig, ScoringRules};
use crate::error::Result;
use crate::models::MatchRecord;
use crate::scoring::Standings;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Supplier of already-joined match records.
pub trait RecordSource {
    fn fetch(&self) -> Result<Vec<MatchRecord>>;
}

impl RecordSource for Vec<MatchRecord> {
    fn fetch(&self) -> Result<Vec<MatchRecord>> {
        Ok(self.clone())
    }
}

impl RecordSource for [MatchRecord] {
    fn fetch(&self) -> Result<Vec<MatchRecord>> {
        Ok(self.to_vec())
    }
}

#[derive(Debug, Clone)]
struct CachedStandings {
    computed_at: DateTime<Utc>,
    standings: Arc<Standings>,
}

#[derive(Debug)]
pub struct StandingsCache {
    rules: ScoringRules,
    refresh_interval: Duration,
    state: Mutex<Option<CachedStandings>>,
}

impl StandingsCache {
    pub fn new(rules: ScoringRules, refresh_interval_secs: u64) -> Self {
        Self {
            rules,
            refresh_interval: Duration::seconds(
                refresh_interval_secs.min(i64::MAX as u64 / 1_000) as i64,
            ),
            state: Mutex::new(None),
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.scoring.clone(), config.refresh_interval_secs)
    }

    /// Cached standings, recomputed from `source` when missing or stale.
    ///
    /// A failed fetch leaves the previous snapshot in place.
    pub fn get<S>(&self, now: DateTime<Utc>, source: &S) -> Result<Arc<Standings>>
    where
        S: RecordSource + ?Sized,
    {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(cached) = state.as_ref() {
            if now - cached.computed_at < self.refresh_interval {
                debug!(computed_at = %cached.computed_at, "reusing cached standings");
                return Ok(Arc::clone(&cached.standings));
            }
        }

        let records = source.fetch()?;
        let standings = Arc::new(Standings::compute(&records, &self.rules));
        info!(
            records = records.len(),
            teams = standings.team_rankings.len(),
            unmapped = standings.report.unmapped_count(),
            "recomputed standings"
        );
        *state = Some(CachedStandings {
            computed_at: now,
            standings: Arc::clone(&standings),
        });
        Ok(standings)
    }

    pub fn computed_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.computed_at)
    }

    pub fn invalidate(&self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllianceError;
    use crate::models::AllianceColor;
    use std::cell::Cell;

    struct CountingSource {
        records: Vec<MatchRecord>,
        calls: Cell<usize>,
        fail: bool,
    }

    impl RecordSource for CountingSource {
        fn fetch(&self) -> Result<Vec<MatchRecord>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(AllianceError::Source("database offline".to_string()));
            }
            Ok(self.records.clone())
        }
    }

    fn source(fail: bool) -> CountingSource {
        CountingSource {
            records: vec![MatchRecord {
                robot_id: 1,
                team: "254".to_string(),
                challenge_id: 1,
                challenge_name: "REEF".to_string(),
                phase_id: 1,
                phase_name: "NET".to_string(),
                completed_autonomous: 1,
                completed_teleop: 1,
                alliance: AllianceColor::Blue,
                location: String::new(),
            }],
            calls: Cell::new(0),
            fail,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_reuses_within_window() {
        let cache = StandingsCache::new(ScoringRules::default(), 300);
        let src = source(false);
        let first = cache.get(at(0), &src).unwrap();
        let second = cache.get(at(299), &src).unwrap();
        assert_eq!(src.calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.team_total("254"), 8.0);
    }

    #[test]
    fn test_recomputes_after_window() {
        let cache = StandingsCache::new(ScoringRules::default(), 300);
        let src = source(false);
        cache.get(at(0), &src).unwrap();
        cache.get(at(300), &src).unwrap();
        assert_eq!(src.calls.get(), 2);
        assert_eq!(cache.computed_at(), Some(at(300)));
    }

    #[test]
    fn test_invalidate_forces_refresh() {
        let cache = StandingsCache::new(ScoringRules::default(), 300);
        let src = source(false);
        cache.get(at(0), &src).unwrap();
        cache.invalidate();
        assert!(cache.computed_at().is_none());
        cache.get(at(1), &src).unwrap();
        assert_eq!(src.calls.get(), 2);
    }

    #[test]
    fn test_failed_fetch_keeps_previous_snapshot() {
        let cache = StandingsCache::new(ScoringRules::default(), 10);
        cache.get(at(0), &source(false)).unwrap();
        let err = cache.get(at(60), &source(true)).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(cache.computed_at(), Some(at(0)));
    }

    #[test]
    fn test_vec_source() {
        let cache = StandingsCache::from_config(&OptimizerConfig::default());
        let records: Vec<MatchRecord> = Vec::new();
        let standings = cache.get(at(0), &records).unwrap();
        assert!(standings.is_empty());
    }
}
