//! Per-record point computation.
//!
//! Each record's phase name is resolved to a canonical key, then multiplied
//! out against the points table. Unknown keys score zero and are tallied.

use crate::config::ScoringRules;
use crate::models::{MatchRecord, ScoredRecord};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Scored records plus the phase keys the points table did not know.
#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    pub records: Vec<ScoredRecord>,
    /// Canonical key -> number of records that fell back to zero points
    pub unmapped_phases: BTreeMap<String, usize>,
}

impl AggregateReport {
    pub fn unmapped_count(&self) -> usize {
        self.unmapped_phases.values().sum()
    }
}

pub fn score_record(record: &MatchRecord, rules: &ScoringRules) -> ScoredRecord {
    let phase_key = rules.canonical_key(&record.phase_name).to_string();
    let (auto_points, teleop_points, mapped) = match rules.multipliers(&phase_key) {
        Some(m) => (
            record.completed_autonomous as f64 * m.auto,
            record.completed_teleop as f64 * m.teleop,
            true,
        ),
        None => (0.0, 0.0, false),
    };

    ScoredRecord {
        record: record.clone(),
        phase_key,
        auto_points,
        teleop_points,
        total_points: auto_points + teleop_points,
        mapped,
    }
}

pub fn aggregate(records: &[MatchRecord], rules: &ScoringRules) -> AggregateReport {
    let mut report = AggregateReport {
        records: Vec::with_capacity(records.len()),
        unmapped_phases: BTreeMap::new(),
    };

    for record in records {
        let scored = score_record(record, rules);
        if !scored.mapped {
            let count = report
                .unmapped_phases
                .entry(scored.phase_key.clone())
                .or_insert(0);
            if *count == 0 {
                warn!(
                    phase = %scored.phase_key,
                    challenge = %record.challenge_name,
                    "phase has no points table entry, scoring as zero"
                );
            }
            *count += 1;
        }
        report.records.push(scored);
    }

    debug!(
        records = report.records.len(),
        unmapped = report.unmapped_count(),
        "aggregated match records"
    );
    report
}
