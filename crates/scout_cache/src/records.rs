//! Scouting CSV → typed `MatchRecord`s
//!
//! One row per robot, challenge and phase. Expected headers:
//! `robot_id,team,challenge_id,challenge_name,phase_id,phase_name,`
//! `completed_autonomous,completed_teleop,location,alliance`
//! (`location` and `alliance` may be absent).
//!
//! Rows that fail to parse or validate are counted in `ParseStats` and
//! skipped with a warning; they never abort the load.

use alliance_core::{AllianceColor, AllianceError, MatchRecord, RecordSource};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Columns every scouting export must carry
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "robot_id",
    "team",
    "challenge_id",
    "challenge_name",
    "phase_id",
    "phase_name",
    "completed_autonomous",
    "completed_teleop",
];

/// CSV parsing statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub total_rows: usize,
    pub parsed: usize,
    pub failed: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    robot_id: u32,
    team: String,
    challenge_id: u32,
    challenge_name: String,
    phase_id: u32,
    phase_name: String,
    completed_autonomous: u32,
    completed_teleop: u32,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    alliance: Option<String>,
}

impl CsvRow {
    fn into_record(self) -> std::result::Result<MatchRecord, &'static str> {
        if self.team.is_empty() {
            return Err("empty team");
        }
        if self.challenge_name.is_empty() {
            return Err("empty challenge_name");
        }
        if self.phase_name.is_empty() {
            return Err("empty phase_name");
        }

        let alliance = self
            .alliance
            .as_deref()
            .map(|a| a.parse::<AllianceColor>().unwrap_or_default())
            .unwrap_or_default();

        Ok(MatchRecord {
            robot_id: self.robot_id,
            team: self.team,
            challenge_id: self.challenge_id,
            challenge_name: self.challenge_name,
            phase_id: self.phase_id,
            phase_name: self.phase_name,
            completed_autonomous: self.completed_autonomous,
            completed_teleop: self.completed_teleop,
            alliance,
            location: self.location.unwrap_or_default(),
        })
    }
}

/// Parse scouting CSV from any reader.
///
/// Fails only when the header row is missing a required column; bad data
/// rows are skipped and counted.
pub fn parse_records<R: Read>(reader: R) -> Result<(Vec<MatchRecord>, ParseStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.trim_start_matches('\u{feff}') == *col))
        .collect();
    if !missing.is_empty() {
        bail!("CSV header is missing required columns: {}", missing.join(", "));
    }

    let mut stats = ParseStats::default();
    let mut records = Vec::new();

    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        stats.total_rows += 1;
        // header is line 1
        let line = idx + 2;

        match row {
            Ok(row) => match row.into_record() {
                Ok(record) => {
                    records.push(record);
                    stats.parsed += 1;
                }
                Err(reason) => {
                    stats.failed += 1;
                    warn!(line, reason, "skipping invalid scouting row");
                }
            },
            Err(e) => {
                stats.failed += 1;
                warn!(line, error = %e, "skipping malformed scouting row");
            }
        }
    }

    debug!(
        total = stats.total_rows,
        parsed = stats.parsed,
        failed = stats.failed,
        "parsed scouting CSV"
    );
    Ok((records, stats))
}

/// Parse a scouting CSV file.
pub fn parse_csv_file(path: &Path) -> Result<(Vec<MatchRecord>, ParseStats)> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    parse_records(file).with_context(|| format!("Failed to parse CSV file: {}", path.display()))
}

/// `RecordSource` reading a CSV export on every fetch.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvRecordSource {
    fn fetch(&self) -> alliance_core::Result<Vec<MatchRecord>> {
        parse_csv_file(&self.path)
            .map(|(records, _)| records)
            .map_err(|e| AllianceError::Source(format!("{e:#}")))
    }
}
