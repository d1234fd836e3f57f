//! Scout Cache Library
//!
//! Scouting CSV → typed records → MessagePack+LZ4 snapshot (SHA256 checksum),
//! and the record sources the alliance optimizer reads from.

pub mod records;
pub mod report;
pub mod snapshot;

use alliance_core::{MatchRecord, OptimizerConfig, RecordSource, Standings, StandingsCache};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

pub use records::{parse_csv_file, parse_records, CsvRecordSource, ParseStats};
pub use snapshot::{
    build_snapshot, load_snapshot, verify_snapshot, write_snapshot, RecordSnapshot,
    SnapshotMetadata, SnapshotRecordSource,
};

/// Record input chosen by file extension: `.csv` is read as a scouting
/// export, anything else as a snapshot.
#[derive(Debug, Clone)]
pub enum InputSource {
    Csv(CsvRecordSource),
    Snapshot(SnapshotRecordSource),
}

impl InputSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if is_csv(&path) {
            InputSource::Csv(CsvRecordSource::new(path))
        } else {
            InputSource::Snapshot(SnapshotRecordSource::new(path))
        }
    }
}

impl RecordSource for InputSource {
    fn fetch(&self) -> alliance_core::Result<Vec<MatchRecord>> {
        match self {
            InputSource::Csv(source) => source.fetch(),
            InputSource::Snapshot(source) => source.fetch(),
        }
    }
}

/// Standings for a CSV or snapshot input under `config`'s scoring rules.
///
/// Records whose phase has no points entry are reported once here.
pub fn load_standings(input: &Path, config: &OptimizerConfig) -> Result<Arc<Standings>> {
    let cache = StandingsCache::from_config(config);
    let standings = cache
        .get(chrono::Utc::now(), &InputSource::from_path(input))
        .with_context(|| format!("Failed to load records: {}", input.display()))?;

    let unmapped = standings.report.unmapped_count();
    if unmapped > 0 {
        warn!(unmapped, "records with phases that have no points entry");
    }
    Ok(standings)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
