//! Record Snapshot - scouting CSV → binary snapshot pipeline
//!
//! CSV → Vec<MatchRecord> → MessagePack → LZ4 → file, with a SHA-256
//! checksum over the compressed bytes. A snapshot freezes one scouting
//! dataset so later runs rank against exactly the same records.

use crate::records::parse_csv_file;
use alliance_core::{AllianceError, MatchRecord, RecordSource};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Frozen scouting dataset as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordSnapshot {
    pub schema_version: String,
    /// RFC3339 creation time
    pub created_at: String,
    pub records: Vec<MatchRecord>,
}

impl RecordSnapshot {
    pub fn new(schema_version: &str, records: Vec<MatchRecord>) -> Self {
        Self {
            schema_version: schema_version.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Snapshot metadata, written next to the snapshot on request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub schema_version: String,
    /// SHA256 of the compressed file (hex)
    pub checksum: String,
    pub created_at: String,
    pub record_count: usize,
    /// CSV rows skipped during ingestion
    pub skipped_rows: usize,
    /// MessagePack size (bytes)
    pub original_size: u64,
    /// LZ4 size (bytes)
    pub compressed_size: u64,
    /// compressed / original
    pub compression_ratio: f64,
}

/// Serialize, compress and write a snapshot.
pub fn write_snapshot(snapshot: &RecordSnapshot, out: &Path) -> Result<SnapshotMetadata> {
    let msgpack_bytes =
        rmp_serde::to_vec(snapshot).context("Failed to serialize snapshot to MessagePack")?;
    let original_size = msgpack_bytes.len() as u64;

    let compressed = lz4_flex::compress_prepend_size(&msgpack_bytes);
    let compressed_size = compressed.len() as u64;
    let checksum = sha256_hex(&compressed);

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(out, &compressed)
        .with_context(|| format!("Failed to write snapshot: {}", out.display()))?;

    let compression_ratio = if original_size == 0 {
        1.0
    } else {
        compressed_size as f64 / original_size as f64
    };

    info!(
        path = %out.display(),
        records = snapshot.len(),
        original = %human_bytes(original_size),
        compressed = %human_bytes(compressed_size),
        "snapshot written"
    );

    Ok(SnapshotMetadata {
        schema_version: snapshot.schema_version.clone(),
        checksum,
        created_at: snapshot.created_at.clone(),
        record_count: snapshot.len(),
        skipped_rows: 0,
        original_size,
        compressed_size,
        compression_ratio,
    })
}

/// Build a snapshot from a scouting CSV.
pub fn build_snapshot(csv_path: &Path, out: &Path, schema_version: &str) -> Result<SnapshotMetadata> {
    let (records, stats) = parse_csv_file(csv_path)?;
    if records.is_empty() {
        bail!(
            "No valid records in {} ({} rows, {} skipped)",
            csv_path.display(),
            stats.total_rows,
            stats.failed
        );
    }

    let snapshot = RecordSnapshot::new(schema_version, records);
    let mut meta = write_snapshot(&snapshot, out)?;
    meta.skipped_rows = stats.failed;
    Ok(meta)
}

/// Load a snapshot: file → LZ4 decompress → MessagePack decode.
pub fn load_snapshot(path: &Path) -> Result<RecordSnapshot> {
    let compressed =
        fs::read(path).with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

    let msgpack_bytes =
        lz4_flex::decompress_size_prepended(&compressed).context("Failed to decompress LZ4")?;

    let snapshot: RecordSnapshot = rmp_serde::from_slice(&msgpack_bytes)
        .context("Failed to deserialize snapshot from MessagePack")?;

    debug!(
        path = %path.display(),
        schema = %snapshot.schema_version,
        records = snapshot.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Whether the file on disk still matches `expected_checksum`.
pub fn verify_snapshot(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
    Ok(sha256_hex(&bytes).eq_ignore_ascii_case(expected_checksum.trim()))
}

/// `RecordSource` backed by a snapshot file.
#[derive(Debug, Clone)]
pub struct SnapshotRecordSource {
    path: PathBuf,
}

impl SnapshotRecordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for SnapshotRecordSource {
    fn fetch(&self) -> alliance_core::Result<Vec<MatchRecord>> {
        load_snapshot(&self.path)
            .map(|snapshot| snapshot.records)
            .map_err(|e| AllianceError::Source(format!("{e:#}")))
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Human-readable byte size formatting
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}
