//! Offline partition of a static roster file into category bundles.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::classification::{partition, Partition, RuleTable};
use crate::log_info;
use crate::models::{CategoryIndex, Record, RosterPayload};
use crate::roster::source::INDEX_FILE;

const ENABLE_LOGS: bool = true;

/// What a partition run wrote.
#[derive(Debug, Clone)]
pub struct PartitionReport {
    pub index: CategoryIndex,
    pub files: Vec<PathBuf>,
    pub skipped_entries: usize,
}

/// Read a roster file in either payload shape.
pub fn read_roster(path: &Path) -> Result<(Vec<Record>, usize)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    let payload: RosterPayload = serde_json::from_str(&contents)
        .with_context(|| format!("roster {} is neither a bundle nor an array", path.display()))?;
    Ok(payload.into_records())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized).with_context(|| format!("failed to write {}", path.display()))
}

/// Write one `{label}.json` bundle per category plus `index.json`.
pub fn write_partition(
    output_dir: &Path,
    partition: &Partition,
    generated_at: &str,
) -> Result<(CategoryIndex, Vec<PathBuf>)> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut files = Vec::with_capacity(partition.buckets().len() + 1);
    for bucket in partition.buckets() {
        let path = output_dir.join(format!("{}.json", bucket.label));
        write_json(&path, &bucket.to_bundle(generated_at))?;
        log_info!("{}: {} records -> {}", bucket.label, bucket.len(), path.display());
        files.push(path);
    }

    let index = partition.index(generated_at);
    let index_path = output_dir.join(INDEX_FILE);
    write_json(&index_path, &index)?;
    files.push(index_path);

    Ok((index, files))
}

/// Classify `input` with `table` and write the bundles to `output_dir`.
pub fn run_partition(input: &Path, output_dir: &Path, table: &RuleTable) -> Result<PartitionReport> {
    let (records, skipped_entries) = read_roster(input)?;
    log_info!("read {} records from {}", records.len(), input.display());

    let partition = partition(&records, table).context("rule table is misconfigured")?;
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let (index, files) = write_partition(output_dir, &partition, &generated_at)?;

    log_info!(
        "categorized {} of {} records into {} categories",
        partition.buckets().iter().map(|bucket| bucket.len()).sum::<usize>(),
        partition.total(),
        partition.buckets().len()
    );

    Ok(PartitionReport {
        index,
        files,
        skipped_entries,
    })
}
