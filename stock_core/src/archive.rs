//! Journal rollup into the CSV movement archive.
//!
//! This module implements atomic journal-to-CSV conversion with proper
//! error handling to prevent data loss.

use crate::{Movement, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the movement archive
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub(crate) struct ArchiveRow {
    pub id: i64,
    pub product_id: i64,
    pub date: String,
    pub quantity: i64,
}

impl From<&Movement> for ArchiveRow {
    fn from(movement: &Movement) -> Self {
        ArchiveRow {
            id: movement.id(),
            product_id: movement.product_id(),
            date: movement.date().to_rfc3339(),
            quantity: movement.quantity(),
        }
    }
}

impl TryFrom<ArchiveRow> for Movement {
    type Error = crate::Error;

    fn try_from(row: ArchiveRow) -> Result<Self> {
        let date = DateTime::parse_from_rfc3339(&row.date)
            .map_err(|e| crate::Error::DataAccess(format!("Invalid date '{}': {}", row.date, e)))?
            .with_timezone(&Utc);

        Ok(Movement::new(row.id, row.product_id, date, row.quantity))
    }
}

/// Roll up journal movements into the CSV archive and retire the journal
///
/// This function, holding the journal writer lock throughout:
/// 1. Reads all movements from the journal
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the journal to `.wal.processed`
/// 5. Returns the number of movements archived
///
/// The journal is renamed rather than deleted so it can be recovered by
/// hand if needed.
pub fn journal_to_csv_and_archive(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let lock = crate::journal::lock_journal(journal_path)?;
    let count = roll_up_locked(journal_path, csv_path)?;
    lock.unlock()?;
    Ok(count)
}

fn roll_up_locked(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let movements = crate::journal::read_movements(journal_path)?;

    if movements.is_empty() {
        tracing::info!("No movements in journal to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only for a fresh archive
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for movement in &movements {
        writer.serialize(ArchiveRow::from(movement))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} movements to CSV archive", movements.len());

    let processed_path = journal_path.with_extension("wal.processed");
    std::fs::rename(journal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(movements.len())
}

/// Read every movement in the CSV archive
///
/// Rows that fail to parse are skipped.
pub fn read_archive(path: &Path) -> Result<Vec<Movement>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut movements = Vec::new();
    for result in reader.deserialize::<ArchiveRow>() {
        match result {
            Ok(row) => match Movement::try_from(row) {
                Ok(movement) => movements.push(movement),
                Err(e) => tracing::warn!("Failed to parse archive row: {}", e),
            },
            Err(e) => tracing::warn!("Failed to deserialize archive row: {}", e),
        }
    }

    tracing::debug!("Read {} movements from archive", movements.len());
    Ok(movements)
}

/// Clean up retired journal files
///
/// This removes all `.processed` files in the given directory.
pub fn cleanup_processed_journals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}
