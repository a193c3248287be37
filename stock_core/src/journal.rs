//! Movement journal: the write path for new movements.
//!
//! Movements are appended to a JSONL (JSON Lines) file. Writers and the
//! rollup serialize on an exclusive lock over a sibling `.lock` file, so an
//! append never lands in a journal that is being retired.

use crate::{Movement, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Movement sink trait for persisting movements
pub trait MovementSink {
    fn append(&mut self, movement: &Movement) -> Result<()>;
}

/// JSONL-based movement sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Take the exclusive writer lock for the journal at `journal_path`.
///
/// The lock lives on `<journal>.lock` rather than on the journal itself,
/// because the journal is renamed away during rollup. It is released when
/// the returned file is unlocked or dropped.
pub(crate) fn lock_journal(journal_path: &Path) -> Result<File> {
    if let Some(parent) = journal_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(journal_path.with_extension("lock"))?;
    lock.lock_exclusive()?;
    Ok(lock)
}

impl MovementSink for JsonlSink {
    fn append(&mut self, movement: &Movement) -> Result<()> {
        let lock = lock_journal(&self.path)?;

        // Opened under the lock: the path may have been rolled up meanwhile
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // One line per movement, written in a single call
        let mut line = serde_json::to_string(movement)?;
        line.push('\n');
        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
        drop(writer);

        file.sync_data()?;
        lock.unlock()?;

        tracing::debug!(
            "Appended movement {} for product {} to journal",
            movement.id(),
            movement.product_id()
        );
        Ok(())
    }
}

/// Read all movements from a journal file
///
/// Lines that fail to parse (corrupt or partially written) are skipped.
pub fn read_movements(path: &Path) -> Result<Vec<Movement>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut movements = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Movement>(&line) {
            Ok(movement) => movements.push(movement),
            Err(e) => {
                tracing::warn!("Failed to parse movement at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} movements from journal", movements.len());
    Ok(movements)
}
