//! Movement identifier allocation with file locking.
//!
//! The next identifier is kept in a small JSON file that is replaced
//! atomically on every allocation. A corrupt file is an error rather than a
//! reset: an identifier must never be issued twice.

use crate::{Error, MovementId, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Persisted identifier sequence
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovementSequence {
    pub next_movement_id: MovementId,
}

impl MovementSequence {
    /// Load the sequence, or `None` if the file does not exist yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        serde_json::from_str::<MovementSequence>(&contents)
            .map(Some)
            .map_err(|e| Error::State(format!("Corrupt sequence file {:?}: {}", path, e)))
    }

    /// Save the sequence with an exclusive lock
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "sequence path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved movement sequence to {:?}", path);
        Ok(())
    }

    /// Take the next identifier and persist the advanced sequence.
    ///
    /// When no sequence file exists the sequence starts after `highest_known`,
    /// the largest identifier already in storage. Load, advance and save run
    /// under an exclusive lock on a sibling `.lock` file, so concurrent
    /// processes never receive the same identifier.
    pub fn allocate(path: &Path, highest_known: Option<MovementId>) -> Result<MovementId> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path.with_extension("lock"))?;
        lock.lock_exclusive()?;

        let allocated = Self::advance(path, highest_known);
        lock.unlock()?;
        allocated
    }

    fn advance(path: &Path, highest_known: Option<MovementId>) -> Result<MovementId> {
        let mut sequence = match Self::load(path)? {
            Some(sequence) => sequence,
            None => {
                let start = highest_known.unwrap_or(0).checked_add(1).ok_or_else(|| {
                    Error::State("Movement identifiers exhausted".into())
                })?;
                tracing::info!("Starting movement sequence at {}", start);
                Self {
                    next_movement_id: start,
                }
            }
        };

        let id = sequence.next_movement_id;
        sequence.next_movement_id = id
            .checked_add(1)
            .ok_or_else(|| Error::State("Movement identifiers exhausted".into()))?;
        sequence.save(path)?;

        Ok(id)
    }
}
