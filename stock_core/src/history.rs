//! Movement history loading.
//!
//! Stored movements live in two places: the journal (recent, not yet rolled
//! up) and the CSV archive. Both are read and merged here.

use crate::{Movement, MovementId, ProductId, Result};
use std::collections::HashSet;
use std::path::Path;

/// Load every stored movement from both the journal and the archive
///
/// A movement present in both (journal re-read after a partial rollup)
/// is returned once.
pub fn load_all_movements(journal_path: &Path, csv_path: &Path) -> Result<Vec<Movement>> {
    let mut movements = Vec::new();
    let mut seen_ids = HashSet::new();

    for movement in crate::journal::read_movements(journal_path)? {
        if seen_ids.insert(movement.id()) {
            movements.push(movement);
        }
    }
    let from_journal = movements.len();

    for movement in crate::archive::read_archive(csv_path)? {
        if seen_ids.insert(movement.id()) {
            movements.push(movement);
        }
    }

    tracing::debug!(
        "Loaded {} movements ({} from journal, {} from archive)",
        movements.len(),
        from_journal,
        movements.len() - from_journal
    );

    Ok(movements)
}

/// Load the stored movements belonging to one product
pub fn load_product_movements(
    journal_path: &Path,
    csv_path: &Path,
    product_id: ProductId,
) -> Result<Vec<Movement>> {
    let movements: Vec<Movement> = load_all_movements(journal_path, csv_path)?
        .into_iter()
        .filter(|m| m.product_id() == product_id)
        .collect();

    tracing::debug!(
        "Loaded {} movements for product {}",
        movements.len(),
        product_id
    );
    Ok(movements)
}

/// Highest movement identifier in storage, if any
pub fn highest_movement_id(journal_path: &Path, csv_path: &Path) -> Result<Option<MovementId>> {
    Ok(load_all_movements(journal_path, csv_path)?
        .iter()
        .map(Movement::id)
        .max())
}
