//! Data access for products and their movements.
//!
//! [`StockRepository`] is the seam between storage and the domain model.
//! [`FileRepository`] is the on-disk implementation:
//!
//! ```text
//! <data_dir>/
//!   products.csv          catalog
//!   movements.csv         archived movements
//!   wal/movements.wal     journal of recent movements
//!   wal/sequence.json     next movement id
//! ```

use crate::journal::{JsonlSink, MovementSink};
use crate::sequence::MovementSequence;
use crate::{Error, Movement, Product, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Storage operations the forecasting code depends on
pub trait StockRepository {
    /// Every product in the catalog, each with an empty history
    fn list_products(&self) -> Result<Vec<Product>>;

    /// Products whose name starts with `prefix`, ignoring case
    fn list_products_by_prefix(&self, prefix: &str) -> Result<Vec<Product>>;

    /// Append the product's stored movements to its history.
    ///
    /// The history is not cleared first: calling this twice duplicates
    /// every movement.
    fn load_movements_into(&self, product: &mut Product) -> Result<()>;

    /// Persist a new movement dated now, then add it to the product.
    ///
    /// Returns `Ok(false)` and leaves the product untouched when the
    /// movement could not be persisted or no identifier could be obtained.
    fn record_movement(&mut self, product: &mut Product, quantity: i64) -> Result<bool>;
}

/// File-backed repository rooted at a data directory
#[derive(Clone, Debug)]
pub struct FileRepository {
    data_dir: PathBuf,
}

impl FileRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("products.csv")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join("movements.csv")
    }

    pub fn journal_dir(&self) -> PathBuf {
        self.data_dir.join("wal")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.journal_dir().join("movements.wal")
    }

    pub fn sequence_path(&self) -> PathBuf {
        self.journal_dir().join("sequence.json")
    }

    /// Look up a single product by id
    pub fn find_product(&self, id: i64) -> Result<Product> {
        self.list_products()?
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or(Error::UnknownProduct(id))
    }

    fn next_movement_id(&self) -> Result<i64> {
        let sequence_path = self.sequence_path();
        let highest_known = if sequence_path.exists() {
            None
        } else {
            crate::history::highest_movement_id(&self.journal_path(), &self.archive_path())?
        };
        MovementSequence::allocate(&sequence_path, highest_known)
    }
}

impl StockRepository for FileRepository {
    fn list_products(&self) -> Result<Vec<Product>> {
        crate::catalog::load_products(&self.catalog_path())
    }

    fn list_products_by_prefix(&self, prefix: &str) -> Result<Vec<Product>> {
        let products: Vec<Product> = self
            .list_products()?
            .into_iter()
            .filter(|p| crate::catalog::name_matches_prefix(p.name(), prefix))
            .collect();

        tracing::debug!("{} products match prefix {:?}", products.len(), prefix);
        Ok(products)
    }

    fn load_movements_into(&self, product: &mut Product) -> Result<()> {
        let movements = crate::history::load_product_movements(
            &self.journal_path(),
            &self.archive_path(),
            product.id(),
        )?;

        for movement in movements {
            product.add_movement(movement);
        }
        Ok(())
    }

    fn record_movement(&mut self, product: &mut Product, quantity: i64) -> Result<bool> {
        // Captured once so the stored and in-memory dates agree
        let now = Utc::now();

        if !self.list_products()?.iter().any(|p| p.id() == product.id()) {
            return Err(Error::UnknownProduct(product.id()));
        }

        let id = match self.next_movement_id() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(
                    "No identifier for new movement of product {}: {}",
                    product.id(),
                    e
                );
                return Ok(false);
            }
        };

        let movement = Movement::new(id, product.id(), now, quantity);
        let mut sink = JsonlSink::new(self.journal_path());
        if let Err(e) = sink.append(&movement) {
            tracing::warn!("Failed to persist movement {}: {}", id, e);
            return Ok(false);
        }

        product.add_movement(movement);
        tracing::info!(
            "Recorded movement {} ({:+}) for product {}",
            id,
            quantity,
            product.id()
        );
        Ok(true)
    }
}
