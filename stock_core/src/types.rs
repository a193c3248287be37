//! Core domain types for stock tracking.
//!
//! A [`Movement`] is one signed change to a product's stock. Positive
//! quantities are inbound (restock), negative quantities are outbound
//! (consumption). Movements are immutable once built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of a product in the catalog
pub type ProductId = i64;

/// Identifier of a movement, issued by the storage layer
pub type MovementId = i64;

/// A single recorded stock change
///
/// `product_id` refers back to the owning [`crate::Product`] without owning it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    id: MovementId,
    product_id: ProductId,
    date: DateTime<Utc>,
    quantity: i64,
}

impl Movement {
    /// Build a movement. No validation is performed.
    pub fn new(id: MovementId, product_id: ProductId, date: DateTime<Utc>, quantity: i64) -> Self {
        Self {
            id,
            product_id,
            date,
            quantity,
        }
    }

    pub fn id(&self) -> MovementId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Restock
    pub fn is_inbound(&self) -> bool {
        self.quantity > 0
    }

    /// Consumption or sale
    pub fn is_outbound(&self) -> bool {
        self.quantity < 0
    }

    /// Ordering used for every movement history: most recent date first.
    ///
    /// Movements sharing a date compare as `Equal` whatever their other
    /// fields are.
    pub fn recency_cmp(&self, other: &Self) -> Ordering {
        other.date.cmp(&self.date)
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {:+}",
            self.id,
            self.date.format("%Y-%m-%d %H:%M:%S"),
            self.quantity
        )
    }
}
