//! Products and the stock metrics derived from their movement history.
//!
//! Every metric is a fold over the in-memory history; nothing here reads
//! storage. Time-dependent metrics come in two forms: `*_at(now)` takes the
//! evaluation instant explicitly, the plain form captures `Utc::now()` once.
//!
//! The forecast is a linear run rate:
//! - consumption rate = units consumed / whole days since first restock
//! - days until stockout = current stock / consumption rate
//! - stockout date = now + whole days until stockout

use crate::{Movement, ProductId};
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::fmt;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// A product tracked in the warehouse
#[derive(Clone, Debug)]
pub struct Product {
    id: ProductId,
    name: String,
    stock_min: i64,
    stock_max: i64,
    /// Always sorted most recent first
    movements: Vec<Movement>,
}

impl Product {
    /// Create a product with an empty history
    pub fn new(id: ProductId, name: impl Into<String>, stock_min: i64, stock_max: i64) -> Self {
        Self {
            id,
            name: name.into(),
            stock_min,
            stock_max,
            movements: Vec::new(),
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Desired minimum stock level
    pub fn stock_min(&self) -> i64 {
        self.stock_min
    }

    /// Desired maximum stock level
    pub fn stock_max(&self) -> i64 {
        self.stock_max
    }

    /// Movement history, most recent first
    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Add a movement to the history, keeping it sorted most recent first.
    ///
    /// The movement is placed after any existing movement with the same
    /// date, which is where a stable re-sort of the whole history would put
    /// it. The caller guarantees the movement belongs to this product.
    pub fn add_movement(&mut self, movement: Movement) {
        let at = self
            .movements
            .partition_point(|existing| existing.recency_cmp(&movement) != Ordering::Greater);
        self.movements.insert(at, movement);
    }

    /// Sum of every movement quantity from an empty starting stock.
    ///
    /// Negative when the history holds more outflow than inflow. Saturates
    /// at the `i64` bounds.
    pub fn current_stock_quantity(&self) -> i64 {
        self.movements
            .iter()
            .fold(0i64, |total, m| total.saturating_add(m.quantity()))
    }

    /// The oldest movement with a positive quantity.
    ///
    /// The history is newest first, so the scan runs from the tail.
    pub fn first_inbound_movement(&self) -> Option<&Movement> {
        self.movements.iter().rev().find(|m| m.is_inbound())
    }

    /// Whole days elapsed since the first restock, floored.
    ///
    /// Zero when the product has never been restocked.
    pub fn days_since_first_inbound_movement_at(&self, now: DateTime<Utc>) -> i64 {
        match self.first_inbound_movement() {
            Some(first) => (now - first.date())
                .num_milliseconds()
                .div_euclid(MILLIS_PER_DAY),
            None => 0,
        }
    }

    pub fn days_since_first_inbound_movement(&self) -> i64 {
        self.days_since_first_inbound_movement_at(Utc::now())
    }

    /// Units that left the warehouse: absolute sum of negative quantities,
    /// saturating at `i64::MAX`
    pub fn total_quantity_consumed(&self) -> i64 {
        self.movements
            .iter()
            .filter(|m| m.is_outbound())
            .fold(0i64, |total, m| total.saturating_sub(m.quantity()))
    }

    /// Average units consumed per day since the first restock.
    ///
    /// Exactly `0.0` when no whole day has elapsed since the first restock
    /// or there was never one.
    pub fn daily_consumption_rate_at(&self, now: DateTime<Utc>) -> f64 {
        let days = self.days_since_first_inbound_movement_at(now);
        if days == 0 {
            return 0.0;
        }

        self.total_quantity_consumed() as f64 / days as f64
    }

    pub fn daily_consumption_rate(&self) -> f64 {
        self.daily_consumption_rate_at(Utc::now())
    }

    /// Days of stock left at the current consumption rate.
    ///
    /// Plain IEEE 754 division: infinite when the rate is zero and stock is
    /// nonzero, NaN when both are zero.
    pub fn days_until_stockout_at(&self, now: DateTime<Utc>) -> f64 {
        self.current_stock_quantity() as f64 / self.daily_consumption_rate_at(now)
    }

    pub fn days_until_stockout(&self) -> f64 {
        self.days_until_stockout_at(Utc::now())
    }

    /// Instant at which stock is projected to run out.
    ///
    /// `None` when the consumption rate is zero. Otherwise `now` plus the
    /// days until stockout truncated toward zero; negative stock gives a
    /// date in the past. `None` as well if that date is not representable.
    pub fn projected_stockout_date_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let rate = self.daily_consumption_rate_at(now);
        if rate == 0.0 {
            return None;
        }

        let days = self.current_stock_quantity() as f64 / rate;
        if !days.is_finite() {
            return None;
        }

        let offset = Duration::try_days(days.trunc() as i64)?;
        now.checked_add_signed(offset)
    }

    pub fn projected_stockout_date(&self) -> Option<DateTime<Utc>> {
        self.projected_stockout_date_at(Utc::now())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.current_stock_quantity())
    }
}
