//! Stockout forecast report.
//!
//! Loads every product with its full history, evaluates the metrics against
//! a single instant and orders the rows by projected stockout date, latest
//! first.

use crate::config::UnprojectedPlacement;
use crate::repository::StockRepository;
use crate::{Product, ProductId, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt::Write;

/// One product's line in the forecast
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastRow {
    pub product_id: ProductId,
    pub name: String,
    pub stock: i64,
    pub daily_rate: f64,
    pub days_until_stockout: f64,
    pub stockout: Option<DateTime<Utc>>,
}

impl ForecastRow {
    /// Snapshot a product's metrics at `now`
    pub fn from_product(product: &Product, now: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id(),
            name: product.name().to_string(),
            stock: product.current_stock_quantity(),
            daily_rate: product.daily_consumption_rate_at(now),
            days_until_stockout: product.days_until_stockout_at(now),
            stockout: product.projected_stockout_date_at(now),
        }
    }

    pub fn rate_display(&self, decimals: usize) -> String {
        format!("{:.*}", decimals, self.daily_rate)
    }

    /// Stockout date rendered with `date_format`, blank when there is none
    pub fn stockout_display(&self, date_format: &str) -> String {
        let Some(date) = self.stockout else {
            return String::new();
        };

        let mut out = String::new();
        if write!(out, "{}", date.format(date_format)).is_err() {
            tracing::warn!("Unusable date format {:?}, using RFC 3339", date_format);
            return date.to_rfc3339();
        }
        out
    }
}

/// Order rows by stockout date, latest first
///
/// Rows without a projection go first or last according to `placement`;
/// the sort is stable, so ties keep catalog order.
pub fn sort_rows(rows: &mut [ForecastRow], placement: UnprojectedPlacement) {
    rows.sort_by(|a, b| match (a.stockout, b.stockout) {
        (Some(a), Some(b)) => b.cmp(&a),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => match placement {
            UnprojectedPlacement::First => Ordering::Less,
            UnprojectedPlacement::Last => Ordering::Greater,
        },
        (Some(_), None) => match placement {
            UnprojectedPlacement::First => Ordering::Greater,
            UnprojectedPlacement::Last => Ordering::Less,
        },
    });
}

/// Build the full forecast from storage
///
/// Any storage error aborts the whole report.
pub fn build_forecast<R: StockRepository + ?Sized>(
    repo: &R,
    now: DateTime<Utc>,
    placement: UnprojectedPlacement,
) -> Result<Vec<ForecastRow>> {
    let mut products = repo.list_products()?;
    for product in products.iter_mut() {
        repo.load_movements_into(product)?;
    }

    let mut rows: Vec<ForecastRow> = products
        .iter()
        .map(|product| ForecastRow::from_product(product, now))
        .collect();
    sort_rows(&mut rows, placement);

    tracing::info!(
        "Forecast built for {} products ({} with a projected stockout)",
        rows.len(),
        rows.iter().filter(|r| r.stockout.is_some()).count()
    );
    Ok(rows)
}
