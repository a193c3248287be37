//! Product catalog stored as CSV.
//!
//! One row per product: `id,name,stock_min,stock_max`. Products come back
//! with an empty movement history.

use crate::{Error, Product, ProductId, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in `products.csv`
#[derive(Debug, Serialize, Deserialize)]
struct ProductRow {
    id: ProductId,
    name: String,
    stock_min: i64,
    stock_max: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::new(row.id, row.name, row.stock_min, row.stock_max)
    }
}

/// Load every product in the catalog, in file order
///
/// A missing file is an empty catalog. Malformed rows are skipped.
pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    if !path.exists() {
        tracing::debug!("No catalog found at {:?}", path);
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut products = Vec::new();
    for result in reader.deserialize::<ProductRow>() {
        match result {
            Ok(row) => products.push(Product::from(row)),
            Err(e) => tracing::warn!("Failed to deserialize catalog row: {}", e),
        }
    }

    tracing::debug!("Loaded {} products from {:?}", products.len(), path);
    Ok(products)
}

/// Append a product to the catalog, creating the file if needed
pub fn append_product(
    path: &Path,
    id: ProductId,
    name: &str,
    stock_min: i64,
    stock_max: i64,
) -> Result<()> {
    if load_products(path)?.iter().any(|p| p.id() == id) {
        return Err(Error::CatalogValidation(format!(
            "Product id {} already exists",
            id
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);
    writer.serialize(ProductRow {
        id,
        name: name.to_string(),
        stock_min,
        stock_max,
    })?;
    writer.flush()?;

    tracing::info!("Added product {} ({}) to catalog", id, name);
    Ok(())
}

/// Case-insensitive prefix match on a product name
///
/// An empty prefix matches every product.
pub fn name_matches_prefix(name: &str, prefix: &str) -> bool {
    name.to_uppercase().starts_with(&prefix.to_uppercase())
}

/// Validate the catalog and return any errors found
pub fn validate(products: &[Product]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_ids = HashSet::new();

    for product in products {
        if !seen_ids.insert(product.id()) {
            errors.push(format!("Duplicate product id {}", product.id()));
        }
        if product.name().trim().is_empty() {
            errors.push(format!("Product {} has empty name", product.id()));
        }
        if product.stock_min() < 0 || product.stock_max() < 0 {
            errors.push(format!(
                "Product '{}' has a negative stock limit",
                product.name()
            ));
        }
        if product.stock_min() > product.stock_max() {
            errors.push(format!(
                "Product '{}' has stock_min {} above stock_max {}",
                product.name(),
                product.stock_min(),
                product.stock_max()
            ));
        }
    }

    errors
}
