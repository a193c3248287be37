//! Error types for the stock_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for stock_core operations
///
/// The domain model never produces these; they come from the storage
/// layer and the configuration loader.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Product catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Identifier sequence could not be read or advanced
    #[error("State error: {0}")]
    State(String),

    /// Product id not present in the catalog
    #[error("Unknown product: {0}")]
    UnknownProduct(i64),

    /// Malformed stored data
    #[error("Data access error: {0}")]
    DataAccess(String),
}
