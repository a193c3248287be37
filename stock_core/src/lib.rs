#![forbid(unsafe_code)]

//! Core domain model and storage for the Stockcast warehouse forecaster.
//!
//! This crate provides:
//! - Domain types (movements, products) and stock metrics
//! - Stockout forecasting
//! - Persistence (catalog CSV, movement journal, archive, id sequence)
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod product;
pub mod config;
pub mod logging;
pub mod catalog;
pub mod journal;
pub mod archive;
pub mod sequence;
pub mod history;
pub mod repository;
pub mod forecast;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use product::Product;
pub use config::{Config, UnprojectedPlacement};
pub use journal::{JsonlSink, MovementSink};
pub use repository::{FileRepository, StockRepository};
pub use forecast::{build_forecast, ForecastRow};
