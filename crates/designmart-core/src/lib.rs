//! Designmart core library
//!
//! Domain models, error taxonomy, configuration, and pure validation logic
//! for the design-asset ingestion, review, and delivery pipeline. This crate
//! performs no I/O; storage, persistence, and HTTP live in the sibling crates.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
