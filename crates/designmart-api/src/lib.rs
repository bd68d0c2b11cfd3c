//! Designmart API library
//!
//! HTTP surface for the design pipeline: the upload endpoint (ingestion
//! orchestrator), review-queue endpoints, owner listings, administrative
//! delete, and the protected file delivery route.

mod api_doc;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
