pub mod cache;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;

// Layered boundaries for the artifact read side
pub mod app;
pub mod infra;

pub use error::{InsightError, Result};
