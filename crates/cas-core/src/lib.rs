//! Core types and utilities for cas-billing
//!
//! # Modules
//!
//! - `config`: Environment loading and the report configuration
//! - `error`: Error types and Result alias
//! - `types`: Report data model shared by the pipeline and the web layer

pub mod config;
pub mod error;
pub mod types;

// Re-exports
pub use config::ReportConfig;
pub use error::{Error, Result};
pub use types::*;
