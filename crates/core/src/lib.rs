//! Core types and configuration for the listing digest.
//!
//! This crate provides shared types used across all other crates:
//! - Listing types (raw snippets, parsed listings, per-size summaries)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{AggregationConfig, Config, FilterConfig, SignalConfig, StoredFilter};
pub use error::{Error, Result};
pub use types::*;
