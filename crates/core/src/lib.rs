//! Core types and configuration for the cryptostat report.
//!
//! This crate provides shared types used across all other crates:
//! - Raw and canonical per-asset records
//! - Month trend labels and month buckets
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
