//! Data ingestion and normalization for the cryptostat report.
//!
//! This crate handles:
//! - Schema-validated loading of semicolon-delimited asset files
//! - Mixed-format date parsing
//! - Localized month names with explicit fallback
//! - Normalization into canonical records with month trend labels

pub mod dates;
pub mod loader;
pub mod locale;
pub mod normalizer;

pub use dates::DateParser;
pub use loader::{load_raw_records, read_raw_records, Schema};
pub use locale::MonthNames;
pub use normalizer::{month_trends, Normalizer};
