//! Error types for the cryptostat report.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the cryptostat report.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file does not match the expected schema or holds unparseable numbers.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A date string matched none of the accepted formats.
    #[error("Date parse error: {0}")]
    DateParse(String),

    /// Too few observations for the requested statistic.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Contingency table with a zero marginal total.
    #[error("Degenerate table: {0}")]
    DegenerateTable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a malformed input error.
    pub fn malformed_input(msg: impl Into<String>) -> Self {
        Error::MalformedInput(msg.into())
    }

    /// Create a date parse error.
    pub fn date_parse(msg: impl Into<String>) -> Self {
        Error::DateParse(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create a degenerate table error.
    pub fn degenerate_table(msg: impl Into<String>) -> Self {
        Error::DegenerateTable(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error aborts the whole session.
    ///
    /// Statistical precondition failures only affect the result they belong to.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::InsufficientData(_) | Error::DegenerateTable(_))
    }
}
