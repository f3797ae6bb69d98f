/// PrefSql Error Module
///
/// This module defines the error types surfaced by the connection wrapper.
/// Connection and statement failures are classified so callers can decide
/// whether to abort, report, or carry on.
use crate::core::db::DriverError;
use crate::report::ErrorReport;
use thiserror::Error;

/// Message carried by an upstream error, when a statement failed but the
/// driver holds no error state of its own.
pub const UPSTREAM_MESSAGE: &str =
    "Error might not be (only) in the query, probably it is upstream.";

/// Comprehensive error type for PrefSql.
///
/// The first three variants are the failures the wrapper itself classifies:
/// - connection establishment failures
/// - statement failures with a driver error code and message
/// - statement failures with no driver error state (lost connection, etc.)
///
/// The remaining variants cover the ambient plumbing around them.
#[derive(Error, Debug)]
pub enum PrefSqlError {
    /// The driver reported a failure while opening the connection
    #[error("Connection error: {0}")]
    Connection(DriverError),

    /// The statement failed and the driver reported why
    #[error("Query error: (#{code}) {message}")]
    Query {
        code: i32,
        message: String,
        sql: String,
    },

    /// The statement failed without any driver error state
    #[error("Upstream error: {}", UPSTREAM_MESSAGE)]
    Upstream { sql: String },

    /// Raw SQLite errors outside statement execution
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Classification of a surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ConnectionError,
    QueryError,
    UpstreamError,
    Other,
}

impl PrefSqlError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PrefSqlError::Connection(_) => ErrorKind::ConnectionError,
            PrefSqlError::Query { .. } => ErrorKind::QueryError,
            PrefSqlError::Upstream { .. } => ErrorKind::UpstreamError,
            _ => ErrorKind::Other,
        }
    }

    /// Builds the human-readable report for this error.
    pub fn report(&self) -> ErrorReport {
        match self {
            PrefSqlError::Connection(err) => {
                ErrorReport::new("Error while connecting", err.message.clone())
            }
            PrefSqlError::Query { code, message, sql } => ErrorReport::new(
                "Error while querying",
                format!("(#{}) {} [{}]", code, message, sql),
            ),
            PrefSqlError::Upstream { .. } => {
                ErrorReport::new("Error while querying", UPSTREAM_MESSAGE)
            }
            other => ErrorReport::new("PrefSql error", other.to_string()),
        }
    }
}

/// Type alias for Result to use PrefSqlError as the error type.
pub type Result<T> = std::result::Result<T, PrefSqlError>;
