/// Core Module for PrefSql
///
/// Shared infrastructure: the database layer and the error types every
/// other module reports through.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, PrefSqlError, Result};
