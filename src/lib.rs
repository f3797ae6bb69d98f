// Core infrastructure modules
pub mod core;

// Feature-specific modules
pub mod benchmark;
pub mod config;
pub mod report;

#[cfg(test)]
mod test_utils;

pub use crate::benchmark::{Benchmark, BenchmarkEntry, BenchmarkSummary};
pub use crate::core::db::{ConnectOptions, ConnectParams, ExecOutcome, PrefSql, ResultSet, SqliteDriver};
pub use crate::core::{ErrorKind, PrefSqlError, Result};
