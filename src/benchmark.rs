//! Benchmark ledger: one entry per statement executed through a connection.
use crate::core::db::{DriverConnection, ExecOutcome};
use crate::core::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// Precision used by [`Benchmark::total_time_default`].
pub const DEFAULT_PRECISION: u32 = 3;

/// One executed statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkEntry {
    /// Statement text as passed by the caller
    #[serde(rename = "req")]
    pub request: String,
    /// Elapsed time in milliseconds, unrounded
    #[serde(rename = "time")]
    pub time_ms: f64,
    /// Driver error message left by the statement, if any
    pub error: Option<String>,
    /// Wall-clock time the statement was issued
    pub executed_at: DateTime<Utc>,
}

/// Aggregate view of a ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    pub request_count: usize,
    pub total_time_ms: f64,
    pub slowest: Option<BenchmarkEntry>,
}

/// Append-only record of the statements issued on one connection.
///
/// `total_time_ms` always equals the sum of the entries' times, and
/// `request_count` their number. Both are only updated together with the
/// append, inside a single `&mut self` call.
#[derive(Debug, Clone, Serialize)]
pub struct Benchmark {
    session_id: Uuid,
    entries: Vec<BenchmarkEntry>,
    #[serde(rename = "total_time")]
    total_time_ms: f64,
    request_count: usize,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

impl Benchmark {
    pub fn new() -> Self {
        Benchmark {
            session_id: Uuid::new_v4(),
            entries: Vec::new(),
            total_time_ms: 0.0,
            request_count: 0,
        }
    }

    /// Times `sql` on `conn` and records it.
    ///
    /// The driver's outcome is handed back untouched together with the
    /// elapsed milliseconds. A failing statement is still recorded; its
    /// error text is whatever the driver reports afterwards.
    pub fn record<C: DriverConnection>(&mut self, conn: &mut C, sql: &str) -> (Option<ExecOutcome>, f64) {
        let executed_at = Utc::now();
        let start = Instant::now();
        let outcome = conn.raw_execute(sql);
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        let error = conn.last_error().map(|e| e.message.clone());
        debug!(
            session = %self.session_id,
            elapsed_ms = elapsed,
            failed = outcome.is_none(),
            "executed: {}",
            sql
        );
        self.push(BenchmarkEntry {
            request: sql.to_string(),
            time_ms: elapsed,
            error,
            executed_at,
        });

        (outcome, elapsed)
    }

    /// Records a statement that never reached a driver, because the
    /// connection failed to open.
    pub fn record_unavailable(&mut self, sql: &str) {
        self.push(BenchmarkEntry {
            request: sql.to_string(),
            time_ms: 0.0,
            error: None,
            executed_at: Utc::now(),
        });
    }

    fn push(&mut self, entry: BenchmarkEntry) {
        self.total_time_ms += entry.time_ms;
        self.request_count += 1;
        self.entries.push(entry);
    }

    /// Total elapsed time in milliseconds, rounded half away from zero to
    /// `precision` decimal digits.
    pub fn total_time(&self, precision: u32) -> f64 {
        round_to(self.total_time_ms, precision)
    }

    pub fn total_time_default(&self) -> f64 {
        self.total_time(DEFAULT_PRECISION)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[BenchmarkEntry] {
        &self.entries
    }

    pub fn request_count(&self) -> usize {
        self.request_count
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn summary(&self) -> BenchmarkSummary {
        let slowest = self
            .entries
            .iter()
            .max_by(|a, b| a.time_ms.total_cmp(&b.time_ms))
            .cloned();
        BenchmarkSummary {
            request_count: self.request_count,
            total_time_ms: self.total_time_ms,
            slowest,
        }
    }

    /// Exports the whole ledger as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Smallest magnitude at which every f64 is an integer.
const MAX_EXACT_FRACTION: f64 = 4_503_599_627_370_496.0;

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision.min(i32::MAX as u32) as i32);
    let scaled = value * factor;
    // Past f64's resolution there is no fractional part left to round
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_FRACTION {
        return value;
    }
    scaled.round() / factor
}
