/// Connection Wrapper Module
///
/// [`PrefSql`] owns exactly one driver connection and routes every statement
/// through its [`Benchmark`] ledger. Whether failures are surfaced or handed
/// back silently is decided by the `show_errors` policy fixed at connect time,
/// optionally forced on for a single call.
use crate::benchmark::Benchmark;
use crate::core::db::driver::{ConnectParams, Driver, DriverConnection, DriverError, ExecOutcome};
use crate::core::{PrefSqlError, Result};
use tracing::{error, info, warn};

/// Error display settings applied when connecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Surface errors for every statement issued on this connection
    pub show_errors: bool,
    /// Surface a connection failure even if `show_errors` is off. Not stored.
    pub force_show_errors: bool,
}

impl ConnectOptions {
    pub fn show_errors(show_errors: bool) -> Self {
        ConnectOptions {
            show_errors,
            force_show_errors: false,
        }
    }

    fn effective(&self) -> bool {
        self.show_errors || self.force_show_errors
    }
}

/// A database connection with error surfacing policy and query benchmarking.
#[derive(Debug)]
pub struct PrefSql<C: DriverConnection> {
    /// None only when the connection failed to open under the silent policy
    handle: Option<C>,
    show_errors: bool,
    connect_error: Option<DriverError>,
    benchmark: Benchmark,
}

impl<C: DriverConnection> PrefSql<C> {
    /// Opens a connection with the given connection-wide display policy.
    ///
    /// # Errors
    ///
    /// Returns `PrefSqlError::Connection` if the driver cannot connect and
    /// `show_errors` is set. With `show_errors` off the failure is only
    /// logged, and the returned wrapper has no usable connection.
    pub fn connect<D>(driver: &D, params: &ConnectParams, show_errors: bool) -> Result<Self>
    where
        D: Driver<Conn = C>,
    {
        Self::connect_with(driver, params, ConnectOptions::show_errors(show_errors))
    }

    /// Opens a connection, with an optional one-off override that surfaces
    /// a connection failure regardless of `show_errors`.
    pub fn connect_with<D>(driver: &D, params: &ConnectParams, options: ConnectOptions) -> Result<Self>
    where
        D: Driver<Conn = C>,
    {
        let (handle, connect_error) = match driver.connect(params) {
            Ok(conn) => {
                info!(host = %params.host, database = %params.database, "connected");
                (Some(conn), None)
            }
            Err(err) if options.effective() => {
                error!(host = %params.host, database = %params.database, "connection failed: {}", err);
                return Err(PrefSqlError::Connection(err));
            }
            Err(err) => {
                warn!(host = %params.host, database = %params.database, "connection failed silently: {}", err);
                (None, Some(err))
            }
        };

        Ok(PrefSql {
            handle,
            show_errors: options.show_errors,
            connect_error,
            benchmark: Benchmark::new(),
        })
    }

    /// Executes `sql` under the connection-wide policy.
    pub fn query(&mut self, sql: &str) -> Result<Option<ExecOutcome>> {
        self.query_with(sql, false)
    }

    /// Executes `sql`, surfacing a failure even if `show_errors` is off.
    pub fn query_forced(&mut self, sql: &str) -> Result<Option<ExecOutcome>> {
        self.query_with(sql, true)
    }

    /// Executes `sql` and records it in the benchmark ledger.
    ///
    /// Returns `Ok(Some(_))` on success. A failure yields `Ok(None)` when
    /// neither `show_errors` nor `force_show_errors` is set, otherwise a
    /// `Query` error if the driver reported one, or an `Upstream` error if
    /// it did not.
    pub fn query_with(&mut self, sql: &str, force_show_errors: bool) -> Result<Option<ExecOutcome>> {
        let outcome = match self.handle.as_mut() {
            Some(conn) => self.benchmark.record(conn, sql).0,
            None => {
                self.benchmark.record_unavailable(sql);
                None
            }
        };

        if outcome.is_some() {
            return Ok(outcome);
        }
        if !(self.show_errors || force_show_errors) {
            warn!("statement failed silently: {}", sql);
            return Ok(None);
        }

        let err = self.classify_failure(sql);
        error!("{}", err);
        Err(err)
    }

    /// A driver error with a code or message wins; otherwise the failure is
    /// assumed to come from upstream of the statement.
    fn classify_failure(&self, sql: &str) -> PrefSqlError {
        let last_error = self
            .handle
            .as_ref()
            .and_then(|conn| conn.last_error())
            .filter(|err| err.code != 0 || !err.message.is_empty());

        match last_error {
            Some(err) => PrefSqlError::Query {
                code: err.code,
                message: err.message.clone(),
                sql: sql.to_string(),
            },
            None => PrefSqlError::Upstream {
                sql: sql.to_string(),
            },
        }
    }

    pub fn show_errors(&self) -> bool {
        self.show_errors
    }

    /// Whether the driver connection opened.
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// The error swallowed while connecting under the silent policy.
    pub fn connect_error(&self) -> Option<&DriverError> {
        self.connect_error.as_ref()
    }

    pub fn connection(&self) -> Option<&C> {
        self.handle.as_ref()
    }

    pub fn benchmark(&self) -> &Benchmark {
        &self.benchmark
    }

    /// Releases the connection and hands back the ledger.
    pub fn close(mut self) -> Benchmark {
        if self.handle.take().is_some() {
            info!(
                requests = self.benchmark.request_count(),
                total_ms = self.benchmark.total_time_default(),
                "connection closed"
            );
        }
        self.benchmark
    }
}
