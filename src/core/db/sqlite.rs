/// SQLite Driver Module
///
/// Bundled driver backed by rusqlite. SQLite has no server or users, so the
/// host and credentials in [`ConnectParams`] are accepted and ignored; the
/// database name is the file path, or ":memory:".
use crate::core::db::driver::{ConnectParams, Driver, DriverConnection, DriverError, ExecOutcome, ResultSet};
use rusqlite::{types::ValueRef, Batch, Connection, OpenFlags, Statement};
use std::time::Duration;
use tracing::debug;

/// Fallback code for errors that carry no SQLite result code.
const GENERIC_ERROR_CODE: i32 = 1;

pub const EMPTY_QUERY_MESSAGE: &str = "Query was empty";
pub const MULTIPLE_STATEMENTS_MESSAGE: &str = "Multiple statements in one query are not allowed";

/// Driver that opens SQLite databases.
#[derive(Debug, Clone)]
pub struct SqliteDriver {
    /// Create the database file when it does not exist
    pub create_if_missing: bool,
    /// How long a statement waits on a locked database before failing
    pub busy_timeout: Option<Duration>,
    /// Enable foreign key enforcement on every connection
    pub foreign_keys: bool,
}

impl Default for SqliteDriver {
    fn default() -> Self {
        SqliteDriver {
            create_if_missing: true,
            busy_timeout: None,
            foreign_keys: true,
        }
    }
}

impl SqliteDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    fn open(&self, params: &ConnectParams) -> rusqlite::Result<Connection> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.create_if_missing {
            flags |= OpenFlags::SQLITE_OPEN_CREATE;
        }

        let conn = Connection::open_with_flags(&params.database, flags)?;
        if let Some(timeout) = self.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        if self.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        Ok(conn)
    }
}

impl Driver for SqliteDriver {
    type Conn = SqliteConnection;

    fn connect(&self, params: &ConnectParams) -> Result<SqliteConnection, DriverError> {
        debug!(
            host = %params.host,
            login = %params.login,
            "SQLite ignores host and credentials; opening {}",
            params.database
        );
        self.open(params)
            .map(|conn| SqliteConnection {
                conn,
                last_error: None,
            })
            .map_err(|e| to_driver_error(&e))
    }
}

/// An open SQLite connection with mysqli-style last-error tracking.
#[derive(Debug)]
pub struct SqliteConnection {
    conn: Connection,
    last_error: Option<DriverError>,
}

impl SqliteConnection {
    /// Borrows the underlying rusqlite connection.
    pub fn inner(&self) -> &Connection {
        &self.conn
    }

    /// Runs exactly one statement. Empty input and input holding more than
    /// one statement are rejected before anything is stepped.
    fn run(&self, sql: &str) -> Result<ExecOutcome, DriverError> {
        let mut batch = Batch::new(&self.conn, sql);
        let mut stmt = match batch.next() {
            Ok(Some(stmt)) => stmt,
            Ok(None) => return Err(DriverError::new(GENERIC_ERROR_CODE, EMPTY_QUERY_MESSAGE)),
            Err(e) => return Err(to_driver_error(&e)),
        };
        // Any trailing statement, valid or not, is refused
        if !matches!(batch.next(), Ok(None)) {
            return Err(DriverError::new(GENERIC_ERROR_CODE, MULTIPLE_STATEMENTS_MESSAGE));
        }

        step(&mut stmt).map_err(|e| to_driver_error(&e))
    }
}

fn step(stmt: &mut Statement<'_>) -> rusqlite::Result<ExecOutcome> {
    let column_count = stmt.column_count();

    if column_count == 0 {
        let affected = stmt.execute([])?;
        return Ok(ExecOutcome::Affected(affected as u64));
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map([], |row| {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(format_value(row.get_ref(i)?));
            }
            Ok(values)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(ExecOutcome::Rows(ResultSet::new(columns, rows)))
}

impl DriverConnection for SqliteConnection {
    fn raw_execute(&mut self, sql: &str) -> Option<ExecOutcome> {
        match self.run(sql) {
            Ok(outcome) => {
                self.last_error = None;
                Some(outcome)
            }
            Err(err) => {
                self.last_error = Some(err);
                None
            }
        }
    }

    fn last_error(&self) -> Option<&DriverError> {
        self.last_error.as_ref()
    }
}

/// Maps a rusqlite error onto the driver's code/message pair.
fn to_driver_error(err: &rusqlite::Error) -> DriverError {
    match err {
        rusqlite::Error::SqliteFailure(ffi_err, msg) => DriverError::new(
            ffi_err.extended_code,
            msg.clone().unwrap_or_else(|| ffi_err.to_string()),
        ),
        other => DriverError::new(GENERIC_ERROR_CODE, other.to_string()),
    }
}

/// Formats a SQLite value for display
fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> SqliteConnection {
        SqliteDriver::new()
            .connect(&ConnectParams::new("localhost", "", "", ":memory:"))
            .unwrap()
    }

    #[test]
    fn test_select_returns_rows() {
        let mut conn = memory();
        conn.raw_execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT, value REAL)")
            .unwrap();
        conn.raw_execute("INSERT INTO test (name, value) VALUES ('Alice', 123.45), (NULL, NULL)")
            .unwrap();

        let outcome = conn.raw_execute("SELECT * FROM test ORDER BY id").unwrap();
        let rs = outcome.rows().unwrap();
        assert_eq!(rs.columns, vec!["id", "name", "value"]);
        assert_eq!(rs.rows[0], vec!["1", "Alice", "123.45"]);
        assert_eq!(rs.rows[1], vec!["2", "NULL", "NULL"]);
        assert!(conn.last_error().is_none());
    }

    #[test]
    fn test_write_reports_affected_rows() {
        let mut conn = memory();
        conn.raw_execute("CREATE TABLE t (v INTEGER)").unwrap();
        let outcome = conn.raw_execute("INSERT INTO t VALUES (1), (2), (3)").unwrap();
        assert_eq!(outcome, ExecOutcome::Affected(3));
    }

    #[test]
    fn test_failure_sets_last_error() {
        let mut conn = memory();
        assert!(conn.raw_execute("SELECT * FROM nonexistent_table").is_none());
        let err = conn.last_error().unwrap();
        assert_eq!(err.code, 1);
        assert!(err.message.contains("no such table"));

        // A later success clears the error state
        assert!(conn.raw_execute("SELECT 1").is_some());
        assert!(conn.last_error().is_none());
    }

    #[test]
    fn test_multiple_statements_are_refused() {
        let mut conn = memory();
        conn.raw_execute("CREATE TABLE t (v INTEGER)").unwrap();

        assert!(conn
            .raw_execute("INSERT INTO t VALUES (1); INSERT INTO t VALUES (2)")
            .is_none());
        assert_eq!(conn.last_error().unwrap().message, MULTIPLE_STATEMENTS_MESSAGE);
        assert!(conn.raw_execute("SELECT 1; THIS IS NOT SQL").is_none());

        // Nothing from the refused input ran
        let count: i64 = conn
            .inner()
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_trailing_semicolon_is_one_statement() {
        let mut conn = memory();
        let outcome = conn.raw_execute("SELECT 1;  ").unwrap();
        assert_eq!(outcome.rows().unwrap().rows, vec![vec!["1".to_string()]]);
    }

    #[test]
    fn test_empty_query() {
        let mut conn = memory();
        for sql in ["", "   ", "-- hi", ";"] {
            assert!(conn.raw_execute(sql).is_none(), "{:?} should fail", sql);
            let err = conn.last_error().unwrap();
            assert_eq!(err.code, GENERIC_ERROR_CODE);
            assert_eq!(err.message, EMPTY_QUERY_MESSAGE);
        }
    }

    #[test]
    fn test_blob_formatting() {
        let mut conn = memory();
        let outcome = conn.raw_execute("SELECT X'48656C6C6F'").unwrap();
        assert_eq!(outcome.rows().unwrap().rows[0][0], "<BLOB: 5 bytes>");
    }

    #[test]
    fn test_missing_file_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let result = SqliteDriver::new()
            .create_if_missing(false)
            .connect(&ConnectParams::new("", "", "", path.to_string_lossy()));
        let err = result.err().unwrap();
        assert!(!err.message.is_empty());
    }
}
