/// Driver Interface Module
///
/// The wrapper never talks to a database engine directly. It owns a
/// connection produced by a [`Driver`] and forwards raw statements to it,
/// reading the driver's last-error state after every call.
use serde::Serialize;
use std::fmt;

/// Parameters used to open a connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectParams {
    /// Host to connect to
    pub host: String,
    /// Login used to authenticate against the server
    pub login: String,
    /// Password used to authenticate against the server
    pub password: String,
    /// Database to select once connected
    pub database: String,
}

impl ConnectParams {
    pub fn new(
        host: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        ConnectParams {
            host: host.into(),
            login: login.into(),
            password: password.into(),
            database: database.into(),
        }
    }
}

/// The driver's native error state: a numeric code and a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverError {
    pub code: i32,
    pub message: String,
}

impl DriverError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        DriverError {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(#{}) {}", self.code, self.message)
    }
}

/// Rows returned by a statement, formatted for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as string values
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        ResultSet { columns, rows }
    }

    /// Number of rows returned
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Successful outcome of a raw statement.
///
/// Write statements report the number of affected rows, so a statement
/// that returns nothing is never mistaken for one that failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExecOutcome {
    /// The statement produced a result set
    Rows(ResultSet),
    /// The statement modified the database
    Affected(u64),
}

impl ExecOutcome {
    /// Returns the result set, if the statement produced one.
    pub fn rows(&self) -> Option<&ResultSet> {
        match self {
            ExecOutcome::Rows(rs) => Some(rs),
            ExecOutcome::Affected(_) => None,
        }
    }
}

/// A database client library able to open connections.
pub trait Driver {
    type Conn: DriverConnection;

    /// Opens a connection, or returns the driver's native connection error.
    fn connect(&self, params: &ConnectParams) -> Result<Self::Conn, DriverError>;
}

/// An open connection owned by the wrapper.
pub trait DriverConnection {
    /// Executes `sql`. `None` signals failure; the reason, if the driver
    /// knows one, is then available from [`DriverConnection::last_error`].
    fn raw_execute(&mut self, sql: &str) -> Option<ExecOutcome>;

    /// Error state left by the most recent call. Cleared on success.
    fn last_error(&self) -> Option<&DriverError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::new(1, "no such table: users");
        assert_eq!(err.to_string(), "(#1) no such table: users");
    }

    #[test]
    fn test_exec_outcome_rows() {
        let rs = ResultSet::new(vec!["a".to_string()], vec![vec!["1".to_string()]]);
        let outcome = ExecOutcome::Rows(rs.clone());
        assert_eq!(outcome.rows(), Some(&rs));
        assert_eq!(outcome.rows().map(ResultSet::row_count), Some(1));
        assert_eq!(ExecOutcome::Affected(3).rows(), None);
    }
}
