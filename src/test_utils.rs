/// # Test Utilities Module
///
/// Scripted driver for unit tests that need deterministic failures without
/// a real database: statements registered with `fail_on` fail with the given
/// error, statements registered with `fail_silently_on` fail with no error
/// state, and everything else succeeds.
use crate::core::db::{ConnectParams, Driver, DriverConnection, DriverError, ExecOutcome, ResultSet};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ScriptedConnection {
    failures: HashMap<String, Option<DriverError>>,
    last_error: Option<DriverError>,
    pub executed: Vec<String>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `sql` fail with the given driver error.
    pub fn fail_on(&mut self, sql: &str, code: i32, message: &str) {
        self.failures
            .insert(sql.to_string(), Some(DriverError::new(code, message)));
    }

    /// Makes `sql` fail without leaving any error state.
    pub fn fail_silently_on(&mut self, sql: &str) {
        self.failures.insert(sql.to_string(), None);
    }
}

impl DriverConnection for ScriptedConnection {
    fn raw_execute(&mut self, sql: &str) -> Option<ExecOutcome> {
        self.executed.push(sql.to_string());
        match self.failures.get(sql) {
            Some(failure) => {
                self.last_error = failure.clone();
                None
            }
            None => {
                self.last_error = None;
                if sql.trim_start().to_uppercase().starts_with("SELECT") {
                    Some(ExecOutcome::Rows(ResultSet::new(
                        vec!["1".to_string()],
                        vec![vec!["1".to_string()]],
                    )))
                } else {
                    Some(ExecOutcome::Affected(0))
                }
            }
        }
    }

    fn last_error(&self) -> Option<&DriverError> {
        self.last_error.as_ref()
    }
}

/// Driver handing out a pre-scripted connection, or refusing to connect.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDriver {
    pub connection: ScriptedConnection,
    pub refuse: Option<DriverError>,
}

impl ScriptedDriver {
    pub fn new(connection: ScriptedConnection) -> Self {
        ScriptedDriver {
            connection,
            refuse: None,
        }
    }

    pub fn refusing(code: i32, message: &str) -> Self {
        ScriptedDriver {
            connection: ScriptedConnection::new(),
            refuse: Some(DriverError::new(code, message)),
        }
    }
}

impl Driver for ScriptedDriver {
    type Conn = ScriptedConnection;

    fn connect(&self, _params: &ConnectParams) -> Result<ScriptedConnection, DriverError> {
        match &self.refuse {
            Some(err) => Err(err.clone()),
            None => Ok(self.connection.clone()),
        }
    }
}

pub fn params() -> ConnectParams {
    ConnectParams::new("localhost", "test", "secret", "test_db")
}
