/// Data Access Error Module
///
/// This module defines the error types surfaced by every data-access call.
/// Callers see exactly two runtime failure classes: an execution failure that
/// wraps the driver error which caused it, and a contract violation raised
/// when a single-result query finds more than one row.
use std::fmt;
use thiserror::Error;

/// The step of a statement's lifecycle in which a driver failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Obtaining a connection from the connection source
    Acquire,
    /// Compiling the SQL text into a statement
    Prepare,
    /// Binding positional parameters
    Bind,
    /// Stepping the statement (query or update)
    Execute,
    /// Turning rows into values
    Extract,
    /// Finalizing the statement or handing the connection back
    Release,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Acquire => "acquire",
            Phase::Prepare => "prepare",
            Phase::Bind => "bind",
            Phase::Execute => "execute",
            Phase::Extract => "extract",
            Phase::Release => "release",
        };
        f.write_str(name)
    }
}

/// Error type for all data-access operations.
#[derive(Error, Debug)]
pub enum DataAccessError {
    /// A failure reported by the database driver.
    ///
    /// Covers connection errors, SQL syntax errors, constraint violations,
    /// parameter-count mismatches and type conversion errors during
    /// extraction. The original driver error is kept as the source.
    #[error("Execution failure during {phase} of `{sql}`: {source}")]
    Execution {
        phase: Phase,
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// A query expected to return at most one row returned more.
    #[error("Contract violation: more than one row returned ({rows} rows)")]
    ContractViolation { rows: usize },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataAccessError {
    /// Returns `true` for driver-originated failures.
    pub fn is_execution(&self) -> bool {
        matches!(self, DataAccessError::Execution { .. })
    }

    /// Returns `true` when a single-result query saw several rows.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, DataAccessError::ContractViolation { .. })
    }

    /// The phase an execution failure happened in.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            DataAccessError::Execution { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// The underlying driver error, if any.
    pub fn cause(&self) -> Option<&rusqlite::Error> {
        match self {
            DataAccessError::Execution { source, .. } => Some(source),
            _ => None,
        }
    }

    /// The SQLite primary error code of a SQLite-originated failure.
    ///
    /// Conversion and binding errors raised on the Rust side carry no code.
    pub fn sqlite_code(&self) -> Option<rusqlite::ErrorCode> {
        self.cause().and_then(rusqlite::Error::sqlite_error_code)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DataAccessError>;
