/// Error Translation Module
///
/// Turns driver failures into [`DataAccessError`] values at the executor
/// boundary and enforces the at-most-one-row rule for single-result queries.
use crate::core::error::{DataAccessError, Phase, Result};
use tracing::warn;

/// Wraps a driver error as an execution failure of `sql` during `phase`.
pub fn translate(phase: Phase, sql: &str, source: rusqlite::Error) -> DataAccessError {
    DataAccessError::Execution {
        phase,
        sql: sql.to_string(),
        source,
    }
}

/// Reduces a fully materialized result to zero or one value.
///
/// Two or more rows is a [`DataAccessError::ContractViolation`]; the first
/// row is never picked silently.
pub fn at_most_one<T>(mut rows: Vec<T>) -> Result<Option<T>> {
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        n => Err(DataAccessError::ContractViolation { rows: n }),
    }
}

/// Combines the outcome of some work with the outcome of releasing the
/// resource that work ran on.
///
/// The work's failure takes precedence. A release failure that follows it is
/// logged, not returned. A release failure after successful work is returned.
pub fn settle<T>(outcome: Result<T>, released: Result<()>) -> Result<T> {
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release_err)) => Err(release_err),
        (Err(primary), Ok(())) => Err(primary),
        (Err(primary), Err(secondary)) => {
            warn!(error = %secondary, primary = %primary, "release failed after an earlier failure");
            Err(primary)
        }
    }
}
