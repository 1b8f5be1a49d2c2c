/// Core Module for sqltemplate
///
/// This module contains the statement-execution pipeline: the connection
/// source seam, parameter binding, row extraction, the executor facade and
/// the error types every call reports through.

pub mod db;
pub mod error;
pub mod translate;

// Re-export commonly used types for convenience
pub use error::{DataAccessError, Phase, Result};
