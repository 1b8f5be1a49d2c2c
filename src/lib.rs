//! A small data-access helper over SQLite.
//!
//! `SqlTemplate` runs positional-parameter SQL on connections handed out by a
//! [`ConnectionSource`] and turns the resulting rows into typed values, either
//! by mapping columns onto the fields of a registered [`Shape`] or through a
//! caller-supplied [`ExtractionRule`].
//!
//! Statement entry points take one SQL statement each; only
//! [`SqlTemplate::execute`] runs multi-statement scripts. Sources open a
//! database file per call, so in-memory targets are rejected.
//!
//! Column values convert through rusqlite's `FromSql`. The driver is built
//! with its `chrono` and `serde_json` features, so shape fields and
//! [`ExtractionRule::column`] targets can be `chrono` date/time types (from
//! ISO-8601 text or Unix-time integers) and `serde_json::Value` (from JSON
//! text), alongside the integer, float, text and blob types.
//!
//! ```
//! use sqltemplate::{params, shape, SqlTemplate, SqliteSource};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! shape!(User { id, name });
//!
//! # fn main() -> sqltemplate::Result<()> {
//! # let dir = tempfile::tempdir()?;
//! let template = SqlTemplate::new(SqliteSource::new(dir.path().join("app.db"))?);
//! template.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")?;
//! template.update("INSERT INTO users (name) VALUES (?)", params!["alice"])?;
//!
//! let user: Option<User> = template.query_one_as("SELECT id, name FROM users WHERE name = ?", params!["alice"])?;
//! assert_eq!(user.map(|u| u.id), Some(1));
//! # Ok(())
//! # }
//! ```

// Core infrastructure modules
pub mod config;
pub mod core;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::core::db::{
    ConnectionSource, ExtractionRule, Extractor, FieldAssign, Shape, ShapeDescriptor, SqlTemplate, SqliteSource,
};
pub use crate::core::{DataAccessError, Phase, Result};
pub use rusqlite::{params, Row, ToSql};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
