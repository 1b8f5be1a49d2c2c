/// Extraction Rule Module
///
/// An extraction rule is a caller-owned decoder from one row to one value.
/// The rule does all column access and conversion itself; the extractor only
/// drives row iteration. Rules hold no per-call state and can be shared across
/// threads and reused for any number of queries.
use rusqlite::types::{FromSql, FromSqlError, ValueRef};
use rusqlite::{Row, RowIndex};
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

type Decode<T> = dyn Fn(&Row<'_>) -> rusqlite::Result<T> + Send + Sync;

/// A caller-supplied row decoder producing `T`.
pub struct ExtractionRule<T> {
    decode: Box<Decode<T>>,
}

impl<T> ExtractionRule<T> {
    /// Wraps a row decoding function.
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&Row<'_>) -> rusqlite::Result<T> + Send + Sync + 'static,
    {
        ExtractionRule {
            decode: Box::new(decode),
        }
    }

    /// Decodes one row.
    pub fn apply(&self, row: &Row<'_>) -> rusqlite::Result<T> {
        (self.decode)(row)
    }
}

impl<T: FromSql + 'static> ExtractionRule<T> {
    /// A rule reading one column with the driver's strict conversion.
    pub fn column<I>(index: I) -> Self
    where
        I: RowIndex + Send + Sync + 'static,
    {
        ExtractionRule::new(move |row| {
            let position = index.idx(row.as_ref())?;
            let value = row.get_ref(position)?;
            T::column_result(value).map_err(|err| conversion_failure(row, position, value, err))
        })
    }
}

impl<T> ExtractionRule<T>
where
    T: FromStr + 'static,
    T::Err: StdError + Send + Sync + 'static,
{
    /// A rule reading one column through its textual form and parsing it.
    ///
    /// TEXT is parsed as stored; INTEGER and REAL go through their decimal
    /// rendering. NULL and BLOB values, and text that does not parse, are
    /// conversion failures.
    pub fn parsed<I>(index: I) -> Self
    where
        I: RowIndex + Send + Sync + 'static,
    {
        ExtractionRule::new(move |row| {
            let position = index.idx(row.as_ref())?;
            let value = row.get_ref(position)?;
            let text = match value {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                    .map_err(rusqlite::Error::Utf8Error)?
                    .to_string(),
                ValueRef::Integer(i) => i.to_string(),
                ValueRef::Real(f) => f.to_string(),
                ValueRef::Null | ValueRef::Blob(_) => {
                    return Err(rusqlite::Error::InvalidColumnType(
                        position,
                        column_label(row, position),
                        value.data_type(),
                    ))
                }
            };
            text.trim()
                .parse::<T>()
                .map_err(|err| rusqlite::Error::FromSqlConversionFailure(position, value.data_type(), Box::new(err)))
        })
    }
}

impl<T> fmt::Debug for ExtractionRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionRule").finish_non_exhaustive()
    }
}

fn column_label(row: &Row<'_>, position: usize) -> String {
    row.as_ref()
        .column_name(position)
        .map(str::to_string)
        .unwrap_or_default()
}

fn conversion_failure(
    row: &Row<'_>,
    position: usize,
    value: ValueRef<'_>,
    err: FromSqlError,
) -> rusqlite::Error {
    match err {
        FromSqlError::InvalidType => {
            rusqlite::Error::InvalidColumnType(position, column_label(row, position), value.data_type())
        }
        FromSqlError::OutOfRange(i) => rusqlite::Error::IntegralValueOutOfRange(position, i),
        FromSqlError::Other(err) => rusqlite::Error::FromSqlConversionFailure(position, value.data_type(), err),
        other => rusqlite::Error::FromSqlConversionFailure(position, value.data_type(), Box::new(other)),
    }
}
