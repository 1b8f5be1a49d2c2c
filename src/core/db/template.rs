/// Statement Template Module
///
/// `SqlTemplate` is the executor facade. Every call acquires its own
/// connection, prepares and binds one statement, runs it, and releases
/// everything again in reverse order: cursor, statement, connection. That
/// happens on every exit path. The primary failure is the one returned; a
/// release failure that follows it is logged.
///
/// Statement entry points take exactly one SQL statement. Empty SQL, or text
/// after the first statement other than whitespace and comments, fails in
/// the prepare phase instead of being ignored. Only [`SqlTemplate::execute`]
/// runs multi-statement scripts.

use crate::core::db::binder::bind;
use crate::core::db::extract::Extractor;
use crate::core::db::shape::Shape;
use crate::core::db::source::ConnectionSource;
use crate::core::error::{Phase, Result};
use crate::core::translate::{at_most_one, settle, translate};
use rusqlite::{ffi, Batch, Connection, Statement, ToSql};
use tracing::{debug, info, trace};

/// Executes parameterized SQL against connections from a [`ConnectionSource`].
///
/// Holds no per-call state, so one template can serve many threads as long
/// as its source allows concurrent acquisition.
#[derive(Debug, Clone)]
pub struct SqlTemplate<S> {
    source: S,
}

impl<S: ConnectionSource> SqlTemplate<S> {
    /// Creates a template over `source`.
    pub fn new(source: S) -> Self {
        SqlTemplate { source }
    }

    /// The connection source this template draws from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs a query and extracts every row, in the order the database
    /// returned them.
    ///
    /// `target` is either a shape descriptor (reflective extraction) or an
    /// extraction rule (manual extraction).
    ///
    /// # Errors
    ///
    /// Returns `DataAccessError::Execution` if acquiring, preparing, binding,
    /// stepping or extracting fails.
    pub fn query<'e, T, E>(&self, target: E, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<T>>
    where
        E: Into<Extractor<'e, T>>,
        T: 'e,
    {
        let extractor = target.into();
        debug!(sql, params = params.len(), "query");
        self.with_statement(sql, params, |_, stmt| {
            let mut rows = stmt.raw_query();
            trace!(resource = "cursor", "acquired");
            let extracted = extractor
                .extract(&mut rows)
                .map_err(|err| translate(Phase::Extract, sql, err));
            drop(rows);
            trace!(resource = "cursor", "released");
            extracted
        })
    }

    /// Runs a query expected to return at most one row.
    ///
    /// # Errors
    ///
    /// Everything [`query`](Self::query) returns, plus
    /// `DataAccessError::ContractViolation` when two or more rows come back.
    pub fn query_one<'e, T, E>(&self, target: E, sql: &str, params: &[&dyn ToSql]) -> Result<Option<T>>
    where
        E: Into<Extractor<'e, T>>,
        T: 'e,
    {
        at_most_one(self.query(target, sql, params)?)
    }

    /// [`query`](Self::query) with reflective extraction through `T`'s shape.
    pub fn query_as<T: Shape>(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<T>> {
        self.query(Extractor::<T>::shape(), sql, params)
    }

    /// [`query_one`](Self::query_one) with reflective extraction through `T`'s shape.
    pub fn query_one_as<T: Shape>(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Option<T>> {
        self.query_one(Extractor::<T>::shape(), sql, params)
    }

    /// Runs a mutating statement and returns the affected-row count.
    pub fn update(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        info!(sql, params = params.len(), "update");
        self.with_statement(sql, params, |_, stmt| {
            stmt.raw_execute().map_err(|err| translate(Phase::Execute, sql, err))
        })
    }

    /// Runs a mutating statement and returns the rowid it inserted.
    pub fn insert(&self, sql: &str, params: &[&dyn ToSql]) -> Result<i64> {
        info!(sql, params = params.len(), "insert");
        self.with_statement(sql, params, |conn, stmt| {
            stmt.raw_execute().map_err(|err| translate(Phase::Execute, sql, err))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Runs one statement once per parameter list, on one connection.
    ///
    /// Returns the affected-row count of each run, in order. Stops at the
    /// first failure; runs before it stay applied unless the caller wraps the
    /// batch in its own transaction.
    pub fn batch_update(&self, sql: &str, batches: &[&[&dyn ToSql]]) -> Result<Vec<usize>> {
        info!(sql, batches = batches.len(), "batch update");
        self.with_connection(sql, |conn| {
            Self::with_prepared(conn, sql, |stmt| {
                let mut counts = Vec::with_capacity(batches.len());
                for params in batches {
                    bind(stmt, params).map_err(|err| translate(Phase::Bind, sql, err))?;
                    counts.push(stmt.raw_execute().map_err(|err| translate(Phase::Execute, sql, err))?);
                }
                Ok(counts)
            })
        })
    }

    /// Runs a parameterless SQL script, such as schema DDL.
    pub fn execute(&self, sql: &str) -> Result<()> {
        info!(sql, "execute");
        self.with_connection(sql, |conn| {
            conn.execute_batch(sql).map_err(|err| translate(Phase::Execute, sql, err))
        })
    }

    /// Acquire, prepare and bind, hand the statement to `work`, then release.
    fn with_statement<R, F>(&self, sql: &str, params: &[&dyn ToSql], work: F) -> Result<R>
    where
        F: FnOnce(&Connection, &mut Statement<'_>) -> Result<R>,
    {
        self.with_connection(sql, |conn| {
            Self::with_prepared(conn, sql, |stmt| {
                bind(stmt, params).map_err(|err| translate(Phase::Bind, sql, err))?;
                work(conn, stmt)
            })
        })
    }

    fn with_connection<R, F>(&self, sql: &str, work: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let conn = self
            .source
            .acquire()
            .map_err(|err| translate(Phase::Acquire, sql, err))?;
        trace!(resource = "connection", "acquired");

        let outcome = work(&conn);

        let released = self
            .source
            .release(conn)
            .map_err(|err| translate(Phase::Release, sql, err));
        trace!(resource = "connection", "released");
        settle(outcome, released)
    }

    fn with_prepared<R, F>(conn: &Connection, sql: &str, work: F) -> Result<R>
    where
        F: FnOnce(&mut Statement<'_>) -> Result<R>,
    {
        let mut stmt = prepare_single(conn, sql).map_err(|err| translate(Phase::Prepare, sql, err))?;
        trace!(resource = "statement", "acquired");

        let outcome = work(&mut stmt);

        let finalized = stmt
            .finalize()
            .map_err(|err| translate(Phase::Release, sql, err));
        trace!(resource = "statement", "released");
        settle(outcome, finalized)
    }
}

/// Compiles `sql` as exactly one statement.
///
/// `Connection::prepare` stops at the first statement and drops the rest, so
/// the text is walked with a [`Batch`], which also skips whitespace and
/// comments between statements.
fn prepare_single<'conn>(conn: &'conn Connection, sql: &str) -> rusqlite::Result<Statement<'conn>> {
    let mut batch = Batch::new(conn, sql);
    let stmt = batch.next()?.ok_or_else(|| misuse("no SQL statement to prepare"))?;
    match batch.next() {
        Ok(None) => Ok(stmt),
        Ok(Some(_)) | Err(_) => Err(misuse("more than one SQL statement; use execute for scripts")),
    }
}

fn misuse(message: &str) -> rusqlite::Error {
    rusqlite::Error::SqliteFailure(ffi::Error::new(ffi::SQLITE_MISUSE), Some(message.to_string()))
}
