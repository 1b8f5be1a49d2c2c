/// # Test Utilities Module
///
/// Shared fixtures for the crate's unit tests:
/// - file-backed sample databases in a temporary directory
/// - a connection source that counts acquisitions and releases
/// - capture of the template's resource acquire/release events

use crate::core::db::source::{ConnectionSource, SqliteSource};
use crate::core::translate::translate;
use crate::core::{Phase, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// A sample database living in its own temporary directory.
pub struct DatabaseFixture {
    dir: TempDir,
}

impl DatabaseFixture {
    /// Creates a database with a `users` table holding alice, bob and carol.
    pub fn with_users() -> Result<Self> {
        let dir = TempDir::new()?;
        let fixture = DatabaseFixture { dir };
        seed(&fixture.source()?, USERS_SCHEMA)?;
        Ok(fixture)
    }

    /// A plain source for the fixture database.
    pub fn source(&self) -> Result<SqliteSource> {
        SqliteSource::new(self.dir.path().join("fixture.db"))
    }
}

/// Runs a setup script on a fresh connection, classifying failures the way
/// the template does.
pub fn seed(source: &SqliteSource, script: &str) -> Result<()> {
    let conn = source.acquire().map_err(|e| translate(Phase::Acquire, script, e))?;
    conn.execute_batch(script)
        .map_err(|e| translate(Phase::Execute, script, e))?;
    source
        .release(conn)
        .map_err(|e| translate(Phase::Release, script, e))
}

const USERS_SCHEMA: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT
    );
    INSERT INTO users (name, email) VALUES ('alice', 'alice@example.com');
    INSERT INTO users (name, email) VALUES ('bob', 'bob@example.com');
    INSERT INTO users (name, email) VALUES ('carol', 'carol@example.com');
";

/// Wraps a [`SqliteSource`], counting every acquire and release.
///
/// Each connection also gets a `fail_on(value, trigger)` SQL function that
/// raises an error when `value = trigger` and otherwise returns the length
/// of `value`, for provoking failures part way through a result.
#[derive(Debug)]
pub struct CountingSource {
    inner: Option<SqliteSource>,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl CountingSource {
    pub fn new(inner: SqliteSource) -> Self {
        CountingSource {
            inner: Some(inner),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// A source whose every acquisition fails.
    pub fn failing() -> Self {
        CountingSource {
            inner: None,
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl ConnectionSource for CountingSource {
    fn acquire(&self) -> rusqlite::Result<Connection> {
        let inner = self
            .inner
            .as_ref()
            .ok_or_else(|| rusqlite::Error::InvalidPath("unavailable".into()))?;
        let conn = inner.acquire()?;
        conn.create_scalar_function(
            "fail_on",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let value: String = ctx.get(0)?;
                let trigger: String = ctx.get(1)?;
                if value == trigger {
                    Err(rusqlite::Error::UserFunctionError(
                        format!("fail_on triggered by {}", value).into(),
                    ))
                } else {
                    Ok(value.len() as i64)
                }
            },
        )?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(conn)
    }

    fn release(&self, conn: Connection) -> rusqlite::Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        conn.close().map_err(|(_, err)| err)
    }
}

/// Collects `"<resource> <message>"` for every event carrying a `resource` field.
struct ResourceRecorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S: Subscriber> Layer<S> for ResourceRecorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = ResourceVisitor::default();
        event.record(&mut visitor);
        if let (Some(resource), Some(message)) = (visitor.resource, visitor.message) {
            if let Ok(mut events) = self.events.lock() {
                events.push(format!("{} {}", resource, message));
            }
        }
    }
}

#[derive(Default)]
struct ResourceVisitor {
    resource: Option<String>,
    message: Option<String>,
}

impl Visit for ResourceVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "resource" {
            self.resource = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}

/// Runs `f` with resource events captured on the current thread.
pub fn record_resources<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(ResourceRecorder {
        events: Arc::clone(&events),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    let recorded = events.lock().map(|e| e.clone()).unwrap_or_default();
    (result, recorded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_has_users() {
        let fixture = DatabaseFixture::with_users().unwrap();
        let conn = fixture.source().unwrap().acquire().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_seed_failure_is_execution_failure() {
        let fixture = DatabaseFixture::with_users().unwrap();
        let err = seed(&fixture.source().unwrap(), "CREATE TABLE users (id INTEGER)").unwrap_err();
        assert!(err.is_execution());
        assert_eq!(err.phase(), Some(Phase::Execute));
        assert!(err.sqlite_code().is_some());
    }

    #[test]
    fn test_seed_unreachable_database_fails_to_acquire() {
        let source = SqliteSource::new("/nonexistent/fixture/dir/db.sqlite").unwrap();
        let err = seed(&source, "SELECT 1").unwrap_err();
        assert_eq!(err.phase(), Some(Phase::Acquire));
    }
}
