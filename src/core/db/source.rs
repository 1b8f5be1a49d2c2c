/// Connection Source Module
///
/// The seam between the statement pipeline and whatever hands out database
/// connections. A source gives out one live connection per call and takes it
/// back when the call is done.

use crate::config::SourceConfig;
use crate::core::{DataAccessError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Hands out connections, each used for exactly one statement lifecycle.
///
/// Implementations must be safe for concurrent acquisition; the template
/// never shares one connection between calls.
pub trait ConnectionSource: Send + Sync {
    /// Obtains a live connection.
    fn acquire(&self) -> rusqlite::Result<Connection>;

    /// Takes back a connection obtained from [`acquire`](Self::acquire).
    ///
    /// The default closes it and reports a failed close.
    fn release(&self, conn: Connection) -> rusqlite::Result<()> {
        conn.close().map_err(|(_, err)| err)
    }
}

impl<S: ConnectionSource + ?Sized> ConnectionSource for &S {
    fn acquire(&self) -> rusqlite::Result<Connection> {
        (**self).acquire()
    }

    fn release(&self, conn: Connection) -> rusqlite::Result<()> {
        (**self).release(conn)
    }
}

impl<S: ConnectionSource + ?Sized> ConnectionSource for Arc<S> {
    fn acquire(&self) -> rusqlite::Result<Connection> {
        (**self).acquire()
    }

    fn release(&self, conn: Connection) -> rusqlite::Result<()> {
        (**self).release(conn)
    }
}

/// Opens a fresh SQLite connection for every acquisition.
///
/// Each connection gets the configured busy timeout and pragmas right after
/// it is opened. There is no pooling, so the target must be a database file:
/// an in-memory database would be a new, empty one on every call.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
    flags: OpenFlags,
    busy_timeout: Duration,
    pragmas: Vec<(String, String)>,
}

impl SqliteSource {
    /// Creates a read-write source for the database at `path`, creating the
    /// file if needed.
    ///
    /// Fails with [`DataAccessError::Config`] for an empty path, `:memory:`,
    /// or a `file:` URI naming an in-memory database.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if is_in_memory(path) {
            return Err(DataAccessError::Config(format!(
                "in-memory database {:?} does not persist between connections",
                path.display().to_string()
            )));
        }
        Ok(SqliteSource {
            path: path.to_path_buf(),
            flags: OpenFlags::default(),
            busy_timeout: Duration::from_millis(crate::config::DEFAULT_BUSY_TIMEOUT_MS),
            pragmas: Vec::new(),
        })
    }

    /// Builds a source from the `[source]` configuration table.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let mut source = SqliteSource::new(&config.path)?
            .read_only(config.read_only)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));
        if !config.create && !config.read_only {
            source.flags.remove(OpenFlags::SQLITE_OPEN_CREATE);
        }
        for (name, value) in &config.pragmas {
            source = source.pragma(name, value);
        }
        Ok(source)
    }

    /// Opens connections read-only (and never creates the file) when `true`.
    pub fn read_only(mut self, read_only: bool) -> Self {
        if read_only {
            self.flags.remove(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);
            self.flags.insert(OpenFlags::SQLITE_OPEN_READ_ONLY);
        }
        self
    }

    /// How long a connection waits on a locked database before failing.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Adds a `PRAGMA name = value` applied to every new connection, in the
    /// order added.
    pub fn pragma(mut self, name: &str, value: &str) -> Self {
        self.pragmas.push((name.to_string(), value.to_string()));
        self
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionSource for SqliteSource {
    fn acquire(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(&self.path, self.flags)?;
        conn.busy_timeout(self.busy_timeout)?;
        for (name, value) in &self.pragmas {
            conn.execute_batch(&format!("PRAGMA {} = {};", name, value))?;
        }
        debug!(path = %self.path.display(), "opened connection");
        Ok(conn)
    }
}

fn is_in_memory(path: &Path) -> bool {
    let target = path.to_string_lossy();
    if target.is_empty() || target == ":memory:" {
        return true;
    }
    match target.strip_prefix("file:") {
        Some(uri) => {
            let (name, query) = uri.split_once('?').unwrap_or((uri, ""));
            name == ":memory:" || query.split('&').any(|pair| pair == "mode=memory")
        }
        None => false,
    }
}
