//! Database connection management
//!
//! One shared connection per [`Database`], opened lazily on first use and
//! migrated before anyone sees it.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use storefront_core::errors::{ExError, ExErrorKind, Result};

use crate::errors::from_rusqlite;
use crate::migrations::apply_migrations;

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbLocation {
    InMemory,
    File(PathBuf),
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    pub location: DbLocation,
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,
}

fn default_foreign_keys() -> bool {
    true
}

impl DbConfig {
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::InMemory,
            foreign_keys: true,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            foreign_keys: true,
        }
    }

    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Open a SQLite database at the given path
///
/// # Errors
/// * `DataAccess` - the file could not be opened
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
///
/// # Errors
/// * `DataAccess` - SQLite could not allocate the database
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Configure a connection according to `config`
///
/// # Errors
/// * `DataAccess` - a pragma was rejected
pub fn configure(conn: &Connection, config: &DbConfig) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", config.foreign_keys)
        .map_err(from_rusqlite)?;

    // WAL for file databases; in-memory ones stay on the default journal
    if let DbLocation::File(_) = config.location {
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(from_rusqlite)?;
        tracing::debug!(component = module_path!(), journal_mode = %mode);
    }

    Ok(())
}

/// Lazily established, shared connection
///
/// The first caller of [`Database::lock`] opens, configures and migrates the
/// connection; later callers reuse it.
#[derive(Debug)]
pub struct Database {
    config: DbConfig,
    conn: OnceLock<Mutex<Connection>>,
    init: Mutex<()>,
    connects: AtomicUsize,
}

impl Database {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            conn: OnceLock::new(),
            init: Mutex::new(()),
            connects: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Number of times a physical connection was opened
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Exclusive access to the connection, connecting on first use
    ///
    /// # Errors
    /// * `DataAccess` - opening, configuring or migrating failed
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        let conn = self.connection()?;
        Ok(conn.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn connection(&self) -> Result<&Mutex<Connection>> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let _init = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let mut conn = match &self.config.location {
            DbLocation::InMemory => open_in_memory()?,
            DbLocation::File(path) => open(path)?,
        };
        configure(&conn, &self.config)?;
        apply_migrations(&mut conn)?;

        let count = self.connects.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            component = module_path!(),
            op = "connect",
            location = ?self.config.location,
            connect_count = count,
        );

        let _ = self.conn.set(Mutex::new(conn));
        self.conn.get().ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("connect")
                .with_message("connection slot empty after initialisation")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connects_once() {
        let db = Database::new(DbConfig::in_memory());
        assert!(!db.is_connected());
        assert_eq!(db.connect_count(), 0);

        drop(db.lock().unwrap());
        drop(db.lock().unwrap());
        assert!(db.is_connected());
        assert_eq!(db.connect_count(), 1);
    }

    #[test]
    fn test_foreign_keys_applied() {
        let db = Database::new(DbConfig::in_memory());
        let conn = db.lock().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(fk, 1);

        let db = Database::new(DbConfig::in_memory().with_foreign_keys(false));
        let conn = db.lock().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(fk, 0);
    }

    #[test]
    fn test_config_from_json() {
        let cfg: DbConfig =
            serde_json::from_str(r#"{"location": {"file": "/tmp/shop.db"}}"#).unwrap();
        assert_eq!(cfg, DbConfig::file("/tmp/shop.db"));

        let cfg: DbConfig =
            serde_json::from_str(r#"{"location": "in_memory", "foreign_keys": false}"#).unwrap();
        assert_eq!(cfg.location, DbLocation::InMemory);
        assert!(!cfg.foreign_keys);
    }
}
