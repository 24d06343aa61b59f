//! Key-value storage used for favorites and preferences.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use super::migrations::run_migrations;

/// Database file name.
const DB_FILE_NAME: &str = "reelscout.db";

/// How long a write waits on a lock held by another `reelscout` process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// Scoped get/set capability over string values.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// `SQLite`-backed store over the `kv_store` table.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wraps an already migrated connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens the database at [`SqliteStore::resolve_path`] for `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be resolved or the database
    /// cannot be opened or migrated.
    pub fn open(dir: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(dir)?;
        Self::open_at(&path)
    }

    /// Opens (or creates) the database file at `path` and migrates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("failed to set busy timeout")?;
        run_migrations(&conn).context("database migration failed")?;
        tracing::debug!(path = %path.display(), "preference store ready");

        Ok(Self::new(conn))
    }

    /// Database file location.
    ///
    /// - `{dir}/reelscout.db` when `dir` is given.
    /// - `$XDG_DATA_HOME/reelscout/reelscout.db` when that is an absolute path.
    /// - `~/.local/share/reelscout/reelscout.db` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `XDG_DATA_HOME` nor `HOME` is usable.
    pub fn resolve_path(dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(d) = dir {
            return Ok(d.join(DB_FILE_NAME));
        }
        let root = data_root(std::env::var_os("XDG_DATA_HOME"), std::env::var_os("HOME"))
            .context("HOME environment variable is not set")?;
        Ok(root.join("reelscout").join(DB_FILE_NAME))
    }
}

/// Absolute `xdg_data_home` wins, otherwise `{home}/.local/share`.
fn data_root(xdg_data_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    xdg_data_home
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| {
            home.filter(|h| !h.is_empty())
                .map(|h| PathBuf::from(h).join(".local").join("share"))
        })
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read key {key}"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                rusqlite::params![key, value],
            )
            .with_context(|| format!("failed to write key {key}"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", rusqlite::params![key])
            .with_context(|| format!("failed to delete key {key}"))?;
        Ok(())
    }
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (String::from(k), String::from(v)))
            .collect();
        Self {
            entries: RefCell::new(map),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(String::from(key), String::from(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
