//! Persistent storage for user preferences.
//!
//! Uses `rusqlite` (bundled `SQLite`) to hold a small key-value table
//! for the favorites collection and the theme preference.

/// Key-value store trait and implementations.
pub mod kv;
mod migrations;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
