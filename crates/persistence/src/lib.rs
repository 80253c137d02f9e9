// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for SongRank.
//!
//! The engine persists through the `KeyValueStore` trait. This crate
//! provides two stores and the checkpointing logic on top of them:
//!
//! - `Persistence` — Diesel over `SQLite`, file-backed (WAL mode) or a
//!   uniquely named shared in-memory database
//! - `MemoryStore` — a process-local map with no durability
//! - `SessionRepository` — versioned session snapshots under the `session`
//!   key and catalog caching under `catalog:{artist_id}`, with retry and
//!   backoff for transient failures
//!
//! ## Migrations
//!
//! Migrations live in `migrations/` and are embedded at compile time with
//! `diesel_migrations`; every connection runs pending migrations on open.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod diesel_schema;
mod error;
mod queries;
mod repository;
mod retry;
mod store;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use repository::{CATALOG_KEY_PREFIX, SESSION_KEY, SessionRepository, catalog_key};
pub use retry::RetryPolicy;
pub use store::{KeyValueStore, MemoryStore};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `SQLite` key-value store.
pub struct Persistence {
    conn: SqliteConnection,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Creates a store backed by a shared in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_songrank_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;

        Ok(Self { conn })
    }

    /// Creates a store backed by a `SQLite` database file.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        backend::sqlite::enable_wal_mode(&mut conn)?;

        Ok(Self { conn })
    }
}

impl KeyValueStore for Persistence {
    fn get(&mut self, key: &str) -> Result<Option<String>, PersistenceError> {
        queries::get_entry(&mut self.conn, key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        queries::put_entry(&mut self.conn, key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, PersistenceError> {
        queries::delete_entry(&mut self.conn, key)
    }

    fn keys_with_prefix(&mut self, prefix: &str) -> Result<Vec<String>, PersistenceError> {
        queries::list_keys(&mut self.conn, prefix)
    }
}
