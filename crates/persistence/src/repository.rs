// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session checkpointing and catalog caching on top of a key-value store.

use serde::Serialize;
use serde::de::DeserializeOwned;
use songrank::{Session, SessionSnapshot};
use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::retry::RetryPolicy;
use crate::store::KeyValueStore;

/// Key of the single persisted session.
pub const SESSION_KEY: &str = "session";

/// Prefix of cached artist catalogs.
pub const CATALOG_KEY_PREFIX: &str = "catalog:";

/// Returns the key a catalog for `artist_id` is cached under.
#[must_use]
pub fn catalog_key(artist_id: &str) -> String {
    format!("{CATALOG_KEY_PREFIX}{artist_id}")
}

/// Persists sessions and cached catalogs through a key-value store.
#[derive(Debug)]
pub struct SessionRepository<S: KeyValueStore> {
    store: S,
    retry: RetryPolicy,
}

impl<S: KeyValueStore> SessionRepository<S> {
    /// Wraps a store with a retry policy.
    #[must_use]
    pub const fn new(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Returns the underlying store.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Writes a snapshot of `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or the write still
    /// fails after retries.
    pub fn save_session(&mut self, session: &Session) -> Result<(), PersistenceError> {
        let json: String = session
            .to_snapshot()
            .to_json()
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let store: &mut S = &mut self.store;
        self.retry
            .run("save_session", || store.put(SESSION_KEY, &json))?;
        debug!(
            session_id = %session.id,
            stage = %session.stage,
            decisions = session.ledger.len(),
            "Session checkpointed"
        );
        Ok(())
    }

    /// Loads and rehydrates the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails after retries, or the stored
    /// snapshot is unsupported or inconsistent.
    pub fn load_session(&mut self) -> Result<Option<Session>, PersistenceError> {
        let store: &mut S = &mut self.store;
        let Some(json) = self.retry.run("load_session", || store.get(SESSION_KEY))? else {
            return Ok(None);
        };

        let snapshot: SessionSnapshot = SessionSnapshot::from_json(&json)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        let session: Session = Session::from_snapshot(snapshot)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

        info!(
            session_id = %session.id,
            stage = %session.stage,
            decisions = session.ledger.len(),
            "Session restored"
        );
        Ok(Some(session))
    }

    /// Deletes the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete still fails after retries.
    pub fn clear_session(&mut self) -> Result<bool, PersistenceError> {
        let store: &mut S = &mut self.store;
        self.retry.run("clear_session", || store.remove(SESSION_KEY))
    }

    /// Caches a catalog for an artist.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the write still fails after
    /// retries.
    pub fn cache_catalog<T: Serialize>(
        &mut self,
        artist_id: &str,
        catalog: &T,
    ) -> Result<(), PersistenceError> {
        let key: String = catalog_key(artist_id);
        let json: String = serde_json::to_string(catalog)?;
        let store: &mut S = &mut self.store;
        self.retry.run("cache_catalog", || store.put(&key, &json))
    }

    /// Reads a cached catalog.
    ///
    /// An entry that no longer decodes is treated as a cache miss.
    ///
    /// # Errors
    ///
    /// Returns an error if the read still fails after retries.
    pub fn cached_catalog<T: DeserializeOwned>(
        &mut self,
        artist_id: &str,
    ) -> Result<Option<T>, PersistenceError> {
        let key: String = catalog_key(artist_id);
        let store: &mut S = &mut self.store;
        let raw: Option<String> = self.retry.run("cached_catalog", || store.get(&key))?;
        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(catalog) => Some(catalog),
            Err(err) => {
                debug!(artist_id, error = %err, "Discarding undecodable catalog cache entry");
                None
            }
        }))
    }

    /// Lists the artist ids with a cached catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the read still fails after retries.
    pub fn cached_artists(&mut self) -> Result<Vec<String>, PersistenceError> {
        let store: &mut S = &mut self.store;
        let keys: Vec<String> = self
            .retry
            .run("cached_artists", || store.keys_with_prefix(CATALOG_KEY_PREFIX))?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(CATALOG_KEY_PREFIX).map(str::to_string))
            .collect())
    }
}
