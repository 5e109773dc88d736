//! SQLite-backed engine state persistence.
//!
//! The entire [`EngineState`] tree is stored as one JSON blob in a
//! key/value table under a namespaced key, wrapped in an envelope with a
//! version stamp. Saves run inside a transaction so a failed write never
//! leaves a half-updated blob behind.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::data_dir;
use crate::engine::EngineState;
use crate::error::StorageError;

/// Namespaced key the state blob lives under.
pub const STATE_KEY: &str = "studyloop.engine.state";

/// Version stamp on the export envelope.
pub const STATE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StateEnvelope {
    version: u32,
    state: EngineState,
}

/// Store for the engine state blob.
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    /// Open the store in the default data directory.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Self::open_at(dir.join("studyloop.db"))
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS engine_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Load the persisted state, if any.
    pub fn load(&self) -> Result<Option<EngineState>, StorageError> {
        let blob: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM engine_state WHERE key = ?1",
                params![STATE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        let Some(blob) = blob else {
            return Ok(None);
        };
        let envelope: StateEnvelope = serde_json::from_str(&blob)
            .map_err(|e| StorageError::CorruptState(e.to_string()))?;
        if envelope.version != STATE_VERSION {
            return Err(StorageError::VersionMismatch {
                found: envelope.version,
                expected: STATE_VERSION,
            });
        }
        Ok(Some(envelope.state))
    }

    /// Persist the state, replacing any previous blob atomically.
    pub fn save(&mut self, state: &EngineState) -> Result<(), StorageError> {
        let envelope = StateEnvelope {
            version: STATE_VERSION,
            state: state.clone(),
        };
        let blob = serde_json::to_string(&envelope)
            .map_err(|e| StorageError::CorruptState(e.to_string()))?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO engine_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![STATE_KEY, blob],
        )?;
        tx.commit()?;
        debug!(bytes = blob.len(), "engine state saved");
        Ok(())
    }

    /// Export the full state as a version-stamped JSON value.
    pub fn export(&self) -> Result<Option<serde_json::Value>, StorageError> {
        let Some(state) = self.load()? else {
            return Ok(None);
        };
        let envelope = StateEnvelope {
            version: STATE_VERSION,
            state,
        };
        serde_json::to_value(&envelope).map(Some).map_err(|e| {
            StorageError::CorruptState(e.to_string())
        })
    }

    /// Import a previously exported envelope, replacing current state.
    pub fn import(&mut self, value: serde_json::Value) -> Result<(), StorageError> {
        let envelope: StateEnvelope = serde_json::from_value(value)
            .map_err(|e| StorageError::CorruptState(e.to_string()))?;
        if envelope.version != STATE_VERSION {
            return Err(StorageError::VersionMismatch {
                found: envelope.version,
                expected: STATE_VERSION,
            });
        }
        self.save(&envelope.state)
    }
}
