//! Durable storage for session state.
//!
//! One JSON file per key under the storage directory:
//!
//! - `session.json`: the authenticated `SessionRecord`
//! - `pending.json`: `PendingVerification` between register and verify
//! - `return_url.json`: where to send the user after profile setup
//!
//! Reads degrade instead of failing: a missing or unparseable file loads
//! as `None` (with a warning), so a corrupt record can never wedge
//! startup - the user just logs in again.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::session::record::{PendingVerification, SessionRecord};

const SESSION_KEY: &str = "session";
const PENDING_KEY: &str = "pending";
const RETURN_URL_KEY: &str = "return_url";

pub struct StorageManager {
    storage_dir: PathBuf,
}

impl StorageManager {
    pub fn new(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)
            .with_context(|| format!("Failed to create storage dir: {}", storage_dir.display()))?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &PathBuf {
        &self.storage_dir
    }

    fn key_path(&self, name: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.key_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read storage file: {}", name))?;

        let value: T = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse storage file: {}", name))?;

        Ok(Some(value))
    }

    fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.key_path(name);
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write storage file: {}", name))?;
        Ok(())
    }

    fn clear(&self, name: &str) -> Result<()> {
        let path = self.key_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove storage file: {}", name))?;
        }
        Ok(())
    }

    /// Helper to load a key and warn instead of propagating read errors
    fn load_or_warn<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        match self.load(name) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = name, error = %e, "Ignoring unreadable storage file");
                None
            }
        }
    }

    // ===== Session record =====

    pub fn load_session(&self) -> Option<SessionRecord> {
        self.load_or_warn(SESSION_KEY)
    }

    pub fn save_session(&self, record: &SessionRecord) -> Result<()> {
        self.save(SESSION_KEY, record)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.clear(SESSION_KEY)
    }

    // ===== Pending verification =====

    pub fn load_pending(&self) -> Option<PendingVerification> {
        self.load_or_warn(PENDING_KEY)
    }

    pub fn save_pending(&self, pending: &PendingVerification) -> Result<()> {
        self.save(PENDING_KEY, pending)
    }

    pub fn clear_pending(&self) -> Result<()> {
        self.clear(PENDING_KEY)
    }

    // ===== Return URL =====

    pub fn load_return_url(&self) -> Option<String> {
        self.load_or_warn(RETURN_URL_KEY)
    }

    pub fn save_return_url(&self, url: &str) -> Result<()> {
        self.save(RETURN_URL_KEY, &url)
    }

    pub fn clear_return_url(&self) -> Result<()> {
        self.clear(RETURN_URL_KEY)
    }

    /// Load and clear in one step; the return URL is single-use.
    pub fn take_return_url(&self) -> Option<String> {
        let url: Option<String> = self.load_or_warn(RETURN_URL_KEY);
        if url.is_some() {
            if let Err(e) = self.clear(RETURN_URL_KEY) {
                warn!(error = %e, "Failed to clear return URL after read");
            }
        }
        url
    }

    /// Remove every stored key, the pending verification included. A
    /// full reset; logout goes through the per-key clears instead so a
    /// half-finished verification survives it.
    pub fn clear_all(&self) -> Result<()> {
        self.clear(SESSION_KEY)?;
        self.clear(PENDING_KEY)?;
        self.clear(RETURN_URL_KEY)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
