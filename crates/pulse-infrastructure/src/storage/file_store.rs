// ============================================================================
// Pulse Infrastructure - File Session Store
// File: crates/pulse-infrastructure/src/storage/file_store.rs
// ============================================================================
//! Keeps the auth record in a JSON file shaped like the browser store:
//! `{"state": {...}, "version": 0}`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pulse_core::domain::PersistedAuthState;
use pulse_core::ports::SessionStore;
use pulse_core::StoreError;
use pulse_shared::constants::PERSISTED_STATE_VERSION;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedAuthState,
    #[serde(default)]
    version: u32,
}

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedAuthState>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let envelope: Envelope =
            serde_json::from_str(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if envelope.version != PERSISTED_STATE_VERSION {
            warn!(
                "Ignoring session record with unsupported version {}",
                envelope.version
            );
            return Ok(None);
        }

        debug!("Loaded session record from {}", self.path.display());
        Ok(Some(envelope.state))
    }

    fn save(&self, state: &PersistedAuthState) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let envelope = Envelope {
            state: state.clone(),
            version: PERSISTED_STATE_VERSION,
        };
        let json = serde_json::to_string(&envelope)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Replace atomically
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }
}
