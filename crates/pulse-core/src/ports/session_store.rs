//! Persisted session storage trait (port)
//!
//! Storage is synchronous: logout must be visible before it returns.

use parking_lot::Mutex;

use crate::domain::PersistedAuthState;
use crate::error::StoreError;

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedAuthState>, StoreError>;
    fn save(&self, state: &PersistedAuthState) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store for sessions that must not outlive the process
#[derive(Default)]
pub struct InMemorySessionStore {
    record: Mutex<Option<PersistedAuthState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedAuthState) -> Self {
        Self {
            record: Mutex::new(Some(state)),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<PersistedAuthState>, StoreError> {
        Ok(self.record.lock().clone())
    }

    fn save(&self, state: &PersistedAuthState) -> Result<(), StoreError> {
        *self.record.lock() = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.record.lock() = None;
        Ok(())
    }
}
