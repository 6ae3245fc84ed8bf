// ============================================================================
// Pulse Core - Session Manager
// File: crates/pulse-core/src/services/session_manager.rs
// ============================================================================
//! Single source of truth for "is this caller authenticated, and as whom".
//!
//! State lives behind a `parking_lot` lock that is never held across an
//! `.await`. Every transition (login, token install, logout, forced expiry)
//! bumps a generation counter so that work started under an older session
//! can recognise it has been superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};
use validator::{Validate, ValidationErrors};

use pulse_security::decode_claims;
use pulse_shared::constants::LOGIN_FAILED_MESSAGE;
use pulse_shared::utils::{mask_token, now_unix};

use crate::domain::{Credentials, Identity, PersistedAuthState, Session};
use crate::error::AuthError;
use crate::ports::{AuthBackend, SessionStore};

/// Read-only view of the session handed to guards and dependent services
pub trait SessionView: Send + Sync {
    /// Local validity check; clears a malformed or expired session
    fn check_auth(&self) -> bool;
    fn is_authenticated(&self) -> bool;
    fn identity(&self) -> Option<Identity>;
    fn current_session(&self) -> Option<Session>;
    fn generation(&self) -> u64;
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    identity: Option<Identity>,
    is_authenticated: bool,
    is_loading: bool,
    error: Option<String>,
}

pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
    generation: AtomicU64,
    login_lock: tokio::sync::Mutex<()>,
}

impl SessionManager {
    /// Create an unauthenticated manager. Call [`SessionManager::restore`] to
    /// pick up a persisted session.
    pub fn new(backend: Arc<dyn AuthBackend>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            store,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
            login_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Rehydrate from the persisted record and validate it locally
    pub fn restore(&self) -> bool {
        let persisted = match self.store.load() {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring unreadable session record: {}", e);
                None
            }
        };

        {
            let mut state = self.state.write();
            *state = SessionState::default();
            if let Some(record) = persisted {
                state.token = record.access_token;
                state.identity = record.user;
            }
            self.bump_generation();
        }

        let restored = self.check_auth();
        debug!("Session restore finished (authenticated: {})", restored);
        restored
    }

    /// Login with username and password
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let credentials = Credentials::new(username, password);
        if let Err(errors) = credentials.validate() {
            let message = validation_message(&errors);
            self.state.write().error = Some(message.clone());
            return Err(AuthError::Validation(message));
        }

        let _in_flight = self.login_lock.lock().await;
        let generation = {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
            self.generation()
        };
        info!("Login attempt for username: {}", credentials.username);

        let outcome = match self.backend.login(&credentials).await {
            Ok(response) => match decode_claims(&response.access_token) {
                Ok(claims) if !claims.is_expired_at(now_unix()) => {
                    Ok((response.access_token, Identity::from(claims)))
                }
                Ok(_) => {
                    warn!("Login returned an already expired token");
                    Err(AuthError::Rejected {
                        message: LOGIN_FAILED_MESSAGE.to_string(),
                    })
                }
                Err(e) => {
                    warn!("Login returned an undecodable token: {}", e);
                    Err(AuthError::Rejected {
                        message: LOGIN_FAILED_MESSAGE.to_string(),
                    })
                }
            },
            Err(e) => {
                warn!("Login failed for {}: {}", credentials.username, e);
                Err(AuthError::from_backend(&e))
            }
        };

        let mut state = self.state.write();
        state.is_loading = false;
        if self.generation() != generation {
            warn!(
                "Session changed during login for {}, discarding result",
                credentials.username
            );
            return Err(AuthError::Superseded);
        }
        match outcome {
            Ok((token, identity)) => {
                self.install_locked(&mut state, token, identity.clone());
                info!(
                    "Login successful for: {} (tenant: {:?})",
                    identity.username, identity.tenant_id
                );
                Ok(identity)
            }
            Err(err) => {
                self.reset_locked(&mut state);
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Drop the session. Visible to every reader once this returns.
    pub fn logout(&self) {
        let mut state = self.state.write();
        self.reset_locked(&mut state);
        state.error = None;
        info!("Session cleared");
    }

    /// Install a token obtained outside of [`SessionManager::login`], e.g. an
    /// OAuth redirect. Invalid tokens leave the current session untouched.
    pub fn set_token(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = decode_claims(token).map_err(|e| {
            warn!("Rejected token {}: {}", mask_token(token), e);
            AuthError::InvalidToken(e)
        })?;
        if claims.is_expired_at(now_unix()) {
            warn!("Rejected expired token {}", mask_token(token));
            return Err(AuthError::TokenExpired);
        }

        let identity = Identity::from(claims);
        let mut state = self.state.write();
        self.install_locked(&mut state, token.to_string(), identity.clone());
        info!("Token installed for: {}", identity.username);
        Ok(identity)
    }

    /// Local validity check. Never touches the network.
    pub fn check_auth(&self) -> bool {
        let now = now_unix();
        let mut state = self.state.write();

        let Some(token) = state.token.clone() else {
            return false;
        };

        match decode_claims(&token) {
            Ok(claims) if claims.is_expired_at(now) => {
                warn!("Token expired, logging out");
                self.reset_locked(&mut state);
                false
            }
            Ok(claims) => {
                state.identity = Some(Identity::from(claims));
                state.is_authenticated = true;
                true
            }
            Err(e) => {
                warn!("Token validation failed: {}", e);
                self.reset_locked(&mut state);
                false
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        let now = now_unix();
        let state = self.state.read();
        state.is_authenticated
            && state
                .identity
                .as_ref()
                .map_or(false, |identity| !identity.is_expired_at(now))
    }

    pub fn identity(&self) -> Option<Identity> {
        if !self.is_authenticated() {
            return None;
        }
        self.state.read().identity.clone()
    }

    pub fn current_session(&self) -> Option<Session> {
        if !self.is_authenticated() {
            return None;
        }
        let state = self.state.read();
        match (&state.token, &state.identity) {
            (Some(token), Some(identity)) => Some(Session {
                token: token.clone(),
                identity: identity.clone(),
                generation: self.generation.load(Ordering::SeqCst),
            }),
            _ => None,
        }
    }

    /// `Bearer <token>` while authenticated
    pub fn authorization_header(&self) -> Option<String> {
        self.current_session().map(|s| s.authorization_header())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// True only while a login request is in flight
    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    /// Message from the last failed login
    pub fn last_error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    fn install_locked(&self, state: &mut SessionState, token: String, identity: Identity) {
        let record = PersistedAuthState::authenticated(&token, &identity);
        state.token = Some(token);
        state.identity = Some(identity);
        state.is_authenticated = true;
        state.error = None;
        self.bump_generation();

        if let Err(e) = self.store.save(&record) {
            error!("Failed to persist session: {}", e);
        }
    }

    fn reset_locked(&self, state: &mut SessionState) {
        state.token = None;
        state.identity = None;
        state.is_authenticated = false;
        self.bump_generation();

        if let Err(e) = self.store.clear() {
            error!("Failed to clear persisted session: {}", e);
        }
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl SessionView for SessionManager {
    fn check_auth(&self) -> bool {
        SessionManager::check_auth(self)
    }

    fn is_authenticated(&self) -> bool {
        SessionManager::is_authenticated(self)
    }

    fn identity(&self) -> Option<Identity> {
        SessionManager::identity(self)
    }

    fn current_session(&self) -> Option<Session> {
        SessionManager::current_session(self)
    }

    fn generation(&self) -> u64 {
        SessionManager::generation(self)
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    ["username", "password"]
        .iter()
        .filter_map(|field| fields.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Please fill in all fields".to_string())
}
