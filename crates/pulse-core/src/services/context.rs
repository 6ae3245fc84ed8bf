// ============================================================================
// Pulse Core - Client Context
// File: crates/pulse-core/src/services/context.rs
// ============================================================================
//! Owns the session manager and entitlement service for one front end and
//! wires their lifecycles together.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::Identity;
use crate::error::{AuthError, SubscriptionError};
use crate::ports::{AuthBackend, SessionStore, SubscriptionBackend};
use crate::services::entitlement_service::{EntitlementService, EntitlementView};
use crate::services::session_manager::{SessionManager, SessionView};

pub struct PulseContext {
    session: Arc<SessionManager>,
    entitlements: Arc<EntitlementService>,
}

impl PulseContext {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        subscriptions: Arc<dyn SubscriptionBackend>,
        store: Arc<dyn SessionStore>,
        freshness_window: Duration,
    ) -> Self {
        let session = Arc::new(SessionManager::new(auth, store));
        let entitlements = Arc::new(EntitlementService::new(
            subscriptions,
            session.clone(),
            freshness_window,
        ));
        Self {
            session,
            entitlements,
        }
    }

    /// Restore the persisted session and load entitlements for it.
    ///
    /// Returns whether a valid session was restored.
    pub async fn start(&self) -> bool {
        if !self.session.restore() {
            return false;
        }
        self.load_entitlements().await;
        true
    }

    /// Login, then load entitlements. Entitlement failures are logged and
    /// leave the queries failing closed; they never fail the login.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = self.session.login(username, password).await?;
        self.load_entitlements().await;
        Ok(identity)
    }

    pub fn set_token(&self, token: &str) -> Result<Identity, AuthError> {
        let identity = self.session.set_token(token)?;
        self.entitlements.clear_subscription();
        Ok(identity)
    }

    pub fn logout(&self) {
        self.session.logout();
        self.entitlements.clear_subscription();
        info!("Logged out");
    }

    /// Fetch the subscription unless the cached snapshot is still fresh
    pub async fn ensure_fresh(&self) -> Result<(), SubscriptionError> {
        self.entitlements.fetch_subscription().await
    }

    pub fn session(&self) -> Arc<dyn SessionView> {
        self.session.clone()
    }

    pub fn entitlements(&self) -> Arc<dyn EntitlementView> {
        self.entitlements.clone()
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.session
    }

    pub fn entitlement_service(&self) -> &EntitlementService {
        &self.entitlements
    }

    async fn load_entitlements(&self) {
        // Platform admins are not attached to a tenant and have no subscription
        let has_tenant = self
            .session
            .identity()
            .map_or(false, |identity| identity.tenant_id.is_some());
        if !has_tenant {
            return;
        }
        if let Err(e) = self.ensure_fresh().await {
            warn!("Subscription not loaded: {}", e);
        }
    }
}
