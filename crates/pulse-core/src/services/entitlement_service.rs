// ============================================================================
// Pulse Core - Entitlement Service
// File: crates/pulse-core/src/services/entitlement_service.rs
// ============================================================================
//! Answers "can the current tenant do X / see Y" from a cached subscription
//! snapshot.
//!
//! Only [`EntitlementService::fetch_subscription`] performs I/O. Snapshots
//! are tagged with the session generation they were fetched under; a
//! snapshot from an older generation is never served, so every query fails
//! closed as soon as the session changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::domain::{
    Feature, LimitCheck, LimitKind, SubscriptionDetails, TrialBanner,
};
use crate::error::SubscriptionError;
use crate::ports::SubscriptionBackend;
use crate::services::session_manager::SessionView;

/// Read-only entitlement queries for gating components
pub trait EntitlementView: Send + Sync {
    fn can_add_member(&self) -> bool;
    fn can_add_staff(&self) -> bool;
    fn can_create_plan(&self) -> bool;
    fn has_feature(&self, feature: Feature) -> bool;
    fn is_trial_active(&self) -> bool;
    fn is_subscription_active(&self) -> bool;
    fn needs_upgrade(&self) -> bool;
    fn limit_check(&self, kind: LimitKind) -> LimitCheck;
    fn trial_banner(&self) -> Option<TrialBanner>;
    fn snapshot(&self) -> Option<SubscriptionDetails>;
    fn is_loading(&self) -> bool;
    fn last_error(&self) -> Option<String>;
}

struct CachedSubscription {
    details: SubscriptionDetails,
    fetched_at: Instant,
    fetched_at_utc: DateTime<Utc>,
    generation: u64,
}

#[derive(Default)]
struct EntitlementState {
    cached: Option<CachedSubscription>,
    is_loading: bool,
    error: Option<String>,
}

/// Outcome of the most recent completed fetch, handed to callers that
/// waited on it
#[derive(Default)]
struct FetchRecord {
    outcome: Option<Result<(), SubscriptionError>>,
}

pub struct EntitlementService {
    backend: Arc<dyn SubscriptionBackend>,
    session: Arc<dyn SessionView>,
    freshness_window: Duration,
    state: RwLock<EntitlementState>,
    fetch_lock: tokio::sync::Mutex<FetchRecord>,
    completed_fetches: AtomicU64,
}

impl EntitlementService {
    pub fn new(
        backend: Arc<dyn SubscriptionBackend>,
        session: Arc<dyn SessionView>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            backend,
            session,
            freshness_window,
            state: RwLock::new(EntitlementState::default()),
            fetch_lock: tokio::sync::Mutex::new(FetchRecord::default()),
            completed_fetches: AtomicU64::new(0),
        }
    }

    /// Refresh the snapshot unless it is still fresh.
    ///
    /// Callers arriving while a fetch is in flight wait for it and share its
    /// outcome instead of issuing a second request.
    pub async fn fetch_subscription(&self) -> Result<(), SubscriptionError> {
        // Read before the freshness check so a fetch finishing in between is
        // still seen as completed
        let seen = self.completed_fetches.load(Ordering::SeqCst);
        if self.is_fresh() {
            debug!("Subscription snapshot is fresh, skipping fetch");
            return Ok(());
        }

        let mut record = self.fetch_lock.lock().await;
        if self.completed_fetches.load(Ordering::SeqCst) != seen {
            if let Some(outcome) = record.outcome.clone() {
                debug!("Joined in-flight subscription fetch");
                return outcome;
            }
        }
        if self.is_fresh() {
            debug!("Subscription snapshot became fresh while waiting, skipping fetch");
            return Ok(());
        }

        let result = self.fetch_locked().await;
        record.outcome = Some(result.clone());
        self.completed_fetches.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn fetch_locked(&self) -> Result<(), SubscriptionError> {
        let Some(session) = self.session.current_session() else {
            debug!("No active session, subscription not fetched");
            let failure = SubscriptionError::NotAuthenticated;
            let mut state = self.state.write();
            state.cached = None;
            state.is_loading = false;
            state.error = Some(failure.to_string());
            return Err(failure);
        };

        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }
        debug!("Fetching subscription status for {}", session.identity.username);

        let result = self.backend.fetch_status(&session.token).await;

        let mut state = self.state.write();
        state.is_loading = false;

        if self.session.generation() != session.generation {
            warn!("Session changed during subscription fetch, discarding result");
            return Err(SubscriptionError::Superseded);
        }

        match result {
            Ok(details) => {
                info!(
                    "Subscription loaded (status: {}, active: {})",
                    details.status.as_str(),
                    details.is_active
                );
                state.cached = Some(CachedSubscription {
                    details,
                    fetched_at: Instant::now(),
                    fetched_at_utc: Utc::now(),
                    generation: session.generation,
                });
                state.error = None;
                Ok(())
            }
            Err(e) => {
                error!("Failed to fetch subscription: {}", e);
                let failure = SubscriptionError::from_backend(&e);
                state.cached = None;
                state.error = Some(failure.to_string());
                Err(failure)
            }
        }
    }

    /// Drop the snapshot, error and loading flag
    pub fn clear_subscription(&self) {
        *self.state.write() = EntitlementState::default();
        debug!("Subscription cache cleared");
    }

    pub fn can_add(&self, kind: LimitKind) -> bool {
        self.with_snapshot(|s| s.map_or(false, |s| s.can_add(kind)))
    }

    pub fn can_add_member(&self) -> bool {
        self.can_add(LimitKind::Member)
    }

    pub fn can_add_staff(&self) -> bool {
        self.can_add(LimitKind::Staff)
    }

    pub fn can_create_plan(&self) -> bool {
        self.can_add(LimitKind::Plan)
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.with_snapshot(|s| s.map_or(false, |s| s.has_feature(feature)))
    }

    pub fn is_trial_active(&self) -> bool {
        self.with_snapshot(|s| s.map_or(false, |s| s.is_trial_active()))
    }

    pub fn is_subscription_active(&self) -> bool {
        self.with_snapshot(|s| s.map_or(false, |s| s.is_active))
    }

    pub fn needs_upgrade(&self) -> bool {
        self.with_snapshot(|s| s.map_or(true, |s| s.needs_upgrade()))
    }

    pub fn limit_check(&self, kind: LimitKind) -> LimitCheck {
        self.with_snapshot(|s| match s {
            Some(snapshot) => snapshot.limit_check(kind),
            None => LimitCheck::unavailable(kind),
        })
    }

    pub fn days_remaining(&self) -> Option<u32> {
        self.with_snapshot(|s| s.and_then(|s| s.days_remaining()))
    }

    pub fn trial_banner(&self) -> Option<TrialBanner> {
        self.with_snapshot(|s| {
            s.filter(|s| s.is_trial_active()).map(|s| TrialBanner {
                days_remaining: s.days_remaining().unwrap_or(0),
            })
        })
    }

    pub fn snapshot(&self) -> Option<SubscriptionDetails> {
        self.with_snapshot(|s| s.cloned())
    }

    /// When the current snapshot was fetched
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        let generation = self.session.generation();
        self.state
            .read()
            .cached
            .as_ref()
            .filter(|c| c.generation == generation)
            .map(|c| c.fetched_at_utc)
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    fn is_fresh(&self) -> bool {
        let generation = self.session.generation();
        self.state.read().cached.as_ref().map_or(false, |c| {
            c.generation == generation && c.fetched_at.elapsed() < self.freshness_window
        })
    }

    fn with_snapshot<R>(&self, f: impl FnOnce(Option<&SubscriptionDetails>) -> R) -> R {
        let generation = self.session.generation();
        let state = self.state.read();
        let snapshot = state
            .cached
            .as_ref()
            .filter(|c| c.generation == generation)
            .map(|c| &c.details);
        f(snapshot)
    }
}

impl EntitlementView for EntitlementService {
    fn can_add_member(&self) -> bool {
        EntitlementService::can_add_member(self)
    }

    fn can_add_staff(&self) -> bool {
        EntitlementService::can_add_staff(self)
    }

    fn can_create_plan(&self) -> bool {
        EntitlementService::can_create_plan(self)
    }

    fn has_feature(&self, feature: Feature) -> bool {
        EntitlementService::has_feature(self, feature)
    }

    fn is_trial_active(&self) -> bool {
        EntitlementService::is_trial_active(self)
    }

    fn is_subscription_active(&self) -> bool {
        EntitlementService::is_subscription_active(self)
    }

    fn needs_upgrade(&self) -> bool {
        EntitlementService::needs_upgrade(self)
    }

    fn limit_check(&self, kind: LimitKind) -> LimitCheck {
        EntitlementService::limit_check(self, kind)
    }

    fn trial_banner(&self) -> Option<TrialBanner> {
        EntitlementService::trial_banner(self)
    }

    fn snapshot(&self) -> Option<SubscriptionDetails> {
        EntitlementService::snapshot(self)
    }

    fn is_loading(&self) -> bool {
        EntitlementService::is_loading(self)
    }

    fn last_error(&self) -> Option<String> {
        EntitlementService::last_error(self)
    }
}
