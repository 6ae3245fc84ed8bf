// ============================================================================
// Pulse Infrastructure - Offline Backend
// File: crates/pulse-infrastructure/src/offline/backend.rs
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use pulse_core::domain::{
    Credentials, CurrentUsage, FeatureAccess, LoginResponse, PlanDetails, PlanLimit, PlanLimits,
    SubscriptionDetails, SubscriptionStatus,
};
use pulse_core::ports::{AuthBackend, SubscriptionBackend};
use pulse_core::BackendError;
use pulse_security::{decode_claims, JwtIssuer, TokenClaims};
use pulse_shared::utils::now_unix;

const OFFLINE_SECRET: &str = "gympulse-offline";
const TOKEN_LIFETIME_SECONDS: i64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct OfflineAccount {
    pub username: String,
    pub password: String,
    pub role: String,
    pub tenant_id: Option<i64>,
}

impl OfflineAccount {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
        tenant_id: Option<i64>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
            tenant_id,
        }
    }
}

/// Implements both backend ports from in-memory fixtures
pub struct OfflineBackend {
    issuer: JwtIssuer,
    accounts: Vec<OfflineAccount>,
    subscriptions: HashMap<i64, SubscriptionDetails>,
}

impl OfflineBackend {
    pub fn new() -> Self {
        Self {
            issuer: JwtIssuer::new(OFFLINE_SECRET, TOKEN_LIFETIME_SECONDS),
            accounts: Vec::new(),
            subscriptions: HashMap::new(),
        }
    }

    /// Three demo tenants' worth of accounts:
    /// - `owner` / `secret`: Basic plan with the member limit reached
    /// - `trial` / `trial`: trial with 3 days left
    /// - `admin` / `Admin@123`: platform super admin
    pub fn demo() -> Self {
        Self::new()
            .with_account(OfflineAccount::new("owner", "secret", "gym_admin", Some(7)))
            .with_subscription(7, basic_plan_full())
            .with_account(OfflineAccount::new("trial", "trial", "gym_admin", Some(8)))
            .with_subscription(8, trial_plan(3))
            .with_account(OfflineAccount::new("admin", "Admin@123", "super_admin", None))
    }

    pub fn with_account(mut self, account: OfflineAccount) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_subscription(mut self, tenant_id: i64, details: SubscriptionDetails) -> Self {
        self.subscriptions.insert(tenant_id, details);
        self
    }
}

impl Default for OfflineBackend {
    fn default() -> Self {
        Self::demo()
    }
}

fn unauthorized(detail: &str) -> BackendError {
    BackendError::Status {
        status: 401,
        detail: Some(detail.to_string()),
    }
}

#[async_trait]
impl AuthBackend for OfflineBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.username == credentials.username && a.password == credentials.password)
            .ok_or_else(|| unauthorized("Incorrect username or password"))?;

        let mut claims = TokenClaims::new(&account.username, &account.role);
        if let Some(tenant_id) = account.tenant_id {
            claims = claims.with_tenant(tenant_id);
            if let Some(details) = self.subscriptions.get(&tenant_id) {
                let plan = details.plan_name.as_deref().unwrap_or("Trial");
                claims = claims.with_plan(plan, details.status.as_str());
            }
        }

        let access_token = self
            .issuer
            .issue(claims)
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        info!("Offline login for {}", account.username);

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
        })
    }
}

#[async_trait]
impl SubscriptionBackend for OfflineBackend {
    async fn fetch_status(&self, access_token: &str) -> Result<SubscriptionDetails, BackendError> {
        let claims =
            decode_claims(access_token).map_err(|_| unauthorized("Could not validate credentials"))?;
        if claims.is_expired_at(now_unix()) {
            return Err(unauthorized("Could not validate credentials"));
        }

        let tenant_id = claims.tenant_id.ok_or_else(|| BackendError::Status {
            status: 403,
            detail: Some("User must be associated with a tenant".to_string()),
        })?;
        debug!("Offline subscription lookup for tenant {}", tenant_id);

        self.subscriptions
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                detail: Some("No subscription found for tenant".to_string()),
            })
    }
}

fn basic_plan_full() -> SubscriptionDetails {
    SubscriptionDetails {
        has_subscription: true,
        is_active: true,
        status: SubscriptionStatus::Active,
        is_trial: false,
        days_remaining: Some(21),
        plan_name: Some("Basic".to_string()),
        plan: Some(PlanDetails {
            id: 1,
            name: "Basic".to_string(),
            price: 999.0,
        }),
        current_usage: CurrentUsage {
            member_count: 50,
            staff_count: 1,
            plan_count: 2,
        },
        plan_limits: PlanLimits {
            max_members: PlanLimit::Capped(50),
            max_staff: PlanLimit::Capped(2),
            max_plans: PlanLimit::Capped(3),
        },
        features: FeatureAccess {
            whatsapp_enabled: false,
            analytics_enabled: false,
        },
        auto_renew: true,
    }
}

fn trial_plan(days_remaining: i64) -> SubscriptionDetails {
    SubscriptionDetails {
        has_subscription: false,
        is_active: true,
        status: SubscriptionStatus::Trial,
        is_trial: true,
        days_remaining: Some(days_remaining),
        plan_name: Some("Trial".to_string()),
        plan: None,
        current_usage: CurrentUsage {
            member_count: 4,
            staff_count: 1,
            plan_count: 1,
        },
        plan_limits: PlanLimits {
            max_members: PlanLimit::Unlimited,
            max_staff: PlanLimit::Capped(5),
            max_plans: PlanLimit::Unlimited,
        },
        features: FeatureAccess {
            whatsapp_enabled: true,
            analytics_enabled: true,
        },
        auto_renew: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_owner_login() {
        let backend = OfflineBackend::demo();
        let response = backend
            .login(&Credentials::new("owner", "secret"))
            .await
            .unwrap();

        let claims = decode_claims(&response.access_token).unwrap();
        assert_eq!(claims.sub, "owner");
        assert_eq!(claims.tenant_id, Some(7));
        assert_eq!(claims.plan_name.as_deref(), Some("Basic"));
        assert!(!claims.is_expired_at(now_unix()));

        let details = backend.fetch_status(&response.access_token).await.unwrap();
        assert_eq!(details.plan_limits.max_members, PlanLimit::Capped(50));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let backend = OfflineBackend::demo();
        let err = backend
            .login(&Credentials::new("owner", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err.detail(), Some("Incorrect username or password"));
    }

    #[tokio::test]
    async fn test_super_admin_has_no_subscription() {
        let backend = OfflineBackend::demo();
        let response = backend
            .login(&Credentials::new("admin", "Admin@123"))
            .await
            .unwrap();

        let err = backend
            .fetch_status(&response.access_token)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Status {
                status: 403,
                detail: Some("User must be associated with a tenant".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let err = OfflineBackend::demo()
            .fetch_status("not-a-token")
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }
}
