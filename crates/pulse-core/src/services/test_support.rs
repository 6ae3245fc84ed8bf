//! Token and snapshot fixtures for service tests

use pulse_security::{JwtIssuer, TokenClaims};
use pulse_shared::utils::now_unix;

use crate::domain::SubscriptionDetails;

pub fn issue_token(claims: TokenClaims) -> String {
    JwtIssuer::new("test-secret", 3600).issue(claims).unwrap()
}

/// Gym owner on tenant 7, valid for an hour
pub fn owner_token() -> String {
    issue_token(
        TokenClaims::new("owner", "owner")
            .with_tenant(7)
            .with_plan("Pro", "active")
            .expiring_at(now_unix() + 3600),
    )
}

pub fn expired_token() -> String {
    issue_token(TokenClaims::new("owner", "owner").expiring_at(now_unix() - 60))
}

pub fn subscription(
    status: &str,
    max_members: i64,
    member_count: u64,
) -> SubscriptionDetails {
    serde_json::from_value(serde_json::json!({
        "has_subscription": true,
        "is_active": status == "active" || status == "trial",
        "status": status,
        "is_trial": status == "trial",
        "days_remaining": 5,
        "plan_name": "Pro",
        "current_usage": { "member_count": member_count, "staff_count": 2, "plan_count": 1 },
        "plan_limits": { "max_members": max_members, "max_staff": 5, "max_plans": -1 },
        "features": { "whatsapp_enabled": true, "analytics_enabled": false },
        "auto_renew": false
    }))
    .unwrap()
}
