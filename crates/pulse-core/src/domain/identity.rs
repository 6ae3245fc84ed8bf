// ============================================================================
// Pulse Core - Identity
// File: crates/pulse-core/src/domain/identity.rs
// Description: Caller identity decoded from bearer token claims
// ============================================================================

use pulse_security::TokenClaims;
use serde::{Deserialize, Serialize};

/// Platform role enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    GymAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::GymAdmin => "gym_admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(UserRole::SuperAdmin),
            "gym_admin" => Some(UserRole::GymAdmin),
            _ => None,
        }
    }
}

/// Who the current session belongs to.
///
/// Serialized with the same field names the dashboards persist under `user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: String,
    pub tenant_id: Option<i64>,
    pub plan_name: Option<String>,
    pub subscription_status: Option<String>,
    /// Expiry in Unix seconds
    #[serde(default, rename = "exp", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Identity {
    /// Known platform role, `None` for roles this client does not recognise
    pub fn user_role(&self) -> Option<UserRole> {
        UserRole::from_str(&self.role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.user_role() == Some(UserRole::SuperAdmin)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.expires_at, Some(exp) if exp < now)
    }
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
            tenant_id: claims.tenant_id,
            plan_name: claims.plan_name,
            subscription_status: claims.subscription_status,
            expires_at: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_claims() {
        let claims = TokenClaims::new("owner", "gym_admin")
            .with_tenant(7)
            .with_plan("Pro", "active")
            .expiring_at(2_000_000_000);

        let identity = Identity::from(claims);
        assert_eq!(identity.username, "owner");
        assert_eq!(identity.tenant_id, Some(7));
        assert_eq!(identity.user_role(), Some(UserRole::GymAdmin));
        assert!(!identity.is_super_admin());
        assert!(!identity.is_expired_at(2_000_000_000));
        assert!(identity.is_expired_at(2_000_000_001));
    }

    #[test]
    fn test_unknown_role_is_kept_verbatim() {
        let identity = Identity::from(TokenClaims::new("owner", "owner"));
        assert_eq!(identity.role, "owner");
        assert_eq!(identity.user_role(), None);
    }

    #[test]
    fn test_serialized_field_names() {
        let identity = Identity::from(
            TokenClaims::new("root", "super_admin").expiring_at(1_700_000_000),
        );
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["username"], "root");
        assert_eq!(json["exp"], 1_700_000_000);
        assert!(json["tenant_id"].is_null());
        assert!(identity.is_super_admin());
    }
}
