//! Session, credentials and persisted auth record

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::identity::Identity;

/// An installed, authenticated session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
    /// Bumped on every login, token install, logout and forced expiry
    pub generation: u64,
}

impl Session {
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Username/password pair sent to the authentication backend
#[derive(Clone, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into().trim().to_string(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Successful response from the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Auth record kept across restarts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAuthState {
    pub access_token: Option<String>,
    pub user: Option<Identity>,
    pub is_authenticated: bool,
}

impl PersistedAuthState {
    pub fn authenticated(token: &str, identity: &Identity) -> Self {
        Self {
            access_token: Some(token.to_string()),
            user: Some(identity.clone()),
            is_authenticated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("owner", "secret").validate().is_ok());
        assert!(Credentials::new("   ", "secret").validate().is_err());
        assert!(Credentials::new("owner", "").validate().is_err());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("owner", "secret"));
        assert!(debug.contains("owner"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_persisted_state_layout() {
        let json = serde_json::to_value(PersistedAuthState::default()).unwrap();
        assert!(json["accessToken"].is_null());
        assert!(json["user"].is_null());
        assert_eq!(json["isAuthenticated"], false);
    }
}
