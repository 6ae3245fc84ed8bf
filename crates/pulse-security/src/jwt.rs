//! JWT token handling
//!
//! Clients never verify signatures: the payload is decoded only to learn who
//! the session belongs to and when it expires. Trust decisions stay on the
//! server.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard alphabet, padding optional. Payloads arrive base64url-encoded and
/// are translated to the standard alphabet before decoding.
const CLAIMS_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const REQUIRED_CLAIMS: [&str; 2] = ["sub", "role"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token must have three dot-separated parts")]
    Malformed,
    #[error("Token payload is not valid base64: {0}")]
    InvalidBase64(String),
    #[error("Token payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("Token payload is not a JSON object: {0}")]
    InvalidJson(String),
    #[error("Token is missing claim: {0}")]
    MissingClaim(&'static str),
    #[error("Token creation failed: {0}")]
    CreationError(String),
}

/// Claims carried by access tokens issued by the GymPulse backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: String,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<String>,
    /// Expiry in Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn new(sub: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            role: role.into(),
            tenant_id: None,
            plan_name: None,
            subscription_status: None,
            exp: None,
        }
    }

    pub fn with_tenant(mut self, tenant_id: i64) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_plan(mut self, plan_name: impl Into<String>, status: impl Into<String>) -> Self {
        self.plan_name = Some(plan_name.into());
        self.subscription_status = Some(status.into());
        self
    }

    pub fn expiring_at(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// True only when an `exp` claim exists and lies strictly before `now`
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now)
    }
}

/// Decode the claims segment of a bearer token without verifying it.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenError::Malformed),
    };

    let standard = payload.replace('-', "+").replace('_', "/");
    let bytes = CLAIMS_ENGINE
        .decode(standard.as_bytes())
        .map_err(|e| TokenError::InvalidBase64(e.to_string()))?;
    let json = String::from_utf8(bytes).map_err(|_| TokenError::InvalidUtf8)?;

    let value: serde_json::Value =
        serde_json::from_str(&json).map_err(|e| TokenError::InvalidJson(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| TokenError::InvalidJson("payload is not an object".to_string()))?;

    for claim in REQUIRED_CLAIMS {
        if object.get(claim).map_or(true, |v| v.is_null()) {
            return Err(TokenError::MissingClaim(claim));
        }
    }

    serde_json::from_value(value).map_err(|e| TokenError::InvalidJson(e.to_string()))
}

/// Signs tokens for the offline backend and for tests.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    expiration_seconds: i64,
}

impl JwtIssuer {
    pub fn new(secret: &str, expiration_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            expiration_seconds,
        }
    }

    /// Sign `claims`, stamping `exp` from the issuer's lifetime when unset
    pub fn issue(&self, mut claims: TokenClaims) -> Result<String, TokenError> {
        if claims.exp.is_none() {
            claims.exp = Some(Utc::now().timestamp() + self.expiration_seconds);
        }
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::CreationError(e.to_string()))
    }
}
