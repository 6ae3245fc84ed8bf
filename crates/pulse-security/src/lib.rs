//! # Pulse Security
//!
//! Bearer token handling: client-side claim decoding and a development
//! token issuer.

pub mod jwt;

pub use jwt::{decode_claims, JwtIssuer, TokenClaims, TokenError};
