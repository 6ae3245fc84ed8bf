//! Authentication backend trait (port)

use async_trait::async_trait;

use crate::domain::{Credentials, LoginResponse};
use crate::error::BackendError;

/// Exchanges credentials for a bearer token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError>;
}
