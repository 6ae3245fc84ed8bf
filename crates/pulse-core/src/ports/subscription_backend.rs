//! Subscription status backend trait (port)

use async_trait::async_trait;

use crate::domain::SubscriptionDetails;
use crate::error::BackendError;

/// Reports the subscription of the tenant that owns `access_token`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionBackend: Send + Sync {
    async fn fetch_status(&self, access_token: &str) -> Result<SubscriptionDetails, BackendError>;
}
