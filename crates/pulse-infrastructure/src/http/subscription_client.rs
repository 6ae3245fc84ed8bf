//! `GET subscriptions/me/status` adapter

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use pulse_core::domain::SubscriptionDetails;
use pulse_core::ports::SubscriptionBackend;
use pulse_core::BackendError;
use pulse_shared::constants::SUBSCRIPTION_STATUS_PATH;
use pulse_shared::utils::join_url;

use super::{read_json, transport_error};

pub struct HttpSubscriptionBackend {
    client: Client,
    status_url: String,
}

impl HttpSubscriptionBackend {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            status_url: join_url(base_url, SUBSCRIPTION_STATUS_PATH),
        }
    }
}

#[async_trait]
impl SubscriptionBackend for HttpSubscriptionBackend {
    async fn fetch_status(&self, access_token: &str) -> Result<SubscriptionDetails, BackendError> {
        debug!("GET {}", self.status_url);
        let response = self
            .client
            .get(&self.status_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response).await
    }
}
