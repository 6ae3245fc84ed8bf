//! `POST auth/login` adapter

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use pulse_core::domain::{Credentials, LoginResponse};
use pulse_core::ports::AuthBackend;
use pulse_core::BackendError;
use pulse_shared::constants::LOGIN_PATH;
use pulse_shared::utils::join_url;

use super::{read_json, transport_error};

pub struct HttpAuthBackend {
    client: Client,
    login_url: String,
}

impl HttpAuthBackend {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            login_url: join_url(base_url, LOGIN_PATH),
        }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, BackendError> {
        debug!("POST {}", self.login_url);
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let response = self
            .client
            .post(&self.login_url)
            .form(&form)
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response).await
    }
}
