//! HTTP adapters for the GymPulse REST API

mod auth_client;
mod subscription_client;

pub use auth_client::HttpAuthBackend;
pub use subscription_client::HttpSubscriptionBackend;

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use pulse_core::BackendError;

/// Shared client for both backends
pub fn build_client(timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| BackendError::Transport(e.to_string()))
}

/// FastAPI error body. `detail` is a string for handled errors and a list
/// for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

pub(crate) fn transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Transport("request timed out".to_string())
    } else {
        BackendError::Transport(error.to_string())
    }
}

/// Decode a success body or map an error status to [`BackendError::Status`]
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| d.as_str().map(str::to_string));
        debug!("Backend returned {} (detail: {:?})", status, detail);
        return Err(BackendError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}
