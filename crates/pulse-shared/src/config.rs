//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    AUTH_STORAGE_KEY, DEFAULT_API_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECONDS, DEFAULT_LOG_LEVEL,
    DEFAULT_STORAGE_DIR, SUBSCRIPTION_FRESHNESS_SECONDS,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub subscription: SubscriptionSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Serve logins and subscription status from built-in fixtures
    pub mock: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub storage_dir: String,
    pub storage_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubscriptionSettings {
    pub freshness_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    pub level: String,
    pub json: bool,
    pub log_dir: Option<String>,
}

impl AppConfig {
    /// Load configuration from defaults, optional `config/` files and
    /// `PULSE__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("PULSE_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PULSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize()
    }

    /// Builder preloaded with every default value
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("api.timeout_seconds", DEFAULT_HTTP_TIMEOUT_SECONDS as i64)?
            .set_default("api.mock", false)?
            .set_default("session.storage_dir", DEFAULT_STORAGE_DIR)?
            .set_default("session.storage_key", AUTH_STORAGE_KEY)?
            .set_default(
                "subscription.freshness_seconds",
                SUBSCRIPTION_FRESHNESS_SECONDS as i64,
            )?
            .set_default("telemetry.level", DEFAULT_LOG_LEVEL)?
            .set_default("telemetry.json", false)
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl SessionSettings {
    /// File holding the persisted auth record
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_dir).join(format!("{}.json", self.storage_key))
    }
}

impl SubscriptionSettings {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_seconds)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
                mock: false,
            },
            session: SessionSettings {
                storage_dir: DEFAULT_STORAGE_DIR.to_string(),
                storage_key: AUTH_STORAGE_KEY.to_string(),
            },
            subscription: SubscriptionSettings {
                freshness_seconds: SUBSCRIPTION_FRESHNESS_SECONDS,
            },
            telemetry: TelemetrySettings {
                level: DEFAULT_LOG_LEVEL.to_string(),
                json: false,
                log_dir: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config: AppConfig = AppConfig::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000/api/");
        assert_eq!(config.subscription.freshness_window(), Duration::from_secs(300));
        assert_eq!(
            config.session.storage_path(),
            PathBuf::from(".gympulse").join("auth-storage.json")
        );
        assert!(config.telemetry.log_dir.is_none());
        assert!(!config.api.mock);
    }

    #[test]
    fn test_override_base_url() {
        let config: AppConfig = AppConfig::defaults()
            .unwrap()
            .set_override("api.base_url", "https://api.gympulse.example/")
            .unwrap()
            .set_override("subscription.freshness_seconds", 60)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api.base_url, "https://api.gympulse.example/");
        assert_eq!(config.subscription.freshness_seconds, 60);
    }
}
