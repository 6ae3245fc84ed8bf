//! Application-wide constants

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/";
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

pub const LOGIN_PATH: &str = "auth/login";
pub const SUBSCRIPTION_STATUS_PATH: &str = "subscriptions/me/status";

pub const AUTH_STORAGE_KEY: &str = "auth-storage";
pub const DEFAULT_STORAGE_DIR: &str = ".gympulse";
pub const PERSISTED_STATE_VERSION: u32 = 0;

/// Freshness window for the cached subscription snapshot (5 minutes)
pub const SUBSCRIPTION_FRESHNESS_SECONDS: u64 = 300;

/// Plan limit sentinel meaning "no limit"
pub const UNLIMITED: i64 = -1;

pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";
pub const SUBSCRIPTION_FETCH_FAILED_MESSAGE: &str = "Failed to fetch subscription";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const LOG_FILE_PREFIX: &str = "gympulse.log";
