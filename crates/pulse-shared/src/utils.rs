//! Utility functions

use chrono::Utc;

/// Current time as Unix seconds
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Shorten a bearer token so it can appear in logs
pub fn mask_token(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((idx, _)) => format!("{}***", &token[..idx]),
        None => "***".to_string(),
    }
}

/// Join an API base URL and a relative endpoint path with exactly one slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
