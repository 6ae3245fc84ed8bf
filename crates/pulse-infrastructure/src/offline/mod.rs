//! Offline backend serving fixture accounts, for demos and local use
//! without a running API.

mod backend;

pub use backend::{OfflineAccount, OfflineBackend};
