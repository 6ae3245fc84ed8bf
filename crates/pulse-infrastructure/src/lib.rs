//! # Pulse Infrastructure
//!
//! HTTP, storage and offline implementations of the core ports (adapters).

pub mod http;
pub mod storage;
pub mod offline;

pub use http::{build_client, HttpAuthBackend, HttpSubscriptionBackend};
pub use offline::OfflineBackend;
pub use storage::FileSessionStore;
