//! Backend and storage traits (ports)

pub mod auth_backend;
pub mod subscription_backend;
pub mod session_store;

pub use auth_backend::AuthBackend;
pub use session_store::{InMemorySessionStore, SessionStore};
pub use subscription_backend::SubscriptionBackend;

#[cfg(test)]
pub use auth_backend::MockAuthBackend;
#[cfg(test)]
pub use subscription_backend::MockSubscriptionBackend;
