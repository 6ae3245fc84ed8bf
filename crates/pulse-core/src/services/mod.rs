//! Client-side services (session, entitlements, gates)

pub mod session_manager;
pub mod entitlement_service;
pub mod guard;
pub mod context;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::PulseContext;
pub use entitlement_service::{EntitlementService, EntitlementView};
pub use guard::{gate_feature, gate_limit, FeatureGate, LimitGate, RouteDecision, RouteGuard};
pub use session_manager::{SessionManager, SessionView};
