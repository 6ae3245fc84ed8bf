//! # Pulse Core
//!
//! Domain types, ports, and the session and entitlement services shared by
//! the GymPulse dashboard and the AdminPulse console.

pub mod domain;
pub mod services;
pub mod ports;
pub mod error;

// Re-export domain types
pub use domain::*;
pub use error::{AuthError, BackendError, StoreError, SubscriptionError};
pub use services::{
    gate_feature, gate_limit, EntitlementService, EntitlementView, FeatureGate, LimitGate,
    PulseContext, RouteDecision, RouteGuard, SessionManager, SessionView,
};
