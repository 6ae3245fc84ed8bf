//! # Pulse Core - Domain Module
//!
//! Session identity and subscription entitlement types.

pub mod identity;
pub mod session;
pub mod subscription;

pub use identity::{Identity, UserRole};
pub use session::{Credentials, LoginResponse, PersistedAuthState, Session};
pub use subscription::{
    CurrentUsage, Feature, FeatureAccess, LimitCheck, LimitKind, PlanDetails, PlanLimit,
    PlanLimits, SubscriptionDetails, SubscriptionStatus, TrialBanner,
};
