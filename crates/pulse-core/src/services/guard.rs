//! Route, feature and limit gates evaluated against the session and
//! entitlement views.

use tracing::debug;

use crate::domain::{Feature, LimitKind, UserRole};
use crate::services::entitlement_service::EntitlementView;
use crate::services::session_manager::SessionView;

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

const UPGRADE_PROMPT: &str = "This feature is available on paid plans. Upgrade to unlock.";

/// Outcome of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    RedirectToLogin,
    RedirectHome,
    Forbidden,
    NotFound,
}

/// Navigation guard for one front end.
///
/// Every route that is not public requires an authenticated session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    public: Vec<&'static str>,
    protected: Vec<&'static str>,
    required_role: Option<&'static str>,
}

impl RouteGuard {
    pub fn new(public: Vec<&'static str>, protected: Vec<&'static str>) -> Self {
        Self {
            public,
            protected,
            required_role: None,
        }
    }

    /// GymPulse tenant dashboard
    pub fn gym_dashboard() -> Self {
        Self::new(
            vec![LOGIN_ROUTE],
            vec![
                "/",
                "/members",
                "/finances",
                "/analytics",
                "/plans",
                "/settings",
                "/subscription",
            ],
        )
    }

    /// AdminPulse platform console, super admins only
    pub fn admin_console() -> Self {
        Self::new(
            vec![LOGIN_ROUTE],
            vec!["/", "/gyms", "/subscriptions", "/owners", "/support", "/settings"],
        )
        .require_role(UserRole::SuperAdmin.as_str())
    }

    pub fn require_role(mut self, role: &'static str) -> Self {
        self.required_role = Some(role);
        self
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.iter().any(|route| route_matches(route, path))
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|route| route_matches(route, path))
    }

    pub fn decide(&self, session: &dyn SessionView, path: &str) -> RouteDecision {
        let authenticated = session.check_auth();

        let decision = if self.is_public(path) {
            if authenticated {
                RouteDecision::RedirectHome
            } else {
                RouteDecision::Render
            }
        } else if !authenticated {
            RouteDecision::RedirectToLogin
        } else if !self.role_allowed(session) {
            RouteDecision::Forbidden
        } else if self.is_protected(path) {
            RouteDecision::Render
        } else {
            RouteDecision::NotFound
        };

        debug!("Route {} -> {:?}", path, decision);
        decision
    }

    fn role_allowed(&self, session: &dyn SessionView) -> bool {
        match self.required_role {
            None => true,
            Some(role) => session.identity().map_or(false, |identity| identity.role == role),
        }
    }
}

/// `/` matches only itself; other routes match on whole path segments
fn route_matches(route: &str, path: &str) -> bool {
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    if route == HOME_ROUTE {
        return path == HOME_ROUTE || path.is_empty();
    }
    match path.strip_prefix(route) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Whether gated content may be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureGate {
    Allowed,
    /// Nothing loaded yet and a fetch is in flight
    Pending,
    Locked { title: String, prompt: String },
}

pub fn gate_feature(entitlements: &dyn EntitlementView, feature: Feature) -> FeatureGate {
    if entitlements.has_feature(feature) {
        return FeatureGate::Allowed;
    }
    if entitlements.snapshot().is_none() && entitlements.is_loading() {
        return FeatureGate::Pending;
    }
    FeatureGate::Locked {
        title: feature.title().to_string(),
        prompt: UPGRADE_PROMPT.to_string(),
    }
}

/// Whether a create action may proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitGate {
    Proceed,
    Blocked { title: String, message: String },
}

pub fn gate_limit(entitlements: &dyn EntitlementView, kind: LimitKind) -> LimitGate {
    let check = entitlements.limit_check(kind);
    if check.allowed {
        return LimitGate::Proceed;
    }
    let label = kind.label();
    LimitGate::Blocked {
        title: format!("{} Limit Reached", label),
        message: check.message.unwrap_or_else(|| {
            format!("You've reached your {} limit.", label.to_lowercase())
        }),
    }
}
