// ============================================================================
// Pulse Core - Subscription Snapshot
// File: crates/pulse-core/src/domain/subscription.rs
// Description: Tenant subscription status, usage, limits and feature flags
// ============================================================================

use std::fmt;

use pulse_shared::constants::UNLIMITED;
use serde::{Deserialize, Serialize};

/// Subscription status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Suspended,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Suspended => "suspended",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "trial" => Some(SubscriptionStatus::Trial),
            "active" => Some(SubscriptionStatus::Active),
            "expired" => Some(SubscriptionStatus::Expired),
            "suspended" => Some(SubscriptionStatus::Suspended),
            "cancelled" => Some(SubscriptionStatus::Cancelled),
            _ => None,
        }
    }
}

/// A plan cap. On the wire `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum PlanLimit {
    Unlimited,
    Capped(u64),
}

impl PlanLimit {
    /// Whether one more item fits on top of `usage`
    pub fn allows(&self, usage: u64) -> bool {
        match self {
            PlanLimit::Unlimited => true,
            PlanLimit::Capped(max) => usage < *max,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, PlanLimit::Unlimited)
    }
}

impl TryFrom<i64> for PlanLimit {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            UNLIMITED => Ok(PlanLimit::Unlimited),
            v if v >= 0 => Ok(PlanLimit::Capped(v as u64)),
            v => Err(format!("invalid plan limit {}", v)),
        }
    }
}

impl From<PlanLimit> for i64 {
    fn from(limit: PlanLimit) -> Self {
        match limit {
            PlanLimit::Unlimited => UNLIMITED,
            PlanLimit::Capped(max) => max as i64,
        }
    }
}

impl fmt::Display for PlanLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanLimit::Unlimited => write!(f, "unlimited"),
            PlanLimit::Capped(max) => write!(f, "{}", max),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUsage {
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub staff_count: u64,
    #[serde(default)]
    pub plan_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub max_members: PlanLimit,
    pub max_staff: PlanLimit,
    pub max_plans: PlanLimit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAccess {
    #[serde(default)]
    pub whatsapp_enabled: bool,
    #[serde(default)]
    pub analytics_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDetails {
    pub id: i64,
    pub name: String,
    pub price: f64,
}

/// Premium features gated by plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    WhatsApp,
    Analytics,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::WhatsApp => "whatsapp",
            Feature::Analytics => "analytics",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Feature::WhatsApp => "WhatsApp Integration",
            Feature::Analytics => "Advanced Analytics",
        }
    }
}

/// Resources counted against plan limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    Member,
    Staff,
    Plan,
}

impl LimitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitKind::Member => "member",
            LimitKind::Staff => "staff",
            LimitKind::Plan => "plan",
        }
    }

    /// Label used in gate titles
    pub fn label(&self) -> &'static str {
        match self {
            LimitKind::Member => "Member",
            LimitKind::Staff => "Staff",
            LimitKind::Plan => "Membership Plan",
        }
    }

    fn reached_message(&self, current: u64, max: PlanLimit) -> String {
        match self {
            LimitKind::Member => format!(
                "Member limit reached ({}/{}). Upgrade to add more members.",
                current, max
            ),
            LimitKind::Staff => format!(
                "Staff limit reached ({}/{}). Upgrade to add more staff.",
                current, max
            ),
            LimitKind::Plan => format!(
                "Plan limit reached ({}/{}). Upgrade to create more plans.",
                current, max
            ),
        }
    }
}

/// Snapshot of the tenant subscription as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionDetails {
    #[serde(default)]
    pub has_subscription: bool,
    pub is_active: bool,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub is_trial: bool,
    #[serde(default)]
    pub days_remaining: Option<i64>,
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub plan: Option<PlanDetails>,
    pub current_usage: CurrentUsage,
    pub plan_limits: PlanLimits,
    #[serde(default)]
    pub features: FeatureAccess,
    #[serde(default)]
    pub auto_renew: bool,
}

impl SubscriptionDetails {
    pub fn usage(&self, kind: LimitKind) -> u64 {
        match kind {
            LimitKind::Member => self.current_usage.member_count,
            LimitKind::Staff => self.current_usage.staff_count,
            LimitKind::Plan => self.current_usage.plan_count,
        }
    }

    pub fn limit(&self, kind: LimitKind) -> PlanLimit {
        match kind {
            LimitKind::Member => self.plan_limits.max_members,
            LimitKind::Staff => self.plan_limits.max_staff,
            LimitKind::Plan => self.plan_limits.max_plans,
        }
    }

    pub fn can_add(&self, kind: LimitKind) -> bool {
        self.limit(kind).allows(self.usage(kind))
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::WhatsApp => self.features.whatsapp_enabled,
            Feature::Analytics => self.features.analytics_enabled,
        }
    }

    pub fn is_trial_active(&self) -> bool {
        self.status == SubscriptionStatus::Trial && self.is_active
    }

    pub fn needs_upgrade(&self) -> bool {
        self.is_trial || self.status == SubscriptionStatus::Expired
    }

    /// Days left, negative server values clamped to zero
    pub fn days_remaining(&self) -> Option<u32> {
        self.days_remaining
            .map(|days| days.clamp(0, u32::MAX as i64) as u32)
    }

    pub fn limit_check(&self, kind: LimitKind) -> LimitCheck {
        let current = self.usage(kind);
        let max = self.limit(kind);
        let allowed = max.allows(current);
        LimitCheck {
            kind,
            allowed,
            current,
            max: Some(max),
            message: (!allowed).then(|| kind.reached_message(current, max)),
        }
    }
}

/// Outcome of asking whether one more item of `kind` may be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitCheck {
    pub kind: LimitKind,
    pub allowed: bool,
    pub current: u64,
    /// `None` when no subscription snapshot is available
    pub max: Option<PlanLimit>,
    pub message: Option<String>,
}

impl LimitCheck {
    /// Denial used while no snapshot is loaded
    pub fn unavailable(kind: LimitKind) -> Self {
        Self {
            kind,
            allowed: false,
            current: 0,
            max: None,
            message: Some(format!(
                "{} limit unavailable. Subscription status has not been loaded.",
                kind.label()
            )),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self.max, Some(PlanLimit::Unlimited))
    }
}

/// Trial reminder shown while a trial subscription is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialBanner {
    pub days_remaining: u32,
}

impl TrialBanner {
    pub fn message(&self) -> String {
        let unit = if self.days_remaining == 1 { "day" } else { "days" };
        format!(
            "You are currently on a trial with {} {} remaining.",
            self.days_remaining, unit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(json: serde_json::Value) -> SubscriptionDetails {
        serde_json::from_value(json).unwrap()
    }

    fn sample(max_members: i64, member_count: u64) -> SubscriptionDetails {
        details(serde_json::json!({
            "has_subscription": true,
            "is_active": true,
            "status": "active",
            "is_trial": false,
            "days_remaining": 20,
            "plan_name": "Basic",
            "current_usage": { "member_count": member_count, "staff_count": 1, "plan_count": 3 },
            "plan_limits": { "max_members": max_members, "max_staff": 2, "max_plans": 3 },
            "features": { "whatsapp_enabled": false, "analytics_enabled": true },
            "auto_renew": true
        }))
    }

    #[test]
    fn test_unlimited_sentinel() {
        for usage in [0, 1, 50, u64::MAX] {
            assert!(sample(-1, 0).plan_limits.max_members.allows(usage));
        }
        assert!(sample(-1, u64::MAX).can_add(LimitKind::Member));
    }

    #[test]
    fn test_capped_limits() {
        assert!(sample(50, 49).can_add(LimitKind::Member));
        assert!(!sample(50, 50).can_add(LimitKind::Member));
        assert!(!sample(0, 0).can_add(LimitKind::Member));
        assert!(sample(50, 0).can_add(LimitKind::Staff));
        assert!(!sample(50, 0).can_add(LimitKind::Plan));
    }

    #[test]
    fn test_invalid_negative_limit_rejected() {
        let result = serde_json::from_value::<PlanLimits>(serde_json::json!({
            "max_members": -2, "max_staff": 1, "max_plans": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result = serde_json::from_value::<SubscriptionStatus>(serde_json::json!("paused"));
        assert!(result.is_err());
        assert_eq!(SubscriptionStatus::from_str("cancelled"), Some(SubscriptionStatus::Cancelled));
    }

    #[test]
    fn test_limit_check_message() {
        let check = sample(50, 50).limit_check(LimitKind::Member);
        assert!(!check.allowed);
        assert_eq!(check.current, 50);
        assert_eq!(check.max, Some(PlanLimit::Capped(50)));
        assert_eq!(
            check.message.as_deref(),
            Some("Member limit reached (50/50). Upgrade to add more members.")
        );

        let plan = sample(50, 0).limit_check(LimitKind::Plan);
        assert_eq!(
            plan.message.as_deref(),
            Some("Plan limit reached (3/3). Upgrade to create more plans.")
        );

        let unlimited = sample(-1, 900).limit_check(LimitKind::Member);
        assert!(unlimited.allowed);
        assert!(unlimited.is_unlimited());
        assert!(unlimited.message.is_none());
    }

    #[test]
    fn test_features_and_upgrade() {
        let snapshot = sample(50, 10);
        assert!(snapshot.has_feature(Feature::Analytics));
        assert!(!snapshot.has_feature(Feature::WhatsApp));
        assert!(!snapshot.needs_upgrade());
        assert!(!snapshot.is_trial_active());
    }

    #[test]
    fn test_days_remaining_clamped() {
        let mut snapshot = sample(50, 10);
        snapshot.days_remaining = Some(-3);
        assert_eq!(snapshot.days_remaining(), Some(0));
        snapshot.days_remaining = None;
        assert_eq!(snapshot.days_remaining(), None);
    }

    #[test]
    fn test_minimal_payload_defaults() {
        let snapshot = details(serde_json::json!({
            "is_active": true,
            "status": "trial",
            "current_usage": {},
            "plan_limits": { "max_members": -1, "max_staff": 5, "max_plans": -1 }
        }));
        assert!(snapshot.is_trial_active());
        assert!(!snapshot.has_feature(Feature::WhatsApp));
        assert_eq!(snapshot.current_usage, CurrentUsage::default());
        assert_eq!(snapshot.plan_name, None);
    }

    #[test]
    fn test_trial_banner_message() {
        assert_eq!(
            TrialBanner { days_remaining: 1 }.message(),
            "You are currently on a trial with 1 day remaining."
        );
        assert_eq!(
            TrialBanner { days_remaining: 6 }.message(),
            "You are currently on a trial with 6 days remaining."
        );
    }
}
