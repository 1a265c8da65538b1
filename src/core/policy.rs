//! Subscription plan policy: concurrency limits and priority weights per tier.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Subscription tier of a tenant.
///
/// Unknown tier strings deserialize to [`Tier::Free`], the most restrictive
/// plan, so a policy-lookup miss can never reject a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Entry paid plan.
    Basic,
    /// Mid paid plan.
    Premium,
    /// High-volume plan.
    Enterprise,
    /// No per-tenant concurrency cap.
    Unlimited,
    /// Free plan, most restrictive. Declared last: `#[serde(other)]` is only
    /// accepted on the final variant. Order carries no semantics; limits and
    /// priorities live in [`PlanPolicy`].
    #[serde(other)]
    Free,
}

impl Tier {
    /// All known tiers, used to pre-seed per-tier tables.
    pub const ALL: [Self; 5] = [
        Self::Free,
        Self::Basic,
        Self::Premium,
        Self::Enterprise,
        Self::Unlimited,
    ];
}

/// Maximum concurrent jobs allowed for a tenant on a given plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanLimit {
    /// At most this many jobs in flight for the tenant.
    Limited(u32),
    /// No per-tenant cap; only the global cap applies.
    Unlimited,
}

impl PlanLimit {
    /// Whether `active` jobs leave headroom under this limit.
    #[must_use]
    pub fn allows(self, active: u32) -> bool {
        match self {
            Self::Limited(max) => active < max,
            Self::Unlimited => true,
        }
    }
}

/// Limit and priority weight for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSpec {
    /// Concurrency cap for tenants on this tier.
    pub limit: PlanLimit,
    /// Priority weight, higher wins queue position.
    pub priority: u8,
}

/// Pure lookup table mapping tiers to concurrency limits and priorities.
///
/// No state beyond the table itself; lookups have no side effects and no
/// error conditions. A tier missing from the table resolves to the most
/// restrictive limit and the lowest priority.
#[derive(Debug, Clone)]
pub struct PlanPolicy {
    plans: HashMap<Tier, PlanSpec>,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        let mut plans = HashMap::new();
        plans.insert(
            Tier::Free,
            PlanSpec {
                limit: PlanLimit::Limited(1),
                priority: 0,
            },
        );
        plans.insert(
            Tier::Basic,
            PlanSpec {
                limit: PlanLimit::Limited(3),
                priority: 1,
            },
        );
        plans.insert(
            Tier::Premium,
            PlanSpec {
                limit: PlanLimit::Limited(10),
                priority: 2,
            },
        );
        plans.insert(
            Tier::Enterprise,
            PlanSpec {
                limit: PlanLimit::Limited(25),
                priority: 3,
            },
        );
        plans.insert(
            Tier::Unlimited,
            PlanSpec {
                limit: PlanLimit::Unlimited,
                priority: 4,
            },
        );
        Self { plans }
    }
}

impl PlanPolicy {
    /// Build the default policy with per-tier overrides applied on top.
    #[must_use]
    pub fn with_overrides(overrides: &HashMap<Tier, PlanSpec>) -> Self {
        let mut policy = Self::default();
        for (tier, spec) in overrides {
            policy.plans.insert(*tier, *spec);
        }
        policy
    }

    /// Concurrency limit for a tier.
    #[must_use]
    pub fn limit(&self, tier: Tier) -> PlanLimit {
        self.plans
            .get(&tier)
            .map_or(PlanLimit::Limited(1), |spec| spec.limit)
    }

    /// Priority weight for a tier, higher = more priority.
    #[must_use]
    pub fn priority(&self, tier: Tier) -> u8 {
        self.plans.get(&tier).map_or(0, |spec| spec.priority)
    }
}
