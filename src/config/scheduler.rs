//! Scheduler configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::metrics::DEFAULT_METRICS_WINDOW;
use crate::core::policy::{PlanLimit, PlanSpec, Tier};
use crate::core::scheduler::SchedulerLimits;

/// Per-tier override of the built-in plan table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOverride {
    /// Maximum concurrent jobs for the tier; `None` means unlimited.
    pub max_concurrent: Option<u32>,
    /// Priority weight, higher = more priority.
    pub priority: u8,
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_metrics_window() -> u32 {
    DEFAULT_METRICS_WINDOW
}

/// Root scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum jobs in flight across all tenants.
    pub global_cap: u32,
    /// Scheduler loop tick interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Moving-average window for per-tier duration metrics.
    #[serde(default = "default_metrics_window")]
    pub metrics_window: u32,
    /// Per-tier plan overrides; tiers not listed keep the built-in defaults.
    #[serde(default)]
    pub plans: HashMap<Tier, PlanOverride>,
}

impl SchedulerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.global_cap == 0 {
            return Err("global_cap must be greater than 0".into());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than 0".into());
        }
        if self.metrics_window == 0 {
            return Err("metrics_window must be greater than 0".into());
        }
        for (tier, plan) in &self.plans {
            if plan.max_concurrent == Some(0) {
                return Err(format!("plan for {tier:?} has max_concurrent 0"));
            }
        }
        Ok(())
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Capacity limits derived from this configuration.
    #[must_use]
    pub fn limits(&self) -> SchedulerLimits {
        SchedulerLimits {
            global_cap: self.global_cap,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        }
    }

    /// Plan-table overrides in the policy's representation.
    #[must_use]
    pub fn plan_overrides(&self) -> HashMap<Tier, PlanSpec> {
        self.plans
            .iter()
            .map(|(tier, plan)| {
                (
                    *tier,
                    PlanSpec {
                        limit: plan
                            .max_concurrent
                            .map_or(PlanLimit::Unlimited, PlanLimit::Limited),
                        priority: plan.priority,
                    },
                )
            })
            .collect()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            global_cap: 50,
            tick_interval_ms: default_tick_interval_ms(),
            metrics_window: default_metrics_window(),
            plans: HashMap::new(),
        }
    }
}
