//! Route cost from flight time, landings and late fees.

use crate::config::CostConfig;
use crate::events::CostComponent;
use serde::{Deserialize, Serialize};

/// Result of a cost computation. A missing rate contributes zero and makes
/// the outcome `Degraded` so callers can decide whether to trust it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CostOutcome {
    Complete {
        total: f64,
    },
    Degraded {
        total: f64,
        missing: Vec<CostComponent>,
    },
}

impl CostOutcome {
    pub fn total(&self) -> f64 {
        match self {
            CostOutcome::Complete { total } | CostOutcome::Degraded { total, .. } => *total,
        }
    }

    pub fn missing(&self) -> &[CostComponent] {
        match self {
            CostOutcome::Complete { .. } => &[],
            CostOutcome::Degraded { missing, .. } => missing,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, CostOutcome::Degraded { .. })
    }
}

/// Rates absent from configuration, in a stable order.
pub fn missing_components(costs: &CostConfig) -> Vec<CostComponent> {
    let mut missing = Vec::new();
    if costs.cost_per_minute.is_none() {
        missing.push(CostComponent::PerMinute);
    }
    if costs.recharge_cost.is_none() {
        missing.push(CostComponent::Recharge);
    }
    if costs.late_fee_cost.is_none() {
        missing.push(CostComponent::LateFee);
    }
    missing
}

/// `time * per_minute + landings * recharge + late_fees * late_fee`.
pub fn compute_cost(
    costs: &CostConfig,
    total_time_min: f64,
    landing_count: u32,
    late_fee_count: u32,
) -> CostOutcome {
    let total = total_time_min * costs.cost_per_minute.unwrap_or(0.0)
        + f64::from(landing_count) * costs.recharge_cost.unwrap_or(0.0)
        + f64::from(late_fee_count) * costs.late_fee_cost.unwrap_or(0.0);

    let missing = missing_components(costs);
    if missing.is_empty() {
        CostOutcome::Complete { total }
    } else {
        CostOutcome::Degraded { total, missing }
    }
}
