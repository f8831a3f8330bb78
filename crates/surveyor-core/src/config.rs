//! Planner configuration.
//!
//! Every tunable the simulator and the search read lives here. A
//! `SurveyConfig` is built once and passed by reference; re-tuning means
//! building a new value.

use crate::error::{Result, SurveyError};
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Top-level configuration for the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    /// Id of the coordinate every route must start and end at
    pub depot_id: String,
    pub vehicle: VehicleConfig,
    pub schedule: ScheduleConfig,
    pub costs: CostConfig,
    pub day_limit: DayLimitConfig,
    pub penalties: PenaltyConfig,
    pub heuristic: HeuristicConfig,
    pub search: SearchConfig,
}

/// Speed envelope and battery model of the drone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Speed at which the reference autonomy was measured (km/h)
    pub reference_speed_kmh: f64,
    /// Flight time at the reference speed (seconds)
    pub reference_autonomy_secs: f64,
    pub correction_factor: f64,
    pub min_speed_kmh: u32,
    pub max_speed_kmh: u32,
    pub speed_step_kmh: u32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            reference_speed_kmh: 36.0,
            reference_autonomy_secs: 5000.0,
            correction_factor: 0.93,
            min_speed_kmh: 36,
            max_speed_kmh: 96,
            speed_step_kmh: 4,
        }
    }
}

/// Which instant of a recharge is compared against the late-fee threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LateFeeAnchor {
    /// Minute the recharge starts
    #[default]
    Start,
    /// Minute the recharge finishes (start + recharge duration)
    End,
}

/// Daily operating window and fixed stop durations. Times are minutes since
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub day_start_minute: u32,
    pub day_end_minute: u32,
    /// Recharges anchored at or after this minute pay the late fee
    pub late_fee_threshold_minute: u32,
    pub late_fee_anchor: LateFeeAnchor,
    pub recharge_minutes: u32,
    /// Time spent photographing each destination
    pub photo_stop_secs: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_start_minute: 6 * 60,
            day_end_minute: 19 * 60,
            late_fee_threshold_minute: 17 * 60,
            late_fee_anchor: LateFeeAnchor::Start,
            recharge_minutes: 30,
            photo_stop_secs: 72,
        }
    }
}

impl ScheduleConfig {
    /// Photo stop in whole minutes, as added to the clock after each leg.
    pub fn photo_stop_minutes(&self) -> u32 {
        self.photo_stop_secs / 60
    }

    /// Length of the operating window in minutes.
    pub fn operating_minutes(&self) -> u32 {
        self.day_end_minute.saturating_sub(self.day_start_minute)
    }
}

/// Cost rates. A `None` rate is treated as zero and flags the computed cost
/// as degraded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub cost_per_minute: Option<f64>,
    pub recharge_cost: Option<f64>,
    pub late_fee_cost: Option<f64>,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            cost_per_minute: Some(0.0),
            recharge_cost: Some(0.0),
            late_fee_cost: Some(80.0),
        }
    }
}

/// How exceeding `max_days` is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayLimitPolicy {
    /// Penalize each extra day and keep simulating
    #[default]
    Soft,
    /// Mark the route infeasible and stop simulating
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayLimitConfig {
    pub max_days: u32,
    pub policy: DayLimitPolicy,
    pub penalty_per_extra_day: f64,
    pub hard_penalty: f64,
}

impl Default for DayLimitConfig {
    fn default() -> Self {
        Self {
            max_days: 7,
            policy: DayLimitPolicy::Soft,
            penalty_per_extra_day: 10_000.0,
            hard_penalty: 5_000.0,
        }
    }
}

/// Fixed penalties for structural and schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Per missing depot endpoint
    pub missing_depot: f64,
    /// Per repeated interior waypoint
    pub duplicate_waypoint: f64,
    /// Per leg arriving after the daily end time
    pub late_arrival: f64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            missing_depot: 10_000.0,
            duplicate_waypoint: 5_000.0,
            late_arrival: 1_000.0,
        }
    }
}

/// Weights of the per-leg speed selection score
/// `alpha * flight_minutes + beta * battery_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub alpha: f64,
    pub beta: f64,
    /// Scores closer than this are ties, resolved towards the faster speed
    pub tie_epsilon: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            alpha: 3.0,
            beta: 1.0,
            tie_epsilon: 1e-6,
        }
    }
}

/// Genetic search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub elitism: bool,
    pub tournament_size: usize,
    /// Fixed seed for reproducible runs; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            generations: 50,
            crossover_rate: 0.8,
            mutation_rate: 0.05,
            elitism: true,
            tournament_size: 3,
            seed: None,
        }
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            depot_id: "82821020".to_string(),
            vehicle: VehicleConfig::default(),
            schedule: ScheduleConfig::default(),
            costs: CostConfig::default(),
            day_limit: DayLimitConfig::default(),
            penalties: PenaltyConfig::default(),
            heuristic: HeuristicConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl SurveyConfig {
    /// Parse a (possibly partial) JSON document; missing fields keep their
    /// defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations the simulator cannot work with.
    pub fn validate(&self) -> Result<()> {
        let v = &self.vehicle;
        if v.speed_step_kmh == 0 {
            return Err(invalid("vehicle.speed_step_kmh must be positive"));
        }
        if v.min_speed_kmh == 0 || v.min_speed_kmh > v.max_speed_kmh {
            return Err(invalid(
                "vehicle.min_speed_kmh must be positive and not above max_speed_kmh",
            ));
        }
        if v.min_speed_kmh % v.speed_step_kmh != 0 {
            return Err(invalid("vehicle.min_speed_kmh must be a multiple of speed_step_kmh"));
        }
        if !(v.reference_speed_kmh > 0.0 && v.reference_autonomy_secs > 0.0) {
            return Err(invalid("vehicle reference speed and autonomy must be positive"));
        }
        if !(v.correction_factor > 0.0) {
            return Err(invalid("vehicle.correction_factor must be positive"));
        }

        let s = &self.schedule;
        if s.day_start_minute >= s.day_end_minute || s.day_end_minute > MINUTES_PER_DAY {
            return Err(invalid(
                "schedule.day_start_minute must precede day_end_minute within one day",
            ));
        }

        if self.day_limit.max_days == 0 {
            return Err(invalid("day_limit.max_days must be at least 1"));
        }

        let search = &self.search;
        if search.population_size == 0 {
            return Err(invalid("search.population_size must be at least 1"));
        }
        if search.tournament_size == 0 {
            return Err(invalid("search.tournament_size must be at least 1"));
        }
        for (name, rate) in [
            ("search.crossover_rate", search.crossover_rate),
            ("search.mutation_rate", search.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SurveyError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }

        if self.depot_id.is_empty() {
            return Err(invalid("depot_id must not be empty"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> SurveyError {
    SurveyError::InvalidConfig(message.to_string())
}
