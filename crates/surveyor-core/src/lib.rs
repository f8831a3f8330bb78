pub mod clock;
pub mod config;
pub mod cost;
pub mod error;
pub mod events;
pub mod genetic;
pub mod leg;
pub mod models;
pub mod population;
pub mod route;
pub mod spatial;
pub mod vehicle;
pub mod wind;

pub use config::{
    CostConfig, DayLimitConfig, DayLimitPolicy, HeuristicConfig, LateFeeAnchor, PenaltyConfig,
    ScheduleConfig, SearchConfig, SurveyConfig, VehicleConfig,
};
pub use cost::{compute_cost, CostOutcome};
pub use error::{Result, SurveyError};
pub use events::{
    replay, CostComponent, PenaltyKind, SimulationEvent, SimulationObserver, TracingObserver,
};
pub use genetic::{
    order_crossover, order_crossover_at, swap_mutation, tournament_select, GeneticSearch,
    SearchOutcome,
};
pub use leg::Leg;
pub use models::{CardinalDirection, Coordinate, GenerationStats, RechargeEvent, WindSample};
pub use population::Population;
pub use route::{Route, SimulationContext, WorkloadEstimate};
pub use spatial::haversine_km;
pub use vehicle::Vehicle;
pub use wind::WindModel;
