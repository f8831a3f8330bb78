//! Structured records emitted while a route is simulated.
//!
//! The simulator never prints; observers (the CLI, tests) read these from
//! the route after the fact.

use serde::{Deserialize, Serialize};

/// Why a penalty was added to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    MissingDepotStart,
    MissingDepotEnd,
    DuplicateWaypoint,
    LateArrival,
    DayLimitExceeded,
    DayLimitHalt,
}

/// Cost rate that was absent from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostComponent {
    PerMinute,
    Recharge,
    LateFee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimulationEvent {
    DayRollover {
        from_day: u32,
        to_day: u32,
        minute: u32,
    },
    Recharge {
        day: u32,
        minute: u32,
        coordinate_id: String,
        late_fee: bool,
    },
    LateFee {
        day: u32,
        anchor_minute: u32,
        coordinate_id: String,
    },
    LegFlown {
        leg_index: usize,
        origin_id: String,
        destination_id: String,
        speed_kmh: u32,
        day: u32,
        departure_minute: u32,
        arrival_minute: u32,
        battery_after_secs: f64,
    },
    BatteryDepleted {
        leg_index: usize,
        battery_secs: f64,
    },
    Penalty {
        kind: PenaltyKind,
        amount: f64,
        day: u32,
    },
    CostDegraded {
        missing: Vec<CostComponent>,
    },
}

/// Receives events as they are recorded.
pub trait SimulationObserver {
    fn on_event(&mut self, event: &SimulationEvent);
}

/// Replay recorded events into an observer.
pub fn replay<O: SimulationObserver + ?Sized>(events: &[SimulationEvent], observer: &mut O) {
    for event in events {
        observer.on_event(event);
    }
}

/// Forward every event to `tracing` at debug level.
pub struct TracingObserver;

impl SimulationObserver for TracingObserver {
    fn on_event(&mut self, event: &SimulationEvent) {
        match event {
            SimulationEvent::DayRollover { from_day, to_day, minute } => {
                tracing::debug!(from_day, to_day, minute, "day rollover");
            }
            SimulationEvent::Recharge { day, minute, coordinate_id, late_fee } => {
                tracing::debug!(day, minute, coordinate = %coordinate_id, late_fee, "recharge");
            }
            SimulationEvent::LateFee { day, anchor_minute, coordinate_id } => {
                tracing::debug!(day, anchor_minute, coordinate = %coordinate_id, "late fee");
            }
            SimulationEvent::LegFlown {
                leg_index,
                origin_id,
                destination_id,
                speed_kmh,
                day,
                departure_minute,
                arrival_minute,
                battery_after_secs,
            } => {
                tracing::debug!(
                    leg_index,
                    origin = %origin_id,
                    destination = %destination_id,
                    speed_kmh,
                    day,
                    departure_minute,
                    arrival_minute,
                    battery_after_secs,
                    "leg flown"
                );
            }
            SimulationEvent::BatteryDepleted { leg_index, battery_secs } => {
                tracing::warn!(leg_index, battery_secs, "battery depleted");
            }
            SimulationEvent::Penalty { kind, amount, day } => {
                tracing::debug!(?kind, amount, day, "penalty");
            }
            SimulationEvent::CostDegraded { missing } => {
                tracing::warn!(?missing, "cost computed with missing rates");
            }
        }
    }
}
