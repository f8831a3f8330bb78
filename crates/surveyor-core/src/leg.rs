//! One directed flight segment between two waypoints.

use crate::config::VehicleConfig;
use crate::error::{Result, SurveyError};
use crate::models::{Coordinate, WindSample};
use crate::spatial::{bearing_deg, effective_speed_kmh, haversine_km};
use crate::vehicle::is_valid_speed;
use serde::{Deserialize, Serialize};

/// A flight from `origin` to `destination` at a fixed airspeed under a fixed
/// wind sample. All derived figures are computed once in [`Leg::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub speed_kmh: u32,
    pub day: u32,
    /// Minute of day the drone takes off
    pub departure_minute: u32,
    pub wind: WindSample,
    pub distance_km: f64,
    pub heading_deg: f64,
    pub effective_speed_kmh: f64,
    pub flight_seconds: u32,
    /// Always equal to `flight_seconds`
    pub battery_cost_seconds: u32,
    /// A recharge landing happened at `origin` right before this leg
    #[serde(default)]
    pub landed_before: bool,
}

impl Leg {
    pub fn new(
        origin: &Coordinate,
        destination: &Coordinate,
        speed_kmh: u32,
        day: u32,
        departure_minute: u32,
        wind: WindSample,
        vehicle: &VehicleConfig,
    ) -> Result<Self> {
        if !is_valid_speed(vehicle, speed_kmh) {
            return Err(SurveyError::InvalidSpeed {
                speed: speed_kmh,
                min: vehicle.min_speed_kmh,
                max: vehicle.max_speed_kmh,
                step: vehicle.speed_step_kmh,
            });
        }

        let distance_km = haversine_km(
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
        );
        let heading_deg = bearing_deg(
            origin.latitude,
            origin.longitude,
            destination.latitude,
            destination.longitude,
        );
        let effective_speed_kmh = effective_speed_kmh(
            f64::from(speed_kmh),
            heading_deg,
            wind.speed_kmh,
            wind.direction.to_degrees(),
        );

        let flight_seconds = (distance_km / effective_speed_kmh * 3600.0).ceil().max(0.0) as u32;

        Ok(Self {
            origin: origin.clone(),
            destination: destination.clone(),
            speed_kmh,
            day,
            departure_minute,
            wind,
            distance_km,
            heading_deg,
            effective_speed_kmh,
            flight_seconds,
            battery_cost_seconds: flight_seconds,
            landed_before: false,
        })
    }

    /// Whether the remaining battery cannot cover this leg.
    pub fn needs_recharge(&self, battery_secs: f64) -> bool {
        f64::from(self.battery_cost_seconds) > battery_secs
    }

    /// Flight time rounded down to whole minutes, as the clock advances.
    pub fn flight_minutes(&self) -> u32 {
        self.flight_seconds / 60
    }

    /// Minute of day on landing (may exceed 1440 for legs crossing midnight).
    pub fn arrival_minute(&self) -> u32 {
        self.departure_minute + self.flight_minutes()
    }

    pub(crate) fn mark_landed_before(mut self) -> Self {
        self.landed_before = true;
        self
    }
}
