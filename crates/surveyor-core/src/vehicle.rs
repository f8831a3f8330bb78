//! Drone battery and speed model.

use crate::config::VehicleConfig;
use crate::error::{Result, SurveyError};

/// A drone with a battery measured in seconds of flight.
///
/// Each simulation owns its own `Vehicle`; the battery is never shared.
#[derive(Debug, Clone)]
pub struct Vehicle {
    profile: VehicleConfig,
    battery_secs: f64,
}

impl Vehicle {
    /// Create a vehicle with a full battery.
    pub fn new(profile: &VehicleConfig) -> Self {
        let full = full_capacity_of(profile);
        Self {
            profile: *profile,
            battery_secs: full,
        }
    }

    /// Create a vehicle whose battery starts at `battery_secs`.
    pub fn with_battery(profile: &VehicleConfig, battery_secs: f64) -> Self {
        Self {
            profile: *profile,
            battery_secs,
        }
    }

    pub fn profile(&self) -> &VehicleConfig {
        &self.profile
    }

    /// Whether `speed_kmh` is a step multiple inside the speed envelope.
    pub fn is_valid_speed(&self, speed_kmh: u32) -> bool {
        is_valid_speed(&self.profile, speed_kmh)
    }

    /// Flight time in seconds achievable at a constant speed.
    ///
    /// `A(v) = reference_autonomy * (reference_speed / v)^2 * correction_factor`
    pub fn autonomy(&self, speed_kmh: u32) -> Result<f64> {
        autonomy(&self.profile, speed_kmh)
    }

    /// All valid speeds, ascending.
    pub fn valid_speeds(&self) -> Vec<u32> {
        valid_speeds(&self.profile)
    }

    /// Battery capacity, defined at the most economical speed.
    pub fn full_capacity(&self) -> f64 {
        full_capacity_of(&self.profile)
    }

    pub fn battery_secs(&self) -> f64 {
        self.battery_secs
    }

    /// Drain the battery. Returns false once the level drops below zero.
    pub fn consume(&mut self, seconds: f64) -> bool {
        self.battery_secs -= seconds;
        self.battery_secs >= 0.0
    }

    pub fn recharge(&mut self) {
        self.battery_secs = self.full_capacity();
    }
}

pub fn is_valid_speed(profile: &VehicleConfig, speed_kmh: u32) -> bool {
    profile.speed_step_kmh > 0
        && speed_kmh >= profile.min_speed_kmh
        && speed_kmh <= profile.max_speed_kmh
        && speed_kmh % profile.speed_step_kmh == 0
}

pub fn autonomy(profile: &VehicleConfig, speed_kmh: u32) -> Result<f64> {
    if !is_valid_speed(profile, speed_kmh) {
        return Err(SurveyError::InvalidSpeed {
            speed: speed_kmh,
            min: profile.min_speed_kmh,
            max: profile.max_speed_kmh,
            step: profile.speed_step_kmh,
        });
    }
    Ok(raw_autonomy(profile, speed_kmh))
}

pub fn valid_speeds(profile: &VehicleConfig) -> Vec<u32> {
    if profile.speed_step_kmh == 0 {
        return Vec::new();
    }
    let first = profile.min_speed_kmh.div_ceil(profile.speed_step_kmh) * profile.speed_step_kmh;
    (first..=profile.max_speed_kmh)
        .step_by(profile.speed_step_kmh as usize)
        .collect()
}

fn full_capacity_of(profile: &VehicleConfig) -> f64 {
    raw_autonomy(profile, profile.min_speed_kmh)
}

fn raw_autonomy(profile: &VehicleConfig, speed_kmh: u32) -> f64 {
    let ratio = profile.reference_speed_kmh / f64::from(speed_kmh);
    profile.reference_autonomy_secs * ratio.powi(2) * profile.correction_factor
}
