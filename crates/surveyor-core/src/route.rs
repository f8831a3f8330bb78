//! Candidate survey route and its day-by-day simulation.
//!
//! A route is validated when it is built (depot at both ends, no repeated
//! waypoint) and then flown once by [`Route::simulate`], which walks every
//! leg through a battery and day-clock state machine and scores the result.

use crate::clock::{absolute_minute, day_of, format_hhmm, minute_of_day};
use crate::config::{DayLimitPolicy, LateFeeAnchor, SurveyConfig};
use crate::cost::compute_cost;
use crate::error::Result;
use crate::events::{CostComponent, PenaltyKind, SimulationEvent};
use crate::leg::Leg;
use crate::models::{Coordinate, RechargeEvent};
use crate::vehicle::Vehicle;
use crate::wind::WindModel;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Read-only inputs shared by every simulation in a run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationContext<'a> {
    pub config: &'a SurveyConfig,
    pub wind: &'a WindModel,
}

impl<'a> SimulationContext<'a> {
    pub fn new(config: &'a SurveyConfig, wind: &'a WindModel) -> Self {
        Self { config, wind }
    }
}

/// Ordering used everywhere fitness is ranked; lower is better and
/// `+inf` sorts last.
pub fn compare_fitness(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

#[derive(Debug, Clone, Serialize)]
pub struct Route {
    waypoints: Vec<Coordinate>,
    legs: Vec<Leg>,
    total_distance_km: f64,
    total_time_min: f64,
    total_cost: f64,
    structural_penalty: f64,
    penalty_score: f64,
    landing_count: u32,
    late_fee_count: u32,
    days_used: u32,
    structurally_valid: bool,
    is_feasible: bool,
    fitness: f64,
    recharge_log: Vec<RechargeEvent>,
    alerts: Vec<String>,
    events: Vec<SimulationEvent>,
    missing_cost_components: Vec<CostComponent>,
    simulated: bool,
}

/// Time budget of a simulated route, split by activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkloadEstimate {
    pub flight_minutes: f64,
    pub photo_minutes: f64,
    pub recharge_minutes: f64,
    pub total_minutes: f64,
    pub operating_minutes_per_day: u32,
    pub days_needed: u32,
}

impl Route {
    /// Build a route and validate its structure. Violations make the route
    /// infeasible immediately; it will never be simulated.
    pub fn new(waypoints: Vec<Coordinate>, config: &SurveyConfig) -> Self {
        let mut route = Self {
            waypoints,
            legs: Vec::new(),
            total_distance_km: 0.0,
            total_time_min: 0.0,
            total_cost: 0.0,
            structural_penalty: 0.0,
            penalty_score: 0.0,
            landing_count: 0,
            late_fee_count: 0,
            days_used: 0,
            structurally_valid: true,
            is_feasible: true,
            fitness: f64::INFINITY,
            recharge_log: Vec::new(),
            alerts: Vec::new(),
            events: Vec::new(),
            missing_cost_components: Vec::new(),
            simulated: false,
        };
        route.validate(config);
        route
    }

    fn validate(&mut self, config: &SurveyConfig) {
        let depot = config.depot_id.as_str();
        let penalties = &config.penalties;

        if self.waypoints.first().map(|c| c.id.as_str()) != Some(depot) {
            self.structural_violation(
                PenaltyKind::MissingDepotStart,
                penalties.missing_depot,
                format!("route does not start at depot {depot}"),
            );
        }
        if self.waypoints.last().map(|c| c.id.as_str()) != Some(depot) {
            self.structural_violation(
                PenaltyKind::MissingDepotEnd,
                penalties.missing_depot,
                format!("route does not end at depot {depot}"),
            );
        }

        let interior = if self.waypoints.len() > 2 {
            &self.waypoints[1..self.waypoints.len() - 1]
        } else {
            &[]
        };
        let mut seen: HashSet<&str> = HashSet::new();
        let mut repeated = Vec::new();
        for coordinate in interior {
            if coordinate.id == depot {
                continue;
            }
            if !seen.insert(coordinate.id.as_str()) {
                repeated.push(coordinate.id.clone());
            }
        }
        for id in repeated {
            self.structural_violation(
                PenaltyKind::DuplicateWaypoint,
                penalties.duplicate_waypoint,
                format!("waypoint {id} is visited more than once"),
            );
        }

        self.penalty_score = self.structural_penalty;
    }

    fn structural_violation(&mut self, kind: PenaltyKind, amount: f64, alert: String) {
        self.structurally_valid = false;
        self.is_feasible = false;
        self.structural_penalty += amount;
        self.alerts.push(alert);
        self.events.push(SimulationEvent::Penalty {
            kind,
            amount,
            day: 0,
        });
    }

    /// Fly the route with a fully charged vehicle.
    pub fn simulate(&mut self, ctx: &SimulationContext<'_>) -> Result<()> {
        let mut vehicle = Vehicle::new(&ctx.config.vehicle);
        self.simulate_with_vehicle(ctx, &mut vehicle)
    }

    /// Fly the route with a caller-provided vehicle (e.g. a partially drained
    /// battery). Structurally invalid routes are left untouched.
    pub fn simulate_with_vehicle(
        &mut self,
        ctx: &SimulationContext<'_>,
        vehicle: &mut Vehicle,
    ) -> Result<()> {
        if !self.structurally_valid {
            self.fitness = f64::INFINITY;
            return Ok(());
        }
        self.reset_outputs();

        let config = ctx.config;
        let schedule = &config.schedule;
        let day_limit = &config.day_limit;
        let speeds = vehicle.valid_speeds();

        let mut clock = Clock {
            minute: schedule.day_start_minute,
            day: 1,
        };
        let mut charged_overage = 0u32;

        for index in 0..self.waypoints.len().saturating_sub(1) {
            let origin = self.waypoints[index].clone();
            let destination = self.waypoints[index + 1].clone();

            self.roll_over(&mut clock, config);

            let speed = select_speed(ctx, vehicle, &speeds, &origin, &destination, clock.minute)?;
            let mut leg = build_leg(ctx, vehicle, &origin, &destination, speed, clock.minute)?;

            if leg.needs_recharge(vehicle.battery_secs()) {
                self.recharge(config, vehicle, &origin, &mut clock);
                self.roll_over(&mut clock, config);
                leg = build_leg(ctx, vehicle, &origin, &destination, speed, clock.minute)?
                    .mark_landed_before();
            }

            if !vehicle.consume(f64::from(leg.battery_cost_seconds)) {
                self.alerts.push(format!(
                    "battery depleted on leg {} ({} -> {})",
                    index + 1,
                    origin.id,
                    destination.id
                ));
                self.events.push(SimulationEvent::BatteryDepleted {
                    leg_index: index,
                    battery_secs: vehicle.battery_secs(),
                });
            }

            clock.minute += leg.flight_minutes() + schedule.photo_stop_minutes();
            self.total_distance_km += leg.distance_km;
            self.total_time_min += f64::from(leg.flight_seconds) / 60.0;

            self.events.push(SimulationEvent::LegFlown {
                leg_index: index,
                origin_id: origin.id.clone(),
                destination_id: destination.id.clone(),
                speed_kmh: leg.speed_kmh,
                day: leg.day,
                departure_minute: leg.departure_minute,
                arrival_minute: leg.arrival_minute(),
                battery_after_secs: vehicle.battery_secs(),
            });

            let leg_day = leg.day;
            let arrival = absolute_minute(leg.day, leg.arrival_minute());
            let day_end = absolute_minute(leg.day, schedule.day_end_minute);
            self.legs.push(leg);

            let days_so_far = day_of(clock.minute);
            if days_so_far > day_limit.max_days {
                match day_limit.policy {
                    DayLimitPolicy::Hard => {
                        self.is_feasible = false;
                        self.add_penalty(PenaltyKind::DayLimitHalt, day_limit.hard_penalty, days_so_far);
                        self.alerts.push(format!(
                            "route exceeds the {}-day limit on day {}; simulation halted",
                            day_limit.max_days, days_so_far
                        ));
                        break;
                    }
                    DayLimitPolicy::Soft => {
                        let overage = days_so_far - day_limit.max_days;
                        if overage > charged_overage {
                            let extra = f64::from(overage - charged_overage)
                                * day_limit.penalty_per_extra_day;
                            charged_overage = overage;
                            self.add_penalty(PenaltyKind::DayLimitExceeded, extra, days_so_far);
                            self.alerts.push(format!(
                                "route exceeds the {}-day limit by {} day(s)",
                                day_limit.max_days, overage
                            ));
                        }
                    }
                }
            }

            if arrival > day_end {
                self.add_penalty(
                    PenaltyKind::LateArrival,
                    config.penalties.late_arrival,
                    leg_day,
                );
                self.alerts.push(format!(
                    "arrival at {} on day {} at {} is after {}",
                    destination.id,
                    leg_day,
                    format_hhmm(minute_of_day(arrival)),
                    format_hhmm(schedule.day_end_minute)
                ));
            }
        }

        let outcome = compute_cost(
            &config.costs,
            self.total_time_min,
            self.landing_count,
            self.late_fee_count,
        );
        self.total_cost = outcome.total();
        if outcome.is_degraded() {
            self.missing_cost_components = outcome.missing().to_vec();
            self.events.push(SimulationEvent::CostDegraded {
                missing: self.missing_cost_components.clone(),
            });
        }

        self.days_used = day_of(clock.minute);
        self.simulated = true;
        self.fitness = if self.is_feasible {
            self.total_cost + self.penalty_score
        } else {
            f64::INFINITY
        };
        Ok(())
    }

    fn reset_outputs(&mut self) {
        self.legs.clear();
        self.total_distance_km = 0.0;
        self.total_time_min = 0.0;
        self.total_cost = 0.0;
        self.penalty_score = self.structural_penalty;
        self.landing_count = 0;
        self.late_fee_count = 0;
        self.days_used = 0;
        self.is_feasible = self.structurally_valid;
        self.fitness = f64::INFINITY;
        self.recharge_log.clear();
        self.alerts.clear();
        self.events.clear();
        self.missing_cost_components.clear();
        self.simulated = false;
    }

    /// Move to the next morning while the current day's window is over and
    /// the day budget allows it.
    fn roll_over(&mut self, clock: &mut Clock, config: &SurveyConfig) {
        let schedule = &config.schedule;
        while clock.minute >= absolute_minute(clock.day, schedule.day_end_minute)
            && clock.day < config.day_limit.max_days
        {
            let from_day = clock.day;
            clock.day += 1;
            clock.minute = clock
                .minute
                .max(absolute_minute(clock.day, schedule.day_start_minute));
            self.events.push(SimulationEvent::DayRollover {
                from_day,
                to_day: clock.day,
                minute: minute_of_day(clock.minute),
            });
        }
    }

    fn recharge(
        &mut self,
        config: &SurveyConfig,
        vehicle: &mut Vehicle,
        at: &Coordinate,
        clock: &mut Clock,
    ) {
        let schedule = &config.schedule;
        let day = day_of(clock.minute);
        let start = minute_of_day(clock.minute);
        let anchor = match schedule.late_fee_anchor {
            LateFeeAnchor::Start => start,
            LateFeeAnchor::End => start + schedule.recharge_minutes,
        };
        let late_fee = anchor >= schedule.late_fee_threshold_minute;

        if late_fee {
            self.late_fee_count += 1;
            self.alerts.push(format!(
                "late recharge at {} on day {} at {}",
                at.id,
                day,
                format_hhmm(start)
            ));
            self.events.push(SimulationEvent::LateFee {
                day,
                anchor_minute: anchor,
                coordinate_id: at.id.clone(),
            });
        }

        self.recharge_log.push(RechargeEvent {
            day,
            minute: start,
            coordinate_id: at.id.clone(),
            late_fee_applied: late_fee,
        });
        self.events.push(SimulationEvent::Recharge {
            day,
            minute: start,
            coordinate_id: at.id.clone(),
            late_fee,
        });

        vehicle.recharge();
        clock.minute += schedule.recharge_minutes;
        self.landing_count += 1;
    }

    fn add_penalty(&mut self, kind: PenaltyKind, amount: f64, day: u32) {
        self.penalty_score += amount;
        self.events.push(SimulationEvent::Penalty { kind, amount, day });
    }

    /// Time budget of the simulated route. Unsimulated routes report zeros.
    pub fn workload_estimate(&self, config: &SurveyConfig) -> WorkloadEstimate {
        let schedule = &config.schedule;
        let flight_minutes = self.total_time_min;
        let photo_minutes = f64::from(schedule.photo_stop_secs) * self.legs.len() as f64 / 60.0;
        let recharge_minutes = f64::from(self.landing_count * schedule.recharge_minutes);
        let total_minutes = flight_minutes + photo_minutes + recharge_minutes;
        let per_day = schedule.operating_minutes();
        let days_needed = if per_day == 0 {
            0
        } else {
            (total_minutes / f64::from(per_day)).ceil() as u32
        };

        WorkloadEstimate {
            flight_minutes,
            photo_minutes,
            recharge_minutes,
            total_minutes,
            operating_minutes_per_day: per_day,
            days_needed,
        }
    }

    pub fn waypoints(&self) -> &[Coordinate] {
        &self.waypoints
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    /// Sum of leg flight times, in minutes.
    pub fn total_time_min(&self) -> f64 {
        self.total_time_min
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn penalty_score(&self) -> f64 {
        self.penalty_score
    }

    pub fn landing_count(&self) -> u32 {
        self.landing_count
    }

    pub fn late_fee_count(&self) -> u32 {
        self.late_fee_count
    }

    pub fn days_used(&self) -> u32 {
        self.days_used
    }

    pub fn is_feasible(&self) -> bool {
        self.is_feasible
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    /// `total_cost + penalty_score`, or `+inf` when infeasible or not yet
    /// simulated.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn recharge_log(&self) -> &[RechargeEvent] {
        &self.recharge_log
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    pub fn missing_cost_components(&self) -> &[CostComponent] {
        &self.missing_cost_components
    }
}

#[derive(Debug, Clone, Copy)]
struct Clock {
    /// Minutes since midnight of day 1
    minute: u32,
    /// Operating day the drone is working on
    day: u32,
}

fn build_leg(
    ctx: &SimulationContext<'_>,
    vehicle: &Vehicle,
    origin: &Coordinate,
    destination: &Coordinate,
    speed_kmh: u32,
    clock_minute: u32,
) -> Result<Leg> {
    let day = day_of(clock_minute);
    let minute = minute_of_day(clock_minute);
    let wind = ctx.wind.sample(day, minute);
    Leg::new(origin, destination, speed_kmh, day, minute, wind, vehicle.profile())
}

/// Pick the speed minimizing `alpha * minutes + beta * battery_percent` among
/// speeds the current battery can cover, fastest first so near-ties keep the
/// faster speed. Falls back to the slowest speed when none fits.
fn select_speed(
    ctx: &SimulationContext<'_>,
    vehicle: &Vehicle,
    speeds: &[u32],
    origin: &Coordinate,
    destination: &Coordinate,
    clock_minute: u32,
) -> Result<u32> {
    let heuristic = &ctx.config.heuristic;
    let battery = vehicle.battery_secs();
    let mut best: Option<(u32, f64)> = None;

    for &speed in speeds.iter().rev() {
        let leg = build_leg(ctx, vehicle, origin, destination, speed, clock_minute)?;
        if leg.needs_recharge(battery) {
            continue;
        }
        let autonomy = vehicle.autonomy(speed)?;
        let minutes = f64::from(leg.flight_seconds) / 60.0;
        let battery_percent = f64::from(leg.battery_cost_seconds) / autonomy * 100.0;
        let score = heuristic.alpha * minutes + heuristic.beta * battery_percent;

        match best {
            Some((_, best_score)) if score >= best_score - heuristic.tie_epsilon => {}
            _ => best = Some((speed, score)),
        }
    }

    Ok(best
        .map(|(speed, _)| speed)
        .or_else(|| speeds.first().copied())
        .unwrap_or(vehicle.profile().min_speed_kmh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MINUTES_PER_DAY;

    const DEPOT: &str = "82821020";

    fn depot() -> Coordinate {
        Coordinate::new(DEPOT, -25.416, -49.273)
    }

    fn point(id: &str, lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(id, lat, lon)
    }

    fn calm_time_only() -> SurveyConfig {
        let mut config = SurveyConfig::default();
        config.heuristic.alpha = 1.0;
        config.heuristic.beta = 0.0;
        config
    }

    #[test]
    fn test_structural_violations_are_penalized_without_simulation() {
        let config = SurveyConfig::default();
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);
        let p = point("1", -25.40, -49.25);

        let mut route = Route::new(vec![p.clone(), depot()], &config);
        assert!(!route.is_feasible());
        assert_eq!(route.penalty_score(), config.penalties.missing_depot);

        route.simulate(&ctx).unwrap();
        assert!(!route.is_simulated());
        assert!(route.legs().is_empty());
        assert_eq!(route.fitness(), f64::INFINITY);
    }

    #[test]
    fn test_duplicate_interior_waypoints_are_infeasible() {
        let config = SurveyConfig::default();
        let p = point("1", -25.40, -49.25);
        let route = Route::new(vec![depot(), p.clone(), p, depot()], &config);
        assert!(!route.is_feasible());
        assert_eq!(route.penalty_score(), config.penalties.duplicate_waypoint);
        assert_eq!(route.fitness(), f64::INFINITY);
    }

    #[test]
    fn test_fitness_is_cost_plus_penalty_when_feasible() {
        let config = SurveyConfig::default();
        let wind = WindModel::forecast();
        let ctx = SimulationContext::new(&config, &wind);
        let mut route = Route::new(
            vec![
                depot(),
                point("1", -25.40, -49.25),
                point("2", -25.43, -49.29),
                depot(),
            ],
            &config,
        );
        route.simulate(&ctx).unwrap();

        assert!(route.is_simulated());
        assert!(route.is_feasible());
        assert_eq!(route.legs().len(), 3);
        assert_eq!(route.days_used(), 1);
        assert!((route.fitness() - (route.total_cost() + route.penalty_score())).abs() < 1e-9);
        for leg in route.legs() {
            assert_eq!(leg.battery_cost_seconds, leg.flight_seconds);
            assert!(leg.speed_kmh % 4 == 0 && (36..=96).contains(&leg.speed_kmh));
        }
    }

    #[test]
    fn test_long_leg_triggers_recharge_before_departure() {
        let config = calm_time_only();
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);
        // ~130 km each way: longer than a full charge even at top speed.
        let far = point("far", -25.416, -47.973);
        let mut route = Route::new(vec![depot(), far, depot()], &config);
        route.simulate(&ctx).unwrap();

        assert!(route.landing_count() >= 1);
        assert_eq!(route.recharge_log().len() as u32, route.landing_count());
        let landed: Vec<&Leg> = route.legs().iter().filter(|leg| leg.landed_before).collect();
        assert_eq!(landed.len() as u32, route.landing_count());
    }

    #[test]
    fn test_recharge_advances_the_clock_before_takeoff() {
        let config = calm_time_only();
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);
        let p = point("1", -25.416, -49.150);
        let mut route = Route::new(vec![depot(), p, depot()], &config);
        let mut drained = Vehicle::with_battery(&config.vehicle, 1.0);
        route.simulate_with_vehicle(&ctx, &mut drained).unwrap();

        let first = &route.legs()[0];
        assert!(first.landed_before);
        assert_eq!(
            first.departure_minute,
            config.schedule.day_start_minute + config.schedule.recharge_minutes
        );
        assert_eq!(route.recharge_log()[0].minute, config.schedule.day_start_minute);
    }

    #[test]
    fn test_recharge_past_day_end_departs_next_morning() {
        let mut config = calm_time_only();
        // The 30-minute recharge ends after this 10-minute window closes.
        config.schedule.day_end_minute = config.schedule.day_start_minute + 10;
        config.schedule.late_fee_threshold_minute = 23 * 60;
        config.day_limit.max_days = 7;
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);

        let mut route = Route::new(
            vec![depot(), point("1", -25.416, -49.150), depot()],
            &config,
        );
        let mut drained = Vehicle::with_battery(&config.vehicle, 1.0);
        route.simulate_with_vehicle(&ctx, &mut drained).unwrap();

        let first = &route.legs()[0];
        assert_eq!(route.recharge_log()[0].day, 1);
        assert_eq!(first.day, 2);
        assert_eq!(first.departure_minute, config.schedule.day_start_minute);
        assert!(first.landed_before);
        assert!(route.events().iter().any(|event| matches!(
            event,
            SimulationEvent::DayRollover {
                from_day: 1,
                to_day: 2,
                ..
            }
        )));
    }

    #[test]
    fn test_speed_ties_keep_the_fastest_speed() {
        let wind = WindModel::calm();
        let waypoints = vec![depot(), point("1", -25.40, -49.25), depot()];

        let mut no_weights = SurveyConfig::default();
        no_weights.heuristic.alpha = 0.0;
        no_weights.heuristic.beta = 0.0;

        let mut wide_epsilon = SurveyConfig::default();
        wide_epsilon.heuristic.tie_epsilon = 1e9;

        for config in [no_weights, wide_epsilon] {
            let mut route = Route::new(waypoints.clone(), &config);
            route
                .simulate(&SimulationContext::new(&config, &wind))
                .unwrap();
            for leg in route.legs() {
                assert_eq!(leg.speed_kmh, config.vehicle.max_speed_kmh);
            }
        }
    }

    #[test]
    fn test_strictly_cheaper_slower_speed_wins() {
        // Battery percent grows with speed, so a battery-only score favors
        // the slowest speed by far more than the tie epsilon.
        let mut config = SurveyConfig::default();
        config.heuristic.alpha = 0.0;
        config.heuristic.beta = 1.0;
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);
        let origin = depot();
        let destination = point("1", -25.416, -49.150);
        let vehicle = Vehicle::new(&config.vehicle);

        let percent = |speed: u32| {
            let leg = build_leg(&ctx, &vehicle, &origin, &destination, speed, 360).unwrap();
            f64::from(leg.battery_cost_seconds) / vehicle.autonomy(speed).unwrap() * 100.0
        };
        let slowest = config.vehicle.min_speed_kmh;
        assert!(percent(slowest) + config.heuristic.tie_epsilon < percent(slowest + 4));

        let speed = select_speed(
            &ctx,
            &vehicle,
            &vehicle.valid_speeds(),
            &origin,
            &destination,
            360,
        )
        .unwrap();
        assert_eq!(speed, slowest);

        let mut route = Route::new(vec![origin, destination, depot()], &config);
        route.simulate(&ctx).unwrap();
        assert!(route.legs().iter().all(|leg| leg.speed_kmh == slowest));
    }

    #[test]
    fn test_late_fee_anchor_end_triggers_earlier_than_start() {
        let wind = WindModel::calm();
        let p = point("1", -25.416, -49.150);

        let mut start_config = calm_time_only();
        // Threshold 06:10: a recharge starting 06:00 is early, finishing 06:30 is late.
        start_config.schedule.late_fee_threshold_minute = 6 * 60 + 10;
        let mut end_config = start_config.clone();
        end_config.schedule.late_fee_anchor = LateFeeAnchor::End;

        let mut by_start = Route::new(vec![depot(), p.clone(), depot()], &start_config);
        by_start
            .simulate_with_vehicle(
                &SimulationContext::new(&start_config, &wind),
                &mut Vehicle::with_battery(&start_config.vehicle, 1.0),
            )
            .unwrap();
        assert_eq!(by_start.late_fee_count(), 0);
        assert!(!by_start.recharge_log()[0].late_fee_applied);

        let mut by_end = Route::new(vec![depot(), p, depot()], &end_config);
        by_end
            .simulate_with_vehicle(
                &SimulationContext::new(&end_config, &wind),
                &mut Vehicle::with_battery(&end_config.vehicle, 1.0),
            )
            .unwrap();
        assert_eq!(by_end.late_fee_count(), 1);
        assert!(by_end.recharge_log()[0].late_fee_applied);
        assert_eq!(
            by_end.total_cost(),
            end_config.costs.late_fee_cost.unwrap_or_default()
        );
    }

    #[test]
    fn test_day_rolls_over_after_operating_window() {
        let mut config = calm_time_only();
        // A 15-minute window forces a new day after almost every leg.
        config.schedule.day_end_minute = config.schedule.day_start_minute + 15;
        config.schedule.late_fee_threshold_minute = 23 * 60;
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);

        let mut route = Route::new(
            vec![
                depot(),
                point("1", -25.416, -49.150),
                point("2", -25.300, -49.150),
                depot(),
            ],
            &config,
        );
        route.simulate(&ctx).unwrap();

        assert!(route.days_used() > 1);
        assert!(route
            .events()
            .iter()
            .any(|event| matches!(event, SimulationEvent::DayRollover { .. })));
        let days: Vec<u32> = route.legs().iter().map(|leg| leg.day).collect();
        assert!(days.windows(2).all(|pair| pair[0] <= pair[1]));
        for leg in route.legs().iter().skip(1) {
            assert!(leg.departure_minute >= config.schedule.day_start_minute);
        }
    }

    #[test]
    fn test_late_arrival_is_penalized() {
        let mut config = calm_time_only();
        config.schedule.day_end_minute = config.schedule.day_start_minute + 5;
        config.day_limit.max_days = 1;
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);

        let mut route = Route::new(
            vec![depot(), point("1", -25.416, -49.150), depot()],
            &config,
        );
        route.simulate(&ctx).unwrap();

        let late_penalties = route
            .events()
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    SimulationEvent::Penalty {
                        kind: PenaltyKind::LateArrival,
                        ..
                    }
                )
            })
            .count();
        assert!(late_penalties >= 1);
        assert!(route.penalty_score() >= config.penalties.late_arrival);
        assert!(route.alerts().iter().any(|alert| alert.contains("after")));
    }

    fn overnight_config(policy: DayLimitPolicy) -> SurveyConfig {
        let mut config = calm_time_only();
        config.schedule.day_end_minute = config.schedule.day_start_minute + 1;
        config.schedule.recharge_minutes = MINUTES_PER_DAY;
        config.day_limit.max_days = 1;
        config.day_limit.policy = policy;
        config
    }

    #[test]
    fn test_hard_day_limit_halts_and_marks_infeasible() {
        let config = overnight_config(DayLimitPolicy::Hard);
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);

        let mut route = Route::new(
            vec![
                depot(),
                point("1", -25.416, -49.150),
                point("2", -25.300, -49.150),
                depot(),
            ],
            &config,
        );
        let mut drained = Vehicle::with_battery(&config.vehicle, 1.0);
        route.simulate_with_vehicle(&ctx, &mut drained).unwrap();

        assert!(!route.is_feasible());
        assert_eq!(route.fitness(), f64::INFINITY);
        assert_eq!(route.legs().len(), 1, "simulation must stop at the violating leg");
        assert!(route.penalty_score() >= config.day_limit.hard_penalty);
    }

    #[test]
    fn test_soft_day_limit_charges_per_extra_day() {
        let config = overnight_config(DayLimitPolicy::Soft);
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);

        let mut route = Route::new(
            vec![depot(), point("1", -25.416, -49.150), depot()],
            &config,
        );
        let mut drained = Vehicle::with_battery(&config.vehicle, 1.0);
        route.simulate_with_vehicle(&ctx, &mut drained).unwrap();

        assert!(route.is_feasible());
        assert_eq!(route.legs().len(), 2);
        let over = route.days_used() - config.day_limit.max_days;
        assert!(over >= 1);
        let day_penalty: f64 = route
            .events()
            .iter()
            .filter_map(|event| match event {
                SimulationEvent::Penalty {
                    kind: PenaltyKind::DayLimitExceeded,
                    amount,
                    ..
                } => Some(*amount),
                _ => None,
            })
            .sum();
        assert_eq!(day_penalty, f64::from(over) * config.day_limit.penalty_per_extra_day);
        assert!(route.fitness().is_finite());
    }

    #[test]
    fn test_missing_cost_rate_is_recorded_as_degraded() {
        let mut config = SurveyConfig::default();
        config.costs.cost_per_minute = None;
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);

        let mut route = Route::new(
            vec![depot(), point("1", -25.40, -49.25), depot()],
            &config,
        );
        route.simulate(&ctx).unwrap();

        assert_eq!(route.missing_cost_components(), &[CostComponent::PerMinute]);
        assert!(route
            .events()
            .iter()
            .any(|event| matches!(event, SimulationEvent::CostDegraded { .. })));
        assert!(route.fitness().is_finite());
    }

    #[test]
    fn test_resimulation_is_idempotent() {
        let config = SurveyConfig::default();
        let wind = WindModel::forecast();
        let ctx = SimulationContext::new(&config, &wind);
        let mut route = Route::new(
            vec![
                depot(),
                point("1", -25.40, -49.25),
                point("2", -25.45, -49.20),
                depot(),
            ],
            &config,
        );
        route.simulate(&ctx).unwrap();
        let first_fitness = route.fitness();
        let first_legs = route.legs().to_vec();

        route.simulate(&ctx).unwrap();
        assert_eq!(route.fitness(), first_fitness);
        assert_eq!(route.legs(), first_legs.as_slice());
    }

    #[test]
    fn test_workload_estimate_adds_stops_and_recharges() {
        let config = SurveyConfig::default();
        let wind = WindModel::calm();
        let ctx = SimulationContext::new(&config, &wind);
        let mut route = Route::new(
            vec![depot(), point("1", -25.40, -49.25), depot()],
            &config,
        );
        route.simulate(&ctx).unwrap();

        let estimate = route.workload_estimate(&config);
        assert!((estimate.photo_minutes - 2.0 * 72.0 / 60.0).abs() < 1e-9);
        assert_eq!(estimate.recharge_minutes, 0.0);
        assert_eq!(estimate.operating_minutes_per_day, 13 * 60);
        assert_eq!(estimate.days_needed, 1);
        assert!(
            (estimate.total_minutes - (estimate.flight_minutes + estimate.photo_minutes)).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_fitness_ordering_puts_infinity_last() {
        let mut values = vec![f64::INFINITY, 3.0, 1.0];
        values.sort_by(|a, b| compare_fitness(*a, *b));
        assert_eq!(values, vec![1.0, 3.0, f64::INFINITY]);
    }
}
