//! Result files written after a search.
//!
//! Every file is overwritten on each run. A failed file is logged and
//! skipped; it never discards the computed route.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use surveyor_core::clock::{format_hhmmss, minute_of_day};
use surveyor_core::{GenerationStats, Route, SearchOutcome};

pub const ROUTE_FILE: &str = "route.csv";
pub const SUMMARY_FILE: &str = "summary.csv";
pub const RECHARGES_FILE: &str = "recharges.csv";
pub const EVOLUTION_FILE: &str = "evolution.csv";
pub const BEST_ROUTE_FILE: &str = "best_route.json";

// Written explicitly when there are no rows to derive headers from.
const ROUTE_HEADER: [&str; 11] = [
    "origin_id",
    "origin_latitude",
    "origin_longitude",
    "day",
    "start",
    "speed_kmh",
    "destination_id",
    "destination_latitude",
    "destination_longitude",
    "landing",
    "end",
];
const RECHARGE_HEADER: [&str; 4] = ["day", "time", "coordinate_id", "late_fee"];
const EVOLUTION_HEADER: [&str; 7] = [
    "generation",
    "best_fitness",
    "worst_fitness",
    "mean_fitness",
    "feasible_fraction",
    "best_distance_km",
    "best_time_min",
];

#[derive(Serialize)]
struct RouteRow<'a> {
    origin_id: &'a str,
    origin_latitude: f64,
    origin_longitude: f64,
    day: u32,
    start: String,
    speed_kmh: u32,
    destination_id: &'a str,
    destination_latitude: f64,
    destination_longitude: f64,
    landing: &'static str,
    end: String,
}

#[derive(Serialize)]
struct RechargeRow<'a> {
    day: u32,
    time: String,
    coordinate_id: &'a str,
    late_fee: &'static str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write every result file, returning the ones that succeeded.
    pub fn export_all(&self, outcome: &SearchOutcome) -> Vec<PathBuf> {
        let attempts = [
            (ROUTE_FILE, self.write_route(&outcome.best)),
            (SUMMARY_FILE, self.write_summary(&outcome.best, &outcome.history)),
            (RECHARGES_FILE, self.write_recharges(&outcome.best)),
            (EVOLUTION_FILE, self.write_evolution(&outcome.history)),
            (BEST_ROUTE_FILE, self.write_best_route(&outcome.best)),
        ];

        let mut written = Vec::new();
        for (name, attempt) in attempts {
            match attempt {
                Ok(path) => {
                    tracing::info!(file = %path.display(), "exported");
                    written.push(path);
                }
                Err(e) => tracing::warn!(file = name, error = %format!("{e:#}"), "export failed"),
            }
        }
        written
    }

    /// One row per leg of the route.
    pub fn write_route(&self, route: &Route) -> Result<PathBuf> {
        let path = self.output_dir.join(ROUTE_FILE);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        if route.legs().is_empty() {
            writer.write_record(ROUTE_HEADER)?;
        }
        for leg in route.legs() {
            writer.serialize(RouteRow {
                origin_id: &leg.origin.id,
                origin_latitude: leg.origin.latitude,
                origin_longitude: leg.origin.longitude,
                day: leg.day,
                start: format_hhmmss(leg.departure_minute),
                speed_kmh: leg.speed_kmh,
                destination_id: &leg.destination.id,
                destination_latitude: leg.destination.latitude,
                destination_longitude: leg.destination.longitude,
                landing: yes_no(leg.landed_before),
                end: format_hhmmss(minute_of_day(leg.arrival_minute())),
            })?;
        }
        writer.flush()?;
        Ok(path)
    }

    /// Parameter/value pairs describing the run.
    pub fn write_summary(&self, route: &Route, history: &[GenerationStats]) -> Result<PathBuf> {
        let path = self.output_dir.join(SUMMARY_FILE);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        let mut rows: Vec<(&str, String)> = vec![
            ("generated_at", Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
            ("total_points", route.waypoints().len().to_string()),
            ("total_distance_km", format!("{:.2}", route.total_distance_km())),
            ("total_time_min", format!("{:.2}", route.total_time_min())),
            ("total_cost", format!("{:.2}", route.total_cost())),
            ("landings", route.landing_count().to_string()),
            ("late_fees", route.late_fee_count().to_string()),
            ("days_used", route.days_used().to_string()),
            ("fitness", format!("{:.2}", route.fitness())),
            ("feasible", yes_no(route.is_feasible()).to_string()),
            ("alerts", route.alerts().join("; ")),
        ];

        if let Some(first) = history.first() {
            let improvement = if first.best_fitness.is_finite() && first.best_fitness > 0.0 {
                (first.best_fitness - route.fitness()) / first.best_fitness * 100.0
            } else {
                0.0
            };
            rows.push(("improvement_pct", format!("{improvement:.1}")));
            rows.push(("generations", history.len().to_string()));
        }

        writer.write_record(["parameter", "value"])?;
        for (key, value) in rows {
            writer.write_record([key, value.as_str()])?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_recharges(&self, route: &Route) -> Result<PathBuf> {
        let path = self.output_dir.join(RECHARGES_FILE);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        if route.recharge_log().is_empty() {
            writer.write_record(RECHARGE_HEADER)?;
        }
        for recharge in route.recharge_log() {
            writer.serialize(RechargeRow {
                day: recharge.day,
                time: format_hhmmss(recharge.minute),
                coordinate_id: &recharge.coordinate_id,
                late_fee: yes_no(recharge.late_fee_applied),
            })?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_evolution(&self, history: &[GenerationStats]) -> Result<PathBuf> {
        let path = self.output_dir.join(EVOLUTION_FILE);
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        if history.is_empty() {
            writer.write_record(EVOLUTION_HEADER)?;
        }
        for stats in history {
            writer.serialize(stats)?;
        }
        writer.flush()?;
        Ok(path)
    }

    pub fn write_best_route(&self, route: &Route) -> Result<PathBuf> {
        let path = self.output_dir.join(BEST_ROUTE_FILE);
        let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, route)?;
        Ok(path)
    }
}
