//! Surveyor - multi-day drone survey route planner

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use surveyor_core::clock::format_hhmm;
use surveyor_core::{replay, GeneticSearch, Route, SimulationContext, TracingObserver};
use surveyor_cli::loader::{close_route, load_coordinates, MAX_ANALYZE_POINTS};
use surveyor_cli::settings::{self, EnvOverrides, FlagOverrides};
use surveyor_cli::Exporter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for the cheapest survey route and export it
    Optimize {
        #[command(flatten)]
        inputs: Inputs,

        /// Directory for result files
        #[arg(long, default_value = "data/output")]
        output: PathBuf,

        /// Number of generations
        #[arg(long)]
        generations: Option<usize>,

        /// Routes per generation
        #[arg(long)]
        population: Option<usize>,

        /// Random seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Treat the day limit as a hard constraint
        #[arg(long)]
        hard_day_limit: bool,
    },
    /// Simulate the coordinates in file order and estimate the days needed
    Analyze {
        #[command(flatten)]
        inputs: Inputs,
    },
}

#[derive(Args, Debug)]
struct Inputs {
    /// Coordinate CSV (cep, latitude, longitude)
    #[arg(long)]
    coordinates: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON wind table
    #[arg(long)]
    wind: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("surveyor_cli=info".parse()?)
                .add_directive("surveyor_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let env_overrides = EnvOverrides::from_env();

    match cli.command {
        Command::Optimize {
            inputs,
            output,
            generations,
            population,
            seed,
            hard_day_limit,
        } => {
            let flags = FlagOverrides {
                seed,
                generations,
                population,
                hard_day_limit,
            };
            optimize(&inputs, &env_overrides, &flags, output)
        }
        Command::Analyze { inputs } => analyze(&inputs, &env_overrides),
    }
}

fn optimize(
    inputs: &Inputs,
    env_overrides: &EnvOverrides,
    flags: &FlagOverrides,
    output: PathBuf,
) -> Result<()> {
    let config = settings::resolve(inputs.config.as_deref(), env_overrides, flags)?;
    let wind = settings::load_wind(inputs.wind.as_deref())?;
    let coordinates = load_coordinates(&inputs.coordinates)?;
    tracing::info!(
        points = coordinates.len(),
        depot = %config.depot_id,
        seed = ?config.search.seed,
        "loaded survey coordinates"
    );

    let outcome = GeneticSearch::new(&config, &wind, &coordinates)
        .context("failed to start route search")?
        .run()
        .context("route search failed")?;

    let best = &outcome.best;
    replay(best.events(), &mut TracingObserver);
    for alert in best.alerts() {
        tracing::info!(%alert, "route alert");
    }
    tracing::info!(
        fitness = best.fitness(),
        cost = best.total_cost(),
        distance_km = best.total_distance_km(),
        time_min = best.total_time_min(),
        landings = best.landing_count(),
        days = best.days_used(),
        feasible = best.is_feasible(),
        "best route"
    );

    match Exporter::new(output) {
        Ok(exporter) => {
            let written = exporter.export_all(&outcome);
            tracing::info!(
                files = written.len(),
                dir = %exporter.output_dir().display(),
                "export finished"
            );
        }
        Err(e) => tracing::warn!(error = %format!("{e:#}"), "results not exported"),
    }

    Ok(())
}

fn analyze(inputs: &Inputs, env_overrides: &EnvOverrides) -> Result<()> {
    let config = settings::resolve(
        inputs.config.as_deref(),
        env_overrides,
        &FlagOverrides::default(),
    )?;
    let wind = settings::load_wind(inputs.wind.as_deref())?;
    let coordinates = load_coordinates(&inputs.coordinates)?;
    let waypoints = close_route(&coordinates, &config.depot_id, MAX_ANALYZE_POINTS)?;

    let ctx = SimulationContext::new(&config, &wind);
    let mut route = Route::new(waypoints, &config);
    route.simulate(&ctx)?;
    replay(route.events(), &mut TracingObserver);

    let estimate = route.workload_estimate(&config);
    tracing::info!(
        waypoints = route.waypoints().len(),
        legs = route.legs().len(),
        distance_km = route.total_distance_km(),
        landings = route.landing_count(),
        days_simulated = route.days_used(),
        feasible = route.is_feasible(),
        "route simulated"
    );
    tracing::info!(
        flight_min = estimate.flight_minutes,
        photo_min = estimate.photo_minutes,
        recharge_min = estimate.recharge_minutes,
        total_min = estimate.total_minutes,
        window = %format!(
            "{}-{}",
            format_hhmm(config.schedule.day_start_minute),
            format_hhmm(config.schedule.day_end_minute)
        ),
        days_needed = estimate.days_needed,
        max_days = config.day_limit.max_days,
        "workload estimate"
    );
    if estimate.days_needed > config.day_limit.max_days {
        tracing::warn!(
            days_needed = estimate.days_needed,
            max_days = config.day_limit.max_days,
            "survey does not fit in the day limit"
        );
    }

    Ok(())
}
