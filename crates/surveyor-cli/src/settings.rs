//! Run configuration: JSON file, then environment, then command-line flags.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use surveyor_core::{SurveyConfig, WindModel};

/// Overrides read from `SURVEYOR_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvOverrides {
    pub seed: Option<u64>,
    pub generations: Option<usize>,
    pub population: Option<usize>,
    pub depot_id: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            seed: lookup("SURVEYOR_SEED").and_then(|s| s.trim().parse().ok()),
            generations: lookup("SURVEYOR_GENERATIONS").and_then(|s| s.trim().parse().ok()),
            population: lookup("SURVEYOR_POPULATION").and_then(|s| s.trim().parse().ok()),
            depot_id: lookup("SURVEYOR_DEPOT_ID")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn apply(&self, config: &mut SurveyConfig) {
        if let Some(seed) = self.seed {
            config.search.seed = Some(seed);
        }
        if let Some(generations) = self.generations {
            config.search.generations = generations;
        }
        if let Some(population) = self.population {
            config.search.population_size = population;
        }
        if let Some(depot_id) = &self.depot_id {
            config.depot_id = depot_id.clone();
        }
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub seed: Option<u64>,
    pub generations: Option<usize>,
    pub population: Option<usize>,
    pub hard_day_limit: bool,
}

impl FlagOverrides {
    pub fn apply(&self, config: &mut SurveyConfig) {
        if let Some(seed) = self.seed {
            config.search.seed = Some(seed);
        }
        if let Some(generations) = self.generations {
            config.search.generations = generations;
        }
        if let Some(population) = self.population {
            config.search.population_size = population;
        }
        if self.hard_day_limit {
            config.day_limit.policy = surveyor_core::DayLimitPolicy::Hard;
        }
    }
}

/// Read the JSON configuration file, or start from defaults.
pub fn load_config(path: Option<&Path>) -> Result<SurveyConfig> {
    let Some(path) = path else {
        return Ok(SurveyConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    SurveyConfig::from_json(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

/// Read a wind table from JSON, or use the built-in forecast.
pub fn load_wind(path: Option<&Path>) -> Result<WindModel> {
    let Some(path) = path else {
        return Ok(WindModel::forecast());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read wind file {}", path.display()))?;
    WindModel::from_json(&raw).with_context(|| format!("invalid wind file {}", path.display()))
}

/// Layer file, environment and flags into one validated configuration.
pub fn resolve(
    config_path: Option<&Path>,
    env_overrides: &EnvOverrides,
    flags: &FlagOverrides,
) -> Result<SurveyConfig> {
    let mut config = load_config(config_path)?;
    env_overrides.apply(&mut config);
    flags.apply(&mut config);
    config.validate().context("configuration rejected")?;
    Ok(config)
}
