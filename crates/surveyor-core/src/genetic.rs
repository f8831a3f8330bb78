//! Genetic search over waypoint orderings.
//!
//! Each generation is evaluated, snapshotted into [`GenerationStats`], and
//! replaced by offspring bred with tournament selection, order crossover and
//! swap mutation. The best evaluated route is carried over unchanged when
//! elitism is enabled.
//!
//! All randomness flows through a single [`StdRng`]; two searches built with
//! the same seed and inputs produce the same history.

use crate::config::SurveyConfig;
use crate::cost::missing_components;
use crate::error::{Result, SurveyError};
use crate::models::{Coordinate, GenerationStats};
use crate::population::Population;
use crate::route::{compare_fitness, Route, SimulationContext};
use crate::wind::WindModel;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;

/// Final result of a search run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Best route observed in any evaluated generation
    pub best: Route,
    pub history: Vec<GenerationStats>,
}

pub struct GeneticSearch<'a> {
    config: &'a SurveyConfig,
    ctx: SimulationContext<'a>,
    population: Population,
    rng: StdRng,
    history: Vec<GenerationStats>,
    best: Option<Route>,
}

impl<'a> GeneticSearch<'a> {
    /// Seed a search with a random population over `coordinates`.
    ///
    /// Uses `config.search.seed` when set, OS entropy otherwise.
    pub fn new(
        config: &'a SurveyConfig,
        wind: &'a WindModel,
        coordinates: &[Coordinate],
    ) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.search.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let population = Population::random(coordinates, config, &mut rng)?;
        Self::with_population(config, wind, population, rng)
    }

    /// Start from an existing population and random source.
    pub fn with_population(
        config: &'a SurveyConfig,
        wind: &'a WindModel,
        population: Population,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        if population.is_empty() {
            return Err(SurveyError::EmptyPopulation);
        }

        let missing = missing_components(&config.costs);
        if !missing.is_empty() {
            tracing::warn!(?missing, "cost rates missing; they contribute zero to fitness");
        }

        Ok(Self {
            config,
            ctx: SimulationContext::new(config, wind),
            population,
            rng,
            history: Vec::new(),
            best: None,
        })
    }

    /// Evaluate the current population, record its statistics and replace
    /// it with the next generation.
    pub fn step(&mut self) -> Result<GenerationStats> {
        self.population.evaluate(&self.ctx)?;

        let generation = self.history.len() + 1;
        let stats = self.population.stats(generation)?;
        self.history.push(stats);
        self.remember_best();

        tracing::debug!(
            generation,
            best = stats.best_fitness,
            mean = stats.mean_fitness,
            worst = stats.worst_fitness,
            feasible = stats.feasible_fraction,
            "generation evaluated"
        );

        self.population = self.breed()?;
        Ok(stats)
    }

    /// Run `config.search.generations` generations.
    pub fn run(mut self) -> Result<SearchOutcome> {
        let generations = self.config.search.generations;
        tracing::info!(
            generations,
            population = self.population.len(),
            "starting route search"
        );

        for _ in 0..generations {
            self.step()?;
        }

        if self.best.is_none() {
            self.population.evaluate(&self.ctx)?;
            self.remember_best();
        }
        let best = self.best.ok_or(SurveyError::EmptyPopulation)?;

        tracing::info!(
            fitness = best.fitness(),
            distance_km = best.total_distance_km(),
            days = best.days_used(),
            feasible = best.is_feasible(),
            "route search finished"
        );

        Ok(SearchOutcome {
            best,
            history: self.history,
        })
    }

    fn remember_best(&mut self) {
        let Some(candidate) = self.population.best() else {
            return;
        };
        let improves = match &self.best {
            None => true,
            Some(current) => match (candidate.is_feasible(), current.is_feasible()) {
                (true, false) => true,
                (false, true) => false,
                _ => compare_fitness(candidate.fitness(), current.fitness()).is_lt(),
            },
        };
        if improves {
            self.best = Some(candidate.clone());
        }
    }

    fn breed(&mut self) -> Result<Population> {
        let search = &self.config.search;
        let depot_id = self.config.depot_id.as_str();
        let target = search.population_size;
        let parents = self.population.routes();
        let mut next = Vec::with_capacity(target);

        if search.elitism {
            if let Some(elite) = self.population.best() {
                next.push(elite.clone());
            }
        }

        while next.len() < target {
            let first = tournament_select(parents, search.tournament_size, &mut self.rng)
                .ok_or(SurveyError::EmptyPopulation)?;
            let second = tournament_select(parents, search.tournament_size, &mut self.rng)
                .ok_or(SurveyError::EmptyPopulation)?;

            let mut child = if self.rng.random_bool(search.crossover_rate) {
                order_crossover(first.waypoints(), second.waypoints(), depot_id, &mut self.rng)
            } else {
                first.waypoints().to_vec()
            };
            if self.rng.random_bool(search.mutation_rate) {
                swap_mutation(&mut child, depot_id, &mut self.rng);
            }
            next.push(Route::new(child, self.config));
        }

        Ok(Population::from_routes(next))
    }
}

/// Pick the fittest of `min(k, len)` distinct routes drawn uniformly.
pub fn tournament_select<'r, R: Rng + ?Sized>(
    routes: &'r [Route],
    k: usize,
    rng: &mut R,
) -> Option<&'r Route> {
    if routes.is_empty() {
        return None;
    }
    let amount = k.clamp(1, routes.len());
    index::sample(rng, routes.len(), amount)
        .iter()
        .map(|i| &routes[i])
        .min_by(|a, b| compare_fitness(a.fitness(), b.fitness()))
}

/// Order crossover (OX) over the interior of two depot-closed routes.
///
/// Two cut points `a < b` are drawn over the interior; see
/// [`order_crossover_at`] for how the child is assembled.
pub fn order_crossover<R: Rng + ?Sized>(
    first: &[Coordinate],
    second: &[Coordinate],
    depot_id: &str,
    rng: &mut R,
) -> Vec<Coordinate> {
    let n = first.len();
    if n != second.len() || n < 4 {
        return first.to_vec();
    }
    let last = n - 1;

    let a = rng.random_range(1..last);
    let b = rng.random_range(a + 1..=last);
    order_crossover_at(first, second, a, b, depot_id)
}

/// Order crossover with fixed cut points.
///
/// The slice `[a, b)` of `first` is kept in place. The remaining interior
/// slots, visited from `b` and wrapping past the end of the interior, take
/// `second`'s interior waypoints in their own order, skipping the depot and
/// anything already placed. Slots left empty are repaired from `first`.
pub fn order_crossover_at(
    first: &[Coordinate],
    second: &[Coordinate],
    a: usize,
    b: usize,
    depot_id: &str,
) -> Vec<Coordinate> {
    let n = first.len();
    if n != second.len() || n < 4 || a == 0 || a >= b || b > n - 1 {
        return first.to_vec();
    }
    let last = n - 1;

    let mut child: Vec<Option<Coordinate>> = vec![None; n];
    child[0] = Some(first[0].clone());
    child[last] = Some(first[last].clone());

    let mut used: HashSet<&str> = HashSet::new();
    for position in a..b {
        child[position] = Some(first[position].clone());
        used.insert(first[position].id.as_str());
    }

    let open = (b..last).chain(1..a);
    let mut donors = second[1..last]
        .iter()
        .chain(first[1..last].iter())
        .filter(|coordinate| coordinate.id != depot_id);

    for position in open {
        for donor in donors.by_ref() {
            if used.insert(donor.id.as_str()) {
                child[position] = Some(donor.clone());
                break;
            }
        }
    }

    child
        .into_iter()
        .enumerate()
        .map(|(position, slot)| slot.unwrap_or_else(|| first[position].clone()))
        .collect()
}

/// Swap two distinct interior waypoints, never the depot.
pub fn swap_mutation<R: Rng + ?Sized>(waypoints: &mut [Coordinate], depot_id: &str, rng: &mut R) {
    if waypoints.len() < 2 {
        return;
    }
    let interior: Vec<usize> = (1..waypoints.len() - 1)
        .filter(|&position| waypoints[position].id != depot_id)
        .collect();
    if interior.len() < 2 {
        return;
    }
    let picked = index::sample(rng, interior.len(), 2);
    waypoints.swap(interior[picked.index(0)], interior[picked.index(1)]);
}
