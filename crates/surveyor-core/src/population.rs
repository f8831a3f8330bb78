//! A generation of candidate routes.

use crate::config::SurveyConfig;
use crate::error::{Result, SurveyError};
use crate::models::{Coordinate, GenerationStats};
use crate::route::{compare_fitness, Route, SimulationContext};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct Population {
    routes: Vec<Route>,
}

impl Population {
    pub fn from_routes(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Build `config.search.population_size` random routes over `coordinates`.
    ///
    /// Exactly one coordinate must carry the depot id; it is pinned to both
    /// ends and the rest are shuffled in between.
    pub fn random<R: Rng + ?Sized>(
        coordinates: &[Coordinate],
        config: &SurveyConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let (depot, interior) = split_depot(coordinates, &config.depot_id)?;
        let size = config.search.population_size;
        if size == 0 {
            return Err(SurveyError::EmptyPopulation);
        }

        let mut routes = Vec::with_capacity(size);
        for _ in 0..size {
            let mut shuffled = interior.clone();
            shuffled.shuffle(rng);
            let mut waypoints = Vec::with_capacity(shuffled.len() + 2);
            waypoints.push(depot.clone());
            waypoints.extend(shuffled);
            waypoints.push(depot.clone());
            routes.push(Route::new(waypoints, config));
        }
        Ok(Self { routes })
    }

    /// Simulate every route.
    pub fn evaluate(&mut self, ctx: &SimulationContext<'_>) -> Result<()> {
        for route in &mut self.routes {
            route.simulate(ctx)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Index of the lowest-fitness feasible route, or of the lowest-fitness
    /// route overall when none is feasible.
    pub fn best_index(&self) -> Option<usize> {
        let feasible = self
            .routes
            .iter()
            .enumerate()
            .filter(|(_, route)| route.is_feasible())
            .min_by(|(_, a), (_, b)| compare_fitness(a.fitness(), b.fitness()))
            .map(|(index, _)| index);

        feasible.or_else(|| {
            self.routes
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| compare_fitness(a.fitness(), b.fitness()))
                .map(|(index, _)| index)
        })
    }

    pub fn worst_index(&self) -> Option<usize> {
        self.routes
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| compare_fitness(a.fitness(), b.fitness()))
            .map(|(index, _)| index)
    }

    pub fn best(&self) -> Option<&Route> {
        self.best_index().map(|index| &self.routes[index])
    }

    pub fn worst(&self) -> Option<&Route> {
        self.worst_index().map(|index| &self.routes[index])
    }

    /// Snapshot of an evaluated population. The mean only counts finite
    /// fitness values and is `+inf` when there are none.
    pub fn stats(&self, generation: usize) -> Result<GenerationStats> {
        let best = self.best().ok_or(SurveyError::EmptyPopulation)?;
        let worst = self.worst().ok_or(SurveyError::EmptyPopulation)?;

        let finite: Vec<f64> = self
            .routes
            .iter()
            .map(Route::fitness)
            .filter(|fitness| fitness.is_finite())
            .collect();
        let mean_fitness = if finite.is_empty() {
            f64::INFINITY
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        };
        let feasible = self.routes.iter().filter(|route| route.is_feasible()).count();

        Ok(GenerationStats {
            generation,
            best_fitness: best.fitness(),
            worst_fitness: worst.fitness(),
            mean_fitness,
            feasible_fraction: feasible as f64 / self.routes.len() as f64,
            best_distance_km: best.total_distance_km(),
            best_time_min: best.total_time_min(),
        })
    }
}

/// Separate the single depot coordinate from the waypoints to survey.
pub fn split_depot(
    coordinates: &[Coordinate],
    depot_id: &str,
) -> Result<(Coordinate, Vec<Coordinate>)> {
    let depots = coordinates.iter().filter(|c| c.id == depot_id).count();
    match depots {
        0 => return Err(SurveyError::MissingDepot(depot_id.to_string())),
        1 => {}
        count => {
            return Err(SurveyError::DuplicateDepot {
                id: depot_id.to_string(),
                count,
            })
        }
    }

    let mut depot = None;
    let mut interior = Vec::with_capacity(coordinates.len().saturating_sub(1));
    for coordinate in coordinates {
        if coordinate.id == depot_id {
            depot = Some(coordinate.clone());
        } else {
            interior.push(coordinate.clone());
        }
    }
    let depot = depot.ok_or_else(|| SurveyError::MissingDepot(depot_id.to_string()))?;
    Ok((depot, interior))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wind::WindModel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn coordinates() -> Vec<Coordinate> {
        vec![
            Coordinate::new("1", -25.40, -49.25),
            Coordinate::new("82821020", -25.416, -49.273),
            Coordinate::new("2", -25.43, -49.29),
            Coordinate::new("3", -25.45, -49.22),
        ]
    }

    #[test]
    fn test_random_routes_are_closed_at_the_depot() {
        let mut config = SurveyConfig::default();
        config.search.population_size = 8;
        let mut rng = StdRng::seed_from_u64(7);

        let population = Population::random(&coordinates(), &config, &mut rng).unwrap();
        assert_eq!(population.len(), 8);
        for route in population.routes() {
            let ids: Vec<&str> = route.waypoints().iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids.len(), 5);
            assert_eq!(ids[0], "82821020");
            assert_eq!(ids[4], "82821020");
            let mut interior = ids[1..4].to_vec();
            interior.sort();
            assert_eq!(interior, vec!["1", "2", "3"]);
            assert!(route.is_feasible());
        }
    }

    #[test]
    fn test_depot_must_appear_exactly_once() {
        let config = SurveyConfig::default();
        let mut rng = StdRng::seed_from_u64(1);

        let missing = vec![Coordinate::new("1", -25.40, -49.25)];
        assert!(matches!(
            Population::random(&missing, &config, &mut rng),
            Err(SurveyError::MissingDepot(_))
        ));

        let mut doubled = coordinates();
        doubled.push(Coordinate::new("82821020", -25.416, -49.273));
        assert!(matches!(
            Population::random(&doubled, &config, &mut rng),
            Err(SurveyError::DuplicateDepot { count: 2, .. })
        ));
    }

    #[test]
    fn test_best_prefers_feasible_routes() {
        let config = SurveyConfig::default();
        let wind = WindModel::forecast();
        let ctx = SimulationContext::new(&config, &wind);
        let coords = coordinates();
        let depot = coords[1].clone();

        let broken = Route::new(vec![coords[0].clone(), depot.clone()], &config);
        let valid = Route::new(
            vec![depot.clone(), coords[0].clone(), coords[2].clone(), depot],
            &config,
        );
        let mut population = Population::from_routes(vec![broken, valid]);
        population.evaluate(&ctx).unwrap();

        assert_eq!(population.best_index(), Some(1));
        assert_eq!(population.worst_index(), Some(0));

        let stats = population.stats(1).unwrap();
        assert_eq!(stats.generation, 1);
        assert!((stats.feasible_fraction - 0.5).abs() < 1e-9);
        assert_eq!(stats.worst_fitness, f64::INFINITY);
        assert!(stats.best_fitness.is_finite());
        assert!((stats.mean_fitness - stats.best_fitness).abs() < 1e-9);
    }

    #[test]
    fn test_empty_population_has_no_stats() {
        let population = Population::default();
        assert!(population.is_empty());
        assert_eq!(population.best_index(), None);
        assert!(matches!(population.stats(1), Err(SurveyError::EmptyPopulation)));
    }
}
