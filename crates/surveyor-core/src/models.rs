//! Core data models for the survey planner.

use crate::error::SurveyError;
use crate::spatial::normalize_deg;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A point the drone must photograph, identified by its postal code.
///
/// Equality and hashing only consider `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "cep")]
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 16-point compass rose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardinalDirection {
    #[default]
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

/// Angular width of one compass point.
pub const COMPASS_STEP_DEG: f64 = 22.5;

impl CardinalDirection {
    /// All points, clockwise from north.
    pub const ALL: [CardinalDirection; 16] = [
        Self::N,
        Self::Nne,
        Self::Ne,
        Self::Ene,
        Self::E,
        Self::Ese,
        Self::Se,
        Self::Sse,
        Self::S,
        Self::Ssw,
        Self::Sw,
        Self::Wsw,
        Self::W,
        Self::Wnw,
        Self::Nw,
        Self::Nnw,
    ];

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|direction| *direction == self)
            .unwrap_or(0)
    }

    /// Compass angle in degrees (N = 0, E = 90).
    pub fn to_degrees(self) -> f64 {
        self.index() as f64 * COMPASS_STEP_DEG
    }

    /// Nearest compass point to an angle in degrees.
    pub fn from_degrees(angle: f64) -> Self {
        let idx = ((normalize_deg(angle) + COMPASS_STEP_DEG / 2.0) / COMPASS_STEP_DEG) as usize % 16;
        Self::ALL[idx]
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::Nne => "NNE",
            Self::Ne => "NE",
            Self::Ene => "ENE",
            Self::E => "E",
            Self::Ese => "ESE",
            Self::Se => "SE",
            Self::Sse => "SSE",
            Self::S => "S",
            Self::Ssw => "SSW",
            Self::Sw => "SW",
            Self::Wsw => "WSW",
            Self::W => "W",
            Self::Wnw => "WNW",
            Self::Nw => "NW",
            Self::Nnw => "NNW",
        }
    }
}

impl fmt::Display for CardinalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for CardinalDirection {
    type Err = SurveyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|direction| direction.abbreviation() == upper)
            .ok_or_else(|| SurveyError::UnknownDirection(s.to_string()))
    }
}

/// Wind at a given day and time bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    pub speed_kmh: f64,
    /// Direction the wind blows towards
    pub direction: CardinalDirection,
}

impl WindSample {
    pub const NEUTRAL: WindSample = WindSample {
        speed_kmh: 0.0,
        direction: CardinalDirection::N,
    };

    pub fn new(speed_kmh: f64, direction: CardinalDirection) -> Self {
        Self {
            speed_kmh,
            direction,
        }
    }
}

/// A landing to swap batteries before a leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RechargeEvent {
    pub day: u32,
    /// Minute of day the recharge started
    pub minute: u32,
    pub coordinate_id: String,
    pub late_fee_applied: bool,
}

/// Aggregate fitness figures for one evaluated generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// 1-based generation number
    pub generation: usize,
    pub best_fitness: f64,
    pub worst_fitness: f64,
    pub mean_fitness: f64,
    /// Share of feasible routes, in `[0, 1]`
    pub feasible_fraction: f64,
    pub best_distance_km: f64,
    pub best_time_min: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::angular_difference_deg;
    use std::collections::HashSet;

    #[test]
    fn test_coordinates_compare_by_id() {
        let a = Coordinate::new("80000000", -25.0, -49.0);
        let b = Coordinate::new("80000000", -26.0, -50.0);
        assert_eq!(a, b);

        let set: HashSet<Coordinate> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_cardinal_angles() {
        assert_eq!(CardinalDirection::N.to_degrees(), 0.0);
        assert_eq!(CardinalDirection::Ene.to_degrees(), 67.5);
        assert_eq!(CardinalDirection::E.to_degrees(), 90.0);
        assert_eq!(CardinalDirection::Nnw.to_degrees(), 337.5);
    }

    #[test]
    fn test_from_degrees_snaps_to_nearest_point() {
        assert_eq!(CardinalDirection::from_degrees(0.0), CardinalDirection::N);
        assert_eq!(CardinalDirection::from_degrees(11.0), CardinalDirection::N);
        assert_eq!(CardinalDirection::from_degrees(11.25), CardinalDirection::Nne);
        assert_eq!(CardinalDirection::from_degrees(355.0), CardinalDirection::N);
        assert_eq!(CardinalDirection::from_degrees(-90.0), CardinalDirection::W);
        assert_eq!(CardinalDirection::from_degrees(202.5), CardinalDirection::Ssw);
    }

    #[test]
    fn test_angle_round_trip_stays_within_one_point() {
        let mut angle = 0.0;
        while angle < 360.0 {
            let snapped = CardinalDirection::from_degrees(angle).to_degrees();
            assert!(
                angular_difference_deg(snapped, angle) <= COMPASS_STEP_DEG,
                "angle {angle} snapped to {snapped}"
            );
            angle += 0.7;
        }

        for direction in CardinalDirection::ALL {
            assert_eq!(CardinalDirection::from_degrees(direction.to_degrees()), direction);
        }
    }

    #[test]
    fn test_parse_and_serialize_abbreviations() {
        assert_eq!("wsw".parse::<CardinalDirection>().unwrap(), CardinalDirection::Wsw);
        assert!(matches!(
            "XYZ".parse::<CardinalDirection>(),
            Err(SurveyError::UnknownDirection(ref raw)) if raw == "XYZ"
        ));

        let json = serde_json::to_string(&CardinalDirection::Ene).unwrap();
        assert_eq!(json, "\"ENE\"");
        let back: CardinalDirection = serde_json::from_str("\"SSW\"").unwrap();
        assert_eq!(back, CardinalDirection::Ssw);
    }
}
