//! Wind forecast lookup.

use crate::error::Result;
use crate::models::{CardinalDirection, WindSample};
use serde::{Deserialize, Serialize};

/// Number of 3-hour buckets per forecast day (06h, 09h, 12h, 15h, 18h, 21h).
pub const BUCKETS_PER_DAY: usize = 6;

const FIRST_BUCKET_HOUR: u32 = 6;
const BUCKET_HOURS: u32 = 3;

/// Static per-day wind table. Day 1 is the first row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindModel {
    days: Vec<[WindSample; BUCKETS_PER_DAY]>,
}

impl Default for WindModel {
    fn default() -> Self {
        Self::forecast()
    }
}

impl WindModel {
    /// A table without any day; every query returns neutral wind.
    pub fn calm() -> Self {
        Self { days: Vec::new() }
    }

    /// Load a table from JSON (`{"days": [[{"speed_kmh": .., "direction": ".."}, ..], ..]}`).
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The seven-day survey forecast.
    pub fn forecast() -> Self {
        use CardinalDirection::*;

        let rows: [[(f64, CardinalDirection); BUCKETS_PER_DAY]; 7] = [
            [(17.0, Ene), (18.0, E), (19.0, E), (19.0, E), (20.0, E), (20.0, E)],
            [(20.0, E), (19.0, E), (16.0, E), (19.0, E), (21.0, E), (21.0, E)],
            [(15.0, Ene), (17.0, Ne), (8.0, Ne), (20.0, E), (16.0, E), (15.0, Ene)],
            [(8.0, Ene), (11.0, Ene), (8.0, Ne), (11.0, E), (11.0, E), (11.0, E)],
            [(3.0, Wsw), (3.0, Wsw), (7.0, Wsw), (7.0, Ssw), (10.0, E), (11.0, E)],
            [(4.0, Ne), (5.0, Ene), (4.0, Ne), (8.0, E), (15.0, E), (15.0, E)],
            [(6.0, Ne), (8.0, Ne), (14.0, Ne), (16.0, Ne), (13.0, Ene), (10.0, Ene)],
        ];

        let days = rows
            .iter()
            .map(|row| row.map(|(speed, direction)| WindSample::new(speed, direction)))
            .collect();
        Self { days }
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Wind for a 1-based day at a minute of day. Days outside the table get
    /// neutral wind.
    pub fn sample(&self, day: u32, minute_of_day: u32) -> WindSample {
        let Some(row) = (day as usize)
            .checked_sub(1)
            .and_then(|index| self.days.get(index))
        else {
            return WindSample::NEUTRAL;
        };
        row[bucket_index(minute_of_day)]
    }
}

/// Map a minute of day onto its 3-hour bucket. Anything at or after 21:00,
/// or before 06:00, belongs to the last bucket.
pub fn bucket_index(minute_of_day: u32) -> usize {
    let hour = minute_of_day / 60;
    if hour < FIRST_BUCKET_HOUR {
        return BUCKETS_PER_DAY - 1;
    }
    let bucket = ((hour - FIRST_BUCKET_HOUR) / BUCKET_HOURS) as usize;
    bucket.min(BUCKETS_PER_DAY - 1)
}
