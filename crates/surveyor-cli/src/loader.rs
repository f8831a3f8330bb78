//! Coordinate CSV loading.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use surveyor_core::population::split_depot;
use surveyor_core::Coordinate;

/// Interior points kept when `analyze` has to close an open route.
pub const MAX_ANALYZE_POINTS: usize = 30;

/// Load coordinates from a CSV file with a `cep` (or `id`), `latitude` and
/// `longitude` header.
pub fn load_coordinates(path: &Path) -> Result<Vec<Coordinate>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open coordinates file {}", path.display()))?;
    read_coordinates(file)
        .with_context(|| format!("failed to read coordinates from {}", path.display()))
}

pub fn read_coordinates<R: Read>(reader: R) -> Result<Vec<Coordinate>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut coordinates = Vec::new();
    for (row, record) in rdr.deserialize::<Coordinate>().enumerate() {
        // Row 1 is the header.
        let coordinate = record.with_context(|| format!("invalid coordinate on row {}", row + 2))?;
        coordinates.push(coordinate);
    }

    if coordinates.is_empty() {
        bail!("no coordinates found");
    }
    Ok(coordinates)
}

/// Use the file order as a route. If it is not already closed at the depot,
/// pin the depot at both ends around the first `max_points` other points.
pub fn close_route(
    coordinates: &[Coordinate],
    depot_id: &str,
    max_points: usize,
) -> Result<Vec<Coordinate>> {
    let closed = coordinates.len() >= 2
        && coordinates.first().map(|c| c.id.as_str()) == Some(depot_id)
        && coordinates.last().map(|c| c.id.as_str()) == Some(depot_id);
    if closed {
        return Ok(coordinates.to_vec());
    }

    let (depot, interior) = split_depot(coordinates, depot_id)?;
    let mut route = Vec::with_capacity(interior.len().min(max_points) + 2);
    route.push(depot.clone());
    route.extend(interior.into_iter().take(max_points));
    route.push(depot);
    Ok(route)
}
