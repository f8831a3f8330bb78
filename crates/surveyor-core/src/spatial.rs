//! Spatial math for leg distances, headings and wind-adjusted ground speed.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Floor applied to ground speed when a headwind cancels the airspeed.
pub const MIN_GROUND_SPEED_KMH: f64 = 0.1;

/// Calculate distance between two points in kilometers using Haversine formula.
///
/// This is the standard formula for calculating great-circle distance
/// between two points on a sphere given their latitudes and longitudes.
///
/// # Arguments
/// * `lat1`, `lon1` - First point coordinates in decimal degrees
/// * `lat2`, `lon2` - Second point coordinates in decimal degrees
///
/// # Returns
/// Distance in kilometers
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Calculate initial bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Initial bearing in degrees, normalized to `[0, 360)`.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    normalize_deg(bearing(lat1, lon1, lat2, lon2).to_degrees())
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Smallest absolute difference between two compass angles, in degrees.
pub fn angular_difference_deg(a: f64, b: f64) -> f64 {
    let diff = (normalize_deg(a) - normalize_deg(b)).abs();
    diff.min(360.0 - diff)
}

/// Ground speed along a heading once the wind is accounted for.
///
/// The wind vector points towards `wind_deg` (0 = north, clockwise) with
/// magnitude `wind_speed_kmh`; only its projection onto the heading changes
/// the ground speed. A non-positive result is clamped to
/// [`MIN_GROUND_SPEED_KMH`].
///
/// # Arguments
/// * `airspeed_kmh` - Vehicle speed relative to the air
/// * `heading_deg` - Direction of travel
/// * `wind_speed_kmh` - Wind magnitude
/// * `wind_deg` - Direction the wind blows towards
pub fn effective_speed_kmh(
    airspeed_kmh: f64,
    heading_deg: f64,
    wind_speed_kmh: f64,
    wind_deg: f64,
) -> f64 {
    let heading_rad = heading_deg.to_radians();
    let wind_rad = wind_deg.to_radians();

    let wind_x = wind_speed_kmh * wind_rad.sin();
    let wind_y = wind_speed_kmh * wind_rad.cos();
    let projected = wind_x * heading_rad.sin() + wind_y * heading_rad.cos();

    let ground_speed = airspeed_kmh + projected;
    if ground_speed <= 0.0 {
        MIN_GROUND_SPEED_KMH
    } else {
        ground_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        // ~111km between these points (1 degree latitude)
        let dist = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((dist - 111.194).abs() < 0.1);
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_km(-25.416, -49.273, -25.416, -49.273);
        assert!(dist.abs() < 1e-9);
    }

    #[test]
    fn test_bearing_points_east_and_north() {
        let east = bearing_deg(0.0, 0.0, 0.0, 1.0);
        assert!((east - 90.0).abs() < 1e-6);

        let north = bearing_deg(0.0, 0.0, 1.0, 0.0);
        assert!(north.abs() < 1e-6);

        let west = bearing_deg(0.0, 0.0, 0.0, -1.0);
        assert!((west - 270.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_wraps_negative_angles() {
        assert!((normalize_deg(-90.0) - 270.0).abs() < 1e-9);
        assert!((normalize_deg(720.0)).abs() < 1e-9);
        assert!(normalize_deg(-1e-18) < 360.0);
    }

    #[test]
    fn test_tailwind_adds_and_headwind_subtracts() {
        let tail = effective_speed_kmh(36.0, 90.0, 10.0, 90.0);
        assert!((tail - 46.0).abs() < 1e-9);

        let head = effective_speed_kmh(36.0, 90.0, 10.0, 270.0);
        assert!((head - 26.0).abs() < 1e-9);

        let cross = effective_speed_kmh(36.0, 90.0, 10.0, 0.0);
        assert!((cross - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_overwhelming_headwind_clamps_to_crawl() {
        let speed = effective_speed_kmh(36.0, 0.0, 50.0, 180.0);
        assert_eq!(speed, MIN_GROUND_SPEED_KMH);
    }

    #[test]
    fn test_angular_difference_wraps_around_north() {
        assert!((angular_difference_deg(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angular_difference_deg(90.0, 270.0) - 180.0).abs() < 1e-9);
    }
}
