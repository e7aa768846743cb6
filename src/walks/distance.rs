use crate::walks::timing::round_to;

/// Earth radius in miles used by the walk distance approximation.
pub const EARTH_RADIUS_MILES: f64 = 3958.75;

/// A persisted route point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine distance in miles between two points given in degrees.
pub fn point_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Length in miles of the polyline through `route`, rounded to 3 decimal places.
///
/// Raw samples are joined as-is: no smoothing, no outlier rejection. Fewer than
/// two points give 0.
pub fn total_distance(route: &[Coordinate]) -> f64 {
    let total: f64 = route
        .windows(2)
        .map(|pair| {
            point_distance(
                pair[0].latitude,
                pair[0].longitude,
                pair[1].latitude,
                pair[1].longitude,
            )
        })
        .sum();
    round_to(total, 3)
}
