use tracing::warn;

const LON_RANGE: std::ops::RangeInclusive<f64> = -180.0..=180.0;
const LAT_RANGE: std::ops::RangeInclusive<f64> = -90.0..=90.0;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("coordinates out of range: lon={lon}, lat={lat}")]
pub struct CoordinateError {
    pub lon: f64,
    pub lat: f64,
}

/// Validates a request coordinate pair, recovering the common mistake of
/// sending latitude and longitude in swapped order.
pub fn validate_coords(lon: f64, lat: f64) -> Result<(f64, f64), CoordinateError> {
    if LON_RANGE.contains(&lon) && LAT_RANGE.contains(&lat) {
        return Ok((lon, lat));
    }

    if LON_RANGE.contains(&lat) && LAT_RANGE.contains(&lon) {
        warn!(lon, lat, "coordinates look transposed; swapping lat/lon");
        return Ok((lat, lon));
    }

    Err(CoordinateError { lon, lat })
}
