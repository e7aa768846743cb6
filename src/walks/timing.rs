use crate::error::IngestError;

/// Longest raw timestamp taken as-is.
const TIMESTAMP_WIDTH: usize = 10;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Repair an over-long timestamp sent by the tracking app.
///
/// Strings of at most 10 characters are returned unchanged. Longer strings keep
/// only what follows the first 10 characters: `"1380000000123"` becomes `"123"`.
pub fn normalize_timestamp(raw: &str) -> &str {
    if raw.len() > TIMESTAMP_WIDTH {
        raw.get(TIMESTAMP_WIDTH..).unwrap_or_default()
    } else {
        raw
    }
}

/// Normalize a raw timestamp and read it as whole seconds.
pub fn parse_timestamp(raw: &str) -> Result<i64, IngestError> {
    let normalized = normalize_timestamp(raw);
    normalized.trim().parse::<i64>().map_err(|e| {
        IngestError::Validation(format!(
            "timestamp {raw:?} (normalized {normalized:?}) is not a number of seconds: {e}"
        ))
    })
}

/// Elapsed hours between two timestamps in seconds, rounded to 4 decimal places.
///
/// A last timestamp before the first gives a negative duration; it is passed
/// through unchanged.
pub fn duration_hours(first: i64, last: i64) -> f64 {
    // Any two i64 values can be submitted, so subtract in f64.
    let hours = (last as f64 - first as f64) / SECONDS_PER_HOUR;
    round_to(hours, 4)
}

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}
