//! Numeric reading helpers shared by the parsers and the statistics fold.

use crate::ParseError;

/// Value used by the source files for a reading that was not taken.
pub const MISSING_SENTINEL: i64 = -9999;

/// Parse one integer reading field.
///
/// Returns `Ok(None)` for the missing sentinel. Any other integer is kept
/// at its face value, rounded to one decimal place; the raw files store
/// whole numbers, so the rounding never changes the value.
pub fn parse_reading(field: &'static str, raw: &str) -> Result<Option<f64>, ParseError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: trimmed.to_string(),
    })?;
    if value == MISSING_SENTINEL {
        return Ok(None);
    }
    Ok(Some(round_to(value as f64, 1)))
}

/// Round `value` half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
