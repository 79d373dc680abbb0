//! Semicircle coordinate conversion for FIT position fields.

/// Semicircle units per decimal degree (2^31 / 180).
///
/// FIT position fields map the full signed 32-bit range onto ±180 degrees;
/// dividing a raw value by this constant recovers decimal degrees.
pub const SEMICIRCLES_PER_DEGREE: f64 = 11_930_465.0;

/// Convert a raw semicircle value to decimal degrees.
pub fn semicircles_to_degrees(raw: i32) -> f64 {
    raw as f64 / SEMICIRCLES_PER_DEGREE
}

/// Convert decimal degrees back to the nearest raw semicircle value.
pub fn degrees_to_semicircles(degrees: f64) -> i32 {
    (degrees * SEMICIRCLES_PER_DEGREE).round() as i32
}

/// Check that a converted (longitude, latitude) pair is within valid bounds.
///
/// Values outside these bounds indicate a decode or conversion defect and are
/// surfaced as warnings rather than silently clamped.
pub fn in_range(longitude: f64, latitude: f64) -> bool {
    (-180.0..=180.0).contains(&longitude) && (-90.0..=90.0).contains(&latitude)
}
