//! Tolerance constants for parameter value checks.

/// Linear scaling with exact float inputs.
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Relative tolerance for logarithmic scaling (`exp`/`ln` round trips).
pub const LOG_RELATIVE: f32 = 1e-4;

/// One CC step on a unit range.
pub const CC_STEP: f32 = 1.0 / 127.0;
