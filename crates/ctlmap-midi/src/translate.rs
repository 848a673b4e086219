//! CC value → float parameter value.

use ctlmap_core::{normalize_cc, ErrorKind, Metadata, Scaling};

/// Translate a 7-bit CC value into the range described by `meta`.
///
/// Needs `min`, `max` and `scale` (`linear` or `logarithmic`). A value of 64
/// always lands on the exact middle of the normalized range.
pub fn try_translate(value: u8, meta: &Metadata) -> Result<f32, ErrorKind> {
    let scaling = Scaling::from_metadata(meta)?;
    Ok(scaling.map(normalize_cc(value)))
}

/// Infallible [`try_translate`]: any failure yields `0.0`.
pub fn translate(value: u8, meta: &Metadata) -> f32 {
    try_translate(value, meta).unwrap_or_else(|kind| {
        tracing::debug!("CC translation failed: {}", kind);
        0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear(min: f32, max: f32) -> Metadata {
        Metadata::new()
            .with("min", min)
            .with("max", max)
            .with("scale", "linear")
    }

    #[test]
    fn test_linear_endpoints() {
        let meta = linear(0.0, 127.0);
        assert_eq!(translate(0, &meta), 0.0);
        assert_relative_eq!(translate(127, &meta), 127.0, epsilon = 1e-4);
    }

    #[test]
    fn test_center_is_exact_midpoint() {
        assert_eq!(translate(64, &linear(-1.0, 1.0)), 0.0);
        assert_eq!(translate(64, &linear(0.0, 10.0)), 5.0);
        // 63 and 65 are not symmetric around the center
        assert!(translate(63, &linear(0.0, 10.0)) < 5.0);
        assert!(translate(65, &linear(0.0, 10.0)) > 5.0);
    }

    #[test]
    fn test_logarithmic_boundaries() {
        let meta = Metadata::new()
            .with("min", 1)
            .with("max", 1000)
            .with("scale", "logarithmic");
        assert_relative_eq!(translate(0, &meta), 1.0, epsilon = 1e-4);
        assert_relative_eq!(translate(127, &meta), 1000.0, max_relative = 1e-4);
    }

    #[test]
    fn test_missing_metadata() {
        let meta = Metadata::new().with("min", 0).with("scale", "linear");
        assert_eq!(try_translate(100, &meta), Err(ErrorKind::UnreadableMetadata));
        assert_eq!(translate(100, &meta), 0.0);
    }

    #[test]
    fn test_unknown_scale_falls_back_to_zero() {
        let meta = Metadata::new()
            .with("min", 0)
            .with("max", 1)
            .with("scale", "exponential");
        assert_eq!(try_translate(100, &meta), Err(ErrorKind::UnknownScale));
        assert_eq!(translate(100, &meta), 0.0);
    }
}
