//! Value scaling shared by CC translation and automation curves.

use crate::error::ErrorKind;
use crate::metadata::Metadata;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Raw CC value that maps to the exact center of a range.
pub const MIDI_CENTER: u8 = 64;

/// Normalize a 7-bit controller value to `[0, 1]`.
///
/// 64 maps to exactly 0.5 so centered parameters land on their midpoint.
#[inline]
pub fn normalize_cc(value: u8) -> f32 {
    if value == MIDI_CENTER {
        0.5
    } else {
        value as f32 / 127.0
    }
}

/// Response of a parameter across its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Linear,
    /// Requires `min > 0`.
    Logarithmic,
}

impl Scale {
    /// Map normalized `x` into `[min, max]`.
    #[inline]
    pub fn map(&self, x: f32, min: f32, max: f32) -> f32 {
        match self {
            Self::Linear => x * (max - min) + min,
            Self::Logarithmic => {
                let b = min.ln();
                let a = max.ln() - b;
                (a * x + b).exp()
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Logarithmic => "logarithmic",
        }
    }
}

impl FromStr for Scale {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "logarithmic" => Ok(Self::Logarithmic),
            _ => Err(ErrorKind::UnknownScale),
        }
    }
}

/// `min` / `max` / `scale` read out of port metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub min: f32,
    pub max: f32,
    pub scale: Scale,
}

impl Scaling {
    /// Read scaling from metadata.
    ///
    /// Missing or unparsable `min`, `max` or `scale` is `UnreadableMetadata`;
    /// a present but unrecognized scale tag is `UnknownScale`.
    pub fn from_metadata(meta: &Metadata) -> Result<Self, ErrorKind> {
        let (Some(min), Some(max), Some(scale)) = (
            meta.parse::<f32>("min"),
            meta.parse::<f32>("max"),
            meta.get("scale"),
        ) else {
            return Err(ErrorKind::UnreadableMetadata);
        };
        Ok(Self {
            min,
            max,
            scale: scale.parse()?,
        })
    }

    #[inline]
    pub fn map(&self, x: f32) -> f32 {
        self.scale.map(x, self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_center() {
        assert_eq!(normalize_cc(0), 0.0);
        assert_eq!(normalize_cc(64), 0.5);
        assert_eq!(normalize_cc(127), 1.0);
        assert_relative_eq!(normalize_cc(63), 63.0 / 127.0);
    }

    #[test]
    fn test_log_boundaries() {
        assert_relative_eq!(Scale::Logarithmic.map(0.0, 1.0, 1000.0), 1.0, epsilon = 1e-4);
        assert_relative_eq!(Scale::Logarithmic.map(1.0, 1.0, 1000.0), 1000.0, max_relative = 1e-4);
        assert_relative_eq!(Scale::Logarithmic.map(0.5, 1.0, 100.0), 10.0, max_relative = 1e-4);
    }

    #[test]
    fn test_scale_parse() {
        assert_eq!("linear".parse::<Scale>(), Ok(Scale::Linear));
        assert_eq!("logarithmic".parse::<Scale>(), Ok(Scale::Logarithmic));
        assert_eq!("exp".parse::<Scale>(), Err(ErrorKind::UnknownScale));
    }

    #[test]
    fn test_scaling_from_metadata() {
        let meta = Metadata::new().with("min", -1).with("max", 1).with("scale", "linear");
        let scaling = Scaling::from_metadata(&meta).unwrap();
        assert_eq!(scaling.map(0.5), 0.0);

        let missing = Metadata::new().with("min", 0).with("max", 1);
        assert_eq!(Scaling::from_metadata(&missing), Err(ErrorKind::UnreadableMetadata));

        let unknown = missing.with("scale", "cubic");
        assert_eq!(Scaling::from_metadata(&unknown), Err(ErrorKind::UnknownScale));
    }

    proptest! {
        #[test]
        fn linear_center_is_midpoint(min in -1000.0f32..1000.0, span in 0.001f32..1000.0) {
            let max = min + span;
            let mid = Scale::Linear.map(normalize_cc(MIDI_CENTER), min, max);
            prop_assert!((mid - (min + max) / 2.0).abs() <= 1e-3 * (1.0 + max.abs().max(min.abs())));
        }
    }
}
