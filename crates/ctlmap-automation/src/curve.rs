//! Response curves for automation bindings.
//!
//! Control points are `(x, y)` pairs stored flat: `[x0, y0, x1, y1, ...]`.
//! `x` is the slot value in `[0, 1]`. `y` is a parameter value for linear
//! curves and a normalized position for logarithmic ones.

use ctlmap_core::{ErrorKind, Scale};
use serde::{Deserialize, Serialize};

/// Minimum number of `(x, y)` points a curve can hold.
pub const MIN_CONTROL_POINTS: usize = 2;

/// How control points are interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveShape {
    /// Straight segment through the first two points (the first four floats),
    /// flat beyond them. Ignores the used point count.
    #[default]
    SimpleFourPoint,
    /// Linear interpolation through every used point, in order.
    PiecewiseLinear,
}

/// Multi-point response curve with fixed storage.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationCurve {
    scale: Scale,
    shape: CurveShape,
    points: Vec<f32>,
    used: usize,
}

impl AutomationCurve {
    /// Identity curve with room for `capacity` points (at least two).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CONTROL_POINTS);
        let mut curve = Self {
            scale: Scale::Linear,
            shape: CurveShape::SimpleFourPoint,
            points: vec![0.0; capacity * 2],
            used: 0,
        };
        curve.reset();
        curve
    }

    /// Back to the linear identity `(0, 0) -> (1, 1)`.
    pub fn reset(&mut self) {
        self.points.iter_mut().for_each(|p| *p = 0.0);
        self.points[2] = 1.0;
        self.points[3] = 1.0;
        self.used = 2;
        self.scale = Scale::Linear;
        self.shape = CurveShape::SimpleFourPoint;
    }

    #[inline]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    #[inline]
    pub fn shape(&self) -> CurveShape {
        self.shape
    }

    pub fn set_shape(&mut self, shape: CurveShape) {
        self.shape = shape;
    }

    /// Point capacity.
    pub fn capacity(&self) -> usize {
        self.points.len() / 2
    }

    /// Number of points in use.
    pub fn used_points(&self) -> usize {
        self.used
    }

    pub fn point(&self, index: usize) -> Option<(f32, f32)> {
        (index < self.used).then(|| (self.points[index * 2], self.points[index * 2 + 1]))
    }

    /// Raw flat storage (`x0, y0, x1, y1, ...`), including unused capacity.
    pub fn raw(&self) -> &[f32] {
        &self.points
    }

    /// Overwrite one float of the flat storage. `false` if out of range.
    pub fn set_raw(&mut self, index: usize, value: f32) -> bool {
        match self.points.get_mut(index) {
            Some(p) => {
                *p = value;
                true
            }
            None => false,
        }
    }

    /// Replace the used points and switch to [`CurveShape::PiecewiseLinear`].
    pub fn set_points(&mut self, points: &[(f32, f32)]) -> Result<(), ErrorKind> {
        if points.is_empty() || points.len() > self.capacity() {
            return Err(ErrorKind::CapacityExhausted);
        }
        for (i, (x, y)) in points.iter().enumerate() {
            self.points[i * 2] = *x;
            self.points[i * 2 + 1] = *y;
        }
        self.used = points.len();
        self.shape = CurveShape::PiecewiseLinear;
        Ok(())
    }

    /// Two-point line `(0, offset) -> (1, offset + slope)`.
    pub fn set_slope(&mut self, slope: f32, offset: f32) {
        self.points[0] = 0.0;
        self.points[1] = offset;
        self.points[2] = 1.0;
        self.points[3] = offset + slope;
        self.used = 2;
        self.scale = Scale::Linear;
        self.shape = CurveShape::SimpleFourPoint;
    }

    /// Curve output at slot value `x`.
    pub fn evaluate(&self, x: f32) -> f32 {
        match self.shape {
            CurveShape::SimpleFourPoint => segment(
                x,
                (self.points[0], self.points[1]),
                (self.points[2], self.points[3]),
            ),
            CurveShape::PiecewiseLinear => self.piecewise(x),
        }
    }

    fn piecewise(&self, x: f32) -> f32 {
        let used = &self.points[..self.used * 2];
        match used.len() / 2 {
            0 => x,
            1 => used[1],
            _ => {
                if x <= used[0] {
                    return used[1];
                }
                for pair in used.windows(4).step_by(2) {
                    if x <= pair[2] {
                        return segment(x, (pair[0], pair[1]), (pair[2], pair[3]));
                    }
                }
                used[used.len() - 1]
            }
        }
    }
}

/// Interpolate between two points, clamping outside `[x0, x1]`.
#[inline]
fn segment(x: f32, (x0, y0): (f32, f32), (x1, y1): (f32, f32)) -> f32 {
    if x <= x0 {
        y0
    } else if x >= x1 || x1 - x0 <= f32::EPSILON {
        y1
    } else {
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}
