//! One parameter driven by an automation slot.

use crate::curve::AutomationCurve;
use ctlmap_core::{Arg, ErrorKind, Metadata, Scale, ValueType};

/// Parameter range and response cached from port metadata at bind time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub scale: Scale,
}

impl ParamRange {
    /// Missing keys fall back per type: floats `0..1` unstepped,
    /// ints and chars `0..127` step 1, bools `0..1` step 1.
    ///
    /// An unusable scale falls back to linear and is returned as
    /// [`ErrorKind::UnknownScale`] alongside the range.
    pub fn from_metadata(value_type: ValueType, meta: Option<&Metadata>) -> (Self, Option<ErrorKind>) {
        let (default_max, default_step) = match value_type {
            ValueType::Float => (1.0, 0.0),
            ValueType::Bool => (1.0, 1.0),
            ValueType::Int | ValueType::Char => (127.0, 1.0),
        };
        let get = |key: &str| meta.and_then(|m| m.parse::<f32>(key));

        let mut min = get("min").unwrap_or(0.0);
        let mut max = get("max").unwrap_or(default_max);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }

        let (mut scale, mut problem) = match meta.and_then(|m| m.get("scale")).map(str::parse::<Scale>) {
            None => (Scale::default(), None),
            Some(Ok(scale)) => (scale, None),
            Some(Err(kind)) => (Scale::Linear, Some(kind)),
        };
        if scale == Scale::Logarithmic && min <= 0.0 {
            tracing::warn!("Logarithmic scale needs min > 0 (got {}), using linear", min);
            scale = Scale::Linear;
            problem = Some(ErrorKind::UnknownScale);
        }

        let range = Self {
            min,
            max,
            step: get("step").filter(|s| *s >= 0.0).unwrap_or(default_step),
            scale,
        };
        (range, problem)
    }
}

impl Default for ParamRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 1.0,
            step: 0.0,
            scale: Scale::Linear,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AutomationBinding {
    used: bool,
    active: bool,
    relative: bool,
    base_value: f32,
    path: String,
    value_type: ValueType,
    range: ParamRange,
    curve: AutomationCurve,
}

impl AutomationBinding {
    pub(crate) fn free(path_capacity: usize, control_points: usize) -> Self {
        Self {
            used: false,
            active: false,
            relative: false,
            base_value: 0.0,
            path: String::with_capacity(path_capacity),
            value_type: ValueType::Float,
            range: ParamRange::default(),
            curve: AutomationCurve::new(control_points),
        }
    }

    pub(crate) fn assign(&mut self, path: &str, value_type: ValueType, range: ParamRange) {
        self.path.clear();
        self.path.push_str(path);
        self.value_type = value_type;
        self.range = range;
        self.relative = false;
        self.base_value = range.min;
        self.curve.reset();
        match range.scale {
            Scale::Linear => self.curve.set_slope(range.max - range.min, range.min),
            scale => self.curve.set_scale(scale),
        }
        self.used = true;
        self.active = true;
    }

    pub(crate) fn reset(&mut self) {
        self.used = false;
        self.active = false;
        self.relative = false;
        self.base_value = 0.0;
        self.path.clear();
        self.range = ParamRange::default();
        self.curve.reset();
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.used
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pause or resume this binding. Unused bindings stay inactive.
    pub fn set_active(&mut self, active: bool) {
        self.active = active && self.used;
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn base_value(&self) -> f32 {
        self.base_value
    }

    pub(crate) fn set_relative(&mut self, relative: bool, base: f32) {
        self.relative = relative;
        self.base_value = base;
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn min(&self) -> f32 {
        self.range.min
    }

    pub fn max(&self) -> f32 {
        self.range.max
    }

    pub fn step(&self) -> f32 {
        self.range.step
    }

    pub fn curve(&self) -> &AutomationCurve {
        &self.curve
    }

    pub(crate) fn curve_mut(&mut self) -> &mut AutomationCurve {
        &mut self.curve
    }

    /// Parameter value for slot position `x`, clamped and quantized.
    ///
    /// Linear curves hold parameter values and are applied as is, on top of
    /// the base value when relative. Logarithmic curves hold a normalized
    /// position mapped onto the range.
    pub fn value_at(&self, x: f32) -> f32 {
        let ParamRange { min, max, step, .. } = self.range;
        let y = self.curve.evaluate(x);
        let value = match self.curve.scale() {
            Scale::Linear if self.relative => self.base_value + y,
            Scale::Linear => y,
            scale => scale.map(y, min, max),
        };
        let mut value = value.clamp(min, max);
        if step > 0.0 && self.value_type != ValueType::Float {
            value = (((value - min) / step).round() * step + min).min(max);
        }
        value
    }

    /// Typed argument for slot position `x`.
    pub fn arg_at(&self, x: f32) -> Arg<'static> {
        let value = self.value_at(x);
        match self.value_type {
            ValueType::Float => Arg::Float(value),
            ValueType::Int => Arg::Int(value.round() as i32),
            ValueType::Bool => Arg::Bool(value >= (self.range.min + self.range.max) * 0.5),
            ValueType::Char => Arg::Char(char::from(value.round().clamp(0.0, 255.0) as u8)),
        }
    }
}
