/// Stepwise parameter adjustment with clamping at the input boundary
use crate::config::{ParameterLimits, PlanParameters};

/// A user adjustment, in multiples of the configured step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    VarusValgus(f64),
    Extension(f64),
    ResectionDepth(f64),
    AnteriorLength(f64),
    LateralLength(f64),
}

impl PlanParameters {
    /// Apply `adjustment`, clamping depth at zero and lengths into range.
    ///
    /// Angles accumulate without wraparound.
    pub fn adjusted(&self, adjustment: Adjustment, limits: &ParameterLimits) -> Self {
        let mut next = *self;
        let angle_step = limits.angle_step_degrees.to_radians();
        match adjustment {
            Adjustment::VarusValgus(steps) => next.varus_valgus_angle += steps * angle_step,
            Adjustment::Extension(steps) => next.extension_angle += steps * angle_step,
            Adjustment::ResectionDepth(steps) => {
                next.resection_depth += steps * limits.depth_step
            }
            Adjustment::AnteriorLength(steps) => {
                next.anterior_line_length += steps * limits.length_step
            }
            Adjustment::LateralLength(steps) => {
                next.lateral_line_length += steps * limits.length_step
            }
        }
        next.clamped(limits)
    }

    /// Bring directly-set values into the permitted ranges.
    ///
    /// Non-finite values fall back to the lower bound (zero for angles).
    pub fn clamped(&self, limits: &ParameterLimits) -> Self {
        let finite_or = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        let length = |value: f64| {
            finite_or(value, limits.length_min).clamp(limits.length_min, limits.length_max)
        };
        Self {
            varus_valgus_angle: finite_or(self.varus_valgus_angle, 0.0),
            extension_angle: finite_or(self.extension_angle, 0.0),
            resection_depth: finite_or(self.resection_depth, 0.0).max(0.0),
            anterior_line_length: length(self.anterior_line_length),
            lateral_line_length: length(self.lateral_line_length),
        }
    }
}
