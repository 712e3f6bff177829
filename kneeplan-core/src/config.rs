/// Planner configuration, loadable from JSON
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::landmark::Landmark;

/// Which limb the landmarks belong to.
///
/// Fixes the sign of the cross-product directions used for the anterior and
/// lateral reference lines, and the sense of both correction angles. `Right`
/// matches the reference right-femur asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimbSide {
    #[default]
    Right,
    Left,
}

impl LimbSide {
    pub fn sign(self) -> f64 {
        match self {
            LimbSide::Right => 1.0,
            LimbSide::Left => -1.0,
        }
    }

    /// A correction angle in this limb's rotation sense.
    ///
    /// Mirroring a limb reverses the sense of rotation about the mirrored
    /// axes, so the same angle corrects a left limb the same way anatomically.
    pub fn oriented(self, angle: f64) -> f64 {
        angle * self.sign()
    }
}

/// Size and orientation target of the cutting solid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterConfig {
    /// Edge length of the square footprint lying on the resection plane.
    pub size: f64,
    /// Extrusion depth away from the resection plane.
    pub depth: f64,
    /// Landmark the kept side of the cut faces.
    #[serde(with = "landmark_name")]
    pub reference: Landmark,
}

impl Default for CutterConfig {
    fn default() -> Self {
        Self {
            size: 5.0,
            depth: 1.0,
            reference: Landmark::FemurCenter,
        }
    }
}

/// Step sizes and ranges enforced at the input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterLimits {
    pub angle_step_degrees: f64,
    pub depth_step: f64,
    pub length_step: f64,
    pub length_min: f64,
    pub length_max: f64,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            angle_step_degrees: 1.0,
            depth_step: 1.0,
            length_step: 0.5,
            length_min: 10.0,
            length_max: 100.0,
        }
    }
}

/// The five scalar inputs of the planning chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanParameters {
    /// Coronal correction in radians.
    pub varus_valgus_angle: f64,
    /// Sagittal correction in radians.
    pub extension_angle: f64,
    pub resection_depth: f64,
    pub anterior_line_length: f64,
    pub lateral_line_length: f64,
}

impl Default for PlanParameters {
    fn default() -> Self {
        Self {
            varus_valgus_angle: 0.0,
            extension_angle: 0.0,
            resection_depth: 10.0,
            anterior_line_length: 10.0,
            lateral_line_length: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Scene units per unit of length and depth parameters.
    pub unit_scale: f64,
    pub limb_side: LimbSide,
    pub cutter: CutterConfig,
    /// Edge length of the quads handed to the renderer for each plane.
    pub plane_display_size: f64,
    /// Quiet period before a resection request is handed to the boolean kernel.
    pub settle_delay_ms: u64,
    pub limits: ParameterLimits,
    pub defaults: PlanParameters,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            unit_scale: 0.01,
            limb_side: LimbSide::Right,
            cutter: CutterConfig::default(),
            plane_display_size: 5.0,
            settle_delay_ms: 250,
            limits: ParameterLimits::default(),
            defaults: PlanParameters::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded planner config from {}", path.display());
        Ok(config)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        };
        positive("unit_scale", self.unit_scale)?;
        positive("cutter.size", self.cutter.size)?;
        positive("cutter.depth", self.cutter.depth)?;
        positive("plane_display_size", self.plane_display_size)?;
        positive("limits.angle_step_degrees", self.limits.angle_step_degrees)?;
        positive("limits.depth_step", self.limits.depth_step)?;
        positive("limits.length_step", self.limits.length_step)?;
        positive("limits.length_min", self.limits.length_min)?;

        let limits = &self.limits;
        if limits.length_min > limits.length_max {
            return Err(ConfigError::Invalid(format!(
                "limits.length_min ({}) exceeds limits.length_max ({})",
                limits.length_min, limits.length_max
            )));
        }

        let defaults = &self.defaults;
        if !(defaults.varus_valgus_angle.is_finite() && defaults.extension_angle.is_finite()) {
            return Err(ConfigError::Invalid("default angles must be finite".into()));
        }
        if !(defaults.resection_depth.is_finite() && defaults.resection_depth >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "defaults.resection_depth must be non-negative, got {}",
                defaults.resection_depth
            )));
        }
        for (name, value) in [
            ("defaults.anterior_line_length", defaults.anterior_line_length),
            ("defaults.lateral_line_length", defaults.lateral_line_length),
        ] {
            if !(limits.length_min..=limits.length_max).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} ({value}) outside [{}, {}]",
                    limits.length_min, limits.length_max
                )));
            }
        }
        Ok(())
    }
}

mod landmark_name {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::landmark::Landmark;

    pub fn serialize<S: Serializer>(landmark: &Landmark, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(landmark.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Landmark, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(D::Error::custom)
    }
}
