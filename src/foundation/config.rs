use std::path::Path;

use crate::animation::ease::Ease;
use crate::foundation::error::{MotionError, MotionResult};

/// Process-wide runtime settings.
///
/// Every field has a default, so a partial JSON document (or none at all) is valid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Composition used when neither the page nor an override names one.
    pub default_composition: String,
    /// Intersection ratio below which visibility-gated behaviors are skipped.
    pub intersection_threshold: f64,
    /// After the first compute failure of an assignment, log again every N failures.
    pub failure_report_every: u64,
    /// Upper bound on the per-frame delta fed to drivers.
    pub max_frame_delta_ms: f64,
    /// Query parameter that force-selects a composition.
    pub override_param: String,
    /// Query parameter that force-selects a behavior for every section.
    pub behavior_override_param: String,
    /// Momentum driver physics.
    pub momentum: MomentumSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_composition: "classic".to_owned(),
            intersection_threshold: 0.01,
            failure_report_every: 300,
            max_frame_delta_ms: 100.0,
            override_param: "composition".to_owned(),
            behavior_override_param: "behavior".to_owned(),
            momentum: MomentumSettings::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> MotionResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON file.
    pub fn load(path: &Path) -> MotionResult<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| MotionError::config(format!("read '{}': {e}", path.display())))?;
        Self::from_json_str(&s)
    }

    /// Check value ranges.
    pub fn validate(&self) -> MotionResult<()> {
        if self.default_composition.trim().is_empty() {
            return Err(MotionError::config("default_composition must be non-empty"));
        }
        if !(0.0..=1.0).contains(&self.intersection_threshold) {
            return Err(MotionError::config(
                "intersection_threshold must be within [0, 1]",
            ));
        }
        if !(self.max_frame_delta_ms.is_finite() && self.max_frame_delta_ms > 0.0) {
            return Err(MotionError::config("max_frame_delta_ms must be > 0"));
        }
        self.momentum.validate()
    }
}

/// Tunables for the momentum driver.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MomentumSettings {
    /// Velocity multiplier per 60 Hz frame while coasting, in `(0, 1)`.
    pub friction: f64,
    /// Speed (px/s) under which coasting ends and snapping starts.
    pub velocity_epsilon: f64,
    /// Duration of the snap easing.
    pub snap_duration_ms: f64,
    /// Curve used while snapping.
    pub snap_ease: Ease,
    /// Velocity impulse (px/s) per pixel of wheel delta.
    pub wheel_gain: f64,
    /// Window of drag samples used to estimate release velocity.
    pub drag_window_ms: f64,
    /// Release speed (px/s) above which a drag advances a whole section.
    pub flick_velocity: f64,
    /// Fraction of input applied past the ends of a non-looping track.
    pub overscroll_resistance: f64,
}

impl Default for MomentumSettings {
    fn default() -> Self {
        Self {
            friction: 0.9,
            velocity_epsilon: 5.0,
            snap_duration_ms: 400.0,
            snap_ease: Ease::OutCubic,
            wheel_gain: 8.0,
            drag_window_ms: 100.0,
            flick_velocity: 900.0,
            overscroll_resistance: 0.35,
        }
    }
}

impl MomentumSettings {
    /// Check value ranges.
    pub fn validate(&self) -> MotionResult<()> {
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(MotionError::config("momentum.friction must be within (0, 1)"));
        }
        if !(self.velocity_epsilon.is_finite() && self.velocity_epsilon > 0.0) {
            return Err(MotionError::config("momentum.velocity_epsilon must be > 0"));
        }
        if !(self.snap_duration_ms.is_finite() && self.snap_duration_ms >= 0.0) {
            return Err(MotionError::config(
                "momentum.snap_duration_ms must be >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.overscroll_resistance) {
            return Err(MotionError::config(
                "momentum.overscroll_resistance must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
