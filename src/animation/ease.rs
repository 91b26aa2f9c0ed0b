use std::str::FromStr;

use crate::foundation::error::MotionError;

/// Easing curves mapping normalized progress `t ∈ [0, 1]` to eased progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    #[default]
    OutCubic,
    InOutCubic,
    OutQuint,
    OutExpo,
    InOutSine,
}

impl Ease {
    /// Every curve, in declaration order.
    pub const ALL: [Ease; 10] = [
        Ease::Linear,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
        Ease::OutQuint,
        Ease::OutExpo,
        Ease::InOutSine,
    ];

    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::OutQuint => 1.0 - (1.0 - t).powi(5),
            Self::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Self::InOutSine => -((std::f64::consts::PI * t).cos() - 1.0) / 2.0,
        }
    }
}

impl FromStr for Ease {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ease = match s.trim() {
            "linear" => Self::Linear,
            "in-quad" => Self::InQuad,
            "out-quad" => Self::OutQuad,
            "in-out-quad" => Self::InOutQuad,
            "in-cubic" => Self::InCubic,
            "out-cubic" => Self::OutCubic,
            "in-out-cubic" => Self::InOutCubic,
            "out-quint" => Self::OutQuint,
            "out-expo" => Self::OutExpo,
            "in-out-sine" => Self::InOutSine,
            other => return Err(MotionError::validation(format!("unknown ease '{other}'"))),
        };
        Ok(ease)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
