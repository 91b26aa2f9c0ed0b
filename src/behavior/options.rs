use crate::animation::ease::Ease;
use crate::foundation::error::{MotionError, MotionResult};

/// Per-assignment configuration record handed to `compute`.
///
/// Missing keys fall back to the caller's default; present keys of the wrong type are a
/// compute error for that assignment.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BehaviorOptions(serde_json::Map<String, serde_json::Value>);

impl BehaviorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn number(&self, key: &str, default: f64) -> MotionResult<f64> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(v) => v
                .as_f64()
                .filter(|n| n.is_finite())
                .ok_or_else(|| MotionError::compute(format!("option '{key}' must be a number"))),
        }
    }

    pub fn flag(&self, key: &str, default: bool) -> MotionResult<bool> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(v) => v
                .as_bool()
                .ok_or_else(|| MotionError::compute(format!("option '{key}' must be a bool"))),
        }
    }

    pub fn text<'a>(&'a self, key: &str, default: &'a str) -> MotionResult<&'a str> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(v) => v
                .as_str()
                .ok_or_else(|| MotionError::compute(format!("option '{key}' must be a string"))),
        }
    }

    pub fn ease(&self, key: &str, default: Ease) -> MotionResult<Ease> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(default),
            Some(serde_json::Value::String(s)) => s.parse(),
            Some(_) => Err(MotionError::compute(format!(
                "option '{key}' must be an ease name"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/options.rs"]
mod tests;
