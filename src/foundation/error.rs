/// Convenience alias used across the crate.
pub type MotionResult<T> = Result<T, MotionError>;

/// Errors surfaced by registries, resolvers and the runtime.
///
/// Frame-loop failures (unknown behaviors, compute errors) never leave the driver as a
/// `MotionError`; they become diagnostics instead. What does surface is configuration
/// the caller handed over directly and lazy loads that failed.
#[derive(thiserror::Error, Debug)]
pub enum MotionError {
    /// A value handed to a builder or constructor is structurally invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// A behavior's compute function rejected its input.
    #[error("compute error: {0}")]
    Compute(String),

    /// A lazy registry loader failed. The entry stays lazy and may be retried.
    #[error("load error: {0}")]
    Load(String),

    /// Driver or store ownership rules were violated.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Runtime configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MotionError {
    /// Build a [`MotionError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MotionError::Compute`].
    pub fn compute(msg: impl Into<String>) -> Self {
        Self::Compute(msg.into())
    }

    /// Build a [`MotionError::Load`].
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`MotionError::Lifecycle`].
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`MotionError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`MotionError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
