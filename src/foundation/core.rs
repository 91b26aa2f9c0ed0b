use std::fmt;

pub use kurbo::{Point, Size, Vec2};

/// Frame duration at the 60 Hz reference cadence, in milliseconds.
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

/// Identity of a scrolling context.
///
/// The top-level viewport is its own key; nested contexts (an embedded preview frame,
/// a scrollable panel) are identified by the host's name for them.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKey {
    /// The document viewport.
    Viewport,
    /// A nested scroll container.
    Frame(String),
}

impl ContainerKey {
    /// Key for a nested container.
    pub fn frame(name: impl Into<String>) -> Self {
        Self::Frame(name.into())
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Viewport => f.write_str("viewport"),
            Self::Frame(name) => write!(f, "frame:{name}"),
        }
    }
}

/// Host-assigned element identity.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Wrap a host element id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// An element handed to a driver by the rendering layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementRef {
    /// Element identity.
    pub id: ElementId,
    /// Position in the page's section list, when the element is a section.
    #[serde(default)]
    pub section: Option<usize>,
}

impl ElementRef {
    /// A non-section element (chrome, widget).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(id),
            section: None,
        }
    }

    /// A section element at `index`.
    pub fn section(id: impl Into<String>, index: usize) -> Self {
        Self {
            id: ElementId::new(id),
            section: Some(index),
        }
    }
}

/// Host frame timestamp in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default, serde::Serialize, serde::Deserialize)]
pub struct FrameTime(pub f64);

impl FrameTime {
    /// Milliseconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: FrameTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

/// Wrap `value` into `[0, period)`.
///
/// Returns `0.0` when `period` is not a positive finite number.
pub fn wrap_into(value: f64, period: f64) -> f64 {
    if !(period.is_finite() && period > 0.0) || !value.is_finite() {
        return 0.0;
    }
    let r = value.rem_euclid(period);
    // rem_euclid can round up to `period` for tiny negative inputs.
    if r >= period { 0.0 } else { r }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
