use std::collections::BTreeMap;

use crate::animation::ease::Ease;
use crate::behavior::assignment::BehaviorAssignment;
use crate::behavior::builtin::{CAROUSEL_SLIDE, COVER_STACK};
use crate::composition::navigation::{HistoryMode, InputChannels};
use crate::driver::scroll::ActiveSectionStrategy;
use crate::foundation::error::{MotionError, MotionResult};
use crate::registry::lazy::RegistryMeta;

/// Assignment key matching every section (or chrome element) without its own entry.
pub const WILDCARD: &str = "*";

/// How sections are laid out and moved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentationModel {
    /// Sections stack in document flow under native scrolling.
    #[default]
    Stacking,
    /// One full-height section at a time, moved by discrete commands.
    Slideshow,
    /// An endless track of sections with momentum and snapping.
    InfiniteCarousel,
    /// Native scrolling where each section slides over the previous one.
    CoverScroll,
    /// No motion at all.
    Static,
}

impl PresentationModel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stacking => "stacking",
            Self::Slideshow => "slideshow",
            Self::InfiniteCarousel => "infinite-carousel",
            Self::CoverScroll => "cover-scroll",
            Self::Static => "static",
        }
    }

    /// Behavior the model itself applies to every section, ahead of assigned ones.
    pub fn injected_behavior(self) -> Option<&'static str> {
        match self {
            Self::Slideshow | Self::InfiniteCarousel => Some(CAROUSEL_SLIDE),
            Self::CoverScroll => Some(COVER_STACK),
            Self::Stacking | Self::Static => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransitionSpec {
    pub duration_ms: f64,
    pub ease: Ease,
}

impl Default for TransitionSpec {
    fn default() -> Self {
        Self {
            duration_ms: 600.0,
            ease: Ease::OutCubic,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutSpec {
    /// Force every section to the viewport height.
    pub full_height_sections: bool,
    /// Fixed section length for track-based models.
    pub section_length: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PresentationConfig {
    pub model: PresentationModel,
    #[serde(default)]
    pub transition: TransitionSpec,
    #[serde(default)]
    pub layout: LayoutSpec,
    /// Hide sections other than the active one.
    #[serde(default)]
    pub hide_inactive: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub channels: InputChannels,
    pub looping: bool,
    pub lock_during_transition: bool,
    pub debounce_ms: f64,
    /// Step over pinned sections.
    pub skip_pinned: bool,
    pub active_section: ActiveSectionStrategy,
    pub history: HistoryMode,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            channels: InputChannels::default(),
            looping: false,
            lock_during_transition: false,
            debounce_ms: 0.0,
            skip_pinned: false,
            active_section: ActiveSectionStrategy::MostVisible,
            history: HistoryMode::None,
        }
    }
}

/// A named bundle of presentation model, navigation policy and default behaviors.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositionConfig {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// Default assignments keyed by section id or [`WILDCARD`].
    #[serde(default)]
    pub section_behaviors: BTreeMap<String, Vec<BehaviorAssignment>>,
    /// Default assignments keyed by chrome element id or [`WILDCARD`].
    #[serde(default)]
    pub chrome_behaviors: BTreeMap<String, Vec<BehaviorAssignment>>,
    /// Apply no behavior at all, page-level ones included.
    #[serde(default)]
    pub bare_mode: bool,
}

impl CompositionConfig {
    pub fn from_json_str(s: &str) -> MotionResult<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn meta(&self) -> CompositionMeta {
        CompositionMeta {
            id: self.id.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            model: self.presentation.model,
            bare_mode: self.bare_mode,
        }
    }

    pub fn validate(&self) -> MotionResult<()> {
        if self.id.trim().is_empty() {
            return Err(MotionError::validation("composition id must be non-empty"));
        }
        let transition = &self.presentation.transition;
        if !(transition.duration_ms.is_finite() && transition.duration_ms >= 0.0) {
            return Err(MotionError::validation(format!(
                "composition '{}': transition duration_ms must be >= 0",
                self.id
            )));
        }
        if let Some(len) = self.presentation.layout.section_length
            && !(len.is_finite() && len > 0.0)
        {
            return Err(MotionError::validation(format!(
                "composition '{}': section_length must be > 0",
                self.id
            )));
        }
        if !(self.navigation.debounce_ms.is_finite() && self.navigation.debounce_ms >= 0.0) {
            return Err(MotionError::validation(format!(
                "composition '{}': debounce_ms must be >= 0",
                self.id
            )));
        }
        for (scope, map) in [
            ("section", &self.section_behaviors),
            ("chrome", &self.chrome_behaviors),
        ] {
            for (key, assignments) in map {
                if key.trim().is_empty() {
                    return Err(MotionError::validation(format!(
                        "composition '{}': empty {scope} key",
                        self.id
                    )));
                }
                if assignments.iter().any(|a| a.behavior.trim().is_empty()) {
                    return Err(MotionError::validation(format!(
                        "composition '{}': {scope} '{key}' has an empty behavior id",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Listing metadata, available before a lazy composition is loaded.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositionMeta {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub model: PresentationModel,
    #[serde(default)]
    pub bare_mode: bool,
}

impl CompositionMeta {
    pub fn new(id: impl Into<String>, label: impl Into<String>, model: PresentationModel) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            model,
            bare_mode: false,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl RegistryMeta for CompositionMeta {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
