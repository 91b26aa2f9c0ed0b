use std::collections::BTreeMap;

use crate::{
    animation::ease::Ease,
    behavior::assignment::BehaviorAssignment,
    composition::{
        model::{
            CompositionConfig, LayoutSpec, NavigationConfig, PresentationConfig,
            PresentationModel, TransitionSpec,
        },
        navigation::{HistoryMode, InputChannels},
    },
    driver::scroll::ActiveSectionStrategy,
    foundation::error::{MotionError, MotionResult},
};

pub struct CompositionBuilder {
    id: String,
    label: String,
    description: String,
    presentation: PresentationConfig,
    navigation: NavigationConfig,
    section_behaviors: BTreeMap<String, Vec<BehaviorAssignment>>,
    chrome_behaviors: BTreeMap<String, Vec<BehaviorAssignment>>,
    bare_mode: bool,
}

impl CompositionBuilder {
    pub fn new(id: impl Into<String>, model: PresentationModel) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            description: String::new(),
            presentation: PresentationConfig {
                model,
                ..PresentationConfig::default()
            },
            navigation: NavigationConfig::default(),
            section_behaviors: BTreeMap::new(),
            chrome_behaviors: BTreeMap::new(),
            bare_mode: false,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn transition(mut self, duration_ms: f64, ease: Ease) -> Self {
        self.presentation.transition = TransitionSpec { duration_ms, ease };
        self
    }

    pub fn layout(mut self, layout: LayoutSpec) -> Self {
        self.presentation.layout = layout;
        self
    }

    pub fn hide_inactive(mut self, hide: bool) -> Self {
        self.presentation.hide_inactive = hide;
        self
    }

    pub fn channels(mut self, channels: InputChannels) -> Self {
        self.navigation.channels = channels;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.navigation.looping = looping;
        self
    }

    pub fn lock_during_transition(mut self, lock: bool) -> Self {
        self.navigation.lock_during_transition = lock;
        self
    }

    pub fn debounce_ms(mut self, ms: f64) -> Self {
        self.navigation.debounce_ms = ms;
        self
    }

    pub fn skip_pinned(mut self, skip: bool) -> Self {
        self.navigation.skip_pinned = skip;
        self
    }

    pub fn active_section(mut self, strategy: ActiveSectionStrategy) -> Self {
        self.navigation.active_section = strategy;
        self
    }

    pub fn history(mut self, mode: HistoryMode) -> Self {
        self.navigation.history = mode;
        self
    }

    pub fn bare(mut self) -> Self {
        self.bare_mode = true;
        self
    }

    /// Default assignments for section `key` (a section id or `*`).
    pub fn section(
        mut self,
        key: impl Into<String>,
        assignments: Vec<BehaviorAssignment>,
    ) -> MotionResult<Self> {
        let key = key.into();
        if self.section_behaviors.contains_key(&key) {
            return Err(MotionError::validation(format!(
                "duplicate section key '{key}'"
            )));
        }
        self.section_behaviors.insert(key, assignments);
        Ok(self)
    }

    /// Default assignments for chrome element `key` (an element id or `*`).
    pub fn chrome(
        mut self,
        key: impl Into<String>,
        assignments: Vec<BehaviorAssignment>,
    ) -> MotionResult<Self> {
        let key = key.into();
        if self.chrome_behaviors.contains_key(&key) {
            return Err(MotionError::validation(format!(
                "duplicate chrome key '{key}'"
            )));
        }
        self.chrome_behaviors.insert(key, assignments);
        Ok(self)
    }

    pub fn build(self) -> MotionResult<CompositionConfig> {
        let config = CompositionConfig {
            id: self.id,
            label: self.label,
            description: self.description,
            presentation: self.presentation,
            navigation: self.navigation,
            section_behaviors: self.section_behaviors,
            chrome_behaviors: self.chrome_behaviors,
            bare_mode: self.bare_mode,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/dsl.rs"]
mod tests;
