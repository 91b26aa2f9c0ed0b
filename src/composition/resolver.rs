use std::collections::{BTreeMap, BTreeSet};

use crate::behavior::assignment::BehaviorAssignment;
use crate::composition::model::{CompositionConfig, PresentationModel, WILDCARD};
use crate::composition::navigation::{HistoryMode, NavigationPolicy};
use crate::driver::momentum::MomentumOptions;
use crate::driver::motion::DriverMode;
use crate::driver::scroll::ScrollOptions;
use crate::foundation::core::ElementRef;

/// A section as the rendering layer declares it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SectionSpec {
    pub id: String,
    /// Exempt from visibility gating and, with `skip_pinned`, from navigation.
    #[serde(default)]
    pub pinned: bool,
}

impl SectionSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pinned: false,
        }
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }
}

/// Everything a page hands to the resolver: its elements and page-level assignments.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageSpec {
    pub sections: Vec<SectionSpec>,
    #[serde(default)]
    pub chrome: Vec<String>,
    /// Page-level assignments keyed by section id or `*`.
    #[serde(default)]
    pub section_behaviors: BTreeMap<String, Vec<BehaviorAssignment>>,
    /// Page-level assignments keyed by chrome id or `*`.
    #[serde(default)]
    pub chrome_behaviors: BTreeMap<String, Vec<BehaviorAssignment>>,
    /// Composition this page asks for; the runtime default applies when absent.
    #[serde(default)]
    pub composition: Option<String>,
}

impl PageSpec {
    pub fn with_sections<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sections: ids.into_iter().map(SectionSpec::new).collect(),
            ..Self::default()
        }
    }
}

/// Layout requirements the rendering layer must honor for the resolved model.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct LayoutConstraints {
    pub full_height_sections: bool,
    /// The driver owns scrolling; the page must not scroll natively.
    pub native_scroll_locked: bool,
    pub hide_inactive: bool,
    pub section_length: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedElement {
    pub element: ElementRef,
    /// Evaluation order; later entries win per style key.
    pub assignments: Vec<BehaviorAssignment>,
}

/// A composition interpreted against one page.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedComposition {
    pub composition: String,
    pub model: PresentationModel,
    pub bare: bool,
    pub mode: DriverMode,
    pub navigation: NavigationPolicy,
    pub history: HistoryMode,
    pub layout: LayoutConstraints,
    pub sections: Vec<ResolvedElement>,
    pub chrome: Vec<ResolvedElement>,
}

impl ResolvedComposition {
    /// Sections followed by chrome, in attach order.
    pub fn elements(&self) -> impl Iterator<Item = &ResolvedElement> {
        self.sections.iter().chain(self.chrome.iter())
    }

    /// Every behavior id the page will evaluate, deduplicated.
    pub fn behavior_ids(&self) -> BTreeSet<String> {
        self.elements()
            .flat_map(|e| e.assignments.iter().map(|a| a.behavior.clone()))
            .collect()
    }
}

/// Interpret `config` for `page`.
///
/// `forced_behavior` replaces the resolved set of every section with that single
/// behavior; the presentation behavior stays in front of it.
#[tracing::instrument(skip_all, fields(composition = %config.id))]
pub fn resolve(
    config: &CompositionConfig,
    page: &PageSpec,
    forced_behavior: Option<&str>,
) -> ResolvedComposition {
    let navigation = navigation_policy(config, page);
    let model = config.presentation.model;
    let mode = if config.bare_mode {
        DriverMode::None
    } else {
        driver_mode(config, &navigation)
    };
    let layout = LayoutConstraints {
        full_height_sections: config.presentation.layout.full_height_sections
            || matches!(
                model,
                PresentationModel::Slideshow | PresentationModel::InfiniteCarousel
            ),
        native_scroll_locked: matches!(mode, DriverMode::Momentum(_)),
        hide_inactive: config.presentation.hide_inactive,
        section_length: config.presentation.layout.section_length,
    };

    let sections = page
        .sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let element = ElementRef::section(section.id.clone(), index);
            let mut assignments = Vec::new();
            if !config.bare_mode {
                if let Some(injected) = model.injected_behavior() {
                    assignments.push(BehaviorAssignment::new(injected));
                }
                match forced_behavior {
                    Some(id) => assignments.push(BehaviorAssignment::new(id)),
                    None => assignments.extend(select(
                        &section.id,
                        &page.section_behaviors,
                        &config.section_behaviors,
                    )),
                }
                if section.pinned {
                    for a in &mut assignments {
                        a.pinned = true;
                    }
                }
            }
            ResolvedElement {
                element,
                assignments,
            }
        })
        .collect();

    let chrome = page
        .chrome
        .iter()
        .map(|id| ResolvedElement {
            element: ElementRef::new(id.clone()),
            assignments: if config.bare_mode {
                Vec::new()
            } else {
                select(id, &page.chrome_behaviors, &config.chrome_behaviors)
            },
        })
        .collect();

    tracing::debug!(
        model = model.as_str(),
        bare = config.bare_mode,
        sections = page.sections.len(),
        "composition resolved"
    );
    ResolvedComposition {
        composition: config.id.clone(),
        model,
        bare: config.bare_mode,
        mode,
        history: config.navigation.history,
        navigation,
        layout,
        sections,
        chrome,
    }
}

/// First present of page[id], composition[id], page[*], composition[*].
fn select(
    id: &str,
    page: &BTreeMap<String, Vec<BehaviorAssignment>>,
    composition: &BTreeMap<String, Vec<BehaviorAssignment>>,
) -> Vec<BehaviorAssignment> {
    page.get(id)
        .or_else(|| composition.get(id))
        .or_else(|| page.get(WILDCARD))
        .or_else(|| composition.get(WILDCARD))
        .cloned()
        .unwrap_or_default()
}

fn navigation_policy(config: &CompositionConfig, page: &PageSpec) -> NavigationPolicy {
    let nav = &config.navigation;
    let skip = if nav.skip_pinned {
        page.sections
            .iter()
            .enumerate()
            .filter(|(_, s)| s.pinned)
            .map(|(i, _)| i)
            .collect()
    } else {
        BTreeSet::new()
    };
    NavigationPolicy {
        channels: nav.channels,
        looping: nav.looping || config.presentation.model == PresentationModel::InfiniteCarousel,
        lock_during_transition: nav.lock_during_transition,
        debounce_ms: nav.debounce_ms,
        skip,
    }
}

fn driver_mode(config: &CompositionConfig, navigation: &NavigationPolicy) -> DriverMode {
    let presentation = &config.presentation;
    let momentum = |paged: bool| {
        DriverMode::Momentum(MomentumOptions {
            looping: navigation.looping,
            paged,
            section_length: presentation.layout.section_length,
            navigation: navigation.clone(),
            snap_duration_ms: Some(presentation.transition.duration_ms),
            snap_ease: Some(presentation.transition.ease),
            ..MomentumOptions::default()
        })
    };
    match presentation.model {
        PresentationModel::Stacking | PresentationModel::CoverScroll => {
            DriverMode::ScrollVisibility(ScrollOptions {
                active_section: config.navigation.active_section,
                ..ScrollOptions::default()
            })
        }
        PresentationModel::Slideshow => momentum(true),
        PresentationModel::InfiniteCarousel => momentum(false),
        PresentationModel::Static => DriverMode::None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/resolver.rs"]
mod tests;
