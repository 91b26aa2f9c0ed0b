use std::collections::HashMap;

use crate::behavior::assignment::BehaviorAssignment;
use crate::driver::engine::{DriverContext, DriverCore, DriverPhase, FrameReport};
use crate::driver::motion::{DriverKind, MotionDriver};
use crate::foundation::core::{ElementId, ElementRef, FrameTime, Size};
use crate::store::shared::{
    ACTIVE_SECTION, DRIVER_KIND, SCROLL_POSITION, SCROLL_VELOCITY, StoreValue, StoreWriter,
};
use crate::trigger::source::TriggerSource;

/// How the scroll driver picks the active section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActiveSectionStrategy {
    /// Largest intersection ratio; ties go to the earlier section.
    #[default]
    MostVisible,
    /// Lowest-index section above the visibility threshold.
    FirstVisible,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrollOptions {
    pub active_section: ActiveSectionStrategy,
    /// Viewport size until the host reports one.
    pub initial_viewport: Size,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            active_section: ActiveSectionStrategy::MostVisible,
            initial_viewport: Size::new(1280.0, 800.0),
        }
    }
}

/// Native-scroll driven engine with intersection tracking.
pub struct ScrollDriver {
    core: DriverCore,
    options: ScrollOptions,
    active: Option<usize>,
}

impl ScrollDriver {
    pub fn new(ctx: DriverContext, store: StoreWriter, options: ScrollOptions) -> Self {
        let mut core = DriverCore::new(ctx, store, options.initial_viewport);
        core.start_sources(&[
            TriggerSource::Scroll,
            TriggerSource::Resize,
            TriggerSource::Pointer,
            TriggerSource::Intersection,
            TriggerSource::PageVisibility,
        ]);
        core.store_set(DRIVER_KIND, StoreValue::Text(DriverKind::Scroll.as_str().to_owned()));
        Self {
            core,
            options,
            active: None,
        }
    }

    pub fn active_section(&self) -> Option<usize> {
        self.active
    }

    fn pick_active(&self, threshold: f64) -> Option<usize> {
        let sections = self.core.elements().filter_map(|e| {
            let index = e.section?;
            Some((index, self.core.acc.intersection_ratio(&e.id)))
        });
        match self.options.active_section {
            ActiveSectionStrategy::MostVisible => sections
                .filter(|(_, r)| *r > 0.0)
                .fold(None, |best: Option<(usize, f64)>, (i, r)| match best {
                    Some((bi, br)) if br > r || (br == r && bi < i) => Some((bi, br)),
                    _ => Some((i, r)),
                })
                .map(|(i, _)| i),
            ActiveSectionStrategy::FirstVisible => sections
                .filter(|(_, r)| *r > 0.0 && *r >= threshold)
                .map(|(i, _)| i)
                .min(),
        }
    }
}

impl MotionDriver for ScrollDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Scroll
    }

    fn phase(&self) -> DriverPhase {
        self.core.phase()
    }

    fn attach(&mut self, element: ElementRef, assignments: Vec<BehaviorAssignment>) {
        let id = element.id.clone();
        if self.core.attach(element, assignments)
            && let Some(host) = &self.core.ctx.host
        {
            host.observe(&self.core.ctx.container, &id);
        }
    }

    fn detach(&mut self, element: &ElementId) -> bool {
        if self.core.detach(element).is_none() {
            return false;
        }
        if let Some(host) = &self.core.ctx.host {
            host.unobserve(&self.core.ctx.container, element);
        }
        true
    }

    fn attached_count(&self) -> usize {
        self.core.attached_count()
    }

    fn tick(&mut self, now: FrameTime) -> FrameReport {
        if self.core.is_destroyed() {
            return self.core.idle_report();
        }
        self.core.ingest();
        if self.core.phase() != DriverPhase::Running {
            return self.core.idle_report();
        }
        let max_dt = self.core.ctx.config.max_frame_delta_ms;
        let threshold = self.core.ctx.config.intersection_threshold;
        self.core.acc.begin_frame(now, max_dt);
        let base = self.core.acc.snapshot();

        if let Some(active) = self.pick_active(threshold) {
            self.active = Some(active);
        }
        self.core
            .store_set(SCROLL_POSITION, StoreValue::Number(base.scroll.offset));
        self.core
            .store_set(SCROLL_VELOCITY, StoreValue::Number(base.scroll.velocity));
        if let Some(active) = self.active {
            self.core.store_set(ACTIVE_SECTION, StoreValue::Index(active));
        }

        let section_length = base.viewport.height;
        let signals: HashMap<ElementId, _> = self
            .core
            .elements()
            .map(|e| {
                let mut signal = self.core.acc.element_signal(&e.id, threshold);
                if let Some(index) = e.section {
                    signal.section_index = Some(index);
                    signal.section_length = section_length;
                    signal.section_offset = index as f64 * section_length - base.scroll.offset;
                }
                (e.id.clone(), signal)
            })
            .collect();

        let report = self.core.evaluate_and_write(&base, &signals);
        self.core.acc.end_frame();
        report
    }

    fn destroy(&mut self) {
        let remaining = self.core.destroy();
        if let Some(host) = &self.core.ctx.host {
            for element in remaining {
                host.unobserve(&self.core.ctx.container, &element.id);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/scroll.rs"]
mod tests;
