use std::collections::HashMap;

use crate::animation::ease::Ease;
use crate::behavior::assignment::BehaviorAssignment;
use crate::composition::navigation::{NavigationGate, NavigationPolicy};
use crate::driver::engine::{DriverContext, DriverCore, DriverPhase, FrameReport};
use crate::driver::motion::{DriverKind, MotionDriver};
use crate::driver::physics::{MomentumFrame, MomentumPhysics, TrackGeometry};
use crate::foundation::core::{ElementId, ElementRef, FrameTime, Size, wrap_into};
use crate::store::shared::{
    ACTIVE_SECTION, DRIVER_KIND, MOMENTUM_MODE, SCROLL_POSITION, SCROLL_VELOCITY, StoreValue,
    StoreWriter,
};
use crate::trigger::source::TriggerSource;
use crate::trigger::state::{NavKey, TouchPhase, TrackSignal, TriggerFragment};

#[derive(Clone, Debug, PartialEq)]
pub struct MomentumOptions {
    /// Wrap the track end to end.
    pub looping: bool,
    /// Wheel and touch move whole sections instead of coasting.
    pub paged: bool,
    /// Fixed section length; defaults to the viewport height.
    pub section_length: Option<f64>,
    pub initial_viewport: Size,
    pub navigation: NavigationPolicy,
    /// Replaces the configured snap duration.
    pub snap_duration_ms: Option<f64>,
    pub snap_ease: Option<Ease>,
}

impl Default for MomentumOptions {
    fn default() -> Self {
        Self {
            looping: true,
            paged: false,
            section_length: None,
            initial_viewport: Size::new(1280.0, 800.0),
            navigation: NavigationPolicy::default(),
            snap_duration_ms: None,
            snap_ease: None,
        }
    }
}

/// Physics-driven track owning its container's scrolling.
///
/// Native scrolling is suppressed while the driver lives. Wheel and touch input is
/// captured ahead of the platform and turned into impulses or drags; keys (and wheel
/// in paged mode) become discrete section commands gated by the navigation policy.
pub struct MomentumDriver {
    core: DriverCore,
    options: MomentumOptions,
    physics: MomentumPhysics,
    gate: NavigationGate,
    touch_y: Option<f64>,
    last_frame: Option<MomentumFrame>,
}

impl MomentumDriver {
    pub fn new(ctx: DriverContext, store: StoreWriter, options: MomentumOptions) -> Self {
        let mut settings = ctx.config.momentum.clone();
        if let Some(ms) = options.snap_duration_ms {
            settings.snap_duration_ms = ms;
        }
        if let Some(ease) = options.snap_ease {
            settings.snap_ease = ease;
        }
        let channels = options.navigation.channels;
        let mut core = DriverCore::new(ctx, store, options.initial_viewport);

        let mut sources = vec![
            TriggerSource::Resize,
            TriggerSource::Intersection,
            TriggerSource::PageVisibility,
        ];
        if channels.wheel {
            sources.push(TriggerSource::Wheel { intercept: true });
        }
        if channels.touch {
            sources.push(TriggerSource::Touch { intercept: true });
        }
        if channels.keyboard {
            sources.push(TriggerSource::Keyboard);
        }
        if channels.anchors {
            sources.push(TriggerSource::Anchor { intercept: true });
        }
        core.start_sources(&sources);
        if let Some(host) = &core.ctx.host {
            host.set_native_scroll(&core.ctx.container, false);
        }
        core.store_set(
            DRIVER_KIND,
            StoreValue::Text(DriverKind::Momentum.as_str().to_owned()),
        );

        let length = options
            .section_length
            .unwrap_or(options.initial_viewport.height);
        let physics = MomentumPhysics::new(
            settings,
            TrackGeometry::new(length, 0),
            options.looping,
            options.paged,
        );
        Self {
            core,
            gate: NavigationGate::new(options.navigation.clone()),
            options,
            physics,
            touch_y: None,
            last_frame: None,
        }
    }

    pub fn physics(&self) -> &MomentumPhysics {
        &self.physics
    }

    /// Most recent simulated frame.
    pub fn last_frame(&self) -> Option<MomentumFrame> {
        self.last_frame
    }

    /// Snap to section `index`, bypassing the navigation gate.
    pub fn navigate_to(&mut self, index: usize) {
        self.physics.navigate_to(index);
    }

    /// Apply a velocity impulse (px/s) as if it came from the wheel.
    pub fn impulse(&mut self, velocity: f64) {
        self.physics.impulse(velocity);
    }

    fn section_count(&self) -> usize {
        self.core
            .elements()
            .filter_map(|e| e.section)
            .max()
            .map_or(0, |m| m + 1)
    }

    fn refresh_geometry(&mut self) {
        let length = self
            .options
            .section_length
            .unwrap_or(self.core.acc.snapshot().viewport.height);
        let count = self.section_count();
        self.physics.set_geometry(TrackGeometry::new(length, count));
    }

    fn navigate(&mut self, key: NavKey, now: FrameTime) {
        let count = self.physics.geometry().section_count;
        let current = self.physics.anchor_section();
        let transitioning = self.physics.is_transitioning();
        if let Some(step) = self.gate.accept(key, now, current, count, transitioning) {
            self.physics.navigate_by(step);
        }
    }

    /// Jump to the section a link names. Bypasses the navigation gate.
    fn follow_anchor(&mut self, target: &ElementId) {
        let index = self
            .core
            .elements()
            .find(|e| &e.id == target)
            .and_then(|e| e.section);
        match index {
            Some(index) => self.physics.navigate_to(index),
            None => tracing::debug!(%target, "anchor does not name a section"),
        }
    }

    fn handle(&mut self, fragment: TriggerFragment, now: FrameTime) {
        let gain = self.core.ctx.config.momentum.wheel_gain;
        match fragment {
            TriggerFragment::Wheel { delta } => {
                if delta.y == 0.0 {
                    return;
                }
                if self.physics.is_paged() {
                    let key = if delta.y > 0.0 {
                        NavKey::Next
                    } else {
                        NavKey::Previous
                    };
                    self.navigate(key, now);
                } else {
                    self.physics.impulse(delta.y * gain);
                }
            }
            TriggerFragment::Touch { phase, position } => match phase {
                TouchPhase::Start => {
                    self.touch_y = Some(position.y);
                    self.physics.drag_start();
                }
                TouchPhase::Move => {
                    if let Some(last) = self.touch_y.replace(position.y) {
                        self.physics.drag_move(last - position.y);
                    }
                }
                TouchPhase::End => {
                    self.touch_y = None;
                    self.physics.drag_end();
                }
            },
            TriggerFragment::Key(key) => self.navigate(key, now),
            TriggerFragment::Anchor(target) => self.follow_anchor(&target),
            TriggerFragment::Resize { .. } => self.refresh_geometry(),
            _ => {}
        }
    }
}

impl MotionDriver for MomentumDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Momentum
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
        self.refresh_geometry();
    }

    fn detach(&mut self, element: &ElementId) -> bool {
        if self.core.detach(element).is_none() {
            return false;
        }
        if let Some(host) = &self.core.ctx.host {
            host.unobserve(&self.core.ctx.container, element);
        }
        self.refresh_geometry();
        true
    }

    fn attached_count(&self) -> usize {
        self.core.attached_count()
    }

    fn tick(&mut self, now: FrameTime) -> FrameReport {
        if self.core.is_destroyed() {
            return self.core.idle_report();
        }
        for fragment in self.core.ingest() {
            self.handle(fragment, now);
        }
        if self.core.phase() != DriverPhase::Running {
            return self.core.idle_report();
        }

        let max_dt = self.core.ctx.config.max_frame_delta_ms;
        let threshold = self.core.ctx.config.intersection_threshold;
        let dt = self.core.acc.begin_frame(now, max_dt);
        let frame = self.physics.step(dt);
        self.last_frame = Some(frame);

        let geometry = self.physics.geometry();
        let total = geometry.total_length();
        self.core.acc.set_track(TrackSignal {
            position: frame.position,
            velocity: frame.velocity,
            total_length: total,
            section_count: geometry.section_count,
            active_section: frame.active_section,
            section_progress: frame.section_progress,
        });

        // Store first: consumers reading this frame see the position used for rendering.
        self.core
            .store_set(SCROLL_POSITION, StoreValue::Number(frame.position));
        self.core
            .store_set(SCROLL_VELOCITY, StoreValue::Number(frame.velocity));
        self.core
            .store_set(ACTIVE_SECTION, StoreValue::Index(frame.active_section));
        self.core.store_set(
            MOMENTUM_MODE,
            StoreValue::Text(frame.mode.as_str().to_owned()),
        );

        let base = self.core.acc.snapshot();
        let looping = self.physics.is_looping() && total > 0.0;
        let signals: HashMap<ElementId, _> = self
            .core
            .elements()
            .map(|e| {
                let mut signal = self.core.acc.element_signal(&e.id, threshold);
                if let Some(index) = e.section {
                    let raw = index as f64 * geometry.section_length - frame.position;
                    signal.section_index = Some(index);
                    signal.section_length = geometry.section_length;
                    signal.section_offset = if looping {
                        wrap_into(raw + total / 2.0, total) - total / 2.0
                    } else {
                        raw
                    };
                }
                (e.id.clone(), signal)
            })
            .collect();

        let report = self.core.evaluate_and_write(&base, &signals);
        self.core.acc.end_frame();
        report
    }

    fn destroy(&mut self) {
        if self.core.is_destroyed() {
            return;
        }
        let remaining = self.core.destroy();
        if let Some(host) = &self.core.ctx.host {
            for element in remaining {
                host.unobserve(&self.core.ctx.container, &element.id);
            }
            host.set_native_scroll(&self.core.ctx.container, true);
        }
    }

    fn as_momentum(&mut self) -> Option<&mut MomentumDriver> {
        Some(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/momentum.rs"]
mod tests;
