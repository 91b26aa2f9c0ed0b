use std::collections::VecDeque;

use crate::foundation::config::MomentumSettings;
use crate::foundation::core::{REFERENCE_FRAME_MS, wrap_into};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumMode {
    #[default]
    Idle,
    Free,
    Snapping,
    Dragging,
}

impl MomentumMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Free => "free",
            Self::Snapping => "snapping",
            Self::Dragging => "dragging",
        }
    }
}

/// Uniform section geometry of a track.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TrackGeometry {
    pub section_length: f64,
    pub section_count: usize,
}

impl TrackGeometry {
    pub fn new(section_length: f64, section_count: usize) -> Self {
        Self {
            section_length: section_length.max(0.0),
            section_count,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.section_length * self.section_count as f64
    }

    /// Fewer than two sections, or no length: nothing to scroll between.
    pub fn is_static(&self) -> bool {
        self.section_count < 2 || self.section_length <= 0.0
    }
}

/// Output of one [`MomentumPhysics::step`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct MomentumFrame {
    /// Position wrapped into `[0, total_length)` on looping tracks.
    pub position: f64,
    /// px/s.
    pub velocity: f64,
    pub mode: MomentumMode,
    pub active_section: usize,
    pub section_progress: f64,
}

#[derive(Clone, Copy, Debug)]
struct Snap {
    from: f64,
    /// Global section index the snap settles on.
    target: i64,
    elapsed: f64,
}

/// Frictional, snap-to-section track simulation.
///
/// The position is unbounded on looping tracks; section `g` of any lap starts at
/// `g * section_length`, and the reported position wraps modulo the total length.
/// Non-looping tracks stay within `[0, last section start]`, giving way past either end
/// with resistance and snapping back.
#[derive(Clone, Debug)]
pub struct MomentumPhysics {
    settings: MomentumSettings,
    looping: bool,
    paged: bool,
    geometry: TrackGeometry,
    pending_geometry: Option<TrackGeometry>,
    position: f64,
    velocity: f64,
    mode: MomentumMode,
    snap: Option<Snap>,
    clock_ms: f64,
    drag_samples: VecDeque<(f64, f64)>,
    drag_origin: i64,
}

impl MomentumPhysics {
    pub fn new(settings: MomentumSettings, geometry: TrackGeometry, looping: bool, paged: bool) -> Self {
        Self {
            settings,
            looping,
            paged,
            geometry,
            pending_geometry: None,
            position: 0.0,
            velocity: 0.0,
            mode: MomentumMode::Idle,
            snap: None,
            clock_ms: 0.0,
            drag_samples: VecDeque::new(),
            drag_origin: 0,
        }
    }

    pub fn mode(&self) -> MomentumMode {
        self.mode
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.geometry
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn is_paged(&self) -> bool {
        self.paged
    }

    /// Reported (wrapped) position.
    pub fn position(&self) -> f64 {
        if self.looping && !self.geometry.is_static() {
            wrap_into(self.position, self.geometry.total_length())
        } else {
            self.position
        }
    }

    pub fn active_section(&self) -> usize {
        self.section_of(self.position).0
    }

    /// Section that navigation steps are counted from: the snap target while snapping,
    /// otherwise the nearest boundary.
    pub fn anchor_section(&self) -> usize {
        let n = self.geometry.section_count as i64;
        if n == 0 {
            return 0;
        }
        self.anchor_global().rem_euclid(n) as usize
    }

    /// `true` while a snap animation is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.mode == MomentumMode::Snapping
    }

    /// Replace the geometry. Applied at once when idle, otherwise at the start of the
    /// next step so an in-flight gesture never sees boundaries move mid-frame.
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        if geometry == self.geometry {
            self.pending_geometry = None;
            return;
        }
        self.pending_geometry = Some(geometry);
        if self.mode == MomentumMode::Idle {
            self.apply_pending_geometry();
        }
    }

    /// Add a velocity impulse (px/s). Cancels an in-flight snap; a reversal replaces the
    /// current velocity instead of fighting it.
    pub fn impulse(&mut self, velocity: f64) {
        if self.geometry.is_static() || !velocity.is_finite() || velocity == 0.0 {
            return;
        }
        if self.mode == MomentumMode::Dragging {
            return;
        }
        self.snap = None;
        if self.mode == MomentumMode::Free && self.velocity.signum() == velocity.signum() {
            self.velocity += velocity;
        } else {
            self.velocity = velocity;
        }
        self.mode = MomentumMode::Free;
    }

    pub fn drag_start(&mut self) {
        if self.geometry.is_static() {
            return;
        }
        self.drag_origin = self.anchor_global();
        self.snap = None;
        self.velocity = 0.0;
        self.drag_samples.clear();
        self.mode = MomentumMode::Dragging;
    }

    /// Move by `delta` px, positive toward later sections.
    pub fn drag_move(&mut self, delta: f64) {
        if self.mode != MomentumMode::Dragging || !delta.is_finite() {
            return;
        }
        self.position += self.resisted(delta);
        self.drag_samples.push_back((self.clock_ms, delta));
        self.trim_samples();
    }

    /// Release the drag, continuing with the sampled velocity.
    pub fn drag_end(&mut self) {
        if self.mode != MomentumMode::Dragging {
            return;
        }
        self.trim_samples();
        let velocity = self.sampled_velocity();
        self.drag_samples.clear();

        if self.paged {
            let target = if velocity.abs() >= self.settings.flick_velocity {
                self.drag_origin + velocity.signum() as i64
            } else {
                self.nearest_global()
            };
            self.begin_snap(target);
        } else if velocity.abs() >= self.settings.velocity_epsilon {
            self.velocity = velocity;
            self.mode = MomentumMode::Free;
        } else {
            let target = self.nearest_global();
            self.begin_snap(target);
        }
    }

    /// Move `step` sections from the current anchor (the snap target while snapping).
    pub fn navigate_by(&mut self, step: isize) {
        if self.geometry.is_static() || self.mode == MomentumMode::Dragging {
            return;
        }
        let anchor = self.anchor_global();
        self.begin_snap(anchor + step as i64);
    }

    /// Snap to section `index` of the current lap, taking the short way round on loops.
    pub fn navigate_to(&mut self, index: usize) {
        let n = self.geometry.section_count as i64;
        if n == 0 {
            return;
        }
        let anchor = self.anchor_global();
        let mut delta = index.min(self.geometry.section_count - 1) as i64 - anchor.rem_euclid(n);
        if self.looping {
            if delta > n / 2 {
                delta -= n;
            } else if delta < -(n / 2) {
                delta += n;
            }
        }
        self.navigate_by(delta as isize);
    }

    /// Advance the simulation by `dt_ms`.
    pub fn step(&mut self, dt_ms: f64) -> MomentumFrame {
        let dt = dt_ms.max(0.0);
        self.clock_ms += dt;
        self.apply_pending_geometry();

        if self.geometry.is_static() {
            self.position = 0.0;
            self.velocity = 0.0;
            self.snap = None;
            if self.mode != MomentumMode::Dragging {
                self.mode = MomentumMode::Idle;
            }
            return self.frame();
        }

        match self.mode {
            MomentumMode::Idle => self.velocity = 0.0,
            MomentumMode::Dragging => {
                self.trim_samples();
                self.velocity = self.sampled_velocity();
            }
            MomentumMode::Free => self.coast(dt),
            MomentumMode::Snapping => self.advance_snap(dt),
        }
        self.frame()
    }

    fn coast(&mut self, dt: f64) {
        let frames = dt / REFERENCE_FRAME_MS;
        let outside = self.overshoot() != 0.0;
        self.position += self.velocity * dt / 1000.0;
        self.velocity *= self.settings.friction.powf(frames);
        if outside {
            self.velocity *= self.settings.overscroll_resistance.powf(frames);
        }
        if self.velocity.abs() < self.settings.velocity_epsilon {
            self.velocity = 0.0;
            let target = self.nearest_global();
            self.begin_snap(target);
        }
    }

    fn advance_snap(&mut self, dt: f64) {
        let Some(mut snap) = self.snap else {
            self.mode = MomentumMode::Idle;
            return;
        };
        snap.elapsed += dt;
        let duration = self.settings.snap_duration_ms;
        let t = if duration <= 0.0 {
            1.0
        } else {
            (snap.elapsed / duration).min(1.0)
        };
        let to = snap.target as f64 * self.geometry.section_length;
        let next = snap.from + (to - snap.from) * self.settings.snap_ease.apply(t);
        self.velocity = if dt > 0.0 {
            (next - self.position) / dt * 1000.0
        } else {
            0.0
        };
        self.position = next;
        if t >= 1.0 {
            self.settle(snap.target);
        } else {
            self.snap = Some(snap);
        }
    }

    fn begin_snap(&mut self, target: i64) {
        let target = self.clamp_global(target);
        let to = target as f64 * self.geometry.section_length;
        if (to - self.position).abs() < 1e-9 {
            self.settle(target);
            return;
        }
        self.snap = Some(Snap {
            from: self.position,
            target,
            elapsed: 0.0,
        });
        self.mode = MomentumMode::Snapping;
    }

    fn settle(&mut self, target: i64) {
        let n = self.geometry.section_count as i64;
        let index = if self.looping {
            target.rem_euclid(n)
        } else {
            target
        };
        self.position = index as f64 * self.geometry.section_length;
        self.velocity = 0.0;
        self.snap = None;
        self.mode = MomentumMode::Idle;
    }

    fn apply_pending_geometry(&mut self) {
        let Some(next) = self.pending_geometry.take() else {
            return;
        };
        let old = self.geometry;
        if old.section_length > 0.0 && next.section_length > 0.0 {
            let scale = next.section_length / old.section_length;
            self.position *= scale;
            self.velocity *= scale;
            if let Some(s) = &mut self.snap {
                s.from *= scale;
            }
        }
        self.geometry = next;
        if next.is_static() {
            return;
        }
        if let Some(s) = self.snap {
            self.snap = Some(Snap {
                target: self.clamp_global(s.target),
                ..s
            });
        }
        if !self.looping && self.mode == MomentumMode::Idle {
            let target = self.nearest_global();
            self.settle(target);
        }
    }

    fn max_position(&self) -> f64 {
        self.geometry.section_count.saturating_sub(1) as f64 * self.geometry.section_length
    }

    /// Distance past either end of a non-looping track; `0` inside.
    fn overshoot(&self) -> f64 {
        if self.looping {
            return 0.0;
        }
        let max = self.max_position();
        if self.position < 0.0 {
            self.position
        } else if self.position > max {
            self.position - max
        } else {
            0.0
        }
    }

    fn resisted(&self, delta: f64) -> f64 {
        let over = self.overshoot();
        if over != 0.0 && over.signum() == delta.signum() {
            delta * self.settings.overscroll_resistance
        } else {
            delta
        }
    }

    fn anchor_global(&self) -> i64 {
        match self.snap {
            Some(s) => s.target,
            None => self.nearest_global(),
        }
    }

    fn nearest_global(&self) -> i64 {
        let len = self.geometry.section_length;
        if len <= 0.0 {
            return 0;
        }
        self.clamp_global((self.position / len).round() as i64)
    }

    fn clamp_global(&self, g: i64) -> i64 {
        if self.looping {
            g
        } else {
            g.clamp(0, self.geometry.section_count.saturating_sub(1) as i64)
        }
    }

    /// (active section, progress into it) for a raw position.
    fn section_of(&self, raw: f64) -> (usize, f64) {
        let g = self.geometry;
        if g.is_static() {
            return (0, 0.0);
        }
        let n = g.section_count;
        let pos = if self.looping {
            wrap_into(raw, g.total_length())
        } else {
            raw.clamp(0.0, self.max_position())
        };
        let units = pos / g.section_length;
        let active = (units.floor() as usize).min(n - 1);
        (active, units - units.floor())
    }

    fn trim_samples(&mut self) {
        let cutoff = self.clock_ms - self.settings.drag_window_ms;
        while self
            .drag_samples
            .front()
            .is_some_and(|(t, _)| *t < cutoff)
        {
            self.drag_samples.pop_front();
        }
    }

    fn sampled_velocity(&self) -> f64 {
        let Some((oldest, _)) = self.drag_samples.front() else {
            return 0.0;
        };
        let span = (self.clock_ms - oldest).max(REFERENCE_FRAME_MS);
        let distance: f64 = self.drag_samples.iter().map(|(_, d)| d).sum();
        distance / span * 1000.0
    }

    fn frame(&self) -> MomentumFrame {
        let (active_section, section_progress) = self.section_of(self.position);
        MomentumFrame {
            position: self.position(),
            velocity: self.velocity,
            mode: self.mode,
            active_section,
            section_progress,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/physics.rs"]
mod tests;
