use std::collections::HashMap;

use crate::foundation::core::{ElementId, FrameTime, Point, REFERENCE_FRAME_MS, Size, Vec2};

/// Trigger-state fields a behavior may read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerField {
    Scroll,
    Viewport,
    Pointer,
    Wheel,
    Time,
    /// Per-element intersection ratio. Behaviors reading it are skipped for hidden elements.
    Visibility,
    /// Momentum track position and section geometry.
    Track,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    #[default]
    None,
    Forward,
    Backward,
}

impl ScrollDirection {
    fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Self::Forward
        } else if delta < 0.0 {
            Self::Backward
        } else {
            Self::None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct ScrollSignal {
    /// Scroll offset in px.
    pub offset: f64,
    /// Largest reachable offset; `0` when unknown.
    pub max_offset: f64,
    /// px/s, positive when moving forward.
    pub velocity: f64,
    pub direction: ScrollDirection,
    /// `offset / max_offset` clamped to `[0, 1]`.
    pub progress: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct PointerSignal {
    pub position: Point,
    /// Position relative to the viewport center, each axis in `[-1, 1]`.
    pub normalized: Vec2,
    /// Movement accumulated during the current frame.
    pub delta: Vec2,
    pub inside: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct TimeSignal {
    pub elapsed_ms: f64,
    pub delta_ms: f64,
    pub frame: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct TrackSignal {
    /// Virtual position, wrapped into `[0, total_length)` on looping tracks.
    pub position: f64,
    pub velocity: f64,
    pub total_length: f64,
    pub section_count: usize,
    pub active_section: usize,
    /// Progress through the active section in `[0, 1)`.
    pub section_progress: f64,
}

/// Signals specific to the element being evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct ElementSignal {
    pub intersection_ratio: f64,
    pub visible: bool,
    pub section_index: Option<usize>,
    /// Signed distance (px) from the track position to this section's start.
    pub section_offset: f64,
    pub section_length: f64,
}

/// Read-only snapshot handed to behaviors once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct TriggerState {
    pub scroll: ScrollSignal,
    pub viewport: Size,
    pub pointer: PointerSignal,
    /// Wheel delta accumulated during the current frame.
    pub wheel: Vec2,
    pub time: TimeSignal,
    pub track: TrackSignal,
    pub element: ElementSignal,
}

impl TriggerState {
    /// Copy of this snapshot focused on one element.
    pub fn for_element(&self, element: ElementSignal) -> TriggerState {
        TriggerState { element, ..*self }
    }
}

/// Discrete navigation keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavKey {
    Next,
    Previous,
    First,
    Last,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

/// An immutable piece of input produced by a trigger source.
#[derive(Clone, Debug, PartialEq)]
pub enum TriggerFragment {
    Scroll { offset: f64, max_offset: f64 },
    Resize { viewport: Size },
    Pointer { position: Point },
    PointerLeave,
    Wheel { delta: Vec2 },
    Touch { phase: TouchPhase, position: Point },
    Key(NavKey),
    Intersection { element: ElementId, ratio: f64 },
    PageVisibility { hidden: bool },
    /// Navigation to the element with this id.
    Anchor(ElementId),
}

/// Folds fragments into the next [`TriggerState`].
///
/// Owned by exactly one driver. Per frame: fold fragments, [`begin_frame`](Self::begin_frame),
/// optionally [`set_track`](Self::set_track), take a [`snapshot`](Self::snapshot), then
/// [`end_frame`](Self::end_frame).
#[derive(Debug, Default)]
pub struct TriggerAccumulator {
    state: TriggerState,
    intersections: HashMap<ElementId, f64>,
    start: Option<FrameTime>,
    last_frame: Option<FrameTime>,
    offset_at_last_frame: f64,
    page_hidden: bool,
}

impl TriggerAccumulator {
    pub fn new(viewport: Size) -> Self {
        Self {
            state: TriggerState {
                viewport,
                ..TriggerState::default()
            },
            ..Self::default()
        }
    }

    pub fn fold(&mut self, fragment: &TriggerFragment) {
        match fragment {
            TriggerFragment::Scroll { offset, max_offset } => {
                self.state.scroll.offset = *offset;
                self.state.scroll.max_offset = max_offset.max(0.0);
            }
            TriggerFragment::Resize { viewport } => self.state.viewport = *viewport,
            TriggerFragment::Pointer { position } => {
                let p = &mut self.state.pointer;
                if p.inside {
                    p.delta += *position - p.position;
                }
                p.position = *position;
                p.inside = true;
            }
            TriggerFragment::PointerLeave => {
                self.state.pointer.inside = false;
            }
            TriggerFragment::Wheel { delta } => self.state.wheel += *delta,
            TriggerFragment::Intersection { element, ratio } => {
                self.intersections
                    .insert(element.clone(), ratio.clamp(0.0, 1.0));
            }
            TriggerFragment::PageVisibility { hidden } => self.page_hidden = *hidden,
            TriggerFragment::Touch { .. }
            | TriggerFragment::Key(_)
            | TriggerFragment::Anchor(_) => {}
        }
    }

    pub fn page_hidden(&self) -> bool {
        self.page_hidden
    }

    /// Advance the clock and derive velocities. Returns the clamped frame delta in ms.
    pub fn begin_frame(&mut self, now: FrameTime, max_delta_ms: f64) -> f64 {
        let start = *self.start.get_or_insert(now);
        let dt = match self.last_frame {
            Some(last) => now.since(last).min(max_delta_ms),
            None => REFERENCE_FRAME_MS.min(max_delta_ms),
        };
        self.last_frame = Some(now);

        let time = &mut self.state.time;
        time.elapsed_ms = now.since(start);
        time.delta_ms = dt;
        time.frame += 1;

        let scroll = &mut self.state.scroll;
        let moved = scroll.offset - self.offset_at_last_frame;
        scroll.velocity = if dt > 0.0 { moved / dt * 1000.0 } else { 0.0 };
        scroll.direction = ScrollDirection::from_delta(moved);
        scroll.progress = if scroll.max_offset > 0.0 {
            (scroll.offset / scroll.max_offset).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.offset_at_last_frame = scroll.offset;

        let vp = self.state.viewport;
        let p = &mut self.state.pointer;
        p.normalized = if p.inside && vp.width > 0.0 && vp.height > 0.0 {
            Vec2::new(
                (p.position.x / vp.width * 2.0 - 1.0).clamp(-1.0, 1.0),
                (p.position.y / vp.height * 2.0 - 1.0).clamp(-1.0, 1.0),
            )
        } else {
            Vec2::ZERO
        };
        dt
    }

    /// Publish momentum track state; the scroll signal mirrors the track position.
    pub fn set_track(&mut self, track: TrackSignal) {
        self.state.track = track;
        let scroll = &mut self.state.scroll;
        scroll.offset = track.position;
        scroll.max_offset = track.total_length;
        scroll.velocity = track.velocity;
        scroll.direction = ScrollDirection::from_delta(track.velocity);
        scroll.progress = if track.total_length > 0.0 {
            (track.position / track.total_length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.offset_at_last_frame = track.position;
    }

    pub fn snapshot(&self) -> TriggerState {
        self.state
    }

    /// Reset per-frame deltas.
    pub fn end_frame(&mut self) {
        self.state.wheel = Vec2::ZERO;
        self.state.pointer.delta = Vec2::ZERO;
    }

    pub fn intersection_ratio(&self, element: &ElementId) -> f64 {
        self.intersections.get(element).copied().unwrap_or(0.0)
    }

    /// Visibility part of an [`ElementSignal`].
    pub fn element_signal(&self, element: &ElementId, threshold: f64) -> ElementSignal {
        let ratio = self.intersection_ratio(element);
        ElementSignal {
            intersection_ratio: ratio,
            visible: ratio > 0.0 && ratio >= threshold,
            ..ElementSignal::default()
        }
    }

    pub fn forget_element(&mut self, element: &ElementId) {
        self.intersections.remove(element);
    }

    /// Iterate known intersection ratios.
    pub fn intersections(&self) -> impl Iterator<Item = (&ElementId, f64)> {
        self.intersections.iter().map(|(k, v)| (k, *v))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/state.rs"]
mod tests;
