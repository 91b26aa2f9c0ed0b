use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::foundation::core::{ContainerKey, ElementId, FrameTime, REFERENCE_FRAME_MS};
use crate::host::platform::{
    EventHandler, EventKind, FrameCallback, FrameLoopId, Host, HostEvent, ListenerId,
    ListenerOptions,
};

struct Listener {
    container: ContainerKey,
    kind: EventKind,
    options: ListenerOptions,
    // `None` while the handler is running.
    handler: Option<EventHandler>,
}

struct FrameLoop {
    container: ContainerKey,
    callback: Option<FrameCallback>,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    now_ms: f64,
    listeners: BTreeMap<ListenerId, Listener>,
    loops: BTreeMap<FrameLoopId, FrameLoop>,
    observed: BTreeSet<(ContainerKey, ElementId)>,
    scroll_locked: BTreeSet<ContainerKey>,
}

impl Inner {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Deterministic in-process host.
///
/// Events are delivered with [`dispatch`](Self::dispatch) and repaints are simulated with
/// [`advance_frame`](Self::advance_frame). Listener, frame-loop and observer counts are
/// exposed so teardown can be checked against a baseline.
pub struct SimulatedHost {
    frame_ms: f64,
    inner: RefCell<Inner>,
}

impl SimulatedHost {
    /// Host repainting at 60 Hz.
    pub fn new() -> Rc<Self> {
        Self::with_frame_interval(REFERENCE_FRAME_MS)
    }

    pub fn with_frame_interval(frame_ms: f64) -> Rc<Self> {
        Rc::new(Self {
            frame_ms,
            inner: RefCell::new(Inner::default()),
        })
    }

    pub fn now(&self) -> FrameTime {
        FrameTime(self.inner.borrow().now_ms)
    }

    /// Deliver `event` to every matching listener on `container`. Returns how many ran.
    pub fn dispatch(&self, container: &ContainerKey, event: HostEvent) -> usize {
        let kind = event.kind();
        let ids: Vec<ListenerId> = {
            let inner = self.inner.borrow();
            let mut ids: Vec<(bool, ListenerId)> = inner
                .listeners
                .iter()
                .filter(|(_, l)| &l.container == container && l.kind == kind)
                .map(|(id, l)| (!l.options.capture, *id))
                .collect();
            // Capturing listeners run first.
            ids.sort();
            ids.into_iter().map(|(_, id)| id).collect()
        };

        let mut ran = 0;
        for id in ids {
            let handler = self
                .inner
                .borrow_mut()
                .listeners
                .get_mut(&id)
                .and_then(|l| l.handler.take());
            let Some(mut handler) = handler else {
                continue;
            };
            handler(&event);
            ran += 1;
            if let Some(l) = self.inner.borrow_mut().listeners.get_mut(&id) {
                l.handler = Some(handler);
            }
        }
        ran
    }

    /// Advance the clock by one frame interval and run every frame loop.
    pub fn advance_frame(&self) -> FrameTime {
        self.advance_by(self.frame_ms)
    }

    pub fn advance_frames(&self, n: usize) -> FrameTime {
        let mut now = self.now();
        for _ in 0..n {
            now = self.advance_frame();
        }
        now
    }

    /// Advance the clock by `ms` and run every frame loop once.
    pub fn advance_by(&self, ms: f64) -> FrameTime {
        let (now, ids) = {
            let mut inner = self.inner.borrow_mut();
            inner.now_ms += ms.max(0.0);
            let ids: Vec<FrameLoopId> = inner.loops.keys().copied().collect();
            (FrameTime(inner.now_ms), ids)
        };

        for id in ids {
            let callback = self
                .inner
                .borrow_mut()
                .loops
                .get_mut(&id)
                .and_then(|l| l.callback.take());
            let Some(mut callback) = callback else {
                continue;
            };
            callback(now);
            if let Some(l) = self.inner.borrow_mut().loops.get_mut(&id) {
                l.callback = Some(callback);
            }
        }
        now
    }

    /// Active listeners, optionally restricted to one container.
    pub fn listener_count(&self, container: Option<&ContainerKey>) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|l| container.is_none_or(|c| &l.container == c))
            .count()
    }

    /// Active listeners that suppress the native default.
    pub fn intercepting_listener_count(&self, container: &ContainerKey) -> usize {
        self.inner
            .borrow()
            .listeners
            .values()
            .filter(|l| &l.container == container && l.options.prevent_default)
            .count()
    }

    pub fn frame_loop_count(&self, container: Option<&ContainerKey>) -> usize {
        self.inner
            .borrow()
            .loops
            .values()
            .filter(|l| container.is_none_or(|c| &l.container == c))
            .count()
    }

    pub fn observed_count(&self, container: Option<&ContainerKey>) -> usize {
        self.inner
            .borrow()
            .observed
            .iter()
            .filter(|(c, _)| container.is_none_or(|k| c == k))
            .count()
    }

    pub fn is_observed(&self, container: &ContainerKey, element: &ElementId) -> bool {
        self.inner
            .borrow()
            .observed
            .contains(&(container.clone(), element.clone()))
    }

    pub fn native_scroll_enabled(&self, container: &ContainerKey) -> bool {
        !self.inner.borrow().scroll_locked.contains(container)
    }

    /// Sum of listeners, frame loops and observers attributable to `container`.
    pub fn resource_count(&self, container: &ContainerKey) -> usize {
        self.listener_count(Some(container))
            + self.frame_loop_count(Some(container))
            + self.observed_count(Some(container))
    }
}

impl Host for SimulatedHost {
    fn add_listener(
        &self,
        container: &ContainerKey,
        kind: EventKind,
        options: ListenerOptions,
        handler: EventHandler,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next());
        inner.listeners.insert(
            id,
            Listener {
                container: container.clone(),
                kind,
                options,
                handler: Some(handler),
            },
        );
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.borrow_mut().listeners.remove(&id);
    }

    fn start_frame_loop(&self, container: &ContainerKey, callback: FrameCallback) -> FrameLoopId {
        let mut inner = self.inner.borrow_mut();
        let id = FrameLoopId(inner.next());
        inner.loops.insert(
            id,
            FrameLoop {
                container: container.clone(),
                callback: Some(callback),
            },
        );
        id
    }

    fn cancel_frame_loop(&self, id: FrameLoopId) {
        self.inner.borrow_mut().loops.remove(&id);
    }

    fn observe(&self, container: &ContainerKey, element: &ElementId) {
        self.inner
            .borrow_mut()
            .observed
            .insert((container.clone(), element.clone()));
    }

    fn unobserve(&self, container: &ContainerKey, element: &ElementId) {
        self.inner
            .borrow_mut()
            .observed
            .remove(&(container.clone(), element.clone()));
    }

    fn set_native_scroll(&self, container: &ContainerKey, enabled: bool) {
        let mut inner = self.inner.borrow_mut();
        if enabled {
            inner.scroll_locked.remove(container);
        } else {
            inner.scroll_locked.insert(container.clone());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/simulated.rs"]
mod tests;
