use std::rc::Rc;

use crate::foundation::core::{ContainerKey, ElementId, FrameTime};

/// Categories of host events a listener can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Scroll,
    Resize,
    Pointer,
    Wheel,
    Touch,
    Key,
    Intersection,
    Visibility,
    Anchor,
}

/// Raw platform events, as delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Scroll { offset: f64, max_offset: f64 },
    Resize { width: f64, height: f64 },
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    Wheel { delta_x: f64, delta_y: f64 },
    TouchStart { x: f64, y: f64 },
    TouchMove { x: f64, y: f64 },
    TouchEnd,
    Key { key: String },
    Intersection { element: ElementId, ratio: f64 },
    VisibilityChange { hidden: bool },
    /// In-page link followed; `fragment` is the target id, with or without `#`.
    AnchorNavigate { fragment: String },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Scroll { .. } => EventKind::Scroll,
            Self::Resize { .. } => EventKind::Resize,
            Self::PointerMove { .. } | Self::PointerLeave => EventKind::Pointer,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::TouchStart { .. } | Self::TouchMove { .. } | Self::TouchEnd => EventKind::Touch,
            Self::Key { .. } => EventKind::Key,
            Self::Intersection { .. } => EventKind::Intersection,
            Self::VisibilityChange { .. } => EventKind::Visibility,
            Self::AnchorNavigate { .. } => EventKind::Anchor,
        }
    }
}

/// How a listener is installed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ListenerOptions {
    /// Run during the capture phase, before descendants see the event.
    pub capture: bool,
    /// Cancel the platform's default action (native scrolling).
    pub prevent_default: bool,
}

impl ListenerOptions {
    /// Passive bubbling listener.
    pub const PASSIVE: Self = Self {
        capture: false,
        prevent_default: false,
    };

    /// Capturing listener that suppresses the native default.
    pub const INTERCEPT: Self = Self {
        capture: true,
        prevent_default: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameLoopId(pub u64);

pub type EventHandler = Box<dyn FnMut(&HostEvent)>;
pub type FrameCallback = Box<dyn FnMut(FrameTime)>;

/// The platform the runtime runs on.
///
/// Single-threaded: every callback runs on the host's event loop. Event handlers only feed
/// trigger sources; style writes happen inside frame callbacks.
pub trait Host {
    fn add_listener(
        &self,
        container: &ContainerKey,
        kind: EventKind,
        options: ListenerOptions,
        handler: EventHandler,
    ) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);

    /// Invoke `callback` once per repaint until cancelled.
    fn start_frame_loop(&self, container: &ContainerKey, callback: FrameCallback) -> FrameLoopId;

    fn cancel_frame_loop(&self, id: FrameLoopId);

    /// Start reporting intersection changes for `element`.
    fn observe(&self, container: &ContainerKey, element: &ElementId);

    fn unobserve(&self, container: &ContainerKey, element: &ElementId);

    /// Enable or suppress native scrolling of the container.
    fn set_native_scroll(&self, container: &ContainerKey, enabled: bool);
}

/// Host handle shared by drivers and sources.
pub type SharedHost = Rc<dyn Host>;
