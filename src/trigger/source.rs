use std::rc::Rc;

use crate::foundation::core::{ContainerKey, ElementId, Point, Size, Vec2};
use crate::host::platform::{EventKind, HostEvent, ListenerId, ListenerOptions, SharedHost};
use crate::trigger::state::{NavKey, TouchPhase, TriggerFragment};

/// Receives fragments from a started source.
pub type FragmentCallback = Rc<dyn Fn(TriggerFragment)>;

/// Adapters from raw host events to [`TriggerFragment`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerSource {
    Scroll,
    Resize,
    Pointer,
    /// Wheel input; `intercept` captures it ahead of native scrolling.
    Wheel { intercept: bool },
    Touch { intercept: bool },
    Keyboard,
    Intersection,
    PageVisibility,
    /// In-page `#section` links; `intercept` cancels the native jump.
    Anchor { intercept: bool },
}

impl TriggerSource {
    pub fn name(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::Pointer => "pointer",
            Self::Wheel { .. } => "wheel",
            Self::Touch { .. } => "touch",
            Self::Keyboard => "keyboard",
            Self::Intersection => "intersection",
            Self::PageVisibility => "page-visibility",
            Self::Anchor { .. } => "anchor",
        }
    }

    fn kind(self) -> EventKind {
        match self {
            Self::Scroll => EventKind::Scroll,
            Self::Resize => EventKind::Resize,
            Self::Pointer => EventKind::Pointer,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::Touch { .. } => EventKind::Touch,
            Self::Keyboard => EventKind::Key,
            Self::Intersection => EventKind::Intersection,
            Self::PageVisibility => EventKind::Visibility,
            Self::Anchor { .. } => EventKind::Anchor,
        }
    }

    fn options(self) -> ListenerOptions {
        match self {
            Self::Wheel { intercept: true }
            | Self::Touch { intercept: true }
            | Self::Anchor { intercept: true } => {
                ListenerOptions::INTERCEPT
            }
            _ => ListenerOptions::PASSIVE,
        }
    }

    /// Map a host event to a fragment. `None` for events this source ignores.
    pub fn translate(self, event: &HostEvent) -> Option<TriggerFragment> {
        let fragment = match (self, event) {
            (Self::Scroll, HostEvent::Scroll { offset, max_offset }) => TriggerFragment::Scroll {
                offset: *offset,
                max_offset: *max_offset,
            },
            (Self::Resize, HostEvent::Resize { width, height }) => TriggerFragment::Resize {
                viewport: Size::new(width.max(0.0), height.max(0.0)),
            },
            (Self::Pointer, HostEvent::PointerMove { x, y }) => TriggerFragment::Pointer {
                position: Point::new(*x, *y),
            },
            (Self::Pointer, HostEvent::PointerLeave) => TriggerFragment::PointerLeave,
            (Self::Wheel { .. }, HostEvent::Wheel { delta_x, delta_y }) => {
                TriggerFragment::Wheel {
                    delta: Vec2::new(*delta_x, *delta_y),
                }
            }
            (Self::Touch { .. }, HostEvent::TouchStart { x, y }) => TriggerFragment::Touch {
                phase: TouchPhase::Start,
                position: Point::new(*x, *y),
            },
            (Self::Touch { .. }, HostEvent::TouchMove { x, y }) => TriggerFragment::Touch {
                phase: TouchPhase::Move,
                position: Point::new(*x, *y),
            },
            (Self::Touch { .. }, HostEvent::TouchEnd) => TriggerFragment::Touch {
                phase: TouchPhase::End,
                position: Point::ZERO,
            },
            (Self::Keyboard, HostEvent::Key { key }) => TriggerFragment::Key(nav_key(key)?),
            (Self::Intersection, HostEvent::Intersection { element, ratio }) => {
                TriggerFragment::Intersection {
                    element: element.clone(),
                    ratio: *ratio,
                }
            }
            (Self::PageVisibility, HostEvent::VisibilityChange { hidden }) => {
                TriggerFragment::PageVisibility { hidden: *hidden }
            }
            (Self::Anchor { .. }, HostEvent::AnchorNavigate { fragment }) => {
                let id = fragment.trim_start_matches('#').trim();
                if id.is_empty() {
                    return None;
                }
                TriggerFragment::Anchor(ElementId::new(id))
            }
            _ => return None,
        };
        Some(fragment)
    }

    /// Subscribe to the host. Without a host the subscription is inert.
    pub fn start(
        self,
        host: Option<&SharedHost>,
        container: &ContainerKey,
        callback: FragmentCallback,
    ) -> Subscription {
        let Some(host) = host else {
            return Subscription::inert();
        };
        let id = host.add_listener(
            container,
            self.kind(),
            self.options(),
            Box::new(move |event| {
                if let Some(fragment) = self.translate(event) {
                    callback(fragment);
                }
            }),
        );
        Subscription {
            host: Some(host.clone()),
            listeners: vec![id],
        }
    }
}

fn nav_key(key: &str) -> Option<NavKey> {
    match key {
        "ArrowDown" | "ArrowRight" | "PageDown" | " " | "Space" => Some(NavKey::Next),
        "ArrowUp" | "ArrowLeft" | "PageUp" => Some(NavKey::Previous),
        "Home" => Some(NavKey::First),
        "End" => Some(NavKey::Last),
        _ => None,
    }
}

/// Live listener registrations of a started source. Cancelling (or dropping) removes them.
pub struct Subscription {
    host: Option<SharedHost>,
    listeners: Vec<ListenerId>,
}

impl Subscription {
    fn inert() -> Self {
        Self {
            host: None,
            listeners: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Remove every listener. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(host) = &self.host {
            for id in self.listeners.drain(..) {
                host.remove_listener(id);
            }
        }
        self.listeners.clear();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trigger/source.rs"]
mod tests;
