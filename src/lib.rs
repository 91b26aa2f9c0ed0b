//! Kinetic is a behavior-driven motion runtime for content-managed sites.
//!
//! Continuous host signals (scroll, pointer, intersection, elapsed time) are folded into
//! a [`TriggerState`] once per frame, evaluated by pure behaviors, and written to a
//! [`StyleSink`] only when a value changed. The public API is runtime-oriented:
//!
//! - Construct a [`MotionRuntime`] and call [`MotionRuntime::ensure_initialized`]
//! - Mount a [`PageSpec`] on a container and keep the returned [`MountedPage`]
//! - Unmount it, or switch it to another composition
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod behavior;
pub(crate) mod composition;
pub(crate) mod driver;
pub(crate) mod host;
pub(crate) mod registry;
pub(crate) mod session;
pub(crate) mod store;
pub(crate) mod style;
pub(crate) mod trigger;

/// Ids of the built-in behaviors.
pub mod behaviors {
    pub use crate::behavior::builtin::{
        CAROUSEL_SLIDE, COVER_STACK, HOVER_TILT, SCROLL_FADE, SCROLL_PARALLAX, SCROLL_PROGRESS,
        SCROLL_REVEAL, SCROLL_SCALE, TIME_PULSE,
    };
}

/// Ids of the built-in compositions.
pub mod compositions {
    pub use crate::composition::builtin::{
        CLASSIC, COVER_SCROLL, INFINITE_CAROUSEL, SLIDESHOW, STATIC,
    };
}

/// Keys the drivers publish in the shared store.
pub mod store_keys {
    pub use crate::store::shared::{
        ACTIVE_SECTION, DRIVER_KIND, MOMENTUM_MODE, SCROLL_POSITION, SCROLL_VELOCITY,
    };
}

pub use crate::foundation::config::{MomentumSettings, RuntimeConfig};
pub use crate::foundation::core::{
    ContainerKey, ElementId, ElementRef, FrameTime, Point, REFERENCE_FRAME_MS, Size, Vec2,
    wrap_into,
};
pub use crate::foundation::diagnostics::DiagnosticLog;
pub use crate::foundation::error::{MotionError, MotionResult};

pub use crate::animation::ease::Ease;
pub use crate::style::sink::{RecordingSink, SharedSink, StyleSink, StyleWrite};
pub use crate::style::value::{StyleUpdate, StyleValue, fmt_num};

pub use crate::registry::lazy::{EntryState, LazyRegistry, LoadFuture, Loader, Lookup, RegistryMeta};

pub use crate::behavior::assignment::BehaviorAssignment;
pub use crate::behavior::builtin::ensure_builtin_behaviors;
pub use crate::behavior::definition::{Behavior, BehaviorDefinition, BehaviorMeta};
pub use crate::behavior::options::BehaviorOptions;
pub use crate::behavior::registry::BehaviorRegistry;

pub use crate::host::platform::{
    EventHandler, EventKind, FrameCallback, FrameLoopId, Host, HostEvent, ListenerId,
    ListenerOptions, SharedHost,
};
pub use crate::host::simulated::SimulatedHost;

pub use crate::trigger::source::{FragmentCallback, Subscription, TriggerSource};
pub use crate::trigger::state::{
    ElementSignal, NavKey, PointerSignal, ScrollDirection, ScrollSignal, TimeSignal,
    TouchPhase, TrackSignal, TriggerAccumulator, TriggerField, TriggerFragment, TriggerState,
};

pub use crate::store::shared::{SharedStore, StoreReader, StoreValue, StoreWriter};

pub use crate::driver::engine::{
    DriverContext, DriverPhase, ElementInput, EvalIssue, FrameEvaluation, FrameReport,
    evaluate_frame,
};
pub use crate::driver::factory::{Detach, DriverFactory};
pub use crate::driver::momentum::{MomentumDriver, MomentumOptions};
pub use crate::driver::motion::{DriverKind, DriverMode, MotionDriver, create_driver};
pub use crate::driver::physics::{MomentumFrame, MomentumMode, MomentumPhysics, TrackGeometry};
pub use crate::driver::scroll::{ActiveSectionStrategy, ScrollDriver, ScrollOptions};

pub use crate::composition::builtin::ensure_builtin_compositions;
pub use crate::composition::dsl::CompositionBuilder;
pub use crate::composition::model::{
    CompositionConfig, CompositionMeta, LayoutSpec, NavigationConfig, PresentationConfig,
    PresentationModel, TransitionSpec, WILDCARD,
};
pub use crate::composition::navigation::{
    HistoryMode, HistorySync, HistoryUpdate, InputChannels, NavigationGate, NavigationPolicy,
};
pub use crate::composition::registry::CompositionRegistry;
pub use crate::composition::resolver::{
    LayoutConstraints, PageSpec, ResolvedComposition, ResolvedElement, SectionSpec, resolve,
};

pub use crate::session::overrides::DevOverride;
pub use crate::session::runtime::{MotionRuntime, MountedPage};
