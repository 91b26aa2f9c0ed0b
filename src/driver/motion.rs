use crate::behavior::assignment::BehaviorAssignment;
use crate::driver::engine::{DriverContext, DriverPhase, FrameReport};
use crate::driver::momentum::{MomentumDriver, MomentumOptions};
use crate::driver::scroll::{ScrollDriver, ScrollOptions};
use crate::foundation::core::{ElementId, ElementRef, FrameTime};
use crate::foundation::error::MotionResult;
use crate::store::shared::SharedStore;

/// A per-container engine evaluating attached elements once per frame.
pub trait MotionDriver {
    fn kind(&self) -> DriverKind;

    fn phase(&self) -> DriverPhase;

    /// Attach `element`, replacing its assignments if it is already attached.
    fn attach(&mut self, element: ElementRef, assignments: Vec<BehaviorAssignment>);

    /// Returns `false` when the element was not attached.
    fn detach(&mut self, element: &ElementId) -> bool;

    fn attached_count(&self) -> usize;

    /// Run one frame: read trigger state, compute, write changed styles.
    fn tick(&mut self, now: FrameTime) -> FrameReport;

    /// Release every subscription and host resource. The driver is unusable afterwards.
    fn destroy(&mut self);

    fn as_momentum(&mut self) -> Option<&mut MomentumDriver> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    Scroll,
    Momentum,
}

impl DriverKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Momentum => "momentum",
        }
    }
}

/// Which driver a container runs, with its options.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DriverMode {
    /// No driver: elements attach inertly and nothing is ever written.
    #[default]
    None,
    ScrollVisibility(ScrollOptions),
    Momentum(MomentumOptions),
}

impl DriverMode {
    pub fn kind(&self) -> Option<DriverKind> {
        match self {
            Self::None => None,
            Self::ScrollVisibility(_) => Some(DriverKind::Scroll),
            Self::Momentum(_) => Some(DriverKind::Momentum),
        }
    }
}

/// Build the driver for `mode`, claiming the writer role of `store`.
pub fn create_driver(
    mode: &DriverMode,
    ctx: DriverContext,
    store: &SharedStore,
) -> MotionResult<Option<Box<dyn MotionDriver>>> {
    let Some(kind) = mode.kind() else {
        return Ok(None);
    };
    let writer = store.claim_writer(format!("{}@{}", kind.as_str(), ctx.container))?;
    let driver: Box<dyn MotionDriver> = match mode {
        DriverMode::ScrollVisibility(opts) => Box::new(ScrollDriver::new(ctx, writer, opts.clone())),
        DriverMode::Momentum(opts) => Box::new(MomentumDriver::new(ctx, writer, opts.clone())),
        DriverMode::None => return Ok(None),
    };
    Ok(Some(driver))
}
