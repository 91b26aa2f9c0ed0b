use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::behavior::assignment::BehaviorAssignment;
use crate::behavior::registry::BehaviorRegistry;
use crate::driver::engine::{DriverContext, DriverPhase, FrameReport};
use crate::driver::momentum::MomentumDriver;
use crate::driver::motion::{DriverKind, DriverMode, MotionDriver, create_driver};
use crate::foundation::config::RuntimeConfig;
use crate::foundation::core::{ContainerKey, ElementId, ElementRef, FrameTime};
use crate::foundation::error::{MotionError, MotionResult};
use crate::host::platform::{FrameLoopId, SharedHost};
use crate::store::shared::{SharedStore, StoreReader};
use crate::style::sink::SharedSink;

type SharedDriver = Rc<RefCell<Box<dyn MotionDriver>>>;

struct Slot {
    driver: SharedDriver,
    kind: DriverKind,
    frame_loop: Option<FrameLoopId>,
    /// Live handle tokens per element. An element leaves the driver with its last token.
    attached: BTreeMap<ElementId, BTreeSet<u64>>,
}

struct FactoryInner {
    host: Option<SharedHost>,
    sink: SharedSink,
    behaviors: Arc<BehaviorRegistry>,
    config: RuntimeConfig,
    slots: BTreeMap<ContainerKey, Slot>,
    stores: BTreeMap<ContainerKey, SharedStore>,
    created: u64,
    next_token: u64,
}

/// Container-keyed owner of drivers: at most one per container, created on the first
/// attach and destroyed on the last detach.
#[derive(Clone)]
pub struct DriverFactory {
    inner: Rc<RefCell<FactoryInner>>,
}

impl DriverFactory {
    pub fn new(
        host: Option<SharedHost>,
        sink: SharedSink,
        behaviors: Arc<BehaviorRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(FactoryInner {
                host,
                sink,
                behaviors,
                config,
                slots: BTreeMap::new(),
                stores: BTreeMap::new(),
                created: 0,
                next_token: 0,
            })),
        }
    }

    /// Attach `element` to the driver of `container`, creating it if needed.
    ///
    /// With [`DriverMode::None`] nothing is created and the returned handle is inert. If
    /// the container already runs a driver of another kind, that driver is reused.
    pub fn attach(
        &self,
        container: &ContainerKey,
        mode: &DriverMode,
        element: ElementRef,
        assignments: Vec<BehaviorAssignment>,
    ) -> MotionResult<Detach> {
        let Some(kind) = mode.kind() else {
            return Ok(Detach::inert(container.clone(), element.id));
        };
        let id = element.id.clone();
        let mut inner = self.inner.borrow_mut();
        inner.next_token += 1;
        let token = inner.next_token;

        if !inner.slots.contains_key(container) {
            let slot = inner.create_slot(container, mode, kind)?;
            inner.slots.insert(container.clone(), slot);
        }
        let Some(slot) = inner.slots.get_mut(container) else {
            return Ok(Detach::inert(container.clone(), id));
        };
        if slot.kind != kind {
            tracing::warn!(
                %container,
                existing = slot.kind.as_str(),
                requested = kind.as_str(),
                "container already owned by another driver, reusing it"
            );
        }
        slot.driver.borrow_mut().attach(element, assignments);
        slot.attached.entry(id.clone()).or_default().insert(token);

        Ok(Detach {
            factory: Rc::downgrade(&self.inner),
            container: container.clone(),
            element: id,
            token,
            done: Cell::new(false),
        })
    }

    fn detach_element(&self, container: &ContainerKey, element: &ElementId, token: u64) {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.slots.get_mut(container) else {
            return;
        };
        let Some(tokens) = slot.attached.get_mut(element) else {
            return;
        };
        // Handles from an earlier driver generation hold tokens this slot never issued.
        if !tokens.remove(&token) {
            return;
        }
        if !tokens.is_empty() {
            return;
        }
        slot.attached.remove(element);
        slot.driver.borrow_mut().detach(element);
        if !slot.attached.is_empty() {
            return;
        }
        if let Some(slot) = inner.slots.remove(container) {
            inner.teardown(container, slot);
        }
    }

    pub fn driver_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    pub fn has_driver(&self, container: &ContainerKey) -> bool {
        self.inner.borrow().slots.contains_key(container)
    }

    /// Drivers created over this factory's lifetime.
    pub fn created_count(&self) -> u64 {
        self.inner.borrow().created
    }

    pub fn kind(&self, container: &ContainerKey) -> Option<DriverKind> {
        self.inner.borrow().slots.get(container).map(|s| s.kind)
    }

    pub fn phase(&self, container: &ContainerKey) -> Option<DriverPhase> {
        let driver = self.driver(container)?;
        let phase = driver.borrow().phase();
        Some(phase)
    }

    pub fn attached_count(&self, container: &ContainerKey) -> usize {
        self.inner
            .borrow()
            .slots
            .get(container)
            .map_or(0, |s| s.attached.len())
    }

    /// Read side of the container's shared store. The store outlives individual drivers.
    pub fn store(&self, container: &ContainerKey) -> StoreReader {
        let mut inner = self.inner.borrow_mut();
        inner.stores.entry(container.clone()).or_default().reader()
    }

    /// Run one frame by hand, for hosts without a frame loop.
    pub fn tick(&self, container: &ContainerKey, now: FrameTime) -> Option<FrameReport> {
        let driver = self.driver(container)?;
        let report = driver.borrow_mut().tick(now);
        Some(report)
    }

    /// Run `f` against the container's momentum driver, if that is what it runs.
    pub fn with_momentum<R>(
        &self,
        container: &ContainerKey,
        f: impl FnOnce(&mut MomentumDriver) -> R,
    ) -> Option<R> {
        let driver = self.driver(container)?;
        let mut driver = driver.borrow_mut();
        driver.as_momentum().map(f)
    }

    /// Destroy every driver regardless of attach counts.
    pub fn teardown_all(&self) {
        let mut inner = self.inner.borrow_mut();
        let slots = std::mem::take(&mut inner.slots);
        for (container, slot) in slots {
            inner.teardown(&container, slot);
        }
    }

    fn driver(&self, container: &ContainerKey) -> Option<SharedDriver> {
        self.inner
            .borrow()
            .slots
            .get(container)
            .map(|s| s.driver.clone())
    }
}

impl FactoryInner {
    fn create_slot(
        &mut self,
        container: &ContainerKey,
        mode: &DriverMode,
        kind: DriverKind,
    ) -> MotionResult<Slot> {
        let store = self.stores.entry(container.clone()).or_default().clone();
        let ctx = DriverContext {
            container: container.clone(),
            host: self.host.clone(),
            sink: self.sink.clone(),
            behaviors: self.behaviors.clone(),
            config: self.config.clone(),
        };
        let Some(driver) = create_driver(mode, ctx, &store)? else {
            return Err(MotionError::lifecycle(format!(
                "no driver for mode on {container}"
            )));
        };
        let driver: SharedDriver = Rc::new(RefCell::new(driver));

        let frame_loop = self.host.as_ref().map(|host| {
            let weak = Rc::downgrade(&driver);
            host.start_frame_loop(
                container,
                Box::new(move |now| {
                    if let Some(driver) = weak.upgrade() {
                        driver.borrow_mut().tick(now);
                    }
                }),
            )
        });
        self.created += 1;
        tracing::debug!(%container, kind = kind.as_str(), "driver created");
        Ok(Slot {
            driver,
            kind,
            frame_loop,
            attached: BTreeMap::new(),
        })
    }

    fn teardown(&mut self, container: &ContainerKey, slot: Slot) {
        if let (Some(host), Some(id)) = (&self.host, slot.frame_loop) {
            host.cancel_frame_loop(id);
        }
        slot.driver.borrow_mut().destroy();
        tracing::debug!(%container, kind = slot.kind.as_str(), "driver removed");
    }
}

/// Handle returned by [`DriverFactory::attach`]. [`detach`](Self::detach) is idempotent.
pub struct Detach {
    factory: Weak<RefCell<FactoryInner>>,
    container: ContainerKey,
    element: ElementId,
    token: u64,
    done: Cell<bool>,
}

impl Detach {
    fn inert(container: ContainerKey, element: ElementId) -> Self {
        Self {
            factory: Weak::new(),
            container,
            element,
            token: 0,
            done: Cell::new(false),
        }
    }

    pub fn element(&self) -> &ElementId {
        &self.element
    }

    pub fn is_detached(&self) -> bool {
        self.done.get()
    }

    pub fn detach(&self) {
        if self.done.replace(true) {
            return;
        }
        if let Some(inner) = self.factory.upgrade() {
            DriverFactory { inner }.detach_element(&self.container, &self.element, self.token);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/factory.rs"]
mod tests;
