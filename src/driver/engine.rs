use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::Arc;

use crate::behavior::assignment::BehaviorAssignment;
use crate::behavior::definition::BehaviorDefinition;
use crate::behavior::options::BehaviorOptions;
use crate::behavior::registry::BehaviorRegistry;
use crate::foundation::config::RuntimeConfig;
use crate::foundation::core::{ContainerKey, ElementId, ElementRef, Size};
use crate::foundation::diagnostics::DiagnosticLog;
use crate::foundation::error::{MotionError, MotionResult};
use crate::host::platform::SharedHost;
use crate::registry::lazy::Lookup;
use crate::store::shared::{DRIVER_KIND, StoreValue, StoreWriter};
use crate::style::sink::SharedSink;
use crate::style::value::{StyleUpdate, StyleValue};
use crate::trigger::source::{Subscription, TriggerSource};
use crate::trigger::state::{ElementSignal, TriggerAccumulator, TriggerField, TriggerFragment, TriggerState};

/// Driver lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Destroyed,
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub phase: DriverPhase,
    /// Style properties written to the sink.
    pub writes: usize,
    /// Assignments whose compute ran successfully.
    pub evaluated: usize,
    /// Assignments gated by visibility or still loading.
    pub skipped: usize,
    pub failures: usize,
}

/// Everything a driver needs from its surroundings.
#[derive(Clone)]
pub struct DriverContext {
    pub container: ContainerKey,
    pub host: Option<SharedHost>,
    pub sink: SharedSink,
    pub behaviors: Arc<BehaviorRegistry>,
    pub config: RuntimeConfig,
}

/// One element's inputs to [`evaluate_frame`].
pub struct ElementInput<'a> {
    pub element: &'a ElementRef,
    pub assignments: &'a [BehaviorAssignment],
    pub signal: ElementSignal,
}

/// Problems found while evaluating a frame. Never fatal.
#[derive(Debug)]
pub enum EvalIssue {
    Unknown { element: ElementId, behavior: String },
    Failed { element: ElementId, behavior: String, error: MotionError },
}

#[derive(Debug, Default)]
pub struct FrameEvaluation {
    /// Merged output per element, in input order.
    pub outputs: Vec<(ElementId, StyleUpdate)>,
    pub issues: Vec<EvalIssue>,
    pub evaluated: usize,
    pub skipped: usize,
}

/// Compute and merge every assignment of every element against one snapshot.
///
/// Assignments run in slice order and merge last-writer-wins per style key. A behavior
/// that reads [`TriggerField::Visibility`] is skipped for hidden elements unless its
/// assignment is pinned. Lazy behaviors that have not been loaded yet are skipped.
pub fn evaluate_frame<'a>(
    base: &TriggerState,
    elements: impl IntoIterator<Item = ElementInput<'a>>,
    behaviors: &BehaviorRegistry,
) -> FrameEvaluation {
    let mut eval = FrameEvaluation::default();
    for input in elements {
        let state = base.for_element(input.signal);
        let mut merged = StyleUpdate::new();
        for a in input.assignments {
            let def = match behaviors.lookup(&a.behavior) {
                Lookup::Ready(def) => def,
                Lookup::Pending => {
                    eval.skipped += 1;
                    continue;
                }
                Lookup::Unknown => {
                    eval.issues.push(EvalIssue::Unknown {
                        element: input.element.id.clone(),
                        behavior: a.behavior.clone(),
                    });
                    continue;
                }
            };
            if !a.pinned && def.meta().reads(TriggerField::Visibility) && !input.signal.visible {
                eval.skipped += 1;
                continue;
            }
            match compute_isolated(&def, &state, &a.options) {
                Ok(update) => {
                    merged.merge_from(update);
                    eval.evaluated += 1;
                }
                Err(error) => eval.issues.push(EvalIssue::Failed {
                    element: input.element.id.clone(),
                    behavior: a.behavior.clone(),
                    error,
                }),
            }
        }
        eval.outputs.push((input.element.id.clone(), merged));
    }
    eval
}

/// Run one compute, turning a panic into a [`MotionError::Compute`].
fn compute_isolated(
    def: &BehaviorDefinition,
    state: &TriggerState,
    options: &BehaviorOptions,
) -> MotionResult<StyleUpdate> {
    panic::catch_unwind(AssertUnwindSafe(|| def.compute(state, options))).unwrap_or_else(
        |payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string payload".to_owned());
            Err(MotionError::compute(format!("behavior panicked: {reason}")))
        },
    )
}

pub(crate) struct AttachedElement {
    pub element: ElementRef,
    pub assignments: Vec<BehaviorAssignment>,
    written: BTreeMap<String, StyleValue>,
}

/// State and plumbing shared by every concrete driver.
pub(crate) struct DriverCore {
    pub ctx: DriverContext,
    pub acc: TriggerAccumulator,
    phase: DriverPhase,
    inbox: Rc<RefCell<Vec<TriggerFragment>>>,
    subscriptions: Vec<Subscription>,
    elements: BTreeMap<ElementId, AttachedElement>,
    diagnostics: DiagnosticLog,
    store: Option<StoreWriter>,
    frame: u64,
}

impl DriverCore {
    pub fn new(ctx: DriverContext, store: StoreWriter, viewport: Size) -> Self {
        let report_every = ctx.config.failure_report_every;
        Self {
            ctx,
            acc: TriggerAccumulator::new(viewport),
            phase: DriverPhase::Idle,
            inbox: Rc::new(RefCell::new(Vec::new())),
            subscriptions: Vec::new(),
            elements: BTreeMap::new(),
            diagnostics: DiagnosticLog::new(report_every),
            store: Some(store),
            frame: 0,
        }
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn is_destroyed(&self) -> bool {
        self.phase == DriverPhase::Destroyed
    }

    /// Subscribe every source; their fragments queue until the next [`ingest`](Self::ingest).
    pub fn start_sources(&mut self, sources: &[TriggerSource]) {
        for source in sources {
            let inbox = self.inbox.clone();
            let sub = source.start(
                self.ctx.host.as_ref(),
                &self.ctx.container,
                Rc::new(move |f| inbox.borrow_mut().push(f)),
            );
            self.subscriptions.push(sub);
        }
    }

    /// Fold queued fragments into the accumulator and return them for driver-specific use.
    pub fn ingest(&mut self) -> Vec<TriggerFragment> {
        let fragments = std::mem::take(&mut *self.inbox.borrow_mut());
        for f in &fragments {
            self.acc.fold(f);
        }
        match (self.phase, self.acc.page_hidden()) {
            (DriverPhase::Running, true) => {
                tracing::debug!(container = %self.ctx.container, "page hidden, pausing");
                self.phase = DriverPhase::Paused;
            }
            (DriverPhase::Paused, false) => {
                tracing::debug!(container = %self.ctx.container, "page visible, resuming");
                self.phase = DriverPhase::Running;
            }
            _ => {}
        }
        fragments
    }

    /// Returns `true` when the element was not attached before.
    pub fn attach(&mut self, element: ElementRef, assignments: Vec<BehaviorAssignment>) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if self.phase == DriverPhase::Idle {
            tracing::debug!(container = %self.ctx.container, "driver running");
            self.phase = DriverPhase::Running;
        }
        match self.elements.get_mut(&element.id) {
            Some(existing) => {
                existing.element = element;
                existing.assignments = assignments;
                false
            }
            None => {
                self.elements.insert(
                    element.id.clone(),
                    AttachedElement {
                        element,
                        assignments,
                        written: BTreeMap::new(),
                    },
                );
                true
            }
        }
    }

    pub fn detach(&mut self, id: &ElementId) -> Option<ElementRef> {
        let removed = self.elements.remove(id)?;
        self.diagnostics.forget_element(id);
        self.acc.forget_element(id);
        Some(removed.element)
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementRef> {
        self.elements.values().map(|a| &a.element)
    }

    pub fn attached_count(&self) -> usize {
        self.elements.len()
    }

    pub fn store_set(&self, key: &str, value: StoreValue) {
        if let Some(store) = &self.store {
            store.set(key, value);
        }
    }

    /// Evaluate every attached element and write the properties that changed.
    pub fn evaluate_and_write(
        &mut self,
        base: &TriggerState,
        signals: &HashMap<ElementId, ElementSignal>,
    ) -> FrameReport {
        self.frame += 1;
        let eval = evaluate_frame(
            base,
            self.elements.values().map(|a| ElementInput {
                element: &a.element,
                assignments: &a.assignments,
                signal: signals.get(&a.element.id).copied().unwrap_or_default(),
            }),
            &self.ctx.behaviors,
        );

        let mut failures = 0;
        for issue in &eval.issues {
            match issue {
                EvalIssue::Unknown { element, behavior } => {
                    self.diagnostics.unknown_behavior(element, behavior);
                }
                EvalIssue::Failed {
                    element,
                    behavior,
                    error,
                } => {
                    failures += 1;
                    self.diagnostics.compute_failure(element, behavior, error);
                }
            }
        }

        let mut writes = 0;
        let mut sink = self.ctx.sink.borrow_mut();
        for (id, update) in eval.outputs {
            let Some(attached) = self.elements.get_mut(&id) else {
                continue;
            };
            for (key, value) in update {
                if attached.written.get(&key) == Some(&value) {
                    continue;
                }
                sink.set_style_property(&id, &key, &value);
                attached.written.insert(key, value);
                writes += 1;
            }
        }

        FrameReport {
            frame: self.frame,
            phase: self.phase,
            writes,
            evaluated: eval.evaluated,
            skipped: eval.skipped,
            failures,
        }
    }

    /// Report for a frame that did no work.
    pub fn idle_report(&self) -> FrameReport {
        FrameReport {
            frame: self.frame,
            phase: self.phase,
            ..FrameReport::default()
        }
    }

    pub fn failure_count(&self, element: &ElementId, behavior: &str) -> u64 {
        self.diagnostics.failure_count(element, behavior)
    }

    /// Cancel every subscription and release the store. Returns the elements still attached.
    pub fn destroy(&mut self) -> Vec<ElementRef> {
        if self.is_destroyed() {
            return Vec::new();
        }
        for sub in &mut self.subscriptions {
            sub.cancel();
        }
        self.subscriptions.clear();
        self.inbox.borrow_mut().clear();
        if let Some(store) = self.store.take() {
            store.remove(DRIVER_KIND);
        }
        self.phase = DriverPhase::Destroyed;
        tracing::debug!(container = %self.ctx.container, "driver destroyed");
        std::mem::take(&mut self.elements)
            .into_values()
            .map(|a| a.element)
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/engine.rs"]
mod tests;
