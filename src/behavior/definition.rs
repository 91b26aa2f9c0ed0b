use std::fmt;
use std::sync::Arc;

use crate::behavior::options::BehaviorOptions;
use crate::foundation::error::MotionResult;
use crate::registry::lazy::RegistryMeta;
use crate::style::value::StyleUpdate;
use crate::trigger::state::{TriggerField, TriggerState};

/// Listing metadata, available before the implementation is loaded.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BehaviorMeta {
    /// Namespaced identifier, e.g. `scroll/fade`.
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Trigger-state fields read by `compute`, in declaration order.
    pub requires: Vec<TriggerField>,
}

impl BehaviorMeta {
    pub fn new(id: impl Into<String>, label: impl Into<String>, requires: &[TriggerField]) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            requires: requires.to_vec(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reads(&self, field: TriggerField) -> bool {
        self.requires.contains(&field)
    }
}

impl RegistryMeta for BehaviorMeta {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Pure mapping from trigger state and options to style properties.
///
/// Implementations must not keep state between calls: identical inputs give identical
/// outputs.
pub trait Behavior: Send + Sync {
    fn compute(&self, state: &TriggerState, options: &BehaviorOptions) -> MotionResult<StyleUpdate>;
}

impl<F> Behavior for F
where
    F: Fn(&TriggerState, &BehaviorOptions) -> MotionResult<StyleUpdate> + Send + Sync,
{
    fn compute(&self, state: &TriggerState, options: &BehaviorOptions) -> MotionResult<StyleUpdate> {
        self(state, options)
    }
}

/// A registered behavior: metadata plus its compute contract.
#[derive(Clone)]
pub struct BehaviorDefinition {
    meta: BehaviorMeta,
    behavior: Arc<dyn Behavior>,
}

impl BehaviorDefinition {
    pub fn new(meta: BehaviorMeta, behavior: impl Behavior + 'static) -> Self {
        Self {
            meta,
            behavior: Arc::new(behavior),
        }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn meta(&self) -> &BehaviorMeta {
        &self.meta
    }

    pub fn compute(&self, state: &TriggerState, options: &BehaviorOptions) -> MotionResult<StyleUpdate> {
        self.behavior.compute(state, options)
    }
}

impl fmt::Debug for BehaviorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorDefinition")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}
