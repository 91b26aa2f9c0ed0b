use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::behavior::definition::{BehaviorDefinition, BehaviorMeta};
use crate::foundation::error::MotionResult;
use crate::registry::lazy::{EntryState, LazyRegistry, Lookup};

/// Behavior id → definition, with metadata-first lazy registration.
pub struct BehaviorRegistry {
    entries: LazyRegistry<BehaviorMeta, BehaviorDefinition>,
    builtins: AtomicBool,
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorRegistry {
    /// An empty registry. See [`crate::ensure_builtin_behaviors`] for the catalog.
    pub fn new() -> Self {
        Self {
            entries: LazyRegistry::new("behavior"),
            builtins: AtomicBool::new(false),
        }
    }

    /// Register a loaded definition. A duplicate id overwrites with a warning.
    pub fn register(&self, definition: BehaviorDefinition) {
        self.entries.register(definition.meta().clone(), definition);
    }

    /// Register metadata now and load the definition on first resolution.
    pub fn register_lazy<F, Fut>(&self, meta: BehaviorMeta, loader: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<BehaviorDefinition>> + Send + 'static,
    {
        self.entries.register_lazy(meta, loader);
    }

    /// Resolve, loading on demand. `Ok(None)` for unknown ids.
    pub async fn resolve(&self, id: &str) -> MotionResult<Option<Arc<BehaviorDefinition>>> {
        self.entries.resolve(id).await
    }

    /// Resolve without loading.
    pub fn resolve_sync(&self, id: &str) -> Option<Arc<BehaviorDefinition>> {
        self.entries.resolve_sync(id)
    }

    pub fn lookup(&self, id: &str) -> Lookup<BehaviorDefinition> {
        self.entries.lookup(id)
    }

    /// Metadata for every registered behavior, ordered by id. Never loads.
    pub fn list_meta(&self) -> Vec<BehaviorMeta> {
        self.entries.list_meta()
    }

    pub fn state(&self, id: &str) -> Option<EntryState> {
        self.entries.state(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` exactly once per registry.
    pub(crate) fn mark_builtins_registered(&self) -> bool {
        !self.builtins.swap(true, Ordering::AcqRel)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/behavior/registry.rs"]
mod tests;
