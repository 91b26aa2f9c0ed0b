use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::composition::model::{CompositionConfig, CompositionMeta};
use crate::foundation::error::MotionResult;
use crate::registry::lazy::{EntryState, LazyRegistry, Lookup};

/// Composition id → configuration, sharing the lazy contract of the behavior registry.
pub struct CompositionRegistry {
    entries: LazyRegistry<CompositionMeta, CompositionConfig>,
    builtins: AtomicBool,
}

impl Default for CompositionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositionRegistry {
    pub fn new() -> Self {
        Self {
            entries: LazyRegistry::new("composition"),
            builtins: AtomicBool::new(false),
        }
    }

    pub fn register(&self, config: CompositionConfig) {
        self.entries.register(config.meta(), config);
    }

    pub fn register_lazy<F, Fut>(&self, meta: CompositionMeta, loader: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<CompositionConfig>> + Send + 'static,
    {
        self.entries.register_lazy(meta, loader);
    }

    pub async fn resolve(&self, id: &str) -> MotionResult<Option<Arc<CompositionConfig>>> {
        self.entries.resolve(id).await
    }

    pub fn resolve_sync(&self, id: &str) -> Option<Arc<CompositionConfig>> {
        self.entries.resolve_sync(id)
    }

    pub fn lookup(&self, id: &str) -> Lookup<CompositionConfig> {
        self.entries.lookup(id)
    }

    pub fn list_meta(&self) -> Vec<CompositionMeta> {
        self.entries.list_meta()
    }

    pub fn meta(&self, id: &str) -> Option<CompositionMeta> {
        self.entries.meta(id)
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

    pub(crate) fn mark_builtins_registered(&self) -> bool {
        !self.builtins.swap(true, Ordering::AcqRel)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/registry.rs"]
mod tests;
