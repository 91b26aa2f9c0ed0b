use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::OnceCell;

use crate::foundation::error::{MotionError, MotionResult};

/// Future returned by a registry loader.
pub type LoadFuture<V> = Pin<Box<dyn Future<Output = anyhow::Result<V>> + Send + 'static>>;

/// Deferred constructor for a registry value.
pub type Loader<V> = Arc<dyn Fn() -> LoadFuture<V> + Send + Sync>;

/// Metadata stored for every entry, loaded or not.
pub trait RegistryMeta: Clone {
    fn id(&self) -> &str;
}

/// Whether an entry's value is available without loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Loaded,
    Lazy,
}

/// Result of a synchronous lookup.
#[derive(Debug)]
pub enum Lookup<V> {
    /// The value is loaded.
    Ready(Arc<V>),
    /// The id is registered but its loader has not completed.
    Pending,
    /// Nothing is registered under the id.
    Unknown,
}

impl<V> Lookup<V> {
    pub fn ready(self) -> Option<Arc<V>> {
        match self {
            Self::Ready(v) => Some(v),
            Self::Pending | Self::Unknown => None,
        }
    }
}

struct Entry<M, V> {
    meta: M,
    cell: Arc<OnceCell<Arc<V>>>,
    loader: Option<Loader<V>>,
}

/// Metadata-first registry with on-demand, single-flight loading.
///
/// Each id maps to metadata plus either a loaded value or a loader. Concurrent
/// [`resolve`](Self::resolve) calls for one id share a single load; a failed load leaves
/// the entry lazy so the next call retries. Re-registering an id replaces the entry as a
/// whole (last registration wins).
pub struct LazyRegistry<M, V> {
    kind: &'static str,
    entries: RwLock<BTreeMap<String, Entry<M, V>>>,
}

impl<M, V> LazyRegistry<M, V>
where
    M: RegistryMeta,
    V: Send + Sync + 'static,
{
    /// `kind` names the registry in diagnostics ("behavior", "composition").
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register an already-constructed value.
    pub fn register(&self, meta: M, value: V) {
        let cell = Arc::new(OnceCell::from(Arc::new(value)));
        self.insert(meta, cell, None);
    }

    /// Register metadata now and a loader to run on first resolution.
    pub fn register_lazy<F, Fut>(&self, meta: M, loader: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let loader: Loader<V> = Arc::new(move || Box::pin(loader()) as LoadFuture<V>);
        self.insert(meta, Arc::new(OnceCell::new()), Some(loader));
    }

    fn insert(&self, meta: M, cell: Arc<OnceCell<Arc<V>>>, loader: Option<Loader<V>>) {
        let id = meta.id().to_owned();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&id) {
            tracing::warn!(kind = self.kind, id = %id, "duplicate registration, last one wins");
        }
        entries.insert(id, Entry { meta, cell, loader });
    }

    /// Resolve `id`, loading it if needed.
    ///
    /// Returns `Ok(None)` for ids that were never registered.
    pub async fn resolve(&self, id: &str) -> MotionResult<Option<Arc<V>>> {
        let (cell, loader) = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(id) {
                Some(e) => (e.cell.clone(), e.loader.clone()),
                None => return Ok(None),
            }
        };

        let kind = self.kind;
        let owned_id = id.to_owned();
        let value = cell
            .get_or_try_init(|| async move {
                let Some(loader) = loader else {
                    return Err(MotionError::load(format!(
                        "{kind} '{owned_id}' has no loader"
                    )));
                };
                tracing::debug!(kind, id = %owned_id, "loading registry entry");
                loader()
                    .await
                    .map(Arc::new)
                    .map_err(|e| MotionError::load(format!("{kind} '{owned_id}': {e:#}")))
            })
            .await?;
        Ok(Some(value.clone()))
    }

    /// Resolve without loading.
    pub fn resolve_sync(&self, id: &str) -> Option<Arc<V>> {
        self.lookup(id).ready()
    }

    /// Synchronous lookup distinguishing "not loaded yet" from "unknown".
    pub fn lookup(&self, id: &str) -> Lookup<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(id) {
            None => Lookup::Unknown,
            Some(e) => match e.cell.get() {
                Some(v) => Lookup::Ready(v.clone()),
                None => Lookup::Pending,
            },
        }
    }

    /// Metadata of every entry, ordered by id. Never loads.
    pub fn list_meta(&self) -> Vec<M> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(|e| e.meta.clone()).collect()
    }

    pub fn meta(&self, id: &str) -> Option<M> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).map(|e| e.meta.clone())
    }

    pub fn state(&self, id: &str) -> Option<EntryState> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).map(|e| {
            if e.cell.initialized() {
                EntryState::Loaded
            } else {
                EntryState::Lazy
            }
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/lazy.rs"]
mod tests;
