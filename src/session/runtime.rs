use std::sync::Arc;

use crate::behavior::builtin::ensure_builtin_behaviors;
use crate::behavior::registry::BehaviorRegistry;
use crate::composition::builtin::ensure_builtin_compositions;
use crate::composition::model::CompositionConfig;
use crate::composition::navigation::HistorySync;
use crate::composition::registry::CompositionRegistry;
use crate::composition::resolver::{PageSpec, ResolvedComposition, resolve};
use crate::driver::engine::FrameReport;
use crate::driver::factory::{Detach, DriverFactory};
use crate::foundation::config::RuntimeConfig;
use crate::foundation::core::{ContainerKey, FrameTime};
use crate::foundation::error::{MotionError, MotionResult};
use crate::host::platform::SharedHost;
use crate::session::overrides::DevOverride;
use crate::store::shared::StoreReader;
use crate::style::sink::SharedSink;

/// The explicitly initialized context the motion layer runs in.
///
/// Owns both registries and the driver factory. Registries sit behind `Arc` and can be
/// shared with other runtimes; the factory and everything it drives live on the host
/// thread.
pub struct MotionRuntime {
    config: RuntimeConfig,
    behaviors: Arc<BehaviorRegistry>,
    compositions: Arc<CompositionRegistry>,
    factory: DriverFactory,
    dev_override: DevOverride,
}

impl MotionRuntime {
    pub fn new(config: RuntimeConfig, host: Option<SharedHost>, sink: SharedSink) -> MotionResult<Self> {
        Self::with_registries(
            config,
            host,
            sink,
            Arc::new(BehaviorRegistry::new()),
            Arc::new(CompositionRegistry::new()),
        )
    }

    pub fn with_registries(
        config: RuntimeConfig,
        host: Option<SharedHost>,
        sink: SharedSink,
        behaviors: Arc<BehaviorRegistry>,
        compositions: Arc<CompositionRegistry>,
    ) -> MotionResult<Self> {
        config.validate()?;
        let factory = DriverFactory::new(host, sink, behaviors.clone(), config.clone());
        Ok(Self {
            config,
            behaviors,
            compositions,
            factory,
            dev_override: DevOverride::default(),
        })
    }

    /// Register the built-in behaviors and compositions. Idempotent.
    pub fn ensure_initialized(&self) -> MotionResult<()> {
        ensure_builtin_behaviors(&self.behaviors);
        ensure_builtin_compositions(&self.compositions)
    }

    /// Read development overrides from the page URL. Call once, at startup.
    pub fn with_url(mut self, url: &str) -> MotionResult<Self> {
        self.dev_override = DevOverride::from_url(url, &self.config)?;
        if !self.dev_override.is_empty() {
            tracing::info!(
                composition = ?self.dev_override.composition,
                behavior = ?self.dev_override.behavior,
                "development override active"
            );
        }
        Ok(self)
    }

    pub fn with_override(mut self, dev_override: DevOverride) -> Self {
        self.dev_override = dev_override;
        self
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn behaviors(&self) -> &Arc<BehaviorRegistry> {
        &self.behaviors
    }

    pub fn compositions(&self) -> &Arc<CompositionRegistry> {
        &self.compositions
    }

    pub fn factory(&self) -> &DriverFactory {
        &self.factory
    }

    pub fn dev_override(&self) -> &DevOverride {
        &self.dev_override
    }

    /// Pick the composition for `page`: the override, then the page's own choice, then
    /// the configured default. Unknown or failing ids fall through with a warning.
    #[tracing::instrument(skip_all)]
    pub async fn select_composition(&self, page: &PageSpec) -> MotionResult<Arc<CompositionConfig>> {
        let candidates = [
            ("override", self.dev_override.composition.as_deref()),
            ("page", page.composition.as_deref()),
        ];
        for (source, id) in candidates {
            let Some(id) = id else { continue };
            match self.compositions.resolve(id).await {
                Ok(Some(config)) => return Ok(config),
                Ok(None) => tracing::warn!(source, id, "unknown composition, falling back"),
                Err(err) => tracing::warn!(source, id, %err, "composition failed to load, falling back"),
            }
        }
        let id = &self.config.default_composition;
        self.compositions.resolve(id).await?.ok_or_else(|| {
            MotionError::config(format!("default composition '{id}' is not registered"))
        })
    }

    /// Resolve and attach `page` to `container`.
    ///
    /// Every behavior the page uses is loaded before the first element attaches, so no
    /// frame runs with a pending lazy behavior.
    #[tracing::instrument(skip(self, page), fields(sections = page.sections.len()))]
    pub async fn mount_page(&self, container: ContainerKey, page: &PageSpec) -> MotionResult<MountedPage> {
        let config = self.select_composition(page).await?;
        self.mount_with(container, page, &config).await
    }

    /// Replace `mounted` with the same page under composition `id`.
    ///
    /// The old page is torn down completely before the new one attaches. An unknown `id`
    /// is an error and leaves `mounted` untouched.
    #[tracing::instrument(skip(self, mounted, page))]
    pub async fn switch_composition(
        &self,
        mounted: MountedPage,
        id: &str,
        page: &PageSpec,
    ) -> MotionResult<MountedPage> {
        let Some(config) = self.compositions.resolve(id).await? else {
            return Err(MotionError::config(format!("unknown composition '{id}'")));
        };
        let container = mounted.container.clone();
        mounted.unmount();
        self.mount_with(container, page, &config).await
    }

    /// Drive one frame by hand on a host-less runtime.
    pub fn tick(&self, container: &ContainerKey, now: FrameTime) -> Option<FrameReport> {
        self.factory.tick(container, now)
    }

    async fn mount_with(
        &self,
        container: ContainerKey,
        page: &PageSpec,
        config: &CompositionConfig,
    ) -> MotionResult<MountedPage> {
        let forced = self.forced_behavior();
        let resolved = resolve(config, page, forced);

        // Unknown ids resolve to nothing here; the driver reports them once.
        for id in resolved.behavior_ids() {
            if let Err(err) = self.behaviors.resolve(&id).await {
                tracing::warn!(behavior = %id, %err, "behavior failed to load");
            }
        }

        let mut handles = Vec::new();
        for element in resolved.elements() {
            let handle = self.factory.attach(
                &container,
                &resolved.mode,
                element.element.clone(),
                element.assignments.clone(),
            );
            match handle {
                Ok(h) => handles.push(h),
                Err(err) => {
                    for h in &handles {
                        h.detach();
                    }
                    return Err(err);
                }
            }
        }
        tracing::debug!(
            %container,
            composition = %resolved.composition,
            elements = handles.len(),
            "page mounted"
        );
        Ok(MountedPage {
            store: self.factory.store(&container),
            container,
            resolved,
            handles,
        })
    }

    fn forced_behavior(&self) -> Option<&str> {
        let id = self.dev_override.behavior.as_deref()?;
        if self.behaviors.contains(id) {
            Some(id)
        } else {
            tracing::warn!(behavior = id, "unknown override behavior, using page defaults");
            None
        }
    }
}

/// A page attached to its container. Call [`unmount`](Self::unmount) to detach it.
pub struct MountedPage {
    container: ContainerKey,
    resolved: ResolvedComposition,
    handles: Vec<Detach>,
    store: StoreReader,
}

impl MountedPage {
    pub fn container(&self) -> &ContainerKey {
        &self.container
    }

    pub fn composition(&self) -> &str {
        &self.resolved.composition
    }

    pub fn resolved(&self) -> &ResolvedComposition {
        &self.resolved
    }

    /// Read side of the container's shared store.
    pub fn store(&self) -> &StoreReader {
        &self.store
    }

    /// URL fragment sync for this page's sections.
    pub fn history(&self) -> HistorySync {
        HistorySync::new(
            self.store.clone(),
            self.resolved.history,
            self.resolved
                .sections
                .iter()
                .map(|s| s.element.id.as_str().to_owned())
                .collect(),
        )
    }

    pub fn attached_count(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_detached()).count()
    }

    pub fn unmount(self) {
        for handle in &self.handles {
            handle.detach();
        }
        tracing::debug!(container = %self.container, "page unmounted");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/runtime.rs"]
mod tests;
