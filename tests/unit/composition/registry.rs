use std::sync::atomic::AtomicUsize;

use super::*;
use crate::composition::dsl::CompositionBuilder;
use crate::composition::model::PresentationModel;

fn config(id: &str, model: PresentationModel) -> CompositionConfig {
    CompositionBuilder::new(id, model).build().unwrap()
}

#[test]
fn eager_entries_resolve_synchronously() {
    let reg = CompositionRegistry::new();
    reg.register(config("a", PresentationModel::Stacking));
    assert_eq!(reg.resolve_sync("a").unwrap().id, "a");
    assert_eq!(reg.state("a"), Some(EntryState::Loaded));
    assert!(reg.resolve_sync("missing").is_none());
    assert!(matches!(reg.lookup("missing"), Lookup::Unknown));
}

#[tokio::test]
async fn lazy_entries_list_before_loading() {
    let reg = CompositionRegistry::new();
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    reg.register_lazy(
        CompositionMeta::new("deck", "Deck", PresentationModel::Slideshow),
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { anyhow::Ok(config("deck", PresentationModel::Slideshow)) }
        },
    );

    let listed = reg.list_meta();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].model, PresentationModel::Slideshow);
    assert!(matches!(reg.lookup("deck"), Lookup::Pending));
    assert_eq!(loads.load(Ordering::SeqCst), 0);

    let first = reg.resolve("deck").await.unwrap().unwrap();
    let second = reg.resolve("deck").await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(reg.resolve_sync("deck").is_some());
}

#[tokio::test]
async fn unknown_ids_resolve_to_none() {
    let reg = CompositionRegistry::new();
    assert!(reg.resolve("nope").await.unwrap().is_none());
    assert!(reg.is_empty());
}

#[test]
fn duplicate_registration_replaces() {
    let reg = CompositionRegistry::new();
    reg.register(config("a", PresentationModel::Stacking));
    reg.register(config("a", PresentationModel::CoverScroll));
    assert_eq!(reg.len(), 1);
    assert_eq!(
        reg.meta("a").unwrap().model,
        PresentationModel::CoverScroll
    );
}
