use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

#[derive(Clone, Debug, PartialEq)]
struct Meta(String);

impl RegistryMeta for Meta {
    fn id(&self) -> &str {
        &self.0
    }
}

fn meta(id: &str) -> Meta {
    Meta(id.to_owned())
}

#[tokio::test]
async fn eager_entries_resolve_both_ways() {
    let reg: LazyRegistry<Meta, u32> = LazyRegistry::new("test");
    reg.register(meta("a"), 7);
    assert_eq!(reg.state("a"), Some(EntryState::Loaded));
    assert_eq!(*reg.resolve_sync("a").unwrap(), 7);
    assert_eq!(*reg.resolve("a").await.unwrap().unwrap(), 7);
}

#[tokio::test]
async fn lazy_entry_loads_once_and_caches() {
    let calls = Arc::new(AtomicUsize::new(0));
    let reg: LazyRegistry<Meta, String> = LazyRegistry::new("test");
    let c = calls.clone();
    reg.register_lazy(meta("lazy"), move || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            anyhow::Ok("loaded".to_owned())
        }
    });

    assert!(matches!(reg.lookup("lazy"), Lookup::Pending));
    assert!(reg.resolve_sync("lazy").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let a = reg.resolve("lazy").await.unwrap().unwrap();
    let b = reg.resolve("lazy").await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(reg.state("lazy"), Some(EntryState::Loaded));
    assert!(Arc::ptr_eq(&reg.resolve_sync("lazy").unwrap(), &a));
}

#[tokio::test]
async fn unknown_ids_resolve_to_none() {
    let reg: LazyRegistry<Meta, u32> = LazyRegistry::new("test");
    assert!(reg.resolve("missing").await.unwrap().is_none());
    assert!(matches!(reg.lookup("missing"), Lookup::Unknown));
    assert_eq!(reg.state("missing"), None);
}

#[tokio::test]
async fn failed_loads_are_not_cached() {
    let calls = Arc::new(AtomicUsize::new(0));
    let reg: LazyRegistry<Meta, u32> = LazyRegistry::new("test");
    let c = calls.clone();
    reg.register_lazy(meta("flaky"), move || {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                anyhow::bail!("network hiccup");
            }
            anyhow::Ok(3)
        }
    });

    let err = reg.resolve("flaky").await.unwrap_err();
    assert!(matches!(err, MotionError::Load(_)));
    assert!(err.to_string().contains("flaky"));
    assert_eq!(reg.state("flaky"), Some(EntryState::Lazy));

    assert_eq!(*reg.resolve("flaky").await.unwrap().unwrap(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn list_meta_never_loads() {
    let calls = Arc::new(AtomicUsize::new(0));
    let reg: LazyRegistry<Meta, u32> = LazyRegistry::new("test");
    let c = calls.clone();
    reg.register_lazy(meta("b"), move || {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            anyhow::Ok(1)
        }
    });
    reg.register(meta("a"), 2);

    let ids: Vec<String> = reg.list_meta().into_iter().map(|m| m.0).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn last_registration_wins() {
    let reg: LazyRegistry<Meta, u32> = LazyRegistry::new("test");
    reg.register(meta("x"), 1);
    reg.register_lazy(meta("x"), || async { anyhow::Ok(2) });
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.state("x"), Some(EntryState::Lazy));
    assert_eq!(*reg.resolve("x").await.unwrap().unwrap(), 2);
    reg.register(meta("x"), 3);
    assert_eq!(*reg.resolve_sync("x").unwrap(), 3);
}
