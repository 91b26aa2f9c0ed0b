use std::sync::atomic::AtomicUsize;

use super::*;
use crate::behavior::options::BehaviorOptions;
use crate::registry::lazy::EntryState;
use crate::style::value::{StyleUpdate, StyleValue};
use crate::trigger::state::{TriggerField, TriggerState};

fn constant(_: &TriggerState, _: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    Ok(StyleUpdate::new().with("opacity", StyleValue::number(1.0)))
}

fn meta(id: &str) -> BehaviorMeta {
    BehaviorMeta::new(id, id, &[TriggerField::Scroll])
}

#[tokio::test]
async fn eager_and_lazy_definitions_resolve() {
    let reg = BehaviorRegistry::new();
    reg.register(BehaviorDefinition::new(meta("test/eager"), constant));

    let loads = Arc::new(AtomicUsize::new(0));
    let l = loads.clone();
    reg.register_lazy(meta("test/lazy"), move || {
        l.fetch_add(1, Ordering::SeqCst);
        async { anyhow::Ok(BehaviorDefinition::new(meta("test/lazy"), constant)) }
    });

    assert!(reg.resolve_sync("test/eager").is_some());
    assert!(reg.resolve_sync("test/lazy").is_none());
    assert_eq!(reg.state("test/lazy"), Some(EntryState::Lazy));

    let def = reg.resolve("test/lazy").await.unwrap().unwrap();
    assert_eq!(def.id(), "test/lazy");
    assert!(reg.resolve_sync("test/lazy").is_some());
    reg.resolve("test/lazy").await.unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_ids_are_none_not_errors() {
    let reg = BehaviorRegistry::new();
    assert!(reg.resolve("nonexistent/xyz").await.unwrap().is_none());
    assert!(reg.resolve_sync("nonexistent/xyz").is_none());
    assert!(!reg.contains("nonexistent/xyz"));
}

#[test]
fn list_meta_is_sorted_and_metadata_only() {
    let reg = BehaviorRegistry::new();
    reg.register_lazy(meta("z/last"), || async {
        Err::<BehaviorDefinition, _>(anyhow::anyhow!("must not be called by list_meta"))
    });
    reg.register(BehaviorDefinition::new(meta("a/first"), constant));
    let ids: Vec<String> = reg.list_meta().into_iter().map(|m| m.id).collect();
    assert_eq!(ids, vec!["a/first", "z/last"]);
    assert_eq!(reg.state("z/last"), Some(EntryState::Lazy));
}

#[test]
fn duplicate_registration_overwrites() {
    let reg = BehaviorRegistry::new();
    reg.register(BehaviorDefinition::new(meta("dup"), constant));
    reg.register(BehaviorDefinition::new(
        meta("dup").describe("second"),
        constant,
    ));
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.resolve_sync("dup").unwrap().meta().description, "second");
}

#[test]
fn builtin_flag_flips_once() {
    let reg = BehaviorRegistry::new();
    assert!(reg.mark_builtins_registered());
    assert!(!reg.mark_builtins_registered());
}
