use super::*;
use crate::store::shared::{SharedStore, StoreValue};

fn gate(looping: bool) -> NavigationGate {
    NavigationGate::new(NavigationPolicy {
        looping,
        ..NavigationPolicy::default()
    })
}

#[test]
fn next_and_previous_respect_track_ends() {
    let mut g = gate(false);
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 0, 3, false), Some(1));
    assert_eq!(g.accept(NavKey::Previous, FrameTime(1.0), 0, 3, false), None);
    assert_eq!(g.accept(NavKey::Next, FrameTime(2.0), 2, 3, false), None);
}

#[test]
fn looping_wraps_with_a_single_step() {
    let mut g = gate(true);
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 2, 3, false), Some(1));
    assert_eq!(g.accept(NavKey::Previous, FrameTime(1.0), 0, 3, false), Some(-1));
}

#[test]
fn first_and_last_jump_and_ignore_no_ops() {
    let mut g = gate(false);
    assert_eq!(g.accept(NavKey::Last, FrameTime(0.0), 1, 4, false), Some(2));
    assert_eq!(g.accept(NavKey::First, FrameTime(1.0), 3, 4, false), Some(-3));
    assert_eq!(g.accept(NavKey::First, FrameTime(2.0), 0, 4, false), None);
}

#[test]
fn skipped_sections_are_stepped_over() {
    let mut g = NavigationGate::new(NavigationPolicy {
        looping: true,
        skip: BTreeSet::from([1, 2]),
        ..NavigationPolicy::default()
    });
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 0, 4, false), Some(3));
    assert_eq!(g.accept(NavKey::Previous, FrameTime(1.0), 3, 4, false), Some(-3));
    assert_eq!(g.accept(NavKey::First, FrameTime(2.0), 3, 4, false), Some(-3));
}

#[test]
fn everything_skipped_goes_nowhere() {
    let mut g = NavigationGate::new(NavigationPolicy {
        looping: true,
        skip: BTreeSet::from([0, 1]),
        ..NavigationPolicy::default()
    });
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 0, 2, false), None);
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 0, 0, false), None);
}

#[test]
fn lock_and_debounce() {
    let mut g = NavigationGate::new(NavigationPolicy {
        lock_during_transition: true,
        debounce_ms: 300.0,
        ..NavigationPolicy::default()
    });
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 0, 5, true), None);
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 0, 5, false), Some(1));
    assert_eq!(g.accept(NavKey::Next, FrameTime(200.0), 1, 5, false), None);
    assert_eq!(g.accept(NavKey::Next, FrameTime(300.0), 1, 5, false), Some(1));
}

#[test]
fn rejected_commands_do_not_reset_the_debounce_window() {
    let mut g = NavigationGate::new(NavigationPolicy {
        debounce_ms: 100.0,
        ..NavigationPolicy::default()
    });
    assert_eq!(g.accept(NavKey::Next, FrameTime(0.0), 0, 5, false), Some(1));
    assert_eq!(g.accept(NavKey::Next, FrameTime(90.0), 1, 5, false), None);
    assert_eq!(g.accept(NavKey::Next, FrameTime(110.0), 1, 5, false), Some(1));
}

#[test]
fn input_channels_default_to_all_enabled() {
    let channels: InputChannels = serde_json::from_str(r#"{"wheel":false}"#).unwrap();
    assert!(!channels.wheel);
    assert!(channels.touch && channels.keyboard && channels.anchors);
}

#[test]
fn history_follows_active_section_changes() {
    let store = SharedStore::new();
    let writer = store.claim_writer("test").unwrap();
    let mut sync = HistorySync::new(
        store.reader(),
        HistoryMode::Replace,
        vec!["intro".to_owned(), "work".to_owned()],
    );
    assert_eq!(sync.poll(), None);

    writer.set(ACTIVE_SECTION, StoreValue::Index(1));
    assert_eq!(
        sync.poll(),
        Some(HistoryUpdate {
            fragment: "#work".to_owned(),
            mode: HistoryMode::Replace,
        })
    );
    assert_eq!(sync.poll(), None);

    writer.set(ACTIVE_SECTION, StoreValue::Index(7));
    assert_eq!(sync.poll(), None);
}

#[test]
fn history_is_silent_when_disabled() {
    let store = SharedStore::new();
    let writer = store.claim_writer("test").unwrap();
    writer.set(ACTIVE_SECTION, StoreValue::Index(0));
    let mut sync = HistorySync::new(store.reader(), HistoryMode::None, vec!["a".to_owned()]);
    assert_eq!(sync.poll(), None);
}
