use super::*;
use crate::behavior::builtin::{SCROLL_PROGRESS, ensure_builtin_behaviors};
use crate::driver::momentum::MomentumOptions;
use crate::driver::scroll::ScrollOptions;
use crate::host::simulated::SimulatedHost;
use crate::store::shared::DRIVER_KIND;
use crate::style::sink::RecordingSink;

fn factory(host: Option<SharedHost>) -> DriverFactory {
    let (_recording, sink) = RecordingSink::shared();
    let behaviors = Arc::new(BehaviorRegistry::new());
    ensure_builtin_behaviors(&behaviors);
    DriverFactory::new(host, sink, behaviors, RuntimeConfig::default())
}

fn scroll_mode() -> DriverMode {
    DriverMode::ScrollVisibility(ScrollOptions::default())
}

#[test]
fn one_driver_per_container() {
    let host = SimulatedHost::new();
    let f = factory(Some(host.clone()));
    let preview = ContainerKey::frame("preview");

    let a = f
        .attach(&ContainerKey::Viewport, &scroll_mode(), ElementRef::new("a"), Vec::new())
        .unwrap();
    let b = f
        .attach(&ContainerKey::Viewport, &scroll_mode(), ElementRef::new("b"), Vec::new())
        .unwrap();
    let c = f
        .attach(&preview, &scroll_mode(), ElementRef::new("c"), Vec::new())
        .unwrap();
    assert_eq!(f.driver_count(), 2);
    assert_eq!(f.created_count(), 2);
    assert_eq!(f.attached_count(&ContainerKey::Viewport), 2);
    assert_eq!(host.frame_loop_count(Some(&ContainerKey::Viewport)), 1);

    a.detach();
    assert!(f.has_driver(&ContainerKey::Viewport));
    b.detach();
    assert!(!f.has_driver(&ContainerKey::Viewport));
    assert_eq!(host.resource_count(&ContainerKey::Viewport), 0);
    assert!(f.has_driver(&preview));
    c.detach();
    assert_eq!(f.driver_count(), 0);
}

#[test]
fn detach_is_idempotent() {
    let host = SimulatedHost::new();
    let f = factory(Some(host.clone()));
    let a = f
        .attach(&ContainerKey::Viewport, &scroll_mode(), ElementRef::new("a"), Vec::new())
        .unwrap();
    let b = f
        .attach(&ContainerKey::Viewport, &scroll_mode(), ElementRef::new("b"), Vec::new())
        .unwrap();
    a.detach();
    a.detach();
    assert!(a.is_detached());
    assert_eq!(f.attached_count(&ContainerKey::Viewport), 1);
    b.detach();
    b.detach();
    assert_eq!(f.driver_count(), 0);
}

#[test]
fn mismatched_mode_reuses_the_existing_driver() {
    let f = factory(Some(SimulatedHost::new()));
    let _a = f
        .attach(&ContainerKey::Viewport, &scroll_mode(), ElementRef::new("a"), Vec::new())
        .unwrap();
    let _b = f
        .attach(
            &ContainerKey::Viewport,
            &DriverMode::Momentum(MomentumOptions::default()),
            ElementRef::new("b"),
            Vec::new(),
        )
        .unwrap();
    assert_eq!(f.driver_count(), 1);
    assert_eq!(f.kind(&ContainerKey::Viewport), Some(DriverKind::Scroll));
    assert_eq!(f.attached_count(&ContainerKey::Viewport), 2);
}

#[test]
fn no_driver_mode_is_inert() {
    let host = SimulatedHost::new();
    let f = factory(Some(host.clone()));
    let d = f
        .attach(&ContainerKey::Viewport, &DriverMode::None, ElementRef::new("a"), Vec::new())
        .unwrap();
    assert_eq!(f.driver_count(), 0);
    assert_eq!(host.resource_count(&ContainerKey::Viewport), 0);
    d.detach();
}

#[test]
fn frame_loop_ticks_the_driver() {
    let host = SimulatedHost::new();
    let f = factory(Some(host.clone()));
    let _d = f
        .attach(
            &ContainerKey::Viewport,
            &scroll_mode(),
            ElementRef::new("bar"),
            vec![BehaviorAssignment::new(SCROLL_PROGRESS)],
        )
        .unwrap();
    host.advance_frame();
    assert_eq!(f.phase(&ContainerKey::Viewport), Some(DriverPhase::Running));
    let store = f.store(&ContainerKey::Viewport);
    assert_eq!(store.number(crate::store::shared::SCROLL_POSITION), Some(0.0));
}

#[test]
fn store_survives_driver_replacement() {
    let f = factory(None);
    let store = f.store(&ContainerKey::Viewport);
    let d = f
        .attach(&ContainerKey::Viewport, &scroll_mode(), ElementRef::new("a"), Vec::new())
        .unwrap();
    assert_eq!(store.text(DRIVER_KIND).as_deref(), Some("scroll"));
    d.detach();
    assert_eq!(store.text(DRIVER_KIND), None);

    let _d = f
        .attach(
            &ContainerKey::Viewport,
            &DriverMode::Momentum(MomentumOptions::default()),
            ElementRef::section("s0", 0),
            Vec::new(),
        )
        .unwrap();
    assert_eq!(store.text(DRIVER_KIND).as_deref(), Some("momentum"));
    assert!(f.tick(&ContainerKey::Viewport, FrameTime(16.0)).is_some());
    assert_eq!(f.with_momentum(&ContainerKey::Viewport, |m| m.physics().is_looping()), Some(true));
}

#[test]
fn teardown_all_destroys_everything() {
    let host = SimulatedHost::new();
    let f = factory(Some(host.clone()));
    let a = f
        .attach(&ContainerKey::Viewport, &scroll_mode(), ElementRef::new("a"), Vec::new())
        .unwrap();
    let _b = f
        .attach(&ContainerKey::frame("x"), &scroll_mode(), ElementRef::new("b"), Vec::new())
        .unwrap();
    f.teardown_all();
    assert_eq!(f.driver_count(), 0);
    assert_eq!(host.listener_count(None), 0);
    assert_eq!(host.frame_loop_count(None), 0);
    a.detach();
}

#[test]
fn remounting_an_element_keeps_it_until_its_last_handle_detaches() {
    let host = SimulatedHost::new();
    let f = factory(Some(host.clone()));
    let vp = ContainerKey::Viewport;

    let first = f.attach(&vp, &scroll_mode(), ElementRef::new("a"), Vec::new()).unwrap();
    let second = f.attach(&vp, &scroll_mode(), ElementRef::new("a"), Vec::new()).unwrap();
    assert_eq!(f.attached_count(&vp), 1);

    first.detach();
    assert!(f.has_driver(&vp));
    assert_eq!(f.attached_count(&vp), 1);

    let third = f.attach(&vp, &scroll_mode(), ElementRef::new("a"), Vec::new()).unwrap();
    second.detach();
    assert!(f.has_driver(&vp));
    assert!(!third.is_detached());
    assert_eq!(f.created_count(), 1);

    third.detach();
    assert!(!f.has_driver(&vp));
    assert_eq!(host.resource_count(&vp), 0);
}

#[test]
fn stale_handle_cannot_detach_from_a_newer_driver() {
    let host = SimulatedHost::new();
    let f = factory(Some(host.clone()));
    let vp = ContainerKey::Viewport;

    let old = f.attach(&vp, &scroll_mode(), ElementRef::new("a"), Vec::new()).unwrap();
    f.teardown_all();
    let current = f.attach(&vp, &scroll_mode(), ElementRef::new("a"), Vec::new()).unwrap();
    assert_eq!(f.created_count(), 2);

    old.detach();
    assert!(f.has_driver(&vp));
    assert!(!current.is_detached());
    assert_eq!(f.attached_count(&vp), 1);

    current.detach();
    assert_eq!(f.driver_count(), 0);
    assert_eq!(host.resource_count(&vp), 0);
}
