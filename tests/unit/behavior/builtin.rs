use super::*;
use crate::foundation::core::Point;
use crate::registry::lazy::EntryState;
use crate::trigger::state::ElementSignal;

fn visible(ratio: f64) -> TriggerState {
    let mut s = TriggerState::default();
    s.element.intersection_ratio = ratio;
    s.element.visible = ratio > 0.0;
    s
}

fn text(update: &StyleUpdate, key: &str) -> String {
    update.get(key).map(|v| v.to_string()).unwrap_or_default()
}

#[test]
fn ensure_is_idempotent_and_lists_the_catalog() {
    let reg = BehaviorRegistry::new();
    ensure_builtin_behaviors(&reg);
    let first = reg.len();
    ensure_builtin_behaviors(&reg);
    assert_eq!(reg.len(), first);
    assert_eq!(first, 9);

    assert_eq!(reg.state(SCROLL_FADE), Some(EntryState::Loaded));
    assert_eq!(reg.state(HOVER_TILT), Some(EntryState::Lazy));
    assert_eq!(reg.state(TIME_PULSE), Some(EntryState::Lazy));
    assert_eq!(reg.state(COVER_STACK), Some(EntryState::Lazy));
}

#[tokio::test]
async fn lazy_builtins_load_on_demand() {
    let reg = BehaviorRegistry::new();
    ensure_builtin_behaviors(&reg);
    let tilt = reg.resolve(HOVER_TILT).await.unwrap().unwrap();
    assert_eq!(tilt.id(), HOVER_TILT);
    assert_eq!(reg.state(HOVER_TILT), Some(EntryState::Loaded));
}

#[test]
fn fade_follows_intersection_ratio() {
    let opts = BehaviorOptions::new().with("ease", "linear");
    let half = fade(&visible(0.5), &opts).unwrap();
    assert_eq!(half.get("opacity"), Some(&StyleValue::number(0.5)));
    let full = fade(&visible(1.0), &BehaviorOptions::new()).unwrap();
    assert_eq!(full.get("opacity"), Some(&StyleValue::number(1.0)));
}

#[test]
fn inverted_fade_runs_backwards() {
    let opts = BehaviorOptions::new()
        .with("ease", "linear")
        .with("invert", true);
    let entering = fade(&visible(0.25), &opts).unwrap();
    assert_eq!(entering.get("opacity"), Some(&StyleValue::number(0.75)));
    let full = fade(&visible(1.0), &opts).unwrap();
    assert_eq!(full.get("opacity"), Some(&StyleValue::number(0.0)));

    let bad = BehaviorOptions::new().with("invert", "yes");
    assert!(matches!(fade(&visible(0.5), &bad), Err(MotionError::Compute(_))));
}

#[test]
fn reveal_completes_at_full_at() {
    let out = reveal(&visible(0.5), &BehaviorOptions::new()).unwrap();
    assert_eq!(out.get("opacity"), Some(&StyleValue::number(1.0)));
    assert_eq!(text(&out, "transform"), "translate3d(0, 0px, 0)");

    let hidden = reveal(&visible(0.0), &BehaviorOptions::new()).unwrap();
    assert_eq!(text(&hidden, "transform"), "translate3d(0, 40px, 0)");

    let bad = BehaviorOptions::new().with("full_at", 0);
    assert!(reveal(&visible(0.2), &bad).is_err());
}

#[test]
fn parallax_moves_against_scroll() {
    let mut s = TriggerState::default();
    s.scroll.offset = 100.0;
    let out = parallax(&s, &BehaviorOptions::new().with("speed", 0.5)).unwrap();
    assert_eq!(text(&out, "transform"), "translate3d(0, -50px, 0)");
}

#[test]
fn progress_rejects_non_custom_properties() {
    let mut s = TriggerState::default();
    s.scroll.progress = 0.25;
    let out = progress(&s, &BehaviorOptions::new()).unwrap();
    assert_eq!(out.get("--scroll-progress"), Some(&StyleValue::number(0.25)));
    let bad = BehaviorOptions::new().with("property", "opacity");
    assert!(matches!(progress(&s, &bad), Err(MotionError::Compute(_))));
}

#[test]
fn tilt_is_neutral_outside() {
    let mut s = TriggerState::default();
    let out = tilt(&s, &BehaviorOptions::new()).unwrap();
    assert_eq!(
        text(&out, "transform"),
        "perspective(800px) rotateX(0deg) rotateY(0deg)"
    );

    s.pointer.inside = true;
    s.pointer.position = Point::new(100.0, 0.0);
    s.pointer.normalized = crate::foundation::core::Vec2::new(1.0, -1.0);
    let out = tilt(&s, &BehaviorOptions::new()).unwrap();
    assert_eq!(
        text(&out, "transform"),
        "perspective(800px) rotateX(8deg) rotateY(8deg)"
    );
}

#[test]
fn pulse_is_periodic() {
    let mut s = TriggerState::default();
    s.time.elapsed_ms = 500.0;
    let quarter = pulse(&s, &BehaviorOptions::new()).unwrap();
    assert_eq!(text(&quarter, "transform"), "scale(1.04)");
    s.time.elapsed_ms = 2500.0;
    assert_eq!(pulse(&s, &BehaviorOptions::new()).unwrap(), quarter);

    let bad = BehaviorOptions::new().with("period_ms", 0);
    assert!(pulse(&s, &bad).is_err());
}

#[test]
fn slide_positions_sections_only() {
    let mut s = TriggerState::default();
    assert!(slide(&s, &BehaviorOptions::new()).unwrap().is_empty());

    s.element = ElementSignal {
        section_index: Some(2),
        section_offset: -120.5,
        section_length: 800.0,
        ..ElementSignal::default()
    };
    s.track.section_progress = 0.5;
    let out = slide(&s, &BehaviorOptions::new()).unwrap();
    assert_eq!(text(&out, "transform"), "translate3d(0, -120.5px, 0)");
    assert_eq!(out.get("--section-progress"), Some(&StyleValue::number(0.5)));

    let x = slide(&s, &BehaviorOptions::new().with("axis", "x")).unwrap();
    assert_eq!(text(&x, "transform"), "translate3d(-120.5px, 0, 0)");
    assert!(slide(&s, &BehaviorOptions::new().with("axis", "z")).is_err());
}

#[test]
fn cover_stack_recedes_when_scrolled_past() {
    let mut s = TriggerState::default();
    s.element = ElementSignal {
        section_index: Some(0),
        section_offset: -400.0,
        section_length: 800.0,
        ..ElementSignal::default()
    };
    let out = cover_stack(&s, &BehaviorOptions::new()).unwrap();
    assert_eq!(text(&out, "transform"), "scale(0.96)");
    assert_eq!(out.get("--cover-dim"), Some(&StyleValue::number(0.25)));

    s.element.section_offset = 300.0;
    let ahead = cover_stack(&s, &BehaviorOptions::new()).unwrap();
    assert_eq!(text(&ahead, "transform"), "scale(1)");
}
