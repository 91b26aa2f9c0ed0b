use super::*;
use crate::behavior::definition::{BehaviorDefinition, BehaviorMeta};
use crate::behavior::options::BehaviorOptions;
use crate::foundation::error::MotionResult;
use crate::store::shared::SharedStore;
use crate::style::sink::RecordingSink;

fn opacity_half(_: &TriggerState, _: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    Ok(StyleUpdate::new()
        .with("opacity", StyleValue::number(0.5))
        .with("--a", StyleValue::number(1.0)))
}

fn opacity_one(_: &TriggerState, _: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    Ok(StyleUpdate::new().with("opacity", StyleValue::number(1.0)))
}

fn scroll_echo(state: &TriggerState, _: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    Ok(StyleUpdate::new().with("--offset", StyleValue::number(state.scroll.offset)))
}

fn broken(_: &TriggerState, _: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    Err(MotionError::compute("boom"))
}

fn panics(_: &TriggerState, _: &BehaviorOptions) -> MotionResult<StyleUpdate> {
    panic!("index out of range");
}

fn registry() -> BehaviorRegistry {
    let reg = BehaviorRegistry::new();
    reg.register(BehaviorDefinition::new(
        BehaviorMeta::new("t/half", "half", &[TriggerField::Scroll]),
        opacity_half,
    ));
    reg.register(BehaviorDefinition::new(
        BehaviorMeta::new("t/one", "one", &[TriggerField::Scroll]),
        opacity_one,
    ));
    reg.register(BehaviorDefinition::new(
        BehaviorMeta::new("t/gated", "gated", &[TriggerField::Visibility]),
        opacity_one,
    ));
    reg.register(BehaviorDefinition::new(
        BehaviorMeta::new("t/echo", "echo", &[TriggerField::Scroll]),
        scroll_echo,
    ));
    reg.register(BehaviorDefinition::new(
        BehaviorMeta::new("t/broken", "broken", &[TriggerField::Scroll]),
        broken,
    ));
    reg.register(BehaviorDefinition::new(
        BehaviorMeta::new("t/panics", "panics", &[TriggerField::Scroll]),
        panics,
    ));
    reg.register_lazy(BehaviorMeta::new("t/lazy", "lazy", &[]), || async {
        anyhow::Ok(BehaviorDefinition::new(
            BehaviorMeta::new("t/lazy", "lazy", &[]),
            opacity_one,
        ))
    });
    reg
}

fn eval_one(assignments: &[BehaviorAssignment], signal: ElementSignal) -> FrameEvaluation {
    let element = ElementRef::new("el");
    evaluate_frame(
        &TriggerState::default(),
        [ElementInput {
            element: &element,
            assignments,
            signal,
        }],
        &registry(),
    )
}

fn visible() -> ElementSignal {
    ElementSignal {
        intersection_ratio: 1.0,
        visible: true,
        ..ElementSignal::default()
    }
}

#[test]
fn later_assignments_win_per_key() {
    let eval = eval_one(
        &[BehaviorAssignment::new("t/half"), BehaviorAssignment::new("t/one")],
        visible(),
    );
    let (_, out) = &eval.outputs[0];
    assert_eq!(out.get("opacity"), Some(&StyleValue::number(1.0)));
    assert_eq!(out.get("--a"), Some(&StyleValue::number(1.0)));

    let reversed = eval_one(
        &[BehaviorAssignment::new("t/one"), BehaviorAssignment::new("t/half")],
        visible(),
    );
    assert_eq!(
        reversed.outputs[0].1.get("opacity"),
        Some(&StyleValue::number(0.5))
    );
}

#[test]
fn visibility_gating_skips_hidden_elements_unless_pinned() {
    let hidden = ElementSignal::default();
    let eval = eval_one(&[BehaviorAssignment::new("t/gated")], hidden);
    assert_eq!(eval.skipped, 1);
    assert!(eval.outputs[0].1.is_empty());

    let pinned = eval_one(&[BehaviorAssignment::new("t/gated").pinned()], hidden);
    assert_eq!(pinned.evaluated, 1);
    assert_eq!(
        pinned.outputs[0].1.get("opacity"),
        Some(&StyleValue::number(1.0))
    );
}

#[test]
fn unknown_and_failing_assignments_do_not_block_others() {
    let eval = eval_one(
        &[
            BehaviorAssignment::new("nonexistent/xyz"),
            BehaviorAssignment::new("t/broken"),
            BehaviorAssignment::new("t/one"),
        ],
        visible(),
    );
    assert_eq!(eval.issues.len(), 2);
    assert!(matches!(&eval.issues[0], EvalIssue::Unknown { behavior, .. } if behavior == "nonexistent/xyz"));
    assert!(matches!(&eval.issues[1], EvalIssue::Failed { error: MotionError::Compute(_), .. }));
    assert_eq!(eval.evaluated, 1);
    assert_eq!(
        eval.outputs[0].1.get("opacity"),
        Some(&StyleValue::number(1.0))
    );
}

#[test]
fn a_panicking_behavior_fails_alone() {
    let eval = eval_one(
        &[BehaviorAssignment::new("t/panics"), BehaviorAssignment::new("t/one")],
        visible(),
    );
    assert_eq!(eval.issues.len(), 1);
    match &eval.issues[0] {
        EvalIssue::Failed { behavior, error, .. } => {
            assert_eq!(behavior, "t/panics");
            assert!(error.to_string().contains("index out of range"));
        }
        other => panic!("unexpected issue {other:?}"),
    }
    assert_eq!(eval.evaluated, 1);
    assert_eq!(
        eval.outputs[0].1.get("opacity"),
        Some(&StyleValue::number(1.0))
    );
}

#[test]
fn lazy_behaviors_are_skipped_until_loaded() {
    let eval = eval_one(&[BehaviorAssignment::new("t/lazy")], visible());
    assert_eq!(eval.skipped, 1);
    assert!(eval.issues.is_empty());
}

fn core_with_sink() -> (DriverCore, Rc<RefCell<RecordingSink>>) {
    let (recording, sink) = RecordingSink::shared();
    let store = SharedStore::new();
    let ctx = DriverContext {
        container: ContainerKey::Viewport,
        host: None,
        sink,
        behaviors: Arc::new(registry()),
        config: RuntimeConfig::default(),
    };
    let writer = store.claim_writer("test").unwrap();
    (DriverCore::new(ctx, writer, Size::new(800.0, 600.0)), recording)
}

#[test]
fn unchanged_values_are_not_rewritten() {
    let (mut core, sink) = core_with_sink();
    core.attach(ElementRef::new("a"), vec![BehaviorAssignment::new("t/echo")]);
    assert_eq!(core.phase(), DriverPhase::Running);

    let signals = HashMap::new();
    let mut state = TriggerState::default();
    let first = core.evaluate_and_write(&state, &signals);
    assert_eq!(first.writes, 1);
    let second = core.evaluate_and_write(&state, &signals);
    assert_eq!(second.writes, 0);
    assert_eq!(second.frame, 2);

    state.scroll.offset = 12.0;
    assert_eq!(core.evaluate_and_write(&state, &signals).writes, 1);
    assert_eq!(sink.borrow().write_count(), 2);
    assert_eq!(
        sink.borrow().current(&ElementId::new("a"), "--offset"),
        Some(&StyleValue::number(12.0))
    );
}

#[test]
fn compute_failures_are_counted_per_assignment() {
    let (mut core, _sink) = core_with_sink();
    core.attach(
        ElementRef::new("a"),
        vec![BehaviorAssignment::new("t/broken"), BehaviorAssignment::new("t/one")],
    );
    for _ in 0..3 {
        let report = core.evaluate_and_write(&TriggerState::default(), &HashMap::new());
        assert_eq!(report.failures, 1);
    }
    assert_eq!(core.failure_count(&ElementId::new("a"), "t/broken"), 3);
    core.detach(&ElementId::new("a"));
    assert_eq!(core.failure_count(&ElementId::new("a"), "t/broken"), 0);
}

#[test]
fn page_visibility_pauses_and_resumes() {
    let (mut core, _sink) = core_with_sink();
    core.attach(ElementRef::new("a"), Vec::new());
    core.inbox
        .borrow_mut()
        .push(TriggerFragment::PageVisibility { hidden: true });
    core.ingest();
    assert_eq!(core.phase(), DriverPhase::Paused);
    core.inbox
        .borrow_mut()
        .push(TriggerFragment::PageVisibility { hidden: false });
    core.ingest();
    assert_eq!(core.phase(), DriverPhase::Running);
}

#[test]
fn destroy_is_final_and_returns_remaining_elements() {
    let (mut core, _sink) = core_with_sink();
    core.attach(ElementRef::new("a"), Vec::new());
    core.attach(ElementRef::section("b", 0), Vec::new());
    let remaining = core.destroy();
    assert_eq!(remaining.len(), 2);
    assert!(core.is_destroyed());
    assert!(core.destroy().is_empty());
    assert!(!core.attach(ElementRef::new("c"), Vec::new()));
}
