use super::*;

#[test]
fn unknown_ids_are_reported_once_per_element() {
    let mut log = DiagnosticLog::new(10);
    let a = ElementId::new("a");
    let b = ElementId::new("b");
    assert!(log.unknown_behavior(&a, "nonexistent/xyz"));
    assert!(!log.unknown_behavior(&a, "nonexistent/xyz"));
    assert!(log.unknown_behavior(&b, "nonexistent/xyz"));
}

#[test]
fn compute_failures_are_rate_limited() {
    let mut log = DiagnosticLog::new(3);
    let el = ElementId::new("hero");
    let err = MotionError::compute("bad input");

    let reported: Vec<bool> = (0..8)
        .map(|_| log.compute_failure(&el, "scroll/fade", &err))
        .collect();
    // 1st, 4th and 7th failures are logged.
    assert_eq!(
        reported,
        vec![true, false, false, true, false, false, true, false]
    );
    assert_eq!(log.failure_count(&el, "scroll/fade"), 8);
}

#[test]
fn zero_interval_reports_only_first() {
    let mut log = DiagnosticLog::new(0);
    let el = ElementId::new("hero");
    let err = MotionError::compute("x");
    assert!(log.compute_failure(&el, "b", &err));
    assert!(!(0..50).any(|_| log.compute_failure(&el, "b", &err)));
}

#[test]
fn forget_element_resets_state() {
    let mut log = DiagnosticLog::new(0);
    let el = ElementId::new("hero");
    log.unknown_behavior(&el, "x");
    log.compute_failure(&el, "y", &MotionError::compute("z"));
    log.forget_element(&el);
    assert_eq!(log.failure_count(&el, "y"), 0);
    assert!(log.unknown_behavior(&el, "x"));
}
