use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = RuntimeConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, RuntimeConfig::default());
    assert_eq!(cfg.override_param, "composition");
    assert_eq!(cfg.momentum.friction, 0.9);
}

#[test]
fn partial_momentum_section_keeps_other_defaults() {
    let cfg = RuntimeConfig::from_json_str(
        r#"{ "default_composition": "slideshow", "momentum": { "friction": 0.8 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.default_composition, "slideshow");
    assert_eq!(cfg.momentum.friction, 0.8);
    assert_eq!(cfg.momentum.wheel_gain, 8.0);
}

#[test]
fn out_of_range_values_are_rejected() {
    assert!(RuntimeConfig::from_json_str(r#"{ "intersection_threshold": 2.0 }"#).is_err());
    assert!(RuntimeConfig::from_json_str(r#"{ "momentum": { "friction": 1.0 } }"#).is_err());
    assert!(RuntimeConfig::from_json_str(r#"{ "default_composition": " " }"#).is_err());
}

#[test]
fn load_reports_missing_file_as_config_error() {
    let err = RuntimeConfig::load(Path::new("target/does-not-exist.json")).unwrap_err();
    assert!(matches!(err, MotionError::Config(_)));
}
