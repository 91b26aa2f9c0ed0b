use super::*;

#[test]
fn reads_both_parameters_from_a_url() {
    let o = DevOverride::from_url(
        "https://example.test/work?composition=slideshow&behavior=scroll%2Ffade&x=1",
        &RuntimeConfig::default(),
    )
    .unwrap();
    assert_eq!(o.composition.as_deref(), Some("slideshow"));
    assert_eq!(o.behavior.as_deref(), Some("scroll/fade"));
}

#[test]
fn absent_or_empty_parameters_are_ignored() {
    let cfg = RuntimeConfig::default();
    assert!(DevOverride::from_url("https://example.test/", &cfg).unwrap().is_empty());
    assert!(DevOverride::from_query("?composition=&behavior=%20", &cfg).is_empty());
}

#[test]
fn first_occurrence_wins() {
    let o = DevOverride::from_query("composition=a&composition=b", &RuntimeConfig::default());
    assert_eq!(o.composition.as_deref(), Some("a"));
}

#[test]
fn parameter_names_come_from_config() {
    let cfg = RuntimeConfig {
        override_param: "look".to_owned(),
        ..RuntimeConfig::default()
    };
    let o = DevOverride::from_query("composition=a&look=static", &cfg);
    assert_eq!(o.composition.as_deref(), Some("static"));
    assert_eq!(o.behavior, None);
}

#[test]
fn relative_urls_are_a_config_error() {
    let err = DevOverride::from_url("/work?composition=a", &RuntimeConfig::default()).unwrap_err();
    assert!(matches!(err, MotionError::Config(_)));
}
