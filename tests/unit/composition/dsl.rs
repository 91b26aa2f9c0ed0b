use super::*;

#[test]
fn builder_sets_every_field() {
    let config = CompositionBuilder::new("deck", PresentationModel::Slideshow)
        .label("Deck")
        .describe("slides")
        .transition(500.0, Ease::InOutCubic)
        .layout(LayoutSpec {
            full_height_sections: true,
            section_length: Some(720.0),
        })
        .hide_inactive(true)
        .looping(true)
        .lock_during_transition(true)
        .debounce_ms(250.0)
        .skip_pinned(true)
        .active_section(ActiveSectionStrategy::FirstVisible)
        .history(HistoryMode::Push)
        .section("*", vec![BehaviorAssignment::new("scroll/fade")])
        .unwrap()
        .chrome("nav", Vec::new())
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.label, "Deck");
    assert_eq!(config.presentation.transition.duration_ms, 500.0);
    assert_eq!(config.presentation.layout.section_length, Some(720.0));
    assert!(config.presentation.hide_inactive);
    assert!(config.navigation.looping && config.navigation.skip_pinned);
    assert_eq!(config.navigation.history, HistoryMode::Push);
    assert_eq!(config.section_behaviors["*"].len(), 1);
    assert!(config.chrome_behaviors.contains_key("nav"));
}

#[test]
fn label_defaults_to_id() {
    let config = CompositionBuilder::new("plain", PresentationModel::Stacking)
        .build()
        .unwrap();
    assert_eq!(config.label, "plain");
    assert!(!config.bare_mode);
}

#[test]
fn duplicate_keys_are_rejected() {
    let err = CompositionBuilder::new("d", PresentationModel::Stacking)
        .section("hero", Vec::new())
        .unwrap()
        .section("hero", Vec::new())
        .err()
        .unwrap();
    assert!(err.to_string().contains("duplicate section key 'hero'"));

    let err = CompositionBuilder::new("d", PresentationModel::Stacking)
        .chrome("*", Vec::new())
        .unwrap()
        .chrome("*", Vec::new())
        .err()
        .unwrap();
    assert!(matches!(err, MotionError::Validation(_)));
}

#[test]
fn build_validates() {
    assert!(CompositionBuilder::new("", PresentationModel::Stacking).build().is_err());
    assert!(
        CompositionBuilder::new("x", PresentationModel::Stacking)
            .debounce_ms(f64::NAN)
            .build()
            .is_err()
    );
}
