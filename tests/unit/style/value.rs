use super::*;

#[test]
fn numbers_are_quantized() {
    assert_eq!(StyleValue::number(0.123456), StyleValue::Number(0.1235));
    assert_eq!(StyleValue::number(-0.00001), StyleValue::Number(0.0));
    assert_eq!(StyleValue::number(f64::NAN), StyleValue::Number(0.0));
}

#[test]
fn fmt_num_trims_trailing_zeros() {
    assert_eq!(fmt_num(12.0), "12");
    assert_eq!(fmt_num(12.5), "12.5");
    assert_eq!(fmt_num(-0.0001), "0");
    assert_eq!(fmt_num(1.23456), "1.235");
    assert_eq!(StyleValue::px(-40.0).to_string(), "-40px");
}

#[test]
fn merge_is_last_writer_wins_per_key() {
    let mut a = StyleUpdate::new()
        .with("opacity", StyleValue::number(0.2))
        .with("transform", StyleValue::text("none"));
    let b = StyleUpdate::new().with("opacity", StyleValue::number(0.9));
    a.merge_from(b);
    assert_eq!(a.get("opacity"), Some(&StyleValue::Number(0.9)));
    assert_eq!(a.get("transform"), Some(&StyleValue::text("none")));
    assert_eq!(a.len(), 2);
}
