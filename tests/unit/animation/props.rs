use super::*;

#[test]
fn opacity_lerps_linearly() {
    let v = Opacity::lerp(&Opacity(0.0), &Opacity(1.0), 0.25);
    assert_eq!(v, Opacity(0.25));
}

#[test]
fn translate_and_scale_lerp_per_axis() {
    let t = Translate::lerp(&Translate::new(0.0, 10.0), &Translate::new(10.0, 30.0), 0.5);
    assert_eq!(t, Translate::new(5.0, 20.0));

    let s = Scale::lerp(&Scale::IDENTITY, &Scale::new(3.0, 2.0), 0.5);
    assert_eq!(s, Scale::new(2.0, 1.5));
}

#[test]
fn opacity_serializes_as_bare_number() {
    assert_eq!(serde_json::to_string(&Opacity(0.5)).unwrap(), "0.5");
}
