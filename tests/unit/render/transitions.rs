use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn input<'a>(a: &'a FrameRGBA, b: &'a FrameRGBA, rate: f64) -> TransitionInput<'a> {
    TransitionInput {
        size: Size::new(4.0, 2.0),
        frame_a: a,
        rect_a: DestRect::new(0, 0, 4, 2),
        opacity_a: 1.0,
        frame_b: b,
        rect_b: DestRect::new(0, 0, 4, 2),
        opacity_b: 1.0,
        duration: Duration::from_secs(1),
        rate,
    }
}

#[test]
fn fade_blends_by_rate() {
    let a = FrameRGBA::solid(4, 2, RED);
    let b = FrameRGBA::solid(4, 2, BLUE);
    let mut target = FrameRGBA::transparent(4, 2);

    Fade.render(&mut target, &input(&a, &b, 0.0)).unwrap();
    assert_eq!(target.pixel(0, 0), Some(RED));

    Fade.render(&mut target, &input(&a, &b, 1.0)).unwrap();
    assert_eq!(target.pixel(3, 1), Some(BLUE));

    Fade.render(&mut target, &input(&a, &b, 0.5)).unwrap();
    let px = target.pixel(1, 1).unwrap();
    assert!(px[0].abs_diff(px[2]) <= 1);
    assert_eq!(px[3], 255);
}

#[test]
fn slide_x_pushes_left() {
    let a = FrameRGBA::solid(4, 2, RED);
    let b = FrameRGBA::solid(4, 2, BLUE);
    let mut target = FrameRGBA::transparent(4, 2);

    SlideX.render(&mut target, &input(&a, &b, 0.5)).unwrap();
    assert_eq!(target.pixel(0, 0), Some(RED));
    assert_eq!(target.pixel(1, 1), Some(RED));
    assert_eq!(target.pixel(2, 0), Some(BLUE));
    assert_eq!(target.pixel(3, 1), Some(BLUE));
}

#[test]
fn hard_wipe_reveals_incoming_from_left() {
    let a = FrameRGBA::solid(4, 2, RED);
    let b = FrameRGBA::solid(4, 2, BLUE);
    let mut target = FrameRGBA::transparent(4, 2);

    Wipe { soft_edge: 0.0 }
        .render(&mut target, &input(&a, &b, 0.5))
        .unwrap();
    assert_eq!(target.pixel(0, 0), Some(BLUE));
    assert_eq!(target.pixel(1, 0), Some(BLUE));
    assert_eq!(target.pixel(2, 0), Some(RED));
    assert_eq!(target.pixel(3, 1), Some(RED));
}

#[test]
fn wrong_target_size_is_rejected() {
    let a = FrameRGBA::solid(4, 2, RED);
    let mut target = FrameRGBA::transparent(3, 2);
    assert!(Fade.render(&mut target, &input(&a, &a, 0.5)).is_err());
}

#[test]
fn default_registry_has_historical_set() {
    let reg = TransitionRegistry::default();
    assert!(reg.contains(TransitionKind::Fade));
    assert!(reg.contains(TransitionKind::SlideX));
    assert!(!reg.contains(TransitionKind::Wipe));

    let reg = reg.with(TransitionKind::Wipe, Wipe::default());
    assert!(reg.get(TransitionKind::Wipe).is_some());
    assert!(TransitionRegistry::empty().get(TransitionKind::Fade).is_none());
}
