use super::*;

#[test]
fn over_with_opaque_source_replaces() {
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
}

#[test]
fn over_with_zero_opacity_keeps_destination() {
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 0.0), [10, 20, 30, 255]);
}

#[test]
fn crossfade_endpoints() {
    let a = [255, 0, 0, 255];
    let b = [0, 0, 255, 255];
    assert_eq!(crossfade(a, b, 0.0), a);
    assert_eq!(crossfade(a, b, 1.0), b);
}

#[test]
fn fade_scales_every_channel() {
    assert_eq!(fade([200, 100, 50, 255], 0.0), [0, 0, 0, 0]);
    assert_eq!(fade([200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
}

#[test]
fn draw_clips_to_canvas_and_resamples() {
    let mut dst = FrameRGBA::transparent(4, 4);
    let mut src = FrameRGBA::transparent(2, 1);
    src.set_pixel(0, 0, [255, 0, 0, 255]);
    src.set_pixel(1, 0, [0, 255, 0, 255]);

    draw_frame(
        &mut dst,
        &src,
        DestRect::new(-2, 1, 6, 3),
        1.0,
        CompositeMode::Replace,
    );

    // Destination x in [-2, 6): columns -2..2 map to src 0, columns 2..6 to src 1.
    assert_eq!(dst.pixel(0, 1), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(1, 2), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(2, 1), Some([0, 255, 0, 255]));
    assert_eq!(dst.pixel(3, 2), Some([0, 255, 0, 255]));
    assert_eq!(dst.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(dst.pixel(0, 3), Some([0, 0, 0, 0]));
}

#[test]
fn zero_opacity_replace_blocks_layer_below() {
    let mut dst = FrameRGBA::solid(2, 2, [0, 0, 255, 255]);
    let top = FrameRGBA::solid(2, 2, [255, 0, 0, 255]);
    draw_frame(&mut dst, &top, DestRect::new(0, 0, 2, 2), 0.0, CompositeMode::Replace);
    assert_eq!(dst.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn zero_opacity_source_over_lets_layer_below_show() {
    let mut dst = FrameRGBA::solid(2, 2, [0, 0, 255, 255]);
    let top = FrameRGBA::solid(2, 2, [255, 0, 0, 255]);
    draw_frame(&mut dst, &top, DestRect::new(0, 0, 2, 2), 0.0, CompositeMode::SourceOver);
    assert_eq!(dst.pixel(1, 1), Some([0, 0, 255, 255]));
}

#[test]
fn straight_source_is_premultiplied_when_drawn() {
    let mut dst = FrameRGBA::transparent(1, 1);
    let src = FrameRGBA::from_straight_rgba8(1, 1, vec![200, 100, 50, 128]).unwrap();
    draw_frame(&mut dst, &src, DestRect::new(0, 0, 1, 1), 1.0, CompositeMode::Replace);
    assert_eq!(dst.pixel(0, 0), Some([100, 50, 25, 128]));
}

#[test]
fn flatten_alpha_0_returns_bg() {
    let mut dst = Vec::new();
    flatten_over_bg(&[0, 0, 0, 0], &mut dst, [10, 20, 30, 255]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_alpha_255_is_identity() {
    let mut dst = Vec::new();
    flatten_over_bg(&[1, 2, 3, 255], &mut dst, [10, 20, 30, 255]);
    assert_eq!(dst, vec![1, 2, 3, 255]);
}

#[test]
fn smoothstep_bounds() {
    assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
    assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
    assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-12);
}
