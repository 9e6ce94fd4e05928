use crate::foundation::math::{mul_div255_u8, unit_to_u8};
use crate::render::layout::DestRect;
use crate::render::surface::FrameRGBA;

pub type PremulRgba8 = [u8; 4];

/// How a clip's pixels combine with what is already on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMode {
    /// Overwrite the destination rectangle with the opacity-scaled source.
    #[default]
    Replace,
    /// Premultiplied source-over blend.
    SourceOver,
}

pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let op = unit_to_u8(opacity);
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Scale all four premultiplied channels by `opacity`.
pub fn fade(src: PremulRgba8, opacity: f64) -> PremulRgba8 {
    let op = unit_to_u8(opacity);
    [
        mul_div255(u16::from(src[0]), op),
        mul_div255(u16::from(src[1]), op),
        mul_div255(u16::from(src[2]), op),
        mul_div255(u16::from(src[3]), op),
    ]
}

pub fn crossfade(a: PremulRgba8, b: PremulRgba8, t: f64) -> PremulRgba8 {
    let tt = unit_to_u8(t);
    let it = 255u16 - tt;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let av = mul_div255(u16::from(a[i]), it);
        let bv = mul_div255(u16::from(b[i]), tt);
        out[i] = add_sat_u8(av, bv);
    }
    out
}

/// Draw `src` into `dest` on `dst`, nearest-neighbour resampled and clipped to `dst`.
///
/// Straight-alpha sources are premultiplied per pixel on the fly.
pub fn draw_frame(
    dst: &mut FrameRGBA,
    src: &FrameRGBA,
    dest: DestRect,
    opacity: f64,
    mode: CompositeMode,
) {
    if dest.is_empty() || src.width == 0 || src.height == 0 {
        return;
    }

    let cx0 = dest.x0.max(0);
    let cy0 = dest.y0.max(0);
    let cx1 = dest.x1.min(i32::try_from(dst.width).unwrap_or(i32::MAX));
    let cy1 = dest.y1.min(i32::try_from(dst.height).unwrap_or(i32::MAX));
    if cx0 >= cx1 || cy0 >= cy1 {
        return;
    }

    let dw = i64::from(dest.width());
    let dh = i64::from(dest.height());
    let sw = i64::from(src.width);
    let sh = i64::from(src.height);

    for y in cy0..cy1 {
        let sy = ((i64::from(y - dest.y0) * sh) / dh).clamp(0, sh - 1) as u32;
        for x in cx0..cx1 {
            let sx = ((i64::from(x - dest.x0) * sw) / dw).clamp(0, sw - 1) as u32;
            let Some(mut px) = src.pixel(sx, sy) else {
                continue;
            };
            if !src.premultiplied {
                px = premultiply_px(px);
            }
            let (ux, uy) = (x as u32, y as u32);
            let out = match mode {
                CompositeMode::Replace => fade(px, opacity),
                CompositeMode::SourceOver => match dst.pixel(ux, uy) {
                    Some(under) => over(under, px, opacity),
                    None => continue,
                },
            };
            dst.set_pixel(ux, uy, out);
        }
    }
}

/// Source-over `layer` onto `dst` pixel for pixel. Both frames must share dimensions.
pub fn over_frame(dst: &mut FrameRGBA, layer: &FrameRGBA) {
    if dst.width != layer.width || dst.height != layer.height {
        return;
    }
    for (d, s) in dst.data.chunks_exact_mut(4).zip(layer.data.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
        d.copy_from_slice(&out);
    }
}

/// Premultiplied canvas flattened over an opaque background, straight RGBA8 out.
pub fn flatten_over_bg(src: &[u8], dst: &mut Vec<u8>, bg_rgba: [u8; 4]) {
    dst.resize(src.len(), 0);
    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        let inv = 255u16 - a;
        d[0] = add_sat_u8(s[0], mul_div255(bg[0], inv));
        d[1] = add_sat_u8(s[1], mul_div255(bg[1], inv));
        d[2] = add_sat_u8(s[2], mul_div255(bg[2], inv));
        d[3] = 255;
    }
}

pub(crate) fn smoothstep(a: f64, b: f64, x: f64) -> f64 {
    if x <= a {
        return 0.0;
    }
    if x >= b {
        return 1.0;
    }
    let t = (x - a) / (b - a);
    (t * t * (3.0 - 2.0 * t)).clamp(0.0, 1.0)
}

fn premultiply_px(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
