use crate::animation::props::{Scale, Translate};
use crate::foundation::core::{Canvas, Rect, Vec2};
use crate::timeline::item::Placement;

/// How the scale curve drives destination sizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// `scale.x` expands both axes; `scale.y` is ignored.
    #[default]
    Uniform,
    /// `scale.x` sizes the width and `scale.y` the height.
    PerAxis,
}

/// Integer destination rectangle in canvas pixels (`x1`/`y1` exclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestRect {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
}

impl DestRect {
    /// Rectangle from its edges.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle covering the whole canvas.
    pub fn full(canvas: Canvas) -> Self {
        Self::new(0, 0, clamp_i32(canvas.width), clamp_i32(canvas.height))
    }

    /// Width, possibly negative for degenerate rectangles.
    pub fn width(self) -> i32 {
        self.x1 - self.x0
    }

    /// Height, possibly negative for degenerate rectangles.
    pub fn height(self) -> i32 {
        self.y1 - self.y0
    }

    /// Return `true` when the rectangle covers no pixel.
    pub fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }

    fn from_rect(rect: Rect) -> Self {
        let r = rect.round();
        Self::new(r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32)
    }

    /// Rectangle moved by `delta` pixels, rounded to the pixel grid.
    pub fn offset(self, delta: Vec2) -> Self {
        Self::from_rect(self.to_rect() + delta)
    }
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Layout rectangle of a clip before animation: full canvas for the sentinel placement.
pub fn layout_rect(placement: Placement, canvas: Canvas) -> DestRect {
    if placement.is_full_frame() {
        return DestRect::full(canvas);
    }
    DestRect::new(
        placement.x,
        placement.y,
        placement.x.saturating_add(placement.width),
        placement.y.saturating_add(placement.height),
    )
}

/// Apply translate then scale-about-center to a layout rectangle.
///
/// Offsets and half size deltas are truncated toward zero, per edge.
pub fn transform_rect(layout: DestRect, translate: Translate, scale: Scale, mode: ScaleMode) -> DestRect {
    let tx = translate.x.trunc() as i32;
    let ty = translate.y.trunc() as i32;
    let mut r = DestRect::new(
        layout.x0.saturating_add(tx),
        layout.y0.saturating_add(ty),
        layout.x1.saturating_add(tx),
        layout.y1.saturating_add(ty),
    );

    let sy = match mode {
        ScaleMode::Uniform => scale.x,
        ScaleMode::PerAxis => scale.y,
    };
    let w = f64::from(r.width());
    let h = f64::from(r.height());
    let half_dw = ((w * scale.x - w) / 2.0).trunc() as i32;
    let half_dh = ((h * sy - h) / 2.0).trunc() as i32;

    r.x0 = r.x0.saturating_sub(half_dw);
    r.x1 = r.x1.saturating_add(half_dw);
    r.y0 = r.y0.saturating_sub(half_dh);
    r.y1 = r.y1.saturating_add(half_dh);
    r
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
