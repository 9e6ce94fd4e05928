/// Values that can be interpolated between two keyframes.
///
/// Implementing this for a new type is all a property needs to become animatable;
/// [`KeyFrames`](crate::KeyFrames) is generic over it.
pub trait Lerp: Sized {
    /// Interpolate from `a` (at `t = 0`) to `b` (at `t = 1`).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

/// Clip opacity (or audio gain when used on sound curves), nominally `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Opacity(pub f64);

impl Opacity {
    /// Fully opaque / unity gain.
    pub const ONE: Self = Self(1.0);

    /// Raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Opacity {
    fn from(v: f64) -> Self {
        Self(v)
    }
}

impl Lerp for Opacity {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self(f64::lerp(&a.0, &b.0, t))
    }
}

/// Pixel offset applied to a clip's destination rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Translate {
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels.
    pub y: f64,
}

impl Translate {
    /// Create an offset.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Lerp for Translate {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            x: f64::lerp(&a.x, &b.x, t),
            y: f64::lerp(&a.y, &b.y, t),
        }
    }
}

/// Scale factors applied about the destination rectangle's center.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scale {
    /// Horizontal factor.
    pub x: f64,
    /// Vertical factor.
    pub y: f64,
}

impl Scale {
    /// Identity scale.
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Create a scale.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Lerp for Scale {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            x: f64::lerp(&a.x, &b.x, t),
            y: f64::lerp(&a.y, &b.y, t),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/props.rs"]
mod tests;
