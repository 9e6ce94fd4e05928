use std::f64::consts::FRAC_PI_2;

/// Easing applied to a keyframe segment's normalized progress before interpolation.
///
/// Project files name these in snake_case (`"out_cubic"`, `"in_out_sine"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InSine,
    OutSine,
    InOutSine,
}

#[derive(Clone, Copy)]
enum Shape {
    Power(i32),
    Sine,
}

#[derive(Clone, Copy)]
enum Phase {
    In,
    Out,
    InOut,
}

impl Shape {
    /// Ease-in form of the shape, `f(0) = 0`, `f(1) = 1`.
    fn ease_in(self, t: f64) -> f64 {
        match self {
            Self::Power(n) => t.powi(n),
            Self::Sine => 1.0 - (t * FRAC_PI_2).cos(),
        }
    }
}

impl Ease {
    fn decompose(self) -> (Shape, Phase) {
        match self {
            Self::Linear => (Shape::Power(1), Phase::In),
            Self::InQuad => (Shape::Power(2), Phase::In),
            Self::OutQuad => (Shape::Power(2), Phase::Out),
            Self::InOutQuad => (Shape::Power(2), Phase::InOut),
            Self::InCubic => (Shape::Power(3), Phase::In),
            Self::OutCubic => (Shape::Power(3), Phase::Out),
            Self::InOutCubic => (Shape::Power(3), Phase::InOut),
            Self::InSine => (Shape::Sine, Phase::In),
            Self::OutSine => (Shape::Sine, Phase::Out),
            Self::InOutSine => (Shape::Sine, Phase::InOut),
        }
    }

    /// Map progress `t` (clamped to `[0, 1]`) onto eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let (shape, phase) = self.decompose();
        match phase {
            Phase::In => shape.ease_in(t),
            Phase::Out => 1.0 - shape.ease_in(1.0 - t),
            // Ease-in over the first half, mirrored ease-out over the second.
            Phase::InOut if t < 0.5 => shape.ease_in(2.0 * t) / 2.0,
            Phase::InOut => 1.0 - shape.ease_in(2.0 - 2.0 * t) / 2.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
