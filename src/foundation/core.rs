use std::time::Duration;

use crate::foundation::error::{ClipweaveError, ClipweaveResult};

pub use kurbo::{Point, Rect, Size, Vec2};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ClipweaveResult<Self> {
        if den == 0 {
            return Err(ClipweaveError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ClipweaveError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Timeline instant of frame `index`.
    pub fn frame_time(self, index: u64) -> Duration {
        let nanos = u128::from(index) * NANOS_PER_SEC * u128::from(self.den) / u128::from(self.num);
        duration_from_nanos(nanos)
    }

    /// Encoder time base for this frame rate (`den/num`).
    pub fn time_base(self) -> Rational {
        Rational::new(i64::from(self.den), i64::from(self.num))
    }
}

/// Timeline instant of audio sample `index` at `sample_rate` Hz.
pub fn sample_time(index: u64, sample_rate: u32) -> Duration {
    let nanos = u128::from(index) * NANOS_PER_SEC / u128::from(sample_rate.max(1));
    duration_from_nanos(nanos)
}

fn duration_from_nanos(nanos: u128) -> Duration {
    let secs = (nanos / NANOS_PER_SEC) as u64;
    let sub = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, sub)
}

/// Rational number used for stream and encoder time bases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    /// Numerator.
    pub num: i64,
    /// Denominator, non-zero.
    pub den: i64,
}

impl Rational {
    /// Create a rational `num/den`.
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Rescale `value` expressed in `from` units into `to` units.
    ///
    /// Rounds to nearest, halves away from zero.
    pub fn rescale(value: i64, from: Rational, to: Rational) -> i64 {
        let num = i128::from(value) * i128::from(from.num) * i128::from(to.den);
        let den = i128::from(from.den) * i128::from(to.num);
        if den == 0 {
            return value;
        }
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let half = den / 2;
        let q = if num >= 0 {
            (num + half) / den
        } else {
            (num - half) / den
        };
        q as i64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas size as floating-point dimensions.
    pub fn size(self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Convert seconds into a [`Duration`], rejecting negative and non-finite input.
pub fn duration_from_secs(secs: f64) -> ClipweaveResult<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ClipweaveError::validation(format!(
            "time value must be finite and >= 0, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| {
        ClipweaveError::validation(format!("time value {secs} is out of range: {e}"))
    })
}

/// Serde adapter storing a [`Duration`] as floating-point seconds.
pub mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `d` as seconds.
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    /// Deserialize seconds into a [`Duration`].
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        super::duration_from_secs(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
