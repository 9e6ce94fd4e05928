use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::props::Lerp;
use crate::foundation::core::serde_secs;

/// A time-stamped curve value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyFrame<T> {
    /// Clip-relative time of this key.
    #[serde(with = "serde_secs")]
    pub offset: Duration,
    /// Easing applied to the segment that ends at this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<Ease>,
    /// Value reached at `offset`.
    pub value: T,
}

impl<T> KeyFrame<T> {
    /// Key without easing (linear approach).
    pub fn new(offset: Duration, value: T) -> Self {
        Self {
            offset,
            ease: None,
            value,
        }
    }

    /// Key whose incoming segment is eased with `ease`.
    pub fn eased(offset: Duration, value: T, ease: Ease) -> Self {
        Self {
            offset,
            ease: Some(ease),
            value,
        }
    }
}

/// Animation curve: keyframes ordered by offset plus a default value.
///
/// Sampling rules:
/// - before the first key the curve yields `default`, it never extrapolates toward the first key;
/// - after the last key it holds the last key's value;
/// - between two keys it interpolates with [`Lerp`], eased by the later key's [`Ease`].
///
/// Keys are scanned in stored order and are never re-sorted. A curve built out of order samples
/// by that scan order; [`KeyFrames::is_sorted`] reports whether the ordering assumption holds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyFrames<T> {
    default: T,
    #[serde(default = "Vec::new")]
    keys: Vec<KeyFrame<T>>,
}

impl<T> KeyFrames<T>
where
    T: Lerp + Clone,
{
    /// Empty curve that always samples to `default`.
    pub fn new(default: T) -> Self {
        Self {
            default,
            keys: Vec::new(),
        }
    }

    /// Append a key. Keys are expected in increasing offset order.
    pub fn push(&mut self, key: KeyFrame<T>) {
        self.keys.push(key);
    }

    /// Builder form of [`KeyFrames::push`] for an un-eased key.
    pub fn with_key(mut self, offset: Duration, value: T) -> Self {
        self.push(KeyFrame::new(offset, value));
        self
    }

    /// Builder form of [`KeyFrames::push`] for an eased key.
    pub fn with_eased_key(mut self, offset: Duration, value: T, ease: Ease) -> Self {
        self.push(KeyFrame::eased(offset, value, ease));
        self
    }

    /// Value used before the first key and for empty curves.
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Stored keys in scan order.
    pub fn keys(&self) -> &[KeyFrame<T>] {
        &self.keys
    }

    /// Return `true` when keys are in non-decreasing offset order.
    pub fn is_sorted(&self) -> bool {
        self.keys.windows(2).all(|w| w[0].offset <= w[1].offset)
    }

    /// Sample the curve at clip-relative `offset`.
    pub fn sample(&self, offset: Duration) -> T {
        let (prev, next) = self.neighbours(offset);

        let Some(next) = next else {
            return prev.map_or_else(|| self.default.clone(), |p| p.value.clone());
        };
        let Some(prev) = prev else {
            return self.default.clone();
        };

        let span = (next.offset - prev.offset).as_secs_f64();
        let t = (offset - prev.offset).as_secs_f64() / span;
        let t = next.ease.map_or(t, |e| e.apply(t));
        T::lerp(&prev.value, &next.value, t)
    }

    fn neighbours(&self, offset: Duration) -> (Option<&KeyFrame<T>>, Option<&KeyFrame<T>>) {
        let mut prev = None;
        for key in &self.keys {
            if key.offset <= offset {
                prev = Some(key);
            } else {
                return (prev, Some(key));
            }
        }
        (prev, None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
