use std::time::Duration;

use crate::animation::keyframes::KeyFrames;
use crate::animation::props::{Opacity, Scale, Translate};
use crate::foundation::core::serde_secs;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};

/// Closed set of clip-to-clip video transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Cross-dissolve between the outgoing and incoming clip.
    Fade,
    /// Outgoing clip slides out to the left while the incoming clip slides in from the right.
    SlideX,
    /// Left-to-right wipe with a soft edge.
    Wipe,
}

/// Placement and trim shared by every track item.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClipTiming {
    /// Key into [`Project::resources`](crate::Project::resources).
    #[serde(rename = "resource")]
    pub resource_id: String,
    /// Start of the clip on the global timeline.
    #[serde(with = "serde_secs", default)]
    pub offset: Duration,
    /// Trim-in point inside the source media.
    #[serde(rename = "start", with = "serde_secs", default)]
    pub start_time: Duration,
    /// Trim-out point inside the source media.
    #[serde(rename = "end", with = "serde_secs")]
    pub end_time: Duration,
    /// Linear gain; `0` marks the clip silent.
    #[serde(default = "unit_volume")]
    pub volume: f32,
    /// Transition played while this clip overlaps the next one on its line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionKind>,
}

fn unit_volume() -> f32 {
    1.0
}

impl ClipTiming {
    /// Clip showing `[start_time, end_time)` of `resource_id` from `offset` on.
    pub fn new(
        resource_id: impl Into<String>,
        offset: Duration,
        start_time: Duration,
        end_time: Duration,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            offset,
            start_time,
            end_time,
            volume: 1.0,
            transition: None,
        }
    }

    /// Builder for [`ClipTiming::volume`].
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Builder for [`ClipTiming::transition`].
    pub fn with_transition(mut self, kind: TransitionKind) -> Self {
        self.transition = Some(kind);
        self
    }

    /// Length of the trimmed window.
    pub fn duration(&self) -> Duration {
        self.end_time.saturating_sub(self.start_time)
    }

    /// `offset + (end_time - start_time)`.
    ///
    /// Saturates at [`Duration::MAX`]; validated clips never reach it.
    pub fn absolute_end_time(&self) -> Duration {
        self.offset.saturating_add(self.duration())
    }

    /// Half-open test `offset <= t < absolute_end_time`.
    pub fn is_time_in_range(&self, t: Duration) -> bool {
        self.offset <= t && t < self.absolute_end_time()
    }

    /// Map global timeline time to source-media time: `t - offset + start_time`.
    ///
    /// Decoders and curves are both addressed in this time base.
    pub fn relative_time(&self, t: Duration) -> Duration {
        t.saturating_sub(self.offset).saturating_add(self.start_time)
    }

    pub(crate) fn validate(&self) -> ClipweaveResult<()> {
        if self.end_time < self.start_time {
            return Err(ClipweaveError::validation(format!(
                "clip on resource '{}' has end time {:?} before start time {:?}",
                self.resource_id, self.end_time, self.start_time
            )));
        }
        if self.offset.checked_add(self.duration()).is_none() {
            return Err(ClipweaveError::validation(format!(
                "clip on resource '{}' ends beyond the representable timeline",
                self.resource_id
            )));
        }
        if !self.volume.is_finite() {
            return Err(ClipweaveError::validation(format!(
                "clip on resource '{}' has non-finite volume",
                self.resource_id
            )));
        }
        Ok(())
    }
}

/// Anything that carries a [`ClipTiming`].
pub trait Timed {
    /// Shared placement and trim.
    fn timing(&self) -> &ClipTiming;
}

impl Timed for ClipTiming {
    fn timing(&self) -> &ClipTiming {
        self
    }
}

/// Integer placement rectangle; all zeros means "fill the output frame".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Left edge in output pixels.
    #[serde(default)]
    pub x: i32,
    /// Top edge in output pixels.
    #[serde(default)]
    pub y: i32,
    /// Width in output pixels.
    #[serde(default)]
    pub width: i32,
    /// Height in output pixels.
    #[serde(default)]
    pub height: i32,
}

impl Placement {
    /// Explicit placement rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Return `true` for the full-frame sentinel.
    pub fn is_full_frame(&self) -> bool {
        *self == Self::default()
    }
}

fn unit_opacity_curve() -> KeyFrames<Opacity> {
    KeyFrames::new(Opacity::ONE)
}

fn zero_translate_curve() -> KeyFrames<Translate> {
    KeyFrames::new(Translate::default())
}

fn identity_scale_curve() -> KeyFrames<Scale> {
    KeyFrames::new(Scale::IDENTITY)
}

/// Clip on an audio track line.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioTrackItem {
    /// Placement and trim.
    #[serde(flatten)]
    pub timing: ClipTiming,
    /// Gain curve, sampled at source-relative time.
    #[serde(default = "unit_opacity_curve")]
    pub gain: KeyFrames<Opacity>,
}

impl AudioTrackItem {
    /// Audio clip with constant unity gain.
    pub fn new(timing: ClipTiming) -> Self {
        Self {
            timing,
            gain: unit_opacity_curve(),
        }
    }

    /// Builder replacing the gain curve.
    pub fn with_gain(mut self, gain: KeyFrames<Opacity>) -> Self {
        self.gain = gain;
        self
    }
}

impl Timed for AudioTrackItem {
    fn timing(&self) -> &ClipTiming {
        &self.timing
    }
}

/// Clip on a video track line.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoTrackItem {
    /// Placement and trim.
    #[serde(flatten)]
    pub timing: ClipTiming,
    /// Layout rectangle inside the output frame.
    #[serde(default)]
    pub placement: Placement,
    /// Opacity curve.
    #[serde(default = "unit_opacity_curve")]
    pub opacity: KeyFrames<Opacity>,
    /// Pixel offset curve.
    #[serde(default = "zero_translate_curve")]
    pub translate: KeyFrames<Translate>,
    /// Scale curve applied about the rectangle center.
    #[serde(default = "identity_scale_curve")]
    pub scale: KeyFrames<Scale>,
    /// Gain curve for the clip's embedded audio once extracted.
    #[serde(default = "unit_opacity_curve")]
    pub sound: KeyFrames<Opacity>,
}

impl VideoTrackItem {
    /// Full-frame video clip with identity curves.
    pub fn new(timing: ClipTiming) -> Self {
        Self {
            timing,
            placement: Placement::default(),
            opacity: unit_opacity_curve(),
            translate: zero_translate_curve(),
            scale: identity_scale_curve(),
            sound: unit_opacity_curve(),
        }
    }

    /// Builder for [`VideoTrackItem::placement`].
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Builder for [`VideoTrackItem::opacity`].
    pub fn with_opacity(mut self, curve: KeyFrames<Opacity>) -> Self {
        self.opacity = curve;
        self
    }

    /// Builder for [`VideoTrackItem::translate`].
    pub fn with_translate(mut self, curve: KeyFrames<Translate>) -> Self {
        self.translate = curve;
        self
    }

    /// Builder for [`VideoTrackItem::scale`].
    pub fn with_scale(mut self, curve: KeyFrames<Scale>) -> Self {
        self.scale = curve;
        self
    }

    /// Builder for [`VideoTrackItem::sound`].
    pub fn with_sound(mut self, curve: KeyFrames<Opacity>) -> Self {
        self.sound = curve;
        self
    }

    /// Project this clip onto an audio clip carrying its embedded sound.
    ///
    /// Copies resource, placement in time, trim and volume; the sound curve becomes the gain
    /// curve. Transitions are not carried over.
    pub fn to_audio_item(&self) -> AudioTrackItem {
        AudioTrackItem {
            timing: ClipTiming {
                transition: None,
                ..self.timing.clone()
            },
            gain: self.sound.clone(),
        }
    }
}

impl Timed for VideoTrackItem {
    fn timing(&self) -> &ClipTiming {
        &self.timing
    }
}

/// A track item of either media kind.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackItem {
    /// Audio clip (authored or extracted from a video clip).
    Audio(AudioTrackItem),
    /// Video clip.
    Video(VideoTrackItem),
}

impl TrackItem {
    /// Return the audio payload, if any.
    pub fn as_audio(&self) -> Option<&AudioTrackItem> {
        match self {
            Self::Audio(a) => Some(a),
            Self::Video(_) => None,
        }
    }

    /// Return the video payload, if any.
    pub fn as_video(&self) -> Option<&VideoTrackItem> {
        match self {
            Self::Video(v) => Some(v),
            Self::Audio(_) => None,
        }
    }
}

impl Timed for TrackItem {
    fn timing(&self) -> &ClipTiming {
        match self {
            Self::Audio(a) => &a.timing,
            Self::Video(v) => &v.timing,
        }
    }
}

impl From<AudioTrackItem> for TrackItem {
    fn from(item: AudioTrackItem) -> Self {
        Self::Audio(item)
    }
}

impl From<VideoTrackItem> for TrackItem {
    fn from(item: VideoTrackItem) -> Self {
        Self::Video(item)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/item.rs"]
mod tests;
