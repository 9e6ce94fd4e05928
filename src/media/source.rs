use std::time::Duration;

use crate::foundation::error::ClipweaveResult;
use crate::render::surface::FrameRGBA;
use crate::timeline::resource::Resource;

/// One stereo sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioSample {
    /// Left channel.
    pub left: f32,
    /// Right channel.
    pub right: f32,
}

impl AudioSample {
    /// Silence.
    pub const SILENT: Self = Self {
        left: 0.0,
        right: 0.0,
    };

    /// Sample from both channels.
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Both channels multiplied by `gain`.
    pub fn scaled(self, gain: f32) -> Self {
        Self {
            left: self.left * gain,
            right: self.right * gain,
        }
    }
}

/// Per-clip decoding handle addressed in source-relative time.
///
/// `Ok(None)` means there is no data at that instant and is treated as silence or a skipped
/// layer. `Err` is a decode failure and aborts the render.
pub trait MediaSource: Send {
    /// Whether the source carries an audio stream.
    fn has_audio(&self) -> bool;

    /// Whether the source carries a picture stream.
    fn has_video(&self) -> bool;

    /// Stereo sample at `t`.
    fn audio_sample(&mut self, t: Duration) -> ClipweaveResult<Option<AudioSample>>;

    /// Frame displayed at `t`.
    fn video_frame(&mut self, t: Duration) -> ClipweaveResult<Option<FrameRGBA>>;
}

/// Opens media sources for resources.
pub trait MediaDecoder {
    /// Open a fresh source for one track item.
    fn open(&self, resource: &Resource) -> ClipweaveResult<Box<dyn MediaSource>>;

    /// Open the embedded audio of a video resource; `None` when it has no audio stream.
    fn demux_audio(&self, resource: &Resource) -> ClipweaveResult<Option<Box<dyn MediaSource>>>;
}
