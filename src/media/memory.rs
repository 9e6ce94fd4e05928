use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::media::source::{AudioSample, MediaDecoder, MediaSource};
use crate::render::surface::FrameRGBA;
use crate::timeline::resource::Resource;

/// In-memory interleaved stereo PCM.
#[derive(Clone, Debug)]
pub struct PcmSource {
    sample_rate: u32,
    interleaved: Arc<[f32]>,
}

impl PcmSource {
    /// Source over interleaved `[l, r, l, r, ...]` samples.
    pub fn new(sample_rate: u32, interleaved: impl Into<Arc<[f32]>>) -> ClipweaveResult<Self> {
        if sample_rate == 0 {
            return Err(ClipweaveError::media("pcm sample rate must be > 0"));
        }
        let interleaved = interleaved.into();
        if !interleaved.len().is_multiple_of(2) {
            return Err(ClipweaveError::media(
                "interleaved stereo pcm must have an even sample count",
            ));
        }
        Ok(Self {
            sample_rate,
            interleaved,
        })
    }

    /// Source holding `sample` for `duration`.
    pub fn constant(sample_rate: u32, duration: Duration, sample: AudioSample) -> ClipweaveResult<Self> {
        let frames = (duration.as_secs_f64() * f64::from(sample_rate)).round() as usize;
        let mut data = Vec::with_capacity(frames * 2);
        for _ in 0..frames {
            data.push(sample.left);
            data.push(sample.right);
        }
        Self::new(sample_rate, data)
    }

    /// Number of stereo frames.
    pub fn frames(&self) -> usize {
        self.interleaved.len() / 2
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl MediaSource for PcmSource {
    fn has_audio(&self) -> bool {
        true
    }

    fn has_video(&self) -> bool {
        false
    }

    fn audio_sample(&mut self, t: Duration) -> ClipweaveResult<Option<AudioSample>> {
        let idx = t.as_nanos() * u128::from(self.sample_rate) / 1_000_000_000;
        let Ok(idx) = usize::try_from(idx) else {
            return Ok(None);
        };
        if idx >= self.frames() {
            return Ok(None);
        }
        Ok(Some(AudioSample::new(
            self.interleaved[idx * 2],
            self.interleaved[idx * 2 + 1],
        )))
    }

    fn video_frame(&mut self, _t: Duration) -> ClipweaveResult<Option<FrameRGBA>> {
        Ok(None)
    }
}

/// One frame shown at every instant.
#[derive(Clone, Debug)]
pub struct StillSource {
    frame: Arc<FrameRGBA>,
}

impl StillSource {
    /// Still over `frame`, premultiplied on construction.
    pub fn new(mut frame: FrameRGBA) -> ClipweaveResult<Self> {
        frame.check_len()?;
        frame.premultiply();
        Ok(Self {
            frame: Arc::new(frame),
        })
    }
}

impl MediaSource for StillSource {
    fn has_audio(&self) -> bool {
        false
    }

    fn has_video(&self) -> bool {
        true
    }

    fn audio_sample(&mut self, _t: Duration) -> ClipweaveResult<Option<AudioSample>> {
        Ok(None)
    }

    fn video_frame(&mut self, _t: Duration) -> ClipweaveResult<Option<FrameRGBA>> {
        Ok(Some(FrameRGBA::clone(&self.frame)))
    }
}

/// Picture and sound of one in-memory resource.
#[derive(Clone, Debug, Default)]
pub struct MemoryMedia {
    /// Embedded audio stream.
    pub audio: Option<PcmSource>,
    /// Still picture stream.
    pub video: Option<StillSource>,
}

impl MediaSource for MemoryMedia {
    fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    fn has_video(&self) -> bool {
        self.video.is_some()
    }

    fn audio_sample(&mut self, t: Duration) -> ClipweaveResult<Option<AudioSample>> {
        match self.audio.as_mut() {
            Some(a) => a.audio_sample(t),
            None => Ok(None),
        }
    }

    fn video_frame(&mut self, t: Duration) -> ClipweaveResult<Option<FrameRGBA>> {
        match self.video.as_mut() {
            Some(v) => v.video_frame(t),
            None => Ok(None),
        }
    }
}

/// Decoder serving pre-built media by resource id.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDecoder {
    media: HashMap<String, MemoryMedia>,
}

impl InMemoryDecoder {
    /// Empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder registering media for resource `id`.
    pub fn with(mut self, id: impl Into<String>, media: MemoryMedia) -> Self {
        self.media.insert(id.into(), media);
        self
    }

    fn lookup(&self, resource: &Resource) -> ClipweaveResult<&MemoryMedia> {
        self.media.get(&resource.id).ok_or_else(|| {
            ClipweaveError::media(format!("no in-memory media for resource '{}'", resource.id))
        })
    }
}

impl MediaDecoder for InMemoryDecoder {
    fn open(&self, resource: &Resource) -> ClipweaveResult<Box<dyn MediaSource>> {
        Ok(Box::new(self.lookup(resource)?.clone()))
    }

    fn demux_audio(&self, resource: &Resource) -> ClipweaveResult<Option<Box<dyn MediaSource>>> {
        Ok(self
            .lookup(resource)?
            .audio
            .clone()
            .map(|a| Box::new(a) as Box<dyn MediaSource>))
    }
}

/// Decoder turning image resources (PNG, JPEG, ...) into stills.
#[derive(Clone, Copy, Debug, Default)]
pub struct StillImageDecoder;

impl StillImageDecoder {
    /// Decode the resource bytes into a premultiplied frame.
    pub fn decode(resource: &Resource) -> ClipweaveResult<FrameRGBA> {
        let mut bytes = Vec::new();
        resource
            .open()?
            .read_to_end(&mut bytes)
            .with_context(|| format!("read image resource '{}'", resource.id))?;
        let dyn_img = image::load_from_memory(&bytes)
            .with_context(|| format!("decode image resource '{}'", resource.id))?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut frame = FrameRGBA::from_straight_rgba8(width, height, rgba.into_raw())?;
        frame.premultiply();
        Ok(frame)
    }
}

impl MediaDecoder for StillImageDecoder {
    fn open(&self, resource: &Resource) -> ClipweaveResult<Box<dyn MediaSource>> {
        Ok(Box::new(StillSource::new(Self::decode(resource)?)?))
    }

    fn demux_audio(&self, _resource: &Resource) -> ClipweaveResult<Option<Box<dyn MediaSource>>> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/memory.rs"]
mod tests;
