use std::collections::VecDeque;

use crate::foundation::core::{Fps, Rational};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::render::composite::flatten_over_bg;
use crate::render::surface::FrameRGBA;

/// Encoded payload with timestamps in its producer's time base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    /// Presentation timestamp.
    pub pts: i64,
    /// Decode timestamp.
    pub dts: i64,
    /// Duration in time-base units.
    pub duration: i64,
    /// Encoded bytes.
    pub data: Vec<u8>,
    /// Container stream this packet belongs to.
    pub stream_index: usize,
}

impl Packet {
    /// Rewrite timestamps from `from` units into `to` units.
    pub fn rescale(&mut self, from: Rational, to: Rational) {
        self.pts = Rational::rescale(self.pts, from, to);
        self.dts = Rational::rescale(self.dts, from, to);
        self.duration = Rational::rescale(self.duration, from, to);
    }
}

/// A fixed-size block of planar stereo float samples.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioFrame {
    /// Index of the first sample on the timeline.
    pub pts: i64,
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
}

/// Byte order of packed 8-bit pixels handed to a video encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelLayout {
    /// `r, g, b, a`.
    #[default]
    Rgba8,
    /// `b, g, r, a`.
    Bgra8,
}

/// One opaque video frame in an encoder's pixel layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    /// Frame index on the timeline.
    pub pts: i64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Byte order of `data`.
    pub layout: PixelLayout,
    /// Packed pixels, row-major.
    pub data: Vec<u8>,
}

/// Audio encoder configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioParams {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per channel in every submitted frame.
    pub frame_size: usize,
    /// Time base of emitted packets.
    pub time_base: Rational,
}

/// Video encoder configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoParams {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Required input pixel layout.
    pub layout: PixelLayout,
    /// Frame rate.
    pub fps: Fps,
    /// Time base of emitted packets.
    pub time_base: Rational,
}

/// Turns planar audio frames into packets. `encode(None)` flushes buffered output.
pub trait AudioEncoder {
    /// Encoder configuration.
    fn params(&self) -> AudioParams;
    /// Submit one frame, or `None` to flush.
    fn encode(&mut self, frame: Option<&AudioFrame>) -> ClipweaveResult<Vec<Packet>>;
}

/// Turns video frames into packets. `encode(None)` flushes buffered output.
pub trait VideoEncoder {
    /// Encoder configuration.
    fn params(&self) -> VideoParams;
    /// Submit one frame, or `None` to flush.
    fn encode(&mut self, frame: Option<&VideoFrame>) -> ClipweaveResult<Vec<Packet>>;
}

/// Interleaves planar stereo into `f32le` packets, one per frame.
#[derive(Clone, Debug)]
pub struct PcmEncoder {
    params: AudioParams,
}

impl PcmEncoder {
    /// Encoder for `frame_size`-sample frames at `sample_rate`.
    pub fn new(sample_rate: u32, frame_size: usize) -> Self {
        Self {
            params: AudioParams {
                sample_rate,
                frame_size,
                time_base: Rational::new(1, i64::from(sample_rate)),
            },
        }
    }
}

impl AudioEncoder for PcmEncoder {
    fn params(&self) -> AudioParams {
        self.params
    }

    fn encode(&mut self, frame: Option<&AudioFrame>) -> ClipweaveResult<Vec<Packet>> {
        let Some(frame) = frame else {
            return Ok(Vec::new());
        };
        if frame.left.len() != self.params.frame_size || frame.right.len() != self.params.frame_size {
            return Err(ClipweaveError::encode(format!(
                "audio frame must hold {} samples per channel, got {}/{}",
                self.params.frame_size,
                frame.left.len(),
                frame.right.len()
            )));
        }
        let mut data = Vec::with_capacity(frame.left.len() * 8);
        for (l, r) in frame.left.iter().zip(&frame.right) {
            data.extend_from_slice(&l.to_le_bytes());
            data.extend_from_slice(&r.to_le_bytes());
        }
        Ok(vec![Packet {
            pts: frame.pts,
            dts: frame.pts,
            duration: frame.left.len() as i64,
            data,
            stream_index: 0,
        }])
    }
}

/// Passes packed pixels through as packets, optionally holding back `delay` frames until flush.
#[derive(Clone, Debug)]
pub struct RawVideoEncoder {
    params: VideoParams,
    delay: usize,
    pending: VecDeque<Packet>,
}

impl RawVideoEncoder {
    /// Encoder for `width`x`height` frames in `layout` at `fps`.
    pub fn new(width: u32, height: u32, fps: Fps, layout: PixelLayout) -> Self {
        Self {
            params: VideoParams {
                width,
                height,
                layout,
                fps,
                time_base: fps.time_base(),
            },
            delay: 0,
            pending: VecDeque::new(),
        }
    }

    /// Number of frames buffered before packets start coming out.
    pub fn with_delay(mut self, delay: usize) -> Self {
        self.delay = delay;
        self
    }
}

impl VideoEncoder for RawVideoEncoder {
    fn params(&self) -> VideoParams {
        self.params
    }

    fn encode(&mut self, frame: Option<&VideoFrame>) -> ClipweaveResult<Vec<Packet>> {
        let Some(frame) = frame else {
            return Ok(self.pending.drain(..).collect());
        };
        let p = &self.params;
        if frame.width != p.width || frame.height != p.height || frame.layout != p.layout {
            return Err(ClipweaveError::encode(format!(
                "video frame {}x{} {:?} does not match encoder {}x{} {:?}",
                frame.width, frame.height, frame.layout, p.width, p.height, p.layout
            )));
        }
        self.pending.push_back(Packet {
            pts: frame.pts,
            dts: frame.pts,
            duration: 1,
            data: frame.data.clone(),
            stream_index: 0,
        });
        let mut out = Vec::new();
        while self.pending.len() > self.delay {
            if let Some(packet) = self.pending.pop_front() {
                out.push(packet);
            }
        }
        Ok(out)
    }
}

/// Flatten the premultiplied canvas over `bg_rgba` into an opaque frame in `layout`.
pub fn convert_frame(canvas: &FrameRGBA, pts: i64, layout: PixelLayout, bg_rgba: [u8; 4]) -> VideoFrame {
    let mut data = Vec::with_capacity(canvas.data.len());
    flatten_over_bg(&canvas.data, &mut data, bg_rgba);
    if layout == PixelLayout::Bgra8 {
        for px in data.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }
    VideoFrame {
        pts,
        width: canvas.width,
        height: canvas.height,
        layout,
        data,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/codec.rs"]
mod tests;
