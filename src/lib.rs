//! Clipweave is the rendering core of a non-linear media timeline.
//!
//! A [`Project`] holds audio and video track lines of time-placed clips, each with keyframed
//! opacity, translate, scale and gain curves. Rendering is session-oriented:
//!
//! - Load and validate a [`Project`] (in code or from a JSON project file)
//! - Create a [`RenderSession`] with a [`MediaDecoder`] and [`RenderOpts`]
//! - Preview single frames, or [`render`](RenderSession::render) the full audio pass and then the
//!   full video pass into an encoder pair and a [`Muxer`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod audio;
pub(crate) mod encode;
pub(crate) mod media;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    Canvas, Fps, Point, Rational, Rect, Size, Vec2, duration_from_secs,
};
pub use crate::foundation::error::{ClipweaveError, ClipweaveResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::keyframes::{KeyFrame, KeyFrames};
pub use crate::animation::props::{Lerp, Opacity, Scale, Translate};

pub use crate::timeline::arena::{ClipArena, ClipId};
pub use crate::timeline::file::{ProjectFile, ResourceDef};
pub use crate::timeline::item::{
    AudioTrackItem, ClipTiming, Placement, Timed, TrackItem, TransitionKind, VideoTrackItem,
};
pub use crate::timeline::project::{Project, TrackLine};
pub use crate::timeline::resolve::{
    ActiveClips, ActiveFilter, Intersection, intersection_rate, resolve_active,
};
pub use crate::timeline::resource::{
    ByteStream, FileStream, MemoryStream, Resource, StreamFactory,
};

#[cfg(feature = "media-ffmpeg")]
pub use crate::media::ffmpeg::{FfmpegDecoder, ProbeInfo, VideoStreamInfo, probe};
pub use crate::media::memory::{
    InMemoryDecoder, MemoryMedia, PcmSource, StillImageDecoder, StillSource,
};
pub use crate::media::source::{AudioSample, MediaDecoder, MediaSource};

pub use crate::audio::mix::AudioBlock;

pub use crate::render::composite::{CompositeMode, PremulRgba8};
pub use crate::render::layout::{DestRect, ScaleMode};
pub use crate::render::surface::FrameRGBA;
pub use crate::render::transitions::{
    Fade, SlideX, TransitionInput, TransitionRegistry, VideoTransition, Wipe,
};

pub use crate::encode::codec::{
    AudioEncoder, AudioFrame, AudioParams, Packet, PcmEncoder, PixelLayout, RawVideoEncoder,
    VideoEncoder, VideoFrame, VideoParams, convert_frame,
};
pub use crate::encode::ffmpeg::{FfmpegMuxer, FfmpegMuxerOpts, is_ffmpeg_on_path};
pub use crate::encode::mux::{InMemoryMuxer, Muxer, RecordedStream, StreamInfo, StreamParams};

pub use crate::session::cancel::CancellationToken;
pub use crate::session::progress::{NoProgress, ProgressSink};
pub use crate::session::renderer::{
    RenderOpts, RenderOutput, RenderReport, RenderSession, RenderState,
};
