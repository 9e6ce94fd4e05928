use super::*;
use crate::encode::codec::{PcmEncoder, PixelLayout, RawVideoEncoder};
use crate::encode::mux::InMemoryMuxer;
use crate::media::memory::{InMemoryDecoder, MemoryMedia, PcmSource, StillSource};
use crate::media::source::AudioSample;
use crate::session::progress::NoProgress;
use crate::timeline::item::{AudioTrackItem, ClipTiming, VideoTrackItem};
use crate::timeline::project::TrackLine;
use crate::timeline::resource::Resource;

const SR: u32 = 1000;
const BLOCK: usize = 100;
const CAM: [u8; 4] = [10, 200, 30, 255];

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn opts() -> RenderOpts {
    RenderOpts {
        sample_rate: SR,
        audio_frame_size: BLOCK,
        fps: Fps::new(10, 1).unwrap(),
        ..RenderOpts::default()
    }
}

fn decoder() -> InMemoryDecoder {
    let pcm = |v: f32| PcmSource::constant(SR, ms(2000), AudioSample::new(v, v)).unwrap();
    InMemoryDecoder::new()
        .with("music", MemoryMedia {
            audio: Some(pcm(0.25)),
            video: None,
        })
        .with("cam", MemoryMedia {
            audio: Some(pcm(0.5)),
            video: Some(StillSource::new(FrameRGBA::solid(2, 2, CAM)).unwrap()),
        })
}

fn music(len_ms: u64) -> Project {
    Project::new("demo", 2, 2)
        .with_resource(Resource::from_bytes("music", vec![0u8]))
        .with_resource(Resource::from_bytes("cam", vec![0u8]))
        .with_audio_track(
            TrackLine::new().with_item(AudioTrackItem::new(ClipTiming::new("music", ms(0), ms(0), ms(len_ms)))),
        )
}

fn music_and_cam() -> Project {
    music(1000).with_video_track(
        TrackLine::new().with_item(VideoTrackItem::new(ClipTiming::new("cam", ms(0), ms(0), ms(500)))),
    )
}

struct Outputs {
    muxer: InMemoryMuxer,
    audio: PcmEncoder,
    video: RawVideoEncoder,
}

impl Outputs {
    fn new() -> Self {
        Self {
            muxer: InMemoryMuxer::new(),
            audio: PcmEncoder::new(SR, BLOCK),
            video: RawVideoEncoder::new(2, 2, Fps::new(10, 1).unwrap(), PixelLayout::Rgba8),
        }
    }

    fn output(&mut self) -> RenderOutput<'_> {
        RenderOutput {
            muxer: &mut self.muxer,
            audio: &mut self.audio,
            video: &mut self.video,
        }
    }
}

fn session(project: Project) -> RenderSession {
    RenderSession::new(project, &decoder(), opts(), TransitionRegistry::default()).unwrap()
}

fn floats(packet: &Packet) -> Vec<f32> {
    packet
        .data
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[test]
fn renders_audio_then_video_and_finishes() {
    let mut out = Outputs::new();
    let mut seen = Vec::new();
    let mut sink = |p: f64| seen.push(p);
    let report = session(music_and_cam())
        .render(out.output(), &mut sink, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.state, RenderState::Done);
    assert_eq!(report.audio_blocks, 10);
    assert_eq!(report.video_frames, 10);
    assert_eq!(report.packets_written, 20);
    assert_eq!(report.elapsed, ms(1000));

    assert!(out.muxer.header_written());
    assert!(out.muxer.trailer_written());
    assert!(!out.muxer.aborted());
    assert_eq!(out.muxer.streams()[0].info.index, 0);
    assert_eq!(out.muxer.streams()[1].info.index, 1);

    assert_eq!(seen.first(), Some(&0.0));
    assert_eq!(seen.last(), Some(&100.0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.contains(&50.0));
}

#[test]
fn video_packets_are_rescaled_into_the_stream_time_base() {
    let mut out = Outputs::new();
    session(music_and_cam())
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap();

    let video = out.muxer.video_stream().unwrap();
    assert_eq!(video.info.time_base, Rational::new(1, 90_000));
    let pts: Vec<i64> = video.packets.iter().map(|p| p.pts).collect();
    assert_eq!(pts[..3], [0, 9_000, 18_000]);
    assert!(video.packets.iter().all(|p| p.stream_index == 1 && p.duration == 9_000));

    let audio = out.muxer.audio_stream().unwrap();
    assert_eq!(audio.packets[1].pts, 100);
    assert!(audio.packets.iter().all(|p| p.stream_index == 0));
}

#[test]
fn embedded_sound_is_mixed_once_through_the_synthetic_line() {
    let mut out = Outputs::new();
    session(music_and_cam())
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap();

    let audio = out.muxer.audio_stream().unwrap();
    // music 0.25 plus the camera's 0.5 while the camera clip runs
    assert_eq!(floats(&audio.packets[0])[..2], [0.75, 0.75]);
    // camera clip ends at 500ms
    assert_eq!(floats(&audio.packets[5])[..2], [0.25, 0.25]);
}

#[test]
fn composited_frames_reach_the_encoder_flattened() {
    let mut out = Outputs::new();
    session(music_and_cam())
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap();

    let video = out.muxer.video_stream().unwrap();
    assert_eq!(video.packets[0].data[..4], CAM);
    // past the camera clip only the background remains
    assert_eq!(video.packets[9].data[..4], [0, 0, 0, 255]);
}

#[test]
fn audio_only_projects_skip_the_video_pass() {
    let mut out = Outputs::new();
    let report = session(music(300))
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.state, RenderState::Done);
    assert_eq!(report.video_frames, 0);
    assert!(out.muxer.video_stream().is_none());
    assert_eq!(out.muxer.streams().len(), 1);
}

#[test]
fn passes_stop_at_the_last_clip_end() {
    let mut out = Outputs::new();
    let report = session(music(250))
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.audio_blocks, 3);
    let last = floats(&out.muxer.audio_stream().unwrap().packets[2]);
    // interleaved: sample 49 of the block is the last one inside the clip
    assert_eq!(last[98], 0.25);
    assert_eq!(last[100], 0.0);
    assert_eq!(last[199], 0.0);
}

#[test]
fn buffered_video_packets_are_flushed_in_order() {
    let mut out = Outputs::new();
    out.video = out.video.with_delay(3);
    let report = session(music_and_cam())
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap();

    assert_eq!(report.video_frames, 10);
    let video = out.muxer.video_stream().unwrap();
    assert_eq!(video.packets.len(), 10);
    assert_eq!(video.packets[9].pts, 81_000);
}

#[test]
fn cancelling_before_the_first_block_aborts_with_an_error() {
    let mut out = Outputs::new();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = session(music_and_cam())
        .render(out.output(), &mut NoProgress, &cancel)
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(out.muxer.aborted());
    assert!(!out.muxer.trailer_written());
    assert_eq!(out.muxer.packet_count(), 0);
}

#[test]
fn cancelling_while_the_audio_pass_finishes_returns_quietly() {
    // One block long, so the cancel lands between the end-of-timeline check and the flush.
    let mut out = Outputs::new();
    let cancel = CancellationToken::new();
    let trip = cancel.clone();
    let mut sink = move |p: f64| {
        if p >= 100.0 {
            trip.cancel();
        }
    };
    let report = session(music(100))
        .render(out.output(), &mut sink, &cancel)
        .unwrap();

    assert_eq!(report.state, RenderState::Cancelled);
    assert_eq!(report.audio_blocks, 1);
    assert!(out.muxer.aborted());
    assert!(!out.muxer.trailer_written());
}

#[test]
fn cancelling_mid_video_aborts_with_an_error() {
    let mut out = Outputs::new();
    let cancel = CancellationToken::new();
    let trip = cancel.clone();
    let mut sink = move |p: f64| {
        if p > 50.0 {
            trip.cancel();
        }
    };
    let err = session(music_and_cam())
        .render(out.output(), &mut sink, &cancel)
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(out.muxer.aborted());
    assert!(!out.muxer.trailer_written());
    assert_eq!(out.muxer.video_stream().unwrap().packets.len(), 2);
}

#[test]
fn missing_codec_fails_before_the_header() {
    let mut out = Outputs::new();
    out.muxer = InMemoryMuxer::new().with_probe_error("aac encoder unavailable");
    let err = session(music_and_cam())
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap_err();

    assert!(matches!(err, ClipweaveError::Encode(_)));
    assert!(!out.muxer.header_written());
    assert!(out.muxer.streams().is_empty());
}

#[test]
fn encoder_settings_must_match_the_render() {
    let mut out = Outputs::new();
    out.audio = PcmEncoder::new(SR, 512);
    let err = session(music(100))
        .render(out.output(), &mut NoProgress, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, ClipweaveError::Validation(_)));
    assert!(!out.muxer.header_written());
}

#[test]
fn invalid_configuration_fails_at_construction() {
    let ghost = music(100).with_audio_track(
        TrackLine::new().with_item(AudioTrackItem::new(ClipTiming::new("ghost", ms(0), ms(0), ms(1)))),
    );
    let err = RenderSession::new(ghost, &decoder(), opts(), TransitionRegistry::default())
        .err()
        .unwrap();
    assert!(matches!(err, ClipweaveError::Validation(_)));

    let bad_opts = RenderOpts {
        sample_rate: 0,
        ..opts()
    };
    assert!(RenderSession::new(music(100), &decoder(), bad_opts, TransitionRegistry::default()).is_err());
}

#[test]
fn preview_frames_use_the_same_compositor() {
    let mut s = session(music_and_cam());
    let frame = s.render_frame_at(ms(100)).unwrap();
    assert_eq!(frame.pixel(0, 0), Some(CAM));
    let after = s.render_frame_at(ms(600)).unwrap();
    assert_eq!(after.pixel(0, 0), Some([0, 0, 0, 0]));
}
