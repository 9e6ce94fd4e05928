use std::time::Duration;

use crate::audio::mix::{AudioBlock, AudioMixer};
use crate::encode::codec::{AudioEncoder, AudioFrame, Packet, VideoEncoder, convert_frame};
use crate::encode::mux::{Muxer, StreamInfo, StreamParams};
use crate::foundation::core::{Fps, Rational, sample_time};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::media::source::MediaDecoder;
use crate::render::composite::CompositeMode;
use crate::render::compositor::VideoCompositor;
use crate::render::layout::ScaleMode;
use crate::render::surface::FrameRGBA;
use crate::render::transitions::TransitionRegistry;
use crate::session::cancel::CancellationToken;
use crate::session::prepare::prepare;
use crate::session::progress::{ProgressClock, ProgressSink};
use crate::timeline::arena::ClipArena;
use crate::timeline::project::Project;

/// Output settings for a render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOpts {
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per channel in every audio block handed to the encoder.
    pub audio_frame_size: usize,
    /// Output frame rate.
    pub fps: Fps,
    /// Colour the composited canvas is flattened over before encoding.
    pub bg_rgba: [u8; 4],
    /// How clips are painted onto the canvas.
    pub composite: CompositeMode,
    /// How the scale curve sizes a clip.
    pub scale_mode: ScaleMode,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            audio_frame_size: 1024,
            fps: Fps { num: 30, den: 1 },
            bg_rgba: [0, 0, 0, 255],
            composite: CompositeMode::Replace,
            scale_mode: ScaleMode::Uniform,
        }
    }
}

impl RenderOpts {
    /// Check option ranges.
    pub fn validate(&self) -> ClipweaveResult<()> {
        if self.sample_rate == 0 {
            return Err(ClipweaveError::validation("sample_rate must be > 0"));
        }
        if self.audio_frame_size == 0 {
            return Err(ClipweaveError::validation("audio_frame_size must be > 0"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        Ok(())
    }
}

/// Phases of a render, in order. `Cancelled` may follow any phase before `Finalizing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// Validating, opening sources, starting the container.
    Preparing,
    /// Mixing and encoding the full audio timeline.
    EncodingAudio,
    /// Compositing and encoding the full video timeline.
    EncodingVideo,
    /// Writing the trailer.
    Finalizing,
    /// Output complete.
    Done,
    /// Stopped through the [`CancellationToken`]; the output is unusable.
    Cancelled,
}

/// Outcome of [`RenderSession::render`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderReport {
    /// State the render ended in.
    pub state: RenderState,
    /// Audio blocks submitted to the encoder.
    pub audio_blocks: u64,
    /// Video frames submitted to the encoder.
    pub video_frames: u64,
    /// Packets handed to the muxer.
    pub packets_written: u64,
    /// Timeline time covered by the longer pass.
    pub elapsed: Duration,
}

impl RenderReport {
    fn new() -> Self {
        Self {
            state: RenderState::Preparing,
            audio_blocks: 0,
            video_frames: 0,
            packets_written: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Encoders and container a render writes into.
pub struct RenderOutput<'a> {
    /// Container writer.
    pub muxer: &'a mut dyn Muxer,
    /// Audio encoder; its frame size and sample rate must match [`RenderOpts`].
    pub audio: &'a mut dyn AudioEncoder,
    /// Video encoder; unused when the project has no video clips.
    pub video: &'a mut dyn VideoEncoder,
}

/// A project prepared for rendering: clips resolved to handles, every source opened.
pub struct RenderSession {
    project: Project,
    opts: RenderOpts,
    arena: ClipArena,
    mixer: AudioMixer,
    compositor: VideoCompositor,
}

impl RenderSession {
    /// Validate `project` and `opts` and open one decoder source per clip.
    ///
    /// Configuration errors surface here, before any output exists.
    #[tracing::instrument(skip_all, fields(project = %project.name))]
    pub fn new(
        project: Project,
        decoder: &dyn MediaDecoder,
        opts: RenderOpts,
        transitions: TransitionRegistry,
    ) -> ClipweaveResult<Self> {
        tracing::info!(state = ?RenderState::Preparing, "render state");
        project.validate()?;
        opts.validate()?;

        let prepared = prepare(&project, decoder, &transitions)?;
        let mixer = AudioMixer::new(prepared.audio_lines, prepared.audio_sources);
        let compositor = VideoCompositor::new(
            prepared.video_lines,
            prepared.video_sources,
            transitions,
            project.canvas(),
            opts.composite,
            opts.scale_mode,
        );
        Ok(Self {
            project,
            opts,
            arena: prepared.arena,
            mixer,
            compositor,
        })
    }

    /// The project being rendered.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The options this session was built with.
    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Composite the canvas at global time `t` without encoding anything.
    pub fn render_frame_at(&mut self, t: Duration) -> ClipweaveResult<FrameRGBA> {
        Ok(self.compositor.compose(&self.arena, t)?.clone())
    }

    /// Run the audio pass, then the video pass, then finish the container.
    ///
    /// Any error abandons the output through [`Muxer::abort`]. A cancellation noticed while the
    /// audio pass is finishing is reported as `Ok` with [`RenderState::Cancelled`]; everywhere else
    /// it is [`ClipweaveError::Cancelled`].
    #[tracing::instrument(skip_all, fields(project = %self.project.name))]
    pub fn render(
        &mut self,
        output: RenderOutput<'_>,
        progress: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> ClipweaveResult<RenderReport> {
        let RenderOutput { muxer, audio, video } = output;
        let result = self.run(muxer, audio, video, progress, cancel);
        match &result {
            Ok(report) if report.state == RenderState::Cancelled => {
                tracing::info!(state = ?RenderState::Cancelled, "render state");
            }
            Ok(_) => {}
            Err(e) => {
                muxer.abort();
                if e.is_cancelled() {
                    tracing::info!(state = ?RenderState::Cancelled, "render state");
                }
            }
        }
        result
    }

    fn run(
        &mut self,
        muxer: &mut dyn Muxer,
        audio: &mut dyn AudioEncoder,
        video: &mut dyn VideoEncoder,
        progress: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> ClipweaveResult<RenderReport> {
        let mut report = RenderReport::new();
        let clock = ProgressClock::for_project(&self.project);
        let with_video = self.project.has_video_items();

        let (audio_stream, video_stream) = self.start_output(muxer, audio, video, with_video)?;

        report.state = RenderState::EncodingAudio;
        tracing::info!(state = ?report.state, "render state");
        let audio_elapsed = self.encode_audio(muxer, audio, audio_stream, &clock, progress, cancel, &mut report)?;
        report.elapsed = audio_elapsed;
        if report.state == RenderState::Cancelled {
            return Ok(report);
        }

        if let Some(video_stream) = video_stream {
            report.state = RenderState::EncodingVideo;
            tracing::info!(state = ?report.state, "render state");
            let video_elapsed = self.encode_video(
                muxer,
                video,
                video_stream,
                &clock,
                audio_elapsed,
                progress,
                cancel,
                &mut report,
            )?;
            report.elapsed = report.elapsed.max(video_elapsed);
        }

        report.state = RenderState::Finalizing;
        tracing::info!(state = ?report.state, "render state");
        muxer.write_trailer()?;
        progress.report(100.0);

        report.state = RenderState::Done;
        tracing::info!(
            state = ?report.state,
            audio_blocks = report.audio_blocks,
            video_frames = report.video_frames,
            packets = report.packets_written,
            "render state"
        );
        Ok(report)
    }

    fn start_output(
        &self,
        muxer: &mut dyn Muxer,
        audio: &dyn AudioEncoder,
        video: &dyn VideoEncoder,
        with_video: bool,
    ) -> ClipweaveResult<(StreamInfo, Option<StreamInfo>)> {
        let a = audio.params();
        if a.sample_rate != self.opts.sample_rate || a.frame_size != self.opts.audio_frame_size {
            return Err(ClipweaveError::validation(format!(
                "audio encoder expects {} samples at {} Hz, render is configured for {} at {} Hz",
                a.frame_size, a.sample_rate, self.opts.audio_frame_size, self.opts.sample_rate
            )));
        }
        if with_video {
            let v = video.params();
            if v.width != self.project.width || v.height != self.project.height {
                return Err(ClipweaveError::validation(format!(
                    "video encoder is {}x{}, project is {}x{}",
                    v.width, v.height, self.project.width, self.project.height
                )));
            }
        }

        muxer.probe()?;
        let audio_stream = muxer.add_stream(StreamParams::Audio(a))?;
        let video_stream = if with_video {
            Some(muxer.add_stream(StreamParams::Video(video.params()))?)
        } else {
            None
        };
        muxer.write_header()?;
        Ok((audio_stream, video_stream))
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_audio(
        &mut self,
        muxer: &mut dyn Muxer,
        encoder: &mut dyn AudioEncoder,
        stream: StreamInfo,
        clock: &ProgressClock,
        progress: &mut dyn ProgressSink,
        cancel: &CancellationToken,
        report: &mut RenderReport,
    ) -> ClipweaveResult<Duration> {
        let params = encoder.params();
        let sample_rate = self.opts.sample_rate;
        let mut block = AudioBlock::silent(self.opts.audio_frame_size);
        let mut first: u64 = 0;
        let elapsed = loop {
            if cancel.is_cancelled() {
                return Err(ClipweaveError::Cancelled);
            }
            let t = sample_time(first, sample_rate);
            progress.report(clock.percent(t, Duration::ZERO));
            if !self.project.has_more_at(t) {
                break t;
            }

            self.mixer.fill_block(&self.arena, first, sample_rate, &mut block)?;
            let frame = AudioFrame {
                pts: first as i64,
                left: block.left.clone(),
                right: block.right.clone(),
            };
            let packets = encoder.encode(Some(&frame))?;
            write_packets(muxer, packets, params.time_base, stream, report)?;
            report.audio_blocks += 1;
            first += block.frames() as u64;
        };

        if cancel.is_cancelled() {
            muxer.abort();
            report.state = RenderState::Cancelled;
            return Ok(elapsed);
        }
        let packets = encoder.encode(None)?;
        write_packets(muxer, packets, params.time_base, stream, report)?;
        tracing::debug!(blocks = report.audio_blocks, "audio pass finished");
        Ok(elapsed)
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_video(
        &mut self,
        muxer: &mut dyn Muxer,
        encoder: &mut dyn VideoEncoder,
        stream: StreamInfo,
        clock: &ProgressClock,
        audio_elapsed: Duration,
        progress: &mut dyn ProgressSink,
        cancel: &CancellationToken,
        report: &mut RenderReport,
    ) -> ClipweaveResult<Duration> {
        let params = encoder.params();
        let mut index: u64 = 0;
        let elapsed = loop {
            if cancel.is_cancelled() {
                return Err(ClipweaveError::Cancelled);
            }
            let t = self.opts.fps.frame_time(index);
            progress.report(clock.percent(audio_elapsed, t));
            if !self.project.has_more_at(t) {
                break t;
            }

            let canvas = self.compositor.compose(&self.arena, t)?;
            let frame = convert_frame(canvas, index as i64, params.layout, self.opts.bg_rgba);
            let packets = encoder.encode(Some(&frame))?;
            write_packets(muxer, packets, params.time_base, stream, report)?;
            report.video_frames += 1;
            index += 1;
        };

        if cancel.is_cancelled() {
            return Err(ClipweaveError::Cancelled);
        }
        let packets = encoder.encode(None)?;
        write_packets(muxer, packets, params.time_base, stream, report)?;
        tracing::debug!(frames = report.video_frames, "video pass finished");
        Ok(elapsed)
    }
}

fn write_packets(
    muxer: &mut dyn Muxer,
    packets: Vec<Packet>,
    from: Rational,
    stream: StreamInfo,
    report: &mut RenderReport,
) -> ClipweaveResult<()> {
    for mut packet in packets {
        packet.rescale(from, stream.time_base);
        packet.stream_index = stream.index;
        muxer.write_packet(packet)?;
        report.packets_written += 1;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/renderer.rs"]
mod tests;
