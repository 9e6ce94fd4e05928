use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;

use crate::encode::codec::{AudioParams, Packet, PixelLayout, VideoParams};
use crate::encode::mux::{Muxer, StreamInfo, StreamParams};
use crate::foundation::core::Rational;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::foundation::scratch::{TempFileGuard, temp_path};

/// Options for [`FfmpegMuxer`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegMuxerOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
}

impl FfmpegMuxerOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

struct AudioSpool {
    params: AudioParams,
    index: usize,
    guard: TempFileGuard,
    writer: Option<BufWriter<File>>,
}

/// Muxer that spools the audio pass to a temporary `f32le` file and pipes the video pass into
/// the system `ffmpeg`, producing H.264 + AAC in MP4.
///
/// `ffmpeg` is spawned lazily at the first video packet, once the audio pass is complete, or at
/// the trailer for audio-only output.
pub struct FfmpegMuxer {
    opts: FfmpegMuxerOpts,
    audio: Option<AudioSpool>,
    video: Option<(usize, VideoParams)>,
    header_written: bool,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
}

impl FfmpegMuxer {
    /// Create a muxer writing to `opts.out_path`.
    pub fn new(opts: FfmpegMuxerOpts) -> Self {
        Self {
            opts,
            audio: None,
            video: None,
            header_written: false,
            child: None,
            stdin: None,
            stderr_drain: None,
        }
    }

    fn spawn(&mut self) -> ClipweaveResult<()> {
        if let Some(spool) = self.audio.as_mut()
            && let Some(mut w) = spool.writer.take()
        {
            w.flush().context("flush audio spool")?;
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });
        cmd.args(["-loglevel", "error"]);

        if let Some((_, v)) = self.video {
            cmd.args([
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", v.width, v.height),
            ]);
            push_input_fps(&mut cmd, v.fps.num, v.fps.den);
            cmd.args(["-i", "pipe:0"]);
        }
        if let Some(spool) = self.audio.as_ref()
            && let Some(path) = spool.guard.path()
        {
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &spool.params.sample_rate.to_string(),
                "-ac",
                "2",
                "-i",
            ])
            .arg(path);
        }

        if self.video.is_some() {
            cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p"]);
        } else {
            cmd.arg("-vn");
        }
        if self.audio.is_some() {
            cmd.args(["-c:a", "aac"]);
        } else {
            cmd.arg("-an");
        }
        cmd.args(["-movflags", "+faststart"]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            ClipweaveError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClipweaveError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ClipweaveError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = self.video.is_some().then_some(stdin);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }
}

impl Muxer for FfmpegMuxer {
    fn probe(&self) -> ClipweaveResult<()> {
        if !is_ffmpeg_on_path() {
            return Err(ClipweaveError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }
        let out = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .output()
            .map_err(|e| ClipweaveError::encode(format!("failed to list ffmpeg encoders: {e}")))?;
        let listing = String::from_utf8_lossy(&out.stdout);
        for codec in ["libx264", "aac"] {
            if !has_encoder(&listing, codec) {
                return Err(ClipweaveError::encode(format!(
                    "ffmpeg lacks the required '{codec}' encoder"
                )));
            }
        }
        Ok(())
    }

    fn add_stream(&mut self, params: StreamParams) -> ClipweaveResult<StreamInfo> {
        if self.header_written {
            return Err(ClipweaveError::encode("cannot add a stream after the header"));
        }
        let index = usize::from(self.audio.is_some()) + usize::from(self.video.is_some());
        match params {
            StreamParams::Audio(a) => {
                if self.audio.is_some() {
                    return Err(ClipweaveError::encode("ffmpeg muxer supports one audio stream"));
                }
                if a.sample_rate == 0 {
                    return Err(ClipweaveError::validation("audio sample_rate must be non-zero"));
                }
                self.audio = Some(AudioSpool {
                    params: a,
                    index,
                    guard: TempFileGuard::default(),
                    writer: None,
                });
                Ok(StreamInfo {
                    index,
                    time_base: Rational::new(1, i64::from(a.sample_rate)),
                })
            }
            StreamParams::Video(v) => {
                if self.video.is_some() {
                    return Err(ClipweaveError::encode("ffmpeg muxer supports one video stream"));
                }
                if v.layout != PixelLayout::Rgba8 {
                    return Err(ClipweaveError::encode("ffmpeg muxer expects rgba video packets"));
                }
                if v.width == 0 || v.height == 0 {
                    return Err(ClipweaveError::validation(
                        "ffmpeg muxer width/height must be non-zero",
                    ));
                }
                if !v.width.is_multiple_of(2) || !v.height.is_multiple_of(2) {
                    return Err(ClipweaveError::validation(
                        "ffmpeg muxer width/height must be even (required for yuv420p mp4 output)",
                    ));
                }
                self.video = Some((index, v));
                Ok(StreamInfo {
                    index,
                    time_base: v.time_base,
                })
            }
        }
    }

    fn write_header(&mut self) -> ClipweaveResult<()> {
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ClipweaveError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if let Some(spool) = self.audio.as_mut() {
            let path = temp_path("audio_spool", "f32le");
            let f = File::create(&path)
                .with_context(|| format!("create audio spool '{}'", path.display()))?;
            spool.guard = TempFileGuard::new(path);
            spool.writer = Some(BufWriter::new(f));
        }
        self.header_written = true;
        Ok(())
    }

    fn write_packet(&mut self, packet: Packet) -> ClipweaveResult<()> {
        if !self.header_written {
            return Err(ClipweaveError::encode("ffmpeg muxer header not written"));
        }
        if let Some(spool) = self.audio.as_mut()
            && spool.index == packet.stream_index
        {
            let w = spool
                .writer
                .as_mut()
                .ok_or_else(|| ClipweaveError::encode("audio packet after the audio pass"))?;
            w.write_all(&packet.data).context("write audio spool")?;
            return Ok(());
        }
        match self.video {
            Some((index, _)) if index == packet.stream_index => {}
            _ => {
                return Err(ClipweaveError::encode(format!(
                    "unknown stream index {}",
                    packet.stream_index
                )));
            }
        }
        if self.child.is_none() {
            self.spawn()?;
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ClipweaveError::encode("ffmpeg muxer is already finalized"));
        };
        stdin.write_all(&packet.data).map_err(|e| {
            ClipweaveError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn write_trailer(&mut self) -> ClipweaveResult<()> {
        if self.child.is_none() {
            self.spawn()?;
        }
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ClipweaveError::encode("ffmpeg muxer not started"))?;

        let status = child.wait().map_err(|e| {
            ClipweaveError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ClipweaveError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ClipweaveError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ClipweaveError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        self.audio = None;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
        self.audio = None;
        if self.header_written {
            let _ = std::fs::remove_file(&self.opts.out_path);
        }
    }
}

fn has_encoder(listing: &str, codec: &str) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(codec))
}

fn push_input_fps(cmd: &mut Command, num: u32, den: u32) {
    // For rawvideo input, use `-r` before `-i` to specify the input framerate.
    cmd.args(["-r", &format!("{num}/{den}")]);
}

/// Ensure the parent directory of `path` exists.
pub(crate) fn ensure_parent_dir(path: &Path) -> ClipweaveResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
