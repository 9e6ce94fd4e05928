use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::foundation::core::Fps;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::foundation::scratch::{TempFileGuard, temp_path};
use crate::media::memory::PcmSource;
use crate::media::source::{AudioSample, MediaDecoder, MediaSource};
use crate::render::surface::FrameRGBA;
use crate::timeline::resource::Resource;

const DEFAULT_BATCH: u32 = 30;

/// Stream layout reported by `ffprobe`.
#[derive(Clone, Debug)]
pub struct ProbeInfo {
    /// Picture stream, if any.
    pub video: Option<VideoStreamInfo>,
    /// Whether an audio stream exists.
    pub has_audio: bool,
    /// Container duration in seconds.
    pub duration_sec: f64,
}

/// Picture stream geometry and rate.
#[derive(Clone, Copy, Debug)]
pub struct VideoStreamInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Native frame rate.
    pub fps: Fps,
}

/// Decoder shelling out to the system `ffprobe`/`ffmpeg`.
#[derive(Clone, Copy, Debug)]
pub struct FfmpegDecoder {
    sample_rate: u32,
    batch: u32,
}

impl FfmpegDecoder {
    /// Decoder producing PCM at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            batch: DEFAULT_BATCH,
        }
    }

    /// Number of frames decoded per `ffmpeg` invocation.
    pub fn with_batch(mut self, batch: u32) -> Self {
        self.batch = batch.max(1);
        self
    }

    fn locate(resource: &Resource) -> ClipweaveResult<LocalFile> {
        if let Some(path) = resource.path() {
            return Ok(LocalFile {
                path: path.to_path_buf(),
                _guard: None,
            });
        }
        let path = temp_path(&format!("src_{}", sanitize(&resource.id)), "bin");
        let guard = TempFileGuard::new(path.clone());
        let mut bytes = Vec::new();
        resource
            .open()?
            .read_to_end(&mut bytes)
            .with_context(|| format!("read resource '{}'", resource.id))?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("spool resource '{}' to '{}'", resource.id, path.display()))?;
        Ok(LocalFile {
            path,
            _guard: Some(guard),
        })
    }
}

struct LocalFile {
    path: PathBuf,
    _guard: Option<TempFileGuard>,
}

fn sanitize(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl MediaDecoder for FfmpegDecoder {
    fn open(&self, resource: &Resource) -> ClipweaveResult<Box<dyn MediaSource>> {
        let file = Arc::new(Self::locate(resource)?);
        let info = probe(&file.path)?;
        Ok(Box::new(FfmpegSource::new(file, info, self.sample_rate, self.batch)))
    }

    fn demux_audio(&self, resource: &Resource) -> ClipweaveResult<Option<Box<dyn MediaSource>>> {
        let file = Arc::new(Self::locate(resource)?);
        let mut info = probe(&file.path)?;
        if !info.has_audio {
            return Ok(None);
        }
        info.video = None;
        Ok(Some(Box::new(FfmpegSource::new(
            file,
            info,
            self.sample_rate,
            self.batch,
        ))))
    }
}

struct FfmpegSource {
    file: Arc<LocalFile>,
    info: ProbeInfo,
    sample_rate: u32,
    batch: u32,
    pcm: Option<PcmSource>,
    frames: Vec<Arc<FrameRGBA>>,
    first_frame: u64,
}

impl FfmpegSource {
    fn new(file: Arc<LocalFile>, info: ProbeInfo, sample_rate: u32, batch: u32) -> Self {
        Self {
            file,
            info,
            sample_rate,
            batch,
            pcm: None,
            frames: Vec::new(),
            first_frame: 0,
        }
    }
}

impl MediaSource for FfmpegSource {
    fn has_audio(&self) -> bool {
        self.info.has_audio
    }

    fn has_video(&self) -> bool {
        self.info.video.is_some()
    }

    fn audio_sample(&mut self, t: Duration) -> ClipweaveResult<Option<AudioSample>> {
        if !self.info.has_audio {
            return Ok(None);
        }
        if self.pcm.is_none() {
            let data = decode_audio_f32_stereo(&self.file.path, self.sample_rate)?;
            self.pcm = Some(PcmSource::new(self.sample_rate, data)?);
        }
        match self.pcm.as_mut() {
            Some(pcm) => pcm.audio_sample(t),
            None => Ok(None),
        }
    }

    fn video_frame(&mut self, t: Duration) -> ClipweaveResult<Option<FrameRGBA>> {
        let Some(video) = self.info.video else {
            return Ok(None);
        };
        if t.as_secs_f64() >= self.info.duration_sec && self.info.duration_sec > 0.0 {
            return Ok(None);
        }
        let index = frame_index(t, video.fps);
        let cached = index >= self.first_frame
            && index < self.first_frame + self.frames.len() as u64;
        if !cached {
            let start = video.fps.frame_time(index).as_secs_f64();
            let batch = decode_video_frames_rgba8(&self.file.path, video, start, self.batch)?;
            self.frames = batch.into_iter().map(Arc::new).collect();
            self.first_frame = index;
        }
        let offset = (index - self.first_frame) as usize;
        Ok(self.frames.get(offset).map(|f| FrameRGBA::clone(f)))
    }
}

fn frame_index(t: Duration, fps: Fps) -> u64 {
    (t.as_nanos() * u128::from(fps.num) / (u128::from(fps.den) * 1_000_000_000)) as u64
}

/// Inspect a media file with `ffprobe`.
pub fn probe(source_path: &Path) -> ClipweaveResult<ProbeInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ClipweaveError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ClipweaveError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| ClipweaveError::media(format!("ffprobe json parse failed: {e}")))?;

    let video = match parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    {
        None => None,
        Some(s) => {
            let width = s
                .width
                .ok_or_else(|| ClipweaveError::media("missing video width from ffprobe"))?;
            let height = s
                .height
                .ok_or_else(|| ClipweaveError::media("missing video height from ffprobe"))?;
            let (num, den) = parse_ff_ratio(s.r_frame_rate.as_deref().unwrap_or("0/1"))
                .ok_or_else(|| ClipweaveError::media("invalid video r_frame_rate"))?;
            Some(VideoStreamInfo {
                width,
                height,
                fps: Fps::new(num, den)?,
            })
        }
    };
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(ProbeInfo {
        video,
        has_audio,
        duration_sec,
    })
}

fn decode_video_frames_rgba8(
    path: &Path,
    video: VideoStreamInfo,
    start_time_sec: f64,
    frame_count: u32,
) -> ClipweaveResult<Vec<FrameRGBA>> {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{start_time_sec:.9}")])
        .arg("-i")
        .arg(path)
        .args([
            "-frames:v",
            &frame_count.to_string(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| ClipweaveError::media(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(ClipweaveError::media(format!(
            "ffmpeg video decode batch failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = video.width as usize * video.height as usize * 4;
    if expected_len == 0 {
        return Err(ClipweaveError::media(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if !out.stdout.len().is_multiple_of(expected_len) {
        return Err(ClipweaveError::media(format!(
            "decoded video batch has invalid size: got {} bytes, expected multiples of {expected_len}",
            out.stdout.len()
        )));
    }

    out.stdout
        .chunks_exact(expected_len)
        .take(frame_count as usize)
        .map(|px| {
            let mut f = FrameRGBA::from_straight_rgba8(video.width, video.height, px.to_vec())?;
            f.premultiply();
            Ok(f)
        })
        .collect()
}

fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ClipweaveResult<Vec<f32>> {
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ClipweaveError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ClipweaveError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    f32le_to_samples(&out.stdout)
}

fn f32le_to_samples(bytes: &[u8]) -> ClipweaveResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(8) {
        return Err(ClipweaveError::media(
            "decoded audio byte length is not aligned to stereo f32 frames",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if a == 0 || b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
