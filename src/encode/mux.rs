use crate::encode::codec::{AudioParams, Packet, VideoParams};
use crate::foundation::core::Rational;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};

/// Parameters of a stream registered with a [`Muxer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamParams {
    /// Audio stream fed by an [`AudioEncoder`](crate::AudioEncoder).
    Audio(AudioParams),
    /// Video stream fed by a [`VideoEncoder`](crate::VideoEncoder).
    Video(VideoParams),
}

/// Stream handle returned by [`Muxer::add_stream`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamInfo {
    /// Index to tag packets with.
    pub index: usize,
    /// Time base packets must be rescaled into.
    pub time_base: Rational,
}

/// Container writer shared by the audio and video passes.
///
/// Ordering contract: per stream, packets arrive with strictly increasing `pts`.
pub trait Muxer {
    /// Check that the required codecs and tools are available. Called before any output is
    /// written.
    fn probe(&self) -> ClipweaveResult<()>;
    /// Register a stream.
    fn add_stream(&mut self, params: StreamParams) -> ClipweaveResult<StreamInfo>;
    /// Start the container after all streams are registered.
    fn write_header(&mut self) -> ClipweaveResult<()>;
    /// Write one packet already rescaled to its stream time base.
    fn write_packet(&mut self, packet: Packet) -> ClipweaveResult<()>;
    /// Finish the container.
    fn write_trailer(&mut self) -> ClipweaveResult<()>;
    /// Release the in-progress output without finishing it.
    fn abort(&mut self);
}

/// A stream captured by [`InMemoryMuxer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedStream {
    /// Registration parameters.
    pub params: StreamParams,
    /// Assigned handle.
    pub info: StreamInfo,
    /// Packets in write order.
    pub packets: Vec<Packet>,
}

/// In-memory muxer for tests and debugging.
#[derive(Clone, Debug)]
pub struct InMemoryMuxer {
    video_time_base: Rational,
    probe_error: Option<String>,
    streams: Vec<RecordedStream>,
    header_written: bool,
    trailer_written: bool,
    aborted: bool,
}

impl Default for InMemoryMuxer {
    fn default() -> Self {
        Self {
            video_time_base: Rational::new(1, 90_000),
            probe_error: None,
            streams: Vec::new(),
            header_written: false,
            trailer_written: false,
            aborted: false,
        }
    }
}

impl InMemoryMuxer {
    /// Muxer with a `1/90000` video stream time base and `1/sample_rate` audio time base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder overriding the video stream time base.
    pub fn with_video_time_base(mut self, time_base: Rational) -> Self {
        self.video_time_base = time_base;
        self
    }

    /// Builder making [`Muxer::probe`] fail with `msg`.
    pub fn with_probe_error(mut self, msg: impl Into<String>) -> Self {
        self.probe_error = Some(msg.into());
        self
    }

    /// Captured streams in registration order.
    pub fn streams(&self) -> &[RecordedStream] {
        &self.streams
    }

    /// First audio stream.
    pub fn audio_stream(&self) -> Option<&RecordedStream> {
        self.streams
            .iter()
            .find(|s| matches!(s.params, StreamParams::Audio(_)))
    }

    /// First video stream.
    pub fn video_stream(&self) -> Option<&RecordedStream> {
        self.streams
            .iter()
            .find(|s| matches!(s.params, StreamParams::Video(_)))
    }

    /// Total packets written across streams.
    pub fn packet_count(&self) -> usize {
        self.streams.iter().map(|s| s.packets.len()).sum()
    }

    /// Whether the header was written.
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Whether the trailer was written.
    pub fn trailer_written(&self) -> bool {
        self.trailer_written
    }

    /// Whether the output was aborted.
    pub fn aborted(&self) -> bool {
        self.aborted
    }
}

impl Muxer for InMemoryMuxer {
    fn probe(&self) -> ClipweaveResult<()> {
        match &self.probe_error {
            Some(msg) => Err(ClipweaveError::encode(msg.clone())),
            None => Ok(()),
        }
    }

    fn add_stream(&mut self, params: StreamParams) -> ClipweaveResult<StreamInfo> {
        if self.header_written {
            return Err(ClipweaveError::encode("cannot add a stream after the header"));
        }
        let time_base = match params {
            StreamParams::Audio(a) => Rational::new(1, i64::from(a.sample_rate)),
            StreamParams::Video(_) => self.video_time_base,
        };
        let info = StreamInfo {
            index: self.streams.len(),
            time_base,
        };
        self.streams.push(RecordedStream {
            params,
            info,
            packets: Vec::new(),
        });
        Ok(info)
    }

    fn write_header(&mut self) -> ClipweaveResult<()> {
        if self.header_written {
            return Err(ClipweaveError::encode("header already written"));
        }
        self.header_written = true;
        Ok(())
    }

    fn write_packet(&mut self, packet: Packet) -> ClipweaveResult<()> {
        if !self.header_written || self.trailer_written || self.aborted {
            return Err(ClipweaveError::encode("muxer is not accepting packets"));
        }
        let stream = self
            .streams
            .get_mut(packet.stream_index)
            .ok_or_else(|| {
                ClipweaveError::encode(format!("unknown stream index {}", packet.stream_index))
            })?;
        if let Some(last) = stream.packets.last()
            && packet.pts <= last.pts
        {
            return Err(ClipweaveError::encode(format!(
                "stream {} received pts {} after {}",
                packet.stream_index, packet.pts, last.pts
            )));
        }
        stream.packets.push(packet);
        Ok(())
    }

    fn write_trailer(&mut self) -> ClipweaveResult<()> {
        if !self.header_written || self.aborted {
            return Err(ClipweaveError::encode("cannot finish an unstarted or aborted output"));
        }
        self.trailer_written = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mux.rs"]
mod tests;
