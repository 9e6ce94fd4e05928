use std::collections::HashSet;
use std::time::Duration;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::timeline::item::{AudioTrackItem, Timed, VideoTrackItem};
use crate::timeline::resource::Resource;

/// Ordered sequence of clips of one media kind.
///
/// For video lines, item order is also the order in which overlapping pairs are resolved.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TrackLine<T> {
    /// Clips in insertion order.
    pub items: Vec<T>,
}

impl<T> Default for TrackLine<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> TrackLine<T> {
    /// Empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder appending `item`.
    pub fn with_item(mut self, item: T) -> Self {
        self.items.push(item);
        self
    }

    /// Append `item` at the end of the line.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Number of clips on the line.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` when the line has no clips.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Timed> TrackLine<T> {
    /// Latest absolute end time of any clip on the line.
    pub fn end_time(&self) -> Duration {
        self.items
            .iter()
            .map(|i| i.timing().absolute_end_time())
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Return `true` if any clip on the line ends after `t`.
    pub fn has_more_at(&self, t: Duration) -> bool {
        self.items
            .iter()
            .any(|i| i.timing().absolute_end_time() > t)
    }
}

impl<T> FromIterator<T> for TrackLine<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// A declarative timeline: output size, resources and track lines.
///
/// Built once by the caller and read-only while rendering.
#[derive(Clone, Debug)]
pub struct Project {
    /// Human-readable name, used in logs.
    pub name: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Sources referenced by clips through their id.
    pub resources: Vec<Resource>,
    /// Authored audio lines, summed by the mixer.
    pub audio_tracks: Vec<TrackLine<AudioTrackItem>>,
    /// Video lines; the first declared line paints on top.
    pub video_tracks: Vec<TrackLine<VideoTrackItem>>,
}

impl Project {
    /// Empty project of the given output size.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            resources: Vec::new(),
            audio_tracks: Vec::new(),
            video_tracks: Vec::new(),
        }
    }

    /// Builder registering a resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Builder appending an audio line.
    pub fn with_audio_track(mut self, line: TrackLine<AudioTrackItem>) -> Self {
        self.audio_tracks.push(line);
        self
    }

    /// Builder appending a video line.
    pub fn with_video_track(mut self, line: TrackLine<VideoTrackItem>) -> Self {
        self.video_tracks.push(line);
        self
    }

    /// Output dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Look up a resource by id.
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Check output size, resource references and clip ranges.
    pub fn validate(&self) -> ClipweaveResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ClipweaveError::validation(format!(
                "project '{}' output size must be > 0, got {}x{}",
                self.name, self.width, self.height
            )));
        }

        let mut ids = HashSet::with_capacity(self.resources.len());
        for r in &self.resources {
            if r.id.is_empty() {
                return Err(ClipweaveError::validation("resource id must be non-empty"));
            }
            if !ids.insert(r.id.as_str()) {
                return Err(ClipweaveError::validation(format!(
                    "duplicate resource id '{}'",
                    r.id
                )));
            }
        }

        let audio = self.audio_tracks.iter().flat_map(|l| &l.items).map(|i| &i.timing);
        let video = self.video_tracks.iter().flat_map(|l| &l.items).map(|i| &i.timing);
        for timing in audio.chain(video) {
            if !ids.contains(timing.resource_id.as_str()) {
                return Err(ClipweaveError::validation(format!(
                    "clip references unknown resource '{}'",
                    timing.resource_id
                )));
            }
            timing.validate()?;
        }
        Ok(())
    }

    /// Latest clip end over every line, audio and video.
    pub fn audio_duration(&self) -> Duration {
        let audio = self.audio_tracks.iter().map(TrackLine::end_time);
        audio.chain(std::iter::once(self.video_duration())).max().unwrap_or(Duration::ZERO)
    }

    /// Latest clip end over video lines.
    pub fn video_duration(&self) -> Duration {
        self.video_tracks
            .iter()
            .map(TrackLine::end_time)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Return `true` if at least one video clip exists.
    pub fn has_video_items(&self) -> bool {
        self.video_tracks.iter().any(|l| !l.is_empty())
    }

    /// Global liveness check: some clip on any line ends after `t`.
    pub fn has_more_at(&self, t: Duration) -> bool {
        self.audio_tracks.iter().any(|l| l.has_more_at(t))
            || self.video_tracks.iter().any(|l| l.has_more_at(t))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/project.rs"]
mod tests;
