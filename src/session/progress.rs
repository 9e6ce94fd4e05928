use std::time::Duration;

use crate::foundation::math::round2;
use crate::timeline::project::Project;

/// Receives render progress as a percentage in `[0, 100]`, rounded to two decimals.
pub trait ProgressSink {
    /// Called at least once per audio block, once per video frame, and with `100.0` on completion.
    fn report(&mut self, percent: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// Sink that discards every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: f64) {}
}

/// Converts elapsed pass time into a progress percentage.
///
/// The estimate is `max(video, audio)` duration, counted twice when the project has video because
/// the audio and video passes both advance against it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ProgressClock {
    total: f64,
}

impl ProgressClock {
    pub(crate) fn for_project(project: &Project) -> Self {
        let longest = project.video_duration().max(project.audio_duration());
        let passes = if project.has_video_items() { 2.0 } else { 1.0 };
        Self {
            total: longest.as_secs_f64() * passes,
        }
    }

    pub(crate) fn total(&self) -> f64 {
        self.total
    }

    pub(crate) fn percent(&self, audio_elapsed: Duration, video_elapsed: Duration) -> f64 {
        if self.total <= 0.0 {
            return 100.0;
        }
        let elapsed = audio_elapsed.as_secs_f64() + video_elapsed.as_secs_f64();
        round2((elapsed / self.total * 100.0).clamp(0.0, 100.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
