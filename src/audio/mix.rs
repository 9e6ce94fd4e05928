use std::collections::HashMap;
use std::time::Duration;

use crate::foundation::core::sample_time;
use crate::foundation::error::ClipweaveResult;
use crate::media::source::{AudioSample, MediaSource};
use crate::timeline::arena::{ClipArena, ClipId};
use crate::timeline::item::Timed;
use crate::timeline::resolve::{ActiveFilter, intersection_rate, resolve_active};

/// Planar stereo block of mixed samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioBlock {
    /// Left channel.
    pub left: Vec<f32>,
    /// Right channel.
    pub right: Vec<f32>,
}

impl AudioBlock {
    /// Zeroed block of `frames` samples per channel.
    pub fn silent(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    /// Samples per channel.
    pub fn frames(&self) -> usize {
        self.left.len()
    }
}

/// Mixes audio lines of clips, at most two per line at any instant.
///
/// Lines are summed without clamping.
pub(crate) struct AudioMixer {
    lines: Vec<Vec<ClipId>>,
    sources: HashMap<ClipId, Box<dyn MediaSource>>,
}

impl AudioMixer {
    pub(crate) fn new(lines: Vec<Vec<ClipId>>, sources: HashMap<ClipId, Box<dyn MediaSource>>) -> Self {
        Self { lines, sources }
    }

    pub(crate) fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of every line's contribution at global time `t`.
    pub(crate) fn sample(&mut self, arena: &ClipArena, t: Duration) -> ClipweaveResult<AudioSample> {
        let mut acc = AudioSample::SILENT;
        for line_idx in 0..self.lines.len() {
            let s = self.sample_line(arena, line_idx, t)?;
            acc.left += s.left;
            acc.right += s.right;
        }
        Ok(acc)
    }

    /// Fill `block` with the samples starting at sample index `first`, zero padded past the
    /// timeline end.
    pub(crate) fn fill_block(
        &mut self,
        arena: &ClipArena,
        first: u64,
        sample_rate: u32,
        block: &mut AudioBlock,
    ) -> ClipweaveResult<()> {
        for i in 0..block.frames() {
            let t = sample_time(first + i as u64, sample_rate);
            let s = self.sample(arena, t)?;
            block.left[i] = s.left;
            block.right[i] = s.right;
        }
        Ok(())
    }

    fn sample_line(&mut self, arena: &ClipArena, line_idx: usize, t: Duration) -> ClipweaveResult<AudioSample> {
        let active = resolve_active(arena, &self.lines[line_idx], t, ActiveFilter::Audible);
        match active.as_slice() {
            [] => Ok(AudioSample::SILENT),
            [id] => self.single(arena, *id, t),
            [a, b, ..] => self.crossfade(arena, *a, *b, t),
        }
    }

    fn single(&mut self, arena: &ClipArena, id: ClipId, t: Duration) -> ClipweaveResult<AudioSample> {
        let Some(item) = arena.audio(id) else {
            return Ok(AudioSample::SILENT);
        };
        let Some(source) = self.sources.get_mut(&id) else {
            return Ok(AudioSample::SILENT);
        };
        let rel = item.timing.relative_time(t);
        let Some(sample) = source.audio_sample(rel)? else {
            return Ok(AudioSample::SILENT);
        };
        let gain = item.gain.sample(rel).value() as f32;
        Ok(sample.scaled(item.timing.volume * gain))
    }

    fn crossfade(&mut self, arena: &ClipArena, a: ClipId, b: ClipId, t: Duration) -> ClipweaveResult<AudioSample> {
        let (ta, tb) = (arena.get(a).timing(), arena.get(b).timing());
        let capable = |id: ClipId| self.sources.get(&id).is_some_and(|s| s.has_audio());
        if !capable(a) || !capable(b) {
            return Ok(AudioSample::SILENT);
        }
        let Some(hit) = intersection_rate(ta, tb, t) else {
            return Ok(AudioSample::SILENT);
        };
        let rate = hit.rate as f32;

        let s1 = self.raw_sample(a, ta.relative_time(t))?;
        let s2 = self.raw_sample(b, tb.relative_time(t))?;
        let w1 = (1.0 - rate) * ta.volume;
        let w2 = rate * tb.volume;
        Ok(AudioSample::new(
            s1.left * w1 + s2.left * w2,
            s1.right * w1 + s2.right * w2,
        ))
    }

    fn raw_sample(&mut self, id: ClipId, rel: Duration) -> ClipweaveResult<AudioSample> {
        match self.sources.get_mut(&id) {
            Some(source) => Ok(source.audio_sample(rel)?.unwrap_or(AudioSample::SILENT)),
            None => Ok(AudioSample::SILENT),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
