use std::time::Duration;

use smallvec::SmallVec;

use crate::timeline::arena::{ClipArena, ClipId};
use crate::timeline::item::{ClipTiming, Timed};

/// Clips active at one instant on one line. Only the first two matches are kept.
pub type ActiveClips = SmallVec<[ClipId; 2]>;

/// Which clips count as active on a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveFilter {
    /// Every clip whose range covers the instant.
    Visible,
    /// Only clips with a non-zero volume.
    Audible,
}

/// Collect at most two clips of `line` whose range covers `t`, in line order.
///
/// Further simultaneous clips are ignored.
pub fn resolve_active(arena: &ClipArena, line: &[ClipId], t: Duration, filter: ActiveFilter) -> ActiveClips {
    let mut out = ActiveClips::new();
    for &id in line {
        let timing = arena.get(id).timing();
        if !timing.is_time_in_range(t) {
            continue;
        }
        if filter == ActiveFilter::Audible && timing.volume == 0.0 {
            continue;
        }
        out.push(id);
        if out.len() == 2 {
            break;
        }
    }
    out
}

/// Overlap window between an outgoing and an incoming clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// Length of the overlap, `a.absolute_end_time - b.offset`.
    pub duration: Duration,
    /// Progress through the overlap in `[0, 1]`.
    pub rate: f64,
}

/// Overlap of `b` starting before `a` ends, sampled at `t`.
///
/// Returns `None` when `b` does not start inside `a`.
pub fn intersection_rate(a: &ClipTiming, b: &ClipTiming, t: Duration) -> Option<Intersection> {
    let a_end = a.absolute_end_time();
    if b.offset >= a_end {
        return None;
    }
    let duration = a_end - b.offset;
    let elapsed = t.saturating_sub(b.offset);
    let rate = (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
    Some(Intersection { duration, rate })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolve.rs"]
mod tests;
