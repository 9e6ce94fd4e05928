use std::collections::HashMap;
use std::time::Duration;

use crate::foundation::core::Canvas;
use crate::foundation::error::ClipweaveResult;
use crate::media::source::MediaSource;
use crate::render::composite::{CompositeMode, draw_frame, over_frame};
use crate::render::layout::{DestRect, ScaleMode, layout_rect, transform_rect};
use crate::render::surface::FrameRGBA;
use crate::render::transitions::{TransitionInput, TransitionRegistry};
use crate::timeline::arena::{ClipArena, ClipId};
use crate::timeline::item::VideoTrackItem;
use crate::timeline::resolve::{ActiveFilter, intersection_rate, resolve_active};

/// A clip resolved for one frame: its picture, where it goes and how opaque it is.
struct Placed {
    frame: FrameRGBA,
    rect: DestRect,
    opacity: f64,
}

/// Composites video lines into one canvas per frame.
///
/// Lines are painted last-declared first, so the first declared line ends up on top.
pub(crate) struct VideoCompositor {
    lines: Vec<Vec<ClipId>>,
    sources: HashMap<ClipId, Box<dyn MediaSource>>,
    transitions: TransitionRegistry,
    canvas: Canvas,
    mode: CompositeMode,
    scale_mode: ScaleMode,
    frame: FrameRGBA,
    scratch: FrameRGBA,
}

impl VideoCompositor {
    pub(crate) fn new(
        lines: Vec<Vec<ClipId>>,
        sources: HashMap<ClipId, Box<dyn MediaSource>>,
        transitions: TransitionRegistry,
        canvas: Canvas,
        mode: CompositeMode,
        scale_mode: ScaleMode,
    ) -> Self {
        Self {
            lines,
            sources,
            transitions,
            canvas,
            mode,
            scale_mode,
            frame: FrameRGBA::transparent(canvas.width, canvas.height),
            scratch: FrameRGBA::transparent(canvas.width, canvas.height),
        }
    }

    /// Composite the canvas at global time `t`.
    pub(crate) fn compose(&mut self, arena: &ClipArena, t: Duration) -> ClipweaveResult<&FrameRGBA> {
        self.frame.clear();
        for line_idx in (0..self.lines.len()).rev() {
            let active = resolve_active(arena, &self.lines[line_idx], t, ActiveFilter::Visible);
            match active.as_slice() {
                [] => {}
                [id] => self.draw_single(arena, *id, t)?,
                [a, b, ..] => self.draw_pair(arena, *a, *b, t)?,
            }
        }
        Ok(&self.frame)
    }

    fn draw_single(&mut self, arena: &ClipArena, id: ClipId, t: Duration) -> ClipweaveResult<()> {
        let Some(item) = arena.video(id) else {
            return Ok(());
        };
        if let Some(p) = self.place(id, item, t)? {
            draw_frame(&mut self.frame, &p.frame, p.rect, p.opacity, self.mode);
        }
        Ok(())
    }

    fn draw_pair(&mut self, arena: &ClipArena, a: ClipId, b: ClipId, t: Duration) -> ClipweaveResult<()> {
        let (Some(item_a), Some(item_b)) = (arena.video(a), arena.video(b)) else {
            return Ok(());
        };
        let capable = |id: ClipId| self.sources.get(&id).is_some_and(|s| s.has_video());
        if !capable(a) || !capable(b) {
            return Ok(());
        }
        let Some(hit) = intersection_rate(&item_a.timing, &item_b.timing, t) else {
            return Ok(());
        };

        let (Some(pa), Some(pb)) = (self.place(a, item_a, t)?, self.place(b, item_b, t)?) else {
            return Ok(());
        };

        let transition = item_a
            .timing
            .transition
            .and_then(|kind| self.transitions.get(kind));
        match transition {
            Some(transition) => {
                self.scratch.clear();
                let input = TransitionInput {
                    size: self.canvas.size(),
                    frame_a: &pa.frame,
                    rect_a: pa.rect,
                    opacity_a: pa.opacity,
                    frame_b: &pb.frame,
                    rect_b: pb.rect,
                    opacity_b: pb.opacity,
                    duration: hit.duration,
                    rate: hit.rate,
                };
                transition.render(&mut self.scratch, &input)?;
                over_frame(&mut self.frame, &self.scratch);
            }
            None => {
                draw_frame(&mut self.frame, &pa.frame, pa.rect, pa.opacity, self.mode);
                draw_frame(&mut self.frame, &pb.frame, pb.rect, pb.opacity, self.mode);
            }
        }
        Ok(())
    }

    fn place(&mut self, id: ClipId, item: &VideoTrackItem, t: Duration) -> ClipweaveResult<Option<Placed>> {
        let Some(source) = self.sources.get_mut(&id) else {
            return Ok(None);
        };
        let rel = item.timing.relative_time(t);
        let Some(frame) = source.video_frame(rel)? else {
            return Ok(None);
        };
        let opacity = item.opacity.sample(rel).value();
        let translate = item.translate.sample(rel);
        let scale = item.scale.sample(rel);
        let rect = transform_rect(
            layout_rect(item.placement, self.canvas),
            translate,
            scale,
            self.scale_mode,
        );
        Ok(Some(Placed {
            frame,
            rect,
            opacity,
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
