use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::foundation::core::{Size, Vec2};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::render::composite::{CompositeMode, crossfade, draw_frame, smoothstep};
use crate::render::layout::DestRect;
use crate::render::surface::FrameRGBA;
use crate::timeline::item::TransitionKind;

/// Everything a transition needs to blend an outgoing clip into an incoming one.
#[derive(Clone, Copy, Debug)]
pub struct TransitionInput<'a> {
    /// Canvas size the target surface is allocated with.
    pub size: Size,
    /// Outgoing clip frame.
    pub frame_a: &'a FrameRGBA,
    /// Outgoing clip destination.
    pub rect_a: DestRect,
    /// Outgoing clip opacity.
    pub opacity_a: f64,
    /// Incoming clip frame.
    pub frame_b: &'a FrameRGBA,
    /// Incoming clip destination.
    pub rect_b: DestRect,
    /// Incoming clip opacity.
    pub opacity_b: f64,
    /// Length of the overlap window.
    pub duration: Duration,
    /// Progress through the overlap in `[0, 1]`.
    pub rate: f64,
}

/// A clip-to-clip blend drawn into a cleared, canvas-sized target surface.
pub trait VideoTransition: Send + Sync {
    /// Paint the blend of `input` into `target`.
    fn render(&self, target: &mut FrameRGBA, input: &TransitionInput<'_>) -> ClipweaveResult<()>;
}

fn check_target(target: &FrameRGBA, size: Size) -> ClipweaveResult<()> {
    if f64::from(target.width) != size.width || f64::from(target.height) != size.height {
        return Err(ClipweaveError::validation(format!(
            "transition target is {}x{}, expected {}x{}",
            target.width, target.height, size.width, size.height
        )));
    }
    Ok(())
}

fn clip_layers(target: &FrameRGBA, input: &TransitionInput<'_>) -> (FrameRGBA, FrameRGBA) {
    let mut a = FrameRGBA::transparent(target.width, target.height);
    let mut b = FrameRGBA::transparent(target.width, target.height);
    draw_frame(&mut a, input.frame_a, input.rect_a, input.opacity_a, CompositeMode::Replace);
    draw_frame(&mut b, input.frame_b, input.rect_b, input.opacity_b, CompositeMode::Replace);
    (a, b)
}

/// Cross-dissolve: outgoing weight `1 - rate`, incoming weight `rate`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fade;

impl VideoTransition for Fade {
    fn render(&self, target: &mut FrameRGBA, input: &TransitionInput<'_>) -> ClipweaveResult<()> {
        check_target(target, input.size)?;
        let (a, b) = clip_layers(target, input);
        for ((d, a), b) in target
            .data
            .chunks_exact_mut(4)
            .zip(a.data.chunks_exact(4))
            .zip(b.data.chunks_exact(4))
        {
            let out = crossfade([a[0], a[1], a[2], a[3]], [b[0], b[1], b[2], b[3]], input.rate);
            d.copy_from_slice(&out);
        }
        Ok(())
    }
}

/// Horizontal push: the outgoing clip leaves to the left as the incoming one enters from the
/// right.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlideX;

impl VideoTransition for SlideX {
    fn render(&self, target: &mut FrameRGBA, input: &TransitionInput<'_>) -> ClipweaveResult<()> {
        check_target(target, input.size)?;
        let w = input.size.width;
        let rect_a = input.rect_a.offset(Vec2::new(-input.rate * w, 0.0));
        let rect_b = input.rect_b.offset(Vec2::new((1.0 - input.rate) * w, 0.0));
        draw_frame(target, input.frame_a, rect_a, input.opacity_a, CompositeMode::SourceOver);
        draw_frame(target, input.frame_b, rect_b, input.opacity_b, CompositeMode::SourceOver);
        Ok(())
    }
}

/// Left-to-right reveal of the incoming clip with a smoothstep edge.
#[derive(Clone, Copy, Debug)]
pub struct Wipe {
    /// Edge softness as a fraction of the canvas width.
    pub soft_edge: f64,
}

impl Default for Wipe {
    fn default() -> Self {
        Self { soft_edge: 0.05 }
    }
}

impl VideoTransition for Wipe {
    fn render(&self, target: &mut FrameRGBA, input: &TransitionInput<'_>) -> ClipweaveResult<()> {
        check_target(target, input.size)?;
        let (a, b) = clip_layers(target, input);

        let t = input.rate.clamp(0.0, 1.0);
        let axis_len = input.size.width;
        let soft_px = self.soft_edge.max(0.0) * axis_len;
        let edge = t * (axis_len + 2.0 * soft_px) - soft_px;
        let (a_edge, b_edge) = (edge - soft_px, edge + soft_px);

        let width = target.width as usize;
        for (i, d) in target.data.chunks_exact_mut(4).enumerate() {
            let pos = (i % width) as f64;
            let m = if soft_px <= 0.0 {
                if pos < edge { 1.0 } else { 0.0 }
            } else {
                1.0 - smoothstep(a_edge, b_edge, pos)
            };
            let idx = i * 4;
            let ap = [a.data[idx], a.data[idx + 1], a.data[idx + 2], a.data[idx + 3]];
            let bp = [b.data[idx], b.data[idx + 1], b.data[idx + 2], b.data[idx + 3]];
            d.copy_from_slice(&crossfade(ap, bp, m));
        }
        Ok(())
    }
}

/// Transition implementations keyed by kind, handed to the renderer at construction.
pub struct TransitionRegistry {
    map: HashMap<TransitionKind, Box<dyn VideoTransition>>,
}

impl TransitionRegistry {
    /// Registry with no transitions; overlapping clips are superimposed.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Register (or replace) the implementation for `kind`.
    pub fn register(&mut self, kind: TransitionKind, transition: impl VideoTransition + 'static) {
        self.map.insert(kind, Box::new(transition));
    }

    /// Builder form of [`TransitionRegistry::register`].
    pub fn with(mut self, kind: TransitionKind, transition: impl VideoTransition + 'static) -> Self {
        self.register(kind, transition);
        self
    }

    /// Implementation registered for `kind`.
    pub fn get(&self, kind: TransitionKind) -> Option<&dyn VideoTransition> {
        self.map.get(&kind).map(|t| t.as_ref())
    }

    /// Return `true` if `kind` is registered.
    pub fn contains(&self, kind: TransitionKind) -> bool {
        self.map.contains_key(&kind)
    }
}

impl Default for TransitionRegistry {
    fn default() -> Self {
        Self::empty()
            .with(TransitionKind::Fade, Fade)
            .with(TransitionKind::SlideX, SlideX)
    }
}

impl fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.map.keys().collect();
        kinds.sort_by_key(|k| format!("{k:?}"));
        f.debug_struct("TransitionRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/transitions.rs"]
mod tests;
