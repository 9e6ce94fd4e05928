use std::collections::HashMap;

use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::media::source::{MediaDecoder, MediaSource};
use crate::render::transitions::TransitionRegistry;
use crate::timeline::arena::{ClipArena, ClipId};
use crate::timeline::item::{AudioTrackItem, VideoTrackItem};
use crate::timeline::project::Project;
use crate::timeline::resource::Resource;

/// Clip handles and decoder sources for one render.
///
/// Audio and picture sources live in separate maps so a video clip's picture source is never asked
/// for sound; its audio reaches the mix once, through the synthetic clip built from it.
pub(crate) struct Prepared {
    pub(crate) arena: ClipArena,
    pub(crate) audio_lines: Vec<Vec<ClipId>>,
    pub(crate) audio_sources: HashMap<ClipId, Box<dyn MediaSource>>,
    pub(crate) video_lines: Vec<Vec<ClipId>>,
    pub(crate) video_sources: HashMap<ClipId, Box<dyn MediaSource>>,
}

/// Open one source per clip and append a synthetic audio line for every video line.
pub(crate) fn prepare(
    project: &Project,
    decoder: &dyn MediaDecoder,
    transitions: &TransitionRegistry,
) -> ClipweaveResult<Prepared> {
    let mut arena = ClipArena::new();
    let mut audio_lines = Vec::with_capacity(project.audio_tracks.len() + project.video_tracks.len());
    let mut audio_sources: HashMap<ClipId, Box<dyn MediaSource>> = HashMap::new();
    let mut video_lines = Vec::with_capacity(project.video_tracks.len());
    let mut video_sources: HashMap<ClipId, Box<dyn MediaSource>> = HashMap::new();

    for line in &project.audio_tracks {
        let mut ids = Vec::with_capacity(line.len());
        for item in &line.items {
            warn_unsorted_audio(item);
            let resource = resource_of(project, &item.timing.resource_id)?;
            let id = arena.insert(item.clone());
            audio_sources.insert(id, decoder.open(resource)?);
            ids.push(id);
        }
        audio_lines.push(ids);
    }

    let mut synthetic_lines = Vec::with_capacity(project.video_tracks.len());
    for line in &project.video_tracks {
        let mut ids = Vec::with_capacity(line.len());
        let mut synthetic = Vec::with_capacity(line.len());
        for item in &line.items {
            warn_unsorted_video(item);
            if let Some(kind) = item.timing.transition
                && !transitions.contains(kind)
            {
                tracing::warn!(
                    resource = %item.timing.resource_id,
                    ?kind,
                    "transition is not registered, overlapping clips will be superimposed"
                );
            }

            let resource = resource_of(project, &item.timing.resource_id)?;
            let id = arena.insert(item.clone());
            video_sources.insert(id, decoder.open(resource)?);
            ids.push(id);

            let audio_id = arena.insert(item.to_audio_item());
            match decoder.demux_audio(resource)? {
                Some(source) => {
                    audio_sources.insert(audio_id, source);
                }
                None => tracing::warn!(
                    resource = %item.timing.resource_id,
                    "video clip has no embedded audio stream"
                ),
            }
            synthetic.push(audio_id);
        }
        video_lines.push(ids);
        synthetic_lines.push(synthetic);
    }
    audio_lines.extend(synthetic_lines);

    tracing::debug!(
        clips = arena.len(),
        audio_lines = audio_lines.len(),
        video_lines = video_lines.len(),
        "prepared clip sources"
    );

    Ok(Prepared {
        arena,
        audio_lines,
        audio_sources,
        video_lines,
        video_sources,
    })
}

fn resource_of<'a>(project: &'a Project, id: &str) -> ClipweaveResult<&'a Resource> {
    project
        .resource(id)
        .ok_or_else(|| ClipweaveError::validation(format!("track item references unknown resource '{id}'")))
}

fn warn_unsorted_audio(item: &AudioTrackItem) {
    if !item.gain.is_sorted() {
        tracing::warn!(resource = %item.timing.resource_id, "gain keyframes are not sorted by offset");
    }
}

fn warn_unsorted_video(item: &VideoTrackItem) {
    let curves = [
        ("opacity", item.opacity.is_sorted()),
        ("translate", item.translate.is_sorted()),
        ("scale", item.scale.is_sorted()),
        ("sound", item.sound.is_sorted()),
    ];
    for (name, sorted) in curves {
        if !sorted {
            tracing::warn!(
                resource = %item.timing.resource_id,
                curve = name,
                "keyframes are not sorted by offset"
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/prepare.rs"]
mod tests;
