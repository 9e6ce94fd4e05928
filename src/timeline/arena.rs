use std::fmt;

use crate::timeline::item::{AudioTrackItem, TrackItem, VideoTrackItem};

/// Stable handle to a clip stored in a [`ClipArena`].
///
/// Two structurally equal clips get distinct handles, so lookup tables keyed by `ClipId` follow
/// clip identity rather than value equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClipId(u32);

impl ClipId {
    /// Position of the clip inside its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Append-only store of track items frozen for one render.
#[derive(Clone, Debug, Default)]
pub struct ClipArena {
    items: Vec<TrackItem>,
}

impl ClipArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `item` and return its handle.
    pub fn insert(&mut self, item: impl Into<TrackItem>) -> ClipId {
        let id = ClipId(self.items.len() as u32);
        self.items.push(item.into());
        id
    }

    /// Item behind `id`.
    ///
    /// Handles are only minted by `insert`, so `id` is always in range for the arena that
    /// produced it.
    pub fn get(&self, id: ClipId) -> &TrackItem {
        &self.items[id.index()]
    }

    /// Audio payload behind `id`, if it is an audio clip.
    pub fn audio(&self, id: ClipId) -> Option<&AudioTrackItem> {
        self.get(id).as_audio()
    }

    /// Video payload behind `id`, if it is a video clip.
    pub fn video(&self, id: ClipId) -> Option<&VideoTrackItem> {
        self.get(id).as_video()
    }

    /// Number of stored clips.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Return `true` when no clip is stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Handles and items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ClipId, &TrackItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (ClipId(i as u32), item))
    }
}
