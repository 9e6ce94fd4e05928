use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::timeline::item::{AudioTrackItem, VideoTrackItem};
use crate::timeline::project::{Project, TrackLine};
use crate::timeline::resource::Resource;

/// JSON-facing project document.
///
/// Times are seconds, resource paths are relative to the document location.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    /// Project name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Resource table.
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
    /// Audio lines.
    #[serde(default)]
    pub audio_tracks: Vec<TrackLine<AudioTrackItem>>,
    /// Video lines, topmost first.
    #[serde(default)]
    pub video_tracks: Vec<TrackLine<VideoTrackItem>>,
}

fn default_name() -> String {
    "untitled".to_string()
}

/// File-backed resource entry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDef {
    /// Id referenced by clips.
    pub id: String,
    /// Path to the media file.
    pub path: PathBuf,
}

impl ProjectFile {
    /// Parse a project document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> ClipweaveResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ClipweaveError::serde(format!("parse project JSON: {e}")))
    }

    /// Build the runtime project, resolving relative resource paths against `base_dir`.
    pub fn into_project(self, base_dir: &Path) -> Project {
        let resources = self
            .resources
            .into_iter()
            .map(|def| {
                let path = if def.path.is_absolute() {
                    def.path
                } else {
                    base_dir.join(def.path)
                };
                Resource::from_path(def.id, path)
            })
            .collect();
        Project {
            name: self.name,
            width: self.width,
            height: self.height,
            resources,
            audio_tracks: self.audio_tracks,
            video_tracks: self.video_tracks,
        }
    }
}

impl Project {
    /// Parse and validate a project from JSON text; relative paths resolve against the working
    /// directory.
    pub fn from_json_str(json: &str) -> ClipweaveResult<Self> {
        let file: ProjectFile = serde_json::from_str(json)
            .map_err(|e| ClipweaveError::serde(format!("parse project JSON: {e}")))?;
        let project = file.into_project(Path::new("."));
        project.validate()?;
        Ok(project)
    }

    /// Parse and validate a project file; relative paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> ClipweaveResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ClipweaveError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        let file = ProjectFile::from_reader(BufReader::new(f))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let project = file.into_project(base);
        project.validate()?;
        Ok(project)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/file.rs"]
mod tests;
