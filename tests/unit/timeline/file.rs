use super::*;
use std::time::Duration;

use crate::animation::props::Opacity;
use crate::timeline::item::TransitionKind;

const DOC: &str = r#"{
    "name": "demo",
    "width": 320,
    "height": 180,
    "resources": [
        { "id": "intro", "path": "media/intro.mp4" },
        { "id": "music", "path": "/abs/music.wav" }
    ],
    "audio_tracks": [
        [ { "resource": "music", "end": 10.0, "volume": 0.8 } ]
    ],
    "video_tracks": [
        [
            { "resource": "intro", "end": 4.0, "transition": "fade",
              "opacity": { "default": 1.0, "keys": [ { "offset": 0.0, "value": 0.0 }, { "offset": 1.0, "value": 1.0, "ease": "in_out_sine" } ] } },
            { "resource": "intro", "offset": 3.0, "start": 1.0, "end": 5.0 }
        ]
    ]
}"#;

#[test]
fn parses_document_and_resolves_paths() {
    let file = ProjectFile::from_reader(DOC.as_bytes()).unwrap();
    let project = file.into_project(Path::new("/projects/demo"));

    assert_eq!(project.name, "demo");
    assert_eq!((project.width, project.height), (320, 180));
    assert_eq!(
        project.resource("intro").unwrap().path(),
        Some(Path::new("/projects/demo/media/intro.mp4"))
    );
    assert_eq!(
        project.resource("music").unwrap().path(),
        Some(Path::new("/abs/music.wav"))
    );

    let line = &project.video_tracks[0];
    assert_eq!(line.len(), 2);
    assert_eq!(line.items[0].timing.transition, Some(TransitionKind::Fade));
    assert_eq!(line.items[0].opacity.sample(Duration::from_secs(2)), Opacity(1.0));
    assert_eq!(line.items[1].timing.absolute_end_time(), Duration::from_secs(7));
    assert_eq!(project.audio_tracks[0].items[0].timing.volume, 0.8);
    assert!(project.validate().is_ok());
}

#[test]
fn unknown_transition_is_a_serde_error() {
    let json = DOC.replace("\"fade\"", "\"spin\"");
    let err = Project::from_json_str(&json).unwrap_err();
    assert!(matches!(err, ClipweaveError::Serde(_)));
}

#[test]
fn negative_time_is_rejected() {
    let json = DOC.replace("\"offset\": 3.0", "\"offset\": -3.0");
    assert!(matches!(
        Project::from_json_str(&json).unwrap_err(),
        ClipweaveError::Serde(_)
    ));
}

#[test]
fn dangling_resource_fails_validation() {
    let json = DOC.replace("\"resource\": \"music\"", "\"resource\": \"nope\"");
    assert!(matches!(
        Project::from_json_str(&json).unwrap_err(),
        ClipweaveError::Validation(_)
    ));
}

#[test]
fn missing_file_is_reported() {
    let err = Project::from_path("no/such/project.json").unwrap_err();
    assert!(err.to_string().contains("no/such/project.json"));
}
