use super::*;
use crate::animation::keyframes::KeyFrames;
use crate::animation::props::Opacity;
use crate::media::memory::PcmSource;
use crate::timeline::item::{AudioTrackItem, ClipTiming};

const RATE: u32 = 100;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn constant(len: u64, l: f32, r: f32) -> Box<dyn MediaSource> {
    Box::new(PcmSource::constant(RATE, secs(len), AudioSample::new(l, r)).unwrap())
}

fn close(a: AudioSample, b: AudioSample) -> bool {
    (a.left - b.left).abs() < 1e-5 && (a.right - b.right).abs() < 1e-5
}

#[test]
fn crossfade_midpoint_averages_clips() {
    let mut arena = ClipArena::new();
    let a = arena.insert(AudioTrackItem::new(ClipTiming::new("a", secs(0), secs(0), secs(5))));
    let b = arena.insert(AudioTrackItem::new(ClipTiming::new("b", secs(3), secs(0), secs(5))));

    let mut sources = HashMap::new();
    sources.insert(a, constant(10, 1.0, 1.0));
    sources.insert(b, constant(10, 0.0, 0.0));
    let mut mixer = AudioMixer::new(vec![vec![a, b]], sources);

    let s = mixer.sample(&arena, secs(4)).unwrap();
    assert!(close(s, AudioSample::new(0.5, 0.5)), "{s:?}");
}

#[test]
fn crossfade_keeps_channels_separate() {
    let mut arena = ClipArena::new();
    let a = arena.insert(AudioTrackItem::new(
        ClipTiming::new("a", secs(0), secs(0), secs(4)).with_volume(0.5),
    ));
    let b = arena.insert(AudioTrackItem::new(ClipTiming::new("b", secs(2), secs(0), secs(4))));

    let mut sources = HashMap::new();
    sources.insert(a, constant(10, 1.0, 0.0));
    sources.insert(b, constant(10, 0.0, 1.0));
    let mut mixer = AudioMixer::new(vec![vec![a, b]], sources);

    // rate = 0.5 at t = 3s
    let s = mixer.sample(&arena, secs(3)).unwrap();
    assert!(close(s, AudioSample::new(0.25, 0.5)), "{s:?}");
}

#[test]
fn single_clip_applies_volume_and_gain_at_relative_time() {
    let mut arena = ClipArena::new();
    let gain = KeyFrames::new(Opacity(1.0))
        .with_key(secs(2), Opacity(0.0))
        .with_key(secs(4), Opacity(1.0));
    let id = arena.insert(
        AudioTrackItem::new(ClipTiming::new("a", secs(10), secs(2), secs(6)).with_volume(0.5))
            .with_gain(gain),
    );

    let mut sources = HashMap::new();
    sources.insert(id, constant(20, 1.0, -1.0));
    let mut mixer = AudioMixer::new(vec![vec![id]], sources);

    // t = 11s -> relative 3s -> gain 0.5
    let s = mixer.sample(&arena, secs(11)).unwrap();
    assert!(close(s, AudioSample::new(0.25, -0.25)), "{s:?}");
}

#[test]
fn missing_sample_is_silence() {
    let mut arena = ClipArena::new();
    let id = arena.insert(AudioTrackItem::new(ClipTiming::new("a", secs(0), secs(0), secs(5))));
    let mut sources = HashMap::new();
    sources.insert(id, constant(1, 1.0, 1.0));
    let mut mixer = AudioMixer::new(vec![vec![id]], sources);

    assert_eq!(mixer.sample(&arena, secs(3)).unwrap(), AudioSample::SILENT);
}

#[test]
fn muted_clip_does_not_take_a_slot() {
    let mut arena = ClipArena::new();
    let muted = arena.insert(AudioTrackItem::new(
        ClipTiming::new("a", secs(0), secs(0), secs(5)).with_volume(0.0),
    ));
    let loud = arena.insert(AudioTrackItem::new(ClipTiming::new("b", secs(0), secs(0), secs(5))));
    let mut sources = HashMap::new();
    sources.insert(muted, constant(5, 1.0, 1.0));
    sources.insert(loud, constant(5, 0.25, 0.5));
    let mut mixer = AudioMixer::new(vec![vec![muted, loud]], sources);

    let s = mixer.sample(&arena, secs(1)).unwrap();
    assert!(close(s, AudioSample::new(0.25, 0.5)));
}

#[test]
fn lines_sum_without_clamping() {
    let mut arena = ClipArena::new();
    let a = arena.insert(AudioTrackItem::new(ClipTiming::new("a", secs(0), secs(0), secs(2))));
    let b = arena.insert(AudioTrackItem::new(ClipTiming::new("b", secs(0), secs(0), secs(2))));
    let mut sources = HashMap::new();
    sources.insert(a, constant(2, 0.75, 0.75));
    sources.insert(b, constant(2, 0.75, -0.75));
    let mut mixer = AudioMixer::new(vec![vec![a], vec![b]], sources);
    assert_eq!(mixer.line_count(), 2);

    let s = mixer.sample(&arena, secs(1)).unwrap();
    assert!(close(s, AudioSample::new(1.5, 0.0)));
}

#[test]
fn fill_block_zero_pads_past_the_end() {
    let mut arena = ClipArena::new();
    let id = arena.insert(AudioTrackItem::new(ClipTiming::new(
        "a",
        secs(0),
        secs(0),
        Duration::from_millis(50),
    )));
    let mut sources = HashMap::new();
    sources.insert(id, constant(1, 1.0, 1.0));
    let mut mixer = AudioMixer::new(vec![vec![id]], sources);

    let mut block = AudioBlock::silent(8);
    mixer.fill_block(&arena, 0, RATE, &mut block).unwrap();
    assert_eq!(&block.left[..5], &[1.0; 5]);
    assert_eq!(&block.right[5..], &[0.0; 3]);
}
