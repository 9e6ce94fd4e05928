use super::*;
use crate::encode::codec::{AudioEncoder, PcmEncoder, RawVideoEncoder, VideoEncoder};
use crate::foundation::core::Fps;

fn video_params(w: u32, h: u32) -> StreamParams {
    StreamParams::Video(RawVideoEncoder::new(w, h, Fps::new(30, 1).unwrap(), PixelLayout::Rgba8).params())
}

#[test]
fn encoder_listing_is_matched_by_name_column() {
    let listing = " V....D libx264              libx264 H.264\n A....D aac                  AAC (Advanced Audio Coding)\n";
    assert!(has_encoder(listing, "libx264"));
    assert!(has_encoder(listing, "aac"));
    assert!(!has_encoder(listing, "libx265"));
    assert!(!has_encoder("aac only in description", "aac"));
}

#[test]
fn stream_indices_follow_registration_order() {
    let mut m = FfmpegMuxer::new(FfmpegMuxerOpts::new("out.mp4"));
    let a = m
        .add_stream(StreamParams::Audio(PcmEncoder::new(44_100, 1024).params()))
        .unwrap();
    let v = m.add_stream(video_params(4, 2)).unwrap();
    assert_eq!((a.index, v.index), (0, 1));
    assert_eq!(a.time_base, Rational::new(1, 44_100));
    assert_eq!(v.time_base, Rational::new(1, 30));
}

#[test]
fn odd_dimensions_are_rejected() {
    let mut m = FfmpegMuxer::new(FfmpegMuxerOpts::new("out.mp4"));
    assert!(m.add_stream(video_params(3, 2)).is_err());
}

#[test]
fn bgra_streams_are_rejected() {
    let mut m = FfmpegMuxer::new(FfmpegMuxerOpts::new("out.mp4"));
    let params = RawVideoEncoder::new(2, 2, Fps::new(30, 1).unwrap(), PixelLayout::Bgra8).params();
    assert!(m.add_stream(StreamParams::Video(params)).is_err());
}

#[test]
fn packets_before_header_are_rejected() {
    let mut m = FfmpegMuxer::new(FfmpegMuxerOpts::new("out.mp4"));
    m.add_stream(video_params(2, 2)).unwrap();
    let p = Packet {
        pts: 0,
        dts: 0,
        duration: 1,
        data: vec![0; 16],
        stream_index: 0,
    };
    assert!(m.write_packet(p).is_err());
}
