use super::*;
use crate::encode::codec::{AudioEncoder, PcmEncoder};

fn audio_params() -> StreamParams {
    StreamParams::Audio(PcmEncoder::new(44_100, 1024).params())
}

fn packet(pts: i64, stream_index: usize) -> Packet {
    Packet {
        pts,
        dts: pts,
        duration: 1,
        data: Vec::new(),
        stream_index,
    }
}

#[test]
fn assigns_indices_and_time_bases() {
    let mut m = InMemoryMuxer::new();
    let a = m.add_stream(audio_params()).unwrap();
    assert_eq!(a.index, 0);
    assert_eq!(a.time_base, Rational::new(1, 44_100));
    assert!(m.audio_stream().is_some());
    assert!(m.video_stream().is_none());
}

#[test]
fn enforces_strictly_increasing_pts_per_stream() {
    let mut m = InMemoryMuxer::new();
    m.add_stream(audio_params()).unwrap();
    m.write_header().unwrap();
    m.write_packet(packet(0, 0)).unwrap();
    m.write_packet(packet(1024, 0)).unwrap();
    assert!(m.write_packet(packet(1024, 0)).is_err());
    assert!(m.write_packet(packet(2048, 3)).is_err());
    assert_eq!(m.packet_count(), 2);
}

#[test]
fn rejects_packets_before_header_and_after_abort() {
    let mut m = InMemoryMuxer::new();
    m.add_stream(audio_params()).unwrap();
    assert!(m.write_packet(packet(0, 0)).is_err());

    m.write_header().unwrap();
    m.abort();
    assert!(m.aborted());
    assert!(m.write_packet(packet(0, 0)).is_err());
    assert!(m.write_trailer().is_err());
    assert!(!m.trailer_written());
}

#[test]
fn probe_failure_is_an_encode_error() {
    let m = InMemoryMuxer::new().with_probe_error("no aac");
    assert!(matches!(m.probe().unwrap_err(), ClipweaveError::Encode(_)));
    assert!(InMemoryMuxer::new().probe().is_ok());
}
