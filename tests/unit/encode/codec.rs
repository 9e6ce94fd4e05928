use super::*;

fn fps30() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn pcm_encoder_interleaves_frames() {
    let mut enc = PcmEncoder::new(44_100, 2);
    assert_eq!(enc.params().time_base, Rational::new(1, 44_100));

    let frame = AudioFrame {
        pts: 2048,
        left: vec![1.0, 2.0],
        right: vec![-1.0, -2.0],
    };
    let packets = enc.encode(Some(&frame)).unwrap();
    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].pts, 2048);
    assert_eq!(packets[0].duration, 2);

    let floats: Vec<f32> = packets[0]
        .data
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    assert_eq!(floats, vec![1.0, -1.0, 2.0, -2.0]);

    assert!(enc.encode(None).unwrap().is_empty());
}

#[test]
fn pcm_encoder_rejects_wrong_frame_size() {
    let mut enc = PcmEncoder::new(44_100, 4);
    let frame = AudioFrame {
        pts: 0,
        left: vec![0.0; 3],
        right: vec![0.0; 3],
    };
    assert!(matches!(
        enc.encode(Some(&frame)).unwrap_err(),
        ClipweaveError::Encode(_)
    ));
}

#[test]
fn raw_video_delay_is_drained_on_flush() {
    let mut enc = RawVideoEncoder::new(1, 1, fps30(), PixelLayout::Rgba8).with_delay(2);
    let frame = |pts| VideoFrame {
        pts,
        width: 1,
        height: 1,
        layout: PixelLayout::Rgba8,
        data: vec![0, 0, 0, 255],
    };

    assert!(enc.encode(Some(&frame(0))).unwrap().is_empty());
    assert!(enc.encode(Some(&frame(1))).unwrap().is_empty());
    let out = enc.encode(Some(&frame(2))).unwrap();
    assert_eq!(out.iter().map(|p| p.pts).collect::<Vec<_>>(), vec![0]);

    let flushed = enc.encode(None).unwrap();
    assert_eq!(flushed.iter().map(|p| p.pts).collect::<Vec<_>>(), vec![1, 2]);
    assert!(enc.encode(None).unwrap().is_empty());
}

#[test]
fn raw_video_rejects_mismatched_layout() {
    let mut enc = RawVideoEncoder::new(1, 1, fps30(), PixelLayout::Bgra8);
    let frame = VideoFrame {
        pts: 0,
        width: 1,
        height: 1,
        layout: PixelLayout::Rgba8,
        data: vec![0; 4],
    };
    assert!(enc.encode(Some(&frame)).is_err());
}

#[test]
fn packet_rescale_moves_between_time_bases() {
    let mut p = Packet {
        pts: 3,
        dts: 3,
        duration: 1,
        data: Vec::new(),
        stream_index: 0,
    };
    p.rescale(fps30().time_base(), Rational::new(1, 90_000));
    assert_eq!((p.pts, p.dts, p.duration), (9_000, 9_000, 3_000));
}

#[test]
fn convert_frame_flattens_and_swizzles() {
    let mut canvas = FrameRGBA::transparent(2, 1);
    canvas.data[..4].copy_from_slice(&[200, 10, 20, 255]);

    let rgba = convert_frame(&canvas, 7, PixelLayout::Rgba8, [1, 2, 3, 255]);
    assert_eq!(rgba.pts, 7);
    assert_eq!(rgba.data, vec![200, 10, 20, 255, 1, 2, 3, 255]);

    let bgra = convert_frame(&canvas, 7, PixelLayout::Bgra8, [1, 2, 3, 255]);
    assert_eq!(bgra.data, vec![20, 10, 200, 255, 3, 2, 1, 255]);
}
