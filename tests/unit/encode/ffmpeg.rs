use super::*;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::whole(30).unwrap(),
        background: Rgba8Premul::opaque(10, 20, 30),
    }
}

#[test]
fn flatten_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque(&mut dst, &src, Rgba8Premul::opaque(10, 20, 30));
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque(&mut dst, &src, Rgba8Premul::opaque(10, 20, 30));
    assert_eq!(dst, src);
}

#[test]
fn begin_rejects_odd_or_zero_dims() {
    let mut sink = WebmSink::default();
    assert!(matches!(sink.begin(cfg(3, 2)), Err(SketchreelError::Encode(_))));
    assert!(sink.begin(cfg(0, 2)).is_err());
}

#[test]
fn missing_program_is_encode_error() {
    let mut sink = WebmSink::new(WebmSinkOpts {
        program: PathBuf::from("definitely-not-ffmpeg-sketchreel"),
        ..WebmSinkOpts::default()
    });
    assert!(matches!(sink.begin(cfg(2, 2)), Err(SketchreelError::Encode(_))));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = WebmSink::default();
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}
