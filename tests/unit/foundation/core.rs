use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::whole(30).is_ok());
}

#[test]
fn frame_interval_rounds_to_nearest_nanosecond() {
    let fps = Fps::whole(30).unwrap();
    assert_eq!(fps.frame_interval(), Duration::from_nanos(33_333_333));

    let fps = Fps::whole(120).unwrap();
    assert_eq!(fps.frame_interval(), Duration::from_nanos(8_333_333));

    let ntsc = Fps::new(30_000, 1001).unwrap();
    assert_eq!(ntsc.frame_interval(), Duration::from_nanos(33_366_667));
}

#[test]
fn accumulated_intervals_map_back_to_whole_frames() {
    let fps = Fps::whole(30).unwrap();
    let step = fps.frame_interval();
    let mut elapsed = Duration::ZERO;
    for expected in 1..=300u64 {
        elapsed += step;
        assert_eq!(fps.frames_at(elapsed), expected);
    }
}

#[test]
fn whole_seconds_are_fps_frames() {
    let fps = Fps::whole(24).unwrap();
    assert_eq!(fps.frames_at(Duration::from_secs(1)), 24);
    assert_eq!(fps.frames_at(Duration::from_millis(5000)), 120);
    assert_eq!(fps.frames_to_duration(24), Duration::from_secs(1));
}

#[test]
fn straight_to_premul_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
    assert_eq!(Rgba8Premul::opaque(1, 2, 3).to_array(), [1, 2, 3, 255]);
}

#[test]
fn canvas_rect_spans_full_size() {
    let c = Canvas {
        width: 800,
        height: 600,
    };
    assert_eq!(c.rect(), Rect::new(0.0, 0.0, 800.0, 600.0));
}
