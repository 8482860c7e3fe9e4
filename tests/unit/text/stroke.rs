use super::*;
use crate::encode::sink::{InMemorySink, RetainedFrames, SinkConfig};
use crate::foundation::core::Fps;
use crate::session::capture::CaptureSession;
use crate::session::clock::StepScheduler;
use crate::session::progress::ProgressReporter;
use crate::text::face::BlockFace;

const WHITE: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

fn stage(c: Canvas, fps: u32) -> (Stage<'static>, RetainedFrames) {
    let (sink, frames) = InMemorySink::retaining();
    let cfg = SinkConfig {
        width: c.width,
        height: c.height,
        fps: Fps::whole(fps).unwrap(),
        background: WHITE,
    };
    let surface = Surface::filled(c.width, c.height, WHITE).unwrap();
    let session = CaptureSession::new(Box::new(sink), cfg);
    let stage = Stage::begin(
        surface,
        session,
        StepScheduler::virtual_time(),
        ProgressReporter::silent(),
    )
    .unwrap();
    (stage, frames)
}

fn no_cursor() -> TextStyle {
    TextStyle {
        show_cursor: false,
        ..TextStyle::default()
    }
}

#[test]
fn defaults_are_named() {
    let p = SentencePause::default();
    assert_eq!(p.terminators, ".");
    assert_eq!(p.min_run, 4);
    assert_eq!(p.pause(), Duration::from_secs(5));
    let s = TextStyle::default();
    assert_eq!((s.font_size, s.line_height, s.margin), (24.0, 32.0, 20.0));
    assert_eq!((s.cursor_size, s.cursor_offset_y), (64, 45.0));
}

#[test]
fn sentence_pause_needs_a_long_enough_run() {
    let p = SentencePause::default();
    assert!(!p.triggers('.', 3));
    assert!(p.triggers('.', 4));
    assert!(!p.triggers('a', 10));
    assert!(!SentencePause::disabled().triggers('.', 10));
}

#[test]
fn scroll_keeps_active_line_two_lines_above_bottom() {
    assert_eq!(scroll_for(32.0, 0.0, 600.0, 32.0), 0.0);
    assert_eq!(scroll_for(536.0, 0.0, 600.0, 32.0), 0.0);
    assert_eq!(scroll_for(568.0, 0.0, 600.0, 32.0), 32.0);
    assert_eq!(scroll_for(632.0, 32.0, 600.0, 32.0), 96.0);
    assert_eq!(scroll_for(100.0, 64.0, 600.0, 32.0), 64.0);
}

#[test]
fn style_validation() {
    assert!(TextStyle::default().validate().is_ok());
    let bad = TextStyle {
        font_size: 0.0,
        ..TextStyle::default()
    };
    assert!(bad.validate().is_err());
    let bad = TextStyle {
        cursor_size: 0,
        ..TextStyle::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn cursor_trails_the_next_character() {
    let mut face = BlockFace::new(10.0, 16).unwrap();
    let r = TextStrokeRenderer::new(&mut face, "ab", &no_cursor(), canvas(200, 100), WHITE, None)
        .unwrap();
    assert_eq!(r.cursor_anchor(0), Some((30.0, 32.0)));
    assert_eq!(r.cursor_anchor(1), Some((40.0, 32.0)));
    assert_eq!(r.cursor_anchor(2), None);
}

#[test]
fn paint_frame_draws_prefix_and_cursor() {
    let mut face = BlockFace::new(10.0, 16).unwrap();
    let cursor = Surface::filled(20, 20, Rgba8Premul::opaque(255, 0, 0)).unwrap();
    let style = TextStyle {
        cursor_offset_y: 45.0,
        ..TextStyle::default()
    };
    let mut r =
        TextStrokeRenderer::new(&mut face, "ab", &style, canvas(200, 100), WHITE, Some(cursor))
            .unwrap();
    let mut s = Surface::filled(200, 100, WHITE).unwrap();
    r.paint_frame(&mut s, 0, 0.0).unwrap();

    // Glyph box of 'a' spans x 20..27, y 16..32.
    assert_eq!(s.pixel(20, 16), Some([0, 0, 0, 255]));
    assert_eq!(s.pixel(30, 20), Some([255, 255, 255, 255]));
    // Cursor at the next character (30, 32 - 45).
    assert_eq!(s.pixel(31, 0), Some([255, 0, 0, 255]));
}

#[test]
fn each_character_is_one_frame_and_pauses_add_frames() {
    let c = canvas(200, 100);
    let mut face = BlockFace::new(10.0, 16).unwrap();
    let style = TextStyle {
        sentence_pause: SentencePause {
            pause_ms: 1_000,
            ..SentencePause::default()
        },
        ..no_cursor()
    };
    let mut r = TextStrokeRenderer::new(&mut face, "Hi. abcd.", &style, c, WHITE, None).unwrap();
    let (mut st, frames) = stage(c, 10);
    r.run(&r.plan(), &mut st).unwrap();
    // 9 characters, one pause (the first '.' ends a run of only 3).
    assert_eq!(frames.len(), 9 + 10);
    st.abort();
}

#[test]
fn long_text_scrolls_and_stays_on_screen() {
    let c = canvas(100, 128);
    let mut face = BlockFace::new(10.0, 16).unwrap();
    let text = "x".repeat(8 * 10);
    let mut r = TextStrokeRenderer::new(&mut face, &text, &no_cursor(), c, WHITE, None).unwrap();
    let (mut st, frames) = stage(c, 10);
    r.run(&r.plan(), &mut st).unwrap();
    st.abort();

    let last = frames.last().unwrap();
    // With scrolling, the last line's baseline sits at canvas_h - 2 * line_height = 64.
    assert_eq!(last.pixel(20, 60), Some([0, 0, 0, 255]));
    assert_eq!(last.pixel(20, 100), Some([255, 255, 255, 255]));
}
