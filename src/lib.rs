//! Sketchreel turns a still image or a piece of text into a "hand-drawn" reveal video.
//!
//! An image is cut into a grid and each block is swept onto the page along a direction; text is
//! written one character at a time with a pen cursor trailing it. Every painted step is captured
//! into a [`CaptureSession`] that hands frames to a [`FrameSink`] (WebM via the system `ffmpeg`
//! by default) and returns a [`VideoArtifact`].
//!
//! - Build a [`RevealRequest`] (or parse one from JSON) and validate it into a [`RevealJob`]
//! - Run it with a [`RevealPipeline`]
#![forbid(unsafe_code)]

mod assets;
mod foundation;

/// Encoding sinks.
pub mod encode;
pub(crate) mod job;
pub(crate) mod pipeline;
pub(crate) mod render;
pub(crate) mod reveal;
pub(crate) mod session;
pub(crate) mod text;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{SketchreelError, SketchreelResult};

pub use crate::assets::color::ColorDef;
pub use crate::assets::decode::{decode_image, parse_svg};
pub use crate::assets::font::{FontFace, load_system_font};
pub use crate::assets::svg_raster::{DEFAULT_CURSOR_SVG, rasterize_svg};
pub use crate::encode::ffmpeg::{
    WEBM_MIME, WebmSink, WebmSinkOpts, is_ffmpeg_on_path, is_libvpx_available,
};
pub use crate::encode::sink::{
    EncodedOutput, FRAME_HASH_MIME, FrameSink, InMemorySink, LastFrame, LastFrameSink,
    RetainedFrames, SinkConfig, decode_frame_hashes,
};
pub use crate::job::{
    ContentKind, DEFAULT_FPS, DEFAULT_IMAGE_FRAME, DEFAULT_TAIL_MS, DEFAULT_TEXT_FRAME,
    ImageSource, JobContent, RevealJob, RevealRequest,
};
pub use crate::pipeline::{RevealPipeline, load_cursor};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::surface::{AlphaMask, MAX_SURFACE_DIM, Surface};
pub use crate::reveal::block::{BlockRevealRenderer, Sweep, SweepStep};
pub use crate::reveal::grid::{BlockId, GridModel};
pub use crate::reveal::plan::{Direction, RevealPlan, Selection};
pub use crate::session::capture::{CaptureSession, SessionState, VideoArtifact};
pub use crate::session::clock::{Clock, RealtimeClock, StepScheduler, VirtualClock};
pub use crate::session::progress::ProgressReporter;
pub use crate::session::stage::Stage;
pub use crate::text::face::{BlockFace, GlyphBitmap, GlyphFace};
pub use crate::text::layout::{CharGlyph, LayoutParams, layout_text};
pub use crate::text::stroke::{SentencePause, TextStrokeRenderer, TextStyle, scroll_for};
