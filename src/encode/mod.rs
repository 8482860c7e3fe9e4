//! Encoding sinks.
//!
//! Sinks consume painted frames in capture order and hand back the encoded byte chunks when the
//! capture session stops.

/// WebM output via the system `ffmpeg`.
pub mod ffmpeg;
/// Sink trait and the in-process sinks.
pub mod sink;
