use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::core::{Fps, FrameIndex, Rgba8Premul};
use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::render::frame::FrameRGBA;

/// MIME type of the [`InMemorySink`] hash stream.
pub const FRAME_HASH_MIME: &str = "application/x-sketchreel-framehash";

/// Configuration provided to a [`FrameSink`] when a capture session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Color translucent pixels are flattened over by encoders without alpha.
    pub background: Rgba8Premul,
}

/// Encoded bytes produced by a sink, in the order the encoder emitted them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedOutput {
    pub mime: String,
    pub chunks: Vec<Vec<u8>>,
}

/// Sink contract for consuming painted frames.
///
/// `begin` is called once, then `push_frame` with strictly increasing indices, then exactly one
/// of `end` or `abort`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> SketchreelResult<()>;
    /// Push one frame in strictly increasing index order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SketchreelResult<()>;
    /// Finish encoding and return everything the encoder produced.
    fn end(&mut self) -> SketchreelResult<EncodedOutput>;
    /// Release resources without producing output.
    fn abort(&mut self);
}

fn check_frame(
    cfg: Option<&SinkConfig>,
    last: Option<FrameIndex>,
    idx: FrameIndex,
    frame: &FrameRGBA,
) -> SketchreelResult<()> {
    let cfg = cfg.ok_or_else(|| SketchreelError::encode("sink not started"))?;
    if let Some(last) = last
        && idx.0 <= last.0
    {
        return Err(SketchreelError::encode(
            "sink received out-of-order frame index",
        ));
    }
    if frame.width != cfg.width || frame.height != cfg.height {
        return Err(SketchreelError::encode(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width, frame.height, cfg.width, cfg.height
        )));
    }
    Ok(())
}

/// Frames kept by an [`InMemorySink`], readable after the sink has been handed to a session.
#[derive(Debug, Clone, Default)]
pub struct RetainedFrames(Arc<Mutex<Vec<(FrameIndex, FrameRGBA)>>>);

impl RetainedFrames {
    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the frames in capture order.
    pub fn frames(&self) -> Vec<(FrameIndex, FrameRGBA)> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<FrameRGBA> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .map(|(_, f)| f.clone())
    }

    fn push(&self, idx: FrameIndex, frame: &FrameRGBA) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((idx, frame.clone()));
    }

    fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Deterministic in-process sink: one 16-byte chunk per frame (`idx` then `xxh3_64` of the
/// pixel bytes, both little-endian u64).
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    chunks: Vec<Vec<u8>>,
    retained: Option<RetainedFrames>,
}

impl InMemorySink {
    /// Create a sink that keeps only frame hashes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that also keeps every frame, readable through the returned handle.
    pub fn retaining() -> (Self, RetainedFrames) {
        let frames = RetainedFrames::default();
        let sink = Self {
            retained: Some(frames.clone()),
            ..Self::default()
        };
        (sink, frames)
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }
}

/// Split a hash-stream artifact back into `(index, hash)` pairs.
pub fn decode_frame_hashes(bytes: &[u8]) -> SketchreelResult<Vec<(u64, u64)>> {
    if !bytes.len().is_multiple_of(16) {
        return Err(SketchreelError::decode(
            "frame hash stream length is not a multiple of 16",
        ));
    }
    Ok(bytes
        .chunks_exact(16)
        .map(|c| {
            let mut idx = [0u8; 8];
            let mut hash = [0u8; 8];
            idx.copy_from_slice(&c[..8]);
            hash.copy_from_slice(&c[8..]);
            (u64::from_le_bytes(idx), u64::from_le_bytes(hash))
        })
        .collect())
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> SketchreelResult<()> {
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.chunks.clear();
        if let Some(r) = &self.retained {
            r.clear();
        }
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SketchreelResult<()> {
        check_frame(self.cfg.as_ref(), self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);

        let hash = xxhash_rust::xxh3::xxh3_64(&frame.data);
        let mut chunk = Vec::with_capacity(16);
        chunk.extend_from_slice(&idx.0.to_le_bytes());
        chunk.extend_from_slice(&hash.to_le_bytes());
        self.chunks.push(chunk);

        if let Some(r) = &self.retained {
            r.push(idx, frame);
        }
        Ok(())
    }

    fn end(&mut self) -> SketchreelResult<EncodedOutput> {
        if self.cfg.take().is_none() {
            return Err(SketchreelError::encode("sink not started"));
        }
        Ok(EncodedOutput {
            mime: FRAME_HASH_MIME.to_string(),
            chunks: std::mem::take(&mut self.chunks),
        })
    }

    fn abort(&mut self) {
        self.cfg = None;
        self.chunks.clear();
    }
}

/// Handle to the most recent frame seen by a [`LastFrameSink`].
#[derive(Debug, Clone, Default)]
pub struct LastFrame(Arc<Mutex<Option<FrameRGBA>>>);

impl LastFrame {
    pub fn get(&self) -> Option<FrameRGBA> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Sink that keeps only the latest frame and produces no encoded bytes.
#[derive(Debug, Default)]
pub struct LastFrameSink {
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    slot: LastFrame,
}

impl LastFrameSink {
    pub fn new() -> (Self, LastFrame) {
        let slot = LastFrame::default();
        let sink = Self {
            slot: slot.clone(),
            ..Self::default()
        };
        (sink, slot)
    }
}

impl FrameSink for LastFrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> SketchreelResult<()> {
        self.cfg = Some(cfg);
        self.last_idx = None;
        *self.slot.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SketchreelResult<()> {
        check_frame(self.cfg.as_ref(), self.last_idx, idx, frame)?;
        self.last_idx = Some(idx);
        *self.slot.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> SketchreelResult<EncodedOutput> {
        if self.cfg.take().is_none() {
            return Err(SketchreelError::encode("sink not started"));
        }
        Ok(EncodedOutput {
            mime: "image/x-raw-rgba".to_string(),
            chunks: Vec::new(),
        })
    }

    fn abort(&mut self) {
        self.cfg = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
