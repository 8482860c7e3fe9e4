use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::render::frame::FrameRGBA;

/// Lifecycle of a [`CaptureSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
    Stopped,
}

/// Finished recording: the encoded bytes plus timing metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoArtifact {
    pub mime: String,
    pub bytes: Vec<u8>,
    pub frame_count: u64,
    pub fps: Fps,
    pub duration: Duration,
    saved_path: Option<PathBuf>,
}

impl VideoArtifact {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the bytes to `path`, creating parent directories, and remember where they went.
    pub fn save(&mut self, path: impl AsRef<Path>) -> SketchreelResult<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write video '{}'", path.display()))?;
        let abs = std::path::absolute(path)
            .with_context(|| format!("failed to resolve '{}'", path.display()))?;
        self.saved_path = Some(abs.clone());
        Ok(abs)
    }

    pub fn saved_path(&self) -> Option<&Path> {
        self.saved_path.as_deref()
    }

    /// `file://` URL of the saved file, once [`VideoArtifact::save`] has run.
    pub fn file_url(&self) -> Option<String> {
        let p = self.saved_path.as_ref()?;
        let s = p.to_string_lossy().replace('\\', "/");
        Some(if s.starts_with('/') {
            format!("file://{s}")
        } else {
            format!("file:///{s}")
        })
    }
}

/// Turns painted frames into an encoded video.
///
/// Frames are emitted against a timeline: after every `capture`, the number of frames pushed
/// equals `fps.frames_at(timeline)`, so a frame held for one interval yields one frame and a
/// one-second pause yields `fps` frames.
pub struct CaptureSession {
    sink: Box<dyn FrameSink>,
    cfg: SinkConfig,
    state: SessionState,
    timeline: Duration,
    frames: u64,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("cfg", &self.cfg)
            .field("state", &self.state)
            .field("timeline", &self.timeline)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl CaptureSession {
    pub fn new(sink: Box<dyn FrameSink>, cfg: SinkConfig) -> Self {
        Self {
            sink,
            cfg,
            state: SessionState::Idle,
            timeline: Duration::ZERO,
            frames: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SinkConfig {
        &self.cfg
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn timeline(&self) -> Duration {
        self.timeline
    }

    pub fn start(&mut self) -> SketchreelResult<()> {
        if self.state != SessionState::Idle {
            return Err(SketchreelError::encode(format!(
                "capture session cannot start from {:?}",
                self.state
            )));
        }
        self.sink.begin(self.cfg)?;
        self.state = SessionState::Recording;
        tracing::debug!(
            width = self.cfg.width,
            height = self.cfg.height,
            fps = self.cfg.fps.as_f64(),
            "capture started"
        );
        Ok(())
    }

    /// Hold `frame` on screen for `hold`.
    pub fn capture(&mut self, frame: &FrameRGBA, hold: Duration) -> SketchreelResult<()> {
        if self.state != SessionState::Recording {
            return Err(SketchreelError::encode(
                "capture session is not recording",
            ));
        }
        self.timeline += hold;
        let target = self.cfg.fps.frames_at(self.timeline);
        while self.frames < target {
            self.sink.push_frame(FrameIndex(self.frames), frame)?;
            self.frames += 1;
        }
        Ok(())
    }

    /// Finish encoding and assemble the chunks, in arrival order, into one artifact.
    pub fn stop(&mut self) -> SketchreelResult<VideoArtifact> {
        if self.state != SessionState::Recording {
            return Err(SketchreelError::encode(format!(
                "capture session cannot stop from {:?}",
                self.state
            )));
        }
        self.state = SessionState::Stopped;
        let out = match self.sink.end() {
            Ok(out) => out,
            Err(e) => {
                self.sink.abort();
                return Err(e);
            }
        };

        let bytes = out.chunks.concat();
        let artifact = VideoArtifact {
            mime: out.mime,
            bytes,
            frame_count: self.frames,
            fps: self.cfg.fps,
            duration: self.cfg.fps.frames_to_duration(self.frames),
            saved_path: None,
        };
        tracing::debug!(
            frames = artifact.frame_count,
            bytes = artifact.bytes.len(),
            "capture stopped"
        );
        Ok(artifact)
    }

    /// Discard the recording. No-op unless recording.
    pub fn abort(&mut self) {
        if self.state == SessionState::Recording {
            tracing::warn!(frames = self.frames, "capture session aborted");
            self.sink.abort();
            self.state = SessionState::Stopped;
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/capture.rs"]
mod tests;
