use std::io::{Read, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{EncodedOutput, FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, Rgba8Premul};
use crate::foundation::error::{SketchreelError, SketchreelResult};
use crate::foundation::math::premul_over_px;
use crate::render::frame::FrameRGBA;

/// MIME type of [`WebmSink`] output.
pub const WEBM_MIME: &str = "video/webm";

const STDOUT_CHUNK: usize = 64 * 1024;

/// Options for [`WebmSink`].
#[derive(Clone, Debug)]
pub struct WebmSinkOpts {
    /// `ffmpeg` executable, looked up on `PATH` when relative.
    pub program: PathBuf,
    /// Target video bitrate passed to libvpx (`-b:v`).
    pub bitrate: String,
}

impl Default for WebmSinkOpts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            bitrate: "2M".to_string(),
        }
    }
}

type Drain<T> = JoinHandle<std::io::Result<T>>;

/// Sink that pipes raw RGBA frames into the system `ffmpeg` and collects the VP8/WebM stream it
/// writes to stdout.
pub struct WebmSink {
    opts: WebmSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<Drain<Vec<Vec<u8>>>>,
    stderr_drain: Option<Drain<Vec<u8>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl std::fmt::Debug for WebmSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebmSink")
            .field("opts", &self.opts)
            .field("running", &self.child.is_some())
            .field("last_idx", &self.last_idx)
            .finish_non_exhaustive()
    }
}

impl WebmSink {
    pub fn new(opts: WebmSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new(&self.opts.program);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: opaque RGBA8 frames (flattened in push_frame).
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        cmd.args([
            "-an",
            "-c:v",
            "libvpx",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            &self.opts.bitrate,
            "-f",
            "webm",
            "pipe:1",
        ]);
        cmd
    }

    fn kill(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(h) = self.stdout_drain.take() {
            let _ = h.join();
        }
        if let Some(h) = self.stderr_drain.take() {
            let _ = h.join();
        }
        self.cfg = None;
    }
}

impl Default for WebmSink {
    fn default() -> Self {
        Self::new(WebmSinkOpts::default())
    }
}

impl FrameSink for WebmSink {
    #[tracing::instrument(skip_all, fields(width = cfg.width, height = cfg.height))]
    fn begin(&mut self, cfg: SinkConfig) -> SketchreelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(SketchreelError::encode("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SketchreelError::encode(
                "webm sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(SketchreelError::encode(
                "webm sink width/height must be even (required for yuv420p output)",
            ));
        }
        if self.child.is_some() {
            return Err(SketchreelError::encode("webm sink already started"));
        }

        let mut child = self.command(&cfg).spawn().map_err(|e| {
            SketchreelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (Some(stdin), Some(mut stdout), Some(mut stderr)) = (stdin, stdout, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SketchreelError::encode("failed to open ffmpeg pipes"));
        };

        let stdout_drain = std::thread::spawn(move || {
            let mut chunks = Vec::new();
            let mut buf = vec![0u8; STDOUT_CHUNK];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                chunks.push(buf[..n].to_vec());
            }
            Ok(chunks)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; FrameRGBA::byte_len(cfg.width, cfg.height)];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        tracing::debug!("ffmpeg started");
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SketchreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SketchreelError::encode("webm sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(SketchreelError::encode(
                "webm sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(SketchreelError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(SketchreelError::encode(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque(&mut self.scratch, &frame.data, cfg.background);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SketchreelError::encode("webm sink is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            SketchreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> SketchreelResult<EncodedOutput> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| SketchreelError::encode("webm sink not started"))?;

        let status = child.wait().map_err(|e| {
            SketchreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let chunks = match self.stdout_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SketchreelError::encode("ffmpeg stdout drain thread panicked"))?
                .map_err(|e| SketchreelError::encode(format!("ffmpeg stdout read failed: {e}")))?,
            None => Vec::new(),
        };
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SketchreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| SketchreelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SketchreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::debug!(chunks = chunks.len(), "ffmpeg finished");
        Ok(EncodedOutput {
            mime: WEBM_MIME.to_string(),
            chunks,
        })
    }

    fn abort(&mut self) {
        if self.child.is_some() {
            tracing::debug!("killing ffmpeg");
        }
        self.kill();
    }
}

impl Drop for WebmSink {
    fn drop(&mut self) {
        self.kill();
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // `-r` before `-i` sets the rawvideo input rate; rational fps is passed as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_to_opaque(dst: &mut [u8], src_premul: &[u8], bg: Rgba8Premul) {
    let bg = bg.to_array();
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        if s[3] == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let out = premul_over_px(bg, [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
        d[3] = 255;
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when the `ffmpeg` on `PATH` lists the libvpx encoder.
pub fn is_libvpx_available() -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stderr(Stdio::null())
        .output()
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).contains(" libvpx "))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
