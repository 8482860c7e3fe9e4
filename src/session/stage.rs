use std::time::Duration;

use crate::foundation::error::SketchreelResult;
use crate::render::surface::Surface;
use crate::session::capture::{CaptureSession, VideoArtifact};
use crate::session::clock::StepScheduler;
use crate::session::progress::ProgressReporter;

/// Everything a renderer paints through: the surface, the recording, step pacing and progress.
///
/// Renderers borrow the stage mutably for the whole reveal; nothing else touches the surface or
/// session meanwhile.
#[derive(Debug)]
pub struct Stage<'p> {
    surface: Surface,
    session: CaptureSession,
    scheduler: StepScheduler,
    progress: ProgressReporter<'p>,
    interval: Duration,
}

impl<'p> Stage<'p> {
    /// Start `session` and wrap it. If starting fails, nothing is left recording.
    pub fn begin(
        surface: Surface,
        mut session: CaptureSession,
        scheduler: StepScheduler,
        progress: ProgressReporter<'p>,
    ) -> SketchreelResult<Self> {
        session.start()?;
        let interval = session.config().fps.frame_interval();
        Ok(Self {
            surface,
            session,
            scheduler,
            progress,
            interval,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Duration of one animation step.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Present the current surface for one step.
    pub fn present_step(&mut self) -> SketchreelResult<()> {
        self.present(self.interval)
    }

    /// Present the current surface for `hold`, then wait that long.
    pub fn present(&mut self, hold: Duration) -> SketchreelResult<()> {
        self.session.capture(self.surface.frame(), hold)?;
        self.scheduler.wait(hold);
        Ok(())
    }

    pub fn report(&mut self, percent: f64) {
        self.progress.report(percent);
    }

    /// Report completion and finalize the recording. Returns the artifact and the final surface.
    pub fn finish(mut self) -> SketchreelResult<(VideoArtifact, Surface)> {
        self.progress.finish();
        let artifact = self.session.stop()?;
        Ok((artifact, self.surface))
    }

    /// Discard the recording.
    pub fn abort(mut self) {
        self.session.abort();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/stage.rs"]
mod tests;
