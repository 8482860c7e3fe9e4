use anyhow::Context as _;

use crate::assets::decode::{decode_image, parse_svg};
use crate::assets::font::FontFace;
use crate::assets::svg_raster::{DEFAULT_CURSOR_SVG, rasterize_svg};
use crate::encode::ffmpeg::WebmSink;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::SketchreelResult;
use crate::job::{JobContent, RevealJob};
use crate::render::surface::Surface;
use crate::reveal::block::BlockRevealRenderer;
use crate::reveal::grid::{BlockId, GridModel};
use crate::reveal::plan::{Direction, RevealPlan};
use crate::session::capture::{CaptureSession, VideoArtifact};
use crate::session::clock::{Clock, StepScheduler, VirtualClock};
use crate::session::progress::ProgressReporter;
use crate::session::stage::Stage;
use crate::text::face::GlyphFace;
use crate::text::stroke::{TextStrokeRenderer, TextStyle};

/// Runs one validated job end to end: assets, capture session, renderer, artifact.
///
/// Defaults: [`WebmSink`] output and a [`VirtualClock`] (renders as fast as possible).
pub struct RevealPipeline {
    job: RevealJob,
    sink: Option<Box<dyn FrameSink>>,
    clock: Option<Box<dyn Clock>>,
    face: Option<Box<dyn GlyphFace>>,
    cursor: Option<Surface>,
}

impl std::fmt::Debug for RevealPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealPipeline")
            .field("job", &self.job)
            .field("custom_sink", &self.sink.is_some())
            .field("custom_clock", &self.clock.is_some())
            .field("custom_face", &self.face.is_some())
            .finish_non_exhaustive()
    }
}

/// Content resolved before recording starts.
enum Prepared {
    Image {
        grid: GridModel,
        image: Surface,
        plan: RevealPlan<BlockId>,
        direction: Direction,
    },
    Text {
        text: String,
        style: TextStyle,
        face: Box<dyn GlyphFace>,
        cursor: Option<Surface>,
    },
}

impl RevealPipeline {
    pub fn new(job: RevealJob) -> Self {
        Self {
            job,
            sink: None,
            clock: None,
            face: None,
            cursor: None,
        }
    }

    pub fn sink(mut self, sink: impl FrameSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Use `face` instead of loading the job's font.
    pub fn face(mut self, face: impl GlyphFace + 'static) -> Self {
        self.face = Some(Box::new(face));
        self
    }

    /// Use an already rasterized cursor instead of the job's SVG.
    pub fn cursor(mut self, cursor: Surface) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn job(&self) -> &RevealJob {
        &self.job
    }

    /// Render the reveal and return the recording. `progress` receives 0 to 100, ending at 100.
    #[tracing::instrument(skip_all, fields(kind = ?self.job.kind(), fps = self.job.fps.num))]
    pub fn run(self, progress: impl FnMut(f64)) -> SketchreelResult<VideoArtifact> {
        let RevealPipeline {
            job,
            sink,
            clock,
            face,
            cursor,
        } = self;

        let prepared = prepare(&job, face, cursor)?;

        let bg = job.background.to_rgba8_premul();
        let surface = Surface::filled(job.canvas.width, job.canvas.height, bg)?;
        let cfg = SinkConfig {
            width: job.canvas.width,
            height: job.canvas.height,
            fps: job.fps,
            background: bg,
        };
        let sink = sink.unwrap_or_else(|| Box::new(WebmSink::default()));
        let clock = clock.unwrap_or_else(|| Box::new(VirtualClock::new()));

        tracing::info!(
            width = cfg.width,
            height = cfg.height,
            "reveal started"
        );
        let mut stage = Stage::begin(
            surface,
            CaptureSession::new(sink, cfg),
            StepScheduler::new(clock),
            ProgressReporter::new(progress),
        )?;

        if let Err(e) = render(prepared, &job, &mut stage).and_then(|()| stage.present(job.tail)) {
            tracing::warn!(error = %e, "reveal failed, aborting capture");
            stage.abort();
            return Err(e);
        }

        let (artifact, _) = stage.finish()?;
        tracing::info!(
            frames = artifact.frame_count,
            bytes = artifact.bytes.len(),
            duration_ms = artifact.duration.as_millis() as u64,
            "reveal finished"
        );
        Ok(artifact)
    }
}

fn prepare(
    job: &RevealJob,
    face: Option<Box<dyn GlyphFace>>,
    cursor: Option<Surface>,
) -> SketchreelResult<Prepared> {
    match &job.content {
        JobContent::Image {
            source,
            rows,
            cols,
            selection,
            direction,
        } => {
            let bytes = source.load()?;
            let mut image = decode_image(&bytes)?;
            image.flatten_over(job.background.to_rgba8_premul());
            let grid = GridModel::new(image.width(), image.height(), *rows, *cols, job.canvas)?;
            let plan = RevealPlan::for_grid(&grid, selection);
            Ok(Prepared::Image {
                grid,
                image,
                plan,
                direction: *direction,
            })
        }
        JobContent::Text { text, style } => {
            let face: Box<dyn GlyphFace> = match face {
                Some(f) => f,
                None => Box::new(load_face(style)?),
            };
            let cursor = match (style.show_cursor, cursor) {
                (false, _) => None,
                (true, Some(c)) => Some(c),
                (true, None) => Some(load_cursor(style)?),
            };
            Ok(Prepared::Text {
                text: text.clone(),
                style: style.clone(),
                face,
                cursor,
            })
        }
    }
}

fn render(prepared: Prepared, job: &RevealJob, stage: &mut Stage<'_>) -> SketchreelResult<()> {
    match prepared {
        Prepared::Image {
            grid,
            image,
            plan,
            direction,
        } => {
            let renderer = BlockRevealRenderer::new(&grid, &image, direction)?;
            renderer.run(&plan, stage)
        }
        Prepared::Text {
            text,
            style,
            mut face,
            cursor,
        } => {
            let mut renderer = TextStrokeRenderer::new(
                face.as_mut(),
                &text,
                &style,
                job.canvas,
                job.background.to_rgba8_premul(),
                cursor,
            )?;
            let plan = renderer.plan();
            renderer.run(&plan, stage)
        }
    }
}

fn load_face(style: &TextStyle) -> SketchreelResult<FontFace> {
    match &style.font_path {
        Some(p) => FontFace::from_file(p, style.font_size),
        None => FontFace::from_system(&style.font_family, style.font_size),
    }
}

/// Rasterize the job's cursor SVG (or the built-in pen) at `cursor_size`.
pub fn load_cursor(style: &TextStyle) -> SketchreelResult<Surface> {
    let tree = match &style.cursor_path {
        Some(p) => {
            let bytes =
                std::fs::read(p).with_context(|| format!("read cursor '{}'", p.display()))?;
            parse_svg(&bytes)?
        }
        None => parse_svg(DEFAULT_CURSOR_SVG.as_bytes())?,
    };
    rasterize_svg(&tree, style.cursor_size, style.cursor_size)
}
