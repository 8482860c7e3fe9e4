use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sketchreel::{
    ColorDef, Direction, InMemorySink, LastFrameSink, RealtimeClock, RevealPipeline,
    RevealRequest, SentencePause, TextStyle,
};

#[derive(Parser, Debug)]
#[command(name = "sketchreel", version, about = "Hand-drawn reveal videos from images and text")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reveal an image block by block.
    Image(ImageArgs),
    /// Write text character by character.
    Text(TextArgs),
    /// Run a JSON job file.
    Job(JobArgs),
    /// Render a JSON job file and save only its final frame as PNG.
    Still(StillArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Frame width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Background color (`#rrggbb`, `rgb()`, or a color name).
    #[arg(long)]
    background: Option<String>,

    /// Idle time after the last step, in milliseconds.
    #[arg(long)]
    tail_ms: Option<u64>,

    /// Output WebM path.
    #[arg(long, default_value = "reveal.webm")]
    out: PathBuf,

    /// Pace steps in wall-clock time instead of rendering as fast as possible.
    #[arg(long, default_value_t = false)]
    realtime: bool,

    /// Render without ffmpeg and without writing output.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct ImageArgs {
    /// Input image (PNG, JPEG, BMP, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, default_value_t = 1)]
    rows: u32,

    #[arg(long, default_value_t = 1)]
    cols: u32,

    /// Blocks to draw first, in order (`row-col`, repeatable).
    #[arg(long = "select")]
    selection: Vec<String>,

    #[arg(long, value_enum, default_value_t = Direction::TopToBottom)]
    direction: Direction,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct TextArgs {
    /// Text to write.
    #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
    text: Option<String>,

    /// Read the text from a file.
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Font file; overrides `--font-family`.
    #[arg(long)]
    font: Option<PathBuf>,

    /// System font family.
    #[arg(long)]
    font_family: Option<String>,

    #[arg(long)]
    font_size: Option<f32>,

    #[arg(long)]
    line_height: Option<f64>,

    /// Text color.
    #[arg(long)]
    color: Option<String>,

    /// SVG cursor replacing the built-in pen.
    #[arg(long)]
    cursor: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    no_cursor: bool,

    /// Do not pause after sentences.
    #[arg(long, default_value_t = false)]
    no_pause: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct JobArgs {
    /// Input job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct StillArgs {
    /// Input job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Image(args) => cmd_image(args),
        Command::Text(args) => cmd_text(args),
        Command::Job(args) => cmd_job(args),
        Command::Still(args) => cmd_still(args),
    }
}

fn parse_color(s: &str) -> anyhow::Result<ColorDef> {
    Ok(s.parse::<ColorDef>()?)
}

fn apply_output(req: &mut RevealRequest, out: &OutputArgs) -> anyhow::Result<()> {
    if out.fps.is_some() {
        req.fps = out.fps;
    }
    if out.width.is_some() {
        req.frame_width = out.width;
    }
    if out.height.is_some() {
        req.frame_height = out.height;
    }
    if let Some(bg) = &out.background {
        req.background = Some(parse_color(bg)?);
    }
    if out.tail_ms.is_some() {
        req.tail_ms = out.tail_ms;
    }
    Ok(())
}

fn cmd_image(args: ImageArgs) -> anyhow::Result<()> {
    let mut req = RevealRequest::image_file(&args.in_path);
    req.rows = Some(args.rows);
    req.cols = Some(args.cols);
    req.selection = args.selection;
    req.direction = args.direction;
    apply_output(&mut req, &args.output)?;
    run(req, &args.output)
}

fn cmd_text(args: TextArgs) -> anyhow::Result<()> {
    let text = match (args.text, &args.text_file) {
        (Some(t), _) => t,
        (None, Some(p)) => std::fs::read_to_string(p)
            .with_context(|| format!("read text file '{}'", p.display()))?,
        (None, None) => anyhow::bail!("either --text or --text-file is required"),
    };

    let mut style = TextStyle::default();
    if let Some(f) = args.font {
        style.font_path = Some(f);
    }
    if let Some(f) = args.font_family {
        style.font_family = f;
    }
    if let Some(s) = args.font_size {
        style.font_size = s;
    }
    if let Some(l) = args.line_height {
        style.line_height = l;
    }
    if let Some(c) = &args.color {
        style.color = parse_color(c)?;
    }
    style.cursor_path = args.cursor;
    style.show_cursor = !args.no_cursor;
    if args.no_pause {
        style.sentence_pause = SentencePause::disabled();
    }

    let mut req = RevealRequest::text(text);
    req.text_style = Some(style);
    apply_output(&mut req, &args.output)?;
    run(req, &args.output)
}

fn cmd_job(args: JobArgs) -> anyhow::Result<()> {
    let mut req = RevealRequest::from_json_file(&args.in_path)?;
    apply_output(&mut req, &args.output)?;
    run(req, &args.output)
}

fn run(req: RevealRequest, out: &OutputArgs) -> anyhow::Result<()> {
    let job = req.validate()?;
    let mut pipeline = RevealPipeline::new(job);
    if out.dry_run {
        pipeline = pipeline.sink(InMemorySink::new());
    }
    if out.realtime {
        pipeline = pipeline.clock(RealtimeClock::new());
    }

    let mut artifact = pipeline.run(print_progress)?;
    eprintln!();

    if out.dry_run {
        eprintln!(
            "dry run: {} frames, {:.3}s",
            artifact.frame_count,
            artifact.duration.as_secs_f64()
        );
        return Ok(());
    }

    let path = artifact.save(&out.out)?;
    eprintln!(
        "wrote {} ({} frames, {:.3}s)",
        path.display(),
        artifact.frame_count,
        artifact.duration.as_secs_f64()
    );
    if let Some(url) = artifact.file_url() {
        println!("{url}");
    }
    Ok(())
}

fn cmd_still(args: StillArgs) -> anyhow::Result<()> {
    let mut req = RevealRequest::from_json_file(&args.in_path)?;
    req.tail_ms = Some(0);
    let job = req.validate()?;

    let (sink, last) = LastFrameSink::new();
    RevealPipeline::new(job).sink(sink).run(|_| {})?;
    let frame = last.get().context("reveal produced no frames")?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let rgba = unpremultiply(&frame.data);
    image::save_buffer_with_format(
        &args.out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn unpremultiply(premul: &[u8]) -> Vec<u8> {
    let mut out = premul.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

fn print_progress(p: f64) {
    let mut err = std::io::stderr().lock();
    let _ = write!(err, "\rprogress {p:5.1}%");
    let _ = err.flush();
}
