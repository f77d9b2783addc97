use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use vecfield::{
    AnimationContext, AnimationProps, AnimationRegistry, BackendKind, BaseShape, Hsla, LineCap,
    ManualClock, Paint, Pipeline, PipelineOpts, SurfaceConfig, UniformGrid, VectorState,
};

#[derive(Parser, Debug)]
#[command(name = "vecfield", version)]
struct Cli {
    /// Log debug output (strategy selection, fallbacks) to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drive a pipeline over a synthetic load profile and report mode switches.
    Simulate(SimulateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct FieldArgs {
    /// Number of primitives.
    #[arg(long, default_value_t = 1200)]
    count: usize,

    /// Animation module id.
    #[arg(long, default_value = "wave")]
    animation: String,

    /// Module props as a JSON object.
    #[arg(long)]
    props: Option<String>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    #[arg(long, value_enum, default_value_t = ShapeChoice::Line)]
    shape: ShapeChoice,

    /// Pipeline options JSON (VECFIELD_* environment overrides apply on top).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[command(flatten)]
    field: FieldArgs,

    /// Frames to simulate.
    #[arg(long, default_value_t = 900)]
    frames: u64,

    #[arg(long, value_enum, default_value_t = Profile::Spike)]
    profile: Profile,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    field: FieldArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write the scene-graph document (scene-graph backend only).
    #[arg(long)]
    svg: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = BackendChoice::SceneGraph)]
    backend: BackendChoice,

    /// Frame index on a 60 fps timeline.
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Draw the diagnostics overlay.
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    SceneGraph,
    Raster,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeChoice {
    Line,
    Arrow,
    Triangle,
    Curve,
    Dot,
}

/// Synthetic per-frame cost, in milliseconds of simulated time.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Profile {
    /// 60 fps throughout.
    Steady,
    /// 60 fps with a stall at 18 fps through the middle third.
    Spike,
    /// Cost grows linearly from 60 fps to 15 fps.
    Ramp,
}

impl Profile {
    fn frame_ms(self, frame: u64, frames: u64) -> f64 {
        let fast = 1000.0 / 60.0;
        match self {
            Profile::Steady => fast,
            Profile::Spike => {
                let third = frames / 3;
                if (third..2 * third).contains(&frame) {
                    1000.0 / 18.0
                } else {
                    fast
                }
            }
            Profile::Ramp => {
                let t = frame as f64 / frames.max(1) as f64;
                fast + t * (1000.0 / 15.0 - fast)
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn load_opts(path: Option<&Path>) -> anyhow::Result<PipelineOpts> {
    let opts = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("read config '{}'", p.display()))?;
            PipelineOpts::from_json_str(&text)
                .with_context(|| format!("parse config '{}'", p.display()))?
        }
        None => PipelineOpts::default(),
    };
    Ok(opts.with_env_overrides()?)
}

fn parse_props(raw: Option<&str>) -> anyhow::Result<AnimationProps> {
    match raw {
        Some(s) => serde_json::from_str(s).with_context(|| "parse --props as a JSON object"),
        None => Ok(AnimationProps::new()),
    }
}

fn build_field(args: &FieldArgs) -> (SurfaceConfig, Vec<VectorState>) {
    let shape = match args.shape {
        ShapeChoice::Line => BaseShape::Line,
        ShapeChoice::Arrow => BaseShape::Arrow,
        ShapeChoice::Triangle => BaseShape::Triangle,
        ShapeChoice::Curve => BaseShape::Curve,
        ShapeChoice::Dot => BaseShape::Dot,
    };
    let surface = SurfaceConfig::new(args.width, args.height)
        .with_shape(shape)
        .with_cap(LineCap::Round);
    let grid = UniformGrid::with_count(args.count, f64::from(args.width), f64::from(args.height));
    let n = args.count.max(1) as f32;
    let vectors = grid
        .build_n(args.count)
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.with_paint(Paint::Hsl(Hsla::new(360.0 * i as f32 / n, 0.7, 0.6, 1.0))))
        .collect();
    (surface, vectors)
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let opts = load_opts(args.field.config.as_deref())?;
    let props = parse_props(args.field.props.as_deref())?;
    let (surface, vectors) = build_field(&args.field);

    let clock = ManualClock::new();
    let mut pipeline =
        Pipeline::new(AnimationRegistry::with_builtins(), opts)?.with_clock(clock.clone());

    let mut switches = 0u64;
    let mut frames_on: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut quality_frames: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut faults = 0u64;
    let mut last_fps = None;

    for frame in 0..args.frames {
        clock.advance_ms(args.profile.frame_ms(frame, args.frames));
        let ctx = AnimationContext::new(f64::from(args.field.width), f64::from(args.field.height))
            .at_frame(frame, 60.0);
        let report = pipeline
            .render(&vectors, &args.field.animation, &props, &ctx, &surface, false)
            .with_context(|| format!("render frame {frame}"))?;

        if report.switched {
            switches += 1;
            if !args.json {
                println!(
                    "frame {:>5}: -> {} at {} ({})",
                    report.frame, report.backend, report.quality, report.reason
                );
            }
        }
        if report.animation_fault.is_some() {
            faults += 1;
        }
        *frames_on.entry(report.backend.name()).or_default() += 1;
        *quality_frames.entry(report.quality.name()).or_default() += 1;
        last_fps = report.fps;
    }

    let summary = serde_json::json!({
        "frames": args.frames,
        "primitives": vectors.len(),
        "animation": args.field.animation,
        "switches": switches,
        "frames_per_backend": frames_on,
        "frames_per_quality": quality_frames,
        "animation_faults": faults,
        "final_backend": pipeline.active_backend().name(),
        "final_fps": last_fps,
    });
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} frames, {} switches, final backend {}, final fps {}",
            args.frames,
            switches,
            pipeline.active_backend(),
            last_fps.map_or_else(|| "--".to_owned(), |f| format!("{f:.1}"))
        );
        for (backend, n) in &frames_on {
            println!("  {backend}: {n} frames");
        }
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let opts = load_opts(args.field.config.as_deref())?;
    let props = parse_props(args.field.props.as_deref())?;
    let (surface, vectors) = build_field(&args.field);

    let backend = match args.backend {
        BackendChoice::SceneGraph => BackendKind::SceneGraph,
        BackendChoice::Raster => BackendKind::Raster,
    };
    if args.svg.is_some() && backend != BackendKind::SceneGraph {
        anyhow::bail!("--svg needs --backend scene-graph");
    }

    let mut pipeline = Pipeline::new(AnimationRegistry::with_builtins(), opts)?;
    pipeline.force_backend(Some(backend));
    let ctx = AnimationContext::new(f64::from(args.field.width), f64::from(args.field.height))
        .at_frame(args.frame, 60.0);
    let report = pipeline.render(
        &vectors,
        &args.field.animation,
        &props,
        &ctx,
        &surface,
        args.debug,
    )?;
    if let Some(fault) = &report.animation_fault {
        eprintln!("warning: {fault}");
    }

    let frame = pipeline.read_frame()?;
    write_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_alpha(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if let Some(svg_path) = &args.svg {
        let svg = pipeline
            .scene_svg()
            .context("scene graph produced no document")?;
        write_parent_dir(svg_path)?;
        std::fs::write(svg_path, svg)
            .with_context(|| format!("write svg '{}'", svg_path.display()))?;
        eprintln!("wrote {}", svg_path.display());
    }
    Ok(())
}

fn write_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
