use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pinmark::{Annotator, AnnotatorOpts};

#[derive(Parser, Debug)]
#[command(name = "pinmark", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write all annotation outputs for one image.
    Annotate(AnnotateArgs),
    /// Save a JPEG preview of the combined output.
    Preview(PreviewArgs),
    /// List the images under a directory.
    List(ListArgs),
    /// Recommend a sliding-window configuration for a frame count.
    Frames(FramesArgs),
    /// Merge prompts into one string.
    Merge(MergeArgs),
    /// Write one caption `.txt` per image in a directory.
    Tag(TagArgs),
    /// List prompt presets, or print one.
    Presets(PresetsArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Base image, relative to `--input-dir` when that is given.
    #[arg(long)]
    image: PathBuf,

    /// Root directory for `--image`.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Points as a JSON array of `{x, y, color?}`.
    #[arg(long, conflicts_with = "points_file")]
    points: Option<String>,

    /// File containing the points JSON.
    #[arg(long)]
    points_file: Option<PathBuf>,

    /// Overlay as a `data:image/png;base64,...` URI.
    #[arg(long, conflicts_with = "overlay_file")]
    overlay: Option<String>,

    /// Overlay PNG file.
    #[arg(long)]
    overlay_file: Option<PathBuf>,

    /// Annotator options JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Directory to scan.
    #[arg(long)]
    dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Decrease,
    Increase,
}

#[derive(Args, Debug)]
struct FramesArgs {
    /// Frames to cover.
    #[arg(long)]
    total: u32,
    #[arg(long, default_value_t = 61)]
    window_min: u32,
    #[arg(long, default_value_t = 81)]
    window_max: u32,
    #[arg(long, default_value_t = 2)]
    count_min: u32,
    #[arg(long, default_value_t = 5)]
    count_max: u32,
    #[arg(long, default_value_t = 9)]
    overlap: u32,
    #[arg(long, value_enum, default_value_t = ModeArg::Decrease)]
    mode: ModeArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SeparatorArg {
    Comma,
    Period,
    Pipe,
    Newline,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Prompts to merge.
    #[arg(required = true)]
    prompts: Vec<String>,
    #[arg(long, value_enum, default_value_t = SeparatorArg::Pipe)]
    separator: SeparatorArg,
    /// Custom separator, overrides `--separator`.
    #[arg(long, default_value = "")]
    custom_separator: String,
    #[arg(long, default_value_t = false)]
    strip_newlines: bool,
    #[arg(long, default_value_t = false)]
    drop_empty_lines: bool,
    #[arg(long, default_value_t = false)]
    segment_per_input: bool,
}

#[derive(Args, Debug)]
struct TagArgs {
    /// Directory holding the images.
    #[arg(long)]
    dir: PathBuf,
    /// Captions, matched to images in file name order.
    #[arg(required = true)]
    captions: Vec<String>,
    #[arg(long, default_value = "")]
    trigger_word: String,
    #[arg(long, default_value = "")]
    suffix_tags: String,
}

#[derive(Args, Debug)]
struct PresetsArgs {
    /// Preset directory.
    #[arg(long)]
    dir: PathBuf,
    /// Preset to print.
    name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Annotate(args) => cmd_annotate(args),
        Command::Preview(args) => cmd_preview(args),
        Command::List(args) => cmd_list(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Merge(args) => cmd_merge(args),
        Command::Tag(args) => cmd_tag(args),
        Command::Presets(args) => cmd_presets(args),
    }
}

struct Inputs {
    annotator: Annotator,
    image: PathBuf,
    points: String,
    overlay: String,
}

fn load_inputs(args: InputArgs) -> anyhow::Result<Inputs> {
    let opts = match &args.config {
        Some(path) => AnnotatorOpts::from_path(path)?,
        None => AnnotatorOpts::default(),
    };
    let annotator = Annotator::new(opts)?;

    let image = match &args.input_dir {
        Some(root) => pinmark::resolve_input(root, &args.image.to_string_lossy())?,
        None => args.image,
    };

    let points = match (args.points, args.points_file) {
        (Some(p), _) => p,
        (None, Some(f)) => std::fs::read_to_string(&f)
            .with_context(|| format!("read points '{}'", f.display()))?,
        (None, None) => "[]".to_string(),
    };

    let overlay = match (args.overlay, args.overlay_file) {
        (Some(o), _) => o,
        (None, Some(f)) => {
            let bytes =
                std::fs::read(&f).with_context(|| format!("read overlay '{}'", f.display()))?;
            pinmark::png_data_uri(&bytes)
        }
        (None, None) => String::new(),
    };

    Ok(Inputs {
        annotator,
        image,
        points,
        overlay,
    })
}

fn cmd_annotate(args: AnnotateArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(args.input)?;
    tracing::debug!(image = %inputs.image.display(), "annotating");
    let out = inputs
        .annotator
        .render(Some(&inputs.image), &inputs.points, &inputs.overlay)?;

    let dir = &args.out_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;

    save_png(&out.combined, &dir.join("combined.png"))?;
    save_png(&out.mask_to_luma8(), &dir.join("mask.png"))?;
    save_png(&out.overlay_only, &dir.join("overlay_only.png"))?;
    save_png(&out.points_only, &dir.join("points_only.png"))?;
    let points_path = dir.join("points.json");
    std::fs::write(&points_path, &out.points_json)
        .with_context(|| format!("write '{}'", points_path.display()))?;

    eprintln!("wrote {}", dir.display());
    Ok(())
}

fn save_png<P>(img: &image::ImageBuffer<P, Vec<u8>>, path: &Path) -> anyhow::Result<()>
where
    P: image::PixelWithColorType<Subpixel = u8>,
{
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(args.input)?;
    let path = inputs.annotator.save_preview(
        &inputs.image,
        &inputs.points,
        &inputs.overlay,
        &args.out_dir,
    )?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    for name in pinmark::list_input_images(&args.dir) {
        println!("{name}");
    }
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let plan = pinmark::plan_windows(&pinmark::WindowPlanOpts {
        total_frames: args.total,
        window_min: args.window_min,
        window_max: args.window_max,
        count_min: args.count_min,
        count_max: args.count_max,
        overlap: args.overlap,
        mode: match args.mode {
            ModeArg::Decrease => pinmark::RoundingMode::Decrease,
            ModeArg::Increase => pinmark::RoundingMode::Increase,
        },
    })?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let opts = pinmark::MergeOpts {
        separator: match args.separator {
            SeparatorArg::Comma => pinmark::Separator::Comma,
            SeparatorArg::Period => pinmark::Separator::Period,
            SeparatorArg::Pipe => pinmark::Separator::Pipe,
            SeparatorArg::Newline => pinmark::Separator::Newline,
        },
        custom_separator: args.custom_separator,
        strip_newlines: args.strip_newlines,
        drop_empty_lines: args.drop_empty_lines,
        segment_per_input: args.segment_per_input,
    };
    println!("{}", pinmark::merge_prompts(&args.prompts, &opts));
    Ok(())
}

fn cmd_tag(args: TagArgs) -> anyhow::Result<()> {
    let mut saver = pinmark::TagFileSaver::new(pinmark::TagOpts {
        trigger_word: args.trigger_word,
        suffix_tags: args.suffix_tags,
    });
    let outcomes = saver.save_list(&args.dir, &args.captions)?;
    let mut failed = 0usize;
    for o in &outcomes {
        match &o.error {
            None => println!("{}", o.path.display()),
            Some(e) => {
                failed += 1;
                eprintln!("failed {}: {e}", o.path.display());
            }
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} tag files not written", outcomes.len());
    }
    Ok(())
}

fn cmd_presets(args: PresetsArgs) -> anyhow::Result<()> {
    let store = pinmark::PresetStore::new(args.dir);
    match args.name {
        Some(name) => match store.read(&name)? {
            Some(text) => print!("{text}"),
            None => anyhow::bail!("no preset named '{name}'"),
        },
        None => {
            for name in store.names()? {
                println!("{name}");
            }
        }
    }
    Ok(())
}
