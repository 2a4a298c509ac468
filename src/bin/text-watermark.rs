use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use text_watermark::{
    default_output_path, is_supported_image, style, Anchor, Compositor, CompositorConfig,
    FontSource, Session, WatermarkSpec, PREVIEW_SIZE,
};

#[derive(Clone, Copy, ValueEnum)]
enum Position {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Custom,
}

#[derive(Parser)]
#[command(
    name = "text-watermark",
    about = "Overlay a text watermark onto an image",
    version,
    after_help = "Simple usage: text-watermark photo.jpg --text \"(c) me\"  (writes watermarked_image.png next to the input)\n\n\
                  Custom coordinates that are not numbers fall back to centering the text."
)]
struct Cli {
    /// Input image file (PNG, JPEG, GIF or BMP)
    input: PathBuf,

    /// Watermark text
    #[arg(short, long)]
    text: String,

    /// Output file (default: watermarked_image.png next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Opacity percentage (0-100)
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u8).range(0..=100))]
    opacity: u8,

    /// Text color as hex RRGGBB
    #[arg(short, long, default_value = "000000")]
    color: String,

    /// Where to place the text
    #[arg(short, long, value_enum, default_value = "center")]
    position: Position,

    /// Horizontal percentage for --position custom
    #[arg(long, default_value = "50")]
    x: String,

    /// Vertical percentage for --position custom
    #[arg(long, default_value = "50")]
    y: String,

    /// Font file path or file name to look up (default: $TEXT_WATERMARK_FONT, then arial.ttf)
    #[arg(short, long)]
    font: Option<String>,

    /// Also write a preview thumbnail to this path
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        let _ = tracing_subscriber::fmt()
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    let color = match style::parse_hex_color(&cli.color) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let anchor = match cli.position {
        Position::Center => Anchor::Center,
        Position::TopLeft => Anchor::TopLeft,
        Position::TopRight => Anchor::TopRight,
        Position::BottomLeft => Anchor::BottomLeft,
        Position::BottomRight => Anchor::BottomRight,
        Position::Custom => Anchor::custom(&cli.x, &cli.y),
    };

    let config = match &cli.font {
        Some(font) => CompositorConfig::with_font(FontSource::from_arg(font)),
        None => CompositorConfig::from_env(),
    };

    if !cli.input.is_file() {
        eprintln!("Error: Input file does not exist: {}", cli.input.display());
        process::exit(1);
    }
    if !cli.quiet && !is_supported_image(&cli.input) {
        eprintln!(
            "WARNING: {} does not look like a PNG, JPEG, GIF or BMP file; trying anyway",
            cli.input.display()
        );
    }

    let mut session = Session::new(Compositor::new(config));
    session.set_spec(
        WatermarkSpec::new(cli.text.clone())
            .with_color(color)
            .with_opacity(cli.opacity)
            .with_anchor(anchor),
    );

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    match run(&mut session, &cli.input, &output, cli.preview.as_deref()) {
        Ok(written) => {
            if !cli.quiet {
                eprintln!("[OK] {}", written.display());
            }
        }
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", cli.input.display());
            process::exit(1);
        }
    }
}

fn run(
    session: &mut Session,
    input: &Path,
    output: &Path,
    preview: Option<&Path>,
) -> text_watermark::Result<PathBuf> {
    session.load(input)?;
    session.apply()?;
    if let Some(preview_path) = preview {
        if let Some(thumb) = session.preview(PREVIEW_SIZE) {
            text_watermark::save_image(&thumb.to_rgba8(), preview_path)?;
        }
    }
    session.export(output)
}
