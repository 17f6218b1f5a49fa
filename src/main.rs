use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tinct::cli::Args;
use tinct::color::Color;
use tinct::pipeline::extract::{load_image, Extractor};
use tinct::theme::Palette;
use tinct::{categorize, preview};

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let palette = match &args.image {
        Some(path) if args.color.is_empty() => extract_palette(&args, path)?,
        _ => parse_colors(&args.color)?,
    }
    .with_role_hints(args.role_hints());

    let categorized = categorize(&palette, &args.categorization_config());

    if args.json {
        println!("{}", categorized.to_json()?);
        return Ok(());
    }

    print!("{}", preview::summary(&categorized));
    if args.preview {
        println!();
        print!("{}", preview::table(&categorized, true));
    }
    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tinct={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn extract_palette(args: &Args, path: &Path) -> Result<Palette> {
    let image = load_image(path)?;
    let seed = args
        .seed_config()
        .resolve(Some(&image), Some(path))
        .context("failed to resolve clustering seed")?;

    let extractor = Extractor::new(args.algorithm);
    let colors = extractor
        .extract_image(&image, args.count, seed)
        .with_context(|| format!("failed to extract colors from {}", path.display()))?;
    info!(
        colors = colors.len(),
        seed,
        algorithm = args.algorithm.name(),
        "extracted palette"
    );

    Ok(Palette::from_extracted(&colors))
}

fn parse_colors(hex: &[String]) -> Result<Palette> {
    let colors = hex
        .iter()
        .map(|h| Color::from_hex(h).with_context(|| format!("invalid color {h:?}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(Palette::new(colors))
}
