use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};

use crate::pipeline::extract::Algorithm;
use crate::pipeline::seed::{SeedConfig, SeedMode};
use crate::role::Role;
use crate::theme::{CategorizationConfig, ThemeType};

/// Extract a color palette from an image and assign each color a UI role.
#[derive(Parser, Debug)]
#[command(name = "tinct", version, about)]
pub struct Args {
    /// Path to the input image
    #[arg(required_unless_present = "color")]
    pub image: Option<PathBuf>,

    /// Categorize these hex colors instead of extracting from an image
    #[arg(short, long, value_name = "HEX", conflicts_with = "image")]
    pub color: Vec<String>,

    /// Force dark or light theme (auto-detected if omitted)
    #[arg(short, long, value_enum, default_value_t = ThemeType::Auto)]
    pub mode: ThemeType,

    /// Number of colors to extract
    #[arg(short = 'k', long = "colors", default_value_t = 16)]
    pub count: usize,

    /// Clustering algorithm: kmeans or hamerly
    #[arg(long, default_value = "kmeans")]
    pub algorithm: Algorithm,

    /// How the clustering seed is derived
    #[arg(long, value_enum, default_value_t = SeedMode::Content)]
    pub seed_mode: SeedMode,

    /// Seed for --seed-mode manual
    #[arg(long)]
    pub seed_value: Option<u64>,

    /// Minimum foreground contrast ratio against background
    #[arg(long, default_value_t = 4.5)]
    pub min_contrast: f32,

    /// Require WCAG AAA (7:1) foreground contrast
    #[arg(long)]
    pub aaa: bool,

    /// Lightness shift for muted variants
    #[arg(long, default_value_t = 0.15)]
    pub muted_adjust: f32,

    /// Use semantic colors found in the palette as-is
    #[arg(long)]
    pub no_semantic_enhance: bool,

    /// Relative saturation boost for semantic colors
    #[arg(long, default_value_t = 0.3)]
    pub semantic_boost: f32,

    /// Force a palette color into a role, e.g. `background=0` (repeatable)
    #[arg(long, value_name = "ROLE=INDEX", value_parser = parse_hint)]
    pub hint: Vec<RoleHint>,

    /// Print the categorized palette as JSON
    #[arg(long)]
    pub json: bool,

    /// Print a table of every color with terminal swatches
    #[arg(long)]
    pub preview: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// A `role=index` pair from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleHint {
    pub role: Role,
    pub index: usize,
}

fn parse_hint(s: &str) -> Result<RoleHint> {
    let (role, index) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected ROLE=INDEX, got {s:?}"))?;
    let role = role.trim().parse::<Role>()?;
    let index = index
        .trim()
        .parse::<usize>()
        .with_context(|| format!("invalid color index in hint {s:?}"))?;
    Ok(RoleHint { role, index })
}

impl Args {
    pub fn categorization_config(&self) -> CategorizationConfig {
        CategorizationConfig {
            theme_type: self.mode,
            min_contrast_ratio: self.min_contrast,
            require_aaa: self.aaa,
            muted_luminance_adjust: self.muted_adjust,
            enhance_semantic_colors: !self.no_semantic_enhance,
            semantic_boost_amount: self.semantic_boost,
        }
    }

    pub fn seed_config(&self) -> SeedConfig {
        SeedConfig {
            mode: self.seed_mode,
            value: self.seed_value,
        }
    }

    /// Hints keyed by role. A repeated role keeps its last index.
    pub fn role_hints(&self) -> BTreeMap<Role, usize> {
        self.hint.iter().map(|h| (h.role, h.index)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tinct").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&["wallpaper.png"]);
        assert_eq!(args.image, Some(PathBuf::from("wallpaper.png")));
        assert_eq!(args.count, 16);
        assert_eq!(args.algorithm, Algorithm::KMeans);
        assert_eq!(args.categorization_config(), CategorizationConfig::default());
        assert_eq!(args.seed_config(), SeedConfig::default());
    }

    #[test]
    fn flags_map_onto_config() {
        let args = parse(&[
            "img.png",
            "--mode",
            "light",
            "--aaa",
            "--no-semantic-enhance",
            "--seed-mode",
            "manual",
            "--seed-value",
            "7",
            "--algorithm",
            "hamerly",
        ]);
        let config = args.categorization_config();
        assert_eq!(config.theme_type, ThemeType::Light);
        assert!(config.require_aaa);
        assert!(!config.enhance_semantic_colors);
        assert_eq!(args.seed_config(), SeedConfig::manual(7));
        assert_eq!(args.algorithm, Algorithm::Hamerly);
    }

    #[test]
    fn hex_colors_replace_image() {
        let args = parse(&["--color", "#101018", "-c", "e0e0e8"]);
        assert_eq!(args.image, None);
        assert_eq!(args.color, vec!["#101018", "e0e0e8"]);
    }

    #[test]
    fn image_or_colors_required() {
        assert!(Args::try_parse_from(["tinct"]).is_err());
    }

    #[test]
    fn hints_parse() {
        let args = parse(&["-c", "#000000", "--hint", "background=0", "--hint", "accent1 = 3"]);
        let hints = args.role_hints();
        assert_eq!(hints[&Role::Background], 0);
        assert_eq!(hints[&Role::Accent1], 3);
    }

    #[test]
    fn bad_hints_are_rejected() {
        assert!(parse_hint("background").is_err());
        assert!(parse_hint("accent9=1").is_err());
        assert!(parse_hint("background=-1").is_err());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        assert!(Args::try_parse_from(["tinct", "img.png", "--algorithm", "octree"]).is_err());
    }
}
