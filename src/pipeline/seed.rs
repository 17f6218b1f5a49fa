use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, GenericImageView};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// How the clustering seed is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SeedMode {
    /// Hash of the image content. Identical images give identical palettes.
    #[default]
    Content,
    /// Hash of the absolute image path (or URL).
    Filepath,
    /// Caller-supplied value.
    Manual,
    /// Time and OS entropy. Non-deterministic.
    Random,
}

impl SeedMode {
    pub fn name(self) -> &'static str {
        match self {
            SeedMode::Content => "content",
            SeedMode::Filepath => "filepath",
            SeedMode::Manual => "manual",
            SeedMode::Random => "random",
        }
    }
}

impl FromStr for SeedMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "content" => Ok(SeedMode::Content),
            "filepath" => Ok(SeedMode::Filepath),
            "manual" => Ok(SeedMode::Manual),
            "random" => Ok(SeedMode::Random),
            other => Err(Error::UnknownSeedMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedConfig {
    pub mode: SeedMode,
    /// Only read in manual mode.
    pub value: Option<u64>,
}

impl SeedConfig {
    pub fn manual(value: u64) -> Self {
        Self {
            mode: SeedMode::Manual,
            value: Some(value),
        }
    }

    /// Resolve the configured mode to a concrete seed.
    pub fn resolve(&self, image: Option<&DynamicImage>, path: Option<&Path>) -> Result<u64> {
        match self.mode {
            SeedMode::Content => image.map(content_seed).ok_or(Error::MissingImage),
            SeedMode::Filepath => path.map(path_seed).ok_or(Error::MissingPath),
            SeedMode::Manual => self.value.ok_or(Error::MissingSeedValue),
            SeedMode::Random => Ok(random_seed()),
        }
    }
}

/// SHA-256 over the image dimensions and a sparse pixel grid (about 100x100 points).
pub fn content_seed(image: &DynamicImage) -> u64 {
    let (width, height) = image.dimensions();
    let mut hasher = Sha256::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());

    let step = (width / 100).max(height / 100).max(1) as usize;
    let rgba = image.to_rgba8();
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            hasher.update(rgba.get_pixel(x, y).0);
        }
    }

    seed_from_digest(&hasher.finalize())
}

/// SHA-256 of the absolute path. URLs are hashed verbatim.
pub fn path_seed(path: &Path) -> u64 {
    let raw = path.to_string_lossy();
    let key = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.into_owned()
    } else {
        std::path::absolute(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .to_string_lossy()
            .into_owned()
    };

    let digest = Sha256::digest(key.as_bytes());
    seed_from_digest(&digest)
}

fn random_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    nanos ^ rand::rng().random::<u64>()
}

fn seed_from_digest(digest: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
