use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Input errors raised by color extraction and seed resolution.
///
/// Categorization never fails: degenerate palettes are handled by the
/// synthetic generation paths instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("color count must be between 1 and 256, got {0}")]
    InvalidColorCount(usize),

    #[error("unknown algorithm: {0} (valid algorithms: kmeans, hamerly)")]
    UnknownAlgorithm(String),

    #[error("image has no pixels")]
    EmptyImage,

    #[error("no pixels found in sample set")]
    EmptySample,

    #[error("invalid seed mode: {0} (valid: content, filepath, manual, random)")]
    UnknownSeedMode(String),

    #[error("seed value is required for manual seed mode")]
    MissingSeedValue,

    #[error("image is required for content-based seed mode")]
    MissingImage,

    #[error("image path is required for filepath-based seed mode")]
    MissingPath,
}
