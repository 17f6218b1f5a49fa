use tracing::debug;

use crate::color::{hue_distance, Color};
use crate::pipeline::contrast::{search_lightness, ContrastSearch, DEFAULT_STEP};
use crate::theme::{CategorizedColor, ThemeType};

/// Number of accent roles.
pub const ACCENT_COUNT: usize = 4;

/// Minimum accent/background contrast (WCAG AA large text).
pub const MIN_ACCENT_CONTRAST: f32 = 3.0;

/// Luminance difference under which two colors read as identical.
const MAX_SIMILARITY: f32 = 0.05;
/// Fraction of similar colors above which a candidate set is discarded.
const SIMILAR_FRACTION: f32 = 0.75;
/// Candidates re-ordered by luminance after scoring.
const TOP_CANDIDATES: usize = 12;

/// Analogous, complementary, then the two triadic hues.
const SYNTHETIC_HUE_OFFSETS: [f32; ACCENT_COUNT] = [30.0, 180.0, 120.0, 240.0];
const SYNTHETIC_MIN_SATURATION: f32 = 0.6;
const SYNTHETIC_DARK_MAX_SATURATION: f32 = 0.7;
const SYNTHETIC_MAX_ATTEMPTS: usize = 10;

/// Desirability of `accent` next to the background and foreground.
///
/// Rewards hue and saturation close to the background (analogous harmony),
/// contrast against both, and strong saturation.
pub fn score_accent(
    accent: &CategorizedColor,
    background: &CategorizedColor,
    foreground: &CategorizedColor,
) -> f32 {
    let mut score = 0.0;

    score += 3.0 * (1.0 - hue_distance(accent.hue, background.hue) / 180.0);
    score += 2.0 * (1.0 - (accent.saturation - background.saturation).abs());

    let bg_contrast = accent.contrast_with(background);
    if bg_contrast >= 4.5 {
        score += 2.0;
    } else if bg_contrast >= MIN_ACCENT_CONTRAST {
        score += 1.0;
    }

    let fg_contrast = accent.contrast_with(foreground);
    if fg_contrast >= 3.0 {
        score += 1.5;
    } else if fg_contrast >= 2.0 {
        score += 0.75;
    }

    if accent.saturation >= 0.4 {
        score += 1.5 * accent.saturation;
    }

    score
}

/// Order candidates by descending score, then put the best twelve in luminance
/// order: lightest first on dark themes, darkest first on light themes, so
/// `accent1` always has the most contrast. Both sorts are stable.
pub fn sort_accents(
    candidates: &mut [CategorizedColor],
    background: &CategorizedColor,
    foreground: &CategorizedColor,
    theme: ThemeType,
) {
    let mut scored: Vec<(f32, CategorizedColor)> = candidates
        .iter()
        .map(|c| (score_accent(c, background, foreground), *c))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (slot, (_, color)) in candidates.iter_mut().zip(scored) {
        *slot = color;
    }

    let top = candidates.len().min(TOP_CANDIDATES);
    if theme.is_dark() {
        candidates[..top].sort_by(|a, b| b.luminance.total_cmp(&a.luminance));
    } else {
        candidates[..top].sort_by(|a, b| a.luminance.total_cmp(&b.luminance));
    }
}

/// True when the candidates cannot give four distinguishable accents: too few
/// of them, most blend into the background, or most neighbors look the same.
pub fn lacks_diversity(candidates: &[CategorizedColor], background: &CategorizedColor) -> bool {
    if candidates.len() < ACCENT_COUNT {
        return true;
    }

    let like_background = candidates
        .iter()
        .filter(|c| {
            (c.luminance - background.luminance).abs() < MAX_SIMILARITY
                || c.contrast_with(background) < MIN_ACCENT_CONTRAST
        })
        .count();
    if like_background as f32 / candidates.len() as f32 > SIMILAR_FRACTION {
        return true;
    }

    let similar_pairs = candidates
        .windows(2)
        .filter(|pair| (pair[0].luminance - pair[1].luminance).abs() < MAX_SIMILARITY)
        .count();
    similar_pairs as f32 / (candidates.len() - 1) as f32 > SIMILAR_FRACTION
}

/// Four accents built from the background hue when the palette lacks them.
///
/// Lightness steps away from the background (further for earlier accents) and
/// each accent is pushed until it clears 3:1 against the background.
pub fn synthesize_accents(background: &CategorizedColor, theme: ThemeType) -> Vec<CategorizedColor> {
    let (hue, saturation, lightness) = background.hsl();

    let mut saturation = saturation.max(SYNTHETIC_MIN_SATURATION);
    if theme.is_dark() {
        saturation = saturation.min(SYNTHETIC_DARK_MAX_SATURATION);
    }

    SYNTHETIC_HUE_OFFSETS
        .iter()
        .enumerate()
        .map(|(i, offset)| {
            let distance = 0.50 - 0.08 * i as f32;
            let start = if theme.is_dark() {
                lightness + distance
            } else {
                lightness - distance
            };

            let outcome = search_lightness(
                ContrastSearch {
                    hue: (hue + offset).rem_euclid(360.0),
                    saturation,
                    lightness: start.clamp(0.15, 0.85),
                    target: MIN_ACCENT_CONTRAST,
                    theme,
                    step: DEFAULT_STEP,
                    max_attempts: SYNTHETIC_MAX_ATTEMPTS,
                },
                &background.color,
            );
            CategorizedColor::generated(outcome.color)
        })
        .collect()
}

/// Sort the candidates, or replace them with synthesized accents when they
/// lack diversity.
pub fn collect_accents(
    mut candidates: Vec<CategorizedColor>,
    background: &CategorizedColor,
    foreground: &CategorizedColor,
    theme: ThemeType,
) -> Vec<CategorizedColor> {
    sort_accents(&mut candidates, background, foreground, theme);

    if lacks_diversity(&candidates, background) {
        debug!(
            candidates = candidates.len(),
            "accent candidates lack diversity, synthesizing"
        );
        return synthesize_accents(background, theme);
    }

    debug!(
        candidates = candidates.len(),
        accents = %candidates
            .iter()
            .take(ACCENT_COUNT)
            .map(|c| c.color.to_hex())
            .collect::<Vec<_>>()
            .join(" "),
        "accents selected"
    );
    candidates
}
