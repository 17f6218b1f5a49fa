use tracing::debug;

use crate::pipeline::contrast::{search_lightness, ContrastSearch, DEFAULT_STEP};
use crate::theme::{CategorizedColor, ThemeType};

const SYNTHETIC_SATURATION_FACTOR: f32 = 0.7;
const SYNTHETIC_MAX_ATTEMPTS: usize = 20;

/// Pick the foreground among `candidates` (the background already excluded).
///
/// Prefers the highest contrast that meets `min_contrast`, otherwise the highest
/// contrast overall. Ties go to the earlier candidate. `None` only when there
/// are no candidates.
pub fn select_foreground(
    candidates: &[CategorizedColor],
    background: &CategorizedColor,
    min_contrast: f32,
) -> Option<usize> {
    let contrasts: Vec<f32> = candidates
        .iter()
        .map(|c| c.contrast_with(background))
        .collect();

    let best = |filter: &dyn Fn(f32) -> bool| {
        let mut best: Option<(usize, f32)> = None;
        for (i, &contrast) in contrasts.iter().enumerate() {
            if !filter(contrast) {
                continue;
            }
            match best {
                Some((_, b)) if contrast <= b => {}
                _ => best = Some((i, contrast)),
            }
        }
        best
    };

    let (index, contrast) = best(&|c| c >= min_contrast).or_else(|| best(&|_| true))?;
    debug!(
        index,
        contrast,
        meets_minimum = contrast >= min_contrast,
        "selected foreground"
    );
    Some(index)
}

/// Synthesize a foreground when the palette has nothing but the background.
///
/// Keeps the background hue at reduced saturation and starts from the opposite
/// lightness extreme, then steps further out until `min_contrast` is reached.
pub fn synthesize_foreground(
    background: &CategorizedColor,
    theme: ThemeType,
    min_contrast: f32,
) -> CategorizedColor {
    let (hue, saturation, _) = background.hsl();
    let outcome = search_lightness(
        ContrastSearch {
            hue,
            saturation: saturation * SYNTHETIC_SATURATION_FACTOR,
            lightness: if theme.is_dark() { 0.90 } else { 0.10 },
            target: min_contrast,
            theme,
            step: DEFAULT_STEP,
            max_attempts: SYNTHETIC_MAX_ATTEMPTS,
        },
        &background.color,
    );

    debug!(
        color = %outcome.color,
        contrast = outcome.contrast,
        met = outcome.met,
        "synthesized foreground"
    );
    CategorizedColor::generated(outcome.color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn cc(r: u8, g: u8, b: u8) -> CategorizedColor {
        CategorizedColor::extracted(Color::new(r, g, b), 0.25)
    }

    #[test]
    fn no_candidates() {
        assert_eq!(select_foreground(&[], &cc(20, 20, 30), 4.5), None);
    }

    #[test]
    fn picks_highest_contrast_above_minimum() {
        let bg = cc(20, 20, 30);
        let candidates = [cc(120, 120, 120), cc(230, 230, 230), cc(200, 200, 200)];
        assert_eq!(select_foreground(&candidates, &bg, 4.5), Some(1));
    }

    #[test]
    fn falls_back_to_best_below_minimum() {
        let bg = cc(100, 100, 100);
        let candidates = [cc(120, 120, 120), cc(140, 140, 140)];
        assert_eq!(select_foreground(&candidates, &bg, 4.5), Some(1));
    }

    #[test]
    fn equal_contrast_keeps_first() {
        let bg = cc(20, 20, 30);
        let candidates = [cc(240, 240, 240), cc(240, 240, 240)];
        assert_eq!(select_foreground(&candidates, &bg, 4.5), Some(0));
    }

    #[test]
    fn synthesized_dark_foreground_is_readable() {
        let bg = cc(20, 20, 30);
        let fg = synthesize_foreground(&bg, ThemeType::Dark, 4.5);
        assert!(fg.is_generated);
        assert_eq!(fg.weight, 0.0);
        assert!(fg.contrast_with(&bg) >= 4.5);
        assert!(fg.is_light());
    }

    #[test]
    fn synthesized_light_foreground_is_readable() {
        let bg = cc(235, 230, 220);
        let fg = synthesize_foreground(&bg, ThemeType::Light, 7.0);
        assert!(fg.contrast_with(&bg) >= 7.0);
        assert!(!fg.is_light());
    }
}
