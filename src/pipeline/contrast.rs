use tracing::trace;

use crate::color::Color;
use crate::theme::ThemeType;

/// Default lightness step of the contrast search.
pub const DEFAULT_STEP: f32 = 0.05;

/// Parameters for [`search_lightness`].
#[derive(Debug, Clone, Copy)]
pub struct ContrastSearch {
    pub hue: f32,
    pub saturation: f32,
    /// Starting HSL lightness.
    pub lightness: f32,
    /// Contrast ratio to reach against the background.
    pub target: f32,
    /// Dark themes search upward (lighter), light themes downward.
    pub theme: ThemeType,
    pub step: f32,
    pub max_attempts: usize,
}

/// Result of a bounded contrast search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub color: Color,
    /// Final HSL lightness.
    pub lightness: f32,
    pub contrast: f32,
    /// False when attempts ran out before the target was reached. The color is
    /// then the best effort at the last lightness tried, not an error.
    pub met: bool,
}

/// Walk HSL lightness away from the background in `step` increments until the
/// color reaches `target` contrast or `max_attempts` steps were taken.
///
/// Lightness is clamped to `[0.01, 0.99]` while stepping.
pub fn search_lightness(search: ContrastSearch, background: &Color) -> SearchOutcome {
    let mut lightness = search.lightness;
    let mut color = Color::from_hsl(search.hue, search.saturation, lightness);
    let mut contrast = Color::contrast_ratio(&color, background);

    let mut attempts = 0;
    while contrast < search.target && attempts < search.max_attempts {
        lightness = if search.theme.is_dark() {
            (lightness + search.step).min(0.99)
        } else {
            (lightness - search.step).max(0.01)
        };
        color = Color::from_hsl(search.hue, search.saturation, lightness);
        contrast = Color::contrast_ratio(&color, background);
        attempts += 1;
    }

    let met = contrast >= search.target;
    trace!(%color, lightness, contrast, attempts, met, "contrast search finished");

    SearchOutcome {
        color,
        lightness,
        contrast,
        met,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(lightness: f32, target: f32, theme: ThemeType, max_attempts: usize) -> ContrastSearch {
        ContrastSearch {
            hue: 210.0,
            saturation: 0.5,
            lightness,
            target,
            theme,
            step: DEFAULT_STEP,
            max_attempts,
        }
    }

    #[test]
    fn already_met_returns_start() {
        let bg = Color::new(10, 10, 10);
        let outcome = search_lightness(search(0.9, 3.0, ThemeType::Dark, 10), &bg);
        assert!(outcome.met);
        assert_eq!(outcome.lightness, 0.9);
        assert_eq!(outcome.color, Color::from_hsl(210.0, 0.5, 0.9));
    }

    #[test]
    fn dark_theme_searches_lighter() {
        let bg = Color::new(30, 30, 30);
        let outcome = search_lightness(search(0.2, 4.5, ThemeType::Dark, 20), &bg);
        assert!(outcome.met, "contrast {} should reach 4.5", outcome.contrast);
        assert!(outcome.lightness > 0.2);
        assert!(Color::contrast_ratio(&outcome.color, &bg) >= 4.5);
    }

    #[test]
    fn light_theme_searches_darker() {
        let bg = Color::new(240, 240, 240);
        let outcome = search_lightness(search(0.8, 4.5, ThemeType::Light, 20), &bg);
        assert!(outcome.met);
        assert!(outcome.lightness < 0.8);
    }

    #[test]
    fn exhaustion_returns_best_effort() {
        // Mid-grey background: 21:1 is unreachable.
        let bg = Color::new(128, 128, 128);
        let outcome = search_lightness(search(0.5, 21.0, ThemeType::Dark, 3), &bg);
        assert!(!outcome.met);
        assert!((outcome.lightness - 0.65).abs() < 1e-4);
    }

    #[test]
    fn lightness_is_clamped() {
        let bg = Color::WHITE;
        let outcome = search_lightness(search(0.95, 21.0, ThemeType::Dark, 20), &bg);
        assert!(!outcome.met);
        assert_eq!(outcome.lightness, 0.99);
    }
}
