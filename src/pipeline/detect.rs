use tracing::debug;

use crate::theme::{CategorizedColor, ThemeType};

/// Luminance threshold between dark and light colors.
const LIGHT_THRESHOLD: f32 = 0.5;

/// Pick the background color and resolve the theme type.
///
/// - `Auto`: the heaviest color becomes the background and its luminance
///   decides the theme.
/// - `Dark`: the heaviest color below the threshold, else the darkest color.
/// - `Light`: the heaviest color at or above the threshold, else the lightest.
///
/// Ties go to the earlier color. Returns the index into `colors` and the
/// resolved theme, or `None` when `colors` is empty.
pub fn select_background(
    colors: &[CategorizedColor],
    theme: ThemeType,
) -> Option<(usize, ThemeType)> {
    let index = match theme {
        ThemeType::Auto => heaviest(colors, |_| true),
        ThemeType::Dark => heaviest(colors, |c| c.luminance < LIGHT_THRESHOLD)
            .or_else(|| extreme(colors, |a, b| a < b)),
        ThemeType::Light => heaviest(colors, |c| c.luminance >= LIGHT_THRESHOLD)
            .or_else(|| extreme(colors, |a, b| a > b)),
    }?;

    let resolved = theme.resolve(colors[index].luminance);
    debug!(
        index,
        color = %colors[index].color,
        luminance = colors[index].luminance,
        theme = %resolved,
        "selected background"
    );
    Some((index, resolved))
}

/// Index of the highest-weight color matching `filter`; first wins ties.
fn heaviest(colors: &[CategorizedColor], filter: impl Fn(&CategorizedColor) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, color) in colors.iter().enumerate() {
        if !filter(color) {
            continue;
        }
        match best {
            Some(b) if colors[b].weight >= color.weight => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Index of the color whose luminance beats every earlier one under `better`.
fn extreme(colors: &[CategorizedColor], better: impl Fn(f32, f32) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, color) in colors.iter().enumerate() {
        match best {
            Some(b) if !better(color.luminance, colors[b].luminance) => {}
            _ => best = Some(i),
        }
    }
    best
}
