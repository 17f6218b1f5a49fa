use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::pipeline::accents::collect_accents;
use crate::pipeline::detect::select_background;
use crate::pipeline::foreground::{select_foreground, synthesize_foreground};
use crate::pipeline::muted::muted_variant;
use crate::pipeline::semantic::assign_semantic;
use crate::pipeline::surface::generate_surfaces;
use crate::role::Role;
use crate::theme::{CategorizationConfig, CategorizedColor, CategorizedPalette, Palette, ThemeType};

/// Assign a semantic role to every color of `palette`.
///
/// Stages run in a fixed order: background and theme, hints, foreground, muted
/// variants, accents, semantic roles, then derived surfaces. Role hints always
/// win over automatic choices. Input colors that end up in no role are kept as
/// unlabeled extras in [`CategorizedPalette::all_colors`].
///
/// Never fails: degenerate palettes get synthesized colors instead. An empty
/// palette gives an empty result carrying the requested theme type.
pub fn categorize(palette: &Palette, config: &CategorizationConfig) -> CategorizedPalette {
    if palette.is_empty() {
        debug!("empty palette, nothing to categorize");
        return CategorizedPalette::new(config.theme_type);
    }

    let colors: Vec<CategorizedColor> = palette
        .colors()
        .iter()
        .zip(palette.weights())
        .enumerate()
        .map(|(i, (color, weight))| CategorizedColor::extracted(*color, weight).with_source(i))
        .collect();
    let hints = valid_hints(palette.role_hints(), colors.len());

    // Background and theme.
    let selected = match hints.get(&Role::Background) {
        Some(&index) => Some((index, config.theme_type.resolve(colors[index].luminance))),
        None => select_background(&colors, config.theme_type),
    };
    let Some((bg_index, theme)) = selected else {
        return CategorizedPalette::new(config.theme_type);
    };
    let background = colors[bg_index];

    // Input order from here on is luminance order; each entry keeps its input index.
    let sorted = sorted_by_luminance(&colors, theme);

    let mut result = CategorizedPalette::new(theme);
    result.set(Role::Background, background);
    for (&role, &index) in &hints {
        if role != Role::Background {
            result.set(role, colors[index]);
        }
    }
    let hinted: BTreeSet<Role> = hints.keys().copied().collect();

    // Foreground.
    let (foreground, fg_index) = match hints.get(&Role::Foreground) {
        Some(&index) => (colors[index], Some(index)),
        None => {
            let candidates: Vec<(usize, CategorizedColor)> = sorted
                .iter()
                .filter(|(index, _)| *index != bg_index)
                .copied()
                .collect();
            let pool: Vec<CategorizedColor> = candidates.iter().map(|(_, c)| *c).collect();

            match select_foreground(&pool, &background, config.min_contrast()) {
                Some(pick) => (pool[pick], Some(candidates[pick].0)),
                None => (
                    synthesize_foreground(&background, theme, config.min_contrast()),
                    None,
                ),
            }
        }
    };
    if !hinted.contains(&Role::Foreground) {
        result.set(Role::Foreground, foreground);
    }

    // Muted background and foreground.
    let adjust = config.muted_luminance_adjust;
    if !hinted.contains(&Role::BackgroundMuted) {
        result.set(
            Role::BackgroundMuted,
            muted_variant(&background, adjust, theme, true),
        );
    }
    if !hinted.contains(&Role::ForegroundMuted) {
        result.set(
            Role::ForegroundMuted,
            muted_variant(&foreground, adjust, theme, false),
        );
    }

    // Accents.
    let mut used: BTreeSet<usize> = hints.values().copied().collect();
    used.insert(bg_index);
    used.extend(fg_index);
    let candidates: Vec<CategorizedColor> = sorted
        .iter()
        .filter(|(index, _)| !used.contains(index))
        .map(|(_, c)| *c)
        .collect();
    let accents = collect_accents(candidates, &background, &foreground, theme);

    let mut pool = accents.iter();
    for (role, muted_role) in Role::ACCENTS {
        if hinted.contains(&role) {
            continue;
        }
        let Some(accent) = pool.next() else {
            break;
        };
        result.set(role, *accent);
        if !hinted.contains(&muted_role) {
            result.set(muted_role, muted_variant(accent, adjust, theme, false));
        }
    }

    // Semantic roles.
    let hinted_semantic: BTreeMap<Role, CategorizedColor> = Role::SEMANTIC
        .into_iter()
        .filter_map(|role| result.get(role).map(|color| (role, *color)))
        .collect();
    let semantic = assign_semantic(&accents, &background, theme, config, &hinted_semantic);
    for (role, color) in semantic {
        result.set(role, color);
    }

    generate_surfaces(&mut result, &background, &foreground, theme, &hinted);

    let taken: BTreeSet<usize> = result.iter().filter_map(|(_, c)| c.source).collect();
    let extras: Vec<CategorizedColor> = colors
        .iter()
        .enumerate()
        .filter(|(index, _)| !taken.contains(index))
        .map(|(_, c)| *c)
        .collect();
    debug!(
        theme = %theme,
        roles = result.len(),
        extras = extras.len(),
        "categorized palette"
    );
    result.finalize(extras);
    result
}

/// Hints pointing inside the palette. Others are dropped with a warning.
fn valid_hints(hints: &BTreeMap<Role, usize>, len: usize) -> BTreeMap<Role, usize> {
    hints
        .iter()
        .filter(|(role, index)| {
            let valid = **index < len;
            if !valid {
                warn!(%role, index, len, "ignoring out-of-range role hint");
            }
            valid
        })
        .map(|(role, index)| (*role, *index))
        .collect()
}

/// Colors paired with their input index, stably sorted by luminance (dark themes
/// ascending, light themes descending).
fn sorted_by_luminance(
    colors: &[CategorizedColor],
    theme: ThemeType,
) -> Vec<(usize, CategorizedColor)> {
    let mut sorted: Vec<(usize, CategorizedColor)> = colors.iter().copied().enumerate().collect();
    if theme.is_dark() {
        sorted.sort_by(|a, b| a.1.luminance.total_cmp(&b.1.luminance));
    } else {
        sorted.sort_by(|a, b| b.1.luminance.total_cmp(&a.1.luminance));
    }
    sorted
}
