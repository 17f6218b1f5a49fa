use std::collections::BTreeMap;

use tracing::debug;

use crate::color::{hue_distance, Color};
use crate::pipeline::contrast::{search_lightness, ContrastSearch, DEFAULT_STEP};
use crate::role::Role;
use crate::theme::{CategorizationConfig, CategorizedColor, ThemeType};

/// Colors greyer than this never carry semantic meaning.
const MIN_CANDIDATE_SATURATION: f32 = 0.3;

const MIN_SATURATION: f32 = 0.6;
const MIN_LIGHTNESS: f32 = 0.35;
const MAX_LIGHTNESS: f32 = 0.65;
const MIN_CONTRAST: f32 = 3.0;
/// Extra lightness shift for enhanced colors that still lack contrast.
const CONTRAST_NUDGE: f32 = 0.15;
/// Search steps after the nudge. Enough to walk from 0.75 or 0.30 to the end
/// of the lightness range.
const ENHANCE_MAX_ATTEMPTS: usize = 10;

const FALLBACK_SATURATION: f32 = 0.75;
const FALLBACK_MAX_ATTEMPTS: usize = 5;

/// Minimum hue distance between any two semantic colors.
pub const MIN_HUE_SEPARATION: f32 = 30.0;
/// Slack kept when placing a fallback off its standard hue, so RGB rounding
/// cannot pull it back under the separation.
const HUE_MARGIN: f32 = 5.0;
const HUE_STEP: f32 = 5.0;

/// Semantic role whose hue range contains `hue`.
///
/// The ranges leave `[60, 90)` and `[150, 180)` unclaimed.
pub fn bucket(hue: f32) -> Option<Role> {
    match hue {
        h if !(30.0..330.0).contains(&h) => Some(Role::Danger),
        h if h < 60.0 => Some(Role::Warning),
        h if (90.0..150.0).contains(&h) => Some(Role::Success),
        h if (180.0..240.0).contains(&h) => Some(Role::Info),
        h if h >= 240.0 => Some(Role::Notification),
        _ => None,
    }
}

/// Canonical hue of each semantic role.
pub fn standard_hue(role: Role) -> f32 {
    match role {
        Role::Warning => 45.0,
        Role::Success => 120.0,
        Role::Info => 210.0,
        Role::Notification => 285.0,
        _ => 0.0,
    }
}

fn target_lightness(theme: ThemeType) -> f32 {
    if theme.is_dark() {
        0.60
    } else {
        0.45
    }
}

/// The most saturated candidate per semantic bucket. Ties keep the earlier one.
pub fn pick_candidates(accents: &[CategorizedColor]) -> BTreeMap<Role, CategorizedColor> {
    let mut picked: BTreeMap<Role, CategorizedColor> = BTreeMap::new();
    for accent in accents {
        if accent.saturation < MIN_CANDIDATE_SATURATION {
            continue;
        }
        let Some(role) = bucket(accent.hue) else {
            continue;
        };
        match picked.get(&role) {
            Some(current) if current.saturation >= accent.saturation => {}
            _ => {
                picked.insert(role, *accent);
            }
        }
    }
    picked
}

/// Boost saturation and pull lightness toward the theme target. Below 3:1
/// against the background the lightness is nudged once, then searched further
/// away from the background until the target is met or the range runs out.
pub fn enhance(
    candidate: &CategorizedColor,
    background: &CategorizedColor,
    theme: ThemeType,
    boost: f32,
) -> CategorizedColor {
    let (hue, saturation, lightness) = candidate.hsl();
    let saturation = (saturation * (1.0 + boost)).clamp(MIN_SATURATION, 1.0);

    let target = target_lightness(theme);
    let mut lightness = if (MIN_LIGHTNESS..=MAX_LIGHTNESS).contains(&lightness) {
        (lightness + target) / 2.0
    } else {
        target
    };

    let color = Color::from_hsl(hue, saturation, lightness);
    if Color::contrast_ratio(&color, &background.color) < MIN_CONTRAST {
        lightness = if theme.is_dark() {
            (lightness + CONTRAST_NUDGE).min(0.75)
        } else {
            (lightness - CONTRAST_NUDGE).max(0.30)
        };
    }

    let outcome = search_lightness(
        ContrastSearch {
            hue,
            saturation,
            lightness,
            target: MIN_CONTRAST,
            theme,
            step: DEFAULT_STEP,
            max_attempts: ENHANCE_MAX_ATTEMPTS,
        },
        &background.color,
    );
    CategorizedColor::generated(outcome.color)
}

/// A semantic color built from the role's standard hue.
pub fn fallback(role: Role, background: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    fallback_at(standard_hue(role), background, theme)
}

fn fallback_at(hue: f32, background: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    let outcome = search_lightness(
        ContrastSearch {
            hue,
            saturation: FALLBACK_SATURATION,
            lightness: target_lightness(theme),
            target: MIN_CONTRAST,
            theme,
            step: DEFAULT_STEP,
            max_attempts: FALLBACK_MAX_ATTEMPTS,
        },
        &background.color,
    );
    CategorizedColor::generated(outcome.color)
}

fn crowds(hue: f32, taken: &[f32], separation: f32) -> bool {
    taken.iter().any(|t| hue_distance(hue, *t) < separation)
}

/// The hue closest to `preferred`, on a 5° grid, that keeps clear of every
/// `taken` hue. Four taken hues always leave room.
pub fn free_hue(preferred: f32, taken: &[f32]) -> f32 {
    let separation = MIN_HUE_SEPARATION + HUE_MARGIN;
    let steps = (180.0 / HUE_STEP) as usize;
    (0..=steps)
        .flat_map(|i| {
            let offset = i as f32 * HUE_STEP;
            [preferred + offset, preferred - offset]
        })
        .map(|hue| hue.rem_euclid(360.0))
        .find(|hue| !crowds(*hue, taken, separation))
        .unwrap_or(preferred)
}

/// Semantic role colors from the accent candidates.
///
/// Roles in `hinted` are left out and their hues reserved. A color whose hue
/// falls within 30° of a semantic color already placed is replaced by a
/// fallback at the nearest free hue.
pub fn assign_semantic(
    accents: &[CategorizedColor],
    background: &CategorizedColor,
    theme: ThemeType,
    config: &CategorizationConfig,
    hinted: &BTreeMap<Role, CategorizedColor>,
) -> Vec<(Role, CategorizedColor)> {
    let candidates = pick_candidates(accents);
    let mut taken: Vec<f32> = hinted
        .values()
        .filter(|c| c.saturation > 0.0)
        .map(|c| c.hue)
        .collect();

    let mut assigned = Vec::with_capacity(Role::SEMANTIC.len());
    for role in Role::SEMANTIC {
        if hinted.contains_key(&role) {
            continue;
        }
        let mut color = match candidates.get(&role) {
            Some(found) if config.enhance_semantic_colors => {
                enhance(found, background, theme, config.semantic_boost_amount)
            }
            Some(found) => *found,
            None => fallback(role, background, theme),
        };
        if crowds(color.hue, &taken, MIN_HUE_SEPARATION) {
            let hue = free_hue(standard_hue(role), &taken);
            debug!(%role, from = color.hue, to = hue, "semantic hue too close, moved");
            color = fallback_at(hue, background, theme);
        }
        debug!(
            %role,
            color = %color.color,
            from_palette = candidates.contains_key(&role),
            "semantic color"
        );
        taken.push(color.hue);
        assigned.push((role, color));
    }
    assigned
}
