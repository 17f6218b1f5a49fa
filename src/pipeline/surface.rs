use std::collections::BTreeSet;

use tracing::debug;

use crate::color::Color;
use crate::pipeline::contrast::{search_lightness, ContrastSearch, DEFAULT_STEP};
use crate::role::Role;
use crate::theme::{CategorizedColor, CategorizedPalette, ThemeType};

const ON_SURFACE_MIN_CONTRAST: f32 = 4.5;
const ON_SURFACE_TARGET: f32 = 7.0;
const ON_SURFACE_MAX_ATTEMPTS: usize = 20;

const SCRIM_ALPHA: u8 = 82;
const SHADOW_ALPHA: u8 = 38;

/// Elevation tiers and their lightness offset from the surface (dark themes).
const CONTAINERS: [(Role, f32); 5] = [
    (Role::SurfaceContainerLowest, -0.04),
    (Role::SurfaceContainerLow, -0.02),
    (Role::SurfaceContainer, 0.0),
    (Role::SurfaceContainerHigh, 0.02),
    (Role::SurfaceContainerHighest, 0.04),
];

/// Roles that get a white-or-black text color.
const ON_COLORS: [(Role, Role); 9] = [
    (Role::Accent1, Role::OnAccent1),
    (Role::Accent2, Role::OnAccent2),
    (Role::Accent3, Role::OnAccent3),
    (Role::Accent4, Role::OnAccent4),
    (Role::Danger, Role::OnDanger),
    (Role::Warning, Role::OnWarning),
    (Role::Success, Role::OnSuccess),
    (Role::Info, Role::OnInfo),
    (Role::Notification, Role::OnNotification),
];

/// A tonal step from `base`: lightness moved by `shift` (up on dark themes, down
/// on light ones) and limited by `limit`, saturation scaled with a floor.
struct Tone {
    shift: f32,
    limit: Option<f32>,
    saturation_factor: f32,
    min_saturation: f32,
}

impl Tone {
    fn apply(&self, base: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
        let (hue, saturation, lightness) = base.hsl();
        let lightness = if theme.is_dark() {
            let l = lightness + self.shift;
            self.limit.map_or(l, |max| l.min(max))
        } else {
            let l = lightness - self.shift;
            self.limit.map_or(l, |min| l.max(min))
        };
        let saturation = (saturation * self.saturation_factor).max(self.min_saturation);
        CategorizedColor::generated(Color::from_hsl(hue, saturation, lightness))
    }
}

/// Base surface for cards and dialogs, a small step from the background.
pub fn surface(background: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    let limit = if theme.is_dark() { 0.25 } else { 0.75 };
    Tone {
        shift: 0.06,
        limit: Some(limit),
        saturation_factor: 0.9,
        min_saturation: 0.05,
    }
    .apply(background, theme)
}

/// Text on `surface`: the foreground when it is readable enough, otherwise a
/// search from the foreground toward 7:1.
pub fn on_surface(
    surface: &CategorizedColor,
    foreground: &CategorizedColor,
    theme: ThemeType,
) -> CategorizedColor {
    if foreground.contrast_with(surface) >= ON_SURFACE_MIN_CONTRAST {
        return CategorizedColor {
            is_generated: true,
            weight: 0.0,
            role: None,
            index: None,
            source: None,
            ..*foreground
        };
    }

    let (hue, saturation, lightness) = foreground.hsl();
    let outcome = search_lightness(
        ContrastSearch {
            hue,
            saturation,
            lightness,
            target: ON_SURFACE_TARGET,
            theme,
            step: DEFAULT_STEP,
            max_attempts: ON_SURFACE_MAX_ATTEMPTS,
        },
        &surface.color,
    );
    CategorizedColor::generated(outcome.color)
}

pub fn outline(surface: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    let limit = if theme.is_dark() { 0.35 } else { 0.60 };
    Tone {
        shift: 0.18,
        limit: Some(limit),
        saturation_factor: 0.3,
        min_saturation: 0.02,
    }
    .apply(surface, theme)
}

pub fn border(surface: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    let limit = if theme.is_dark() { 0.45 } else { 0.50 };
    Tone {
        shift: 0.28,
        limit: Some(limit),
        saturation_factor: 0.4,
        min_saturation: 0.03,
    }
    .apply(surface, theme)
}

/// 60% surface, 40% background.
pub fn surface_variant(surface: &CategorizedColor, background: &CategorizedColor) -> CategorizedColor {
    CategorizedColor::generated(surface.color.mix(background.color, 0.6))
}

pub fn border_muted(surface: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    Tone {
        shift: 0.18,
        limit: None,
        saturation_factor: 0.25,
        min_saturation: 0.0,
    }
    .apply(surface, theme)
}

pub fn outline_variant(surface: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    Tone {
        shift: 0.11,
        limit: None,
        saturation_factor: 0.2,
        min_saturation: 0.0,
    }
    .apply(surface, theme)
}

/// White or black, whichever contrasts more with `base`. Ties pick black.
pub fn on_color(base: &CategorizedColor) -> CategorizedColor {
    let white = Color::contrast_ratio(&Color::WHITE, &base.color);
    let black = Color::contrast_ratio(&Color::BLACK, &base.color);
    CategorizedColor::generated(if white > black {
        Color::WHITE
    } else {
        Color::BLACK
    })
}

pub fn inverse_surface(background: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    let (hue, saturation, _) = background.hsl();
    let lightness = if theme.is_dark() { 0.90 } else { 0.15 };
    CategorizedColor::generated(Color::from_hsl(hue, saturation, lightness))
}

pub fn inverse_on_surface(inverse: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    let (hue, saturation, _) = inverse.hsl();
    let lightness = if theme.is_dark() { 0.10 } else { 0.95 };
    CategorizedColor::generated(Color::from_hsl(hue, saturation * 0.1, lightness))
}

pub fn inverse_primary(primary: &CategorizedColor, theme: ThemeType) -> CategorizedColor {
    let (hue, saturation, _) = primary.hsl();
    let lightness = if theme.is_dark() { 0.40 } else { 0.70 };
    CategorizedColor::generated(Color::from_hsl(hue, saturation, lightness))
}

/// Modal backdrop.
pub fn scrim() -> CategorizedColor {
    CategorizedColor::generated(Color::BLACK.with_alpha(SCRIM_ALPHA))
}

/// Elevation shadow.
pub fn shadow() -> CategorizedColor {
    CategorizedColor::generated(Color::BLACK.with_alpha(SHADOW_ALPHA))
}

/// Container tier at `offset` from the surface lightness. Offsets rise with
/// elevation on dark themes and fall on light ones.
pub fn container(surface: &CategorizedColor, offset: f32, theme: ThemeType) -> CategorizedColor {
    let (hue, saturation, lightness) = surface.hsl();
    let lightness = if theme.is_dark() {
        lightness + offset
    } else {
        lightness - offset
    };
    CategorizedColor::generated(Color::from_hsl(hue, saturation, lightness.clamp(0.05, 0.95)))
}

/// Fill every surface, border, on-color, inverse, overlay and container role not
/// in `hinted`. Runs after accents and semantic roles are in `palette`.
pub fn generate_surfaces(
    palette: &mut CategorizedPalette,
    background: &CategorizedColor,
    foreground: &CategorizedColor,
    theme: ThemeType,
    hinted: &BTreeSet<Role>,
) {
    let put = |palette: &mut CategorizedPalette, role: Role, make: &dyn Fn() -> CategorizedColor| {
        if !hinted.contains(&role) {
            palette.set(role, make());
        }
    };

    put(palette, Role::Surface, &|| surface(background, theme));
    let base = palette.get(Role::Surface).copied().unwrap_or(*background);

    put(palette, Role::OnSurface, &|| on_surface(&base, foreground, theme));
    put(palette, Role::Outline, &|| outline(&base, theme));
    put(palette, Role::Border, &|| border(&base, theme));

    put(palette, Role::SurfaceVariant, &|| surface_variant(&base, background));
    let variant = palette.get(Role::SurfaceVariant).copied().unwrap_or(base);
    put(palette, Role::OnSurfaceVariant, &|| on_surface(&variant, foreground, theme));
    put(palette, Role::BorderMuted, &|| border_muted(&base, theme));
    put(palette, Role::OutlineVariant, &|| outline_variant(&base, theme));

    for (role, on_role) in ON_COLORS {
        if let Some(colored) = palette.get(role).copied() {
            put(palette, on_role, &|| on_color(&colored));
        }
    }

    put(palette, Role::InverseSurface, &|| inverse_surface(background, theme));
    let inverse = palette
        .get(Role::InverseSurface)
        .copied()
        .unwrap_or_else(|| inverse_surface(background, theme));
    put(palette, Role::InverseOnSurface, &|| inverse_on_surface(&inverse, theme));
    let primary = palette.get(Role::Accent1).copied().unwrap_or(*foreground);
    put(palette, Role::InversePrimary, &|| inverse_primary(&primary, theme));

    put(palette, Role::Scrim, &scrim);
    put(palette, Role::Shadow, &shadow);

    for (role, offset) in CONTAINERS {
        put(palette, role, &|| container(&base, offset, theme));
    }

    debug!(roles = palette.len(), "surfaces generated");
}
