use crate::color::Color;
use crate::theme::{CategorizedColor, ThemeType};

const SATURATION_FACTOR: f32 = 0.5;

/// Muted (inactive) variant of `base`: half the saturation, lightness shifted by
/// `adjust`.
///
/// Backgrounds move away from the theme's base (lighter on dark themes, darker on
/// light ones). Foregrounds and accents move toward it, lowering their contrast.
pub fn muted_variant(
    base: &CategorizedColor,
    adjust: f32,
    theme: ThemeType,
    is_background: bool,
) -> CategorizedColor {
    let (hue, saturation, lightness) = base.hsl();

    let lighter = theme.is_dark() == is_background;
    let lightness = if lighter {
        (lightness + adjust).min(1.0)
    } else {
        (lightness - adjust).max(0.0)
    };

    let color = Color::from_hsl(hue, saturation * SATURATION_FACTOR, lightness).with_alpha(base.color.a);
    CategorizedColor::generated(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cc(r: u8, g: u8, b: u8) -> CategorizedColor {
        CategorizedColor::extracted(Color::new(r, g, b), 0.5)
    }

    #[test]
    fn dark_background_gets_lighter() {
        let bg = cc(20, 24, 40);
        let muted = muted_variant(&bg, 0.15, ThemeType::Dark, true);
        assert!(muted.luminance > bg.luminance);
        assert!(muted.is_generated);
        assert_eq!(muted.weight, 0.0);
    }

    #[test]
    fn light_background_gets_darker() {
        let bg = cc(240, 236, 220);
        let muted = muted_variant(&bg, 0.15, ThemeType::Light, true);
        assert!(muted.luminance < bg.luminance);
    }

    #[test]
    fn dark_foreground_gets_darker() {
        let fg = cc(220, 220, 230);
        let muted = muted_variant(&fg, 0.15, ThemeType::Dark, false);
        assert!(muted.luminance < fg.luminance);
    }

    #[test]
    fn light_accent_gets_lighter() {
        let accent = cc(40, 80, 160);
        let muted = muted_variant(&accent, 0.15, ThemeType::Light, false);
        assert!(muted.luminance > accent.luminance);
    }

    #[test]
    fn saturation_is_halved() {
        let accent = cc(200, 40, 40);
        let muted = muted_variant(&accent, 0.0, ThemeType::Dark, false);
        assert!((muted.saturation - accent.saturation * 0.5).abs() < 0.02);
    }

    #[test]
    fn lightness_is_clamped() {
        let fg = cc(250, 250, 250);
        let muted = muted_variant(&fg, 0.5, ThemeType::Light, false);
        assert_eq!(muted.color, Color::WHITE);
    }

    #[test]
    fn luminance_matches_rgb() {
        let accent = cc(90, 160, 60);
        let muted = muted_variant(&accent, 0.15, ThemeType::Dark, false);
        assert_eq!(muted.luminance, muted.color.relative_luminance());
    }
}
