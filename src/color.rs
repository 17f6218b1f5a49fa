use anyhow::{bail, Result};
use palette::{FromColor, Hsl, IntoColor, Lab, Srgb};
use serde::{Serialize, Serializer};

/// Core color type used throughout the pipeline.
/// Wraps sRGB u8 components (plus alpha) and provides conversions to HSL and CIELAB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// Opaque color from RGB components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse a hex color string like `#ff8800` or `#FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            bail!("invalid hex color: {hex}");
        }
        if hex.len() != 6 {
            bail!(
                "invalid hex color: expected 6 hex digits, got {}",
                hex.len()
            );
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        Ok(Self::new(r, g, b))
    }

    /// Serialize to lowercase hex `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Serialize to lowercase hex `#rrggbbaa`.
    pub fn to_hex_alpha(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Create an opaque color from `palette::Srgb<u8>`.
    pub fn from_srgb_u8(srgb: Srgb<u8>) -> Self {
        Self::new(srgb.red, srgb.green, srgb.blue)
    }

    /// Convert to CIELAB (for Hamerly clustering and deduplication).
    pub fn to_lab(self) -> Lab {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    /// Create from CIELAB.
    pub fn from_lab(lab: Lab) -> Self {
        let srgb_f32: Srgb<f32> = Srgb::from_color(lab);
        Self::from_srgb_f32_clamped(srgb_f32)
    }

    /// Convert to HSL: hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
    ///
    /// Achromatic colors report hue 0 and saturation 0.
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        let hsl: Hsl = srgb_f32.into_color();
        let mut hue = hsl.hue.into_positive_degrees();
        if !(0.0..360.0).contains(&hue) {
            hue = 0.0;
        }
        (
            hue,
            hsl.saturation.clamp(0.0, 1.0),
            hsl.lightness.clamp(0.0, 1.0),
        )
    }

    /// Create an opaque color from HSL. Saturation and lightness are clamped to `[0, 1]`,
    /// hue wraps around the color wheel.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hsl: Hsl = Hsl::new(
            hue.rem_euclid(360.0),
            saturation.clamp(0.0, 1.0),
            lightness.clamp(0.0, 1.0),
        );
        let srgb_f32: Srgb<f32> = Srgb::from_color(hsl);
        Self::from_srgb_f32_clamped(srgb_f32)
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(r, g, b)
    }

    /// WCAG 2.0 relative luminance in `[0, 1]`. Alpha is ignored.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// WCAG 2.0 contrast ratio between two colors.
    ///
    /// Returns a value in [1, 21]. Higher means more contrast.
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// Per-channel blend: `weight` of `self`, the rest of `other`. Channels truncate.
    pub fn mix(self, other: Color, weight: f32) -> Color {
        let blend = |a: u8, b: u8| (a as f32 * weight + b as f32 * (1.0 - weight)) as u8;
        Color::new(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
        )
    }
}

/// Shortest angular distance between two hues, in `[0, 180]`.
pub fn hue_distance(h1: f32, h2: f32) -> f32 {
    let diff = (h1 - h2).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Analogous hues sit within 30° of each other.
pub fn is_analogous(h1: f32, h2: f32) -> bool {
    hue_distance(h1, h2) <= 30.0
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color::BLACK;
    const WHITE: Color = Color::WHITE;

    fn assert_close(original: Color, recovered: Color) {
        for (a, b, channel) in [
            (original.r, recovered.r, "R"),
            (original.g, recovered.g, "G"),
            (original.b, recovered.b, "B"),
        ] {
            assert!(
                (a as i16 - b as i16).unsigned_abs() <= 1,
                "{channel} mismatch for {original:?}: {a} vs {b}"
            );
        }
    }

    #[test]
    fn hex_round_trip() {
        let original = Color::from_hex("#ff8800").unwrap();
        assert_eq!(original.r, 255);
        assert_eq!(original.g, 136);
        assert_eq!(original.b, 0);
        assert_eq!(original.a, 255);
        assert_eq!(original.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_uppercase_input() {
        let color = Color::from_hex("#FF8800").unwrap();
        assert_eq!(color.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
    }

    #[test]
    fn hex_invalid_length() {
        assert!(Color::from_hex("#fff").is_err());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(Color::from_hex("#gggggg").is_err());
    }

    #[test]
    fn hex_alpha_includes_alpha_channel() {
        let scrim = Color::BLACK.with_alpha(82);
        assert_eq!(scrim.to_hex(), "#000000");
        assert_eq!(scrim.to_hex_alpha(), "#00000052");
        assert_eq!(format!("{scrim}"), "#00000052");
    }

    #[test]
    fn srgb_to_lab_round_trip() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(0, 255, 0),
            Color::new(128, 128, 128),
            BLACK,
            WHITE,
        ];
        for original in colors {
            assert_close(original, Color::from_lab(original.to_lab()));
        }
    }

    #[test]
    fn hsl_round_trip() {
        let colors = [
            Color::new(200, 100, 50),
            Color::new(0, 255, 0),
            Color::new(20, 20, 30),
            Color::new(128, 128, 128),
            Color::new(1, 2, 3),
            BLACK,
            WHITE,
        ];
        for original in colors {
            let (h, s, l) = original.to_hsl();
            assert_close(original, Color::from_hsl(h, s, l));
        }
    }

    #[test]
    fn hsl_of_primaries() {
        let (h, s, l) = Color::new(255, 0, 0).to_hsl();
        assert!(h.abs() < 0.5 || (360.0 - h) < 0.5, "red hue was {h}");
        assert!((s - 1.0).abs() < 0.001);
        assert!((l - 0.5).abs() < 0.001);

        let (h, _, _) = Color::new(0, 0, 255).to_hsl();
        assert!((h - 240.0).abs() < 0.5, "blue hue was {h}");
    }

    #[test]
    fn grey_is_achromatic() {
        let (h, s, l) = Color::new(128, 128, 128).to_hsl();
        assert_eq!(h, 0.0);
        assert_eq!(s, 0.0);
        assert!((l - 128.0 / 255.0).abs() < 0.001);
        assert_eq!(Color::from_hsl(200.0, 0.0, 0.5), Color::new(128, 128, 128));
    }

    #[test]
    fn from_hsl_wraps_hue() {
        assert_eq!(Color::from_hsl(480.0, 0.6, 0.5), Color::from_hsl(120.0, 0.6, 0.5));
        assert_eq!(Color::from_hsl(-120.0, 0.6, 0.5), Color::from_hsl(240.0, 0.6, 0.5));
    }

    #[test]
    fn contrast_ratio_black_white() {
        let ratio = Color::contrast_ratio(&BLACK, &WHITE);
        assert!(
            (ratio - 21.0).abs() < 0.1,
            "black/white contrast should be ~21:1, got {ratio}"
        );
    }

    #[test]
    fn contrast_ratio_same_color() {
        let gray = Color::new(128, 128, 128);
        let ratio = Color::contrast_ratio(&gray, &gray);
        assert!(
            (ratio - 1.0).abs() < 0.001,
            "same color contrast should be 1:1, got {ratio}"
        );
    }

    #[test]
    fn contrast_ratio_is_symmetric() {
        let a = Color::new(200, 50, 50);
        let b = Color::new(50, 200, 50);
        let ratio_ab = Color::contrast_ratio(&a, &b);
        let ratio_ba = Color::contrast_ratio(&b, &a);
        assert!(
            (ratio_ab - ratio_ba).abs() < 0.001,
            "contrast ratio should be symmetric: {ratio_ab} vs {ratio_ba}"
        );
    }

    #[test]
    fn contrast_ratio_mid_gray_vs_black() {
        // sRGB(119,119,119) has relative luminance ~0.184
        let gray = Color::new(119, 119, 119);
        let ratio = Color::contrast_ratio(&gray, &BLACK);
        assert!(
            ratio > 4.5 && ratio < 5.0,
            "mid-gray vs black should be ~4.7:1, got {ratio}"
        );
    }

    #[test]
    fn relative_luminance_bounds() {
        assert!(BLACK.relative_luminance() < 0.001);
        assert!((WHITE.relative_luminance() - 1.0).abs() < 0.001);
    }

    #[test]
    fn relative_luminance_ignores_alpha() {
        let c = Color::new(90, 140, 200);
        assert_eq!(c.relative_luminance(), c.with_alpha(10).relative_luminance());
    }

    #[test]
    fn hue_distance_wraps() {
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(10.0, 350.0), 20.0);
        assert_eq!(hue_distance(0.0, 180.0), 180.0);
        assert_eq!(hue_distance(90.0, 90.0), 0.0);
        assert!(is_analogous(15.0, 40.0));
        assert!(!is_analogous(15.0, 50.0));
    }

    #[test]
    fn mix_truncates_channels() {
        let surface = Color::new(30, 30, 40);
        let bg = Color::new(20, 20, 30);
        // 30*0.6 + 20*0.4 = 26, 40*0.6 + 30*0.4 = 36
        assert_eq!(surface.mix(bg, 0.6), Color::new(26, 26, 36));
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
