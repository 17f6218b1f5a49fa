use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::color::Color;
use crate::pipeline::extract::ExtractedColor;
use crate::role::Role;

/// Whether a theme is light-on-dark or dark-on-light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    /// Inferred from the dominant color's luminance during background selection.
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemeType {
    /// True for dark themes. `Auto` is resolved before any generator runs, so it
    /// only reaches here on degenerate input and is treated as light.
    pub fn is_dark(self) -> bool {
        self == ThemeType::Dark
    }

    /// Resolve `Auto` from a base color's luminance; explicit types pass through.
    pub fn resolve(self, luminance: f32) -> ThemeType {
        match self {
            ThemeType::Auto if luminance >= 0.5 => ThemeType::Light,
            ThemeType::Auto => ThemeType::Dark,
            explicit => explicit,
        }
    }
}

impl std::fmt::Display for ThemeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ThemeType::Auto => "auto",
            ThemeType::Dark => "dark",
            ThemeType::Light => "light",
        })
    }
}

/// Input to categorization: colors, optional weights and optional role hints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
    weights: Option<Vec<f32>>,
    role_hints: BTreeMap<Role, usize>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self {
            colors,
            ..Self::default()
        }
    }

    /// Colors with relative weights (e.g. cluster sizes). Weights are normalized to
    /// sum to 1.0; a length mismatch or an all-zero set falls back to uniform weights.
    pub fn with_weights(colors: Vec<Color>, weights: Vec<f32>) -> Self {
        if weights.len() != colors.len() {
            warn!(
                colors = colors.len(),
                weights = weights.len(),
                "weight count does not match color count, using uniform weights"
            );
            return Self::new(colors);
        }

        let sum: f32 = weights.iter().sum();
        let normalized = if sum > 0.0 {
            weights.iter().map(|w| w / sum).collect()
        } else {
            uniform_weights(colors.len())
        };

        Self {
            colors,
            weights: Some(normalized),
            role_hints: BTreeMap::new(),
        }
    }

    /// Palette from extractor output, keeping cluster weights.
    pub fn from_extracted(extracted: &[ExtractedColor]) -> Self {
        Self::with_weights(
            extracted.iter().map(|e| e.color).collect(),
            extracted.iter().map(|e| e.weight).collect(),
        )
    }

    /// Force the color at `index` into `role`. Out-of-range indices are ignored
    /// during categorization.
    pub fn with_hint(mut self, role: Role, index: usize) -> Self {
        self.role_hints.insert(role, index);
        self
    }

    pub fn with_role_hints(mut self, hints: BTreeMap<Role, usize>) -> Self {
        self.role_hints = hints;
        self
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Normalized weights, uniform when none were supplied.
    pub fn weights(&self) -> Vec<f32> {
        match &self.weights {
            Some(weights) => weights.clone(),
            None => uniform_weights(self.colors.len()),
        }
    }

    pub fn role_hints(&self) -> &BTreeMap<Role, usize> {
        &self.role_hints
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn uniform_weights(count: usize) -> Vec<f32> {
    vec![1.0 / count as f32; count]
}

/// A color plus the metadata the categorizer derives for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategorizedColor {
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// WCAG relative luminance, computed from the RGB value.
    pub luminance: f32,
    pub hue: f32,
    pub saturation: f32,
    /// True if synthesized or enhanced rather than taken from the input.
    pub is_generated: bool,
    /// Weight in the source palette, 0 for generated colors.
    pub weight: f32,
    /// Position in `CategorizedPalette::all_colors`, stamped at output time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Position of the input palette color this was taken from.
    #[serde(skip)]
    pub source: Option<usize>,
}

impl CategorizedColor {
    pub fn extracted(color: Color, weight: f32) -> Self {
        let (hue, saturation, _) = color.to_hsl();
        Self {
            color,
            role: None,
            luminance: color.relative_luminance(),
            hue,
            saturation,
            is_generated: false,
            weight,
            index: None,
            source: None,
        }
    }

    /// Tag the color with its position in the input palette.
    pub fn with_source(self, source: usize) -> Self {
        Self {
            source: Some(source),
            ..self
        }
    }

    pub fn generated(color: Color) -> Self {
        Self {
            is_generated: true,
            ..Self::extracted(color, 0.0)
        }
    }

    pub fn is_light(&self) -> bool {
        self.luminance > 0.5
    }

    /// HSL components of the underlying color.
    pub fn hsl(&self) -> (f32, f32, f32) {
        self.color.to_hsl()
    }

    pub fn contrast_with(&self, other: &CategorizedColor) -> f32 {
        Color::contrast_ratio(&self.color, &other.color)
    }
}

/// Tunables for categorization. Passed explicitly into every entry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategorizationConfig {
    pub theme_type: ThemeType,
    /// Minimum foreground/background contrast.
    pub min_contrast_ratio: f32,
    /// Require WCAG AAA (7:1) instead of `min_contrast_ratio`.
    pub require_aaa: bool,
    /// Lightness shift applied to muted variants.
    pub muted_luminance_adjust: f32,
    pub enhance_semantic_colors: bool,
    /// Relative saturation boost for enhanced semantic colors.
    pub semantic_boost_amount: f32,
}

impl Default for CategorizationConfig {
    fn default() -> Self {
        Self {
            theme_type: ThemeType::Auto,
            min_contrast_ratio: 4.5,
            require_aaa: false,
            muted_luminance_adjust: 0.15,
            enhance_semantic_colors: true,
            semantic_boost_amount: 0.3,
        }
    }
}

impl CategorizationConfig {
    /// The contrast target foregrounds must reach.
    pub fn min_contrast(&self) -> f32 {
        if self.require_aaa {
            7.0
        } else {
            self.min_contrast_ratio
        }
    }
}

/// Role-indexed categorization result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategorizedPalette {
    colors: BTreeMap<Role, CategorizedColor>,
    theme_type: ThemeType,
    all_colors: Vec<CategorizedColor>,
}

impl CategorizedPalette {
    pub fn new(theme_type: ThemeType) -> Self {
        Self {
            theme_type,
            ..Self::default()
        }
    }

    pub fn get(&self, role: Role) -> Option<&CategorizedColor> {
        self.colors.get(&role)
    }

    pub fn has(&self, role: Role) -> bool {
        self.colors.contains_key(&role)
    }

    /// Color at `index` in the luminance-sorted list.
    pub fn get_by_index(&self, index: usize) -> Option<&CategorizedColor> {
        self.all_colors.get(index)
    }

    /// Assigned roles with their colors, in canonical role order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &CategorizedColor)> {
        self.colors.iter().map(|(role, color)| (*role, color))
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.colors.keys().copied()
    }

    /// Every role color plus unassigned extras, sorted by luminance and indexed.
    pub fn all_colors(&self) -> &[CategorizedColor] {
        &self.all_colors
    }

    pub fn theme_type(&self) -> ThemeType {
        self.theme_type
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn set(&mut self, role: Role, color: CategorizedColor) {
        self.colors.insert(
            role,
            CategorizedColor {
                role: Some(role),
                ..color
            },
        );
    }

    /// Build `all_colors` from the role map plus `extras`, sorted by luminance
    /// (dark themes ascending, light themes descending), and stamp indices.
    pub(crate) fn finalize(&mut self, extras: Vec<CategorizedColor>) {
        let mut all: Vec<CategorizedColor> = self.colors.values().copied().collect();
        all.extend(extras);
        sort_by_luminance(&mut all, self.theme_type);

        for (i, color) in all.iter_mut().enumerate() {
            color.index = Some(i);
            if let Some(role) = color.role {
                if let Some(entry) = self.colors.get_mut(&role) {
                    entry.index = Some(i);
                }
            }
        }
        self.all_colors = all;
    }
}

/// Stable luminance sort: ascending for dark themes, descending otherwise.
pub(crate) fn sort_by_luminance(colors: &mut [CategorizedColor], theme: ThemeType) {
    if theme.is_dark() {
        colors.sort_by(|a, b| a.luminance.total_cmp(&b.luminance));
    } else {
        colors.sort_by(|a, b| b.luminance.total_cmp(&a.luminance));
    }
}
