use crossterm::style::{Color as TermColor, Stylize};

use crate::color::Color;
use crate::role::Role;
use crate::theme::CategorizedPalette;

const SWATCH_WIDTH: usize = 8;

const HEADER: [&str; 9] = [
    "", "Preview", "Role", "Index", "Hex", "Luminance", "Saturation", "Weight", "Source",
];

/// One line: theme type and, when both exist, the foreground/background contrast.
pub fn summary(palette: &CategorizedPalette) -> String {
    let mut line = format!("Theme Type: {}", palette.theme_type());
    if let (Some(bg), Some(fg)) = (palette.get(Role::Background), palette.get(Role::Foreground)) {
        line.push_str(&format!(" | Contrast: {:.2}:1", fg.contrast_with(bg)));
    }
    line.push('\n');
    line
}

/// A block of `width` spaces painted in `color`.
pub fn swatch(color: Color, width: usize) -> String {
    " ".repeat(width)
        .on(TermColor::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        })
        .to_string()
}

/// Aligned table of every color in luminance order. The background row is
/// marked with `>`. Swatches are ANSI true-color blocks; pass `false` for
/// plain output.
pub fn table(palette: &CategorizedPalette, swatches: bool) -> String {
    let rows: Vec<([String; 9], Color)> = palette
        .all_colors()
        .iter()
        .map(|c| {
            let marker = if c.role == Some(Role::Background) { ">" } else { " " };
            let weight = if c.weight > 0.0 {
                format!("{:.1}%", c.weight * 100.0)
            } else {
                "-".to_string()
            };
            let cells = [
                marker.to_string(),
                String::new(),
                c.role.map_or_else(|| "-".to_string(), |r| r.to_string()),
                c.index.map_or_else(|| "-".to_string(), |i| format!("color{i}")),
                c.color.to_hex(),
                format!("{:.2}", c.luminance),
                format!("{:.2}", c.saturation),
                weight,
                if c.is_generated { "generated" } else { "extracted" }.to_string(),
            ];
            (cells, c.color)
        })
        .collect();

    let mut widths: Vec<usize> = HEADER.iter().map(|h| h.len()).collect();
    widths[1] = widths[1].max(SWATCH_WIDTH);
    for (cells, _) in &rows {
        for (i, cell) in cells.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::from("All Colors (sorted by luminance):\n");
    let header: Vec<String> = HEADER
        .iter()
        .zip(widths.iter().copied())
        .map(|(h, w)| format!("{h:<w$}"))
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ").trim_end()));

    for (cells, color) in &rows {
        let line: Vec<String> = cells
            .iter()
            .zip(widths.iter().copied())
            .enumerate()
            .map(|(i, (cell, w))| {
                if i == 1 {
                    let block = if swatches {
                        swatch(*color, SWATCH_WIDTH)
                    } else {
                        " ".repeat(SWATCH_WIDTH)
                    };
                    format!("{block}{}", " ".repeat(w - SWATCH_WIDTH))
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect();
        out.push_str(&format!("  {}\n", line.join("  ").trim_end()));
    }
    out
}
