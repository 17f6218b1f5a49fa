use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::Serialize;

/// Semantic slot a color can occupy in a categorized palette.
///
/// The set is closed: callers can only hint roles that exist here. Variant order
/// is the canonical role order used for iteration and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    // Core.
    Background,
    BackgroundMuted,
    Foreground,
    ForegroundMuted,

    // Accents.
    Accent1,
    Accent1Muted,
    Accent2,
    Accent2Muted,
    Accent3,
    Accent3Muted,
    Accent4,
    Accent4Muted,

    // Semantic.
    Danger,
    Warning,
    Success,
    Info,
    Notification,

    // Surfaces and borders.
    Surface,
    OnSurface,
    Outline,
    Border,
    SurfaceVariant,
    OnSurfaceVariant,
    BorderMuted,
    OutlineVariant,

    // On-colors.
    OnAccent1,
    OnAccent2,
    OnAccent3,
    OnAccent4,
    OnDanger,
    OnWarning,
    OnSuccess,
    OnInfo,
    OnNotification,

    // Inverse, overlays and elevation.
    InverseSurface,
    InverseOnSurface,
    InversePrimary,
    Scrim,
    Shadow,
    SurfaceContainerLowest,
    SurfaceContainerLow,
    SurfaceContainer,
    SurfaceContainerHigh,
    SurfaceContainerHighest,
}

impl Role {
    pub const ALL: [Role; 44] = [
        Role::Background,
        Role::BackgroundMuted,
        Role::Foreground,
        Role::ForegroundMuted,
        Role::Accent1,
        Role::Accent1Muted,
        Role::Accent2,
        Role::Accent2Muted,
        Role::Accent3,
        Role::Accent3Muted,
        Role::Accent4,
        Role::Accent4Muted,
        Role::Danger,
        Role::Warning,
        Role::Success,
        Role::Info,
        Role::Notification,
        Role::Surface,
        Role::OnSurface,
        Role::Outline,
        Role::Border,
        Role::SurfaceVariant,
        Role::OnSurfaceVariant,
        Role::BorderMuted,
        Role::OutlineVariant,
        Role::OnAccent1,
        Role::OnAccent2,
        Role::OnAccent3,
        Role::OnAccent4,
        Role::OnDanger,
        Role::OnWarning,
        Role::OnSuccess,
        Role::OnInfo,
        Role::OnNotification,
        Role::InverseSurface,
        Role::InverseOnSurface,
        Role::InversePrimary,
        Role::Scrim,
        Role::Shadow,
        Role::SurfaceContainerLowest,
        Role::SurfaceContainerLow,
        Role::SurfaceContainer,
        Role::SurfaceContainerHigh,
        Role::SurfaceContainerHighest,
    ];

    /// Accent roles paired with their muted variants, in accent order.
    pub const ACCENTS: [(Role, Role); 4] = [
        (Role::Accent1, Role::Accent1Muted),
        (Role::Accent2, Role::Accent2Muted),
        (Role::Accent3, Role::Accent3Muted),
        (Role::Accent4, Role::Accent4Muted),
    ];

    pub const SEMANTIC: [Role; 5] = [
        Role::Danger,
        Role::Warning,
        Role::Success,
        Role::Info,
        Role::Notification,
    ];

    /// camelCase name, as used in hints and serialized output.
    pub fn name(self) -> &'static str {
        match self {
            Role::Background => "background",
            Role::BackgroundMuted => "backgroundMuted",
            Role::Foreground => "foreground",
            Role::ForegroundMuted => "foregroundMuted",
            Role::Accent1 => "accent1",
            Role::Accent1Muted => "accent1Muted",
            Role::Accent2 => "accent2",
            Role::Accent2Muted => "accent2Muted",
            Role::Accent3 => "accent3",
            Role::Accent3Muted => "accent3Muted",
            Role::Accent4 => "accent4",
            Role::Accent4Muted => "accent4Muted",
            Role::Danger => "danger",
            Role::Warning => "warning",
            Role::Success => "success",
            Role::Info => "info",
            Role::Notification => "notification",
            Role::Surface => "surface",
            Role::OnSurface => "onSurface",
            Role::Outline => "outline",
            Role::Border => "border",
            Role::SurfaceVariant => "surfaceVariant",
            Role::OnSurfaceVariant => "onSurfaceVariant",
            Role::BorderMuted => "borderMuted",
            Role::OutlineVariant => "outlineVariant",
            Role::OnAccent1 => "onAccent1",
            Role::OnAccent2 => "onAccent2",
            Role::OnAccent3 => "onAccent3",
            Role::OnAccent4 => "onAccent4",
            Role::OnDanger => "onDanger",
            Role::OnWarning => "onWarning",
            Role::OnSuccess => "onSuccess",
            Role::OnInfo => "onInfo",
            Role::OnNotification => "onNotification",
            Role::InverseSurface => "inverseSurface",
            Role::InverseOnSurface => "inverseOnSurface",
            Role::InversePrimary => "inversePrimary",
            Role::Scrim => "scrim",
            Role::Shadow => "shadow",
            Role::SurfaceContainerLowest => "surfaceContainerLowest",
            Role::SurfaceContainerLow => "surfaceContainerLow",
            Role::SurfaceContainer => "surfaceContainer",
            Role::SurfaceContainerHigh => "surfaceContainerHigh",
            Role::SurfaceContainerHighest => "surfaceContainerHighest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.name() == s)
            .ok_or_else(|| anyhow!("unknown color role: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        for pair in Role::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.name().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "accent5".parse::<Role>().unwrap_err().to_string();
        assert!(err.contains("accent5"), "unexpected error: {err}");
    }

    #[test]
    fn serializes_as_camel_case() {
        let json = serde_json::to_string(&Role::SurfaceContainerHighest).unwrap();
        assert_eq!(json, "\"surfaceContainerHighest\"");
    }
}
