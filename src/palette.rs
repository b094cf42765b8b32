//! The two Kitty palettes and the rule choosing between them.

use std::fmt;

/// Images at or above this brightness get the dark-text palette.
pub const BRIGHT_THRESHOLD: f64 = 0.65;

/// Number of entries in every palette.
pub const PALETTE_LEN: usize = 20;

const LIGHT_BG: [(&str, &str); PALETTE_LEN] = [
    ("foreground", "#111111"),
    ("cursor", "#111111"),
    ("selection_foreground", "#111111"),
    ("selection_background", "#d6d6d6"),
    ("color0", "#111111"),
    ("color1", "#8f1d21"),
    ("color2", "#1f7a32"),
    ("color3", "#6b5800"),
    ("color4", "#004f95"),
    ("color5", "#6a2e8a"),
    ("color6", "#006c79"),
    ("color7", "#8f8f8f"),
    ("color8", "#4d4d4d"),
    ("color9", "#b33a3f"),
    ("color10", "#2f9951"),
    ("color11", "#8c7300"),
    ("color12", "#2a73ba"),
    ("color13", "#8d3ab5"),
    ("color14", "#008b9c"),
    ("color15", "#111111"),
];

const DARK_BG: [(&str, &str); PALETTE_LEN] = [
    ("foreground", "#f0f0f0"),
    ("cursor", "#f0f0f0"),
    ("selection_foreground", "#111111"),
    ("selection_background", "#f0f0f0"),
    ("color0", "#1a1a1a"),
    ("color1", "#ff6b6b"),
    ("color2", "#8ce99a"),
    ("color3", "#ffd43b"),
    ("color4", "#74c0fc"),
    ("color5", "#d0bfff"),
    ("color6", "#66d9e8"),
    ("color7", "#dee2e6"),
    ("color8", "#6c757d"),
    ("color9", "#ff8787"),
    ("color10", "#b2f2bb"),
    ("color11", "#ffe066"),
    ("color12", "#a5d8ff"),
    ("color13", "#e5dbff"),
    ("color14", "#99e9f2"),
    ("color15", "#ffffff"),
];

/// Requested text color, usually from `POKEMON_TERMINAL_KITTY_TEXT_MODE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Decide from the image brightness.
    #[default]
    Auto,
    /// Light text, so the background is assumed dark.
    Light,
    /// Dark text, so the background is assumed bright.
    Dark,
}

impl TextMode {
    /// Parse a text mode case-insensitively. Anything other than `light` or
    /// `dark` means `Auto`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Self::Light,
            "dark" => Self::Dark,
            _ => Self::Auto,
        }
    }
}

impl fmt::Display for TextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMode::Auto => write!(f, "auto"),
            TextMode::Light => write!(f, "light"),
            TextMode::Dark => write!(f, "dark"),
        }
    }
}

/// One of the two fixed 16-color palettes with their accent colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Tuned for bright images: dark text.
    LightBackground,
    /// Tuned for dark images: light text.
    DarkBackground,
}

impl Palette {
    /// Pick the palette for an image of the given brightness.
    ///
    /// An explicit text mode wins over the brightness. Note the inversion:
    /// asking for light text selects the palette made for dark backgrounds.
    #[must_use]
    pub fn select(brightness: f64, mode: TextMode) -> Self {
        let light_text = match mode {
            TextMode::Light => true,
            TextMode::Dark => false,
            TextMode::Auto => brightness < BRIGHT_THRESHOLD,
        };
        if light_text {
            Self::DarkBackground
        } else {
            Self::LightBackground
        }
    }

    /// All entries in the order Kitty receives them.
    #[must_use]
    pub fn entries(self) -> &'static [(&'static str, &'static str); PALETTE_LEN] {
        match self {
            Self::LightBackground => &LIGHT_BG,
            Self::DarkBackground => &DARK_BG,
        }
    }

    /// The foreground (text) color.
    #[must_use]
    pub fn foreground(self) -> &'static str {
        self.entries()[0].1
    }

    /// `key=value` arguments for `kitty @ set-colors`.
    #[must_use]
    pub fn to_kitty_args(self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect()
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Palette::LightBackground => write!(f, "light-background"),
            Palette::DarkBackground => write!(f, "dark-background"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_uses_threshold() {
        for b in [0.0, 0.3, 0.5, 0.64, 0.649_999] {
            let palette = Palette::select(b, TextMode::Auto);
            assert_eq!(palette, Palette::DarkBackground, "{b}");
        }
        for b in [0.65, 0.66, 0.82, 1.0] {
            let palette = Palette::select(b, TextMode::Auto);
            assert_eq!(palette, Palette::LightBackground, "{b}");
        }
    }

    #[test]
    fn test_override_ignores_brightness() {
        for b in [0.0, 0.5, 0.65, 1.0] {
            assert_eq!(Palette::select(b, TextMode::Dark), Palette::LightBackground);
            assert_eq!(Palette::select(b, TextMode::Light), Palette::DarkBackground);
        }
    }

    #[test]
    fn test_text_mode_parse() {
        assert_eq!(TextMode::parse("light"), TextMode::Light);
        assert_eq!(TextMode::parse("LIGHT"), TextMode::Light);
        assert_eq!(TextMode::parse(" Dark "), TextMode::Dark);
        assert_eq!(TextMode::parse("auto"), TextMode::Auto);
        assert_eq!(TextMode::parse("sepia"), TextMode::Auto);
        assert_eq!(TextMode::parse(""), TextMode::Auto);
    }

    #[test]
    fn test_palette_keys() {
        for palette in [Palette::LightBackground, Palette::DarkBackground] {
            let keys: Vec<&str> = palette.entries().iter().map(|(k, _)| *k).collect();
            assert_eq!(
                &keys[..4],
                &["foreground", "cursor", "selection_foreground", "selection_background"]
            );
            for i in 0..16 {
                assert_eq!(keys[4 + i], format!("color{i}"));
            }
        }
    }

    #[test]
    fn test_palette_values_are_hex() {
        for palette in [Palette::LightBackground, Palette::DarkBackground] {
            for (key, value) in palette.entries() {
                let digits = value.strip_prefix('#').unwrap_or_default();
                assert_eq!(digits.len(), 6, "{key}={value}");
                assert!(digits.chars().all(|c| c.is_ascii_hexdigit()), "{key}={value}");
            }
        }
    }

    #[test]
    fn test_foregrounds() {
        assert_eq!(Palette::LightBackground.foreground(), "#111111");
        assert_eq!(Palette::DarkBackground.foreground(), "#f0f0f0");
    }

    #[test]
    fn test_kitty_args() {
        let args = Palette::DarkBackground.to_kitty_args();
        assert_eq!(args.len(), PALETTE_LEN);
        assert_eq!(args[0], "foreground=#f0f0f0");
        assert_eq!(args[19], "color15=#ffffff");
        let args = Palette::LightBackground.to_kitty_args();
        assert_eq!(args[8], "color4=#004f95");
    }
}
