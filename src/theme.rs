//! Theme colors for the UI, with hex overrides from the config file.
//!
//! The theme is constructed once at startup and owned by the app object;
//! nothing here is process-wide state.

use ratatui::style::Color;

use crate::config::ColorOverrides;
use crate::signal::SignalKind;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Color,     // Green verdict
    pub warning: Color,     // Amber verdict
    pub danger: Color,      // Red verdict, errors
    pub neutral: Color,     // Idle/checking badge
    pub accent: Color,      // Active borders, highlights
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Dimmed text, hints
    pub bg_selected: Color, // Selection background in dropdowns
    pub inactive: Color,    // Inactive borders
    pub header: Color,      // Box titles
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback palette
        Self {
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            neutral: Color::Rgb(147, 153, 178),
            accent: Color::Rgb(250, 179, 135),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(243, 139, 168),
        }
    }
}

impl Theme {
    /// Build the theme from defaults plus config overrides. An override
    /// that fails to parse is ignored.
    pub fn load(overrides: &ColorOverrides) -> Self {
        let mut theme = Self::default();

        let mut apply = |slot: &mut Color, value: &Option<String>| {
            if let Some(s) = value {
                match Self::parse_hex_color(s) {
                    Some(color) => *slot = color,
                    None => tracing::warn!("Ignoring unparseable color override: {}", s),
                }
            }
        };

        let ColorOverrides {
            green,
            amber,
            red,
            neutral,
            accent,
            text,
        } = overrides;

        apply(&mut theme.success, green);
        apply(&mut theme.warning, amber);
        apply(&mut theme.danger, red);
        apply(&mut theme.neutral, neutral);
        apply(&mut theme.accent, accent);
        apply(&mut theme.text, text);

        theme
    }

    /// Badge color for a signal kind.
    pub fn badge(&self, kind: SignalKind) -> Color {
        match kind {
            SignalKind::Green => self.success,
            SignalKind::Amber => self.warning,
            SignalKind::Red => self.danger,
            SignalKind::Neutral => self.neutral,
            SignalKind::Unknown => self.inactive,
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
