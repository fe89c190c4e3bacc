//! Semantic terminal palette for the UI.

use ratatui::style::Color;

/// Colors keyed by role rather than by widget
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,      // Active borders, highlights, selected field
    pub danger: Color,      // Error alerts
    pub success: Color,     // Result values
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Hints, placeholders, footer
    pub inactive: Color,    // Inactive borders
    pub bg_selected: Color, // Dropdown selection background
    pub header: Color,      // Result block labels
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(137, 180, 250),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
            bg_selected: Color::Rgb(69, 71, 90),
            header: Color::Rgb(250, 179, 135),
        }
    }
}
