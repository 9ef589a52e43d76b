//! Colours per theme.

use ratatui::style::Color;

use wiwik_core::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub error: Color,
}

impl Palette {
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
                border: Color::Gray,
                highlight_fg: Color::White,
                highlight_bg: Color::Blue,
                error: Color::Red,
            },
            Theme::Dark => Self {
                fg: Color::Gray,
                bg: Color::Black,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                border: Color::DarkGray,
                highlight_fg: Color::Black,
                highlight_bg: Color::Cyan,
                error: Color::LightRed,
            },
        }
    }
}
