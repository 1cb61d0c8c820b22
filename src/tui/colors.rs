//! Color palettes for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Theme;

/// Primary action color, also used for checked boxes and the active filter.
pub const ACCENT: Color = Color::Rgb(0, 123, 255);
/// Active filter tab in dark mode.
pub const ACCENT_DARK: Color = Color::Rgb(0, 86, 179);
/// Edit affordance.
pub const AMBER: Color = Color::Rgb(255, 193, 7);
/// Delete affordance and error popups.
pub const DANGER: Color = Color::Rgb(220, 53, 69);
/// Save affordance.
pub const SUCCESS: Color = Color::Rgb(40, 167, 69);
/// Cancel affordance and inactive filter tabs.
pub const SLATE: Color = Color::Rgb(108, 117, 125);
/// Title of a completed task.
pub const COMPLETED_TEXT: Color = Color::Rgb(136, 136, 136);

/// Theme-dependent colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub footer: Color,
    pub input_bg: Color,
    pub input_border: Color,
    pub card_bg: Color,
    pub card_border: Color,
    pub active_tab: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Palette {
                background: Color::Rgb(248, 249, 250),
                text: Color::Rgb(0, 0, 0),
                footer: Color::Rgb(136, 136, 136),
                input_bg: Color::Rgb(255, 255, 255),
                input_border: Color::Rgb(206, 212, 218),
                card_bg: Color::Rgb(255, 255, 255),
                card_border: Color::Rgb(222, 226, 230),
                active_tab: ACCENT,
            },
            Theme::Dark => Palette {
                background: Color::Rgb(18, 18, 18),
                text: Color::Rgb(255, 255, 255),
                footer: Color::Rgb(119, 119, 119),
                input_bg: Color::Rgb(42, 42, 42),
                input_border: Color::Rgb(68, 68, 68),
                card_bg: Color::Rgb(30, 30, 30),
                card_border: Color::Rgb(51, 51, 51),
                active_tab: ACCENT_DARK,
            },
        }
    }
}
