//! Color palettes and shared styles for the dashboard.
//!
//! Both palettes follow Tailwind CSS color names.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

/// Palette used by every widget.
#[derive(Debug, Clone, Copy)]
pub struct AppTheme {
    pub primary: Color,

    // Range status and severity
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,

    // Pomodoro phases
    pub focus: Color,
    pub rest: Color,
    pub long_rest: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub border_active: Color,
    pub border_inactive: Color,

    pub bg_selected: Color,
    pub bg_header: Color,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl AppTheme {
    /// Dark palette.
    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::Rgb(45, 212, 191), // teal-400

            success: Color::Rgb(74, 222, 128), // green-400
            warning: Color::Rgb(251, 191, 36), // amber-400
            danger: Color::Rgb(248, 113, 113), // red-400
            info: Color::Rgb(96, 165, 250),    // blue-400

            focus: Color::Rgb(251, 113, 133),    // rose-400
            rest: Color::Rgb(52, 211, 153),      // emerald-400
            long_rest: Color::Rgb(129, 140, 248), // indigo-400

            text_primary: Color::Rgb(248, 250, 252),   // slate-50
            text_secondary: Color::Rgb(148, 163, 184), // slate-400
            text_muted: Color::Rgb(100, 116, 139),     // slate-500

            border_active: Color::Rgb(45, 212, 191), // teal-400
            border_inactive: Color::Rgb(71, 85, 105), // slate-600

            bg_selected: Color::Rgb(51, 65, 85), // slate-700
            bg_header: Color::Rgb(30, 41, 59),   // slate-800
        }
    }

    /// Light palette, one or two shades darker for contrast.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::Rgb(13, 148, 136), // teal-600

            success: Color::Rgb(22, 163, 74), // green-600
            warning: Color::Rgb(217, 119, 6), // amber-600
            danger: Color::Rgb(220, 38, 38),  // red-600
            info: Color::Rgb(37, 99, 235),    // blue-600

            focus: Color::Rgb(225, 29, 72),     // rose-600
            rest: Color::Rgb(5, 150, 105),      // emerald-600
            long_rest: Color::Rgb(79, 70, 229), // indigo-600

            text_primary: Color::Rgb(15, 23, 42),    // slate-900
            text_secondary: Color::Rgb(71, 85, 105), // slate-600
            text_muted: Color::Rgb(148, 163, 184),   // slate-400

            border_active: Color::Rgb(13, 148, 136), // teal-600
            border_inactive: Color::Rgb(203, 213, 225), // slate-300

            bg_selected: Color::Rgb(226, 232, 240), // slate-200
            bg_header: Color::Rgb(241, 245, 249),   // slate-100
        }
    }

    #[inline]
    #[must_use]
    pub fn border_active_style(&self) -> Style {
        Style::default().fg(self.border_active)
    }

    /// Highlighted list row.
    #[inline]
    #[must_use]
    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.bg_selected)
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Block titles.
    #[inline]
    #[must_use]
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[inline]
    #[must_use]
    pub fn header_style(&self) -> Style {
        Style::default().bg(self.bg_header)
    }

    /// Secondary labels such as units and ranges.
    #[inline]
    #[must_use]
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted)
    }
}

/// Border type for every block.
pub const BORDER_TYPE: BorderType = BorderType::Rounded;
