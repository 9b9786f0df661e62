//! Color palette for the search TUI, dark and light.
//!
//! Muted base colors with a single warm accent for the submit affordance,
//! so highlights stay legible on both variants.

use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy, Debug)]
pub struct ThemePalette {
    pub bg: Color,
    pub surface: Color,
    pub fg: Color,
    pub hint: Color,
    pub accent: Color,
    pub accent_alt: Color,
    pub border: Color,
}

impl ThemePalette {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(26, 27, 38),
            surface: Color::Rgb(36, 40, 59),
            fg: Color::Rgb(192, 202, 245),
            hint: Color::Rgb(105, 114, 158),
            accent: Color::Rgb(217, 224, 94),
            accent_alt: Color::Rgb(122, 162, 247),
            border: Color::Rgb(59, 66, 97),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 245),
            surface: Color::Rgb(255, 255, 255),
            fg: Color::Rgb(17, 24, 39),
            hint: Color::Rgb(120, 126, 140),
            accent: Color::Rgb(150, 156, 40),
            accent_alt: Color::Rgb(37, 99, 235),
            border: Color::Rgb(209, 213, 219),
        }
    }

    pub fn title(self) -> Style {
        Style::default().fg(self.accent_alt).add_modifier(Modifier::BOLD)
    }

    /// Uppercase section labels inside the suggestion panel.
    pub fn group_header(self) -> Style {
        Style::default().fg(self.hint).add_modifier(Modifier::ITALIC)
    }

    pub fn highlight(self) -> Style {
        Style::default()
            .bg(self.accent_alt)
            .fg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn focused_border(self) -> Style {
        Style::default().fg(self.accent_alt)
    }

    pub fn idle_border(self) -> Style {
        Style::default().fg(self.border)
    }
}
