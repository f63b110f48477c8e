//! Portfolio CMS palette: teal chrome, violet accents, slate backgrounds.

use ratatui::style::{Color, Modifier, Style};

use portfolio_cms_core::models::MessageStatus;

// Color palette
pub const TEAL: Color = Color::Rgb(38, 166, 154);
pub const VIOLET: Color = Color::Rgb(170, 130, 230);
pub const MINT: Color = Color::Rgb(120, 200, 150);
pub const CORAL: Color = Color::Rgb(240, 110, 100);
pub const SLATE: Color = Color::Rgb(120, 134, 150);
pub const INK: Color = Color::Rgb(30, 41, 59);
pub const PAPER: Color = Color::Rgb(226, 232, 240);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(INK).fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(PAPER)
}

pub fn muted_style() -> Style {
    Style::default().fg(SLATE)
}

pub fn highlight_style() -> Style {
    Style::default().fg(VIOLET)
}

pub fn success_style() -> Style {
    Style::default().fg(MINT)
}

pub fn error_style() -> Style {
    Style::default().fg(CORAL)
}

/// Inbox row style by message status
pub fn message_style(status: MessageStatus) -> Style {
    match status {
        MessageStatus::Unread => Style::default().fg(PAPER).add_modifier(Modifier::BOLD),
        MessageStatus::Read => list_item_style(),
        MessageStatus::Archived | MessageStatus::Deleted => {
            muted_style().add_modifier(Modifier::ITALIC)
        }
    }
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(TEAL)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(TEAL)
    } else {
        muted_style()
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(INK).fg(PAPER)
}

pub fn help_key_style() -> Style {
    Style::default().fg(VIOLET).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}
