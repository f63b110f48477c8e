use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use portfolio_cms_core::auth::GuardDecision;

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{dashboard, employment, messages, projects, settings, skills};

pub fn render(frame: &mut Frame, app: &App) {
    match app.guard_decision() {
        GuardDecision::Loading => render_loading(frame),
        GuardDecision::Render(_) if app.shows_layout() => render_layout(frame, app),
        // Tabs only map to protected routes; anything else falls back to login
        _ => render_login(frame, app),
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_confirm_overlay(frame, "Are you sure you want to quit?", "quit");
    }
}

fn render_layout(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::EditingForm => render_form_overlay(frame, app),
        AppState::ConfirmingDelete => {
            if let Some(ref pending) = app.pending_delete {
                let question = format!("Delete {} \"{}\"?", pending.kind.label(), truncate(&pending.name, 24));
                render_confirm_overlay(frame, &question, "delete");
            }
        }
        AppState::ConfirmingLogout => render_confirm_overlay(frame, "Log out of Portfolio CMS?", "log out"),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Portfolio CMS";
    let user = app
        .user()
        .map(|u| format!("{}  [?] Help", u.display_name()))
        .unwrap_or_else(|| "[?] Help".to_string());

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + user.chars().count() + 2),
        )),
        Span::styled(user, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = match tab {
            Tab::Messages => {
                let unread = app.messages.iter().filter(|m| m.is_unread()).count();
                if unread > 0 {
                    format!("[{}] {} ({})", i + 1, tab.title(), unread)
                } else {
                    format!("[{}] {}", i + 1, tab.title())
                }
            }
            _ => format!("[{}] {}", i + 1, tab.title()),
        };
        spans.push(Span::styled(label, styles::tab_style(app.current_tab == *tab)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Projects => projects::render(frame, app, area),
        Tab::Skills => skills::render(frame, app, area),
        Tab::Messages => messages::render(frame, app, area),
        Tab::Employment => employment::render(frame, app, area),
        Tab::Settings => settings::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match app.current_tab {
        Tab::Dashboard => "[u]pdate | [L]ogout | [q]uit",
        Tab::Projects | Tab::Employment => "[n]ew [e]dit [d]elete | [u]pdate | [q]uit",
        Tab::Skills => "[n]ew [d]elete | [u]pdate | [q]uit",
        Tab::Messages => "[r]ead [a]rchive [d]elete | [u]pdate | [q]uit",
        Tab::Settings => "[e]dit | [L]ogout | [q]uit",
    };

    let left_text = match (&app.status_message, app.pending_tasks) {
        (Some(msg), _) => format!(" {} ", msg),
        (None, 0) => String::new(),
        (None, n) => format!(" Loading ({})... ", n),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(styles::status_bar_style()), area);
}

fn render_loading(frame: &mut Frame) {
    let area = centered_rect_fixed(36, 3, frame.area());
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "  Restoring session...",
        styles::muted_style(),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
    frame.render_widget(paragraph, area);
}

fn render_login(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() || app.login_pending { 12 } else { 10 };
    let area = centered_rect_fixed(50, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("  Portfolio CMS", styles::title_style())),
        Line::from(Span::styled("  Sign in to manage your portfolio", styles::muted_style())),
        Line::from(""),
    ];

    let email_focused = app.login_focus == LoginFocus::Email;
    lines.push(login_field(
        "Email:    ",
        &tail(&app.login_email, 28),
        email_focused,
    ));

    let password_focused = app.login_focus == LoginFocus::Password;
    let masked = "*".repeat(app.login_password.chars().count().min(28));
    lines.push(login_field("Password: ", &masked, password_focused));

    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let button = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(vec![
        Span::raw("               ["),
        Span::styled(button, button_style),
        Span::raw("]"),
    ]));

    if app.login_pending {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  Signing in...", styles::muted_style())));
    } else if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn login_field<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(label, styles::muted_style()),
        Span::styled("[", styles::muted_style()),
        Span::styled(format!("{:<28}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_form_overlay(frame: &mut Frame, app: &App) {
    let Some(ref form) = app.form else {
        return;
    };
    let extra = if form.error.is_some() { 2 } else { 0 };
    let height = form.inputs.len() as u16 + 6 + extra;
    let area = centered_rect_fixed(72, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (i, input) in form.inputs.iter().enumerate() {
        let focused = i == form.focus;
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let cursor = if focused { "▌" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", input.label), styles::muted_style()),
            Span::styled(format!("{}{}", tail(&input.value, 52), cursor), style),
        ]));
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Tab/↑↓", styles::help_key_style()),
        Span::styled(" move  ", styles::muted_style()),
        Span::styled("Enter", styles::help_key_style()),
        Span::styled(" next/save  ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(format!(" {} ", form.kind.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 22, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  Portfolio CMS", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        entry("1-6", "Switch tabs"),
        entry("←/→", "Prev/next tab"),
        entry("↑/↓ j/k", "Navigate list"),
        entry("PgUp/PgDn", "Scroll a page"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        entry("n / e", "New / edit"),
        entry("d", "Delete (asks first)"),
        entry("r / a", "Toggle read / archive message"),
        entry("u", "Update from server"),
        entry("L", "Log out"),
        entry("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(52, 7, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" to {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

/// Create a centered rectangle with fixed dimensions
pub(crate) fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Shorten to `max_chars`, keeping the start
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Keep the end of an input in view while typing
fn tail(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_string()
    } else {
        s.chars().skip(count - max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title here", 10), "a longe...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("abc", 5), "abc");
        assert_eq!(tail("abcdef", 3), "def");
    }

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(50, 10, outer), Rect::new(25, 15, 50, 10));
        // Clamped to the available area
        let small = Rect::new(0, 0, 20, 5);
        assert_eq!(centered_rect_fixed(50, 10, small), Rect::new(0, 0, 20, 5));
    }
}
