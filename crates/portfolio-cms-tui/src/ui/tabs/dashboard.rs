use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6)])
        .split(area);

    let name = app.user().map(|u| u.display_name()).unwrap_or_default();
    let greeting = Paragraph::new(vec![
        Line::from(Span::styled(format!("Welcome back, {}", name), styles::title_style())),
        Line::from(Span::styled(
            "Manage your portfolio content from the tabs above.",
            styles::muted_style(),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).border_style(styles::border_style(false)));
    frame.render_widget(greeting, chunks[0]);

    let lines = match app.stats {
        Some(stats) => vec![
            stat_line("Projects", stats.projects),
            stat_line("Skills", stats.skills),
            stat_line("Employment", stats.employment),
            stat_line("Messages", stats.messages),
            Line::from(vec![
                Span::styled(format!("  {:<14}", "Unread"), styles::highlight_style()),
                Span::styled(
                    stats.unread_messages.to_string(),
                    if stats.unread_messages > 0 {
                        styles::success_style()
                    } else {
                        styles::list_item_style()
                    },
                ),
            ]),
        ],
        None => vec![Line::from(Span::styled("  Loading...", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Overview ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}

fn stat_line(label: &str, count: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<14}", label), styles::highlight_style()),
        Span::styled(count.to_string(), styles::list_item_style()),
    ])
}
