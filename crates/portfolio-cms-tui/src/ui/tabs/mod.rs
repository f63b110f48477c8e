//! Per-tab content rendering.

pub mod dashboard;
pub mod employment;
pub mod messages;
pub mod projects;
pub mod settings;
pub mod skills;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::styles;

/// Left list / right detail split used by the content tabs
pub(crate) fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    (chunks[0], chunks[1])
}

pub(crate) fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    items: Vec<ListItem>,
    selection: usize,
    empty_hint: &str,
) {
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if items.is_empty() {
        let hint = Paragraph::new(Line::from(Span::styled(empty_hint, styles::muted_style()))).block(block);
        frame.render_widget(hint, area);
        return;
    }

    let list = List::new(items).block(block).highlight_style(styles::selected_style());
    let mut state = ListState::default();
    state.select(Some(selection));
    frame.render_stateful_widget(list, area, &mut state);
}

pub(crate) fn render_detail(frame: &mut Frame, area: Rect, title: String, lines: Vec<Line>) {
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

/// `label: value` line, skipped by callers when the value is blank
pub(crate) fn field<'a>(label: &'a str, value: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, styles::highlight_style()),
        Span::raw(value.to_string()),
    ])
}

pub(crate) fn no_selection(hint: &str) -> (String, Vec<Line<'static>>) {
    (
        " Nothing Selected ".to_string(),
        vec![Line::from(Span::styled(hint.to_string(), styles::muted_style()))],
    )
}
