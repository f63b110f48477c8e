use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::ListItem,
    Frame,
};

use portfolio_cms_core::models::MessageStatus;

use super::{field, no_selection, render_detail, render_list, split};
use crate::app::App;
use crate::ui::render::truncate;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (list_area, detail_area) = split(area);

    let items: Vec<ListItem> = app
        .messages
        .iter()
        .map(|m| {
            let marker = match m.status {
                MessageStatus::Unread => "● ",
                MessageStatus::Archived => "▪ ",
                _ => "  ",
            };
            let style = styles::message_style(m.status);
            ListItem::new(Line::from(vec![
                Span::styled(marker, styles::highlight_style()),
                Span::styled(
                    format!("{:<18} {}", truncate(&m.sender_name, 18), truncate(&m.subject, 28)),
                    style,
                ),
            ]))
        })
        .collect();
    render_list(
        frame,
        list_area,
        format!(" Messages ({}) ", app.messages.len()),
        items,
        app.message_selection,
        "Inbox is empty",
    );

    let (title, lines) = match app.selected_message() {
        Some(message) => {
            let received = message
                .received_at
                .or(message.created_at)
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let lines = vec![
                field("From:     ", &format!("{} <{}>", message.sender_name, message.sender_email)),
                field("Received: ", &received),
                field("Status:   ", message.status.as_str()),
                Line::from(""),
                Line::from(message.message_body.clone()),
            ];
            (format!(" {} ", message.subject), lines)
        }
        None => no_selection("Select a message from the list"),
    };
    render_detail(frame, detail_area, title, lines);
}
