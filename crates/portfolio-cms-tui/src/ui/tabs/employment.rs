use ratatui::{
    layout::Rect,
    text::Line,
    widgets::ListItem,
    Frame,
};

use super::{field, no_selection, render_detail, render_list, split};
use crate::app::App;
use crate::ui::render::truncate;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (list_area, detail_area) = split(area);

    let items: Vec<ListItem> = app
        .employment
        .iter()
        .map(|e| {
            ListItem::new(Line::from(format!(
                "{:<24} {}",
                truncate(&e.title, 24),
                truncate(&e.company, 20)
            )))
            .style(styles::list_item_style())
        })
        .collect();
    render_list(
        frame,
        list_area,
        format!(" Employment ({}) ", app.employment.len()),
        items,
        app.employment_selection,
        "No employment history yet. Press n to add an entry.",
    );

    let (title, lines) = match app.selected_employment() {
        Some(entry) => {
            let mut lines = vec![
                field("Company:  ", &entry.company),
                field("Location: ", &entry.location),
                field("Period:   ", &entry.period()),
                Line::from(""),
            ];
            lines.extend(entry.description.iter().map(|b| Line::from(format!("  • {}", b))));
            (format!(" {} ", entry.title), lines)
        }
        None => no_selection("Select an entry from the list"),
    };
    render_detail(frame, detail_area, title, lines);
}
