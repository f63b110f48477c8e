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
        .projects
        .iter()
        .map(|p| {
            ListItem::new(Line::from(format!(
                "{:<28} {}",
                truncate(&p.title, 28),
                truncate(&p.category, 14)
            )))
            .style(styles::list_item_style())
        })
        .collect();
    render_list(
        frame,
        list_area,
        format!(" Projects ({}) ", app.projects.len()),
        items,
        app.project_selection,
        "No projects yet. Press n to add one.",
    );

    let (title, lines) = match app.selected_project() {
        Some(project) => {
            let mut lines = vec![
                field("Category: ", &project.category),
                field("Tags:     ", &project.tags_display()),
            ];
            if let Some(ref url) = project.live_url {
                lines.push(field("Live:     ", url));
            }
            if let Some(ref url) = project.repo_url {
                lines.push(field("Repo:     ", url));
            }
            if !project.image_url.is_empty() {
                lines.push(field("Image:    ", &project.image_url));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(project.description.clone()));
            (format!(" {} ", project.title), lines)
        }
        None => no_selection("Select a project from the list"),
    };
    render_detail(frame, detail_area, title, lines);
}
