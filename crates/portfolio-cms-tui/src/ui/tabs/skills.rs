use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::ListItem,
    Frame,
};

use portfolio_cms_core::models::group_by_category;

use super::{field, no_selection, render_detail, render_list, split};
use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let (list_area, detail_area) = split(area);

    // Same order as App::skills_in_display_order, with the category shown inline
    let items: Vec<ListItem> = group_by_category(&app.skills)
        .into_iter()
        .flat_map(|(category, members)| {
            members.into_iter().map(move |skill| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<16}", category), styles::muted_style()),
                    Span::raw(skill.name.clone()),
                ]))
            })
        })
        .collect();
    render_list(
        frame,
        list_area,
        format!(" Skills ({}) ", app.skills.len()),
        items,
        app.skill_selection,
        "No skills yet. Press n to add one.",
    );

    let (title, lines) = match app.selected_skill() {
        Some(skill) => (
            format!(" {} ", skill.name),
            vec![
                field("Category: ", &skill.category),
                field("Icon:     ", &skill.icon),
            ],
        ),
        None => no_selection("Select a skill from the list"),
    };
    render_detail(frame, detail_area, title, lines);
}
