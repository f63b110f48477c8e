use ratatui::{
    layout::Rect,
    text::{Line, Span},
    Frame,
};

use super::{field, render_detail};
use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(user) = app.user() else {
        render_detail(frame, area, " Settings ".to_string(), Vec::new());
        return;
    };

    let mut lines = vec![
        field("Name:      ", &user.full_name),
        field("Email:     ", &user.email),
        field("Job title: ", &user.job_title),
    ];
    if !user.profile_picture_url.is_empty() {
        lines.push(field("Picture:   ", &user.profile_picture_url));
    }
    if user.is_admin {
        lines.push(Line::from(Span::styled("Administrator", styles::success_style())));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Bio", styles::title_style())));
    lines.push(Line::from(user.bio.clone()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Social links", styles::title_style())));
    let links = user.social_links.entries();
    if links.is_empty() {
        lines.push(Line::from(Span::styled("  None", styles::muted_style())));
    }
    for (network, url) in links {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<10}", network), styles::highlight_style()),
            Span::raw(url.to_string()),
        ]));
    }

    render_detail(frame, area, " Profile ".to_string(), lines);
}
