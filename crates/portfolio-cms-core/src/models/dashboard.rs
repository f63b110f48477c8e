use super::{Employment, Message, MessageStatus, Project, Skill};

/// Content counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub projects: usize,
    pub skills: usize,
    pub employment: usize,
    /// Messages not archived or deleted
    pub messages: usize,
    pub unread_messages: usize,
}

impl DashboardStats {
    pub fn compute(
        projects: &[Project],
        skills: &[Skill],
        employment: &[Employment],
        messages: &[Message],
    ) -> Self {
        let inbox = messages.iter().filter(|m| {
            !matches!(m.status, MessageStatus::Archived | MessageStatus::Deleted)
        });
        Self {
            projects: projects.len(),
            skills: skills.len(),
            employment: employment.len(),
            messages: inbox.clone().count(),
            unread_messages: inbox.filter(|m| m.is_unread()).count(),
        }
    }
}
