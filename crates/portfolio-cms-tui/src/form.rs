//! Single-line text forms used for editing content in place.
//!
//! A form is a list of labelled inputs plus the action it performs on
//! submit. Multi-line values (employment bullets) are typed with `|` as the
//! line separator.

use portfolio_cms_core::models::{
    Employment, EmploymentDraft, NewSkill, ProfileUpdate, Project, ProjectDraft, SocialLinks,
    UserProfile,
};

/// Maximum length of any single form input
const MAX_INPUT_LENGTH: usize = 500;

/// Separator standing in for a newline in single-line inputs
pub const LINE_SEPARATOR: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Profile,
    NewProject,
    EditProject,
    NewSkill,
    NewEmployment,
    EditEmployment,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Profile => "Edit Profile",
            FormKind::NewProject => "New Project",
            FormKind::EditProject => "Edit Project",
            FormKind::NewSkill => "New Skill",
            FormKind::NewEmployment => "New Employment",
            FormKind::EditEmployment => "Edit Employment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub label: &'static str,
    pub value: String,
}

impl FormInput {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    /// Id of the record being edited
    pub target_id: Option<String>,
    pub inputs: Vec<FormInput>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    fn new(kind: FormKind, target_id: Option<String>, inputs: Vec<FormInput>) -> Self {
        Self {
            kind,
            target_id,
            inputs,
            focus: 0,
            error: None,
        }
    }

    // ===== Constructors =====

    pub fn profile(user: &UserProfile) -> Self {
        let links = &user.social_links;
        Self::new(
            FormKind::Profile,
            Some(user.id.clone()),
            vec![
                FormInput::new("Full name", user.full_name.as_str()),
                FormInput::new("Job title", user.job_title.as_str()),
                FormInput::new("Bio", user.bio.as_str()),
                FormInput::new("GitHub", links.github.clone().unwrap_or_default()),
                FormInput::new("LinkedIn", links.linkedin.clone().unwrap_or_default()),
                FormInput::new("Facebook", links.facebook.clone().unwrap_or_default()),
                FormInput::new("GitLab", links.gitlab.clone().unwrap_or_default()),
            ],
        )
    }

    pub fn new_project() -> Self {
        Self::project(FormKind::NewProject, None, &ProjectDraft::default())
    }

    pub fn edit_project(project: &Project) -> Self {
        Self::project(
            FormKind::EditProject,
            Some(project.id.clone()),
            &ProjectDraft::from_project(project),
        )
    }

    fn project(kind: FormKind, target_id: Option<String>, draft: &ProjectDraft) -> Self {
        Self::new(
            kind,
            target_id,
            vec![
                FormInput::new("Title", draft.title.as_str()),
                FormInput::new("Category", draft.category.as_str()),
                FormInput::new("Description", draft.description.as_str()),
                FormInput::new("Tags", draft.tags.as_str()),
                FormInput::new("Live URL", draft.live_url.as_str()),
                FormInput::new("Repo URL", draft.repo_url.as_str()),
            ],
        )
    }

    pub fn new_skill() -> Self {
        Self::new(
            FormKind::NewSkill,
            None,
            vec![
                FormInput::new("Name", ""),
                FormInput::new("Category", ""),
                FormInput::new("Icon", ""),
            ],
        )
    }

    pub fn new_employment() -> Self {
        Self::employment(FormKind::NewEmployment, None, &EmploymentDraft::default())
    }

    pub fn edit_employment(entry: &Employment) -> Self {
        Self::employment(
            FormKind::EditEmployment,
            Some(entry.id.clone()),
            &EmploymentDraft::from_employment(entry),
        )
    }

    fn employment(kind: FormKind, target_id: Option<String>, draft: &EmploymentDraft) -> Self {
        let description = draft
            .description
            .lines()
            .collect::<Vec<_>>()
            .join(&format!(" {} ", LINE_SEPARATOR));
        Self::new(
            kind,
            target_id,
            vec![
                FormInput::new("Title", draft.title.as_str()),
                FormInput::new("Company", draft.company.as_str()),
                FormInput::new("Location", draft.location.as_str()),
                FormInput::new("Start date", draft.start_date.as_str()),
                FormInput::new("End date", draft.end_date.as_str()),
                FormInput::new("Description", description),
            ],
        )
    }

    // ===== Editing =====

    pub fn next_input(&mut self) {
        self.focus = (self.focus + 1) % self.inputs.len().max(1);
    }

    pub fn prev_input(&mut self) {
        let len = self.inputs.len().max(1);
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn is_last_input(&self) -> bool {
        self.focus + 1 >= self.inputs.len()
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            if can_add_input_char(input.value.chars().count(), c) {
                input.value.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            input.value.pop();
        }
    }

    fn value(&self, index: usize) -> String {
        self.inputs
            .get(index)
            .map(|i| i.value.trim().to_string())
            .unwrap_or_default()
    }

    fn optional(&self, index: usize) -> Option<String> {
        Some(self.value(index)).filter(|v| !v.is_empty())
    }

    // ===== Conversions =====

    /// Profile changes; social links keep any extra networks from `current`
    pub fn profile_update(&self, current: &UserProfile) -> ProfileUpdate {
        ProfileUpdate {
            full_name: Some(self.value(0)),
            job_title: Some(self.value(1)),
            bio: Some(self.value(2)),
            social_links: Some(SocialLinks {
                github: self.optional(3),
                linkedin: self.optional(4),
                facebook: self.optional(5),
                gitlab: self.optional(6),
                other: current.social_links.other.clone(),
            }),
            ..Default::default()
        }
    }

    pub fn project_draft(&self) -> ProjectDraft {
        ProjectDraft {
            title: self.value(0),
            category: self.value(1),
            description: self.value(2),
            tags: self.value(3),
            live_url: self.value(4),
            repo_url: self.value(5),
            image: None,
        }
    }

    pub fn new_skill_value(&self) -> NewSkill {
        NewSkill {
            name: self.value(0),
            category: self.value(1),
            icon: self.value(2),
        }
    }

    pub fn employment_draft(&self) -> EmploymentDraft {
        EmploymentDraft {
            title: self.value(0),
            company: self.value(1),
            location: self.value(2),
            start_date: self.value(3),
            end_date: self.value(4),
            description: self.value(5).replace(LINE_SEPARATOR, "\n"),
        }
    }
}

/// Check if a form character should be accepted
pub fn can_add_input_char(current_len: usize, c: char) -> bool {
    current_len < MAX_INPUT_LENGTH && !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_cms_core::models::split_bullets;

    #[test]
    fn test_focus_wraps() {
        let mut form = FormState::new_skill();
        assert_eq!(form.focus, 0);
        form.prev_input();
        assert_eq!(form.focus, 2);
        assert!(form.is_last_input());
        form.next_input();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_typing_edits_focused_input() {
        let mut form = FormState::new_skill();
        for c in "Rust".chars() {
            form.push_char(c);
        }
        form.next_input();
        form.push_char('X');
        form.pop_char();
        form.push_char('\n');
        assert_eq!(form.inputs[0].value, "Rust");
        assert_eq!(form.inputs[1].value, "");
    }

    #[test]
    fn test_can_add_input_char() {
        assert!(can_add_input_char(0, 'a'));
        assert!(can_add_input_char(499, '|'));
        assert!(!can_add_input_char(500, 'a'));
        assert!(!can_add_input_char(0, '\t'));
    }

    #[test]
    fn test_project_form_round_trip() {
        let project = Project {
            id: "p1".into(),
            title: "Site".into(),
            category: "Web".into(),
            description: "My site".into(),
            tags: vec!["rust".into(), "web".into()],
            ..Default::default()
        };
        let form = FormState::edit_project(&project);
        assert_eq!(form.target_id.as_deref(), Some("p1"));
        assert_eq!(form.inputs[3].value, "rust, web");
        assert!(!form.project_draft().differs_from(&project));
    }

    #[test]
    fn test_employment_description_separator() {
        let entry = Employment {
            id: "e1".into(),
            title: "Engineer".into(),
            company: "Acme".into(),
            description: vec!["Built things".into(), "Fixed things".into()],
            ..Default::default()
        };
        let form = FormState::edit_employment(&entry);
        assert_eq!(form.inputs[5].value, "Built things | Fixed things");

        let draft = form.employment_draft();
        assert_eq!(split_bullets(&draft.description), entry.description);
    }

    #[test]
    fn test_profile_update_keeps_extra_links() {
        let mut user = UserProfile {
            full_name: "Jane".into(),
            ..Default::default()
        };
        user.social_links
            .other
            .insert("mastodon".into(), Some("https://m.example/@jane".into()));

        let mut form = FormState::profile(&user);
        form.focus = 3;
        for c in "https://github.com/jane".chars() {
            form.push_char(c);
        }

        let update = form.profile_update(&user);
        assert_eq!(update.full_name.as_deref(), Some("Jane"));
        let links = update.social_links.unwrap();
        assert_eq!(links.github.as_deref(), Some("https://github.com/jane"));
        assert_eq!(links.linkedin, None);
        assert!(links.other.contains_key("mastodon"));
    }
}
