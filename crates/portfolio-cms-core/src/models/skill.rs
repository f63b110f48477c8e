use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::validation::require;
use super::{null_as_default, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
}

/// A skill as submitted to `POST /skills/add`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewSkill {
    pub name: String,
    pub icon: String,
    pub category: String,
}

impl NewSkill {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "Name")
    }

    pub(crate) fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            icon: self.icon.trim().to_string(),
            category: self.category.trim().to_string(),
        }
    }
}

/// Group skills by category (blank categories become "Other"), names sorted
pub fn group_by_category(skills: &[Skill]) -> BTreeMap<String, Vec<&Skill>> {
    let mut groups: BTreeMap<String, Vec<&Skill>> = BTreeMap::new();
    for skill in skills {
        let category = match skill.category.trim() {
            "" => "Other".to_string(),
            c => c.to_string(),
        };
        groups.entry(category).or_default().push(skill);
    }
    for members in groups.values_mut() {
        members.sort_by_key(|s| s.name.to_lowercase());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, category: &str) -> Skill {
        Skill {
            id: name.to_lowercase(),
            name: name.into(),
            icon: String::new(),
            category: category.into(),
        }
    }

    #[test]
    fn test_group_by_category() {
        let skills = vec![
            skill("Rust", "Languages"),
            skill("Docker", ""),
            skill("Go", "Languages"),
        ];
        let groups = group_by_category(&skills);
        let keys: Vec<&String> = groups.keys().collect();
        assert_eq!(keys, vec!["Languages", "Other"]);
        let names: Vec<&str> = groups["Languages"].iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Go", "Rust"]);
    }

    #[test]
    fn test_new_skill_validation() {
        assert_eq!(NewSkill::default().validate(), Err(ValidationError::MissingField("Name")));
        let skill = NewSkill {
            name: " Rust ".into(),
            ..Default::default()
        };
        assert!(skill.validate().is_ok());
        assert_eq!(skill.trimmed().name, "Rust");
    }
}
