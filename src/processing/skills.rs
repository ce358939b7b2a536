//! Core skill types shared by extraction, gap analysis and optimization

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Canonical skill names detected in one document
pub type SkillSet = BTreeSet<String>;

/// Category name -> canonical skill names
pub type SkillDictionary = BTreeMap<String, Vec<String>>;

/// Which job list a skill was listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Required,
    Preferred,
    Bonus,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 3] = [
        SkillCategory::Required,
        SkillCategory::Preferred,
        SkillCategory::Bonus,
    ];

    /// Fixed contribution of the category to the weighted match score
    pub fn weight(self) -> f32 {
        match self {
            SkillCategory::Required => 1.0,
            SkillCategory::Preferred => 0.6,
            SkillCategory::Bonus => 0.3,
        }
    }

    pub fn priority(self) -> Priority {
        match self {
            SkillCategory::Required => Priority::High,
            SkillCategory::Preferred => Priority::Medium,
            SkillCategory::Bonus => Priority::Low,
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillCategory::Required => write!(f, "Required"),
            SkillCategory::Preferred => write!(f, "Preferred"),
            SkillCategory::Bonus => write!(f, "Bonus"),
        }
    }
}

/// Learning priority of a missing skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn category(self) -> SkillCategory {
        match self {
            Priority::High => SkillCategory::Required,
            Priority::Medium => SkillCategory::Preferred,
            Priority::Low => SkillCategory::Bonus,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// Unmatched job skills bucketed by priority, each bucket in job-list order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingSkills {
    #[serde(rename = "HIGH", default)]
    pub high: Vec<String>,
    #[serde(rename = "MEDIUM", default)]
    pub medium: Vec<String>,
    #[serde(rename = "LOW", default)]
    pub low: Vec<String>,
}

impl MissingSkills {
    pub fn get(&self, priority: Priority) -> &[String] {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }

    pub fn get_mut(&mut self, priority: Priority) -> &mut Vec<String> {
        match priority {
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }

    pub fn push(&mut self, priority: Priority, skill: impl Into<String>) {
        self.get_mut(priority).push(skill.into());
    }

    /// (priority, skill) pairs in HIGH, MEDIUM, LOW order
    pub fn iter(&self) -> impl Iterator<Item = (Priority, &str)> + '_ {
        Priority::ALL
            .into_iter()
            .flat_map(move |p| self.get(p).iter().map(move |s| (p, s.as_str())))
    }

    pub fn total(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Equivalence classes of mutually substitutable job skills.
///
/// Each class is stored once and every member resolves to the same class,
/// so membership is symmetric by construction. Classes with a single
/// member are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct OrGroups {
    groups: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl From<Vec<Vec<String>>> for OrGroups {
    fn from(groups: Vec<Vec<String>>) -> Self {
        OrGroups::from_groups(groups)
    }
}

impl From<OrGroups> for Vec<Vec<String>> {
    fn from(or_groups: OrGroups) -> Self {
        or_groups.groups
    }
}

impl OrGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw classes; singletons are discarded and overlapping classes merged
    pub fn from_groups(groups: Vec<Vec<String>>) -> Self {
        let mut or_groups = Self::new();
        for group in groups {
            or_groups.insert_group(group);
        }
        or_groups
    }

    fn insert_group(&mut self, group: Vec<String>) {
        let mut members: Vec<String> = Vec::new();
        let mut absorbed: Vec<usize> = Vec::new();

        for skill in group {
            let key = skill.to_lowercase();
            if let Some(&existing) = self.index.get(&key) {
                if !absorbed.contains(&existing) {
                    absorbed.push(existing);
                }
                continue;
            }
            if !members.iter().any(|m| m.to_lowercase() == key) {
                members.push(skill);
            }
        }

        for id in &absorbed {
            for skill in &self.groups[*id] {
                if !members.iter().any(|m| m.eq_ignore_ascii_case(skill)) {
                    members.push(skill.clone());
                }
            }
        }

        if members.len() < 2 {
            return;
        }

        absorbed.sort_unstable();
        for id in absorbed.into_iter().rev() {
            self.groups.remove(id);
        }
        self.groups.push(members);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (id, group) in self.groups.iter().enumerate() {
            for skill in group {
                self.index.insert(skill.to_lowercase(), id);
            }
        }
    }

    /// The class containing `skill` (itself included), if any
    pub fn group_of(&self, skill: &str) -> Option<&[String]> {
        self.index
            .get(&skill.to_lowercase())
            .map(|&id| self.groups[id].as_slice())
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Required / preferred / bonus skill lists of one job, plus its or-groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequirements {
    pub required: Vec<String>,
    pub preferred: Vec<String>,
    pub bonus: Vec<String>,
    #[serde(default)]
    pub or_groups: OrGroups,
}

impl JobRequirements {
    pub fn new(required: Vec<String>, preferred: Vec<String>, bonus: Vec<String>) -> Self {
        Self {
            required,
            preferred,
            bonus,
            or_groups: OrGroups::new(),
        }
    }

    pub fn with_or_groups(mut self, or_groups: OrGroups) -> Self {
        self.or_groups = or_groups;
        self
    }

    pub fn list(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Required => &self.required,
            SkillCategory::Preferred => &self.preferred,
            SkillCategory::Bonus => &self.bonus,
        }
    }

    pub fn total_skills(&self) -> usize {
        self.required.len() + self.preferred.len() + self.bonus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_skills() == 0
    }
}
