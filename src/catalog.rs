//! Read-only reference data: the skill dictionary and job role templates

use crate::error::{Result, SkillGapError};
use crate::processing::skills::{JobRequirements, SkillDictionary};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Skill lists of a predefined job role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTemplate {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub preferred: Vec<String>,
    #[serde(default)]
    pub bonus: Vec<String>,
}

impl JobTemplate {
    pub fn to_requirements(&self) -> JobRequirements {
        JobRequirements::new(self.required.clone(), self.preferred.clone(), self.bonus.clone())
    }
}

impl From<JobTemplate> for JobRequirements {
    fn from(template: JobTemplate) -> Self {
        JobRequirements::new(template.required, template.preferred, template.bonus)
    }
}

pub type JobTemplates = BTreeMap<String, JobTemplate>;

fn read_catalog(path: &Path, what: &str) -> Result<String> {
    if !path.exists() {
        return Err(SkillGapError::NotFound(format!(
            "{} not found at {}",
            what,
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// `{category: [skill, ...]}`
pub fn load_skill_dictionary(path: &Path) -> Result<SkillDictionary> {
    let content = read_catalog(path, "Skill dictionary")?;
    let dictionary: SkillDictionary = serde_json::from_str(&content).map_err(|e| {
        SkillGapError::InvalidFormat(format!("Skill dictionary {}: {}", path.display(), e))
    })?;

    let total: usize = dictionary.values().map(Vec::len).sum();
    info!(
        "Loaded {} skills in {} categories from {}",
        total,
        dictionary.len(),
        path.display()
    );
    Ok(dictionary)
}

/// `{template: {required: [...], preferred: [...], bonus: [...]}}`
pub fn load_job_templates(path: &Path) -> Result<JobTemplates> {
    let content = read_catalog(path, "Job templates")?;
    let templates: JobTemplates = serde_json::from_str(&content).map_err(|e| {
        SkillGapError::InvalidFormat(format!("Job templates {}: {}", path.display(), e))
    })?;

    info!("Loaded {} job templates from {}", templates.len(), path.display());
    Ok(templates)
}

/// Look up a template by name, ignoring case
pub fn find_template<'a>(templates: &'a JobTemplates, name: &str) -> Result<&'a JobTemplate> {
    templates
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, template)| template)
        .ok_or_else(|| {
            let known: Vec<&str> = templates.keys().map(String::as_str).collect();
            SkillGapError::NotFound(format!(
                "Job template '{}' (available: {})",
                name,
                known.join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_skill_dictionary() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("skills.json");
        std::fs::write(&path, r#"{"programming": ["Python", "Rust"], "cloud": ["AWS"]}"#).unwrap();

        let dictionary = load_skill_dictionary(&path).unwrap();
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary["programming"], vec!["Python", "Rust"]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_job_templates(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SkillGapError::NotFound(_)));
    }

    #[test]
    fn test_wrong_shape_is_invalid_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("skills.json");
        std::fs::write(&path, r#"["Python", "Rust"]"#).unwrap();

        let err = load_skill_dictionary(&path).unwrap_err();
        assert!(matches!(err, SkillGapError::InvalidFormat(_)));
    }

    #[test]
    fn test_templates_convert_to_requirements() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("templates.json");
        std::fs::write(
            &path,
            r#"{"Data Scientist": {"required": ["Python", "SQL"], "preferred": ["Spark"]}}"#,
        )
        .unwrap();

        let templates = load_job_templates(&path).unwrap();
        let template = find_template(&templates, "data scientist").unwrap();
        let requirements = template.to_requirements();
        assert_eq!(requirements.required, vec!["Python", "SQL"]);
        assert_eq!(requirements.preferred, vec!["Spark"]);
        assert!(requirements.bonus.is_empty());
        assert!(requirements.or_groups.is_empty());

        assert!(matches!(
            find_template(&templates, "Astronaut"),
            Err(SkillGapError::NotFound(_))
        ));
    }
}
