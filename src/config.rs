//! Configuration management for the skill-gap analyzer

use crate::error::{Result, SkillGapError};
use crate::optimization::estimates::PriorityWeights;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Similarity above which two skills are considered the same skill.
/// The comparison is strict: a score of exactly this value is not a match.
pub const MATCH_THRESHOLD: f32 = 0.7;

/// Characters inspected on each side of a skill when deciding its category.
pub const CATEGORY_WINDOW: usize = 100;

/// Characters inspected on each side of a skill when looking for "or" alternatives.
pub const OR_GROUP_WINDOW: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub matching: MatchingConfig,
    pub optimization: OptimizationConfig,
    pub data: DataConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Hugging Face repo id or a folder name under `models_dir`
    pub embedding_model: String,
    pub models_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub similarity_threshold: f32,
    pub category_window: usize,
    pub or_group_window: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationConfig {
    pub time_budget_months: f64,
    pub cost_budget_dollars: f64,
    pub weights: PriorityWeights,
    /// Upper bound on branch-and-bound nodes before giving up with the best plan so far
    pub max_nodes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub skill_dictionary: PathBuf,
    pub job_templates: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: MATCH_THRESHOLD,
            category_window: CATEGORY_WINDOW,
            or_group_window: OR_GROUP_WINDOW,
        }
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            time_budget_months: 3.0,
            cost_budget_dollars: 500.0,
            weights: PriorityWeights::default(),
            max_nodes: 1_000_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".skillgap")
            .join("models");

        Self {
            model: ModelConfig {
                embedding_model: "minishlab/potion-base-8M".to_string(),
                models_dir,
            },
            matching: MatchingConfig::default(),
            optimization: OptimizationConfig::default(),
            data: DataConfig {
                skill_dictionary: PathBuf::from("data/skill_dictionary.json"),
                job_templates: PathBuf::from("data/job_role_templates.json"),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| SkillGapError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillGapError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skillgap")
            .join("config.toml")
    }

    /// Resolve the embedding model to a local folder when one exists, otherwise the repo id
    pub fn embedding_model_source(&self) -> String {
        let local_path = self.model.models_dir.join(&self.model.embedding_model);
        if local_path.exists() {
            local_path.to_string_lossy().to_string()
        } else {
            self.model.embedding_model.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.matching.similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SkillGapError::Configuration(format!(
                "matching.similarity_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.matching.category_window == 0 || self.matching.or_group_window == 0 {
            return Err(SkillGapError::Configuration(
                "matching windows must be positive".to_string(),
            ));
        }
        if self.optimization.max_nodes == 0 {
            return Err(SkillGapError::Configuration(
                "optimization.max_nodes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_threshold_is_named_constant() {
        let config = Config::default();
        assert_eq!(config.matching.similarity_threshold, MATCH_THRESHOLD);
        assert_eq!(config.matching.category_window, 100);
        assert_eq!(config.matching.or_group_window, 300);
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.optimization.weights.required, 1.0);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.model.embedding_model, config.model.embedding_model);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.matching.similarity_threshold = 1.5;
        config.save_to(&path).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, SkillGapError::Configuration(_)));
    }

    #[test]
    fn test_malformed_toml_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "model = [not toml").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(SkillGapError::Configuration(_))
        ));
    }
}
