//! Analysis engine tying extraction, gap analysis, optimization and reporting together

use crate::catalog::JobTemplate;
use crate::config::Config;
use crate::error::{Result, SkillGapError};
use crate::optimization::projection::project_improvement;
use crate::optimization::SkillOptimizer;
use crate::output::recommendations::generate_recommendations;
use crate::output::report::{AnalysisReport, AnalysisSummary, ReportMetadata};
use crate::processing::gap_analysis::GapAnalyzer;
use crate::processing::requirements::extract_skills_from_job_description;
use crate::processing::similarity::SimilarityOracle;
use crate::processing::skill_extractor::{extract_skills, normalize_duplicates};
use crate::processing::skills::{JobRequirements, SkillDictionary, SkillSet};
use log::info;
use std::time::Instant;

/// Resumes with less readable text than this are treated as failed extractions
pub const MIN_RESUME_CHARS: usize = 50;

/// Where the job requirements come from
#[derive(Debug, Clone)]
pub enum JobSource {
    /// Free-text job description, parsed against the skill dictionary
    Description(String),
    /// Predefined role; its lists are used as-is
    Template { name: String, template: JobTemplate },
    /// Job description, replaced by the template when it names no required skill
    DescriptionWithFallback {
        text: String,
        name: String,
        template: JobTemplate,
    },
}

impl JobSource {
    pub fn label(&self) -> String {
        match self {
            JobSource::Description(_) => "job description".to_string(),
            JobSource::Template { name, .. } => format!("template: {}", name),
            JobSource::DescriptionWithFallback { name, .. } => {
                format!("job description (fallback template: {})", name)
            }
        }
    }
}

/// Runs one full analysis per call. The oracle is borrowed so a process-wide
/// embedding model can back many engines.
pub struct AnalysisEngine<'o> {
    oracle: &'o dyn SimilarityOracle,
    optimizer: SkillOptimizer,
    dictionary: SkillDictionary,
    config: Config,
}

impl<'o> AnalysisEngine<'o> {
    pub fn new(oracle: &'o dyn SimilarityOracle, dictionary: SkillDictionary, config: &Config) -> Self {
        Self {
            oracle,
            optimizer: SkillOptimizer::detect(config.optimization.max_nodes),
            dictionary,
            config: config.clone(),
        }
    }

    pub fn with_optimizer(mut self, optimizer: SkillOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalised, de-duplicated skills found in a document
    pub fn resume_skills(&self, text: &str) -> Result<SkillSet> {
        let skills = extract_skills(text, &self.dictionary)?;
        Ok(normalize_duplicates(&skills))
    }

    pub fn job_requirements(&self, job: &JobSource) -> Result<JobRequirements> {
        match job {
            JobSource::Description(text) => {
                extract_skills_from_job_description(text, &self.dictionary, &self.config.matching)
            }
            JobSource::Template { template, .. } => Ok(template.to_requirements()),
            JobSource::DescriptionWithFallback { text, name, template } => {
                let parsed =
                    extract_skills_from_job_description(text, &self.dictionary, &self.config.matching)?;
                if parsed.required.is_empty() {
                    info!("Job description names no required skills; using template {}", name);
                    Ok(template.to_requirements())
                } else {
                    Ok(parsed)
                }
            }
        }
    }

    pub fn analyze(&self, resume_text: &str, job: &JobSource) -> Result<AnalysisReport> {
        let start_time = Instant::now();

        let readable = resume_text.chars().filter(|c| !c.is_whitespace()).count();
        if readable < MIN_RESUME_CHARS {
            return Err(SkillGapError::InvalidInput(format!(
                "Resume text too short ({} characters); extraction may have failed",
                readable
            )));
        }

        // 1. Skills on both sides
        let resume_skills = self.resume_skills(resume_text)?;
        info!("Found {} skills in resume", resume_skills.len());
        let job_requirements = self.job_requirements(job)?;
        info!(
            "Job lists {} skills ({} required, {} preferred, {} bonus)",
            job_requirements.total_skills(),
            job_requirements.required.len(),
            job_requirements.preferred.len(),
            job_requirements.bonus.len()
        );

        // 2. Gap analysis
        let analyzer = GapAnalyzer::new(self.oracle, self.config.matching.similarity_threshold);
        let (score, match_details) = analyzer.match_skills(&resume_skills, &job_requirements)?;
        let missing = analyzer.find_missing(&resume_skills, &job_requirements)?;
        info!("Match score {:.3}, {} skills missing", score, missing.total());

        // 3. Learning plan
        let budgets = &self.config.optimization;
        let plan = self.optimizer.optimize(
            &missing,
            budgets.time_budget_months,
            budgets.cost_budget_dollars,
            &budgets.weights,
        )?;
        info!("Learning plan {} with {} skills", plan.status, plan.selected.total());

        // 4. Projection and recommendations
        let improvement = project_improvement(
            &plan.selected,
            &match_details,
            &job_requirements.required,
            &job_requirements.preferred,
            &job_requirements.bonus,
        );
        let recommendations = generate_recommendations(&missing);
        let summary = AnalysisSummary::build(&job_requirements, &match_details, &missing, &improvement);

        let mut metadata = ReportMetadata::new("", job.label(), self.oracle.name());
        metadata.time_budget_months = budgets.time_budget_months;
        metadata.cost_budget_dollars = budgets.cost_budget_dollars;
        metadata.processing_time_ms = start_time.elapsed().as_millis() as u64;

        Ok(AnalysisReport {
            summary,
            resume_skills: resume_skills.into_iter().collect(),
            job: job_requirements,
            match_details,
            missing,
            plan,
            improvement,
            recommendations,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::solver::SolverStatus;
    use crate::processing::similarity::LexicalOracle;
    use crate::processing::skills::Priority;

    fn dictionary() -> SkillDictionary {
        let mut dictionary = SkillDictionary::new();
        dictionary.insert(
            "programming".to_string(),
            vec!["Python".to_string(), "Java".to_string(), "SQL".to_string()],
        );
        dictionary.insert(
            "tools".to_string(),
            vec!["Docker".to_string(), "Git".to_string()],
        );
        dictionary
    }

    const RESUME: &str = "Software engineer with five years of Python and Docker experience \
                          building internal tooling and data services.";

    #[test]
    fn test_short_resume_rejected() {
        let oracle = LexicalOracle::new();
        let engine = AnalysisEngine::new(&oracle, dictionary(), &Config::default());
        let job = JobSource::Description("Required: Python".to_string());

        let err = engine.analyze("Python   Docker", &job).unwrap_err();
        assert!(matches!(err, SkillGapError::InvalidInput(_)));
    }

    #[test]
    fn test_template_pipeline() {
        let oracle = LexicalOracle::new();
        let engine = AnalysisEngine::new(&oracle, dictionary(), &Config::default());
        let job = JobSource::Template {
            name: "Backend".to_string(),
            template: JobTemplate {
                required: vec!["Python".to_string(), "SQL".to_string()],
                preferred: vec!["Docker".to_string()],
                bonus: vec![],
            },
        };

        let report = engine.analyze(RESUME, &job).unwrap();
        assert_eq!(report.resume_skills, vec!["Docker", "Python"]);
        assert_eq!(report.match_details.required.matched, 1);
        assert_eq!(report.match_details.preferred.matched, 1);
        assert_eq!(report.missing.get(Priority::High), ["SQL".to_string()]);
        assert_eq!(report.metadata.job_source, "template: Backend");

        // SQL is cheap and fits the default budgets
        assert_eq!(report.plan.status, SolverStatus::Optimal);
        assert_eq!(report.plan.selected.get(Priority::High), ["SQL".to_string()]);
        assert!((report.improvement.projected_score - 1.0).abs() < 1e-6);
        assert_eq!(report.summary.projected_percentage, 100);
    }

    fn backend_template() -> JobTemplate {
        JobTemplate {
            required: vec!["Python".to_string(), "SQL".to_string()],
            preferred: vec!["Docker".to_string()],
            bonus: vec!["Git".to_string()],
        }
    }

    #[test]
    fn test_description_without_required_skills_uses_template() {
        let oracle = LexicalOracle::new();
        let engine = AnalysisEngine::new(&oracle, dictionary(), &Config::default());
        let job = JobSource::DescriptionWithFallback {
            text: "Friendly team, flexible hours and a good coffee machine.".to_string(),
            name: "Backend".to_string(),
            template: backend_template(),
        };

        let requirements = engine.job_requirements(&job).unwrap();
        assert_eq!(requirements, backend_template().to_requirements());

        let report = engine.analyze(RESUME, &job).unwrap();
        assert_eq!(report.missing.get(Priority::High), ["SQL".to_string()]);
        assert_eq!(report.missing.get(Priority::Low), ["Git".to_string()]);
        assert_eq!(
            report.metadata.job_source,
            "job description (fallback template: Backend)"
        );
    }

    #[test]
    fn test_description_with_required_skills_ignores_template() {
        let oracle = LexicalOracle::new();
        let engine = AnalysisEngine::new(&oracle, dictionary(), &Config::default());
        let job = JobSource::DescriptionWithFallback {
            text: "Required: Java and Git.".to_string(),
            name: "Backend".to_string(),
            template: backend_template(),
        };

        let requirements = engine.job_requirements(&job).unwrap();
        assert_eq!(requirements.required, vec!["Java", "Git"]);
        assert!(requirements.preferred.is_empty());
        assert!(requirements.bonus.is_empty());
    }

    #[test]
    fn test_fully_covered_job_has_nothing_to_optimize() {
        let oracle = LexicalOracle::new();
        let engine = AnalysisEngine::new(&oracle, dictionary(), &Config::default());
        let job = JobSource::Description("Must have Python. Docker is required.".to_string());

        let report = engine.analyze(RESUME, &job).unwrap();
        assert!(report.missing.is_empty());
        assert_eq!(report.plan.status, SolverStatus::NothingToOptimize);
        assert_eq!(report.summary.score_percentage, 100);
    }

    #[test]
    fn test_empty_job_description_rejected() {
        let oracle = LexicalOracle::new();
        let engine = AnalysisEngine::new(&oracle, dictionary(), &Config::default());
        let err = engine
            .analyze(RESUME, &JobSource::Description("   ".to_string()))
            .unwrap_err();
        assert!(matches!(err, SkillGapError::InvalidInput(_)));
    }
}
