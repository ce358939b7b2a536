//! Report structures combining gap analysis, learning plan and recommendations

use crate::optimization::projection::ImprovementEstimate;
use crate::optimization::OptimizationResult;
use crate::output::recommendations::Recommendations;
use crate::processing::gap_analysis::MatchDetails;
use crate::processing::skills::{JobRequirements, MissingSkills, SkillCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything one analysis produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: AnalysisSummary,

    /// Normalised skills found in the resume
    pub resume_skills: Vec<String>,

    /// Parsed or templated job requirements
    pub job: JobRequirements,

    pub match_details: MatchDetails,

    pub missing: MissingSkills,

    /// Skills chosen to learn within the budgets
    pub plan: OptimizationResult,

    pub improvement: ImprovementEstimate,

    pub recommendations: Recommendations,

    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Weighted match score (0-100)
    pub score_percentage: u8,

    /// Projected score after the plan (0-100)
    pub projected_percentage: u8,

    pub verdict: String,

    pub strengths: Vec<String>,

    pub improvement_areas: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub resume_file: String,
    /// Job description file or template name
    pub job_source: String,
    pub similarity_model: String,
    pub time_budget_months: f64,
    pub cost_budget_dollars: f64,
    pub processing_time_ms: u64,
}

impl ReportMetadata {
    pub fn new(resume_file: impl Into<String>, job_source: impl Into<String>, similarity_model: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            resume_file: resume_file.into(),
            job_source: job_source.into(),
            similarity_model: similarity_model.into(),
            time_budget_months: 0.0,
            cost_budget_dollars: 0.0,
            processing_time_ms: 0,
        }
    }
}

pub fn to_percentage(score: f32) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

pub fn verdict_for(percentage: u8) -> &'static str {
    match percentage {
        90..=100 => "Excellent match - strong candidate for this role",
        80..=89 => "Very good match - a few gaps to close",
        70..=79 => "Good match - some targeted learning recommended",
        60..=69 => "Fair match - several skills to build",
        50..=59 => "Below average match - significant skill gaps",
        _ => "Poor match - major skill gaps for this role",
    }
}

impl AnalysisSummary {
    pub fn build(
        job: &JobRequirements,
        details: &MatchDetails,
        missing: &MissingSkills,
        improvement: &ImprovementEstimate,
    ) -> Self {
        let score_percentage = to_percentage(details.score);

        let mut strengths = Vec::new();
        let mut improvement_areas = Vec::new();
        for category in SkillCategory::ALL {
            if job.list(category).is_empty() {
                continue;
            }
            let counts = details.get(category);
            if counts.matched == counts.total {
                strengths.push(format!("All {} skills covered", category.to_string().to_lowercase()));
            } else if counts.ratio() < 0.5 {
                improvement_areas.push(format!(
                    "{} skills: {} of {} matched",
                    category, counts.matched, counts.total
                ));
            }
        }
        if !missing.high.is_empty() {
            improvement_areas.push(format!("Missing required skills: {}", missing.high.join(", ")));
        }

        Self {
            score_percentage,
            projected_percentage: to_percentage(improvement.projected_score),
            verdict: verdict_for(score_percentage).to_string(),
            strengths,
            improvement_areas,
        }
    }
}
