//! Score projection after learning the selected skills

use crate::processing::gap_analysis::{weighted_score, MatchDetails};
use crate::processing::skills::{MissingSkills, Priority};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementEstimate {
    pub current_score: f32,
    pub projected_score: f32,
    pub score_improvement: f32,
    pub required_matched: usize,
    pub preferred_matched: usize,
    pub bonus_matched: usize,
}

/// Assume every selected skill will satisfy its job requirement once learned.
///
/// Selected skills only count toward the job list of their own priority, and
/// a category never exceeds its total. No similarity is recomputed.
pub fn project_improvement(
    selected: &MissingSkills,
    current: &MatchDetails,
    job_required: &[String],
    job_preferred: &[String],
    job_bonus: &[String],
) -> ImprovementEstimate {
    let lists = [job_required, job_preferred, job_bonus];
    let current_counts = [current.required.matched, current.preferred.matched, current.bonus.matched];

    let mut matched = [0usize; 3];
    for (i, priority) in Priority::ALL.into_iter().enumerate() {
        let added = selected
            .get(priority)
            .iter()
            .filter(|skill| lists[i].iter().any(|job_skill| job_skill.eq_ignore_ascii_case(skill)))
            .count();
        matched[i] = (current_counts[i] + added).min(lists[i].len());
    }

    let projected = weighted_score(matched, lists.map(|list| list.len()));

    ImprovementEstimate {
        current_score: current.score,
        projected_score: projected.score,
        score_improvement: projected.score - current.score,
        required_matched: projected.required.matched,
        preferred_matched: projected.preferred.matched,
        bonus_matched: projected.bonus.matched,
    }
}
