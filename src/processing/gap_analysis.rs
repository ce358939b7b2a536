//! Gap analysis: which job skills a resume satisfies, and which it misses

use crate::error::Result;
use crate::processing::similarity::{is_match, SimilarityOracle};
use crate::processing::skills::{JobRequirements, MissingSkills, OrGroups, SkillCategory, SkillSet};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Matched over total for one job category.
///
/// `total` is never zero: an empty category reports 0/1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub matched: usize,
    pub total: usize,
}

impl CategoryMatch {
    pub fn new(matched: usize, listed: usize) -> Self {
        Self {
            matched: matched.min(listed),
            total: listed.max(1),
        }
    }

    pub fn ratio(&self) -> f32 {
        self.matched as f32 / self.total as f32
    }
}

impl Default for CategoryMatch {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub required: CategoryMatch,
    pub preferred: CategoryMatch,
    pub bonus: CategoryMatch,
    pub score: f32,
}

impl MatchDetails {
    pub fn get(&self, category: SkillCategory) -> CategoryMatch {
        match category {
            SkillCategory::Required => self.required,
            SkillCategory::Preferred => self.preferred,
            SkillCategory::Bonus => self.bonus,
        }
    }
}

/// Weighted match score from per-category matched counts and list lengths.
///
/// Indexed in `SkillCategory::ALL` order. A category with an empty job list
/// is left out of both numerator and denominator; when every list is empty
/// the score is 0.0.
pub fn weighted_score(matched: [usize; 3], listed: [usize; 3]) -> MatchDetails {
    let mut weighted_sum = 0.0f32;
    let mut total_weight = 0.0f32;
    let mut counts = [CategoryMatch::default(); 3];

    for (i, category) in SkillCategory::ALL.into_iter().enumerate() {
        counts[i] = CategoryMatch::new(matched[i], listed[i]);
        if listed[i] > 0 {
            weighted_sum += counts[i].ratio() * category.weight();
            total_weight += category.weight();
        }
    }

    let score = if total_weight > 0.0 {
        (weighted_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    MatchDetails {
        required: counts[0],
        preferred: counts[1],
        bonus: counts[2],
        score,
    }
}

/// Compares resume skills against job requirements through a similarity oracle
pub struct GapAnalyzer<'a> {
    oracle: &'a dyn SimilarityOracle,
    threshold: f32,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(oracle: &'a dyn SimilarityOracle, threshold: f32) -> Self {
        Self { oracle, threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Weighted match score and per-category counts.
    ///
    /// Or-group members satisfied once are remembered for the rest of the
    /// call, across all three categories.
    pub fn match_skills(&self, resume: &SkillSet, job: &JobRequirements) -> Result<(f32, MatchDetails)> {
        let mut memo = HashSet::new();
        let mut matched = [0usize; 3];
        let mut listed = [0usize; 3];

        for (i, category) in SkillCategory::ALL.into_iter().enumerate() {
            let skills = job.list(category);
            listed[i] = skills.len();
            for skill in skills {
                if self.is_satisfied(skill, resume, &job.or_groups, &mut memo)? {
                    matched[i] += 1;
                }
            }
            debug!("{}: {}/{} matched", category, matched[i], listed[i]);
        }

        let details = weighted_score(matched, listed);
        Ok((details.score, details))
    }

    /// Unsatisfied job skills by priority, in job-list order.
    ///
    /// Evaluated from scratch; nothing is shared with `match_skills`.
    pub fn find_missing(&self, resume: &SkillSet, job: &JobRequirements) -> Result<MissingSkills> {
        let mut memo = HashSet::new();
        let mut missing = MissingSkills::default();

        for category in SkillCategory::ALL {
            for skill in job.list(category) {
                if !self.is_satisfied(skill, resume, &job.or_groups, &mut memo)? {
                    missing.push(category.priority(), skill.clone());
                }
            }
        }

        Ok(missing)
    }

    fn is_satisfied(
        &self,
        skill: &str,
        resume: &SkillSet,
        or_groups: &OrGroups,
        memo: &mut HashSet<String>,
    ) -> Result<bool> {
        let Some(group) = or_groups.group_of(skill) else {
            let found = self.in_resume(skill, resume)?;
            if found {
                memo.insert(skill.to_lowercase());
            }
            return Ok(found);
        };

        if group.iter().any(|member| memo.contains(&member.to_lowercase())) {
            debug!("'{}' satisfied through its or-group", skill);
            return Ok(true);
        }

        for member in group {
            if self.in_resume(member, resume)? {
                debug!("'{}' satisfies or-group of '{}'", member, skill);
                memo.extend(group.iter().map(|m| m.to_lowercase()));
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn in_resume(&self, skill: &str, resume: &SkillSet) -> Result<bool> {
        for candidate in resume {
            if is_match(self.oracle, candidate, skill, self.threshold)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
