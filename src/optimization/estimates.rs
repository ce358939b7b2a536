//! Learning time, cost and score coefficients for missing skills

use crate::processing::skills::Priority;
use serde::{Deserialize, Serialize};

/// Skill names containing any of these take the "complex" row of the tables
pub const COMPLEX_SKILLS: &[&str] = &[
    "machine learning",
    "data science",
    "cloud architecture",
    "devops",
    "full stack",
    "deep learning",
    "natural language processing",
    "computer vision",
    "kubernetes",
    "microservices",
    "distributed systems",
];

/// Months to learn: (simple, complex)
fn time_table(priority: Priority) -> (f64, f64) {
    match priority {
        Priority::High => (0.5, 2.0),
        Priority::Medium => (0.25, 1.0),
        Priority::Low => (0.125, 0.5),
    }
}

/// Dollars to learn: (simple, complex)
fn cost_table(priority: Priority) -> (f64, f64) {
    match priority {
        Priority::High => (50.0, 200.0),
        Priority::Medium => (30.0, 150.0),
        Priority::Low => (20.0, 100.0),
    }
}

/// Objective weight per priority
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub required: f64,
    pub preferred: f64,
    pub bonus: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            required: 1.0,
            preferred: 0.6,
            bonus: 0.3,
        }
    }
}

impl PriorityWeights {
    pub fn new(required: f64, preferred: f64, bonus: f64) -> Self {
        Self {
            required,
            preferred,
            bonus,
        }
    }

    pub fn for_priority(&self, priority: Priority) -> f64 {
        match priority {
            Priority::High => self.required,
            Priority::Medium => self.preferred,
            Priority::Low => self.bonus,
        }
    }

    /// Same ratios scaled to sum to 1; all-zero weights are returned unchanged
    pub fn normalized(&self) -> Self {
        let sum = self.required + self.preferred + self.bonus;
        if sum <= 0.0 {
            return *self;
        }
        Self::new(self.required / sum, self.preferred / sum, self.bonus / sum)
    }
}

pub fn is_complex(skill: &str) -> bool {
    let lowered = skill.to_lowercase();
    COMPLEX_SKILLS.iter().any(|keyword| lowered.contains(keyword))
}

pub fn estimate_time(skill: &str, priority: Priority) -> f64 {
    let (simple, complex) = time_table(priority);
    if is_complex(skill) {
        complex
    } else {
        simple
    }
}

pub fn estimate_cost(skill: &str, priority: Priority) -> f64 {
    let (simple, complex) = cost_table(priority);
    if is_complex(skill) {
        complex
    } else {
        simple
    }
}

pub fn score_weight(priority: Priority, weights: &PriorityWeights) -> f64 {
    weights.for_priority(priority)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillEstimate {
    pub time_months: f64,
    pub cost_dollars: f64,
    pub score_weight: f64,
}

impl SkillEstimate {
    pub fn for_skill(skill: &str, priority: Priority, weights: &PriorityWeights) -> Self {
        Self {
            time_months: estimate_time(skill, priority),
            cost_dollars: estimate_cost(skill, priority),
            score_weight: score_weight(priority, weights),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_vocabulary_is_substring_based() {
        assert!(is_complex("Kubernetes"));
        assert!(is_complex("Applied Machine Learning"));
        assert!(!is_complex("Git"));
    }

    #[test]
    fn test_tables() {
        assert_eq!(estimate_time("Kubernetes", Priority::High), 2.0);
        assert_eq!(estimate_cost("Kubernetes", Priority::High), 200.0);
        assert_eq!(estimate_time("Git", Priority::High), 0.5);
        assert_eq!(estimate_cost("Git", Priority::High), 50.0);
        assert_eq!(estimate_time("Git", Priority::Medium), 0.25);
        assert_eq!(estimate_cost("DevOps", Priority::Medium), 150.0);
        assert_eq!(estimate_time("Docker", Priority::Low), 0.125);
        assert_eq!(estimate_cost("Deep Learning", Priority::Low), 100.0);
    }

    #[test]
    fn test_weights_normalize() {
        let weights = PriorityWeights::default().normalized();
        let sum = weights.required + weights.preferred + weights.bonus;
        assert!((sum - 1.0).abs() < 1e-9);
        assert!((weights.required / weights.bonus - 1.0 / 0.3).abs() < 1e-9);

        let zero = PriorityWeights::new(0.0, 0.0, 0.0);
        assert_eq!(zero.normalized(), zero);
    }
}
