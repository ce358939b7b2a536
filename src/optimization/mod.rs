//! Learning-plan optimization: choose which missing skills to learn within
//! time and cost budgets so the weighted match gain is as large as possible.

#[cfg(feature = "exact-solver")]
pub mod branch_and_bound;
pub mod estimates;
pub mod projection;
#[cfg(feature = "lp-relaxation")]
pub mod relaxation;
pub mod solver;

use crate::error::{Result, SkillGapError};
use crate::processing::skills::{MissingSkills, Priority};
use estimates::{PriorityWeights, SkillEstimate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use solver::{BackendKind, SelectionItem, SelectionProblem, SolverBackend, SolverStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDetail {
    pub priority: Priority,
    pub time_months: f64,
    pub cost_dollars: f64,
    pub score_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub selected: MissingSkills,
    /// Coefficients of the selected skills only
    pub details: BTreeMap<String, SkillDetail>,
    pub objective: f64,
    pub status: SolverStatus,
    pub message: Option<String>,
    pub backend: Option<BackendKind>,
}

impl OptimizationResult {
    pub fn total_time(&self) -> f64 {
        self.details.values().map(|d| d.time_months).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.details.values().map(|d| d.cost_dollars).sum()
    }
}

/// Runs a single solve per call through whichever backend was detected
pub struct SkillOptimizer {
    backend: Option<Box<dyn SolverBackend>>,
}

impl SkillOptimizer {
    /// Probe the compiled-in backends once; a missing backend only fails at `optimize`
    pub fn detect(max_nodes: usize) -> Self {
        match solver::detect_backend(max_nodes) {
            Ok(backend) => {
                info!("Using {} solver", backend.kind());
                if backend.kind() == BackendKind::LpRelaxation {
                    warn!("Exact solver not compiled in; plans are relaxed and rounded");
                }
                Self { backend: Some(backend) }
            }
            Err(_) => {
                warn!("No solver backend compiled in");
                Self { backend: None }
            }
        }
    }

    pub fn with_backend(backend: Box<dyn SolverBackend>) -> Self {
        Self { backend: Some(backend) }
    }

    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(|b| b.kind())
    }

    pub fn optimize(
        &self,
        missing: &MissingSkills,
        time_budget: f64,
        cost_budget: f64,
        weights: &PriorityWeights,
    ) -> Result<OptimizationResult> {
        if !time_budget.is_finite() || !cost_budget.is_finite() {
            return Err(SkillGapError::InvalidInput(format!(
                "Budgets must be finite numbers, got {} months / ${}",
                time_budget, cost_budget
            )));
        }

        if missing.is_empty() {
            return Ok(OptimizationResult {
                selected: MissingSkills::default(),
                details: BTreeMap::new(),
                objective: 0.0,
                status: SolverStatus::NothingToOptimize,
                message: Some("No missing skills to optimize".to_string()),
                backend: None,
            });
        }

        let backend = self.backend.as_ref().ok_or(SkillGapError::NoSolverAvailable)?;

        let items: Vec<SelectionItem> = missing
            .iter()
            .map(|(priority, skill)| SelectionItem {
                skill: skill.to_string(),
                priority,
                estimate: SkillEstimate::for_skill(skill, priority, weights),
            })
            .collect();
        let problem = SelectionProblem::new(items, time_budget, cost_budget);

        let outcome = backend.solve(&problem)?;
        if outcome.selected.len() != problem.items.len() {
            return Err(SkillGapError::Solver(format!(
                "{} returned {} values for {} skills",
                backend.kind(),
                outcome.selected.len(),
                problem.items.len()
            )));
        }

        let mut selected = MissingSkills::default();
        let mut details = BTreeMap::new();
        for (item, _) in problem.items.iter().zip(&outcome.selected).filter(|(_, chosen)| **chosen) {
            selected.push(item.priority, item.skill.clone());
            details.insert(
                item.skill.clone(),
                SkillDetail {
                    priority: item.priority,
                    time_months: item.estimate.time_months,
                    cost_dollars: item.estimate.cost_dollars,
                    score_weight: item.estimate.score_weight,
                },
            );
        }

        info!(
            "Solver status {}: {} of {} skills selected, objective {:.2}",
            outcome.status,
            selected.total(),
            problem.items.len(),
            outcome.objective
        );

        Ok(OptimizationResult {
            selected,
            details,
            objective: outcome.objective,
            status: outcome.status,
            message: outcome.message,
            backend: Some(backend.kind()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_high(skills: &[&str]) -> MissingSkills {
        let mut missing = MissingSkills::default();
        for skill in skills {
            missing.push(Priority::High, *skill);
        }
        missing
    }

    fn optimizer() -> SkillOptimizer {
        SkillOptimizer::detect(1_000_000)
    }

    #[test]
    fn test_empty_input_nothing_to_optimize() {
        // No backend is needed for an empty plan
        let result = SkillOptimizer { backend: None }
            .optimize(&MissingSkills::default(), 3.0, 500.0, &PriorityWeights::default())
            .unwrap();

        assert_eq!(result.status, SolverStatus::NothingToOptimize);
        assert_eq!(result.objective, 0.0);
        assert!(result.selected.is_empty());
        assert!(result.backend.is_none());
    }

    #[test]
    fn test_missing_backend_is_fatal() {
        let err = SkillOptimizer { backend: None }
            .optimize(&missing_high(&["Git"]), 1.0, 100.0, &PriorityWeights::default())
            .unwrap_err();
        assert!(matches!(err, SkillGapError::NoSolverAvailable));
    }

    #[test]
    fn test_non_finite_budget_rejected() {
        let err = optimizer()
            .optimize(&missing_high(&["Git"]), f64::NAN, 100.0, &PriorityWeights::default())
            .unwrap_err();
        assert!(matches!(err, SkillGapError::InvalidInput(_)));
    }

    #[cfg(feature = "exact-solver")]
    #[test]
    fn test_complex_skill_over_budget_selects_nothing() {
        let result = optimizer()
            .optimize(&missing_high(&["Kubernetes"]), 0.4, 500.0, &PriorityWeights::default())
            .unwrap();

        assert_eq!(result.status, SolverStatus::Optimal);
        assert!(result.selected.is_empty());
        assert_eq!(result.objective, 0.0);
    }

    #[cfg(feature = "exact-solver")]
    #[test]
    fn test_simple_skill_within_budget_selected() {
        let result = optimizer()
            .optimize(&missing_high(&["Git"]), 1.0, 100.0, &PriorityWeights::default())
            .unwrap();

        assert_eq!(result.status, SolverStatus::Optimal);
        assert_eq!(result.selected, missing_high(&["Git"]));
        assert_eq!(result.objective, 1.0);
        let detail = &result.details["Git"];
        assert_eq!(detail.time_months, 0.5);
        assert_eq!(detail.cost_dollars, 50.0);
    }

    #[cfg(feature = "exact-solver")]
    #[test]
    fn test_exact_plan_respects_budgets() {
        let mut missing = missing_high(&["Machine Learning", "Git", "SQL"]);
        missing.push(Priority::Medium, "Docker");
        missing.push(Priority::Medium, "Kubernetes");
        missing.push(Priority::Low, "Jira");
        missing.push(Priority::Low, "Deep Learning");

        for (time, cost) in [(0.5, 60.0), (1.0, 120.0), (2.5, 300.0), (10.0, 1000.0)] {
            let result = optimizer()
                .optimize(&missing, time, cost, &PriorityWeights::default())
                .unwrap();
            assert_eq!(result.status, SolverStatus::Optimal);
            assert!(result.total_time() <= time);
            assert!(result.total_cost() <= cost);
        }
    }

    #[cfg(feature = "lp-relaxation")]
    #[test]
    fn test_relaxed_backend_reports_degraded() {
        let backend = solver::backend_for(BackendKind::LpRelaxation, 0).unwrap();
        let result = SkillOptimizer::with_backend(backend)
            .optimize(&missing_high(&["Git"]), 1.0, 100.0, &PriorityWeights::default())
            .unwrap();

        assert_eq!(result.status, SolverStatus::DegradedSuccess);
        assert_eq!(result.backend, Some(BackendKind::LpRelaxation));
        assert_eq!(result.selected, missing_high(&["Git"]));
    }

    #[test]
    fn test_negative_budget_infeasible() {
        let result = optimizer()
            .optimize(&missing_high(&["Git"]), -1.0, 100.0, &PriorityWeights::default());
        if cfg!(any(feature = "exact-solver", feature = "lp-relaxation")) {
            let result = result.unwrap();
            assert_eq!(result.status, SolverStatus::Infeasible);
            assert!(result.selected.is_empty());
        } else {
            assert!(matches!(result, Err(SkillGapError::NoSolverAvailable)));
        }
    }
}
