//! Solver strategy: a common interface over the exact and relaxed backends

use crate::error::{Result, SkillGapError};
use crate::optimization::estimates::SkillEstimate;
use crate::processing::skills::Priority;
use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// Provably optimal binary selection
    Optimal,
    Infeasible,
    Unbounded,
    /// Search stopped early; the selection is the best found so far
    NotSolved,
    /// Relaxed-and-rounded selection; may break a budget and may not be optimal
    DegradedSuccess,
    NothingToOptimize,
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::Unbounded => "UNBOUNDED",
            SolverStatus::NotSolved => "NOT_SOLVED",
            SolverStatus::DegradedSuccess => "DEGRADED_SUCCESS",
            SolverStatus::NothingToOptimize => "NOTHING_TO_OPTIMIZE",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    BranchAndBound,
    LpRelaxation,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::BranchAndBound => write!(f, "exact branch-and-bound"),
            BackendKind::LpRelaxation => write!(f, "LP relaxation"),
        }
    }
}

/// One binary decision: learn `skill` or not
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionItem {
    pub skill: String,
    pub priority: Priority,
    pub estimate: SkillEstimate,
}

/// maximize sum(x * weight) s.t. sum(x * time) <= time_budget, sum(x * cost) <= cost_budget
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionProblem {
    pub items: Vec<SelectionItem>,
    pub time_budget: f64,
    pub cost_budget: f64,
}

impl SelectionProblem {
    pub fn new(items: Vec<SelectionItem>, time_budget: f64, cost_budget: f64) -> Self {
        Self {
            items,
            time_budget,
            cost_budget,
        }
    }

    /// Even the empty selection breaks a negative budget
    pub fn has_negative_budget(&self) -> bool {
        self.time_budget < 0.0 || self.cost_budget < 0.0
    }

    pub fn totals(&self, selected: &[bool]) -> (f64, f64, f64) {
        self.items
            .iter()
            .zip(selected)
            .filter(|(_, chosen)| **chosen)
            .fold((0.0, 0.0, 0.0), |(time, cost, weight), (item, _)| {
                (
                    time + item.estimate.time_months,
                    cost + item.estimate.cost_dollars,
                    weight + item.estimate.score_weight,
                )
            })
    }
}

/// Raw solver answer, indexed like `SelectionProblem::items`
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub selected: Vec<bool>,
    pub objective: f64,
    pub status: SolverStatus,
    pub message: Option<String>,
}

impl SolverOutcome {
    pub fn empty(len: usize, status: SolverStatus, message: impl Into<String>) -> Self {
        Self {
            selected: vec![false; len],
            objective: 0.0,
            status,
            message: Some(message.into()),
        }
    }
}

pub trait SolverBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn solve(&self, problem: &SelectionProblem) -> Result<SolverOutcome>;
}

static AVAILABLE_BACKENDS: Lazy<Vec<BackendKind>> = Lazy::new(|| {
    let mut backends = Vec::new();
    if cfg!(feature = "exact-solver") {
        backends.push(BackendKind::BranchAndBound);
    }
    if cfg!(feature = "lp-relaxation") {
        backends.push(BackendKind::LpRelaxation);
    }
    info!("Solver backends compiled in: {:?}", backends);
    backends
});

/// Backends built into this binary, best first
pub fn available_backends() -> &'static [BackendKind] {
    &AVAILABLE_BACKENDS
}

/// Instantiate a specific backend if it was compiled in
#[allow(unused_variables)]
pub fn backend_for(kind: BackendKind, max_nodes: usize) -> Result<Box<dyn SolverBackend>> {
    match kind {
        #[cfg(feature = "exact-solver")]
        BackendKind::BranchAndBound => Ok(Box::new(
            crate::optimization::branch_and_bound::BranchAndBoundSolver::new(max_nodes),
        )),
        #[cfg(feature = "lp-relaxation")]
        BackendKind::LpRelaxation => Ok(Box::new(crate::optimization::relaxation::RelaxedLpSolver::new())),
        #[allow(unreachable_patterns)]
        _ => Err(SkillGapError::NoSolverAvailable),
    }
}

/// Pick the best available backend, preferring the exact solver
pub fn detect_backend(max_nodes: usize) -> Result<Box<dyn SolverBackend>> {
    let kind = available_backends()
        .first()
        .copied()
        .ok_or(SkillGapError::NoSolverAvailable)?;
    backend_for(kind, max_nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(SolverStatus::Optimal.to_string(), "OPTIMAL");
        assert_eq!(
            serde_json::to_string(&SolverStatus::DegradedSuccess).unwrap(),
            r#""DEGRADED_SUCCESS""#
        );
    }

    #[cfg(feature = "exact-solver")]
    #[test]
    fn test_exact_backend_preferred() {
        let backend = detect_backend(1000).unwrap();
        assert_eq!(backend.kind(), BackendKind::BranchAndBound);
    }

    #[cfg(not(any(feature = "exact-solver", feature = "lp-relaxation")))]
    #[test]
    fn test_no_backend_is_an_error() {
        assert!(matches!(detect_backend(1000), Err(SkillGapError::NoSolverAvailable)));
    }
}
