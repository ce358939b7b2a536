//! Continuous relaxation backend
//!
//! Solves the linear program with `0 <= x <= 1` by a dense-tableau simplex
//! (Bland's rule, so it cannot cycle), then keeps every item whose relaxed
//! value exceeds 0.5. Rounding can push the selection over a budget and the
//! result is not guaranteed optimal, so it is always reported as
//! `DegradedSuccess`.

use crate::error::Result;
use crate::optimization::solver::{
    BackendKind, SelectionProblem, SolverBackend, SolverOutcome, SolverStatus,
};
use log::{debug, warn};

const PIVOT_EPSILON: f64 = 1e-9;
const SELECTION_CUTOFF: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct RelaxedLpSolver;

impl RelaxedLpSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Result of the relaxed LP before rounding
#[derive(Debug, Clone, PartialEq)]
pub enum LpSolution {
    Optimal { values: Vec<f64>, objective: f64 },
    Unbounded,
    IterationLimit,
}

impl SolverBackend for RelaxedLpSolver {
    fn kind(&self) -> BackendKind {
        BackendKind::LpRelaxation
    }

    fn solve(&self, problem: &SelectionProblem) -> Result<SolverOutcome> {
        let n = problem.items.len();
        if problem.has_negative_budget() {
            return Ok(SolverOutcome::empty(
                n,
                SolverStatus::Infeasible,
                "No feasible selection: a budget is negative",
            ));
        }

        let values = match solve_relaxed(problem) {
            LpSolution::Optimal { values, objective } => {
                debug!("Relaxed LP optimum {:.4}", objective);
                values
            }
            LpSolution::Unbounded => {
                return Ok(SolverOutcome::empty(n, SolverStatus::Unbounded, "Relaxed problem is unbounded"))
            }
            LpSolution::IterationLimit => {
                return Ok(SolverOutcome::empty(
                    n,
                    SolverStatus::NotSolved,
                    "Simplex iteration limit reached",
                ))
            }
        };

        let selected: Vec<bool> = values.iter().map(|&x| x > SELECTION_CUTOFF).collect();
        let (time, cost, objective) = problem.totals(&selected);

        let mut message = format!(
            "Continuous relaxation with rounding. Score improvement: {:.2}",
            objective
        );
        if time > problem.time_budget || cost > problem.cost_budget {
            warn!(
                "Rounded plan exceeds budget: {:.2} months / ${:.0} against {:.2} / ${:.0}",
                time, cost, problem.time_budget, problem.cost_budget
            );
            message.push_str(" (rounded plan exceeds a budget)");
        }

        Ok(SolverOutcome {
            selected,
            objective,
            status: SolverStatus::DegradedSuccess,
            message: Some(message),
        })
    }
}

/// Maximise total weight over `0 <= x <= 1` subject to both budgets.
///
/// Budgets must be non-negative so the all-slack basis is feasible.
pub fn solve_relaxed(problem: &SelectionProblem) -> LpSolution {
    let n = problem.items.len();
    let m = n + 2;
    let width = n + m + 1;
    let rhs = width - 1;

    // Rows: time, cost, then x_i <= 1; last row is the objective
    let mut tableau = vec![vec![0.0f64; width]; m + 1];
    for (j, item) in problem.items.iter().enumerate() {
        tableau[0][j] = item.estimate.time_months;
        tableau[1][j] = item.estimate.cost_dollars;
        tableau[2 + j][j] = 1.0;
        tableau[m][j] = -item.estimate.score_weight;
    }
    tableau[0][rhs] = problem.time_budget;
    tableau[1][rhs] = problem.cost_budget;
    for row in 0..m {
        tableau[row][n + row] = 1.0;
        if row >= 2 {
            tableau[row][rhs] = 1.0;
        }
    }
    let mut basis: Vec<usize> = (n..n + m).collect();

    let max_iterations = 50 * (n + m).max(1);
    for _ in 0..max_iterations {
        // Bland: lowest-index improving column
        let Some(entering) = (0..n + m).find(|&col| tableau[m][col] < -PIVOT_EPSILON) else {
            let mut values = vec![0.0; n];
            for (row, &var) in basis.iter().enumerate() {
                if var < n {
                    values[var] = tableau[row][rhs].clamp(0.0, 1.0);
                }
            }
            return LpSolution::Optimal {
                values,
                objective: tableau[m][rhs],
            };
        };

        // Minimum ratio, ties to the lowest basic variable index
        let mut leaving: Option<usize> = None;
        for row in 0..m {
            let coefficient = tableau[row][entering];
            if coefficient <= PIVOT_EPSILON {
                continue;
            }
            let ratio = tableau[row][rhs] / coefficient;
            leaving = match leaving {
                None => Some(row),
                Some(current) => {
                    let best = tableau[current][rhs] / tableau[current][entering];
                    if ratio < best - PIVOT_EPSILON
                        || ((ratio - best).abs() <= PIVOT_EPSILON && basis[row] < basis[current])
                    {
                        Some(row)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        let Some(pivot_row) = leaving else {
            return LpSolution::Unbounded;
        };

        pivot(&mut tableau, pivot_row, entering);
        basis[pivot_row] = entering;
    }

    LpSolution::IterationLimit
}

fn pivot(tableau: &mut [Vec<f64>], pivot_row: usize, pivot_col: usize) {
    let divisor = tableau[pivot_row][pivot_col];
    for value in tableau[pivot_row].iter_mut() {
        *value /= divisor;
    }

    let pivot_values = tableau[pivot_row].clone();
    for (row, values) in tableau.iter_mut().enumerate() {
        if row == pivot_row {
            continue;
        }
        let factor = values[pivot_col];
        if factor.abs() <= f64::EPSILON {
            continue;
        }
        for (value, pivot_value) in values.iter_mut().zip(&pivot_values) {
            *value -= factor * pivot_value;
        }
    }
}
