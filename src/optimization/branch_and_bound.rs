//! Exact 0/1 selection by depth-first branch-and-bound
//!
//! Upper bounds come from the fractional knapsack relaxation of each budget
//! taken separately; the smaller of the two is used to prune.

use crate::error::Result;
use crate::optimization::solver::{
    BackendKind, SelectionProblem, SolverBackend, SolverOutcome, SolverStatus,
};
use log::{debug, warn};
use std::cmp::Ordering;

const BOUND_EPSILON: f64 = 1e-12;

pub struct BranchAndBoundSolver {
    max_nodes: usize,
}

impl BranchAndBoundSolver {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            max_nodes: max_nodes.max(1),
        }
    }
}

impl SolverBackend for BranchAndBoundSolver {
    fn kind(&self) -> BackendKind {
        BackendKind::BranchAndBound
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

        let mut search = Search::new(problem, self.max_nodes);
        search.run(0, 0.0, 0.0, 0.0);
        debug!("Branch-and-bound explored {} nodes", search.nodes);

        let (status, message) = if search.exhausted {
            warn!("Node limit of {} reached, returning best plan found", self.max_nodes);
            (
                SolverStatus::NotSolved,
                format!("Search stopped after {} nodes; best plan so far", search.nodes),
            )
        } else {
            (
                SolverStatus::Optimal,
                format!("Optimal plan found. Score improvement: {:.2}", search.best_weight),
            )
        };

        Ok(SolverOutcome {
            selected: search.best,
            objective: search.best_weight,
            status,
            message: Some(message),
        })
    }
}

struct Search<'a> {
    problem: &'a SelectionProblem,
    /// Branching order: item indices by descending weight
    order: Vec<usize>,
    /// Position of each item in `order`
    rank: Vec<usize>,
    by_time_density: Vec<usize>,
    by_cost_density: Vec<usize>,
    current: Vec<bool>,
    best: Vec<bool>,
    best_weight: f64,
    nodes: usize,
    max_nodes: usize,
    exhausted: bool,
}

impl<'a> Search<'a> {
    fn new(problem: &'a SelectionProblem, max_nodes: usize) -> Self {
        let items = &problem.items;
        let n = items.len();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            let (ea, eb) = (&items[a].estimate, &items[b].estimate);
            eb.score_weight
                .partial_cmp(&ea.score_weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| ea.time_months.partial_cmp(&eb.time_months).unwrap_or(Ordering::Equal))
                .then(a.cmp(&b))
        });
        let mut rank = vec![0; n];
        for (position, &index) in order.iter().enumerate() {
            rank[index] = position;
        }

        let density_order = |resource: &dyn Fn(usize) -> f64| {
            let density = |i: usize| {
                let r = resource(i);
                if r <= 0.0 {
                    f64::INFINITY
                } else {
                    items[i].estimate.score_weight / r
                }
            };
            let mut indices: Vec<usize> = (0..n).collect();
            indices.sort_by(|&a, &b| density(b).partial_cmp(&density(a)).unwrap_or(Ordering::Equal));
            indices
        };
        let by_time_density = density_order(&|i| items[i].estimate.time_months);
        let by_cost_density = density_order(&|i| items[i].estimate.cost_dollars);

        Self {
            problem,
            order,
            rank,
            by_time_density,
            by_cost_density,
            current: vec![false; n],
            best: vec![false; n],
            best_weight: 0.0,
            nodes: 0,
            max_nodes,
            exhausted: false,
        }
    }

    fn run(&mut self, depth: usize, weight: f64, time: f64, cost: f64) {
        if self.nodes >= self.max_nodes {
            self.exhausted = true;
            return;
        }
        self.nodes += 1;

        if weight > self.best_weight + BOUND_EPSILON {
            self.best_weight = weight;
            self.best.clone_from(&self.current);
        }
        if depth == self.order.len() {
            return;
        }

        let time_left = self.problem.time_budget - time;
        let cost_left = self.problem.cost_budget - cost;
        if self.upper_bound(depth, weight, time_left, cost_left) <= self.best_weight + BOUND_EPSILON {
            return;
        }

        let index = self.order[depth];
        let estimate = self.problem.items[index].estimate;
        let fits = time + estimate.time_months <= self.problem.time_budget
            && cost + estimate.cost_dollars <= self.problem.cost_budget;

        if estimate.score_weight > 0.0 && fits {
            self.current[index] = true;
            self.run(
                depth + 1,
                weight + estimate.score_weight,
                time + estimate.time_months,
                cost + estimate.cost_dollars,
            );
            self.current[index] = false;
        }
        self.run(depth + 1, weight, time, cost);
    }

    fn upper_bound(&self, depth: usize, weight: f64, time_left: f64, cost_left: f64) -> f64 {
        let time_bound = self.fractional_bound(&self.by_time_density, depth, time_left, |e| e.time_months);
        let cost_bound = self.fractional_bound(&self.by_cost_density, depth, cost_left, |e| e.cost_dollars);
        weight + time_bound.min(cost_bound)
    }

    /// Best fractional fill of one budget using only undecided items
    fn fractional_bound(
        &self,
        density_order: &[usize],
        depth: usize,
        capacity: f64,
        resource: impl Fn(&crate::optimization::estimates::SkillEstimate) -> f64,
    ) -> f64 {
        let mut remaining = capacity;
        let mut bound = 0.0;

        for &index in density_order {
            if self.rank[index] < depth {
                continue;
            }
            let estimate = &self.problem.items[index].estimate;
            if estimate.score_weight <= 0.0 {
                continue;
            }
            let needed = resource(estimate);
            if needed <= remaining {
                bound += estimate.score_weight;
                remaining -= needed;
            } else {
                if remaining > 0.0 {
                    bound += estimate.score_weight * remaining / needed;
                }
                break;
            }
        }

        bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::estimates::SkillEstimate;
    use crate::optimization::solver::SelectionItem;
    use crate::processing::skills::Priority;

    fn item(skill: &str, time: f64, cost: f64, weight: f64) -> SelectionItem {
        SelectionItem {
            skill: skill.to_string(),
            priority: Priority::High,
            estimate: SkillEstimate {
                time_months: time,
                cost_dollars: cost,
                score_weight: weight,
            },
        }
    }

    fn brute_force(problem: &SelectionProblem) -> f64 {
        let n = problem.items.len();
        let mut best = 0.0f64;
        for mask in 0u32..(1 << n) {
            let selected: Vec<bool> = (0..n).map(|i| mask & (1 << i) != 0).collect();
            let (time, cost, weight) = problem.totals(&selected);
            if time <= problem.time_budget && cost <= problem.cost_budget {
                best = best.max(weight);
            }
        }
        best
    }

    #[test]
    fn test_beats_greedy() {
        // Greedy by weight takes A (1.0); B + C together are worth 1.2
        let problem = SelectionProblem::new(
            vec![item("A", 2.0, 10.0, 1.0), item("B", 1.0, 10.0, 0.6), item("C", 1.0, 10.0, 0.6)],
            2.0,
            100.0,
        );
        let outcome = BranchAndBoundSolver::new(10_000).solve(&problem).unwrap();

        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert_eq!(outcome.selected, vec![false, true, true]);
        assert!((outcome.objective - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_matches_exhaustive_search() {
        let mut seed: u64 = 0x5eed;
        let mut next = move || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) % 1000) as f64 / 1000.0
        };

        for _ in 0..20 {
            let items: Vec<SelectionItem> = (0..10)
                .map(|i| item(&format!("s{i}"), 0.1 + next() * 2.0, 10.0 + next() * 200.0, next()))
                .collect();
            let problem = SelectionProblem::new(items, 3.0, 400.0);
            let outcome = BranchAndBoundSolver::new(1_000_000).solve(&problem).unwrap();

            let (time, cost, weight) = problem.totals(&outcome.selected);
            assert!(time <= problem.time_budget);
            assert!(cost <= problem.cost_budget);
            assert!((weight - outcome.objective).abs() < 1e-9);
            assert!((outcome.objective - brute_force(&problem)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_node_limit_reports_not_solved() {
        let items: Vec<SelectionItem> = (0..12).map(|i| item(&format!("s{i}"), 1.0, 10.0, 1.0)).collect();
        let problem = SelectionProblem::new(items, 6.5, 1000.0);
        let outcome = BranchAndBoundSolver::new(3).solve(&problem).unwrap();

        assert_eq!(outcome.status, SolverStatus::NotSolved);
        let (time, _, _) = problem.totals(&outcome.selected);
        assert!(time <= problem.time_budget);
    }

    #[test]
    fn test_negative_budget_is_infeasible() {
        let problem = SelectionProblem::new(vec![item("Git", 0.5, 50.0, 1.0)], -1.0, 100.0);
        let outcome = BranchAndBoundSolver::new(100).solve(&problem).unwrap();
        assert_eq!(outcome.status, SolverStatus::Infeasible);
        assert_eq!(outcome.selected, vec![false]);
    }

    #[test]
    fn test_zero_weight_items_not_selected() {
        let problem = SelectionProblem::new(vec![item("Git", 0.5, 50.0, 0.0)], 1.0, 100.0);
        let outcome = BranchAndBoundSolver::new(100).solve(&problem).unwrap();
        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert_eq!(outcome.selected, vec![false]);
    }
}
