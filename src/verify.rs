//! Checks shared by the test cases.

use std::fmt;

use crate::{Direction, Heuristic, Pos, SearchProblem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicFailure {
    NonZeroAtGoal,
    Negative,
    Trivial,
    Inadmissible,
    Inconsistent,
}

impl fmt::Display for HeuristicFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let test = match self {
            HeuristicFailure::NonZeroAtGoal => "H(goal) == 0",
            HeuristicFailure::Negative => "H >= 0",
            HeuristicFailure::Trivial => "non-triviality",
            HeuristicFailure::Inadmissible => "admissibility",
            HeuristicFailure::Inconsistent => "consistency",
        };
        write!(f, "Heuristic failed {test} test")
    }
}

/// Admissibility and consistency at a single state whose optimal cost to a
/// goal is `solution_cost`.
pub fn check_heuristic<P: SearchProblem>(
    problem: &P,
    state: &P::State,
    heuristic: &Heuristic<'_, P>,
    solution_cost: f64,
) -> Result<(), HeuristicFailure> {
    let h0 = heuristic(state, problem);

    if solution_cost == 0.0 {
        if h0 != 0.0 {
            return Err(HeuristicFailure::NonZeroAtGoal);
        }
        return Ok(());
    }
    if h0 < 0.0 {
        return Err(HeuristicFailure::Negative);
    }
    if !(h0 > 0.0) {
        return Err(HeuristicFailure::Trivial);
    }
    if !(h0 <= solution_cost) {
        return Err(HeuristicFailure::Inadmissible);
    }
    check_successors(problem, state, heuristic)
}

/// `h(state) - h(succ) <= cost(state, succ)` and `h(succ) >= 0` for every
/// successor of `state`.
pub fn check_successors<P: SearchProblem>(
    problem: &P,
    state: &P::State,
    heuristic: &Heuristic<'_, P>,
) -> Result<(), HeuristicFailure> {
    let h0 = heuristic(state, problem);
    for succ in problem.successors(state) {
        let h1 = heuristic(&succ.state, problem);
        if h1 < 0.0 {
            return Err(HeuristicFailure::Negative);
        }
        if h0 - h1 > succ.cost {
            return Err(HeuristicFailure::Inconsistent);
        }
    }
    Ok(())
}

/// Consistency and non-negativity between consecutive states of a path, given
/// the heuristic at each state and the cost of each step. The last state must
/// have heuristic zero.
pub fn check_along_path(values: &[f64], step_costs: &[f64]) -> Result<(), HeuristicFailure> {
    for (pair, &cost) in values.windows(2).zip(step_costs) {
        if pair[0] - pair[1] > cost {
            return Err(HeuristicFailure::Inconsistent);
        }
        if pair[0] < 0.0 || pair[1] < 0.0 {
            return Err(HeuristicFailure::Negative);
        }
    }
    match values.last() {
        Some(&h) if h != 0.0 => Err(HeuristicFailure::NonZeroAtGoal),
        _ => Ok(()),
    }
}

/// Whether `expanded` stays within `leeway` times `gold`, with a minimum slack
/// of one node.
pub fn within_leeway(expanded: usize, gold: usize, leeway: f64) -> bool {
    expanded as f64 <= leeway * gold as f64 || expanded <= gold + 1
}

pub fn threshold_points(expanded: usize, thresholds: &[usize]) -> u32 {
    thresholds.iter().filter(|&&t| expanded <= t).count() as u32
}

/// Positions visited when walking `path` from `start`, start included.
/// Walls are not consulted; the walk stops at the edge of the coordinate space.
pub fn states_from_path(start: Pos, path: &[Direction]) -> Vec<Pos> {
    let mut states = vec![start];
    let mut cur = start;
    for &dir in path {
        let Some(next) = cur.step(dir) else { break };
        cur = next;
        states.push(cur);
    }
    states
}

pub fn missed_corners(corners: [Pos; 4], visited: &[Pos]) -> Vec<Pos> {
    corners
        .into_iter()
        .filter(|corner| !visited.contains(corner))
        .collect()
}
