use anyhow::{bail, Result};

use super::{fmt_list, parse_directions, parse_layout, require_solution, Attempt};
use crate::grades::Grades;
use crate::layout::Layout;
use crate::problems::{CornersProblem, CornersState};
use crate::solve::Reference;
use crate::suite::SearchSuite;
use crate::testfile::{wrap_solution, SolutionWriter, TestFile};
use crate::verify::{check_along_path, check_successors, missed_corners, states_from_path};
use crate::verify::{threshold_points, HeuristicFailure};
use crate::{follow_action, Budget, Direction, SearchProblem, SpecError};

/// BFS on the corners problem must touch every corner with a path of the
/// gold length.
#[derive(Debug)]
pub struct CornerProblemTest {
    layout: Layout,
    layout_name: String,
}

impl CornerProblemTest {
    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        Ok(Self {
            layout: parse_layout(file)?,
            layout_name: file.require("layoutName")?.to_owned(),
        })
    }

    fn run<S: SearchSuite>(&self, suite: &S, budget: Budget) -> Attempt {
        let problem = CornersProblem::new(&self.layout, budget);
        let solution = suite.breadth_first_search(&problem);
        Attempt::new(&problem, solution)
    }

    pub(super) fn execute<S: SearchSuite>(
        &self,
        path: &str,
        suite: &S,
        grades: &mut Grades,
        gold: &TestFile,
        budget: Budget,
    ) -> Result<bool> {
        let gold_length = gold.parse::<usize>("solution_length")?;
        let attempt = self.run(suite, budget);
        if attempt.exhausted {
            super::budget_failure(grades, path, budget);
            return Ok(false);
        }
        let Some(solution) = &attempt.solution else {
            grades.fail(path);
            grades.add_message("The result must be a list. (Instead, it is None)");
            return Ok(false);
        };

        // Walls are not consulted here: the corners come from the replayed
        // coordinates alone.
        let visited = states_from_path(self.layout.pacman(), solution);
        let missed = missed_corners(self.layout.corners(), &visited);
        if !missed.is_empty() {
            grades.fail(path);
            grades.add_message(format!("Corners missed: {}", fmt_list(&missed)));
            return Ok(false);
        }

        if solution.len() != gold_length {
            grades.fail(path);
            grades.add_message("Optimal solution not found.");
            grades.add_message(format!("\tstudent solution length:\n{}", solution.len()));
            grades.add_message("");
            grades.add_message(format!("\tcorrect solution length:\n{gold_length}"));
            return Ok(false);
        }

        grades.pass(path);
        grades.add_message(format!("\tpacman layout:\t\t{}", self.layout_name));
        grades.add_message(format!("\tsolution length:\t\t{}", solution.len()));
        Ok(true)
    }

    pub(super) fn write_solution(
        &self,
        path: &str,
        reference: Reference,
        out: &mut SolutionWriter,
        budget: Budget,
    ) -> Result<()> {
        tracing::debug!(layout = %self.layout_name, "solving corners problem");
        let attempt = self.run(&reference, budget);
        if attempt.exhausted {
            bail!("reference search exceeded its budget of {budget}");
        }
        let solution = require_solution(attempt.solution, "breadthFirstSearch")?;
        out.comment(format_args!("This is the solution file for {path}."))
            .value("solution_length", solution.len());
        Ok(())
    }
}

fn reference_path(layout: &Layout, reference: &Reference, budget: Budget) -> Result<Vec<Direction>> {
    let problem = CornersProblem::new(layout, budget);
    let h = |state: &CornersState, problem: &CornersProblem<'_>| {
        reference.corners_heuristic(state, problem)
    };
    let solution = reference.a_star_search(&problem, &h);
    if problem.expansions().is_exhausted() {
        bail!("reference search exceeded its budget of {budget}");
    }
    require_solution(solution, "aStarSearch")
}

/// The corners heuristic must be admissible at the start and consistent
/// along the gold path.
#[derive(Debug)]
pub struct CornerHeuristicSanity {
    layout: Layout,
}

impl CornerHeuristicSanity {
    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        Ok(Self {
            layout: parse_layout(file)?,
        })
    }

    fn check<S: SearchSuite>(
        &self,
        suite: &S,
        true_cost: f64,
        gold_path: &[Direction],
    ) -> Result<Result<(), HeuristicFailure>> {
        // Every expansion here is the grader's own.
        let problem = CornersProblem::new(&self.layout, Budget::UNLIMITED);
        let h = |state: &CornersState, problem: &CornersProblem<'_>| {
            suite.corners_heuristic(state, problem)
        };
        let start = problem.start_state();

        if let Err(failure) = check_successors(&problem, &start, &h) {
            return Ok(Err(failure));
        }
        let h0 = h(&start, &problem);
        if h0 == 0.0 {
            return Ok(Err(HeuristicFailure::Trivial));
        }
        if h0 > true_cost {
            return Ok(Err(HeuristicFailure::Inadmissible));
        }

        let mut values = vec![h0];
        let mut step_costs = Vec::with_capacity(gold_path.len());
        let mut state = start;
        for action in gold_path {
            let (next, cost) = follow_action(&problem, &state, action).ok_or_else(|| {
                SpecError::InvalidAction {
                    action: action.to_string(),
                    state: state.pos.to_string(),
                }
            })?;
            values.push(h(&next, &problem));
            step_costs.push(cost);
            state = next;
        }
        Ok(check_along_path(&values, &step_costs))
    }

    pub(super) fn execute<S: SearchSuite>(
        &self,
        path: &str,
        suite: &S,
        grades: &mut Grades,
        gold: &TestFile,
    ) -> Result<bool> {
        let true_cost = gold.parse::<f64>("cost")?;
        let gold_path = parse_directions(&gold.words("path")?)?;
        match self.check(suite, true_cost, &gold_path)? {
            Ok(()) => {
                grades.pass(path);
                grades.add_message("\theuristic value less than true cost at start state");
                Ok(true)
            }
            Err(failure) => {
                grades.fail(path);
                grades.add_message(format!("\t{failure}"));
                Ok(false)
            }
        }
    }

    pub(super) fn write_solution(
        &self,
        reference: Reference,
        out: &mut SolutionWriter,
        budget: Budget,
    ) -> Result<()> {
        let solution = reference_path(&self.layout, &reference, budget)?;
        out.comment("In order for a heuristic to be admissible, the value")
            .comment("of the heuristic must be less at each state than the")
            .comment("true cost of the optimal path from that state to a goal.")
            .value("cost", solution.len())
            .block("path", wrap_solution(&solution));
        Ok(())
    }
}

/// Partial credit for the corners heuristic by nodes expanded under A*.
#[derive(Debug)]
pub struct CornerHeuristicPacman {
    layout: Layout,
}

impl CornerHeuristicPacman {
    const THRESHOLDS: &'static str = "2000 1600 1200";

    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        Ok(Self {
            layout: parse_layout(file)?,
        })
    }

    pub(super) fn execute<S: SearchSuite>(
        &self,
        path: &str,
        suite: &S,
        grades: &mut Grades,
        gold: &TestFile,
        budget: Budget,
    ) -> Result<bool> {
        let true_cost = gold.parse::<f64>("cost")?;
        let thresholds = gold
            .words("thresholds")?
            .iter()
            .map(|word| {
                word.parse::<usize>().map_err(|_| SpecError::InvalidValue {
                    key: "thresholds".into(),
                    value: word.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let problem = CornersProblem::new(&self.layout, budget);
        let h = |state: &CornersState, problem: &CornersProblem<'_>| {
            suite.corners_heuristic(state, problem)
        };
        if h(&problem.start_state(), &problem) > true_cost {
            grades.fail(path);
            grades.add_message(format!("\t{}", HeuristicFailure::Inadmissible));
            return Ok(false);
        }

        let attempt = Attempt::new(&problem, suite.a_star_search(&problem, &h));
        let Some(solution) = attempt.accepted(grades, path, "aStarSearch", budget) else {
            return Ok(false);
        };
        tracing::debug!(path, length = solution.len(), "astar path");
        if !attempt.solves {
            grades.fail(path);
            grades.add_message("\tReturned path is not a solution.");
            return Ok(false);
        }
        if problem.cost_of_actions(solution)? > true_cost {
            grades.fail(path);
            grades.add_message(format!("\t{}", HeuristicFailure::Inconsistent));
            return Ok(false);
        }

        let points = threshold_points(attempt.expanded, &thresholds);
        grades.add_points(points);
        let passed = points as usize >= thresholds.len();
        let verdict = if passed { "PASS" } else { "FAIL" };
        grades.add_message(format!(
            "{verdict}: Heuristic resulted in expansion of {} nodes",
            attempt.expanded
        ));
        Ok(passed)
    }

    pub(super) fn write_solution(
        &self,
        reference: Reference,
        out: &mut SolutionWriter,
        budget: Budget,
    ) -> Result<()> {
        let solution = reference_path(&self.layout, &reference, budget)?;
        out.comment("This solution file specifies the length of the optimal path")
            .comment("as well as the thresholds on number of nodes expanded to be")
            .comment("used in scoring.")
            .value("cost", solution.len())
            .block("path", wrap_solution(&solution))
            .value("thresholds", Self::THRESHOLDS);
        Ok(())
    }
}
