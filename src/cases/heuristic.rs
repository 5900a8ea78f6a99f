use anyhow::Result;

use super::{parse_layout, require_solution, visit_grid, Attempt, ProblemVisitor, RunSearch};
use crate::grades::Grades;
use crate::layout::Layout;
use crate::problems::CostFn;
use crate::solve::Reference;
use crate::suite::{Algorithm, HeuristicName, ProblemClass, SearchSuite};
use crate::testfile::{SolutionWriter, TestFile};
use crate::verify::{check_heuristic, threshold_points, HeuristicFailure};
use crate::{Budget, Direction, Heuristic, SearchProblem, SpecError};

#[derive(Debug)]
struct HeuristicSetup {
    layout: Layout,
    layout_name: String,
    class: ProblemClass,
    heuristic: HeuristicName,
}

impl HeuristicSetup {
    fn new(file: &TestFile, algorithm: Option<Algorithm>) -> Result<Self, SpecError> {
        let class = file.require("searchProblemClass")?.parse::<ProblemClass>()?;
        let heuristic = file
            .require("heuristic")?
            .parse::<HeuristicName>()?
            .validate(class, algorithm)?;
        Ok(Self {
            layout: parse_layout(file)?,
            layout_name: file.require("layoutName")?.to_owned(),
            class,
            heuristic,
        })
    }

    fn visit<S: SearchSuite, V: ProblemVisitor>(
        &self,
        suite: &S,
        budget: Budget,
        visitor: V,
    ) -> V::Output {
        visit_grid(
            suite,
            &self.layout,
            self.class,
            self.heuristic,
            CostFn::Unit,
            budget,
            visitor,
        )
    }

    fn astar<S: SearchSuite>(&self, suite: &S, budget: Budget) -> Attempt {
        self.visit(
            suite,
            budget,
            RunSearch {
                suite,
                algorithm: Algorithm::AStar,
            },
        )
    }
}

struct CheckStart {
    solution_cost: f64,
}

impl ProblemVisitor for CheckStart {
    type Output = Result<(), HeuristicFailure>;

    fn visit<P: SearchProblem<Action = Direction>>(
        self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Self::Output {
        check_heuristic(problem, &problem.start_state(), heuristic, self.solution_cost)
    }
}

struct OptimalCost<'r> {
    reference: &'r Reference,
}

impl ProblemVisitor for OptimalCost<'_> {
    type Output = Result<f64>;

    fn visit<P: SearchProblem<Action = Direction>>(
        self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Result<f64> {
        let solution = self.reference.a_star_search(problem, heuristic);
        let solution = require_solution(solution, "aStarSearch")?;
        Ok(problem.cost_of_actions(&solution)?)
    }
}

/// Admissibility and consistency of a heuristic at the start state.
#[derive(Debug)]
pub struct HeuristicTest {
    setup: HeuristicSetup,
}

impl HeuristicTest {
    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        Ok(Self {
            setup: HeuristicSetup::new(file, None)?,
        })
    }

    pub(super) fn execute<S: SearchSuite>(
        &self,
        path: &str,
        suite: &S,
        grades: &mut Grades,
        gold: &TestFile,
    ) -> Result<bool> {
        let solution_cost = gold.parse::<f64>("solution_cost")?;
        // Every expansion here is the grader's own.
        match self
            .setup
            .visit(suite, Budget::UNLIMITED, CheckStart { solution_cost })
        {
            Ok(()) => {
                grades.pass(path);
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
        path: &str,
        reference: Reference,
        out: &mut SolutionWriter,
        budget: Budget,
    ) -> Result<()> {
        tracing::debug!(
            layout = %self.setup.layout_name,
            heuristic = %self.setup.heuristic,
            "solving heuristic problem"
        );
        let cost = self.setup.visit(
            &reference,
            budget,
            OptimalCost {
                reference: &reference,
            },
        )?;
        out.comment(format_args!("This is the solution file for {path}."))
            .value("solution_cost", cost);
        Ok(())
    }
}

/// Partial credit by nodes expanded when A* runs with a suite heuristic.
#[derive(Debug)]
pub struct HeuristicGrade {
    setup: HeuristicSetup,
    base_points: u32,
    thresholds: Vec<usize>,
}

impl HeuristicGrade {
    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        let thresholds = file
            .words("gradingThresholds")?
            .iter()
            .map(|word| {
                word.parse::<usize>().map_err(|_| SpecError::InvalidValue {
                    key: "gradingThresholds".into(),
                    value: word.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            setup: HeuristicSetup::new(file, Some(Algorithm::AStar))?,
            base_points: file.parse("basePoints")?,
            thresholds,
        })
    }

    pub(super) fn execute<S: SearchSuite>(
        &self,
        path: &str,
        suite: &S,
        grades: &mut Grades,
        budget: Budget,
    ) -> Result<bool> {
        let attempt = self.setup.astar(suite, budget);
        if attempt.accepted(grades, path, "aStarSearch", budget).is_none() {
            return Ok(false);
        }
        if !attempt.solves {
            grades.fail(path);
            grades.add_message("\tReturned path is not a solution.");
            grades.add_message(format!("\tnodes expanded by astar: {}", attempt.expanded));
            return Ok(false);
        }

        let points = threshold_points(attempt.expanded, &self.thresholds);
        grades.add_points(self.base_points + points);
        let passed = points as usize >= self.thresholds.len();
        if passed {
            grades.pass(path);
        } else {
            grades.fail(path);
        }
        grades.add_message(format!("\texpanded nodes: {}", attempt.expanded));
        grades.add_message(format!("\tthresholds: {}", super::fmt_list(&self.thresholds)));
        Ok(passed)
    }
}
