//! Test cases: each one runs a [`SearchSuite`] against a gold solution and
//! knows how to author that gold solution with the reference suite.

use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::grades::Grades;
use crate::layout::Layout;
use crate::problems::{
    euclidean_heuristic, manhattan_heuristic, AnyFoodSearchProblem, CornersProblem,
    CornersState, CostFn, FoodSearchProblem, FoodState, PositionSearchProblem,
};
use crate::solve::Reference;
use crate::suite::{Algorithm, HeuristicName, ProblemClass, SearchSuite};
use crate::testfile::{wrap_solution, SolutionWriter, TestFile};
use crate::{follow_path, Budget, Direction, Heuristic, Pos, SearchProblem, SpecError};

mod corners;
mod graph;
mod heuristic;
mod pacman;

pub use corners::{CornerHeuristicPacman, CornerHeuristicSanity, CornerProblemTest};
pub use graph::GraphSearchTest;
pub use heuristic::{HeuristicGrade, HeuristicTest};
pub use pacman::{ClosestDotTest, PacmanSearchTest};

#[derive(Debug)]
enum CaseKind {
    GraphSearch(GraphSearchTest),
    PacmanSearch(PacmanSearchTest),
    CornerProblem(CornerProblemTest),
    Heuristic(HeuristicTest),
    HeuristicGrade(HeuristicGrade),
    ClosestDot(ClosestDotTest),
    CornerHeuristicSanity(CornerHeuristicSanity),
    CornerHeuristicPacman(CornerHeuristicPacman),
}

/// A test case read from a `.test` file. Every name it refers to has been
/// resolved by the time it is constructed.
#[derive(Debug)]
pub struct TestCase {
    path: String,
    kind: CaseKind,
}

impl TestCase {
    pub fn new(path: impl Into<String>, file: &TestFile) -> Result<Self, SpecError> {
        let class = file.require("class")?;
        let kind = match class {
            "GraphSearchTest" => CaseKind::GraphSearch(GraphSearchTest::new(file)?),
            "PacmanSearchTest" => CaseKind::PacmanSearch(PacmanSearchTest::new(file)?),
            "CornerProblemTest" => CaseKind::CornerProblem(CornerProblemTest::new(file)?),
            "HeuristicTest" => CaseKind::Heuristic(HeuristicTest::new(file)?),
            "HeuristicGrade" => CaseKind::HeuristicGrade(HeuristicGrade::new(file)?),
            "ClosestDotTest" => CaseKind::ClosestDot(ClosestDotTest::new(file)?),
            "CornerHeuristicSanity" => {
                CaseKind::CornerHeuristicSanity(CornerHeuristicSanity::new(file)?)
            }
            "CornerHeuristicPacman" => {
                CaseKind::CornerHeuristicPacman(CornerHeuristicPacman::new(file)?)
            }
            _ => {
                return Err(SpecError::UnknownName {
                    kind: "test class",
                    name: class.to_owned(),
                })
            }
        };
        Ok(Self {
            path: path.into(),
            kind,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Grades `suite`. `Ok(false)` is an ordinary failure already described in
    /// `grades`; `Err` is fatal for the whole run.
    pub fn execute<S: SearchSuite>(
        &self,
        suite: &S,
        grades: &mut Grades,
        gold: &TestFile,
        budget: Budget,
    ) -> Result<bool> {
        let path = self.path.as_str();
        tracing::debug!(path, "executing");
        let ret = match &self.kind {
            CaseKind::GraphSearch(case) => case.execute(path, suite, grades, gold, budget),
            CaseKind::PacmanSearch(case) => case.execute(path, suite, grades, gold, budget),
            CaseKind::CornerProblem(case) => case.execute(path, suite, grades, gold, budget),
            CaseKind::Heuristic(case) => case.execute(path, suite, grades, gold),
            CaseKind::HeuristicGrade(case) => case.execute(path, suite, grades, budget),
            CaseKind::ClosestDot(case) => case.execute(path, suite, grades, gold, budget),
            CaseKind::CornerHeuristicSanity(case) => case.execute(path, suite, grades, gold),
            CaseKind::CornerHeuristicPacman(case) => case.execute(path, suite, grades, gold, budget),
        };
        ret.with_context(|| format!("Fatal error in {path}"))
    }

    /// Authors the gold solution. Cases that record both tie-break conventions
    /// run `reference` and its flipped push order.
    pub fn write_solution(&self, reference: Reference, budget: Budget) -> Result<SolutionWriter> {
        let path = self.path.as_str();
        tracing::debug!(path, "writing solution");
        let mut out = SolutionWriter::new();
        let ret = match &self.kind {
            CaseKind::GraphSearch(case) => case.write_solution(path, reference, &mut out, budget),
            CaseKind::PacmanSearch(case) => case.write_solution(path, reference, &mut out, budget),
            CaseKind::CornerProblem(case) => case.write_solution(path, reference, &mut out, budget),
            CaseKind::Heuristic(case) => case.write_solution(path, reference, &mut out, budget),
            CaseKind::HeuristicGrade(_) => {
                out.comment(format_args!("This is the solution file for {path}."))
                    .comment("File intentionally blank.");
                Ok(())
            }
            CaseKind::ClosestDot(case) => case.write_solution(path, reference, &mut out, budget),
            CaseKind::CornerHeuristicSanity(case) => case.write_solution(reference, &mut out, budget),
            CaseKind::CornerHeuristicPacman(case) => case.write_solution(reference, &mut out, budget),
        };
        ret.with_context(|| format!("Failed to write solution for {path}"))?;
        Ok(out)
    }
}

/// What a suite produced on a grid problem, read before anything else touches
/// the problem's expansion counter.
#[derive(Debug)]
struct Attempt {
    solution: Option<Vec<Direction>>,
    expanded: usize,
    exhausted: bool,
    legal: bool,
    solves: bool,
}

impl Attempt {
    fn new<P: SearchProblem<Action = Direction>>(
        problem: &P,
        solution: Option<Vec<Direction>>,
    ) -> Self {
        let expanded = problem.expansions().count();
        let exhausted = problem.expansions().is_exhausted();
        problem.expansions().close();
        let states = solution.as_ref().and_then(|path| follow_path(problem, path));
        Attempt {
            legal: states.is_some(),
            solves: states
                .as_ref()
                .and_then(|states| states.last())
                .map_or(false, |state| problem.is_goal_state(state)),
            solution,
            expanded,
            exhausted,
        }
    }

    /// The returned path, or `None` after recording why there is nothing
    /// usable to grade.
    fn accepted(
        &self,
        grades: &mut Grades,
        path: &str,
        what: &str,
        budget: Budget,
    ) -> Option<&[Direction]> {
        if self.exhausted {
            budget_failure(grades, path, budget);
            return None;
        }
        let Some(solution) = &self.solution else {
            grades.fail(path);
            grades.add_message(format!(
                "\tThe result of {what} must be a list. (Instead, it is None)"
            ));
            return None;
        };
        if !self.legal {
            grades.fail(path);
            grades.add_message(format!("\tOutput of {what} must be a list of legal moves"));
            grades.add_message(format!("\t{}", wrap_solution(solution)));
            return None;
        }
        Some(solution)
    }
}

/// Work done on a grid problem whose concrete type is picked at runtime.
trait ProblemVisitor {
    type Output;

    fn visit<P: SearchProblem<Action = Direction>>(
        self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Self::Output;
}

/// Runs one algorithm of a suite, passing the heuristic only to A*.
struct RunSearch<'s, S> {
    suite: &'s S,
    algorithm: Algorithm,
}

impl<S: SearchSuite> ProblemVisitor for RunSearch<'_, S> {
    type Output = Attempt;

    fn visit<P: SearchProblem<Action = Direction>>(
        self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Attempt {
        let heuristic = self.algorithm.takes_heuristic().then_some(heuristic);
        let solution = self.algorithm.run(self.suite, problem, heuristic);
        Attempt::new(problem, solution)
    }
}

/// Builds the grid problem named by `class` over `layout` and hands it to
/// `visitor` with the heuristic named by `heuristic`. Suite heuristics come
/// from `suite`.
fn visit_grid<S: SearchSuite, V: ProblemVisitor>(
    suite: &S,
    layout: &Layout,
    class: ProblemClass,
    heuristic: HeuristicName,
    cost_fn: CostFn,
    budget: Budget,
    visitor: V,
) -> V::Output {
    match class {
        ProblemClass::Position => {
            let problem = PositionSearchProblem::new(layout, budget).with_cost_fn(cost_fn);
            let h = move |pos: &Pos, problem: &PositionSearchProblem<'_>| match heuristic {
                HeuristicName::Manhattan => manhattan_heuristic(pos, problem),
                HeuristicName::Euclidean => euclidean_heuristic(pos, problem),
                _ => 0.0,
            };
            visitor.visit(&problem, &h)
        }
        ProblemClass::AnyFood => {
            let problem = AnyFoodSearchProblem::new(layout, budget);
            visitor.visit(&problem, &|_: &Pos, _: &AnyFoodSearchProblem<'_>| 0.0)
        }
        ProblemClass::Corners => {
            let problem = CornersProblem::new(layout, budget);
            let h = |state: &CornersState, problem: &CornersProblem<'_>| match heuristic {
                HeuristicName::Corners => suite.corners_heuristic(state, problem),
                _ => 0.0,
            };
            visitor.visit(&problem, &h)
        }
        ProblemClass::Food => {
            let problem = FoodSearchProblem::new(layout, budget);
            let h = |state: &FoodState, problem: &FoodSearchProblem<'_>| match heuristic {
                HeuristicName::Food => suite.food_heuristic(state, problem),
                _ => 0.0,
            };
            visitor.visit(&problem, &h)
        }
    }
}

fn parse_layout(file: &TestFile) -> Result<Layout, SpecError> {
    file.require("layout")?.parse()
}

/// A registry name under `key`, or `default` when the key is absent.
fn name_or<T>(file: &TestFile, key: &str, default: T) -> Result<T, SpecError>
where
    T: FromStr<Err = SpecError>,
{
    file.get(key).map_or(Ok(default), |value| value.parse())
}

fn parse_directions(words: &[String]) -> Result<Vec<Direction>, SpecError> {
    words.iter().map(|word| word.parse()).collect()
}

fn fmt_list<T: std::fmt::Display>(items: &[T]) -> String {
    let items = items.iter().map(|item| item.to_string()).collect::<Vec<_>>();
    format!("[{}]", items.join(", "))
}

fn require_solution<T>(solution: Option<T>, what: &str) -> Result<T> {
    match solution {
        Some(solution) => Ok(solution),
        None => bail!("Error in solution code: {what} returned no solution"),
    }
}

fn budget_failure(grades: &mut Grades, path: &str, budget: Budget) {
    grades.fail(path);
    grades.add_message(format!("\tsearch exceeded its budget of {budget}"));
}

#[cfg(test)]
mod tests;
