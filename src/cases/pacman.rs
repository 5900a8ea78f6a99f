use anyhow::{bail, Result};

use super::{name_or, parse_layout, require_solution, visit_grid, RunSearch};
use crate::grades::Grades;
use crate::layout::Layout;
use crate::problems::{AnyFoodSearchProblem, CostFn};
use crate::solve::Reference;
use crate::suite::{Algorithm, HeuristicName, ProblemClass, SearchSuite};
use crate::testfile::{wrap_solution, SolutionWriter, TestFile};
use crate::{Budget, Direction, SearchProblem, SpecError};

/// Solution must match a gold variant; expansions may exceed the gold count
/// by the leeway factor.
#[derive(Debug)]
pub struct PacmanSearchTest {
    layout: Layout,
    layout_name: String,
    algorithm: Algorithm,
    leeway: f64,
    cost_fn: CostFn,
    class: ProblemClass,
    heuristic: Option<HeuristicName>,
}

impl PacmanSearchTest {
    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        let algorithm = file.require("algorithm")?.parse::<Algorithm>()?;
        let class = name_or(file, "searchProblemClass", ProblemClass::Position)?;
        let heuristic = file
            .get("heuristic")
            .map(|name| name.parse::<HeuristicName>()?.validate(class, Some(algorithm)))
            .transpose()?;
        Ok(Self {
            layout: parse_layout(file)?,
            layout_name: file.require("layoutName")?.to_owned(),
            algorithm,
            leeway: file.parse_or("leewayFactor", 1.0)?,
            cost_fn: name_or(file, "costFn", CostFn::Unit)?,
            class,
            heuristic,
        })
    }

    fn run<S: SearchSuite>(&self, suite: &S, budget: Budget) -> super::Attempt {
        visit_grid(
            suite,
            &self.layout,
            self.class,
            self.heuristic.unwrap_or(HeuristicName::Null),
            self.cost_fn,
            budget,
            RunSearch {
                suite,
                algorithm: self.algorithm,
            },
        )
    }

    pub(super) fn execute<S: SearchSuite>(
        &self,
        path: &str,
        suite: &S,
        grades: &mut Grades,
        gold: &TestFile,
        budget: Budget,
    ) -> Result<bool> {
        let gold_solution = [
            super::parse_directions(&gold.words("solution")?)?,
            super::parse_directions(&gold.words("rev_solution")?)?,
        ];
        let gold_expanded = gold
            .parse::<usize>("expanded_nodes")?
            .max(gold.parse::<usize>("rev_expanded_nodes")?);

        let attempt = self.run(suite, budget);
        let Some(solution) = attempt.accepted(grades, path, &self.algorithm.to_string(), budget)
        else {
            return Ok(false);
        };

        if !gold_solution.iter().any(|variant| variant == solution) {
            grades.fail(path);
            grades.add_message("Solution not correct.");
            grades.add_message(format!("\tstudent solution length: {}", solution.len()));
            grades.add_message(format!("\tstudent solution:\n{}", wrap_solution(solution)));
            grades.add_message("");
            grades.add_message(format!(
                "\tcorrect solution length: {}",
                gold_solution[0].len()
            ));
            grades.add_message(format!(
                "\tcorrect (reversed) solution length: {}",
                gold_solution[1].len()
            ));
            grades.add_message(format!(
                "\tcorrect solution:\n{}",
                wrap_solution(&gold_solution[0])
            ));
            grades.add_message(format!(
                "\tcorrect (reversed) solution:\n{}",
                wrap_solution(&gold_solution[1])
            ));
            return Ok(false);
        }

        if !crate::verify::within_leeway(attempt.expanded, gold_expanded, self.leeway) {
            grades.fail(path);
            grades.add_message("Too many node expanded; are you expanding nodes twice?");
            grades.add_message(format!("\tstudent nodes expanded: {}", attempt.expanded));
            grades.add_message("");
            grades.add_message(format!(
                "\tcorrect nodes expanded: {gold_expanded} (leewayFactor {})",
                self.leeway
            ));
            return Ok(false);
        }

        grades.pass(path);
        grades.add_message(format!("\tpacman layout:\t\t{}", self.layout_name));
        grades.add_message(format!("\tsolution length: {}", solution.len()));
        grades.add_message(format!("\tnodes expanded:\t\t{}", attempt.expanded));
        Ok(true)
    }

    fn solve(&self, reference: &Reference, budget: Budget) -> Result<(Vec<Direction>, usize)> {
        let attempt = self.run(reference, budget);
        if attempt.exhausted {
            bail!("reference search exceeded its budget of {budget}");
        }
        let expanded = attempt.expanded;
        let solution = require_solution(attempt.solution, &self.algorithm.to_string())?;
        Ok((solution, expanded))
    }

    pub(super) fn write_solution(
        &self,
        path: &str,
        reference: Reference,
        out: &mut SolutionWriter,
        budget: Budget,
    ) -> Result<()> {
        out.comment(format_args!("This is the solution file for {path}."))
            .comment("This solution is designed to support both right-to-left")
            .comment("and left-to-right implementations.")
            .comment(format_args!(
                "Number of nodes expanded must be with a factor of {} of the numbers below.",
                self.leeway
            ));

        let (solution, expanded) = self.solve(&reference, budget)?;
        out.block("solution", wrap_solution(&solution))
            .value("expanded_nodes", expanded);

        let reverse = Reference::new(reference.push_order.flipped());
        let (solution, expanded) = self.solve(&reverse, budget)?;
        out.block("rev_solution", wrap_solution(&solution))
            .value("rev_expanded_nodes", expanded);
        Ok(())
    }
}

/// The suite's closest-dot path must have the gold length.
#[derive(Debug)]
pub struct ClosestDotTest {
    layout: Layout,
    layout_name: String,
}

impl ClosestDotTest {
    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        Ok(Self {
            layout: parse_layout(file)?,
            layout_name: file.require("layoutName")?.to_owned(),
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
        let gold_length = gold.parse::<usize>("solution_length")?;
        let problem = AnyFoodSearchProblem::new(&self.layout, budget);
        let solution = suite.closest_dot_path(&problem);
        if problem.expansions().is_exhausted() {
            super::budget_failure(grades, path, budget);
            return Ok(false);
        }
        let Some(solution) = solution else {
            grades.fail(path);
            grades.add_message("\tThe result must be a list. (Instead, it is None)");
            return Ok(false);
        };

        if solution.len() != gold_length {
            grades.fail(path);
            grades.add_message("Closest dot not found.");
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
        tracing::debug!(layout = %self.layout_name, "solving closest dot");
        let problem = AnyFoodSearchProblem::new(&self.layout, budget);
        let solution = reference.closest_dot_path(&problem);
        if problem.expansions().is_exhausted() {
            bail!("reference search exceeded its budget of {budget}");
        }
        let solution = require_solution(solution, "closest_dot_path")?;
        out.comment(format_args!("This is the solution file for {path}."))
            .value("solution_length", solution.len());
        Ok(())
    }
}
