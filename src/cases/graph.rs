use anyhow::Result;

use super::require_solution;
use crate::grades::Grades;
use crate::graph::GraphSearch;
use crate::heuristic::HeuristicTable;
use crate::solve::Reference;
use crate::suite::{Algorithm, SearchSuite};
use crate::testfile::{join, SolutionWriter, TestFile};
use crate::{Budget, SearchProblem, SpecError};

/// Exact comparison of the solution, and optionally the expansion order,
/// against either tie-break convention.
#[derive(Debug)]
pub struct GraphSearchTest {
    graph: String,
    algorithm: Algorithm,
    diagram: String,
    exact_expansion_order: bool,
    heuristic: Option<String>,
}

struct SolInfo {
    solution: Option<Vec<String>>,
    expanded_states: Vec<String>,
    exhausted: bool,
}

impl GraphSearchTest {
    pub fn new(file: &TestFile) -> Result<Self, SpecError> {
        let graph = file.require("graph")?.to_owned();
        graph.parse::<GraphSearch>()?;
        let algorithm = file.require("algorithm")?.parse::<Algorithm>()?;
        let heuristic = file.get("heuristic").map(str::to_owned);
        if let Some(text) = &heuristic {
            text.parse::<HeuristicTable>()?;
            if !algorithm.takes_heuristic() {
                return Err(SpecError::UnexpectedHeuristic {
                    heuristic: "graph heuristic table".into(),
                    algorithm: algorithm.to_string(),
                });
            }
        }
        Ok(Self {
            graph,
            algorithm,
            diagram: file.require("diagram")?.to_owned(),
            exact_expansion_order: file
                .get("exactExpansionOrder")
                .map_or(true, |v| v.trim().eq_ignore_ascii_case("true")),
            heuristic,
        })
    }

    fn sol_info<S: SearchSuite>(&self, suite: &S, budget: Budget) -> Result<SolInfo> {
        let problem = self.graph.parse::<GraphSearch>()?.with_budget(budget);
        let solution = match &self.heuristic {
            None => self.algorithm.run(suite, &problem, None),
            Some(text) => {
                let table = text.parse::<HeuristicTable>()?;
                let h = |state: &String, _: &GraphSearch| table.evaluate(state);
                let solution = self.algorithm.run(suite, &problem, Some(&h));
                table.take_miss()?;
                solution
            }
        };
        Ok(SolInfo {
            solution,
            expanded_states: problem.expanded_states(),
            exhausted: problem.expansions().is_exhausted(),
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
        let gold_solution = [gold.words("solution")?, gold.words("rev_solution")?];
        let gold_expanded = [
            gold.words("expanded_states")?,
            gold.words("rev_expanded_states")?,
        ];

        let info = self.sol_info(suite, budget)?;
        if info.exhausted {
            super::budget_failure(grades, path, budget);
            return Ok(false);
        }
        let Some(solution) = info.solution else {
            grades.fail(path);
            grades.add_message(format!(
                "\tThe result of {} must be a list. (Instead, it is None)",
                self.algorithm
            ));
            return Ok(false);
        };
        let expanded = info.expanded_states;

        if gold_solution.contains(&solution)
            && (!self.exact_expansion_order || gold_expanded.contains(&expanded))
        {
            grades.pass(path);
            grades.add_message(format!("\tsolution:\t\t{solution:?}"));
            grades.add_message(format!("\texpanded_states:\t{expanded:?}"));
            return Ok(true);
        }

        grades.fail(path);
        grades.add_message("\tgraph:");
        for line in self.diagram.lines() {
            grades.add_message(format!("\t    {line}"));
        }
        grades.add_message(format!("\tstudent solution:\t\t{solution:?}"));
        grades.add_message(format!("\tstudent expanded_states:\t{expanded:?}"));
        grades.add_message("");
        grades.add_message(format!("\tcorrect solution:\t\t{:?}", gold_solution[0]));
        grades.add_message(format!("\tcorrect expanded_states:\t{:?}", gold_expanded[0]));
        grades.add_message(format!("\tcorrect rev_solution:\t\t{:?}", gold_solution[1]));
        grades.add_message(format!(
            "\tcorrect rev_expanded_states:\t{:?}",
            gold_expanded[1]
        ));
        Ok(false)
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
            .comment("and left-to-right implementations.");

        let forward = self.sol_info(&reference, budget)?;
        let solution = require_solution(forward.solution, &self.algorithm.to_string())?;
        out.value("solution", join(&solution))
            .value("expanded_states", join(&forward.expanded_states));

        let reverse = Reference::new(reference.push_order.flipped());
        let backward = self.sol_info(&reverse, budget)?;
        let solution = require_solution(backward.solution, &self.algorithm.to_string())?;
        out.value("rev_solution", join(&solution))
            .value("rev_expanded_states", join(&backward.expanded_states));
        Ok(())
    }
}
