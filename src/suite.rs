//! The interface a graded search implementation provides, and the name
//! registries test files select from.

use std::fmt;
use std::str::FromStr;

use crate::problems::{
    AnyFoodSearchProblem, CornersProblem, CornersState, FoodSearchProblem, FoodState,
};
use crate::{Direction, Heuristic, SearchProblem, SpecError};

/// A set of search routines under test.
///
/// Each routine returns `None` when it produces no action list at all, which
/// graders report as a failure.
pub trait SearchSuite {
    fn depth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>>;
    fn breadth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>>;
    fn uniform_cost_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>>;
    fn a_star_search<P: SearchProblem>(
        &self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Option<Vec<P::Action>>;

    fn corners_heuristic(&self, state: &CornersState, problem: &CornersProblem<'_>) -> f64;
    fn food_heuristic(&self, state: &FoodState, problem: &FoodSearchProblem<'_>) -> f64;

    /// Path from Pacman's start to the nearest food.
    fn closest_dot_path(&self, problem: &AnyFoodSearchProblem<'_>) -> Option<Vec<Direction>> {
        self.breadth_first_search(problem)
    }
}

macro_rules! registry {
    (
        $(#[$meta:meta])*
        $kind:literal => $name:ident {
            $($variant:ident => $canonical:literal $(| $alias:literal)*,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
        }

        impl FromStr for $name {
            type Err = SpecError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($canonical $(| $alias)* => Ok(Self::$variant),)*
                    _ => Err(SpecError::UnknownName {
                        kind: $kind,
                        name: s.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant => $canonical.fmt(f),)*
                }
            }
        }
    };
}

registry! {
    "algorithm" => Algorithm {
        DepthFirst => "depthFirstSearch" | "dfs",
        BreadthFirst => "breadthFirstSearch" | "bfs",
        UniformCost => "uniformCostSearch" | "ucs",
        AStar => "aStarSearch" | "astar",
    }
}

registry! {
    "heuristic" => HeuristicName {
        Null => "nullHeuristic",
        Manhattan => "manhattanHeuristic",
        Euclidean => "euclideanHeuristic",
        Corners => "cornersHeuristic",
        Food => "foodHeuristic",
    }
}

registry! {
    "search problem class" => ProblemClass {
        Position => "PositionSearchProblem",
        Corners => "CornersProblem",
        Food => "FoodSearchProblem",
        AnyFood => "AnyFoodSearchProblem",
    }
}

impl Algorithm {
    pub fn takes_heuristic(self) -> bool {
        self == Algorithm::AStar
    }

    /// A* without a heuristic searches with a constant zero.
    pub fn run<S: SearchSuite, P: SearchProblem>(
        self,
        suite: &S,
        problem: &P,
        heuristic: Option<&Heuristic<'_, P>>,
    ) -> Option<Vec<P::Action>> {
        match self {
            Algorithm::DepthFirst => suite.depth_first_search(problem),
            Algorithm::BreadthFirst => suite.breadth_first_search(problem),
            Algorithm::UniformCost => suite.uniform_cost_search(problem),
            Algorithm::AStar => {
                let null = |_: &P::State, _: &P| 0.0;
                suite.a_star_search(problem, heuristic.unwrap_or(&null))
            }
        }
    }
}

impl HeuristicName {
    pub fn applies_to(self, problem: ProblemClass) -> bool {
        match self {
            HeuristicName::Null => true,
            HeuristicName::Manhattan | HeuristicName::Euclidean => {
                problem == ProblemClass::Position
            }
            HeuristicName::Corners => problem == ProblemClass::Corners,
            HeuristicName::Food => problem == ProblemClass::Food,
        }
    }

    pub fn validate(self, problem: ProblemClass, algorithm: Option<Algorithm>) -> Result<Self, SpecError> {
        if !self.applies_to(problem) {
            return Err(SpecError::HeuristicMismatch {
                heuristic: self.to_string(),
                problem: problem.to_string(),
            });
        }
        match algorithm {
            Some(algorithm) if !algorithm.takes_heuristic() => Err(SpecError::UnexpectedHeuristic {
                heuristic: self.to_string(),
                algorithm: algorithm.to_string(),
            }),
            _ => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_aliases_resolve() {
        assert_eq!("bfs".parse::<Algorithm>().unwrap(), Algorithm::BreadthFirst);
        assert_eq!(
            "aStarSearch".parse::<Algorithm>().unwrap(),
            Algorithm::AStar
        );
        assert_eq!(Algorithm::UniformCost.to_string(), "uniformCostSearch");
        assert_eq!(
            "CornersProblem".parse::<ProblemClass>().unwrap(),
            ProblemClass::Corners
        );
        assert_eq!(
            "foodHeuristic".parse::<HeuristicName>().unwrap(),
            HeuristicName::Food
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "bestFirstSearch".parse::<Algorithm>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown algorithm name: \"bestFirstSearch\""
        );
        assert!("mazeDistance".parse::<HeuristicName>().is_err());
        assert!("GhostProblem".parse::<ProblemClass>().is_err());
    }

    #[test]
    fn heuristic_pairings() {
        assert!(HeuristicName::Manhattan
            .validate(ProblemClass::Position, Some(Algorithm::AStar))
            .is_ok());
        assert!(matches!(
            HeuristicName::Food.validate(ProblemClass::Corners, None),
            Err(SpecError::HeuristicMismatch { .. })
        ));
        assert!(matches!(
            HeuristicName::Null.validate(ProblemClass::Food, Some(Algorithm::DepthFirst)),
            Err(SpecError::UnexpectedHeuristic { .. })
        ));
    }
}
