//! Plain directed graphs described by a small text format:
//!
//! ```text
//! start_state: A
//! goal_states: G H
//! A go B
//! B jump G 2.5
//! ```
//!
//! Edge lines are `<from> <action> <to> [<cost>]`, cost defaulting to 1.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use crate::{Budget, Expansions, SearchProblem, SpecError, Successor};

type IndexMap<K, V> = indexmap::IndexMap<K, V, fxhash::FxBuildHasher>;

#[derive(Debug, Clone, PartialEq)]
struct Edge {
    from: String,
    action: String,
    to: String,
    cost: f64,
}

#[derive(Debug)]
pub struct GraphSearch {
    start_state: String,
    goals: Vec<String>,
    successors: IndexMap<String, Vec<Successor<String, String>>>,
    edges: Vec<Edge>,
    expanded_states: RefCell<Vec<String>>,
    expansions: Expansions,
}

impl FromStr for GraphSearch {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.split('\n');

        let start_state = lines
            .next()
            .and_then(|line| line.trim().strip_prefix("start_state:"))
            .map(|rest| rest.trim().to_owned())
            .ok_or_else(|| SpecError::MissingStartState { text: s.to_owned() })?;
        let goals = lines
            .next()
            .and_then(|line| line.trim().strip_prefix("goal_states:"))
            .map(|rest| rest.split_whitespace().map(str::to_owned).collect::<Vec<_>>())
            .ok_or_else(|| SpecError::MissingGoalStates { text: s.to_owned() })?;

        let mut successors = IndexMap::<String, Vec<_>>::default();
        let mut edges = Vec::new();
        for line in lines.filter(|line| !line.trim().is_empty()) {
            let invalid = || SpecError::InvalidEdge {
                line: line.to_owned(),
                text: s.to_owned(),
            };
            let tokens = line.split_whitespace().collect::<Vec<_>>();
            let (from, action, to, cost) = match tokens[..] {
                [from, action, to] => (from, action, to, 1.0),
                [from, action, to, cost] => {
                    (from, action, to, cost.parse::<f64>().map_err(|_| invalid())?)
                }
                _ => return Err(invalid()),
            };

            successors.entry(from.to_owned()).or_default().push(Successor {
                state: to.to_owned(),
                action: action.to_owned(),
                cost,
            });
            successors.entry(to.to_owned()).or_default();
            edges.push(Edge {
                from: from.to_owned(),
                action: action.to_owned(),
                to: to.to_owned(),
                cost,
            });
        }

        Ok(Self {
            start_state,
            goals,
            successors,
            edges,
            expanded_states: RefCell::default(),
            expansions: Expansions::new(Budget::UNLIMITED),
        })
    }
}

impl GraphSearch {
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.expansions = Expansions::new(budget);
        self
    }

    pub fn goals(&self) -> &[String] {
        &self.goals
    }

    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.successors.keys().map(String::as_str)
    }

    /// Every state `successors` was called on, in call order.
    pub fn expanded_states(&self) -> Vec<String> {
        self.expanded_states.borrow().clone()
    }
}

impl SearchProblem for GraphSearch {
    type State = String;
    type Action = String;

    fn start_state(&self) -> String {
        self.start_state.clone()
    }

    fn is_goal_state(&self, state: &String) -> bool {
        self.goals.contains(state)
    }

    fn successors(&self, state: &String) -> Vec<Successor<String, String>> {
        self.expanded_states.borrow_mut().push(state.clone());
        if !self.expansions.tick() {
            return Vec::new();
        }
        self.successors.get(state).cloned().unwrap_or_default()
    }

    fn cost_of_actions(&self, actions: &[String]) -> Result<f64, SpecError> {
        let mut state = &self.start_state;
        let mut total = 0.0;
        for action in actions {
            let succ = self
                .successors
                .get(state)
                .and_then(|succs| succs.iter().find(|succ| succ.action == *action))
                .ok_or_else(|| SpecError::InvalidAction {
                    action: action.clone(),
                    state: state.clone(),
                })?;
            state = &succ.state;
            total += succ.cost;
        }
        Ok(total)
    }

    fn expansions(&self) -> &Expansions {
        &self.expansions
    }
}

impl fmt::Display for GraphSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start_state: {}", self.start_state)?;
        write!(f, "goal_states: {}", self.goals.join(" "))?;
        for edge in &self.edges {
            write!(f, "\n{} {} {} {}", edge.from, edge.action, edge.to, edge.cost)?;
        }
        Ok(())
    }
}
