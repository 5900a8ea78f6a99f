use std::cell::Cell;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::time::{Duration, Instant};

pub mod cases;
mod error;
pub mod grades;
pub mod graph;
pub mod heuristic;
pub mod layout;
pub mod problems;
pub mod runner;
pub mod solve;
pub mod suite;
pub mod testfile;
pub mod verify;

pub use error::SpecError;

/// A state space explored by a search suite.
///
/// Implementors count every call to [`SearchProblem::successors`] in their
/// [`Expansions`] tracker, repeated calls on the same state included.
pub trait SearchProblem {
    type State: Clone + Eq + Hash + fmt::Debug;
    type Action: Clone + Eq + fmt::Debug + fmt::Display;

    fn start_state(&self) -> Self::State;
    fn is_goal_state(&self, state: &Self::State) -> bool;
    fn successors(&self, state: &Self::State) -> Vec<Successor<Self::State, Self::Action>>;

    fn cost_of_actions(&self, actions: &[Self::Action]) -> Result<f64, SpecError>;

    fn expansions(&self) -> &Expansions;
}

pub type Heuristic<'a, P> = dyn Fn(&<P as SearchProblem>::State, &P) -> f64 + 'a;

#[derive(Debug, Clone, PartialEq)]
pub struct Successor<S, A> {
    pub state: S,
    pub action: A,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Budget {
    pub max_expansions: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl Budget {
    pub const UNLIMITED: Self = Self {
        max_expansions: None,
        time_limit: None,
    };
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.max_expansions, self.time_limit) {
            (Some(n), Some(t)) => write!(f, "{n} expansions or {}s", t.as_secs_f64()),
            (Some(n), None) => write!(f, "{n} expansions"),
            (None, Some(t)) => write!(f, "{}s", t.as_secs_f64()),
            (None, None) => "unlimited".fmt(f),
        }
    }
}

#[derive(Debug)]
pub struct Expansions {
    count: Cell<usize>,
    exhausted: Cell<bool>,
    closed: Cell<bool>,
    budget: Budget,
    started: Instant,
}

impl Expansions {
    pub fn new(budget: Budget) -> Self {
        Self {
            count: Cell::new(0),
            exhausted: Cell::new(false),
            closed: Cell::new(false),
            budget,
            started: Instant::now(),
        }
    }

    /// Counts one expansion. Returns `false` once the budget is spent, after
    /// which the problem yields no more successors.
    pub fn tick(&self) -> bool {
        if self.closed.get() {
            return true;
        }
        let count = self.count.get() + 1;
        self.count.set(count);
        if self.exhausted.get() {
            return false;
        }
        let over_count = self.budget.max_expansions.map_or(false, |max| count > max);
        let over_time = self
            .budget
            .time_limit
            .map_or(false, |limit| self.started.elapsed() > limit);
        if over_count || over_time {
            self.exhausted.set(true);
            return false;
        }
        true
    }

    pub fn count(&self) -> usize {
        self.count.get()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.get()
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Ends the graded search. Later expansions, such as replaying its path,
    /// are neither counted nor limited.
    pub fn close(&self) {
        self.closed.set(true);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Stop,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    pub fn vector(self) -> (i8, i8) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::Stop => (0, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
            Direction::Stop => "Stop",
        }
        .fmt(f)
    }
}

impl FromStr for Direction {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "North" => Self::North,
            "South" => Self::South,
            "East" => Self::East,
            "West" => Self::West,
            "Stop" => Self::Stop,
            _ => {
                return Err(SpecError::UnknownName {
                    kind: "direction",
                    name: s.to_owned(),
                })
            }
        })
    }
}

/// Grid position `(x, y)`, with `y = 0` on the bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(pub u8, pub u8);

impl Pos {
    pub fn step(self, dir: Direction) -> Option<Pos> {
        let (dx, dy) = dir.vector();
        Some(Pos(
            self.0.checked_add_signed(dx)?,
            self.1.checked_add_signed(dy)?,
        ))
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        u32::from(self.0.abs_diff(other.0)) + u32::from(self.1.abs_diff(other.1))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

pub fn follow_action<P: SearchProblem>(
    problem: &P,
    state: &P::State,
    action: &P::Action,
) -> Option<(P::State, f64)> {
    problem
        .successors(state)
        .into_iter()
        .find(|succ| succ.action == *action)
        .map(|succ| (succ.state, succ.cost))
}

/// States visited by replaying `path` from the start, start included.
/// `None` if some action has no matching successor.
pub fn follow_path<P: SearchProblem>(problem: &P, path: &[P::Action]) -> Option<Vec<P::State>> {
    let mut state = problem.start_state();
    let mut states = vec![state.clone()];
    for action in path {
        state = follow_action(problem, &state, action)?.0;
        states.push(state.clone());
    }
    Some(states)
}
