//! Search problems over a [`Layout`].

use std::str::FromStr;

use crate::layout::Layout;
use crate::{Budget, Direction, Expansions, Pos, SearchProblem, SpecError, Successor};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CostFn {
    #[default]
    Unit,
    /// `0.5 ^ x`: cheap on the east side.
    StayEast,
    /// `2 ^ x`: cheap on the west side.
    StayWest,
}

impl CostFn {
    pub fn cost(self, Pos(x, _): Pos) -> f64 {
        match self {
            CostFn::Unit => 1.0,
            CostFn::StayEast => 0.5f64.powi(x.into()),
            CostFn::StayWest => 2f64.powi(x.into()),
        }
    }
}

impl FromStr for CostFn {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "unit" => Self::Unit,
            "stayEast" => Self::StayEast,
            "stayWest" => Self::StayWest,
            _ => {
                return Err(SpecError::UnknownName {
                    kind: "cost function",
                    name: s.to_owned(),
                })
            }
        })
    }
}

fn replay(
    layout: &Layout,
    start: Pos,
    actions: &[Direction],
    mut visit: impl FnMut(Pos),
) -> Result<Pos, SpecError> {
    actions.iter().try_fold(start, |pos, &action| {
        let next = layout
            .legal_moves(pos)
            .into_iter()
            .find(|&(dir, _)| dir == action)
            .map(|(_, next)| next)
            .ok_or_else(|| SpecError::InvalidAction {
                action: action.to_string(),
                state: pos.to_string(),
            })?;
        visit(next);
        Ok(next)
    })
}

#[derive(Debug)]
pub struct PositionSearchProblem<'a> {
    layout: &'a Layout,
    start: Pos,
    goal: Pos,
    cost_fn: CostFn,
    expansions: Expansions,
}

impl<'a> PositionSearchProblem<'a> {
    pub fn new(layout: &'a Layout, budget: Budget) -> Self {
        Self {
            layout,
            start: layout.pacman(),
            goal: Pos(1, 1),
            cost_fn: CostFn::Unit,
            expansions: Expansions::new(budget),
        }
    }

    pub fn with_cost_fn(mut self, cost_fn: CostFn) -> Self {
        self.cost_fn = cost_fn;
        self
    }

    pub fn goal(&self) -> Pos {
        self.goal
    }
}

impl SearchProblem for PositionSearchProblem<'_> {
    type State = Pos;
    type Action = Direction;

    fn start_state(&self) -> Pos {
        self.start
    }

    fn is_goal_state(&self, state: &Pos) -> bool {
        *state == self.goal
    }

    fn successors(&self, state: &Pos) -> Vec<Successor<Pos, Direction>> {
        if !self.expansions.tick() {
            return Vec::new();
        }
        self.layout
            .legal_moves(*state)
            .into_iter()
            .map(|(action, next)| Successor {
                state: next,
                action,
                cost: self.cost_fn.cost(next),
            })
            .collect()
    }

    fn cost_of_actions(&self, actions: &[Direction]) -> Result<f64, SpecError> {
        let mut total = 0.0;
        replay(self.layout, self.start, actions, |pos| {
            total += self.cost_fn.cost(pos)
        })?;
        Ok(total)
    }

    fn expansions(&self) -> &Expansions {
        &self.expansions
    }
}

#[derive(Debug)]
pub struct AnyFoodSearchProblem<'a> {
    layout: &'a Layout,
    expansions: Expansions,
}

impl<'a> AnyFoodSearchProblem<'a> {
    pub fn new(layout: &'a Layout, budget: Budget) -> Self {
        Self {
            layout,
            expansions: Expansions::new(budget),
        }
    }
}

impl SearchProblem for AnyFoodSearchProblem<'_> {
    type State = Pos;
    type Action = Direction;

    fn start_state(&self) -> Pos {
        self.layout.pacman()
    }

    fn is_goal_state(&self, state: &Pos) -> bool {
        self.layout.has_food(*state)
    }

    fn successors(&self, state: &Pos) -> Vec<Successor<Pos, Direction>> {
        if !self.expansions.tick() {
            return Vec::new();
        }
        self.layout
            .legal_moves(*state)
            .into_iter()
            .map(|(action, next)| Successor {
                state: next,
                action,
                cost: 1.0,
            })
            .collect()
    }

    fn cost_of_actions(&self, actions: &[Direction]) -> Result<f64, SpecError> {
        replay(self.layout, self.layout.pacman(), actions, |_| {})?;
        Ok(actions.len() as f64)
    }

    fn expansions(&self) -> &Expansions {
        &self.expansions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CornersState {
    pub pos: Pos,
    /// Indexed like [`Layout::corners`].
    pub visited: [bool; 4],
}

#[derive(Debug)]
pub struct CornersProblem<'a> {
    layout: &'a Layout,
    corners: [Pos; 4],
    expansions: Expansions,
}

impl<'a> CornersProblem<'a> {
    pub fn new(layout: &'a Layout, budget: Budget) -> Self {
        Self {
            layout,
            corners: layout.corners(),
            expansions: Expansions::new(budget),
        }
    }

    pub fn corners(&self) -> [Pos; 4] {
        self.corners
    }

    pub fn layout(&self) -> &Layout {
        self.layout
    }

    fn mark(&self, mut visited: [bool; 4], pos: Pos) -> [bool; 4] {
        for (seen, &corner) in visited.iter_mut().zip(&self.corners) {
            *seen |= corner == pos;
        }
        visited
    }
}

impl SearchProblem for CornersProblem<'_> {
    type State = CornersState;
    type Action = Direction;

    fn start_state(&self) -> CornersState {
        let pos = self.layout.pacman();
        CornersState {
            pos,
            visited: self.mark([false; 4], pos),
        }
    }

    fn is_goal_state(&self, state: &CornersState) -> bool {
        state.visited.iter().all(|&seen| seen)
    }

    fn successors(&self, state: &CornersState) -> Vec<Successor<CornersState, Direction>> {
        if !self.expansions.tick() {
            return Vec::new();
        }
        self.layout
            .legal_moves(state.pos)
            .into_iter()
            .map(|(action, pos)| Successor {
                state: CornersState {
                    pos,
                    visited: self.mark(state.visited, pos),
                },
                action,
                cost: 1.0,
            })
            .collect()
    }

    fn cost_of_actions(&self, actions: &[Direction]) -> Result<f64, SpecError> {
        replay(self.layout, self.layout.pacman(), actions, |_| {})?;
        Ok(actions.len() as f64)
    }

    fn expansions(&self) -> &Expansions {
        &self.expansions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FoodState {
    pub pos: Pos,
    pub food: Box<[Pos]>,
}

#[derive(Debug)]
pub struct FoodSearchProblem<'a> {
    layout: &'a Layout,
    expansions: Expansions,
}

impl<'a> FoodSearchProblem<'a> {
    pub fn new(layout: &'a Layout, budget: Budget) -> Self {
        Self {
            layout,
            expansions: Expansions::new(budget),
        }
    }

    pub fn layout(&self) -> &Layout {
        self.layout
    }
}

impl SearchProblem for FoodSearchProblem<'_> {
    type State = FoodState;
    type Action = Direction;

    fn start_state(&self) -> FoodState {
        let pos = self.layout.pacman();
        FoodState {
            pos,
            food: self.layout.food().into_iter().filter(|&f| f != pos).collect(),
        }
    }

    fn is_goal_state(&self, state: &FoodState) -> bool {
        state.food.is_empty()
    }

    fn successors(&self, state: &FoodState) -> Vec<Successor<FoodState, Direction>> {
        if !self.expansions.tick() {
            return Vec::new();
        }
        self.layout
            .legal_moves(state.pos)
            .into_iter()
            .map(|(action, pos)| Successor {
                state: FoodState {
                    pos,
                    food: state.food.iter().copied().filter(|&f| f != pos).collect(),
                },
                action,
                cost: 1.0,
            })
            .collect()
    }

    fn cost_of_actions(&self, actions: &[Direction]) -> Result<f64, SpecError> {
        replay(self.layout, self.layout.pacman(), actions, |_| {})?;
        Ok(actions.len() as f64)
    }

    fn expansions(&self) -> &Expansions {
        &self.expansions
    }
}

pub fn manhattan_heuristic(pos: &Pos, problem: &PositionSearchProblem<'_>) -> f64 {
    pos.manhattan(problem.goal()).into()
}

pub fn euclidean_heuristic(pos: &Pos, problem: &PositionSearchProblem<'_>) -> f64 {
    let goal = problem.goal();
    let dx = f64::from(pos.0) - f64::from(goal.0);
    let dy = f64::from(pos.1) - f64::from(goal.1);
    dx.hypot(dy)
}
