//! Trusted search algorithms, used to author gold solutions.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};

use crate::problems::{CornersProblem, CornersState, FoodSearchProblem, FoodState};
use crate::suite::SearchSuite;
use crate::{Heuristic, Pos, SearchProblem};

type IndexSet<K> = indexmap::IndexSet<K, fxhash::FxBuildHasher>;

/// Order in which a node's successors enter the frontier.
///
/// Equally ranked successors leave the frontier in different orders under the
/// two conventions, which can give distinct but equally valid solutions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PushOrder {
    #[default]
    Forward,
    Reverse,
}

impl PushOrder {
    pub fn flipped(self) -> Self {
        match self {
            PushOrder::Forward => PushOrder::Reverse,
            PushOrder::Reverse => PushOrder::Forward,
        }
    }
}

trait Frontier {
    fn push(&mut self, node: usize, priority: f64);
    fn pop(&mut self) -> Option<usize>;
}

#[derive(Default)]
struct Stack(Vec<usize>);

impl Frontier for Stack {
    fn push(&mut self, node: usize, _: f64) {
        self.0.push(node);
    }
    fn pop(&mut self) -> Option<usize> {
        self.0.pop()
    }
}

#[derive(Default)]
struct Queue(VecDeque<usize>);

impl Frontier for Queue {
    fn push(&mut self, node: usize, _: f64) {
        self.0.push_back(node);
    }
    fn pop(&mut self) -> Option<usize> {
        self.0.pop_front()
    }
}

#[derive(Default)]
struct PriorityQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    pushed: u64,
}

#[derive(Debug)]
struct Entry {
    priority: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

impl Frontier for PriorityQueue {
    fn push(&mut self, node: usize, priority: f64) {
        self.heap.push(Reverse(Entry {
            priority,
            seq: self.pushed,
            node,
        }));
        self.pushed += 1;
    }
    fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse(entry)| entry.node)
    }
}

struct Node<S, A> {
    state: S,
    parent: usize,
    action: Option<A>,
    cost: f64,
}

/// Graph search: goal test on pop, then skip states already expanded.
fn graph_search<P: SearchProblem>(
    problem: &P,
    mut frontier: impl Frontier,
    order: PushOrder,
    heuristic: &Heuristic<'_, P>,
) -> Option<Vec<P::Action>> {
    let start = problem.start_state();
    frontier.push(0, heuristic(&start, problem));
    let mut nodes = vec![Node {
        state: start,
        parent: !0usize, // Sentinel.
        action: None,
        cost: 0.0,
    }];
    let mut closed = IndexSet::default();

    let goal = loop {
        #[cfg(feature = "coz")]
        coz::scope!("Expand");

        let cursor = frontier.pop()?;
        let state = &nodes[cursor].state;
        if problem.is_goal_state(state) {
            break cursor;
        }
        if !closed.insert(state.clone()) {
            continue;
        }

        let mut succs = problem.successors(state);
        if order == PushOrder::Reverse {
            succs.reverse();
        }
        let base_cost = nodes[cursor].cost;
        for succ in succs {
            #[cfg(feature = "coz")]
            coz::progress!("Push");

            let cost = base_cost + succ.cost;
            frontier.push(nodes.len(), cost + heuristic(&succ.state, problem));
            nodes.push(Node {
                state: succ.state,
                parent: cursor,
                action: Some(succ.action),
                cost,
            });
        }
    };

    let mut path = std::iter::successors(Some(goal), |&i| {
        let parent = nodes[i].parent;
        (parent != !0usize).then_some(parent)
    })
    .filter_map(|i| nodes[i].action.clone())
    .collect::<Vec<_>>();
    path.reverse();
    Some(path)
}

fn zero<P: SearchProblem>(_: &P::State, _: &P) -> f64 {
    0.0
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reference {
    pub push_order: PushOrder,
}

impl Reference {
    pub fn new(push_order: PushOrder) -> Self {
        Self { push_order }
    }
}

impl SearchSuite for Reference {
    fn depth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        graph_search(problem, Stack::default(), self.push_order, &zero::<P>)
    }

    fn breadth_first_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        graph_search(problem, Queue::default(), self.push_order, &zero::<P>)
    }

    fn uniform_cost_search<P: SearchProblem>(&self, problem: &P) -> Option<Vec<P::Action>> {
        graph_search(problem, PriorityQueue::default(), self.push_order, &zero::<P>)
    }

    fn a_star_search<P: SearchProblem>(
        &self,
        problem: &P,
        heuristic: &Heuristic<'_, P>,
    ) -> Option<Vec<P::Action>> {
        graph_search(problem, PriorityQueue::default(), self.push_order, heuristic)
    }

    fn corners_heuristic(&self, state: &CornersState, problem: &CornersProblem<'_>) -> f64 {
        let remaining = problem
            .corners()
            .into_iter()
            .zip(state.visited)
            .filter(|&(_, seen)| !seen)
            .map(|(corner, _)| corner)
            .collect::<Vec<_>>();
        shortest_tour(state.pos, &remaining).into()
    }

    fn food_heuristic(&self, state: &FoodState, _: &FoodSearchProblem<'_>) -> f64 {
        state
            .food
            .iter()
            .map(|&food| state.pos.manhattan(food))
            .max()
            .unwrap_or(0)
            .into()
    }
}

/// Length of the shortest Manhattan tour from `from` through every target.
fn shortest_tour(from: Pos, targets: &[Pos]) -> u32 {
    (0..targets.len())
        .map(|i| {
            let mut rest = targets.to_vec();
            let next = rest.swap_remove(i);
            from.manhattan(next) + shortest_tour(next, &rest)
        })
        .min()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphSearch;
    use crate::heuristic::HeuristicTable;
    use crate::layout::Layout;
    use crate::problems::PositionSearchProblem;
    use crate::{Budget, Direction};

    const BACKTRACK: &str = "start_state: A
goal_states: G
A 0:A->B B 1.0
A 1:A->C C 2.0
A 2:A->D D 4.0
C 0:C->G G 8.0";

    const TIE: &str = "start_state: S
goal_states: G
S 0:S->A A 1.0
S 1:S->B B 1.0
A 0:A->G G 2.0
B 0:B->G G 2.0";

    fn run(
        text: &str,
        f: impl Fn(&GraphSearch) -> Option<Vec<String>>,
    ) -> (Vec<String>, Vec<String>) {
        let graph = text.parse::<GraphSearch>().unwrap();
        let path = f(&graph).unwrap();
        (path, graph.expanded_states())
    }

    #[test]
    fn dfs_both_push_orders() {
        let (path, expanded) = run(BACKTRACK, |g| {
            Reference::new(PushOrder::Forward).depth_first_search(g)
        });
        assert_eq!(path, ["1:A->C", "0:C->G"]);
        assert_eq!(expanded, ["A", "D", "C"]);

        let (path, expanded) = run(BACKTRACK, |g| {
            Reference::new(PushOrder::Reverse).depth_first_search(g)
        });
        assert_eq!(path, ["1:A->C", "0:C->G"]);
        assert_eq!(expanded, ["A", "B", "C"]);
    }

    #[test]
    fn ucs_breaks_ties_first_in_first_out() {
        let (path, expanded) = run(TIE, |g| {
            Reference::new(PushOrder::Forward).uniform_cost_search(g)
        });
        assert_eq!(path, ["0:S->A", "0:A->G"]);
        assert_eq!(expanded, ["S", "A", "B"]);

        let (path, expanded) = run(TIE, |g| {
            Reference::new(PushOrder::Reverse).uniform_cost_search(g)
        });
        assert_eq!(path, ["1:S->B", "0:B->G"]);
        assert_eq!(expanded, ["S", "B", "A"]);
    }

    #[test]
    fn astar_uses_heuristic() {
        let text = "start_state: S
goal_states: G
S 0:S->A A 1.0
S 1:S->B B 2.0
A 0:A->G G 4.0
B 0:B->G G 2.0";
        let table = "S 3\nA 3\nB 2\nG 0".parse::<HeuristicTable>().unwrap();
        let h = |s: &String, _: &GraphSearch| table.evaluate(s);
        let (path, expanded) = run(text, |g| {
            Reference::new(PushOrder::Forward).a_star_search(g, &h)
        });
        assert_eq!(path, ["1:S->B", "0:B->G"]);
        assert_eq!(expanded, ["S", "A", "B"]);
        assert!(table.take_miss().is_ok());
    }

    #[test]
    fn unreachable_goal_is_none() {
        let graph = "start_state: A\ngoal_states: Z\nA a B"
            .parse::<GraphSearch>()
            .unwrap();
        assert_eq!(Reference::default().breadth_first_search(&graph), None);
        assert_eq!(graph.expanded_states(), ["A", "B"]);
    }

    #[test]
    fn start_goal_gives_empty_path() {
        let graph = "start_state: A\ngoal_states: A\nA a B"
            .parse::<GraphSearch>()
            .unwrap();
        assert_eq!(Reference::default().depth_first_search(&graph), Some(vec![]));
        assert!(graph.expanded_states().is_empty());
    }

    #[test]
    fn bfs_on_grid() {
        let layout = "%%%%%\n%. P%\n%%%%%".parse::<Layout>().unwrap();
        for order in [PushOrder::Forward, PushOrder::Reverse] {
            let problem = PositionSearchProblem::new(&layout, Budget::UNLIMITED);
            let path = Reference::new(order).breadth_first_search(&problem).unwrap();
            assert_eq!(path, [Direction::West, Direction::West]);
            assert_eq!(problem.expansions().count(), 2);
        }
    }

    #[test]
    fn corners_heuristic_is_tour_length() {
        assert_eq!(shortest_tour(Pos(1, 1), &[]), 0);
        assert_eq!(
            shortest_tour(Pos(1, 1), &[Pos(1, 2), Pos(2, 1), Pos(2, 2)]),
            3
        );
        assert_eq!(shortest_tour(Pos(1, 1), &[Pos(1, 5), Pos(5, 1)]), 12);
    }

    #[test]
    fn flipped_order() {
        assert_eq!(PushOrder::Forward.flipped(), PushOrder::Reverse);
        assert_eq!(PushOrder::Reverse.flipped().flipped(), PushOrder::Reverse);
    }
}
