use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::hash::Hash;

/// A state space searched by [`AStar`].
///
/// `step_cost` is the cost of entering a state, so the start state contributes
/// nothing to the accumulated cost of a path.
pub trait SearchProblem {
    type State: Clone + Eq + Hash;

    fn successors(&self, state: &Self::State) -> Vec<Self::State>;
    fn step_cost(&self, state: &Self::State) -> f32;
    fn is_goal(&self, state: &Self::State) -> bool;
    fn heuristic(&self, state: &Self::State) -> f32;
}

struct Node {
    f_score: f32,
    seq: usize,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on f, oldest entry first on ties
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Entry<S> {
    state: S,
    parent: Option<usize>,
    cost: f32,
}

/// Bounded best-first search. Exceeding `max_expansions` yields `None`.
pub struct AStar {
    pub max_expansions: usize,
}

impl AStar {
    pub fn new(max_expansions: usize) -> Self {
        Self { max_expansions }
    }

    /// Returns the state sequence (start first) and its accumulated cost.
    #[tracing::instrument(level = "trace", skip(self, problem, start))]
    pub fn find_path<P: SearchProblem>(
        &self,
        problem: &P,
        start: P::State,
    ) -> Option<(Vec<P::State>, f32)> {
        let mut entries: Vec<Entry<P::State>> = Vec::new();
        let mut open_set = BinaryHeap::new();
        let mut explored: HashSet<P::State> = HashSet::new();

        open_set.push(Node {
            f_score: problem.heuristic(&start),
            seq: 0,
        });
        entries.push(Entry {
            state: start,
            parent: None,
            cost: 0.0,
        });

        let mut expansions = 0;
        while let Some(Node { seq: current, .. }) = open_set.pop() {
            if expansions > self.max_expansions {
                tracing::trace!(expansions, "search bound exceeded");
                return None;
            }

            let state = &entries[current].state;
            if problem.is_goal(state) {
                tracing::trace!(expansions, cost = entries[current].cost, "goal reached");
                return Some(reconstruct_path(&entries, current));
            }

            if !explored.insert(state.clone()) {
                continue;
            }

            let current_cost = entries[current].cost;
            for next in problem.successors(&entries[current].state) {
                if explored.contains(&next) {
                    continue;
                }

                let cost = current_cost + problem.step_cost(&next);
                let seq = entries.len();
                open_set.push(Node {
                    f_score: cost + problem.heuristic(&next),
                    seq,
                });
                entries.push(Entry {
                    state: next,
                    parent: Some(current),
                    cost,
                });
            }

            expansions += 1;
        }

        None
    }
}

fn reconstruct_path<S: Clone>(entries: &[Entry<S>], goal: usize) -> (Vec<S>, f32) {
    let cost = entries[goal].cost;
    let mut path = vec![entries[goal].state.clone()];
    let mut current = goal;
    while let Some(prev) = entries[current].parent {
        path.push(entries[prev].state.clone());
        current = prev;
    }
    path.reverse();
    (path, cost)
}
