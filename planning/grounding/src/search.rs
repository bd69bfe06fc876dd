//! Uninformed forward search in the state space of a ground problem.

use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use hashbrown::HashSet;

use crate::config::{Config, SearchStrategy};
use crate::ground::{GroundProblem, State};
use crate::plan::Plan;

/// Outcome of a search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchResult {
    /// A plan leading from the initial state to a goal state.
    Solved(Plan),
    /// The reachable state space was exhausted without reaching the goal.
    Unsolvable,
    /// The expansion or time limit was reached before a conclusion.
    LimitReached,
}

impl SearchResult {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SearchResult::Solved(plan) => Some(plan),
            _ => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SearchResult::Solved(_))
    }
}

/// A node in the search space.
struct Node {
    state: State,
    parent: Option<Rc<Node>>,
    /// Index of the action leading from the parent to this node.
    action: Option<usize>,
    /// Number of actions from the initial state.
    depth: usize,
}

impl Node {
    /// Indices of the actions leading from the root to this node.
    fn extract_plan(&self) -> Vec<usize> {
        let mut steps = Vec::with_capacity(self.depth);
        let mut curr = self;
        loop {
            if let Some(a) = curr.action {
                steps.push(a);
            }
            match &curr.parent {
                Some(parent) => curr = parent,
                None => break,
            }
        }
        debug_assert_eq!(steps.len(), self.depth);
        steps.reverse();
        steps
    }
}

/// Forward search from the initial state, with a closed list of the states already generated.
///
/// With [`SearchStrategy::BreadthFirst`], the returned plans have a minimal number of actions.
pub struct ForwardSearch {
    pub strategy: SearchStrategy,
    pub max_expansions: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl ForwardSearch {
    pub fn new(config: &Config) -> Self {
        ForwardSearch {
            strategy: config.search,
            max_expansions: config.max_expansions,
            time_limit: config.time_limit,
        }
    }

    pub fn search(&self, problem: &GroundProblem) -> SearchResult {
        let _span = tracing::span!(tracing::Level::DEBUG, "SEARCH", strategy = %self.strategy).entered();
        let start = Instant::now();
        let root = Node {
            state: problem.initial_state().clone(),
            parent: None,
            action: None,
            depth: 0,
        };
        if problem.is_goal(&root.state) {
            tracing::debug!("initial state satisfies the goal");
            return SearchResult::Solved(Plan::default());
        }

        let mut closed: HashSet<State> = HashSet::new();
        closed.insert(root.state.clone());
        let mut open: VecDeque<Rc<Node>> = VecDeque::new();
        open.push_back(Rc::new(root));
        let mut expansions = 0usize;

        while let Some(node) = self.next(&mut open) {
            if self.max_expansions.is_some_and(|max| expansions >= max) {
                tracing::debug!(expansions, "expansion limit reached");
                return SearchResult::LimitReached;
            }
            if self.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                tracing::debug!(expansions, "time limit reached");
                return SearchResult::LimitReached;
            }
            expansions += 1;

            for (i, action) in problem.applicable(&node.state) {
                let state = problem.successor(&node.state, action);
                if !closed.insert(state.clone()) {
                    continue;
                }
                let child = Node {
                    state,
                    parent: Some(node.clone()),
                    action: Some(i),
                    depth: node.depth + 1,
                };
                if problem.is_goal(&child.state) {
                    tracing::debug!(expansions, generated = closed.len(), length = child.depth, "found plan");
                    let plan = child
                        .extract_plan()
                        .into_iter()
                        .map(|a| problem.actions[a].clone())
                        .collect();
                    return SearchResult::Solved(plan);
                }
                open.push_back(Rc::new(child));
            }
        }
        tracing::debug!(expansions, generated = closed.len(), "search space exhausted");
        SearchResult::Unsolvable
    }

    fn next(&self, open: &mut VecDeque<Rc<Node>>) -> Option<Rc<Node>> {
        match self.strategy {
            SearchStrategy::BreadthFirst => open.pop_front(),
            SearchStrategy::DepthFirst => open.pop_back(),
        }
    }
}
