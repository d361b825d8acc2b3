//! This module implements a stepwise variant of
//! [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
//! over the open walls of a [Maze]. Every expansion is returned as a [SearchSnapshot] so the
//! frontier can be drawn while the search runs.
use crate::error::MazeError;
use crate::grid::{neighbor, Coordinates, Direction};
use crate::maze::Maze;
use crate::run::CancelToken;
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::iter;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Estimate of the remaining cost from a coordinate to the goal. To keep the returned path optimal
/// the estimate must never exceed the true remaining number of steps.
pub trait Heuristic {
    fn estimate(&self, from: &Coordinates) -> i32;
}

impl<F> Heuristic for F
where
    F: Fn(&Coordinates) -> i32,
{
    fn estimate(&self, from: &Coordinates) -> i32 {
        self(from)
    }
}

/// Manhattan distance to a fixed goal; admissible under unit-cost 4-connected movement.
#[derive(Clone, Copy, Debug)]
pub struct Manhattan {
    pub goal: Coordinates,
}

impl Heuristic for Manhattan {
    fn estimate(&self, from: &Coordinates) -> i32 {
        from.manhattan_distance(&self.goal)
    }
}

/// Always zero, which turns the search into Dijkstra's algorithm.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _: &Coordinates) -> i32 {
        0
    }
}

struct SmallestCostHolder<K> {
    estimated_cost: K,
    cost: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost)
            && self.cost.eq(&other.cost)
            && self.index == other.index
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // First orders per estimated cost, then favours the node with the larger cost (deeper in
        // the search), then the node discovered first. None of this changes the returned cost.
        other
            .estimated_cost
            .cmp(&self.estimated_cost)
            .then_with(|| self.cost.cmp(&other.cost))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Per-coordinate search record. A coordinate without a record is undiscovered.
#[derive(Clone, Copy, Debug)]
struct Node {
    parent: usize,
    cost: i32,
    open: bool,
}

/// Smallest cost a wall crossing may have.
pub(crate) fn clamp_blocking_cost(cost: i32) -> i32 {
    cost.max(1)
}

fn reverse_path(parents: &FxIndexMap<Coordinates, Node>, start: usize) -> Vec<Coordinates> {
    let mut path: Vec<Coordinates> = iter::successors(parents.get_index(start), |&(_, node)| {
        parents.get_index(node.parent)
    })
    .map(|(point, _)| *point)
    .collect();
    path.reverse();
    path
}

/// The node a single expansion popped.
#[derive(Clone, Copy, Debug)]
struct Expansion {
    index: usize,
    current: Coordinates,
    cost: i32,
}

/// What the search looked like after one expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSnapshot {
    /// The coordinate expanded (or, on the final snapshot, the goal).
    pub current: Coordinates,
    /// Discovered but unexpanded coordinates in row-major order.
    pub frontier: Vec<Coordinates>,
    /// Empty until the goal is reached, then the full path from start to goal.
    pub path: Vec<Coordinates>,
    /// Cost from the start to `current`.
    pub cost: i32,
}

impl SearchSnapshot {
    pub fn is_complete(&self) -> bool {
        !self.path.is_empty()
    }
}

/// A shortest path and its cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub path: Vec<Coordinates>,
    pub cost: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchState {
    Running,
    Found,
    Exhausted,
    Cancelled,
}

/// A running A* search. Iterating yields one snapshot per expansion, the last carrying the path;
/// if the frontier runs dry a single `Err(NoPathFound)` is yielded instead. The maze is only
/// read, all search state lives here and is dropped with the search.
pub struct AstarSearch<'m, H> {
    maze: &'m Maze,
    start: Coordinates,
    goal: Coordinates,
    heuristic: H,
    blocking_cost: Option<i32>,
    token: CancelToken,
    to_see: BinaryHeap<SmallestCostHolder<i32>>,
    parents: FxIndexMap<Coordinates, Node>,
    found: Option<usize>,
    state: SearchState,
}

/// Prepares a search from `start` to `goal`. Both have to lie inside the maze.
pub fn astar_search<H: Heuristic>(
    maze: &Maze,
    start: Coordinates,
    goal: Coordinates,
    heuristic: H,
) -> Result<AstarSearch<'_, H>, MazeError> {
    if !maze.in_bounds(start) {
        return Err(MazeError::InvalidStart(start));
    }
    if !maze.in_bounds(goal) {
        return Err(MazeError::InvalidGoal(goal));
    }
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        estimated_cost: heuristic.estimate(&start),
        cost: 0,
        index: 0,
    });
    let mut parents: FxIndexMap<Coordinates, Node> = FxIndexMap::default();
    parents.insert(
        start,
        Node {
            parent: usize::MAX,
            cost: 0,
            open: true,
        },
    );
    Ok(AstarSearch {
        maze,
        start,
        goal,
        heuristic,
        blocking_cost: None,
        token: CancelToken::detached(),
        to_see,
        parents,
        found: None,
        state: SearchState::Running,
    })
}

impl<'m, H: Heuristic> AstarSearch<'m, H> {
    /// Lets the search cross walls at the given cost instead of treating them as impassable.
    /// Costs below one are raised to one so a wall is never cheaper than an open step. Moves never
    /// leave the grid either way.
    pub fn with_blocking_cost(mut self, cost: i32) -> Self {
        self.blocking_cost = Some(clamp_blocking_cost(cost));
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn maze(&self) -> &'m Maze {
        self.maze
    }

    /// Discovered but unexpanded coordinates in row-major order.
    pub fn frontier(&self) -> Vec<Coordinates> {
        self.parents
            .iter()
            .filter(|(_, node)| node.open)
            .map(|(point, _)| *point)
            .sorted_by_key(|p| (p.y, p.x))
            .collect()
    }

    /// Best known cost from the start, [None] while `p` is undiscovered.
    pub fn cost_to(&self, p: &Coordinates) -> Option<i32> {
        self.parents.get(p).map(|node| node.cost)
    }

    /// The found path, once the goal has been reached.
    pub fn solution(&self) -> Option<Solution> {
        let index = self.found?;
        let (_, node) = self.parents.get_index(index)?;
        Some(Solution {
            path: reverse_path(&self.parents, index),
            cost: node.cost,
        })
    }

    fn transition(&self, from: Coordinates, direction: Direction) -> Option<(Coordinates, i32)> {
        let cell = self.maze.get(from)?;
        let to = neighbor(from, direction);
        if !self.maze.in_bounds(to) {
            return None;
        }
        if cell.is_blocked(direction) {
            self.blocking_cost.map(|cost| (to, cost))
        } else {
            Some((to, 1))
        }
    }

    /// Pops the cheapest open node, skipping heap entries made stale by a later improvement.
    fn pop_open(&mut self) -> Option<usize> {
        while let Some(SmallestCostHolder { cost, index, .. }) = self.to_see.pop() {
            if let Some((_, node)) = self.parents.get_index(index) {
                if node.open && node.cost == cost {
                    return Some(index);
                }
            }
        }
        None
    }

    /// Expands the next frontier node without building a snapshot. Returns [None] once the search
    /// has finished or was cancelled.
    fn expand(&mut self) -> Option<Result<Expansion, MazeError>> {
        if self.state != SearchState::Running {
            return None;
        }
        if self.token.is_cancelled() {
            debug!("Search from {:?} to {:?} cancelled", self.start, self.goal);
            self.state = SearchState::Cancelled;
            return None;
        }
        let Some(index) = self.pop_open() else {
            warn!(
                "Frontier exhausted before reaching {:?} from {:?}",
                self.goal, self.start
            );
            self.state = SearchState::Exhausted;
            return Some(Err(MazeError::NoPathFound {
                start: self.start,
                goal: self.goal,
            }));
        };
        let (&current, &node) = self.parents.get_index(index)?;
        if current == self.goal {
            info!(
                "Reached {:?} from {:?} at cost {} after discovering {} cells",
                self.goal,
                self.start,
                node.cost,
                self.parents.len()
            );
            self.state = SearchState::Found;
            self.found = Some(index);
            return Some(Ok(Expansion {
                index,
                current,
                cost: node.cost,
            }));
        }
        if let Some(record) = self.parents.get_index_mut(index) {
            record.1.open = false;
        }
        for direction in Direction::ALL {
            let Some((successor, move_cost)) = self.transition(current, direction) else {
                continue;
            };
            let new_cost = node.cost.saturating_add(move_cost);
            let n = match self.parents.entry(successor) {
                Vacant(e) => {
                    let n = e.index();
                    e.insert(Node {
                        parent: index,
                        cost: new_cost,
                        open: true,
                    });
                    n
                }
                Occupied(mut e) => {
                    if e.get().cost > new_cost {
                        let n = e.index();
                        e.insert(Node {
                            parent: index,
                            cost: new_cost,
                            open: true,
                        });
                        n
                    } else {
                        continue;
                    }
                }
            };
            let h = self.heuristic.estimate(&successor);
            self.to_see.push(SmallestCostHolder {
                estimated_cost: new_cost.saturating_add(h),
                cost: new_cost,
                index: n,
            });
        }
        Some(Ok(Expansion {
            index,
            current,
            cost: node.cost,
        }))
    }

    /// Expands the next frontier node and reports what the search looks like afterwards. Returns
    /// [None] once the search has finished or was cancelled.
    pub fn step(&mut self) -> Option<Result<SearchSnapshot, MazeError>> {
        let expansion = match self.expand()? {
            Ok(expansion) => expansion,
            Err(e) => return Some(Err(e)),
        };
        let path = if self.found == Some(expansion.index) {
            reverse_path(&self.parents, expansion.index)
        } else {
            Vec::new()
        };
        Some(Ok(SearchSnapshot {
            current: expansion.current,
            frontier: self.frontier(),
            path,
            cost: expansion.cost,
        }))
    }

    /// Runs the search to the end. No snapshots are built on the way.
    pub fn solve(mut self) -> Result<Solution, MazeError> {
        while let Some(expansion) = self.expand() {
            expansion?;
        }
        match self.state {
            SearchState::Found => self.solution().ok_or(MazeError::NoPathFound {
                start: self.start,
                goal: self.goal,
            }),
            SearchState::Exhausted | SearchState::Running => Err(MazeError::NoPathFound {
                start: self.start,
                goal: self.goal,
            }),
            SearchState::Cancelled => Err(MazeError::Cancelled),
        }
    }
}

impl<H: Heuristic> Iterator for AstarSearch<'_, H> {
    type Item = Result<SearchSnapshot, MazeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}
