use crate::astar_search::{astar_search, clamp_blocking_cost, AstarSearch, Heuristic};
use crate::error::MazeError;
use crate::grid::{wall_to_open, Coordinates};
use crate::maze::Maze;

pub mod astar;
pub mod dijkstra;

/// A shortest-path strategy over a [Maze]. Implementors pick the heuristic and how walls are
/// treated; the search itself is shared.
pub trait MazeSolver {
    fn heuristic(&self, maze: &Maze, p1: &Coordinates, p2: &Coordinates) -> i32;

    /// Cost of crossing a wall, [None] when walls are impassable. Costs below one are treated as
    /// one.
    fn blocking_cost(&self) -> Option<i32> {
        None
    }

    /// A stepwise search from `start` to `goal`, for callers that want to watch the frontier.
    fn search<'a>(
        &'a self,
        maze: &'a Maze,
        start: Coordinates,
        goal: Coordinates,
    ) -> Result<AstarSearch<'a, SolverHeuristic<'a, Self>>, MazeError>
    where
        Self: Sized,
    {
        let heuristic = SolverHeuristic {
            solver: self,
            maze,
            goal,
        };
        let search = astar_search(maze, start, goal, heuristic)?;
        Ok(match self.blocking_cost() {
            Some(cost) => search.with_blocking_cost(cost),
            None => search,
        })
    }

    fn get_path(
        &self,
        maze: &Maze,
        start: Coordinates,
        goal: Coordinates,
    ) -> Result<Vec<Coordinates>, MazeError>
    where
        Self: Sized,
    {
        self.search(maze, start, goal)?.solve().map(|s| s.path)
    }

    /// Sums the step costs along `path`, saturating like the search does. Returns [None] if a step
    /// is not between adjacent cells or crosses a wall this solver cannot cross.
    fn get_path_cost(&self, maze: &Maze, path: &[Coordinates]) -> Option<i32> {
        path.windows(2).try_fold(0i32, |total, pair| {
            let (from, to) = (pair[0], pair[1]);
            if from.manhattan_distance(&to) != 1 || !maze.in_bounds(from) || !maze.in_bounds(to) {
                return None;
            }
            let direction = wall_to_open(from, to)?;
            let step = if maze.passage(from, direction).is_some() {
                1
            } else {
                clamp_blocking_cost(self.blocking_cost()?)
            };
            Some(total.saturating_add(step))
        })
    }
}

/// Adapts a [MazeSolver]'s heuristic towards a fixed goal to the [Heuristic] the search expects.
pub struct SolverHeuristic<'a, S> {
    solver: &'a S,
    maze: &'a Maze,
    goal: Coordinates,
}

impl<S: MazeSolver> Heuristic for SolverHeuristic<'_, S> {
    fn estimate(&self, from: &Coordinates) -> i32 {
        self.solver.heuristic(self.maze, from, &self.goal)
    }
}
