use crate::grid::Coordinates;
use crate::maze::Maze;
use crate::solver::MazeSolver;

/// A* guided by the Manhattan distance to the goal.
#[derive(Clone, Debug, Default)]
pub struct AstarSolver {
    /// When set, walls may be crossed at this cost instead of being impassable.
    pub blocking_cost: Option<i32>,
}

impl AstarSolver {
    pub fn new() -> AstarSolver {
        AstarSolver {
            blocking_cost: None,
        }
    }
}

impl MazeSolver for AstarSolver {
    fn heuristic(&self, _: &Maze, p1: &Coordinates, p2: &Coordinates) -> i32 {
        p1.manhattan_distance(p2)
    }

    fn blocking_cost(&self) -> Option<i32> {
        self.blocking_cost
    }
}
