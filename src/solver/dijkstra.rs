use crate::grid::Coordinates;
use crate::maze::Maze;
use crate::solver::MazeSolver;

/// Uninformed search: every coordinate is estimated at zero remaining cost.
#[derive(Clone, Debug, Default)]
pub struct DijkstraSolver;

impl MazeSolver for DijkstraSolver {
    fn heuristic(&self, _: &Maze, _: &Coordinates, _: &Coordinates) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::astar::AstarSolver;
    use crate::generator::{generate, GeneratorConfig};
    use grid_util::point::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Dijkstra expands at least as many nodes as A* for the same answer.
    #[test]
    fn agrees_with_astar() {
        let config = GeneratorConfig::new(10, 10, Point::new(0, 0));
        let generated = generate(&config, StdRng::seed_from_u64(21)).unwrap();
        let goal = generated.goal;
        let astar = AstarSolver::new();
        let dijkstra = DijkstraSolver;
        let astar_steps = astar.search(&generated.maze, config.start, goal).unwrap().count();
        let dijkstra_steps = dijkstra
            .search(&generated.maze, config.start, goal)
            .unwrap()
            .count();
        assert!(dijkstra_steps >= astar_steps);
        assert_eq!(
            astar.get_path(&generated.maze, config.start, goal),
            dijkstra.get_path(&generated.maze, config.start, goal)
        );
    }
}
