//! # grid_maze
//!
//! Perfect-maze generation and stepwise shortest-path search on a rectangular grid.
//!
//! Mazes are carved with a randomized
//! [depth-first backtracker](https://en.wikipedia.org/wiki/Maze_generation_algorithm#Randomized_depth-first_search)
//! driven by an injected [rand::Rng], so a seeded generator reproduces the same maze. The result
//! is a spanning tree of the grid: every cell is reachable and there is exactly one simple path
//! between any two cells. Paths are found with
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm), which reports its frontier after
//! every expansion so the search can be animated.
//!
//! Both runs advance in discrete steps and can be cancelled cooperatively through a
//! [MazeSession](run::MazeSession). Nothing here renders or sleeps on its own; a caller that
//! wants pacing wraps a run in [Paced](run::Paced).
//!
//! ```
//! use grid_maze::generator::{generate, GeneratorConfig};
//! use grid_maze::solver::{astar::AstarSolver, MazeSolver};
//! use grid_util::point::Point;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = GeneratorConfig::new(8, 6, Point::new(0, 0));
//! let generated = generate(&config, StdRng::seed_from_u64(7)).unwrap();
//! assert!(generated.maze.is_perfect());
//! let path = AstarSolver::new()
//!     .get_path(&generated.maze, config.start, generated.goal)
//!     .unwrap();
//! assert_eq!(path.last(), Some(&generated.goal));
//! ```
pub mod astar_search;
pub mod cell;
pub mod error;
pub mod generator;
pub mod grid;
pub mod maze;
pub mod run;
pub mod solver;
pub mod walker;

pub use astar_search::{
    astar_search, AstarSearch, Heuristic, Manhattan, SearchSnapshot, SearchState, Solution,
    ZeroHeuristic,
};
pub use cell::Cell;
pub use error::MazeError;
pub use generator::{generate, GeneratedMaze, Generation, GenerationStep, GeneratorConfig};
pub use grid::{neighbor, wall_to_open, Coordinates, Direction, WallSet};
pub use maze::Maze;
pub use run::{paced, CancelToken, MazeSession, Paced, RunSlot};
pub use walker::Walker;

/// Cost of crossing a wall for callers that opt into passable walls; large enough that a wall is
/// only crossed when no open route exists within that many steps.
pub const DEFAULT_BLOCKING_COST: i32 = 9999;
