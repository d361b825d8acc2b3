use grid_maze::{generate, solver::astar::AstarSolver, solver::MazeSolver, GeneratorConfig};
use grid_util::point::Point;
use rand::{rngs::StdRng, SeedableRng};

// In this example an 8x6 maze is carved from the top-left corner with a seeded random source,
// then solved from the start to the automatically selected goal with A*:
//  - S marks the start
//  - G marks the goal, the cell farthest from the start
//  - * marks the cells on the solution
//
// The same seed always prints the same maze.

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(7);
    let config = GeneratorConfig::new(8, 6, Point::new(0, 0));
    let generated = generate(&config, StdRng::seed_from_u64(seed)).unwrap();
    println!("{}", generated.maze);

    let solver = AstarSolver::new();
    let path = solver
        .get_path(&generated.maze, config.start, generated.goal)
        .unwrap();
    let shown = generated.maze.with_evaluating(&path);
    println!("{}", shown);
    println!("Path:");
    for p in path {
        println!("{:?}", p);
    }
}
