//! Randomized depth-first backtracking over a fully walled grid.
//!
//! 1. Every cell starts walled and unvisited; the start is marked visited and pushed.
//! 2. While the stack is not empty, look at its top cell:
//!    - with unvisited neighbours, pick one uniformly at random, open the wall pair between the two
//!      cells, record the neighbour's depth, mark it visited and push it;
//!    - otherwise pop it.
//! 3. Once the stack is empty every cell has been visited exactly once and the open walls form a
//!    spanning tree. The goal is then the deepest cell unless one was requested.
use crate::error::MazeError;
use crate::grid::{neighbor, Coordinates, Direction};
use crate::maze::Maze;
use crate::run::CancelToken;
use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

/// Parameters of a single generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub width: i32,
    pub height: i32,
    pub start: Coordinates,
    /// Explicit goal. When [None] the cell farthest from the start becomes the goal.
    pub goal: Option<Coordinates>,
}

impl GeneratorConfig {
    pub fn new(width: i32, height: i32, start: Coordinates) -> GeneratorConfig {
        GeneratorConfig {
            width,
            height,
            start,
            goal: None,
        }
    }

    pub fn with_goal(mut self, goal: Coordinates) -> GeneratorConfig {
        self.goal = Some(goal);
        self
    }

    fn in_bounds(&self, p: Coordinates) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// Checks dimensions, then the start, then the explicit goal.
    pub fn validate(&self) -> Result<(), MazeError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(MazeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.in_bounds(self.start) {
            return Err(MazeError::InvalidStart(self.start));
        }
        match self.goal {
            Some(goal) if !self.in_bounds(goal) => Err(MazeError::InvalidGoal(goal)),
            _ => Ok(()),
        }
    }
}

/// What a single step of a [Generation] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationStep {
    /// Opened the wall pair between `from` and the newly visited `to`, which sits `depth` steps
    /// from the start.
    Carved {
        from: Coordinates,
        to: Coordinates,
        depth: u32,
    },
    /// `from` had no unvisited neighbours and was popped.
    Backtracked { from: Coordinates },
    /// Every cell is visited and the goal has been marked.
    Completed { goal: Coordinates },
}

/// Result of a finished generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedMaze {
    pub maze: Maze,
    /// The start followed by every other cell in the order it was carved.
    pub carve_order: Vec<Coordinates>,
    pub goal: Coordinates,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Carving,
    Done,
    Cancelled,
}

/// A generation run that advances one carve or backtrack per [step](Self::step). The maze
/// borrowed from [maze](Self::maze) between steps is always self-consistent.
#[derive(Clone, Debug)]
pub struct Generation<R> {
    maze: Maze,
    stack: Vec<Coordinates>,
    carve_order: Vec<Coordinates>,
    start: Coordinates,
    goal: Option<Coordinates>,
    rng: R,
    token: CancelToken,
    state: RunState,
}

impl<R: Rng> Generation<R> {
    pub fn new(config: &GeneratorConfig, rng: R) -> Result<Generation<R>, MazeError> {
        Generation::with_token(config, rng, CancelToken::detached())
    }

    /// Like [new](Self::new) but stops as soon as `token` is cancelled.
    pub fn with_token(
        config: &GeneratorConfig,
        rng: R,
        token: CancelToken,
    ) -> Result<Generation<R>, MazeError> {
        config.validate()?;
        let mut maze = Maze::walled(config.width, config.height)?;
        if let Some(cell) = maze.get_mut(config.start) {
            cell.visited = true;
        }
        Ok(Generation {
            maze,
            stack: vec![config.start],
            carve_order: vec![config.start],
            start: config.start,
            goal: config.goal,
            rng,
            token,
            state: RunState::Carving,
        })
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn carve_order(&self) -> &[Coordinates] {
        &self.carve_order
    }

    /// Current depth of the backtracking stack.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Done
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == RunState::Cancelled
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.token
    }

    /// Advances the run by one carve or backtrack. Returns [None] once the run has completed or
    /// been cancelled; a cancelled run never touches its maze again.
    pub fn step(&mut self) -> Option<GenerationStep> {
        if self.state != RunState::Carving {
            return None;
        }
        if self.token.is_cancelled() {
            debug!("Generation cancelled after {} cells", self.carve_order.len());
            self.state = RunState::Cancelled;
            return None;
        }
        let Some(&current) = self.stack.last() else {
            return Some(self.complete());
        };
        let candidates = self.unvisited_neighbours(current);
        match candidates.choose(&mut self.rng) {
            Some(&next) => {
                let depth = self.stack.len() as u32;
                self.maze.open_between(current, next);
                if let Some(cell) = self.maze.get_mut(next) {
                    cell.visited = true;
                    cell.distance_from_start = depth;
                }
                self.stack.push(next);
                self.carve_order.push(next);
                Some(GenerationStep::Carved {
                    from: current,
                    to: next,
                    depth,
                })
            }
            None => {
                self.stack.pop();
                Some(GenerationStep::Backtracked { from: current })
            }
        }
    }

    /// In-bounds, unvisited orthogonal neighbours in [Direction::ALL] order.
    fn unvisited_neighbours(&self, p: Coordinates) -> SmallVec<[Coordinates; 4]> {
        Direction::ALL
            .into_iter()
            .map(|d| neighbor(p, d))
            .filter(|n| self.maze.get(*n).is_some_and(|cell| !cell.visited))
            .collect()
    }

    fn complete(&mut self) -> GenerationStep {
        let goal = self
            .goal
            .or_else(|| self.maze.farthest_cell())
            .unwrap_or(self.start);
        if let Some(cell) = self.maze.get_mut(self.start) {
            cell.is_start = true;
        }
        if let Some(cell) = self.maze.get_mut(goal) {
            cell.is_goal = true;
            info!(
                "Goal {:?} selected at distance {} from {:?}",
                goal, cell.distance_from_start, self.start
            );
        }
        self.goal = Some(goal);
        self.state = RunState::Done;
        GenerationStep::Completed { goal }
    }

    /// Runs the remaining steps and returns the finished maze.
    pub fn finish(mut self) -> Result<GeneratedMaze, MazeError> {
        while self.step().is_some() {}
        match (self.state, self.goal) {
            (RunState::Done, Some(goal)) => Ok(GeneratedMaze {
                maze: self.maze,
                carve_order: self.carve_order,
                goal,
            }),
            _ => Err(MazeError::Cancelled),
        }
    }

    /// Turns the run into an iterator of owned `(step, maze)` pairs for renderers that keep
    /// snapshots around.
    pub fn snapshots(self) -> Snapshots<R> {
        Snapshots { generation: self }
    }
}

impl<R: Rng> Iterator for Generation<R> {
    type Item = GenerationStep;

    fn next(&mut self) -> Option<GenerationStep> {
        self.step()
    }
}

/// See [Generation::snapshots].
#[derive(Clone, Debug)]
pub struct Snapshots<R> {
    generation: Generation<R>,
}

impl<R: Rng> Snapshots<R> {
    pub fn into_inner(self) -> Generation<R> {
        self.generation
    }
}

impl<R: Rng> Iterator for Snapshots<R> {
    type Item = (GenerationStep, Maze);

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.generation.step()?;
        Some((step, self.generation.maze.clone()))
    }
}

/// Batch mode: generates a perfect maze in one call.
pub fn generate<R: Rng>(config: &GeneratorConfig, rng: R) -> Result<GeneratedMaze, MazeError> {
    Generation::new(config, rng)?.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_util::point::Point;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(width: i32, height: i32) -> GeneratorConfig {
        GeneratorConfig::new(width, height, Point::new(0, 0))
    }

    #[test]
    fn validation_order() {
        let rng = StdRng::seed_from_u64(0);
        assert_eq!(
            generate(&GeneratorConfig::new(0, 0, Point::new(9, 9)), rng.clone()),
            Err(MazeError::InvalidDimensions { width: 0, height: 0 })
        );
        assert_eq!(
            generate(&GeneratorConfig::new(3, 3, Point::new(3, 0)), rng.clone()),
            Err(MazeError::InvalidStart(Point::new(3, 0)))
        );
        assert_eq!(
            generate(&config(3, 3).with_goal(Point::new(0, -1)), rng),
            Err(MazeError::InvalidGoal(Point::new(0, -1)))
        );
    }

    #[test]
    fn single_cell_maze() {
        let generated = generate(&config(1, 1), StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(generated.goal, Point::new(0, 0));
        assert_eq!(generated.carve_order, vec![Point::new(0, 0)]);
        let cell = generated.maze.get(Point::new(0, 0)).unwrap();
        assert!(cell.is_start && cell.is_goal && cell.visited);
        assert_eq!(cell.walls.len(), 4);
    }

    /// A corridor leaves the generator no choice, so depths and the goal are fixed.
    #[test]
    fn corridor_depths() {
        let generated = generate(&config(4, 1), StdRng::seed_from_u64(2)).unwrap();
        let depths: Vec<u32> = generated
            .maze
            .cells()
            .map(|c| c.distance_from_start)
            .collect();
        assert_eq!(depths, vec![0, 1, 2, 3]);
        assert_eq!(generated.goal, Point::new(3, 0));
        assert_eq!(generated.maze.goal(), Some(Point::new(3, 0)));
        assert_eq!(generated.maze.start(), Some(Point::new(0, 0)));
    }

    #[test]
    fn explicit_goal_is_kept() {
        let goal = Point::new(1, 1);
        let generated =
            generate(&config(5, 5).with_goal(goal), StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(generated.goal, goal);
        assert_eq!(generated.maze.goal(), Some(goal));
        assert_eq!(generated.maze.cells().filter(|c| c.is_goal).count(), 1);
    }

    #[test]
    fn stepwise_matches_batch() {
        let cfg = config(6, 4);
        let batch = generate(&cfg, StdRng::seed_from_u64(9)).unwrap();
        let mut generation = Generation::new(&cfg, StdRng::seed_from_u64(9)).unwrap();
        let mut carves = 0;
        let mut completed = None;
        for step in generation.by_ref() {
            match step {
                GenerationStep::Carved { .. } => carves += 1,
                GenerationStep::Completed { goal } => completed = Some(goal),
                GenerationStep::Backtracked { .. } => {}
            }
        }
        assert_eq!(carves, 23);
        assert_eq!(completed, Some(batch.goal));
        assert!(generation.is_finished());
        assert_eq!(generation.maze(), &batch.maze);
    }

    #[test]
    fn snapshots_are_consistent() {
        let generation = Generation::new(&config(5, 5), StdRng::seed_from_u64(4)).unwrap();
        let mut carved = 0;
        for (step, maze) in generation.snapshots() {
            assert!(maze.walls_consistent());
            if let GenerationStep::Carved { .. } = step {
                carved += 1;
            }
            assert_eq!(maze.open_wall_pairs(), carved);
        }
        assert_eq!(carved, 24);
    }

    #[test]
    fn cancelled_run_stops_mutating() {
        let mut generation = Generation::new(&config(6, 6), StdRng::seed_from_u64(5)).unwrap();
        for _ in 0..5 {
            generation.step();
        }
        generation.cancel_token().cancel();
        let frozen = generation.maze().clone();
        assert_eq!(generation.step(), None);
        assert!(generation.is_cancelled());
        assert_eq!(generation.maze(), &frozen);
        assert_eq!(generation.finish(), Err(MazeError::Cancelled));
    }
}
