use crate::error::MazeError;
use crate::grid::{Coordinates, Direction};
use crate::maze::Maze;

/// Manual traversal of a maze driven by direction events. Walking into a wall is a no-op.
#[derive(Clone, Debug)]
pub struct Walker<'m> {
    maze: &'m Maze,
    position: Coordinates,
    moves: usize,
}

impl<'m> Walker<'m> {
    pub fn new(maze: &'m Maze, start: Coordinates) -> Result<Walker<'m>, MazeError> {
        if !maze.in_bounds(start) {
            return Err(MazeError::InvalidStart(start));
        }
        Ok(Walker {
            maze,
            position: start,
            moves: 0,
        })
    }

    pub fn position(&self) -> Coordinates {
        self.position
    }

    /// Number of events that actually moved the walker.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Applies one direction event. Returns whether the walker moved.
    pub fn apply(&mut self, direction: Direction) -> bool {
        let next = self.maze.move_from(self.position, direction);
        if next == self.position {
            return false;
        }
        self.position = next;
        self.moves += 1;
        true
    }

    /// Applies events in order and returns how many of them moved the walker.
    pub fn apply_all<I: IntoIterator<Item = Direction>>(&mut self, events: I) -> usize {
        events.into_iter().filter(|d| self.apply(*d)).count()
    }

    pub fn is_at_goal(&self) -> bool {
        self.maze.get(self.position).is_some_and(|cell| cell.is_goal)
    }
}
