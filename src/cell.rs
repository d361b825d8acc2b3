use crate::grid::{neighbor, Coordinates, Direction, WallSet};
use smallvec::SmallVec;

/// A single maze cell together with the flags a renderer needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub coordinates: Coordinates,
    pub walls: WallSet,
    pub visited: bool,
    pub is_start: bool,
    pub is_goal: bool,
    pub is_being_evaluated: bool,
    /// Depth of the cell in the carve tree; zero for the start cell.
    pub distance_from_start: u32,
}

impl Cell {
    /// A fully walled, unvisited cell.
    pub fn new(coordinates: Coordinates) -> Cell {
        Cell {
            coordinates,
            walls: WallSet::all(),
            visited: false,
            is_start: false,
            is_goal: false,
            is_being_evaluated: false,
            distance_from_start: 0,
        }
    }

    /// Builds a cell with the given walls, mostly useful for hand-made mazes.
    pub fn with_walls<I: IntoIterator<Item = Direction>>(
        coordinates: Coordinates,
        walls: I,
    ) -> Cell {
        Cell {
            walls: walls.into_iter().collect(),
            ..Cell::new(coordinates)
        }
    }

    pub fn is_blocked(&self, direction: Direction) -> bool {
        self.walls.contains(direction)
    }

    /// Every direction without a wall, in [Direction::ALL] order.
    pub fn possible_directions(&self) -> SmallVec<[Direction; 4]> {
        self.walls.complement().iter().collect()
    }

    /// Where a move in `direction` ends up: the neighbor if the way is open,
    /// otherwise this cell.
    pub fn step(&self, direction: Direction) -> Coordinates {
        if self.is_blocked(direction) {
            self.coordinates
        } else {
            neighbor(self.coordinates, direction)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_util::point::Point;
    use Direction::*;

    fn cell(walls: &[Direction]) -> Cell {
        Cell::with_walls(Point::new(1, 1), walls.iter().copied())
    }

    #[test]
    fn no_walls_allows_every_direction() {
        assert_eq!(cell(&[]).possible_directions().as_slice(), &Direction::ALL);
    }

    #[test]
    fn one_wall() {
        assert_eq!(
            cell(&[East]).possible_directions().as_slice(),
            &[North, South, West]
        );
    }

    #[test]
    fn two_walls() {
        assert_eq!(
            cell(&[North, West]).possible_directions().as_slice(),
            &[East, South]
        );
    }

    #[test]
    fn three_walls() {
        assert_eq!(
            cell(&[North, East, West]).possible_directions().as_slice(),
            &[South]
        );
    }

    #[test]
    fn all_walls_allows_nothing() {
        assert!(cell(&Direction::ALL).possible_directions().is_empty());
        assert!(Cell::new(Point::new(0, 0)).possible_directions().is_empty());
    }

    #[test]
    fn step_stays_put_when_walled() {
        let c = cell(&[North, East]);
        assert_eq!(c.step(North), Point::new(1, 1));
        assert_eq!(c.step(South), Point::new(1, 2));
        assert_eq!(c.step(West), Point::new(0, 1));
    }
}
