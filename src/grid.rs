//! Coordinate arithmetic and the four-way direction table the maze is built on.
//!
//! The y axis grows downward, so [Direction::North] has offset `(0, -1)`.
use core::fmt;
use grid_util::point::Point;

/// A position on the grid, compared and hashed by value. Carries no bounds; the
/// [Maze](crate::maze::Maze) decides which coordinates exist.
pub type Coordinates = Point;

/// One of the four orthogonal directions. The declaration order is the
/// enumeration order used everywhere iteration has to be deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset of a single step in this direction.
    pub fn offset(self) -> Coordinates {
        let (dx, dy) = self.delta();
        Point::new(dx, dy)
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// The direction pointing back at the cell this one points to.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// The coordinate one step away from `coordinates` in `direction`.
pub fn neighbor(coordinates: Coordinates, direction: Direction) -> Coordinates {
    let (dx, dy) = direction.delta();
    Point::new(coordinates.x + dx, coordinates.y + dy)
}

/// The wall on `from` that has to be cleared to connect it to `to`.
///
/// Only meaningful for orthogonally adjacent pairs. The x comparison is made
/// first, so a non-adjacent pair still gets a deterministic answer (East/West
/// whenever the columns differ). Returns [None] only when `from == to`.
pub fn wall_to_open(from: Coordinates, to: Coordinates) -> Option<Direction> {
    if from.x < to.x {
        Some(Direction::East)
    } else if from.x > to.x {
        Some(Direction::West)
    } else if from.y < to.y {
        Some(Direction::South)
    } else if from.y > to.y {
        Some(Direction::North)
    } else {
        None
    }
}

/// Set of walled directions of a cell, packed into the low four bits of a [u8]
/// indexed by [Direction] discriminant.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WallSet(u8);

impl WallSet {
    pub const fn empty() -> WallSet {
        WallSet(0)
    }
    pub const fn all() -> WallSet {
        WallSet(0b1111)
    }
    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }
    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.bit();
    }
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    /// Walled directions in [Direction::ALL] order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.contains(*d))
    }
    /// The directions not in this set, in [Direction::ALL] order.
    pub fn complement(&self) -> WallSet {
        WallSet(!self.0 & 0b1111)
    }
}

impl FromIterator<Direction> for WallSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut walls = WallSet::empty();
        for direction in iter {
            walls.insert(direction);
        }
        walls
    }
}

impl fmt::Debug for WallSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_match_neighbors() {
        let origin = Point::new(3, 3);
        for direction in Direction::ALL {
            let n = neighbor(origin, direction);
            let offset = direction.offset();
            assert_eq!(n, Point::new(origin.x + offset.x, origin.y + offset.y));
            assert_eq!(neighbor(n, direction.opposite()), origin);
        }
        assert_eq!(neighbor(origin, Direction::North), Point::new(3, 2));
        assert_eq!(neighbor(origin, Direction::East), Point::new(4, 3));
    }

    #[test]
    fn wall_to_open_adjacent() {
        let p = Point::new(1, 1);
        for direction in Direction::ALL {
            let n = neighbor(p, direction);
            assert_eq!(wall_to_open(p, n), Some(direction));
            assert_eq!(wall_to_open(n, p), Some(direction.opposite()));
        }
        assert_eq!(wall_to_open(p, p), None);
    }

    /// Columns decide first, even when the rows differ as well.
    #[test]
    fn wall_to_open_non_adjacent_is_x_first() {
        let p = Point::new(0, 0);
        assert_eq!(wall_to_open(p, Point::new(2, 5)), Some(Direction::East));
        assert_eq!(wall_to_open(p, Point::new(-1, -7)), Some(Direction::West));
        assert_eq!(wall_to_open(p, Point::new(0, 4)), Some(Direction::South));
    }

    #[test]
    fn wall_set_basics() {
        let mut walls = WallSet::all();
        assert_eq!(walls.len(), 4);
        walls.remove(Direction::East);
        assert!(!walls.contains(Direction::East));
        assert_eq!(
            walls.iter().collect::<Vec<_>>(),
            vec![Direction::North, Direction::South, Direction::West]
        );
        assert_eq!(walls.complement().iter().collect::<Vec<_>>(), vec![Direction::East]);
        assert!(WallSet::empty().is_empty());
        assert_eq!(WallSet::empty().complement(), WallSet::all());
    }
}
