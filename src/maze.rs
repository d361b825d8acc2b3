use crate::cell::Cell;
use crate::error::MazeError;
use crate::grid::{neighbor, wall_to_open, Coordinates, Direction};
use core::fmt;
use fxhash::{FxBuildHasher, FxHashSet};
use grid_util::point::Point;
use indexmap::IndexMap;
use itertools::iproduct;
use petgraph::unionfind::UnionFind;
use std::cmp::Reverse;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// [Maze] maps every coordinate of a fixed `width`×`height` rectangle to its [Cell]. Cells are
/// stored in row-major order (y, then x), which is also the order of every iteration over them.
///
/// Wall pairs are only ever changed together: opening [Direction::East] on one cell opens
/// [Direction::West] on its neighbour within the same call, so a clone taken between calls is
/// always self-consistent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: FxIndexMap<Coordinates, Cell>,
}

impl Maze {
    /// A maze where every cell is fully walled and unvisited.
    pub fn walled(width: i32, height: i32) -> Result<Maze, MazeError> {
        if width <= 0 || height <= 0 {
            return Err(MazeError::InvalidDimensions { width, height });
        }
        let cells = iproduct!(0..height, 0..width)
            .map(|(y, x)| {
                let coordinates = Point::new(x, y);
                (coordinates, Cell::new(coordinates))
            })
            .collect();
        Ok(Maze {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }
    pub fn height(&self) -> i32 {
        self.height
    }
    /// Number of cells, always `width * height`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, coordinates: Coordinates) -> bool {
        coordinates.x >= 0
            && coordinates.y >= 0
            && coordinates.x < self.width
            && coordinates.y < self.height
    }

    /// Row-major index of an in-bounds coordinate.
    pub(crate) fn get_ix_point(&self, coordinates: &Coordinates) -> usize {
        (coordinates.y * self.width + coordinates.x) as usize
    }

    pub fn get(&self, coordinates: Coordinates) -> Option<&Cell> {
        self.cells.get(&coordinates)
    }

    pub(crate) fn get_mut(&mut self, coordinates: Coordinates) -> Option<&mut Cell> {
        self.cells.get_mut(&coordinates)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinates> + '_ {
        self.cells.keys().copied()
    }

    /// The coordinate reached from `from` through an open wall in `direction`, if any.
    pub fn passage(&self, from: Coordinates, direction: Direction) -> Option<Coordinates> {
        let cell = self.get(from)?;
        if cell.is_blocked(direction) {
            return None;
        }
        let to = neighbor(from, direction);
        self.in_bounds(to).then_some(to)
    }

    /// Where a move from `from` in `direction` ends up; a walled move leaves the position unchanged.
    pub fn move_from(&self, from: Coordinates, direction: Direction) -> Coordinates {
        match self.get(from).map(|cell| cell.step(direction)) {
            Some(to) if self.in_bounds(to) => to,
            _ => from,
        }
    }

    /// Opens the wall in `direction` on `from` together with its mirror on the neighbour. Returns
    /// the neighbour. Fails without touching the maze if either cell is outside the grid.
    pub fn open_passage(
        &mut self,
        from: Coordinates,
        direction: Direction,
    ) -> Result<Coordinates, MazeError> {
        self.set_wall_pair(from, direction, false)
    }

    /// Closes the wall in `direction` on `from` together with its mirror on the neighbour.
    pub fn close_passage(
        &mut self,
        from: Coordinates,
        direction: Direction,
    ) -> Result<Coordinates, MazeError> {
        self.set_wall_pair(from, direction, true)
    }

    /// Opens the wall pair between two grid-adjacent cells. Cells missing from the grid are
    /// skipped, so callers check bounds first.
    pub(crate) fn open_between(&mut self, from: Coordinates, to: Coordinates) {
        if let Some(direction) = wall_to_open(from, to) {
            self.apply_wall_pair(from, direction, false);
        }
    }

    fn set_wall_pair(
        &mut self,
        from: Coordinates,
        direction: Direction,
        walled: bool,
    ) -> Result<Coordinates, MazeError> {
        let to = neighbor(from, direction);
        for coordinates in [from, to] {
            if !self.in_bounds(coordinates) {
                return Err(MazeError::OutOfBounds(coordinates));
            }
        }
        Ok(self.apply_wall_pair(from, direction, walled))
    }

    fn apply_wall_pair(
        &mut self,
        from: Coordinates,
        direction: Direction,
        walled: bool,
    ) -> Coordinates {
        let to = neighbor(from, direction);
        for (coordinates, side) in [(from, direction), (to, direction.opposite())] {
            if let Some(cell) = self.cells.get_mut(&coordinates) {
                if walled {
                    cell.walls.insert(side);
                } else {
                    cell.walls.remove(side);
                }
            }
        }
        to
    }

    /// Number of open wall pairs, each pair counted once.
    pub fn open_wall_pairs(&self) -> usize {
        self.coordinates()
            .map(|p| {
                [Direction::East, Direction::South]
                    .into_iter()
                    .filter(|d| self.passage(p, *d).is_some())
                    .count()
            })
            .sum()
    }

    /// Generates a new [UnionFind] structure in which cells joined by an open wall pair share a
    /// component. Indices are row-major.
    pub fn components(&self) -> UnionFind<usize> {
        let mut components = UnionFind::new(self.len());
        for p in self.coordinates() {
            let parent_ix = self.get_ix_point(&p);
            for direction in [Direction::East, Direction::South] {
                if let Some(n) = self.passage(p, direction) {
                    components.union(parent_ix, self.get_ix_point(&n));
                }
            }
        }
        components
    }

    /// Checks whether every cell can reach every other cell.
    pub fn is_connected(&self) -> bool {
        let components = self.components();
        (1..self.len()).all(|ix| components.equiv(0, ix))
    }

    /// Checks whether every wall is mirrored by its neighbour and the outer border is closed.
    pub fn walls_consistent(&self) -> bool {
        self.cells().all(|cell| {
            Direction::ALL.into_iter().all(|direction| {
                let n = neighbor(cell.coordinates, direction);
                match self.get(n) {
                    Some(other) => cell.is_blocked(direction) == other.is_blocked(direction.opposite()),
                    None => cell.is_blocked(direction),
                }
            })
        })
    }

    /// A perfect maze is a spanning tree of the grid: connected, with exactly one fewer open wall
    /// pair than cells, which leaves no room for a cycle.
    pub fn is_perfect(&self) -> bool {
        self.walls_consistent() && self.open_wall_pairs() + 1 == self.len() && self.is_connected()
    }

    /// The cell with the largest `distance_from_start`. Ties go to the first such cell in
    /// row-major order.
    pub fn farthest_cell(&self) -> Option<Coordinates> {
        self.cells()
            .min_by_key(|cell| Reverse(cell.distance_from_start))
            .map(|cell| cell.coordinates)
    }

    pub fn start(&self) -> Option<Coordinates> {
        self.cells().find(|c| c.is_start).map(|c| c.coordinates)
    }

    pub fn goal(&self) -> Option<Coordinates> {
        self.cells().find(|c| c.is_goal).map(|c| c.coordinates)
    }

    /// Flags exactly the frontier members as being evaluated.
    pub fn set_evaluating(&mut self, frontier: &[Coordinates]) {
        let frontier: FxHashSet<Coordinates> = frontier.iter().copied().collect();
        for cell in self.cells.values_mut() {
            cell.is_being_evaluated = frontier.contains(&cell.coordinates);
        }
    }

    /// A copy of this maze with the frontier flagged, leaving `self` untouched.
    pub fn with_evaluating(&self, frontier: &[Coordinates]) -> Maze {
        let mut maze = self.clone();
        maze.set_evaluating(frontier);
        maze
    }

    /// Clears every `visited` flag, done once generation is over and manual play starts.
    pub fn reset_visited(&mut self) {
        for cell in self.cells.values_mut() {
            cell.visited = false;
        }
    }

    /// Flags the cells of a path as visited.
    pub fn mark_visited(&mut self, path: &[Coordinates]) {
        for p in path {
            if let Some(cell) = self.cells.get_mut(p) {
                cell.visited = true;
            }
        }
    }
}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let blocked = |x: i32, y: i32, d: Direction| {
            self.get(Point::new(x, y))
                .map_or(true, |cell| cell.is_blocked(d))
        };
        for y in 0..self.height {
            for x in 0..self.width {
                let top = if blocked(x, y, Direction::North) { "---" } else { "   " };
                write!(f, "+{}", top)?;
            }
            writeln!(f, "+")?;
            for x in 0..self.width {
                let side = if blocked(x, y, Direction::West) { "|" } else { " " };
                let mark = match self.get(Point::new(x, y)) {
                    Some(cell) if cell.is_start => " S ",
                    Some(cell) if cell.is_goal => " G ",
                    Some(cell) if cell.is_being_evaluated => " * ",
                    _ => "   ",
                };
                write!(f, "{}{}", side, mark)?;
            }
            let east = if blocked(self.width - 1, y, Direction::East) { "|" } else { " " };
            writeln!(f, "{}", east)?;
        }
        for x in 0..self.width {
            let bottom = if blocked(x, self.height - 1, Direction::South) { "---" } else { "   " };
            write!(f, "+{}", bottom)?;
        }
        writeln!(f, "+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WallSet;

    #[test]
    fn rejects_non_positive_dimensions() {
        assert_eq!(
            Maze::walled(0, 3),
            Err(MazeError::InvalidDimensions { width: 0, height: 3 })
        );
        assert_eq!(
            Maze::walled(4, -1),
            Err(MazeError::InvalidDimensions { width: 4, height: -1 })
        );
    }

    #[test]
    fn walled_maze_is_fully_closed() {
        let maze = Maze::walled(3, 2).unwrap();
        assert_eq!(maze.len(), 6);
        assert_eq!(maze.open_wall_pairs(), 0);
        assert!(maze.walls_consistent());
        assert!(!maze.is_connected());
        assert!(maze.cells().all(|c| !c.visited && c.walls.len() == 4));
        let order: Vec<_> = maze.coordinates().collect();
        assert_eq!(order[1], Point::new(1, 0));
        assert_eq!(order[3], Point::new(0, 1));
    }

    #[test]
    fn opening_mirrors_the_wall_pair() {
        let mut maze = Maze::walled(2, 2).unwrap();
        let to = maze.open_passage(Point::new(0, 0), Direction::East).unwrap();
        assert_eq!(to, Point::new(1, 0));
        assert!(!maze.get(Point::new(0, 0)).unwrap().is_blocked(Direction::East));
        assert!(!maze.get(Point::new(1, 0)).unwrap().is_blocked(Direction::West));
        assert!(maze.walls_consistent());
        assert_eq!(maze.open_wall_pairs(), 1);

        maze.close_passage(Point::new(1, 0), Direction::West).unwrap();
        assert_eq!(maze.open_wall_pairs(), 0);
        assert!(maze.walls_consistent());
    }

    #[test]
    fn opening_the_border_fails_untouched() {
        let mut maze = Maze::walled(2, 2).unwrap();
        let before = maze.clone();
        assert_eq!(
            maze.open_passage(Point::new(0, 0), Direction::North),
            Err(MazeError::OutOfBounds(Point::new(0, -1)))
        );
        assert_eq!(maze, before);
    }

    #[test]
    fn detects_cycles_and_disconnection() {
        let mut maze = Maze::walled(2, 2).unwrap();
        maze.open_passage(Point::new(0, 0), Direction::East).unwrap();
        maze.open_passage(Point::new(1, 0), Direction::South).unwrap();
        assert!(!maze.is_perfect());
        maze.open_passage(Point::new(1, 1), Direction::West).unwrap();
        assert!(maze.is_perfect());
        maze.open_passage(Point::new(0, 1), Direction::North).unwrap();
        assert!(maze.is_connected());
        assert!(!maze.is_perfect());
    }

    #[test]
    fn moves_into_walls_stay_put() {
        let mut maze = Maze::walled(1, 2).unwrap();
        let origin = Point::new(0, 0);
        assert_eq!(maze.move_from(origin, Direction::South), origin);
        maze.open_passage(origin, Direction::South).unwrap();
        assert_eq!(maze.move_from(origin, Direction::South), Point::new(0, 1));
        assert_eq!(maze.move_from(origin, Direction::West), origin);
    }

    #[test]
    fn moves_never_leave_the_grid() {
        let mut maze = Maze::walled(2, 1).unwrap();
        let origin = Point::new(0, 0);
        maze.get_mut(origin).unwrap().walls = WallSet::empty();
        assert_eq!(maze.move_from(origin, Direction::West), origin);
        assert_eq!(maze.move_from(origin, Direction::North), origin);
        assert_eq!(maze.move_from(origin, Direction::East), Point::new(1, 0));
        assert_eq!(maze.move_from(Point::new(5, 5), Direction::East), Point::new(5, 5));
    }

    #[test]
    fn farthest_cell_ties_go_to_row_major_first() {
        let mut maze = Maze::walled(3, 3).unwrap();
        for p in [Point::new(2, 0), Point::new(0, 2), Point::new(1, 1)] {
            maze.get_mut(p).unwrap().distance_from_start = 4;
        }
        assert_eq!(maze.farthest_cell(), Some(Point::new(2, 0)));
    }

    #[test]
    fn evaluating_flags_follow_the_frontier() {
        let maze = Maze::walled(2, 2).unwrap();
        let flagged = maze.with_evaluating(&[Point::new(1, 1)]);
        assert!(flagged.get(Point::new(1, 1)).unwrap().is_being_evaluated);
        assert!(!flagged.get(Point::new(0, 0)).unwrap().is_being_evaluated);
        assert!(maze.cells().all(|c| !c.is_being_evaluated));
    }

    #[test]
    fn renders_walls() {
        let mut maze = Maze::walled(2, 1).unwrap();
        maze.open_passage(Point::new(0, 0), Direction::East).unwrap();
        maze.get_mut(Point::new(0, 0)).unwrap().is_start = true;
        assert_eq!(maze.to_string(), "+---+---+\n| S     |\n+---+---+\n");
    }
}
