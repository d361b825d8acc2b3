use crate::grid::Coordinates;
use thiserror::Error;

/// Reasons a generation, solve or maze edit can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MazeError {
    /// Width or height was zero or negative.
    #[error("maze dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    /// The start coordinate lies outside the grid.
    #[error("start {0:?} lies outside the grid")]
    InvalidStart(Coordinates),
    /// The goal coordinate lies outside the grid.
    #[error("goal {0:?} lies outside the grid")]
    InvalidGoal(Coordinates),
    /// A wall edit touched a coordinate outside the grid.
    #[error("{0:?} lies outside the grid")]
    OutOfBounds(Coordinates),
    /// The search frontier emptied before the goal was reached.
    #[error("no path found from {start:?} to {goal:?}")]
    NoPathFound {
        start: Coordinates,
        goal: Coordinates,
    },
    /// The run was superseded by a newer run of the same kind.
    #[error("run was cancelled")]
    Cancelled,
}
