//! Run bookkeeping shared by generation and solving: cooperative cancellation, the session that
//! keeps at most one live run per kind, and a pacing adapter for animated playback.
use crate::astar_search::{astar_search, AstarSearch, Heuristic};
use crate::error::MazeError;
use crate::generator::{Generation, GeneratorConfig};
use crate::grid::Coordinates;
use crate::maze::Maze;
use log::debug;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Handle a run checks between steps. A token is live while the epoch it was issued for is still
/// the current epoch of its [RunSlot].
#[derive(Clone, Debug)]
pub struct CancelToken {
    epoch: Arc<AtomicU64>,
    issued: u64,
}

impl CancelToken {
    /// A token that belongs to no slot; it only stops when [cancel](Self::cancel) is called on it.
    pub fn detached() -> CancelToken {
        CancelToken {
            epoch: Arc::new(AtomicU64::new(0)),
            issued: 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.epoch.load(Ordering::Acquire) != self.issued
    }

    /// Cancels this token. Has no effect on a newer token issued by the same slot.
    pub fn cancel(&self) {
        let _ = self.epoch.compare_exchange(
            self.issued,
            self.issued + 1,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

/// Issues tokens for one kind of run. Issuing a token cancels the one issued before it.
#[derive(Debug, Default)]
pub struct RunSlot {
    epoch: Arc<AtomicU64>,
}

impl RunSlot {
    pub fn new() -> RunSlot {
        RunSlot::default()
    }

    /// Cancels the in-flight run, if any, and returns the token for the next one.
    pub fn begin(&self) -> CancelToken {
        let issued = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        CancelToken {
            epoch: Arc::clone(&self.epoch),
            issued,
        }
    }

    /// Cancels the in-flight run without starting another.
    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}

/// Owner of the live runs against a maze: one generation and one search at a time. Starting a run
/// of a kind cancels the previous run of that kind; the cancelled run stops at its next step
/// without touching its maze again.
///
/// Validation happens before the previous run is cancelled, so a rejected request leaves the
/// in-flight run alone.
#[derive(Debug, Default)]
pub struct MazeSession {
    generation: RunSlot,
    solving: RunSlot,
}

impl MazeSession {
    pub fn new() -> MazeSession {
        MazeSession::default()
    }

    pub fn start_generation<R: Rng>(
        &self,
        config: &GeneratorConfig,
        rng: R,
    ) -> Result<Generation<R>, MazeError> {
        config.validate()?;
        let token = self.generation.begin();
        debug!(
            "Starting {}x{} generation from {:?}",
            config.width, config.height, config.start
        );
        Generation::with_token(config, rng, token)
    }

    pub fn start_search<'m, H: Heuristic>(
        &self,
        maze: &'m Maze,
        start: Coordinates,
        goal: Coordinates,
        heuristic: H,
    ) -> Result<AstarSearch<'m, H>, MazeError> {
        let search = astar_search(maze, start, goal, heuristic)?;
        debug!("Starting search from {:?} to {:?}", start, goal);
        Ok(search.with_cancel(self.solving.begin()))
    }

    pub fn cancel_generation(&self) {
        self.generation.cancel();
    }

    pub fn cancel_search(&self) {
        self.solving.cancel();
    }
}

/// Iterator adapter that sleeps for a fixed delay between items. Items pass through untouched, so
/// the delay only changes when snapshots arrive, never what they contain.
#[derive(Clone, Debug)]
pub struct Paced<I> {
    inner: I,
    delay: Duration,
    started: bool,
}

pub fn paced<I: IntoIterator>(iter: I, delay: Duration) -> Paced<I::IntoIter> {
    Paced {
        inner: iter.into_iter(),
        delay,
        started: false,
    }
}

impl<I: Iterator> Iterator for Paced<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.started && !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.started = true;
        self.inner.next()
    }
}
