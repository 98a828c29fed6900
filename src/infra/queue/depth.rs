//! Depth-indexed FIFO queue.

use std::collections::VecDeque;

/// Ordered collection of FIFO levels indexed by nesting depth.
///
/// Jobs run FIFO within a level and the deepest non-empty level always goes
/// first. Levels between 0 and the deepest one may be empty; trailing empty
/// levels are dropped before every dequeue.
#[derive(Debug)]
pub struct DepthQueue<J> {
    levels: Vec<VecDeque<J>>,
}

impl<J> Default for DepthQueue<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J> DepthQueue<J> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self { levels: Vec::new() }
    }

    /// Append `job` to level `depth`, growing the queue as needed.
    pub fn push(&mut self, depth: usize, job: J) {
        if self.levels.len() <= depth {
            self.levels.resize_with(depth + 1, VecDeque::new);
        }
        self.levels[depth].push_back(job);
    }

    /// Drop trailing empty levels.
    pub fn prune(&mut self) {
        while self.levels.last().is_some_and(VecDeque::is_empty) {
            self.levels.pop();
        }
    }

    /// Remove the head of the deepest non-empty level, with that level's index.
    pub fn pop_deepest(&mut self) -> Option<(usize, J)> {
        self.prune();
        let depth = self.levels.len().checked_sub(1)?;
        let job = self.levels[depth].pop_front()?;
        Some((depth, job))
    }

    /// Number of queued jobs across all levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }

    /// Whether no job is queued on any level.
    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(VecDeque::is_empty)
    }

    /// Number of levels currently held, including empty inner ones.
    pub fn levels(&self) -> usize {
        self.levels.len()
    }
}
