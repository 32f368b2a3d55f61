//! Deferred one-shot tasks
//!
//! A min-heap of tasks keyed by fire time on the game clock. There is no
//! cancellation: whoever pops a task re-checks game state before acting on it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::spawn::ForceBomb;

/// Work that fires later on the game clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Run the next beat
    Advance,
    /// One delayed spawn of a chain
    Spawn(ForceBomb),
    /// The swoosh sound finished; allow another
    SwooshRearm,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    at: f64,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so BinaryHeap pops the earliest, then the first scheduled
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now: f64,
    seq: u64,
    queue: BinaryHeap<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current game clock in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Run `task` `delay` seconds from now
    pub fn schedule(&mut self, delay: f64, task: Task) {
        let entry = Entry {
            at: self.now + delay.max(0.0),
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.queue.push(entry);
    }

    pub fn advance_clock(&mut self, dt: f64) {
        self.now += dt;
    }

    /// Pop the next task whose time has come
    pub fn pop_due(&mut self) -> Option<Task> {
        if self.queue.peek().is_some_and(|entry| entry.at <= self.now) {
            self.queue.pop().map(|entry| entry.task)
        } else {
            None
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
