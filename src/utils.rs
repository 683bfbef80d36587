//! Assorted small helpers.

use std::time::{Duration, Instant};

/// Wall-clock budget checked at every suspension point of the run.
#[derive(Clone, Copy, Debug)]
pub struct CountdownTimer {
    deadline: Option<Instant>,
}

impl CountdownTimer {
    /// A timer that expires `budget` from now, or never for `None`.
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            deadline: budget.map(|b| Instant::now() + b),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}
