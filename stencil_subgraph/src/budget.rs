//! Search budgets for the exponential stages.
//!
//! A tripped ceiling stops the search early; the partial result travels
//! together with a [`BudgetExceeded`] describing what tripped.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Which ceiling stopped a search, and how far it got.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BudgetExceeded {
    /// Too many distinct candidate edge-sets.
    #[error("candidate budget exceeded: limit {limit}, stopped at edge count {edge_count}")]
    Candidates {
        /// Configured ceiling.
        limit: usize,
        /// Edge count being enumerated when the ceiling tripped.
        edge_count: usize,
    },

    /// Too many stencil subsets.
    #[error("combination budget exceeded: evaluated {evaluated} of {total} combinations")]
    Combinations {
        /// Subsets evaluated before stopping.
        evaluated: usize,
        /// Subsets that exist.
        total: usize,
    },

    /// Wall-clock limit reached.
    #[error("time limit of {limit:?} exceeded after {completed} completed steps")]
    Deadline {
        /// Configured limit.
        limit: Duration,
        /// Units of work (candidates, representatives or subsets) finished.
        completed: usize,
    },
}

/// A possibly partial result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bounded<T> {
    /// Everything computed before the search stopped.
    pub value: T,
    /// Set when a ceiling stopped the search early.
    pub exceeded: Option<BudgetExceeded>,
}

impl<T> Bounded<T> {
    /// A result that ran to completion.
    pub const fn complete(value: T) -> Self {
        Self {
            value,
            exceeded: None,
        }
    }

    /// A result cut short by `reason`.
    pub const fn partial(value: T, reason: BudgetExceeded) -> Self {
        Self {
            value,
            exceeded: Some(reason),
        }
    }

    /// Whether the search ran to completion.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.exceeded.is_none()
    }

    /// Fail fast: drop a partial result in favour of its error.
    ///
    /// # Errors
    ///
    /// Returns the budget error when the search was cut short.
    pub fn into_result(self) -> Result<T, BudgetExceeded> {
        match self.exceeded {
            None => Ok(self.value),
            Some(e) => Err(e),
        }
    }

    /// Transform the carried value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Bounded<U> {
        Bounded {
            value: f(self.value),
            exceeded: self.exceeded,
        }
    }
}

/// Wall-clock deadline derived from an optional time limit.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Deadline {
    limit: Option<Duration>,
    start: Instant,
}

impl Deadline {
    pub(crate) fn start(limit: Option<Duration>) -> Self {
        Self {
            limit,
            start: Instant::now(),
        }
    }

    pub(crate) fn expired(&self) -> bool {
        self.limit.is_some_and(|l| self.start.elapsed() >= l)
    }

    pub(crate) fn exceeded(&self, completed: usize) -> BudgetExceeded {
        BudgetExceeded::Deadline {
            limit: self.limit.unwrap_or_default(),
            completed,
        }
    }
}
