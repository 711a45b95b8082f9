//! Local reference implementations used as test oracles.
//!
//! The demo pages animate algorithms one step at a time. Each oracle here
//! is an explicit state machine ([`Stepper`]) emitting the same sequence of
//! actions, so a scenario can compare page state against a fresh oracle
//! run after every step or only at the end.

mod graph;
mod knapsack;
mod priority_queue;
mod sorting;

pub use graph::{bfs_order, BfsAction, BfsStepper, Graph};
pub use knapsack::{solve_knapsack, Item, ItemError, KnapsackSolution};
pub use priority_queue::MaxPriorityQueue;
pub use sorting::{
    bubble_sort, counting_sort, BubbleSortStepper, CountingSortStepper, SortAction,
};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{ProbeError, ProbeResult};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl Order {
    /// Whether `a` may precede `b`; equal values are in order either way
    #[must_use]
    pub fn in_order<T: PartialOrd + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            Self::Ascending => a <= b,
            Self::Descending => a >= b,
        }
    }

    /// Value of the order `<select>` on the sorting pages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// An algorithm advanced one visible action at a time
pub trait Stepper {
    /// Action emitted per step
    type Action;

    /// Name used in cap errors
    const NAME: &'static str;

    /// Advance one step; `None` once finished
    fn step(&mut self) -> Option<Self::Action>;

    /// Whether the algorithm has finished
    fn is_done(&self) -> bool;

    /// Step until finished, collecting every action.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::IterationCapExceeded`] if more than `cap`
    /// actions would be emitted.
    fn run_to_end(&mut self, cap: usize) -> ProbeResult<Vec<Self::Action>> {
        let mut actions = Vec::new();
        while let Some(action) = self.step() {
            if actions.len() == cap {
                return Err(ProbeError::IterationCapExceeded {
                    what: Self::NAME.to_string(),
                    cap,
                });
            }
            actions.push(action);
        }
        Ok(actions)
    }
}
