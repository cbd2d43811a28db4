//! Cooperative time slicing.
//!
//! The walk is driven in discrete units (one fiber per unit). Between units
//! the renderer polls a [`Deadline`]; when the slice is exhausted the walk
//! suspends and the caller re-invokes [`tick`](crate::Renderer::tick) later.
//! This inverts callback-driven idle scheduling into a pump the embedding
//! controls: a wall-clock slice, a fixed work-unit budget, or no budget at
//! all.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Remaining-budget query for one scheduling slice.
///
/// Polled exactly once per completed work unit.
pub trait Deadline {
    /// True when the current slice is exhausted and the walk should suspend.
    fn should_yield(&self) -> bool;
}

/// Wall-clock slice: yield once the budget has elapsed.
#[derive(Debug)]
pub struct TimeSlice {
    end: Instant,
}

impl TimeSlice {
    pub fn new(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }

    /// Time left in this slice.
    pub fn remaining(&self) -> Duration {
        self.end.saturating_duration_since(Instant::now())
    }
}

impl Deadline for TimeSlice {
    fn should_yield(&self) -> bool {
        self.remaining() == Duration::ZERO
    }
}

/// Fixed work-unit budget: yield after a set number of units.
#[derive(Debug)]
pub struct UnitBudget {
    remaining: Cell<usize>,
}

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self {
            remaining: Cell::new(units),
        }
    }
}

impl Deadline for UnitBudget {
    fn should_yield(&self) -> bool {
        let left = self.remaining.get();
        if left == 0 {
            return true;
        }
        self.remaining.set(left - 1);
        false
    }
}

/// No budget: run the walk to completion in one call.
#[derive(Debug, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn should_yield(&self) -> bool {
        false
    }
}
