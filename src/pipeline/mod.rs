//! Reconciliation pipeline.
//!
//! The interruptible depth-first walk over a generation's fibers:
//! - [`walker`] - one work unit per fiber: resolve, classify, set up the
//!   child diff on descent; splice effects upward on ascent
//! - [`children`] - keyed and positional child diffing
//! - [`schedule`] - the cooperative time-slice contract the caller drives
//!   the walk with
//!
//! Suspension happens only between units, never inside one, so a walk can be
//! paused and resumed any number of times without losing or duplicating work.

pub(crate) mod children;
pub mod schedule;
pub(crate) mod walker;

pub use schedule::{Deadline, TimeSlice, Unbounded, UnitBudget};
