//! Fiber tree model.
//!
//! The engine's internal representation of one tree generation:
//! - Fiber: one logical tree position, with structural and cross-generation
//!   links and pending diff state
//! - FiberArena: contiguous slot storage addressed by stable handles, with a
//!   free-index pool for O(1) reuse
//! - EffectList: intrusive effect accumulator with O(1) list-to-list splice
//!
//! # Architecture
//!
//! Fibers are NOT owned nodes in a pointer graph. They are slots in an arena:
//!
//! ```text
//! Slot 0: Root    (child=1, host=target)
//! Slot 1: Element (parent=0, child=2, alternate=7, tag=UPDATE)
//! Slot 2: Text    (parent=1, sibling=3, ...)
//! ```
//!
//! Every link - parent/child/sibling shape, the alternate link to the prior
//! generation, the effect-list threading - is a handle field. Generations are
//! swapped by retargeting one handle, never by rewiring pointers.

mod effects;
mod fiber;

pub use effects::*;
pub use fiber::*;
