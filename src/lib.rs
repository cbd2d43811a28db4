//! # spool - incremental tree reconciliation
//!
//! An engine that maintains an external tree (through a pluggable [`Host`]
//! backend) as the minimal-mutation image of successive immutable virtual
//! tree descriptions. Each render request is diffed against the previously
//! committed generation in an interruptible depth-first walk, accumulated
//! into an ordered effect list, and applied to the host in one atomic commit.
//!
//! ```text
//!  render(tree)        tick(deadline)                        commit
//!  ───────────▶ pending ─────────────▶ fiber walk ──────▶ host mutations
//!              (coalesced)          (suspendable, unit    (three passes,
//!                                    by unit, keyed or     ancestors before
//!                                    positional diff)      descendants)
//! ```
//!
//! Key properties:
//! - **Non-blocking**: [`Renderer::render`] only records the request. The
//!   walk runs inside [`Renderer::tick`] under a caller-supplied [`Deadline`]
//!   and suspends between work units.
//! - **Coalescing**: requests arriving while a walk is in flight replace one
//!   another; only the latest is rendered at the next commit boundary.
//! - **Keyed diffing**: reordered children with stable `key` attributes are
//!   relocated, not destroyed and recreated.
//! - **Atomic failure**: a resolution error discards the in-progress
//!   generation and leaves the committed host tree untouched.
//!
//! # Quick start
//!
//! ```
//! use spool::{attrs, element, text, MemoryHost, Renderer};
//!
//! let mut renderer = Renderer::new(MemoryHost::new());
//! let target = renderer.host().root();
//!
//! let list = element(
//!     "ul",
//!     attrs([("class", "items")]),
//!     vec![
//!         element("li", attrs([("key", "a")]), vec![text("first")]).unwrap(),
//!         element("li", attrs([("key", "b")]), vec![text("second")]).unwrap(),
//!     ],
//! )
//! .unwrap();
//!
//! renderer.render(list, target);
//! renderer.run().unwrap();
//! assert_eq!(
//!     renderer.host().root_html(),
//!     "<ul class=\"items\"><li key=\"a\">first</li><li key=\"b\">second</li></ul>",
//! );
//! ```

pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod renderer;
pub mod types;
pub mod vnode;

pub use engine::EffectTag;
pub use error::{ComponentError, HostError, RenderError, ResolveError, TreeError};
pub use host::{Host, HostOp, MemoryHost};
pub use pipeline::{Deadline, TimeSlice, Unbounded, UnitBudget};
pub use renderer::{Renderer, RendererOptions, WorkStatus};
pub use types::{attrs, AttrValue, Attrs, DiffMode, HostNode};
pub use vnode::{component, element, text, try_component, VNode};
