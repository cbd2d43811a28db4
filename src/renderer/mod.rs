//! Renderer - the engine's public surface.
//!
//! A [`Renderer`] owns the host, the fiber arena, and all scheduler state:
//! the committed generation, the in-progress walk, and the single coalesced
//! pending request.
//!
//! # Example
//!
//! ```
//! use spool::{element, text, Attrs, MemoryHost, Renderer, TimeSlice};
//! use std::time::Duration;
//!
//! let mut renderer = Renderer::new(MemoryHost::new());
//! let target = renderer.host().root();
//!
//! let tree = element("div", Attrs::new(), vec![text("hello")]).unwrap();
//! renderer.render(tree, target);
//!
//! // Drive the walk in bounded slices; render() never blocks.
//! loop {
//!     let status = renderer.tick(&TimeSlice::new(Duration::from_millis(4))).unwrap();
//!     if status == spool::WorkStatus::Committed {
//!         break;
//!     }
//! }
//! assert_eq!(renderer.host().root_html(), "<div>hello</div>");
//! ```

mod commit;

use crate::engine::{Fiber, FiberArena, FiberId};
use crate::error::RenderError;
use crate::host::Host;
use crate::pipeline::schedule::{Deadline, Unbounded};
use crate::pipeline::walker::{perform_unit, WalkConfig};
use crate::types::{DiffMode, HostNode};
use crate::vnode::VNode;

// =============================================================================
// Options and status
// =============================================================================

/// Renderer configuration.
#[derive(Debug, Clone, Copy)]
pub struct RendererOptions {
    /// Child-diffing strategy. Keyed by default; positional is a selectable
    /// lower-overhead mode for trees known to have no reordering.
    pub diff_mode: DiffMode,
    /// Bound on component-chain expansion per fiber.
    pub max_resolve_depth: usize,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            diff_mode: DiffMode::Keyed,
            max_resolve_depth: 64,
        }
    }
}

/// Outcome of one [`Renderer::tick`] slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing scheduled.
    Idle,
    /// The slice was exhausted with the walk incomplete; tick again later.
    InProgress,
    /// A generation's walk finished and its effects were committed.
    Committed,
}

// =============================================================================
// Renderer
// =============================================================================

/// A committed generation, consistent with the host tree.
struct Generation {
    root: FiberId,
    target: HostNode,
}

/// An in-progress walk.
struct WorkState {
    root: FiberId,
    target: HostNode,
    next: Option<FiberId>,
}

/// A render request captured until the next commit boundary.
struct Request {
    tree: VNode,
    target: HostNode,
}

/// Incremental tree renderer.
///
/// At most one walk is in flight; requests arriving while it runs are
/// coalesced into a single pending generation that starts at the commit
/// boundary. A walk always runs to completion once started - newer requests
/// supersede, they never preempt.
pub struct Renderer<H: Host> {
    host: H,
    arena: FiberArena,
    config: WalkConfig,
    current: Option<Generation>,
    work: Option<WorkState>,
    pending: Option<Request>,
}

impl<H: Host> Renderer<H> {
    pub fn new(host: H) -> Self {
        Self::with_options(host, RendererOptions::default())
    }

    pub fn with_options(host: H, options: RendererOptions) -> Self {
        Self {
            host,
            arena: FiberArena::new(),
            config: WalkConfig {
                mode: options.diff_mode,
                max_resolve_depth: options.max_resolve_depth,
            },
            current: None,
            work: None,
            pending: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// No walk in flight and no request pending.
    pub fn is_idle(&self) -> bool {
        self.work.is_none() && self.pending.is_none()
    }

    /// Schedule a render of `tree` into `target`.
    ///
    /// Never executes inline. A request arriving while a walk is active (or
    /// while an earlier request is still pending) replaces the pending one:
    /// only the most recent request at each commit boundary is rendered.
    pub fn render(&mut self, tree: VNode, target: HostNode) {
        if self.pending.is_some() {
            tracing::debug!("coalescing render request");
        }
        self.pending = Some(Request { tree, target });
    }

    /// Advance reconciliation within one scheduling slice.
    ///
    /// Consumes work units while the deadline has budget. When the walk
    /// completes within the slice, its effects are committed before
    /// returning. On a resolution error the in-progress generation is
    /// discarded and the committed host tree is left untouched.
    pub fn tick(&mut self, deadline: &impl Deadline) -> Result<WorkStatus, RenderError> {
        if self.work.is_none() {
            match self.pending.take() {
                Some(request) => self.begin_generation(request),
                None => return Ok(WorkStatus::Idle),
            }
        }

        loop {
            let Some(unit) = self.work.as_ref().and_then(|work| work.next) else {
                self.commit()?;
                return Ok(WorkStatus::Committed);
            };
            if deadline.should_yield() {
                return Ok(WorkStatus::InProgress);
            }
            match perform_unit(&mut self.arena, unit, &self.config) {
                Ok(next) => {
                    if let Some(work) = self.work.as_mut() {
                        work.next = next;
                    }
                }
                Err(error) => {
                    self.abort_generation();
                    return Err(error.into());
                }
            }
        }
    }

    /// Drain all scheduled work: every pending generation is walked and
    /// committed before this returns.
    pub fn run(&mut self) -> Result<(), RenderError> {
        while self.tick(&Unbounded)? != WorkStatus::Idle {}
        Ok(())
    }

    /// Tear the renderer down: fire removal hooks top-down over the
    /// committed tree, detach the mounted subtree from its target, and
    /// return the host.
    pub fn unmount(mut self) -> H {
        self.pending = None;
        self.abort_generation();
        if let Some(current) = self.current.take() {
            if let Some(mounted) = self.arena[current.root].child {
                commit::notify_removal(&mut self.arena, &mut self.host, mounted);
                if let Some(node) = self.arena[mounted].host {
                    if let Err(error) = self.host.remove(node) {
                        tracing::warn!(%error, "detach on unmount failed");
                    }
                }
            }
            self.arena.release_tree(current.root);
        }
        self.host
    }

    /// Build the next generation's root pair and wire it to the committed
    /// generation: alternate links on root and root child, host handles
    /// inherited.
    fn begin_generation(&mut self, request: Request) {
        let Request { tree, target } = request;

        if self.current.as_ref().is_some_and(|c| c.target != target) {
            if let Some(old) = self.current.take() {
                self.arena.release_tree(old.root);
                tracing::debug!("render target changed; discarding previous generation");
            }
        }

        let root = self.arena.insert(Fiber::root(target));
        let child = self.arena.insert(Fiber::new(tree));
        self.arena[root].child = Some(child);
        self.arena[child].parent = Some(root);

        if let Some(current) = &self.current {
            let old_root = current.root;
            self.arena[root].alternate = Some(old_root);
            self.arena[old_root].forward = Some(root);
            if let Some(old_child) = self.arena[old_root].child {
                self.arena[child].alternate = Some(old_child);
                self.arena[child].host = self.arena[old_child].host;
                self.arena[old_child].forward = Some(child);
            }
        }

        tracing::debug!(live_fibers = self.arena.len(), "generation started");
        self.work = Some(WorkState {
            root,
            target,
            next: Some(root),
        });
    }

    /// Apply the finished walk's effects and swap generations.
    fn commit(&mut self) -> Result<(), RenderError> {
        let Some(work) = self.work.take() else {
            return Ok(());
        };
        let result = commit::commit_generation(&mut self.arena, &mut self.host, work.root);

        // The generation swap happens even if a host primitive failed: the
        // cleanup inside commit_generation keeps the arena consistent, and
        // the work-in-progress tree is the closest description of whatever
        // the host now holds.
        if let Some(old) = self.current.take() {
            self.arena.release_tree(old.root);
        }
        self.arena[work.root].alternate = None;
        self.current = Some(Generation {
            root: work.root,
            target: work.target,
        });

        let applied = result.map_err(RenderError::Host)?;
        tracing::debug!(effects = applied, live_fibers = self.arena.len(), "committed");
        Ok(())
    }

    /// Discard the in-progress generation, resetting any state the aborted
    /// walk left on surviving prior-generation fibers.
    fn abort_generation(&mut self) {
        let Some(work) = self.work.take() else {
            return;
        };

        let mut stack = vec![work.root];
        let mut wip = Vec::new();
        while let Some(id) = stack.pop() {
            wip.push(id);
            if let Some(child) = self.arena[id].child {
                stack.push(child);
            }
            if let Some(sibling) = self.arena[id].sibling {
                stack.push(sibling);
            }
        }
        for &id in &wip {
            if let Some(alt) = self.arena[id].alternate {
                self.arena[alt].forward = None;
            }
            // Old-generation fibers tagged for deletion by the aborted walk
            // sit in local effect lists; reset them before release.
            for member in self.arena[id].effects.ids(&self.arena) {
                self.arena[member].tag = crate::engine::EffectTag::empty();
                self.arena[member].next_effect = None;
            }
            self.arena[id].effects = Default::default();
        }
        self.arena.release_tree(work.root);
        tracing::warn!("reconciliation aborted; committed tree left intact");
    }
}

// =============================================================================
// Tests
// =============================================================================
