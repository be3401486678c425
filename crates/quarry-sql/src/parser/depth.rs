//! Recursion depth guard.

use std::cell::Cell;
use std::rc::Rc;

/// Native stack one parse may use, measured from the first guarded call.
///
/// Unoptimized builds spend several kilobytes per grammar frame, so the
/// depth counter alone does not bound stack use. This leaves half of a
/// default 2 MiB thread stack to the caller.
pub const DEFAULT_STACK_BUDGET: usize = 1024 * 1024;

#[derive(Debug, Default)]
struct DepthState {
    depth: Cell<u32>,
    exceeded: Cell<bool>,
    stack_base: Cell<Option<usize>>,
}

/// Shared recursion counter for one parse.
///
/// Every recursive routine calls [`DepthTracker::enter`] and keeps the
/// returned guard alive for its duration. `enter` fails once either the
/// depth limit or the stack budget is crossed, and the tracker then latches:
/// every later `enter` fails until [`DepthTracker::reset`].
#[derive(Debug, Clone)]
pub struct DepthTracker {
    state: Rc<DepthState>,
    max_depth: u32,
    stack_budget: usize,
}

impl DepthTracker {
    #[must_use]
    pub fn new(max_depth: u32) -> Self {
        Self {
            state: Rc::new(DepthState::default()),
            max_depth,
            stack_budget: DEFAULT_STACK_BUDGET,
        }
    }

    #[must_use]
    pub const fn with_stack_budget(mut self, bytes: usize) -> Self {
        self.stack_budget = bytes;
        self
    }

    /// Increments the depth. Returns `None` (and latches the exceeded flag)
    /// if the depth limit or the stack budget is crossed, or was crossed
    /// earlier.
    #[must_use]
    pub fn enter(&self) -> Option<DepthGuard> {
        if self.state.exceeded.get() {
            return None;
        }
        let depth = self.state.depth.get() + 1;
        if depth > self.max_depth || self.stack_used() > self.stack_budget {
            self.state.exceeded.set(true);
            return None;
        }
        self.state.depth.set(depth);
        Some(DepthGuard {
            state: Rc::clone(&self.state),
        })
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        self.state.depth.get()
    }

    #[must_use]
    pub const fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Returns true once the limit has been crossed.
    #[must_use]
    pub fn exceeded(&self) -> bool {
        self.state.exceeded.get()
    }

    /// Clears the counter, the exceeded flag and the stack baseline.
    pub fn reset(&self) {
        self.state.depth.set(0);
        self.state.exceeded.set(false);
        self.state.stack_base.set(None);
    }

    /// Stack bytes between the baseline and the caller. The first call after
    /// a reset records the baseline.
    fn stack_used(&self) -> usize {
        let here = stack_address();
        match self.state.stack_base.get() {
            Some(base) => base.abs_diff(here),
            None => {
                self.state.stack_base.set(Some(here));
                0
            }
        }
    }
}

/// Address of a local in a fresh frame, i.e. the current stack position.
#[inline(never)]
fn stack_address() -> usize {
    let marker = 0u8;
    std::ptr::from_ref(&marker) as usize
}

/// Decrements the shared depth when dropped.
#[derive(Debug)]
pub struct DepthGuard {
    state: Rc<DepthState>,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        let depth = self.state.depth.get();
        self.state.depth.set(depth.saturating_sub(1));
    }
}
