//! Stack safety for the recursive type passes.
//!
//! Type expressions nest arbitrarily (`List<Map<K, List<...>>>`), and every
//! pass over them recurses. Two tools live here:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand.
//! - [`DepthGuard`] bounds logical recursion so a malformed graph reports
//!   an error instead of spinning until memory runs out.
//!
//! # Platform Support
//!
//! - **Native targets**: `stacker` grows the stack when the red zone is hit.
//! - **WASM targets**: passthrough.

use std::cell::Cell;
use std::rc::Rc;

/// Grow the stack when less than this remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated per growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if the red zone has been reached.
///
/// ```text
/// fn fold(&mut self, idx: Idx) -> Idx {
///     ensure_sufficient_stack(|| self.super_fold(idx))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Returned by [`DepthGuard::enter`] once the configured limit is hit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: u32,
}

/// Counts nested entries into a recursive pass.
///
/// Tokens share the counter rather than borrowing the guard, so a pass can
/// hold one across calls that need `&mut self`. Not thread-safe; each pass
/// owns its guard.
#[derive(Clone, Debug)]
pub struct DepthGuard {
    depth: Rc<Cell<u32>>,
    limit: u32,
}

impl DepthGuard {
    pub fn new(limit: u32) -> Self {
        DepthGuard {
            depth: Rc::new(Cell::new(0)),
            limit,
        }
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Enter one level. The returned token leaves the level when dropped.
    #[inline]
    pub fn enter(&self) -> Result<DepthToken, DepthExceeded> {
        let depth = self.depth.get();
        if depth >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.depth.set(depth + 1);
        Ok(DepthToken {
            depth: Rc::clone(&self.depth),
        })
    }
}

/// RAII marker for one level of [`DepthGuard`] nesting.
#[derive(Debug)]
#[must_use = "the level is left as soon as the token is dropped"]
pub struct DepthToken {
    depth: Rc<Cell<u32>>,
}

impl Drop for DepthToken {
    fn drop(&mut self) {
        let depth = self.depth.get();
        self.depth.set(depth.saturating_sub(1));
    }
}
