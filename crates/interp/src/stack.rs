//! Native stack growth for deep interpreted recursion.
//!
//! Each interpreted call recurses on the host stack. On native targets the
//! stack is grown on demand with `stacker`; on wasm the closure runs as is.

/// Grow the stack when less than this remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated per growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the native stack first if it is nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
