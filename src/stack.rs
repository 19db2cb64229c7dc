//! Stack growth for the recursive parser and evaluator.

/// Minimum stack space to keep available before recursing further.
const RED_ZONE: usize = 100 * 1024;

/// Stack space allocated each time the red zone is reached.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack if less than the red zone remains.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
