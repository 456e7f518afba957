//! Stack growth for deeply nested expressions.
//!
//! Interpreted recursion depth is capped by the call stack limit, but a
//! single pathological expression (thousands of nested parentheses) can
//! still chew through the native stack. Recursive evaluation entry points
//! wrap themselves in [`ensure_sufficient_stack`] so the stack grows
//! instead of overflowing.

/// Minimum headroom before growing (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Growth increment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_recursion_survives() {
        fn recurse(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { recurse(n - 1) + 1 })
        }
        assert_eq!(recurse(100_000), 100_000);
    }
}
