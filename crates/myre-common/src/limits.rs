//! Centralized limits and thresholds for the Myre compiler front-end.
//!
//! Collecting these in one module avoids duplicate, inconsistently-tuned
//! constants scattered across the parser/binder/solver (the same rationale
//! `tsz_common::limits` gives for its own constant table).

/// Hard cap on the type resolver's fixed-point pass loop (spec §4.5.2,
/// §5: "a hard upper bound on passes (constant) to guarantee termination").
pub const MAX_RESOLVER_PASSES: u32 = 10;

/// Cap on scope-parent-chain walks (e.g. finding the enclosing function for
/// a `return`, or the enclosing type for `this`). Prevents an infinite loop
/// if a malformed scope tree ever produced a parent cycle.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum recursion depth for the Pratt expression parser before it bails
/// out with a diagnostic instead of overflowing the stack on pathological
/// input such as thousands of nested parentheses.
pub const MAX_EXPRESSION_NESTING_DEPTH: u32 = 500;

/// Maximum number of panic-mode synchronization attempts within a single
/// top-level declaration before the parser gives up on that declaration
/// entirely and resynchronizes at the top level.
pub const MAX_RECOVERY_ATTEMPTS_PER_DECLARATION: u32 = 8;
