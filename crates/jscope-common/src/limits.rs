//! Centralized limits and thresholds.
//!
//! Every limit here guards a recursive walk whose depth is driven by the
//! nesting of the input source. Exceeding one is a malformed-input condition,
//! reported by the component that owns the walk.

/// Maximum syntactic nesting depth accepted by the parser.
///
/// Statements, expressions and type bodies each add a level. Deeper input is
/// rejected with a fatal parse error instead of overflowing the stack.
pub const MAX_PARSE_DEPTH: u32 = 1_000;

/// Maximum scope nesting depth accepted by the binder.
///
/// Mirrors [`MAX_PARSE_DEPTH`]; each scope-introducing construct adds one.
pub const MAX_SCOPE_DEPTH: u32 = 1_000;

/// Upper bound on parent-link hops during a single resolution walk.
///
/// The scope tree is acyclic by construction, so hitting this means the
/// arena was corrupted rather than the input being unusual.
pub const MAX_SCOPE_WALK_ITERATIONS: usize = 10_000;

/// Maximum number of tokens the parser scans ahead when disambiguating
/// casts, lambdas and local variable declarations.
pub const MAX_LOOKAHEAD_TOKENS: usize = 4_096;
