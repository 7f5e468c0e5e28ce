//! Combinator engine.
//!
//! The engine is split into focused submodules under `src/engine/` while the
//! public paths stay flat (`crate::Parser`, `crate::Ast`, ...).
//!
//! ## How the parts work together
//!
//! ```text
//! terminals (leaf parsers) ──┐
//!                            │  raw combinators          (combinators.rs)
//!                            │    sequence / ordered_choice / zero_or_more
//!                            │    one_or_more / repeat_until / optional
//!                            │    ParserRef (forward references)
//!                            │
//!                            └─ builder combinators      (ast.rs)
//!                                 same shapes, named, build Nodes
//!                                       │
//!                           groupings ◄─┼─► NodePool     (pool.rs)
//!                                       │
//!                                       v
//!                             Ast::parse_with → root Node
//!                                       │
//!                 render / export_graph / query (selector)
//! ```
//!
//! Parsers are plain values: `Rc`-shared closures from a [`Scanner`](crate::Scanner)
//! to an optional [`Value`](crate::Value) and the scanner to continue from.
//! Failure is `None` plus the scanner that was passed in, which is all the
//! backtracking there is: no packrat memo, no error recovery.
//!
//! ## Responsibilities by module
//!
//! - `combinators.rs`: the [`Parser`] handle, raw combinators with their
//!   [`Nodify`] callbacks, forward references and the repetition driver shared
//!   with the builder.
//! - `ast.rs`: [`Ast`], the tree-building combinators, [`Transform`] and the
//!   [`Trace`] categories.
//! - `pool.rs`: bounded free list of retired groupings.
//! - `metrics.rs`: pool counters and per-parse metrics.
//!
//! ## Debugging
//!
//! Set `QUARRY_DEBUG_COMBINATORS=1` (or call [`Ast::set_debug`]) to emit one
//! `tracing` event per combinator step under the `quarry::ast` target.

#[path = "engine/ast.rs"]
mod ast;
#[path = "engine/combinators.rs"]
mod combinators;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/pool.rs"]
mod pool;

pub use ast::{Ast, Trace, Transform};
pub use combinators::{
    Nodify, Parser, ParserRef, one_or_more, optional, ordered_choice, repeat_until, sequence, zero_or_more,
};
pub use metrics::{ParseMetrics, PoolStats};
