//! Grammars built on the combinators, usable as they are and as worked
//! examples of the two ways of driving the engine.
//!
//! - [`expr`]: integer arithmetic evaluated while it parses, on the raw
//!   combinators;
//! - [`json`]: JSON documents as a syntax tree, decoded into [`json::JsonValue`];
//! - [`html`]: a small HTML subset whose trees are convenient to query.

#[path = "grammars/expr.rs"]
pub mod expr;
#[path = "grammars/html.rs"]
pub mod html;
#[path = "grammars/json.rs"]
pub mod json;
