//! Error types.
//!
//! Match failure is not an error: a parser that does not match returns `None`
//! together with the scanner it was given. The types here cover the two
//! situations that are reported to the caller instead:
//!
//! - [`GrammarError`]: the grammar itself is malformed (wrong arity, a pattern
//!   that does not compile, a forward reference bound twice). These surface
//!   while the grammar is being assembled, before any input is parsed.
//! - [`SelectorError`]: a query string that the selector grammar rejects.

/// A grammar could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("{combinator} parser {name:?} doesn't accept {got} parsers (should be {expected})")]
    Arity { combinator: &'static str, name: String, got: usize, expected: &'static str },

    #[error("invalid pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("forward reference {name:?} is already bound")]
    Rebound { name: String },

    #[error("{combinator} parser {name:?}: sub-parser {index} produced a non-node value")]
    NotANode { combinator: &'static str, name: String, index: usize },

    #[error("ord_tokens needs one name per pattern (got {patterns} patterns and {names} names)")]
    TokenNames { patterns: usize, names: usize },
}

impl GrammarError {
    pub(crate) fn pattern(pattern: &str, err: &regex::Error) -> Self {
        GrammarError::Pattern { pattern: pattern.to_string(), message: err.to_string() }
    }
}

/// A selector string could not be turned into a query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("cannot parse selector {selector:?} at offset {offset}")]
    Syntax { selector: String, offset: usize },

    #[error("invalid argument {arg:?} for :{pseudo}")]
    Argument { pseudo: String, arg: String },

    #[error("invalid pattern {pattern:?} in attribute selector: {message}")]
    Pattern { pattern: String, message: String },

    #[error("selector grammar: {0}")]
    Grammar(#[from] GrammarError),
}
