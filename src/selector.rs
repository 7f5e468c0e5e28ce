//! CSS-like queries over syntax trees.
//!
//! ```text
//! *                   any node
//! INT, tagstart       node name, case-insensitive
//! .x / #x             [class=x] / [id=x]
//! [key]               attribute present
//! [key=v] [key~=v]    equals / contains
//! [key^=v] [key$=v]   prefix / suffix
//! [key*=re]           regular expression search
//! [value=...]         the node's text instead of an attribute
//! :first-child ...    structural pseudo-classes, nth-* arguments are 0-based
//! a b, a > b          descendant, child
//! a + b, a ~ b        next sibling, first later sibling
//! a, b                either
//! ```
//!
//! Leaves carry `class=term` and groupings `class=nonterm`, so
//! `[class=term]` selects leaves.

#[path = "selector/grammar.rs"]
mod grammar;
#[path = "selector/model.rs"]
mod model;
#[path = "selector/walk.rs"]
mod walk;


pub use model::{AttrOp, AttrPredicate, Chain, Combinator, Pseudo, Selector, Term};
pub use walk::Matches;

use crate::SelectorError;
use std::str::FromStr;

impl Selector {
    /// Parse selector text. Surrounding whitespace is ignored; everything
    /// else must be consumed.
    pub fn parse(text: &str) -> Result<Selector, SelectorError> {
        grammar::parse(text)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Selector::parse(text)
    }
}
