//! Parser combinators that build queryable syntax trees.
//!
//! Grammars are assembled in code from a handful of combinators (sequence,
//! ordered choice, repetition, optionality) over leaf parsers that match
//! regular expressions at a [`Scanner`] cursor. Two flavours are available:
//!
//! - the raw engine ([`sequence`], [`ordered_choice`], ...) where every
//!   combinator hands its sub-results to a [`Nodify`] callback and the values
//!   can be anything (the expression evaluator folds integers this way);
//! - the [`Ast`] builder, whose combinators are named, allocate grouping nodes
//!   from a bounded pool and produce a tree of [`Node`]s that can be rendered,
//!   exported as a graph and searched with CSS-like selectors.
//!
//! ```
//! use quarry::{Ast, Scanner, parsers, terminals};
//!
//! let mut ast = Ast::new("words", 16);
//! let word = terminals::token(r"[a-z]+", "WORD").unwrap();
//! let comma = terminals::atom(",", "COMMA");
//! let list = ast.one_or_more("list", None, parsers![word, comma]).unwrap();
//!
//! let (root, rest) = ast.parse_with(&list, Scanner::new("one, two, three"));
//! assert_eq!(root.unwrap().value(), "onetwothree");
//! assert!(rest.at_end());
//!
//! let words: Vec<String> = ast.query("WORD:last-child").unwrap().map(|n| n.value().into_owned()).collect();
//! assert_eq!(words, vec!["three"]);
//! ```

use std::borrow::Cow;

#[macro_use]
mod macros;
mod engine;
mod error;
mod render;
mod scanner;

pub mod grammars;
pub mod selector;
pub mod terminals;

pub use engine::{
    Ast, Nodify, ParseMetrics, Parser, ParserRef, PoolStats, Trace, Transform, one_or_more, optional, ordered_choice,
    repeat_until, sequence, zero_or_more,
};
pub use error::{GrammarError, SelectorError};
pub use scanner::Scanner;
pub use selector::{Matches, Selector};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
    pub use regex::Regex;
}

// --- Attributes ---------------------------------------------------------------

/// Ordered multimap of node attributes.
///
/// Every key keeps the values in the order they were appended; writing the
/// same key twice adds a second value rather than replacing the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, Vec<String>)>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes { entries: Vec::new() }
    }

    /// Values recorded for `key`, oldest first. Empty if the key is unknown.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, vs)| vs.as_slice()).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Append `value` to the values of `key`.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.into()),
            None => self.entries.push((key.to_string(), vec![value.into()])),
        }
    }

    /// Keys in first-insertion order with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, vs)| (k.as_str(), vs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// --- Syntax tree --------------------------------------------------------------

/// Terminal node: the text matched by a leaf parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Token type, e.g. `"INT"`.
    pub name: String,
    /// Matched text.
    pub value: String,
    /// Byte offset of the match in the input.
    pub position: usize,
    pub attributes: Attributes,
}

impl Leaf {
    /// Create a leaf tagged with `class=term`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, position: usize) -> Self {
        let mut attributes = Attributes::new();
        attributes.append("class", "term");
        Leaf { name: name.into(), value: value.into(), position, attributes }
    }
}

/// Non-terminal node owning an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    pub name: String,
    pub children: Vec<Node>,
    pub attributes: Attributes,
}

impl Grouping {
    /// Create an empty grouping tagged with `class=nonterm`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_children(name, Vec::new())
    }

    pub fn with_children(name: impl Into<String>, children: Vec<Node>) -> Self {
        let mut attributes = Attributes::new();
        attributes.append("class", "nonterm");
        Grouping { name: name.into(), children, attributes }
    }
}

/// Node of a syntax tree.
///
/// `Absent` is what an optional element yields when it did not match: it has
/// no position, no text, no children and ignores attribute writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    Grouping(Grouping),
    Absent,
}

impl Node {
    pub const ABSENT_NAME: &'static str = "missing";

    pub fn leaf(name: impl Into<String>, value: impl Into<String>, position: usize) -> Self {
        Node::Leaf(Leaf::new(name, value, position))
    }

    pub fn grouping(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Grouping(Grouping::with_children(name, children))
    }

    pub fn name(&self) -> &str {
        match self {
            Node::Leaf(leaf) => &leaf.name,
            Node::Grouping(group) => &group.name,
            Node::Absent => Self::ABSENT_NAME,
        }
    }

    /// True for leaves and for `Absent`.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Node::Grouping(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }

    /// Matched text. For a grouping this is the concatenation of every leaf
    /// below it, left to right.
    pub fn value(&self) -> Cow<'_, str> {
        match self {
            Node::Leaf(leaf) => Cow::Borrowed(&leaf.value),
            Node::Grouping(_) => {
                let mut out = String::new();
                self.collect_value(&mut out);
                Cow::Owned(out)
            }
            Node::Absent => Cow::Borrowed(""),
        }
    }

    fn collect_value(&self, out: &mut String) {
        match self {
            Node::Leaf(leaf) => out.push_str(&leaf.value),
            Node::Grouping(group) => group.children.iter().for_each(|c| c.collect_value(out)),
            Node::Absent => {}
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Grouping(group) => &group.children,
            _ => &[],
        }
    }

    /// Offset of the first leaf in the input, `None` for `Absent` and for
    /// groupings without any positioned leaf.
    pub fn position(&self) -> Option<usize> {
        match self {
            Node::Leaf(leaf) => Some(leaf.position),
            Node::Grouping(group) => group.children.iter().find_map(Node::position),
            Node::Absent => None,
        }
    }

    /// Values recorded for attribute `key`.
    pub fn attribute(&self, key: &str) -> &[String] {
        self.attributes().map(|attrs| attrs.get(key)).unwrap_or(&[])
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Node::Leaf(leaf) => Some(&leaf.attributes),
            Node::Grouping(group) => Some(&group.attributes),
            Node::Absent => None,
        }
    }

    /// Append `value` to attribute `key`. A no-op on `Absent`.
    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        match self {
            Node::Leaf(leaf) => leaf.attributes.append(key, value),
            Node::Grouping(group) => group.attributes.append(key, value),
            Node::Absent => {}
        }
        self
    }

    /// Consume a grouping and hand back its children; leaves and `Absent`
    /// yield nothing.
    pub fn into_children(self) -> Vec<Node> {
        match self {
            Node::Grouping(group) => group.children,
            _ => Vec::new(),
        }
    }
}

// --- Raw parser values --------------------------------------------------------

/// What a parser yields.
///
/// Leaf parsers and the [`Ast`] combinators always produce `Value::Node`.
/// Raw combinators without a callback aggregate their sub-results into
/// `Value::List`; callbacks are free to return any variant, which is how a
/// grammar computes a result while it parses.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Node(Node),
    List(Vec<Value>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// The node inside, or the value itself when it is something else.
    pub fn into_node(self) -> Result<Node, Value> {
        match self {
            Value::Node(node) => Ok(node),
            other => Err(other),
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Shorthand for the name of a `Value::Node`.
    pub fn node_name(&self) -> Option<&str> {
        self.as_node().map(Node::name)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_and_grouping_are_tagged() {
        let leaf = Node::leaf("INT", "10", 3);
        assert_eq!(leaf.attribute("class"), ["term"]);
        assert_eq!(leaf.position(), Some(3));
        assert!(leaf.is_leaf());

        let group = Node::grouping("sum", vec![Node::leaf("INT", "1", 0), Node::Absent, Node::leaf("INT", "2", 2)]);
        assert_eq!(group.attribute("class"), ["nonterm"]);
        assert_eq!(group.value(), "12");
        assert_eq!(group.position(), Some(0));
        assert!(!group.is_leaf());
    }

    #[test]
    fn attributes_keep_append_order() {
        let mut node = Node::leaf("TAG", "a", 0);
        node.set_attribute("class", "x").set_attribute("id", "main").set_attribute("class", "y");
        assert_eq!(node.attribute("class"), ["term", "x", "y"]);
        assert_eq!(node.attribute("id"), ["main"]);
        let keys: Vec<&str> = node.attributes().unwrap().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["class", "id"]);
    }

    #[test]
    fn absent_ignores_attributes() {
        let mut node = Node::Absent;
        node.set_attribute("class", "term");
        assert!(node.attribute("class").is_empty());
        assert_eq!(node.name(), "missing");
        assert_eq!(node.position(), None);
        assert_eq!(node.value(), "");
        assert!(node.is_leaf());
    }
}
