//! Compiled selector and the per-node predicates.

use crate::Node;
use regex::Regex;

/// A compiled selector: comma-separated chains, any of which may match.
#[derive(Debug, Clone)]
pub struct Selector {
    pub groups: Vec<Chain>,
}

/// Terms joined by combinators, e.g. `tagstart + elements > TAG`.
#[derive(Debug, Clone)]
pub struct Chain {
    pub terms: Vec<Term>,
}

/// How a term relates to the term before it in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Whitespace: anywhere below. Also used for the first term.
    #[default]
    Descendant,
    /// `>`: a direct child.
    Child,
    /// `+`: the immediately following sibling.
    Next,
    /// `~`: a later sibling.
    After,
}

impl Combinator {
    pub fn is_sibling(self) -> bool {
        matches!(self, Combinator::Next | Combinator::After)
    }

    pub(crate) fn from_op(op: &str) -> Option<Self> {
        match op {
            "" => Some(Combinator::Descendant),
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::Next),
            "~" => Some(Combinator::After),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `=`
    Equals,
    /// `~=`, substring.
    Contains,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`, regular expression search.
    Matches,
}

impl AttrOp {
    pub(crate) fn from_op(op: &str) -> Option<Self> {
        match op {
            "=" => Some(AttrOp::Equals),
            "~=" => Some(AttrOp::Contains),
            "^=" => Some(AttrOp::Prefix),
            "$=" => Some(AttrOp::Suffix),
            "*=" => Some(AttrOp::Matches),
            _ => None,
        }
    }
}

/// `[key]` or `[key OP value]`.
///
/// The key `value` stands for the node's text rather than an attribute.
#[derive(Debug, Clone)]
pub struct AttrPredicate {
    pub key: String,
    pub test: Option<(AttrOp, String)>,
    /// Compiled form of the value when the op is [`AttrOp::Matches`].
    pub(crate) regex: Option<Regex>,
}

impl AttrPredicate {
    pub fn exists(key: &str) -> Self {
        AttrPredicate { key: key.to_string(), test: None, regex: None }
    }

    pub fn new(key: &str, op: AttrOp, value: &str) -> Result<Self, regex::Error> {
        let regex = if op == AttrOp::Matches { Some(Regex::new(value)?) } else { None };
        Ok(AttrPredicate { key: key.to_string(), test: Some((op, value.to_string())), regex })
    }

    fn check(&self, op: AttrOp, candidate: &str, value: &str) -> bool {
        match op {
            AttrOp::Equals => candidate == value,
            AttrOp::Contains => candidate.contains(value),
            AttrOp::Prefix => candidate.starts_with(value),
            AttrOp::Suffix => candidate.ends_with(value),
            AttrOp::Matches => self.regex.as_ref().is_some_and(|re| re.is_match(candidate)),
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        if self.key == "value" {
            let text = node.value();
            return match &self.test {
                None => !text.is_empty(),
                Some((op, value)) => self.check(*op, &text, value),
            };
        }
        let Some(attrs) = node.attributes() else { return false };
        if !attrs.contains_key(&self.key) {
            return false;
        }
        match &self.test {
            None => true,
            Some((op, value)) => attrs.get(&self.key).iter().any(|candidate| self.check(*op, candidate, value)),
        }
    }
}

/// Structural pseudo-classes. `nth-*` arguments are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pseudo {
    Empty,
    FirstChild,
    LastChild,
    FirstOfType,
    LastOfType,
    NthChild(usize),
    NthLastChild(usize),
    NthOfType(usize),
    NthLastOfType(usize),
    OnlyChild,
    OnlyOfType,
}

impl Pseudo {
    /// Evaluate against `node`, child `index` of `parent`. At the root
    /// (`parent` is `None`) everything but `:empty` holds.
    pub fn matches(self, parent: Option<&Node>, index: usize, node: &Node) -> bool {
        let Some(parent) = parent else {
            return self != Pseudo::Empty || node.children().is_empty();
        };
        let siblings = parent.children();
        if index >= siblings.len() {
            return false;
        }
        let last = siblings.len().saturating_sub(1);
        let same = |s: &[Node]| s.iter().filter(|n| n.name() == node.name()).count();
        let (before, after) = (&siblings[..index], &siblings[index + 1..]);
        match self {
            Pseudo::Empty => node.children().is_empty(),
            Pseudo::FirstChild => index == 0,
            Pseudo::LastChild => index == last,
            Pseudo::FirstOfType => same(before) == 0,
            Pseudo::LastOfType => same(after) == 0,
            Pseudo::NthChild(n) => index == n,
            Pseudo::NthLastChild(n) => last - index == n,
            Pseudo::NthOfType(n) => same(before) == n,
            Pseudo::NthLastOfType(n) => same(after) == n,
            Pseudo::OnlyChild => siblings.len() == 1,
            Pseudo::OnlyOfType => same(siblings) == 1,
        }
    }
}

/// One link of a chain.
#[derive(Debug, Clone, Default)]
pub struct Term {
    /// Node name, compared case-insensitively; `None` or `*` match any.
    pub name: Option<String>,
    pub attrs: Vec<AttrPredicate>,
    pub pseudo: Option<Pseudo>,
    pub combinator: Combinator,
}

impl Term {
    pub fn matches(&self, parent: Option<&Node>, index: usize, node: &Node) -> bool {
        let name_ok = match self.name.as_deref() {
            None | Some("*") => true,
            Some(name) => node.name().eq_ignore_ascii_case(name),
        };
        name_ok
            && self.attrs.iter().all(|attr| attr.matches(node))
            && self.pseudo.is_none_or(|pseudo| pseudo.matches(parent, index, node))
    }
}
