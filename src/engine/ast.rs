//! AST builder.
//!
//! [`Ast`] offers named variants of the raw combinators that assemble a tree
//! of [`Node`]s while parsing:
//!
//! - `sequence`, `zero_or_more`, `one_or_more` and `repeat_until` wrap their
//!   sub-results in a [`Grouping`] called after the combinator;
//! - `ordered_choice` and `optional` pass the matched node through unchanged
//!   (an `optional` miss becomes [`Node::Absent`]).
//!
//! Groupings come from a bounded pool owned by the builder. Whatever a failed
//! combinator already built is retired to the pool before it backtracks, and
//! [`Ast::reset`] retires the whole retained tree, so a builder reused for
//! many parses stops allocating groupings once the pool is warm.
//!
//! Every builder combinator also accepts an optional [`Transform`], called
//! with the combinator's name, the scanner after the match and the node it is
//! about to yield. The transform may rewrite or replace the node, or reject
//! the match; a grouping handed back on rejection goes to the pool.

use super::combinators::{check_arity, repeat_loop, split_repeat};
use super::metrics::ParseMetrics;
use super::pool::NodePool;
use super::{Parser, PoolStats};
use crate::selector::{Matches, Selector};
use crate::{GrammarError, Grouping, Node, Scanner, SelectorError, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

bitflags::bitflags! {
    /// Debug trace categories of a builder.
    ///
    /// Events are emitted through `tracing` under the `quarry::ast` target and
    /// still need a subscriber that lets them through.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Trace: u8 {
        /// One event per sub-parser attempt and per combinator outcome.
        const COMBINATORS = 1 << 0;
        /// Grouping pool traffic.
        const POOL        = 1 << 1;
        /// Selector queries and their match counts.
        const QUERY       = 1 << 2;
    }
}

impl Trace {
    /// `COMBINATORS` when `QUARRY_DEBUG_COMBINATORS` is set to anything but
    /// `0` or the empty string.
    pub fn from_env() -> Trace {
        match std::env::var_os("QUARRY_DEBUG_COMBINATORS") {
            Some(v) if !v.is_empty() && v != "0" => Trace::COMBINATORS,
            _ => Trace::empty(),
        }
    }
}

type TransformFn = dyn Fn(&str, &Scanner, Node) -> Result<Node, Node>;

/// Callback of the builder combinators: `(name, scanner after match, node)`.
///
/// Groupings handed back on rejection return to the pool; a node the
/// callback keeps, or drops, does not.
#[derive(Clone)]
pub struct Transform(Rc<TransformFn>);

impl Transform {
    /// Rewrite or replace the node; `None` rejects the match.
    pub fn new(f: impl Fn(&str, &Scanner, Node) -> Option<Node> + 'static) -> Self {
        Transform(Rc::new(move |name: &str, s: &Scanner, node: Node| f(name, s, node).ok_or(Node::Absent)))
    }

    /// Like [`new`](Self::new), returning the node as `Err` to reject it.
    pub fn try_new(f: impl Fn(&str, &Scanner, Node) -> Result<Node, Node> + 'static) -> Self {
        Transform(Rc::new(f))
    }

    /// Keep the node unchanged when `pred` holds, reject it otherwise.
    pub fn filter(pred: impl Fn(&str, &Scanner, &Node) -> bool + 'static) -> Self {
        Transform(Rc::new(move |name: &str, s: &Scanner, node: Node| {
            if pred(name, s, &node) { Ok(node) } else { Err(node) }
        }))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform")
    }
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Matched,
    Missed,
    Rejected,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Matched => "true",
            Outcome::Missed => "false",
            Outcome::Rejected => "skip",
        })
    }
}

// --- Shared builder state ---------------------------------------------------

/// State reachable from every parser a builder hands out.
#[derive(Debug)]
struct Shared {
    pool: RefCell<NodePool>,
    trace: Cell<Trace>,
}

impl Shared {
    fn take(&self, name: &str) -> Grouping {
        let mut pool = self.pool.borrow_mut();
        let group = pool.take(name);
        if self.trace.get().contains(Trace::POOL) {
            tracing::trace!(target: "quarry::ast", name, free = pool.len(), "take grouping");
        }
        group
    }

    fn retire(&self, group: Grouping) {
        let mut pool = self.pool.borrow_mut();
        pool.retire_grouping(group);
        if self.trace.get().contains(Trace::POOL) {
            tracing::trace!(target: "quarry::ast", free = pool.len(), "retire grouping");
        }
    }

    /// Log one step of combinator `kind`. `index` is the 1-based sub-parser,
    /// 0 for the combinator as a whole.
    fn step(&self, kind: &'static str, name: &str, index: usize, s: &Scanner, outcome: Outcome) {
        if self.trace.get().contains(Trace::COMBINATORS) {
            tracing::debug!(
                target: "quarry::ast",
                parser = index,
                line = s.lineno(),
                offset = s.cursor(),
                matched = %outcome,
                "{kind}({name})"
            );
        }
    }

    /// Run `transform`, retiring whatever it rejects.
    fn transform(&self, transform: Option<&Transform>, name: &str, s: &Scanner, node: Node) -> Option<Node> {
        let Some(Transform(f)) = transform else { return Some(node) };
        match f(name, s, node) {
            Ok(node) => Some(node),
            Err(Node::Grouping(group)) => {
                self.retire(group);
                None
            }
            Err(_) => None,
        }
    }
}

fn expect_node(value: Value, combinator: &'static str, name: &str, index: usize) -> Node {
    match value.into_node() {
        Ok(node) => node,
        Err(_) => panic!("{}", GrammarError::NotANode { combinator, name: name.to_string(), index }),
    }
}

// --- Builder ----------------------------------------------------------------

/// Tree-building parser factory and holder of the last parse result.
pub struct Ast {
    name: String,
    shared: Rc<Shared>,
    root: Option<Node>,
}

impl Ast {
    /// A builder whose grouping pool holds at most `max_nodes` entries.
    ///
    /// Combinator tracing starts enabled when `QUARRY_DEBUG_COMBINATORS` is
    /// set (see [`Trace::from_env`]).
    pub fn new(name: &str, max_nodes: usize) -> Self {
        let shared = Shared { pool: RefCell::new(NodePool::new(max_nodes)), trace: Cell::new(Trace::from_env()) };
        Ast { name: name.to_string(), shared: Rc::new(shared), root: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Turn on combinator tracing.
    pub fn set_debug(&mut self) -> &mut Self {
        self.shared.trace.set(self.shared.trace.get() | Trace::COMBINATORS);
        self
    }

    /// Replace the trace categories. Applies to parsers already built too.
    pub fn set_trace(&mut self, trace: Trace) -> &mut Self {
        self.shared.trace.set(trace);
        self
    }

    pub fn trace(&self) -> Trace {
        self.shared.trace.get()
    }

    // --- Lifecycle ----------------------------------------------------------

    /// Run `root` over `scanner` and keep the resulting tree.
    ///
    /// A tree retained from an earlier parse is dropped (not pooled); call
    /// [`reset`](Self::reset) first to recycle it.
    pub fn parse_with(&mut self, root: &Parser, scanner: Scanner) -> (Option<&Node>, Scanner) {
        self.root = None;
        let (value, news) = root.parse(scanner);
        self.root = value.map(|v| expect_node(v, "parse_with", &self.name, 0));
        (self.root.as_ref(), news)
    }

    /// [`parse_with`](Self::parse_with), also reporting time spent and pool
    /// traffic.
    pub fn parse_with_metrics(&mut self, root: &Parser, scanner: Scanner) -> (Option<&Node>, Scanner, ParseMetrics) {
        let before = self.pool_stats();
        let start_at = scanner.cursor();
        let started = Instant::now();
        self.root = None;
        let (value, news) = root.parse(scanner);
        let duration = started.elapsed();
        self.root = value.map(|v| expect_node(v, "parse_with", &self.name, 0));
        let metrics = ParseMetrics {
            duration,
            matched: self.root.is_some(),
            consumed: news.cursor().saturating_sub(start_at),
            pool: self.pool_stats() - before,
        };
        (self.root.as_ref(), news, metrics)
    }

    /// The tree kept from the last successful parse.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Retire every grouping of the retained tree to the pool and forget it.
    pub fn reset(&mut self) -> &mut Self {
        if let Some(root) = self.root.take() {
            self.shared.pool.borrow_mut().retire(root);
        }
        self
    }

    /// Indented dump of the retained tree; empty without one.
    pub fn render(&self) -> String {
        self.root.as_ref().map(crate::render::render).unwrap_or_default()
    }

    /// Graphviz `dot` text for the retained tree.
    pub fn export_graph(&self, name: &str) -> String {
        crate::render::graph(name, self.root.as_ref())
    }

    /// Run a selector against the retained tree.
    pub fn query(&self, selector: &str) -> Result<Matches<'_>, SelectorError> {
        let parsed = Selector::parse(selector)?;
        let matches = match self.root.as_ref() {
            Some(root) => parsed.select(root),
            None => Matches::default(),
        };
        if self.trace().contains(Trace::QUERY) {
            tracing::debug!(target: "quarry::ast", selector, matches = matches.len(), "query");
        }
        Ok(matches)
    }

    pub fn pool_len(&self) -> usize {
        self.shared.pool.borrow().len()
    }

    pub fn pool_capacity(&self) -> usize {
        self.shared.pool.borrow().capacity()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.shared.pool.borrow().stats()
    }

    // --- Combinators --------------------------------------------------------

    /// All of `parsers` in order, children of one grouping called `name`.
    pub fn sequence(
        &self, name: &str, transform: Option<Transform>, parsers: Vec<Parser>,
    ) -> Result<Parser, GrammarError> {
        check_arity("sequence", name, parsers.len(), 1..=usize::MAX, "at least 1")?;
        let (shared, name) = (self.shared.clone(), name.to_string());
        Ok(Parser::new(move |s: Scanner| {
            let mut group = shared.take(&name);
            let mut news = s.clone();
            for (i, parser) in parsers.iter().enumerate() {
                match parser.parse(news) {
                    (Some(value), next) => {
                        shared.step("sequence", &name, i + 1, &next, Outcome::Matched);
                        group.children.push(expect_node(value, "sequence", &name, i + 1));
                        news = next;
                    }
                    (None, _) => {
                        shared.retire(group);
                        shared.step("sequence", &name, i + 1, &s, Outcome::Missed);
                        return (None, s);
                    }
                }
            }
            match shared.transform(transform.as_ref(), &name, &news, Node::Grouping(group)) {
                Some(node) => {
                    shared.step("sequence", &name, 0, &news, Outcome::Matched);
                    (Some(Value::Node(node)), news)
                }
                None => {
                    shared.step("sequence", &name, 0, &s, Outcome::Rejected);
                    (None, s)
                }
            }
        }))
    }

    /// First of `parsers` that matches; its node is yielded as is.
    ///
    /// A transform that rejects the winning node fails the whole choice, the
    /// remaining alternatives are not tried.
    pub fn ordered_choice(
        &self, name: &str, transform: Option<Transform>, parsers: Vec<Parser>,
    ) -> Result<Parser, GrammarError> {
        check_arity("ordered_choice", name, parsers.len(), 1..=usize::MAX, "at least 1")?;
        let (shared, name) = (self.shared.clone(), name.to_string());
        Ok(Parser::new(move |s: Scanner| {
            for (i, parser) in parsers.iter().enumerate() {
                if let (Some(value), news) = parser.parse(s.clone()) {
                    let node = expect_node(value, "ordered_choice", &name, i + 1);
                    return match shared.transform(transform.as_ref(), &name, &news, node) {
                        Some(node) => {
                            shared.step("ordered_choice", &name, i + 1, &news, Outcome::Matched);
                            (Some(Value::Node(node)), news)
                        }
                        None => {
                            shared.step("ordered_choice", &name, i + 1, &s, Outcome::Rejected);
                            (None, s)
                        }
                    };
                }
            }
            shared.step("ordered_choice", &name, 0, &s, Outcome::Missed);
            (None, s)
        }))
    }

    /// `op (sep op)*`, possibly empty. `parsers` is `[op]` or `[op, sep]`;
    /// separators are not kept in the tree.
    pub fn zero_or_more(
        &self, name: &str, transform: Option<Transform>, parsers: Vec<Parser>,
    ) -> Result<Parser, GrammarError> {
        check_arity("zero_or_more", name, parsers.len(), 1..=2, "1 or 2")?;
        Ok(self.repetition("zero_or_more", name, transform, parsers, false, 0))
    }

    /// `op (sep op)*`, at least once. `parsers` is `[op]` or `[op, sep]`.
    pub fn one_or_more(
        &self, name: &str, transform: Option<Transform>, parsers: Vec<Parser>,
    ) -> Result<Parser, GrammarError> {
        check_arity("one_or_more", name, parsers.len(), 1..=2, "1 or 2")?;
        Ok(self.repetition("one_or_more", name, transform, parsers, false, 1))
    }

    /// Like [`one_or_more`](Self::one_or_more), stopping where `until` would
    /// match. `parsers` is `[op, until]` or `[op, sep, until]`.
    pub fn repeat_until(
        &self, name: &str, transform: Option<Transform>, parsers: Vec<Parser>,
    ) -> Result<Parser, GrammarError> {
        check_arity("repeat_until", name, parsers.len(), 2..=3, "2 or 3")?;
        Ok(self.repetition("repeat_until", name, transform, parsers, true, 1))
    }

    fn repetition(
        &self, kind: &'static str, name: &str, transform: Option<Transform>, parsers: Vec<Parser>, with_until: bool,
        min: usize,
    ) -> Parser {
        let (op, sep, until) = split_repeat(parsers, with_until);
        let (shared, name) = (self.shared.clone(), name.to_string());
        Parser::new(move |s: Scanner| {
            let mut group = shared.take(&name);
            let (count, news) = repeat_loop(&op, sep.as_ref(), until.as_ref(), &s, |value| {
                let index = group.children.len() + 1;
                group.children.push(expect_node(value, kind, &name, index));
                true
            });
            if count < min {
                shared.retire(group);
                shared.step(kind, &name, 0, &s, Outcome::Missed);
                return (None, s);
            }
            match shared.transform(transform.as_ref(), &name, &news, Node::Grouping(group)) {
                Some(node) => {
                    shared.step(kind, &name, 0, &news, Outcome::Matched);
                    (Some(Value::Node(node)), news)
                }
                None => {
                    shared.step(kind, &name, 0, &s, Outcome::Rejected);
                    (None, s)
                }
            }
        })
    }

    /// `parser` or nothing. Never fails: a miss, or a match the transform
    /// rejects, yields [`Node::Absent`] and consumes nothing.
    pub fn optional(&self, name: &str, transform: Option<Transform>, parser: Parser) -> Parser {
        let (shared, name) = (self.shared.clone(), name.to_string());
        Parser::new(move |s: Scanner| {
            if let (Some(value), news) = parser.parse(s.clone()) {
                let node = expect_node(value, "optional", &name, 1);
                if let Some(node) = shared.transform(transform.as_ref(), &name, &news, node) {
                    shared.step("optional", &name, 1, &news, Outcome::Matched);
                    return (Some(Value::Node(node)), news);
                }
                shared.step("optional", &name, 1, &s, Outcome::Rejected);
            } else {
                shared.step("optional", &name, 1, &s, Outcome::Missed);
            }
            (Some(Value::Node(Node::Absent)), s)
        })
    }
}

impl fmt::Debug for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ast")
            .field("name", &self.name)
            .field("pool", &self.shared.pool.borrow())
            .field("trace", &self.shared.trace.get())
            .field("root", &self.root.as_ref().map(Node::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminals::{atom, int, token};

    fn sum(ast: &Ast) -> Parser {
        let plus = atom("+", "PLUS");
        ast.sequence("sum", None, parsers![int(), plus, int()]).unwrap()
    }

    #[test]
    fn sequence_builds_a_grouping() {
        let mut ast = Ast::new("test", 8);
        let p = sum(&ast);
        let (root, rest) = ast.parse_with(&p, Scanner::new("1 + 2"));
        let root = root.unwrap();
        assert_eq!(root.name(), "sum");
        assert_eq!(root.value(), "1+2");
        let names: Vec<&str> = root.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["INT", "PLUS", "INT"]);
        assert!(rest.at_end());
    }

    #[test]
    fn failed_sequence_retires_its_grouping() {
        let mut ast = Ast::new("test", 8);
        let p = sum(&ast);
        let (root, rest) = ast.parse_with(&p, Scanner::new("1 + x"));
        assert!(root.is_none());
        assert_eq!(rest.cursor(), 0);
        assert_eq!(ast.pool_len(), 1);
        assert_eq!(ast.pool_stats().retired, 1);
    }

    #[test]
    fn choice_and_optional_pass_nodes_through() {
        let mut ast = Ast::new("test", 8);
        let choice = ast.ordered_choice("value", None, parsers![atom("x", "X"), int()]).unwrap();
        let maybe = ast.optional("sign", None, atom("-", "MINUS"));
        let p = ast.sequence("item", None, parsers![maybe, choice]).unwrap();

        let (root, _) = ast.parse_with(&p, Scanner::new("42"));
        let names: Vec<&str> = root.unwrap().children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["missing", "INT"]);

        let (root, _) = ast.parse_with(&p, Scanner::new("-x"));
        let names: Vec<&str> = root.unwrap().children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["MINUS", "X"]);
    }

    #[test]
    fn transform_rejection_is_a_failure() {
        let mut ast = Ast::new("test", 8);
        let even = Transform::new(|_, _, node| {
            let n: i64 = node.value().parse().ok()?;
            (n % 2 == 0).then_some(node)
        });
        let even = ast.ordered_choice("even", Some(even), parsers![int()]).unwrap();
        let p = ast.one_or_more("evens", None, parsers![even]).unwrap();
        let (root, rest) = ast.parse_with(&p, Scanner::new("2 4 5 6"));
        assert_eq!(root.unwrap().children().len(), 2);
        assert_eq!(rest.cursor(), 3);

        let odd = ast.optional("odd", Some(Transform::new(|_, _, _| None)), int());
        let (root, rest) = ast.parse_with(&odd, Scanner::new("5"));
        assert!(root.unwrap().is_absent());
        assert_eq!(rest.cursor(), 0);
    }

    #[test]
    fn rejected_groupings_return_to_the_pool() {
        let mut ast = Ast::new("test", 8);
        let long = Transform::filter(|_, _, node| node.children().len() > 2);
        let p = ast.one_or_more("ints", Some(long), parsers![int()]).unwrap();
        let (root, rest) = ast.parse_with(&p, Scanner::new("1 2"));
        assert!(root.is_none());
        assert_eq!(rest.cursor(), 0);
        assert_eq!(ast.pool_len(), 1);
        assert_eq!(ast.pool_stats().retired, 1);

        let odd = Transform::try_new(|_, _, node| if node.value().ends_with('1') { Ok(node) } else { Err(node) });
        let p = ast.sequence("pair", Some(odd), parsers![int(), int()]).unwrap();
        let (root, _) = ast.parse_with(&p, Scanner::new("3 4"));
        assert!(root.is_none());
        let stats = ast.pool_stats();
        assert_eq!((stats.reused, stats.retired), (1, 2));
        assert_eq!(ast.pool_len(), 1);
    }

    #[test]
    fn recursive_grammars_release_the_pool() {
        let builders: [fn(&Ast) -> Result<Parser, GrammarError>; 2] =
            [crate::grammars::html::grammar, crate::grammars::json::grammar];
        for (build, text) in builders.into_iter().zip(["<a><b></b><em></em></a>", r#"{"a":[1,{"b":null}]}"#]) {
            let mut ast = Ast::new("recursive", 16);
            let root = build(&ast).unwrap();
            let (node, rest) = ast.parse_with(&root, Scanner::new(text));
            assert!(node.is_some() && rest.at_end(), "{text}");
            ast.reset();
            assert!(ast.pool_len() > 0);

            let shared = Rc::downgrade(&ast.shared);
            drop(root);
            drop(ast);
            assert!(shared.upgrade().is_none(), "{text}: builder state outlived the builder");
        }
    }

    #[test]
    fn transform_sees_name_and_position() {
        let mut ast = Ast::new("test", 8);
        let tag = Transform::new(|name, s, mut node| {
            node.set_attribute("rule", name).set_attribute("end", s.cursor().to_string());
            Some(node)
        });
        let p = ast.zero_or_more("ints", Some(tag), parsers![int()]).unwrap();
        let (root, _) = ast.parse_with(&p, Scanner::new("1 22"));
        let root = root.unwrap();
        assert_eq!(root.attribute("rule"), ["ints"]);
        assert_eq!(root.attribute("end"), ["4"]);
        assert_eq!(root.attribute("class"), ["nonterm"]);
    }

    #[test]
    fn zero_or_more_accepts_empty_input() {
        let mut ast = Ast::new("test", 8);
        let p = ast.zero_or_more("ints", None, parsers![int(), atom(",", "COMMA")]).unwrap();
        let (root, rest) = ast.parse_with(&p, Scanner::new(""));
        assert!(root.unwrap().children().is_empty());
        assert_eq!(rest.cursor(), 0);

        let (root, rest) = ast.parse_with(&p, Scanner::new("1,2,"));
        let names: Vec<&str> = root.unwrap().children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["INT", "INT"]);
        assert_eq!(rest.cursor(), 3);
    }

    #[test]
    fn repeat_until_leaves_the_terminator() {
        let mut ast = Ast::new("test", 8);
        let word = token("[a-z]+", "W").unwrap();
        let p = ast.repeat_until("words", None, parsers![word, atom(".", "DOT")]).unwrap();
        let (root, rest) = ast.parse_with(&p, Scanner::new("a b. c"));
        assert_eq!(root.unwrap().value(), "ab");
        assert_eq!(rest.remaining(), ". c");
    }

    #[test]
    fn reset_recycles_the_tree() {
        let mut ast = Ast::new("test", 4);
        let inner = ast.one_or_more("ints", None, parsers![int()]).unwrap();
        let p = ast.sequence("outer", None, parsers![atom("(", "OPEN"), inner, atom(")", "CLOSE")]).unwrap();

        ast.parse_with(&p, Scanner::new("(1 2)"));
        assert_eq!(ast.pool_stats().allocated, 2);
        ast.reset();
        assert!(ast.root().is_none());
        assert_eq!(ast.pool_len(), 2);

        let (root, _) = ast.parse_with(&p, Scanner::new("(3)"));
        assert_eq!(root.unwrap().value(), "(3)");
        let stats = ast.pool_stats();
        assert_eq!((stats.allocated, stats.reused), (2, 2));
        assert_eq!(ast.pool_len(), 0);
    }

    #[test]
    fn pool_never_exceeds_capacity() {
        let mut ast = Ast::new("test", 2);
        let pair = ast.sequence("pair", None, parsers![int(), int()]).unwrap();
        let p = ast.zero_or_more("pairs", None, parsers![pair]).unwrap();
        for _ in 0..3 {
            ast.parse_with(&p, Scanner::new("1 2 3 4 5 6"));
            ast.reset();
            assert!(ast.pool_len() <= ast.pool_capacity());
        }
        assert!(ast.pool_stats().dropped > 0);
    }

    #[test]
    fn metrics_report_pool_traffic() {
        let mut ast = Ast::new("test", 4);
        let p = sum(&ast);
        let (_, _, metrics) = ast.parse_with_metrics(&p, Scanner::new("3+4 rest"));
        assert!(metrics.matched);
        assert_eq!(metrics.consumed, 3);
        assert_eq!(metrics.pool.allocated, 1);
    }

    #[test]
    fn builder_arity_errors_carry_the_name() {
        let ast = Ast::new("test", 4);
        match ast.repeat_until("body", None, parsers![int()]) {
            Err(GrammarError::Arity { combinator, name, got, .. }) => {
                assert_eq!((combinator, name.as_str(), got), ("repeat_until", "body", 1));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "non-node value")]
    fn raw_values_inside_the_builder_panic() {
        let mut ast = Ast::new("test", 4);
        let raw = crate::sequence(None, vec![int()]).unwrap();
        let p = ast.sequence("wrap", None, parsers![raw]).unwrap();
        ast.parse_with(&p, Scanner::new("1"));
    }

    #[test]
    fn trace_flags() {
        let mut ast = Ast::new("test", 4);
        ast.set_trace(Trace::QUERY);
        ast.set_debug();
        assert_eq!(ast.trace(), Trace::QUERY | Trace::COMBINATORS);
    }
}
