//! Raw combinators.
//!
//! A [`Parser`] is a shared, immutable function from a scanner to an optional
//! value plus the scanner to continue from. On failure a parser hands back the
//! scanner it was given, so backtracking is just "keep the old snapshot".
//!
//! The combinators in this file aggregate sub-results without building a
//! tree. When a [`Nodify`] callback is supplied it receives the ordered
//! sub-results and decides what the combinator yields; returning `None`
//! rejects the match, which then fails at the original position.

use crate::{GrammarError, Node, Scanner, Value};
use once_cell::unsync::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

type ParseFn = dyn Fn(Scanner) -> (Option<Value>, Scanner);

/// A parser: `Scanner -> (Option<Value>, Scanner)`.
///
/// Cloning shares the underlying function. Parsers hold no per-parse state,
/// so one grammar can be applied any number of times.
#[derive(Clone)]
pub struct Parser(Rc<ParseFn>);

impl Parser {
    pub fn new(f: impl Fn(Scanner) -> (Option<Value>, Scanner) + 'static) -> Self {
        Parser(Rc::new(f))
    }

    pub fn parse(&self, s: Scanner) -> (Option<Value>, Scanner) {
        (self.0)(s)
    }

    /// This parser, also keeping the rules behind `refs` alive for as long
    /// as it exists. A recursive grammar hands out its root this way.
    pub fn owning(self, refs: &[&ParserRef]) -> Parser {
        let cells: Vec<Rc<OnceCell<Parser>>> = refs.iter().map(|r| r.cell.clone()).collect();
        Parser::new(move |s| {
            let _owned = &cells;
            self.parse(s)
        })
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Parser")
    }
}

impl From<&Parser> for Parser {
    fn from(p: &Parser) -> Self {
        p.clone()
    }
}

/// Callback of the raw combinators.
#[derive(Clone)]
pub struct Nodify(Rc<dyn Fn(Vec<Value>) -> Option<Value>>);

impl Nodify {
    pub fn new(f: impl Fn(Vec<Value>) -> Option<Value> + 'static) -> Self {
        Nodify(Rc::new(f))
    }

    fn apply(&self, values: Vec<Value>) -> Option<Value> {
        (self.0)(values)
    }
}

impl fmt::Debug for Nodify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nodify")
    }
}

// --- Forward references -----------------------------------------------------

/// Late-bound parser, for recursive grammars.
///
/// Convert a reference into a [`Parser`] (`Parser::from(&r)` or inside
/// [`parsers!`](crate::parsers)) wherever the rule is used, then
/// [`bind`](Self::bind) the real rule once it exists. Running a grammar that
/// reaches an unbound reference panics.
///
/// Uses only hold the rule weakly, so a rule that refers to itself does not
/// keep itself alive. Something has to own the reference while the grammar
/// runs: the `ParserRef` value itself, or the root returned through
/// [`Parser::owning`].
#[derive(Clone)]
pub struct ParserRef {
    name: Rc<str>,
    cell: Rc<OnceCell<Parser>>,
}

impl ParserRef {
    pub fn new(name: &str) -> Self {
        ParserRef { name: Rc::from(name), cell: Rc::new(OnceCell::new()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bind(&self, parser: impl Into<Parser>) -> Result<(), GrammarError> {
        self.cell.set(parser.into()).map_err(|_| GrammarError::Rebound { name: self.name.to_string() })
    }

    pub fn is_bound(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for ParserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRef").field("name", &self.name).field("bound", &self.is_bound()).finish()
    }
}

impl From<&ParserRef> for Parser {
    fn from(r: &ParserRef) -> Self {
        let (name, cell) = (r.name.clone(), Rc::downgrade(&r.cell));
        Parser::new(move |s| {
            let Some(cell) = Weak::upgrade(&cell) else {
                panic!("forward reference {name:?} used after its grammar was dropped")
            };
            match cell.get() {
                Some(p) => p.parse(s),
                None => panic!("forward reference {name:?} used before it was bound"),
            }
        })
    }
}

// --- Arity ------------------------------------------------------------------

pub(crate) fn check_arity(
    combinator: &'static str, name: &str, got: usize, allowed: std::ops::RangeInclusive<usize>,
    expected: &'static str,
) -> Result<(), GrammarError> {
    if allowed.contains(&got) {
        Ok(())
    } else {
        Err(GrammarError::Arity { combinator, name: name.to_string(), got, expected })
    }
}

/// Split `op [sep]` / `op [sep] until` argument lists.
pub(crate) fn split_repeat(mut parsers: Vec<Parser>, with_until: bool) -> (Parser, Option<Parser>, Option<Parser>) {
    let until = if with_until { parsers.pop() } else { None };
    let sep = if parsers.len() == 2 { parsers.pop() } else { None };
    let op = parsers.remove(0);
    (op, sep, until)
}

/// Drive a repetition: `op (sep op)*`, stopping early when `until` matches.
///
/// A separator that is not followed by a successful `op` (or that is followed
/// by `until`) is left unconsumed. `on_item` sees each op result and returns
/// `false` to stop the loop.
pub(crate) fn repeat_loop(
    op: &Parser, sep: Option<&Parser>, until: Option<&Parser>, s: &Scanner, mut on_item: impl FnMut(Value) -> bool,
) -> (usize, Scanner) {
    let mut count = 0;
    let mut news = s.clone();
    loop {
        let mut attempt = news.clone();
        if let (true, Some(sep)) = (count > 0, sep) {
            match sep.parse(attempt) {
                (Some(_), next) => attempt = next,
                (None, _) => break,
            }
        }
        if let Some(until) = until {
            if until.parse(attempt.clone()).0.is_some() {
                break;
            }
        }
        match op.parse(attempt) {
            (Some(value), next) => {
                count += 1;
                news = next;
                if !on_item(value) {
                    break;
                }
            }
            (None, _) => break,
        }
    }
    (count, news)
}

fn finish(nodify: Option<&Nodify>, values: Vec<Value>) -> Option<Value> {
    match nodify {
        Some(callback) => callback.apply(values),
        None => Some(Value::List(values)),
    }
}

// --- Combinators ------------------------------------------------------------

/// Apply every parser in order; all must match.
pub fn sequence(nodify: Option<Nodify>, parsers: Vec<Parser>) -> Result<Parser, GrammarError> {
    check_arity("sequence", "", parsers.len(), 1..=usize::MAX, "at least 1")?;
    Ok(Parser::new(move |s: Scanner| {
        let mut values = Vec::with_capacity(parsers.len());
        let mut news = s.clone();
        for parser in &parsers {
            match parser.parse(news) {
                (Some(value), next) => {
                    values.push(value);
                    news = next;
                }
                (None, _) => return (None, s),
            }
        }
        match finish(nodify.as_ref(), values) {
            Some(value) => (Some(value), news),
            None => (None, s),
        }
    }))
}

/// Try the parsers in order from the same position; the first match wins.
///
/// Without a callback the winning value is passed through as is. A callback
/// gets a one-element vector; rejecting it fails the whole choice.
pub fn ordered_choice(nodify: Option<Nodify>, parsers: Vec<Parser>) -> Result<Parser, GrammarError> {
    check_arity("ordered_choice", "", parsers.len(), 1..=usize::MAX, "at least 1")?;
    Ok(Parser::new(move |s: Scanner| {
        for parser in &parsers {
            if let (Some(value), news) = parser.parse(s.clone()) {
                let value = match nodify.as_ref() {
                    Some(callback) => callback.apply(vec![value]),
                    None => Some(value),
                };
                return match value {
                    Some(value) => (Some(value), news),
                    None => (None, s),
                };
            }
        }
        (None, s)
    }))
}

/// `op (sep op)*`, possibly zero times. Takes `[op]` or `[op, sep]`.
pub fn zero_or_more(nodify: Option<Nodify>, parsers: Vec<Parser>) -> Result<Parser, GrammarError> {
    check_arity("zero_or_more", "", parsers.len(), 1..=2, "1 or 2")?;
    Ok(repetition(nodify, parsers, false, 0))
}

/// `op (sep op)*`, at least once. Takes `[op]` or `[op, sep]`.
pub fn one_or_more(nodify: Option<Nodify>, parsers: Vec<Parser>) -> Result<Parser, GrammarError> {
    check_arity("one_or_more", "", parsers.len(), 1..=2, "1 or 2")?;
    Ok(repetition(nodify, parsers, false, 1))
}

/// Like [`one_or_more`] but stops as soon as `until` would match. Takes
/// `[op, until]` or `[op, sep, until]`; `until` is never consumed.
pub fn repeat_until(nodify: Option<Nodify>, parsers: Vec<Parser>) -> Result<Parser, GrammarError> {
    check_arity("repeat_until", "", parsers.len(), 2..=3, "2 or 3")?;
    Ok(repetition(nodify, parsers, true, 1))
}

fn repetition(nodify: Option<Nodify>, parsers: Vec<Parser>, with_until: bool, min: usize) -> Parser {
    let (op, sep, until) = split_repeat(parsers, with_until);
    Parser::new(move |s: Scanner| {
        let mut values = Vec::new();
        let (count, news) = repeat_loop(&op, sep.as_ref(), until.as_ref(), &s, |v| {
            values.push(v);
            true
        });
        if count < min {
            return (None, s);
        }
        match finish(nodify.as_ref(), values) {
            Some(value) => (Some(value), news),
            None => (None, s),
        }
    })
}

/// Apply `parser` once; never fails. A miss (or a rejected match) yields
/// [`Node::Absent`] without consuming input.
pub fn optional(nodify: Option<Nodify>, parser: Parser) -> Parser {
    Parser::new(move |s: Scanner| {
        let absent = || Some(Value::Node(Node::Absent));
        match parser.parse(s.clone()) {
            (Some(value), news) => {
                let value = match nodify.as_ref() {
                    Some(callback) => callback.apply(vec![value]),
                    None => Some(value),
                };
                match value {
                    Some(value) => (Some(value), news),
                    None => (absent(), s),
                }
            }
            (None, _) => (absent(), s),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminals::{atom, int};
    use proptest::prelude::*;

    fn run(p: &Parser, text: &str) -> (Option<Value>, usize) {
        let (value, rest) = p.parse(Scanner::new(text));
        (value, rest.cursor())
    }

    fn names(value: &Value) -> Vec<String> {
        value.as_list().unwrap_or_default().iter().filter_map(|v| v.node_name().map(str::to_string)).collect()
    }

    #[test]
    fn sequence_is_atomic() {
        let p = sequence(None, vec![int(), atom("+", "PLUS"), int()]).unwrap();
        let (value, end) = run(&p, "1 + 2");
        assert_eq!(names(&value.unwrap()), vec!["INT", "PLUS", "INT"]);
        assert_eq!(end, 5);

        assert_eq!(run(&p, "1 + x"), (None, 0));
    }

    #[test]
    fn rejected_sequence_fails_at_start() {
        let p = sequence(Some(Nodify::new(|_| None)), vec![int()]).unwrap();
        assert_eq!(run(&p, "12"), (None, 0));
    }

    #[test]
    fn ordered_choice_takes_first_match() {
        let a = atom("ab", "AB");
        let b = atom("a", "A");
        let p = ordered_choice(None, vec![b.clone(), a.clone()]).unwrap();
        let (value, end) = run(&p, "ab");
        assert_eq!(value.unwrap().node_name(), Some("A"));
        assert_eq!(end, 1);

        let p = ordered_choice(None, vec![a, b]).unwrap();
        assert_eq!(run(&p, "ab").1, 2);
        assert_eq!(run(&p, "x"), (None, 0));
    }

    #[test]
    fn rejected_choice_does_not_fall_through() {
        let p = ordered_choice(Some(Nodify::new(|_| None)), vec![atom("a", "A"), atom("a", "B")]).unwrap();
        assert_eq!(run(&p, "a"), (None, 0));
    }

    #[test]
    fn repetition_boundaries() {
        let many = zero_or_more(None, vec![int()]).unwrap();
        let (value, end) = run(&many, "x");
        assert_eq!(value, Some(Value::List(vec![])));
        assert_eq!(end, 0);

        let some = one_or_more(None, vec![int()]).unwrap();
        assert_eq!(run(&some, "x"), (None, 0));
        let (value, end) = run(&some, "1 2 3 x");
        assert_eq!(value.unwrap().as_list().map(<[Value]>::len), Some(3));
        assert_eq!(end, 5);
    }

    #[test]
    fn dangling_separator_is_not_consumed() {
        let p = one_or_more(None, vec![int(), atom(",", "COMMA")]).unwrap();
        let (value, end) = run(&p, "1, 2, x");
        assert_eq!(names(&value.unwrap()), vec!["INT", "INT"]);
        assert_eq!(end, 4);
    }

    #[test]
    fn repeat_until_stops_without_consuming() {
        let word = crate::terminals::token("[a-z]+", "W").unwrap();
        let p = repeat_until(None, vec![word.clone(), atom(";", "SEMI")]).unwrap();
        let (value, end) = run(&p, "a b ; c");
        assert_eq!(value.unwrap().as_list().map(<[Value]>::len), Some(2));
        assert_eq!(end, 3);
        assert_eq!(run(&p, "; a"), (None, 0));

        let p = repeat_until(None, vec![word.clone(), atom(",", "COMMA"), atom("end", "END")]).unwrap();
        let (value, end) = run(&p, "a, b, end");
        assert_eq!(value.unwrap().as_list().map(<[Value]>::len), Some(2));
        assert_eq!(end, 4);

        let (value, end) = run(&p, "a, b");
        assert_eq!(value.unwrap().as_list().map(<[Value]>::len), Some(2));
        assert_eq!(end, 4);
    }

    #[test]
    fn optional_never_fails() {
        let p = optional(None, int());
        assert_eq!(run(&p, "x"), (Some(Value::Node(Node::Absent)), 0));
        assert_eq!(run(&p, "7").0.unwrap().node_name(), Some("INT"));

        let p = optional(Some(Nodify::new(|_| None)), int());
        assert_eq!(run(&p, "7"), (Some(Value::Node(Node::Absent)), 0));
    }

    #[test]
    fn arity_is_checked_at_construction() {
        assert!(matches!(sequence(None, vec![]), Err(GrammarError::Arity { got: 0, .. })));
        assert!(matches!(ordered_choice(None, vec![]), Err(GrammarError::Arity { got: 0, .. })));
        assert!(matches!(zero_or_more(None, vec![int(), int(), int()]), Err(GrammarError::Arity { got: 3, .. })));
        assert!(matches!(one_or_more(None, vec![]), Err(GrammarError::Arity { got: 0, .. })));
        assert!(matches!(repeat_until(None, vec![int()]), Err(GrammarError::Arity { got: 1, .. })));
    }

    #[test]
    fn forward_reference() {
        // list := "(" list* ")"
        let list = ParserRef::new("list");
        let inner = zero_or_more(None, vec![Parser::from(&list)]).unwrap();
        let rule = sequence(None, vec![atom("(", "OPEN"), inner, atom(")", "CLOSE")]).unwrap();
        list.bind(&rule).unwrap();
        assert!(list.is_bound());
        assert_eq!(run(&rule, "(()(()))").1, 8);
        assert_eq!(run(&rule, "(()").0, None);
        assert!(matches!(list.bind(&rule), Err(GrammarError::Rebound { .. })));
    }

    #[test]
    #[should_panic(expected = "used before it was bound")]
    fn unbound_reference_panics() {
        let r = ParserRef::new("later");
        Parser::from(&r).parse(Scanner::new("x"));
    }

    #[test]
    fn recursive_grammar_is_freed_with_its_root() {
        let weak = {
            let list = ParserRef::new("list");
            let inner = zero_or_more(None, vec![Parser::from(&list)]).unwrap();
            let rule = sequence(None, vec![atom("(", "OPEN"), inner, atom(")", "CLOSE")]).unwrap();
            list.bind(rule).unwrap();
            let root = Parser::from(&list).owning(&[&list]);
            let weak = Rc::downgrade(&list.cell);
            drop(list);
            assert_eq!(run(&root, "(()())").1, 6);
            weak
        };
        assert!(weak.upgrade().is_none());
    }

    #[test]
    #[should_panic(expected = "used after its grammar was dropped")]
    fn dropped_reference_panics() {
        let r = ParserRef::new("gone");
        r.bind(int()).unwrap();
        let p = Parser::from(&r);
        drop(r);
        p.parse(Scanner::new("1"));
    }

    proptest! {
        #[test]
        fn sequence_failure_restores_cursor(
            words in proptest::collection::vec("[a-z]{1,4}", 1..5),
            tail in "[0-9]{1,3}"
        ) {
            let text = format!("{} {}", words.join(" "), tail);
            let word = crate::terminals::token("[a-z]+", "W").unwrap();
            let mut subs = vec![word; words.len() + 1];
            subs.push(int());
            // one word too many: always fails on the digits
            let p = sequence(None, subs).unwrap();
            let (value, rest) = p.parse(Scanner::new(&text));
            prop_assert!(value.is_none());
            prop_assert_eq!(rest.cursor(), 0);
        }

        #[test]
        fn zero_or_more_matches_every_item(items in proptest::collection::vec(0u32..1000, 0..8)) {
            let text = items.iter().map(u32::to_string).collect::<Vec<_>>().join(",");
            let p = zero_or_more(None, vec![int(), atom(",", "COMMA")]).unwrap();
            let (value, rest) = p.parse(Scanner::new(&text));
            prop_assert_eq!(value.unwrap().as_list().map(<[Value]>::len), Some(items.len()));
            prop_assert!(rest.at_end());
        }

        #[test]
        fn optional_covers_every_input(text in "\\PC{0,12}") {
            let (value, _) = optional(None, int()).parse(Scanner::new(&text));
            prop_assert!(value.is_some());
        }
    }
}
