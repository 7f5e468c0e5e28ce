//! Selector syntax, parsed with the crate's own builder.
//!
//! ```text
//! selectors := chain (COMMA chain)*
//! chain     := term link*
//! link      := OP term                      OP is whitespace, '>', '+' or '~'
//! term      := (STAR | NAME)? SHORTH? attribute* colon?     (never empty)
//! attribute := '[' ATTRNAME (ATTRSEP value)? ']'
//! colon     := ':' (empty | first-child | ... | nth-child '(' INT ')' | ...)
//! ```
//!
//! Transforms normalize the tree as it is built: quoted values lose their
//! quotes, `nth-*` nodes get an `arg` attribute, each linked term gets an
//! `op` attribute and every chain comes out as a flat grouping of terms.
//! [`compile`] then turns that tree into a [`Selector`].

use super::model::{AttrOp, AttrPredicate, Chain, Combinator, Pseudo, Selector, Term};
use crate::terminals::{atom, atom_exact, int};
use crate::{Ast, GrammarError, Node, Parser, Scanner, SelectorError, Trace, Transform};
use std::cell::RefCell;

const POOL_SIZE: usize = 64;

thread_local! {
    static GRAMMAR: RefCell<Result<SelectorGrammar, GrammarError>> = RefCell::new(SelectorGrammar::build());
}

/// Parse `text` with this thread's selector grammar.
pub(crate) fn parse(text: &str) -> Result<Selector, SelectorError> {
    GRAMMAR.with(|cell| match cell.borrow_mut().as_mut() {
        Ok(grammar) => grammar.parse(text),
        Err(err) => Err(SelectorError::Grammar(err.clone())),
    })
}

struct SelectorGrammar {
    ast: Ast,
    root: Parser,
}

impl SelectorGrammar {
    fn build() -> Result<Self, GrammarError> {
        let mut ast = Ast::new("selector", POOL_SIZE);
        ast.set_trace(Trace::empty());

        let star = atom_exact("*", "STAR");
        let name = token_exact!(r"(?i)[a-z][a-z0-9_-]*", "NAME");
        let shorthand = token_exact!(r"(?i)[\.#][a-z][a-z0-9_-]*", "SHORTH");
        let op = token_exact!(r"[\s>\+~]+", "OP");
        let comma = token_exact!(r"\s*,\s*", "COMMA");

        let nodename = ast.ordered_choice("nodename", None, parsers![star, name])?;
        let term = ast.sequence(
            "term",
            Some(Transform::filter(non_empty_term)),
            parsers![
                ast.optional("maybename", None, nodename),
                ast.optional("maybeshorthand", None, shorthand),
                ast.zero_or_more("attributes", None, parsers![attribute(&ast)?])?,
                ast.optional("maybecolon", None, colon(&ast)?),
            ],
        )?;
        let link = ast.sequence("link", Some(Transform::new(link_term)), parsers![op, &term])?;
        let links = ast.zero_or_more("links", None, parsers![link])?;
        let chain = ast.sequence("chain", Some(Transform::new(flatten_chain)), parsers![term, links])?;
        let root = ast.zero_or_more("selectors", None, parsers![chain, comma])?;
        Ok(SelectorGrammar { ast, root })
    }

    fn parse(&mut self, text: &str) -> Result<Selector, SelectorError> {
        let lead = text.len() - text.trim_start().len();
        let syntax = |at: usize| SelectorError::Syntax { selector: text.to_string(), offset: lead + at };

        self.ast.reset();
        let (root, rest) = self.ast.parse_with(&self.root, Scanner::new(text.trim()));
        match root {
            Some(root) if rest.at_end() && !root.children().is_empty() => compile(root, text),
            _ => Err(syntax(rest.cursor())),
        }
    }
}

fn attribute(ast: &Ast) -> Result<Parser, GrammarError> {
    let opensqr = atom_exact("[", "OPENSQR");
    let closesqr = atom_exact("]", "CLOSESQR");
    let attrname = token_exact!(r"(?i)[a-z][a-z0-9_-]*", "ATTRNAME");
    let separator = token_exact!(r"=|~=|\^=|\$=|\*=", "ATTRSEP");
    let double = token_exact!(r#""[^"]*""#, "VAL1");
    let single = token_exact!(r"'[^']*'", "VAL2");
    let bare = token_exact!(r"[^\s\]]+", "VAL3");

    let value = ast.ordered_choice("attrchoice", Some(Transform::new(unquote_value)), parsers![double, single, bare])?;
    let attrval = ast.sequence("attrval", None, parsers![separator, value])?;
    ast.sequence("attribute", None, parsers![opensqr, attrname, ast.optional("maybeattrval", None, attrval), closesqr])
}

fn colon(ast: &Ast) -> Result<Parser, GrammarError> {
    let arg = ast.sequence("arg", None, parsers![atom_exact("(", "OPENPARAN"), int(), atom(")", "CLOSEPARAN")])?;
    let nth = |name: &str, alias: &str| -> Result<Parser, GrammarError> {
        ast.sequence(name, Some(Transform::new(nth_arg)), parsers![atom_exact(name, alias), &arg])
    };
    let names = parsers![
        atom_exact("empty", "empty"),
        atom_exact("first-child", "first-child"),
        atom_exact("first-of-type", "first-of-type"),
        atom_exact("last-child", "last-child"),
        atom_exact("last-of-type", "last-of-type"),
        nth("nth-child", "CNC")?,
        nth("nth-of-type", "CNOT")?,
        nth("nth-last-child", "CNLC")?,
        nth("nth-last-of-type", "CNLOT")?,
        atom_exact("only-of-type", "only-of-type"),
        atom_exact("only-child", "only-child"),
    ];
    let colonname = ast.ordered_choice("colonname", None, names)?;
    ast.sequence("colon", None, parsers![atom_exact(":", "COLON"), colonname])
}

// --- Transforms -------------------------------------------------------------

fn unquote_value(_: &str, _: &Scanner, node: Node) -> Option<Node> {
    let position = node.position().unwrap_or(0);
    let raw = node.value();
    let value = match node.name() {
        "VAL1" | "VAL2" => &raw[1..raw.len() - 1],
        _ => &raw[..],
    };
    Some(Node::leaf("VALUE", value, position))
}

fn nth_arg(_: &str, _: &Scanner, mut node: Node) -> Option<Node> {
    let arg = node.children().get(1)?.children().get(1)?.value().into_owned();
    node.set_attribute("arg", arg);
    Some(node)
}

fn non_empty_term(_: &str, _: &Scanner, node: &Node) -> bool {
    let cs = node.children();
    !(cs[0].is_absent() && cs[1].is_absent() && cs[2].children().is_empty() && cs[3].is_absent())
}

fn link_term(_: &str, _: &Scanner, node: Node) -> Option<Node> {
    let mut cs = node.into_children().into_iter();
    let (op, mut term) = (cs.next()?, cs.next()?);
    let op = op.value().trim().to_string();
    Combinator::from_op(&op)?;
    term.set_attribute("op", op);
    Some(term)
}

fn flatten_chain(_: &str, _: &Scanner, node: Node) -> Option<Node> {
    let mut cs = node.into_children().into_iter();
    let first = cs.next()?;
    let mut terms = vec![first];
    terms.extend(cs.next()?.into_children());
    Some(Node::grouping("chain", terms))
}

// --- Compilation ------------------------------------------------------------

/// Turn the normalized parse tree into a [`Selector`].
fn compile(root: &Node, text: &str) -> Result<Selector, SelectorError> {
    let mut groups = Vec::with_capacity(root.children().len());
    for chain in root.children() {
        let terms = chain.children().iter().map(|t| compile_term(t, text)).collect::<Result<Vec<_>, _>>()?;
        groups.push(Chain { terms });
    }
    Ok(Selector { groups })
}

fn compile_term(node: &Node, text: &str) -> Result<Term, SelectorError> {
    let cs = node.children();
    let mut term = Term {
        name: leaf_text(&cs[0]),
        combinator: node.attribute("op").first().and_then(|op| Combinator::from_op(op)).unwrap_or_default(),
        ..Term::default()
    };
    if let Some(shorthand) = leaf_text(&cs[1]) {
        let key = if shorthand.starts_with('#') { "id" } else { "class" };
        term.attrs.push(predicate(key, Some(("=", &shorthand[1..])))?);
    }
    for attr in cs[2].children() {
        let parts = attr.children();
        let key = parts[1].value();
        let pred = match parts[2].children() {
            [op, value] => predicate(&key, Some((&*op.value(), &*value.value())))?,
            _ => predicate(&key, None)?,
        };
        term.attrs.push(pred);
    }
    if let Some(colonname) = cs[3].children().get(1) {
        term.pseudo = Some(pseudo(colonname, text)?);
    }
    Ok(term)
}

fn leaf_text(node: &Node) -> Option<String> {
    if node.is_absent() { None } else { Some(node.value().into_owned()) }
}

fn predicate(key: &str, test: Option<(&str, &str)>) -> Result<AttrPredicate, SelectorError> {
    let Some((op, value)) = test else { return Ok(AttrPredicate::exists(key)) };
    let op = AttrOp::from_op(op).unwrap_or(AttrOp::Equals);
    AttrPredicate::new(key, op, value)
        .map_err(|e| SelectorError::Pattern { pattern: value.to_string(), message: e.to_string() })
}

fn pseudo(node: &Node, text: &str) -> Result<Pseudo, SelectorError> {
    let arg = || {
        let raw = node.attribute("arg").first().cloned().unwrap_or_default();
        raw.parse::<usize>().map_err(|_| SelectorError::Argument { pseudo: node.name().to_string(), arg: raw })
    };
    Ok(match node.name() {
        "empty" => Pseudo::Empty,
        "first-child" => Pseudo::FirstChild,
        "first-of-type" => Pseudo::FirstOfType,
        "last-child" => Pseudo::LastChild,
        "last-of-type" => Pseudo::LastOfType,
        "nth-child" => Pseudo::NthChild(arg()?),
        "nth-of-type" => Pseudo::NthOfType(arg()?),
        "nth-last-child" => Pseudo::NthLastChild(arg()?),
        "nth-last-of-type" => Pseudo::NthLastOfType(arg()?),
        "only-of-type" => Pseudo::OnlyOfType,
        "only-child" => Pseudo::OnlyChild,
        _ => {
            let offset = node.position().unwrap_or(0);
            return Err(SelectorError::Syntax { selector: text.to_string(), offset });
        }
    })
}
