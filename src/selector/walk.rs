//! Tree walk that evaluates a compiled selector.
//!
//! The walk is pre-order. Each call carries the part of the chain still to be
//! matched; a node that satisfies the head term advances the chain for its
//! descendants, a node that does not keeps the chain as is. Sibling
//! combinators are resolved on the spot by scanning the parent's later
//! children, after which the walk continues below the last sibling matched.

use super::model::{Combinator, Selector, Term};
use crate::Node;
use std::collections::HashSet;

/// Nodes matched by a query, in discovery order, without duplicates.
#[derive(Debug, Default)]
pub struct Matches<'a> {
    nodes: std::vec::IntoIter<&'a Node>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        self.nodes.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.nodes.size_hint()
    }
}

impl ExactSizeIterator for Matches<'_> {}

impl Selector {
    /// Every node under (and including) `root` that one of the chains
    /// matches.
    pub fn select<'a>(&self, root: &'a Node) -> Matches<'a> {
        let mut found = Vec::new();
        for chain in self.groups.iter().filter(|c| !c.terms.is_empty()) {
            walk(None, 0, root, &chain.terms, &mut found);
        }
        let mut seen = HashSet::new();
        found.retain(|node: &&Node| seen.insert(std::ptr::from_ref::<Node>(node)));
        Matches { nodes: found.into_iter() }
    }
}

fn walk<'a>(parent: Option<&'a Node>, index: usize, node: &'a Node, chain: &[Term], out: &mut Vec<&'a Node>) {
    let Some((term, rest)) = chain.split_first() else { return };
    let matched = term.matches(parent, index, node);
    if !matched && term.combinator == Combinator::Child {
        return;
    }

    let mut next = chain;
    if matched {
        match rest.first() {
            None => out.push(node),
            Some(link) if !link.combinator.is_sibling() => next = rest,
            Some(_) => {
                if let Some(parent) = parent {
                    if let Some((sibling, remaining)) = siblings(parent, index, rest, out) {
                        descend(&parent.children()[sibling], remaining, out);
                    }
                }
            }
        }
    }
    descend(node, next, out);
}

fn descend<'a>(node: &'a Node, chain: &[Term], out: &mut Vec<&'a Node>) {
    for (i, child) in node.children().iter().enumerate() {
        walk(Some(node), i, child, chain, out);
    }
}

/// Resolve the sibling terms at the head of `chain` among the children of
/// `parent` following `index`.
///
/// Emits the last sibling when the chain ends with sibling terms. Otherwise
/// returns the sibling to continue below together with the rest of the chain.
fn siblings<'a, 't>(
    parent: &'a Node, index: usize, chain: &'t [Term], out: &mut Vec<&'a Node>,
) -> Option<(usize, &'t [Term])> {
    let (term, rest) = chain.split_first()?;
    let children = parent.children();
    let end = if term.combinator == Combinator::Next { children.len().min(index + 2) } else { children.len() };
    let found = (index + 1..end).find(|&i| term.matches(Some(parent), i, &children[i]))?;
    match rest.first() {
        None => {
            out.push(&children[found]);
            None
        }
        Some(link) if link.combinator.is_sibling() => siblings(parent, found, rest, out),
        Some(_) => Some((found, rest)),
    }
}
