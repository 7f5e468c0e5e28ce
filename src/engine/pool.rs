//! Free list of retired grouping storage.
//!
//! Groupings that end up unused (a failed sequence, a rejected repetition, a
//! tree released by `Ast::reset`) are returned here with their child vectors
//! emptied but still allocated, and handed out again by the next combinator
//! that needs one. The pool never holds more than its capacity; extra
//! groupings are simply dropped.

use super::PoolStats;
use crate::{Grouping, Node};

#[derive(Debug)]
pub(crate) struct NodePool {
    free: Vec<Grouping>,
    capacity: usize,
    stats: PoolStats,
}

impl NodePool {
    pub(crate) fn new(capacity: usize) -> Self {
        NodePool { free: Vec::with_capacity(capacity), capacity, stats: PoolStats::default() }
    }

    /// A fresh, empty grouping called `name`.
    pub(crate) fn take(&mut self, name: &str) -> Grouping {
        match self.free.pop() {
            Some(mut group) => {
                self.stats.reused += 1;
                group.name.clear();
                group.name.push_str(name);
                group.attributes.append("class", "nonterm");
                group
            }
            None => {
                self.stats.allocated += 1;
                Grouping::new(name)
            }
        }
    }

    /// Return `node` and every grouping below it, children first.
    pub(crate) fn retire(&mut self, node: Node) {
        if let Node::Grouping(group) = node {
            self.retire_grouping(group);
        }
    }

    pub(crate) fn retire_grouping(&mut self, mut group: Grouping) {
        for child in group.children.drain(..) {
            self.retire(child);
        }
        group.attributes.clear();
        if self.free.len() < self.capacity {
            self.stats.retired += 1;
            self.free.push(group);
        } else {
            self.stats.dropped += 1;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn stats(&self) -> PoolStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        let inner = Node::grouping("inner", vec![Node::leaf("A", "a", 0)]);
        Node::grouping("outer", vec![inner, Node::leaf("B", "b", 1), Node::Absent])
    }

    #[test]
    fn retire_is_bounded() {
        let mut pool = NodePool::new(1);
        pool.retire(tree());
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.stats(), PoolStats { allocated: 0, reused: 0, retired: 1, dropped: 1 });
    }

    #[test]
    fn taken_groupings_are_clean() {
        let mut pool = NodePool::new(4);
        let mut node = tree();
        node.set_attribute("id", "x");
        pool.retire(node);
        assert_eq!(pool.len(), 2);

        let group = pool.take("fresh");
        assert_eq!(group.name, "fresh");
        assert!(group.children.is_empty());
        assert_eq!(group.attributes.get("class"), ["nonterm"]);
        assert!(group.attributes.get("id").is_empty());
        assert_eq!(pool.len(), 1);

        pool.take("a");
        pool.take("b");
        assert_eq!(pool.stats().reused, 2);
        assert_eq!(pool.stats().allocated, 1);
    }

    #[test]
    fn leaves_are_not_pooled() {
        let mut pool = NodePool::new(4);
        pool.retire(Node::leaf("A", "a", 0));
        pool.retire(Node::Absent);
        assert_eq!(pool.len(), 0);
    }
}
