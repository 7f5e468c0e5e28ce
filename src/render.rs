//! Text forms of a tree: an indented dump and Graphviz `dot`.

use crate::Node;
use std::fmt::Write;

/// One line per node, two spaces of indent per level. Leaves show their
/// matched text quoted and their offset.
pub(crate) fn render(root: &Node) -> String {
    let mut out = String::new();
    dump(&mut out, root, 0);
    out
}

fn dump(out: &mut String, node: &Node, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Leaf(leaf) => {
            let _ = writeln!(out, "{indent}{} {:?} @{}", leaf.name, leaf.value, leaf.position);
        }
        Node::Grouping(group) => {
            let _ = writeln!(out, "{indent}{}", group.name);
            for child in &group.children {
                dump(out, child, depth + 1);
            }
        }
        Node::Absent => {
            let _ = writeln!(out, "{indent}({})", node.name());
        }
    }
}

/// `digraph name { ... }` with one vertex per node, labelled with the node
/// name (and text, for leaves), and an edge from every grouping to each
/// child.
pub(crate) fn graph(name: &str, root: Option<&Node>) -> String {
    let mut out = format!("digraph {} {{\n", quote(name));
    if let Some(root) = root {
        let mut next = 0;
        vertex(&mut out, root, &mut next);
    }
    out.push_str("}\n");
    out
}

/// Emit `node` and its subtree; returns the id given to `node`.
fn vertex(out: &mut String, node: &Node, next: &mut usize) -> usize {
    let id = *next;
    *next += 1;
    let label = match node {
        Node::Leaf(leaf) => format!("{}\\n{}", escape(&leaf.name), escape(&leaf.value)),
        _ => escape(node.name()),
    };
    let shape = if node.is_leaf() { "box" } else { "ellipse" };
    let _ = writeln!(out, "  n{id} [label=\"{label}\", shape={shape}];");
    for child in node.children() {
        let child_id = vertex(out, child, next);
        let _ = writeln!(out, "  n{id} -> n{child_id};");
    }
    id
}

fn quote(s: &str) -> String {
    format!("\"{}\"", escape(s))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::grouping(
            "sum",
            vec![Node::leaf("INT", "1", 0), Node::Absent, Node::grouping("tail", vec![Node::leaf("STR", "\"x\"", 2)])],
        )
    }

    #[test]
    fn dump_is_indented() {
        let text = render(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["sum", "  INT \"1\" @0", "  (missing)", "  tail", "    STR \"\\\"x\\\"\" @2"]);
    }

    #[test]
    fn graph_lists_vertices_and_edges() {
        let dot = graph("demo", Some(&sample()));
        assert!(dot.starts_with("digraph \"demo\" {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("n0 [label=\"sum\", shape=ellipse];"));
        assert!(dot.contains("n1 [label=\"INT\\n1\", shape=box];"));
        assert!(dot.contains("n4 [label=\"STR\\n\\\"x\\\"\", shape=box];"));
        for edge in ["n0 -> n1;", "n0 -> n2;", "n0 -> n3;", "n3 -> n4;"] {
            assert!(dot.contains(edge), "missing {edge}");
        }
    }

    #[test]
    fn graph_of_nothing() {
        assert_eq!(graph("empty", None), "digraph \"empty\" {\n}\n");
    }
}
