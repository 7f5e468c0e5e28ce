//! Integer arithmetic.
//!
//! ```text
//! sum   := prod (('+' | '-') prod)*
//! prod  := value (('*' | '/') value)*
//! value := INT | '(' sum ')'
//! ```
//!
//! Every rule folds its operands as soon as it matches, so the parser yields
//! a [`Value::Int`] rather than a tree. Division truncates towards zero.

use crate::terminals::int;
use crate::{GrammarError, Node, Nodify, Parser, ParserRef, Scanner, Value, ordered_choice, sequence, zero_or_more};

/// The `sum` rule: a parser yielding `Value::Int`.
///
/// An operation that overflows, or divides by zero, rejects the rule it
/// belongs to and the expression stops matching there.
pub fn grammar() -> Result<Parser, GrammarError> {
    let sum = ParserRef::new("sum");
    let prod = ParserRef::new("prod");
    let value = ParserRef::new("value");

    let open = token!(r"\(", "OPENPARAN");
    let close = token!(r"\)", "CLOSEPARAN");
    let sum_op = ordered_choice(None, parsers![token!(r"\+", "ADD"), token!("-", "SUB")])?;
    let prod_op = ordered_choice(None, parsers![token!(r"\*", "MULT"), token!("/", "DIV")])?;

    let group = sequence(Some(Nodify::new(|mut vs| Some(vs.swap_remove(1)))), parsers![open, &sum, close])?;
    let sum_tail = zero_or_more(None, parsers![sequence(None, parsers![sum_op, &prod])?])?;
    let prod_tail = zero_or_more(None, parsers![sequence(None, parsers![prod_op, &value])?])?;

    sum.bind(sequence(Some(Nodify::new(fold)), parsers![&prod, sum_tail])?)?;
    prod.bind(sequence(Some(Nodify::new(fold)), parsers![&value, prod_tail])?)?;
    value.bind(ordered_choice(Some(Nodify::new(operand)), parsers![int(), group])?)?;
    Ok(Parser::from(&sum).owning(&[&sum, &prod, &value]))
}

/// Evaluate `text`, which must hold exactly one expression (surrounding
/// whitespace aside).
pub fn evaluate(text: &str) -> Option<i64> {
    let root = grammar().ok()?;
    let (value, mut rest) = root.parse(Scanner::new(text));
    rest.skip_ws();
    if !rest.at_end() {
        return None;
    }
    value?.as_int()
}

fn operand(mut values: Vec<Value>) -> Option<Value> {
    match values.pop()? {
        Value::Node(Node::Leaf(leaf)) => leaf.value.parse().ok().map(Value::Int),
        other => Some(other),
    }
}

/// `[first, [[op, n], ...]]` folded left to right.
fn fold(values: Vec<Value>) -> Option<Value> {
    let mut values = values.into_iter();
    let mut acc = values.next()?.as_int()?;
    for pair in values.next()?.into_list()? {
        let pair = pair.into_list()?;
        let (op, n) = (pair.first()?.node_name()?, pair.get(1)?.as_int()?);
        acc = match op {
            "ADD" => acc.checked_add(n)?,
            "SUB" => acc.checked_sub(n)?,
            "MULT" => acc.checked_mul(n)?,
            "DIV" => acc.checked_div(n)?,
            _ => return None,
        };
    }
    Some(Value::Int(acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_the_reference_expression() {
        let text = "4 + 123 + 23 + 67 + 89 +\n87 * 78 / 67 - 98 - 199";
        assert_eq!(evaluate(text), Some(110));
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(evaluate("2 + 3 * 4"), Some(14));
        assert_eq!(evaluate("(2 + 3) * 4"), Some(20));
        assert_eq!(evaluate(" ((7)) "), Some(7));
        assert_eq!(evaluate("10 - 2 - 3"), Some(5));
        assert_eq!(evaluate("-3 * 2"), Some(-6));
        assert_eq!(evaluate("7 / 2"), Some(3));
    }

    #[test]
    fn rejects_incomplete_input() {
        assert_eq!(evaluate(""), None);
        assert_eq!(evaluate("1 +"), None);
        assert_eq!(evaluate("(1 + 2"), None);
        assert_eq!(evaluate("1 2"), None);
    }

    #[test]
    fn arithmetic_errors_stop_the_match() {
        assert_eq!(evaluate("1 / 0"), None);
        assert_eq!(evaluate("9223372036854775807 + 1"), None);
    }

    #[test]
    fn grammar_is_reusable() {
        let root = grammar().unwrap();
        for (text, want) in [("1+1", 2), ("6*7", 42), ("100/7", 14)] {
            let (value, _) = root.parse(Scanner::new(text));
            assert_eq!(value.and_then(|v| v.as_int()), Some(want));
        }
    }
}
