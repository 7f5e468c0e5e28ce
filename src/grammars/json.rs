//! JSON documents as a syntax tree.
//!
//! ```text
//! value      := TRUE | FALSE | NULL | STRING | FLOAT | INT | array | object
//! array      := '[' values ']'
//! values     := (value (',' value)*)?
//! object     := '{' properties '}'
//! properties := (property (',' property)*)?
//! property   := STRING ':' value
//! ```
//!
//! [`grammar`] builds the tree, [`decode`] turns a tree into a [`JsonValue`].

use crate::terminals::{int, string, unquote};
use crate::{Ast, GrammarError, Node, Parser, ParserRef, Scanner};
use std::fmt::{self, Write};

/// Decoded JSON. Objects keep their properties in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// First property called `key`, when `self` is an object.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(props) => props.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Compact JSON text.
impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonValue::Null => f.write_str("null"),
            JsonValue::Bool(b) => write!(f, "{b}"),
            JsonValue::Int(n) => write!(f, "{n}"),
            JsonValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            JsonValue::Float(x) => write!(f, "{x}"),
            JsonValue::Str(s) => write_quoted(f, s),
            JsonValue::Array(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            JsonValue::Object(props) => {
                f.write_char('{')?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ":{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

/// The `value` rule, building its tree with `ast`.
pub fn grammar(ast: &Ast) -> Result<Parser, GrammarError> {
    let value = ParserRef::new("value");

    let comma = token!(",", "COMMA");
    let colon = token!(":", "COLON");
    let number = token!(r"-?[0-9]+(?:\.[0-9]+(?:[eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)", "FLOAT");

    let values = ast.zero_or_more("values", None, parsers![&value, comma.clone()])?;
    let array = ast.sequence("array", None, parsers![token!(r"\[", "OPENSQR"), values, token!(r"\]", "CLOSESQR")])?;
    let property = ast.sequence("property", None, parsers![string(), colon, &value])?;
    let properties = ast.zero_or_more("properties", None, parsers![property, comma])?;
    let object =
        ast.sequence("object", None, parsers![token!(r"\{", "OPENBRACE"), properties, token!(r"\}", "CLOSEBRACE")])?;

    let choices = parsers![
        token!(r"true\b", "TRUE"),
        token!(r"false\b", "FALSE"),
        token!(r"null\b", "NULL"),
        string(),
        number,
        int(),
        array,
        object,
    ];
    value.bind(ast.ordered_choice("value", None, choices)?)?;
    Ok(Parser::from(&value).owning(&[&value]))
}

/// Decode a tree built by [`grammar`]. `None` when the tree has some other
/// shape.
pub fn decode(node: &Node) -> Option<JsonValue> {
    Some(match node.name() {
        "NULL" => JsonValue::Null,
        "TRUE" => JsonValue::Bool(true),
        "FALSE" => JsonValue::Bool(false),
        "STRING" => JsonValue::Str(unquote(&node.value())?),
        "FLOAT" => JsonValue::Float(node.value().parse().ok()?),
        "INT" => {
            let text = node.value();
            match text.parse() {
                Ok(n) => JsonValue::Int(n),
                Err(_) => JsonValue::Float(text.parse().ok()?),
            }
        }
        "array" => {
            let values = node.children().get(1)?;
            JsonValue::Array(values.children().iter().map(decode).collect::<Option<_>>()?)
        }
        "object" => {
            let mut props = Vec::new();
            for property in node.children().get(1)?.children() {
                let [key, _, value] = property.children() else { return None };
                props.push((unquote(&key.value())?, decode(value)?));
            }
            JsonValue::Object(props)
        }
        _ => return None,
    })
}

/// Parse and decode one JSON document. Surrounding whitespace is allowed,
/// anything else after the value is not.
pub fn parse(text: &str) -> Option<JsonValue> {
    let mut ast = Ast::new("json", 128);
    let root = grammar(&ast).ok()?;
    let (node, mut rest) = ast.parse_with(&root, Scanner::new(text));
    let node = node?;
    rest.skip_ws();
    if rest.at_end() { decode(node) } else { None }
}
