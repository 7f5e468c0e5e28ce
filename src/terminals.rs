//! Leaf parsers.
//!
//! Every parser here yields a [`Node::Leaf`] (wrapped in [`Value::Node`])
//! positioned at the first byte of the match. Unless the name says `exact`,
//! leading whitespace is skipped first; a failed match never consumes it.

use crate::scanner::anchor;
use crate::{GrammarError, Node, Parser, Scanner, Value};
use regex::Regex;

fn leaf(name: &str, value: String, position: usize) -> Option<Value> {
    Some(Value::Node(Node::leaf(name, value, position)))
}

fn compile(pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(&anchor(pattern)).map_err(|e| GrammarError::pattern(pattern, &e))
}

fn regex_leaf(re: Regex, name: &str, skip_ws: bool) -> Parser {
    let name = name.to_string();
    Parser::new(move |s: Scanner| {
        let mut news = s.clone();
        if skip_ws {
            news.skip_ws();
        }
        let position = news.cursor();
        match news.match_regex(&re) {
            Some(tok) => (leaf(&name, tok, position), news),
            None => (None, s),
        }
    })
}

// --- Pattern tokens ----------------------------------------------------------

/// Match `pattern` after skipping whitespace; the leaf is called `name`.
pub fn token(pattern: &str, name: &str) -> Result<Parser, GrammarError> {
    Ok(regex_leaf(compile(pattern)?, name, true))
}

/// [`token`] without the whitespace skip.
pub fn token_exact(pattern: &str, name: &str) -> Result<Parser, GrammarError> {
    Ok(regex_leaf(compile(pattern)?, name, false))
}

/// [`token`] for an already compiled (and anchored) pattern. Backs the
/// [`token!`](crate::token) macro.
pub fn token_regex(re: &Regex, name: &str) -> Parser {
    regex_leaf(re.clone(), name, true)
}

/// [`token_exact`] for an already compiled (and anchored) pattern.
pub fn token_exact_regex(re: &Regex, name: &str) -> Parser {
    regex_leaf(re.clone(), name, false)
}

/// Match the first of several patterns; the leaf takes the name paired with
/// the pattern that matched. An empty name produces a leaf called `TOKEN`.
pub fn ord_tokens(patterns: &[&str], names: &[&str]) -> Result<Parser, GrammarError> {
    if patterns.len() != names.len() {
        return Err(GrammarError::TokenNames { patterns: patterns.len(), names: names.len() });
    }
    let groups: Vec<String> = patterns
        .iter()
        .zip(names)
        .map(|(p, n)| if n.is_empty() { format!("^({p})") } else { format!("^(?P<{n}>{p})") })
        .collect();
    let joined = groups.join("|");
    let re = Regex::new(&joined).map_err(|e| GrammarError::pattern(&joined, &e))?;
    Ok(Parser::new(move |s: Scanner| {
        let mut news = s.clone();
        news.skip_ws();
        let position = news.cursor();
        match news.submatch_all(&re) {
            Some(groups) => {
                let (name, value) = match groups.into_iter().next() {
                    Some(named) => named,
                    None => ("TOKEN".to_string(), s.text()[position..news.cursor()].to_string()),
                };
                (leaf(&name, value, position), news)
            }
            None => (None, s),
        }
    }))
}

// --- Literals ----------------------------------------------------------------

/// Match `literal` verbatim after skipping whitespace.
pub fn atom(literal: &str, name: &str) -> Parser {
    literal_leaf(literal, name, true)
}

/// [`atom`] without the whitespace skip.
pub fn atom_exact(literal: &str, name: &str) -> Parser {
    literal_leaf(literal, name, false)
}

fn literal_leaf(literal: &str, name: &str, skip_ws: bool) -> Parser {
    let (literal, name) = (literal.to_string(), name.to_string());
    Parser::new(move |s: Scanner| {
        let mut news = s.clone();
        if skip_ws {
            news.skip_ws();
        }
        let position = news.cursor();
        if news.match_literal(&literal) { (leaf(&name, literal.clone(), position), news) } else { (None, s) }
    })
}

// --- Numbers and names -------------------------------------------------------

/// Signed decimal integer, leaf `INT`.
pub fn int() -> Parser {
    token!(r"-?[0-9]+", "INT")
}

/// Decimal with a fractional part, leaf `FLOAT`.
pub fn float() -> Parser {
    token!(r"[+-]?(?:[0-9]+\.[0-9]*|\.[0-9]+)", "FLOAT")
}

/// `0x`-prefixed hexadecimal, leaf `HEX`.
pub fn hex() -> Parser {
    token!(r"0[xX][0-9a-fA-F]+", "HEX")
}

/// `0`-prefixed octal, leaf `OCT`.
pub fn oct() -> Parser {
    token!(r"0[0-7]+", "OCT")
}

/// Identifier, leaf `IDENT`.
pub fn ident() -> Parser {
    token!(r"[A-Za-z][0-9a-zA-Z_]*", "IDENT")
}

/// Single-quoted character, leaf `CHAR`.
pub fn char() -> Parser {
    token!(r"'.'", "CHAR")
}

// --- Strings -----------------------------------------------------------------

/// Double-quoted string, leaf `STRING`.
///
/// The leaf keeps the literal exactly as written, quotes and escapes
/// included; decode it with [`unquote`].
pub fn string() -> Parser {
    Parser::new(|s: Scanner| {
        let mut news = s.clone();
        news.skip_ws();
        let position = news.cursor();
        match scan_string(news.remaining()) {
            Some(n) => {
                let raw = news.remaining()[..n].to_string();
                news.set_cursor(position + n);
                (leaf("STRING", raw, position), news)
            }
            None => (None, s),
        }
    })
}

/// Length in bytes of the string literal at the start of `text`.
fn scan_string(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    if chars.next()?.1 != '"' {
        return None;
    }
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some(i + 1),
            '\\' => match chars.next()?.1 {
                '"' | '\\' | '/' | '\'' | 'b' | 'f' | 'n' | 'r' | 't' => {}
                'u' => {
                    for _ in 0..4 {
                        if !chars.next()?.1.is_ascii_hexdigit() {
                            return None;
                        }
                    }
                }
                _ => return None,
            },
            c if c < ' ' => return None,
            _ => {}
        }
    }
    None
}

/// Decode a string literal produced by [`string`].
///
/// Handles the single-character escapes, `\uXXXX` and UTF-16 surrogate
/// pairs; a lone surrogate decodes to U+FFFD. Returns `None` when `raw` is
/// not a well-formed literal.
pub fn unquote(raw: &str) -> Option<String> {
    if scan_string(raw)? != raw.len() {
        return None;
    }
    let body = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let unit = hex4(&mut chars)?;
                if (0xD800..0xDC00).contains(&unit) {
                    let mut ahead = chars.clone();
                    let low = match (ahead.next(), ahead.next()) {
                        (Some('\\'), Some('u')) => hex4(&mut ahead).filter(|lo| (0xDC00..0xE000).contains(lo)),
                        _ => None,
                    };
                    match low {
                        Some(lo) => {
                            chars = ahead;
                            let cp = 0x10000 + ((unit - 0xD800) << 10) + (lo - 0xDC00);
                            out.push(char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER));
                        }
                        None => out.push(char::REPLACEMENT_CHARACTER),
                    }
                } else {
                    out.push(char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            other => out.push(other),
        }
    }
    Some(out)
}

fn hex4(chars: &mut impl Iterator<Item = char>) -> Option<u32> {
    let mut n = 0;
    for _ in 0..4 {
        n = n * 16 + chars.next()?.to_digit(16)?;
    }
    Some(n)
}

// --- End of input ------------------------------------------------------------

/// Succeed only at end of input (after whitespace); leaf `EOF`, empty.
pub fn end() -> Parser {
    Parser::new(|s: Scanner| {
        let mut news = s.clone();
        news.skip_ws();
        if news.at_end() { (leaf("EOF", String::new(), news.cursor()), news) } else { (None, s) }
    })
}

/// Succeed only when input remains; consumes nothing. Leaf `NOEND`, empty.
pub fn no_end() -> Parser {
    Parser::new(|s: Scanner| {
        if s.at_end() {
            (None, s)
        } else {
            let position = s.cursor();
            (leaf("NOEND", String::new(), position), s)
        }
    })
}
