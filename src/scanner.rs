//! Input cursor over an immutable text buffer.
//!
//! A [`Scanner`] is what every parser receives and hands back. Cloning one is
//! O(1): the buffer, the whitespace pattern and the compiled-pattern cache are
//! shared, only the cursor (and the line counter, when enabled) is copied.
//! That is what makes backtracking cheap: a combinator snapshots the scanner
//! before trying an alternative and simply keeps the snapshot when the
//! alternative fails.

use crate::GrammarError;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

const DEFAULT_WS: &str = r"^[ \t\r\n]+";

#[derive(Clone)]
pub struct Scanner {
    buf: Rc<str>,
    cursor: usize,
    /// Current line (1-based) when line tracking is enabled.
    line: Option<usize>,
    ws: Regex,
    patterns: Rc<RefCell<HashMap<String, Regex>>>,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Scanner {
            buf: Rc::from(text),
            cursor: 0,
            line: None,
            ws: crate::regex!(DEFAULT_WS).clone(),
            patterns: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Keep a running line count as the cursor advances.
    pub fn track_lineno(mut self) -> Self {
        self.line = Some(1 + self.buf[..self.cursor].matches('\n').count());
        self
    }

    /// Line (1-based) of the cursor. Counted on demand unless tracking is on.
    pub fn lineno(&self) -> usize {
        self.line.unwrap_or_else(|| 1 + self.buf[..self.cursor].matches('\n').count())
    }

    /// Replace the pattern used by [`skip_ws`](Self::skip_ws). The pattern is
    /// anchored at the cursor.
    pub fn set_ws_pattern(&mut self, pattern: &str) -> Result<(), GrammarError> {
        let anchored = anchor(pattern);
        self.ws = Regex::new(&anchored).map_err(|e| GrammarError::pattern(pattern, &e))?;
        Ok(())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to `pos` (clamped to the end of input).
    ///
    /// Panics if `pos` falls inside a multi-byte character.
    pub fn set_cursor(&mut self, pos: usize) {
        let pos = pos.min(self.buf.len());
        assert!(self.buf.is_char_boundary(pos), "scanner cursor {pos} is not on a char boundary");
        self.cursor = pos;
        if self.line.is_some() {
            self.line = Some(1 + self.buf[..pos].matches('\n').count());
        }
    }

    /// Unconsumed input.
    pub fn remaining(&self) -> &str {
        &self.buf[self.cursor..]
    }

    /// The whole input.
    pub fn text(&self) -> &str {
        &self.buf
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.buf.len()
    }

    /// Match `re` at the cursor and advance past the match.
    ///
    /// A match that does not start at the cursor counts as no match; anchor
    /// patterns with `^` to keep the regex engine from searching ahead.
    pub fn match_regex(&mut self, re: &Regex) -> Option<String> {
        let m = re.find(self.remaining())?;
        if m.start() != 0 {
            return None;
        }
        let token = m.as_str().to_string();
        self.advance(token.len());
        Some(token)
    }

    /// Like [`match_regex`](Self::match_regex) for a pattern given as text.
    ///
    /// The compiled pattern is cached on this scanner (and every clone of it),
    /// keyed by the text as given.
    pub fn match_pattern(&mut self, pattern: &str) -> Result<Option<String>, GrammarError> {
        let re = self.compiled(pattern)?;
        Ok(self.match_regex(&re))
    }

    /// Match `re` at the cursor and return the named groups that took part in
    /// the match, in group order.
    pub fn submatch_all(&mut self, re: &Regex) -> Option<Vec<(String, String)>> {
        let caps = re.captures(self.remaining())?;
        let whole = caps.get(0)?;
        if whole.start() != 0 {
            return None;
        }
        let groups = re
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
            .collect();
        let n = whole.end();
        self.advance(n);
        Some(groups)
    }

    /// Consume `literal` if the input continues with it.
    pub fn match_literal(&mut self, literal: &str) -> bool {
        if self.remaining().starts_with(literal) {
            self.advance(literal.len());
            true
        } else {
            false
        }
    }

    /// Skip whitespace at the cursor and return how many bytes were skipped.
    pub fn skip_ws(&mut self) -> usize {
        let n = match self.ws.find(self.remaining()) {
            Some(m) if m.start() == 0 => m.end(),
            _ => 0,
        };
        self.advance(n);
        n
    }

    fn compiled(&self, pattern: &str) -> Result<Regex, GrammarError> {
        if let Some(re) = self.patterns.borrow().get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(&anchor(pattern)).map_err(|e| GrammarError::pattern(pattern, &e))?;
        self.patterns.borrow_mut().insert(pattern.to_string(), re.clone());
        Ok(re)
    }

    fn advance(&mut self, n: usize) {
        if let Some(line) = self.line.as_mut() {
            *line += self.buf[self.cursor..self.cursor + n].matches('\n').count();
        }
        self.cursor += n;
    }
}

impl From<&str> for Scanner {
    fn from(text: &str) -> Self {
        Scanner::new(text)
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rest = self.remaining();
        let preview: String = rest.chars().take(16).collect();
        f.debug_struct("Scanner")
            .field("cursor", &self.cursor)
            .field("len", &self.buf.len())
            .field("next", &preview)
            .finish()
    }
}

/// Anchor `pattern` at the start of the haystack.
pub(crate) fn anchor(pattern: &str) -> String {
    if pattern.starts_with('^') { pattern.to_string() } else { format!("^(?:{pattern})") }
}
