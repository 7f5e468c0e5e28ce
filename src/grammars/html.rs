//! A small HTML subset: nested tags with double-quoted attributes and text.
//!
//! ```text
//! tag       := tagstart elements tagend
//! tagstart  := '<' TAG attributes '>'
//! tagend    := '<' SLASH TAG '>'
//! elements  := (TEXT | tag)*
//! attributes:= (WS ATTRK '=' STRING)*
//! ```
//!
//! No void elements, comments or entities. Opening and closing names are not
//! checked against each other.

use crate::terminals::{atom, atom_exact, string};
use crate::{Ast, GrammarError, Parser, ParserRef};

/// The `tag` rule, building its tree with `ast`.
pub fn grammar(ast: &Ast) -> Result<Parser, GrammarError> {
    let tag = ParserRef::new("tag");

    let opentag = atom_exact("<", "OT");
    let closetag = atom(">", "CT");
    let equal = atom_exact("=", "EQUAL");
    let slash = token_exact!(r"/[ \t]*", "SLASH");
    let tagname = token_exact!(r"[a-z][a-zA-Z0-9]*", "TAG");
    let attrkey = token_exact!(r"[a-z][a-zA-Z0-9]*", "ATTRK");
    let text = token_exact!(r"[^<>]+", "TEXT");
    let ws = token_exact!(r"[ \t\r\n]+", "WS");

    let element = ast.ordered_choice("element", None, parsers![text, &tag])?;
    let elements = ast.zero_or_more("elements", None, parsers![element])?;
    let attribute = ast.sequence("attribute", None, parsers![attrkey, equal, string()])?;
    let attrws = ast.sequence("attrws", None, parsers![ws, attribute])?;
    let attributes = ast.zero_or_more("attributes", None, parsers![attrws])?;
    let tagstart = ast.sequence("tagstart", None, parsers![&opentag, tagname.clone(), attributes, &closetag])?;
    let tagend = ast.sequence("tagend", None, parsers![opentag, slash, tagname, closetag])?;
    tag.bind(ast.sequence("tag", None, parsers![tagstart, elements, tagend])?)?;
    Ok(Parser::from(&tag).owning(&[&tag]))
}
