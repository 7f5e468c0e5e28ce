/// Compile a regular expression once and hand out a `&'static Regex`.
///
/// Literal patterns are part of the crate's own grammars, so a bad pattern is
/// a bug in this crate rather than a caller error.
#[macro_export]
macro_rules! regex {
    ($pat:expr) => {{
        static RE: $crate::__private::Lazy<$crate::__private::Regex> =
            $crate::__private::Lazy::new(|| $crate::__private::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Leaf parser for a static pattern, skipping leading whitespace.
///
/// The pattern is anchored at the cursor for you.
#[macro_export]
macro_rules! token {
    ($pat:literal, $name:expr) => {
        $crate::terminals::token_regex($crate::regex!(concat!("^(?:", $pat, ")")), $name)
    };
}

/// Same as [`token!`] without skipping leading whitespace.
#[macro_export]
macro_rules! token_exact {
    ($pat:literal, $name:expr) => {
        $crate::terminals::token_exact_regex($crate::regex!(concat!("^(?:", $pat, ")")), $name)
    };
}

/// Build a `Vec<Parser>` from parsers and forward references alike.
///
/// ```ignore
/// let tag = ParserRef::new("tag");
/// let element = ast.ordered_choice("element", None, parsers![text, &tag])?;
/// ```
#[macro_export]
macro_rules! parsers {
    ($($p:expr),* $(,)?) => {
        vec![ $($crate::Parser::from($p)),* ]
    };
}
