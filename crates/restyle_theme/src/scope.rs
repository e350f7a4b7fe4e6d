//! Selector scoping for exported stylesheets
//!
//! Prefixes every style rule's selectors with a scope selector so an
//! exported theme only applies inside one container. `html`, `body` and
//! `:root` map onto the scope itself. Conditional group rules (`@media`,
//! `@supports`, ...) are scoped recursively; other at-rules such as
//! `@keyframes` and `@font-face` are copied untouched.
//!
//! The stylesheet is split into rules with nom combinators. Declaration
//! blocks are only balanced, never interpreted, and anything the
//! combinators cannot split is copied through as-is.

use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag, take_until, take_while1},
    character::complete::{anychar, char, multispace1},
    combinator::{map, not, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

/// At-rules whose bodies contain ordinary style rules
const NESTED_AT_RULES: &[&str] = &["media", "supports", "document", "layer", "container"];

type Parsed<'a> = IResult<&'a str, &'a str>;

/// One top-level item of a stylesheet
enum Item<'a> {
    /// `prelude { body }`
    Rule { prelude: &'a str, body: &'a str },
    /// A statement at-rule or stray closing brace, copied as-is
    Verbatim(&'a str),
}

/// Scope every selector in `css` under `scope`
pub fn scope_css(css: &str, scope: &str) -> String {
    let scope = scope.trim();
    if scope.is_empty() {
        return css.to_string();
    }
    let mut out = String::with_capacity(css.len() + css.len() / 4);
    scope_block(css, scope, &mut out);
    out
}

fn scope_block(input: &str, scope: &str, out: &mut String) {
    let mut rest = input;
    loop {
        if let Ok((after, lead)) = trivia(rest) {
            out.push_str(lead);
            rest = after;
        }
        if rest.is_empty() {
            return;
        }
        match item(rest) {
            Ok((after, Item::Rule { prelude, body })) => {
                emit_rule(prelude, body, scope, out);
                rest = after;
            }
            Ok((after, Item::Verbatim(text))) => {
                out.push_str(text);
                rest = after;
            }
            Err(_) => {
                out.push_str(rest);
                return;
            }
        }
    }
}

fn emit_rule(prelude: &str, body: &str, scope: &str, out: &mut String) {
    if prelude.starts_with('@') {
        let name = at_keyword(prelude).map_or("", |(_, name)| name);
        out.push_str(prelude);
        out.push('{');
        if NESTED_AT_RULES.contains(&name.to_ascii_lowercase().as_str()) {
            scope_block(body, scope, out);
        } else {
            out.push_str(body);
        }
        out.push('}');
        return;
    }

    let selectors = prelude.trim_end();
    let trailing = &prelude[selectors.len()..];
    let scoped: Vec<String> = split_selectors(selectors)
        .into_iter()
        .map(|s| scope_selector(s.trim(), scope))
        .collect();
    out.push_str(&scoped.join(", "));
    out.push_str(trailing);
    out.push('{');
    out.push_str(body);
    out.push('}');
}

fn scope_selector(selector: &str, scope: &str) -> String {
    for root in ["html", "body", ":root"] {
        if selector == root {
            return scope.to_string();
        }
        if let Some(rest) = selector.strip_prefix(root) {
            if rest.starts_with(|c: char| c.is_whitespace() || c == '>') {
                return format!("{}{}", scope, rest);
            }
        }
    }
    format!("{} {}", scope, selector)
}

/// Split a selector list on top-level commas
fn split_selectors(list: &str) -> Vec<&str> {
    match selector_list(list) {
        Ok(("", parts)) => parts,
        _ => vec![list],
    }
}

// ========== Combinators ==========

/// Parse a block comment /* ... */
fn comment(input: &str) -> Parsed<'_> {
    recognize(delimited(tag("/*"), take_until("*/"), tag("*/")))(input)
}

/// Whitespace and comments between items
fn trivia(input: &str) -> Parsed<'_> {
    recognize(many0(alt((multispace1, comment))))(input)
}

/// A quoted string, escapes included
fn string_literal(input: &str) -> Parsed<'_> {
    alt((
        recognize(delimited(
            char('"'),
            opt(escaped(is_not("\\\""), '\\', anychar)),
            char('"'),
        )),
        recognize(delimited(
            char('\''),
            opt(escaped(is_not("\\'"), '\\', anychar)),
            char('\''),
        )),
    ))(input)
}

/// A `/` that does not open a comment
fn lone_slash(input: &str) -> Parsed<'_> {
    recognize(terminated(char('/'), not(char('*'))))(input)
}

/// Everything up to the `{` or `;` ending a rule prelude
fn prelude(input: &str) -> Parsed<'_> {
    recognize(many0(alt((
        string_literal,
        comment,
        is_not("\"'/{};"),
        lone_slash,
    ))))(input)
}

/// Contents of a `{ ... }` block with nested braces balanced
fn block_body(input: &str) -> Parsed<'_> {
    recognize(many0(alt((
        string_literal,
        comment,
        braced,
        is_not("\"'/{}"),
        lone_slash,
    ))))(input)
}

fn braced(input: &str) -> Parsed<'_> {
    recognize(delimited(char('{'), block_body, char('}')))(input)
}

fn item(input: &str) -> IResult<&str, Item<'_>> {
    alt((
        map(
            pair(prelude, delimited(char('{'), block_body, char('}'))),
            |(prelude, body)| Item::Rule { prelude, body },
        ),
        map(recognize(terminated(prelude, char(';'))), Item::Verbatim),
        map(recognize(char('}')), Item::Verbatim),
    ))(input)
}

/// Name of an at-rule, without the `@`
fn at_keyword(input: &str) -> Parsed<'_> {
    preceded(
        char('@'),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
    )(input)
}

/// `( ... )` or `[ ... ]` inside a selector
fn grouped(input: &str) -> Parsed<'_> {
    alt((
        recognize(delimited(char('('), grouped_body, char(')'))),
        recognize(delimited(char('['), grouped_body, char(']'))),
    ))(input)
}

fn grouped_body(input: &str) -> Parsed<'_> {
    recognize(many0(alt((
        string_literal,
        comment,
        grouped,
        is_not("()[]\"'/"),
        lone_slash,
    ))))(input)
}

/// One selector of a list; commas inside groups and strings do not end it
fn selector(input: &str) -> Parsed<'_> {
    recognize(many0(alt((
        string_literal,
        comment,
        grouped,
        is_not(",()[]\"'/"),
        lone_slash,
    ))))(input)
}

fn selector_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(char(','), selector)(input)
}
