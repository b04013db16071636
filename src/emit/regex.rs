//! Emits POSIX extended regular expressions with word-boundary matching.

use crate::ast::Node;
use crate::error::SyntaxError;
use crate::filter::{filter_tree, is_non_sentence_field_or_noop_or_not};

/// Filters `node` down to its sentence-scoped, negation-free content and
/// emits it as a POSIX extended regular expression.
pub fn to_regex(node: &Node) -> Result<String, SyntaxError> {
    let filtered = filter_tree(node, &is_non_sentence_field_or_noop_or_not)
        .ok_or_else(|| SyntaxError::new("query is empty without fields or ranges"))?;
    emit(&filtered)
}

fn emit(node: &Node) -> Result<String, SyntaxError> {
    match node {
        Node::Term { text, phrase: true, .. } => emit_phrase(text),

        Node::Term { text, .. } => Ok(format!("[[:<:]]{}", escape(text))),

        Node::And(operands) => emit_and(operands),

        Node::Or(operands) => {
            let parts = operands.iter().map(emit).collect::<Result<Vec<_>, _>>()?;
            Ok(format!("(?: {} )", parts.join(" | ")))
        }

        Node::Not(_) => Err(SyntaxError::new(
            "cannot emit regex for a negated node (unfiltered Not)",
        )),

        Node::Field { name, operand } if name == "sentence" => emit(operand),

        Node::Field { .. } | Node::Noop => Err(SyntaxError::new(
            "cannot emit regex for unfiltered field or noop node",
        )),
    }
}

/// Emits an `And` node's operands with the asymmetric pairwise-adjacency
/// recursion: the first operand is paired against the regex produced by
/// recursing on the remaining operands, not against each remaining operand
/// individually. This nests unevenly for 3+ operands; kept as-is.
fn emit_and(operands: &[Node]) -> Result<String, SyntaxError> {
    match operands {
        [] => Err(SyntaxError::new("and node has no operands")),
        [only] => emit(only),
        [head, tail @ ..] => {
            let a = emit(head)?;
            let rest = emit_and(tail)?;
            Ok(format!("(?: (?: {a} .* {rest} ) | (?: {rest} .* {a} ) )"))
        }
    }
}

fn emit_phrase(quoted: &str) -> Result<String, SyntaxError> {
    let inner = quoted.trim_matches(|c| c == '"' || c == '\'');
    let escaped = escape(inner);
    let collapsed = collapse_whitespace(&escaped);
    Ok(format!("[[:<:]]{collapsed}"))
}

/// Escapes POSIX ERE metacharacters in `text`.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Replaces runs of whitespace with `[[:space:]]+`.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            out.push_str("[[:space:]]+");
        } else {
            out.push(c);
        }
    }
    out
}
