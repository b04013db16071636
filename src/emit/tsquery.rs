//! Emits PostgreSQL `tsquery` text-search expressions.

use crate::ast::Node;
use crate::error::SyntaxError;
use crate::filter::{filter_tree, is_non_sentence_field_or_noop};

/// Filters `node` down to its sentence-scoped, range-free content and emits
/// it as a tsquery expression.
pub fn to_tsquery(node: &Node) -> Result<String, SyntaxError> {
    let filtered = filter_tree(node, &is_non_sentence_field_or_noop)
        .ok_or_else(|| SyntaxError::new("query is empty without fields or ranges"))?;
    emit(&filtered)
}

fn emit(node: &Node) -> Result<String, SyntaxError> {
    match node {
        Node::Term { text, wildcard: true, .. } => Ok(format!("{text}:*")),

        Node::Term { text, phrase: true, .. } => emit_phrase(text),

        Node::Term { text, .. } => Ok(text.clone()),

        Node::And(operands) => {
            let parts = operands.iter().map(emit).collect::<Result<Vec<_>, _>>()?;
            Ok(format!("( {} )", parts.join(" & ")))
        }

        Node::Or(operands) => {
            let parts = operands.iter().map(emit).collect::<Result<Vec<_>, _>>()?;
            Ok(format!("( {} )", parts.join(" | ")))
        }

        Node::Not(operand) => Ok(format!("!{}", emit(operand)?)),

        Node::Field { name, operand } if name == "sentence" => emit(operand),

        Node::Field { .. } | Node::Noop => Err(SyntaxError::new(
            "cannot emit tsquery for unfiltered field or noop node",
        )),
    }
}

/// Splits a quoted phrase's inner text on non-word runs, discards empty
/// pieces, and emits the remaining words conjoined.
fn emit_phrase(quoted: &str) -> Result<String, SyntaxError> {
    let inner = quoted.trim_matches(|c| c == '"' || c == '\'');
    let words: Vec<&str> = inner
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return Err(SyntaxError::new("phrase contains no terms"));
    }

    Ok(format!("( {} )", words.join(" & ")))
}
