//! Error type for the query translator.
//!
//! The translator has exactly one error kind: a syntax error with a
//! human-readable message and, where known, the byte position in the
//! original query that triggered it.

use thiserror::Error;

/// A syntax error encountered while lexing, parsing, or emitting a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    /// Human-readable description of what went wrong.
    pub message: String,
    /// Byte offset into the (normalized) query where the error was
    /// detected, if the error originated at a specific point in the input.
    pub position: Option<usize>,
}

impl SyntaxError {
    /// Creates a syntax error with no position information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    /// Creates a syntax error anchored to a byte offset in the input.
    pub fn at(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Formats the error with a caret pointing at the offending position,
    /// given the original (pre-normalization) query text.
    pub fn format_with_context(&self, query: &str) -> String {
        let mut out = format!("query syntax error: {}\n", self.message);
        if let Some(pos) = self.position {
            let clamped = pos.min(query.len());
            out.push_str(&format!("  {query}\n"));
            out.push_str(&format!("  {}^", " ".repeat(clamped)));
        }
        out
    }
}
