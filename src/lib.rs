//! Parses Solr-flavored boolean search queries into an expression tree and
//! emits PostgreSQL `tsquery` expressions or POSIX extended regular
//! expressions from it.
//!
//! ```
//! let tree = solrql::parse("foo and bar").unwrap();
//! assert_eq!(tree.tsquery().unwrap(), "( foo & bar )");
//! ```

mod ast;
mod emit;
mod error;
mod filter;
mod input;
mod lexer;
mod parser;

pub use ast::Node;
pub use error::SyntaxError;
pub use input::QueryInput;
pub use parser::parse;

impl Node {
    /// Filters this tree down to the nodes for which `predicate` returns
    /// `false` and emits the PostgreSQL tsquery encoding of what remains.
    pub fn tsquery(&self) -> Result<String, SyntaxError> {
        emit::to_tsquery(self)
    }

    /// Filters this tree down to the nodes for which `predicate` returns
    /// `false` and emits a POSIX extended regular expression for what
    /// remains.
    pub fn re(&self) -> Result<String, SyntaxError> {
        emit::to_regex(self)
    }

    /// Removes every subtree for which `predicate` returns `true`,
    /// propagating emptiness upward. Returns `None` if nothing survives.
    pub fn filter_tree(&self, predicate: impl Fn(&Self) -> bool) -> Option<Self> {
        filter::filter_tree(self, &predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_totality_on_valid_input() {
        assert!(parse("foo and bar").is_ok());
    }

    #[test]
    fn parse_totality_rejects_invalid_input() {
        assert!(parse("foo ~ 5").is_err());
    }

    #[test]
    fn and_or_flattening_law() {
        let tree = parse("foo and bar and baz").unwrap();
        match tree {
            Node::And(operands) => {
                assert_eq!(operands.len(), 3);
                assert!(!operands.iter().any(|o| matches!(o, Node::And(_))));
            }
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn case_insensitivity_law() {
        assert_eq!(parse("Foo AND Bar").unwrap(), parse("foo and bar").unwrap());
    }

    #[test]
    fn implicit_or_law() {
        assert_eq!(parse("foo bar").unwrap(), parse("foo or bar").unwrap());
    }

    #[test]
    fn idempotent_filtering_law() {
        let tree = parse("sentence:foo and media_id:1").unwrap();
        let once = tree.filter_tree(filter::is_non_sentence_field_or_noop);
        let twice = once.as_ref().and_then(|t| t.filter_tree(filter::is_non_sentence_field_or_noop));
        assert_eq!(once, twice);
    }

    #[test]
    fn accepts_bytes_input() {
        let bytes: &[u8] = b"foo and bar";
        assert_eq!(parse(bytes).unwrap(), parse("foo and bar").unwrap());
    }
}
