//! Recursive-descent parser turning a token stream into a [`Node`] tree.
//!
//! The grammar is driven by a `want_type` set: at each position the parser
//! knows which token kinds are grammatically valid, and uses that set both
//! to validate input and to decide when an operator must be inserted
//! implicitly (adjacent terms mean `or`; a term directly followed by `not`
//! means `and`).

use std::collections::VecDeque;

use crate::ast::Node;
use crate::error::SyntaxError;
use crate::input::QueryInput;
use crate::lexer::{self, Token, TokenKind};

/// Token kinds valid at the very start of an expression, or immediately
/// after a boolean operator / `not` / `(` / field prefix.
fn leading_kinds() -> Vec<TokenKind> {
    vec![
        TokenKind::Open,
        TokenKind::Phrase,
        TokenKind::Term,
        TokenKind::Field,
        TokenKind::Not,
        TokenKind::Plus,
        TokenKind::Noop,
    ]
}

/// Token kinds valid once at least one operand has been parsed in the
/// current clause: a boolean operator, `not` (triggers implicit `and`), a
/// leaf or `(` (triggers implicit `or`), or `)` to close the clause.
fn trailing_kinds() -> Vec<TokenKind> {
    let mut kinds = leading_kinds();
    kinds.push(TokenKind::And);
    kinds.push(TokenKind::Or);
    kinds.push(TokenKind::Close);
    kinds
}

/// Token kinds that start a fresh operand (used to detect when an implicit
/// operator must be inserted ahead of the current token).
fn leaf_starting_kinds() -> Vec<TokenKind> {
    vec![
        TokenKind::Open,
        TokenKind::Phrase,
        TokenKind::Term,
        TokenKind::Field,
        TokenKind::Noop,
    ]
}

/// Token kinds valid immediately after consuming `and`/`or`/`+`: the same
/// set as [`leading_kinds`] plus `)`, but — unlike [`trailing_kinds`] —
/// excluding `and`/`or` themselves, since a binary operator needs an
/// operand before another one is legal.
fn post_operator_kinds() -> Vec<TokenKind> {
    let mut kinds = leading_kinds();
    kinds.push(TokenKind::Close);
    kinds
}

/// Recursive-descent parser over a shared, mutable token stream.
///
/// The stream is shared (not sliced) across recursive calls because the
/// grammar occasionally lets an inner call consume tokens that logically
/// belong to an enclosing clause — e.g. a `not` applied to a field prefix
/// parses the field's operand with the outer clause's token stream still in
/// hand. Slicing would hide that coupling; a shared queue reproduces it.
struct Parser {
    tokens: VecDeque<Token>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens: tokens.into() }
    }

    /// Parses tokens until the stream is exhausted or a `)` closes the
    /// current clause, subject to `want_type` validity checks.
    ///
    /// Returns `Ok(None)` if no operand was found at all (empty clause).
    fn parse_tokens(&mut self, mut want_type: Vec<TokenKind>) -> Result<Option<Node>, SyntaxError> {
        let mut hanging_boolean: Option<Node> = None;
        let mut clause: Option<Node> = None;
        let mut closed = false;

        while let Some(token) = self.tokens.front().cloned() {
            let kind = token.kind();

            // A PLUS is a no-op at the start of a clause or immediately
            // after and/or/+ — i.e. whenever there is no completed operand
            // waiting to be combined with what follows. Checked dynamically
            // (not just at lexical position 0), since `foo and +bar` hits
            // this same condition mid-stream after `and` is consumed.
            if kind == TokenKind::Plus && (clause.is_none() || hanging_boolean.is_some()) {
                self.tokens.pop_front();
                continue;
            }

            // An operand-starting token arriving while we're sitting on a
            // completed operand means an operator was elided: `foo bar`
            // means `foo or bar`; this only fires once a clause exists.
            if clause.is_some()
                && hanging_boolean.is_none()
                && (leaf_starting_kinds().contains(&kind) || kind == TokenKind::Not)
            {
                self.tokens.push_front(if kind == TokenKind::Not {
                    Token::And
                } else {
                    Token::Or
                });
                continue;
            }

            if !want_type.contains(&kind) {
                return Err(SyntaxError::new(format!(
                    "unexpected token {kind:?} in query"
                )));
            }

            log::trace!("parse: token={token:?} want_type={want_type:?}");

            match token {
                Token::Close => {
                    self.tokens.pop_front();
                    closed = true;
                    break;
                }

                Token::Open => {
                    self.tokens.pop_front();
                    let inner = self.parse_tokens(trailing_kinds())?;
                    let node = inner.unwrap_or(Node::Noop);
                    clause = Some(merge_operand(clause, hanging_boolean.take(), node));
                }

                Token::Phrase(text) => {
                    self.tokens.pop_front();
                    let node = Node::Term { text, wildcard: false, phrase: true };
                    clause = Some(merge_operand(clause, hanging_boolean.take(), node));
                }

                Token::Term(raw) => {
                    self.tokens.pop_front();
                    let wildcard = raw.contains("__wild__");
                    let text = raw.replace("__wild__", "");
                    let node = Node::Term { text, wildcard, phrase: false };
                    clause = Some(merge_operand(clause, hanging_boolean.take(), node));
                }

                Token::Noop => {
                    self.tokens.pop_front();
                    clause = Some(merge_operand(clause, hanging_boolean.take(), Node::Noop));
                }

                Token::And | Token::Or => {
                    self.tokens.pop_front();
                    let is_or = kind == TokenKind::Or;
                    let base = clause.take().unwrap_or(Node::Noop);
                    hanging_boolean = Some(Node::wrap_boolean(base, is_or));
                }

                Token::Plus => {
                    self.tokens.pop_front();
                    let base = clause.take().unwrap_or(Node::Noop);
                    hanging_boolean = Some(Node::wrap_boolean(base, false));
                }

                Token::Field(raw) => {
                    self.tokens.pop_front();
                    let name = raw.replace("__field__", "");
                    let next = self.tokens.front().cloned();
                    let operand = match next {
                        Some(Token::Open) => {
                            self.tokens.pop_front();
                            self.parse_tokens(trailing_kinds())?.unwrap_or(Node::Noop)
                        }
                        _ => self.parse_single_operand()?,
                    };
                    let node = Node::Field { name, operand: Box::new(operand) };
                    clause = Some(merge_operand(clause, hanging_boolean.take(), node));
                }

                Token::Not => {
                    self.tokens.pop_front();
                    let next = self.tokens.front().cloned();
                    let operand = match next {
                        Some(Token::Open) => {
                            self.tokens.pop_front();
                            self.parse_tokens(trailing_kinds())?.unwrap_or(Node::Noop)
                        }
                        Some(Token::Field(_)) => {
                            self.parse_tokens(vec![TokenKind::Field])?.unwrap_or(Node::Noop)
                        }
                        _ => self.parse_single_operand()?,
                    };
                    let node = Node::Not(Box::new(operand));
                    clause = Some(merge_operand(clause, hanging_boolean.take(), node));
                }
            }

            if !closed {
                want_type = if matches!(kind, TokenKind::And | TokenKind::Or | TokenKind::Plus) {
                    post_operator_kinds()
                } else {
                    trailing_kinds()
                };
            }
        }

        if let Some(boolean) = hanging_boolean {
            let base = clause.take().unwrap_or(Node::Noop);
            clause = Some(Node::extend_boolean(boolean, base));
        }

        Ok(clause)
    }

    /// Parses exactly one leaf-or-paren operand — used for the right-hand
    /// side of `not`/field prefixes when that operand isn't itself
    /// parenthesized or another field.
    fn parse_single_operand(&mut self) -> Result<Node, SyntaxError> {
        match self.tokens.pop_front() {
            Some(Token::Open) => Ok(self.parse_tokens(trailing_kinds())?.unwrap_or(Node::Noop)),
            Some(Token::Phrase(text)) => Ok(Node::Term { text, wildcard: false, phrase: true }),
            Some(Token::Term(raw)) => {
                let wildcard = raw.contains("__wild__");
                let text = raw.replace("__wild__", "");
                Ok(Node::Term { text, wildcard, phrase: false })
            }
            Some(Token::Noop) => Ok(Node::Noop),
            Some(Token::Field(raw)) => {
                let name = raw.replace("__field__", "");
                let operand = match self.tokens.front().cloned() {
                    Some(Token::Open) => {
                        self.tokens.pop_front();
                        self.parse_tokens(trailing_kinds())?.unwrap_or(Node::Noop)
                    }
                    _ => self.parse_single_operand()?,
                };
                Ok(Node::Field { name, operand: Box::new(operand) })
            }
            Some(Token::Not) => {
                let operand = self.parse_single_operand()?;
                Ok(Node::Not(Box::new(operand)))
            }
            other => Err(SyntaxError::new(format!(
                "expected a term, phrase, or sub-expression, found {other:?}"
            ))),
        }
    }
}

/// Folds a freshly parsed `node` into the running `clause`, first resolving
/// any `hanging_boolean` left over from a preceding `and`/`or`/`+` token.
fn merge_operand(clause: Option<Node>, hanging_boolean: Option<Node>, node: Node) -> Node {
    match hanging_boolean {
        Some(boolean) => Node::extend_boolean(boolean, node),
        None => match clause {
            Some(existing) => Node::extend_boolean(Node::wrap_boolean(existing, true), node),
            None => node,
        },
    }
}

/// Parses a query into its expression tree.
///
/// The input is accepted via [`QueryInput`], so `&str`, `String`, byte
/// slices, and byte vectors can all be passed directly. Returns an error if
/// the query is empty, unparseable, or uses an unsupported construct
/// (proximity search, regex literal).
pub fn parse(input: impl QueryInput) -> Result<Node, SyntaxError> {
    let query = input.into_query_string();
    let tokens = lexer::tokenize(&query)?;
    log::debug!("parsing {} tokens", tokens.len());

    let mut parser = Parser::new(tokens);
    let result = parser.parse_tokens(leading_kinds())?;

    result.ok_or_else(|| SyntaxError::new("query is empty"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Node {
        Node::Term { text: s.into(), wildcard: false, phrase: false }
    }

    #[test]
    fn single_term() {
        assert_eq!(parse("foo").unwrap(), term("foo"));
    }

    #[test]
    fn empty_query_errors() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
    }

    #[test]
    fn explicit_and() {
        assert_eq!(
            parse("foo and bar").unwrap(),
            Node::And(vec![term("foo"), term("bar")])
        );
    }

    #[test]
    fn explicit_or() {
        assert_eq!(
            parse("foo or bar").unwrap(),
            Node::Or(vec![term("foo"), term("bar")])
        );
    }

    #[test]
    fn implicit_or_on_adjacency() {
        assert_eq!(parse("foo bar").unwrap(), parse("foo or bar").unwrap());
    }

    #[test]
    fn implicit_and_before_not() {
        assert_eq!(
            parse("foo not bar").unwrap(),
            Node::And(vec![term("foo"), Node::Not(Box::new(term("bar")))])
        );
    }

    #[test]
    fn not_prefix_forms() {
        assert_eq!(parse("-foo").unwrap(), Node::Not(Box::new(term("foo"))));
        assert_eq!(parse("!foo").unwrap(), parse("-foo").unwrap());
    }

    #[test]
    fn plus_acts_as_and() {
        assert_eq!(parse("foo +bar").unwrap(), parse("foo and bar").unwrap());
    }

    #[test]
    fn parenthesized_group() {
        assert_eq!(
            parse("(foo or bar) and baz").unwrap(),
            Node::And(vec![
                Node::Or(vec![term("foo"), term("bar")]),
                term("baz")
            ])
        );
    }

    #[test]
    fn field_prefix_single_term() {
        assert_eq!(
            parse("sentence:foo").unwrap(),
            Node::Field { name: "sentence".into(), operand: Box::new(term("foo")) }
        );
    }

    #[test]
    fn field_prefix_group() {
        assert_eq!(
            parse("sentence:(foo and bar)").unwrap(),
            Node::Field {
                name: "sentence".into(),
                operand: Box::new(Node::And(vec![term("foo"), term("bar")])),
            }
        );
    }

    #[test]
    fn not_field_prefix() {
        assert_eq!(
            parse("-title:deprecated").unwrap(),
            Node::Not(Box::new(Node::Field {
                name: "title".into(),
                operand: Box::new(term("deprecated")),
            }))
        );
    }

    #[test]
    fn wildcard_term_sets_flag() {
        assert_eq!(
            parse("foo*").unwrap(),
            Node::Term { text: "foo".into(), wildcard: true, phrase: false }
        );
    }

    #[test]
    fn phrase_term() {
        assert_eq!(
            parse("\"hello world\"").unwrap(),
            Node::Term { text: "\"hello world\"".into(), wildcard: false, phrase: true }
        );
    }

    #[test]
    fn range_neutralized_to_noop() {
        assert_eq!(
            parse("foo:[1 TO 10] and bar").unwrap(),
            Node::And(vec![Node::Noop, term("bar")])
        );
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(parse("FOO AND Bar").unwrap(), parse("foo and bar").unwrap());
    }

    #[test]
    fn nested_and_flattens() {
        assert_eq!(
            parse("foo and bar and baz").unwrap(),
            Node::And(vec![term("foo"), term("bar"), term("baz")])
        );
    }

    #[test]
    fn plus_after_and_is_skipped_not_overwritten() {
        assert_eq!(
            parse("foo and +bar").unwrap(),
            Node::And(vec![term("foo"), term("bar")])
        );
    }

    #[test]
    fn doubled_leading_plus_is_skipped() {
        assert_eq!(parse("+ +foo").unwrap(), term("foo"));
    }

    #[test]
    fn repeated_binary_operator_is_a_syntax_error() {
        assert!(parse("foo and and bar").is_err());
        assert!(parse("foo or or bar").is_err());
    }
}
