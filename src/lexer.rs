//! Query lexer: normalizes raw input and splits it into tokens.

use crate::error::SyntaxError;

/// Placeholder substituted for neutralized Solr range searches.
const NOOP_PLACEHOLDER: &str = "__noop__";
/// Placeholder appended to a field name in place of the trailing `:`.
const FIELD_PLACEHOLDER: &str = "__field__";
/// Placeholder appended to a term in place of a trailing `*`.
const WILD_PLACEHOLDER: &str = "__wild__";

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `(`
    Open,
    /// `)`
    Close,
    /// A quoted phrase, including its surrounding quote characters.
    Phrase(String),
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`, `!`, or `-`
    Not,
    /// A field prefix, still carrying its `__FIELD__` suffix.
    Field(String),
    /// A bare word, possibly carrying a trailing `__WILD__` marker.
    Term(String),
    /// `+`
    Plus,
    /// A neutralized range search.
    Noop,
}

/// The kind of a [`Token`], without its payload — used to check
/// grammar-position expectations (`want_type` in the parser).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// See [`Token::Open`].
    Open,
    /// See [`Token::Close`].
    Close,
    /// See [`Token::Phrase`].
    Phrase,
    /// See [`Token::And`].
    And,
    /// See [`Token::Or`].
    Or,
    /// See [`Token::Not`].
    Not,
    /// See [`Token::Field`].
    Field,
    /// See [`Token::Term`].
    Term,
    /// See [`Token::Plus`].
    Plus,
    /// See [`Token::Noop`].
    Noop,
}

impl Token {
    /// Returns this token's kind.
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Open => TokenKind::Open,
            Self::Close => TokenKind::Close,
            Self::Phrase(_) => TokenKind::Phrase,
            Self::And => TokenKind::And,
            Self::Or => TokenKind::Or,
            Self::Not => TokenKind::Not,
            Self::Field(_) => TokenKind::Field,
            Self::Term(_) => TokenKind::Term,
            Self::Plus => TokenKind::Plus,
            Self::Noop => TokenKind::Noop,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Runs the fixed normalization pipeline over raw input, in the order the
/// translator's contract requires: lowercase, `!` -> `-`, newlines -> space,
/// ranges -> noop placeholder, `:` -> field placeholder, `*` -> wildcard
/// placeholder.
fn normalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let bangless = lowered.replace('!', "-");
    let no_newlines = bangless.replace(['\n', '\r'], " ");
    let no_ranges = strip_ranges(&no_newlines);
    let no_colons = no_ranges.replace(':', &format!("{FIELD_PLACEHOLDER} "));
    no_colons.replace('*', WILD_PLACEHOLDER)
}

/// Replaces every `\w+:[...]` range search with [`NOOP_PLACEHOLDER`].
fn strip_ranges(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if is_word_char(chars[i]) {
            let start = i;
            let mut j = i;
            while j < chars.len() && is_word_char(chars[j]) {
                j += 1;
            }
            if j + 1 < chars.len() && chars[j] == ':' && chars[j + 1] == '[' {
                if let Some(close_rel) = chars[j + 2..].iter().position(|&c| c == ']') {
                    let close = j + 2 + close_rel;
                    out.push_str(NOOP_PLACEHOLDER);
                    i = close + 1;
                    continue;
                }
            }
            out.extend(&chars[start..j]);
            i = j;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// True if `lexeme` is a validly-placed wildcard term: it consists only of
/// word characters, ends with [`WILD_PLACEHOLDER`], and has at least one
/// character before the marker. Matches the source's `^\w+__WILD__$` check
/// (which, since `__WILD__` is itself all word characters, only actually
/// constrains the suffix and non-emptiness).
fn is_valid_wildcard_term(lexeme: &str) -> bool {
    match lexeme.strip_suffix(WILD_PLACEHOLDER) {
        Some(prefix) => !prefix.is_empty(),
        None => false,
    }
}

/// Splits normalized input into raw lexemes with their starting byte offset.
fn split_lexemes(input: &str) -> Result<Vec<(String, usize)>, SyntaxError> {
    let mut lexemes = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if matches!(ch, '(' | ')' | '+' | '-' | '~' | '/') {
            chars.next();
            lexemes.push((ch.to_string(), pos));
            continue;
        }

        if ch == '\'' || ch == '"' {
            let quote = ch;
            chars.next();
            let mut text = String::new();
            text.push(quote);
            loop {
                match chars.next() {
                    Some((_, c)) if c == quote => {
                        text.push(c);
                        break;
                    }
                    Some((_, c)) => text.push(c),
                    None => return Err(SyntaxError::at("unclosed quote", pos)),
                }
            }
            lexemes.push((text, pos));
            continue;
        }

        let start = pos;
        let mut end = pos;
        while let Some(&(p2, c2)) = chars.peek() {
            if c2.is_whitespace() || "()+-~/'\"".contains(c2) {
                break;
            }
            end = p2 + c2.len_utf8();
            chars.next();
        }
        lexemes.push((input[start..end].to_string(), start));
    }

    Ok(lexemes)
}

/// Classifies a single lexeme into a [`Token`].
fn classify(lexeme: String, position: usize) -> Result<Token, SyntaxError> {
    match lexeme.as_str() {
        "(" => return Ok(Token::Open),
        ")" => return Ok(Token::Close),
        "and" => return Ok(Token::And),
        "or" => return Ok(Token::Or),
        "not" | "!" | "-" => return Ok(Token::Not),
        "+" => return Ok(Token::Plus),
        "~" => return Err(SyntaxError::at("proximity searches not supported", position)),
        "/" => {
            return Err(SyntaxError::at(
                "regular expression searches not supported",
                position,
            ));
        }
        NOOP_PLACEHOLDER => return Ok(Token::Noop),
        _ => {}
    }

    if lexeme.starts_with('\'') || lexeme.starts_with('"') {
        return Ok(Token::Phrase(lexeme));
    }

    if lexeme.contains(WILD_PLACEHOLDER) && !is_valid_wildcard_term(&lexeme) {
        return Err(SyntaxError::at(
            "* can only appear at the end of a term",
            position,
        ));
    }

    if lexeme.ends_with(FIELD_PLACEHOLDER) {
        return Ok(Token::Field(lexeme));
    }

    if !lexeme.is_empty() && lexeme.chars().all(is_word_char) {
        return Ok(Token::Term(lexeme));
    }

    Err(SyntaxError::at(
        format!("unrecognized token '{lexeme}'"),
        position,
    ))
}

/// Normalizes and tokenizes a raw query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let normalized = normalize(input);
    log::trace!("normalized query: {normalized}");

    let lexemes = split_lexemes(&normalized)?;
    let tokens = lexemes
        .into_iter()
        .map(|(lexeme, pos)| classify(lexeme, pos))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("tokenized query: {tokens:?}");
    Ok(tokens)
}
