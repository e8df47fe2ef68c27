use std::borrow::Cow;
use std::fmt::Write;

use crate::fragment::tokens::Token;
use crate::params::{Param, PlaceholderStyle};

/// A piece of query text.
///
/// - `Token` - keywords, operators and punctuation
/// - `Ident` - a qualified path or entity name, written as-is
/// - `Raw` - caller-supplied text and literals
/// - `Param` - a named parameter with its bound value
/// - `Func` - a function name followed by its opening parenthesis
#[derive(Debug, Clone, PartialEq)]
pub enum SQLChunk {
    Token(Token),
    Ident(Cow<'static, str>),
    Raw(Cow<'static, str>),
    Param(Param),
    Func(&'static str),
}

impl SQLChunk {
    pub fn ident(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Ident(name.into())
    }

    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self::Raw(text.into())
    }

    /// Write chunk content to buffer
    pub(crate) fn write(&self, buf: &mut impl Write, style: PlaceholderStyle) {
        match self {
            SQLChunk::Token(token) => {
                let _ = buf.write_str(token.as_str());
            }
            SQLChunk::Ident(text) | SQLChunk::Raw(text) => {
                let _ = buf.write_str(text);
            }
            SQLChunk::Param(param) => {
                let _ = buf.write_char(style.prefix());
                let _ = buf.write_str(&param.name);
            }
            SQLChunk::Func(name) => {
                let _ = buf.write_str(name);
                let _ = buf.write_char('(');
            }
        }
    }

    /// Check if this chunk is "word-like" (needs space separation from other word-like chunks)
    #[inline]
    pub(crate) const fn is_word_like(&self) -> bool {
        match self {
            SQLChunk::Token(t) => !matches!(
                t,
                Token::LPAREN
                    | Token::RPAREN
                    | Token::COMMA
                    | Token::EQ
                    | Token::NE
                    | Token::LT
                    | Token::GT
                    | Token::LE
                    | Token::GE
            ),
            SQLChunk::Ident(_) | SQLChunk::Raw(_) | SQLChunk::Param(_) | SQLChunk::Func(_) => true,
        }
    }
}

impl From<Token> for SQLChunk {
    #[inline]
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<Param> for SQLChunk {
    #[inline]
    fn from(value: Param) -> Self {
        Self::Param(value)
    }
}

/// Spacing between two adjacent chunks.
pub(crate) fn chunk_needs_space(current: &SQLChunk, next: &SQLChunk) -> bool {
    match (current, next) {
        // No space before closing/separator punctuation
        (_, SQLChunk::Token(Token::RPAREN | Token::COMMA)) => false,
        // No space after opening punctuation
        (SQLChunk::Token(Token::LPAREN) | SQLChunk::Func(_), _) => false,
        // Space after comma
        (SQLChunk::Token(Token::COMMA), _) => true,
        // Space around comparison operators
        (SQLChunk::Token(t), _) if t.is_operator() => true,
        (_, SQLChunk::Token(t)) if t.is_operator() => true,
        // Space after closing paren if next is word-like (e.g., ") and")
        (SQLChunk::Token(Token::RPAREN), next) => next.is_word_like(),
        // Space before opening paren if preceded by word-like (e.g., "in (")
        (current, SQLChunk::Token(Token::LPAREN)) => current.is_word_like(),
        // Space between all word-like chunks
        _ => current.is_word_like() && next.is_word_like(),
    }
}
