mod chunk;
mod tokens;

pub use chunk::SQLChunk;
pub use tokens::Token;

use std::borrow::Cow;
use std::fmt::{self, Display, Write};

use smallvec::SmallVec;

use crate::params::{Param, PlaceholderStyle};
use chunk::chunk_needs_space;

/// Query text fragment with flat chunk storage.
///
/// Uses `SmallVec<[SQLChunk; 8]>` for inline storage of typical fragments
/// without heap allocation. Spacing is decided when rendering, so builders
/// only push tokens, paths and parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SQL {
    pub chunks: SmallVec<[SQLChunk; 8]>,
}

impl SQL {
    // ==================== constructors ====================

    /// Creates an empty fragment
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// Creates a fragment with a single token
    #[inline]
    pub fn token(t: Token) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Token(t)],
        }
    }

    /// Creates a fragment holding a path or entity name
    #[inline]
    pub fn ident(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::ident(name)],
        }
    }

    /// Creates a fragment holding raw text
    #[inline]
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::raw(text)],
        }
    }

    /// Creates a fragment holding one named parameter
    #[inline]
    pub fn param(name: impl Into<String>, value: impl Into<anvil_core::Value>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Param(Param::new(name, value.into()))],
        }
    }

    /// Function call: `name(args)`
    #[inline]
    pub fn func(name: &'static str, args: SQL) -> Self {
        SQL {
            chunks: smallvec::smallvec![SQLChunk::Func(name)],
        }
        .append(args)
        .push(Token::RPAREN)
    }

    // ==================== builder methods ====================

    /// Append another fragment (flat extend)
    #[inline]
    pub fn append(mut self, other: impl Into<SQL>) -> Self {
        self.append_mut(other);
        self
    }

    #[inline]
    pub fn append_mut(&mut self, other: impl Into<SQL>) {
        let other = other.into();
        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        self.chunks.extend(other.chunks);
    }

    /// Push a single chunk
    #[inline]
    pub fn push(mut self, chunk: impl Into<SQLChunk>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    #[inline]
    pub fn push_mut(&mut self, chunk: impl Into<SQLChunk>) {
        self.chunks.push(chunk.into());
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    // ==================== combinators ====================

    /// Joins fragments with a separator, skipping empty ones
    pub fn join<T>(sqls: T, separator: Token) -> SQL
    where
        T: IntoIterator<Item = SQL>,
    {
        let mut result = SQL::empty();
        for sql in sqls.into_iter().filter(|sql| !sql.is_empty()) {
            if !result.is_empty() {
                result.chunks.push(SQLChunk::Token(separator));
            }
            result.chunks.extend(sql.chunks);
        }
        result
    }

    /// Wrap in parentheses: (self)
    #[inline]
    pub fn parens(self) -> Self {
        SQL::token(Token::LPAREN).append(self).push(Token::RPAREN)
    }

    /// Aliased version: self as name
    pub fn alias(self, name: impl Into<Cow<'static, str>>) -> SQL {
        self.push(Token::AS).push(SQLChunk::ident(name))
    }

    // ==================== rendering ====================

    /// Renders the text with `:name` placeholders
    pub fn sql(&self) -> String {
        self.sql_with(PlaceholderStyle::Colon)
    }

    pub fn sql_with(&self, style: PlaceholderStyle) -> String {
        let mut buf = String::with_capacity(self.chunks.len().saturating_mul(8).max(64));
        self.write_to(&mut buf, style);
        buf
    }

    pub fn write_to(&self, buf: &mut impl Write, style: PlaceholderStyle) {
        for (i, chunk) in self.chunks.iter().enumerate() {
            chunk.write(buf, style);
            if self.needs_space(i) {
                let _ = buf.write_char(' ');
            }
        }
    }

    fn needs_space(&self, index: usize) -> bool {
        let Some(next) = self.chunks.get(index + 1) else {
            return false;
        };
        chunk_needs_space(&self.chunks[index], next)
    }

    /// Iterates bound parameters in emission order
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Param(param) => Some(param),
            _ => None,
        })
    }
}

impl From<Token> for SQL {
    fn from(value: Token) -> Self {
        SQL::token(value)
    }
}

impl Display for SQL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, PlaceholderStyle::Colon);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_rules() {
        let sql = SQL::ident("user.age")
            .push(Token::GT)
            .append(SQL::param("age_1", 25))
            .push(Token::AND)
            .append(
                SQL::ident("user.id")
                    .push(Token::IN)
                    .append(SQL::param("id_2", vec![1, 2]).parens()),
            );
        assert_eq!(sql.sql(), "user.age > :age_1 and user.id in (:id_2)");
    }

    #[test]
    fn test_func_and_alias() {
        let sql = SQL::func("count", SQL::ident("user.id")).alias("total");
        assert_eq!(sql.sql(), "count(user.id) as total");

        let sql = SQL::func("find_in_set", SQL::param("tags_1", "a").push(Token::COMMA).append(SQL::ident("user.tags")))
            .push(Token::GT)
            .append(SQL::raw("0"));
        assert_eq!(sql.sql(), "find_in_set(:tags_1, user.tags) > 0");
    }

    #[test]
    fn test_join_skips_empty() {
        let sql = SQL::join(
            [SQL::ident("a"), SQL::empty(), SQL::ident("b")],
            Token::COMMA,
        );
        assert_eq!(sql.sql(), "a, b");
        assert!(SQL::join(Vec::new(), Token::AND).is_empty());
    }

    #[test]
    fn test_exists_subquery() {
        let sql = SQL::token(Token::NOT)
            .push(Token::EXISTS)
            .append(SQL::token(Token::SELECT).append(SQL::ident("pet")).parens());
        assert_eq!(sql.sql(), "not exists (select pet)");
    }

    #[test]
    fn test_placeholder_style_and_params() {
        let sql = SQL::ident("user.name")
            .push(Token::EQ)
            .append(SQL::param("name_1", "Ann"));
        assert_eq!(sql.sql_with(PlaceholderStyle::AtSign), "user.name = @name_1");
        let params: Vec<_> = sql.params().map(|p| p.name.as_str()).collect();
        assert_eq!(params, ["name_1"]);
    }
}
