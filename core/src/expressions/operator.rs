use std::fmt;

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    Diff,
    LessOrEqual,
    Less,
    GreaterOrEqual,
    Greater,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    /// Value appears in a comma-delimited set column
    FindInSet,
    NotFindInSet,
}

impl Operator {
    /// Textual form used by the textual backend
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::Diff => "<>",
            Operator::LessOrEqual => "<=",
            Operator::Less => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::Greater => ">",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
            Operator::FindInSet | Operator::NotFindInSet => "find_in_set",
        }
    }

    #[inline]
    pub const fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    #[inline]
    pub const fn is_null_check(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    #[inline]
    pub const fn is_find_in_set(&self) -> bool {
        matches!(self, Operator::FindInSet | Operator::NotFindInSet)
    }

    /// `<`, `<=`, `>`, `>=`
    #[inline]
    pub const fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Less | Operator::LessOrEqual | Operator::Greater | Operator::GreaterOrEqual
        )
    }

    /// Operators allowed between two field paths
    #[inline]
    pub const fn supports_field_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equal
                | Operator::Diff
                | Operator::Like
                | Operator::NotLike
                | Operator::Less
                | Operator::LessOrEqual
                | Operator::Greater
                | Operator::GreaterOrEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an item attaches to whatever precedes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }
}
