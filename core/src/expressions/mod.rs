//! Filter primitives: conditions, groups, field comparisons and exists checks.
//!
//! Every filter is a [`Where`] variant, so backends handle them with
//! exhaustive matches.

mod operator;

pub use operator::{Combinator, Operator};

use crate::query::Query;
use crate::value::Value;

/// Right-hand side of a [`Condition`]
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No value; null checks, or an explicit null
    None,
    Value(Value),
    List(Vec<Value>),
    Subquery(Box<Query>),
}

impl Operand {
    /// Splits lists out of scalar values and maps NULL to [`Operand::None`]
    pub fn from_value(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Null => Operand::None,
            Value::List(items) => Operand::List(items),
            scalar => Operand::Value(scalar),
        }
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Operand::None)
    }
}

impl From<Query> for Operand {
    fn from(query: Query) -> Self {
        Operand::Subquery(Box::new(query))
    }
}

/// A single `field <op> value` leaf
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub operand: Operand,
    pub combinator: Combinator,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: Operand::from_value(value),
            combinator: Combinator::And,
        }
    }

    /// A condition without a value, such as `is null`
    pub fn unary(field: impl Into<String>, operator: Operator) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: Operand::None,
            combinator: Combinator::And,
        }
    }

    pub fn subquery(field: impl Into<String>, operator: Operator, query: Query) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: Operand::from(query),
            combinator: Combinator::And,
        }
    }

    pub fn or(mut self) -> Self {
        self.combinator = Combinator::Or;
        self
    }
}

/// Parenthesized, ordered set of filters joined by one internal combinator
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionGroup {
    pub items: Vec<Where>,
    /// Combinator the group builder assigns to items added through it
    pub operator: Combinator,
    /// How the group attaches to what precedes it
    pub combinator: Combinator,
}

impl ConditionGroup {
    pub fn new(operator: Combinator) -> Self {
        Self {
            items: Vec::new(),
            operator,
            combinator: Combinator::And,
        }
    }

    /// True when the group renders to nothing
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(Where::is_empty)
    }
}

/// A condition whose right-hand side is another field path
#[derive(Debug, Clone, PartialEq)]
pub struct FieldComparison {
    pub field: String,
    pub operator: Operator,
    pub other: String,
    pub combinator: Combinator,
}

/// `exists (subquery)` or `not exists (subquery)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExistsCondition {
    pub subquery: Box<Query>,
    pub exists: bool,
    pub combinator: Combinator,
}

/// Caller-supplied predicate text, emitted verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct RawCondition {
    pub sql: String,
    pub combinator: Combinator,
}

/// One filter entry of a query
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    Condition(Condition),
    Group(ConditionGroup),
    Field(FieldComparison),
    Exists(ExistsCondition),
    Raw(RawCondition),
}

impl Where {
    pub fn combinator(&self) -> Combinator {
        match self {
            Where::Condition(c) => c.combinator,
            Where::Group(g) => g.combinator,
            Where::Field(f) => f.combinator,
            Where::Exists(e) => e.combinator,
            Where::Raw(r) => r.combinator,
        }
    }

    pub fn with_combinator(mut self, combinator: Combinator) -> Self {
        match &mut self {
            Where::Condition(c) => c.combinator = combinator,
            Where::Group(g) => g.combinator = combinator,
            Where::Field(f) => f.combinator = combinator,
            Where::Exists(e) => e.combinator = combinator,
            Where::Raw(r) => r.combinator = combinator,
        }
        self
    }

    /// Only groups with nothing to render are empty
    pub fn is_empty(&self) -> bool {
        match self {
            Where::Group(group) => group.is_empty(),
            _ => false,
        }
    }
}

impl From<Condition> for Where {
    fn from(value: Condition) -> Self {
        Where::Condition(value)
    }
}

impl From<ConditionGroup> for Where {
    fn from(value: ConditionGroup) -> Self {
        Where::Group(value)
    }
}

impl From<FieldComparison> for Where {
    fn from(value: FieldComparison) -> Self {
        Where::Field(value)
    }
}

impl From<ExistsCondition> for Where {
    fn from(value: ExistsCondition) -> Self {
        Where::Exists(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_normalization() {
        assert_eq!(Operand::from_value(Value::Null), Operand::None);
        assert_eq!(
            Operand::from_value(vec![1, 2]),
            Operand::List(vec![Value::Integer(1), Value::Integer(2)])
        );
        assert_eq!(Operand::from_value(5), Operand::Value(Value::Integer(5)));
    }

    #[test]
    fn test_nested_empty_groups_are_empty() {
        let mut outer = ConditionGroup::new(Combinator::And);
        outer.items.push(ConditionGroup::new(Combinator::Or).into());
        assert!(Where::from(outer.clone()).is_empty());

        outer
            .items
            .push(Condition::new("age", Operator::Greater, 3).into());
        assert!(!outer.is_empty());
    }

    #[test]
    fn test_with_combinator() {
        let item = Where::from(Condition::new("name", Operator::Equal, "a"));
        assert_eq!(item.combinator(), Combinator::And);
        assert_eq!(
            item.with_combinator(Combinator::Or).combinator(),
            Combinator::Or
        );
    }
}
