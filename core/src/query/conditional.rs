use crate::entity::EntityDescriptor;
use crate::expressions::{
    Combinator, Condition, ConditionGroup, ExistsCondition, FieldComparison, Operator,
    RawCondition, Where,
};
use crate::query::Query;
use crate::value::Value;

/// Fluent filter API shared by queries, condition groups and join builders.
///
/// Convenience methods skip null values and empty iterables. Items added
/// through [`Conditional::push_where`] are stored as given.
pub trait Conditional: Sized {
    /// Appends a filter entry exactly as given
    fn push_where(self, item: Where) -> Self;

    /// Combinator for items added without an explicit `or_` prefix
    fn default_combinator(&self) -> Combinator {
        Combinator::And
    }

    /// `field = value`, skipped when `value` is null
    fn r#where(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_op(field, Operator::Equal, value)
    }

    /// `field <op> value`, skipped when `value` is null
    fn where_op(self, field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        let combinator = self.default_combinator();
        add_condition(self, field, operator, value.into(), combinator)
    }

    fn or_where(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_where_op(field, Operator::Equal, value)
    }

    fn or_where_op(
        self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        add_condition(self, field, operator, value.into(), Combinator::Or)
    }

    /// `field in (values)`, skipped when `values` is empty
    fn where_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let combinator = self.default_combinator();
        add_membership(self, field, Operator::In, values, combinator)
    }

    fn where_not_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let combinator = self.default_combinator();
        add_membership(self, field, Operator::NotIn, values, combinator)
    }

    fn or_where_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        add_membership(self, field, Operator::In, values, Combinator::Or)
    }

    fn or_where_not_in<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        add_membership(self, field, Operator::NotIn, values, Combinator::Or)
    }

    fn where_is_null(self, field: impl Into<String>) -> Self {
        let combinator = self.default_combinator();
        add_unary(self, field, Operator::IsNull, combinator)
    }

    fn where_is_not_null(self, field: impl Into<String>) -> Self {
        let combinator = self.default_combinator();
        add_unary(self, field, Operator::IsNotNull, combinator)
    }

    fn or_where_is_null(self, field: impl Into<String>) -> Self {
        add_unary(self, field, Operator::IsNull, Combinator::Or)
    }

    fn or_where_is_not_null(self, field: impl Into<String>) -> Self {
        add_unary(self, field, Operator::IsNotNull, Combinator::Or)
    }

    /// `field <op> other`, where `other` is a field path rather than a literal.
    ///
    /// Inside a subquery, an unqualified `other` refers to the enclosing root.
    fn where_field(
        self,
        field: impl Into<String>,
        operator: Operator,
        other: impl Into<String>,
    ) -> Self {
        let combinator = self.default_combinator();
        add_field(self, field, operator, other, combinator)
    }

    fn or_where_field(
        self,
        field: impl Into<String>,
        operator: Operator,
        other: impl Into<String>,
    ) -> Self {
        add_field(self, field, operator, other, Combinator::Or)
    }

    /// `field in (subquery)`
    fn where_in_query(self, field: impl Into<String>, subquery: Query) -> Self {
        let combinator = self.default_combinator();
        add_subquery(self, field, Operator::In, subquery, combinator)
    }

    fn where_not_in_query(self, field: impl Into<String>, subquery: Query) -> Self {
        let combinator = self.default_combinator();
        add_subquery(self, field, Operator::NotIn, subquery, combinator)
    }

    fn or_where_in_query(self, field: impl Into<String>, subquery: Query) -> Self {
        add_subquery(self, field, Operator::In, subquery, Combinator::Or)
    }

    fn or_where_not_in_query(self, field: impl Into<String>, subquery: Query) -> Self {
        add_subquery(self, field, Operator::NotIn, subquery, Combinator::Or)
    }

    /// `field in (subquery)` with the subquery built by `f`
    fn where_in_with(
        self,
        field: impl Into<String>,
        entity: EntityDescriptor,
        f: impl FnOnce(Query) -> Query,
    ) -> Self {
        self.where_in_query(field, f(Query::new(entity)))
    }

    fn where_not_in_with(
        self,
        field: impl Into<String>,
        entity: EntityDescriptor,
        f: impl FnOnce(Query) -> Query,
    ) -> Self {
        self.where_not_in_query(field, f(Query::new(entity)))
    }

    fn where_exists(self, subquery: Query) -> Self {
        let combinator = self.default_combinator();
        add_exists(self, subquery, true, combinator)
    }

    fn where_not_exists(self, subquery: Query) -> Self {
        let combinator = self.default_combinator();
        add_exists(self, subquery, false, combinator)
    }

    fn or_where_exists(self, subquery: Query) -> Self {
        add_exists(self, subquery, true, Combinator::Or)
    }

    fn or_where_not_exists(self, subquery: Query) -> Self {
        add_exists(self, subquery, false, Combinator::Or)
    }

    /// `exists (subquery)` with the correlated subquery built by `f`
    fn where_exists_with(self, entity: EntityDescriptor, f: impl FnOnce(Query) -> Query) -> Self {
        self.where_exists(f(Query::new(entity)))
    }

    fn where_not_exists_with(
        self,
        entity: EntityDescriptor,
        f: impl FnOnce(Query) -> Query,
    ) -> Self {
        self.where_not_exists(f(Query::new(entity)))
    }

    /// Predicate text emitted verbatim
    fn where_raw(self, sql: impl Into<String>) -> Self {
        let combinator = self.default_combinator();
        self.push_where(Where::Raw(RawCondition {
            sql: sql.into(),
            combinator,
        }))
    }

    fn or_where_raw(self, sql: impl Into<String>) -> Self {
        self.push_where(Where::Raw(RawCondition {
            sql: sql.into(),
            combinator: Combinator::Or,
        }))
    }

    /// Wraps a bare list of filters in a parenthesized group
    fn where_group(self, items: Vec<Where>) -> Self {
        let combinator = self.default_combinator();
        add_group(self, items, Combinator::And, combinator)
    }

    fn or_where_group(self, items: Vec<Where>) -> Self {
        add_group(self, items, Combinator::And, Combinator::Or)
    }

    /// Group whose items are joined with `or`
    fn where_any(self, f: impl FnOnce(WhereGroup) -> WhereGroup) -> Self {
        let combinator = self.default_combinator();
        scoped_group(self, Combinator::Or, combinator, f)
    }

    /// Group whose items are joined with `and`
    fn where_all(self, f: impl FnOnce(WhereGroup) -> WhereGroup) -> Self {
        let combinator = self.default_combinator();
        scoped_group(self, Combinator::And, combinator, f)
    }

    fn or_where_any(self, f: impl FnOnce(WhereGroup) -> WhereGroup) -> Self {
        scoped_group(self, Combinator::Or, Combinator::Or, f)
    }

    fn or_where_all(self, f: impl FnOnce(WhereGroup) -> WhereGroup) -> Self {
        scoped_group(self, Combinator::And, Combinator::Or, f)
    }
}

fn add_condition<C: Conditional>(
    builder: C,
    field: impl Into<String>,
    operator: Operator,
    value: Value,
    combinator: Combinator,
) -> C {
    if value.is_null() {
        return builder;
    }
    let mut condition = Condition::new(field, operator, value);
    condition.combinator = combinator;
    builder.push_where(condition.into())
}

fn add_membership<C, I, V>(
    builder: C,
    field: impl Into<String>,
    operator: Operator,
    values: I,
    combinator: Combinator,
) -> C
where
    C: Conditional,
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    if values.is_empty() {
        return builder;
    }
    add_condition(builder, field, operator, Value::List(values), combinator)
}

fn add_unary<C: Conditional>(
    builder: C,
    field: impl Into<String>,
    operator: Operator,
    combinator: Combinator,
) -> C {
    let mut condition = Condition::unary(field, operator);
    condition.combinator = combinator;
    builder.push_where(condition.into())
}

fn add_field<C: Conditional>(
    builder: C,
    field: impl Into<String>,
    operator: Operator,
    other: impl Into<String>,
    combinator: Combinator,
) -> C {
    builder.push_where(Where::Field(FieldComparison {
        field: field.into(),
        operator,
        other: other.into(),
        combinator,
    }))
}

fn add_subquery<C: Conditional>(
    builder: C,
    field: impl Into<String>,
    operator: Operator,
    subquery: Query,
    combinator: Combinator,
) -> C {
    let mut condition = Condition::subquery(field, operator, subquery);
    condition.combinator = combinator;
    builder.push_where(condition.into())
}

fn add_exists<C: Conditional>(
    builder: C,
    subquery: Query,
    exists: bool,
    combinator: Combinator,
) -> C {
    builder.push_where(Where::Exists(ExistsCondition {
        subquery: Box::new(subquery),
        exists,
        combinator,
    }))
}

fn add_group<C: Conditional>(
    builder: C,
    items: Vec<Where>,
    operator: Combinator,
    combinator: Combinator,
) -> C {
    builder.push_where(Where::Group(ConditionGroup {
        items,
        operator,
        combinator,
    }))
}

fn scoped_group<C: Conditional>(
    builder: C,
    operator: Combinator,
    combinator: Combinator,
    f: impl FnOnce(WhereGroup) -> WhereGroup,
) -> C {
    let mut group = f(WhereGroup::new(operator)).into_group();
    if group.is_empty() {
        return builder;
    }
    group.combinator = combinator;
    builder.push_where(Where::Group(group))
}

/// Scoped builder handed to `where_any` / `where_all` callbacks.
///
/// Items added without an `or_` prefix take the group's operator as their
/// combinator, so `where_any(|g| g.r#where(a).r#where(b))` reads `(a or b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereGroup {
    group: ConditionGroup,
}

impl WhereGroup {
    pub fn new(operator: Combinator) -> Self {
        Self {
            group: ConditionGroup::new(operator),
        }
    }

    pub fn into_group(self) -> ConditionGroup {
        self.group
    }
}

impl Conditional for WhereGroup {
    fn push_where(mut self, item: Where) -> Self {
        self.group.items.push(item);
        self
    }

    fn default_combinator(&self) -> Combinator {
        self.group.operator
    }
}
