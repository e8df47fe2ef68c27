//! The query container and its fluent builder.

mod conditional;

pub use conditional::{Conditional, WhereGroup};

use crate::entity::{Entity, EntityDescriptor};
use crate::expressions::Where;
use crate::join::{FetchSpec, JoinBuilder, JoinSpec, JoinType};
use crate::order::{GroupBySpec, OrderBy, OrderSpec};
use crate::select::{Aggregate, Projection};

/// Accumulates filters, joins, projections, ordering, grouping and paging for
/// one query over a root entity.
///
/// Builder calls only record what was asked for; resolution and validation
/// happen when a backend compiles the query. Compiling never mutates the
/// query, so the same value can be compiled any number of times.
///
/// ```ignore
/// let query = Query::of::<User>()
///     .where_op("age", Operator::Greater, 25)
///     .where_op("name", Operator::Like, "A%")
///     .order_by("name")
///     .limit(10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    entity: EntityDescriptor,
    alias: Option<String>,
    wheres: Vec<Where>,
    joins: Vec<JoinSpec>,
    fetches: Vec<FetchSpec>,
    selects: Vec<Projection>,
    orders: Vec<OrderSpec>,
    group_by: Vec<GroupBySpec>,
    limit: Option<u64>,
    offset: Option<u64>,
    counting: bool,
}

impl Query {
    pub fn new(entity: EntityDescriptor) -> Self {
        Self {
            entity,
            alias: None,
            wheres: Vec::new(),
            joins: Vec::new(),
            fetches: Vec::new(),
            selects: Vec::new(),
            orders: Vec::new(),
            group_by: Vec::new(),
            limit: None,
            offset: None,
            counting: false,
        }
    }

    /// Starts a query over an [`Entity`] type
    pub fn of<E: Entity>() -> Self {
        Self::new(E::descriptor())
    }

    // ==================== accessors ====================

    pub fn entity(&self) -> &EntityDescriptor {
        &self.entity
    }

    /// Qualifier of the root: the explicit alias, else the lower-cased entity name
    pub fn acronym(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.entity.acronym(),
        }
    }

    pub fn wheres(&self) -> &[Where] {
        &self.wheres
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    pub fn fetches(&self) -> &[FetchSpec] {
        &self.fetches
    }

    pub fn selects(&self) -> &[Projection] {
        &self.selects
    }

    pub fn orders(&self) -> &[OrderSpec] {
        &self.orders
    }

    pub fn group_bys(&self) -> &[GroupBySpec] {
        &self.group_by
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Set on count variants; backends select a row count of the root
    pub fn is_counting(&self) -> bool {
        self.counting
    }

    // ==================== root ====================

    /// Overrides the root qualifier, needed when a subquery targets the same
    /// entity as its parent
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    // ==================== joins ====================

    pub fn push_join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    /// Inner join on a relation; dotted targets join each link in turn
    pub fn join(self, target: &str) -> Self {
        self.push_join(JoinSpec::new(target, JoinType::Inner))
    }

    pub fn join_as(self, target: &str, alias: impl Into<String>) -> Self {
        self.push_join(JoinBuilder::new(target, JoinType::Inner).alias(alias).build())
    }

    pub fn left_join(self, target: &str) -> Self {
        self.push_join(JoinSpec::new(target, JoinType::Left))
    }

    pub fn left_join_as(self, target: &str, alias: impl Into<String>) -> Self {
        self.push_join(JoinBuilder::new(target, JoinType::Left).alias(alias).build())
    }

    pub fn right_join(self, target: &str) -> Self {
        self.push_join(JoinSpec::new(target, JoinType::Right))
    }

    pub fn right_join_as(self, target: &str, alias: impl Into<String>) -> Self {
        self.push_join(JoinBuilder::new(target, JoinType::Right).alias(alias).build())
    }

    /// Inner join configured by `f`: alias, inline filter, nested joins
    pub fn join_with(self, target: &str, f: impl FnOnce(JoinBuilder) -> JoinBuilder) -> Self {
        self.push_join(f(JoinBuilder::new(target, JoinType::Inner)).build())
    }

    pub fn left_join_with(self, target: &str, f: impl FnOnce(JoinBuilder) -> JoinBuilder) -> Self {
        self.push_join(f(JoinBuilder::new(target, JoinType::Left)).build())
    }

    pub fn right_join_with(
        self,
        target: &str,
        f: impl FnOnce(JoinBuilder) -> JoinBuilder,
    ) -> Self {
        self.push_join(f(JoinBuilder::new(target, JoinType::Right)).build())
    }

    /// Joins an unrelated entity on `<entity>.<join_field> = <reference_field>`
    pub fn join_on(
        self,
        entity: &EntityDescriptor,
        join_field: impl Into<String>,
        reference_field: impl Into<String>,
    ) -> Self {
        self.push_join(JoinSpec::entity(
            entity.name(),
            JoinType::Inner,
            join_field,
            reference_field,
        ))
    }

    pub fn left_join_on(
        self,
        entity: &EntityDescriptor,
        join_field: impl Into<String>,
        reference_field: impl Into<String>,
    ) -> Self {
        self.push_join(JoinSpec::entity(
            entity.name(),
            JoinType::Left,
            join_field,
            reference_field,
        ))
    }

    // ==================== fetches ====================

    pub fn push_fetch(mut self, fetch: FetchSpec) -> Self {
        self.fetches.push(fetch);
        self
    }

    /// Eager-loads a relationship of the root with an inner fetch join
    pub fn with(self, relationship: impl Into<String>) -> Self {
        self.push_fetch(FetchSpec::new(relationship, JoinType::Inner))
    }

    pub fn with_kind(self, relationship: impl Into<String>, kind: JoinType) -> Self {
        self.push_fetch(FetchSpec::new(relationship, kind))
    }

    // ==================== projections ====================

    pub fn push_select(mut self, projection: Projection) -> Self {
        self.selects.push(projection);
        self
    }

    pub fn add_select(self, field: impl Into<String>) -> Self {
        self.push_select(Projection::new(field))
    }

    pub fn add_select_as(self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.push_select(Projection::new(field).alias(alias))
    }

    pub fn add_aggregate(
        self,
        field: impl Into<String>,
        aggregate: Aggregate,
        alias: Option<String>,
    ) -> Self {
        let projection = Projection {
            field: field.into(),
            alias,
            aggregate: Some(aggregate),
        };
        self.push_select(projection)
    }

    /// Replaces every projection with `field`
    pub fn set_select(mut self, field: impl Into<String>) -> Self {
        self.selects.clear();
        self.add_select(field)
    }

    pub fn set_selects<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selects = fields.into_iter().map(Projection::new).collect();
        self
    }

    pub fn count(self, field: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Count, None)
    }

    pub fn count_as(self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Count, Some(alias.into()))
    }

    /// `count(<root>)`
    pub fn count_all(self) -> Self {
        self.count("*")
    }

    pub fn sum(self, field: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Sum, None)
    }

    pub fn sum_as(self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Sum, Some(alias.into()))
    }

    pub fn avg(self, field: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Avg, None)
    }

    pub fn avg_as(self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Avg, Some(alias.into()))
    }

    pub fn min(self, field: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Min, None)
    }

    pub fn min_as(self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Min, Some(alias.into()))
    }

    pub fn max(self, field: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Max, None)
    }

    pub fn max_as(self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.add_aggregate(field, Aggregate::Max, Some(alias.into()))
    }

    // ==================== ordering, grouping, paging ====================

    pub fn order(mut self, field: impl Into<String>, direction: OrderBy) -> Self {
        self.orders.push(OrderSpec {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn order_by(self, field: impl Into<String>) -> Self {
        self.order(field, OrderBy::Asc)
    }

    pub fn order_by_desc(self, field: impl Into<String>) -> Self {
        self.order(field, OrderBy::Desc)
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(GroupBySpec {
            field: field.into(),
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    // ==================== derived variants ====================

    /// Same filters and joins, selecting a row count of the root.
    ///
    /// Projections, ordering, grouping, fetches and limit/offset are dropped,
    /// so the variant always yields a single row.
    pub fn count_query(&self) -> Query {
        Query {
            entity: self.entity.clone(),
            alias: self.alias.clone(),
            wheres: self.wheres.clone(),
            joins: self.joins.clone(),
            fetches: Vec::new(),
            selects: Vec::new(),
            orders: Vec::new(),
            group_by: Vec::new(),
            limit: None,
            offset: None,
            counting: true,
        }
    }

    /// Copy of this query with a new limit and offset
    pub fn paged(&self, limit: Option<u64>, offset: Option<u64>) -> Query {
        Query {
            limit,
            offset,
            ..self.clone()
        }
    }
}

impl Conditional for Query {
    fn push_where(mut self, item: Where) -> Self {
        self.wheres.push(item);
        self
    }
}
