//! Expression model shared by the anvil backends.
//!
//! A [`Query`] records filters, joins, projections, ordering, grouping and
//! paging through a fluent API. Backends compile it; the [`Finder`] runs the
//! compiled form through an [`Executor`] and materializes rows.

pub mod alias;
pub mod entity;
pub mod error;
pub mod expressions;
pub mod finder;
pub mod join;
pub mod order;
pub mod page;
pub mod query;
pub mod row;
pub mod select;
pub mod tracing;
pub mod types;
pub mod value;

pub use alias::AliasResolver;
pub use entity::{Entity, EntityDescriptor, FieldDef, Relation};
pub use error::{AnvilError, Result};
pub use expressions::{
    Combinator, Condition, ConditionGroup, ExistsCondition, FieldComparison, Operand, Operator,
    RawCondition, Where,
};
pub use finder::{Executor, Finder};
pub use join::{FetchSpec, JoinBuilder, JoinOn, JoinSpec, JoinType};
pub use order::{GroupBySpec, OrderBy, OrderSpec};
pub use page::Page;
pub use query::{Conditional, Query, WhereGroup};
pub use row::Row;
pub use select::{Aggregate, Projection};
pub use types::FieldType;
pub use value::Value;

pub mod prelude {
    pub use crate::entity::{Entity, EntityDescriptor};
    pub use crate::error::{AnvilError, Result};
    pub use crate::expressions::{Combinator, Condition, Operator, Where};
    pub use crate::finder::{Executor, Finder};
    pub use crate::join::JoinType;
    pub use crate::order::OrderBy;
    pub use crate::page::Page;
    pub use crate::query::{Conditional, Query};
    pub use crate::row::Row;
    pub use crate::select::Aggregate;
    pub use crate::types::FieldType;
    pub use crate::value::Value;
}
