//! # Anvil
//!
//! A dynamic relational query builder. Filters, joins, projections, ordering
//! and paging are recorded on a [`Query`] through a fluent API, then compiled
//! by one of two interchangeable backends.
//!
//! ## Quick Start
//!
//! ```rust
//! use anvil::prelude::*;
//!
//! let user = EntityDescriptor::new("User")
//!     .field("name", FieldType::Text)
//!     .field("age", FieldType::Integer);
//!
//! let query = Query::new(user)
//!     .where_op("age", Operator::Greater, 25)
//!     .where_any(|g| g.r#where("name", "Ann").r#where("name", "Bob"))
//!     .order_by("name");
//!
//! let statement = anvil::sql::compile(&query)?;
//! assert_eq!(
//!     statement.sql,
//!     "select user from User user where user.age > :age_1 and (user.name = :name_2 or user.name = :name_3) order by user.name asc"
//! );
//! # Ok::<(), anvil::AnvilError>(())
//! ```
//!
//! ## Backends
//!
//! | Backend    | Output                          | Feature Flag |
//! |------------|---------------------------------|--------------|
//! | Structured | object graph ([`criteria::TypedQuery`]) | `criteria` |
//! | Textual    | query text + named parameters   | `sql`        |


// =============================================================================
// Root-level exports
// =============================================================================

pub use anvil_core::error::{AnvilError, Result};

pub use anvil_core::{
    AliasResolver, Aggregate, Combinator, Condition, ConditionGroup, Conditional, Entity,
    EntityDescriptor, Executor, FieldType, Finder, JoinBuilder, JoinType, OrderBy, Operator, Page,
    Projection, Query, Row, Value, Where, WhereGroup,
};

/// Expression model shared by both backends.
pub use anvil_core as core;

// =============================================================================
// Backends
// =============================================================================

/// Structured backend: object graphs and the in-memory session.
#[cfg(feature = "criteria")]
pub mod criteria {
    pub use anvil_criteria::*;
}

/// Textual backend: query text with named parameters.
#[cfg(feature = "sql")]
pub mod sql {
    pub use anvil_sql::*;
}

/// Everything needed to describe, build and run queries.
pub mod prelude {
    pub use anvil_core::prelude::*;
    pub use anvil_core::{JoinBuilder, Projection, WhereGroup};

    #[cfg(feature = "criteria")]
    pub use anvil_criteria::{CriteriaBackend, CriteriaSession, MemorySession};

    #[cfg(feature = "sql")]
    pub use anvil_sql::{PlaceholderStyle, SqlBackend, SqlSession, Statement};
}
