//! Projections and aggregate functions.

use std::fmt;

/// Aggregate function applied to a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Count => "count",
            Aggregate::Sum => "sum",
            Aggregate::Avg => "avg",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output column: a field, optionally aggregated and aliased.
///
/// `"*"` selects the root entity and `"p.*"` the entity joined as `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub field: String,
    pub alias: Option<String>,
    pub aggregate: Option<Aggregate>,
}

impl Projection {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alias: None,
            aggregate: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = Some(aggregate);
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.field == "*" || self.field.ends_with(".*")
    }

    /// Qualifier in front of a wildcard, `None` for a bare `*`
    pub fn wildcard_target(&self) -> Option<&str> {
        self.field.strip_suffix(".*")
    }

    /// Column label of this projection in result rows
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }
}
