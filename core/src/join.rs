//! Join and fetch specifications.

use crate::expressions::{Combinator, ConditionGroup, Where};
use crate::query::Conditional;

/// The type of JOIN operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
        }
    }
}

/// Equality ON clause of an explicit entity join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOn {
    /// Field on the joined entity
    pub join_field: String,
    /// Field on the query side, resolved like any other field
    pub reference_field: String,
}

/// One join of a query, possibly carrying nested joins and an inline filter.
///
/// `target` names a relation of the parent (the root, or the enclosing join),
/// unless `on` is set, in which case it names an unrelated entity.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    pub target: String,
    pub alias: Option<String>,
    pub kind: JoinType,
    pub filter: Option<ConditionGroup>,
    pub nested: Vec<JoinSpec>,
    pub on: Option<JoinOn>,
}

impl JoinSpec {
    /// Creates a relation join. A dotted target such as `"pets.toys"` expands
    /// into a chain of nested joins.
    pub fn new(target: &str, kind: JoinType) -> Self {
        let mut segments = target.rsplit('.');
        // rsplit always yields at least one segment
        let last = segments.next().unwrap_or(target);
        let mut spec = Self::single(last, kind);
        for segment in segments {
            let mut parent = Self::single(segment, kind);
            parent.nested.push(spec);
            spec = parent;
        }
        spec
    }

    /// Creates a join against an unrelated entity with an equality ON clause
    pub fn entity(
        entity: impl Into<String>,
        kind: JoinType,
        join_field: impl Into<String>,
        reference_field: impl Into<String>,
    ) -> Self {
        Self {
            on: Some(JoinOn {
                join_field: join_field.into(),
                reference_field: reference_field.into(),
            }),
            ..Self::single(entity, kind)
        }
    }

    fn single(target: impl Into<String>, kind: JoinType) -> Self {
        Self {
            target: target.into(),
            alias: None,
            kind,
            filter: None,
            nested: Vec::new(),
            on: None,
        }
    }

    /// Name used to qualify fields of this join: the alias, else the lower-cased target
    pub fn acronym(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.target.to_lowercase(),
        }
    }

    /// Depth of the implicit chain created from a dotted target
    fn chain_depth(target: &str) -> usize {
        target.matches('.').count()
    }

    fn link_mut(&mut self, depth: usize) -> &mut JoinSpec {
        let mut link = self;
        for _ in 0..depth {
            if link.nested.is_empty() {
                break;
            }
            link = &mut link.nested[0];
        }
        link
    }
}

/// Scoped builder handed to `join_with` callbacks.
///
/// Alias, filters and nested joins apply to the last link of a dotted target.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    spec: JoinSpec,
    depth: usize,
}

impl JoinBuilder {
    pub fn new(target: &str, kind: JoinType) -> Self {
        Self {
            spec: JoinSpec::new(target, kind),
            depth: JoinSpec::chain_depth(target),
        }
    }

    fn leaf(&mut self) -> &mut JoinSpec {
        self.spec.link_mut(self.depth)
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.leaf().alias = Some(alias.into());
        self
    }

    /// Adds a nested inner join below this one
    pub fn join(self, target: &str) -> Self {
        self.nest(JoinSpec::new(target, JoinType::Inner))
    }

    pub fn left_join(self, target: &str) -> Self {
        self.nest(JoinSpec::new(target, JoinType::Left))
    }

    pub fn right_join(self, target: &str) -> Self {
        self.nest(JoinSpec::new(target, JoinType::Right))
    }

    /// Adds a nested join configured by `f`
    pub fn join_with(self, target: &str, f: impl FnOnce(JoinBuilder) -> JoinBuilder) -> Self {
        let nested = f(JoinBuilder::new(target, JoinType::Inner)).build();
        self.nest(nested)
    }

    fn nest(mut self, spec: JoinSpec) -> Self {
        self.leaf().nested.push(spec);
        self
    }

    pub fn build(self) -> JoinSpec {
        self.spec
    }
}

impl Conditional for JoinBuilder {
    fn push_where(mut self, item: Where) -> Self {
        self.leaf()
            .filter
            .get_or_insert_with(|| ConditionGroup::new(Combinator::And))
            .items
            .push(item);
        self
    }
}

/// Eager-load hint for a relationship of the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSpec {
    pub relationship: String,
    pub alias: String,
    /// When set, `relationship` is already qualified and is not prefixed with the root
    pub nested: bool,
    pub kind: JoinType,
}

impl FetchSpec {
    pub fn new(relationship: impl Into<String>, kind: JoinType) -> Self {
        let relationship = relationship.into();
        Self {
            alias: relationship.replace('.', "_"),
            relationship,
            nested: false,
            kind,
        }
    }

    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }
}
