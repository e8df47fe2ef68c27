//! Object graph produced by the structured backend.
//!
//! Sources (roots and joins) are addressed by [`Source`] handles rather than
//! references, so a correlated subquery can point at its parent's root
//! without borrowing it.

use anvil_core::{Aggregate, JoinType, OrderBy, Value};
use smallvec::SmallVec;

/// Identifies one query or subquery within a compiled graph
pub type ScopeId = usize;

/// Identifies one join node within a compiled graph
pub type JoinId = usize;

/// A root or a join that attribute paths start from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Source {
    pub scope: ScopeId,
    pub join: Option<JoinId>,
}

impl Source {
    pub const fn root(scope: ScopeId) -> Self {
        Self { scope, join: None }
    }

    pub const fn join(scope: ScopeId, join: JoinId) -> Self {
        Self {
            scope,
            join: Some(join),
        }
    }

    pub const fn is_root(&self) -> bool {
        self.join.is_none()
    }
}

/// Attribute path from a source, e.g. `address.city` on the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub source: Source,
    pub attributes: SmallVec<[String; 2]>,
}

impl Path {
    pub fn new(source: Source, path: &str) -> Self {
        Self {
            source,
            attributes: path.split('.').map(str::to_owned).collect(),
        }
    }

    /// Attributes joined with `.`
    pub fn dotted(&self) -> String {
        self.attributes.join(".")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Path(Path),
    Literal(Value),
    /// The entity itself, as selected by `*` or counted by `count(*)`
    Entity(Source),
    Aggregate {
        function: Aggregate,
        argument: Box<Expression>,
    },
    Function {
        name: &'static str,
        arguments: Vec<Expression>,
    },
}

/// Binary comparison of two expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Like,
    NotLike,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare {
        left: Expression,
        op: Comparison,
        right: Expression,
    },
    IsNull(Expression),
    IsNotNull(Expression),
    In {
        expression: Expression,
        values: Vec<Value>,
    },
    InSubquery {
        expression: Expression,
        subquery: Box<CriteriaQuery>,
    },
    Exists(Box<CriteriaQuery>),
    /// Caller-supplied predicate text passed through to the engine
    Raw(String),
}

impl Predicate {
    /// `self and other`, extending an existing conjunction
    pub fn and(self, other: Predicate) -> Predicate {
        match self {
            Predicate::And(mut items) => {
                items.push(other);
                Predicate::And(items)
            }
            first => Predicate::And(vec![first, other]),
        }
    }

    /// `self or other`, extending an existing disjunction
    pub fn or(self, other: Predicate) -> Predicate {
        match self {
            Predicate::Or(mut items) => {
                items.push(other);
                Predicate::Or(items)
            }
            first => Predicate::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Predicate {
        Predicate::Not(Box::new(self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinTarget {
    /// Relation attribute of the parent source
    Attribute(String),
    /// Unrelated entity joined through an explicit ON predicate
    Entity(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    pub id: JoinId,
    pub parent: Source,
    pub target: JoinTarget,
    pub kind: JoinType,
    pub acronym: String,
    pub on: Option<Predicate>,
}

/// Eager-load directive on the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchNode {
    pub attributes: SmallVec<[String; 2]>,
    pub kind: JoinType,
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expression: Expression,
    pub alias: Option<String>,
    /// Column label in result rows
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The root entity
    Root,
    Single(SelectItem),
    Multi(Vec<SelectItem>),
}

impl Selection {
    pub fn items(&self) -> &[SelectItem] {
        match self {
            Selection::Root => &[],
            Selection::Single(item) => std::slice::from_ref(item),
            Selection::Multi(items) => items,
        }
    }

    /// Column labels of the rows this selection produces
    pub fn columns(&self) -> Vec<String> {
        self.items().iter().map(|item| item.label.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderNode {
    pub expression: Expression,
    pub direction: OrderBy,
}

/// A query or subquery over one root entity
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaQuery {
    pub scope: ScopeId,
    pub entity: String,
    pub acronym: String,
    pub fetches: Vec<FetchNode>,
    pub joins: Vec<JoinNode>,
    pub selection: Selection,
    pub restriction: Option<Predicate>,
    pub order: Vec<OrderNode>,
    pub group_by: Vec<Expression>,
}

impl CriteriaQuery {
    pub fn root(&self) -> Source {
        Source::root(self.scope)
    }

    pub fn join(&self, acronym: &str) -> Option<&JoinNode> {
        self.joins.iter().find(|join| join.acronym == acronym)
    }
}

/// Executable handle: the graph plus paging applied at execution time
#[derive(Debug, Clone, PartialEq)]
pub struct TypedQuery {
    query: CriteriaQuery,
    max_results: Option<u64>,
    first_result: Option<u64>,
}

impl TypedQuery {
    pub fn new(query: CriteriaQuery) -> Self {
        Self {
            query,
            max_results: None,
            first_result: None,
        }
    }

    pub fn query(&self) -> &CriteriaQuery {
        &self.query
    }

    pub fn into_query(self) -> CriteriaQuery {
        self.query
    }

    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    pub fn first_result(&self) -> Option<u64> {
        self.first_result
    }

    pub fn set_max_results(&mut self, max_results: Option<u64>) -> &mut Self {
        self.max_results = max_results;
        self
    }

    pub fn set_first_result(&mut self, first_result: Option<u64>) -> &mut Self {
        self.first_result = first_result;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Predicate {
        Predicate::IsNull(Expression::Path(Path::new(Source::root(0), name)))
    }

    #[test]
    fn test_and_extends_conjunction() {
        let p = leaf("a").and(leaf("b")).and(leaf("c"));
        assert_eq!(p, Predicate::And(vec![leaf("a"), leaf("b"), leaf("c")]));
    }

    #[test]
    fn test_or_after_and_nests() {
        let p = leaf("a").and(leaf("b")).or(leaf("c"));
        assert_eq!(
            p,
            Predicate::Or(vec![Predicate::And(vec![leaf("a"), leaf("b")]), leaf("c")])
        );
    }

    #[test]
    fn test_path_dotted() {
        let path = Path::new(Source::join(1, 3), "address.city");
        assert_eq!(path.attributes.len(), 2);
        assert_eq!(path.dotted(), "address.city");
        assert!(!path.source.is_root());
    }
}
