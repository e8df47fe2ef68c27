//! Builds the object graph for a [`Query`].
//!
//! Construction mirrors the textual backend clause by clause: root, fetches,
//! joins, selection, restriction, grouping, then ordering. Values are coerced
//! to the declared field type while the graph is built, so a bad value fails
//! here rather than at execution.

mod joins;
mod predicate;
mod select;

use anvil_core::{AliasResolver, EntityDescriptor, FieldType, Query, Result, Value};
use hashbrown::HashMap;

use crate::nodes::{CriteriaQuery, Source, TypedQuery};

/// Where a query body is being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Top,
    Subquery,
}

/// Structured backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CriteriaCompiler;

impl CriteriaCompiler {
    pub const fn new() -> Self {
        Self
    }

    /// Builds the graph and applies paging to the executable handle
    pub fn compile(&self, query: &Query) -> Result<TypedQuery> {
        anvil_core::anvil_trace_compile!("criteria", query.entity().name());

        let criteria = Builder::default().query(query, None, Mode::Top)?;
        let mut typed = TypedQuery::new(criteria);
        typed
            .set_max_results(query.limit_value())
            .set_first_result(query.offset_value());
        Ok(typed)
    }
}

pub fn compile(query: &Query) -> Result<TypedQuery> {
    CriteriaCompiler::new().compile(query)
}

/// Per-graph build state
#[derive(Debug, Default)]
struct Builder<'q> {
    scopes: usize,
    joins: usize,
    /// Descriptor of every source whose entity is known
    entities: HashMap<Source, &'q EntityDescriptor>,
}

impl<'q> Builder<'q> {
    fn query(
        &mut self,
        query: &'q Query,
        parent: Option<&AliasResolver<Source>>,
        mode: Mode,
    ) -> Result<CriteriaQuery> {
        let scope = self.scopes;
        self.scopes += 1;
        let root = Source::root(scope);
        self.entities.insert(root, query.entity());

        let acronym = query.acronym();
        let mut resolver = match parent {
            Some(parent) => parent.child(acronym.clone(), root),
            None => AliasResolver::new(acronym.clone(), root),
        };

        let fetches = if mode == Mode::Top && !query.is_counting() {
            query.fetches().iter().map(joins::fetch).collect()
        } else {
            Vec::new()
        };

        let mut nodes = Vec::new();
        let mut specs = Vec::new();
        self.register(query.joins(), root, &mut resolver, &mut nodes, &mut specs)?;
        for (node, spec) in nodes.iter_mut().zip(specs.iter().copied()) {
            let source = Source::join(scope, node.id);
            node.on = self.join_condition(spec, source, &resolver)?;
        }

        let selection = select::selection(query, &resolver, mode)?;
        let restriction = self.predicate(query.wheres(), &resolver, root)?;
        let group_by = select::group_by(query, &resolver);
        let order = if mode == Mode::Top && !query.is_counting() {
            select::order(query, &resolver)
        } else {
            Vec::new()
        };

        Ok(CriteriaQuery {
            scope,
            entity: query.entity().name().to_owned(),
            acronym,
            fetches,
            joins: nodes,
            selection,
            restriction,
            order,
            group_by,
        })
    }

    fn field_type(&self, source: Source, path: &str) -> Option<FieldType> {
        self.entities.get(&source)?.field_type(path)
    }

    /// Coerces `value` to the declared type of `path`, when one is declared
    fn coerce(&self, source: Source, path: &str, value: &Value) -> Result<Value> {
        match self.field_type(source, path) {
            Some(ty) => value.coerce(ty),
            None => Ok(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Comparison, Expression, Path, Predicate, Selection};
    use anvil_core::{AnvilError, Conditional, EntityDescriptor, FieldType, Operator, OrderBy};

    fn user() -> Query {
        Query::new(
            EntityDescriptor::new("User")
                .field("name", FieldType::Text)
                .field("age", FieldType::Integer)
                .field("active", FieldType::Bool),
        )
    }

    #[test]
    fn test_plain_query_selects_root() {
        let typed = compile(&user()).unwrap();
        let criteria = typed.query();
        assert_eq!(criteria.entity, "User");
        assert_eq!(criteria.acronym, "user");
        assert_eq!(criteria.selection, Selection::Root);
        assert!(criteria.restriction.is_none());
        assert_eq!(typed.max_results(), None);
    }

    #[test]
    fn test_values_are_coerced_eagerly() {
        let typed = compile(&user().where_op("age", Operator::GreaterOrEqual, "18")).unwrap();
        assert_eq!(
            typed.query().restriction,
            Some(Predicate::Compare {
                left: Expression::Path(Path::new(Source::root(0), "age")),
                op: Comparison::GreaterOrEqual,
                right: Expression::Literal(Value::Integer(18)),
            })
        );

        let err = compile(&user().r#where("age", "eighteen")).unwrap_err();
        assert!(matches!(err, AnvilError::Coercion { target: FieldType::Integer, .. }));
    }

    #[test]
    fn test_paging_and_order() {
        let typed = compile(&user().order_by_desc("age").limit(10).offset(20)).unwrap();
        assert_eq!(typed.max_results(), Some(10));
        assert_eq!(typed.first_result(), Some(20));
        assert_eq!(typed.query().order.len(), 1);
        assert_eq!(typed.query().order[0].direction, OrderBy::Desc);
    }

    #[test]
    fn test_count_variant_drops_fetches_and_order() {
        let query = user().with("pets").order_by("name").limit(10);
        let typed = compile(&query.count_query()).unwrap();
        let criteria = typed.query();
        assert!(criteria.fetches.is_empty());
        assert!(criteria.order.is_empty());
        assert_eq!(typed.max_results(), None);
        assert_eq!(criteria.selection.columns(), vec!["count".to_owned()]);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let query = user()
            .r#where("name", "Ann")
            .where_any(|g| g.r#where("age", 1).r#where("age", 2));
        assert_eq!(compile(&query).unwrap(), compile(&query).unwrap());
    }
}
