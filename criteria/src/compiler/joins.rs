use anvil_core::{AliasResolver, FetchSpec, JoinSpec, Result};

use super::Builder;
use crate::nodes::{Comparison, Expression, FetchNode, JoinNode, JoinTarget, Path, Predicate, Source};

/// Fetch hint on the root. A nested relationship is already qualified.
pub(super) fn fetch(spec: &FetchSpec) -> FetchNode {
    FetchNode {
        attributes: spec.relationship.split('.').map(str::to_owned).collect(),
        kind: spec.kind,
        alias: spec.alias.clone(),
    }
}

impl<'q> Builder<'q> {
    /// Creates a node per join, depth first, registering every acronym before
    /// any ON predicate is built.
    pub(super) fn register(
        &mut self,
        specs: &'q [JoinSpec],
        parent: Source,
        resolver: &mut AliasResolver<Source>,
        nodes: &mut Vec<JoinNode>,
        order: &mut Vec<&'q JoinSpec>,
    ) -> Result<()> {
        for spec in specs {
            let id = self.joins;
            self.joins += 1;
            let source = Source::join(parent.scope, id);
            let acronym = spec.acronym();
            resolver.register(acronym.clone(), source)?;

            let target = if spec.on.is_some() {
                JoinTarget::Entity(spec.target.clone())
            } else {
                if let Some(entity) = self
                    .entities
                    .get(&parent)
                    .copied()
                    .and_then(|entity| entity.related(&spec.target))
                {
                    self.entities.insert(source, entity);
                }
                JoinTarget::Attribute(spec.target.clone())
            };

            nodes.push(JoinNode {
                id,
                parent,
                target,
                kind: spec.kind,
                acronym,
                on: None,
            });
            order.push(spec);
            self.register(&spec.nested, source, resolver, nodes, order)?;
        }
        Ok(())
    }

    /// Entity-join equality and the inline filter, conjoined
    pub(super) fn join_condition(
        &mut self,
        spec: &'q JoinSpec,
        source: Source,
        resolver: &AliasResolver<Source>,
    ) -> Result<Option<Predicate>> {
        let mut parts = Vec::new();
        if let Some(on) = &spec.on {
            let (other, path) = resolver.resolve(&on.reference_field);
            parts.push(Predicate::Compare {
                left: Expression::Path(Path::new(source, &on.join_field)),
                op: Comparison::Equal,
                right: Expression::Path(Path::new(*other, path)),
            });
        }
        if let Some(filter) = &spec.filter
            && let Some(predicate) = self.predicate(&filter.items, resolver, source)?
        {
            parts.push(predicate);
        }
        Ok(match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Predicate::And(parts)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::compile;
    use crate::nodes::{Comparison, Expression, JoinTarget, Path, Predicate, Source};
    use anvil_core::{
        AnvilError, Conditional, EntityDescriptor, FieldType, JoinType, Query, Value,
    };

    fn user() -> Query {
        let toy = EntityDescriptor::new("Toy").field("name", FieldType::Text);
        let pet = EntityDescriptor::new("Pet")
            .field("name", FieldType::Text)
            .field("age", FieldType::Integer)
            .relation("toys", toy);
        Query::new(
            EntityDescriptor::new("User")
                .field("id", FieldType::Integer)
                .relation("pets", pet),
        )
    }

    #[test]
    fn test_dotted_join_chains() {
        let typed = compile(&user().left_join("pets.toys")).unwrap();
        let joins = &typed.query().joins;
        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0].parent, Source::root(0));
        assert_eq!(joins[0].target, JoinTarget::Attribute("pets".into()));
        assert_eq!(joins[1].parent, Source::join(0, 0));
        assert_eq!(joins[1].kind, JoinType::Left);
        assert_eq!(typed.query().join("toys").map(|join| join.id), Some(1));
    }

    #[test]
    fn test_aliased_join_resolves_and_coerces() {
        let query = user().join_as("pets", "p").r#where("p.age", "3");
        let typed = compile(&query).unwrap();
        assert_eq!(
            typed.query().restriction,
            Some(Predicate::Compare {
                left: Expression::Path(Path::new(Source::join(0, 0), "age")),
                op: Comparison::Equal,
                right: Expression::Literal(Value::Integer(3)),
            })
        );
    }

    #[test]
    fn test_inline_filter_becomes_on() {
        let query = user().join_with("pets", |j| j.alias("p").r#where("name", "Rex"));
        let typed = compile(&query).unwrap();
        assert_eq!(
            typed.query().joins[0].on,
            Some(Predicate::Compare {
                left: Expression::Path(Path::new(Source::join(0, 0), "name")),
                op: Comparison::Equal,
                right: Expression::Literal(Value::Text("Rex".into())),
            })
        );
        assert!(typed.query().restriction.is_none());
    }

    #[test]
    fn test_entity_join_equality() {
        let audit = EntityDescriptor::new("Audit").field("userId", FieldType::Integer);
        let typed = compile(&user().join_on(&audit, "userId", "id")).unwrap();
        let join = &typed.query().joins[0];
        assert_eq!(join.target, JoinTarget::Entity("Audit".into()));
        assert_eq!(
            join.on,
            Some(Predicate::Compare {
                left: Expression::Path(Path::new(Source::join(0, 0), "userId")),
                op: Comparison::Equal,
                right: Expression::Path(Path::new(Source::root(0), "id")),
            })
        );
    }

    #[test]
    fn test_fetches() {
        let typed = compile(&user().with("pets").with_kind("pets.toys", JoinType::Left)).unwrap();
        let fetches = &typed.query().fetches;
        assert_eq!(fetches.len(), 2);
        assert_eq!(fetches[1].attributes.as_slice(), ["pets", "toys"]);
        assert_eq!(fetches[1].alias, "pets_toys");
    }

    #[test]
    fn test_duplicate_alias_is_rejected() {
        let err = compile(&user().join_as("pets", "p").left_join_as("pets", "p")).unwrap_err();
        assert!(matches!(err, AnvilError::Query(_)));
    }
}
