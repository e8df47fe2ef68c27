use anvil_core::{
    AliasResolver, AnvilError, Combinator, Condition, FieldComparison, Operand, Operator, Result,
    Value, Where,
};

use super::{Builder, Mode};
use crate::nodes::{Comparison, Expression, Path, Predicate, Source};

impl<'q> Builder<'q> {
    /// Left-to-right fold of a filter list. `None` when nothing is built.
    pub(super) fn predicate(
        &mut self,
        items: &'q [Where],
        resolver: &AliasResolver<Source>,
        default: Source,
    ) -> Result<Option<Predicate>> {
        let mut acc: Option<Predicate> = None;
        for item in items {
            let Some(built) = self.item(item, resolver, default)? else {
                continue;
            };
            acc = Some(match acc {
                None => built,
                Some(prev) => match item.combinator() {
                    Combinator::And => prev.and(built),
                    Combinator::Or => prev.or(built),
                },
            });
        }
        Ok(acc)
    }

    fn item(
        &mut self,
        item: &'q Where,
        resolver: &AliasResolver<Source>,
        default: Source,
    ) -> Result<Option<Predicate>> {
        match item {
            Where::Condition(condition) => self.condition(condition, resolver, default).map(Some),
            Where::Group(group) => self.predicate(&group.items, resolver, default),
            Where::Field(comparison) => field_comparison(comparison, resolver, default).map(Some),
            Where::Exists(exists) => {
                let subquery = self.query(&exists.subquery, Some(resolver), Mode::Subquery)?;
                let predicate = Predicate::Exists(Box::new(subquery));
                Ok(Some(if exists.exists {
                    predicate
                } else {
                    predicate.negate()
                }))
            }
            Where::Raw(raw) => Ok(Some(Predicate::Raw(raw.sql.clone()))),
        }
    }

    fn condition(
        &mut self,
        condition: &'q Condition,
        resolver: &AliasResolver<Source>,
        default: Source,
    ) -> Result<Predicate> {
        let (source, path) = resolver.resolve_from(&condition.field, &default);
        let source = *source;
        let field = Expression::Path(Path::new(source, path));
        let op = condition.operator;

        match (op, &condition.operand) {
            (Operator::IsNull, Operand::None) | (Operator::Equal, Operand::None) => {
                Ok(Predicate::IsNull(field))
            }
            (Operator::IsNotNull, Operand::None) | (Operator::Diff, Operand::None) => {
                Ok(Predicate::IsNotNull(field))
            }
            (Operator::IsNull | Operator::IsNotNull, _) => Err(AnvilError::query(format!(
                "`{op}` on `{}` takes no value",
                condition.field
            ))),
            (Operator::In | Operator::NotIn, Operand::List(values)) => {
                if values.is_empty() {
                    return Err(AnvilError::query(format!(
                        "empty list for `{op}` on `{}`",
                        condition.field
                    )));
                }
                let values = values
                    .iter()
                    .map(|value| self.coerce(source, path, value))
                    .collect::<Result<Vec<_>>>()?;
                let membership = Predicate::In {
                    expression: field,
                    values,
                };
                Ok(negate_if(membership, op == Operator::NotIn))
            }
            (Operator::In | Operator::NotIn, Operand::Subquery(subquery)) => {
                let subquery = self.query(subquery, Some(resolver), Mode::Subquery)?;
                let membership = Predicate::InSubquery {
                    expression: field,
                    subquery: Box::new(subquery),
                };
                Ok(negate_if(membership, op == Operator::NotIn))
            }
            (Operator::In | Operator::NotIn, _) => Err(AnvilError::unsupported(format!(
                "`{op}` on `{}` requires a list or a subquery",
                condition.field
            ))),
            (_, Operand::None) => Err(AnvilError::query(format!(
                "null value for `{op}` on `{}`",
                condition.field
            ))),
            (_, Operand::List(_) | Operand::Subquery(_)) => Err(AnvilError::unsupported(format!(
                "`{op}` on `{}` requires a scalar value",
                condition.field
            ))),
            (Operator::FindInSet | Operator::NotFindInSet, Operand::Value(value)) => {
                let call = Expression::Function {
                    name: "find_in_set",
                    arguments: vec![Expression::Literal(Value::Text(value.to_string())), field],
                };
                let op = if op == Operator::FindInSet {
                    Comparison::Greater
                } else {
                    Comparison::Equal
                };
                Ok(Predicate::Compare {
                    left: call,
                    op,
                    right: Expression::Literal(Value::Integer(0)),
                })
            }
            (Operator::Like | Operator::NotLike, Operand::Value(value)) => Ok(Predicate::Compare {
                left: field,
                op: comparison(op)?,
                right: Expression::Literal(Value::Text(value.to_string())),
            }),
            (op, Operand::Value(value)) => Ok(Predicate::Compare {
                left: field,
                op: comparison(op)?,
                right: Expression::Literal(self.coerce(source, path, value)?),
            }),
        }
    }
}

fn field_comparison(
    compared: &FieldComparison,
    resolver: &AliasResolver<Source>,
    default: Source,
) -> Result<Predicate> {
    let op = compared.operator;
    if !op.supports_field_comparison() {
        return Err(AnvilError::unsupported(format!(
            "`{op}` cannot compare `{}` with field `{}`",
            compared.field, compared.other
        )));
    }
    let (source, path) = resolver.resolve_from(&compared.field, &default);
    let (other, other_path) = resolver.resolve_correlated(&compared.other);
    Ok(Predicate::Compare {
        left: Expression::Path(Path::new(*source, path)),
        op: comparison(op)?,
        right: Expression::Path(Path::new(*other, other_path)),
    })
}

fn negate_if(predicate: Predicate, negate: bool) -> Predicate {
    if negate { predicate.negate() } else { predicate }
}

/// Binary comparison node for scalar operators
fn comparison(op: Operator) -> Result<Comparison> {
    match op {
        Operator::Equal => Ok(Comparison::Equal),
        Operator::Diff => Ok(Comparison::NotEqual),
        Operator::Less => Ok(Comparison::Less),
        Operator::LessOrEqual => Ok(Comparison::LessOrEqual),
        Operator::Greater => Ok(Comparison::Greater),
        Operator::GreaterOrEqual => Ok(Comparison::GreaterOrEqual),
        Operator::Like => Ok(Comparison::Like),
        Operator::NotLike => Ok(Comparison::NotLike),
        Operator::In
        | Operator::NotIn
        | Operator::IsNull
        | Operator::IsNotNull
        | Operator::FindInSet
        | Operator::NotFindInSet => Err(AnvilError::unsupported(format!(
            "`{op}` is not a binary comparison"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::super::compile;
    use crate::nodes::{Comparison, Expression, Path, Predicate, Selection, Source};
    use anvil_core::{
        AnvilError, Condition, Conditional, EntityDescriptor, FieldType, Operator, Query, Value,
    };

    fn user() -> Query {
        Query::new(
            EntityDescriptor::new("User")
                .field("id", FieldType::Integer)
                .field("name", FieldType::Text)
                .field("age", FieldType::Integer)
                .field("tags", FieldType::Text),
        )
    }

    fn pet() -> EntityDescriptor {
        EntityDescriptor::new("Pet")
            .field("ownerId", FieldType::Integer)
            .field("name", FieldType::Text)
    }

    fn path(name: &str) -> Expression {
        Expression::Path(Path::new(Source::root(0), name))
    }

    fn eq(name: &str, value: Value) -> Predicate {
        Predicate::Compare {
            left: path(name),
            op: Comparison::Equal,
            right: Expression::Literal(value),
        }
    }

    fn restriction(query: Query) -> Predicate {
        compile(&query).unwrap().into_query().restriction.unwrap()
    }

    #[test]
    fn test_group_then_and() {
        let query = user()
            .where_any(|g| g.r#where("name", "a").r#where("name", "b"))
            .r#where("age", 3);
        assert_eq!(
            restriction(query),
            Predicate::And(vec![
                Predicate::Or(vec![eq("name", "a".into()), eq("name", "b".into())]),
                eq("age", Value::Integer(3)),
            ])
        );
    }

    #[test]
    fn test_flat_or_then_and_folds_left() {
        let query = user().r#where("name", "a").or_where("name", "b").r#where("age", 3);
        assert_eq!(
            restriction(query),
            Predicate::And(vec![
                Predicate::Or(vec![eq("name", "a".into()), eq("name", "b".into())]),
                eq("age", Value::Integer(3)),
            ])
        );
    }

    #[test]
    fn test_empty_group_is_elided() {
        let query = user().r#where("name", "a").where_group(vec![]);
        assert_eq!(restriction(query), eq("name", "a".into()));
        assert!(compile(&user().where_any(|g| g)).unwrap().query().restriction.is_none());
    }

    #[test]
    fn test_null_checks() {
        let query = user().where_is_null("name").where_is_not_null("age");
        assert_eq!(
            restriction(query),
            Predicate::And(vec![Predicate::IsNull(path("name")), Predicate::IsNotNull(path("age"))])
        );

        let query = user().push_where(Condition::new("name", Operator::Equal, Value::Null).into());
        assert_eq!(restriction(query), Predicate::IsNull(path("name")));
    }

    #[test]
    fn test_null_with_ordering_fails() {
        let query = user().push_where(Condition::new("age", Operator::Less, Value::Null).into());
        assert!(matches!(compile(&query).unwrap_err(), AnvilError::Query(_)));
    }

    #[test]
    fn test_in_list_is_coerced() {
        let query = user().where_not_in("age", ["1", "2"]);
        assert_eq!(
            restriction(query),
            Predicate::In {
                expression: path("age"),
                values: vec![Value::Integer(1), Value::Integer(2)],
            }
            .negate()
        );
    }

    #[test]
    fn test_in_rejects_empty_list_and_scalar() {
        let empty = user().push_where(
            Condition::new("age", Operator::In, Value::List(Vec::new())).into(),
        );
        assert!(matches!(compile(&empty).unwrap_err(), AnvilError::Query(_)));

        let scalar = user().push_where(Condition::new("age", Operator::In, 3).into());
        assert!(matches!(compile(&scalar).unwrap_err(), AnvilError::Unsupported(_)));
    }

    #[test]
    fn test_like_keeps_text() {
        let query = user().where_op("age", Operator::Like, 1);
        assert_eq!(
            restriction(query),
            Predicate::Compare {
                left: path("age"),
                op: Comparison::Like,
                right: Expression::Literal(Value::Text("1".into())),
            }
        );
    }

    #[test]
    fn test_find_in_set() {
        let query = user().where_op("tags", Operator::NotFindInSet, "red");
        assert_eq!(
            restriction(query),
            Predicate::Compare {
                left: Expression::Function {
                    name: "find_in_set",
                    arguments: vec![Expression::Literal(Value::Text("red".into())), path("tags")],
                },
                op: Comparison::Equal,
                right: Expression::Literal(Value::Integer(0)),
            }
        );
    }

    #[test]
    fn test_field_comparison_rejects_membership_and_null_checks() {
        for op in [Operator::In, Operator::NotIn, Operator::IsNull, Operator::IsNotNull] {
            let query = user().where_field("name", op, "tags");
            assert!(matches!(compile(&query).unwrap_err(), AnvilError::Unsupported(_)));
        }
    }

    #[test]
    fn test_correlated_exists() {
        let query = user().where_exists_with(pet(), |q| q.where_field("ownerId", Operator::Equal, "id"));
        let Predicate::Exists(subquery) = restriction(query) else {
            panic!("expected exists");
        };
        assert_eq!(subquery.scope, 1);
        assert_eq!(subquery.selection, Selection::Root);
        assert_eq!(
            subquery.restriction,
            Some(Predicate::Compare {
                left: Expression::Path(Path::new(Source::root(1), "ownerId")),
                op: Comparison::Equal,
                right: path("id"),
            })
        );
    }

    #[test]
    fn test_in_subquery_with_two_selects_fails() {
        let sub = Query::new(pet()).add_select("ownerId").add_select("name");
        let err = compile(&user().where_in_query("id", sub)).unwrap_err();
        assert!(matches!(err, AnvilError::Query(_)));
    }

    #[test]
    fn test_raw_predicate() {
        let query = user().where_raw("user.age > 3").or_where("name", "a");
        assert_eq!(
            restriction(query),
            Predicate::Or(vec![Predicate::Raw("user.age > 3".into()), eq("name", "a".into())])
        );

        let query = user()
            .where_raw("user.age > 3 or user.age < 1")
            .r#where("name", "a");
        assert_eq!(
            restriction(query),
            Predicate::And(vec![
                Predicate::Raw("user.age > 3 or user.age < 1".into()),
                eq("name", "a".into()),
            ])
        );
    }

    #[test]
    fn test_comparison_maps_only_binary_operators() {
        assert_eq!(super::comparison(Operator::Diff).unwrap(), Comparison::NotEqual);
        assert_eq!(super::comparison(Operator::NotLike).unwrap(), Comparison::NotLike);
        for op in [Operator::In, Operator::IsNull, Operator::FindInSet] {
            assert!(matches!(super::comparison(op), Err(AnvilError::Unsupported(_))));
        }
    }

    #[test]
    fn test_self_correlated_exists_uses_separate_scopes() {
        let sub = user().where_field("id", Operator::Equal, "id");
        let Predicate::Exists(subquery) = restriction(user().where_exists(sub)) else {
            panic!("expected exists");
        };
        assert_eq!(subquery.acronym, "user");
        assert_eq!(
            subquery.restriction,
            Some(Predicate::Compare {
                left: Expression::Path(Path::new(Source::root(1), "id")),
                op: Comparison::Equal,
                right: path("id"),
            })
        );
    }
}
