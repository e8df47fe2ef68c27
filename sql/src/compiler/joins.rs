use anvil_core::{AliasResolver, FetchSpec, JoinSpec, JoinType, Result};

use super::{Emitter, fresh_handle, qualified};
use crate::fragment::{SQL, SQLChunk, Token};

/// Registers every join of the tree under its acronym
pub(super) fn register(joins: &[JoinSpec], resolver: &mut AliasResolver<String>) -> Result<()> {
    for join in joins {
        let acronym = join.acronym();
        let handle = fresh_handle(resolver, &acronym);
        resolver.register(acronym, handle)?;
        register(&join.nested, resolver)?;
    }
    Ok(())
}

fn kind(kind: JoinType) -> Token {
    match kind {
        JoinType::Inner => Token::INNER,
        JoinType::Left => Token::LEFT,
        JoinType::Right => Token::RIGHT,
    }
}

/// `<kind> join fetch <root>.<relationship> as <alias>` per fetch
pub(super) fn fetches(fetches: &[FetchSpec], root: &str) -> SQL {
    let mut sql = SQL::empty();
    for fetch in fetches {
        let path = if fetch.nested {
            SQL::ident(fetch.relationship.clone())
        } else {
            qualified(root, &fetch.relationship)
        };
        sql.push_mut(kind(fetch.kind));
        sql.push_mut(Token::JOIN);
        sql.push_mut(Token::FETCH);
        sql.append_mut(path.alias(fetch.alias.clone()));
    }
    sql
}

impl Emitter {
    /// `<kind> join <parent>.<target> <acronym> [on ...]`, then nested joins
    pub(super) fn join(
        &mut self,
        join: &JoinSpec,
        parent: &str,
        resolver: &AliasResolver<String>,
    ) -> Result<SQL> {
        let name = join.acronym();
        let acronym = resolver.lookup(&name).cloned().unwrap_or(name);
        let mut sql = SQL::token(kind(join.kind)).push(Token::JOIN);
        let mut on = Vec::new();

        match &join.on {
            None => {
                sql.append_mut(qualified(parent, &join.target));
            }
            Some(fields) => {
                sql.push_mut(SQLChunk::ident(join.target.clone()));
                let (handle, path) = resolver.resolve(&fields.reference_field);
                on.push(
                    qualified(&acronym, &fields.join_field)
                        .push(Token::EQ)
                        .append(qualified(handle, path)),
                );
            }
        }
        sql.push_mut(SQLChunk::ident(acronym.clone()));

        if let Some(filter) = &join.filter
            && let Some(rendered) = self.predicate(&filter.items, resolver, &acronym)?
        {
            let rendered = if on.is_empty() {
                rendered
            } else {
                rendered.parens()
            };
            on.push(rendered);
        }
        if !on.is_empty() {
            sql.push_mut(Token::ON);
            sql.append_mut(SQL::join(on, Token::AND));
        }

        for nested in &join.nested {
            let nested = self.join(nested, &acronym, resolver)?;
            sql.append_mut(nested);
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::super::compile;
    use anvil_core::{
        AnvilError, Conditional, EntityDescriptor, FieldType, JoinType, Operator, Query,
    };

    fn user() -> Query {
        let toy = EntityDescriptor::new("Toy").field("price", FieldType::Real);
        let pet = EntityDescriptor::new("Pet")
            .field("name", FieldType::Text)
            .relation("toys", toy);
        Query::new(
            EntityDescriptor::new("User")
                .field("id", FieldType::Integer)
                .relation("pets", pet),
        )
    }

    #[test]
    fn test_aliased_join_qualifies_fields() {
        let query = user()
            .join_as("pets", "p")
            .r#where("p.name", "Rex")
            .r#where("pets.name", "Rex");
        assert_eq!(
            compile(&query).unwrap().sql,
            "select user from User user inner join user.pets p where p.name = :pname_1 and user.pets.name = :petsname_2"
        );
    }

    #[test]
    fn test_dotted_join_chains() {
        let query = user().left_join("pets.toys");
        assert_eq!(
            compile(&query).unwrap().sql,
            "select user from User user left join user.pets pets left join pets.toys toys"
        );
    }

    #[test]
    fn test_inline_filter_and_nested_join() {
        let query = user().join_with("pets", |j| {
            j.alias("p")
                .r#where("name", "Rex")
                .right_join("toys")
        });
        assert_eq!(
            compile(&query).unwrap().sql,
            "select user from User user inner join user.pets p on p.name = :name_1 right join p.toys toys"
        );
    }

    #[test]
    fn test_entity_join() {
        let audit = EntityDescriptor::new("Audit").field("user_id", FieldType::Integer);
        let query = user()
            .join_on(&audit, "user_id", "id")
            .where_op("audit.user_id", Operator::Greater, 0);
        assert_eq!(
            compile(&query).unwrap().sql,
            "select user from User user inner join Audit audit on audit.user_id = user.id where audit.user_id > :audituser_id_1"
        );
    }

    #[test]
    fn test_fetches() {
        let query = user().with("pets").with_kind("pets.toys", JoinType::Left);
        assert_eq!(
            compile(&query).unwrap().sql,
            "select user from User user inner join fetch user.pets as pets left join fetch user.pets.toys as pets_toys"
        );
    }

    #[test]
    fn test_duplicate_alias_is_rejected() {
        let query = user().join_as("pets", "p").join_as("pets", "p");
        assert!(matches!(compile(&query), Err(AnvilError::Query(_))));
    }
}
