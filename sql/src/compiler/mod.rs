//! Compiles a [`Query`] into query text plus named parameters.
//!
//! Clauses are emitted in a fixed order (projection, root, fetch joins,
//! joins, filter, ordering, grouping) and empty clauses are skipped.
//! Parameter names carry a statement-wide ordinal, so names stay unique across
//! nested groups and subqueries.

mod joins;
mod predicate;
mod select;

use anvil_core::{AliasResolver, Query, Result};

use crate::fragment::{SQL, SQLChunk, Token};
use crate::params::{PlaceholderStyle, param_name};
use crate::statement::Statement;

/// Where a query body is being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Top,
    Subquery,
}

/// Textual backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlCompiler {
    style: PlaceholderStyle,
}

impl SqlCompiler {
    pub const fn new() -> Self {
        Self {
            style: PlaceholderStyle::Colon,
        }
    }

    pub const fn with_style(style: PlaceholderStyle) -> Self {
        Self { style }
    }

    pub const fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Renders the full statement for `query`
    pub fn compile(&self, query: &Query) -> Result<Statement> {
        anvil_core::anvil_trace_compile!("sql", query.entity().name());

        let body = self.to_sql(query)?;
        let sql = body.sql_with(self.style);
        let params = body
            .params()
            .map(|param| (param.name.clone(), param.value.clone()))
            .collect::<std::collections::BTreeMap<_, _>>();
        anvil_core::anvil_trace_query!(sql, params.len());

        Ok(Statement {
            sql,
            params,
            columns: select::columns(query),
            max_results: query.limit_value(),
            first_result: query.offset_value(),
        })
    }

    /// Builds the fragment without rendering it
    pub fn to_sql(&self, query: &Query) -> Result<SQL> {
        let acronym = query.acronym();
        let resolver = AliasResolver::new(acronym.clone(), acronym);
        Emitter::default().query(query, resolver, Mode::Top)
    }
}

/// Compiles with the default `:name` placeholders
pub fn compile(query: &Query) -> Result<Statement> {
    SqlCompiler::new().compile(query)
}

/// Per-statement emission state
#[derive(Debug, Default)]
struct Emitter {
    ordinal: usize,
}

impl Emitter {
    fn next_param(&mut self, field: &str, value: anvil_core::Value) -> SQL {
        self.ordinal += 1;
        SQL::param(param_name(field, self.ordinal), value)
    }

    fn query(
        &mut self,
        query: &Query,
        mut resolver: AliasResolver<String>,
        mode: Mode,
    ) -> Result<SQL> {
        joins::register(query.joins(), &mut resolver)?;
        let root = resolver.root().clone();

        let mut sql = self.projection(query, &resolver, mode)?;
        sql.push_mut(Token::FROM);
        sql.push_mut(SQLChunk::ident(query.entity().name().to_owned()));
        sql.push_mut(SQLChunk::ident(root.clone()));

        if mode == Mode::Top && !query.is_counting() {
            sql.append_mut(joins::fetches(query.fetches(), &root));
        }
        for join in query.joins() {
            let join = self.join(join, &root, &resolver)?;
            sql.append_mut(join);
        }
        if let Some(filter) = self.predicate(query.wheres(), &resolver, &root)? {
            sql.push_mut(Token::WHERE);
            sql.append_mut(filter);
        }
        if mode == Mode::Top && !query.is_counting() {
            sql.append_mut(select::order(query, &resolver));
        }
        sql.append_mut(select::group(query, &resolver));
        Ok(sql)
    }
}

/// Text handle for a source named `acronym`. A name that shadows a source
/// already visible in the scope chain gets a numbered suffix, so correlated
/// references stay distinct in the emitted text.
fn fresh_handle(resolver: &AliasResolver<String>, acronym: &str) -> String {
    if !resolver.has_handle(acronym) {
        return acronym.to_owned();
    }
    let mut ordinal = 1;
    loop {
        let candidate = format!("{acronym}_{ordinal}");
        if !resolver.has_handle(candidate.as_str()) {
            return candidate;
        }
        ordinal += 1;
    }
}

/// Scope of a subquery nested under `resolver`
fn subquery_scope(resolver: &AliasResolver<String>, subquery: &Query) -> AliasResolver<String> {
    let acronym = subquery.acronym();
    let handle = fresh_handle(resolver, &acronym);
    resolver.child(acronym, handle)
}

/// `acronym.path`
fn qualified(handle: &str, path: &str) -> SQL {
    SQL::ident(format!("{handle}.{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::{Conditional, EntityDescriptor, FieldType, Operator};

    fn user() -> Query {
        Query::new(
            EntityDescriptor::new("User")
                .field("id", FieldType::Integer)
                .field("name", FieldType::Text)
                .field("age", FieldType::Integer),
        )
    }

    #[test]
    fn test_plain_query() {
        let statement = compile(&user()).unwrap();
        assert_eq!(statement.sql, "select user from User user");
        assert!(statement.params.is_empty());
    }

    #[test]
    fn test_user_scenario() {
        let query = user()
            .where_op("age", Operator::Greater, 25)
            .where_op("name", Operator::Like, "A%")
            .order_by("name")
            .limit(10);
        let statement = compile(&query).unwrap();

        assert_eq!(
            statement.sql,
            "select user from User user where user.age > :age_1 and user.name like :name_2 order by user.name asc"
        );
        assert_eq!(statement.params.len(), 2);
        assert_eq!(statement.param("age_1"), Some(&25.into()));
        assert_eq!(statement.param("name_2"), Some(&"A%".into()));
        assert_eq!(statement.max_results, Some(10));
        assert_eq!(statement.first_result, None);
    }

    #[test]
    fn test_placeholder_style() {
        let query = user().r#where("id", 1);
        let statement = SqlCompiler::with_style(PlaceholderStyle::Dollar)
            .compile(&query)
            .unwrap();
        assert_eq!(statement.sql, "select user from User user where user.id = $id_1");
        assert!(statement.params.contains_key("id_1"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let query = user()
            .where_any(|g| g.r#where("name", "a").r#where("name", "b"))
            .where_in("id", [1, 2]);
        let before = query.clone();
        let first = compile(&query).unwrap();
        let second = compile(&query).unwrap();
        assert_eq!(first, second);
        assert_eq!(query, before);
    }

    #[test]
    fn test_count_variant() {
        let query = user()
            .r#where("name", "Ann")
            .with("pets")
            .add_select("name")
            .order_by("name")
            .limit(3);
        let statement = compile(&query.count_query()).unwrap();
        assert_eq!(
            statement.sql,
            "select count(user) from User user where user.name = :name_1"
        );
        assert_eq!(statement.columns, ["count"]);
        assert_eq!(statement.max_results, None);
    }
}
