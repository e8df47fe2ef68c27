use anvil_core::{Aggregate, AliasResolver, AnvilError, OrderBy, Projection, Query, Result};

use super::{Emitter, Mode, qualified};
use crate::fragment::{SQL, Token};

impl Emitter {
    /// `select ...`; the root itself when nothing is projected
    pub(super) fn projection(
        &mut self,
        query: &Query,
        resolver: &AliasResolver<String>,
        mode: Mode,
    ) -> Result<SQL> {
        let root = SQL::ident(resolver.root().clone());
        let select = SQL::token(Token::SELECT);

        if query.is_counting() {
            return Ok(select.append(SQL::func("count", root)));
        }
        match (mode, query.selects()) {
            (_, []) => Ok(select.append(root)),
            (Mode::Subquery, [projection]) => Ok(select.append(expression(projection, resolver)?)),
            (Mode::Subquery, _) => Err(AnvilError::query(format!(
                "subquery on `{}` must have at most one select",
                query.entity().name()
            ))),
            (Mode::Top, projections) => {
                let items = projections
                    .iter()
                    .map(|projection| {
                        let item = expression(projection, resolver)?;
                        Ok(match alias(projection) {
                            Some(alias) => item.alias(alias),
                            None => item,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(select.append(SQL::join(items, Token::COMMA)))
            }
        }
    }
}

/// Projected expression, aggregated when requested
fn expression(projection: &Projection, resolver: &AliasResolver<String>) -> Result<SQL> {
    if projection.is_wildcard() {
        let target = match projection.wildcard_target() {
            None => resolver.root().clone(),
            Some(acronym) => resolver.lookup(acronym).cloned().ok_or_else(|| {
                AnvilError::query(format!("unknown alias `{acronym}` in `{}`", projection.field))
            })?,
        };
        return match projection.aggregate {
            None => Ok(SQL::ident(target)),
            Some(Aggregate::Count) => Ok(SQL::func("count", SQL::ident(target))),
            Some(aggregate) => Err(AnvilError::query(format!(
                "`{aggregate}` cannot be applied to `{}`",
                projection.field
            ))),
        };
    }

    let (handle, path) = resolver.resolve(&projection.field);
    let field = qualified(handle, path);
    Ok(match projection.aggregate {
        Some(aggregate) => SQL::func(aggregate.as_str(), field),
        None => field,
    })
}

/// Column alias: the explicit one, else the field path with `_` for `.`
fn alias(projection: &Projection) -> Option<String> {
    match (&projection.alias, projection.aggregate) {
        (Some(alias), _) => Some(alias.replace('.', "_")),
        (None, _) if projection.is_wildcard() => None,
        (None, Some(aggregate)) => Some(format!("{aggregate}_{}", projection.field.replace('.', "_"))),
        (None, None) => Some(projection.field.replace('.', "_")),
    }
}

/// Labels of the result columns, in projection order
pub(super) fn columns(query: &Query) -> Vec<String> {
    if query.is_counting() {
        return vec!["count".to_owned()];
    }
    query
        .selects()
        .iter()
        .map(|projection| projection.label().to_owned())
        .collect()
}

pub(super) fn order(query: &Query, resolver: &AliasResolver<String>) -> SQL {
    if query.orders().is_empty() {
        return SQL::empty();
    }
    let items = query.orders().iter().map(|order| {
        let (handle, path) = resolver.resolve(&order.field);
        let direction = match order.direction {
            OrderBy::Asc => Token::ASC,
            OrderBy::Desc => Token::DESC,
        };
        qualified(handle, path).push(direction)
    });
    SQL::token(Token::ORDER_BY).append(SQL::join(items, Token::COMMA))
}

pub(super) fn group(query: &Query, resolver: &AliasResolver<String>) -> SQL {
    if query.group_bys().is_empty() {
        return SQL::empty();
    }
    let items = query.group_bys().iter().map(|group| {
        let (handle, path) = resolver.resolve(&group.field);
        qualified(handle, path)
    });
    SQL::token(Token::GROUP_BY).append(SQL::join(items, Token::COMMA))
}
