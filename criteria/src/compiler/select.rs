use anvil_core::{Aggregate, AliasResolver, AnvilError, Projection, Query, Result};

use super::Mode;
use crate::nodes::{Expression, OrderNode, Path, SelectItem, Selection, Source};

/// Root, single or multi selection; `count(root)` for count queries
pub(super) fn selection(
    query: &Query,
    resolver: &AliasResolver<Source>,
    mode: Mode,
) -> Result<Selection> {
    if query.is_counting() {
        return Ok(Selection::Single(SelectItem {
            expression: Expression::Aggregate {
                function: Aggregate::Count,
                argument: Box::new(Expression::Entity(*resolver.root())),
            },
            alias: None,
            label: "count".to_owned(),
        }));
    }
    match (mode, query.selects()) {
        (_, []) => Ok(Selection::Root),
        (Mode::Subquery, [projection]) => Ok(Selection::Single(SelectItem {
            expression: expression(projection, resolver)?,
            alias: None,
            label: projection.label().to_owned(),
        })),
        (Mode::Subquery, _) => Err(AnvilError::query(format!(
            "subquery on `{}` must have at most one select",
            query.entity().name()
        ))),
        (Mode::Top, [projection]) if projection.alias.is_none() => {
            Ok(Selection::Single(item(projection, resolver)?))
        }
        (Mode::Top, projections) => projections
            .iter()
            .map(|projection| item(projection, resolver))
            .collect::<Result<Vec<_>>>()
            .map(Selection::Multi),
    }
}

fn item(projection: &Projection, resolver: &AliasResolver<Source>) -> Result<SelectItem> {
    Ok(SelectItem {
        expression: expression(projection, resolver)?,
        alias: projection.alias.clone(),
        label: projection.label().to_owned(),
    })
}

fn expression(projection: &Projection, resolver: &AliasResolver<Source>) -> Result<Expression> {
    if projection.is_wildcard() {
        let source = match projection.wildcard_target() {
            None => *resolver.root(),
            Some(acronym) => *resolver.lookup(acronym).ok_or_else(|| {
                AnvilError::query(format!("unknown alias `{acronym}` in `{}`", projection.field))
            })?,
        };
        return match projection.aggregate {
            None => Ok(Expression::Entity(source)),
            Some(Aggregate::Count) => Ok(Expression::Aggregate {
                function: Aggregate::Count,
                argument: Box::new(Expression::Entity(source)),
            }),
            Some(aggregate) => Err(AnvilError::query(format!(
                "`{aggregate}` cannot be applied to `{}`",
                projection.field
            ))),
        };
    }

    let (source, path) = resolver.resolve(&projection.field);
    let field = Expression::Path(Path::new(*source, path));
    Ok(match projection.aggregate {
        Some(function) => Expression::Aggregate {
            function,
            argument: Box::new(field),
        },
        None => field,
    })
}

pub(super) fn order(query: &Query, resolver: &AliasResolver<Source>) -> Vec<OrderNode> {
    query
        .orders()
        .iter()
        .map(|order| {
            let (source, path) = resolver.resolve(&order.field);
            OrderNode {
                expression: Expression::Path(Path::new(*source, path)),
                direction: order.direction,
            }
        })
        .collect()
}

pub(super) fn group_by(query: &Query, resolver: &AliasResolver<Source>) -> Vec<Expression> {
    query
        .group_bys()
        .iter()
        .map(|group| {
            let (source, path) = resolver.resolve(&group.field);
            Expression::Path(Path::new(*source, path))
        })
        .collect()
}
