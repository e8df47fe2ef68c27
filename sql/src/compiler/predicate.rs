use anvil_core::{
    AliasResolver, AnvilError, Combinator, Condition, FieldComparison, Operand, Operator, Result,
    Where,
};

use super::{Emitter, Mode, qualified, subquery_scope};
use crate::fragment::{SQL, Token};

impl Emitter {
    /// Left-to-right fold of a filter list. `None` when nothing renders.
    ///
    /// An `and` following an `or` wraps everything accumulated so far, so the
    /// text groups the same way the fold does.
    pub(super) fn predicate(
        &mut self,
        items: &[Where],
        resolver: &AliasResolver<String>,
        default: &String,
    ) -> Result<Option<SQL>> {
        let mut acc: Option<SQL> = None;
        let mut pending_or = false;

        for item in items {
            let Some(rendered) = self.item(item, resolver, default)? else {
                continue;
            };
            acc = Some(match acc {
                None => rendered,
                Some(prev) => match item.combinator() {
                    Combinator::And => {
                        let prev = if pending_or { prev.parens() } else { prev };
                        pending_or = false;
                        prev.push(Token::AND).append(rendered)
                    }
                    Combinator::Or => {
                        pending_or = true;
                        prev.push(Token::OR).append(rendered)
                    }
                },
            });
        }
        Ok(acc)
    }

    fn item(
        &mut self,
        item: &Where,
        resolver: &AliasResolver<String>,
        default: &String,
    ) -> Result<Option<SQL>> {
        match item {
            Where::Condition(condition) => self.condition(condition, resolver, default).map(Some),
            Where::Group(group) => Ok(self
                .predicate(&group.items, resolver, default)?
                .map(SQL::parens)),
            Where::Field(comparison) => field_comparison(comparison, resolver, default).map(Some),
            Where::Exists(exists) => {
                let scope = subquery_scope(resolver, &exists.subquery);
                let body = self.query(&exists.subquery, scope, Mode::Subquery)?;
                let keyword = if exists.exists {
                    SQL::token(Token::EXISTS)
                } else {
                    SQL::token(Token::NOT).push(Token::EXISTS)
                };
                Ok(Some(keyword.append(body.parens())))
            }
            Where::Raw(raw) => Ok(Some(SQL::raw(raw.sql.clone()).parens())),
        }
    }

    fn condition(
        &mut self,
        condition: &Condition,
        resolver: &AliasResolver<String>,
        default: &String,
    ) -> Result<SQL> {
        let (handle, path) = resolver.resolve_from(&condition.field, default);
        let field = qualified(handle, path);
        let op = condition.operator;

        match (op, &condition.operand) {
            (Operator::IsNull, Operand::None) | (Operator::Equal, Operand::None) => {
                Ok(field.push(Token::IS).push(Token::NULL))
            }
            (Operator::IsNotNull, Operand::None) | (Operator::Diff, Operand::None) => {
                Ok(field.push(Token::IS).push(Token::NOT).push(Token::NULL))
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
                let list = self.next_param(&condition.field, values.clone().into());
                Ok(membership(field, op).append(list.parens()))
            }
            (Operator::In | Operator::NotIn, Operand::Subquery(subquery)) => {
                let scope = subquery_scope(resolver, subquery);
                let body = self.query(subquery, scope, Mode::Subquery)?;
                Ok(membership(field, op).append(body.parens()))
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
                let param = self.next_param(&condition.field, value.clone());
                let call = SQL::func("find_in_set", param.push(Token::COMMA).append(field));
                let test = if op == Operator::FindInSet {
                    Token::GT
                } else {
                    Token::EQ
                };
                Ok(call.push(test).append(SQL::raw("0")))
            }
            (op, Operand::Value(value)) => {
                let param = self.next_param(&condition.field, value.clone());
                Ok(comparison(field, op).append(param))
            }
        }
    }
}

fn field_comparison(
    compared: &FieldComparison,
    resolver: &AliasResolver<String>,
    default: &String,
) -> Result<SQL> {
    let op = compared.operator;
    if !op.supports_field_comparison() {
        return Err(AnvilError::unsupported(format!(
            "`{op}` cannot compare `{}` with field `{}`",
            compared.field, compared.other
        )));
    }
    let (handle, path) = resolver.resolve_from(&compared.field, default);
    let (other_handle, other_path) = resolver.resolve_correlated(&compared.other);
    Ok(comparison(qualified(handle, path), op).append(qualified(other_handle, other_path)))
}

fn membership(field: SQL, op: Operator) -> SQL {
    match op {
        Operator::NotIn => field.push(Token::NOT).push(Token::IN),
        _ => field.push(Token::IN),
    }
}

/// `field <op>` for scalar comparison operators
fn comparison(field: SQL, op: Operator) -> SQL {
    match op {
        Operator::Equal => field.push(Token::EQ),
        Operator::Diff => field.push(Token::NE),
        Operator::Less => field.push(Token::LT),
        Operator::LessOrEqual => field.push(Token::LE),
        Operator::Greater => field.push(Token::GT),
        Operator::GreaterOrEqual => field.push(Token::GE),
        Operator::Like => field.push(Token::LIKE),
        Operator::NotLike => field.push(Token::NOT).push(Token::LIKE),
        Operator::In
        | Operator::NotIn
        | Operator::IsNull
        | Operator::IsNotNull
        | Operator::FindInSet
        | Operator::NotFindInSet => field,
    }
}
