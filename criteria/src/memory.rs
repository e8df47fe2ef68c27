//! In-process engine over flat records.
//!
//! Records map dotted attribute names to values. Only single-root graphs are
//! evaluated: joins, subqueries, raw predicates and grouping are rejected with
//! [`AnvilError::Unsupported`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anvil_core::{Aggregate, AnvilError, OrderBy, Result, Row, Value};

use crate::nodes::{
    Comparison, CriteriaQuery, Expression, OrderNode, Predicate, SelectItem, Selection, TypedQuery,
};
use crate::session::CriteriaSession;

pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    entity: String,
    records: Vec<Record>,
}

impl MemorySession {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            records: Vec::new(),
        }
    }

    pub fn insert(&mut self, record: Record) -> &mut Self {
        self.records.push(record);
        self
    }

    pub fn with_records(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

impl CriteriaSession for MemorySession {
    fn list(&self, query: &TypedQuery) -> Result<Vec<Row>> {
        let criteria = query.query();
        if criteria.entity != self.entity {
            return Err(AnvilError::Execution(format!(
                "no records for `{}`, session holds `{}`",
                criteria.entity, self.entity
            )));
        }
        if !criteria.joins.is_empty() {
            return Err(AnvilError::unsupported("joins are not evaluated in memory"));
        }
        if !criteria.group_by.is_empty() {
            return Err(AnvilError::unsupported("grouping is not evaluated in memory"));
        }

        let mut matched = Vec::new();
        for record in &self.records {
            let keep = match &criteria.restriction {
                Some(predicate) => holds(predicate, record)?,
                None => true,
            };
            if keep {
                matched.push(record);
            }
        }
        sort(&mut matched, &criteria.order)?;

        let rows = project(criteria, &matched)?;
        let first = query.first_result().unwrap_or(0) as usize;
        let rows = rows.into_iter().skip(first);
        let rows: Vec<Row> = match query.max_results() {
            Some(max) => rows.take(max as usize).collect(),
            None => rows.collect(),
        };

        anvil_core::anvil_trace_exec!("list", rows.len());
        Ok(rows)
    }
}

fn project(criteria: &CriteriaQuery, records: &[&Record]) -> Result<Vec<Row>> {
    let items = match &criteria.selection {
        Selection::Root => {
            return Ok(records
                .iter()
                .map(|record| {
                    Row::new(
                        record.keys().cloned().collect(),
                        record.values().cloned().collect(),
                    )
                })
                .collect());
        }
        selection => selection.items(),
    };

    let aggregated = items
        .iter()
        .filter(|item| matches!(item.expression, Expression::Aggregate { .. }))
        .count();
    let columns = criteria.selection.columns();

    if aggregated == 0 {
        return records
            .iter()
            .map(|record| {
                let values = items
                    .iter()
                    .map(|item| value(&item.expression, record))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Row::new(columns.clone(), values))
            })
            .collect();
    }
    if aggregated != items.len() {
        return Err(AnvilError::unsupported(
            "mixing aggregates and plain columns requires grouping",
        ));
    }
    let values = items
        .iter()
        .map(|item| aggregate(item, records))
        .collect::<Result<Vec<_>>>()?;
    Ok(vec![Row::new(columns, values)])
}

fn aggregate(item: &SelectItem, records: &[&Record]) -> Result<Value> {
    let Expression::Aggregate { function, argument } = &item.expression else {
        return Err(AnvilError::unsupported(format!("`{}` is not an aggregate", item.label)));
    };
    if let Expression::Entity(_) = argument.as_ref() {
        return Ok(Value::Integer(records.len() as i64));
    }

    let values = records
        .iter()
        .map(|record| value(argument, record))
        .collect::<Result<Vec<_>>>()?;
    let present: Vec<&Value> = values.iter().filter(|value| !value.is_null()).collect();

    Ok(match function {
        Aggregate::Count => Value::Integer(present.len() as i64),
        _ if present.is_empty() => Value::Null,
        Aggregate::Sum => sum(&present),
        Aggregate::Avg => {
            let total = present.iter().filter_map(|value| value.as_f64()).sum::<f64>();
            Value::Real(total / present.len() as f64)
        }
        Aggregate::Min => extreme(&present, Ordering::Less),
        Aggregate::Max => extreme(&present, Ordering::Greater),
    })
}

fn sum(values: &[&Value]) -> Value {
    if values.iter().all(|value| matches!(value, Value::Integer(_))) {
        Value::Integer(values.iter().filter_map(|value| value.as_i64()).sum())
    } else {
        Value::Real(values.iter().filter_map(|value| value.as_f64()).sum())
    }
}

fn extreme(values: &[&Value], wanted: Ordering) -> Value {
    let mut best = values[0];
    for value in &values[1..] {
        if value.compare(best) == Some(wanted) {
            best = value;
        }
    }
    best.clone()
}

fn sort(records: &mut [&Record], order: &[OrderNode]) -> Result<()> {
    if order.is_empty() {
        return Ok(());
    }
    let mut keyed = Vec::with_capacity(records.len());
    for record in records.iter() {
        let key = order
            .iter()
            .map(|node| value(&node.expression, record))
            .collect::<Result<Vec<_>>>()?;
        keyed.push((key, *record));
    }
    keyed.sort_by(|(a, _), (b, _)| {
        for ((a, b), node) in a.iter().zip(b).zip(order) {
            // nulls sort first
            let ordering = match (a.is_null(), b.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => a.compare(b).unwrap_or(Ordering::Equal),
            };
            let ordering = match node.direction {
                OrderBy::Asc => ordering,
                OrderBy::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    for (slot, (_, record)) in records.iter_mut().zip(keyed) {
        *slot = record;
    }
    Ok(())
}

fn value(expression: &Expression, record: &Record) -> Result<Value> {
    match expression {
        Expression::Path(path) if path.source.is_root() => {
            Ok(record.get(&path.dotted()).cloned().unwrap_or_default())
        }
        Expression::Path(path) => Err(AnvilError::unsupported(format!(
            "`{}` belongs to a join",
            path.dotted()
        ))),
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Function { name, arguments } if *name == "find_in_set" => {
            match arguments.as_slice() {
                [needle, haystack] => find_in_set(&value(needle, record)?, &value(haystack, record)?),
                _ => Err(AnvilError::query("find_in_set takes two arguments")),
            }
        }
        Expression::Function { name, .. } => {
            Err(AnvilError::unsupported(format!("function `{name}`")))
        }
        Expression::Entity(_) | Expression::Aggregate { .. } => Err(AnvilError::unsupported(
            "entities and aggregates are not row values",
        )),
    }
}

/// 1-based position of `needle` in a comma-separated list, 0 when absent
fn find_in_set(needle: &Value, haystack: &Value) -> Result<Value> {
    if needle.is_null() || haystack.is_null() {
        return Ok(Value::Null);
    }
    let needle = needle.to_string();
    let position = haystack
        .to_string()
        .split(',')
        .position(|item| item == needle)
        .map_or(0, |index| index as i64 + 1);
    Ok(Value::Integer(position))
}

/// Whether a record passes the restriction. Unknown counts as a miss.
fn holds(predicate: &Predicate, record: &Record) -> Result<bool> {
    Ok(truth(predicate, record)? == Some(true))
}

/// Three-valued truth of a predicate; `None` is unknown (a NULL operand)
fn truth(predicate: &Predicate, record: &Record) -> Result<Option<bool>> {
    match predicate {
        Predicate::And(items) => {
            let mut unknown = false;
            for item in items {
                match truth(item, record)? {
                    Some(false) => return Ok(Some(false)),
                    None => unknown = true,
                    Some(true) => {}
                }
            }
            Ok(if unknown { None } else { Some(true) })
        }
        Predicate::Or(items) => {
            let mut unknown = false;
            for item in items {
                match truth(item, record)? {
                    Some(true) => return Ok(Some(true)),
                    None => unknown = true,
                    Some(false) => {}
                }
            }
            Ok(if unknown { None } else { Some(false) })
        }
        Predicate::Not(inner) => Ok(truth(inner, record)?.map(|held| !held)),
        Predicate::Compare { left, op, right } => {
            let (left, right) = (value(left, record)?, value(right, record)?);
            if left.is_null() || right.is_null() {
                return Ok(None);
            }
            Ok(Some(compare(&left, *op, &right)))
        }
        Predicate::IsNull(expression) => Ok(Some(value(expression, record)?.is_null())),
        Predicate::IsNotNull(expression) => Ok(Some(!value(expression, record)?.is_null())),
        Predicate::In { expression, values } => {
            let value = value(expression, record)?;
            if value.is_null() {
                return Ok(None);
            }
            if values
                .iter()
                .any(|candidate| value.compare(candidate) == Some(Ordering::Equal))
            {
                return Ok(Some(true));
            }
            Ok(if values.iter().any(Value::is_null) {
                None
            } else {
                Some(false)
            })
        }
        Predicate::InSubquery { .. } | Predicate::Exists(_) => {
            Err(AnvilError::unsupported("subqueries are not evaluated in memory"))
        }
        Predicate::Raw(sql) => Err(AnvilError::unsupported(format!(
            "raw predicate `{sql}` is not evaluated in memory"
        ))),
    }
}

fn compare(left: &Value, op: Comparison, right: &Value) -> bool {
    match op {
        Comparison::Like | Comparison::NotLike => {
            let (Some(text), Some(pattern)) = (left.as_str(), right.as_str()) else {
                return false;
            };
            like(text, pattern) == (op == Comparison::Like)
        }
        _ => match left.compare(right) {
            None => false,
            Some(ordering) => match op {
                Comparison::Equal => ordering == Ordering::Equal,
                Comparison::NotEqual => ordering != Ordering::Equal,
                Comparison::Less => ordering == Ordering::Less,
                Comparison::LessOrEqual => ordering != Ordering::Greater,
                Comparison::Greater => ordering == Ordering::Greater,
                Comparison::GreaterOrEqual => ordering != Ordering::Less,
                Comparison::Like | Comparison::NotLike => false,
            },
        },
    }
}

/// SQL `LIKE`: `%` matches any run, `_` any single character
fn like(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    // matches[j]: pattern[..i] matches text[..j]
    let mut matches = vec![false; text.len() + 1];
    matches[0] = true;
    for p in &pattern {
        let mut next = vec![false; text.len() + 1];
        match p {
            '%' => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= matches[j];
                    next[j] = seen;
                }
            }
            _ => {
                for j in 1..=text.len() {
                    next[j] = matches[j - 1] && (*p == '_' || *p == text[j - 1]);
                }
            }
        }
        matches = next;
    }
    matches[text.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::nodes::{Path, Source};
    use anvil_core::{Conditional, EntityDescriptor, FieldType, Operator, Query};

    fn user() -> Query {
        Query::new(
            EntityDescriptor::new("User")
                .field("name", FieldType::Text)
                .field("age", FieldType::Integer)
                .field("tags", FieldType::Text),
        )
    }

    fn record(name: &str, age: i64, tags: Option<&str>) -> Record {
        Record::from([
            ("name".to_owned(), Value::from(name)),
            ("age".to_owned(), Value::from(age)),
            ("tags".to_owned(), Value::from(tags)),
        ])
    }

    fn session() -> MemorySession {
        MemorySession::new("User").with_records([
            record("Ann", 30, Some("red,blue")),
            record("Bob", 17, None),
            record("Cid", 45, Some("blue")),
            record("Dee", 30, Some("green")),
        ])
    }

    fn names(query: Query) -> Vec<String> {
        session()
            .list(&compile(&query).unwrap())
            .unwrap()
            .iter()
            .map(|row| row.get_by_name("name").and_then(Value::as_str).unwrap_or("").to_owned())
            .collect()
    }

    #[test]
    fn test_like() {
        assert!(like("Annabel", "Ann%"));
        assert!(like("Ann", "A_n"));
        assert!(like("", "%"));
        assert!(!like("Bob", "A%"));
        assert!(!like("Ann", "An"));
        assert!(like("a%b", "a%b"));
    }

    #[test]
    fn test_filter_order_and_paging() {
        let query = user()
            .where_op("age", Operator::GreaterOrEqual, 18)
            .order_by_desc("age")
            .order_by("name");
        assert_eq!(names(query.clone()), ["Cid", "Ann", "Dee"]);
        assert_eq!(names(query.limit(1).offset(1)), ["Ann"]);
    }

    #[test]
    fn test_or_group_and_null_checks() {
        let query = user()
            .where_any(|g| g.where_op("name", Operator::Like, "A%").where_is_null("tags"))
            .where_op("age", Operator::Less, 40);
        assert_eq!(names(query), ["Ann", "Bob"]);
    }

    #[test]
    fn test_find_in_set() {
        assert_eq!(names(user().where_op("tags", Operator::FindInSet, "blue")), ["Ann", "Cid"]);
        assert_eq!(
            names(user().where_op("tags", Operator::NotFindInSet, "blue")),
            ["Dee"]
        );
    }

    #[test]
    fn test_null_field_fails_both_in_and_not_in() {
        assert_eq!(names(user().where_in("tags", ["blue", "green"])), ["Cid", "Dee"]);
        assert_eq!(names(user().where_not_in("tags", ["blue", "green"])), ["Ann"]);
    }

    #[test]
    fn test_negated_unknown_stays_unknown() {
        let record = record("Bob", 17, None);
        let tags = Expression::Path(Path::new(Source::root(0), "tags"));
        let unknown = Predicate::Compare {
            left: tags.clone(),
            op: Comparison::Equal,
            right: Expression::Literal(Value::from("blue")),
        };

        assert_eq!(truth(&unknown, &record).unwrap(), None);
        assert!(!holds(&unknown.clone().negate(), &record).unwrap());
        assert!(holds(&Predicate::Or(vec![unknown.clone(), Predicate::IsNull(tags)]), &record).unwrap());
        assert!(truth(&Predicate::And(vec![unknown, Predicate::Raw("x".into())]), &record).is_err());
    }

    #[test]
    fn test_aggregates() {
        let query = user().count_all().sum_as("age", "total").max_as("name", "last");
        let rows = session().list(&compile(&query).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].values(),
            &[Value::Integer(4), Value::Integer(122), Value::Text("Dee".into())]
        );
    }

    #[test]
    fn test_count_ignores_paging() {
        let query = user().where_op("age", Operator::Greater, 20).limit(1);
        let rows = session().list(&compile(&query.count_query()).unwrap()).unwrap();
        assert_eq!(rows[0].get_by_name("count"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_unsupported_shapes() {
        let joined = Query::new(
            EntityDescriptor::new("User").relation("pets", EntityDescriptor::new("Pet")),
        )
        .join("pets");
        let err = session().list(&compile(&joined).unwrap()).unwrap_err();
        assert!(matches!(err, AnvilError::Unsupported(_)));

        let raw = user().where_raw("user.age > 1");
        let err = session().list(&compile(&raw).unwrap()).unwrap_err();
        assert!(matches!(err, AnvilError::Unsupported(_)));
    }
}
