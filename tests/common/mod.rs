#![allow(dead_code)]

#[cfg(feature = "sql")]
use std::cell::RefCell;

use anvil::prelude::*;
use serde::Deserialize;

#[cfg(feature = "criteria")]
use anvil::criteria::Record;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub name: String,
    pub age: i64,
    pub active: bool,
    pub tags: Option<String>,
}

impl Entity for User {
    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new("User")
            .field("id", FieldType::Integer)
            .field("name", FieldType::Text)
            .field("age", FieldType::Integer)
            .field("active", FieldType::Bool)
            .field("tags", FieldType::Text)
            .relation("pets", pet())
    }
}

pub fn pet() -> EntityDescriptor {
    EntityDescriptor::new("Pet")
        .field("id", FieldType::Integer)
        .field("ownerId", FieldType::Integer)
        .field("name", FieldType::Text)
        .field("age", FieldType::Integer)
}

/// Fixed users for the in-memory engine, in insertion order
#[cfg(feature = "criteria")]
pub fn users() -> MemorySession {
    let rows = [
        (1, "Ann", 30, true, Some("admin,dev")),
        (2, "Bob", 17, false, None),
        (3, "Cid", 45, true, Some("dev")),
        (4, "Dee", 30, false, Some("ops")),
        (5, "Eve", 52, true, None),
    ];
    MemorySession::new("User").with_records(rows.into_iter().map(
        |(id, name, age, active, tags)| {
            Record::from([
                ("id".to_owned(), Value::from(id)),
                ("name".to_owned(), Value::from(name)),
                ("age".to_owned(), Value::from(age)),
                ("active".to_owned(), Value::from(active)),
                ("tags".to_owned(), Value::from(tags)),
            ])
        },
    ))
}

/// Records every statement and answers with canned rows
#[cfg(feature = "sql")]
#[derive(Debug, Default)]
pub struct Recorder {
    pub statements: RefCell<Vec<Statement>>,
    pub count: i64,
    pub rows: Vec<Row>,
}

#[cfg(feature = "sql")]
impl Recorder {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            statements: RefCell::default(),
            count: names.len() as i64,
            rows: names
                .iter()
                .map(|name| Row::new(vec!["name".into()], vec![Value::from(*name)]))
                .collect(),
        }
    }

    pub fn sql(&self) -> Vec<String> {
        self.statements
            .borrow()
            .iter()
            .map(|statement| statement.sql.clone())
            .collect()
    }
}

#[cfg(feature = "sql")]
impl SqlSession for Recorder {
    fn execute(&self, statement: &Statement) -> Result<Vec<Row>> {
        self.statements.borrow_mut().push(statement.clone());
        if statement.columns == ["count"] {
            return Ok(vec![Row::scalar(self.count)]);
        }
        let start = statement.first_result.unwrap_or(0) as usize;
        let end = statement
            .max_results
            .map_or(self.rows.len(), |max| (start + max as usize).min(self.rows.len()));
        Ok(self.rows.get(start..end).unwrap_or_default().to_vec())
    }
}
