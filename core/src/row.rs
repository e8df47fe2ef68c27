//! Result rows and their materialization into typed shapes.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::error::{AnvilError, Result};
use crate::value::Value;

/// One result tuple with its column labels
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// A single unlabeled scalar, as returned by count queries
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self {
            columns: Vec::new(),
            values: vec![value.into()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    /// Materializes the row into `T`.
    ///
    /// Shapes are tried in order: a single-column row as a bare scalar, the
    /// values as a sequence matched by arity (tuples, tuple structs, structs in
    /// field order), then an object keyed by column label where dotted labels
    /// such as `pet.name` become nested objects.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        if let [value] = self.values.as_slice()
            && let Ok(scalar) = serde_json::from_value(value.to_json())
        {
            return Ok(scalar);
        }

        let sequence = Json::Array(self.values.iter().map(Value::to_json).collect());
        if let Ok(shaped) = serde_json::from_value(sequence) {
            return Ok(shaped);
        }

        let object = self.to_nested_object()?;
        serde_json::from_value(object).map_err(|e| AnvilError::Mapping(e.to_string()))
    }

    fn to_nested_object(&self) -> Result<Json> {
        if self.columns.len() != self.values.len() {
            return Err(AnvilError::Mapping(format!(
                "row has {} values but {} column labels",
                self.values.len(),
                self.columns.len()
            )));
        }

        let mut root = Map::new();
        for (column, value) in self.columns.iter().zip(&self.values) {
            insert_path(&mut root, column, value.to_json())?;
        }
        Ok(Json::Object(root))
    }
}

fn insert_path(target: &mut Map<String, Json>, path: &str, value: Json) -> Result<()> {
    match path.split_once('.') {
        None => {
            target.insert(path.to_owned(), value);
            Ok(())
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_owned())
                .or_insert_with(|| Json::Object(Map::new()));
            match entry {
                Json::Object(nested) => insert_path(nested, rest, value),
                _ => Err(AnvilError::Mapping(format!(
                    "column `{head}` is both a value and a nested path"
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn row(pairs: &[(&str, Value)]) -> Row {
        Row::new(
            pairs.iter().map(|(c, _)| (*c).to_owned()).collect(),
            pairs.iter().map(|(_, v)| v.clone()).collect(),
        )
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pet {
        name: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Owner {
        id: i64,
        name: String,
        pet: Pet,
    }

    #[test]
    fn test_single_column_scalar() {
        let count: u64 = Row::scalar(42).deserialize().unwrap();
        assert_eq!(count, 42);
        let name: String = row(&[("name", Value::from("Ann"))]).deserialize().unwrap();
        assert_eq!(name, "Ann");
    }

    #[test]
    fn test_arity_match_first() {
        let row = row(&[("user.name", Value::from("Ann")), ("age", Value::from(30))]);
        let (name, age): (String, i64) = row.deserialize().unwrap();
        assert_eq!((name.as_str(), age), ("Ann", 30));
    }

    #[test]
    fn test_nested_paths_by_name() {
        let row = row(&[
            ("name", Value::from("Ann")),
            ("pet.name", Value::from("Rex")),
            ("id", Value::from(1)),
        ]);
        let owner: Owner = row.deserialize().unwrap();
        assert_eq!(
            owner,
            Owner {
                id: 1,
                name: "Ann".into(),
                pet: Pet { name: "Rex".into() },
            }
        );
    }

    #[test]
    fn test_mapping_error() {
        let err = row(&[("name", Value::from("Ann"))])
            .deserialize::<Owner>()
            .unwrap_err();
        assert!(matches!(err, AnvilError::Mapping(_)));
    }

    #[test]
    fn test_conflicting_paths() {
        let row = row(&[("pet", Value::from(1)), ("pet.name", Value::from("Rex"))]);
        assert!(matches!(
            row.deserialize::<Owner>(),
            Err(AnvilError::Mapping(_))
        ));
    }
}
