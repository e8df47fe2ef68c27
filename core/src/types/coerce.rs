//! Coercion of comparison values to a declared field type.
//!
//! Values already matching the target are returned unchanged. Everything else
//! goes through its textual form and is parsed as the target type, so `"25"`
//! compares against an integer column as `25` while `"abc"` fails.

use super::FieldType;
use crate::error::{AnvilError, Result};
use crate::value::Value;

impl Value {
    /// Coerces this value to `target`, element-wise for lists.
    pub fn coerce(&self, target: FieldType) -> Result<Value> {
        let fail = || AnvilError::Coercion {
            value: self.clone(),
            target,
        };

        match (self, target) {
            (Value::Null, _) => Err(fail()),
            (Value::List(items), _) => items
                .iter()
                .map(|item| item.coerce(target))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            (Value::Text(_), FieldType::Text)
            | (Value::Integer(_), FieldType::Integer)
            | (Value::Real(_), FieldType::Real)
            | (Value::Bool(_), FieldType::Bool) => Ok(self.clone()),
            (Value::Integer(i), FieldType::Real) => Ok(Value::Real(*i as f64)),
            (_, FieldType::Text) => Ok(Value::Text(self.to_string())),
            (_, FieldType::Integer) => {
                let text = self.to_string();
                text.trim().parse::<i64>().map(Value::Integer).map_err(|_| fail())
            }
            (_, FieldType::Real) => {
                let text = self.to_string();
                text.trim().parse::<f64>().map(Value::Real).map_err(|_| fail())
            }
            (_, FieldType::Bool) => match self.to_string().trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(fail()),
            },
            (_, FieldType::Char) => {
                let text = self.to_string();
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Text(c.to_string())),
                    _ => Err(fail()),
                }
            }
        }
    }
}
