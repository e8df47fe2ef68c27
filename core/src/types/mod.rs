//! Declared field types and value coercion.

mod coerce;

use std::fmt;

/// Storage type declared for an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Integer,
    Real,
    Bool,
    Char,
}

impl FieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Real => "real",
            FieldType::Bool => "bool",
            FieldType::Char => "char",
        }
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Real)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
