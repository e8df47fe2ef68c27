use anvil_core::Value;

/// How named parameters are referenced in the query text
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderStyle {
    /// Colon style placeholders (:param)
    #[default]
    Colon,
    /// At-sign style placeholders (@param)
    AtSign,
    /// Dollar style placeholders ($param)
    Dollar,
}

impl PlaceholderStyle {
    pub const fn prefix(&self) -> char {
        match self {
            PlaceholderStyle::Colon => ':',
            PlaceholderStyle::AtSign => '@',
            PlaceholderStyle::Dollar => '$',
        }
    }

    /// Reference to the parameter `name` in query text
    pub fn placeholder(&self, name: &str) -> String {
        format!("{}{name}", self.prefix())
    }
}

/// A named parameter bound into a fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: Value,
}

impl Param {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Parameter name for a field: dots removed, parentheses turned into `_`,
/// then `_` and the statement-wide ordinal.
pub fn param_name(field: &str, ordinal: usize) -> String {
    let mut name = String::with_capacity(field.len() + 4);
    for c in field.chars() {
        match c {
            '.' => {}
            '(' | ')' => name.push('_'),
            c => name.push(c),
        }
    }
    name.push('_');
    name.push_str(&ordinal.to_string());
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_name_sanitizes_paths() {
        assert_eq!(param_name("age", 1), "age_1");
        assert_eq!(param_name("p.name", 2), "pname_2");
        assert_eq!(param_name("lower(name)", 3), "lower_name__3");
    }

    #[test]
    fn test_placeholder_styles() {
        assert_eq!(PlaceholderStyle::default().placeholder("age_1"), ":age_1");
        assert_eq!(PlaceholderStyle::AtSign.placeholder("age_1"), "@age_1");
        assert_eq!(PlaceholderStyle::Dollar.placeholder("age_1"), "$age_1");
    }
}
