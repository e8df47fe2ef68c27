use std::collections::BTreeMap;

use anvil_core::Value;

/// A compiled textual query: the text, its named parameters and the labels
/// of the projected columns. Limit and offset travel beside the text and are
/// applied by the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    /// Parameter values keyed by name, without the placeholder prefix
    pub params: BTreeMap<String, Value>,
    pub columns: Vec<String>,
    pub max_results: Option<u64>,
    pub first_result: Option<u64>,
}

impl Statement {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn set_max_results(&mut self, max_results: Option<u64>) {
        self.max_results = max_results;
    }

    pub fn set_first_result(&mut self, first_result: Option<u64>) {
        self.first_result = first_result;
    }
}
