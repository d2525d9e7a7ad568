use std::collections::HashMap;

/// Key seeded with the caller's query at the start of every run.
pub const INITIAL_QUERY_KEY: &str = "initial_query";

/// Per-run store threading text between steps.
///
/// Keys are only ever added or overwritten (last write wins); nothing is
/// removed. A value is owned by exactly one run and never shared.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    values: HashMap<String, String>,
}

impl ExecutionContext {
    /// A fresh context holding only `initial_query`.
    pub fn seeded(initial_query: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(INITIAL_QUERY_KEY.to_string(), initial_query.into());
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for a single-key input; an absent key reads as the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Value for one block of a multi-key input; an absent key reads as a
    /// placeholder naming the key.
    pub fn get_or_placeholder(&self, key: &str) -> String {
        match self.get(key) {
            Some(value) => value.to_string(),
            None => missing_key_placeholder(key),
        }
    }

    /// Store a step output, returning the value it replaced, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn missing_key_placeholder(key: &str) -> String {
    format!("'{key}' not found in context")
}
