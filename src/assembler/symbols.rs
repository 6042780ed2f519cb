//! Label name to instruction index mapping.
//!
//! The table is filled during the first pass and only read during the
//! second. It never rejects an insert; duplicate detection is up to the
//! caller, which checks `contains` first.
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    labels: HashMap<String, i32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable { labels: HashMap::with_capacity(32) }
    }

    pub fn insert(&mut self, name: &str, index: i32) {
        self.labels.insert(name.to_owned(), index);
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.labels.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
