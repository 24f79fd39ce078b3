//! Named running totals

use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct Counter {
    totals: BTreeMap<String, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, value: u64) {
        match self.totals.get_mut(name) {
            Some(total) => *total = total.saturating_add(value),
            None => {
                self.totals.insert(name.to_owned(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.totals.get(name).copied().unwrap_or(0)
    }

    /// Counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.totals.iter().map(|(name, total)| (name.as_str(), *total))
    }
}
