pub mod error;
pub mod json;

use serde_json::Value;
use std::collections::BTreeMap;

pub use error::{Error, ErrorKind, Result};
pub use json::JsonFileProvider;

/// Key under which the calendar is kept in a provider.
pub const STATE_KEY: &str = "CALENDAR";

/// Persistent key-value storage for calendar state.
///
/// `set` only updates the provider's view; nothing is durable until `flush`
/// returns.
pub trait StateProvider {
    fn get(&self, key: &str) -> Option<&Value>;
    fn set(&mut self, key: &str, value: Value);
    fn flush(&mut self) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryProvider {
    entries: BTreeMap<String, Value>,
    flushes: usize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: Value) -> Self {
        self.entries.insert(key.to_owned(), value);
        self
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl StateProvider for MemoryProvider {
    fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_owned(), value);
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_provider_counts_flushes() {
        let mut provider = MemoryProvider::new().with_entry(STATE_KEY, json!({"a": 1}));
        assert_eq!(provider.get(STATE_KEY), Some(&json!({"a": 1})));

        provider.set(STATE_KEY, json!({"a": 2}));
        provider.flush().unwrap();

        assert_eq!(provider.get(STATE_KEY), Some(&json!({"a": 2})));
        assert_eq!(provider.flush_count(), 1);
        assert!(provider.get("missing").is_none());
    }
}
