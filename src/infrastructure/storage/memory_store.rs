use super::LocalStore;
use crate::error::AppResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.write().insert(key.to_string(), value.to_string());
        self
    }

    /// Synchronous read, for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
