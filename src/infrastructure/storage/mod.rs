pub mod file_store;
pub mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::error::AppResult;
use async_trait::async_trait;

/// Key under which the bearer token is kept.
pub const TOKEN_KEY: &str = "token";

/// Key under which the preference mirror is kept.
pub const PREFERENCES_KEY: &str = "userPreferences";

/// Persistent string key/value store local to this device.
///
/// Values are opaque strings; callers serialize whole objects. There is no
/// field-level locking, so concurrent writers to the same key are last
/// writer wins.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    async fn remove(&self, key: &str) -> AppResult<()>;
}
