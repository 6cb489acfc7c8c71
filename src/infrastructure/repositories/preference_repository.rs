use crate::domain::preferences::{PreferenceMap, UserPreferences};
use crate::error::{AppError, AppResult};
use crate::infrastructure::http::ApiClient;
use crate::infrastructure::storage::{LocalStore, PREFERENCES_KEY};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

const PREFERENCES_PATH: &str = "/api/user/preferences";

/// Authoritative copy of the preferences, held by the backend.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Possibly partial preference object.
    async fn fetch(&self) -> AppResult<PreferenceMap>;

    async fn store(&self, preferences: &UserPreferences) -> AppResult<()>;

    async fn delete(&self) -> AppResult<()>;
}

/// Device-local mirror of the preferences.
#[async_trait]
pub trait LocalBackend: Send + Sync {
    /// `None` when nothing has been cached yet.
    async fn read(&self) -> AppResult<Option<PreferenceMap>>;

    async fn write(&self, preferences: &UserPreferences) -> AppResult<()>;

    async fn clear(&self) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct PreferencesEnvelope {
    #[serde(default)]
    preferences: Option<PreferenceMap>,
}

#[derive(Debug, Serialize)]
struct PreferencesBody<'a> {
    preferences: &'a UserPreferences,
}

pub struct HttpPreferenceBackend {
    api: Arc<ApiClient>,
}

impl HttpPreferenceBackend {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteBackend for HttpPreferenceBackend {
    async fn fetch(&self) -> AppResult<PreferenceMap> {
        let envelope: PreferencesEnvelope = self.api.get_with_auth(PREFERENCES_PATH).await?;
        Ok(envelope.preferences.unwrap_or_default())
    }

    async fn store(&self, preferences: &UserPreferences) -> AppResult<()> {
        self.api
            .put_with_auth(PREFERENCES_PATH, &PreferencesBody { preferences })
            .await
    }

    async fn delete(&self) -> AppResult<()> {
        self.api.delete_with_auth(PREFERENCES_PATH).await
    }
}

/// Keeps the serialized preference object under one local-store key.
pub struct CachedPreferenceBackend {
    store: Arc<dyn LocalStore>,
}

impl CachedPreferenceBackend {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LocalBackend for CachedPreferenceBackend {
    async fn read(&self) -> AppResult<Option<PreferenceMap>> {
        let Some(raw) = self.store.get(PREFERENCES_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<JsonValue>(&raw)? {
            JsonValue::Object(map) => Ok(Some(map)),
            other => Err(AppError::Decode(format!(
                "Cached preferences are not an object: {}",
                other
            ))),
        }
    }

    async fn write(&self, preferences: &UserPreferences) -> AppResult<()> {
        let raw = serde_json::to_string(preferences)?;
        self.store.set(PREFERENCES_KEY, &raw).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.store.remove(PREFERENCES_KEY).await
    }
}
