use super::display::{apply_to, DisplaySurface};
use super::model::{PreferencesPatch, UserPreferences};
use crate::error::AppResult;
use crate::infrastructure::repositories::{LocalBackend, RemoteBackend};
use std::sync::Arc;

/// What happened to each copy during a write.
///
/// Writes never fail as a whole; the outcome is informational and callers
/// are free to drop it.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub preferences: UserPreferences,
    pub remote_synced: bool,
    pub cached_locally: bool,
}

/// Read-through / write-through preference store.
///
/// Reads prefer the remote copy and fall back to the local mirror, then to
/// defaults. Writes go to the remote copy best-effort and always to the
/// local mirror. Each call is a self-contained read-merge-write; the mirror
/// reflects the most recently completed `save`.
pub struct PreferenceStore {
    remote: Arc<dyn RemoteBackend>,
    local: Arc<dyn LocalBackend>,
}

impl PreferenceStore {
    pub fn new(remote: Arc<dyn RemoteBackend>, local: Arc<dyn LocalBackend>) -> Self {
        Self { remote, local }
    }

    pub async fn load(&self) -> UserPreferences {
        match self.remote.fetch().await {
            Ok(partial) => return UserPreferences::from_partial(&partial),
            Err(e) => tracing::warn!(
                error = %e,
                transient = e.is_transient(),
                "Remote preferences unavailable, falling back to local cache"
            ),
        }

        match self.local.read().await {
            Ok(Some(partial)) => UserPreferences::from_partial(&partial),
            Ok(None) => {
                tracing::debug!("No cached preferences, using defaults");
                UserPreferences::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Local preference cache unreadable, using defaults");
                UserPreferences::default()
            }
        }
    }

    pub async fn save(&self, patch: &PreferencesPatch) -> SaveOutcome {
        let merged = self.load().await.apply(patch);

        let remote_synced = Self::best_effort("store remote preferences", self.remote.store(&merged).await);
        let cached_locally = match self.local.write(&merged).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to write local preference cache");
                false
            }
        };

        tracing::info!(remote_synced, cached_locally, "Preferences saved");

        SaveOutcome {
            preferences: merged,
            remote_synced,
            cached_locally,
        }
    }

    /// Drop the local mirror and ask the backend to forget its copy.
    /// Returns whether the remote delete went through.
    pub async fn reset(&self) -> bool {
        if let Err(e) = self.local.clear().await {
            tracing::error!(error = %e, "Failed to clear local preference cache");
        }
        Self::best_effort("delete remote preferences", self.remote.delete().await)
    }

    /// Push the current presentation toggles to `surface`. Stored data is
    /// not touched.
    pub async fn apply_theme(&self, surface: &mut dyn DisplaySurface) -> UserPreferences {
        let preferences = self.load().await;
        apply_to(&preferences, surface);
        preferences
    }

    fn best_effort(action: &str, result: AppResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(action = action, error = %e, "Remote preference write failed, ignoring");
                false
            }
        }
    }
}
