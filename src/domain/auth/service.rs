use super::jwt::ClaimsReader;
use crate::domain::access::{AuthStatus, User};
use crate::error::AppResult;
use crate::infrastructure::storage::{LocalStore, TOKEN_KEY};
use std::sync::Arc;

/// Client-side session backed by the bearer token in the local store.
pub struct SessionService {
    store: Arc<dyn LocalStore>,
    claims: ClaimsReader,
}

impl SessionService {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self {
            store,
            claims: ClaimsReader::new(),
        }
    }

    /// Persist a token issued by the backend's login endpoint.
    pub async fn sign_in(&self, token: &str) -> AppResult<User> {
        let user = User::from(self.claims.read(token)?);
        self.store.set(TOKEN_KEY, token).await?;

        tracing::info!(user_id = user.id, role = %user.role, "Session stored");
        Ok(user)
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        self.store.remove(TOKEN_KEY).await?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        let token = match self.store.get(TOKEN_KEY).await {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read session token");
                return None;
            }
        };

        match self.claims.read(&token) {
            Ok(claims) => Some(User::from(claims)),
            Err(e) => {
                tracing::debug!(error = %e, "Stored session token is not usable");
                None
            }
        }
    }

    /// Resolved authentication status for the route guard.
    pub async fn auth_status(&self) -> AuthStatus {
        match self.current_user().await {
            Some(user) => AuthStatus::Authenticated(Some(user)),
            None => AuthStatus::Anonymous,
        }
    }
}
