//! Auth session service
//!
//! Owns the current-user state and the session lifecycle: initialize at
//! startup, login/register/logout, explicit token refresh, and profile
//! updates. Operations run sequentially per session; the service never issues
//! overlapping requests against its own user state.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::adapters::api::ApiClient;
use crate::domain::result::{Error, Result};
use crate::domain::{LoginCredentials, RegisterData, User, UserUpdate};
use crate::ports::TokenStore;

pub struct AuthService {
    api: Arc<ApiClient>,
    store: Arc<dyn TokenStore>,
    user: Mutex<Option<User>>,
    enforce_age_range: bool,
}

impl AuthService {
    pub fn new(api: Arc<ApiClient>, store: Arc<dyn TokenStore>, enforce_age_range: bool) -> Self {
        Self {
            api,
            store,
            user: Mutex::new(None),
            enforce_age_range,
        }
    }

    fn user_state(&self) -> MutexGuard<'_, Option<User>> {
        self.user.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current user, if one has been resolved
    pub fn current_user(&self) -> Option<User> {
        self.user_state().clone()
    }

    /// Whether this session counts as authenticated
    ///
    /// True when a user is loaded OR a stored access token exists - the
    /// latter covers the window between startup and the user fetch
    /// completing (optimistic authentication).
    pub fn is_authenticated(&self) -> bool {
        self.user_state().is_some() || self.store.has_access_token()
    }

    /// Rebuild session state at startup
    ///
    /// If a token is stored, exchange it for the current user. A failed fetch
    /// means the stored session is no longer valid, so the tokens are cleared
    /// locally; nothing is surfaced since this runs unattended.
    pub async fn initialize(&self) {
        if !self.store.has_access_token() {
            return;
        }
        match self.api.current_user().await {
            Ok(user) => {
                *self.user_state() = Some(user);
            }
            Err(_) => {
                self.store.clear();
            }
        }
    }

    /// Exchange credentials for a session
    ///
    /// The access token is persisted as soon as login succeeds. A failing
    /// profile fetch afterwards does not fail the login - the token is
    /// valid - so a minimal placeholder user is substituted instead.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<()> {
        let response = self.api.login(credentials).await?;
        self.store.set_access_token(&response.access_token);

        match self.api.current_user().await {
            Ok(user) => {
                *self.user_state() = Some(user);
            }
            Err(_) => {
                *self.user_state() = Some(User::placeholder(&credentials.email));
            }
        }
        Ok(())
    }

    /// Create a new account
    ///
    /// Registration never establishes a session; the participant logs in
    /// afterwards. Input is validated locally first, so a bad form never
    /// reaches the network.
    pub async fn register(&self, data: &RegisterData) -> Result<()> {
        data.validate(self.enforce_age_range)?;
        self.api.register(data).await
    }

    /// End the session
    ///
    /// Server-side invalidation is best-effort; local tokens and user state
    /// are always cleared, so logout cannot fail from the caller's
    /// perspective.
    pub async fn logout(&self) {
        let _ = self.api.logout().await;
        self.store.clear();
        *self.user_state() = None;
    }

    /// Explicitly exchange the stored refresh token for a new access token
    ///
    /// Unlike the transparent pre-request refresh, failures here are surfaced
    /// to the caller - after clearing all session state.
    pub async fn refresh_token(&self) -> Result<()> {
        let refresh = self
            .store
            .refresh_token()
            .ok_or_else(|| Error::Other("No refresh token available".to_string()))?;

        match self.api.refresh(&refresh).await {
            Ok(response) => {
                self.store
                    .set_token_pair(&response.token, response.refresh_token.as_deref());
                Ok(())
            }
            Err(e) => {
                self.store.clear();
                *self.user_state() = None;
                Err(e)
            }
        }
    }

    /// Send a partial profile update
    ///
    /// The local user is replaced wholesale with the server's returned
    /// representation - never merged locally - to avoid drift.
    pub async fn update_profile(&self, update: &UserUpdate) -> Result<User> {
        let user = self.api.update_user(update).await?;
        *self.user_state() = Some(user.clone());
        Ok(user)
    }

    /// Re-fetch the full user record
    ///
    /// Used after operations that change server-side aggregates (survey
    /// submissions) so dashboard statistics reflect fresh data.
    pub async fn refresh_user(&self) -> Result<User> {
        let user = self.api.current_user().await?;
        *self.user_state() = Some(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_store::FileTokenStore;
    use tempfile::TempDir;

    fn service_with_store(dir: &TempDir) -> (AuthService, Arc<FileTokenStore>) {
        let store = Arc::new(FileTokenStore::new(dir.path()));
        let store_port: Arc<dyn TokenStore> = store.clone();
        let api = Arc::new(ApiClient::new("http://127.0.0.1:1", store_port.clone()).unwrap());
        let service = AuthService::new(api, store_port, false);
        (service, store)
    }

    #[test]
    fn test_not_authenticated_without_user_or_token() {
        let dir = TempDir::new().unwrap();
        let (service, _store) = service_with_store(&dir);
        assert!(!service.is_authenticated());
        assert!(service.current_user().is_none());
    }

    #[test]
    fn test_stored_token_counts_as_authenticated() {
        // Covers the window before the user fetch resolves
        let dir = TempDir::new().unwrap();
        let (service, store) = service_with_store(&dir);
        store.set_access_token("some-token");
        assert!(service.is_authenticated());
        assert!(service.current_user().is_none());
    }

    #[tokio::test]
    async fn test_initialize_without_token_skips_network() {
        // The unreachable API would error if contacted; no token means no call
        let dir = TempDir::new().unwrap();
        let (service, _store) = service_with_store(&dir);
        service.initialize().await;
        assert!(!service.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_token_requires_stored_refresh_token() {
        let dir = TempDir::new().unwrap();
        let (service, _store) = service_with_store(&dir);
        let err = service.refresh_token().await.unwrap_err();
        assert!(err.to_string().contains("No refresh token available"));
    }
}
