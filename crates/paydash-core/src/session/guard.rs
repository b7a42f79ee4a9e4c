use std::future::Future;

use zeroize::Zeroizing;

use super::{Session, SessionStore};
use crate::api::{ApiResult, DashboardApi};
use crate::error::{Error, Result};

/// Single entry point for authenticated API calls.
///
/// Every request is issued with the current bearer token. An unauthorized
/// response tears the session down and becomes [`Error::SessionInvalid`];
/// any other failure becomes [`Error::Remote`] and leaves the session alone.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    store: SessionStore,
}

impl SessionGuard {
    #[must_use]
    pub const fn new(store: SessionStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Runs `request` with the current token.
    ///
    /// Without a session the request is never started.
    pub async fn call<T, F, Fut>(&self, request: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let Some((token, generation)) = self.store.lease() else {
            tracing::debug!("Refusing authenticated request without a session");
            return Err(Error::SessionInvalid);
        };

        match request(token).await {
            Ok(value) => Ok(value),
            Err(error) if error.is_unauthorized() => {
                if self.store.clear_if_current(generation) {
                    tracing::warn!("Session rejected by API ({}); signed out", error);
                } else {
                    tracing::debug!("Session already cleared; ignoring late rejection");
                }
                Err(Error::SessionInvalid)
            }
            Err(error) => Err(Error::Remote(error.to_string())),
        }
    }

    /// Exchanges credentials for a session and stores it.
    pub async fn sign_in<A: DashboardApi>(
        &self,
        api: &A,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::Validation("Email is required".to_string()));
        }
        let password = Zeroizing::new(password.to_string());
        if password.trim().is_empty() {
            return Err(Error::Validation("Password is required".to_string()));
        }

        let response = api.login(email, &password).await.map_err(|error| {
            if error.is_unauthorized() {
                Error::Remote("Invalid email or password".to_string())
            } else {
                Error::Remote(error.to_string())
            }
        })?;

        let session = Session::new(response.token, response.user);
        self.store.establish(session.clone())?;
        tracing::info!(
            "Signed in as {}",
            session.profile.email.as_deref().unwrap_or(&session.profile.id)
        );
        Ok(session)
    }

    /// Ends the session remotely (best effort) and locally.
    ///
    /// Returns whether a session was present.
    pub async fn sign_out<A: DashboardApi>(&self, api: &A) -> Result<bool> {
        if let Some((token, _)) = self.store.lease() {
            if let Err(error) = api.logout(&token).await {
                tracing::warn!("Remote logout failed: {}", error);
            }
        }
        let had_session = self.store.clear()?;
        if had_session {
            tracing::info!("Signed out");
        }
        Ok(had_session)
    }
}
