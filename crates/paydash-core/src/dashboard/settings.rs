use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::DashboardApi;
use crate::error::Result;
use crate::list_view::Phase;
use crate::models::{Settings, SettingsUpdate};
use crate::session::SessionGuard;

struct SettingsState {
    settings: Option<Settings>,
    phase: Phase,
}

/// Company settings: a single record that is loaded, edited and reloaded.
pub struct SettingsPage<A> {
    api: A,
    guard: SessionGuard,
    state: Mutex<SettingsState>,
}

impl<A: DashboardApi> SettingsPage<A> {
    pub const fn new(guard: SessionGuard, api: A) -> Self {
        Self {
            api,
            guard,
            state: Mutex::new(SettingsState {
                settings: None,
                phase: Phase::Idle,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, SettingsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn settings(&self) -> Option<Settings> {
        self.state().settings.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase.clone()
    }

    /// Fetches the settings record. A failure keeps the last loaded copy.
    pub async fn load(&self) -> Result<Settings> {
        self.state().phase = Phase::Loading;
        let api = &self.api;
        let outcome = self
            .guard
            .call(|token| async move { api.get_settings(&token).await })
            .await;

        let mut state = self.state();
        match outcome {
            Ok(settings) => {
                state.settings = Some(settings.clone());
                state.phase = Phase::Ready;
                Ok(settings)
            }
            Err(error) => {
                state.phase = Phase::Failed(error.to_string());
                Err(error)
            }
        }
    }

    /// Validates and saves `update`, then reloads from the server.
    ///
    /// Invalid input is rejected before any request; a failed save leaves
    /// the loaded record and phase untouched.
    pub async fn save(&self, update: SettingsUpdate) -> Result<Settings> {
        let update = update.validated()?;
        let api = &self.api;
        let update_ref = &update;
        self.guard
            .call(|token| async move { api.update_settings(&token, update_ref).await })
            .await?;
        tracing::info!("Saved settings for {}", update.company_name);

        match self.load().await {
            Ok(settings) => Ok(settings),
            Err(error) if error.is_session_invalid() => Err(error),
            Err(error) => {
                tracing::warn!("Reload after saving settings failed: {}", error);
                self.settings().ok_or(error)
            }
        }
    }
}
