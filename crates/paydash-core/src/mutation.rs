//! Mutate-then-reload cycle shared by the list pages.
//!
//! A mutation runs through the session guard and, only when it succeeds,
//! refreshes the owning list so the display reflects server state. Failed
//! mutations leave the list untouched.

use std::future::Future;

use crate::api::ApiResult;
use crate::error::{Error, Result};
use crate::list_view::{ListSource, ListViewController};

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirmation that always accepts, for non-interactive callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    Applied(T),
    /// The user declined; nothing was sent.
    Cancelled,
}

impl<T> MutationOutcome<T> {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Per-action message for the page to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Failure(String),
}

impl Feedback {
    /// Feedback for a finished action; `None` when the user cancelled.
    pub fn from_result<T>(
        result: &Result<MutationOutcome<T>>,
        success: impl Into<String>,
    ) -> Option<Self> {
        match result {
            Ok(MutationOutcome::Applied(_)) => Some(Self::Success(success.into())),
            Ok(MutationOutcome::Cancelled) => None,
            Err(error) => Some(Self::Failure(error.to_string())),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }
}

/// Trims `value` and rejects it when empty.
pub fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

impl<S: ListSource> ListViewController<S> {
    /// Runs `mutation` and refreshes the list once it succeeds.
    ///
    /// A failed refresh does not undo the mutation; it shows up in the
    /// list's phase instead of the returned result.
    pub async fn mutate<T, F, Fut>(&self, mutation: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let value = self.guard().call(mutation).await?;
        if let Err(error) = self.refresh().await {
            tracing::warn!("Reload after mutation failed: {}", error);
        }
        Ok(value)
    }

    /// Like [`Self::mutate`], but asks `confirm` first.
    pub async fn mutate_confirmed<T, F, Fut>(
        &self,
        confirm: &impl Confirm,
        prompt: &str,
        mutation: F,
    ) -> Result<MutationOutcome<T>>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        if !confirm.confirm(prompt) {
            tracing::debug!("Declined: {}", prompt);
            return Ok(MutationOutcome::Cancelled);
        }
        self.mutate(mutation).await.map(MutationOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::{ApiError, DashboardApi};
    use crate::list_view::{ListPage, NoStatus, PageRequest, Phase};
    use crate::models::ApiKey;
    use crate::test_support::{signed_in_guard, FakeApi};

    struct Keys(FakeApi);

    impl ListSource for Keys {
        type Item = ApiKey;
        type Status = NoStatus;

        fn page_size(&self) -> Option<usize> {
            None
        }

        async fn fetch(
            &self,
            token: &str,
            _request: &PageRequest<NoStatus>,
        ) -> ApiResult<ListPage<ApiKey>> {
            self.0.list_api_keys(token).await.map(ListPage::complete)
        }
    }

    fn keys_list(api: &FakeApi) -> ListViewController<Keys> {
        let (guard, _) = signed_in_guard();
        ListViewController::new(guard, Keys(api.clone()))
    }

    #[tokio::test(flavor = "current_thread")]
    async fn success_reloads_the_list() {
        let api = FakeApi::default().with_api_key("ci").with_api_key("deploy");
        let list = keys_list(&api);
        list.refresh().await.unwrap();

        let target = api.clone();
        list.mutate(|token| async move { target.delete_api_key(&token, "key_01").await })
            .await
            .unwrap();

        assert_eq!(api.calls("list_api_keys"), 2);
        let names = list.items().into_iter().map(|k| k.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["deploy".to_string()]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failure_leaves_list_untouched() {
        let api = FakeApi::default().with_api_key("ci");
        let list = keys_list(&api);
        list.refresh().await.unwrap();
        let before = list.snapshot();

        let target = api.clone();
        let result = list
            .mutate(|token| async move { target.delete_api_key(&token, "key_99").await })
            .await;

        match result {
            Err(Error::Remote(message)) => assert_eq!(message, "API key not found (404)"),
            other => panic!("expected remote failure, got {other:?}"),
        }
        assert_eq!(api.calls("list_api_keys"), 1);
        assert_eq!(list.snapshot(), before);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn declined_confirmation_sends_nothing() {
        let api = FakeApi::default().with_api_key("ci");
        let list = keys_list(&api);
        list.refresh().await.unwrap();
        let calls = api.total_calls();

        let target = api.clone();
        let outcome = list
            .mutate_confirmed(&|_: &str| false, "Revoke 'ci'?", |token| async move {
                target.delete_api_key(&token, "key_01").await
            })
            .await
            .unwrap();

        assert_eq!(outcome, MutationOutcome::Cancelled);
        assert_eq!(api.total_calls(), calls);
        assert_eq!(Feedback::from_result(&Ok(outcome), "Revoked"), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_reload_still_reports_mutation() {
        let api = FakeApi::default().with_api_key("ci");
        let list = keys_list(&api);
        api.fail_next(
            "list_api_keys",
            ApiError::Transport("connection reset".to_string()),
        );

        let target = api.clone();
        let outcome = list
            .mutate_confirmed(&AssumeYes, "Revoke 'ci'?", |token| async move {
                target.delete_api_key(&token, "key_01").await
            })
            .await;

        assert!(outcome.as_ref().is_ok_and(MutationOutcome::is_applied));
        assert!(list.phase().is_failed());
        assert_eq!(
            Feedback::from_result(&outcome, "Revoked").map(|f| f.message().to_string()),
            Some("Revoked".to_string())
        );
        assert_ne!(list.phase(), Phase::Ready);
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("  CI key ", "Name").unwrap(), "CI key");
        match require_text("   ", "Name") {
            Err(Error::Validation(message)) => assert_eq!(message, "Name is required"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
