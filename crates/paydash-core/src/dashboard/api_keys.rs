use crate::api::{ApiResult, DashboardApi};
use crate::error::Result;
use crate::list_view::{ListPage, ListSource, ListViewController, NoStatus, PageRequest};
use crate::models::ApiKey;
use crate::mutation::{Confirm, MutationOutcome};
use crate::reveal::KeyCreationFlow;
use crate::session::SessionGuard;

/// `GET api-keys`; the endpoint is unpaginated.
#[derive(Debug, Clone)]
pub struct ApiKeySource<A> {
    api: A,
}

impl<A: DashboardApi> ListSource for ApiKeySource<A> {
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
        self.api.list_api_keys(token).await.map(ListPage::complete)
    }
}

/// API key list plus the create/reveal dialog and revocation.
pub struct ApiKeysPage<A: DashboardApi> {
    api: A,
    keys: ListViewController<ApiKeySource<A>>,
    creation: KeyCreationFlow,
}

impl<A: DashboardApi + Clone> ApiKeysPage<A> {
    pub fn new(guard: SessionGuard, api: A) -> Self {
        Self {
            keys: ListViewController::new(guard, ApiKeySource { api: api.clone() }),
            api,
            creation: KeyCreationFlow::new(),
        }
    }

    pub const fn keys(&self) -> &ListViewController<ApiKeySource<A>> {
        &self.keys
    }

    pub const fn creation(&self) -> &KeyCreationFlow {
        &self.creation
    }

    pub async fn refresh(&self) -> Result<()> {
        self.keys.refresh().await
    }

    /// Creates a key and opens the one-time reveal.
    ///
    /// The list is not refreshed until the reveal is closed.
    pub async fn create(&mut self, name: &str) -> Result<ApiKey> {
        let api = &self.api;
        self.creation
            .submit(self.keys.guard(), name, |token, name| async move {
                api.create_api_key(&token, &name).await
            })
            .await
    }

    /// Discards the revealed secret and reloads the list.
    pub async fn close_reveal(&mut self) -> Result<()> {
        if self.creation.close() {
            tracing::debug!("Discarded revealed API key secret");
        }
        self.keys.refresh().await
    }

    /// Revokes `key` after confirmation, then reloads the list.
    pub async fn revoke(
        &self,
        key: &ApiKey,
        confirm: &impl Confirm,
    ) -> Result<MutationOutcome<()>> {
        let prompt = format!(
            "Revoke API key '{}' ({})? Integrations using it will stop working.",
            key.name, key.key_prefix
        );
        let api = &self.api;
        let id = key.id.as_str();
        let outcome = self
            .keys
            .mutate_confirmed(confirm, &prompt, |token| async move {
                api.delete_api_key(&token, id).await
            })
            .await?;
        if outcome.is_applied() {
            tracing::info!("Revoked API key {}", key.key_prefix);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;
    use crate::list_view::Phase;
    use crate::mutation::AssumeYes;
    use crate::test_support::{signed_in_guard, FakeApi};

    fn page(api: &FakeApi) -> ApiKeysPage<FakeApi> {
        let (guard, _) = signed_in_guard();
        ApiKeysPage::new(guard, api.clone())
    }

    fn names(page: &ApiKeysPage<FakeApi>) -> Vec<String> {
        page.keys().items().into_iter().map(|key| key.name).collect()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn secret_is_gone_after_close_and_list_has_new_key() {
        let api = FakeApi::default().with_api_key("ci");
        let mut page = page(&api);
        page.refresh().await.unwrap();

        let created = page.create("deploy").await.unwrap();
        assert!(page.creation().revealed().is_some());
        assert_eq!(api.calls("list_api_keys"), 1);

        page.close_reveal().await.unwrap();
        assert!(page.creation().revealed().is_none());
        assert_eq!(names(&page), vec!["ci".to_string(), "deploy".to_string()]);

        let listed = page
            .keys()
            .items()
            .into_iter()
            .find(|key| key.id == created.id)
            .unwrap();
        let rendered = format!("{listed:?} {}", serde_json::to_string(&listed).unwrap());
        assert!(!rendered.contains("s3cr3t"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blank_name_is_rejected_without_request() {
        let api = FakeApi::default();
        let mut page = page(&api);

        let result = page.create("  ").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(api.calls("create_api_key"), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn declined_revoke_makes_no_calls() {
        let api = FakeApi::default().with_api_key("ci");
        let page = page(&api);
        page.refresh().await.unwrap();
        let key = page.keys().items().remove(0);
        let before = api.total_calls();

        let outcome = page.revoke(&key, &|_: &str| false).await.unwrap();
        assert_eq!(outcome, MutationOutcome::Cancelled);
        assert_eq!(api.total_calls(), before);
        assert_eq!(names(&page), vec!["ci".to_string()]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn confirmed_revoke_reloads_list() {
        let api = FakeApi::default().with_api_key("ci").with_api_key("deploy");
        let page = page(&api);
        page.refresh().await.unwrap();
        let key = page.keys().items().remove(0);

        let outcome = page.revoke(&key, &AssumeYes).await.unwrap();
        assert!(outcome.is_applied());
        assert_eq!(api.calls("delete_api_key"), 1);
        assert_eq!(names(&page), vec!["deploy".to_string()]);
        assert_eq!(page.keys().phase(), Phase::Ready);
    }
}
