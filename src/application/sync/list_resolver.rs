//! List Resolver - turns a configured `ListRef` into a verified `ListHandle`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::CredentialManager;
use crate::domain::sync::{ListHandle, ListRef, StaticList, SyncError};
use crate::ports::TargetSystemClient;

/// Resolves and caches target lists for the life of the process.
///
/// Failed resolutions are not cached and are retried on the next call.
pub struct ListResolver {
    target: Arc<dyn TargetSystemClient>,
    credentials: Arc<CredentialManager>,
    page_size: usize,
    max_pages: usize,
    cache: RwLock<HashMap<ListRef, ListHandle>>,
}

impl ListResolver {
    pub fn new(
        target: Arc<dyn TargetSystemClient>,
        credentials: Arc<CredentialManager>,
        page_size: usize,
        max_pages: usize,
    ) -> Self {
        Self {
            target,
            credentials,
            page_size: page_size.max(1),
            max_pages: max_pages.max(1),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn resolve(&self, list_ref: &ListRef) -> Result<ListHandle, SyncError> {
        if let Some(handle) = self.cache.read().await.get(list_ref) {
            debug!(list = %list_ref, list_id = handle.id(), "List resolution cache hit");
            return Ok(handle.clone());
        }

        let list = match list_ref {
            ListRef::Id(id) => self.lookup_by_id(*id).await?,
            ListRef::Name(name) => self.search_by_name(name).await?,
        };

        let handle = ListHandle::new(list_ref.clone(), list);
        info!(
            list = %list_ref,
            list_id = handle.id(),
            list_name = handle.name(),
            "Resolved target list"
        );
        self.cache
            .write()
            .await
            .insert(list_ref.clone(), handle.clone());
        Ok(handle)
    }

    async fn lookup_by_id(&self, list_id: u64) -> Result<StaticList, SyncError> {
        let found = self
            .credentials
            .call_with_refresh(|credential| {
                let target = self.target.clone();
                async move { target.find_list(credential.token(), list_id).await }
            })
            .await?;

        found.ok_or_else(|| SyncError::list_not_found(format!("no static list with id {}", list_id)))
    }

    async fn search_by_name(&self, name: &str) -> Result<StaticList, SyncError> {
        let limit = self.page_size;

        for page_number in 0..self.max_pages {
            let offset = page_number * limit;
            let page = self
                .credentials
                .call_with_refresh(|credential| {
                    let target = self.target.clone();
                    async move { target.list_page(credential.token(), offset, limit).await }
                })
                .await?;

            debug!(
                offset,
                items = page.items.len(),
                has_more = page.has_more,
                "Fetched static list page"
            );

            if let Some(list) = page.items.into_iter().find(|l| l.name.trim() == name) {
                return Ok(list);
            }
            if !page.has_more {
                return Err(SyncError::list_not_found(format!(
                    "no static list named '{}'",
                    name
                )));
            }
        }

        Err(SyncError::list_not_found(format!(
            "no static list named '{}' within {} pages",
            name, self.max_pages
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::marketo::MockTargetSystem;
    use crate::ports::TargetError;
    use chrono::Duration;
    use secrecy::SecretString;

    fn resolver(mock: &MockTargetSystem, page_size: usize, max_pages: usize) -> ListResolver {
        let target: Arc<dyn TargetSystemClient> = Arc::new(mock.clone());
        let credentials = Arc::new(CredentialManager::new(
            target.clone(),
            "client",
            SecretString::new("secret".into()),
            Duration::seconds(60),
        ));
        ListResolver::new(target, credentials, page_size, max_pages)
    }

    fn seed_lists(mock: &MockTargetSystem, count: u64, match_at: u64) {
        for id in 1..=count {
            let name = if id == match_at {
                "ListA".to_string()
            } else {
                format!("Other {}", id)
            };
            mock.add_list(id, &name);
        }
    }

    #[tokio::test]
    async fn name_resolution_pages_until_match_then_caches() {
        let mock = MockTargetSystem::new();
        seed_lists(&mock, 453, 450);
        let lists = resolver(&mock, 200, 1000);
        let list_ref: ListRef = "ListA".parse().unwrap();

        let handle = lists.resolve(&list_ref).await.unwrap();
        assert_eq!(handle.id(), 450);
        assert_eq!(handle.name(), "ListA");
        assert_eq!(mock.call_count("list_page"), 3);

        mock.clear_calls();
        let again = lists.resolve(&list_ref).await.unwrap();
        assert_eq!(again, handle);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn name_match_is_exact() {
        let mock = MockTargetSystem::new()
            .with_list(1, "ListAB")
            .with_list(2, "lista")
            .with_list(3, "ListA");
        let lists = resolver(&mock, 200, 1000);

        let handle = lists.resolve(&ListRef::Name("ListA".into())).await.unwrap();
        assert_eq!(handle.id(), 3);
    }

    #[tokio::test]
    async fn missing_name_is_list_not_found_and_not_cached() {
        let mock = MockTargetSystem::new().with_list(1, "Other");
        let lists = resolver(&mock, 200, 1000);
        let list_ref = ListRef::Name("ListA".into());

        let err = lists.resolve(&list_ref).await.unwrap_err();
        assert!(matches!(err, SyncError::ListNotFound { .. }));

        mock.add_list(2, "ListA");
        let handle = lists.resolve(&list_ref).await.unwrap();
        assert_eq!(handle.id(), 2);
    }

    #[tokio::test]
    async fn page_cap_stops_endless_paging() {
        let mock = MockTargetSystem::new();
        seed_lists(&mock, 50, 0);
        let lists = resolver(&mock, 10, 3);

        let err = lists.resolve(&ListRef::Name("ListA".into())).await.unwrap_err();
        assert!(matches!(err, SyncError::ListNotFound { .. }));
        assert_eq!(mock.call_count("list_page"), 3);
    }

    #[tokio::test]
    async fn numeric_id_is_verified_before_use() {
        let mock = MockTargetSystem::new().with_list(42, "Newsletter");
        let lists = resolver(&mock, 200, 1000);

        let handle = lists.resolve(&ListRef::Id(42)).await.unwrap();
        assert_eq!(handle.name(), "Newsletter");
        assert_eq!(mock.call_count("find_list"), 1);
        assert_eq!(mock.call_count("list_page"), 0);

        let err = lists.resolve(&ListRef::Id(7)).await.unwrap_err();
        assert!(matches!(err, SyncError::ListNotFound { .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced_and_retried_next_time() {
        let mock = MockTargetSystem::new().with_list(42, "Newsletter");
        mock.push_error("find_list", TargetError::Network("timeout".into()));
        let lists = resolver(&mock, 200, 1000);

        let err = lists.resolve(&ListRef::Id(42)).await.unwrap_err();
        assert!(matches!(err, SyncError::Transport { .. }));

        assert!(lists.resolve(&ListRef::Id(42)).await.is_ok());
        assert_eq!(mock.call_count("find_list"), 2);
    }
}
